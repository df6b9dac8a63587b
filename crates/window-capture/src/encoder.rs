use std::{
    fs::File,
    io::{self, BufWriter, Write},
    path::PathBuf,
};

use image::{ExtendedColorType, ImageError, ImageEncoder as _, codecs::png::PngEncoder};
use thiserror::Error;
use tracing::{info, instrument};
use utilities::DebugTime;

use crate::rgba_buffer::RgbaBuffer;

/// Receives finished captures.
pub trait ImageEncoder {
    /// Write the capture.
    fn encode(&mut self, image: &RgbaBuffer) -> Result<(), EncodeError>;
}

/// Writes each capture to the same PNG file, replacing the previous capture.
#[derive(Clone, Debug)]
pub struct PngFileEncoder {
    path: PathBuf,
}

impl PngFileEncoder {
    /// Create an encoder writing to `path`.
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self { path: path.into() }
    }
}

impl ImageEncoder for PngFileEncoder {
    #[instrument("PngFileEncoder::encode", skip_all, fields(path = %self.path.display()))]
    fn encode(&mut self, image: &RgbaBuffer) -> Result<(), EncodeError> {
        let _timing = DebugTime::start("Saving capture to file");

        let file = File::create(&self.path).map_err(EncodeError::CreateFile)?;
        let mut writer = BufWriter::new(file);

        PngEncoder::new(&mut writer).write_image(
            image.as_bytes(),
            image.width(),
            image.height(),
            ExtendedColorType::Rgba8,
        )?;
        writer.flush().map_err(EncodeError::Flush)?;

        info!("Saved capture to {}", self.path.display());
        Ok(())
    }
}

/// Capture encoding error variants.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum EncodeError {
    /// The output file could not be created.
    #[error("Failed to create file for capture:\n{0}")]
    CreateFile(#[source] io::Error),

    /// The capture could not be encoded.
    #[error("Failed to write capture to file:\n{0}")]
    WriteFile(#[from] ImageError),

    /// The encoded capture could not be flushed to the file.
    #[error("Failed to flush capture to file:\n{0}")]
    Flush(#[source] io::Error),
}

#[cfg(test)]
mod test {
    use std::fs;

    use crate::{pixel::Rgba, rgba_buffer::RgbaBuffer};

    use super::{EncodeError, ImageEncoder, PngFileEncoder};

    #[test]
    fn writes_decodable_png() {
        let path = std::env::temp_dir().join(format!("window-capture-{}.png", std::process::id()));
        let image = RgbaBuffer::from_pixels(
            2,
            1,
            vec![Rgba::new(255, 0, 0, 255), Rgba::new(0, 0, 255, 128)],
        )
        .unwrap();

        PngFileEncoder::new(&path).encode(&image).unwrap();

        let decoded = image::open(&path).unwrap().into_rgba8();
        assert_eq!(decoded.dimensions(), (2, 1));
        assert_eq!(decoded.as_raw().as_slice(), image.as_bytes());

        fs::remove_file(path).unwrap();
    }

    #[test]
    fn unwritable_path_fails() {
        let path = std::env::temp_dir()
            .join("window-capture-missing-directory")
            .join("nested")
            .join("capture.png");
        let image = RgbaBuffer::try_new(1, 1).unwrap();

        let result = PngFileEncoder::new(path).encode(&image);

        assert!(matches!(result, Err(EncodeError::CreateFile(_))));
    }
}
