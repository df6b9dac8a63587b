//! Drives a capture through the host's paint of the next frame.

use alloc::boxed::Box;

use thiserror::Error;
use tracing::{error, info, info_span, instrument};

use crate::{
    difference::difference_frames,
    encoder::{EncodeError, ImageEncoder},
    host::{Backdrop, OutputFrame, ReadbackError},
    paint_chain::{NextOutput, OutputStage},
    rgba_buffer::{AllocationError, RgbaBuffer},
    trim::trim,
};

pub use filter::CaptureFilter;
pub use request::CaptureRequest;

mod filter;
mod request;

/// Output stage that captures the armed window on the next paint of its screen.
///
/// While idle it paints the output once, unchanged. While armed it paints the output
/// over a black and then a white backdrop, reading back each render, reconstructs the
/// window's colors and alpha, trims and encodes the result. The request is cleared and
/// the output painted normally afterwards, whether or not the capture succeeded.
pub struct CaptureOrchestrator {
    request: CaptureRequest,
    encoder: Box<dyn ImageEncoder>,
    trim: bool,
}

impl CaptureOrchestrator {
    /// Create an orchestrator serving `request` and writing captures with `encoder`.
    pub fn new(request: CaptureRequest, encoder: Box<dyn ImageEncoder>, trim: bool) -> Self {
        Self {
            request,
            encoder,
            trim,
        }
    }

    /// Render the output over `backdrop` and read it back into `buffer`.
    fn render_over(
        backdrop: Backdrop,
        frame: &mut OutputFrame<'_>,
        next: &mut NextOutput<'_>,
        buffer: &mut RgbaBuffer,
    ) -> Result<(), ReadbackError> {
        frame.renderer.fill_output(frame.region, backdrop);
        next.paint_output(frame);

        frame.renderer.read_pixels(frame.region, buffer.pixels_mut())
    }

    #[instrument("CaptureOrchestrator::capture", skip_all)]
    fn capture(
        &mut self,
        frame: &mut OutputFrame<'_>,
        next: &mut NextOutput<'_>,
    ) -> Result<[u32; 2], CaptureError> {
        let region = frame.region;

        let mut black = RgbaBuffer::try_new(region.width, region.height)?;
        let mut white = RgbaBuffer::try_new(region.width, region.height)?;
        let mut output = RgbaBuffer::try_new(region.width, region.height)?;

        Self::render_over(Backdrop::Black, frame, next, &mut black)?;
        Self::render_over(Backdrop::White, frame, next, &mut white)?;

        difference_frames(&black, &white, &mut output);
        drop(black);
        drop(white);

        let output = if self.trim { trim(output) } else { output };

        self.encoder.encode(&output)?;

        Ok(output.size())
    }
}

impl OutputStage for CaptureOrchestrator {
    fn paint_output(&mut self, frame: &mut OutputFrame<'_>, mut next: NextOutput<'_>) -> bool {
        let Some(window) = self.request.target() else {
            return next.paint_output(frame);
        };

        {
            let _span = info_span!("[Capture]", window = window.0, screen = frame.screen.0)
                .entered();

            match self.capture(frame, &mut next) {
                Ok([width, height]) => info!("Captured window ({width}x{height})"),
                Err(e) => error!("Capture abandoned: {e}"),
            }
        }

        self.request.disarm();
        next.paint_output(frame)
    }
}

/// Capture pipeline error variants.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum CaptureError {
    /// A capture buffer could not be allocated.
    #[error("Failed to allocate capture buffers:\n{0}")]
    Allocation(#[from] AllocationError),

    /// The host could not read back a render.
    #[error(transparent)]
    Readback(#[from] ReadbackError),

    /// The capture could not be written.
    #[error("Failed to write the capture:\n{0}")]
    Encode(#[from] EncodeError),
}
