use tracing::instrument;
use utilities::DebugTime;

use crate::{pixel::blend_pixel, rgba_buffer::RgbaBuffer};

/// Reconstruct every pixel of `output` from the matching pixels of the black and white
/// backdrop renders.
///
/// Pixels are visited in row-major order and do not depend on each other.
///
/// # Panics
/// If the three buffers are not the same size.
#[instrument(skip_all, fields(size = ?output.size()))]
pub fn difference_frames(black: &RgbaBuffer, white: &RgbaBuffer, output: &mut RgbaBuffer) {
    assert_eq!(black.size(), white.size(), "backdrop renders differ in size");
    assert_eq!(black.size(), output.size(), "output differs in size");

    let _timing = DebugTime::start("Blending backdrop renders");

    output
        .pixels_mut()
        .iter_mut()
        .zip(black.pixels().iter().zip(white.pixels()))
        .for_each(|(pixel, (&black, &white))| *pixel = blend_pixel(black, white));
}

#[cfg(test)]
mod test {
    use crate::{pixel::Rgba, rgba_buffer::RgbaBuffer};

    use super::difference_frames;

    #[test]
    fn each_pixel_is_blended_in_place() {
        let black = RgbaBuffer::from_pixels(
            3,
            1,
            vec![Rgba::BLACK, Rgba::new(200, 0, 0, 255), Rgba::new(50, 50, 50, 255)],
        )
        .unwrap();
        let white = RgbaBuffer::from_pixels(
            3,
            1,
            vec![Rgba::WHITE, Rgba::new(200, 0, 0, 255), Rgba::new(177, 177, 177, 255)],
        )
        .unwrap();
        let mut output = RgbaBuffer::try_new(3, 1).unwrap();

        difference_frames(&black, &white, &mut output);

        assert_eq!(
            output.pixels(),
            [
                Rgba::TRANSPARENT,
                Rgba::new(200, 0, 0, 255),
                Rgba::new(99, 99, 99, 128),
            ]
        );
    }

    #[test]
    fn raw_alpha_is_ignored() {
        let black = RgbaBuffer::from_pixels(1, 1, vec![Rgba::new(10, 20, 30, 0)]).unwrap();
        let white = RgbaBuffer::from_pixels(1, 1, vec![Rgba::new(10, 20, 30, 99)]).unwrap();
        let mut output = RgbaBuffer::try_new(1, 1).unwrap();

        difference_frames(&black, &white, &mut output);

        assert_eq!(output.pixel(0, 0), Rgba::new(10, 20, 30, 255));
    }

    #[test]
    #[should_panic(expected = "backdrop renders differ in size")]
    fn mismatched_sizes_panic() {
        let black = RgbaBuffer::try_new(2, 2).unwrap();
        let white = RgbaBuffer::try_new(2, 3).unwrap();
        let mut output = RgbaBuffer::try_new(2, 2).unwrap();

        difference_frames(&black, &white, &mut output);
    }
}
