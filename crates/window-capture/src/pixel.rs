use bytemuck::{Pod, Zeroable};

/// An 8-bit RGBA pixel.
///
/// Captured samples use the same layout as the reconstructed output, the alpha channel
/// of a raw sample is ignored.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Pod, Zeroable)]
pub struct Rgba {
    /// Red channel.
    pub r: u8,
    /// Green channel.
    pub g: u8,
    /// Blue channel.
    pub b: u8,
    /// Alpha channel.
    pub a: u8,
}

impl Rgba {
    /// A fully transparent black pixel.
    pub const TRANSPARENT: Self = Self::new(0, 0, 0, 0);

    /// Opaque black.
    pub const BLACK: Self = Self::new(0, 0, 0, 255);

    /// Opaque white.
    pub const WHITE: Self = Self::new(255, 255, 255, 255);

    /// Create a new pixel.
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// If the pixel has any coverage.
    #[inline]
    pub const fn is_visible(self) -> bool {
        self.a != 0
    }
}

/// Clamp a recovered channel into `0..=255`.
#[inline]
fn in_range(value: u32) -> u8 {
    value.min(255) as u8
}

/// Order one channel so the black sample is never brighter than the white sample.
#[inline]
fn ordered(black: u8, white: u8) -> (u32, u32) {
    if black > white {
        (u32::from(white), u32::from(black))
    } else {
        (u32::from(black), u32::from(white))
    }
}

/// Recover the straight color and alpha of a pixel from its renders over a black and a
/// white backdrop.
///
/// Alpha is `255` minus the mean channel difference between the two renders. All
/// divisions truncate rather than round.
pub fn blend_pixel(black: Rgba, white: Rgba) -> Rgba {
    let (rb, rw) = ordered(black.r, white.r);
    let (gb, gw) = ordered(black.g, white.g);
    let (bb, bw) = ordered(black.b, white.b);

    let alpha = 255 - (rw + gw + bw - rb - gb - bb) / 3;

    if alpha < 1 {
        Rgba::TRANSPARENT
    } else if alpha > 254 {
        Rgba::new(rb as u8, gb as u8, bb as u8, 255)
    } else {
        Rgba::new(
            in_range(255 * rb / alpha),
            in_range(255 * gb / alpha),
            in_range(255 * bb / alpha),
            alpha as u8,
        )
    }
}

#[cfg(test)]
mod test {
    use super::{Rgba, blend_pixel};

    const LEVELS: [u8; 6] = [0, 1, 127, 128, 254, 255];

    /// Composite a straight color over a grey backdrop with integer "over" blending.
    fn over(color: u8, alpha: u8, backdrop: u8) -> u8 {
        let color = u32::from(color);
        let alpha = u32::from(alpha);
        let backdrop = u32::from(backdrop);

        ((color * alpha + backdrop * (255 - alpha)) / 255) as u8
    }

    fn composite(pixel: Rgba, backdrop: u8) -> Rgba {
        Rgba::new(
            over(pixel.r, pixel.a, backdrop),
            over(pixel.g, pixel.a, backdrop),
            over(pixel.b, pixel.a, backdrop),
            255,
        )
    }

    fn assert_channel(recovered: u8, expected: u8, alpha: u8) {
        let tolerance = 255 / u32::from(alpha) + 1;
        let error = u32::from(recovered.abs_diff(expected));
        assert!(
            error <= tolerance,
            "channel {recovered} too far from {expected} at alpha {alpha}"
        );
    }

    #[test]
    fn recovers_composited_pixels() {
        for &a in &LEVELS {
            for &r in &LEVELS {
                for &g in &LEVELS {
                    for &b in &LEVELS {
                        let source = Rgba::new(r, g, b, a);
                        let recovered = blend_pixel(composite(source, 0), composite(source, 255));

                        if a == 0 {
                            assert_eq!(recovered, Rgba::TRANSPARENT);
                            continue;
                        }

                        assert!(
                            recovered.a.abs_diff(a) <= 1,
                            "alpha {} too far from {a}",
                            recovered.a
                        );
                        assert_channel(recovered.r, r, a);
                        assert_channel(recovered.g, g, a);
                        assert_channel(recovered.b, b, a);
                    }
                }
            }
        }
    }

    #[test]
    fn random_pixels() {
        for _ in 0..2048 {
            let source = Rgba::new(
                rand::random(),
                rand::random(),
                rand::random(),
                rand::random_range(128..=255),
            );
            let recovered = blend_pixel(composite(source, 0), composite(source, 255));

            assert!(recovered.a.abs_diff(source.a) <= 1);
            assert_channel(recovered.r, source.r, source.a);
            assert_channel(recovered.g, source.g, source.a);
            assert_channel(recovered.b, source.b, source.a);
        }
    }

    #[test]
    fn zero_alpha_is_transparent_black() {
        let recovered = blend_pixel(Rgba::new(0, 0, 0, 255), Rgba::new(255, 255, 255, 255));
        assert_eq!(recovered, Rgba::TRANSPARENT);
    }

    #[test]
    fn full_alpha_keeps_black_sample() {
        let black = Rgba::new(12, 200, 99, 17);
        let recovered = blend_pixel(black, black);
        assert_eq!(recovered, Rgba::new(12, 200, 99, 255));
    }

    #[test]
    fn inverted_channels_are_swapped() {
        // Red is inverted, the swap makes both samples identical to the ordered pair.
        let ordered = blend_pixel(Rgba::new(10, 10, 10, 0), Rgba::new(40, 40, 40, 0));
        let inverted = blend_pixel(Rgba::new(40, 10, 10, 0), Rgba::new(10, 40, 40, 0));
        assert_eq!(ordered, inverted);
        assert_eq!(ordered, Rgba::new(11, 11, 11, 225));
    }

    #[test]
    fn mean_difference_truncates() {
        // Differences of 1, 1, 0 sum to 2, which truncates to 0 after dividing by 3.
        let recovered = blend_pixel(Rgba::new(5, 5, 5, 0), Rgba::new(6, 6, 5, 0));
        assert_eq!(recovered, Rgba::new(5, 5, 5, 255));

        // Differences of 3, 3, 3 give alpha 252 and 255 * 100 / 252 = 101.
        let recovered = blend_pixel(Rgba::new(100, 100, 100, 0), Rgba::new(103, 103, 103, 0));
        assert_eq!(recovered, Rgba::new(101, 101, 101, 252));
    }

    #[test]
    fn recovered_color_is_clamped() {
        let recovered = blend_pixel(Rgba::new(0, 0, 200, 0), Rgba::new(254, 255, 255, 0));
        // Differences 254, 255, 55 sum to 564, 564 / 3 = 188, alpha = 67.
        // Blue is 255 * 200 / 67 = 761 before the clamp.
        assert_eq!(recovered.a, 67);
        assert_eq!(recovered.b, 255);
        assert_eq!(recovered.r, 0);
    }
}
