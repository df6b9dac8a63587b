use alloc::vec::Vec;

use thiserror::Error;

use crate::pixel::Rgba;

/// A row-major grid of RGBA pixels with no padding between rows, origin at the top left.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RgbaBuffer {
    width: u32,
    height: u32,
    pixels: Vec<Rgba>,
}

impl RgbaBuffer {
    /// Allocate a zeroed `width` × `height` buffer.
    ///
    /// Large outputs may not fit in memory, allocation failure is returned rather than
    /// aborting the process.
    pub fn try_new(width: u32, height: u32) -> Result<Self, AllocationError> {
        let length = usize::try_from(width)
            .ok()
            .zip(usize::try_from(height).ok())
            .and_then(|(width, height)| width.checked_mul(height))
            .filter(|length| length.checked_mul(size_of::<Rgba>()).is_some())
            .ok_or(AllocationError::Overflow { width, height })?;

        let mut pixels = Vec::new();
        pixels
            .try_reserve_exact(length)
            .map_err(|_| AllocationError::OutOfMemory { width, height })?;
        pixels.resize(length, Rgba::TRANSPARENT);

        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    /// Wrap existing pixels, returns `None` if the pixel count does not match the size.
    pub fn from_pixels(width: u32, height: u32, pixels: Vec<Rgba>) -> Option<Self> {
        let length = (width as usize).checked_mul(height as usize)?;
        if pixels.len() != length {
            return None;
        }

        Some(Self {
            width,
            height,
            pixels,
        })
    }

    /// Width in pixels.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height in pixels.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// `[width, height]`.
    pub fn size(&self) -> [u32; 2] {
        [self.width, self.height]
    }

    /// The pixels in row-major order.
    pub fn pixels(&self) -> &[Rgba] {
        &self.pixels
    }

    /// The pixels in row-major order.
    pub fn pixels_mut(&mut self) -> &mut [Rgba] {
        &mut self.pixels
    }

    /// The pixels as tightly packed RGBA8 bytes.
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.pixels)
    }

    /// The pixel at `x`, `y`.
    ///
    /// # Panics
    /// If the coordinate is outside the buffer.
    pub fn pixel(&self, x: u32, y: u32) -> Rgba {
        assert!(x < self.width && y < self.height, "pixel out of bounds");
        self.pixels[self.index(x as usize, y as usize)]
    }

    #[inline]
    pub(crate) fn index(&self, x: usize, y: usize) -> usize {
        y * self.width as usize + x
    }

    /// Shrink the buffer to the inclusive `left..=right`, `top..=bottom` region.
    ///
    /// Rows are compacted toward the start of the buffer, the destination of every copy
    /// is never past its source so the copy can happen in place.
    pub(crate) fn crop_in_place(&mut self, left: usize, top: usize, right: usize, bottom: usize) {
        let new_width = right - left + 1;
        let new_height = bottom - top + 1;

        for (row, y) in (top..=bottom).enumerate() {
            let source = self.index(left, y);
            self.pixels
                .copy_within(source..source + new_width, row * new_width);
        }

        self.pixels.truncate(new_width * new_height);
        self.width = new_width as u32;
        self.height = new_height as u32;
    }
}

/// Capture buffer allocation error variants.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AllocationError {
    /// The buffer size does not fit in the address space.
    #[error("A {width}x{height} buffer is too large to address")]
    Overflow {
        /// Requested width.
        width: u32,
        /// Requested height.
        height: u32,
    },

    /// The allocator could not reserve the buffer.
    #[error("Not enough memory for a {width}x{height} buffer")]
    OutOfMemory {
        /// Requested width.
        width: u32,
        /// Requested height.
        height: u32,
    },
}

#[cfg(test)]
mod test {
    use crate::pixel::Rgba;

    use super::{AllocationError, RgbaBuffer};

    #[test]
    fn new_buffer_is_transparent() {
        let buffer = RgbaBuffer::try_new(3, 2).unwrap();
        assert_eq!(buffer.size(), [3, 2]);
        assert_eq!(buffer.pixels().len(), 6);
        assert!(buffer.pixels().iter().all(|pixel| *pixel == Rgba::TRANSPARENT));
        assert_eq!(buffer.as_bytes().len(), 24);
    }

    #[test]
    fn oversized_buffer_fails() {
        let result = RgbaBuffer::try_new(u32::MAX, u32::MAX);

        #[cfg(target_pointer_width = "64")]
        assert!(matches!(
            result,
            Err(AllocationError::OutOfMemory { .. } | AllocationError::Overflow { .. })
        ));
        #[cfg(not(target_pointer_width = "64"))]
        assert!(matches!(result, Err(AllocationError::Overflow { .. })));
    }

    #[test]
    fn from_pixels_checks_length() {
        assert!(RgbaBuffer::from_pixels(2, 2, vec![Rgba::BLACK; 3]).is_none());
        assert!(RgbaBuffer::from_pixels(2, 2, vec![Rgba::BLACK; 4]).is_some());
    }

    #[test]
    fn crop_keeps_relative_order() {
        let pixels = (0..16).map(|value| Rgba::new(value, 0, 0, 255)).collect();
        let mut buffer = RgbaBuffer::from_pixels(4, 4, pixels).unwrap();

        buffer.crop_in_place(1, 1, 3, 2);

        assert_eq!(buffer.size(), [3, 2]);
        let reds: Vec<u8> = buffer.pixels().iter().map(|pixel| pixel.r).collect();
        assert_eq!(reds, [5, 6, 7, 9, 10, 11]);
    }
}
