use tracing::{debug, instrument};
use utilities::DebugTime;

use crate::rgba_buffer::RgbaBuffer;

/// Inclusive edges of the visible content in a buffer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BoundingBox {
    /// First row containing a visible pixel.
    pub top: u32,
    /// First column containing a visible pixel.
    pub left: u32,
    /// Last column containing a visible pixel.
    pub right: u32,
    /// Last row containing a visible pixel.
    pub bottom: u32,
}

impl BoundingBox {
    /// If a buffer with these bounds is cropped.
    ///
    /// Content touching row 0 or column 0 is never cropped, and neither is content that
    /// is a single row or column thick.
    pub fn should_crop(&self) -> bool {
        self.top < self.bottom && self.left < self.right && self.top > 0 && self.left > 0
    }
}

fn row_visible(buffer: &RgbaBuffer, y: u32) -> bool {
    (0..buffer.width()).any(|x| buffer.pixel(x, y).is_visible())
}

fn column_visible(buffer: &RgbaBuffer, x: u32) -> bool {
    (0..buffer.height()).any(|y| buffer.pixel(x, y).is_visible())
}

/// Find the bounds of every pixel with non-zero alpha.
///
/// Each edge is scanned inward from the buffer's own edge, independently of the others.
/// Returns `None` if the buffer is fully transparent.
pub fn find_bounds(buffer: &RgbaBuffer) -> Option<BoundingBox> {
    let top = (0..buffer.height()).find(|&y| row_visible(buffer, y))?;
    let right = (0..buffer.width()).rev().find(|&x| column_visible(buffer, x))?;
    let bottom = (0..buffer.height()).rev().find(|&y| row_visible(buffer, y))?;
    let left = (0..buffer.width()).find(|&x| column_visible(buffer, x))?;

    Some(BoundingBox {
        top,
        left,
        right,
        bottom,
    })
}

/// Trim a buffer to the bounds of its visible content.
///
/// The buffer is returned untouched when it is fully transparent or when
/// [`BoundingBox::should_crop`] does not hold.
#[instrument(skip_all, fields(size = ?buffer.size()))]
pub fn trim(mut buffer: RgbaBuffer) -> RgbaBuffer {
    let _timing = DebugTime::start("Trimming capture");

    let Some(bounds) = find_bounds(&buffer) else {
        debug!("Capture is fully transparent, skipping trim");
        return buffer;
    };

    if !bounds.should_crop() {
        debug!("Not trimming capture with bounds {bounds:?}");
        return buffer;
    }

    debug!("Trimming capture to {bounds:?}");
    buffer.crop_in_place(
        bounds.left as usize,
        bounds.top as usize,
        bounds.right as usize,
        bounds.bottom as usize,
    );

    buffer
}
