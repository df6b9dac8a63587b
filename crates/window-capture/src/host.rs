//! Collaborators provided by the compositor hosting the capture.

use thiserror::Error;

use crate::{paint_chain::PaintChain, pixel::Rgba};

/// Identifies one screen of the host.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ScreenId(pub u32);

/// Opaque handle of a host window.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WindowId(pub u64);

/// A live window resolved by the host.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WindowInfo {
    /// The window.
    pub id: WindowId,
    /// The screen the window is on.
    pub screen: ScreenId,
}

/// The region of the framebuffer covered by an output.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct OutputRegion {
    /// Left edge.
    pub x: i32,
    /// Top edge.
    pub y: i32,
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl OutputRegion {
    /// Create a region.
    pub const fn new(x: i32, y: i32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Number of pixels in the region.
    pub fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }
}

/// Solid color drawn over the whole output as a known reference.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Backdrop {
    /// Opaque black.
    Black,
    /// Opaque white.
    White,
}

impl Backdrop {
    /// The backdrop color.
    pub fn color(self) -> Rgba {
        match self {
            Self::Black => Rgba::BLACK,
            Self::White => Rgba::WHITE,
        }
    }
}

/// The host's drawing facility for the output being painted.
pub trait Renderer {
    /// Draw a solid opaque overlay covering `region`.
    fn fill_output(&mut self, region: OutputRegion, backdrop: Backdrop);

    /// The windows on this output from bottom to top.
    fn stacking_order(&self) -> Vec<WindowId>;

    /// Composite one window into the framebuffer, returns if anything was drawn.
    fn draw_window(&mut self, window: WindowId) -> bool;

    /// Read back `region` as RGBA8 into `pixels`, top row first.
    ///
    /// `pixels` holds exactly `region.pixel_count()` pixels.
    fn read_pixels(&mut self, region: OutputRegion, pixels: &mut [Rgba])
    -> Result<(), ReadbackError>;
}

/// A host failure to read back rendered pixels.
#[derive(Debug, Error)]
#[error("Failed to read back {width}x{height} pixels:\n{reason}")]
pub struct ReadbackError {
    /// Width of the requested region.
    pub width: u32,
    /// Height of the requested region.
    pub height: u32,
    /// Host supplied reason.
    pub reason: String,
}

impl ReadbackError {
    /// Create a readback error for `region`.
    pub fn new<S: Into<String>>(region: OutputRegion, reason: S) -> Self {
        Self {
            width: region.width,
            height: region.height,
            reason: reason.into(),
        }
    }
}

/// One paint of one output.
pub struct OutputFrame<'renderer> {
    /// The screen being painted.
    pub screen: ScreenId,
    /// The output region.
    pub region: OutputRegion,
    /// Drawing facility for this paint.
    pub renderer: &'renderer mut dyn Renderer,
}

/// Display-level services of the host.
pub trait Host {
    /// Resolve a window handle to a live window.
    fn find_window(&self, handle: u64) -> Option<WindowInfo>;

    /// The paint chain of a screen.
    fn paint_chain_mut(&mut self, screen: ScreenId) -> Option<&mut PaintChain>;

    /// Ask the host to repaint the screen soon.
    fn damage_screen(&mut self, screen: ScreenId);
}
