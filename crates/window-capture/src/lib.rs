//! # Window Capture
//! Captures a single window with its per-pixel transparency from a compositor that only
//! exposes opaque framebuffer readbacks.
//!
//! The window is rendered twice in one frame, once over a black backdrop and once over a
//! white backdrop. The difference between the two renders recovers each pixel's alpha
//! and straight color, the result is trimmed to the window's visible bounds and written
//! out as a PNG.
//!

extern crate alloc;

pub use config::Config;
pub use difference::difference_frames;
pub use encoder::{EncodeError, ImageEncoder, PngFileEncoder};
pub use host::{
    Backdrop, Host, OutputFrame, OutputRegion, ReadbackError, Renderer, ScreenId, WindowId,
    WindowInfo,
};
pub use orchestrator::{CaptureError, CaptureFilter, CaptureOrchestrator, CaptureRequest};
pub use paint_chain::{NextOutput, NextWindow, OutputStage, PaintChain, StageId, WindowStage};
pub use pixel::{Rgba, blend_pixel};
pub use plugin::{ActionOptions, OptionValue, PluginError, WindowCapture};
pub use rgba_buffer::{AllocationError, RgbaBuffer};
pub use trim::{BoundingBox, find_bounds, trim};

pub mod config;
mod difference;
mod encoder;
mod host;
mod orchestrator;
mod paint_chain;
mod pixel;
mod plugin;
mod rgba_buffer;
mod trim;
