//! # Testing
//! A software compositor implementing the window capture host seams, for driving
//! captures without a real compositor.
//!

extern crate alloc;

pub use compositor::{Compositor, SimulatedWindow};
pub use logger::{LoggerError, setup_logger};
pub use recording_encoder::RecordingEncoder;

pub mod compositor;
mod logger;
mod recording_encoder;
