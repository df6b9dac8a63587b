//! # Utilities
//! Small helpers shared by the window capture crates.
//!

pub use failure::Failure;
pub use timing::{DebugTime, display_duration};

pub mod failure;
pub mod timing;
