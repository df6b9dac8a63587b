use alloc::rc::Rc;
use core::cell::{Cell, RefCell};
use std::io;

use window_capture::{EncodeError, ImageEncoder, RgbaBuffer};

/// Keeps every capture in memory instead of writing it out.
///
/// Clones share the same recording, keep one to inspect captures after handing another
/// to the orchestrator.
#[derive(Clone, Debug, Default)]
pub struct RecordingEncoder {
    captures: Rc<RefCell<Vec<RgbaBuffer>>>,
    failing: Rc<Cell<bool>>,
}

impl RecordingEncoder {
    /// Create an empty recording.
    pub fn new() -> Self {
        Self::default()
    }

    /// Make subsequent encodes fail as if the output were unwritable.
    pub fn set_failing(&self, failing: bool) {
        self.failing.set(failing);
    }

    /// Every capture received so far.
    pub fn captures(&self) -> Vec<RgbaBuffer> {
        self.captures.borrow().clone()
    }

    /// Number of captures received.
    pub fn count(&self) -> usize {
        self.captures.borrow().len()
    }
}

impl ImageEncoder for RecordingEncoder {
    fn encode(&mut self, image: &RgbaBuffer) -> Result<(), EncodeError> {
        if self.failing.get() {
            return Err(EncodeError::CreateFile(io::Error::new(
                io::ErrorKind::PermissionDenied,
                "output is not writable",
            )));
        }

        self.captures.borrow_mut().push(image.clone());
        Ok(())
    }
}
