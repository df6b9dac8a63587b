use alloc::rc::Rc;
use core::cell::Cell;

use crate::host::WindowId;

/// The outstanding capture request of one screen.
///
/// Clones share the same request, the orchestrator and its window filter each hold one.
/// Everything runs on the render thread so no locking is needed.
#[derive(Clone, Debug, Default)]
pub struct CaptureRequest {
    target: Rc<Cell<Option<WindowId>>>,
}

impl CaptureRequest {
    /// Create an idle request.
    pub fn new() -> Self {
        Self::default()
    }

    /// Arm a capture of `window`, replacing any pending target.
    pub fn arm(&self, window: WindowId) {
        self.target.set(Some(window));
    }

    /// Return to idle.
    pub fn disarm(&self) {
        self.target.set(None);
    }

    /// The armed window, if any.
    pub fn target(&self) -> Option<WindowId> {
        self.target.get()
    }

    /// If a capture is pending.
    pub fn is_armed(&self) -> bool {
        self.target().is_some()
    }
}
