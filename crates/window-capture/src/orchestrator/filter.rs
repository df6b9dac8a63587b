use tracing::trace;

use crate::{
    host::{OutputFrame, WindowId},
    paint_chain::{NextWindow, WindowStage},
};

use super::CaptureRequest;

/// Hides every window except the capture target while a capture is armed.
///
/// Inert while idle.
pub struct CaptureFilter {
    request: CaptureRequest,
}

impl CaptureFilter {
    /// Create a filter following `request`.
    pub fn new(request: CaptureRequest) -> Self {
        Self { request }
    }
}

impl WindowStage for CaptureFilter {
    fn paint_window(
        &mut self,
        window: WindowId,
        frame: &mut OutputFrame<'_>,
        mut next: NextWindow<'_>,
    ) -> bool {
        if self.request.target().is_none_or(|target| target == window) {
            return next.paint_window(window, frame);
        }

        trace!("Hiding window {} from capture", window.0);
        false
    }
}
