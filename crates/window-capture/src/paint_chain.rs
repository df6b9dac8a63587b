//! Ordered paint stages for one screen.
//!
//! Each stage receives a handle to the rest of the chain and decides if, and how often,
//! to continue down it. The last stage of the output chain paints every window through
//! the window chain, the last stage of the window chain asks the renderer to draw it.

use alloc::boxed::Box;

use tracing::debug;

use crate::host::{OutputFrame, WindowId};

/// Hook around painting a whole output.
pub trait OutputStage {
    /// Paint the output, call `next` to continue down the chain.
    fn paint_output(&mut self, frame: &mut OutputFrame<'_>, next: NextOutput<'_>) -> bool;
}

/// Hook around painting one window.
pub trait WindowStage {
    /// Paint the window, call `next` to continue down the chain.
    fn paint_window(
        &mut self,
        window: WindowId,
        frame: &mut OutputFrame<'_>,
        next: NextWindow<'_>,
    ) -> bool;
}

/// Handle identifying a registered stage.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct StageId(u64);

/// The remaining output stages.
pub struct NextOutput<'chain> {
    stages: &'chain mut [(StageId, Box<dyn OutputStage>)],
    windows: &'chain mut [(StageId, Box<dyn WindowStage>)],
}

impl NextOutput<'_> {
    /// Paint the output with the rest of the chain.
    pub fn paint_output(&mut self, frame: &mut OutputFrame<'_>) -> bool {
        match self.stages.split_first_mut() {
            Some(((_, stage), rest)) => stage.paint_output(
                frame,
                NextOutput {
                    stages: rest,
                    windows: &mut *self.windows,
                },
            ),

            None => {
                let mut status = false;
                for window in frame.renderer.stacking_order() {
                    let mut next = NextWindow {
                        stages: &mut *self.windows,
                    };
                    status |= next.paint_window(window, frame);
                }

                status
            }
        }
    }
}

/// The remaining window stages.
pub struct NextWindow<'chain> {
    stages: &'chain mut [(StageId, Box<dyn WindowStage>)],
}

impl NextWindow<'_> {
    /// Paint the window with the rest of the chain.
    pub fn paint_window(&mut self, window: WindowId, frame: &mut OutputFrame<'_>) -> bool {
        match self.stages.split_first_mut() {
            Some(((_, stage), rest)) => {
                stage.paint_window(window, frame, NextWindow { stages: rest })
            }
            None => frame.renderer.draw_window(window),
        }
    }
}

/// The paint stages of one screen.
#[derive(Default)]
pub struct PaintChain {
    outputs: Vec<(StageId, Box<dyn OutputStage>)>,
    windows: Vec<(StageId, Box<dyn WindowStage>)>,
    next_id: u64,
}

impl PaintChain {
    /// Create an empty chain.
    pub fn new() -> Self {
        Self::default()
    }

    fn allocate_id(&mut self) -> StageId {
        let id = StageId(self.next_id);
        self.next_id += 1;
        id
    }

    /// Register an output stage in front of the existing stages.
    pub fn register_output(&mut self, stage: Box<dyn OutputStage>) -> StageId {
        let id = self.allocate_id();
        self.outputs.insert(0, (id, stage));
        debug!("Registered output stage {id:?}");
        id
    }

    /// Register a window stage in front of the existing stages.
    pub fn register_window(&mut self, stage: Box<dyn WindowStage>) -> StageId {
        let id = self.allocate_id();
        self.windows.insert(0, (id, stage));
        debug!("Registered window stage {id:?}");
        id
    }

    /// Remove a stage, returns if it was registered.
    pub fn unregister(&mut self, id: StageId) -> bool {
        let before = self.outputs.len() + self.windows.len();
        self.outputs.retain(|(stage_id, _)| *stage_id != id);
        self.windows.retain(|(stage_id, _)| *stage_id != id);

        let removed = self.outputs.len() + self.windows.len() != before;
        if removed {
            debug!("Unregistered stage {id:?}");
        }
        removed
    }

    /// Number of registered output and window stages.
    pub fn len(&self) -> usize {
        self.outputs.len() + self.windows.len()
    }

    /// If no stages are registered.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Paint an output through every stage.
    pub fn paint_output(&mut self, frame: &mut OutputFrame<'_>) -> bool {
        NextOutput {
            stages: &mut self.outputs,
            windows: &mut self.windows,
        }
        .paint_output(frame)
    }

    /// Paint one window through every window stage.
    pub fn paint_window(&mut self, window: WindowId, frame: &mut OutputFrame<'_>) -> bool {
        NextWindow {
            stages: &mut self.windows,
        }
        .paint_window(window, frame)
    }
}
