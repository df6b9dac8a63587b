//! Display-level capture state: per-screen requests and the capture action.

use alloc::boxed::Box;
use std::collections::HashMap;

use thiserror::Error;
use tracing::{debug, info, warn};

use crate::{
    encoder::ImageEncoder,
    host::{Host, ScreenId, WindowId, WindowInfo},
    orchestrator::{CaptureFilter, CaptureOrchestrator, CaptureRequest},
    paint_chain::StageId,
};

/// A value in an action's option bag.
#[derive(Clone, Debug, PartialEq)]
pub enum OptionValue {
    /// An integer.
    Int(i64),
    /// A string.
    String(String),
}

/// Named options passed to an action by the host's key or button binding.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ActionOptions {
    values: Vec<(String, OptionValue)>,
}

impl ActionOptions {
    /// Create an empty option bag.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an option.
    pub fn with<S: Into<String>>(mut self, name: S, value: OptionValue) -> Self {
        self.values.push((name.into(), value));
        self
    }

    /// The option named `name`.
    pub fn get(&self, name: &str) -> Option<&OptionValue> {
        self.values
            .iter()
            .find(|(option, _)| option == name)
            .map(|(_, value)| value)
    }

    /// The integer option named `name`, `None` if it is missing or not an integer.
    pub fn get_int(&self, name: &str) -> Option<i64> {
        match self.get(name)? {
            OptionValue::Int(value) => Some(*value),
            _ => None,
        }
    }
}

struct ScreenCapture {
    request: CaptureRequest,
    stages: [StageId; 2],
}

/// Window capture state for one display.
///
/// Each attached screen gets a [`CaptureOrchestrator`] and a [`CaptureFilter`] in its
/// paint chain, sharing that screen's [`CaptureRequest`]. At most one request is armed
/// across the display, a new request replaces the previous one.
pub struct WindowCapture {
    screens: HashMap<ScreenId, ScreenCapture>,
    trim: bool,
}

impl WindowCapture {
    /// Create the display state, `trim` controls if captures are trimmed.
    pub fn new(trim: bool) -> Self {
        Self {
            screens: HashMap::new(),
            trim,
        }
    }

    /// Register the capture stages into a screen's paint chain.
    pub fn attach_screen(
        &mut self,
        host: &mut dyn Host,
        screen: ScreenId,
        encoder: Box<dyn ImageEncoder>,
    ) -> Result<(), PluginError> {
        if self.screens.contains_key(&screen) {
            return Err(PluginError::AlreadyAttached(screen));
        }

        let chain = host
            .paint_chain_mut(screen)
            .ok_or(PluginError::UnknownScreen(screen))?;

        let request = CaptureRequest::new();
        let orchestrator = CaptureOrchestrator::new(request.clone(), encoder, self.trim);
        let filter = CaptureFilter::new(request.clone());

        let stages = [
            chain.register_output(Box::new(orchestrator)),
            chain.register_window(Box::new(filter)),
        ];

        self.screens.insert(screen, ScreenCapture { request, stages });
        debug!("Attached to screen {}", screen.0);

        Ok(())
    }

    /// Remove the capture stages from a screen, dropping any pending request.
    pub fn detach_screen(&mut self, host: &mut dyn Host, screen: ScreenId) -> bool {
        let Some(state) = self.screens.remove(&screen) else {
            return false;
        };

        match host.paint_chain_mut(screen) {
            Some(chain) => {
                for stage in state.stages {
                    chain.unregister(stage);
                }
            }
            None => warn!("Screen {} has no paint chain to detach from", screen.0),
        }

        debug!("Detached from screen {}", screen.0);
        true
    }

    /// Handle the capture key or button binding.
    ///
    /// The `window` option names the window to capture. A missing or non-integer option,
    /// or a handle the host cannot resolve, is ignored. The action is always reported as
    /// handled.
    pub fn capture_action(&mut self, host: &mut dyn Host, options: &ActionOptions) -> bool {
        let Some(handle) = options.get_int("window") else {
            debug!("Ignoring capture without a window option");
            return true;
        };

        let window = u64::try_from(handle)
            .ok()
            .and_then(|handle| host.find_window(handle));

        match window {
            Some(window) => {
                self.request_capture(host, window);
            }
            None => debug!("Ignoring capture of unknown window {handle}"),
        }

        true
    }

    /// Arm a capture of `window` and ask the host to repaint its screen.
    ///
    /// Returns `false` if the window's screen is not attached.
    pub fn request_capture(&mut self, host: &mut dyn Host, window: WindowInfo) -> bool {
        if !self.screens.contains_key(&window.screen) {
            warn!(
                "Cannot capture window {} on unattached screen {}",
                window.id.0, window.screen.0
            );
            return false;
        }

        for (screen, state) in &self.screens {
            if *screen == window.screen {
                state.request.arm(window.id);
            } else {
                state.request.disarm();
            }
        }

        info!(
            "Capture armed for window {} on screen {}",
            window.id.0, window.screen.0
        );
        host.damage_screen(window.screen);

        true
    }

    /// The pending capture, if any.
    pub fn pending(&self) -> Option<(ScreenId, WindowId)> {
        self.screens
            .iter()
            .find_map(|(screen, state)| state.request.target().map(|window| (*screen, window)))
    }
}

/// Plugin error variants.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum PluginError {
    /// The host has no such screen.
    #[error("Screen {0:?} does not exist")]
    UnknownScreen(ScreenId),

    /// The screen already has capture stages.
    #[error("Screen {0:?} is already attached")]
    AlreadyAttached(ScreenId),
}

#[cfg(test)]
mod test {
    use super::{ActionOptions, OptionValue};

    #[test]
    fn int_option_lookup() {
        let options = ActionOptions::new()
            .with("root", OptionValue::Int(1))
            .with("window", OptionValue::Int(0x2a))
            .with("name", OptionValue::String("capture".into()));

        assert_eq!(options.get_int("window"), Some(0x2a));
        assert_eq!(options.get_int("missing"), None);
        assert_eq!(options.get_int("name"), None);
    }
}
