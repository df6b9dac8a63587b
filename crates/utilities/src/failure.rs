//! Extensions for results whose failure is logged rather than propagated.

use core::fmt::Display;

use tracing::error;

/// Log an error with some context.
pub fn report<Err: Display>(error: Err, message: &str) {
    error!("{message}: {error}");
}

/// Handle a failure by logging it.
pub trait Failure<T> {
    /// Log the failure at `error` and continue with `None`.
    fn report(self, message: &str) -> Option<T>;
}

impl<T, E: Display> Failure<T> for Result<T, E> {
    fn report(self, message: &str) -> Option<T> {
        match self {
            Ok(value) => Some(value),
            Err(error) => {
                report(error, message);
                None
            }
        }
    }
}
