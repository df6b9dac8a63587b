use std::path::Path;

use thiserror::Error;
use tracing::{
    Level, info,
    subscriber::{SetGlobalDefaultError, set_global_default},
};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{Layer, fmt::format::FmtSpan, layer::SubscriberExt};

/// Install the global logger.
///
/// Logs go to stdout, and to a daily rolling file in `log_dir` if one is given. The
/// returned guards flush the writers when dropped and must be held until exit.
pub fn setup_logger(
    debug: bool,
    log_dir: Option<&Path>,
) -> Result<Vec<WorkerGuard>, LoggerError> {
    let level = if debug { Level::DEBUG } else { Level::INFO };
    let filter = tracing_subscriber::filter::Targets::new().with_default(level);

    let mut guards = Vec::with_capacity(2);

    // stdout logger
    let (std_writer, std_guard) = tracing_appender::non_blocking(std::io::stdout());
    guards.push(std_guard);
    let std_logger = tracing_subscriber::fmt::layer()
        .with_writer(std_writer)
        .with_ansi(false)
        .with_target(false)
        .with_span_events(FmtSpan::CLOSE);

    // file logger
    let file_logger = match log_dir {
        Some(dir) => {
            std::fs::create_dir_all(dir).map_err(LoggerError::LogDirectory)?;

            let appender = tracing_appender::rolling::daily(dir, "window-capture.log");
            let (file_writer, file_guard) = tracing_appender::non_blocking(appender);
            guards.push(file_guard);

            Some(
                tracing_subscriber::fmt::layer()
                    .with_writer(file_writer)
                    .with_ansi(false)
                    .with_target(true)
                    .boxed(),
            )
        }
        None => None,
    };

    // Register loggers
    let collector = tracing_subscriber::registry()
        .with(std_logger)
        .with(file_logger)
        .with(filter);

    set_global_default(collector)?;

    info!("Logger started");
    Ok(guards)
}

/// Logger setup error variants.
#[derive(Debug, Error)]
pub enum LoggerError {
    /// The log directory could not be created.
    #[error("Failed to create the log directory:\n{0}")]
    LogDirectory(#[source] std::io::Error),

    /// A global logger was already installed.
    #[error("Failed to install the logger:\n{0}")]
    SetGlobal(#[from] SetGlobalDefaultError),
}
