//! # devscribe-logging
//!
//! Logging for the devscribe observer.
//!
//! Two layers: `tracing` diagnostics for the process itself, and an
//! [`ObserveLogger`] that narrates observe-mode milestones to stderr in the
//! configured [`LogFormat`].

mod events;

pub use events::{LogFormat, ObserveEvent, ObserveLogger};

use std::path::Path;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Initialize tracing for the application
pub fn init_tracing(level: &str, format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    match format {
        LogFormat::Json => {
            tracing_subscriber::registry()
                .with(filter)
                .with(fmt::layer().json().with_target(false))
                .init();
        }
        LogFormat::Pretty | LogFormat::Compact => {
            tracing_subscriber::registry()
                .with(filter)
                .with(fmt::layer().with_target(false))
                .init();
        }
    }
}

/// Initialize tracing with an additional JSON file layer under `log_dir`.
/// The returned guard must be held for the process lifetime or buffered
/// lines are lost.
pub fn init_tracing_with_file(level: &str, format: LogFormat, log_dir: &Path) -> WorkerGuard {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let appender = tracing_appender::rolling::daily(log_dir, "devscribe.log");
    let (file_writer, guard) = tracing_appender::non_blocking(appender);

    match format {
        LogFormat::Json => {
            let file_layer = fmt::layer()
                .json()
                .with_target(false)
                .with_writer(file_writer);
            tracing_subscriber::registry()
                .with(filter)
                .with(fmt::layer().json().with_target(false))
                .with(file_layer)
                .init();
        }
        LogFormat::Pretty | LogFormat::Compact => {
            let file_layer = fmt::layer()
                .json()
                .with_target(false)
                .with_writer(file_writer);
            tracing_subscriber::registry()
                .with(filter)
                .with(fmt::layer().with_target(false))
                .with(file_layer)
                .init();
        }
    }

    guard
}
