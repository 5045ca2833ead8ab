//! Logging utilities for the Vasatey service.
//!
//! A single `tracing` subscriber is installed at start-up: a formatted stdout
//! layer, an optional daily-rolling file layer, and an `EnvFilter` that
//! `RUST_LOG` can override.

use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};
use vasatey_config::LoggingConfig;

/// Initialize the tracing subscriber from the logging configuration.
///
/// Returns the file writer guard when file logging is enabled; keep it alive
/// for the lifetime of the process or buffered lines are lost.
pub fn init(config: &LoggingConfig) -> Option<WorkerGuard> {
    let filter = build_filter(&config.level);

    let (file_layer, guard) = match config.directory.as_deref() {
        Some(directory) => {
            let appender = tracing_appender::rolling::daily(directory, &config.file_prefix);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = fmt::layer()
                .with_writer(writer)
                .with_ansi(false)
                .with_target(true);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    // try_init: tests and embedders may already have installed a subscriber
    let result = tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_target(true)
                .with_file(true)
                .with_line_number(true)
                .with_thread_ids(true),
        )
        .with(file_layer)
        .with(filter)
        .try_init();

    if result.is_ok() {
        info!("Logging initialized at level: {}", config.level);
    }
    guard
}

/// `RUST_LOG` wins; otherwise the configured level applies to the service
/// crates and HTTP tracing, and everything else logs warnings only.
fn build_filter(level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::try_new(format!("warn,vasatey={level},tower_http={level}"))
            .unwrap_or_else(|_| EnvFilter::new("info"))
    })
}
