//! # Structured Logging
//!
//! Initializes the `tracing` subscriber with either pretty or JSON output
//! and environment-based filtering via `RUST_LOG`.
//!
//! Log output goes to stderr so that stdout stays clean for the actual
//! command output — `lumen list` is meant to be piped.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// Human-readable output for interactive use.
    Pretty,
    /// Machine-parseable JSON lines for log aggregation.
    Json,
}

/// Initialize the global tracing subscriber.
///
/// Call this exactly once, early in `main()`. The `RUST_LOG` environment
/// variable overrides `default_level` when set, using the usual
/// `EnvFilter` directive syntax (e.g. `lumen_ledger=debug,lumen=info`).
pub fn init_logging(default_level: &str, format: LogFormat) {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    match format {
        LogFormat::Pretty => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(
                    fmt::layer()
                        .with_writer(std::io::stderr)
                        .with_target(true),
                )
                .init();
        }
        LogFormat::Json => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(
                    fmt::layer()
                        .json()
                        .with_writer(std::io::stderr)
                        .with_target(true),
                )
                .init();
        }
    }
}
