use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt;
use tracing_subscriber::prelude::*;

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// Human-readable compact output (foreground/debug runs).
    Human,
    /// Structured JSON output (daemon mode).
    Json,
}

/// Initialize the global tracing subscriber.
///
/// Call once at daemon startup. Respects `RUST_LOG` for filtering;
/// default filter is `vmkit=info,warn`.
pub fn init(format: LogFormat) {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("vmkit=info,warn"));

    match format {
        LogFormat::Human => {
            let subscriber = fmt::layer()
                .with_target(false)
                .with_thread_ids(false)
                .compact();
            tracing_subscriber::registry()
                .with(env_filter)
                .with(subscriber)
                .init();
        }
        LogFormat::Json => {
            let subscriber = fmt::layer().json().with_target(true);
            tracing_subscriber::registry()
                .with(env_filter)
                .with(subscriber)
                .init();
        }
    }
}
