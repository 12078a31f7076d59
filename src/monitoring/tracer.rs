/*!
 * Tracing Setup
 * Subscriber installation for the structured events the memory layer emits
 *
 * Environment variables:
 * - RUST_LOG: filter directives (default: info)
 * - MEMHANDLE_TRACE_JSON: `1` or `true` selects JSON output
 */

use tracing::info;
use tracing_subscriber::{
    fmt::format::FmtSpan, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter,
};

const JSON_ENV: &str = "MEMHANDLE_TRACE_JSON";
const DEFAULT_FILTER: &str = "info";

/// Output format of the fmt layer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TraceFormat {
    Compact,
    Json,
}

impl TraceFormat {
    /// Parse the value of `MEMHANDLE_TRACE_JSON`
    pub fn from_env_value(value: Option<&str>) -> Self {
        match value {
            Some("1") | Some("true") => TraceFormat::Json,
            _ => TraceFormat::Compact,
        }
    }

    fn from_env() -> Self {
        Self::from_env_value(std::env::var(JSON_ENV).ok().as_deref())
    }
}

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

/// Install the global subscriber
///
/// Returns an error if a global subscriber is already set.
pub fn init_tracing() -> Result<(), tracing_subscriber::util::TryInitError> {
    let format = TraceFormat::from_env();
    let registry = tracing_subscriber::registry().with(env_filter());

    match format {
        TraceFormat::Json => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_target(true)
                    .with_thread_ids(true)
                    .with_line_number(true)
                    .with_file(true)
                    .with_current_span(true)
                    .with_span_events(FmtSpan::CLOSE),
            )
            .try_init()?,
        TraceFormat::Compact => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(true)
                    .with_thread_ids(true)
                    .with_line_number(true)
                    .compact(),
            )
            .try_init()?,
    }

    info!(format = ?format, "Tracing initialized");
    Ok(())
}

/// Test-writer subscriber at `debug`
///
/// Fails with `TryInitError` when a subscriber is already installed, which
/// tests sharing one binary can safely ignore.
pub fn try_init_test_tracing() -> Result<(), tracing_subscriber::util::TryInitError> {
    tracing_subscriber::registry()
        .with(EnvFilter::new("debug"))
        .with(tracing_subscriber::fmt::layer().with_test_writer().compact())
        .try_init()
}
