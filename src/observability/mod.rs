// Observability infrastructure using tracing crate
// Structured JSON logs for every service; one span per handled request

use anyhow::{Context, Result};
use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter,
};

/// Initialize the observability system
/// Sets up structured logging to stdout with JSON formatting for machine parsing
pub fn init() -> Result<()> {
    let fmt_layer = fmt::layer()
        .json()
        .with_target(true)
        .with_current_span(true)
        .with_span_list(false)
        .with_thread_ids(true)
        .with_span_events(FmtSpan::NONE);

    // Example: RUST_LOG=marketplace=debug
    let filter_layer = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("marketplace=info"))
        .context("Failed to create tracing filter")?;

    tracing_subscriber::registry()
        .with(filter_layer)
        .with(fmt_layer)
        .try_init()
        .context("Failed to install tracing subscriber")?;

    Ok(())
}

/// Create a span for one request handled by `service`
#[inline]
pub fn request_span(service: &str, operation: &str) -> tracing::Span {
    tracing::info_span!(
        "request",
        service = service,
        operation = operation,
        request_id = %uuid::Uuid::new_v4(),
    )
}

/// Record how long a request took
#[inline]
pub fn record_request_duration(service: &str, operation: &str, duration: std::time::Duration) {
    tracing::debug!(
        service = service,
        operation = operation,
        duration_us = duration.as_micros() as u64,
        "request completed"
    );
}
