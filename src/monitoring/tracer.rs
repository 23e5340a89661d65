/*!
 * Tracing
 * Structured logging setup and payload execution spans
 */

use crate::core::types::WorkId;
use crate::process::types::ItemClass;
use std::time::{Duration, Instant};
use tracing::{debug, info, span, warn, Level};
use tracing_subscriber::{fmt::format::FmtSpan, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Payload runs slower than this are reported at warn level
const SLOW_PAYLOAD: Duration = Duration::from_millis(100);

/// Initialize structured tracing
///
/// Environment variables:
/// - RUST_LOG: Set log level (default: info)
///
/// `json` switches to JSON-formatted output.
pub fn init_tracing(json: bool) {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let registry = tracing_subscriber::registry().with(env_filter);

    if json {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_target(true)
                    .with_thread_names(true)
                    .with_current_span(true)
                    .with_span_list(true),
            )
            .init();
        info!("Structured tracing initialized with JSON output");
    } else {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(true)
                    .with_thread_names(true)
                    .with_span_events(FmtSpan::CLOSE)
                    .compact(),
            )
            .init();
        info!("Structured tracing initialized");
    }
}

/// Span covering one payload execution
///
/// Records the outcome and duration on drop.
pub struct PayloadSpan {
    span: tracing::Span,
    start: Instant,
    id: WorkId,
}

impl PayloadSpan {
    pub fn new(id: WorkId, class: ItemClass, command: &str) -> Self {
        let span = span!(
            Level::DEBUG,
            "payload",
            id = id,
            class = ?class,
            command = command,
            duration_us = tracing::field::Empty,
            result = tracing::field::Empty,
        );

        let entered = span.enter();
        debug!(id, command, "payload started");
        drop(entered);

        Self {
            span,
            start: Instant::now(),
            id,
        }
    }

    /// Record the payload result
    pub fn record_result(&self, success: bool) {
        self.span
            .record("result", if success { "success" } else { "error" });
    }

    /// Enter the span context
    pub fn enter(&self) -> tracing::span::Entered<'_> {
        self.span.enter()
    }
}

impl Drop for PayloadSpan {
    fn drop(&mut self) {
        let duration = self.start.elapsed();
        let _entered = self.span.enter();
        self.span.record("duration_us", duration.as_micros() as u64);

        if duration > SLOW_PAYLOAD {
            warn!(
                id = self.id,
                duration_ms = duration.as_millis() as u64,
                slow = true,
                "slow payload"
            );
        } else {
            debug!(
                id = self.id,
                duration_us = duration.as_micros() as u64,
                "payload completed"
            );
        }
    }
}
