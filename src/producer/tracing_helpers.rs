//! Span and timing helpers for forwarding operations.
//!
//! Span creation lives here so the dispatcher methods only decide what to
//! record, not how.

use std::time::Instant;

use tracing::{Level, Span};

use super::tracing_config::TracingConfig;

/// Create a tracing span at a dynamically selected level.
///
/// Each branch calls the corresponding `tracing::<level>_span!` macro so the
/// span metadata stays static per branch while the branch choice is dynamic.
macro_rules! dynamic_span {
    ($level:expr, $name:expr $(, $($field:tt)*)?) => {
        match $level {
            Level::ERROR => tracing::error_span!($name $(, $($field)*)?),
            Level::WARN  => tracing::warn_span!($name $(, $($field)*)?),
            Level::INFO  => tracing::info_span!($name $(, $($field)*)?),
            Level::DEBUG => tracing::debug_span!($name $(, $($field)*)?),
            Level::TRACE => tracing::trace_span!($name $(, $($field)*)?),
        }
    };
}

#[expect(
    clippy::cognitive_complexity,
    reason = "complexity from dynamic_span! macro expansion"
)]
pub(crate) fn heartbeat_span(config: &TracingConfig, addr: &str) -> Span {
    dynamic_span!(
        config.heartbeat_level,
        "forward.heartbeat",
        broker.addr = addr,
        result = tracing::field::Empty
    )
}

#[expect(
    clippy::cognitive_complexity,
    reason = "complexity from dynamic_span! macro expansion"
)]
pub(crate) fn end_transaction_span(config: &TracingConfig, addr: &str) -> Span {
    dynamic_span!(
        config.end_transaction_level,
        "forward.end_transaction",
        broker.addr = addr,
        result = tracing::field::Empty
    )
}

/// Span for `send_message`. `path` and `result` are recorded once known.
#[expect(
    clippy::cognitive_complexity,
    reason = "complexity from dynamic_span! macro expansion"
)]
pub(crate) fn send_span(
    config: &TracingConfig,
    addr: &str,
    broker_name: &str,
    message_count: usize,
) -> Span {
    dynamic_span!(
        config.send_level,
        "forward.send_message",
        broker.addr = addr,
        broker.name = broker_name,
        message.count = message_count,
        path = tracing::field::Empty,
        result = tracing::field::Empty
    )
}

#[expect(
    clippy::cognitive_complexity,
    reason = "complexity from dynamic_span! macro expansion"
)]
pub(crate) fn send_back_span(config: &TracingConfig, addr: &str) -> Span {
    dynamic_span!(
        config.send_back_level,
        "forward.send_back",
        broker.addr = addr,
        result = tracing::field::Empty
    )
}

/// Span for the acknowledgement issued after a successful send-back.
#[expect(
    clippy::cognitive_complexity,
    reason = "complexity from dynamic_span! macro expansion"
)]
pub(crate) fn ack_span(config: &TracingConfig, addr: &str) -> Span {
    dynamic_span!(
        config.ack_level,
        "forward.ack",
        broker.addr = addr,
        result = tracing::field::Empty
    )
}

/// Start a timer if `enabled`.
pub(crate) fn start_timer(enabled: bool) -> Option<Instant> { enabled.then(Instant::now) }

/// Emit `elapsed_us` at `DEBUG` level when timing was started.
pub(crate) fn emit_timing_event(start: Option<Instant>) {
    if let Some(start) = start {
        let elapsed_us = start.elapsed().as_micros();
        tracing::debug!(elapsed_us = elapsed_us, "operation.timing");
    }
}

/// Record `ok` or `err` on the span's `result` field.
pub(crate) fn record_result<T, E>(span: &Span, result: &Result<T, E>) {
    span.record("result", if result.is_ok() { "ok" } else { "err" });
}
