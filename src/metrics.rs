//! Metric helpers for `mqforward`.
//!
//! This module defines metric names and helper functions wrapping the
//! [`metrics`](https://docs.rs/metrics) crate. Without the `metrics` feature
//! every helper compiles to a no-op.

#[cfg(feature = "metrics")]
use metrics::counter;

/// Name of the counter tracking dispatched operations.
pub const REQUESTS_TOTAL: &str = "mqforward_requests_total";
/// Name of the counter tracking failed operations.
pub const ERRORS_TOTAL: &str = "mqforward_errors_total";
/// Name of the counter tracking proxy transaction ids issued.
pub const PREPARED_TRANSACTIONS_TOTAL: &str = "mqforward_prepared_transactions_total";
/// Name of the counter tracking acknowledgements skipped after send-back.
pub const ACKS_SKIPPED_TOTAL: &str = "mqforward_acks_skipped_total";

/// Dispatcher operation label.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Operation {
    Heartbeat,
    EndTransaction,
    SendMessage,
    SendBack,
    Ack,
}

impl Operation {
    /// Label value used for the `operation` dimension.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Operation::Heartbeat => "heartbeat",
            Operation::EndTransaction => "end_transaction",
            Operation::SendMessage => "send_message",
            Operation::SendBack => "send_back",
            Operation::Ack => "ack",
        }
    }
}

/// Record a dispatched operation.
pub fn inc_requests(operation: Operation) {
    #[cfg(feature = "metrics")]
    counter!(REQUESTS_TOTAL, "operation" => operation.as_str()).increment(1);
    #[cfg(not(feature = "metrics"))]
    let _ = operation;
}

/// Record a failed operation.
pub fn inc_errors(operation: Operation) {
    #[cfg(feature = "metrics")]
    counter!(ERRORS_TOTAL, "operation" => operation.as_str()).increment(1);
    #[cfg(not(feature = "metrics"))]
    let _ = operation;
}

/// Record a proxy transaction id issued for a prepared send.
pub fn inc_prepared_transactions() {
    #[cfg(feature = "metrics")]
    counter!(PREPARED_TRANSACTIONS_TOTAL).increment(1);
}

/// Record an acknowledgement skipped because send-back did not succeed.
pub fn inc_acks_skipped() {
    #[cfg(feature = "metrics")]
    counter!(ACKS_SKIPPED_TOTAL).increment(1);
}

/// Record `result` against `operation`: always a request, plus an error on
/// failure.
pub(crate) fn observe<T, E>(operation: Operation, result: &Result<T, E>) {
    inc_requests(operation);
    if result.is_err() {
        inc_errors(operation);
    }
}
