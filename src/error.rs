//! Canonical error and result types for the crate.
//!
//! [`ForwardError`] is the single failure channel of every dispatcher
//! operation. Transport implementations report their own failures as
//! [`TransportError`], which the dispatcher wraps without retrying.

use std::{io, time::Duration};

use crate::transaction_id::TransactionIdError;

/// Errors emitted by [`crate::ForwardProducer`] operations.
#[derive(Debug, thiserror::Error)]
pub enum ForwardError {
    /// The client pool holds no clients to select from.
    #[error("no forwarding client available")]
    PoolExhausted,
    /// The underlying transport call failed.
    #[error("transport failure: {0}")]
    Transport(#[from] TransportError),
    /// The request was rejected before reaching the transport.
    #[error("invalid request: {0}")]
    InvalidRequestShape(#[from] InvalidRequestShape),
    /// A proxy transaction id could not be derived.
    #[error("transaction id error: {0}")]
    TransactionId(#[from] TransactionIdError),
    /// The spawned acknowledgement task panicked or was cancelled.
    #[error("acknowledgement task aborted")]
    AckAborted(#[source] tokio::task::JoinError),
    /// The acknowledgement could not be spawned because no Tokio runtime
    /// is driving the caller.
    #[error("no tokio runtime available to run the acknowledgement")]
    NoRuntime(#[source] tokio::runtime::TryCurrentError),
}

/// Request shapes rejected before any transport call is made.
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
pub enum InvalidRequestShape {
    /// An explicit timeout of zero was supplied.
    #[error("timeout must be a positive duration")]
    NonPositiveTimeout,
    /// A send carried no messages.
    #[error("at least one message is required")]
    EmptyMessages,
    /// The target broker address was empty.
    #[error("broker address must not be empty")]
    EmptyAddress,
}

/// Failures reported by a [`crate::TransportClient`] implementation.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// Socket-level error.
    #[error("i/o error: {0}")]
    Io(#[from] io::Error),
    /// The broker did not answer in time.
    #[error("request timed out after {0:?}")]
    Timeout(Duration),
    /// The broker answered with an error code.
    #[error("broker returned code {code}: {remark}")]
    Remote {
        /// Remoting response code.
        code: i32,
        /// Broker-supplied description.
        remark: String,
    },
    /// The connection closed before a response arrived.
    #[error("connection closed by broker")]
    Disconnected,
    /// Any other transport-specific failure.
    #[error("transport error")]
    Other(#[source] Box<dyn std::error::Error + Send + Sync>),
}

/// Canonical result alias used by dispatcher APIs.
pub type Result<T> = std::result::Result<T, ForwardError>;
