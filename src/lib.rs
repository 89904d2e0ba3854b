#![doc(html_root_url = "https://docs.rs/mqforward/latest")]
//! Forwarding dispatch layer between a messaging proxy and broker nodes.
//!
//! A [`ForwardProducer`] owns a fixed [`ClientPool`] of [`TransportClient`]s.
//! Each operation (send, heartbeat, end-transaction, send-back and
//! send-back-then-acknowledge) selects a client, issues the call against the
//! requested broker and shapes the response. Successful prepared sends are
//! stamped with an opaque [`TransactionId`] that routes the later
//! end-transaction call back to the same broker.

pub mod config;
pub mod error;
pub mod metrics;
pub mod pool;
pub mod producer;
pub mod protocol;
pub mod transaction_id;
pub mod transport;

#[cfg(test)]
mod test_helpers;

pub use config::ForwardConfig;
pub use error::{ForwardError, InvalidRequestShape, Result, TransportError};
pub use pool::ClientPool;
pub use producer::{
    AckDecision,
    AckStage,
    ForwardProducer,
    PendingAck,
    SendBackThenAck,
    SendPath,
    SkipReason,
    TracingConfig,
    apply_transaction_id,
    decide_ack,
    process_send_response,
};
pub use transaction_id::{TransactionId, TransactionIdError};
pub use transport::{ClientFactory, TransportClient, TransportResult};
