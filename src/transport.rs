//! Capabilities supplied by the transport layer.
//!
//! The dispatcher never opens connections itself. It drives a pool of
//! [`TransportClient`]s built by a [`ClientFactory`]; connection lifecycle,
//! serialization and wire-level retries all belong to the implementation.

use std::time::Duration;

use async_trait::async_trait;

use crate::{
    error::TransportError,
    protocol::{
        AckMessageRequestHeader,
        AckResult,
        ConsumerSendMsgBackRequestHeader,
        EndTransactionRequestHeader,
        HeartbeatData,
        Message,
        RemotingCommand,
        SendMessageRequestHeader,
        SendResult,
    },
};

/// Result type returned by transport calls.
pub type TransportResult<T> = Result<T, TransportError>;

/// A client bound to one logical identity that talks to broker nodes.
///
/// Implementations must tolerate concurrent calls: the pool hands the same
/// client to any number of callers at once.
#[async_trait]
pub trait TransportClient: Send + Sync + 'static {
    /// Send exactly one message.
    async fn send_single(
        &self,
        addr: &str,
        broker_name: &str,
        message: &Message,
        header: &SendMessageRequestHeader,
        timeout: Duration,
    ) -> TransportResult<SendResult>;

    /// Send two or more messages as one batch.
    async fn send_batch(
        &self,
        addr: &str,
        broker_name: &str,
        messages: &[Message],
        header: &SendMessageRequestHeader,
        timeout: Duration,
    ) -> TransportResult<SendResult>;

    /// Send a heartbeat and return the raw response code.
    async fn send_heartbeat(
        &self,
        addr: &str,
        heartbeat: &HeartbeatData,
        timeout: Duration,
    ) -> TransportResult<i32>;

    /// Issue a one-way end-transaction request.
    ///
    /// Completion means the request was accepted for sending, not that the
    /// broker committed it.
    async fn end_transaction_oneway(
        &self,
        addr: &str,
        header: &EndTransactionRequestHeader,
        remark: &str,
        timeout: Duration,
    ) -> TransportResult<()>;

    /// Ask the broker to redeliver a consumed message to its origin.
    async fn send_back(
        &self,
        addr: &str,
        header: &ConsumerSendMsgBackRequestHeader,
        timeout: Duration,
    ) -> TransportResult<RemotingCommand>;

    /// Acknowledge a popped message.
    async fn ack(
        &self,
        addr: &str,
        header: &AckMessageRequestHeader,
        timeout: Duration,
    ) -> TransportResult<AckResult>;

    /// Called once when the owning pool starts.
    async fn start(&self) -> TransportResult<()> { Ok(()) }

    /// Called once when the owning pool shuts down.
    async fn shutdown(&self) -> TransportResult<()> { Ok(()) }
}

/// Builds transport clients for the pool.
pub trait ClientFactory {
    /// Client type produced by this factory.
    type Client: TransportClient;

    /// Create a client identified by `name` running `worker_threads` workers.
    fn create(&self, name: &str, worker_threads: usize) -> Self::Client;
}

impl<F, C> ClientFactory for F
where
    F: Fn(&str, usize) -> C,
    C: TransportClient,
{
    type Client = C;

    fn create(&self, name: &str, worker_threads: usize) -> C { self(name, worker_threads) }
}
