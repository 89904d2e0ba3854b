//! Forwarding dispatcher for producer-side broker operations.
//!
//! [`ForwardProducer`] selects a pooled client for every call, issues the
//! operation against the requested broker and shapes the response. It never
//! retries: any transport failure is returned to the caller as
//! [`ForwardError::Transport`].

use std::{num::NonZeroUsize, sync::Arc, time::Duration};

use tracing::Instrument;

use crate::{
    config::ForwardConfig,
    error::{ForwardError, InvalidRequestShape, Result, TransportError},
    metrics::{self, Operation},
    pool::ClientPool,
    protocol::{
        ConsumerSendMsgBackRequestHeader,
        EndTransactionRequestHeader,
        HeartbeatData,
        RemotingCommand,
    },
    transport::{ClientFactory, TransportClient},
};

mod send;
mod send_back;
mod tracing_config;
mod tracing_helpers;

pub use send::{SendPath, apply_transaction_id, process_send_response};
pub use send_back::{AckDecision, AckStage, PendingAck, SendBackThenAck, SkipReason, decide_ack};
pub use tracing_config::TracingConfig;
use tracing_helpers::{
    emit_timing_event,
    end_transaction_span,
    heartbeat_span,
    record_result,
    send_back_span,
    start_timer,
};

/// Remark attached to every forwarded end-transaction request.
pub const END_TRANSACTION_REMARK: &str = "end transaction from rmq proxy";

/// Dispatches producer operations through a pool of transport clients.
///
/// `ForwardProducer` is `Send + Sync` whenever the client is, so a single
/// instance can be shared behind an [`Arc`] by any number of callers.
pub struct ForwardProducer<C> {
    pool: ClientPool<C>,
    default_timeout: Duration,
    tracing: TracingConfig,
}

impl<C: TransportClient> ForwardProducer<C> {
    /// Build the client pool from `config` and wrap it in a dispatcher.
    pub fn new<F>(config: &ForwardConfig, available_parallelism: NonZeroUsize, factory: &F) -> Self
    where
        F: ClientFactory<Client = C> + ?Sized,
    {
        Self::with_pool(ClientPool::build(config, available_parallelism, factory), config)
    }

    /// Wrap an existing pool, taking the timeout and tracing settings from
    /// `config`.
    #[must_use]
    pub fn with_pool(pool: ClientPool<C>, config: &ForwardConfig) -> Self {
        Self {
            pool,
            default_timeout: config.timeout(),
            tracing: config.tracing().clone(),
        }
    }

    /// The underlying client pool.
    #[must_use]
    pub fn pool(&self) -> &ClientPool<C> { &self.pool }

    /// Select the next pooled client.
    ///
    /// # Errors
    ///
    /// Returns [`ForwardError::PoolExhausted`] if the pool is empty.
    pub fn get_client(&self) -> Result<Arc<C>> { self.pool.get_client() }

    /// Number of pooled clients.
    #[must_use]
    pub fn client_num(&self) -> usize { self.pool.client_num() }

    /// Timeout used by operations without an explicit one.
    #[must_use]
    pub fn default_timeout(&self) -> Duration { self.default_timeout }

    /// Start every pooled client.
    ///
    /// # Errors
    ///
    /// Returns the first failure reported by a client's start hook.
    pub async fn start(&self) -> std::result::Result<(), TransportError> { self.pool.start().await }

    /// Shut down every pooled client.
    ///
    /// # Errors
    ///
    /// Returns the first failure reported by a client's shutdown hook.
    pub async fn shutdown(&self) -> std::result::Result<(), TransportError> {
        self.pool.shutdown().await
    }

    /// Forward a heartbeat using the default timeout.
    ///
    /// # Errors
    ///
    /// See [`Self::heartbeat_with_timeout`].
    pub async fn heartbeat(&self, addr: &str, heartbeat: &HeartbeatData) -> Result<i32> {
        self.heartbeat_with_timeout(addr, heartbeat, self.default_timeout)
            .await
    }

    /// Forward a heartbeat and return the broker's raw response code.
    ///
    /// # Errors
    ///
    /// Returns [`ForwardError::InvalidRequestShape`] for an empty address or
    /// zero timeout, [`ForwardError::PoolExhausted`] if no client is
    /// available and [`ForwardError::Transport`] if the call fails.
    pub async fn heartbeat_with_timeout(
        &self,
        addr: &str,
        heartbeat: &HeartbeatData,
        timeout: Duration,
    ) -> Result<i32> {
        let span = heartbeat_span(&self.tracing, addr);
        let timer = start_timer(self.tracing.heartbeat_timing);
        let result = async {
            validate_target(addr, timeout)?;
            let client = self.pool.get_client()?;
            Ok::<_, ForwardError>(client.send_heartbeat(addr, heartbeat, timeout).await?)
        }
        .instrument(span.clone())
        .await;
        finish(&span, timer, Operation::Heartbeat, &result);
        result
    }

    /// Forward a one-way end-transaction using the default timeout.
    ///
    /// # Errors
    ///
    /// See [`Self::end_transaction_with_timeout`].
    pub async fn end_transaction(&self, addr: &str, header: &EndTransactionRequestHeader) -> Result<()> {
        self.end_transaction_with_timeout(addr, header, self.default_timeout)
            .await
    }

    /// Forward a one-way end-transaction request.
    ///
    /// Success means the request was accepted for sending; the broker's
    /// commit or rollback outcome is never observed here.
    ///
    /// # Errors
    ///
    /// Returns [`ForwardError::InvalidRequestShape`] for an empty address or
    /// zero timeout, [`ForwardError::PoolExhausted`] if no client is
    /// available and [`ForwardError::Transport`] if the request could not be
    /// handed to the transport.
    pub async fn end_transaction_with_timeout(
        &self,
        addr: &str,
        header: &EndTransactionRequestHeader,
        timeout: Duration,
    ) -> Result<()> {
        let span = end_transaction_span(&self.tracing, addr);
        let timer = start_timer(self.tracing.end_transaction_timing);
        let result = async {
            validate_target(addr, timeout)?;
            let client = self.pool.get_client()?;
            client
                .end_transaction_oneway(addr, header, END_TRANSACTION_REMARK, timeout)
                .await?;
            Ok::<_, ForwardError>(())
        }
        .instrument(span.clone())
        .await;
        finish(&span, timer, Operation::EndTransaction, &result);
        result
    }

    /// Forward a send-back using the default timeout.
    ///
    /// # Errors
    ///
    /// See [`Self::send_message_back_with_timeout`].
    pub async fn send_message_back(
        &self,
        addr: &str,
        header: &ConsumerSendMsgBackRequestHeader,
    ) -> Result<RemotingCommand> {
        self.send_message_back_with_timeout(addr, header, self.default_timeout)
            .await
    }

    /// Ask the broker to redeliver a consumed message to its origin queue and
    /// return its raw response.
    ///
    /// A non-success response code is not an error here; inspect
    /// [`RemotingCommand::code`].
    ///
    /// # Errors
    ///
    /// Returns [`ForwardError::InvalidRequestShape`] for an empty address or
    /// zero timeout, [`ForwardError::PoolExhausted`] if no client is
    /// available and [`ForwardError::Transport`] if the call fails.
    pub async fn send_message_back_with_timeout(
        &self,
        addr: &str,
        header: &ConsumerSendMsgBackRequestHeader,
        timeout: Duration,
    ) -> Result<RemotingCommand> {
        let span = send_back_span(&self.tracing, addr);
        let timer = start_timer(self.tracing.send_back_timing);
        let result = async {
            validate_target(addr, timeout)?;
            let client = self.pool.get_client()?;
            Ok::<_, ForwardError>(client.send_back(addr, header, timeout).await?)
        }
        .instrument(span.clone())
        .await;
        finish(&span, timer, Operation::SendBack, &result);
        result
    }
}

impl<C> std::fmt::Debug for ForwardProducer<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ForwardProducer")
            .field("pool", &self.pool)
            .field("default_timeout", &self.default_timeout)
            .finish_non_exhaustive()
    }
}

/// Reject an empty address or zero timeout before touching the pool.
pub(crate) fn validate_target(addr: &str, timeout: Duration) -> Result<()> {
    if addr.is_empty() {
        return Err(InvalidRequestShape::EmptyAddress.into());
    }
    if timeout.is_zero() {
        return Err(InvalidRequestShape::NonPositiveTimeout.into());
    }
    Ok(())
}

/// Record the outcome of an operation on its span, timer and counters.
fn finish<T>(
    span: &tracing::Span,
    timer: Option<std::time::Instant>,
    operation: Operation,
    result: &Result<T>,
) {
    record_result(span, result);
    span.in_scope(|| emit_timing_event(timer));
    metrics::observe(operation, result);
}

#[cfg(test)]
mod tests;
