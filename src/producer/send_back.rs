//! Send-back followed by a conditional acknowledgement.
//!
//! The composite operation runs as a two-state machine:
//!
//! ```text
//! SendingBack ──(failed or non-success code)──▶ Skipped
//!      │
//!      └──────(success code)──────────────────▶ Acknowledging
//! ```
//!
//! The caller receives the send-back response as soon as it is known. The
//! acknowledgement, when issued, completes on its own timeline and is handed
//! back as a separate [`PendingAck`].

use std::{
    fmt,
    future::{self, Future},
    pin::Pin,
    task::{Context, Poll},
    time::Duration,
};

use log::warn;
use tokio::task::JoinHandle;
use tracing::Instrument;

use super::{
    ForwardProducer,
    finish,
    tracing_helpers::{ack_span, start_timer},
};
use crate::{
    error::{ForwardError, Result},
    metrics::{self, Operation},
    protocol::{
        AckMessageRequestHeader,
        AckResult,
        ConsumerSendMsgBackRequestHeader,
        RemotingCommand,
    },
    transport::TransportClient,
};

/// Why the acknowledgement was not issued.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SkipReason {
    /// The send-back call itself failed.
    SendBackFailed,
    /// The broker answered with a non-success code.
    ResponseCode(i32),
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SendBackFailed => f.write_str("send-back failed"),
            Self::ResponseCode(code) => write!(f, "send-back returned code {code}"),
        }
    }
}

/// Transition taken once the send-back has completed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AckDecision {
    /// Issue the acknowledgement.
    Issue,
    /// Do not acknowledge.
    Skip(SkipReason),
}

/// Decide whether a completed send-back should be acknowledged.
///
/// Only a send-back that completed with [`crate::protocol::ResponseCode::SUCCESS`]
/// leads to an acknowledgement.
///
/// # Examples
///
/// ```
/// use mqforward::{
///     AckDecision,
///     ForwardError,
///     SkipReason,
///     decide_ack,
///     protocol::{RemotingCommand, ResponseCode},
/// };
///
/// let ok: Result<_, ForwardError> = Ok(RemotingCommand::response(ResponseCode::SUCCESS, None));
/// assert_eq!(decide_ack(&ok), AckDecision::Issue);
///
/// let busy: Result<_, ForwardError> = Ok(RemotingCommand::response(ResponseCode::SYSTEM_BUSY, None));
/// assert_eq!(
///     decide_ack(&busy),
///     AckDecision::Skip(SkipReason::ResponseCode(ResponseCode::SYSTEM_BUSY))
/// );
/// ```
pub fn decide_ack<E>(outcome: &std::result::Result<RemotingCommand, E>) -> AckDecision {
    match outcome {
        Err(_) => AckDecision::Skip(SkipReason::SendBackFailed),
        Ok(response) if response.is_success() => AckDecision::Issue,
        Ok(response) => AckDecision::Skip(SkipReason::ResponseCode(response.code)),
    }
}

/// An acknowledgement issued after a successful send-back.
///
/// The acknowledgement runs as its own task: dropping this handle does not
/// cancel it. When no Tokio runtime was available to spawn the task, the
/// handle resolves immediately to [`ForwardError::NoRuntime`].
#[derive(Debug)]
pub struct PendingAck {
    inner: PendingAckInner,
}

#[derive(Debug)]
enum PendingAckInner {
    Spawned(JoinHandle<Result<AckResult>>),
    Failed(future::Ready<Result<AckResult>>),
}

impl PendingAck {
    /// Whether the acknowledgement has completed.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        match &self.inner {
            PendingAckInner::Spawned(handle) => handle.is_finished(),
            PendingAckInner::Failed(_) => true,
        }
    }
}

impl Future for PendingAck {
    type Output = Result<AckResult>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        match &mut self.inner {
            PendingAckInner::Spawned(handle) => Pin::new(handle)
                .poll(cx)
                .map(|joined| joined.map_err(ForwardError::AckAborted).and_then(|ack| ack)),
            PendingAckInner::Failed(ready) => Pin::new(ready).poll(cx),
        }
    }
}

/// State reached by the acknowledgement half of the composite operation.
#[derive(Debug)]
pub enum AckStage {
    /// The send-back answered with a non-success code; nothing was issued.
    Skipped(SkipReason),
    /// The acknowledgement was issued and is in flight.
    Issued(PendingAck),
}

/// Outcome of [`ForwardProducer::send_message_back_then_ack_org`].
///
/// `response` is the primary result and is available immediately. `ack`
/// carries the secondary acknowledgement, if one was issued.
#[derive(Debug)]
pub struct SendBackThenAck {
    /// Raw send-back response.
    pub response: RemotingCommand,
    /// Acknowledgement stage.
    pub ack: AckStage,
}

impl SendBackThenAck {
    /// Whether an acknowledgement was issued.
    #[must_use]
    pub fn ack_issued(&self) -> bool { matches!(self.ack, AckStage::Issued(_)) }

    /// Split into the send-back response and the pending acknowledgement.
    #[must_use]
    pub fn into_parts(self) -> (RemotingCommand, Option<PendingAck>) {
        match self.ack {
            AckStage::Issued(pending) => (self.response, Some(pending)),
            AckStage::Skipped(_) => (self.response, None),
        }
    }
}

impl<C: TransportClient> ForwardProducer<C> {
    /// Send back and conditionally acknowledge using the default timeout.
    ///
    /// # Errors
    ///
    /// See [`Self::send_message_back_then_ack_org_with_timeout`].
    pub async fn send_message_back_then_ack_org(
        &self,
        addr: &str,
        send_back_header: &ConsumerSendMsgBackRequestHeader,
        ack_header: &AckMessageRequestHeader,
    ) -> Result<SendBackThenAck> {
        self.send_message_back_then_ack_org_with_timeout(
            addr,
            send_back_header,
            ack_header,
            self.default_timeout,
        )
        .await
    }

    /// Redeliver a consumed message to its origin, then acknowledge the
    /// original only if the redelivery succeeded.
    ///
    /// The acknowledgement is never issued before the send-back has
    /// completed with a success code. It is spawned on the current Tokio
    /// runtime; without one the returned [`PendingAck`] resolves to
    /// [`ForwardError::NoRuntime`] and no acknowledgement is sent.
    ///
    /// # Errors
    ///
    /// Returns any error from [`Self::send_message_back_with_timeout`]; in
    /// that case no acknowledgement is issued. Failures of the
    /// acknowledgement itself surface through the [`PendingAck`].
    pub async fn send_message_back_then_ack_org_with_timeout(
        &self,
        addr: &str,
        send_back_header: &ConsumerSendMsgBackRequestHeader,
        ack_header: &AckMessageRequestHeader,
        timeout: Duration,
    ) -> Result<SendBackThenAck> {
        let outcome = self
            .send_message_back_with_timeout(addr, send_back_header, timeout)
            .await;
        match decide_ack(&outcome) {
            AckDecision::Skip(reason) => {
                warn!("skipping acknowledgement: broker_addr={addr}, reason={reason}");
                metrics::inc_acks_skipped();
                let response = outcome?;
                Ok(SendBackThenAck {
                    response,
                    ack: AckStage::Skipped(reason),
                })
            }
            AckDecision::Issue => {
                let response = outcome?;
                let pending = self.spawn_ack(addr, ack_header, timeout);
                Ok(SendBackThenAck {
                    response,
                    ack: AckStage::Issued(pending),
                })
            }
        }
    }

    fn spawn_ack(&self, addr: &str, header: &AckMessageRequestHeader, timeout: Duration) -> PendingAck {
        let span = ack_span(&self.tracing, addr);
        let timer = start_timer(self.tracing.ack_timing);
        let runtime = match tokio::runtime::Handle::try_current() {
            Ok(runtime) => runtime,
            Err(err) => {
                warn!("cannot spawn acknowledgement: broker_addr={addr}, error={err}");
                let result: Result<AckResult> = Err(ForwardError::NoRuntime(err));
                finish(&span, timer, Operation::Ack, &result);
                return PendingAck {
                    inner: PendingAckInner::Failed(future::ready(result)),
                };
            }
        };
        let client = self.pool.get_client();
        let addr = addr.to_owned();
        let header = header.clone();
        let handle = runtime.spawn(async move {
            let result = async {
                let client = client?;
                Ok::<_, ForwardError>(client.ack(&addr, &header, timeout).await?)
            }
            .instrument(span.clone())
            .await;
            finish(&span, timer, Operation::Ack, &result);
            result
        });
        PendingAck {
            inner: PendingAckInner::Spawned(handle),
        }
    }
}
