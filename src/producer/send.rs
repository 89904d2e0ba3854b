//! Message sends and their response post-processing.

use std::{future::Future, time::Duration};

use futures::{TryFutureExt, future};
use log::debug;
use tracing::Instrument;

use super::{
    ForwardProducer,
    finish,
    tracing_helpers::{send_span, start_timer},
    validate_target,
};
use crate::{
    error::{ForwardError, InvalidRequestShape, Result, TransportError},
    metrics::{self, Operation},
    protocol::{Message, SendMessageRequestHeader, SendResult, SendStatus, sys_flag},
    transaction_id::TransactionId,
    transport::TransportClient,
};

/// Transport call shape chosen for a send.
///
/// The two shapes have different wire semantics downstream, so the choice
/// is dictated by the message count alone.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SendPath {
    /// Exactly one message.
    Single,
    /// Two or more messages.
    Batch,
}

impl SendPath {
    /// Choose the path for `message_count` messages.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidRequestShape::EmptyMessages`] when `message_count`
    /// is zero.
    pub const fn for_count(message_count: usize) -> std::result::Result<Self, InvalidRequestShape> {
        match message_count {
            0 => Err(InvalidRequestShape::EmptyMessages),
            1 => Ok(Self::Single),
            _ => Ok(Self::Batch),
        }
    }

    const fn as_str(self) -> &'static str {
        match self {
            Self::Single => "single",
            Self::Batch => "batch",
        }
    }
}

impl<C: TransportClient> ForwardProducer<C> {
    /// Forward a send using the default timeout.
    ///
    /// # Errors
    ///
    /// See [`Self::send_message_with_timeout`].
    pub async fn send_message(
        &self,
        addr: &str,
        broker_name: &str,
        messages: &[Message],
        header: &SendMessageRequestHeader,
    ) -> Result<SendResult> {
        self.send_message_with_timeout(addr, broker_name, messages, header, self.default_timeout)
            .await
    }

    /// Forward one or more messages to `addr`.
    ///
    /// A single message uses the transport's single-message call and any
    /// larger set the batch call. The result then passes through
    /// [`process_send_response`], which stamps a proxy transaction id on
    /// successful prepared sends.
    ///
    /// # Errors
    ///
    /// Returns [`ForwardError::InvalidRequestShape`] for an empty message
    /// list, empty address or zero timeout, [`ForwardError::PoolExhausted`]
    /// if no client is available and [`ForwardError::Transport`] if the call
    /// fails.
    ///
    /// # Examples
    ///
    /// ```
    /// use mqforward::{
    ///     TransactionId,
    ///     protocol::{Message, SendMessageRequestHeader, SendResult, sys_flag},
    /// };
    /// use mqforward_testing::{FakeTransport, producer_with};
    ///
    /// # #[tokio::main(flavor = "current_thread")]
    /// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
    /// let fake = FakeTransport::default().with_send_result(SendResult {
    ///     broker_ref: 77,
    ///     ..SendResult::default()
    /// });
    /// let (producer, _fake) = producer_with(fake);
    /// let header = SendMessageRequestHeader {
    ///     topic: "orders".into(),
    ///     sys_flag: sys_flag::TRANSACTION_PREPARED_TYPE,
    ///     ..SendMessageRequestHeader::default()
    /// };
    /// let result = producer
    ///     .send_message("10.0.0.5:10911", "broker-a", &[Message::new("orders", "x")], &header)
    ///     .await?;
    /// let id: TransactionId = result.transaction_id.ok_or("missing transaction id")?.parse()?;
    /// assert_eq!(id.broker_ref(), 77);
    /// # Ok(())
    /// # }
    /// ```
    pub async fn send_message_with_timeout(
        &self,
        addr: &str,
        broker_name: &str,
        messages: &[Message],
        header: &SendMessageRequestHeader,
        timeout: Duration,
    ) -> Result<SendResult> {
        let span = send_span(&self.tracing, addr, broker_name, messages.len());
        let timer = start_timer(self.tracing.send_timing);
        let result = async {
            validate_target(addr, timeout)?;
            let path = SendPath::for_count(messages.len())?;
            tracing::Span::current().record("path", path.as_str());
            let client = self.pool.get_client()?;
            let response = match messages {
                [message] => client.send_single(addr, broker_name, message, header, timeout),
                _ => client.send_batch(addr, broker_name, messages, header, timeout),
            };
            process_send_response(addr, header, response).await
        }
        .instrument(span.clone())
        .await;
        finish(&span, timer, Operation::SendMessage, &result);
        result
    }
}

/// Chain the transaction-id transform onto a pending send.
///
/// On success the result is handed to [`apply_transaction_id`]. A failed
/// send propagates unchanged and no transform is attempted. The transform is
/// synchronous; nothing here blocks.
pub fn process_send_response<F>(
    addr: &str,
    header: &SendMessageRequestHeader,
    response: F,
) -> impl Future<Output = Result<SendResult>>
where
    F: Future<Output = std::result::Result<SendResult, TransportError>>,
{
    let addr = addr.to_owned();
    let flag = header.sys_flag;
    response
        .err_into::<ForwardError>()
        .and_then(move |result| future::ready(apply_transaction_id(&addr, flag, result)))
}

/// Overwrite `result.transaction_id` with the proxy token when the send
/// succeeded and `flag` marks a prepared transaction.
///
/// Every other result passes through untouched.
///
/// # Errors
///
/// Returns [`ForwardError::TransactionId`] if `addr` cannot be encoded.
///
/// # Examples
///
/// ```
/// use mqforward::{
///     TransactionId,
///     apply_transaction_id,
///     protocol::{SendResult, sys_flag},
/// };
///
/// let raw = SendResult { broker_ref: 77, ..SendResult::default() };
/// let result = apply_transaction_id("10.0.0.5:10911", sys_flag::TRANSACTION_PREPARED_TYPE, raw)
///     .expect("valid address");
/// let id: TransactionId = result.transaction_id.expect("token").parse().expect("decodes");
/// assert_eq!(id.into_parts(), ("10.0.0.5:10911".to_owned(), 77));
/// ```
pub fn apply_transaction_id(addr: &str, flag: i32, mut result: SendResult) -> Result<SendResult> {
    let prepared = sys_flag::transaction_value(flag) == sys_flag::TRANSACTION_PREPARED_TYPE;
    if result.status == SendStatus::SendOk && prepared {
        let id = TransactionId::new(addr, result.broker_ref)?;
        let token = id.encode();
        debug!(
            "issued proxy transaction id: broker_addr={addr}, broker_ref={}, msg_id={}",
            result.broker_ref, result.msg_id
        );
        metrics::inc_prepared_transactions();
        result.transaction_id = Some(token);
    }
    Ok(result)
}
