//! Scripted in-memory [`TransportClient`].

use std::{
    sync::{Arc, Mutex, MutexGuard},
    time::Duration,
};

use async_trait::async_trait;
use mqforward::{
    ClientPool,
    ForwardConfig,
    ForwardProducer,
    TransportClient,
    TransportError,
    TransportResult,
    protocol::{
        AckMessageRequestHeader,
        AckResult,
        ConsumerSendMsgBackRequestHeader,
        EndTransactionRequestHeader,
        HeartbeatData,
        Message,
        RemotingCommand,
        ResponseCode,
        SendMessageRequestHeader,
        SendResult,
    },
};
use tokio::sync::Notify;

/// A transport call observed by [`FakeTransport`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Call {
    Single { addr: String, topic: String },
    Batch { addr: String, count: usize },
    Heartbeat { addr: String, client_id: String },
    EndTransaction { addr: String, remark: String, timeout: Duration },
    SendBack { addr: String },
    Ack { addr: String, offset: i64 },
    Start,
    Shutdown,
}

/// Scripted transport double.
///
/// Each call is recorded before the scripted answer is produced. A
/// configured `latency` is slept before answering, which lets tests cancel
/// an operation while the call is in flight. An `ack_gate` holds every
/// acknowledgement until it is notified.
#[derive(Debug)]
pub struct FakeTransport {
    name: String,
    worker_threads: usize,
    send_result: SendResult,
    send_failure: bool,
    heartbeat_code: i32,
    send_back_code: i32,
    send_back_failure: bool,
    ack_failure: bool,
    latency: Option<Duration>,
    ack_gate: Option<Arc<Notify>>,
    calls: Mutex<Vec<Call>>,
}

impl Default for FakeTransport {
    fn default() -> Self { Self::new("fake", 1) }
}

impl FakeTransport {
    /// Create a fake answering every call with success.
    pub fn new(name: &str, worker_threads: usize) -> Self {
        Self {
            name: name.to_owned(),
            worker_threads,
            send_result: SendResult::default(),
            send_failure: false,
            heartbeat_code: ResponseCode::SUCCESS,
            send_back_code: ResponseCode::SUCCESS,
            send_back_failure: false,
            ack_failure: false,
            latency: None,
            ack_gate: None,
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Answer sends with `result`.
    #[must_use]
    pub fn with_send_result(mut self, result: SendResult) -> Self {
        self.send_result = result;
        self
    }

    /// Fail every send with a connection error.
    #[must_use]
    pub fn failing_sends(mut self) -> Self {
        self.send_failure = true;
        self
    }

    /// Answer heartbeats with `code`.
    #[must_use]
    pub fn with_heartbeat_code(mut self, code: i32) -> Self {
        self.heartbeat_code = code;
        self
    }

    /// Answer send-backs with `code`.
    #[must_use]
    pub fn with_send_back_code(mut self, code: i32) -> Self {
        self.send_back_code = code;
        self
    }

    /// Fail every send-back with a connection error.
    #[must_use]
    pub fn failing_send_back(mut self) -> Self {
        self.send_back_failure = true;
        self
    }

    /// Fail every acknowledgement with a remote error.
    #[must_use]
    pub fn failing_ack(mut self) -> Self {
        self.ack_failure = true;
        self
    }

    /// Delay every answer by `latency`.
    #[must_use]
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Hold acknowledgements until `gate` is notified.
    #[must_use]
    pub fn with_ack_gate(mut self, gate: Arc<Notify>) -> Self {
        self.ack_gate = Some(gate);
        self
    }

    /// Client name handed to the factory.
    pub fn name(&self) -> &str { &self.name }

    /// Worker threads handed to the factory.
    pub fn worker_threads(&self) -> usize { self.worker_threads }

    /// Snapshot of every call received so far.
    pub fn calls(&self) -> Vec<Call> { self.lock().clone() }

    /// Number of recorded calls matching `predicate`.
    pub fn count(&self, predicate: impl Fn(&Call) -> bool) -> usize {
        self.lock().iter().filter(|call| predicate(call)).count()
    }

    fn lock(&self) -> MutexGuard<'_, Vec<Call>> {
        self.calls
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    async fn answer(&self, call: Call) {
        self.lock().push(call);
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
    }
}

fn refused() -> TransportError {
    TransportError::Io(std::io::Error::from(std::io::ErrorKind::ConnectionRefused))
}

#[async_trait]
impl TransportClient for FakeTransport {
    async fn send_single(
        &self,
        addr: &str,
        _broker_name: &str,
        message: &Message,
        _header: &SendMessageRequestHeader,
        _timeout: Duration,
    ) -> TransportResult<SendResult> {
        self.answer(Call::Single {
            addr: addr.to_owned(),
            topic: message.topic.clone(),
        })
        .await;
        if self.send_failure {
            return Err(refused());
        }
        Ok(self.send_result.clone())
    }

    async fn send_batch(
        &self,
        addr: &str,
        _broker_name: &str,
        messages: &[Message],
        _header: &SendMessageRequestHeader,
        _timeout: Duration,
    ) -> TransportResult<SendResult> {
        self.answer(Call::Batch {
            addr: addr.to_owned(),
            count: messages.len(),
        })
        .await;
        if self.send_failure {
            return Err(refused());
        }
        Ok(self.send_result.clone())
    }

    async fn send_heartbeat(
        &self,
        addr: &str,
        heartbeat: &HeartbeatData,
        _timeout: Duration,
    ) -> TransportResult<i32> {
        self.answer(Call::Heartbeat {
            addr: addr.to_owned(),
            client_id: heartbeat.client_id.clone(),
        })
        .await;
        Ok(self.heartbeat_code)
    }

    async fn end_transaction_oneway(
        &self,
        addr: &str,
        _header: &EndTransactionRequestHeader,
        remark: &str,
        timeout: Duration,
    ) -> TransportResult<()> {
        self.answer(Call::EndTransaction {
            addr: addr.to_owned(),
            remark: remark.to_owned(),
            timeout,
        })
        .await;
        Ok(())
    }

    async fn send_back(
        &self,
        addr: &str,
        _header: &ConsumerSendMsgBackRequestHeader,
        _timeout: Duration,
    ) -> TransportResult<RemotingCommand> {
        self.answer(Call::SendBack {
            addr: addr.to_owned(),
        })
        .await;
        if self.send_back_failure {
            return Err(refused());
        }
        Ok(RemotingCommand::response(self.send_back_code, None))
    }

    async fn ack(
        &self,
        addr: &str,
        header: &AckMessageRequestHeader,
        _timeout: Duration,
    ) -> TransportResult<AckResult> {
        if let Some(gate) = &self.ack_gate {
            gate.notified().await;
        }
        self.answer(Call::Ack {
            addr: addr.to_owned(),
            offset: header.offset,
        })
        .await;
        if self.ack_failure {
            return Err(TransportError::Remote {
                code: ResponseCode::SYSTEM_ERROR,
                remark: "ack rejected".into(),
            });
        }
        Ok(AckResult::default())
    }

    async fn start(&self) -> TransportResult<()> {
        self.lock().push(Call::Start);
        Ok(())
    }

    async fn shutdown(&self) -> TransportResult<()> {
        self.lock().push(Call::Shutdown);
        Ok(())
    }
}

/// Factory producing default [`FakeTransport`]s named by the pool.
pub fn fake_factory(name: &str, worker_threads: usize) -> FakeTransport {
    FakeTransport::new(name, worker_threads)
}

/// Wrap `fake` in a single-client producer with default configuration.
///
/// The returned handle observes the same client the producer dispatches to.
pub fn producer_with(fake: FakeTransport) -> (ForwardProducer<FakeTransport>, Arc<FakeTransport>) {
    let fake = Arc::new(fake);
    let pool = ClientPool::from_clients(vec![Arc::clone(&fake)], fake.worker_threads());
    (
        ForwardProducer::with_pool(pool, &ForwardConfig::default()),
        fake,
    )
}
