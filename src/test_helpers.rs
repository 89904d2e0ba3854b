//! Test-only transport double shared by unit tests.

use std::{
    sync::{
        Mutex,
        atomic::{AtomicUsize, Ordering},
    },
    time::Duration,
};

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
        ResponseCode,
        SendMessageRequestHeader,
        SendResult,
    },
    transport::{TransportClient, TransportResult},
};

/// A call observed by [`RecordingTransport`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Call {
    Single { addr: String, broker_name: String },
    Batch { addr: String, count: usize },
    Heartbeat { addr: String },
    EndTransaction { addr: String, remark: String },
    SendBack { addr: String },
    Ack { addr: String },
}

/// Scripted transport that records every call it receives.
#[derive(Debug)]
pub struct RecordingTransport {
    pub name: String,
    pub worker_threads: usize,
    pub send_result: SendResult,
    pub fail_sends: bool,
    pub heartbeat_code: i32,
    pub send_back_code: i32,
    pub fail_send_back: bool,
    pub fail_end_transaction: bool,
    pub fail_start: bool,
    calls: Mutex<Vec<Call>>,
    pub starts: AtomicUsize,
    pub shutdowns: AtomicUsize,
}

impl Default for RecordingTransport {
    fn default() -> Self { Self::named("test", 1) }
}

impl RecordingTransport {
    pub fn named(name: &str, worker_threads: usize) -> Self {
        Self {
            name: name.to_owned(),
            worker_threads,
            send_result: SendResult::default(),
            fail_sends: false,
            heartbeat_code: ResponseCode::SUCCESS,
            send_back_code: ResponseCode::SUCCESS,
            fail_send_back: false,
            fail_end_transaction: false,
            fail_start: false,
            calls: Mutex::new(Vec::new()),
            starts: AtomicUsize::new(0),
            shutdowns: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> Vec<Call> { self.calls.lock().expect("calls lock").clone() }

    fn record(&self, call: Call) { self.calls.lock().expect("calls lock").push(call); }
}

fn refused() -> TransportError {
    TransportError::Io(std::io::Error::from(std::io::ErrorKind::ConnectionRefused))
}

#[async_trait]
impl TransportClient for RecordingTransport {
    async fn send_single(
        &self,
        addr: &str,
        broker_name: &str,
        _message: &Message,
        _header: &SendMessageRequestHeader,
        _timeout: Duration,
    ) -> TransportResult<SendResult> {
        self.record(Call::Single {
            addr: addr.to_owned(),
            broker_name: broker_name.to_owned(),
        });
        if self.fail_sends {
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
        self.record(Call::Batch {
            addr: addr.to_owned(),
            count: messages.len(),
        });
        if self.fail_sends {
            return Err(refused());
        }
        Ok(self.send_result.clone())
    }

    async fn send_heartbeat(
        &self,
        addr: &str,
        _heartbeat: &HeartbeatData,
        _timeout: Duration,
    ) -> TransportResult<i32> {
        self.record(Call::Heartbeat {
            addr: addr.to_owned(),
        });
        Ok(self.heartbeat_code)
    }

    async fn end_transaction_oneway(
        &self,
        addr: &str,
        _header: &EndTransactionRequestHeader,
        remark: &str,
        _timeout: Duration,
    ) -> TransportResult<()> {
        self.record(Call::EndTransaction {
            addr: addr.to_owned(),
            remark: remark.to_owned(),
        });
        if self.fail_end_transaction {
            return Err(TransportError::Disconnected);
        }
        Ok(())
    }

    async fn send_back(
        &self,
        addr: &str,
        _header: &ConsumerSendMsgBackRequestHeader,
        _timeout: Duration,
    ) -> TransportResult<RemotingCommand> {
        self.record(Call::SendBack {
            addr: addr.to_owned(),
        });
        if self.fail_send_back {
            return Err(refused());
        }
        Ok(RemotingCommand::response(self.send_back_code, None))
    }

    async fn ack(
        &self,
        addr: &str,
        _header: &AckMessageRequestHeader,
        _timeout: Duration,
    ) -> TransportResult<AckResult> {
        self.record(Call::Ack {
            addr: addr.to_owned(),
        });
        Ok(AckResult::default())
    }

    async fn start(&self) -> TransportResult<()> {
        self.starts.fetch_add(1, Ordering::SeqCst);
        if self.fail_start {
            return Err(TransportError::Disconnected);
        }
        Ok(())
    }

    async fn shutdown(&self) -> TransportResult<()> {
        self.shutdowns.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
