//! Broker-facing request and response types.
//!
//! These types mirror the headers and results exchanged with broker nodes.
//! The dispatcher only inspects a handful of fields (message count, the
//! system-flag bitfield, send status and response code); everything else is
//! carried through untouched to the transport.

mod header;
mod message;
mod response;
pub mod sys_flag;

pub use header::{
    AckMessageRequestHeader,
    ConsumerSendMsgBackRequestHeader,
    EndTransactionRequestHeader,
    SendMessageRequestHeader,
};
pub use message::{HeartbeatData, Message};
pub use response::{AckResult, AckStatus, RemotingCommand, ResponseCode, SendResult, SendStatus};
pub use sys_flag::TransactionType;
