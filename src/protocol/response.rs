//! Results returned by broker nodes.

use std::collections::BTreeMap;

use bytes::Bytes;
use serde::{Deserialize, Serialize};

/// Outcome reported by the broker for a send.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SendStatus {
    /// Stored successfully.
    #[default]
    SendOk,
    /// Stored, but the flush to disk timed out.
    FlushDiskTimeout,
    /// Stored, but replication to the slave timed out.
    FlushSlaveTimeout,
    /// Stored, but no slave was available for replication.
    SlaveNotAvailable,
}

/// Result of a single or batched send.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendResult {
    pub status: SendStatus,
    pub msg_id: String,
    #[serde(default)]
    pub offset_msg_id: String,
    pub queue_id: i32,
    pub queue_offset: i64,
    /// Transaction id visible to the caller. Overwritten with the proxy
    /// token for prepared sends.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transaction_id: Option<String>,
    /// Broker-issued reference to the staged half message.
    #[serde(default)]
    pub broker_ref: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region_id: Option<String>,
}

impl SendResult {
    /// Whether the broker reported [`SendStatus::SendOk`].
    #[must_use]
    pub fn is_ok(&self) -> bool { self.status == SendStatus::SendOk }
}

/// Well-known remoting response codes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ResponseCode;

impl ResponseCode {
    pub const SUCCESS: i32 = 0;
    pub const SYSTEM_ERROR: i32 = 1;
    pub const SYSTEM_BUSY: i32 = 2;
    pub const REQUEST_CODE_NOT_SUPPORTED: i32 = 3;
    pub const NO_PERMISSION: i32 = 16;
    pub const TOPIC_NOT_EXIST: i32 = 17;
}

/// Raw response frame returned by send-back requests.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemotingCommand {
    pub code: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remark: Option<String>,
    #[serde(default)]
    pub body: Bytes,
    #[serde(default)]
    pub ext_fields: BTreeMap<String, String>,
}

impl RemotingCommand {
    /// Build a response with `code` and an optional remark.
    #[must_use]
    pub fn response(code: i32, remark: Option<String>) -> Self {
        Self {
            code,
            remark,
            ..Self::default()
        }
    }

    /// Whether the response carries [`ResponseCode::SUCCESS`].
    #[must_use]
    pub fn is_success(&self) -> bool { self.code == ResponseCode::SUCCESS }
}

/// Outcome of an acknowledgement.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AckStatus {
    #[default]
    Ok,
    /// The receipt no longer refers to an in-flight message.
    NotExist,
}

/// Result of an acknowledgement.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AckResult {
    pub status: AckStatus,
    #[serde(default)]
    pub extra_info: String,
    #[serde(default)]
    pub pop_time: i64,
}
