//! Request headers forwarded verbatim to broker nodes.

use serde::{Deserialize, Serialize};

use super::sys_flag::TransactionType;

/// Header accompanying a single or batched send.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendMessageRequestHeader {
    pub producer_group: String,
    pub topic: String,
    pub default_topic: String,
    pub default_topic_queue_nums: i32,
    pub queue_id: i32,
    /// System-flag bitfield; see [`super::sys_flag`].
    pub sys_flag: i32,
    pub born_timestamp: i64,
    pub flag: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub properties: Option<String>,
    #[serde(default)]
    pub reconsume_times: i32,
    #[serde(default)]
    pub unit_mode: bool,
    #[serde(default)]
    pub batch: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_reconsume_times: Option<i32>,
}

impl SendMessageRequestHeader {
    /// Transaction type encoded in [`Self::sys_flag`].
    #[must_use]
    pub const fn transaction_type(&self) -> TransactionType {
        TransactionType::from_sys_flag(self.sys_flag)
    }
}

/// Header for committing or rolling back a prepared message.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EndTransactionRequestHeader {
    pub producer_group: String,
    pub tran_state_table_offset: i64,
    pub commit_log_offset: i64,
    /// Either [`super::sys_flag::TRANSACTION_COMMIT_TYPE`] or
    /// [`super::sys_flag::TRANSACTION_ROLLBACK_TYPE`].
    pub commit_or_rollback: i32,
    #[serde(default)]
    pub from_transaction_check: bool,
    pub msg_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transaction_id: Option<String>,
}

/// Header asking a broker to redeliver a consumed message to its origin.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsumerSendMsgBackRequestHeader {
    pub offset: i64,
    pub group: String,
    pub delay_level: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub origin_msg_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub origin_topic: Option<String>,
    #[serde(default)]
    pub unit_mode: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_reconsume_times: Option<i32>,
}

/// Header acknowledging a message obtained through a pop request.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AckMessageRequestHeader {
    pub consumer_group: String,
    pub topic: String,
    pub queue_id: i32,
    pub extra_info: String,
    pub offset: i64,
}
