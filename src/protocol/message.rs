//! Message payloads and client heartbeat data.

use std::collections::BTreeMap;

use bytes::Bytes;
use serde::{Deserialize, Serialize};

/// A logical message destined for a broker topic.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub topic: String,
    pub body: Bytes,
    #[serde(default)]
    pub flag: i32,
    #[serde(default)]
    pub properties: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transaction_id: Option<String>,
}

impl Message {
    /// Create a message for `topic` carrying `body`.
    ///
    /// # Examples
    ///
    /// ```
    /// use mqforward::protocol::Message;
    ///
    /// let message = Message::new("orders", "payload").with_property("KEYS", "42");
    /// assert_eq!(message.property("KEYS"), Some("42"));
    /// ```
    #[must_use]
    pub fn new(topic: impl Into<String>, body: impl Into<Bytes>) -> Self {
        Self {
            topic: topic.into(),
            body: body.into(),
            ..Self::default()
        }
    }

    /// Attach a user property.
    #[must_use]
    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }

    /// Look up a user property.
    #[must_use]
    pub fn property(&self, key: &str) -> Option<&str> {
        self.properties.get(key).map(String::as_str)
    }
}

/// Client registration payload refreshed periodically with each broker.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HeartbeatData {
    pub client_id: String,
    #[serde(default)]
    pub producer_groups: Vec<String>,
    #[serde(default)]
    pub consumer_groups: Vec<String>,
}
