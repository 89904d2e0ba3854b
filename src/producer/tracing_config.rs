//! Tracing configuration for forwarding operations.
//!
//! [`TracingConfig`] controls the level of each operation's span and whether
//! an elapsed-time event is emitted when the operation completes.

use tracing::Level;

/// Controls tracing span levels and per-operation timing.
///
/// All operations emit spans at `DEBUG` level by default and per-operation
/// timing is disabled. When no `tracing` subscriber is installed, span
/// creation is a no-op.
///
/// # Examples
///
/// ```
/// use mqforward::TracingConfig;
/// use tracing::Level;
///
/// let config = TracingConfig::default()
///     .with_send_level(Level::INFO)
///     .with_send_timing(true);
/// let _ = config;
/// ```
#[expect(
    clippy::struct_excessive_bools,
    reason = "five independent on/off timing flags, one per operation"
)]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TracingConfig {
    pub(crate) heartbeat_level: Level,
    pub(crate) end_transaction_level: Level,
    pub(crate) send_level: Level,
    pub(crate) send_back_level: Level,
    pub(crate) ack_level: Level,
    pub(crate) heartbeat_timing: bool,
    pub(crate) end_transaction_timing: bool,
    pub(crate) send_timing: bool,
    pub(crate) send_back_timing: bool,
    pub(crate) ack_timing: bool,
}

impl Default for TracingConfig {
    fn default() -> Self {
        Self {
            heartbeat_level: Level::DEBUG,
            end_transaction_level: Level::DEBUG,
            send_level: Level::DEBUG,
            send_back_level: Level::DEBUG,
            ack_level: Level::DEBUG,
            heartbeat_timing: false,
            end_transaction_timing: false,
            send_timing: false,
            send_back_timing: false,
            ack_timing: false,
        }
    }
}

impl TracingConfig {
    /// Set the span level for heartbeats.
    #[must_use]
    pub fn with_heartbeat_level(mut self, level: Level) -> Self {
        self.heartbeat_level = level;
        self
    }

    /// Enable or disable timing for heartbeats.
    #[must_use]
    pub fn with_heartbeat_timing(mut self, enabled: bool) -> Self {
        self.heartbeat_timing = enabled;
        self
    }

    /// Set the span level for end-transaction calls.
    #[must_use]
    pub fn with_end_transaction_level(mut self, level: Level) -> Self {
        self.end_transaction_level = level;
        self
    }

    /// Enable or disable timing for end-transaction calls.
    #[must_use]
    pub fn with_end_transaction_timing(mut self, enabled: bool) -> Self {
        self.end_transaction_timing = enabled;
        self
    }

    /// Set the span level for sends.
    #[must_use]
    pub fn with_send_level(mut self, level: Level) -> Self {
        self.send_level = level;
        self
    }

    /// Enable or disable timing for sends.
    ///
    /// When enabled, an event recording `elapsed_us` is emitted at `DEBUG`
    /// level once the post-processed result is available.
    #[must_use]
    pub fn with_send_timing(mut self, enabled: bool) -> Self {
        self.send_timing = enabled;
        self
    }

    /// Set the span level for send-back calls.
    #[must_use]
    pub fn with_send_back_level(mut self, level: Level) -> Self {
        self.send_back_level = level;
        self
    }

    /// Enable or disable timing for send-back calls.
    #[must_use]
    pub fn with_send_back_timing(mut self, enabled: bool) -> Self {
        self.send_back_timing = enabled;
        self
    }

    /// Set the span level for acknowledgements.
    #[must_use]
    pub fn with_ack_level(mut self, level: Level) -> Self {
        self.ack_level = level;
        self
    }

    /// Enable or disable timing for acknowledgements.
    #[must_use]
    pub fn with_ack_timing(mut self, enabled: bool) -> Self {
        self.ack_timing = enabled;
        self
    }

    /// Set every operation's span level.
    ///
    /// # Examples
    ///
    /// ```
    /// use mqforward::TracingConfig;
    /// use tracing::Level;
    ///
    /// let config = TracingConfig::default().with_all_levels(Level::TRACE);
    /// let _ = config;
    /// ```
    #[must_use]
    pub fn with_all_levels(mut self, level: Level) -> Self {
        self.heartbeat_level = level;
        self.end_transaction_level = level;
        self.send_level = level;
        self.send_back_level = level;
        self.ack_level = level;
        self
    }

    /// Enable or disable timing for every operation.
    #[must_use]
    pub fn with_all_timing(mut self, enabled: bool) -> Self {
        self.heartbeat_timing = enabled;
        self.end_transaction_timing = enabled;
        self.send_timing = enabled;
        self.send_back_timing = enabled;
        self.ack_timing = enabled;
        self
    }
}
