//! Forwarding configuration.
//!
//! [`ForwardConfig`] is read once when the client pool is built. The worker
//! thread count handed to each transport client is derived from the
//! configured factor and an explicit parallelism input, so tests can pin it
//! without depending on the host's CPU count.

use std::{num::NonZeroUsize, time::Duration};

use serde::{Deserialize, Serialize};

use crate::producer::TracingConfig;

/// Timeout applied by operations that do not take an explicit one.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(3000);
/// Number of pooled clients when none is configured.
pub const DEFAULT_FORWARD_PRODUCER_NUM: usize = 2;
/// Worker threads per client, as a fraction of available parallelism.
pub const DEFAULT_FORWARD_PRODUCER_WORKER_FACTOR: f64 = 0.2;

/// Settings controlling the forwarding client pool.
///
/// # Examples
///
/// ```
/// use std::{num::NonZeroUsize, time::Duration};
///
/// use mqforward::ForwardConfig;
///
/// let config = ForwardConfig::default()
///     .forward_producer_num(4)
///     .forward_producer_worker_factor(0.5)
///     .default_timeout(Duration::from_secs(1));
/// let parallelism = NonZeroUsize::new(8).expect("non-zero");
/// assert_eq!(config.client_num(), 4);
/// assert_eq!(config.worker_threads(parallelism), 4);
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ForwardConfig {
    forward_producer_num: usize,
    forward_producer_worker_factor: f64,
    #[serde(rename = "defaultTimeoutMs", with = "duration_millis")]
    default_timeout: Duration,
    #[serde(skip)]
    tracing: TracingConfig,
}

impl Default for ForwardConfig {
    fn default() -> Self {
        Self {
            forward_producer_num: DEFAULT_FORWARD_PRODUCER_NUM,
            forward_producer_worker_factor: DEFAULT_FORWARD_PRODUCER_WORKER_FACTOR,
            default_timeout: DEFAULT_TIMEOUT,
            tracing: TracingConfig::default(),
        }
    }
}

impl ForwardConfig {
    /// Set the number of pooled clients. Values below one are raised to one.
    #[must_use]
    pub fn forward_producer_num(mut self, count: usize) -> Self {
        self.forward_producer_num = count.max(1);
        self
    }

    /// Set the worker-thread factor applied to available parallelism.
    #[must_use]
    pub fn forward_producer_worker_factor(mut self, factor: f64) -> Self {
        self.forward_producer_worker_factor = factor;
        self
    }

    /// Set the timeout used by operations without an explicit one.
    ///
    /// A zero duration is ignored and the previous value kept.
    #[must_use]
    pub fn default_timeout(mut self, timeout: Duration) -> Self {
        if !timeout.is_zero() {
            self.default_timeout = timeout;
        }
        self
    }

    /// Replace the tracing configuration used by the dispatcher.
    #[must_use]
    pub fn tracing_config(mut self, tracing: TracingConfig) -> Self {
        self.tracing = tracing;
        self
    }

    /// Number of clients the pool creates.
    #[must_use]
    pub const fn client_num(&self) -> usize {
        if self.forward_producer_num == 0 {
            1
        } else {
            self.forward_producer_num
        }
    }

    /// Configured worker-thread factor.
    #[must_use]
    pub const fn worker_factor(&self) -> f64 { self.forward_producer_worker_factor }

    /// Timeout used by operations without an explicit one.
    ///
    /// Falls back to [`DEFAULT_TIMEOUT`] if a zero value was deserialized.
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        if self.default_timeout.is_zero() {
            DEFAULT_TIMEOUT
        } else {
            self.default_timeout
        }
    }

    /// Tracing configuration for dispatcher spans.
    #[must_use]
    pub const fn tracing(&self) -> &TracingConfig { &self.tracing }

    /// Worker threads handed to each client:
    /// `ceil(available_parallelism × worker_factor)`, at least one.
    ///
    /// Non-finite or negative factors yield one thread.
    #[must_use]
    pub fn worker_threads(&self, available_parallelism: NonZeroUsize) -> usize {
        #[expect(
            clippy::cast_precision_loss,
            reason = "core counts are far below f64's exact integer range"
        )]
        let scaled = (available_parallelism.get() as f64 * self.forward_producer_worker_factor).ceil();
        if !scaled.is_finite() || scaled < 1.0 {
            return 1;
        }
        #[expect(
            clippy::cast_possible_truncation,
            clippy::cast_sign_loss,
            reason = "value is finite, positive and saturates on conversion"
        )]
        let threads = scaled as usize;
        threads.max(1)
    }
}

/// Query the host's available parallelism, defaulting to one.
#[must_use]
pub fn available_parallelism() -> NonZeroUsize {
    std::thread::available_parallelism().unwrap_or(NonZeroUsize::MIN)
}

mod duration_millis {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub(super) fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(u64::try_from(value.as_millis()).unwrap_or(u64::MAX))
    }

    pub(super) fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }
}
