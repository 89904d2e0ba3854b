//! Test doubles and fixtures for exercising a
//! [`ForwardProducer`](mqforward::ForwardProducer) without a broker.
//!
//! [`FakeTransport`] records every call it receives and answers from a
//! script, so tests can assert which transport path a dispatcher operation
//! took and in what order.
//!
//! ```rust
//! use mqforward_testing::{FakeTransport, producer_with};
//!
//! # async fn example() {
//! let (producer, fake) = producer_with(FakeTransport::default());
//! producer.heartbeat("10.0.0.5:10911", &Default::default()).await.unwrap();
//! assert_eq!(fake.calls().len(), 1);
//! # }
//! ```

pub mod fake;
pub mod logging;
pub mod metrics;

pub use fake::{Call, FakeTransport, fake_factory, producer_with};
pub use logging::{LoggerHandle, logger};
pub use metrics::{CounterSnapshot, debugging_recorder_setup, snapshot_counters};
