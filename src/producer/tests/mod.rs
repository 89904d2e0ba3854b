//! Unit tests for the forwarding dispatcher.

mod send;

use std::{sync::Arc, time::Duration};

use rstest::fixture;

use super::ForwardProducer;
use crate::{
    config::ForwardConfig,
    pool::ClientPool,
    protocol::{Message, SendMessageRequestHeader},
    test_helpers::RecordingTransport,
};

pub(super) const BROKER_ADDR: &str = "10.0.0.5:10911";
pub(super) const BROKER_NAME: &str = "broker-a";

/// A producer wrapping a single recording client, plus a handle to that
/// client for inspecting the calls it received.
pub(super) struct Harness {
    pub producer: ForwardProducer<RecordingTransport>,
    pub client: Arc<RecordingTransport>,
}

impl Harness {
    pub fn with_client(client: RecordingTransport) -> Self {
        Self::with_config(client, &ForwardConfig::default())
    }

    pub fn with_config(client: RecordingTransport, config: &ForwardConfig) -> Self {
        let client = Arc::new(client);
        let pool = ClientPool::from_clients(vec![Arc::clone(&client)], 1);
        Self {
            producer: ForwardProducer::with_pool(pool, config),
            client,
        }
    }
}

#[fixture]
pub(super) fn harness() -> Harness { Harness::with_client(RecordingTransport::default()) }

pub(super) fn messages(count: usize) -> Vec<Message> {
    (0..count)
        .map(|index| Message::new("orders", format!("body-{index}")))
        .collect()
}

pub(super) fn send_header(sys_flag: i32) -> SendMessageRequestHeader {
    SendMessageRequestHeader {
        producer_group: "proxy".into(),
        topic: "orders".into(),
        sys_flag,
        ..SendMessageRequestHeader::default()
    }
}

#[test]
fn producer_is_send_and_sync() {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<ForwardProducer<RecordingTransport>>();
}

#[rstest::rstest]
fn default_timeout_follows_config() {
    let config = ForwardConfig::default().default_timeout(Duration::from_millis(750));
    let harness = Harness::with_config(RecordingTransport::default(), &config);

    assert_eq!(harness.producer.default_timeout(), Duration::from_millis(750));
    assert_eq!(harness.producer.client_num(), 1);
}

#[test]
fn new_builds_pool_from_config() {
    let config = ForwardConfig::default().forward_producer_num(4);
    let factory = |name: &str, threads: usize| RecordingTransport::named(name, threads);
    let parallelism = std::num::NonZeroUsize::new(10).expect("non-zero");

    let producer = ForwardProducer::new(&config, parallelism, &factory);

    assert_eq!(producer.client_num(), 4);
    assert_eq!(producer.pool().worker_threads(), 2);
    assert_eq!(producer.default_timeout(), config.timeout());
}
