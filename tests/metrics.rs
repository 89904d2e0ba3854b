#![cfg(all(not(loom), feature = "metrics"))]
//! Counters recorded by dispatcher operations.
//!
//! Each test drives the producer on a current-thread runtime inside
//! `metrics::with_local_recorder`, so every counter update lands on the
//! thread-local `DebuggingRecorder`.

use std::future::Future;

use mqforward::{
    metrics::{
        ACKS_SKIPPED_TOTAL,
        ERRORS_TOTAL,
        Operation,
        PREPARED_TRANSACTIONS_TOTAL,
        REQUESTS_TOTAL,
    },
    protocol::{
        AckMessageRequestHeader,
        ConsumerSendMsgBackRequestHeader,
        HeartbeatData,
        Message,
        ResponseCode,
        SendMessageRequestHeader,
        sys_flag,
    },
};
use mqforward_testing::{FakeTransport, debugging_recorder_setup, producer_with, snapshot_counters};
use rstest::rstest;

const BROKER_ADDR: &str = "10.0.0.5:10911";

fn block_on<F: Future>(future: F) -> F::Output {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .expect("runtime")
        .block_on(future)
}

#[rstest]
#[case(1)]
#[case(3)]
fn heartbeat_requests_are_counted(#[case] calls: u64) {
    let (snapshotter, recorder) = debugging_recorder_setup();
    let (producer, _fake) = producer_with(FakeTransport::default());

    metrics::with_local_recorder(&recorder, || {
        block_on(async {
            for _ in 0..calls {
                producer
                    .heartbeat(BROKER_ADDR, &HeartbeatData::default())
                    .await
                    .expect("heartbeat");
            }
        });
    });

    let counters = snapshot_counters(&snapshotter);
    let heartbeat = Some(Operation::Heartbeat.as_str());
    assert_eq!(counters.counter(REQUESTS_TOTAL, heartbeat), calls);
    assert_eq!(counters.counter(ERRORS_TOTAL, heartbeat), 0);
}

#[test]
fn failed_send_counts_an_error() {
    let (snapshotter, recorder) = debugging_recorder_setup();
    let (producer, _fake) = producer_with(FakeTransport::default().failing_sends());

    metrics::with_local_recorder(&recorder, || {
        block_on(async {
            producer
                .send_message(
                    BROKER_ADDR,
                    "broker-a",
                    &[Message::new("orders", "x")],
                    &SendMessageRequestHeader::default(),
                )
                .await
                .expect_err("send fails");
        });
    });

    let counters = snapshot_counters(&snapshotter);
    let send = Some(Operation::SendMessage.as_str());
    assert_eq!(counters.counter(REQUESTS_TOTAL, send), 1);
    assert_eq!(counters.counter(ERRORS_TOTAL, send), 1);
    assert_eq!(counters.counter(ERRORS_TOTAL, None), 1);
}

#[test]
fn prepared_send_counts_issued_transaction_id() {
    let (snapshotter, recorder) = debugging_recorder_setup();
    let (producer, _fake) = producer_with(FakeTransport::default());
    let header = SendMessageRequestHeader {
        sys_flag: sys_flag::TRANSACTION_PREPARED_TYPE,
        ..SendMessageRequestHeader::default()
    };

    metrics::with_local_recorder(&recorder, || {
        block_on(async {
            producer
                .send_message(BROKER_ADDR, "broker-a", &[Message::new("orders", "x")], &header)
                .await
                .expect("send");
        });
    });

    let counters = snapshot_counters(&snapshotter);
    assert_eq!(counters.counter(PREPARED_TRANSACTIONS_TOTAL, None), 1);
    assert_eq!(
        counters.counter(REQUESTS_TOTAL, Some(Operation::SendMessage.as_str())),
        1
    );
}

#[test]
fn skipped_ack_is_counted() {
    let (snapshotter, recorder) = debugging_recorder_setup();
    let (producer, _fake) =
        producer_with(FakeTransport::default().with_send_back_code(ResponseCode::SYSTEM_ERROR));

    metrics::with_local_recorder(&recorder, || {
        block_on(async {
            producer
                .send_message_back_then_ack_org(
                    BROKER_ADDR,
                    &ConsumerSendMsgBackRequestHeader::default(),
                    &AckMessageRequestHeader::default(),
                )
                .await
                .expect("send back completes");
        });
    });

    let counters = snapshot_counters(&snapshotter);
    assert_eq!(counters.counter(ACKS_SKIPPED_TOTAL, None), 1);
    assert_eq!(
        counters.counter(REQUESTS_TOTAL, Some(Operation::SendBack.as_str())),
        1
    );
    assert_eq!(counters.counter(REQUESTS_TOTAL, Some(Operation::Ack.as_str())), 0);
}

#[test]
fn one_snapshot_answers_every_query() {
    let (snapshotter, recorder) = debugging_recorder_setup();
    let (producer, _fake) = producer_with(FakeTransport::default());

    metrics::with_local_recorder(&recorder, || {
        block_on(async {
            producer
                .heartbeat(BROKER_ADDR, &HeartbeatData::default())
                .await
                .expect("heartbeat");
        });
    });

    let counters = snapshot_counters(&snapshotter);
    let heartbeat = Some(Operation::Heartbeat.as_str());
    let first = counters.counter(REQUESTS_TOTAL, heartbeat);
    let second = counters.counter(REQUESTS_TOTAL, heartbeat);
    assert_eq!((first, second), (1, 1));
}
