//! Tests for message sends and transaction-id stamping.

use futures::future;
use rstest::rstest;

use super::{BROKER_ADDR, BROKER_NAME, Harness, harness, messages, send_header};
use crate::{
    error::{ForwardError, InvalidRequestShape, TransportError},
    producer::{SendPath, apply_transaction_id, process_send_response},
    protocol::{SendResult, SendStatus, sys_flag},
    test_helpers::{Call, RecordingTransport},
    transaction_id::TransactionId,
};

fn prepared_result(broker_ref: u64) -> SendResult {
    SendResult {
        status: SendStatus::SendOk,
        msg_id: "7F0000010001".into(),
        transaction_id: Some("broker-issued".into()),
        broker_ref,
        ..SendResult::default()
    }
}

#[rstest]
#[case(0, None)]
#[case(1, Some(SendPath::Single))]
#[case(2, Some(SendPath::Batch))]
#[case(64, Some(SendPath::Batch))]
fn send_path_depends_on_count_only(#[case] count: usize, #[case] expected: Option<SendPath>) {
    assert_eq!(SendPath::for_count(count).ok(), expected);
}

#[rstest]
#[tokio::test]
async fn single_message_uses_single_call(harness: Harness) {
    harness
        .producer
        .send_message(BROKER_ADDR, BROKER_NAME, &messages(1), &send_header(0))
        .await
        .expect("send");

    assert_eq!(
        harness.client.calls(),
        vec![Call::Single {
            addr: BROKER_ADDR.into(),
            broker_name: BROKER_NAME.into(),
        }]
    );
}

#[rstest]
#[case(2)]
#[case(5)]
#[tokio::test]
async fn several_messages_use_one_batch_call(harness: Harness, #[case] count: usize) {
    harness
        .producer
        .send_message(BROKER_ADDR, BROKER_NAME, &messages(count), &send_header(0))
        .await
        .expect("send");

    assert_eq!(
        harness.client.calls(),
        vec![Call::Batch {
            addr: BROKER_ADDR.into(),
            count,
        }]
    );
}

#[rstest]
#[tokio::test]
async fn empty_message_list_is_rejected_before_transport(harness: Harness) {
    let err = harness
        .producer
        .send_message(BROKER_ADDR, BROKER_NAME, &[], &send_header(0))
        .await
        .expect_err("empty send must fail");

    assert!(matches!(
        err,
        ForwardError::InvalidRequestShape(InvalidRequestShape::EmptyMessages)
    ));
    assert!(harness.client.calls().is_empty());
}

#[rstest]
#[case("", std::time::Duration::from_secs(1), InvalidRequestShape::EmptyAddress)]
#[case(BROKER_ADDR, std::time::Duration::ZERO, InvalidRequestShape::NonPositiveTimeout)]
#[tokio::test]
async fn invalid_target_is_rejected_before_transport(
    harness: Harness,
    #[case] addr: &str,
    #[case] timeout: std::time::Duration,
    #[case] expected: InvalidRequestShape,
) {
    let err = harness
        .producer
        .send_message_with_timeout(addr, BROKER_NAME, &messages(1), &send_header(0), timeout)
        .await
        .expect_err("invalid target must fail");

    assert!(matches!(err, ForwardError::InvalidRequestShape(shape) if shape == expected));
    assert!(harness.client.calls().is_empty());
}

#[tokio::test]
async fn prepared_send_gets_proxy_transaction_id() {
    let mut client = RecordingTransport::default();
    client.send_result = prepared_result(77);
    let harness = Harness::with_client(client);

    let result = harness
        .producer
        .send_message(
            BROKER_ADDR,
            BROKER_NAME,
            &messages(1),
            &send_header(sys_flag::TRANSACTION_PREPARED_TYPE),
        )
        .await
        .expect("send");

    let token = result.transaction_id.expect("transaction id");
    let id: TransactionId = token.parse().expect("token decodes");
    assert_eq!(id.broker_addr(), BROKER_ADDR);
    assert_eq!(id.broker_ref(), 77);
    assert_eq!(result.msg_id, "7F0000010001");
}

#[rstest]
#[case(sys_flag::TRANSACTION_NOT_TYPE)]
#[case(sys_flag::TRANSACTION_COMMIT_TYPE)]
#[case(sys_flag::TRANSACTION_ROLLBACK_TYPE)]
#[case(sys_flag::COMPRESSED_FLAG | sys_flag::BATCH_FLAG)]
fn non_prepared_results_pass_through(#[case] flag: i32) {
    let raw = prepared_result(5);
    let result = apply_transaction_id(BROKER_ADDR, flag, raw.clone()).expect("transform");
    assert_eq!(result, raw);
}

#[rstest]
#[case(SendStatus::FlushDiskTimeout)]
#[case(SendStatus::FlushSlaveTimeout)]
#[case(SendStatus::SlaveNotAvailable)]
fn unsuccessful_prepared_results_pass_through(#[case] status: SendStatus) {
    let raw = SendResult {
        status,
        ..prepared_result(5)
    };
    let result = apply_transaction_id(BROKER_ADDR, sys_flag::TRANSACTION_PREPARED_TYPE, raw.clone())
        .expect("transform");
    assert_eq!(result, raw);
}

#[test]
fn prepared_bit_is_read_amid_other_flags() {
    let flag = sys_flag::TRANSACTION_PREPARED_TYPE | sys_flag::COMPRESSED_FLAG | sys_flag::MULTI_TAGS_FLAG;
    let result = apply_transaction_id(BROKER_ADDR, flag, prepared_result(9)).expect("transform");
    let id = TransactionId::decode(result.transaction_id.as_deref().expect("token")).expect("decode");
    assert_eq!(id.into_parts(), (BROKER_ADDR.to_owned(), 9));
}

#[tokio::test]
async fn transport_failure_propagates_without_transform() {
    let mut client = RecordingTransport::default();
    client.fail_sends = true;
    let harness = Harness::with_client(client);

    let err = harness
        .producer
        .send_message(
            BROKER_ADDR,
            BROKER_NAME,
            &messages(3),
            &send_header(sys_flag::TRANSACTION_PREPARED_TYPE),
        )
        .await
        .expect_err("transport failure");

    assert!(matches!(err, ForwardError::Transport(TransportError::Io(_))));
    assert_eq!(harness.client.calls().len(), 1);
}

#[tokio::test]
async fn process_send_response_chains_the_transform() {
    let header = send_header(sys_flag::TRANSACTION_PREPARED_TYPE);
    let pending = future::ready(Ok::<_, TransportError>(prepared_result(3)));

    let result = process_send_response(BROKER_ADDR, &header, pending)
        .await
        .expect("processed");

    assert_ne!(result.transaction_id.as_deref(), Some("broker-issued"));
}

#[tokio::test]
async fn process_send_response_forwards_errors() {
    let header = send_header(sys_flag::TRANSACTION_PREPARED_TYPE);
    let pending = future::ready(Err::<SendResult, _>(TransportError::Disconnected));

    let err = process_send_response(BROKER_ADDR, &header, pending)
        .await
        .expect_err("error forwarded");

    assert!(matches!(err, ForwardError::Transport(TransportError::Disconnected)));
}
