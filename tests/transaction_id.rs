#![cfg(not(loom))]
//! Public behaviour of the proxy transaction-id codec.

use mqforward::{TransactionId, TransactionIdError};
use rstest::rstest;

#[test]
fn token_routes_back_to_the_issuing_broker() {
    let id = TransactionId::new("10.0.0.5:10911", 77).expect("valid address");
    let token = id.to_string();

    let decoded: TransactionId = token.parse().expect("decodes");

    assert_eq!(decoded, id);
    assert_eq!(decoded.broker_addr(), "10.0.0.5:10911");
    assert_eq!(decoded.broker_ref(), 77);
}

#[test]
fn distinct_brokers_yield_distinct_tokens() {
    let a = TransactionId::new("10.0.0.5:10911", 77).expect("valid").encode();
    let b = TransactionId::new("10.0.0.6:10911", 77).expect("valid").encode();
    let c = TransactionId::new("10.0.0.5:10911", 78).expect("valid").encode();

    assert_ne!(a, b);
    assert_ne!(a, c);
}

#[rstest]
#[case("", "empty token")]
#[case("zz", "not hex")]
#[case("02000161", "unknown version")]
#[case("0100", "truncated")]
fn malformed_tokens_are_rejected(#[case] token: &str, #[case] label: &str) {
    let result: Result<TransactionId, TransactionIdError> = token.parse();
    assert!(result.is_err(), "{label} should not decode");
}

#[test]
fn empty_address_cannot_be_encoded() {
    assert!(matches!(
        TransactionId::new("", 1),
        Err(TransactionIdError::EmptyAddress)
    ));
}
