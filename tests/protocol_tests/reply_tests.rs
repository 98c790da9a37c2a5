//! Reply Tests
//!
//! Tests for status mapping and reply projections.

use bytes::Bytes;
use ssdbkv::prefix::KeyPrefixer;
use ssdbkv::protocol::encode_frame;
use ssdbkv::value::{SerializationMode, ValueCodec};
use ssdbkv::{Reply, SsdbError, Status, Value};

// =============================================================================
// Helper Functions
// =============================================================================

fn reply(blocks: &[&str]) -> Reply {
    Reply::parse(encode_frame(blocks)).unwrap()
}

fn raw() -> ValueCodec {
    ValueCodec::new(SerializationMode::None)
}

// =============================================================================
// Status Tests
// =============================================================================

#[test]
fn test_status_tokens() {
    assert_eq!(Status::from_token(b"ok"), Status::Ok);
    assert_eq!(Status::from_token(b"not_found"), Status::NotFound);
    assert_eq!(Status::from_token(b"error"), Status::Error);
    assert_eq!(Status::from_token(b"fail"), Status::Fail);
    assert_eq!(Status::from_token(b"client_error"), Status::ClientError);
}

#[test]
fn test_unknown_status_is_client_error() {
    assert_eq!(Status::from_token(b"OK"), Status::ClientError);
    assert_eq!(Status::from_token(b"noauth"), Status::ClientError);
    assert_eq!(reply(&["weird"]).status(), Status::ClientError);
}

#[test]
fn test_parse_splits_status_from_data() {
    let r = reply(&["ok", "a", "b"]);
    assert_eq!(r.status(), Status::Ok);
    assert_eq!(r.blocks(), &[Bytes::from_static(b"a"), Bytes::from_static(b"b")]);
}

#[test]
fn test_parse_rejects_empty_frame() {
    let err = Reply::parse(Bytes::from_static(b"\n")).unwrap_err();
    assert!(matches!(err, SsdbError::Protocol(_)));
}

// =============================================================================
// Scalar Projection Tests
// =============================================================================

#[test]
fn test_as_bool() {
    assert!(reply(&["ok", "1"]).as_bool().unwrap());
    assert!(!reply(&["ok", "0"]).as_bool().unwrap());
    assert!(reply(&["ok"]).as_bool().unwrap());
    assert!(!reply(&["not_found"]).as_bool().unwrap());
}

#[test]
fn test_as_number() {
    assert_eq!(reply(&["ok", "42"]).as_number().unwrap(), Some(42));
    assert_eq!(reply(&["ok", "-7"]).as_number().unwrap(), Some(-7));
    assert_eq!(reply(&["not_found"]).as_number().unwrap(), None);
}

#[test]
fn test_as_number_rejects_text() {
    let err = reply(&["ok", "abc"]).as_number().unwrap_err();
    assert!(matches!(err, SsdbError::Protocol(_)));
}

#[test]
fn test_ok_without_data_block_is_protocol_error() {
    let err = reply(&["ok"]).as_number().unwrap_err();
    assert!(matches!(err, SsdbError::Protocol(_)));
}

#[test]
fn test_as_float() {
    assert_eq!(reply(&["ok", "2.5"]).as_float().unwrap(), Some(2.5));
    assert_eq!(reply(&["ok", "3"]).as_float().unwrap(), Some(3.0));
    assert_eq!(reply(&["not_found"]).as_float().unwrap(), None);
}

#[test]
fn test_as_bytes_and_as_string() {
    let r = reply(&["ok", "hello"]);
    assert_eq!(r.as_bytes().unwrap(), Some(Bytes::from_static(b"hello")));
    assert_eq!(r.as_string(&raw()).unwrap(), Some(Value::from("hello")));
    assert_eq!(reply(&["not_found"]).as_string(&raw()).unwrap(), None);
}

#[test]
fn test_as_string_decodes_through_codec() {
    let codec = ValueCodec::new(SerializationMode::NativeStructured);
    let stored = codec.encode(&Value::Int(9)).unwrap();
    let r = Reply::parse(encode_frame(&[&b"ok"[..], &stored[..]])).unwrap();
    assert_eq!(r.as_string(&codec).unwrap(), Some(Value::Int(9)));
}

// =============================================================================
// Failure Status Tests
// =============================================================================

#[test]
fn test_error_status_carries_server_message() {
    let err = reply(&["error", "wrong type"]).as_bool().unwrap_err();
    match err {
        SsdbError::Server { status, message } => {
            assert_eq!(status, Status::Error);
            assert_eq!(message, "wrong type");
        }
        other => panic!("Expected server error, got {:?}", other),
    }
}

#[test]
fn test_fail_without_message_uses_status_token() {
    let err = reply(&["fail"]).as_list(None).unwrap_err();
    match err {
        SsdbError::Server { status, message } => {
            assert_eq!(status, Status::Fail);
            assert_eq!(message, "fail");
        }
        other => panic!("Expected server error, got {:?}", other),
    }
}

#[test]
fn test_every_projection_fails_on_client_error() {
    let r = reply(&["client_error", "bad"]);
    assert!(r.as_bool().is_err());
    assert!(r.as_number().is_err());
    assert!(r.as_float().is_err());
    assert!(r.as_bytes().is_err());
    assert!(r.as_list(None).is_err());
    assert!(r.as_map(None).is_err());
    assert!(r.as_score_map(None).is_err());
}

// =============================================================================
// Collection Projection Tests
// =============================================================================

#[test]
fn test_as_list_strips_prefix() {
    let prefixer = KeyPrefixer::new("app:");
    let r = reply(&["ok", "app:a", "app:b", "other"]);
    let list = r.as_list(Some(&prefixer)).unwrap();
    assert_eq!(list, vec![
        Bytes::from_static(b"a"),
        Bytes::from_static(b"b"),
        Bytes::from_static(b"other"),
    ]);
}

#[test]
fn test_as_list_not_found_is_empty() {
    assert!(reply(&["not_found"]).as_list(None).unwrap().is_empty());
    assert!(reply(&["ok"]).as_list(None).unwrap().is_empty());
}

#[test]
fn test_as_value_list() {
    let values = reply(&["ok", "x", "y"]).as_value_list(&raw()).unwrap();
    assert_eq!(values, vec![Value::from("x"), Value::from("y")]);
}

#[test]
fn test_as_map_keeps_wire_order() {
    let map = reply(&["ok", "b", "2", "a", "1"]).as_map(None).unwrap();
    assert_eq!(map, vec![
        (Bytes::from_static(b"b"), Bytes::from_static(b"2")),
        (Bytes::from_static(b"a"), Bytes::from_static(b"1")),
    ]);
}

#[test]
fn test_as_map_odd_block_count() {
    let err = reply(&["ok", "k1", "v1", "k2"]).as_map(None).unwrap_err();
    assert!(matches!(err, SsdbError::Protocol(_)));
}

#[test]
fn test_as_value_map_strips_and_decodes() {
    let prefixer = KeyPrefixer::new("p:");
    let map = reply(&["ok", "p:k", "v"]).as_value_map(Some(&prefixer), &raw()).unwrap();
    assert_eq!(map, vec![(Bytes::from_static(b"k"), Value::from("v"))]);
}

#[test]
fn test_as_score_map() {
    let scores = reply(&["ok", "m1", "10", "m2", "-3"]).as_score_map(None).unwrap();
    assert_eq!(scores, vec![
        (Bytes::from_static(b"m1"), 10),
        (Bytes::from_static(b"m2"), -3),
    ]);
}

#[test]
fn test_as_score_map_rejects_non_integer_score() {
    let err = reply(&["ok", "m1", "1.5"]).as_score_map(None).unwrap_err();
    assert!(matches!(err, SsdbError::Protocol(_)));
}

#[test]
fn test_map_not_found_is_empty() {
    assert!(reply(&["not_found"]).as_map(None).unwrap().is_empty());
    assert!(reply(&["not_found"]).as_score_map(None).unwrap().is_empty());
}
