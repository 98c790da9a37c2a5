//! Value Codec Tests
//!
//! Tests for serialization modes and the process-wide default mode.

use ssdbkv::value::{default_mode, set_default_mode, SerializationMode, ValueCodec};
use ssdbkv::{Session, SsdbError, Value};

// =============================================================================
// Helper Functions
// =============================================================================

fn sample() -> Value {
    Value::Map(vec![
        (Value::from("name"), Value::from("ada")),
        (Value::from("age"), Value::Int(36)),
        (Value::from("ratio"), Value::Float(0.1)),
        (
            Value::from("tags"),
            Value::List(vec![Value::Bool(true), Value::Null, Value::from(&b"\0\xff"[..])]),
        ),
    ])
}

// =============================================================================
// Mode Tests
// =============================================================================

#[test]
fn test_mode_codes() {
    assert_eq!(SerializationMode::None.code(), 0);
    assert_eq!(SerializationMode::NativeStructured.code(), 1);
    assert_eq!(SerializationMode::CompactBinary.code(), 2);
    assert_eq!(SerializationMode::from_code(2).unwrap(), SerializationMode::CompactBinary);
}

#[test]
fn test_unknown_mode_code_is_rejected() {
    assert!(matches!(SerializationMode::from_code(3), Err(SsdbError::Config(_))));
    assert!(matches!(SerializationMode::from_code(-1), Err(SsdbError::Config(_))));
}

#[test]
fn test_mode_from_str() {
    assert_eq!("0".parse::<SerializationMode>().unwrap(), SerializationMode::None);
    assert_eq!("json".parse::<SerializationMode>().unwrap(), SerializationMode::NativeStructured);
    assert_eq!(" Compact ".parse::<SerializationMode>().unwrap(), SerializationMode::CompactBinary);
    assert!("yaml".parse::<SerializationMode>().is_err());
}

// =============================================================================
// Codec Tests
// =============================================================================

#[test]
fn test_none_mode_passes_bytes_through() {
    let codec = ValueCodec::new(SerializationMode::None);
    let encoded = codec.encode(&Value::from("plain")).unwrap();
    assert_eq!(&encoded[..], b"plain");
    assert_eq!(codec.decode(b"plain").unwrap(), Value::from("plain"));
}

#[test]
fn test_none_mode_rejects_structured_values() {
    let codec = ValueCodec::new(SerializationMode::None);
    for value in [Value::Int(1), Value::Null, sample()] {
        assert!(matches!(codec.encode(&value), Err(SsdbError::Codec(_))));
    }
}

#[test]
fn test_structured_modes_round_trip() {
    for mode in [SerializationMode::NativeStructured, SerializationMode::CompactBinary] {
        let codec = ValueCodec::new(mode);
        let encoded = codec.encode(&sample()).unwrap();
        assert_eq!(codec.decode(&encoded).unwrap(), sample(), "mode {}", mode);
    }
}

#[test]
fn test_native_structured_is_json() {
    let codec = ValueCodec::new(SerializationMode::NativeStructured);
    let encoded = codec.encode(&Value::Int(5)).unwrap();
    let parsed: serde_json::Value = serde_json::from_slice(&encoded).unwrap();
    assert!(parsed.is_object());
}

#[test]
fn test_decode_garbage_is_codec_error() {
    let json = ValueCodec::new(SerializationMode::NativeStructured);
    assert!(matches!(json.decode(b"{not json"), Err(SsdbError::Codec(_))));

    let bincode = ValueCodec::new(SerializationMode::CompactBinary);
    assert!(matches!(bincode.decode(b"\xff\xff\xff\xff"), Err(SsdbError::Codec(_))));
}

// =============================================================================
// Default Mode Tests
// =============================================================================

#[test]
fn test_default_mode_applies_to_new_sessions_only() {
    let before = Session::new();
    assert_eq!(default_mode(), SerializationMode::None);

    set_default_mode(SerializationMode::CompactBinary);
    let after = Session::new();
    set_default_mode(SerializationMode::None);

    assert_eq!(before.serialization_mode(), SerializationMode::None);
    assert_eq!(after.serialization_mode(), SerializationMode::CompactBinary);
}
