//! Tests for Client
//!
//! These tests verify:
//! - The exact arguments each verb sends
//! - Key prefixing and stripping per verb family
//! - Value encoding and reply projection
//! - Argument validation before any I/O

use std::io::{BufReader, Write};
use std::net::TcpListener;
use std::thread::{self, JoinHandle};

use bytes::Bytes;
use ssdbkv::protocol::{encode_frame, parse_blocks, read_frame};
use ssdbkv::value::ValueCodec;
use ssdbkv::{Client, Command, Endpoint, SerializationMode, Session, SessionPool, SsdbError, Value};

// =============================================================================
// Helper Functions
// =============================================================================

type Requests = JoinHandle<Vec<Vec<String>>>;

/// Connect a client to a fake server that answers with `replies` in order.
fn client_with(replies: Vec<Vec<Vec<u8>>>) -> (Client, Requests) {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    let endpoint = Endpoint::builder()
        .host("127.0.0.1")
        .port(port)
        .read_timeout(2.0)
        .build()
        .unwrap();

    let server = thread::spawn(move || {
        let (stream, _) = listener.accept().unwrap();
        let mut reader = BufReader::new(stream.try_clone().unwrap());
        let mut writer = stream;
        let mut requests = Vec::new();
        for reply in replies {
            let frame = match read_frame(&mut reader) {
                Ok(frame) => frame,
                Err(_) => break,
            };
            let blocks = parse_blocks(&frame).unwrap();
            requests.push(
                blocks
                    .iter()
                    .map(|b| String::from_utf8_lossy(b).into_owned())
                    .collect(),
            );
            writer.write_all(&encode_frame(&reply)).unwrap();
        }
        requests
    });

    (Client::connect(endpoint).unwrap(), server)
}

/// Reply made of text blocks
fn text(blocks: &[&str]) -> Vec<Vec<u8>> {
    blocks.iter().map(|b| b.as_bytes().to_vec()).collect()
}

fn json(value: &Value) -> Vec<u8> {
    ValueCodec::new(SerializationMode::NativeStructured)
        .encode(value)
        .unwrap()
        .to_vec()
}

fn offline() -> Client {
    Client::from_session(Session::new())
}

// =============================================================================
// Key/Value Tests
// =============================================================================

#[test]
fn test_set_and_get_with_prefix() {
    let (mut client, server) = client_with(vec![text(&["ok", "1"]), text(&["ok", "v"])]);
    client.set_prefix("app:");

    assert!(client.set("k", "v", None).unwrap());
    assert_eq!(client.get("k").unwrap(), Some(Value::from("v")));

    let requests = server.join().unwrap();
    assert_eq!(requests[0], vec!["set", "app:k", "v"]);
    assert_eq!(requests[1], vec!["get", "app:k"]);
}

#[test]
fn test_get_missing_key() {
    let (mut client, server) = client_with(vec![text(&["not_found"])]);
    assert_eq!(client.get("nope").unwrap(), None);
    server.join().unwrap();
}

#[test]
fn test_set_with_ttl_uses_setx() {
    let (mut client, server) = client_with(vec![text(&["ok", "1"])]);
    assert!(client.set("session", "token", Some(60)).unwrap());
    assert_eq!(server.join().unwrap()[0], vec!["setx", "session", "token", "60"]);
}

#[test]
fn test_incr_and_exists() {
    let (mut client, server) = client_with(vec![text(&["ok", "5"]), text(&["ok", "0"])]);

    assert_eq!(client.incr("hits", 2).unwrap(), Some(5));
    assert!(!client.exists("ghost").unwrap());

    let requests = server.join().unwrap();
    assert_eq!(requests[0], vec!["incr", "hits", "2"]);
    assert_eq!(requests[1], vec!["exists", "ghost"]);
}

#[test]
fn test_structured_values_round_trip_through_json() {
    let value = Value::List(vec![Value::Int(1), Value::Float(2.5)]);
    let (mut client, server) =
        client_with(vec![text(&["ok", "1"]), vec![b"ok".to_vec(), json(&value)]]);
    client.set_serialization_mode(SerializationMode::NativeStructured);

    assert!(client.set("k", value.clone(), None).unwrap());
    assert_eq!(client.get("k").unwrap(), Some(value.clone()));

    let requests = server.join().unwrap();
    let stored = String::from_utf8(json(&value)).unwrap();
    assert_eq!(requests[0], vec!["set".to_string(), "k".to_string(), stored]);
}

#[test]
fn test_keys_prefixes_bounds_and_strips_results() {
    let (mut client, server) = client_with(vec![text(&["ok", "app:b", "app:c"])]);
    client.set_prefix("app:");

    let keys = client.keys("a", "", 10).unwrap();

    assert_eq!(keys, vec![Bytes::from_static(b"b"), Bytes::from_static(b"c")]);
    assert_eq!(server.join().unwrap()[0], vec!["keys", "app:a", "", "10"]);
}

#[test]
fn test_scan_returns_stripped_pairs() {
    let (mut client, server) = client_with(vec![text(&["ok", "p_a", "1", "p_b", "2"])]);
    client.set_prefix("p_");

    let pairs = client.scan("", "", 100).unwrap();

    assert_eq!(pairs, vec![
        (Bytes::from_static(b"a"), Value::from("1")),
        (Bytes::from_static(b"b"), Value::from("2")),
    ]);
    server.join().unwrap();
}

#[test]
fn test_multi_set_and_multi_get() {
    let (mut client, server) =
        client_with(vec![text(&["ok", "2"]), text(&["ok", "p_a", "x", "p_b", "y"])]);
    client.set_prefix("p_");

    assert_eq!(client.multi_set(&[("a", "x"), ("b", "y")]).unwrap(), Some(2));
    let got = client.multi_get(&["a", "b", "c"]).unwrap();
    assert_eq!(got.len(), 2);
    assert_eq!(got[0], (Bytes::from_static(b"a"), Value::from("x")));

    let requests = server.join().unwrap();
    assert_eq!(requests[0], vec!["multi_set", "p_a", "x", "p_b", "y"]);
    assert_eq!(requests[1], vec!["multi_get", "p_a", "p_b", "p_c"]);
}

// =============================================================================
// Hash Tests
// =============================================================================

#[test]
fn test_hash_fields_are_not_prefixed() {
    let (mut client, server) = client_with(vec![
        text(&["ok", "1"]),
        text(&["ok", "f1", "v1", "f2", "v2"]),
        text(&["ok", "p_h1", "p_h2"]),
    ]);
    client.set_prefix("p_");

    assert!(client.hset("h", "f1", "v1").unwrap());
    let all = client.hgetall("h").unwrap();
    let names = client.hlist("", "", 10).unwrap();

    assert_eq!(all[1], (Bytes::from_static(b"f2"), Value::from("v2")));
    assert_eq!(names, vec![Bytes::from_static(b"h1"), Bytes::from_static(b"h2")]);

    let requests = server.join().unwrap();
    assert_eq!(requests[0], vec!["hset", "p_h", "f1", "v1"]);
    assert_eq!(requests[1], vec!["hgetall", "p_h"]);
    assert_eq!(requests[2], vec!["hlist", "", "", "10"]);
}

#[test]
fn test_hget_and_multi_hdel() {
    let (mut client, server) = client_with(vec![text(&["not_found"]), text(&["ok", "2"])]);

    assert_eq!(client.hget("h", "f").unwrap(), None);
    assert_eq!(client.multi_hdel("h", &["a", "b"]).unwrap(), Some(2));

    let requests = server.join().unwrap();
    assert_eq!(requests[0], vec!["hget", "h", "f"]);
    assert_eq!(requests[1], vec!["multi_hdel", "h", "a", "b"]);
}

#[test]
fn test_hscan_sends_inner_bounds() {
    let (mut client, server) = client_with(vec![text(&["ok", "f", "v"])]);
    client.set_prefix("p_");

    let pairs = client.hscan("h", "a", "z", 5).unwrap();

    assert_eq!(pairs, vec![(Bytes::from_static(b"f"), Value::from("v"))]);
    assert_eq!(server.join().unwrap()[0], vec!["hscan", "p_h", "a", "z", "5"]);
}

// =============================================================================
// Sorted Set Tests
// =============================================================================

#[test]
fn test_zset_scores_are_text() {
    let (mut client, server) = client_with(vec![
        text(&["ok", "1"]),
        text(&["ok", "m1", "-3", "m2", "7"]),
        text(&["ok", "2.5"]),
    ]);
    client.set_serialization_mode(SerializationMode::CompactBinary);

    assert!(client.zset("z", "m1", -3).unwrap());
    let range = client.zrange("z", 0, 10).unwrap();
    let avg = client.zavg("z", None, Some(100)).unwrap();

    assert_eq!(range, vec![
        (Bytes::from_static(b"m1"), -3),
        (Bytes::from_static(b"m2"), 7),
    ]);
    assert_eq!(avg, Some(2.5));

    let requests = server.join().unwrap();
    assert_eq!(requests[0], vec!["zset", "z", "m1", "-3"]);
    assert_eq!(requests[1], vec!["zrange", "z", "0", "10"]);
    assert_eq!(requests[2], vec!["zavg", "z", "", "100"]);
}

#[test]
fn test_multi_zset_and_zscan() {
    let (mut client, server) = client_with(vec![text(&["ok", "2"]), text(&["ok", "a", "1"])]);
    client.set_prefix("p_");

    assert_eq!(client.multi_zset("z", &[("a", 1), ("b", 2)]).unwrap(), Some(2));
    let scan = client.zscan("z", "", Some(0), None, 10).unwrap();

    assert_eq!(scan, vec![(Bytes::from_static(b"a"), 1)]);
    let requests = server.join().unwrap();
    assert_eq!(requests[0], vec!["multi_zset", "p_z", "a", "1", "b", "2"]);
    assert_eq!(requests[1], vec!["zscan", "p_z", "", "0", "", "10"]);
}

// =============================================================================
// Queue Tests
// =============================================================================

#[test]
fn test_queue_push_and_pop() {
    let (mut client, server) = client_with(vec![
        text(&["ok", "3"]),
        text(&["ok", "a"]),
        text(&["ok", "b", "c"]),
    ]);
    client.set_prefix("q:");

    assert_eq!(client.qpush_back_many("jobs", &["a", "b", "c"]).unwrap(), Some(3));
    assert_eq!(client.qpop("jobs").unwrap(), Some(Value::from("a")));
    assert_eq!(client.qpop_many("jobs", 2).unwrap(), vec![Value::from("b"), Value::from("c")]);

    let requests = server.join().unwrap();
    assert_eq!(requests[0], vec!["qpush_back", "q:jobs", "a", "b", "c"]);
    assert_eq!(requests[1], vec!["qpop", "q:jobs"]);
    assert_eq!(requests[2], vec!["qpop", "q:jobs", "2"]);
}

#[test]
fn test_qlist_strips_and_qslice_decodes() {
    let (mut client, server) =
        client_with(vec![text(&["ok", "q:one"]), vec![b"ok".to_vec(), json(&Value::Int(4))]]);
    client.set_prefix("q:");
    client.set_serialization_mode(SerializationMode::NativeStructured);

    assert_eq!(client.qlist("", "", 10).unwrap(), vec![Bytes::from_static(b"one")]);
    assert_eq!(client.qslice("one", 0, -1).unwrap(), vec![Value::Int(4)]);

    let requests = server.join().unwrap();
    assert_eq!(requests[1], vec!["qslice", "q:one", "0", "-1"]);
}

#[test]
fn test_clear_verbs_return_removed_count() {
    let (mut client, server) = client_with(vec![
        text(&["ok", "3"]),
        text(&["ok", "0"]),
        text(&["ok", "5"]),
    ]);
    client.set_prefix("c:");

    assert_eq!(client.hclear("h").unwrap(), Some(3));
    assert_eq!(client.zclear("z").unwrap(), Some(0));
    assert_eq!(client.qclear("q").unwrap(), Some(5));

    let requests = server.join().unwrap();
    assert_eq!(requests[0], vec!["hclear", "c:h"]);
    assert_eq!(requests[1], vec!["zclear", "c:z"]);
    assert_eq!(requests[2], vec!["qclear", "c:q"]);
}

// =============================================================================
// Raw and Persistent Tests
// =============================================================================

#[test]
fn test_raw_command_is_not_prefixed() {
    let (mut client, server) = client_with(vec![text(&["ok", "42"])]);
    client.set_prefix("p_");

    let reply = client.raw(&Command::new("dbsize").arg("x")).unwrap();

    assert_eq!(reply.as_number().unwrap(), Some(42));
    assert_eq!(server.join().unwrap()[0], vec!["dbsize", "x"]);
}

#[test]
fn test_connect_persistent_returns_session_to_global_pool() {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    let endpoint = Endpoint::builder()
        .host("127.0.0.1")
        .port(port)
        .persistent_id(format!("client-test-{}", port))
        .build()
        .unwrap();
    let server = thread::spawn(move || listener.accept().map(|_| ()).is_ok());

    let client = Client::connect_persistent(&endpoint).unwrap();
    assert!(client.session().is_connected());
    drop(client);

    assert_eq!(SessionPool::global().idle_count(&endpoint.persistence_key()), 1);
    assert!(server.join().unwrap());
    SessionPool::global().clear();
}

// =============================================================================
// Validation Tests
// =============================================================================

#[test]
fn test_empty_key_is_rejected() {
    let mut client = offline();
    assert!(matches!(client.get(""), Err(SsdbError::InvalidArgument(_))));
    assert!(matches!(client.hset("h", "", "v"), Err(SsdbError::InvalidArgument(_))));
}

#[test]
fn test_empty_value_is_rejected() {
    let mut client = offline();
    assert!(matches!(client.set("k", "", None), Err(SsdbError::InvalidArgument(_))));
    assert!(matches!(client.qpush("q", ""), Err(SsdbError::InvalidArgument(_))));
}

#[test]
fn test_zero_ttl_and_limit_are_rejected() {
    let mut client = offline();
    assert!(matches!(client.set("k", "v", Some(0)), Err(SsdbError::InvalidArgument(_))));
    assert!(matches!(client.keys("", "", 0), Err(SsdbError::InvalidArgument(_))));
    assert!(matches!(client.qpop_many("q", 0), Err(SsdbError::InvalidArgument(_))));
}

#[test]
fn test_empty_batch_is_rejected() {
    let mut client = offline();
    let none: [&str; 0] = [];
    assert!(matches!(client.multi_get(&none), Err(SsdbError::InvalidArgument(_))));
    assert!(matches!(client.qpush_many("q", &none), Err(SsdbError::InvalidArgument(_))));
}

#[test]
fn test_unserializable_value_fails_before_io() {
    let mut client = offline();
    let err = client.set("k", Value::Int(1), None).unwrap_err();
    assert!(matches!(err, SsdbError::Codec(_)));
}
