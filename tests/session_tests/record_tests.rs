//! Record Tests

use std::sync::Arc;

use bytes::Bytes;
use rowvault::consistency::Consistency;
use rowvault::store::Column;
use rowvault::{Error, MemoryNode, Store};

use crate::common::{columns, open_session, open_session_on, CF, KEYSPACE};

#[test]
fn test_put_then_get() {
    let mut session = open_session(16, 5);
    let record = columns(&[("name", "ada"), ("lang", "en")]);

    session.put_record(CF, "user:1", &record).unwrap();
    assert_eq!(session.get_record(CF, "user:1").unwrap(), Some(record));
}

#[test]
fn test_get_missing_record_is_none() {
    let mut session = open_session(16, 5);
    assert_eq!(session.get_record(CF, "nobody").unwrap(), None);
    assert!(!session.exists(CF, "nobody").unwrap());
}

#[test]
fn test_put_merges_columns() {
    let mut session = open_session(16, 5);
    session
        .put_record(CF, "k", &columns(&[("a", "1"), ("b", "2")]))
        .unwrap();
    session
        .put_record(CF, "k", &columns(&[("b", "20"), ("c", "30")]))
        .unwrap();

    assert_eq!(
        session.get_record(CF, "k").unwrap(),
        Some(columns(&[("a", "1"), ("b", "20"), ("c", "30")]))
    );
}

#[test]
fn test_non_ascii_values_round_trip() {
    let mut session = open_session(16, 5);
    let record = columns(&[("greeting", "héllo wörld ✓"), ("empty", "")]);

    session.put_record(CF, "intl", &record).unwrap();
    assert_eq!(session.get_record(CF, "intl").unwrap(), Some(record));
}

#[test]
fn test_add_record_only_when_absent() {
    let mut session = open_session(16, 5);

    assert!(session
        .add_record(CF, "k", &columns(&[("v", "first")]))
        .unwrap());
    assert!(!session
        .add_record(CF, "k", &columns(&[("v", "second")]))
        .unwrap());

    assert_eq!(session.get_record(CF, "k").unwrap().unwrap()["v"], "first");
}

#[test]
fn test_delete_record() {
    let mut session = open_session(16, 5);
    session
        .put_record(CF, "k", &columns(&[("v", "x")]))
        .unwrap();

    session.delete_record(CF, "k").unwrap();
    assert_eq!(session.get_record(CF, "k").unwrap(), None);
    assert!(!session.exists(CF, "k").unwrap());

    // Deleting again is fine
    session.delete_record(CF, "k").unwrap();
}

#[test]
fn test_put_after_delete_revives_record() {
    let mut session = open_session(16, 5);
    session
        .put_record(CF, "k", &columns(&[("old", "1")]))
        .unwrap();
    session.delete_record(CF, "k").unwrap();
    session
        .put_record(CF, "k", &columns(&[("new", "2")]))
        .unwrap();

    assert_eq!(
        session.get_record(CF, "k").unwrap(),
        Some(columns(&[("new", "2")]))
    );
}

#[test]
fn test_rapid_rewrites_keep_the_latest() {
    let mut session = open_session(16, 5);
    for i in 0..200 {
        let value = i.to_string();
        session
            .put_record(CF, "counter", &columns(&[("n", value.as_str())]))
            .unwrap();
    }
    assert_eq!(
        session.get_record(CF, "counter").unwrap().unwrap()["n"],
        "199"
    );
}

#[test]
fn test_sessions_share_a_node() {
    let node = Arc::new(MemoryNode::new());
    let mut writer = open_session_on(Arc::clone(&node), 16, 5);
    let mut reader = open_session_on(node, 16, 5);

    writer
        .put_record(CF, "shared", &columns(&[("v", "1")]))
        .unwrap();
    assert!(reader.exists(CF, "shared").unwrap());
}

#[test]
fn test_record_in_missing_column_family_is_a_fault() {
    let mut session = open_session(16, 5);
    let err = session
        .put_record("missing", "k", &columns(&[("v", "x")]))
        .unwrap_err();
    assert!(matches!(err, Error::Fault(_)));
}

#[test]
fn test_empty_key_is_a_fault() {
    let mut session = open_session(16, 5);
    assert!(matches!(
        session.get_record(CF, ""),
        Err(Error::Fault(rowvault::StoreError::InvalidRequest(_)))
    ));
}

#[test]
fn test_binary_value_fails_to_decode() {
    let node = Arc::new(MemoryNode::new());
    let mut session = open_session_on(Arc::clone(&node), 16, 5);

    let mut raw = rowvault::LocalStore::new(node);
    raw.use_keyspace(KEYSPACE).unwrap();
    raw.insert(
        "blob",
        CF,
        Column::new("data", Bytes::from_static(&[0xc3, 0x28]), 1),
        Consistency::Any,
    )
    .unwrap();

    assert!(matches!(
        session.get_record(CF, "blob"),
        Err(Error::Encoding(_))
    ));
}
