//! RecordScanner Tests
//!
//! Drives the scanner directly against stores with hand-built contents.

use std::ops::ControlFlow;
use std::sync::Arc;

use bytes::Bytes;
use rowvault::consistency::Consistency;
use rowvault::scan::RecordScanner;
use rowvault::store::Column;
use rowvault::{LocalStore, MemoryNode, Store};

use crate::common::{open_counting_session, CF, KEYSPACE};

fn seeded_store(keys: &[&str]) -> LocalStore {
    let node = Arc::new(MemoryNode::new());
    let (mut session, _, _) = open_counting_session(Arc::clone(&node), 16, 5);
    for key in keys {
        session
            .put_record(CF, key, &crate::common::columns(&[("v", *key)]))
            .unwrap();
    }
    drop(session);

    let mut store = LocalStore::new(node);
    store.use_keyspace(KEYSPACE).unwrap();
    store
}

fn scan(store: &mut LocalStore, batch_size: u32) -> Vec<String> {
    let mut keys = Vec::new();
    RecordScanner::new(store, batch_size, Consistency::One)
        .for_each(CF, |key, _| {
            keys.push(key.to_string());
            ControlFlow::Continue(())
        })
        .unwrap();
    keys
}

#[test]
fn test_batch_size_below_two_is_raised() {
    let mut store = seeded_store(&["a", "b", "c", "d"]);
    assert_eq!(scan(&mut store, 0), vec!["a", "b", "c", "d"]);
    assert_eq!(scan(&mut store, 1), vec!["a", "b", "c", "d"]);
}

#[test]
fn test_large_batch_reads_everything_in_one_page() {
    let mut store = seeded_store(&["a", "b", "c"]);
    assert_eq!(scan(&mut store, 1000), vec!["a", "b", "c"]);
}

#[test]
fn test_pages_overlap_by_one_row() {
    let node = Arc::new(MemoryNode::new());
    let (mut session, _, ranges) = open_counting_session(node, 16, 4);
    // 7 keys with batch 4: pages [0..4), [3..7), [6..7)
    for i in 0..7 {
        session
            .put_record(CF, &format!("k{}", i), &crate::common::columns(&[("v", "x")]))
            .unwrap();
    }

    let before = ranges.get();
    let visited = session
        .for_each_record(CF, |_, _| ControlFlow::Continue(()))
        .unwrap();

    assert_eq!(visited, 7);
    assert_eq!(ranges.get() - before, 3);
}

#[test]
fn test_invalid_utf8_value_fails_the_scan() {
    let mut store = seeded_store(&["a"]);
    store
        .insert(
            "b",
            CF,
            Column::new("raw", Bytes::from_static(&[0xff, 0x00]), i64::MAX),
            Consistency::Any,
        )
        .unwrap();

    let result = RecordScanner::new(&mut store, 5, Consistency::One)
        .for_each(CF, |_, _| ControlFlow::Continue(()));
    assert!(matches!(result, Err(rowvault::Error::Encoding(_))));
}

#[test]
fn test_works_through_boxed_store() {
    let mut store: Box<dyn Store> = Box::new(seeded_store(&["x", "y"]));

    let mut count = 0;
    let visited = RecordScanner::new(&mut store, 2, Consistency::One)
        .for_each(CF, |_, _| {
            count += 1;
            ControlFlow::Continue(())
        })
        .unwrap();

    assert_eq!(visited, 2);
    assert_eq!(count, 2);
}
