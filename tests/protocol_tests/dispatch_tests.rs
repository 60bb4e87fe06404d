//! Dispatch Tests
//!
//! Requests carried out against a local store, as the node server does.

use std::collections::BTreeMap;
use std::sync::Arc;

use bytes::Bytes;
use rowvault::consistency::Consistency;
use rowvault::network::execute;
use rowvault::protocol::{encode_response, Reply, Request, Response};
use rowvault::schema::{ColumnFamilyDef, KeyspaceDef, ReplicationStrategy};
use rowvault::store::Column;
use rowvault::{LocalStore, MemoryNode, StoreError};

fn store() -> LocalStore {
    LocalStore::new(Arc::new(MemoryNode::new()))
}

#[test]
fn test_ping() {
    let mut store = store();
    assert_eq!(execute(&mut store, Request::Ping).unwrap(), Reply::Pong);
}

#[test]
fn test_schema_and_data_requests() {
    let mut store = store();

    let requests = vec![
        Request::AddKeyspace {
            def: KeyspaceDef::new("ks", ReplicationStrategy::Simple, BTreeMap::new()),
        },
        Request::UseKeyspace {
            keyspace: "ks".to_string(),
        },
        Request::AddColumnFamily {
            def: ColumnFamilyDef::new("ks", "cf", &["bytes"]),
        },
        Request::Insert {
            row: "r".to_string(),
            column_family: "cf".to_string(),
            column: Column::new("v", Bytes::from_static(b"1"), 1),
            consistency: Consistency::Any,
        },
    ];
    for request in requests {
        assert_eq!(execute(&mut store, request).unwrap(), Reply::Done);
    }

    let count = execute(
        &mut store,
        Request::GetCount {
            row: "r".to_string(),
            column_family: "cf".to_string(),
            consistency: Consistency::One,
        },
    )
    .unwrap();
    assert_eq!(count, Reply::Count(1));

    match execute(&mut store, Request::DescribeKeyspaces).unwrap() {
        Reply::Keyspaces(defs) => {
            assert_eq!(defs.len(), 1);
            assert_eq!(defs[0].column_families.len(), 1);
        }
        other => panic!("Expected keyspaces, got {:?}", other),
    }
}

#[test]
fn test_failures_become_error_responses() {
    let mut store = store();
    let result = execute(
        &mut store,
        Request::DropKeyspace {
            name: "missing".to_string(),
        },
    );
    assert!(matches!(result, Err(StoreError::NotFound(_))));

    let response = Response::from(result);
    assert!(!response.is_ok());
}

fn keyspace_with_rows(rows: &[(&str, Bytes)]) -> LocalStore {
    let mut store = store();
    execute(
        &mut store,
        Request::AddKeyspace {
            def: KeyspaceDef::new("ks", ReplicationStrategy::Simple, BTreeMap::new()),
        },
    )
    .unwrap();
    execute(&mut store, Request::UseKeyspace { keyspace: "ks".to_string() }).unwrap();
    execute(
        &mut store,
        Request::AddColumnFamily {
            def: ColumnFamilyDef::new("ks", "cf", &["bytes"]),
        },
    )
    .unwrap();

    for (row, value) in rows {
        execute(
            &mut store,
            Request::Insert {
                row: row.to_string(),
                column_family: "cf".to_string(),
                column: Column::new("bytes", value.clone(), 1),
                consistency: Consistency::Any,
            },
        )
        .unwrap();
    }
    store
}

fn page_keys(store: &mut LocalStore, limit: u32) -> Vec<String> {
    let reply = execute(
        store,
        Request::RangeSlice {
            column_family: "cf".to_string(),
            start_key: String::new(),
            limit,
            consistency: Consistency::One,
        },
    )
    .unwrap();
    match reply {
        Reply::Slices(slices) => slices.into_iter().map(|s| s.key).collect(),
        other => panic!("Expected slices, got {:?}", other),
    }
}

#[test]
fn test_small_range_pages_are_returned_whole() {
    let small = Bytes::from_static(b"tiny");
    let mut store = keyspace_with_rows(&[("a", small.clone()), ("b", small.clone()), ("c", small)]);

    assert_eq!(page_keys(&mut store, 10), vec!["a", "b", "c"]);
}

#[test]
fn test_oversized_range_pages_keep_two_rows() {
    // Rows share one buffer; the page would still encode to about 60 MiB
    let big = Bytes::from(vec![7u8; 20 * 1024 * 1024]);
    let mut store = keyspace_with_rows(&[("a", big.clone()), ("b", big.clone()), ("c", big)]);

    assert_eq!(page_keys(&mut store, 10), vec!["a", "b"]);

    let response = Response::from(execute(
        &mut store,
        Request::RangeSlice {
            column_family: "cf".to_string(),
            start_key: String::new(),
            limit: 10,
            consistency: Consistency::One,
        },
    ));
    assert!(encode_response(&response).is_ok());
}
