//! LocalStore Tests

use std::collections::BTreeMap;
use std::sync::Arc;

use bytes::Bytes;
use rowvault::consistency::Consistency;
use rowvault::schema::{ColumnFamilyDef, KeyspaceDef, ReplicationStrategy};
use rowvault::store::Column;
use rowvault::{LocalStore, MemoryNode, Store, StoreError};

fn secured_node() -> Arc<MemoryNode> {
    let mut users = BTreeMap::new();
    users.insert("admin".to_string(), "pw".to_string());
    Arc::new(MemoryNode::with_credentials(users))
}

#[test]
fn test_data_calls_need_a_keyspace() {
    let mut store = LocalStore::new(Arc::new(MemoryNode::new()));
    assert_eq!(store.keyspace(), None);

    assert!(matches!(
        store.get_slice("r", "cf", Consistency::One),
        Err(StoreError::InvalidRequest(_))
    ));
    assert!(matches!(
        store.drop_column_family("cf"),
        Err(StoreError::InvalidRequest(_))
    ));
}

#[test]
fn test_use_keyspace_does_not_require_existence() {
    let mut store = LocalStore::new(Arc::new(MemoryNode::new()));
    store.use_keyspace("later").unwrap();
    assert_eq!(store.keyspace(), Some("later"));

    assert!(matches!(
        store.get_count("r", "cf", Consistency::One),
        Err(StoreError::NotFound(_))
    ));
}

#[test]
fn test_use_keyspace_rejects_empty_name() {
    let mut store = LocalStore::new(Arc::new(MemoryNode::new()));
    assert!(matches!(
        store.use_keyspace(""),
        Err(StoreError::InvalidRequest(_))
    ));
}

#[test]
fn test_secured_node_requires_login() {
    let mut store = LocalStore::new(secured_node());
    store.use_keyspace("ks").unwrap();

    assert!(matches!(
        store.describe_keyspaces(),
        Err(StoreError::Unauthorized(_))
    ));

    store.login("admin", "pw").unwrap();
    assert!(store.describe_keyspaces().unwrap().is_empty());
}

#[test]
fn test_failed_login_keeps_session_locked() {
    let mut store = LocalStore::new(secured_node());

    assert!(store.login("admin", "wrong").unwrap_err().is_auth());
    assert!(matches!(
        store.add_keyspace(KeyspaceDef::new("ks", ReplicationStrategy::Simple, BTreeMap::new())),
        Err(StoreError::Unauthorized(_))
    ));
}

#[test]
fn test_sessions_keep_separate_keyspaces() {
    let node = Arc::new(MemoryNode::new());
    for ks in ["one", "two"] {
        node.add_keyspace(KeyspaceDef::new(ks, ReplicationStrategy::Simple, BTreeMap::new()))
            .unwrap();
        node.add_column_family(ColumnFamilyDef::new(ks, "cf", &[])).unwrap();
    }

    let mut first = LocalStore::new(Arc::clone(&node));
    let mut second = LocalStore::new(Arc::clone(&node));
    first.use_keyspace("one").unwrap();
    second.use_keyspace("two").unwrap();

    first
        .insert("r", "cf", Column::new("v", Bytes::from_static(b"1"), 1), Consistency::Any)
        .unwrap();

    assert_eq!(first.get_count("r", "cf", Consistency::One).unwrap(), 1);
    assert_eq!(second.get_count("r", "cf", Consistency::One).unwrap(), 0);
    assert!(Arc::ptr_eq(first.node(), second.node()));
}
