//! Lifecycle and Configuration Tests

use std::collections::BTreeMap;
use std::ops::ControlFlow;
use std::sync::Arc;

use rowvault::config::{DEFAULT_CHUNK_SIZE, DEFAULT_RECORD_BATCH_SIZE};
use rowvault::protocol::MAX_CHUNK_SIZE;
use rowvault::consistency::Consistency;
use rowvault::schema::ReplicationStrategy;
use rowvault::{ConnectionConfig, Error, LocalStore, MemoryNode, Session, StoreError};

use crate::common::{columns, open_session, CF, KEYSPACE};

fn secured_node() -> Arc<MemoryNode> {
    let mut users = BTreeMap::new();
    users.insert("admin".to_string(), "s3cret".to_string());
    Arc::new(MemoryNode::with_credentials(users))
}

// =============================================================================
// Close
// =============================================================================

#[test]
fn test_close_is_idempotent() {
    let mut session = open_session(16, 5);
    assert!(!session.is_closed());

    session.close();
    session.close();
    session.close();
    assert!(session.is_closed());
}

#[test]
fn test_operations_after_close_fail() {
    let mut session = open_session(16, 5);
    session.close();

    let record = columns(&[("a", "b")]);
    assert!(matches!(session.keyspaces(), Err(Error::Closed)));
    assert!(matches!(session.column_families(), Err(Error::Closed)));
    assert!(matches!(
        session.add_keyspace(ReplicationStrategy::Simple, BTreeMap::new()),
        Err(Error::Closed)
    ));
    assert!(matches!(session.delete_keyspace(), Err(Error::Closed)));
    assert!(matches!(session.add_column_family("x", &[]), Err(Error::Closed)));
    assert!(matches!(session.delete_column_family("x"), Err(Error::Closed)));
    assert!(matches!(session.put_record(CF, "k", &record), Err(Error::Closed)));
    assert!(matches!(session.add_record(CF, "k", &record), Err(Error::Closed)));
    assert!(matches!(session.get_record(CF, "k"), Err(Error::Closed)));
    assert!(matches!(session.exists(CF, "k"), Err(Error::Closed)));
    assert!(matches!(session.delete_record(CF, "k"), Err(Error::Closed)));
    assert!(matches!(session.delete(CF, "k"), Err(Error::Closed)));
    assert!(matches!(session.file_info(CF, "k"), Err(Error::Closed)));
    assert!(matches!(
        session.for_each_record(CF, |_, _| ControlFlow::Continue(())),
        Err(Error::Closed)
    ));
}

#[test]
fn test_data_survives_session_drop() {
    let node = Arc::new(MemoryNode::new());
    {
        let mut session = crate::common::open_session_on(Arc::clone(&node), 16, 5);
        session
            .put_record(CF, "kept", &columns(&[("v", "1")]))
            .unwrap();
    }

    let mut session = crate::common::open_session_on(node, 16, 5);
    assert!(session.exists(CF, "kept").unwrap());
}

// =============================================================================
// Login
// =============================================================================

#[test]
fn test_login_with_valid_credentials() {
    let config = ConnectionConfig::builder(KEYSPACE)
        .credentials("admin", "s3cret")
        .build()
        .unwrap();
    let mut session = Session::open(LocalStore::new(secured_node()), config).unwrap();

    assert!(session
        .add_keyspace(ReplicationStrategy::Simple, BTreeMap::new())
        .unwrap());
}

#[test]
fn test_login_with_wrong_password() {
    let config = ConnectionConfig::builder(KEYSPACE)
        .credentials("admin", "guess")
        .build()
        .unwrap();

    let err = Session::open(LocalStore::new(secured_node()), config).err().unwrap();
    assert!(matches!(err, Error::Login(StoreError::AuthenticationFailed(_))));
}

#[test]
fn test_login_with_unknown_user() {
    let config = ConnectionConfig::builder(KEYSPACE)
        .credentials("mallory", "s3cret")
        .build()
        .unwrap();

    let err = Session::open(LocalStore::new(secured_node()), config).err().unwrap();
    assert!(matches!(err, Error::Login(_)));
}

#[test]
fn test_secured_node_rejects_anonymous_operations() {
    let config = ConnectionConfig::builder(KEYSPACE).build().unwrap();
    let mut session = Session::open(LocalStore::new(secured_node()), config).unwrap();

    assert!(matches!(
        session.keyspaces(),
        Err(Error::Fault(StoreError::Unauthorized(_)))
    ));
}

#[test]
fn test_open_node_accepts_any_login() {
    let config = ConnectionConfig::builder(KEYSPACE)
        .credentials("anyone", "anything")
        .build()
        .unwrap();

    let mut session = Session::open(LocalStore::new(Arc::new(MemoryNode::new())), config).unwrap();
    assert!(session.keyspaces().unwrap().is_empty());
}

// =============================================================================
// Configuration
// =============================================================================

#[test]
fn test_config_defaults() {
    let config = ConnectionConfig::builder("ks").build().unwrap();

    assert_eq!(config.keyspace, "ks");
    assert_eq!(config.chunk_size, DEFAULT_CHUNK_SIZE);
    assert_eq!(config.chunk_size, 8 * 1024 * 1024);
    assert_eq!(config.record_batch_size, DEFAULT_RECORD_BATCH_SIZE);
    assert_eq!(config.read_consistency, Consistency::One);
    assert_eq!(config.write_consistency, Consistency::Any);
    assert!(config.username.is_none());
}

#[test]
fn test_config_rejects_empty_keyspace() {
    assert!(matches!(
        ConnectionConfig::builder("").build(),
        Err(Error::Config(_))
    ));
}

#[test]
fn test_config_rejects_zero_chunk_size() {
    assert!(matches!(
        ConnectionConfig::builder("ks").chunk_size(0).build(),
        Err(Error::Config(_))
    ));
}

#[test]
fn test_config_rejects_chunks_too_large_for_one_frame() {
    assert!(matches!(
        ConnectionConfig::builder("ks").chunk_size(MAX_CHUNK_SIZE + 1).build(),
        Err(Error::Config(_))
    ));
    assert!(ConnectionConfig::builder("ks").chunk_size(MAX_CHUNK_SIZE).build().is_ok());
}

#[test]
fn test_config_rejects_batch_size_below_two() {
    assert!(matches!(
        ConnectionConfig::builder("ks").record_batch_size(1).build(),
        Err(Error::Config(_))
    ));
    assert!(ConnectionConfig::builder("ks").record_batch_size(2).build().is_ok());
}

#[test]
fn test_config_rejects_any_for_reads() {
    assert!(matches!(
        ConnectionConfig::builder("ks")
            .read_consistency(Consistency::Any)
            .build(),
        Err(Error::Config(_))
    ));
    assert!(ConnectionConfig::builder("ks")
        .write_consistency(Consistency::All)
        .read_consistency(Consistency::Quorum)
        .build()
        .is_ok());
}

#[test]
fn test_open_validates_hand_built_config() {
    let config = ConnectionConfig {
        keyspace: KEYSPACE.to_string(),
        record_batch_size: 0,
        ..ConnectionConfig::default()
    };

    let result = Session::open(LocalStore::new(Arc::new(MemoryNode::new())), config);
    assert!(matches!(result, Err(Error::Config(_))));
}

#[test]
fn test_consistency_parses_names() {
    assert_eq!("one".parse::<Consistency>().unwrap(), Consistency::One);
    assert_eq!("LOCAL_QUORUM".parse::<Consistency>().unwrap(), Consistency::LocalQuorum);
    assert_eq!("each-quorum".parse::<Consistency>().unwrap(), Consistency::EachQuorum);
    assert!("most".parse::<Consistency>().is_err());
    assert_eq!(Consistency::All.to_string(), "ALL");
}
