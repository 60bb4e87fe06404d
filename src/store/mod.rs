//! Store Module
//!
//! The collaborator contract rowvault is layered on, and its implementations.
//!
//! ## Responsibilities
//! - Single-column upserts and whole-row tombstones, timestamped by the caller
//! - Whole-row reads (`get_slice`) and existence checks (`get_count`)
//! - Bounded, inclusive-start forward range scans (`range_slice`)
//! - Keyspace / column-family DDL
//!
//! ## Implementations
//! - [`MemoryNode`]: shared, in-process sorted store with tombstones
//! - [`LocalStore`]: a per-session [`Store`] over a `MemoryNode`
//! - [`RemoteStore`]: a [`Store`] speaking the wire protocol over TCP
//!
//! Every call is blocking. Conflict and absence are reported as structured
//! [`StoreError`] variants so callers never inspect message text.

mod memory;
mod local;
mod remote;

pub use memory::MemoryNode;
pub use local::LocalStore;
pub use remote::RemoteStore;

use bytes::Bytes;
use serde::{Deserialize, Serialize};

use crate::consistency::Consistency;
use crate::error::StoreResult;
use crate::schema::{ColumnFamilyDef, KeyspaceDef};

/// A single named, timestamped column value
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Column {
    pub name: String,
    pub value: Bytes,

    /// Write timestamp (microseconds since the epoch); last write wins
    pub timestamp: i64,
}

impl Column {
    pub fn new(name: impl Into<String>, value: impl Into<Bytes>, timestamp: i64) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            timestamp,
        }
    }
}

/// One row returned by a range scan. An empty column list is a tombstoned row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeySlice {
    pub key: String,
    pub columns: Vec<Column>,
}

/// Blocking RPC surface of a sorted column-family store.
///
/// Data operations act on the keyspace selected with [`Store::use_keyspace`].
pub trait Store {
    /// Authenticate the session
    fn login(&mut self, username: &str, password: &str) -> StoreResult<()>;

    /// Select the keyspace for subsequent calls. Does not require it to exist yet.
    fn use_keyspace(&mut self, keyspace: &str) -> StoreResult<()>;

    // -------------------------------------------------------------------------
    // Schema DDL
    // -------------------------------------------------------------------------

    fn describe_keyspaces(&mut self) -> StoreResult<Vec<KeyspaceDef>>;

    fn describe_keyspace(&mut self, name: &str) -> StoreResult<KeyspaceDef>;

    /// Fails with `AlreadyExists` on a name conflict
    fn add_keyspace(&mut self, def: KeyspaceDef) -> StoreResult<()>;

    /// Fails with `NotFound` when the keyspace is absent
    fn drop_keyspace(&mut self, name: &str) -> StoreResult<()>;

    /// Fails with `AlreadyExists` on a name conflict
    fn add_column_family(&mut self, def: ColumnFamilyDef) -> StoreResult<()>;

    /// Fails with `NotFound` when the column family is absent
    fn drop_column_family(&mut self, name: &str) -> StoreResult<()>;

    // -------------------------------------------------------------------------
    // Data
    // -------------------------------------------------------------------------

    /// Upsert one column of a row
    fn insert(
        &mut self,
        row: &str,
        column_family: &str,
        column: Column,
        consistency: Consistency,
    ) -> StoreResult<()>;

    /// Tombstone an entire row
    fn remove(
        &mut self,
        row: &str,
        column_family: &str,
        timestamp: i64,
        consistency: Consistency,
    ) -> StoreResult<()>;

    /// All live columns of a row; empty when absent or tombstoned
    fn get_slice(
        &mut self,
        row: &str,
        column_family: &str,
        consistency: Consistency,
    ) -> StoreResult<Vec<Column>>;

    /// Number of live columns of a row
    fn get_count(
        &mut self,
        row: &str,
        column_family: &str,
        consistency: Consistency,
    ) -> StoreResult<u32>;

    /// Up to `limit` rows with key >= `start_key`, ascending
    fn range_slice(
        &mut self,
        column_family: &str,
        start_key: &str,
        limit: u32,
        consistency: Consistency,
    ) -> StoreResult<Vec<KeySlice>>;

    // -------------------------------------------------------------------------
    // Lifecycle
    // -------------------------------------------------------------------------

    /// Push buffered output to the store
    fn flush(&mut self) -> StoreResult<()> {
        Ok(())
    }

    /// Release the transport. Called at most once by a session.
    fn close(&mut self) {}
}

impl<S: Store + ?Sized> Store for Box<S> {
    fn login(&mut self, username: &str, password: &str) -> StoreResult<()> {
        (**self).login(username, password)
    }

    fn use_keyspace(&mut self, keyspace: &str) -> StoreResult<()> {
        (**self).use_keyspace(keyspace)
    }

    fn describe_keyspaces(&mut self) -> StoreResult<Vec<KeyspaceDef>> {
        (**self).describe_keyspaces()
    }

    fn describe_keyspace(&mut self, name: &str) -> StoreResult<KeyspaceDef> {
        (**self).describe_keyspace(name)
    }

    fn add_keyspace(&mut self, def: KeyspaceDef) -> StoreResult<()> {
        (**self).add_keyspace(def)
    }

    fn drop_keyspace(&mut self, name: &str) -> StoreResult<()> {
        (**self).drop_keyspace(name)
    }

    fn add_column_family(&mut self, def: ColumnFamilyDef) -> StoreResult<()> {
        (**self).add_column_family(def)
    }

    fn drop_column_family(&mut self, name: &str) -> StoreResult<()> {
        (**self).drop_column_family(name)
    }

    fn insert(
        &mut self,
        row: &str,
        column_family: &str,
        column: Column,
        consistency: Consistency,
    ) -> StoreResult<()> {
        (**self).insert(row, column_family, column, consistency)
    }

    fn remove(
        &mut self,
        row: &str,
        column_family: &str,
        timestamp: i64,
        consistency: Consistency,
    ) -> StoreResult<()> {
        (**self).remove(row, column_family, timestamp, consistency)
    }

    fn get_slice(
        &mut self,
        row: &str,
        column_family: &str,
        consistency: Consistency,
    ) -> StoreResult<Vec<Column>> {
        (**self).get_slice(row, column_family, consistency)
    }

    fn get_count(
        &mut self,
        row: &str,
        column_family: &str,
        consistency: Consistency,
    ) -> StoreResult<u32> {
        (**self).get_count(row, column_family, consistency)
    }

    fn range_slice(
        &mut self,
        column_family: &str,
        start_key: &str,
        limit: u32,
        consistency: Consistency,
    ) -> StoreResult<Vec<KeySlice>> {
        (**self).range_slice(column_family, start_key, limit, consistency)
    }

    fn flush(&mut self) -> StoreResult<()> {
        (**self).flush()
    }

    fn close(&mut self) {
        (**self).close()
    }
}
