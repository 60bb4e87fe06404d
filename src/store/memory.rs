//! In-memory node
//!
//! A sorted, tombstoning column-family store shared by every session that
//! talks to it (in process through [`LocalStore`](super::LocalStore), or over
//! TCP through the node [`Server`](crate::network::Server)).
//!
//! ## Data Structure Choice
//! `BTreeMap` per column family wrapped in one `RwLock`:
//! - Ordered keys (required for range scans)
//! - Many concurrent readers, one writer at a time
//!
//! ## Tombstones
//! Removing a row records a deletion timestamp and drops every column written
//! at or before it. The row key stays in the map as an empty "range ghost":
//! `range_slice` still returns it (with no columns), `get_slice`/`get_count`
//! see nothing. A later insert with a strictly greater timestamp revives it.

use std::collections::BTreeMap;
use std::ops::Bound;

use bytes::Bytes;
use parking_lot::RwLock;

use crate::error::{StoreError, StoreResult};
use crate::schema::{ColumnFamilyDef, KeyspaceDef};

use super::{Column, KeySlice};

/// A stored column value
#[derive(Debug, Clone)]
struct Cell {
    value: Bytes,
    timestamp: i64,
}

/// A stored row
#[derive(Debug, Default)]
struct Row {
    cells: BTreeMap<String, Cell>,

    /// Timestamp of the most recent row tombstone
    deleted_at: Option<i64>,
}

impl Row {
    fn insert(&mut self, column: Column) {
        if matches!(self.deleted_at, Some(deleted_at) if column.timestamp <= deleted_at) {
            return;
        }

        let superseded = self
            .cells
            .get(&column.name)
            .map_or(false, |existing| existing.timestamp > column.timestamp);
        if superseded {
            return;
        }

        self.cells.insert(
            column.name,
            Cell {
                value: column.value,
                timestamp: column.timestamp,
            },
        );
    }

    fn remove(&mut self, timestamp: i64) {
        let deleted_at = self.deleted_at.map_or(timestamp, |d| d.max(timestamp));
        self.deleted_at = Some(deleted_at);
        self.cells.retain(|_, cell| cell.timestamp > deleted_at);
    }

    fn live_columns(&self) -> Vec<Column> {
        self.cells
            .iter()
            .map(|(name, cell)| Column {
                name: name.clone(),
                value: cell.value.clone(),
                timestamp: cell.timestamp,
            })
            .collect()
    }
}

struct ColumnFamilyData {
    def: ColumnFamilyDef,
    rows: BTreeMap<String, Row>,
}

struct KeyspaceData {
    def: KeyspaceDef,
    column_families: BTreeMap<String, ColumnFamilyData>,
}

impl KeyspaceData {
    fn describe(&self) -> KeyspaceDef {
        let mut def = self.def.clone();
        def.column_families = self
            .column_families
            .values()
            .map(|cf| cf.def.clone())
            .collect();
        def
    }
}

/// In-memory store node
///
/// ## Concurrency:
/// - `keyspaces`: one RwLock over the whole schema + data tree
/// - All methods use `&self`; share it with `Arc<MemoryNode>`
pub struct MemoryNode {
    keyspaces: RwLock<BTreeMap<String, KeyspaceData>>,

    /// username -> password; empty disables authentication
    credentials: BTreeMap<String, String>,
}

impl MemoryNode {
    /// Create an empty node that does not require login
    pub fn new() -> Self {
        Self::with_credentials(BTreeMap::new())
    }

    /// Create an empty node that only admits the given users
    pub fn with_credentials(credentials: BTreeMap<String, String>) -> Self {
        Self {
            keyspaces: RwLock::new(BTreeMap::new()),
            credentials,
        }
    }

    /// Whether sessions must log in before doing anything else
    pub fn requires_login(&self) -> bool {
        !self.credentials.is_empty()
    }

    /// Check a username/password pair. Any pair passes when no users are configured.
    pub fn authenticate(&self, username: &str, password: &str) -> StoreResult<()> {
        if !self.requires_login() {
            return Ok(());
        }

        match self.credentials.get(username) {
            Some(expected) if expected == password => Ok(()),
            Some(_) => Err(StoreError::AuthenticationFailed(format!(
                "bad password for user '{}'",
                username
            ))),
            None => Err(StoreError::AuthenticationFailed(format!(
                "unknown user '{}'",
                username
            ))),
        }
    }

    // =========================================================================
    // Schema
    // =========================================================================

    pub fn describe_keyspaces(&self) -> Vec<KeyspaceDef> {
        self.keyspaces.read().values().map(KeyspaceData::describe).collect()
    }

    pub fn describe_keyspace(&self, name: &str) -> StoreResult<KeyspaceDef> {
        self.keyspaces
            .read()
            .get(name)
            .map(KeyspaceData::describe)
            .ok_or_else(|| keyspace_not_found(name))
    }

    pub fn add_keyspace(&self, mut def: KeyspaceDef) -> StoreResult<()> {
        if def.name.is_empty() {
            return Err(StoreError::InvalidRequest("keyspace name must not be empty".to_string()));
        }

        let mut keyspaces = self.keyspaces.write();
        if keyspaces.contains_key(&def.name) {
            return Err(StoreError::AlreadyExists(format!("keyspace '{}'", def.name)));
        }

        let column_families = std::mem::take(&mut def.column_families)
            .into_iter()
            .map(|cf| {
                let data = ColumnFamilyData {
                    def: cf,
                    rows: BTreeMap::new(),
                };
                (data.def.name.clone(), data)
            })
            .collect();

        keyspaces.insert(
            def.name.clone(),
            KeyspaceData {
                def,
                column_families,
            },
        );
        Ok(())
    }

    pub fn drop_keyspace(&self, name: &str) -> StoreResult<()> {
        self.keyspaces
            .write()
            .remove(name)
            .map(|_| ())
            .ok_or_else(|| keyspace_not_found(name))
    }

    pub fn add_column_family(&self, def: ColumnFamilyDef) -> StoreResult<()> {
        if def.name.is_empty() {
            return Err(StoreError::InvalidRequest(
                "column family name must not be empty".to_string(),
            ));
        }

        let mut keyspaces = self.keyspaces.write();
        let keyspace = keyspaces
            .get_mut(&def.keyspace)
            .ok_or_else(|| keyspace_not_found(&def.keyspace))?;

        if keyspace.column_families.contains_key(&def.name) {
            return Err(StoreError::AlreadyExists(format!(
                "column family '{}' in keyspace '{}'",
                def.name, def.keyspace
            )));
        }

        keyspace.column_families.insert(
            def.name.clone(),
            ColumnFamilyData {
                def,
                rows: BTreeMap::new(),
            },
        );
        Ok(())
    }

    pub fn drop_column_family(&self, keyspace: &str, name: &str) -> StoreResult<()> {
        let mut keyspaces = self.keyspaces.write();
        let keyspace_data = keyspaces
            .get_mut(keyspace)
            .ok_or_else(|| keyspace_not_found(keyspace))?;

        keyspace_data
            .column_families
            .remove(name)
            .map(|_| ())
            .ok_or_else(|| column_family_not_found(keyspace, name))
    }

    // =========================================================================
    // Data
    // =========================================================================

    pub fn insert(&self, keyspace: &str, row: &str, column_family: &str, column: Column) -> StoreResult<()> {
        check_row_key(row)?;
        if column.name.is_empty() {
            return Err(StoreError::InvalidRequest("column name must not be empty".to_string()));
        }

        let mut keyspaces = self.keyspaces.write();
        let cf = column_family_mut(&mut keyspaces, keyspace, column_family)?;
        cf.rows.entry(row.to_string()).or_default().insert(column);
        Ok(())
    }

    pub fn remove(&self, keyspace: &str, row: &str, column_family: &str, timestamp: i64) -> StoreResult<()> {
        check_row_key(row)?;

        let mut keyspaces = self.keyspaces.write();
        let cf = column_family_mut(&mut keyspaces, keyspace, column_family)?;
        cf.rows.entry(row.to_string()).or_default().remove(timestamp);
        Ok(())
    }

    pub fn get_slice(&self, keyspace: &str, row: &str, column_family: &str) -> StoreResult<Vec<Column>> {
        check_row_key(row)?;

        let keyspaces = self.keyspaces.read();
        let cf = column_family_ref(&keyspaces, keyspace, column_family)?;
        Ok(cf.rows.get(row).map(Row::live_columns).unwrap_or_default())
    }

    pub fn get_count(&self, keyspace: &str, row: &str, column_family: &str) -> StoreResult<u32> {
        check_row_key(row)?;

        let keyspaces = self.keyspaces.read();
        let cf = column_family_ref(&keyspaces, keyspace, column_family)?;
        Ok(cf.rows.get(row).map_or(0, |r| r.cells.len() as u32))
    }

    pub fn range_slice(
        &self,
        keyspace: &str,
        column_family: &str,
        start_key: &str,
        limit: u32,
    ) -> StoreResult<Vec<KeySlice>> {
        if limit == 0 {
            return Err(StoreError::InvalidRequest("range limit must be positive".to_string()));
        }

        let keyspaces = self.keyspaces.read();
        let cf = column_family_ref(&keyspaces, keyspace, column_family)?;
        Ok(cf
            .rows
            .range::<str, _>((Bound::Included(start_key), Bound::Unbounded))
            .take(limit as usize)
            .map(|(key, row)| KeySlice {
                key: key.clone(),
                columns: row.live_columns(),
            })
            .collect())
    }
}

impl Default for MemoryNode {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// Helpers
// =============================================================================

fn keyspace_not_found(name: &str) -> StoreError {
    StoreError::NotFound(format!("keyspace '{}'", name))
}

fn column_family_not_found(keyspace: &str, name: &str) -> StoreError {
    StoreError::NotFound(format!("column family '{}' in keyspace '{}'", name, keyspace))
}

fn check_row_key(row: &str) -> StoreResult<()> {
    if row.is_empty() {
        return Err(StoreError::InvalidRequest("row key must not be empty".to_string()));
    }
    Ok(())
}

fn column_family_ref<'a>(
    keyspaces: &'a BTreeMap<String, KeyspaceData>,
    keyspace: &str,
    column_family: &str,
) -> StoreResult<&'a ColumnFamilyData> {
    keyspaces
        .get(keyspace)
        .ok_or_else(|| keyspace_not_found(keyspace))?
        .column_families
        .get(column_family)
        .ok_or_else(|| column_family_not_found(keyspace, column_family))
}

fn column_family_mut<'a>(
    keyspaces: &'a mut BTreeMap<String, KeyspaceData>,
    keyspace: &str,
    column_family: &str,
) -> StoreResult<&'a mut ColumnFamilyData> {
    keyspaces
        .get_mut(keyspace)
        .ok_or_else(|| keyspace_not_found(keyspace))?
        .column_families
        .get_mut(column_family)
        .ok_or_else(|| column_family_not_found(keyspace, column_family))
}
