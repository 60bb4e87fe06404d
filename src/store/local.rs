//! Local store session
//!
//! A [`Store`] over a shared [`MemoryNode`]. Holds the per-session state the
//! node itself does not track: the selected keyspace and whether the session
//! has logged in. The node server gives each TCP client its own `LocalStore`.

use std::sync::Arc;

use crate::consistency::Consistency;
use crate::error::{StoreError, StoreResult};
use crate::schema::{ColumnFamilyDef, KeyspaceDef};

use super::{Column, KeySlice, MemoryNode, Store};

/// Per-session handle onto a [`MemoryNode`]
pub struct LocalStore {
    node: Arc<MemoryNode>,
    keyspace: Option<String>,
    authenticated: bool,
}

impl LocalStore {
    pub fn new(node: Arc<MemoryNode>) -> Self {
        Self {
            node,
            keyspace: None,
            authenticated: false,
        }
    }

    /// The shared node this session talks to
    pub fn node(&self) -> &Arc<MemoryNode> {
        &self.node
    }

    /// The keyspace selected by `use_keyspace`
    pub fn keyspace(&self) -> Option<&str> {
        self.keyspace.as_deref()
    }

    fn check_login(&self) -> StoreResult<()> {
        if self.node.requires_login() && !self.authenticated {
            return Err(StoreError::Unauthorized("login required".to_string()));
        }
        Ok(())
    }

    fn bound_keyspace(&self) -> StoreResult<&str> {
        self.check_login()?;
        self.keyspace
            .as_deref()
            .ok_or_else(|| StoreError::InvalidRequest("no keyspace has been selected".to_string()))
    }
}

impl Store for LocalStore {
    fn login(&mut self, username: &str, password: &str) -> StoreResult<()> {
        self.node.authenticate(username, password)?;
        self.authenticated = true;
        Ok(())
    }

    fn use_keyspace(&mut self, keyspace: &str) -> StoreResult<()> {
        if keyspace.is_empty() {
            return Err(StoreError::InvalidRequest("keyspace name must not be empty".to_string()));
        }
        self.keyspace = Some(keyspace.to_string());
        Ok(())
    }

    fn describe_keyspaces(&mut self) -> StoreResult<Vec<KeyspaceDef>> {
        self.check_login()?;
        Ok(self.node.describe_keyspaces())
    }

    fn describe_keyspace(&mut self, name: &str) -> StoreResult<KeyspaceDef> {
        self.check_login()?;
        self.node.describe_keyspace(name)
    }

    fn add_keyspace(&mut self, def: KeyspaceDef) -> StoreResult<()> {
        self.check_login()?;
        self.node.add_keyspace(def)
    }

    fn drop_keyspace(&mut self, name: &str) -> StoreResult<()> {
        self.check_login()?;
        self.node.drop_keyspace(name)
    }

    fn add_column_family(&mut self, def: ColumnFamilyDef) -> StoreResult<()> {
        self.check_login()?;
        self.node.add_column_family(def)
    }

    fn drop_column_family(&mut self, name: &str) -> StoreResult<()> {
        let keyspace = self.bound_keyspace()?;
        self.node.drop_column_family(keyspace, name)
    }

    fn insert(
        &mut self,
        row: &str,
        column_family: &str,
        column: Column,
        _consistency: Consistency,
    ) -> StoreResult<()> {
        let keyspace = self.bound_keyspace()?;
        self.node.insert(keyspace, row, column_family, column)
    }

    fn remove(
        &mut self,
        row: &str,
        column_family: &str,
        timestamp: i64,
        _consistency: Consistency,
    ) -> StoreResult<()> {
        let keyspace = self.bound_keyspace()?;
        self.node.remove(keyspace, row, column_family, timestamp)
    }

    fn get_slice(
        &mut self,
        row: &str,
        column_family: &str,
        _consistency: Consistency,
    ) -> StoreResult<Vec<Column>> {
        let keyspace = self.bound_keyspace()?;
        self.node.get_slice(keyspace, row, column_family)
    }

    fn get_count(
        &mut self,
        row: &str,
        column_family: &str,
        _consistency: Consistency,
    ) -> StoreResult<u32> {
        let keyspace = self.bound_keyspace()?;
        self.node.get_count(keyspace, row, column_family)
    }

    fn range_slice(
        &mut self,
        column_family: &str,
        start_key: &str,
        limit: u32,
        _consistency: Consistency,
    ) -> StoreResult<Vec<KeySlice>> {
        let keyspace = self.bound_keyspace()?;
        self.node.range_slice(keyspace, column_family, start_key, limit)
    }
}
