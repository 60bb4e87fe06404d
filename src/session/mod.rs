//! Session Module
//!
//! The caller-facing connection to a keyspace.
//!
//! ## Responsibilities
//! - Log in and bind the keyspace once, at open
//! - Forward schema and single-record calls to the [`Store`]
//! - Host the chunk codec (`put_file`, `get_file_content`, `delete_file`)
//!   and the paginated enumerator (`for_each_record`)
//! - Translate every store failure into [`Error::Fault`]
//!
//! ## Concurrency
//! Single-threaded: every operation takes `&mut self`. Share a session across
//! threads only behind external synchronization.

mod clock;

pub(crate) use clock::Clock;

use std::collections::{BTreeMap, BTreeSet};
use std::ops::ControlFlow;

use crate::config::ConnectionConfig;
use crate::error::{Error, Result, StoreError};
use crate::file::FileInfo;
use crate::record::{self, chunk_key, Columns};
use crate::scan::RecordScanner;
use crate::schema::{ColumnFamilyDef, KeyspaceDef, ReplicationStrategy};
use crate::store::{RemoteStore, Store};

/// A single-threaded connection bound to one keyspace
pub struct Session<S: Store> {
    pub(crate) store: S,
    pub(crate) config: ConnectionConfig,
    pub(crate) clock: Clock,
    closed: bool,
}

impl Session<RemoteStore> {
    /// Connect to a node over TCP and open a session on it
    pub fn connect(addr: &str, config: ConnectionConfig) -> Result<Self> {
        config.validate()?;
        let store =
            RemoteStore::connect_with_timeouts(addr, config.read_timeout_ms, config.write_timeout_ms)?;
        Self::open(store, config)
    }
}

impl<S: Store> Session<S> {
    /// Open a session
    ///
    /// On open:
    /// 1. Validate the config
    /// 2. Log in, if a username is configured
    /// 3. Bind the keyspace (it does not need to exist yet)
    pub fn open(mut store: S, config: ConnectionConfig) -> Result<Self> {
        config.validate()?;

        if let Some(username) = config.username.as_deref() {
            let password = config.password.as_deref().unwrap_or_default();
            store.login(username, password).map_err(|e| {
                if e.is_auth() {
                    Error::Login(e)
                } else {
                    Error::Fault(e)
                }
            })?;
        }

        store.use_keyspace(&config.keyspace)?;

        tracing::debug!(keyspace = %config.keyspace, "Session opened");

        Ok(Self {
            store,
            config,
            clock: Clock::new(),
            closed: false,
        })
    }

    // =========================================================================
    // Schema
    // =========================================================================

    /// Names of all keyspaces
    pub fn keyspaces(&mut self) -> Result<BTreeSet<String>> {
        self.ensure_open()?;
        tracing::trace!("Listing keyspaces");

        Ok(self
            .store
            .describe_keyspaces()?
            .into_iter()
            .map(|def| def.name)
            .collect())
    }

    /// Create the session's keyspace. `false` if it already exists.
    pub fn add_keyspace(
        &mut self,
        strategy: ReplicationStrategy,
        options: BTreeMap<String, String>,
    ) -> Result<bool> {
        self.ensure_open()?;
        tracing::trace!(keyspace = %self.config.keyspace, "Adding keyspace");

        let def = KeyspaceDef::new(self.config.keyspace.clone(), strategy, options);
        absorb(self.store.add_keyspace(def), |e| {
            matches!(e, StoreError::AlreadyExists(_))
        })
    }

    /// Drop the session's keyspace. `false` if it does not exist.
    pub fn delete_keyspace(&mut self) -> Result<bool> {
        self.ensure_open()?;
        tracing::trace!(keyspace = %self.config.keyspace, "Deleting keyspace");

        let keyspace = self.config.keyspace.clone();
        absorb(self.store.drop_keyspace(&keyspace), |e| {
            matches!(e, StoreError::NotFound(_))
        })
    }

    /// Names of the column families in the session's keyspace
    pub fn column_families(&mut self) -> Result<BTreeSet<String>> {
        self.ensure_open()?;
        tracing::trace!(keyspace = %self.config.keyspace, "Listing column families");

        let keyspace = self.config.keyspace.clone();
        Ok(self
            .store
            .describe_keyspace(&keyspace)?
            .column_families
            .into_iter()
            .map(|def| def.name)
            .collect())
    }

    /// Create a column family whose named columns hold raw bytes.
    /// `false` if it already exists.
    pub fn add_column_family(&mut self, name: &str, binary_columns: &[&str]) -> Result<bool> {
        self.ensure_open()?;
        tracing::trace!(column_family = %name, "Adding column family");

        let def = ColumnFamilyDef::new(self.config.keyspace.clone(), name, binary_columns);
        absorb(self.store.add_column_family(def), |e| {
            matches!(e, StoreError::AlreadyExists(_))
        })
    }

    /// Drop a column family. `false` if it does not exist.
    pub fn delete_column_family(&mut self, name: &str) -> Result<bool> {
        self.ensure_open()?;
        tracing::trace!(column_family = %name, "Deleting column family");

        absorb(self.store.drop_column_family(name), |e| {
            matches!(e, StoreError::NotFound(_))
        })
    }

    // =========================================================================
    // Records
    // =========================================================================

    /// Upsert the given columns of a record; other existing columns are kept
    pub fn put_record(&mut self, column_family: &str, key: &str, columns: &Columns) -> Result<()> {
        self.ensure_open()?;
        tracing::trace!(column_family = %column_family, key = %key, "Putting record");

        let timestamp = self.clock.tick();
        self.write_columns(column_family, key, columns, timestamp)
    }

    /// Insert a record only if the key is unused. `false` if it was taken.
    pub fn add_record(&mut self, column_family: &str, key: &str, columns: &Columns) -> Result<bool> {
        if self.exists(column_family, key)? {
            return Ok(false);
        }
        self.put_record(column_family, key, columns)?;
        Ok(true)
    }

    /// Fetch a record; `None` if it does not exist
    pub fn get_record(&mut self, column_family: &str, key: &str) -> Result<Option<Columns>> {
        self.ensure_open()?;
        tracing::trace!(column_family = %column_family, key = %key, "Getting record");

        let columns = self
            .store
            .get_slice(key, column_family, self.config.read_consistency)?;
        record::decode_columns(columns)
    }

    /// Whether a record or file exists at `key`
    pub fn exists(&mut self, column_family: &str, key: &str) -> Result<bool> {
        self.ensure_open()?;
        tracing::trace!(column_family = %column_family, key = %key, "Checking existence");

        let count = self
            .store
            .get_count(key, column_family, self.config.read_consistency)?;
        Ok(count > 0)
    }

    /// Tombstone a record. Deleting a missing record is not an error.
    pub fn delete_record(&mut self, column_family: &str, key: &str) -> Result<()> {
        self.ensure_open()?;
        tracing::trace!(column_family = %column_family, key = %key, "Deleting record");

        let timestamp = self.clock.tick();
        self.store
            .remove(key, column_family, timestamp, self.config.write_consistency)?;
        Ok(())
    }

    /// Delete whatever lives at `key`: a file with all its chunks, or a plain record
    pub fn delete(&mut self, column_family: &str, key: &str) -> Result<()> {
        let columns = match self.get_record(column_family, key)? {
            Some(columns) => columns,
            None => return Ok(()),
        };

        if FileInfo::is_file(&columns) {
            let info = FileInfo::from_columns(key, &columns)?;
            self.delete_chunks_and_metadata(column_family, key, &info)
        } else {
            self.delete_record(column_family, key)
        }
    }

    // =========================================================================
    // Enumeration
    // =========================================================================

    /// Visit every live record in ascending key order
    ///
    /// Chunk rows and tombstoned rows are skipped. Returning
    /// `ControlFlow::Break(())` from `visit` stops the scan; the return value
    /// is the number of records passed to `visit`.
    pub fn for_each_record<F>(&mut self, column_family: &str, visit: F) -> Result<u64>
    where
        F: FnMut(&str, &Columns) -> ControlFlow<()>,
    {
        self.ensure_open()?;
        tracing::trace!(column_family = %column_family, "Iterating records");

        RecordScanner::new(
            &mut self.store,
            self.config.record_batch_size,
            self.config.read_consistency,
        )
        .for_each(column_family, visit)
    }

    // =========================================================================
    // Lifecycle
    // =========================================================================

    /// Flush and release the store. Only the first call has any effect.
    pub fn close(&mut self) {
        if self.closed {
            return;
        }
        self.closed = true;
        tracing::trace!(keyspace = %self.config.keyspace, "Closing session");

        if let Err(e) = self.store.flush() {
            tracing::error!("Error flushing store: {}", e);
        }
        self.store.close();
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    pub fn config(&self) -> &ConnectionConfig {
        &self.config
    }

    /// The underlying store
    pub fn store(&self) -> &S {
        &self.store
    }

    // =========================================================================
    // Internal
    // =========================================================================

    pub(crate) fn ensure_open(&self) -> Result<()> {
        if self.closed {
            return Err(Error::Closed);
        }
        Ok(())
    }

    /// Write every column of a record with one timestamp
    pub(crate) fn write_columns(
        &mut self,
        column_family: &str,
        key: &str,
        columns: &Columns,
        timestamp: i64,
    ) -> Result<()> {
        for column in record::encode_columns(columns, timestamp) {
            self.store
                .insert(key, column_family, column, self.config.write_consistency)?;
        }
        Ok(())
    }

    /// Remove chunk rows `0..chunk_count`, then the metadata row
    pub(crate) fn delete_chunks_and_metadata(
        &mut self,
        column_family: &str,
        key: &str,
        info: &FileInfo,
    ) -> Result<()> {
        for index in 0..info.chunk_count() {
            self.delete_record(column_family, &chunk_key(key, index))?;
        }
        self.delete_record(column_family, key)
    }
}

impl<S: Store> Drop for Session<S> {
    fn drop(&mut self) {
        self.close();
    }
}

/// Map an expected store signal to `false`, success to `true`
fn absorb(result: std::result::Result<(), StoreError>, expected: impl Fn(&StoreError) -> bool) -> Result<bool> {
    match result {
        Ok(()) => Ok(true),
        Err(e) if expected(&e) => Ok(false),
        Err(e) => Err(Error::Fault(e)),
    }
}
