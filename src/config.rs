//! Configuration for rowvault
//!
//! Centralized configuration with sensible defaults.

use std::collections::BTreeMap;

use crate::consistency::Consistency;
use crate::error::{Error, Result};
use crate::protocol::MAX_CHUNK_SIZE;

/// Default chunk size for new files (8 MiB)
pub const DEFAULT_CHUNK_SIZE: usize = 8 * 1024 * 1024;

/// Default number of rows fetched per range-scan page
pub const DEFAULT_RECORD_BATCH_SIZE: u32 = 5;

/// Smallest batch size that still makes forward progress (boundary row + one new row)
pub const MIN_RECORD_BATCH_SIZE: u32 = 2;

/// Client-side configuration for a [`Session`](crate::session::Session)
#[derive(Debug, Clone)]
pub struct ConnectionConfig {
    // -------------------------------------------------------------------------
    // Keyspace / Credentials
    // -------------------------------------------------------------------------
    /// Keyspace the session is bound to
    pub keyspace: String,

    /// Login name; no login is attempted when `None`
    pub username: Option<String>,

    /// Login password
    pub password: Option<String>,

    // -------------------------------------------------------------------------
    // Consistency
    // -------------------------------------------------------------------------
    /// Consistency level forwarded with every read
    pub read_consistency: Consistency,

    /// Consistency level forwarded with every write
    pub write_consistency: Consistency,

    // -------------------------------------------------------------------------
    // Chunking / Paging
    // -------------------------------------------------------------------------
    /// Bytes per chunk row when writing files
    pub chunk_size: usize,

    /// Rows requested per range-scan page by `for_each_record`
    pub record_batch_size: u32,

    // -------------------------------------------------------------------------
    // Network Configuration (remote stores only)
    // -------------------------------------------------------------------------
    /// Socket read timeout (milliseconds, 0 = none)
    pub read_timeout_ms: u64,

    /// Socket write timeout (milliseconds, 0 = none)
    pub write_timeout_ms: u64,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            keyspace: String::new(),
            username: None,
            password: None,
            read_consistency: Consistency::One,
            write_consistency: Consistency::Any,
            chunk_size: DEFAULT_CHUNK_SIZE,
            record_batch_size: DEFAULT_RECORD_BATCH_SIZE,
            read_timeout_ms: 5000,
            write_timeout_ms: 5000,
        }
    }
}

impl ConnectionConfig {
    /// Create a new config builder for the given keyspace
    pub fn builder(keyspace: impl Into<String>) -> ConnectionConfigBuilder {
        ConnectionConfigBuilder::new(keyspace)
    }

    /// Check the invariants the chunk codec and scanner rely on
    pub fn validate(&self) -> Result<()> {
        if self.keyspace.is_empty() {
            return Err(Error::Config("keyspace must not be empty".to_string()));
        }
        if self.chunk_size == 0 {
            return Err(Error::Config("chunk size must be at least 1 byte".to_string()));
        }
        if self.chunk_size > MAX_CHUNK_SIZE {
            return Err(Error::Config(format!(
                "chunk size must be at most {} bytes, got {}",
                MAX_CHUNK_SIZE, self.chunk_size
            )));
        }
        if self.record_batch_size < MIN_RECORD_BATCH_SIZE {
            return Err(Error::Config(format!(
                "record batch size must be at least {}, got {}",
                MIN_RECORD_BATCH_SIZE, self.record_batch_size
            )));
        }
        if !self.read_consistency.is_valid_for_reads() {
            return Err(Error::Config(format!(
                "{} is not a valid read consistency level",
                self.read_consistency
            )));
        }
        if self.password.is_some() && self.username.is_none() {
            return Err(Error::Config("password given without a username".to_string()));
        }
        Ok(())
    }
}

/// Builder for ConnectionConfig
pub struct ConnectionConfigBuilder {
    config: ConnectionConfig,
}

impl ConnectionConfigBuilder {
    fn new(keyspace: impl Into<String>) -> Self {
        Self {
            config: ConnectionConfig {
                keyspace: keyspace.into(),
                ..ConnectionConfig::default()
            },
        }
    }

    /// Set login credentials
    pub fn credentials(mut self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.config.username = Some(username.into());
        self.config.password = Some(password.into());
        self
    }

    /// Set the read consistency level
    pub fn read_consistency(mut self, level: Consistency) -> Self {
        self.config.read_consistency = level;
        self
    }

    /// Set the write consistency level
    pub fn write_consistency(mut self, level: Consistency) -> Self {
        self.config.write_consistency = level;
        self
    }

    /// Set the file chunk size (in bytes)
    pub fn chunk_size(mut self, size: usize) -> Self {
        self.config.chunk_size = size;
        self
    }

    /// Set the number of rows fetched per scan page
    pub fn record_batch_size(mut self, size: u32) -> Self {
        self.config.record_batch_size = size;
        self
    }

    /// Set the read timeout (in milliseconds)
    pub fn read_timeout_ms(mut self, ms: u64) -> Self {
        self.config.read_timeout_ms = ms;
        self
    }

    /// Set the write timeout (in milliseconds)
    pub fn write_timeout_ms(mut self, ms: u64) -> Self {
        self.config.write_timeout_ms = ms;
        self
    }

    /// Validate and return the config
    pub fn build(self) -> Result<ConnectionConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}

/// Configuration for a reference node server
#[derive(Debug, Clone)]
pub struct NodeConfig {
    /// TCP listen address
    pub listen_addr: String,

    /// Max concurrent client connections, one thread each
    pub max_connections: usize,

    /// Idle read timeout before a connection is closed (milliseconds, 0 = none)
    pub read_timeout_ms: u64,

    /// Connection write timeout (milliseconds, 0 = none)
    pub write_timeout_ms: u64,

    /// username -> password; empty means login is not required
    pub credentials: BTreeMap<String, String>,
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            listen_addr: "127.0.0.1:9160".to_string(),
            max_connections: 1024,
            read_timeout_ms: 300_000,
            write_timeout_ms: 5000,
            credentials: BTreeMap::new(),
        }
    }
}

impl NodeConfig {
    /// Create a new config builder
    pub fn builder() -> NodeConfigBuilder {
        NodeConfigBuilder::default()
    }
}

/// Builder for NodeConfig
#[derive(Default)]
pub struct NodeConfigBuilder {
    config: NodeConfig,
}

impl NodeConfigBuilder {
    /// Set the TCP listen address
    pub fn listen_addr(mut self, addr: impl Into<String>) -> Self {
        self.config.listen_addr = addr.into();
        self
    }

    /// Set the maximum number of concurrent connections
    pub fn max_connections(mut self, count: usize) -> Self {
        self.config.max_connections = count;
        self
    }

    /// Set the read timeout (in milliseconds)
    pub fn read_timeout_ms(mut self, ms: u64) -> Self {
        self.config.read_timeout_ms = ms;
        self
    }

    /// Set the write timeout (in milliseconds)
    pub fn write_timeout_ms(mut self, ms: u64) -> Self {
        self.config.write_timeout_ms = ms;
        self
    }

    /// Register a user allowed to log in
    pub fn user(mut self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.config.credentials.insert(username.into(), password.into());
        self
    }

    pub fn build(self) -> NodeConfig {
        self.config
    }
}
