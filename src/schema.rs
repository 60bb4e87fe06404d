//! Schema descriptors
//!
//! Keyspace and column-family definitions passed through to the store's DDL
//! calls. rowvault does no schema design of its own.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// How replicas are distributed among nodes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReplicationStrategy {
    /// Replicas on consecutive nodes along the ring.
    /// Option: `replication_factor`.
    Simple,

    /// Per-datacenter replica counts. Options: datacenter name -> count.
    NetworkTopology,

    /// Two datacenters plus a rack-aware third replica.
    /// Option: `replication_factor`.
    OldNetworkTopology,
}

impl ReplicationStrategy {
    /// Fully qualified strategy class name understood by the store
    pub fn class_name(self) -> &'static str {
        match self {
            ReplicationStrategy::Simple => "org.apache.cassandra.locator.SimpleStrategy",
            ReplicationStrategy::NetworkTopology => {
                "org.apache.cassandra.locator.NetworkTopologyStrategy"
            }
            ReplicationStrategy::OldNetworkTopology => {
                "org.apache.cassandra.locator.OldNetworkTopologyStrategy"
            }
        }
    }
}

/// Value type of a column, as declared in the column-family metadata
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ValueType {
    Utf8,
    Bytes,
}

/// Column family definition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnFamilyDef {
    pub keyspace: String,
    pub name: String,

    /// Default type of column values
    pub default_value_type: ValueType,

    /// Columns whose values are declared as raw bytes
    pub binary_columns: Vec<String>,
}

impl ColumnFamilyDef {
    /// A UTF-8 keyed column family with the given binary columns
    pub fn new(keyspace: impl Into<String>, name: impl Into<String>, binary_columns: &[&str]) -> Self {
        Self {
            keyspace: keyspace.into(),
            name: name.into(),
            default_value_type: ValueType::Utf8,
            binary_columns: binary_columns.iter().map(|c| c.to_string()).collect(),
        }
    }
}

/// Keyspace definition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyspaceDef {
    pub name: String,
    pub strategy: ReplicationStrategy,
    pub strategy_options: BTreeMap<String, String>,
    pub column_families: Vec<ColumnFamilyDef>,
}

impl KeyspaceDef {
    pub fn new(
        name: impl Into<String>,
        strategy: ReplicationStrategy,
        strategy_options: BTreeMap<String, String>,
    ) -> Self {
        Self {
            name: name.into(),
            strategy,
            strategy_options,
            column_families: Vec::new(),
        }
    }
}
