//! Request definitions
//!
//! One variant per [`Store`](crate::store::Store) call.

use serde::{Deserialize, Serialize};

use crate::consistency::Consistency;
use crate::schema::{ColumnFamilyDef, KeyspaceDef};
use crate::store::Column;

/// Request types, used for logging
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestType {
    Login,
    UseKeyspace,
    DescribeKeyspaces,
    DescribeKeyspace,
    AddKeyspace,
    DropKeyspace,
    AddColumnFamily,
    DropColumnFamily,
    Insert,
    Remove,
    GetSlice,
    GetCount,
    RangeSlice,
    Ping,
}

/// A request sent by a client
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Request {
    Login { username: String, password: String },

    UseKeyspace { keyspace: String },

    DescribeKeyspaces,

    DescribeKeyspace { name: String },

    AddKeyspace { def: KeyspaceDef },

    DropKeyspace { name: String },

    AddColumnFamily { def: ColumnFamilyDef },

    DropColumnFamily { name: String },

    Insert {
        row: String,
        column_family: String,
        column: Column,
        consistency: Consistency,
    },

    Remove {
        row: String,
        column_family: String,
        timestamp: i64,
        consistency: Consistency,
    },

    GetSlice {
        row: String,
        column_family: String,
        consistency: Consistency,
    },

    GetCount {
        row: String,
        column_family: String,
        consistency: Consistency,
    },

    RangeSlice {
        column_family: String,
        start_key: String,
        limit: u32,
        consistency: Consistency,
    },

    /// Health check
    Ping,
}

impl Request {
    pub fn request_type(&self) -> RequestType {
        match self {
            Request::Login { .. } => RequestType::Login,
            Request::UseKeyspace { .. } => RequestType::UseKeyspace,
            Request::DescribeKeyspaces => RequestType::DescribeKeyspaces,
            Request::DescribeKeyspace { .. } => RequestType::DescribeKeyspace,
            Request::AddKeyspace { .. } => RequestType::AddKeyspace,
            Request::DropKeyspace { .. } => RequestType::DropKeyspace,
            Request::AddColumnFamily { .. } => RequestType::AddColumnFamily,
            Request::DropColumnFamily { .. } => RequestType::DropColumnFamily,
            Request::Insert { .. } => RequestType::Insert,
            Request::Remove { .. } => RequestType::Remove,
            Request::GetSlice { .. } => RequestType::GetSlice,
            Request::GetCount { .. } => RequestType::GetCount,
            Request::RangeSlice { .. } => RequestType::RangeSlice,
            Request::Ping => RequestType::Ping,
        }
    }
}
