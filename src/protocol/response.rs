//! Response definitions
//!
//! Represents responses to clients.

use serde::{Deserialize, Serialize};

use crate::error::StoreError;
use crate::schema::KeyspaceDef;
use crate::store::{Column, KeySlice};

/// Successful result of a request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Reply {
    /// Request carried out, nothing to return
    Done,

    Keyspaces(Vec<KeyspaceDef>),

    Keyspace(KeyspaceDef),

    Columns(Vec<Column>),

    Count(u32),

    Slices(Vec<KeySlice>),

    Pong,
}

/// Failure of a request, mirroring [`StoreError`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RemoteError {
    AlreadyExists(String),
    NotFound(String),
    AuthenticationFailed(String),
    Unauthorized(String),
    InvalidRequest(String),

    /// Server-side failure with no structured counterpart
    Internal(String),
}

/// A response to send to client
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Response {
    Ok(Reply),
    Err(RemoteError),
}

impl Response {
    pub fn is_ok(&self) -> bool {
        matches!(self, Response::Ok(_))
    }

    /// Unwrap into the reply, translating a remote error back into a [`StoreError`]
    pub fn into_result(self) -> Result<Reply, StoreError> {
        match self {
            Response::Ok(reply) => Ok(reply),
            Response::Err(e) => Err(e.into()),
        }
    }
}

impl From<Result<Reply, StoreError>> for Response {
    fn from(result: Result<Reply, StoreError>) -> Self {
        match result {
            Ok(reply) => Response::Ok(reply),
            Err(e) => Response::Err(e.into()),
        }
    }
}

impl From<StoreError> for RemoteError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::AlreadyExists(m) => RemoteError::AlreadyExists(m),
            StoreError::NotFound(m) => RemoteError::NotFound(m),
            StoreError::AuthenticationFailed(m) => RemoteError::AuthenticationFailed(m),
            StoreError::Unauthorized(m) => RemoteError::Unauthorized(m),
            StoreError::InvalidRequest(m) => RemoteError::InvalidRequest(m),
            other => RemoteError::Internal(other.to_string()),
        }
    }
}

impl From<RemoteError> for StoreError {
    fn from(e: RemoteError) -> Self {
        match e {
            RemoteError::AlreadyExists(m) => StoreError::AlreadyExists(m),
            RemoteError::NotFound(m) => StoreError::NotFound(m),
            RemoteError::AuthenticationFailed(m) => StoreError::AuthenticationFailed(m),
            RemoteError::Unauthorized(m) => StoreError::Unauthorized(m),
            RemoteError::InvalidRequest(m) => StoreError::InvalidRequest(m),
            RemoteError::Internal(m) => StoreError::Protocol(format!("remote failure: {}", m)),
        }
    }
}
