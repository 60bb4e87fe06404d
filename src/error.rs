//! Error types for rowvault
//!
//! Two layers:
//! - [`StoreError`]: structured signals raised by a [`Store`](crate::store::Store)
//!   implementation (conflict, absence, auth, transport).
//! - [`Error`]: what a [`Session`](crate::session::Session) caller sees. Every
//!   store-level failure is translated into the single `Fault` kind, except
//!   failures during login which become `Login`.

use std::string::FromUtf8Error;

use thiserror::Error;

/// Result type alias using the session-level Error
pub type Result<T> = std::result::Result<T, Error>;

/// Result type alias for store collaborator calls
pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Errors raised by a store collaborator
#[derive(Debug, Error)]
pub enum StoreError {
    // -------------------------------------------------------------------------
    // Schema Conflicts
    // -------------------------------------------------------------------------
    #[error("Already exists: {0}")]
    AlreadyExists(String),

    #[error("Not found: {0}")]
    NotFound(String),

    // -------------------------------------------------------------------------
    // Authentication
    // -------------------------------------------------------------------------
    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    // -------------------------------------------------------------------------
    // Request Errors
    // -------------------------------------------------------------------------
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    // -------------------------------------------------------------------------
    // Transport Errors
    // -------------------------------------------------------------------------
    #[error("Transport error: {0}")]
    Transport(#[from] std::io::Error),

    #[error("Protocol error: {0}")]
    Protocol(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl StoreError {
    /// Whether this is a login-time rejection rather than an operational fault
    pub fn is_auth(&self) -> bool {
        matches!(
            self,
            StoreError::AuthenticationFailed(_) | StoreError::Unauthorized(_)
        )
    }
}

impl From<bincode::Error> for StoreError {
    fn from(e: bincode::Error) -> Self {
        StoreError::Serialization(e.to_string())
    }
}

/// Unified error type for session operations
#[derive(Debug, Error)]
pub enum Error {
    // -------------------------------------------------------------------------
    // Store Faults
    // -------------------------------------------------------------------------
    #[error("Store fault: {0}")]
    Fault(#[from] StoreError),

    #[error("Login failed: {0}")]
    Login(#[source] StoreError),

    // -------------------------------------------------------------------------
    // Data Errors
    // -------------------------------------------------------------------------
    #[error("Encoding error: {0}")]
    Encoding(#[from] FromUtf8Error),

    #[error("Invalid file metadata for '{key}': {reason}")]
    InvalidFile { key: String, reason: String },

    #[error("Missing chunk row: {key}")]
    MissingChunk { key: String },

    // -------------------------------------------------------------------------
    // I/O Errors
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // -------------------------------------------------------------------------
    // Configuration Errors
    // -------------------------------------------------------------------------
    #[error("Configuration error: {0}")]
    Config(String),

    // -------------------------------------------------------------------------
    // Lifecycle Errors
    // -------------------------------------------------------------------------
    #[error("Session is closed")]
    Closed,
}

impl From<Error> for std::io::Error {
    fn from(e: Error) -> Self {
        match e {
            Error::Io(io) => io,
            other => std::io::Error::new(std::io::ErrorKind::Other, other),
        }
    }
}
