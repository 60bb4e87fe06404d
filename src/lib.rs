//! # rowvault
//!
//! A client-side access layer over a sorted column-family store with:
//! - Chunked storage of arbitrarily large byte streams ("files")
//! - Lazy, one-chunk-at-a-time streaming reads
//! - Full column-family enumeration on top of bounded range scans
//! - A TCP store client and an in-process reference node
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                        Session                               │
//! │        (schema / record forwarding, single-threaded)         │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//!          ┌────────────┴────────────┐
//!          │                         │
//!          ▼                         ▼
//!   ┌─────────────┐          ┌─────────────┐
//!   │ Chunk Codec │          │   Record    │
//!   │   (file)    │          │  Scanner    │
//!   └──────┬──────┘          └──────┬──────┘
//!          │                        │
//!          ▼                        ▼
//!   ┌─────────────────────────────────────┐
//!   │           Store (trait)             │
//!   │   LocalStore  │  RemoteStore (TCP)  │
//!   └───────┬───────┴──────────┬──────────┘
//!           ▼                  ▼
//!    ┌─────────────┐    ┌─────────────┐
//!    │ MemoryNode  │◄───│   Server    │
//!    └─────────────┘    └─────────────┘
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;
pub mod consistency;
pub mod schema;

pub mod store;
pub mod record;
pub mod file;
pub mod scan;
pub mod session;
pub mod protocol;
pub mod network;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use error::{Error, Result, StoreError, StoreResult};
pub use config::{ConnectionConfig, NodeConfig};
pub use consistency::Consistency;
pub use record::Columns;
pub use file::{ChunkedReader, FileInfo};
pub use session::Session;
pub use store::{LocalStore, MemoryNode, RemoteStore, Store};

// =============================================================================
// Version Info
// =============================================================================

/// Current version of rowvault
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
