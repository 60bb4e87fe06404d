//! File Module
//!
//! Chunked storage of arbitrarily large byte streams on top of records.
//!
//! ## Layout
//! ```text
//! ┌───────────────────────────────────────────────────────────┐
//! │ {key}            byteCount=<n>  chunkSize=<s>  [caller..] │  metadata
//! ├───────────────────────────────────────────────────────────┤
//! │ {key}-chunk-0    bytes=<s bytes>                          │
//! │ {key}-chunk-1    bytes=<s bytes>                          │
//! │ ...                                                       │
//! │ {key}-chunk-k    bytes=<1..=s bytes>                      │  k = ceil(n/s) - 1
//! └───────────────────────────────────────────────────────────┘
//! ```
//!
//! The metadata row is written last and is the only proof that a file
//! exists. Chunk count is never stored; it is derived from `byteCount` and
//! `chunkSize` on every read.
//!
//! ## Failure Semantics
//! Neither writing nor deleting is atomic. A delete interrupted before the
//! metadata row is removed leaves a file whose missing chunks surface as
//! [`Error::MissingChunk`] on read. A delete interrupted after it leaves
//! orphaned chunk rows that nothing references until the key is written again.

mod write;
mod read;
mod stream;
mod delete;

pub use read::{ChunkSource, FileContent};
pub use stream::ChunkedReader;

use crate::error::{Error, Result};
use crate::record::Columns;

/// Metadata column holding the payload length
pub const BYTE_COUNT_COLUMN: &str = "byteCount";

/// Metadata column holding the chunk size used at write time
pub const CHUNK_SIZE_COLUMN: &str = "chunkSize";

/// Column holding a chunk row's bytes
pub const CHUNK_COLUMN: &str = "bytes";

/// Number of chunk rows for a payload, by integer ceiling division
pub fn chunk_count(byte_count: u64, chunk_size: u64) -> u64 {
    if chunk_size == 0 {
        return 0;
    }
    byte_count.div_ceil(chunk_size)
}

/// Size information stored in a file's metadata record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileInfo {
    pub byte_count: u64,
    pub chunk_size: u64,
}

impl FileInfo {
    pub fn new(byte_count: u64, chunk_size: u64) -> Self {
        Self {
            byte_count,
            chunk_size,
        }
    }

    pub fn chunk_count(&self) -> u64 {
        chunk_count(self.byte_count, self.chunk_size)
    }

    /// Whether a record carries file metadata
    pub fn is_file(columns: &Columns) -> bool {
        columns.contains_key(BYTE_COUNT_COLUMN) && columns.contains_key(CHUNK_SIZE_COLUMN)
    }

    /// Parse the metadata record of the file at `key`
    pub fn from_columns(key: &str, columns: &Columns) -> Result<Self> {
        let byte_count = parse_column(key, columns, BYTE_COUNT_COLUMN)?;
        let chunk_size = parse_column(key, columns, CHUNK_SIZE_COLUMN)?;

        if chunk_size == 0 {
            return Err(Error::InvalidFile {
                key: key.to_string(),
                reason: "chunk size is zero".to_string(),
            });
        }

        Ok(Self::new(byte_count, chunk_size))
    }

    /// Merge the size columns into caller-supplied metadata
    pub fn write_to(&self, columns: &mut Columns) {
        columns.insert(BYTE_COUNT_COLUMN.to_string(), self.byte_count.to_string());
        columns.insert(CHUNK_SIZE_COLUMN.to_string(), self.chunk_size.to_string());
    }
}

fn parse_column(key: &str, columns: &Columns, name: &str) -> Result<u64> {
    let raw = columns.get(name).ok_or_else(|| Error::InvalidFile {
        key: key.to_string(),
        reason: format!("missing '{}' column", name),
    })?;

    raw.trim().parse().map_err(|_| Error::InvalidFile {
        key: key.to_string(),
        reason: format!("'{}' is not a byte count: {:?}", name, raw),
    })
}
