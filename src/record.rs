//! Record codec
//!
//! Maps a logical record (column name -> string value) onto store columns and
//! back, and owns the naming scheme for chunk rows.
//!
//! ## Chunk Row Keys
//! ```text
//! {file_key}-chunk-{n}      n = 0, 1, 2, ...
//! ```
//! Any key ending in `-chunk-<digits>` is treated as a chunk row and is never
//! surfaced as a top-level record.

use std::collections::BTreeMap;

use bytes::Bytes;

use crate::error::Result;
use crate::store::Column;

/// A record's columns. An empty map is the same as no record.
pub type Columns = BTreeMap<String, String>;

/// Infix separating a file key from its chunk index
pub const CHUNK_INFIX: &str = "-chunk-";

/// Key of chunk `index` of the file stored at `file_key`
pub fn chunk_key(file_key: &str, index: u64) -> String {
    format!("{}{}{}", file_key, CHUNK_INFIX, index)
}

/// Whether `key` names a chunk row
pub fn is_chunk_key(key: &str) -> bool {
    match key.rsplit_once(CHUNK_INFIX) {
        Some((_, index)) => !index.is_empty() && index.bytes().all(|b| b.is_ascii_digit()),
        None => false,
    }
}

/// Convert record columns to store columns sharing one timestamp
pub fn encode_columns(columns: &Columns, timestamp: i64) -> Vec<Column> {
    columns
        .iter()
        .map(|(name, value)| Column {
            name: name.clone(),
            value: Bytes::copy_from_slice(value.as_bytes()),
            timestamp,
        })
        .collect()
}

/// Convert store columns to a record; `None` when there are none
pub fn decode_columns(columns: Vec<Column>) -> Result<Option<Columns>> {
    if columns.is_empty() {
        return Ok(None);
    }

    let mut record = Columns::new();
    for column in columns {
        let value = String::from_utf8(column.value.to_vec())?;
        record.insert(column.name, value);
    }
    Ok(Some(record))
}
