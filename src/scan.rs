//! Paginated record enumeration
//!
//! Turns the store's bounded, inclusive-start range scan into a full pass
//! over a column family.
//!
//! ## Protocol
//! ```text
//! cursor = ""
//! loop:
//!   batch = range_slice(cf, start = cursor, limit = batch_size)
//!   for row in batch:
//!     skip if row.key == last key of the previous batch   (re-returned boundary)
//!     skip if row.key is a chunk row                       (file internals)
//!     skip if row has no columns                           (tombstone)
//!     visit(row)                                           (until it breaks)
//!   stop if batch.len() <= 1 or visit broke
//!   cursor = last key of batch
//! ```
//!
//! Each page after the first overlaps the previous one by exactly its first
//! row, so `batch_size` must be at least 2 for the cursor to advance.

use std::ops::ControlFlow;

use crate::consistency::Consistency;
use crate::error::Result;
use crate::record::{decode_columns, is_chunk_key, Columns};
use crate::store::{KeySlice, Store};

/// Drives repeated range scans over one store
pub struct RecordScanner<'a, S: Store + ?Sized> {
    store: &'a mut S,
    batch_size: u32,
    consistency: Consistency,
}

impl<'a, S: Store + ?Sized> RecordScanner<'a, S> {
    /// `batch_size` below 2 is raised to 2
    pub fn new(store: &'a mut S, batch_size: u32, consistency: Consistency) -> Self {
        Self {
            store,
            batch_size: batch_size.max(2),
            consistency,
        }
    }

    /// Visit every live record of `column_family` in ascending key order
    ///
    /// Returns the number of records passed to `visit`. Once `visit` breaks,
    /// the rest of the current page is drained without further calls and no
    /// more pages are fetched.
    pub fn for_each<F>(&mut self, column_family: &str, mut visit: F) -> Result<u64>
    where
        F: FnMut(&str, &Columns) -> ControlFlow<()>,
    {
        let mut cursor = String::new();
        let mut boundary: Option<String> = None;
        let mut visited = 0u64;
        let mut stopped = false;
        let mut pages = 0u64;

        loop {
            let batch = self
                .store
                .range_slice(column_family, &cursor, self.batch_size, self.consistency)?;
            let batch_len = batch.len();
            pages += 1;

            tracing::trace!(
                column_family = %column_family,
                cursor = %cursor,
                rows = batch_len,
                "Fetched page"
            );

            let mut last_key = None;
            for KeySlice { key, columns } in batch {
                let eligible = !stopped
                    && boundary.as_deref() != Some(key.as_str())
                    && !is_chunk_key(&key);

                if eligible {
                    if let Some(record) = decode_columns(columns)? {
                        visited += 1;
                        if visit(&key, &record).is_break() {
                            stopped = true;
                        }
                    }
                }
                last_key = Some(key);
            }

            if stopped || batch_len <= 1 {
                break;
            }

            if let Some(key) = last_key {
                cursor.clone_from(&key);
                boundary = Some(key);
            }
        }

        tracing::debug!(
            column_family = %column_family,
            visited,
            pages,
            stopped,
            "Finished record scan"
        );

        Ok(visited)
    }
}
