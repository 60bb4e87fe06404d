//! File write path

use std::io::{ErrorKind, Read};

use bytes::Bytes;

use crate::error::Result;
use crate::record::{chunk_key, Columns};
use crate::session::Session;
use crate::store::{Column, Store};

use super::{FileInfo, CHUNK_COLUMN};

impl<S: Store> Session<S> {
    /// Store the contents of `reader` as a file at `key`
    ///
    /// Steps:
    /// 1. Delete whatever already lives at `key` (so a shorter file leaves
    ///    no stale trailing chunks behind)
    /// 2. Write one chunk row per `chunk_size` block, in order
    /// 3. Write the metadata row (`byteCount`, `chunkSize` + `columns`)
    ///
    /// All rows share one timestamp. `reader` is consumed and dropped on
    /// every exit path, success or failure.
    pub fn put_file<R: Read>(
        &mut self,
        column_family: &str,
        key: &str,
        mut reader: R,
        columns: Option<Columns>,
    ) -> Result<FileInfo> {
        self.ensure_open()?;
        tracing::trace!(column_family = %column_family, key = %key, "Putting file");

        if self.exists(column_family, key)? {
            self.delete(column_family, key)?;
        }

        let timestamp = self.clock.tick();
        let chunk_size = self.config.chunk_size;
        let mut buffer = vec![0u8; chunk_size];
        let mut byte_count = 0u64;
        let mut index = 0u64;

        loop {
            let filled = fill_block(&mut reader, &mut buffer)?;

            if filled > 0 {
                let chunk = chunk_key(key, index);
                tracing::trace!(column_family = %column_family, chunk = %chunk, bytes = filled, "Adding chunk");

                let column = Column::new(
                    CHUNK_COLUMN,
                    Bytes::copy_from_slice(&buffer[..filled]),
                    timestamp,
                );
                self.store
                    .insert(&chunk, column_family, column, self.config.write_consistency)?;

                index += 1;
                byte_count += filled as u64;
            }

            // A short block means the reader is exhausted
            if filled < chunk_size {
                break;
            }
        }

        let info = FileInfo::new(byte_count, chunk_size as u64);
        let mut metadata = columns.unwrap_or_default();
        info.write_to(&mut metadata);
        self.write_columns(column_family, key, &metadata, timestamp)?;

        tracing::debug!(
            column_family = %column_family,
            key = %key,
            byte_count,
            chunks = index,
            "Stored file"
        );

        Ok(info)
    }

    /// Store a file only if `key` is unused. `false` if it was taken.
    pub fn add_file<R: Read>(
        &mut self,
        column_family: &str,
        key: &str,
        reader: R,
        columns: Option<Columns>,
    ) -> Result<bool> {
        if self.exists(column_family, key)? {
            return Ok(false);
        }
        self.put_file(column_family, key, reader, columns)?;
        Ok(true)
    }
}

/// Read until `buffer` is full or the reader hits end-of-stream
fn fill_block<R: Read>(reader: &mut R, buffer: &mut [u8]) -> Result<usize> {
    let mut filled = 0;
    while filled < buffer.len() {
        match reader.read(&mut buffer[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(e.into()),
        }
    }
    Ok(filled)
}
