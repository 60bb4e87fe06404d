//! File read path

use bytes::Bytes;

use crate::consistency::Consistency;
use crate::error::{Error, Result};
use crate::record::chunk_key;
use crate::session::Session;
use crate::store::Store;

use super::{ChunkedReader, FileInfo, CHUNK_COLUMN};

/// Byte stream over a stored file, fetching one chunk row at a time
pub type FileContent<'a, S> = ChunkedReader<ChunkSource<'a, S>>;

/// Lazy sequence of a file's chunks
///
/// Each call to `next` issues one store read for the next chunk row. Not
/// restartable; after an error it yields nothing more.
pub struct ChunkSource<'a, S: Store + ?Sized> {
    store: &'a mut S,
    column_family: String,
    key: String,
    consistency: Consistency,
    next_index: u64,
    chunk_count: u64,
}

impl<'a, S: Store + ?Sized> ChunkSource<'a, S> {
    pub fn new(
        store: &'a mut S,
        column_family: &str,
        key: &str,
        chunk_count: u64,
        consistency: Consistency,
    ) -> Self {
        Self {
            store,
            column_family: column_family.to_string(),
            key: key.to_string(),
            consistency,
            next_index: 0,
            chunk_count,
        }
    }

    /// Chunks not yet fetched
    pub fn remaining(&self) -> u64 {
        self.chunk_count - self.next_index
    }

    fn fetch(&mut self, index: u64) -> Result<Bytes> {
        let row = chunk_key(&self.key, index);
        tracing::trace!(column_family = %self.column_family, chunk = %row, "Fetching chunk");

        let columns = self
            .store
            .get_slice(&row, &self.column_family, self.consistency)?;

        columns
            .into_iter()
            .find(|c| c.name == CHUNK_COLUMN)
            .map(|c| c.value)
            .ok_or(Error::MissingChunk { key: row })
    }
}

impl<S: Store + ?Sized> Iterator for ChunkSource<'_, S> {
    type Item = Result<Bytes>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.next_index >= self.chunk_count {
            return None;
        }

        let index = self.next_index;
        self.next_index += 1;

        let chunk = self.fetch(index);
        if chunk.is_err() {
            self.next_index = self.chunk_count;
        }
        Some(chunk)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = usize::try_from(self.remaining()).unwrap_or(usize::MAX);
        (remaining, Some(remaining))
    }
}

impl<S: Store> Session<S> {
    /// Read a file's metadata; `None` if nothing is stored at `key`
    pub fn file_info(&mut self, column_family: &str, key: &str) -> Result<Option<FileInfo>> {
        match self.get_record(column_family, key)? {
            Some(columns) => FileInfo::from_columns(key, &columns).map(Some),
            None => Ok(None),
        }
    }

    /// Stream a file's contents; `None` if the file does not exist
    ///
    /// Chunks are fetched lazily as the stream is read. A zero-byte file
    /// yields an immediately exhausted stream without touching the store.
    pub fn get_file_content(
        &mut self,
        column_family: &str,
        key: &str,
    ) -> Result<Option<FileContent<'_, S>>> {
        self.ensure_open()?;
        tracing::trace!(column_family = %column_family, key = %key, "Getting file");

        let info = match self.file_info(column_family, key)? {
            Some(info) => info,
            None => return Ok(None),
        };

        let source = ChunkSource::new(
            &mut self.store,
            column_family,
            key,
            info.chunk_count(),
            self.config.read_consistency,
        );
        Ok(Some(ChunkedReader::new(source)))
    }
}
