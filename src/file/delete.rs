//! File delete path

use crate::error::Result;
use crate::session::Session;
use crate::store::Store;

impl<S: Store> Session<S> {
    /// Delete a file: chunk rows first, metadata last. No-op if absent.
    ///
    /// Not atomic; see the module docs for what an interrupted delete leaves.
    pub fn delete_file(&mut self, column_family: &str, key: &str) -> Result<()> {
        self.ensure_open()?;
        tracing::trace!(column_family = %column_family, key = %key, "Deleting file");

        let info = match self.file_info(column_family, key)? {
            Some(info) => info,
            None => return Ok(()),
        };

        self.delete_chunks_and_metadata(column_family, key, &info)?;

        tracing::debug!(
            column_family = %column_family,
            key = %key,
            chunks = info.chunk_count(),
            "Deleted file"
        );
        Ok(())
    }
}
