//! Byte-stream adapter over a lazy sequence of chunks
//!
//! Holds at most one block at a time. A new block is pulled only when the
//! current one is fully consumed, so nothing is fetched before the first read
//! and nothing past the last chunk is ever requested.

use std::io::{self, Read};

use bytes::{Buf, Bytes};

use crate::error::Result;

/// `io::Read` over an iterator of byte blocks
///
/// Forward-only and single-pass. Empty blocks are skipped; an error from the
/// source is returned once and ends the stream.
pub struct ChunkedReader<I>
where
    I: Iterator<Item = Result<Bytes>>,
{
    source: I,

    /// Unread remainder of the current block
    current: Bytes,

    exhausted: bool,
}

impl<I> ChunkedReader<I>
where
    I: Iterator<Item = Result<Bytes>>,
{
    pub fn new(source: I) -> Self {
        Self {
            source,
            current: Bytes::new(),
            exhausted: false,
        }
    }

    /// Read a single byte; `Ok(None)` at end of stream
    pub fn read_byte(&mut self) -> io::Result<Option<u8>> {
        if !self.fill()? {
            return Ok(None);
        }
        Ok(Some(self.current.get_u8()))
    }

    /// Make sure the current block has unread bytes. `false` at end of stream.
    fn fill(&mut self) -> io::Result<bool> {
        while !self.current.has_remaining() {
            if self.exhausted {
                return Ok(false);
            }

            match self.source.next() {
                Some(Ok(block)) => self.current = block,
                Some(Err(e)) => {
                    self.exhausted = true;
                    return Err(e.into());
                }
                None => {
                    self.exhausted = true;
                    return Ok(false);
                }
            }
        }
        Ok(true)
    }
}

impl<I> Read for ChunkedReader<I>
where
    I: Iterator<Item = Result<Bytes>>,
{
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if buf.is_empty() || !self.fill()? {
            return Ok(0);
        }

        let n = buf.len().min(self.current.remaining());
        self.current.copy_to_slice(&mut buf[..n]);
        Ok(n)
    }
}
