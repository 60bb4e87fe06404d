//! Remote store client
//!
//! A [`Store`] that forwards every call over one TCP connection to a node
//! [`Server`](crate::network::Server). Single-threaded and blocking: each
//! call writes one request frame and waits for its response.

use std::io::{BufReader, BufWriter, Write};
use std::net::{Shutdown, TcpStream, ToSocketAddrs};
use std::time::Duration;

use crate::consistency::Consistency;
use crate::error::{StoreError, StoreResult};
use crate::protocol::{read_response, write_request, Reply, Request};
use crate::schema::{ColumnFamilyDef, KeyspaceDef};

use super::{Column, KeySlice, Store};

/// TCP client for a remote store node
pub struct RemoteStore {
    /// TCP stream reader (buffered for efficiency)
    reader: BufReader<TcpStream>,

    /// TCP stream writer (buffered for efficiency)
    writer: BufWriter<TcpStream>,

    /// Peer address for logging
    peer_addr: String,

    closed: bool,
}

impl RemoteStore {
    /// Connect without socket timeouts
    pub fn connect<A: ToSocketAddrs>(addr: A) -> StoreResult<Self> {
        Self::connect_with_timeouts(addr, 0, 0)
    }

    /// Connect and configure socket timeouts (milliseconds, 0 = none)
    pub fn connect_with_timeouts<A: ToSocketAddrs>(
        addr: A,
        read_timeout_ms: u64,
        write_timeout_ms: u64,
    ) -> StoreResult<Self> {
        let stream = TcpStream::connect(addr)?;

        let peer_addr = stream
            .peer_addr()
            .map(|a| a.to_string())
            .unwrap_or_else(|_| "unknown".to_string());

        // Disable Nagle's algorithm for low latency
        stream.set_nodelay(true)?;

        if read_timeout_ms > 0 {
            stream.set_read_timeout(Some(Duration::from_millis(read_timeout_ms)))?;
        }
        if write_timeout_ms > 0 {
            stream.set_write_timeout(Some(Duration::from_millis(write_timeout_ms)))?;
        }

        let read_stream = stream.try_clone()?;

        tracing::debug!(peer = %peer_addr, "Connected to store node");

        Ok(Self {
            reader: BufReader::new(read_stream),
            writer: BufWriter::new(stream),
            peer_addr,
            closed: false,
        })
    }

    /// Get the peer address string
    pub fn peer_addr(&self) -> &str {
        &self.peer_addr
    }

    /// Round-trip a health check
    pub fn ping(&mut self) -> StoreResult<()> {
        match self.call(Request::Ping)? {
            Reply::Pong => Ok(()),
            other => Err(unexpected("Ping", &other)),
        }
    }

    fn call(&mut self, request: Request) -> StoreResult<Reply> {
        if self.closed {
            return Err(StoreError::Transport(std::io::Error::new(
                std::io::ErrorKind::NotConnected,
                "connection is closed",
            )));
        }

        tracing::trace!(peer = %self.peer_addr, request = ?request.request_type(), "Sending request");

        write_request(&mut self.writer, &request)?;
        read_response(&mut self.reader)?.into_result()
    }

    fn call_done(&mut self, request: Request) -> StoreResult<()> {
        let name = request.request_type();
        match self.call(request)? {
            Reply::Done => Ok(()),
            other => Err(unexpected(&format!("{:?}", name), &other)),
        }
    }
}

fn unexpected(request: &str, reply: &Reply) -> StoreError {
    StoreError::Protocol(format!("Unexpected reply to {}: {:?}", request, reply))
}

impl Store for RemoteStore {
    fn login(&mut self, username: &str, password: &str) -> StoreResult<()> {
        self.call_done(Request::Login {
            username: username.to_string(),
            password: password.to_string(),
        })
    }

    fn use_keyspace(&mut self, keyspace: &str) -> StoreResult<()> {
        self.call_done(Request::UseKeyspace {
            keyspace: keyspace.to_string(),
        })
    }

    fn describe_keyspaces(&mut self) -> StoreResult<Vec<KeyspaceDef>> {
        match self.call(Request::DescribeKeyspaces)? {
            Reply::Keyspaces(defs) => Ok(defs),
            other => Err(unexpected("DescribeKeyspaces", &other)),
        }
    }

    fn describe_keyspace(&mut self, name: &str) -> StoreResult<KeyspaceDef> {
        match self.call(Request::DescribeKeyspace {
            name: name.to_string(),
        })? {
            Reply::Keyspace(def) => Ok(def),
            other => Err(unexpected("DescribeKeyspace", &other)),
        }
    }

    fn add_keyspace(&mut self, def: KeyspaceDef) -> StoreResult<()> {
        self.call_done(Request::AddKeyspace { def })
    }

    fn drop_keyspace(&mut self, name: &str) -> StoreResult<()> {
        self.call_done(Request::DropKeyspace {
            name: name.to_string(),
        })
    }

    fn add_column_family(&mut self, def: ColumnFamilyDef) -> StoreResult<()> {
        self.call_done(Request::AddColumnFamily { def })
    }

    fn drop_column_family(&mut self, name: &str) -> StoreResult<()> {
        self.call_done(Request::DropColumnFamily {
            name: name.to_string(),
        })
    }

    fn insert(
        &mut self,
        row: &str,
        column_family: &str,
        column: Column,
        consistency: Consistency,
    ) -> StoreResult<()> {
        self.call_done(Request::Insert {
            row: row.to_string(),
            column_family: column_family.to_string(),
            column,
            consistency,
        })
    }

    fn remove(
        &mut self,
        row: &str,
        column_family: &str,
        timestamp: i64,
        consistency: Consistency,
    ) -> StoreResult<()> {
        self.call_done(Request::Remove {
            row: row.to_string(),
            column_family: column_family.to_string(),
            timestamp,
            consistency,
        })
    }

    fn get_slice(
        &mut self,
        row: &str,
        column_family: &str,
        consistency: Consistency,
    ) -> StoreResult<Vec<Column>> {
        match self.call(Request::GetSlice {
            row: row.to_string(),
            column_family: column_family.to_string(),
            consistency,
        })? {
            Reply::Columns(columns) => Ok(columns),
            other => Err(unexpected("GetSlice", &other)),
        }
    }

    fn get_count(
        &mut self,
        row: &str,
        column_family: &str,
        consistency: Consistency,
    ) -> StoreResult<u32> {
        match self.call(Request::GetCount {
            row: row.to_string(),
            column_family: column_family.to_string(),
            consistency,
        })? {
            Reply::Count(count) => Ok(count),
            other => Err(unexpected("GetCount", &other)),
        }
    }

    fn range_slice(
        &mut self,
        column_family: &str,
        start_key: &str,
        limit: u32,
        consistency: Consistency,
    ) -> StoreResult<Vec<KeySlice>> {
        match self.call(Request::RangeSlice {
            column_family: column_family.to_string(),
            start_key: start_key.to_string(),
            limit,
            consistency,
        })? {
            Reply::Slices(slices) => Ok(slices),
            other => Err(unexpected("RangeSlice", &other)),
        }
    }

    fn flush(&mut self) -> StoreResult<()> {
        self.writer.flush()?;
        Ok(())
    }

    fn close(&mut self) {
        if self.closed {
            return;
        }
        self.closed = true;

        if let Err(e) = self.writer.get_ref().shutdown(Shutdown::Both) {
            tracing::debug!(peer = %self.peer_addr, "Socket shutdown failed: {}", e);
        }
        tracing::debug!(peer = %self.peer_addr, "Closed store connection");
    }
}
