//! Connection Handler
//!
//! Handles individual client connections.

use std::io::{BufReader, BufWriter, ErrorKind};
use std::net::TcpStream;
use std::sync::Arc;
use std::time::Duration;

use crate::config::MIN_RECORD_BATCH_SIZE;
use crate::error::{StoreError, StoreResult};
use crate::protocol::{
    read_request, write_response, RemoteError, Reply, Request, Response, MAX_PAYLOAD_SIZE,
};
use crate::store::{KeySlice, LocalStore, MemoryNode, Store};

/// Encoded bytes a range page may fill before further rows are held back
const PAGE_BUDGET: u64 = (MAX_PAYLOAD_SIZE / 2) as u64;

/// Handles a single client connection
pub struct Connection {
    /// TCP stream reader (buffered for efficiency)
    reader: BufReader<TcpStream>,

    /// TCP stream writer (buffered for efficiency)
    writer: BufWriter<TcpStream>,

    /// This client's session state on the shared node
    store: LocalStore,

    /// Peer address for logging
    peer_addr: String,
}

impl Connection {
    /// Create a new connection handler
    ///
    /// Sets up buffered I/O over the accepted stream
    pub fn new(stream: TcpStream, node: Arc<MemoryNode>) -> StoreResult<Self> {
        // Get peer address for logging before we split the stream
        let peer_addr = stream
            .peer_addr()
            .map(|a| a.to_string())
            .unwrap_or_else(|_| "unknown".to_string());

        // Disable Nagle's algorithm for low latency
        stream.set_nodelay(true)?;

        // Clone stream for separate read/write handles
        let read_stream = stream.try_clone()?;
        let write_stream = stream;

        Ok(Self {
            reader: BufReader::new(read_stream),
            writer: BufWriter::new(write_stream),
            store: LocalStore::new(node),
            peer_addr,
        })
    }

    /// Configure connection timeouts
    pub fn set_timeouts(&mut self, read_ms: u64, write_ms: u64) -> StoreResult<()> {
        let read_stream = self.reader.get_ref();
        let write_stream = self.writer.get_ref();

        if read_ms > 0 {
            read_stream.set_read_timeout(Some(Duration::from_millis(read_ms)))?;
        }
        if write_ms > 0 {
            write_stream.set_write_timeout(Some(Duration::from_millis(write_ms)))?;
        }

        Ok(())
    }

    /// Handle the connection (blocking until closed)
    ///
    /// Reads requests in a loop and sends responses.
    /// Returns when the client disconnects or an error occurs.
    pub fn handle(&mut self) -> StoreResult<()> {
        tracing::debug!("Connection established from {}", self.peer_addr);

        loop {
            let request = match read_request(&mut self.reader) {
                Ok(request) => request,
                Err(StoreError::Transport(ref e)) if is_disconnect(e.kind()) => {
                    tracing::debug!("Client {} disconnected ({:?})", self.peer_addr, e.kind());
                    return Ok(());
                }
                Err(StoreError::Transport(ref e))
                    if matches!(e.kind(), ErrorKind::WouldBlock | ErrorKind::TimedOut) =>
                {
                    tracing::debug!("Read timeout for client {}", self.peer_addr);
                    return Ok(());
                }
                Err(e) => {
                    tracing::warn!("Error reading from {}: {}", self.peer_addr, e);
                    // Send error response if possible
                    let rejection = Response::Err(RemoteError::InvalidRequest(e.to_string()));
                    let _ = write_response(&mut self.writer, &rejection);
                    return Err(e);
                }
            };

            tracing::trace!("Received {:?} from {}", request.request_type(), self.peer_addr);

            let response = Response::from(execute(&mut self.store, request));

            if let Err(e) = write_response(&mut self.writer, &response) {
                // The client went away before the response could be sent
                if let StoreError::Transport(ref io_err) = e {
                    if is_disconnect(io_err.kind()) || io_err.kind() == ErrorKind::BrokenPipe {
                        tracing::debug!(
                            "Client {} disconnected before response could be sent: {}",
                            self.peer_addr,
                            e
                        );
                        return Ok(());
                    }
                }
                tracing::warn!("Error writing to {}: {}", self.peer_addr, e);
                return Err(e);
            }
        }
    }

    /// Get the peer address string
    pub fn peer_addr(&self) -> &str {
        &self.peer_addr
    }
}

fn is_disconnect(kind: ErrorKind) -> bool {
    matches!(
        kind,
        ErrorKind::UnexpectedEof | ErrorKind::ConnectionReset | ErrorKind::ConnectionAborted
    )
}

/// Carry out one request against a store
pub fn execute<S: Store + ?Sized>(store: &mut S, request: Request) -> StoreResult<Reply> {
    match request {
        Request::Login { username, password } => {
            store.login(&username, &password)?;
            Ok(Reply::Done)
        }
        Request::UseKeyspace { keyspace } => {
            store.use_keyspace(&keyspace)?;
            Ok(Reply::Done)
        }
        Request::DescribeKeyspaces => Ok(Reply::Keyspaces(store.describe_keyspaces()?)),
        Request::DescribeKeyspace { name } => Ok(Reply::Keyspace(store.describe_keyspace(&name)?)),
        Request::AddKeyspace { def } => {
            store.add_keyspace(def)?;
            Ok(Reply::Done)
        }
        Request::DropKeyspace { name } => {
            store.drop_keyspace(&name)?;
            Ok(Reply::Done)
        }
        Request::AddColumnFamily { def } => {
            store.add_column_family(def)?;
            Ok(Reply::Done)
        }
        Request::DropColumnFamily { name } => {
            store.drop_column_family(&name)?;
            Ok(Reply::Done)
        }
        Request::Insert {
            row,
            column_family,
            column,
            consistency,
        } => {
            store.insert(&row, &column_family, column, consistency)?;
            Ok(Reply::Done)
        }
        Request::Remove {
            row,
            column_family,
            timestamp,
            consistency,
        } => {
            store.remove(&row, &column_family, timestamp, consistency)?;
            Ok(Reply::Done)
        }
        Request::GetSlice {
            row,
            column_family,
            consistency,
        } => Ok(Reply::Columns(store.get_slice(&row, &column_family, consistency)?)),
        Request::GetCount {
            row,
            column_family,
            consistency,
        } => Ok(Reply::Count(store.get_count(&row, &column_family, consistency)?)),
        Request::RangeSlice {
            column_family,
            start_key,
            limit,
            consistency,
        } => Ok(Reply::Slices(fit_page(store.range_slice(
            &column_family,
            &start_key,
            limit,
            consistency,
        )?))),
        Request::Ping => Ok(Reply::Pong),
    }
}

/// Drop trailing rows once a page outgrows [`PAGE_BUDGET`]
///
/// The first two rows always stay so a scan resuming from the last key
/// still moves forward. A caller sees a short page as an ordinary page.
fn fit_page(mut slices: Vec<KeySlice>) -> Vec<KeySlice> {
    let mut used = 0u64;
    let keep = slices.iter().enumerate().position(|(i, slice)| {
        used = used.saturating_add(bincode::serialized_size(slice).unwrap_or(u64::MAX));
        i >= MIN_RECORD_BATCH_SIZE as usize && used > PAGE_BUDGET
    });

    if let Some(keep) = keep {
        tracing::debug!(
            "Trimmed range page from {} to {} rows to fit one frame",
            slices.len(),
            keep
        );
        slices.truncate(keep);
    }
    slices
}
