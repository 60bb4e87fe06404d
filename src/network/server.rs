//! TCP Server
//!
//! Accepts connections and serves each on its own thread.

use std::io::ErrorKind;
use std::net::{SocketAddr, TcpListener, TcpStream};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use crossbeam::channel::{self, Receiver, Sender};

use crate::config::NodeConfig;
use crate::error::Result;
use crate::protocol::{write_response, RemoteError, Response};
use crate::store::MemoryNode;

use super::Connection;

/// How long the accept loop sleeps when no connection is pending
const ACCEPT_POLL_INTERVAL: Duration = Duration::from_millis(10);

/// TCP server for a reference node
pub struct Server {
    config: NodeConfig,
    node: Arc<MemoryNode>,
    listener: TcpListener,
    shutdown: Arc<AtomicBool>,
    slots: ConnectionSlots,
}

/// Cloneable handle that asks a running server to stop
#[derive(Clone)]
pub struct ShutdownHandle {
    flag: Arc<AtomicBool>,
}

impl ShutdownHandle {
    pub fn shutdown(&self) {
        self.flag.store(true, Ordering::Relaxed);
    }
}

/// Counting semaphore over a bounded channel: one queued token per open connection
struct ConnectionSlots {
    acquire: Sender<()>,
    release: Receiver<()>,
}

/// Frees its slot when the connection thread ends
struct SlotGuard {
    release: Receiver<()>,
}

impl ConnectionSlots {
    fn new(capacity: usize) -> Self {
        let (acquire, release) = channel::bounded(capacity.max(1));
        Self { acquire, release }
    }

    fn try_acquire(&self) -> Option<SlotGuard> {
        self.acquire.try_send(()).ok()?;
        Some(SlotGuard {
            release: self.release.clone(),
        })
    }

    fn in_use(&self) -> usize {
        self.acquire.len()
    }
}

impl Drop for SlotGuard {
    fn drop(&mut self) {
        let _ = self.release.try_recv();
    }
}

impl Server {
    /// Bind the listen address given in the config
    pub fn bind(config: NodeConfig, node: Arc<MemoryNode>) -> Result<Self> {
        let listener = TcpListener::bind(&config.listen_addr)?;
        listener.set_nonblocking(true)?;

        tracing::info!("Listening on {}", listener.local_addr()?);

        let slots = ConnectionSlots::new(config.max_connections);
        Ok(Self {
            config,
            node,
            listener,
            shutdown: Arc::new(AtomicBool::new(false)),
            slots,
        })
    }

    /// The bound address (useful when binding port 0)
    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    pub fn shutdown_handle(&self) -> ShutdownHandle {
        ShutdownHandle {
            flag: Arc::clone(&self.shutdown),
        }
    }

    /// Accept connections until shut down (blocking)
    ///
    /// Every accepted client gets its own thread, so an idle client never
    /// holds up another. Past `max_connections` open clients, new ones are
    /// sent an error response and closed. The accept loop never blocks on a
    /// client, and connection threads still running at shutdown finish their
    /// client (or hit the idle timeout) on their own.
    pub fn run(&self) -> Result<()> {
        while !self.shutdown.load(Ordering::Relaxed) {
            match self.listener.accept() {
                Ok((stream, addr)) => {
                    tracing::trace!("Accepted connection from {}", addr);
                    // Accepted sockets inherit non-blocking mode on some platforms
                    if let Err(e) = stream.set_nonblocking(false) {
                        tracing::warn!("Dropping connection from {}: {}", addr, e);
                        continue;
                    }
                    self.dispatch(stream, addr);
                }
                Err(ref e) if e.kind() == ErrorKind::WouldBlock => {
                    thread::sleep(ACCEPT_POLL_INTERVAL);
                }
                Err(e) => {
                    tracing::warn!("Accept failed: {}", e);
                }
            }
        }

        tracing::info!(
            "Server shutting down ({} connections still open)",
            self.slots.in_use()
        );
        Ok(())
    }

    /// Signal the server to shutdown gracefully
    pub fn shutdown(&self) {
        self.shutdown.store(true, Ordering::Relaxed);
    }

    fn dispatch(&self, stream: TcpStream, addr: SocketAddr) {
        let slot = match self.slots.try_acquire() {
            Some(slot) => slot,
            None => {
                tracing::warn!(
                    "Refusing {}: connection limit of {} reached",
                    addr,
                    self.config.max_connections
                );
                refuse(stream, self.config.max_connections);
                return;
            }
        };

        let node = Arc::clone(&self.node);
        let (read_ms, write_ms) = (self.config.read_timeout_ms, self.config.write_timeout_ms);

        let spawned = thread::Builder::new()
            .name(format!("node-conn-{}", addr))
            .spawn(move || {
                serve(stream, node, read_ms, write_ms);
                drop(slot);
            });
        if let Err(e) = spawned {
            tracing::error!("Failed to spawn connection thread for {}: {}", addr, e);
        }
    }
}

fn serve(stream: TcpStream, node: Arc<MemoryNode>, read_ms: u64, write_ms: u64) {
    let mut connection = match Connection::new(stream, node) {
        Ok(c) => c,
        Err(e) => {
            tracing::warn!("Failed to set up connection: {}", e);
            return;
        }
    };

    if let Err(e) = connection.set_timeouts(read_ms, write_ms) {
        tracing::warn!("Failed to set timeouts for {}: {}", connection.peer_addr(), e);
        return;
    }

    if let Err(e) = connection.handle() {
        tracing::warn!("Connection {} ended with error: {}", connection.peer_addr(), e);
    }
}

/// Send the client an error response, then close
fn refuse(stream: TcpStream, limit: usize) {
    let _ = stream.set_write_timeout(Some(Duration::from_millis(100)));
    let rejection = Response::Err(RemoteError::Internal(format!(
        "node is at its connection limit of {}",
        limit
    )));
    let _ = write_response(&mut &stream, &rejection);
}
