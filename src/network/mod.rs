//! Network Module
//!
//! TCP server for a reference node.
//!
//! ## Architecture
//! - Single acceptor thread (non-blocking accept, polled shutdown flag)
//! - One thread per connection, capped by a crossbeam channel used as a
//!   counting semaphore
//! - Each connection owns a [`LocalStore`](crate::store::LocalStore) session
//!   on the shared [`MemoryNode`](crate::store::MemoryNode)

mod server;
mod connection;

pub use server::{Server, ShutdownHandle};
pub use connection::{execute, Connection};
