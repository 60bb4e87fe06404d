//! rowvault Node Binary
//!
//! Starts an in-memory reference node that sessions can connect to over TCP.

use std::sync::Arc;

use clap::Parser;
use rowvault::config::NodeConfig;
use rowvault::network::Server;
use rowvault::MemoryNode;
use tracing_subscriber::{fmt, EnvFilter};

/// rowvault reference node
#[derive(Parser, Debug)]
#[command(name = "rowvault-node")]
#[command(about = "In-memory column-family node for rowvault sessions")]
#[command(version)]
struct Args {
    /// Listen address (host:port)
    #[arg(short, long, default_value = "127.0.0.1:9160")]
    listen: String,

    /// Maximum concurrent connections
    #[arg(short, long, default_value = "1024")]
    max_connections: usize,

    /// Idle read timeout per connection in ms (0 = none)
    #[arg(long, default_value = "300000")]
    read_timeout_ms: u64,

    /// Require login; repeatable, as user:password
    #[arg(short, long = "user", value_name = "USER:PASSWORD")]
    users: Vec<String>,
}

fn main() {
    // Initialize tracing/logging
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,rowvault=debug"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(true)
        .init();

    let args = Args::parse();

    tracing::info!("rowvault node v{}", rowvault::VERSION);
    tracing::info!("Listen address: {}", args.listen);

    let mut builder = NodeConfig::builder()
        .listen_addr(&args.listen)
        .max_connections(args.max_connections)
        .read_timeout_ms(args.read_timeout_ms);

    for entry in &args.users {
        match entry.split_once(':') {
            Some((user, password)) if !user.is_empty() => {
                builder = builder.user(user, password);
            }
            _ => {
                tracing::error!("Invalid --user value {:?}, expected USER:PASSWORD", entry);
                std::process::exit(2);
            }
        }
    }

    let config = builder.build();
    let node = Arc::new(MemoryNode::with_credentials(config.credentials.clone()));

    if node.requires_login() {
        tracing::info!("Login required ({} users)", config.credentials.len());
    }

    let server = match Server::bind(config, node) {
        Ok(s) => s,
        Err(e) => {
            tracing::error!("Failed to bind: {}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = server.run() {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }

    tracing::info!("Node stopped");
}
