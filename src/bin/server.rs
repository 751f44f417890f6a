//! SlotKV Server Binary
//!
//! Starts the TCP server for SlotKV.

use std::sync::Arc;

use clap::Parser;
use slotkv::network::Server;
use slotkv::{Config, Engine, LookupMode};
use tracing_subscriber::{fmt, EnvFilter};

/// SlotKV Server
#[derive(Parser, Debug)]
#[command(name = "slotkv-server")]
#[command(about = "Key-value store over a key log and a size-classed value log")]
#[command(version)]
struct Args {
    /// Store directory (holds keys.db and values.db)
    #[arg(short, long, default_value = "./db")]
    data_dir: String,

    /// Interface to listen on
    #[arg(long, default_value = "127.0.0.1")]
    host: String,

    /// The server port
    #[arg(short, long, default_value = "5050")]
    port: u16,

    /// Maximum request/response payload in MB
    #[arg(long, default_value = "16")]
    max_message_mb: u32,

    /// Connection worker threads
    #[arg(short, long, default_value = "8")]
    workers: usize,

    /// Maximum queued connections
    #[arg(short, long, default_value = "1024")]
    max_connections: usize,

    /// Read path: "index" (in-memory) or "disk" (scan keys.db per request)
    #[arg(long, default_value = "index")]
    lookup_mode: LookupMode,
}

fn main() {
    // Initialize tracing/logging
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,slotkv=debug"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(true)
        .init();

    let args = Args::parse();
    let listen_addr = format!("{}:{}", args.host, args.port);

    tracing::info!("SlotKV Server v{}", slotkv::VERSION);
    tracing::info!("Data directory: {}", args.data_dir);
    tracing::info!("Listen address: {}", listen_addr);
    tracing::info!("Lookup mode: {:?}", args.lookup_mode);

    // Build config from args
    let config = Config::builder()
        .data_dir(&args.data_dir)
        .listen_addr(listen_addr)
        .max_message_size(args.max_message_mb.saturating_mul(1024 * 1024))
        .worker_threads(args.workers)
        .max_connections(args.max_connections)
        .lookup_mode(args.lookup_mode)
        .build();

    // Open engine (replays keys.db into the index)
    let engine = match Engine::open(config.clone()) {
        Ok(e) => Arc::new(e),
        Err(e) => {
            tracing::error!("Failed to open engine: {}", e);
            std::process::exit(1);
        }
    };

    tracing::info!("Engine initialized with {} keys", engine.len());

    let server = match Server::bind(config, engine) {
        Ok(s) => s,
        Err(e) => {
            tracing::error!("Failed to start server: {}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = server.run() {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}
