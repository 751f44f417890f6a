//! Configuration for SlotKV
//!
//! Centralized configuration with sensible defaults.

use std::path::PathBuf;
use std::str::FromStr;

use crate::error::SlotError;

/// Main configuration for a SlotKV instance
#[derive(Debug, Clone)]
pub struct Config {
    // -------------------------------------------------------------------------
    // Storage Configuration
    // -------------------------------------------------------------------------
    /// Store directory holding both logs
    /// Internal structure:
    ///   {data_dir}/
    ///     ├── keys.db      (key-directory log, 28-byte records)
    ///     └── values.db    (value log, size-classed slots)
    pub data_dir: PathBuf,

    /// Where reads are served from
    pub lookup_mode: LookupMode,

    // -------------------------------------------------------------------------
    // Network Configuration
    // -------------------------------------------------------------------------
    /// TCP listen address
    pub listen_addr: String,

    /// Largest frame payload accepted or sent (in bytes)
    pub max_message_size: u32,

    /// Number of connection worker threads
    pub worker_threads: usize,

    /// Max accepted connections waiting for a free worker
    pub max_connections: usize,

    /// Connection read timeout (milliseconds, 0 disables)
    pub read_timeout_ms: u64,

    /// Connection write timeout (milliseconds, 0 disables)
    pub write_timeout_ms: u64,
}

/// Read path used by `Engine::get` and `Engine::get_by_prefix`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LookupMode {
    /// Serve reads from the in-memory index (no file I/O)
    #[default]
    Index,

    /// Legacy mode: linearly scan the key log on every read
    Disk,
}

impl FromStr for LookupMode {
    type Err = SlotError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "index" | "memory" => Ok(LookupMode::Index),
            "disk" | "filesystem" => Ok(LookupMode::Disk),
            other => Err(SlotError::Config(format!(
                "unknown lookup mode '{}' (expected 'index' or 'disk')",
                other
            ))),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("./db"),
            lookup_mode: LookupMode::Index,
            listen_addr: "127.0.0.1:5050".to_string(),
            max_message_size: 16 * 1024 * 1024, // 16 MB
            worker_threads: 8,
            max_connections: 1024,
            read_timeout_ms: 5000,
            write_timeout_ms: 5000,
        }
    }
}

impl Config {
    /// Create a new config builder
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }
}

/// Builder for Config
#[derive(Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Set the store directory
    pub fn data_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.data_dir = path.into();
        self
    }

    /// Set the read path
    pub fn lookup_mode(mut self, mode: LookupMode) -> Self {
        self.config.lookup_mode = mode;
        self
    }

    /// Set the TCP listen address
    pub fn listen_addr(mut self, addr: impl Into<String>) -> Self {
        self.config.listen_addr = addr.into();
        self
    }

    /// Set the maximum frame payload size (in bytes)
    pub fn max_message_size(mut self, size: u32) -> Self {
        self.config.max_message_size = size;
        self
    }

    /// Set the number of connection worker threads
    pub fn worker_threads(mut self, count: usize) -> Self {
        self.config.worker_threads = count;
        self
    }

    /// Set the maximum number of queued connections
    pub fn max_connections(mut self, count: usize) -> Self {
        self.config.max_connections = count;
        self
    }

    /// Set the read timeout (in milliseconds)
    pub fn read_timeout_ms(mut self, ms: u64) -> Self {
        self.config.read_timeout_ms = ms;
        self
    }

    /// Set the write timeout (in milliseconds)
    pub fn write_timeout_ms(mut self, ms: u64) -> Self {
        self.config.write_timeout_ms = ms;
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}
