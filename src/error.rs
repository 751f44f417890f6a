//! Error types for SlotKV
//!
//! Provides a unified error type for all operations.

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias using SlotError
pub type Result<T> = std::result::Result<T, SlotError>;

/// Unified error type for SlotKV operations
#[derive(Debug, Error)]
pub enum SlotError {
    // -------------------------------------------------------------------------
    // I/O Errors
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // -------------------------------------------------------------------------
    // Request Validation Errors
    // -------------------------------------------------------------------------
    #[error("Key too long: {len} bytes (max 16)")]
    KeyTooLong { len: usize },

    #[error("Value too large: {len} bytes (max 4 MiB)")]
    OversizeValue { len: usize },

    // -------------------------------------------------------------------------
    // Concurrency Errors
    // -------------------------------------------------------------------------
    #[error("Offset {offset} in {log} log is busy")]
    OffsetBusy {
        log: &'static str,
        offset: u64,
        /// Key holding the offset, when another writer still owns it
        owner: Option<String>,
    },

    // -------------------------------------------------------------------------
    // Log Format Errors
    // -------------------------------------------------------------------------
    #[error("Truncated record at offset {offset}: expected {expected} bytes, got {actual}")]
    TruncatedRecord {
        offset: u64,
        expected: usize,
        actual: usize,
    },

    #[error("Corrupt record at offset {offset}: {reason}")]
    CorruptRecord { offset: u64, reason: String },

    // -------------------------------------------------------------------------
    // Store State Errors
    // -------------------------------------------------------------------------
    #[error("Store at {} is unavailable after a failed reset", .dir.display())]
    StoreUnavailable { dir: PathBuf },

    // -------------------------------------------------------------------------
    // Network Errors
    // -------------------------------------------------------------------------
    #[error("Network error: {0}")]
    Network(String),

    #[error("Protocol error: {0}")]
    Protocol(String),

    // -------------------------------------------------------------------------
    // Configuration Errors
    // -------------------------------------------------------------------------
    #[error("Configuration error: {0}")]
    Config(String),
}

impl SlotError {
    /// Application-level failures the front end reports without treating
    /// the request as broken: rejected sizes and lock contention.
    pub fn is_soft(&self) -> bool {
        matches!(
            self,
            SlotError::KeyTooLong { .. }
                | SlotError::OversizeValue { .. }
                | SlotError::OffsetBusy { .. }
        )
    }

    /// Errors local to a single log record. Scans skip these and continue.
    pub fn is_corrupt(&self) -> bool {
        matches!(
            self,
            SlotError::CorruptRecord { .. } | SlotError::TruncatedRecord { .. }
        )
    }
}
