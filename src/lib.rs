//! # SlotKV
//!
//! An embedded key-value store built on two flat binary logs:
//! - A key-directory log of fixed 28-byte records (`keys.db`)
//! - A value log of zero-padded, size-classed slots (`values.db`)
//! - An in-memory index rebuilt from the logs at startup
//! - Offset-level position locks that reject concurrent writers
//! - TCP-based client protocol
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      TCP Server                              │
//! │              (Acceptor + Worker Pool)                        │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//! ┌─────────────────────▼───────────────────────────────────────┐
//! │                       Engine                                 │
//! │           (Put / Get / GetByPrefix / Reset)                  │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//!          ┌────────────┼─────────────────────┐
//!          │            │                     │
//!          ▼            ▼                     ▼
//!   ┌─────────────┐ ┌──────────────┐  ┌──────────────┐
//!   │    Index    │ │ Position     │  │  Log Store   │
//!   │  (RwLock)   │ │ Locks (x2)   │  │ keys/values  │
//!   └──────▲──────┘ └──────────────┘  └──────┬───────┘
//!          │                                 │
//!          └──────────── Recovery ◄──────────┘
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;

pub mod storage;
pub mod locks;
pub mod index;
pub mod recovery;
pub mod network;
pub mod protocol;
pub mod engine;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use error::{SlotError, Result};
pub use config::{Config, LookupMode};
pub use engine::{Engine, PutOutcome};

// =============================================================================
// Version Info
// =============================================================================

/// Current version of SlotKV
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
