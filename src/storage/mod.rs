//! Storage Module
//!
//! Two flat binary logs with no header, magic number, or version field.
//!
//! ## Responsibilities
//! - Size-class values into zero-padded slots
//! - Append and overwrite records at explicit offsets
//! - Offset-addressed reads
//! - Sequential scan of the key log for recovery and legacy lookups
//!
//! ## File Format
//!
//! ### keys.db (28-byte records, little-endian)
//! ```text
//! ┌──────────────────────┬────────────────┬──────────────────────┐
//! │ Key (16, zero-padded)│ SizeClass (i32)│ ValueOffset (i64)    │
//! └──────────────────────┴────────────────┴──────────────────────┘
//! ```
//!
//! ### values.db (slots of 512B | 4KiB | 512KiB | 1MiB | 4MiB)
//! ```text
//! ┌──────────────────────────────┬───────────────────────────────┐
//! │ Value bytes                  │ 0x00 padding to slot length   │
//! └──────────────────────────────┴───────────────────────────────┘
//! ```

pub mod bucket;
mod record;
mod log;
mod scan;
mod store;

pub use bucket::SizeClass;
pub use record::KeyRecord;
pub use log::LogFile;
pub use scan::KeyLogScan;
pub use store::LogStore;

/// Width of the key field in a key record
pub const KEY_SIZE: usize = 16;

/// Key (16) + SizeClass (4) + ValueOffset (8)
pub const KEY_RECORD_SIZE: usize = KEY_SIZE + 4 + 8;
