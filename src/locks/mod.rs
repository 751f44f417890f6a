//! Position Locks Module
//!
//! Exclusive, non-blocking claims on single byte offsets of a log file.
//!
//! ## Responsibilities
//! - Let exactly one writer own a file offset for the duration of a write
//! - Reject a second writer immediately instead of queueing it
//! - Release on every exit path (guard drop)
//!
//! Offsets, not keys, are the lock granularity: two different keys racing
//! to append at the same end-of-file position collide here even though
//! neither exists in the index yet.

mod registry;

pub use registry::{PositionGuard, PositionLocks};
