//! Index Module
//!
//! In-memory map of every live key, the only read path after bootstrap.
//!
//! ## Responsibilities
//! - Point and prefix lookups without touching disk
//! - Remember where each key's record and slot live, so updates overwrite
//!   in place instead of appending
//! - Single-writer/multi-reader access pattern
//!
//! ## Data Structure Choice
//! One HashMap behind one RwLock: lookups share the lock, mutations take it
//! exclusively. Prefix queries scan the whole map and return entries in no
//! guaranteed order.

mod table;

pub use table::Index;

use crate::storage::SizeClass;

/// Entry stored in the Index
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexEntry {
    pub key: String,
    pub value: String,

    /// Slot offset in the value log
    pub value_offset: u64,

    /// Capacity of that slot
    pub size_class: SizeClass,

    /// Record offset in the key log
    pub key_offset: u64,
}

impl IndexEntry {
    /// Where this key lives on disk
    pub fn location(&self) -> SlotLocation {
        SlotLocation {
            value_offset: self.value_offset,
            size_class: self.size_class,
            key_offset: self.key_offset,
        }
    }
}

/// On-disk position of a key, without its value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlotLocation {
    pub value_offset: u64,
    pub size_class: SizeClass,
    pub key_offset: u64,
}
