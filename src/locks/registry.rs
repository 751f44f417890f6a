//! Position lock registry
//!
//! Offset → owner map behind a mutex, one per log file.

use std::collections::HashMap;

use parking_lot::Mutex;

use crate::error::{Result, SlotError};

/// Advisory, non-blocking claims on byte offsets of a single log file
#[derive(Debug)]
pub struct PositionLocks {
    /// Which log these offsets belong to ("key" / "value")
    log: &'static str,

    /// Held offsets and the key that holds each
    held: Mutex<HashMap<u64, String>>,
}

impl PositionLocks {
    /// Create an empty registry for the named log
    pub fn new(log: &'static str) -> Self {
        Self {
            log,
            held: Mutex::new(HashMap::new()),
        }
    }

    /// Claim `offset` for `key`.
    ///
    /// Returns `OffsetBusy` immediately if the offset is already claimed.
    /// The claim is released when the returned guard drops.
    pub fn try_acquire(&self, offset: u64, key: &str) -> Result<PositionGuard<'_>> {
        let mut held = self.held.lock();
        if let Some(owner) = held.get(&offset) {
            return Err(SlotError::OffsetBusy {
                log: self.log,
                offset,
                owner: Some(owner.clone()),
            });
        }
        held.insert(offset, key.to_string());

        Ok(PositionGuard {
            locks: self,
            offset,
        })
    }

    /// Drop the claim on `offset`. Returns the key that held it, if any.
    pub fn release(&self, offset: u64) -> Option<String> {
        self.held.lock().remove(&offset)
    }

    /// Whether `offset` is currently claimed
    pub fn is_held(&self, offset: u64) -> bool {
        self.held.lock().contains_key(&offset)
    }

    /// Key currently holding `offset`
    pub fn owner(&self, offset: u64) -> Option<String> {
        self.held.lock().get(&offset).cloned()
    }

    /// Number of offsets currently claimed
    pub fn held_count(&self) -> usize {
        self.held.lock().len()
    }

    /// Name of the log this registry guards
    pub fn log(&self) -> &'static str {
        self.log
    }
}

/// Scoped claim on one offset; releases on drop
#[derive(Debug)]
#[must_use = "the offset is released as soon as the guard is dropped"]
pub struct PositionGuard<'a> {
    locks: &'a PositionLocks,
    offset: u64,
}

impl PositionGuard<'_> {
    /// The claimed offset
    pub fn offset(&self) -> u64 {
        self.offset
    }
}

impl Drop for PositionGuard<'_> {
    fn drop(&mut self) {
        self.locks.release(self.offset);
    }
}
