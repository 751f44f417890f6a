//! Bucket Allocator
//!
//! Maps a value's byte length onto one of five fixed slot sizes and
//! builds the zero-padded slot buffer written to the value log.

use std::fmt;

use crate::error::{Result, SlotError};

/// Fixed capacity of a value-log slot
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(i32)]
pub enum SizeClass {
    /// 512 bytes
    B512 = 512,
    /// 4 KiB
    K4 = 4 * 1024,
    /// 512 KiB
    K512 = 512 * 1024,
    /// 1 MiB
    M1 = 1024 * 1024,
    /// 4 MiB
    M4 = 4 * 1024 * 1024,
}

impl SizeClass {
    /// All classes, smallest first
    pub const ALL: [SizeClass; 5] = [
        SizeClass::B512,
        SizeClass::K4,
        SizeClass::K512,
        SizeClass::M1,
        SizeClass::M4,
    ];

    /// Largest value the allocator accepts
    pub const MAX_VALUE_LEN: usize = SizeClass::M4 as usize;

    /// Smallest class whose capacity is >= `len`
    pub fn classify(len: usize) -> Result<SizeClass> {
        Self::ALL
            .iter()
            .copied()
            .find(|class| len <= class.capacity())
            .ok_or(SlotError::OversizeValue { len })
    }

    /// Slot length in bytes
    pub fn capacity(self) -> usize {
        self as i32 as usize
    }

    /// Value stored in the `size_class` field of a key record
    pub fn as_i32(self) -> i32 {
        self as i32
    }

    /// Parse the `size_class` field of a key record
    pub fn from_i32(raw: i32) -> Option<SizeClass> {
        Self::ALL.iter().copied().find(|class| class.as_i32() == raw)
    }

    /// Copy `value` into a zeroed buffer of exactly `capacity()` bytes.
    ///
    /// Fails with `OversizeValue` when `value` does not fit this class.
    pub fn pad(self, value: &[u8]) -> Result<Vec<u8>> {
        if value.len() > self.capacity() {
            return Err(SlotError::OversizeValue { len: value.len() });
        }
        let mut slot = vec![0u8; self.capacity()];
        slot[..value.len()].copy_from_slice(value);
        Ok(slot)
    }
}

impl fmt::Display for SizeClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SizeClass::B512 => write!(f, "512B"),
            SizeClass::K4 => write!(f, "4KiB"),
            SizeClass::K512 => write!(f, "512KiB"),
            SizeClass::M1 => write!(f, "1MiB"),
            SizeClass::M4 => write!(f, "4MiB"),
        }
    }
}

/// Classify `value` and return its class together with the padded slot
pub fn allocate(value: &[u8]) -> Result<(SizeClass, Vec<u8>)> {
    let class = SizeClass::classify(value.len())?;
    let slot = class.pad(value)?;
    Ok((class, slot))
}

/// Drop the zero padding from the end of a slot read back from disk
pub fn strip_padding(slot: &[u8]) -> &[u8] {
    let end = slot.iter().rposition(|&b| b != 0).map_or(0, |i| i + 1);
    &slot[..end]
}
