//! Key Record
//!
//! The fixed-width entry of the key-directory log.

use bytes::{Buf, BufMut, BytesMut};

use crate::error::{Result, SlotError};

use super::{SizeClass, KEY_RECORD_SIZE, KEY_SIZE};

/// One 28-byte entry of `keys.db`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyRecord {
    /// Key text (at most `KEY_SIZE` bytes once encoded)
    pub key: String,

    /// Capacity of the value slot reserved for this key
    pub size_class: SizeClass,

    /// Byte offset of the slot in `values.db`
    pub value_offset: u64,
}

impl KeyRecord {
    pub fn new(key: impl Into<String>, size_class: SizeClass, value_offset: u64) -> Self {
        Self {
            key: key.into(),
            size_class,
            value_offset,
        }
    }

    /// Encode to the on-disk layout.
    ///
    /// Keys longer than `KEY_SIZE` bytes are truncated; callers validate
    /// length before reaching this point.
    pub fn encode(&self) -> [u8; KEY_RECORD_SIZE] {
        let mut key_field = [0u8; KEY_SIZE];
        let key = self.key.as_bytes();
        let n = key.len().min(KEY_SIZE);
        key_field[..n].copy_from_slice(&key[..n]);

        let mut buf = BytesMut::with_capacity(KEY_RECORD_SIZE);
        buf.put_slice(&key_field);
        buf.put_i32_le(self.size_class.as_i32());
        buf.put_i64_le(self.value_offset as i64);

        let mut out = [0u8; KEY_RECORD_SIZE];
        out.copy_from_slice(&buf);
        out
    }

    /// Decode a record read at `offset`; the offset only feeds error reports
    pub fn decode(offset: u64, bytes: &[u8]) -> Result<Self> {
        if bytes.len() != KEY_RECORD_SIZE {
            return Err(SlotError::TruncatedRecord {
                offset,
                expected: KEY_RECORD_SIZE,
                actual: bytes.len(),
            });
        }

        let key_field = &bytes[..KEY_SIZE];
        let key_len = key_field
            .iter()
            .rposition(|&b| b != 0)
            .map_or(0, |i| i + 1);
        let key = std::str::from_utf8(&key_field[..key_len])
            .map_err(|e| SlotError::CorruptRecord {
                offset,
                reason: format!("key is not valid UTF-8: {}", e),
            })?
            .to_string();

        let mut buf = &bytes[KEY_SIZE..];

        let raw_class = buf.get_i32_le();
        let size_class = SizeClass::from_i32(raw_class).ok_or_else(|| SlotError::CorruptRecord {
            offset,
            reason: format!("unknown size class {}", raw_class),
        })?;

        let raw_offset = buf.get_i64_le();
        if raw_offset < 0 {
            return Err(SlotError::CorruptRecord {
                offset,
                reason: format!("negative value offset {}", raw_offset),
            });
        }

        Ok(Self {
            key,
            size_class,
            value_offset: raw_offset as u64,
        })
    }
}
