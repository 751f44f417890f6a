//! Key Log Scan
//!
//! Sequential iteration over the fixed-width records of the key log.

use crate::error::{Result, SlotError};

use super::{KeyRecord, LogFile, KEY_RECORD_SIZE};

/// Iterator over `(offset, record)` pairs of a key log, from offset 0.
///
/// A record that is short or fails to parse is yielded as a
/// `CorruptRecord`/`TruncatedRecord` error and the scan moves on.
/// An I/O error is yielded once and ends the scan.
pub struct KeyLogScan<'a> {
    log: &'a LogFile,
    /// Next offset to read
    position: u64,
    /// Set after a fatal error or EOF
    done: bool,
}

impl<'a> KeyLogScan<'a> {
    pub(super) fn new(log: &'a LogFile) -> Self {
        Self {
            log,
            position: 0,
            done: false,
        }
    }
}

impl<'a> Iterator for KeyLogScan<'a> {
    type Item = Result<(u64, KeyRecord)>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        let offset = self.position;
        let mut buf = [0u8; KEY_RECORD_SIZE];
        let read = match self.log.read_up_to(offset, &mut buf) {
            Ok(n) => n,
            Err(e) => {
                self.done = true;
                return Some(Err(e));
            }
        };

        // Clean EOF on a record boundary
        if read == 0 {
            self.done = true;
            return None;
        }

        // Short tail: skip past the partial bytes
        self.position += read as u64;
        if read < KEY_RECORD_SIZE {
            return Some(Err(SlotError::TruncatedRecord {
                offset,
                expected: KEY_RECORD_SIZE,
                actual: read,
            }));
        }

        Some(KeyRecord::decode(offset, &buf).map(|record| (offset, record)))
    }
}
