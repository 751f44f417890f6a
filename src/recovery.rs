//! Index Recovery
//!
//! Rebuilds the in-memory index at startup by replaying the key log.

use std::collections::HashMap;

use crate::error::Result;
use crate::index::{Index, IndexEntry};
use crate::storage::LogStore;

/// Handles index reconstruction from the two logs
pub struct Recovery;

/// Result of a replay
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RecoveryResult {
    /// Well-formed key records read
    pub records_scanned: u64,

    /// Distinct keys loaded into the index
    pub keys_recovered: u64,

    /// Key records that were short or did not parse
    pub records_corrupted: u64,

    /// Key records whose value slot could not be read or decoded
    pub values_missing: u64,
}

impl Recovery {
    /// Scan the key log from offset 0 and read every referenced slot.
    ///
    /// This will:
    /// 1. Skip records that are truncated or fail to parse
    /// 2. Drop keys whose value slot is missing or unreadable
    /// 3. Let a later record for the same key replace an earlier one
    /// 4. Return the scratch map without touching any index
    ///
    /// Only an I/O failure on the key log itself aborts the replay.
    pub fn replay(store: &LogStore) -> Result<(HashMap<String, IndexEntry>, RecoveryResult)> {
        let mut entries: HashMap<String, IndexEntry> = HashMap::new();
        let mut result = RecoveryResult::default();

        for item in store.scan_keys() {
            let (key_offset, record) = match item {
                Ok(found) => found,
                Err(e) if e.is_corrupt() => {
                    tracing::warn!("Skipping key record: {}", e);
                    result.records_corrupted += 1;
                    continue;
                }
                Err(e) => return Err(e),
            };
            result.records_scanned += 1;

            match store.read_text(&record) {
                Ok(value) => {
                    entries.insert(
                        record.key.clone(),
                        IndexEntry {
                            key: record.key,
                            value,
                            value_offset: record.value_offset,
                            size_class: record.size_class,
                            key_offset,
                        },
                    );
                }
                Err(e) => {
                    tracing::warn!(
                        "Dropping key {:?} (record at {}): value slot unreadable: {}",
                        record.key,
                        key_offset,
                        e
                    );
                    result.values_missing += 1;
                    entries.remove(&record.key);
                }
            }
        }

        result.keys_recovered = entries.len() as u64;
        Ok((entries, result))
    }

    /// Replay the logs and install the result into `index` in one pass
    pub fn rebuild(store: &LogStore, index: &Index) -> Result<RecoveryResult> {
        let (entries, result) = Self::replay(store)?;
        index.load(entries);
        Ok(result)
    }
}
