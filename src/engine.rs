//! Engine Module
//!
//! The storage engine that coordinates all components.
//!
//! ## Responsibilities
//! - Validate and size values before any I/O
//! - Decide append vs in-place overwrite for each log from the index
//! - Claim file offsets through the position locks
//! - Serve reads from the index (or the key log in legacy mode)
//! - Rebuild the index from the logs on startup

use std::collections::HashMap;
use std::path::Path;
use std::time::Instant;

use parking_lot::RwLock;

use crate::config::{Config, LookupMode};
use crate::error::{Result, SlotError};
use crate::index::{Index, IndexEntry};
use crate::locks::{PositionGuard, PositionLocks};
use crate::protocol::{Command, KeyValue, Reply};
use crate::recovery::Recovery;
use crate::storage::{KeyRecord, LogFile, LogStore, SizeClass, KEY_SIZE};

/// What a successful `put` did on disk
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PutOutcome {
    /// New key: slot and record appended
    Inserted,

    /// Existing key: slot and record overwritten in place
    Updated,

    /// Existing key outgrew its slot: new slot appended, record repointed
    Relocated,
}

/// The main storage engine
///
/// ## Concurrency Model
///
/// - **Writes** (put): run concurrently with each other. Each claims the
///   exact file offsets it will write in `value_locks` and `key_locks`;
///   a claim that is already held fails the put with `OffsetBusy` rather
///   than waiting. The index is only write-locked for the final upsert.
///
/// - **Reads** (get/get_by_prefix): take the index read lock only.
///
/// - **Reset**: takes the store write lock (excluding every in-flight put)
///   and the index write lock (excluding every read) for its whole duration.
pub struct Engine {
    /// Engine configuration
    config: Config,

    /// The two log files; puts share it, reset owns it
    store: RwLock<LogStore>,

    /// In-memory map of live keys (internal RwLock)
    index: Index,

    /// Offset claims on keys.db
    key_locks: PositionLocks,

    /// Offset claims on values.db
    value_locks: PositionLocks,
}

impl Engine {
    /// Open or create an engine with the given config
    ///
    /// On startup:
    /// 1. Open/create the store directory and both logs
    /// 2. Replay the key log into the index
    /// 3. Ready to serve requests
    pub fn open(config: Config) -> Result<Self> {
        let store = LogStore::open(&config.data_dir)?;
        let index = Index::new();

        let started = Instant::now();
        let result = Recovery::rebuild(&store, &index)?;
        tracing::info!(
            "Index rebuilt from {} in {:?}: {} keys, {} records, {} corrupt, {} missing values",
            config.data_dir.display(),
            started.elapsed(),
            result.keys_recovered,
            result.records_scanned,
            result.records_corrupted,
            result.values_missing
        );

        Ok(Self {
            config,
            store: RwLock::new(store),
            index,
            key_locks: PositionLocks::new("key"),
            value_locks: PositionLocks::new("value"),
        })
    }

    /// Open with a path (convenience method)
    ///
    /// Uses default config with the specified data directory
    pub fn open_path(path: &Path) -> Result<Self> {
        Self::open(Config::builder().data_dir(path).build())
    }

    /// Execute a command
    ///
    /// Routes commands to appropriate handlers
    pub fn execute(&self, command: Command) -> Result<Reply> {
        match command {
            Command::Get { key } => Ok(match self.get(&key)? {
                Some(value) => Reply::Found(KeyValue { key, value }),
                None => Reply::Missing,
            }),
            Command::Put { key, value } => {
                self.put(&key, &value)?;
                Ok(Reply::Stored)
            }
            Command::GetByPrefix { prefix } => Ok(Reply::Pairs(self.get_by_prefix(&prefix)?)),
            Command::Reset => {
                self.reset()?;
                Ok(Reply::Reset)
            }
            Command::Ping => Ok(Reply::Pong),
        }
    }

    /// Get a value by key
    ///
    /// `Ok(None)` means the key was never written (or was wiped by reset).
    pub fn get(&self, key: &str) -> Result<Option<String>> {
        match self.config.lookup_mode {
            LookupMode::Index => Ok(self.index.lookup(key).map(|entry| entry.value)),
            LookupMode::Disk => self.get_from_disk(key),
        }
    }

    /// Get every pair whose key starts with `prefix`, in no particular order
    pub fn get_by_prefix(&self, prefix: &str) -> Result<Vec<KeyValue>> {
        match self.config.lookup_mode {
            LookupMode::Index => Ok(self
                .index
                .lookup_prefix(prefix)
                .into_iter()
                .map(|entry| KeyValue {
                    key: entry.key,
                    value: entry.value,
                })
                .collect()),
            LookupMode::Disk => self.prefix_from_disk(prefix),
        }
    }

    /// Put a key-value pair
    ///
    /// Steps:
    /// 1. Validate key length and size-class the value (no I/O on failure)
    /// 2. Look up existing positions in the index
    /// 3. Claim and write the value slot
    /// 4. Claim and write the key record
    /// 5. Upsert the index, then release both claims
    ///
    /// A busy claim fails the put with `OffsetBusy`. A failure after step 3
    /// leaves the written slot in place.
    pub fn put(&self, key: &str, value: &str) -> Result<PutOutcome> {
        if key.len() > KEY_SIZE {
            return Err(SlotError::KeyTooLong { len: key.len() });
        }
        let needed = SizeClass::classify(value.len())?;

        let store = self.store.read();
        store.check_available()?;
        let existing = self.index.locate(key);

        // Step 3: value slot
        let (outcome, size_class, value_offset, _value_guard) = match existing {
            Some(loc) if loc.size_class >= needed => {
                let guard = self.value_locks.try_acquire(loc.value_offset, key)?;
                (PutOutcome::Updated, loc.size_class, loc.value_offset, guard)
            }
            Some(_) => {
                let (offset, guard) = claim_tail(store.values(), &self.value_locks, key)?;
                (PutOutcome::Relocated, needed, offset, guard)
            }
            None => {
                let (offset, guard) = claim_tail(store.values(), &self.value_locks, key)?;
                (PutOutcome::Inserted, needed, offset, guard)
            }
        };
        let slot = size_class.pad(value.as_bytes())?;
        store.values().write_at(value_offset, &slot)?;

        // Step 4: key record
        let (key_offset, _key_guard) = match existing {
            Some(loc) => (loc.key_offset, self.key_locks.try_acquire(loc.key_offset, key)?),
            None => claim_tail(store.keys(), &self.key_locks, key)?,
        };
        let record = KeyRecord::new(key, size_class, value_offset);
        store.keys().write_at(key_offset, &record.encode())?;

        // Step 5: publish
        self.index.upsert(IndexEntry {
            key: key.to_string(),
            value: value.to_string(),
            value_offset,
            size_class,
            key_offset,
        });

        tracing::debug!(
            "Put {:?}: {:?} ({} slot at {}, record at {})",
            key,
            outcome,
            size_class,
            value_offset,
            key_offset
        );
        Ok(outcome)
    }

    /// Delete both logs and the store directory, recreate them empty, and
    /// clear the index. Nothing else runs while this is in progress.
    ///
    /// If the old logs were removed but new ones could not be created, the
    /// index is still cleared and the store refuses writes until a later
    /// reset succeeds.
    pub fn reset(&self) -> Result<()> {
        let mut store = self.store.write();
        let recreated = self.index.clear_with(|| match store.reset() {
            Err(e) if store.is_available() => Err(e),
            outcome => Ok(outcome),
        })?;
        recreated?;
        tracing::info!("Store reset: {}", store.dir().display());
        Ok(())
    }

    // =========================================================================
    // Legacy Disk Lookups
    // =========================================================================

    fn get_from_disk(&self, key: &str) -> Result<Option<String>> {
        let store = self.store.read();
        store.check_available()?;

        let mut found = None;
        for item in store.scan_keys() {
            match item {
                Ok((_, record)) if record.key == key => found = Some(record),
                Ok(_) => {}
                Err(e) if e.is_corrupt() => tracing::warn!("Skipping key record: {}", e),
                Err(e) => return Err(e),
            }
        }

        found.map(|record| store.read_text(&record)).transpose()
    }

    fn prefix_from_disk(&self, prefix: &str) -> Result<Vec<KeyValue>> {
        let store = self.store.read();
        store.check_available()?;

        let mut matches: HashMap<String, KeyRecord> = HashMap::new();
        for item in store.scan_keys() {
            match item {
                Ok((_, record)) if record.key.starts_with(prefix) => {
                    matches.insert(record.key.clone(), record);
                }
                Ok(_) => {}
                Err(e) if e.is_corrupt() => tracing::warn!("Skipping key record: {}", e),
                Err(e) => return Err(e),
            }
        }

        matches
            .into_values()
            .map(|record| {
                let value = store.read_text(&record)?;
                Ok(KeyValue {
                    key: record.key,
                    value,
                })
            })
            .collect()
    }

    // =========================================================================
    // Accessors (for testing and debugging)
    // =========================================================================

    /// Get the store directory path
    pub fn data_dir(&self) -> &Path {
        &self.config.data_dir
    }

    /// Number of live keys in the index
    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Current size of keys.db
    pub fn key_log_len(&self) -> u64 {
        self.store.read().keys().len()
    }

    /// Current size of values.db
    pub fn value_log_len(&self) -> u64 {
        self.store.read().values().len()
    }

    /// Offset claims on keys.db
    pub fn key_locks(&self) -> &PositionLocks {
        &self.key_locks
    }

    /// Offset claims on values.db
    pub fn value_locks(&self) -> &PositionLocks {
        &self.value_locks
    }

    /// Get the configuration
    pub fn config(&self) -> &Config {
        &self.config
    }
}

/// Claim the current end of `log` for an append.
///
/// The tail is re-read under the claim: if another writer appended there
/// and already released it, the stale offset is refused.
fn claim_tail<'a>(
    log: &LogFile,
    locks: &'a PositionLocks,
    key: &str,
) -> Result<(u64, PositionGuard<'a>)> {
    let tail = log.len();
    let guard = locks.try_acquire(tail, key)?;
    if log.len() != tail {
        return Err(SlotError::OffsetBusy {
            log: locks.log(),
            offset: tail,
            owner: None,
        });
    }
    Ok((tail, guard))
}
