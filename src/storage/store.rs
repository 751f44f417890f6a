//! Log Store
//!
//! The store directory and the pair of log files inside it.

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{Result, SlotError};

use super::{bucket, KeyLogScan, KeyRecord, LogFile, KEY_RECORD_SIZE};

/// `keys.db` + `values.db` under one directory
#[derive(Debug)]
pub struct LogStore {
    /// Store directory
    dir: PathBuf,

    /// Key-directory log
    keys: LogFile,

    /// Value log
    values: LogFile,

    /// Set when a reset removed the directory but could not recreate it;
    /// the handles above then point at unlinked files
    detached: bool,
}

impl LogStore {
    // =========================================================================
    // Internal Path Constants
    // =========================================================================
    pub const KEYS_FILENAME: &'static str = "keys.db";
    pub const VALUES_FILENAME: &'static str = "values.db";

    /// Open or create the store under `dir`
    pub fn open(dir: &Path) -> Result<Self> {
        fs::create_dir_all(dir)?;

        let keys = LogFile::open(&dir.join(Self::KEYS_FILENAME))?;
        let values = LogFile::open(&dir.join(Self::VALUES_FILENAME))?;

        // A crash mid-append can leave a partial record at the end of the
        // key log. Appends must stay on the 28-byte grid the scan reads.
        let torn = keys.len() % KEY_RECORD_SIZE as u64;
        if torn != 0 {
            let aligned = keys.len() - torn;
            tracing::warn!(
                "Key log {} ends in a torn {}-byte record; next append overwrites it at {}",
                keys.path().display(),
                torn,
                aligned
            );
            keys.rewind(aligned);
        }

        Ok(Self {
            dir: dir.to_path_buf(),
            keys,
            values,
            detached: false,
        })
    }

    /// Delete the directory with both logs, then recreate it empty.
    ///
    /// If this fails after the old logs are gone, the store is left
    /// unavailable until a later reset succeeds.
    pub fn reset(&mut self) -> Result<()> {
        let outcome = self.wipe_and_reopen();
        if let Err(e) = &outcome {
            self.detached = !self.logs_present();
            if self.detached {
                tracing::error!("Reset of {} failed mid-way: {}", self.dir.display(), e);
            }
        }
        outcome
    }

    fn wipe_and_reopen(&mut self) -> Result<()> {
        if self.dir.exists() {
            fs::remove_dir_all(&self.dir)?;
        }
        *self = Self::open(&self.dir)?;
        Ok(())
    }

    fn logs_present(&self) -> bool {
        self.dir.join(Self::KEYS_FILENAME).is_file()
            && self.dir.join(Self::VALUES_FILENAME).is_file()
    }

    /// Whether the logs behind this store still exist
    pub fn is_available(&self) -> bool {
        !self.detached
    }

    /// Fail with `StoreUnavailable` after a reset that lost the directory
    pub fn check_available(&self) -> Result<()> {
        if self.detached {
            return Err(SlotError::StoreUnavailable {
                dir: self.dir.clone(),
            });
        }
        Ok(())
    }

    /// Scan the key log from offset 0
    pub fn scan_keys(&self) -> KeyLogScan<'_> {
        KeyLogScan::new(&self.keys)
    }

    /// Read the slot a key record points at, with padding removed
    pub fn read_value(&self, record: &KeyRecord) -> Result<Vec<u8>> {
        let slot = self
            .values
            .read_at(record.value_offset, record.size_class.capacity())?;
        Ok(bucket::strip_padding(&slot).to_vec())
    }

    /// Read the slot a key record points at as UTF-8 text
    pub fn read_text(&self, record: &KeyRecord) -> Result<String> {
        let bytes = self.read_value(record)?;
        String::from_utf8(bytes).map_err(|e| SlotError::CorruptRecord {
            offset: record.value_offset,
            reason: format!("value is not valid UTF-8: {}", e),
        })
    }

    /// Key-directory log
    pub fn keys(&self) -> &LogFile {
        &self.keys
    }

    /// Value log
    pub fn values(&self) -> &LogFile {
        &self.values
    }

    /// Store directory
    pub fn dir(&self) -> &Path {
        &self.dir
    }
}
