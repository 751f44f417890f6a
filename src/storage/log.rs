//! Log File
//!
//! A flat file addressed by byte offset. Every read and write is a
//! positioned operation (`pread`/`pwrite` on unix), so one handle can be
//! shared across threads without a shared cursor.

use std::fs::{File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use crate::error::{Result, SlotError};

/// One of the two store files
#[derive(Debug)]
pub struct LogFile {
    /// Path on disk (for diagnostics)
    path: PathBuf,

    /// Read-write handle, created if absent
    file: File,

    /// End of the last completed write; never covers a write in progress
    tail: AtomicU64,
}

impl LogFile {
    /// Open or create a log file
    pub fn open(path: &Path) -> Result<Self> {
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(path)?;

        let tail = file.metadata()?.len();

        Ok(Self {
            path: path.to_path_buf(),
            file,
            tail: AtomicU64::new(tail),
        })
    }

    /// Current end-of-file offset
    pub fn len(&self) -> u64 {
        self.tail.load(Ordering::Acquire)
    }

    /// Whether the file holds no bytes
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Write `bytes` at the current end of file and return where they landed.
    ///
    /// Two unsynchronised callers may compute the same end offset; the
    /// engine claims the offset in a `PositionLocks` registry first.
    pub fn append(&self, bytes: &[u8]) -> Result<u64> {
        let offset = self.len();
        self.write_at(offset, bytes)?;
        Ok(offset)
    }

    /// Overwrite `bytes` starting at `offset`
    pub fn write_at(&self, offset: u64, bytes: &[u8]) -> Result<()> {
        write_all_at(&self.file, bytes, offset)?;
        self.tail.fetch_max(offset + bytes.len() as u64, Ordering::AcqRel);
        Ok(())
    }

    /// Read exactly `length` bytes starting at `offset`.
    ///
    /// Returns `TruncatedRecord` if the file ends first.
    pub fn read_at(&self, offset: u64, length: usize) -> Result<Vec<u8>> {
        let mut buf = vec![0u8; length];
        let actual = self.read_up_to(offset, &mut buf)?;
        if actual < length {
            return Err(SlotError::TruncatedRecord {
                offset,
                expected: length,
                actual,
            });
        }
        Ok(buf)
    }

    /// Move the tail back to `len` so the next append overwrites whatever
    /// lies beyond it. The bytes stay on disk until then.
    pub(crate) fn rewind(&self, len: u64) {
        self.tail.store(len, Ordering::Release);
    }

    /// Fill as much of `buf` as the file allows; returns bytes read
    pub(crate) fn read_up_to(&self, offset: u64, buf: &mut [u8]) -> Result<usize> {
        let mut filled = 0;
        while filled < buf.len() {
            match read_at(&self.file, &mut buf[filled..], offset + filled as u64) {
                Ok(0) => break,
                Ok(n) => filled += n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            }
        }
        Ok(filled)
    }

    /// Path of this log file
    pub fn path(&self) -> &Path {
        &self.path
    }
}

// =============================================================================
// Positioned I/O
// =============================================================================

#[cfg(unix)]
fn read_at(file: &File, buf: &mut [u8], offset: u64) -> io::Result<usize> {
    use std::os::unix::fs::FileExt;
    file.read_at(buf, offset)
}

#[cfg(unix)]
fn write_all_at(file: &File, buf: &[u8], offset: u64) -> io::Result<()> {
    use std::os::unix::fs::FileExt;
    file.write_all_at(buf, offset)
}

#[cfg(windows)]
fn read_at(file: &File, buf: &mut [u8], offset: u64) -> io::Result<usize> {
    use std::os::windows::fs::FileExt;
    file.seek_read(buf, offset)
}

#[cfg(windows)]
fn write_all_at(file: &File, mut buf: &[u8], mut offset: u64) -> io::Result<()> {
    use std::os::windows::fs::FileExt;
    while !buf.is_empty() {
        match file.seek_write(buf, offset) {
            Ok(0) => {
                return Err(io::Error::new(
                    io::ErrorKind::WriteZero,
                    "failed to write whole buffer",
                ))
            }
            Ok(n) => {
                buf = &buf[n..];
                offset += n as u64;
            }
            Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
            Err(e) => return Err(e),
        }
    }
    Ok(())
}
