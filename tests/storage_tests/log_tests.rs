//! Tests for LogFile and the key log scan
//!
//! These tests verify:
//! - Append returns the previous end of file
//! - In-place overwrite does not move the tail
//! - Short reads surface as TruncatedRecord
//! - Scan skips corrupt and partial records but keeps going

use std::fs::OpenOptions;
use std::io::Write;
use std::path::PathBuf;

use slotkv::storage::{KeyRecord, LogFile, LogStore, SizeClass, KEY_RECORD_SIZE};
use slotkv::SlotError;
use tempfile::TempDir;

// =============================================================================
// Helper Functions
// =============================================================================

fn setup_temp_log() -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("test.db");
    (temp_dir, path)
}

/// Append raw bytes to a file outside of LogFile (for crafting corruption)
fn append_raw(path: &PathBuf, bytes: &[u8]) {
    let mut file = OpenOptions::new().append(true).create(true).open(path).unwrap();
    file.write_all(bytes).unwrap();
}

// =============================================================================
// LogFile
// =============================================================================

#[test]
fn test_open_creates_file() {
    let (_temp, path) = setup_temp_log();

    let log = LogFile::open(&path).unwrap();

    assert!(path.exists());
    assert!(log.is_empty());
    assert_eq!(log.len(), 0);
}

#[test]
fn test_append_returns_offsets() {
    let (_temp, path) = setup_temp_log();
    let log = LogFile::open(&path).unwrap();

    assert_eq!(log.append(b"aaaa").unwrap(), 0);
    assert_eq!(log.append(b"bb").unwrap(), 4);
    assert_eq!(log.append(b"cccccc").unwrap(), 6);
    assert_eq!(log.len(), 12);
}

#[test]
fn test_write_at_overwrites_in_place() {
    let (_temp, path) = setup_temp_log();
    let log = LogFile::open(&path).unwrap();

    log.append(b"0123456789").unwrap();
    log.write_at(2, b"xy").unwrap();

    assert_eq!(log.len(), 10);
    assert_eq!(log.read_at(0, 10).unwrap(), b"01xy456789");
}

#[test]
fn test_write_at_past_end_extends_tail() {
    let (_temp, path) = setup_temp_log();
    let log = LogFile::open(&path).unwrap();

    log.write_at(8, b"tail").unwrap();

    assert_eq!(log.len(), 12);
    assert_eq!(log.read_at(0, 12).unwrap(), b"\0\0\0\0\0\0\0\0tail");
}

#[test]
fn test_read_at_truncated() {
    let (_temp, path) = setup_temp_log();
    let log = LogFile::open(&path).unwrap();
    log.append(b"short").unwrap();

    let err = log.read_at(2, 10).unwrap_err();

    assert!(matches!(
        err,
        SlotError::TruncatedRecord { offset: 2, expected: 10, actual: 3 }
    ));
}

#[test]
fn test_reopen_preserves_tail() {
    let (_temp, path) = setup_temp_log();
    {
        let log = LogFile::open(&path).unwrap();
        log.append(&[1u8; 100]).unwrap();
    }

    let log = LogFile::open(&path).unwrap();
    assert_eq!(log.len(), 100);
    assert_eq!(log.append(b"x").unwrap(), 100);
}

// =============================================================================
// KeyLogScan
// =============================================================================

#[test]
fn test_scan_empty_log() {
    let temp_dir = TempDir::new().unwrap();
    let store = LogStore::open(temp_dir.path()).unwrap();

    assert_eq!(store.scan_keys().count(), 0);
}

#[test]
fn test_scan_yields_offsets_in_order() {
    let temp_dir = TempDir::new().unwrap();
    let store = LogStore::open(temp_dir.path()).unwrap();

    for (i, key) in ["a", "b", "c"].iter().enumerate() {
        let record = KeyRecord::new(*key, SizeClass::B512, (i * 512) as u64);
        store.keys().append(&record.encode()).unwrap();
    }

    let scanned: Vec<(u64, KeyRecord)> = store.scan_keys().map(Result::unwrap).collect();

    assert_eq!(scanned.len(), 3);
    assert_eq!(scanned[0].0, 0);
    assert_eq!(scanned[1].0, 28);
    assert_eq!(scanned[2].0, 56);
    assert_eq!(scanned[2].1.key, "c");
    assert_eq!(scanned[2].1.value_offset, 1024);
}

#[test]
fn test_scan_skips_partial_tail() {
    let temp_dir = TempDir::new().unwrap();
    let keys_path = temp_dir.path().join(LogStore::KEYS_FILENAME);
    append_raw(&keys_path, &KeyRecord::new("a", SizeClass::B512, 0).encode());
    append_raw(&keys_path, &[7u8; 11]);

    let store = LogStore::open(temp_dir.path()).unwrap();
    let items: Vec<_> = store.scan_keys().collect();

    assert_eq!(items.len(), 2);
    assert!(items[0].is_ok());
    assert!(matches!(
        items[1],
        Err(SlotError::TruncatedRecord { offset: 28, expected: 28, actual: 11 })
    ));
}

#[test]
fn test_scan_continues_past_corrupt_record() {
    let temp_dir = TempDir::new().unwrap();
    let keys_path = temp_dir.path().join(LogStore::KEYS_FILENAME);

    let mut bad = KeyRecord::new("bad", SizeClass::B512, 0).encode();
    bad[16..20].copy_from_slice(&7i32.to_le_bytes());

    append_raw(&keys_path, &KeyRecord::new("first", SizeClass::B512, 0).encode());
    append_raw(&keys_path, &bad);
    append_raw(&keys_path, &KeyRecord::new("third", SizeClass::K4, 512).encode());

    let store = LogStore::open(temp_dir.path()).unwrap();
    let items: Vec<_> = store.scan_keys().collect();

    assert_eq!(items.len(), 3);
    assert!(matches!(&items[1], Err(e) if e.is_corrupt()));
    let (offset, third) = items[2].as_ref().unwrap();
    assert_eq!(*offset, 2 * KEY_RECORD_SIZE as u64);
    assert_eq!(third.key, "third");
}
