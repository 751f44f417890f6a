//! Tests for Key Record encoding
//!
//! These tests verify:
//! - The exact 28-byte little-endian layout
//! - Key truncation and zero padding
//! - Rejection of malformed records

use slotkv::storage::{KeyRecord, SizeClass, KEY_RECORD_SIZE};
use slotkv::SlotError;

#[test]
fn test_encode_layout() {
    let record = KeyRecord::new("user:1", SizeClass::K4, 0x0102_0304_0506);
    let bytes = record.encode();

    assert_eq!(bytes.len(), KEY_RECORD_SIZE);
    assert_eq!(&bytes[..6], b"user:1");
    assert!(bytes[6..16].iter().all(|&b| b == 0));
    assert_eq!(&bytes[16..20], &4096i32.to_le_bytes());
    assert_eq!(&bytes[20..28], &0x0102_0304_0506i64.to_le_bytes());
}

#[test]
fn test_decode_encoded_record() {
    let record = KeyRecord::new("sixteen-byte-key", SizeClass::M1, 1 << 40);
    let decoded = KeyRecord::decode(0, &record.encode()).unwrap();

    assert_eq!(decoded, record);
}

#[test]
fn test_encode_truncates_long_key() {
    let record = KeyRecord::new("this-key-is-way-too-long", SizeClass::B512, 0);
    let decoded = KeyRecord::decode(0, &record.encode()).unwrap();

    assert_eq!(decoded.key, "this-key-is-way-");
}

#[test]
fn test_decode_empty_key() {
    let record = KeyRecord::new("", SizeClass::B512, 512);
    let decoded = KeyRecord::decode(0, &record.encode()).unwrap();

    assert_eq!(decoded.key, "");
    assert_eq!(decoded.value_offset, 512);
}

#[test]
fn test_decode_short_buffer() {
    let err = KeyRecord::decode(56, &[0u8; 10]).unwrap_err();

    assert!(matches!(
        err,
        SlotError::TruncatedRecord { offset: 56, expected: 28, actual: 10 }
    ));
    assert!(err.is_corrupt());
}

#[test]
fn test_decode_unknown_size_class() {
    let mut bytes = KeyRecord::new("k", SizeClass::B512, 0).encode();
    bytes[16..20].copy_from_slice(&1000i32.to_le_bytes());

    let err = KeyRecord::decode(28, &bytes).unwrap_err();
    assert!(matches!(err, SlotError::CorruptRecord { offset: 28, .. }));
}

#[test]
fn test_decode_negative_offset() {
    let mut bytes = KeyRecord::new("k", SizeClass::B512, 0).encode();
    bytes[20..28].copy_from_slice(&(-1i64).to_le_bytes());

    assert!(matches!(
        KeyRecord::decode(0, &bytes),
        Err(SlotError::CorruptRecord { .. })
    ));
}

#[test]
fn test_decode_invalid_utf8_key() {
    let mut bytes = KeyRecord::new("k", SizeClass::B512, 0).encode();
    bytes[0] = 0xFF;
    bytes[1] = 0xFE;

    assert!(matches!(
        KeyRecord::decode(0, &bytes),
        Err(SlotError::CorruptRecord { .. })
    ));
}
