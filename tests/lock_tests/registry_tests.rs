//! Tests for the Position Lock Registry
//!
//! These tests verify:
//! - A held offset rejects a second claimant without blocking
//! - Guards release on drop
//! - Independent offsets do not interfere

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Barrier};
use std::thread;

use slotkv::locks::PositionLocks;
use slotkv::SlotError;

#[test]
fn test_acquire_and_release_on_drop() {
    let locks = PositionLocks::new("value");

    {
        let guard = locks.try_acquire(512, "alpha").unwrap();
        assert_eq!(guard.offset(), 512);
        assert!(locks.is_held(512));
        assert_eq!(locks.owner(512).as_deref(), Some("alpha"));
    }

    assert!(!locks.is_held(512));
    assert_eq!(locks.held_count(), 0);
}

#[test]
fn test_busy_offset_reports_owner() {
    let locks = PositionLocks::new("key");
    let _guard = locks.try_acquire(28, "alpha").unwrap();

    let err = locks.try_acquire(28, "beta").unwrap_err();

    match err {
        SlotError::OffsetBusy { log, offset, owner } => {
            assert_eq!(log, "key");
            assert_eq!(offset, 28);
            assert_eq!(owner.as_deref(), Some("alpha"));
        }
        other => panic!("expected OffsetBusy, got {:?}", other),
    }
}

#[test]
fn test_same_key_cannot_reenter() {
    let locks = PositionLocks::new("value");
    let _guard = locks.try_acquire(0, "alpha").unwrap();

    assert!(locks.try_acquire(0, "alpha").is_err());
}

#[test]
fn test_distinct_offsets_are_independent() {
    let locks = PositionLocks::new("value");

    let a = locks.try_acquire(0, "a").unwrap();
    let b = locks.try_acquire(512, "b").unwrap();
    assert_eq!(locks.held_count(), 2);

    drop(a);
    assert!(!locks.is_held(0));
    assert!(locks.is_held(512));
    drop(b);
    assert_eq!(locks.held_count(), 0);
}

#[test]
fn test_reacquire_after_release() {
    let locks = PositionLocks::new("value");

    drop(locks.try_acquire(4096, "first").unwrap());
    let guard = locks.try_acquire(4096, "second").unwrap();

    assert_eq!(locks.owner(guard.offset()).as_deref(), Some("second"));
}

#[test]
fn test_explicit_release() {
    let locks = PositionLocks::new("value");
    let guard = locks.try_acquire(7, "k").unwrap();

    assert_eq!(locks.release(7).as_deref(), Some("k"));
    assert_eq!(locks.release(7), None);
    drop(guard);
    assert_eq!(locks.held_count(), 0);
}

#[test]
fn test_concurrent_claims_single_winner() {
    let locks = Arc::new(PositionLocks::new("value"));
    let barrier = Arc::new(Barrier::new(8));
    let winners = Arc::new(AtomicUsize::new(0));
    let holders = Arc::new(Barrier::new(8));

    let handles: Vec<_> = (0..8)
        .map(|i| {
            let locks = Arc::clone(&locks);
            let barrier = Arc::clone(&barrier);
            let holders = Arc::clone(&holders);
            let winners = Arc::clone(&winners);
            thread::spawn(move || {
                barrier.wait();
                let claim = locks.try_acquire(1024, &format!("writer-{}", i));
                if claim.is_ok() {
                    winners.fetch_add(1, Ordering::SeqCst);
                }
                // Keep the winner's guard alive until every thread has tried
                holders.wait();
                drop(claim);
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(winners.load(Ordering::SeqCst), 1);
    assert_eq!(locks.held_count(), 0);
}
