//! ArcReplacer Tests
//!
//! Scenario tests in the style of BusTub's arc_replacer_test.cpp, driving
//! the replacer the way a buffer pool manager would.

use arcpool::{AccessType, ArcReplacer, ArcStatus, Error, FrameId, ListSizes, PageId};
use std::sync::Arc;
use std::thread;

fn fid(n: usize) -> FrameId {
    FrameId::new(n)
}

fn pid(n: u32) -> PageId {
    PageId::new(n)
}

fn access(replacer: &ArcReplacer, frame: usize, page: u32) {
    replacer.record_access(fid(frame), pid(page), AccessType::Unknown);
}

fn pages(replacer: &ArcReplacer, status: ArcStatus) -> Vec<u32> {
    replacer
        .snapshot_list(status)
        .into_iter()
        .map(|page| page.0)
        .collect()
}

// ============================================================================
// Sample
// ============================================================================

#[test]
fn test_sample() {
    let replacer = ArcReplacer::new(7);

    // Six frames on Mru, page id equal to frame id. Frame 6 is pinned.
    for n in 1..=6 {
        access(&replacer, n, n as u32);
    }
    replacer.set_evictable(fid(6), false).unwrap();
    assert_eq!(replacer.size(), 5);

    // A second touch moves frame 1 to Mfu.
    access(&replacer, 1, 1);
    assert_eq!(pages(&replacer, ArcStatus::Mfu), vec![1]);

    // p = 0: evict from the back of Mru.
    assert_eq!(replacer.evict(), Some(fid(2)));
    assert_eq!(replacer.evict(), Some(fid(3)));
    assert_eq!(replacer.evict(), Some(fid(4)));
    assert_eq!(replacer.size(), 2);
    assert_eq!(pages(&replacer, ArcStatus::MruGhost), vec![4, 3, 2]);

    // New page 7 in frame 7.
    access(&replacer, 7, 7);
    assert_eq!(pages(&replacer, ArcStatus::Mru), vec![7, 6, 5]);

    // Page 2 comes back in frame 2: ghost hit, p grows to 1.
    access(&replacer, 2, 2);
    assert_eq!(replacer.target_size(), 1);
    assert_eq!(pages(&replacer, ArcStatus::Mfu), vec![2, 1]);
    assert_eq!(replacer.size(), 4);

    // |Mru| = 3 >= p: still evicting from Mru, skipping pinned frame 6.
    assert_eq!(replacer.evict(), Some(fid(5)));
    assert_eq!(replacer.evict(), Some(fid(7)));

    // Only pinned frame 6 left on Mru: fall back to Mfu.
    assert_eq!(replacer.evict(), Some(fid(1)));
    assert_eq!(pages(&replacer, ArcStatus::MfuGhost), vec![1]);
    assert_eq!(pages(&replacer, ArcStatus::MruGhost), vec![7, 5, 4, 3]);
    assert_eq!(replacer.size(), 1);

    // Mfu ghost hit with |MfuGhost| < |MruGhost|: p -= floor(4 / 1), floored at 0.
    access(&replacer, 1, 1);
    assert_eq!(replacer.target_size(), 0);
    assert_eq!(pages(&replacer, ArcStatus::Mfu), vec![1, 2]);
    assert_eq!(replacer.list_sizes().mfu_ghost, 0);

    assert_eq!(replacer.evict(), Some(fid(2)));
    replacer.set_evictable(fid(6), true).unwrap();
    assert_eq!(replacer.evict(), Some(fid(6)));
    assert_eq!(replacer.evict(), Some(fid(1)));
    assert_eq!(replacer.evict(), None);
    assert_eq!(replacer.size(), 0);

    replacer.debug_validate_invariants();
}

// ============================================================================
// Worked trace
// ============================================================================

#[track_caller]
fn assert_lists(replacer: &ArcReplacer, target: usize, lists: [&[u32]; 4]) {
    assert_eq!(replacer.target_size(), target, "target size");
    assert_eq!(pages(replacer, ArcStatus::Mru), lists[0], "Mru");
    assert_eq!(pages(replacer, ArcStatus::Mfu), lists[1], "Mfu");
    assert_eq!(pages(replacer, ArcStatus::MruGhost), lists[2], "MruGhost");
    assert_eq!(pages(replacer, ArcStatus::MfuGhost), lists[3], "MfuGhost");
    replacer.debug_validate_invariants();
}

/// Capacity 3, every step worked out by hand.
#[test]
fn test_worked_trace_with_target_size() {
    let replacer = ArcReplacer::new(3);

    for n in 1..=3 {
        access(&replacer, n, n as u32);
    }
    assert_lists(&replacer, 0, [&[3, 2, 1], &[], &[], &[]]);

    access(&replacer, 1, 1);
    assert_lists(&replacer, 0, [&[3, 2], &[1], &[], &[]]);

    // p = 0, so Mru gives up its oldest frames.
    assert_eq!(replacer.evict(), Some(fid(2)));
    assert_eq!(replacer.evict(), Some(fid(3)));
    assert_lists(&replacer, 0, [&[], &[1], &[3, 2], &[]]);

    // MruGhost hit, |MruGhost| 2 >= |MfuGhost| 0: p = 0 + 1.
    access(&replacer, 2, 2);
    assert_lists(&replacer, 1, [&[], &[2, 1], &[3], &[]]);

    // Miss: |Mru| + |MruGhost| = 1 and total = 3, nothing purged.
    access(&replacer, 3, 4);
    assert_lists(&replacer, 1, [&[4], &[2, 1], &[3], &[]]);
    assert_eq!(replacer.size(), 3);

    // |Mru| 1 == p: Mru still preferred.
    assert_eq!(replacer.evict(), Some(fid(3)));
    assert_lists(&replacer, 1, [&[], &[2, 1], &[4, 3], &[]]);

    // |Mru| 0 < p: Mfu gives up its oldest frames.
    assert_eq!(replacer.evict(), Some(fid(1)));
    assert_eq!(replacer.evict(), Some(fid(2)));
    assert_lists(&replacer, 1, [&[], &[], &[4, 3], &[2, 1]]);
    assert_eq!(replacer.size(), 0);

    // MfuGhost hit, |MfuGhost| 2 >= |MruGhost| 2: p = 1 - 1.
    access(&replacer, 1, 1);
    assert_lists(&replacer, 0, [&[], &[1], &[4, 3], &[2]]);

    // MruGhost hit, |MruGhost| 2 >= |MfuGhost| 1: p = 0 + 1.
    access(&replacer, 2, 3);
    assert_lists(&replacer, 1, [&[], &[3, 1], &[4], &[2]]);

    // Miss: |Mru| + |MruGhost| = 1 and total = 4, nothing purged.
    access(&replacer, 3, 5);
    assert_lists(&replacer, 1, [&[5], &[3, 1], &[4], &[2]]);

    assert_eq!(replacer.evict(), Some(fid(3)));
    assert_eq!(replacer.evict(), Some(fid(1)));
    assert_lists(&replacer, 1, [&[], &[3], &[5, 4], &[1, 2]]);

    // MfuGhost hit, |MfuGhost| 2 >= |MruGhost| 2: p = 1 - 1.
    access(&replacer, 1, 2);
    assert_lists(&replacer, 0, [&[], &[2, 3], &[5, 4], &[1]]);

    // MfuGhost hit, |MfuGhost| 1 < |MruGhost| 2: p = 0 - floor(2 / 1), floored at 0.
    access(&replacer, 3, 1);
    assert_lists(&replacer, 0, [&[], &[1, 2, 3], &[5, 4], &[]]);
    assert_eq!(replacer.size(), 3);

    // Mru is empty, so the victim comes from Mfu even though p = 0.
    assert_eq!(replacer.evict(), Some(fid(2)));
    assert_lists(&replacer, 0, [&[], &[1, 2], &[5, 4], &[3]]);

    let stats = replacer.stats_snapshot();
    assert_eq!(stats.mru_ghost_hits, 2);
    assert_eq!(stats.mfu_ghost_hits, 3);
    assert_eq!(stats.misses, 5);
    assert_eq!(stats.fallback_evictions, 1);
}

// ============================================================================
// Documented scenarios
// ============================================================================

#[test]
fn test_pinned_frame_forces_fallback_victim() {
    let replacer = ArcReplacer::new(2);
    access(&replacer, 1, 1);
    access(&replacer, 2, 2);
    assert_eq!(pages(&replacer, ArcStatus::Mru), vec![2, 1]);
    assert_eq!(replacer.size(), 2);

    replacer.set_evictable(fid(1), false).unwrap();

    assert_eq!(replacer.evict(), Some(fid(2)));
    assert_eq!(replacer.status_of_page(pid(2)), Some(ArcStatus::MruGhost));
    // Frame 1 is pinned and frame 2 is gone.
    assert_eq!(replacer.size(), 0);
}

#[test]
fn test_ghost_hit_adapts_target_size() {
    let replacer = ArcReplacer::new(4);
    for n in 1..=4 {
        access(&replacer, n, n as u32);
    }
    assert_eq!(replacer.list_sizes().mru, 4);

    let first = replacer.evict().unwrap();
    let second = replacer.evict().unwrap();
    assert_eq!((first, second), (fid(1), fid(2)));
    assert_eq!(replacer.list_sizes().mru_ghost, 2);
    assert_eq!(replacer.list_sizes().mfu_ghost, 0);

    let before = replacer.target_size();
    access(&replacer, 10, 2);

    assert_eq!(replacer.target_size(), before + 1);
    assert_eq!(replacer.snapshot_list(ArcStatus::Mfu).first(), Some(&pid(2)));
    assert_eq!(replacer.status_of_page(pid(2)), Some(ArcStatus::Mfu));
    replacer.debug_validate_invariants();
}

#[test]
fn test_evict_moves_page_to_front_of_ghost_list() {
    let replacer = ArcReplacer::new(3);
    for n in 1..=3 {
        access(&replacer, n, n as u32 * 10);
    }
    access(&replacer, 3, 30);

    let size_before = replacer.size();
    assert_eq!(replacer.evict(), Some(fid(1)));
    assert!(!replacer.contains_frame(fid(1)));
    assert_eq!(replacer.snapshot_list(ArcStatus::MruGhost)[0], pid(10));
    assert_eq!(replacer.size(), size_before - 1);

    assert_eq!(replacer.evict(), Some(fid(2)));
    assert_eq!(pages(&replacer, ArcStatus::MruGhost), vec![20, 10]);

    assert_eq!(replacer.evict(), Some(fid(3)));
    assert_eq!(pages(&replacer, ArcStatus::MfuGhost), vec![30]);
}

#[test]
fn test_repeated_hits_leave_history_alone() {
    let replacer = ArcReplacer::new(4);
    for n in 1..=4 {
        access(&replacer, n, n as u32);
    }
    replacer.evict();
    access(&replacer, 2, 2);
    let sizes = replacer.list_sizes();
    let target = replacer.target_size();

    for _ in 0..10 {
        access(&replacer, 2, 2);
        access(&replacer, 3, 3);
    }

    assert_eq!(replacer.target_size(), target);
    assert_eq!(replacer.list_sizes().ghosts(), sizes.ghosts());
    assert_eq!(pages(&replacer, ArcStatus::Mfu), vec![3, 2]);
    assert_eq!(pages(&replacer, ArcStatus::Mru), vec![4]);
}

#[test]
fn test_removed_page_returns_as_miss() {
    let replacer = ArcReplacer::new(3);
    access(&replacer, 1, 1);
    access(&replacer, 2, 2);
    replacer.remove(fid(1)).unwrap();

    assert_eq!(replacer.list_sizes().ghosts(), 0);

    access(&replacer, 3, 1);
    assert_eq!(replacer.status_of_page(pid(1)), Some(ArcStatus::Mru));
    assert_eq!(replacer.target_size(), 0);

    let stats = replacer.stats_snapshot();
    assert_eq!(stats.mru_ghost_hits, 0);
    assert_eq!(stats.mfu_ghost_hits, 0);
    assert_eq!(stats.misses, 3);
}

#[test]
fn test_contract_violations_are_errors() {
    let replacer = ArcReplacer::new(2);
    access(&replacer, 1, 1);
    replacer.set_evictable(fid(1), false).unwrap();

    assert!(matches!(
        replacer.set_evictable(fid(5), true),
        Err(Error::InvalidFrame(f)) if f == fid(5)
    ));
    assert!(matches!(
        replacer.remove(fid(1)),
        Err(Error::FrameNotEvictable(f)) if f == fid(1)
    ));

    // Deleting a page the replacer never saw is fine.
    assert!(replacer.remove(fid(5)).is_ok());
    replacer.debug_validate_invariants();
}

#[test]
fn test_history_stays_bounded() {
    let capacity = 4;
    let replacer = ArcReplacer::new(capacity);

    // Stream many distinct pages through, reusing a fixed frame set.
    for page in 0..200u32 {
        let frame = (page as usize) % capacity;
        if replacer.list_sizes().alive() == capacity {
            replacer.evict().unwrap();
        }
        if replacer.contains_frame(fid(frame)) {
            continue;
        }
        access(&replacer, frame, page);
        if page % 3 == 0 {
            access(&replacer, frame, page);
        }

        let sizes = replacer.list_sizes();
        assert!(sizes.mru + sizes.mru_ghost <= capacity, "{:?}", sizes);
        assert!(sizes.total() <= 2 * capacity, "{:?}", sizes);
    }
    replacer.debug_validate_invariants();
}

#[test]
fn test_list_sizes_accessors() {
    let sizes = ListSizes {
        mru: 1,
        mfu: 2,
        mru_ghost: 3,
        mfu_ghost: 4,
    };
    assert_eq!(sizes.alive(), 3);
    assert_eq!(sizes.ghosts(), 7);
    assert_eq!(sizes.total(), 10);
}

// ============================================================================
// Concurrency
// ============================================================================

/// Threads own disjoint frame ranges; any thread may evict anyone's frame.
#[test]
fn test_concurrent_access() {
    const THREADS: usize = 8;
    const FRAMES_PER_THREAD: usize = 8;

    let replacer = Arc::new(ArcReplacer::new(THREADS * FRAMES_PER_THREAD));
    let mut handles = vec![];

    for t in 0..THREADS {
        let replacer = Arc::clone(&replacer);
        handles.push(thread::spawn(move || {
            for i in 0..2000 {
                let slot = i % FRAMES_PER_THREAD;
                let frame = fid(t * FRAMES_PER_THREAD + slot);
                // Each page only ever lives in its own slot's frame.
                let page = pid((t * 1000 + slot + FRAMES_PER_THREAD * ((i / 7) % 5)) as u32);

                replacer.record_access(frame, page, AccessType::Lookup);
                match i % 5 {
                    0 => {
                        let _ = replacer.set_evictable(frame, false);
                        let _ = replacer.set_evictable(frame, true);
                    }
                    1 => {
                        replacer.evict();
                    }
                    2 => {
                        let _ = replacer.remove(frame);
                    }
                    _ => {}
                }
            }
        }));
    }

    for handle in handles {
        handle.join().unwrap();
    }

    replacer.debug_validate_invariants();
    let stats = replacer.stats_snapshot();
    assert_eq!(stats.lookup_accesses, (THREADS * 2000) as u64);
}
