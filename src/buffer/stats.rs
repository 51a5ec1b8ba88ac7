//! Replacer statistics tracking.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::buffer::replacer::AccessType;

/// Counters maintained by the replacer.
///
/// All fields are atomic for lock-free, thread-safe updates, and live
/// outside the replacer latch. We use `Ordering::Relaxed` everywhere: the
/// counters are independent and only need atomicity, not ordering.
///
/// # Example
/// ```
/// use arcpool::{AccessType, ReplacerStats};
///
/// let stats = ReplacerStats::new();
/// stats.record_access_type(AccessType::Scan);
/// assert_eq!(stats.snapshot().scan_accesses, 1);
/// ```
#[derive(Debug, Default)]
pub struct ReplacerStats {
    pub unknown_accesses: AtomicU64,
    pub lookup_accesses: AtomicU64,
    pub scan_accesses: AtomicU64,
    pub index_accesses: AtomicU64,

    /// Accesses to a frame that was already alive (MRU or MFU).
    pub alive_hits: AtomicU64,

    /// Accesses whose page was found in the MRU ghost list.
    pub mru_ghost_hits: AtomicU64,

    /// Accesses whose page was found in the MFU ghost list.
    pub mfu_ghost_hits: AtomicU64,

    /// Accesses to pages known nowhere.
    pub misses: AtomicU64,

    /// Frames handed back by `evict`.
    pub evictions: AtomicU64,

    /// Evictions where the preferred side had no evictable frame.
    pub fallback_evictions: AtomicU64,

    /// Frames dropped through `remove`.
    pub removals: AtomicU64,

    /// Ghost entries discarded to make room for new history.
    pub ghost_purges: AtomicU64,
}

impl ReplacerStats {
    /// Create a new stats tracker with all counters at zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Bump the per-kind access counter.
    pub fn record_access_type(&self, access_type: AccessType) {
        let counter = match access_type {
            AccessType::Unknown => &self.unknown_accesses,
            AccessType::Lookup => &self.lookup_accesses,
            AccessType::Scan => &self.scan_accesses,
            AccessType::Index => &self.index_accesses,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    /// Get a snapshot of current statistics.
    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            unknown_accesses: self.unknown_accesses.load(Ordering::Relaxed),
            lookup_accesses: self.lookup_accesses.load(Ordering::Relaxed),
            scan_accesses: self.scan_accesses.load(Ordering::Relaxed),
            index_accesses: self.index_accesses.load(Ordering::Relaxed),
            alive_hits: self.alive_hits.load(Ordering::Relaxed),
            mru_ghost_hits: self.mru_ghost_hits.load(Ordering::Relaxed),
            mfu_ghost_hits: self.mfu_ghost_hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            evictions: self.evictions.load(Ordering::Relaxed),
            fallback_evictions: self.fallback_evictions.load(Ordering::Relaxed),
            removals: self.removals.load(Ordering::Relaxed),
            ghost_purges: self.ghost_purges.load(Ordering::Relaxed),
        }
    }

    /// Reset all counters to zero.
    pub fn reset(&self) {
        for counter in [
            &self.unknown_accesses,
            &self.lookup_accesses,
            &self.scan_accesses,
            &self.index_accesses,
            &self.alive_hits,
            &self.mru_ghost_hits,
            &self.mfu_ghost_hits,
            &self.misses,
            &self.evictions,
            &self.fallback_evictions,
            &self.removals,
            &self.ghost_purges,
        ] {
            counter.store(0, Ordering::Relaxed);
        }
    }
}

/// A point-in-time copy of [`ReplacerStats`].
///
/// Counters are loaded one by one, so a snapshot taken while other threads
/// are active may be slightly inconsistent across fields.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatsSnapshot {
    pub unknown_accesses: u64,
    pub lookup_accesses: u64,
    pub scan_accesses: u64,
    pub index_accesses: u64,
    pub alive_hits: u64,
    pub mru_ghost_hits: u64,
    pub mfu_ghost_hits: u64,
    pub misses: u64,
    pub evictions: u64,
    pub fallback_evictions: u64,
    pub removals: u64,
    pub ghost_purges: u64,
}

impl StatsSnapshot {
    /// Total accesses across all access kinds.
    pub fn accesses(&self) -> u64 {
        self.unknown_accesses + self.lookup_accesses + self.scan_accesses + self.index_accesses
    }

    /// Fraction of accesses that found the frame alive (0.0 to 1.0).
    pub fn hit_rate(&self) -> f64 {
        let total = self.accesses();
        if total == 0 {
            0.0
        } else {
            self.alive_hits as f64 / total as f64
        }
    }

    /// Fraction of non-alive accesses that were ghost hits (0.0 to 1.0).
    ///
    /// A high value means the cache is too small for the workload: pages
    /// come back shortly after being evicted.
    pub fn ghost_hit_rate(&self) -> f64 {
        let ghost_hits = self.mru_ghost_hits + self.mfu_ghost_hits;
        let total = ghost_hits + self.misses;
        if total == 0 {
            0.0
        } else {
            ghost_hits as f64 / total as f64
        }
    }
}

impl fmt::Display for StatsSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Stats {{ accesses: {}, hits: {}, ghost_hits: {}/{}, misses: {}, evictions: {}, hit_rate: {:.2}% }}",
            self.accesses(),
            self.alive_hits,
            self.mru_ghost_hits,
            self.mfu_ghost_hits,
            self.misses,
            self.evictions,
            self.hit_rate() * 100.0
        )
    }
}
