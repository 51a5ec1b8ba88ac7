//! ARC (Adaptive Replacement Cache) replacement policy.
//!
//! Four lists are kept, all ordered front (most recent) to back:
//! - `Mru` - alive frames touched once
//! - `Mfu` - alive frames touched at least twice
//! - `MruGhost` / `MfuGhost` - pages recently evicted from `Mru` / `Mfu`
//!
//! The target size `p` is the share of the pool the `Mru` side should get.
//! A hit in `MruGhost` means recency pages were evicted too early and grows
//! `p`; a hit in `MfuGhost` shrinks it. `evict` then takes from `Mfu` while
//! `Mru` is below target and from `Mru` otherwise, falling back to the other
//! side when the preferred one has nothing evictable.
//!
//! Two departures from the ARC paper: when `|Mru| == p` no last-access tie
//! break is made (`Mru` is preferred), and pinned frames are skipped.

use std::collections::HashMap;
use std::sync::atomic::Ordering;

use parking_lot::Mutex;
use tracing::{debug, trace, warn};

use crate::buffer::replacer::record_list::{RecordId, RecordLists};
use crate::buffer::{ReplacerStats, StatsSnapshot};
use crate::common::{Error, FrameId, PageId, ReplacerConfig, Result};

/// Why a page is being accessed.
///
/// Purely an observability tag: it is counted in [`ReplacerStats`] and
/// logged, but never changes an eviction decision.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum AccessType {
    #[default]
    Unknown,
    Lookup,
    Scan,
    Index,
}

/// Which list a tracked page is in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArcStatus {
    Mru,
    Mfu,
    MruGhost,
    MfuGhost,
}

impl ArcStatus {
    pub const ALL: [ArcStatus; 4] = [
        ArcStatus::Mru,
        ArcStatus::Mfu,
        ArcStatus::MruGhost,
        ArcStatus::MfuGhost,
    ];

    /// `true` for the two lists holding live frames.
    #[inline]
    pub fn is_alive(self) -> bool {
        matches!(self, ArcStatus::Mru | ArcStatus::Mfu)
    }

    /// History list a frame from this list is demoted into on eviction.
    #[inline]
    pub fn ghost(self) -> ArcStatus {
        match self {
            ArcStatus::Mru | ArcStatus::MruGhost => ArcStatus::MruGhost,
            ArcStatus::Mfu | ArcStatus::MfuGhost => ArcStatus::MfuGhost,
        }
    }

    #[inline]
    pub(crate) fn index(self) -> usize {
        match self {
            ArcStatus::Mru => 0,
            ArcStatus::Mfu => 1,
            ArcStatus::MruGhost => 2,
            ArcStatus::MfuGhost => 3,
        }
    }
}

/// Sizes of the four lists at one instant.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ListSizes {
    pub mru: usize,
    pub mfu: usize,
    pub mru_ghost: usize,
    pub mfu_ghost: usize,
}

impl ListSizes {
    /// Alive frames (`Mru` + `Mfu`).
    pub fn alive(&self) -> usize {
        self.mru + self.mfu
    }

    /// Ghost entries (`MruGhost` + `MfuGhost`).
    pub fn ghosts(&self) -> usize {
        self.mru_ghost + self.mfu_ghost
    }

    pub fn total(&self) -> usize {
        self.alive() + self.ghosts()
    }
}

/// How `record_access` classified an access.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AccessOutcome {
    AliveHit { promoted: bool },
    /// `overfull` on a revive or a miss means `capacity` frames were
    /// already alive when the access arrived.
    MruGhostHit { overfull: bool },
    MfuGhostHit { overfull: bool },
    /// `purged` is the ghost page dropped to make room.
    Miss { purged: Option<PageId>, overfull: bool },
}

impl AccessOutcome {
    fn overfull(self) -> bool {
        match self {
            AccessOutcome::AliveHit { .. } => false,
            AccessOutcome::MruGhostHit { overfull }
            | AccessOutcome::MfuGhostHit { overfull }
            | AccessOutcome::Miss { overfull, .. } => overfull,
        }
    }
}

/// Frame chosen by `evict`.
#[derive(Debug, Clone, Copy)]
struct Victim {
    frame_id: FrameId,
    page_id: PageId,
    from: ArcStatus,
    fallback: bool,
}

/// Everything guarded by the replacer latch.
///
/// The target-size update reads ghost list sizes and then mutates the
/// lists, so all four lists and both indices sit under one lock.
#[derive(Debug)]
struct ArcState {
    records: RecordLists,

    /// Alive records (`Mru`/`Mfu`) by frame.
    alive: HashMap<FrameId, RecordId>,

    /// Ghost records (`MruGhost`/`MfuGhost`) by page.
    ghosts: HashMap<PageId, RecordId>,

    /// Alive records with `evictable == true`.
    evictable_count: usize,

    /// Adaptive target size `p` for `Mru`, in `[0, capacity]`.
    target_size: usize,

    capacity: usize,
}

impl ArcState {
    fn new(capacity: usize) -> Self {
        Self {
            records: RecordLists::with_capacity(2 * capacity),
            alive: HashMap::with_capacity(capacity),
            ghosts: HashMap::with_capacity(capacity),
            evictable_count: 0,
            target_size: 0,
            capacity,
        }
    }

    fn record_access(&mut self, frame_id: FrameId, page_id: PageId) -> AccessOutcome {
        // Alive hit: a second touch earns frequency protection.
        if let Some(&id) = self.alive.get(&frame_id) {
            let promoted = self.records[id].status() == ArcStatus::Mru;
            self.records.move_to_front(id, ArcStatus::Mfu);
            return AccessOutcome::AliveHit { promoted };
        }

        let overfull = self.alive.len() >= self.capacity;

        if let Some(id) = self.ghosts.remove(&page_id) {
            let mru_ghost = self.records.len(ArcStatus::MruGhost);
            let mfu_ghost = self.records.len(ArcStatus::MfuGhost);

            // `>=` is checked first, so the divisor is never zero.
            let outcome = if self.records[id].status() == ArcStatus::MruGhost {
                let delta = if mru_ghost >= mfu_ghost {
                    1
                } else {
                    mfu_ghost / mru_ghost
                };
                self.target_size = (self.target_size + delta).min(self.capacity);
                AccessOutcome::MruGhostHit { overfull }
            } else {
                let delta = if mfu_ghost >= mru_ghost {
                    1
                } else {
                    mru_ghost / mfu_ghost
                };
                self.target_size = self.target_size.saturating_sub(delta);
                AccessOutcome::MfuGhostHit { overfull }
            };

            let record = &mut self.records[id];
            record.frame_id = frame_id;
            record.evictable = true;
            self.records.move_to_front(id, ArcStatus::Mfu);
            self.alive.insert(frame_id, id);
            self.evictable_count += 1;
            return outcome;
        }

        let mru = self.records.len(ArcStatus::Mru);
        let mru_ghost = self.records.len(ArcStatus::MruGhost);
        let purged = if mru + mru_ghost == self.capacity {
            self.purge_ghost(ArcStatus::MruGhost)
        } else if self.records.total() == 2 * self.capacity {
            self.purge_ghost(ArcStatus::MfuGhost)
        } else {
            None
        };

        let id = self
            .records
            .push_front(ArcStatus::Mru, page_id, frame_id, true);
        self.alive.insert(frame_id, id);
        self.evictable_count += 1;
        AccessOutcome::Miss { purged, overfull }
    }

    /// Drop the oldest entry of a ghost list.
    fn purge_ghost(&mut self, ghost: ArcStatus) -> Option<PageId> {
        let id = self.records.back(ghost)?;
        let record = self.records.remove(id)?;
        self.ghosts.remove(&record.page_id);
        Some(record.page_id)
    }

    /// Last evictable record of `side`, scanning back to front.
    fn select_victim(&self, side: ArcStatus) -> Option<RecordId> {
        self.records
            .iter_back(side)
            .find(|&id| self.records[id].evictable)
    }

    fn evict(&mut self) -> Option<Victim> {
        let (preferred, other) = if self.records.len(ArcStatus::Mru) < self.target_size {
            (ArcStatus::Mfu, ArcStatus::Mru)
        } else {
            (ArcStatus::Mru, ArcStatus::Mfu)
        };

        let (id, fallback) = match self.select_victim(preferred) {
            Some(id) => (id, false),
            None => (self.select_victim(other)?, true),
        };

        let record = &mut self.records[id];
        let from = record.status();
        let frame_id = record.frame_id;
        let page_id = record.page_id;
        record.evictable = false;

        self.records.move_to_front(id, from.ghost());
        self.alive.remove(&frame_id);
        self.ghosts.insert(page_id, id);
        self.evictable_count -= 1;

        Some(Victim {
            frame_id,
            page_id,
            from,
            fallback,
        })
    }

    /// Returns `true` if the flag changed.
    fn set_evictable(&mut self, frame_id: FrameId, evictable: bool) -> Result<bool> {
        let id = *self
            .alive
            .get(&frame_id)
            .ok_or(Error::InvalidFrame(frame_id))?;
        let record = &mut self.records[id];
        if record.evictable == evictable {
            return Ok(false);
        }
        record.evictable = evictable;
        if evictable {
            self.evictable_count += 1;
        } else {
            self.evictable_count -= 1;
        }
        Ok(true)
    }

    /// Returns `true` if a record was dropped.
    fn remove(&mut self, frame_id: FrameId) -> Result<bool> {
        let Some(&id) = self.alive.get(&frame_id) else {
            return Ok(false);
        };
        if !self.records[id].evictable {
            return Err(Error::FrameNotEvictable(frame_id));
        }
        self.records.remove(id);
        self.alive.remove(&frame_id);
        self.evictable_count -= 1;
        Ok(true)
    }

    fn list_sizes(&self) -> ListSizes {
        ListSizes {
            mru: self.records.len(ArcStatus::Mru),
            mfu: self.records.len(ArcStatus::Mfu),
            mru_ghost: self.records.len(ArcStatus::MruGhost),
            mfu_ghost: self.records.len(ArcStatus::MfuGhost),
        }
    }

    fn status_of_page(&self, page_id: PageId) -> Option<ArcStatus> {
        if let Some(&id) = self.ghosts.get(&page_id) {
            return Some(self.records[id].status());
        }
        self.alive
            .values()
            .map(|&id| &self.records[id])
            .find(|record| record.page_id == page_id)
            .map(|record| record.status())
    }

    #[cfg(any(test, debug_assertions))]
    fn debug_validate_invariants(&self) {
        self.records.debug_validate_invariants();

        let sizes = self.list_sizes();
        assert!(
            sizes.alive() <= self.capacity,
            "alive frames exceed capacity: {:?}",
            sizes
        );
        assert!(
            sizes.mru + sizes.mru_ghost <= self.capacity,
            "|Mru| + |MruGhost| exceeds capacity: {:?}",
            sizes
        );
        assert!(
            sizes.total() <= 2 * self.capacity,
            "tracked entries exceed 2 * capacity: {:?}",
            sizes
        );
        assert!(self.target_size <= self.capacity, "target size out of range");

        assert_eq!(self.alive.len(), sizes.alive(), "alive index out of sync");
        assert_eq!(self.ghosts.len(), sizes.ghosts(), "ghost index out of sync");

        let mut evictable = 0;
        for (&frame_id, &id) in &self.alive {
            let record = &self.records[id];
            assert!(record.status().is_alive(), "{} indexed as alive", frame_id);
            assert_eq!(record.frame_id, frame_id, "alive index points elsewhere");
            if record.evictable {
                evictable += 1;
            }
        }
        assert_eq!(evictable, self.evictable_count, "evictable count drifted");

        let mut seen = std::collections::HashSet::new();
        for status in ArcStatus::ALL {
            for id in self.records.iter_front(status) {
                let record = &self.records[id];
                assert!(
                    seen.insert(record.page_id),
                    "{} tracked twice",
                    record.page_id
                );
                if !status.is_alive() {
                    assert!(!record.evictable, "ghost {} marked evictable", record.page_id);
                    assert_eq!(self.ghosts.get(&record.page_id), Some(&id));
                }
            }
        }
    }
}

/// ARC replacer for a buffer pool.
///
/// Frames are identified by [`FrameId`] while alive; evicted pages are
/// remembered by [`PageId`] in the ghost lists. All operations take one
/// internal latch for their whole duration, so the replacer can be shared
/// across threads behind an `Arc`.
///
/// # Example
/// ```
/// use arcpool::{AccessType, ArcReplacer, FrameId, PageId};
///
/// let replacer = ArcReplacer::new(2);
/// replacer.record_access(FrameId::new(1), PageId::new(1), AccessType::Lookup);
/// replacer.record_access(FrameId::new(2), PageId::new(2), AccessType::Lookup);
/// assert_eq!(replacer.size(), 2);
///
/// // Frame 1 gets pinned by the buffer pool.
/// replacer.set_evictable(FrameId::new(1), false).unwrap();
///
/// assert_eq!(replacer.evict(), Some(FrameId::new(2)));
/// assert_eq!(replacer.size(), 0);
/// ```
pub struct ArcReplacer {
    state: Mutex<ArcState>,
    stats: ReplacerStats,
    track_stats: bool,
    capacity: usize,
}

impl ArcReplacer {
    /// Create a replacer for a pool of `capacity` frames.
    ///
    /// # Panics
    /// Panics if `capacity` is 0.
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "capacity must be > 0");
        Self::build(ReplacerConfig::new(capacity))
    }

    /// Create a replacer from a config.
    ///
    /// # Errors
    /// - `Error::InvalidCapacity` if the capacity is 0
    pub fn with_config(config: ReplacerConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::build(config))
    }

    fn build(config: ReplacerConfig) -> Self {
        debug!(capacity = config.capacity, "creating ARC replacer");
        Self {
            state: Mutex::new(ArcState::new(config.capacity)),
            stats: ReplacerStats::new(),
            track_stats: config.track_stats,
            capacity: config.capacity,
        }
    }

    // ========================================================================
    // Replacer operations
    // ========================================================================

    /// Record that `frame_id` now holds `page_id` and was just accessed.
    ///
    /// Called after the buffer pool has pinned the frame. New and returning
    /// pages start evictable; the caller pins them via [`set_evictable`].
    ///
    /// - frame already alive: move to the front of `Mfu`
    /// - page in `MruGhost`: grow the target size, revive into `Mfu`
    /// - page in `MfuGhost`: shrink the target size, revive into `Mfu`
    /// - otherwise: trim ghost history if needed, insert at front of `Mru`
    ///
    /// The caller must not have more than `capacity` frames alive at once.
    ///
    /// [`set_evictable`]: ArcReplacer::set_evictable
    pub fn record_access(&self, frame_id: FrameId, page_id: PageId, access_type: AccessType) {
        let mut state = self.state.lock();
        let outcome = state.record_access(frame_id, page_id);

        trace!(
            frame_id = frame_id.0,
            page_id = page_id.0,
            ?access_type,
            ?outcome,
            target_size = state.target_size,
            "record access"
        );

        match outcome {
            AccessOutcome::AliveHit { promoted: true } => {
                trace!(frame_id = frame_id.0, "promoted to Mfu");
            }
            AccessOutcome::MruGhostHit { .. } | AccessOutcome::MfuGhostHit { .. } => {
                debug!(
                    page_id = page_id.0,
                    target_size = state.target_size,
                    "ghost hit adjusted target size"
                );
            }
            _ => {}
        }
        if outcome.overfull() {
            warn!(
                frame_id = frame_id.0,
                page_id = page_id.0,
                alive = state.alive.len(),
                capacity = self.capacity,
                "page brought in while all frames were alive"
            );
        }
        drop(state);

        if self.track_stats {
            self.stats.record_access_type(access_type);
            let counter = match outcome {
                AccessOutcome::AliveHit { .. } => &self.stats.alive_hits,
                AccessOutcome::MruGhostHit { .. } => &self.stats.mru_ghost_hits,
                AccessOutcome::MfuGhostHit { .. } => &self.stats.mfu_ghost_hits,
                AccessOutcome::Miss { purged, .. } => {
                    if purged.is_some() {
                        self.stats.ghost_purges.fetch_add(1, Ordering::Relaxed);
                    }
                    &self.stats.misses
                }
            };
            counter.fetch_add(1, Ordering::Relaxed);
        }
    }

    /// Pick a victim, demote it to ghost history, and return its frame.
    ///
    /// Returns `None` (and changes nothing) if no alive frame is evictable.
    pub fn evict(&self) -> Option<FrameId> {
        let mut state = self.state.lock();
        let victim = state.evict();
        let target_size = state.target_size;
        drop(state);

        let Some(victim) = victim else {
            trace!("no evictable frame");
            return None;
        };

        debug!(
            frame_id = victim.frame_id.0,
            page_id = victim.page_id.0,
            from = ?victim.from,
            fallback = victim.fallback,
            target_size,
            "evicted frame"
        );

        if self.track_stats {
            self.stats.evictions.fetch_add(1, Ordering::Relaxed);
            if victim.fallback {
                self.stats.fallback_evictions.fetch_add(1, Ordering::Relaxed);
            }
        }
        Some(victim.frame_id)
    }

    /// Mark a frame evictable (pin count hit 0) or not (pinned).
    ///
    /// Setting the flag to its current value is a no-op.
    ///
    /// # Errors
    /// - `Error::InvalidFrame` if the frame is not alive in the replacer
    pub fn set_evictable(&self, frame_id: FrameId, evictable: bool) -> Result<()> {
        let result = self.state.lock().set_evictable(frame_id, evictable);
        match result {
            Ok(changed) => {
                trace!(frame_id = frame_id.0, evictable, changed, "set evictable");
                Ok(())
            }
            Err(err) => {
                warn!(frame_id = frame_id.0, evictable, error = %err, "set_evictable rejected");
                Err(err)
            }
        }
    }

    /// Drop a frame without recording ghost history.
    ///
    /// Used when a page is deleted outright. Removing an untracked frame is
    /// a no-op.
    ///
    /// # Errors
    /// - `Error::FrameNotEvictable` if the frame is tracked but pinned
    pub fn remove(&self, frame_id: FrameId) -> Result<()> {
        let result = self.state.lock().remove(frame_id);
        match result {
            Ok(removed) => {
                trace!(frame_id = frame_id.0, removed, "remove");
                if removed && self.track_stats {
                    self.stats.removals.fetch_add(1, Ordering::Relaxed);
                }
                Ok(())
            }
            Err(err) => {
                warn!(frame_id = frame_id.0, error = %err, "remove rejected");
                Err(err)
            }
        }
    }

    /// Number of evictable alive frames.
    pub fn size(&self) -> usize {
        self.state.lock().evictable_count
    }

    // ========================================================================
    // Introspection
    // ========================================================================

    /// Maximum number of alive frames.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Current adaptive target size `p` for the `Mru` list.
    pub fn target_size(&self) -> usize {
        self.state.lock().target_size
    }

    pub fn list_sizes(&self) -> ListSizes {
        self.state.lock().list_sizes()
    }

    /// Which list `page_id` is in, if tracked at all.
    ///
    /// Alive pages are found by scanning the alive index, so this is
    /// O(capacity); ghost pages are an index lookup.
    pub fn status_of_page(&self, page_id: PageId) -> Option<ArcStatus> {
        self.state.lock().status_of_page(page_id)
    }

    pub fn contains_frame(&self, frame_id: FrameId) -> bool {
        self.state.lock().alive.contains_key(&frame_id)
    }

    /// Evictable flag of an alive frame, `None` if untracked.
    pub fn is_evictable(&self, frame_id: FrameId) -> Option<bool> {
        let state = self.state.lock();
        state
            .alive
            .get(&frame_id)
            .map(|&id| state.records[id].evictable)
    }

    /// Pages in `status`'s list, front (most recent) to back.
    pub fn snapshot_list(&self, status: ArcStatus) -> Vec<PageId> {
        let state = self.state.lock();
        state
            .records
            .iter_front(status)
            .map(|id| state.records[id].page_id)
            .collect()
    }

    pub fn stats(&self) -> &ReplacerStats {
        &self.stats
    }

    pub fn stats_snapshot(&self) -> StatsSnapshot {
        self.stats.snapshot()
    }

    /// Check every structural invariant.
    ///
    /// Walks all lists. Only compiled into test and debug builds.
    ///
    /// # Panics
    /// Panics if a list is mislinked, an index is out of sync, the capacity
    /// bounds are exceeded, or a page is tracked twice.
    #[cfg(any(test, debug_assertions))]
    pub fn debug_validate_invariants(&self) {
        self.state.lock().debug_validate_invariants();
    }
}

impl std::fmt::Debug for ArcReplacer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.lock();
        f.debug_struct("ArcReplacer")
            .field("capacity", &self.capacity)
            .field("target_size", &state.target_size)
            .field("evictable", &state.evictable_count)
            .field("lists", &state.list_sizes())
            .finish()
    }
}
