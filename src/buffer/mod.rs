//! Buffer pool eviction.
//!
//! The buffer pool itself (frames, page table, disk I/O) lives with the
//! caller; this module holds the part that decides which frame to reclaim.
//!
//! # Components
//! - [`replacer`] - Eviction policy ([`ArcReplacer`])
//! - [`ReplacerStats`] - Access and eviction counters

pub mod replacer;
mod stats;

pub use replacer::{AccessType, ArcReplacer, ArcStatus, ListSizes};
pub use stats::{ReplacerStats, StatsSnapshot};
