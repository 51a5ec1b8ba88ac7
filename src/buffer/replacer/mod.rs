//! Eviction policy implementation (replacer).
//!
//! - [`ArcReplacer`] - Adaptive Replacement Cache over four lists
//!
//! The buffer pool calls `record_access` after pinning a frame,
//! `set_evictable` as pin counts cross zero, `evict` when it needs a free
//! frame, and `remove` when a page is deleted.

mod arc;
mod record_list;

pub use arc::{AccessType, ArcReplacer, ArcStatus, ListSizes};
