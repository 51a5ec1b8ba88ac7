//! arcpool - the eviction core of a database buffer pool.
//!
//! # Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                 BufferPoolManager (caller)                      │
//! │   page table · frames · pin counts · disk I/O                   │
//! └───────┬───────────────┬──────────────────┬──────────────┬───────┘
//!   record_access    set_evictable        evict          remove
//!         ↓               ↓                  ↓              ↓
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                  ArcReplacer (one latch)                        │
//! │  ┌──────────────────────────┐   ┌──────────────────────────┐    │
//! │  │  Mru      (alive, 1 hit) │   │  Mfu     (alive, 2+ hits)│    │
//! │  └────────────┬─────────────┘   └─────────────┬────────────┘    │
//! │        evict  ↓                        evict  ↓                 │
//! │  ┌──────────────────────────┐   ┌──────────────────────────┐    │
//! │  │  MruGhost   (page ids)   │   │  MfuGhost   (page ids)   │    │
//! │  └──────────────────────────┘   └──────────────────────────┘    │
//! │        ghost hits tune target size p: Mru ←── p ──→ Mfu         │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Modules
//! - [`common`] - Shared primitives (PageId, FrameId, Error, config)
//! - [`buffer`] - The ARC replacer and its statistics
//!
//! # Quick Start
//! ```
//! use arcpool::{AccessType, ArcReplacer, FrameId, PageId};
//!
//! let replacer = ArcReplacer::new(8);
//! replacer.record_access(FrameId::new(0), PageId::new(42), AccessType::Lookup);
//!
//! // The buffer pool pins the frame while a guard is held...
//! replacer.set_evictable(FrameId::new(0), false).unwrap();
//! assert_eq!(replacer.evict(), None);
//!
//! // ...and releases it when the pin count drops to zero.
//! replacer.set_evictable(FrameId::new(0), true).unwrap();
//! assert_eq!(replacer.evict(), Some(FrameId::new(0)));
//! ```

pub mod buffer;
pub mod common;

// Re-export commonly used items at crate root for convenience
pub use common::config::DEFAULT_REPLACER_CAPACITY;
pub use common::{Error, FrameId, PageId, ReplacerConfig, Result};

pub use buffer::{AccessType, ArcReplacer, ArcStatus, ListSizes, ReplacerStats, StatsSnapshot};
