//! Error types for the replacer.

use thiserror::Error;

use crate::common::FrameId;

/// Convenient Result type alias.
///
/// Instead of writing `Result<T, Error>` everywhere, we can write `Result<T>`.
pub type Result<T> = std::result::Result<T, Error>;

/// All errors the replacer can report.
///
/// Every variant is a caller-contract violation: the owning buffer pool's
/// pin bookkeeping disagrees with what the replacer has been told. They are
/// meant to propagate up and fail the caller's operation.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// The frame has no residency record (never accessed, evicted, or removed).
    #[error("{0} is not tracked by the replacer")]
    InvalidFrame(FrameId),

    /// The frame is tracked but pinned, so it cannot be removed.
    #[error("{0} is not evictable")]
    FrameNotEvictable(FrameId),

    /// A replacer must be able to hold at least one frame.
    #[error("invalid replacer capacity: {0}")]
    InvalidCapacity(usize),
}
