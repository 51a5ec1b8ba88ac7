//! Frame identifier type.

use std::fmt;

/// Identifies a frame (cache slot) in the owning buffer pool.
///
/// The replacer treats it as an opaque handle: it is the key for alive
/// residency records and is never interpreted numerically.
///
/// # Example
/// ```
/// use arcpool::FrameId;
///
/// let frame_id = FrameId::new(5);
/// assert_eq!(frame_id, FrameId::from(5));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FrameId(pub usize);

impl FrameId {
    /// Create a new FrameId.
    #[inline]
    pub fn new(id: usize) -> Self {
        FrameId(id)
    }
}

impl From<usize> for FrameId {
    fn from(id: usize) -> Self {
        FrameId(id)
    }
}

impl fmt::Display for FrameId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Frame({})", self.0)
    }
}
