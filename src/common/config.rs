//! Replacer configuration.

use crate::common::{Error, Result};

/// Capacity used by [`ReplacerConfig::default`].
///
/// Matches the frame count of a small buffer pool; real pools pass their
/// own `pool_size`.
pub const DEFAULT_REPLACER_CAPACITY: usize = 64;

/// Construction parameters for an [`ArcReplacer`](crate::ArcReplacer).
///
/// # Example
/// ```
/// use arcpool::{ArcReplacer, ReplacerConfig};
///
/// let config = ReplacerConfig::new(16).with_stats(false);
/// let replacer = ArcReplacer::with_config(config).unwrap();
/// assert_eq!(replacer.capacity(), 16);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReplacerConfig {
    /// Maximum number of alive frames tracked at once (the pool size).
    pub capacity: usize,

    /// Whether access/eviction counters are maintained.
    pub track_stats: bool,
}

impl ReplacerConfig {
    /// Create a config for a pool of `capacity` frames, stats enabled.
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            track_stats: true,
        }
    }

    /// Enable or disable statistics tracking.
    pub fn with_stats(mut self, track_stats: bool) -> Self {
        self.track_stats = track_stats;
        self
    }

    /// Check that the config describes a usable replacer.
    ///
    /// # Errors
    /// - `Error::InvalidCapacity` if `capacity` is 0
    pub fn validate(&self) -> Result<()> {
        if self.capacity == 0 {
            return Err(Error::InvalidCapacity(self.capacity));
        }
        Ok(())
    }
}

impl Default for ReplacerConfig {
    fn default() -> Self {
        Self::new(DEFAULT_REPLACER_CAPACITY)
    }
}
