//! Common types shared across the crate.
//!
//! This module contains the primitives the replacer is driven with:
//! - Configuration
//! - Error types
//! - Identifiers (PageId, FrameId)

pub mod config;
pub mod error;
mod frame_id;
mod page_id;

pub use config::ReplacerConfig;
pub use error::{Error, Result};
pub use frame_id::FrameId;
pub use page_id::PageId;
