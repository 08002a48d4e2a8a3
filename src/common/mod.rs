//! Common types and utilities shared across pagetree.
//!
//! - Configuration constants
//! - Error types
//! - Identifiers (PageId, FrameId)
//! - Logger bootstrap

pub mod config;
pub mod error;
mod frame_id;
pub mod logger;
mod page_id;

pub use error::{Error, Result};
pub use frame_id::FrameId;
pub use page_id::PageId;
