//! Storage layer - disk I/O and page formats.
//!
//! - [`DiskManager`] - Page-granular file I/O with page reuse
//! - [`page`] - Raw pages and the common header

mod disk_manager;
pub mod page;

pub use disk_manager::DiskManager;
