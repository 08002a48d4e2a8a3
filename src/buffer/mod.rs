//! Buffer pool management.
//!
//! The buffer pool sits between the index layer and disk. It owns every
//! byte of page memory; index code only borrows pages through guards.
//!
//! - [`BufferPoolManager`] - fetch/pin, unpin/dirty, eviction, flush
//! - [`Frame`] - A slot holding one page plus pin/dirty state
//! - [`PageReadGuard`] / [`PageWriteGuard`] - pin + latch, released on drop
//! - [`replacer`] - Eviction policy

mod buffer_pool_manager;
mod frame;
mod page_guard;
pub mod replacer;

pub use buffer_pool_manager::BufferPoolManager;
pub use frame::Frame;
pub use page_guard::{PageReadGuard, PageWriteGuard};
