//! Index structures.
//!
//! - [`btree`] - B+tree node pages over the buffer pool
pub mod btree;
