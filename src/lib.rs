//! pagetree - Disk-resident B+tree internal node pages.
//!
//! # Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                            pagetree                             │
//! ├─────────────────────────────────────────────────────────────────┤
//! │  ┌─────────────────────────────────────────────────────────┐   │
//! │  │              Index Layer (index/btree/)                 │   │
//! │  │   InternalPage: lookup, split, merge, redistribute      │   │
//! │  │   IndexKey / GenericKey + KeyComparator                 │   │
//! │  └─────────────────────────────────────────────────────────┘   │
//! │                              ↓  fetch / guard drop = unpin      │
//! │  ┌─────────────────────────────────────────────────────────┐   │
//! │  │              Buffer Pool (buffer/)                       │   │
//! │  │   BufferPoolManager + Frame + PageRead/WriteGuard        │   │
//! │  │   LRU eviction, dirty write-back                         │   │
//! │  └─────────────────────────────────────────────────────────┘   │
//! │                              ↓                                  │
//! │  ┌─────────────────────────────────────────────────────────┐   │
//! │  │              Storage Layer (storage/)                    │   │
//! │  │   DiskManager + Page + PageHeader (CRC32 checksums)      │   │
//! │  └─────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Modules
//! - [`common`] - Shared primitives (PageId, FrameId, Error, config, logging)
//! - [`storage`] - Disk I/O and page formats
//! - [`buffer`] - Buffer pool management and eviction
//! - [`index`] - B+tree node pages
//!
//! # Quick Start
//! ```no_run
//! use pagetree::index::btree::{new_internal_page, NaturalComparator};
//! use pagetree::{BufferPoolManager, DiskManager, PageId};
//!
//! let bpm = BufferPoolManager::new(16, DiskManager::create("index.db").unwrap());
//!
//! let mut root = new_internal_page::<u64>(&bpm, PageId::INVALID, None).unwrap();
//! root.populate_new_root(PageId::new(7), &100, PageId::new(8));
//!
//! assert_eq!(root.lookup(&42, &NaturalComparator), PageId::new(7));
//! assert_eq!(root.lookup(&100, &NaturalComparator), PageId::new(8));
//! ```

pub mod buffer;
pub mod common;
pub mod index;
pub mod storage;

// Re-export commonly used items at crate root for convenience
pub use common::config::PAGE_SIZE;
pub use common::{Error, FrameId, PageId, Result};

pub use buffer::{BufferPoolManager, Frame, PageReadGuard, PageWriteGuard};
pub use index::btree::{GenericKey, IndexKey, InternalPage, KeyComparator, NaturalComparator};
pub use storage::page::{Page, PageHeader, PageType};
pub use storage::DiskManager;
