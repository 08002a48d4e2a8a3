//! Configuration constants for pagetree.

use crate::index::btree::BTreePageHeader;
use crate::storage::page::PageHeader;

/// Size of a page in bytes (4KB).
///
/// Matches the OS page size on most systems, which keeps Direct I/O aligned.
/// Every capacity computed in the index layer is derived from this value.
pub const PAGE_SIZE: usize = 4096;

/// Maximum number of pages with u32 PageId.
pub const MAX_PAGES: u64 = (u32::MAX as u64) + 1;

/// Maximum theoretical database size in bytes.
pub const MAX_DB_SIZE_BYTES: u64 = MAX_PAGES * PAGE_SIZE as u64;

/// Frames allocated by a buffer pool when the caller has no preference.
pub const DEFAULT_POOL_SIZE: usize = 64;

/// Bytes in front of the slot array of an internal page.
///
/// Common page header followed by the B+tree node header.
pub const INTERNAL_PAGE_HEADER_SIZE: usize = PageHeader::SIZE + BTreePageHeader::SIZE;

/// Number of `slot_size`-byte slots that fit behind the internal page header.
pub const fn internal_page_capacity(slot_size: usize) -> usize {
    (PAGE_SIZE - INTERNAL_PAGE_HEADER_SIZE) / slot_size
}
