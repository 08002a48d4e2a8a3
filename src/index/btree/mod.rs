//! B+tree node pages.
//!
//! Internal pages route a key to the child subtree that may hold it and
//! carry the structural operations (split, merge, redistribute, root
//! growth and collapse) an orchestrating tree performs on them.
//!
//! - [`InternalPage`] - typed view over an internal page image
//! - [`IndexKey`] / [`GenericKey`] - fixed-width keys stored in slots
//! - [`KeyComparator`] - key ordering injected into lookups
//! - [`BTreePageHeader`] - node header shared by every B+tree page
//!
//! Pages are reached through the buffer pool; [`fetch_internal_read`],
//! [`fetch_internal_write`] and [`new_internal_page`] pair a pin with a
//! checked downcast.

mod comparator;
mod internal_page;
mod key;
mod node_header;

pub use comparator::{KeyComparator, NaturalComparator};
pub use internal_page::InternalPage;
pub use key::{GenericKey, IndexKey};
pub use node_header::BTreePageHeader;

use crate::buffer::{BufferPoolManager, PageReadGuard, PageWriteGuard};
use crate::common::{PageId, Result};

/// Pin `page_id` for reading and open it as an internal page.
///
/// # Errors
/// - `Error::PageUnavailable` if every frame is pinned
/// - `Error::PageTypeMismatch` if the page is not an internal page
/// - disk errors from the buffer pool
pub fn fetch_internal_read<K: IndexKey>(
    bpm: &BufferPoolManager,
    page_id: PageId,
) -> Result<InternalPage<PageReadGuard<'_>, K>> {
    let guard = bpm
        .fetch_page_read(page_id)
        .map_err(|e| e.unavailable(page_id.0))?;
    InternalPage::from_page(guard)
}

/// Pin `page_id` for writing and open it as an internal page.
///
/// The page is unpinned dirty when the returned view drops.
///
/// # Errors
/// Same as [`fetch_internal_read`].
pub fn fetch_internal_write<K: IndexKey>(
    bpm: &BufferPoolManager,
    page_id: PageId,
) -> Result<InternalPage<PageWriteGuard<'_>, K>> {
    let guard = bpm
        .fetch_page_write(page_id)
        .map_err(|e| e.unavailable(page_id.0))?;
    InternalPage::from_page(guard)
}

/// Allocate a page and format it as an empty internal page.
///
/// `max_size` of `None` takes the largest threshold the key width allows.
///
/// # Errors
/// `Error::NoFreeFrames` if every frame is pinned, or disk errors from
/// allocation.
pub fn new_internal_page<K: IndexKey>(
    bpm: &BufferPoolManager,
    parent_page_id: PageId,
    max_size: Option<usize>,
) -> Result<InternalPage<PageWriteGuard<'_>, K>> {
    let guard = bpm.new_page()?;
    let page_id = guard.page_id();
    let max_size = max_size.unwrap_or(InternalPage::<PageWriteGuard<'_>, K>::DEFAULT_MAX_SIZE);
    Ok(InternalPage::init_with_max_size(
        guard,
        page_id,
        parent_page_id,
        max_size,
    ))
}
