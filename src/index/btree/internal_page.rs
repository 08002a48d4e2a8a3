//! B+tree internal (non-leaf) node page.
//!
//! An internal page routes a search key to the child subtree that may hold
//! it. It is a view over a page image owned by the buffer pool; nothing is
//! copied out except the slots a structural operation moves.
//!
//! # Layout
//! ```text
//! ┌────────────┬─────────────┬──────────┬──────────┬─────┬─────────────┐
//! │ PageHeader │ node header │ slot 0   │ slot 1   │ ... │ slot size-1 │
//! │  13 bytes  │  16 bytes   │ key|ptr  │ key|ptr  │     │ key|ptr     │
//! └────────────┴─────────────┴──────────┴──────────┴─────┴─────────────┘
//! ```
//!
//! Each slot is `K::ENCODED_SIZE` key bytes followed by a 4-byte child
//! page id. The key in slot 0 is a sentinel and is never compared. For
//! `1 <= i < size`, the subtree under `value_at(i)` holds keys in
//! `[key_at(i), key_at(i + 1))`, and `value_at(0)` covers everything below
//! `key_at(1)`.
//!
//! `max_size` leaves one physical slot free so an insert can overflow the
//! page by exactly one entry before the caller splits it.
//!
//! # Access
//! `InternalPage<P, K>` works over any `P: Deref<Target = Page>`. Read-only
//! operations need `Deref`; mutations need `DerefMut`. In practice `P` is
//! a [`PageReadGuard`] or [`PageWriteGuard`], or `&mut Page` for scratch
//! pages.
//!
//! Nothing here latches or fetches a page behind the caller's back.
//! Operations that patch the parent take a view the caller has already
//! fetched and latched, so a caller crabbing down the tree keeps the
//! guards it holds.

use std::collections::VecDeque;
use std::fmt;
use std::marker::PhantomData;
use std::ops::{Deref, DerefMut};

use log::{debug, trace};

use crate::buffer::{BufferPoolManager, PageReadGuard};
use crate::common::config::{internal_page_capacity, INTERNAL_PAGE_HEADER_SIZE};
use crate::common::{Error, PageId, Result};
use crate::storage::page::{Page, PageHeader, PageType};

use super::comparator::KeyComparator;
use super::key::IndexKey;
use super::node_header::{read_u32, write_u32, BTreePageHeader};

/// Typed view of a B+tree internal page.
pub struct InternalPage<P, K> {
    page: P,
    _key: PhantomData<K>,
}

impl<P, K: IndexKey> InternalPage<P, K> {
    /// Bytes per slot.
    pub const SLOT_SIZE: usize = K::ENCODED_SIZE + PageId::SIZE;

    /// Physical slots behind the header.
    pub const CAPACITY: usize = internal_page_capacity(Self::SLOT_SIZE);

    /// Default `max_size`, one below physical capacity.
    pub const DEFAULT_MAX_SIZE: usize = Self::CAPACITY - 1;

    /// Give back the underlying page (or guard).
    pub fn into_inner(self) -> P {
        self.page
    }

    #[inline]
    fn slot_offset(index: usize) -> usize {
        INTERNAL_PAGE_HEADER_SIZE + index * Self::SLOT_SIZE
    }
}

// ============================================================================
// Read-only operations
// ============================================================================

impl<P, K> InternalPage<P, K>
where
    P: Deref<Target = Page>,
    K: IndexKey,
{
    /// Open an existing page as an internal node.
    ///
    /// # Errors
    /// - `Error::PageTypeMismatch` if the page is not a B+tree internal page
    /// - `Error::CorruptedPage` if the node header cannot describe a valid node
    pub fn from_page(page: P) -> Result<Self> {
        let data = page.as_slice();
        let header = BTreePageHeader::from_bytes(data);

        let found = page.page_type();
        if found != PageType::BTreeInternal {
            return Err(Error::PageTypeMismatch {
                page_id: header.page_id.0,
                expected: PageType::BTreeInternal,
                found,
            });
        }

        let (size, max_size) = (header.size as usize, header.max_size as usize);
        if max_size < 2 || max_size >= Self::CAPACITY {
            return Err(Error::CorruptedPage {
                page_id: header.page_id.0,
                reason: format!("max_size {} outside [2, {})", max_size, Self::CAPACITY),
            });
        }
        if size == 0 || size > max_size + 1 {
            return Err(Error::CorruptedPage {
                page_id: header.page_id.0,
                reason: format!("size {} outside [1, {}]", size, max_size + 1),
            });
        }

        Ok(Self {
            page,
            _key: PhantomData,
        })
    }

    /// Occupied slots, sentinel included.
    #[inline]
    pub fn size(&self) -> usize {
        read_u32(self.page.as_slice(), BTreePageHeader::OFFSET_SIZE) as usize
    }

    #[inline]
    pub fn max_size(&self) -> usize {
        read_u32(self.page.as_slice(), BTreePageHeader::OFFSET_MAX_SIZE) as usize
    }

    /// Fewest slots a non-root page may hold after a delete.
    #[inline]
    pub fn min_size(&self) -> usize {
        (self.max_size() + 1) / 2
    }

    #[inline]
    pub fn page_id(&self) -> PageId {
        PageId::read_from(&self.page.as_slice()[BTreePageHeader::OFFSET_PAGE_ID..])
    }

    #[inline]
    pub fn parent_page_id(&self) -> PageId {
        PageId::read_from(&self.page.as_slice()[BTreePageHeader::OFFSET_PARENT_PAGE_ID..])
    }

    #[inline]
    pub fn is_root(&self) -> bool {
        !self.parent_page_id().is_valid()
    }

    /// True while an insert has pushed the page one past `max_size`.
    #[inline]
    pub fn is_overflowing(&self) -> bool {
        self.size() > self.max_size()
    }

    /// Key stored in slot `index`. Slot 0 holds the sentinel.
    ///
    /// # Panics
    /// Panics if `index >= size`.
    pub fn key_at(&self, index: usize) -> K {
        self.check_index(index);
        self.read_key(index)
    }

    /// Child page id stored in slot `index`.
    ///
    /// # Panics
    /// Panics if `index >= size`.
    pub fn value_at(&self, index: usize) -> PageId {
        self.check_index(index);
        self.read_value(index)
    }

    /// Index of the slot pointing at `value`, or `size()` if none does.
    pub fn value_index(&self, value: PageId) -> usize {
        let size = self.size();
        (0..size)
            .find(|&i| self.read_value(i) == value)
            .unwrap_or(size)
    }

    /// Child whose subtree covers `key`.
    ///
    /// Binary search over `key_at(1..size)`. Keys below `key_at(1)` route
    /// to `value_at(0)`; keys at or above the last key route to the last
    /// child.
    ///
    /// # Panics
    /// Panics if the page has no separator keys (`size < 2`).
    pub fn lookup<C: KeyComparator<K>>(&self, key: &K, comparator: &C) -> PageId {
        let size = self.size();
        assert!(size > 1, "lookup on internal page {} with no keys", self.page_id());

        if comparator.compare(key, &self.read_key(1)).is_lt() {
            return self.read_value(0);
        }
        if comparator.compare(key, &self.read_key(size - 1)).is_ge() {
            return self.read_value(size - 1);
        }

        // key_at(low) <= key < key_at(high)
        let (mut low, mut high) = (1, size - 1);
        while low + 1 < high {
            let mid = low + (high - low) / 2;
            match comparator.compare(key, &self.read_key(mid)) {
                std::cmp::Ordering::Less => high = mid,
                std::cmp::Ordering::Greater => low = mid,
                std::cmp::Ordering::Equal => return self.read_value(mid),
            }
        }
        self.read_value(low)
    }

    /// All `(key, child)` slots in order, sentinel first.
    pub fn entries(&self) -> Vec<(K, PageId)> {
        (0..self.size())
            .map(|i| (self.read_key(i), self.read_value(i)))
            .collect()
    }

    /// Fetch every child for reading and append the guards to `queue`.
    ///
    /// Used for breadth-first traversal. Each guard keeps its child pinned
    /// until the caller drops it.
    ///
    /// # Errors
    /// `Error::PageUnavailable` naming the first child the pool could not
    /// supply. Guards enqueued before the failure stay in `queue`.
    pub fn queue_up_children<'b>(
        &self,
        queue: &mut VecDeque<PageReadGuard<'b>>,
        bpm: &'b BufferPoolManager,
    ) -> Result<()> {
        for index in 0..self.size() {
            let child = self.read_value(index);
            let guard = bpm
                .fetch_page_read(child)
                .map_err(|e| e.unavailable(child.0))?;
            queue.push_back(guard);
        }
        Ok(())
    }

    /// Text form of the page.
    ///
    /// Non-verbose: separator keys from slot 1 on, space separated.
    /// Verbose: a `[pageId: .. parentId: ..]<size>` prefix, then every slot
    /// (sentinel included) as `key(child)`.
    pub fn render(&self, verbose: bool) -> String
    where
        K: fmt::Display,
    {
        let size = self.size();
        let first = if verbose { 0 } else { 1 };

        let slots: Vec<String> = (first..size)
            .map(|i| {
                if verbose {
                    format!("{}({})", self.read_key(i), self.read_value(i).0)
                } else {
                    self.read_key(i).to_string()
                }
            })
            .collect();

        if verbose {
            let parent = self.parent_page_id();
            let parent = if parent.is_valid() {
                parent.0.to_string()
            } else {
                "INVALID".to_string()
            };
            format!(
                "[pageId: {} parentId: {}]<{}> {}",
                self.page_id().0,
                parent,
                size,
                slots.join(" ")
            )
        } else {
            slots.join(" ")
        }
    }

    #[inline]
    fn check_index(&self, index: usize) {
        let size = self.size();
        assert!(
            index < size,
            "slot {} out of range for internal page {} of size {}",
            index,
            self.page_id(),
            size
        );
    }

    #[inline]
    fn read_key(&self, index: usize) -> K {
        K::decode_from(&self.page.as_slice()[Self::slot_offset(index)..])
    }

    #[inline]
    fn read_value(&self, index: usize) -> PageId {
        PageId::read_from(&self.page.as_slice()[Self::slot_offset(index) + K::ENCODED_SIZE..])
    }

    /// Raw bytes of slots `[start, end)`.
    #[inline]
    fn slot_bytes(&self, start: usize, end: usize) -> &[u8] {
        &self.page.as_slice()[Self::slot_offset(start)..Self::slot_offset(end)]
    }
}

// ============================================================================
// Mutating operations
// ============================================================================

impl<P, K> InternalPage<P, K>
where
    P: DerefMut<Target = Page>,
    K: IndexKey,
{
    /// Format `page` as an empty internal node (size 1: just the sentinel)
    /// with the default `max_size`.
    ///
    /// # Panics
    /// Panics if `K` is too wide for three slots to fit in a page.
    pub fn init(page: P, page_id: PageId, parent_page_id: PageId) -> Self {
        Self::init_with_max_size(page, page_id, parent_page_id, Self::DEFAULT_MAX_SIZE)
    }

    /// Like [`InternalPage::init`] with an explicit split threshold.
    ///
    /// # Panics
    /// Panics unless `2 <= max_size < CAPACITY`.
    pub fn init_with_max_size(
        mut page: P,
        page_id: PageId,
        parent_page_id: PageId,
        max_size: usize,
    ) -> Self {
        assert!(
            max_size >= 2 && max_size < Self::CAPACITY,
            "max_size {} outside [2, {}) for {}-byte slots",
            max_size,
            Self::CAPACITY,
            Self::SLOT_SIZE
        );

        let data = page.as_mut_slice();
        PageHeader::new(PageType::BTreeInternal).write_to(data);
        BTreePageHeader {
            size: 1,
            max_size: max_size as u32,
            page_id,
            parent_page_id,
        }
        .write_to(data);

        let start = Self::slot_offset(0);
        data[start..start + Self::SLOT_SIZE].fill(0);
        PageId::INVALID.write_to(&mut data[start + K::ENCODED_SIZE..]);

        trace!("init internal page {} (parent {}, max_size {})", page_id, parent_page_id, max_size);

        Self {
            page,
            _key: PhantomData,
        }
    }

    /// Overwrite the key in slot `index`.
    ///
    /// # Panics
    /// Panics if `index >= size`.
    pub fn set_key_at(&mut self, index: usize, key: &K) {
        self.check_index(index);
        self.write_key(index, key);
    }

    /// Overwrite the child pointer in slot `index`.
    ///
    /// # Panics
    /// Panics if `index >= size`.
    pub fn set_value_at(&mut self, index: usize, value: PageId) {
        self.check_index(index);
        self.write_value(index, value);
    }

    pub fn set_parent_page_id(&mut self, parent_page_id: PageId) {
        parent_page_id
            .write_to(&mut self.page.as_mut_slice()[BTreePageHeader::OFFSET_PARENT_PAGE_ID..]);
    }

    /// Turn a freshly initialized page into the root above a split.
    ///
    /// Afterwards `value_at(0) == old_value`, `key_at(1) == new_key`,
    /// `value_at(1) == new_value` and size is 2.
    ///
    /// # Panics
    /// Panics if the page is not freshly initialized (size 1).
    pub fn populate_new_root(&mut self, old_value: PageId, new_key: &K, new_value: PageId) {
        assert_eq!(self.size(), 1, "new root {} is not empty", self.page_id());

        self.write_value(0, old_value);
        self.write_key(1, new_key);
        self.write_value(1, new_value);
        self.set_size(2);

        debug!(
            "populated root {}: {} | {}",
            self.page_id(),
            old_value,
            new_value
        );
    }

    /// Insert `(new_key, new_value)` right after the slot pointing at
    /// `old_value`. Returns the new size.
    ///
    /// The page may end up one slot over `max_size`; the caller splits it.
    ///
    /// # Panics
    /// Panics if no slot points at `old_value`, or the page is already
    /// overflowing.
    pub fn insert_node_after(&mut self, old_value: PageId, new_key: &K, new_value: PageId) -> usize {
        let size = self.size();
        assert!(
            size <= self.max_size(),
            "insert into overflowing internal page {}",
            self.page_id()
        );
        let index = self.value_index(old_value);
        assert!(
            index < size,
            "child {} not found in internal page {}",
            old_value,
            self.page_id()
        );

        let at = index + 1;
        self.page.as_mut_slice().copy_within(
            Self::slot_offset(at)..Self::slot_offset(size),
            Self::slot_offset(at + 1),
        );
        self.write_key(at, new_key);
        self.write_value(at, new_value);
        self.set_size(size + 1);

        size + 1
    }

    /// Move the upper half of the slots into the empty `recipient`.
    ///
    /// With size `S`, the last `S / 2` slots move and this page keeps
    /// `S - S / 2`. The recipient's slot 0 receives the first moved slot;
    /// its key is the separator the caller pushes up to the parent. Child
    /// pages are not touched.
    ///
    /// # Panics
    /// Panics if `recipient` is not freshly initialized.
    pub fn move_half_to<Q>(&mut self, recipient: &mut InternalPage<Q, K>)
    where
        Q: DerefMut<Target = Page>,
    {
        let size = self.size();
        let moved = size / 2;
        let keep = size - moved;

        recipient.copy_half_from(self.slot_bytes(keep, size), moved);
        self.set_size(keep);

        debug!(
            "split internal page {}: kept {}, moved {} to {}",
            self.page_id(),
            keep,
            moved,
            recipient.page_id()
        );
    }

    /// Fill an empty page with `count` raw slots starting at slot 0.
    ///
    /// # Panics
    /// Panics if the page is not freshly initialized or `count` slots do
    /// not fit.
    pub fn copy_half_from(&mut self, items: &[u8], count: usize) {
        assert_eq!(self.size(), 1, "split recipient {} is not empty", self.page_id());
        assert!(
            count <= self.max_size(),
            "{} slots overflow internal page {}",
            count,
            self.page_id()
        );
        assert_eq!(items.len(), count * Self::SLOT_SIZE);

        let start = Self::slot_offset(0);
        self.page.as_mut_slice()[start..start + items.len()].copy_from_slice(items);
        self.set_size(count);
    }

    /// Delete slot `index`, shifting later slots left.
    ///
    /// # Panics
    /// Panics if `index >= size`.
    pub fn remove(&mut self, index: usize) {
        self.check_index(index);
        let size = self.size();

        self.page.as_mut_slice().copy_within(
            Self::slot_offset(index + 1)..Self::slot_offset(size),
            Self::slot_offset(index),
        );
        self.set_size(size - 1);
    }

    /// Drop the last separator of a page left with a single child and
    /// return that child.
    ///
    /// Used when collapsing the root. Size goes from 2 to 1.
    ///
    /// # Panics
    /// Panics unless size is 2.
    pub fn remove_and_return_only_child(&mut self) -> PageId {
        let size = self.size();
        assert_eq!(
            size,
            2,
            "internal page {} has {} slots, cannot collapse",
            self.page_id(),
            size
        );

        self.set_size(1);
        let child = self.read_value(0);
        debug!("collapsed internal page {} onto child {}", self.page_id(), child);
        child
    }

    /// Merge this page into its left sibling `recipient` and drop this
    /// page's separator from `parent`.
    ///
    /// Slots `[1, size)` are appended to the recipient and the parent
    /// entry at `index_in_parent` is removed. Slot 0 does not move, so
    /// a caller that needs `value_at(0)` first re-homes it in the
    /// recipient under the parent separator. This page is left with only
    /// its sentinel.
    ///
    /// # Panics
    /// Panics if the merged slots do not fit in the recipient, or
    /// `index_in_parent` is out of range for the parent.
    pub fn move_all_to<Q, R>(
        &mut self,
        recipient: &mut InternalPage<Q, K>,
        index_in_parent: usize,
        parent: &mut InternalPage<R, K>,
    ) where
        Q: DerefMut<Target = Page>,
        R: DerefMut<Target = Page>,
    {
        let size = self.size();
        let count = size - 1;
        assert!(
            recipient.size() + count <= recipient.max_size(),
            "merging {} slots into internal page {} of size {} exceeds max_size {}",
            count,
            recipient.page_id(),
            recipient.size(),
            recipient.max_size()
        );

        parent.check_index(index_in_parent);
        debug_assert_eq!(parent.page_id(), self.parent_page_id());
        debug_assert_eq!(parent.value_at(index_in_parent), self.page_id());

        recipient.copy_all_from(self.slot_bytes(1, size), count);
        parent.remove(index_in_parent);
        self.set_size(1);

        debug!(
            "merged internal page {} into {} ({} slots), parent {} now size {}",
            self.page_id(),
            recipient.page_id(),
            count,
            parent.page_id(),
            parent.size()
        );
    }

    /// Append `count` raw slots after the current last slot.
    ///
    /// # Panics
    /// Panics if the result would exceed `max_size`.
    pub fn copy_all_from(&mut self, items: &[u8], count: usize) {
        let size = self.size();
        assert!(
            size + count <= self.max_size(),
            "{} slots overflow internal page {} of size {}",
            count,
            self.page_id(),
            size
        );
        assert_eq!(items.len(), count * Self::SLOT_SIZE);

        let start = Self::slot_offset(size);
        self.page.as_mut_slice()[start..start + items.len()].copy_from_slice(items);
        self.set_size(size + count);
    }

    /// Shift this page's first child onto the end of its left sibling
    /// `recipient`.
    ///
    /// The recipient gains `(parent separator, value_at(0))`, the parent
    /// separator becomes `key_at(1)`, and `value_at(1)` becomes this
    /// page's first child.
    ///
    /// # Panics
    /// Panics if this page has no separator to give up.
    pub fn move_first_to_end_of<Q, R>(
        &mut self,
        recipient: &mut InternalPage<Q, K>,
        parent: &mut InternalPage<R, K>,
    ) where
        Q: DerefMut<Target = Page>,
        R: DerefMut<Target = Page>,
    {
        assert!(
            self.size() > 1,
            "internal page {} has no slot to lend",
            self.page_id()
        );

        let pair = (self.read_key(1), self.read_value(0));
        recipient.copy_last_from(pair, parent);

        let promoted = self.read_value(1);
        self.write_value(0, promoted);
        self.remove(1);

        debug!(
            "moved child {} from internal page {} to end of {}",
            pair.1,
            self.page_id(),
            recipient.page_id()
        );
    }

    /// Append a child borrowed from the right sibling.
    ///
    /// `pair` is `(right sibling's first separator, right sibling's first
    /// child)`. The appended slot takes the parent's separator for the
    /// right sibling as its key, and that separator is replaced by
    /// `pair.0`.
    ///
    /// # Panics
    /// Panics if the page is full or has no right sibling in `parent`.
    pub fn copy_last_from<R>(&mut self, pair: (K, PageId), parent: &mut InternalPage<R, K>)
    where
        R: DerefMut<Target = Page>,
    {
        let size = self.size();
        assert!(
            size < self.max_size(),
            "internal page {} is full",
            self.page_id()
        );
        debug_assert_eq!(parent.page_id(), self.parent_page_id());

        let index = parent.value_index(self.page_id());
        assert!(
            index + 1 < parent.size(),
            "internal page {} has no right sibling under parent {}",
            self.page_id(),
            parent.page_id()
        );

        let separator = parent.read_key(index + 1);
        self.write_key(size, &separator);
        self.write_value(size, pair.1);
        self.set_size(size + 1);
        parent.write_key(index + 1, &pair.0);
    }

    /// Shift this page's last child onto the front of its right sibling
    /// `recipient`.
    ///
    /// `parent_index` is the recipient's slot in the shared parent. The
    /// parent separator at that slot moves down into the recipient and is
    /// replaced by this page's last key.
    ///
    /// # Panics
    /// Panics if this page has no separator to give up.
    pub fn move_last_to_front_of<Q, R>(
        &mut self,
        recipient: &mut InternalPage<Q, K>,
        parent_index: usize,
        parent: &mut InternalPage<R, K>,
    ) where
        Q: DerefMut<Target = Page>,
        R: DerefMut<Target = Page>,
    {
        let size = self.size();
        assert!(size > 1, "internal page {} has no slot to lend", self.page_id());

        let pair = (self.read_key(size - 1), self.read_value(size - 1));
        recipient.copy_first_from(pair, parent_index, parent);
        self.set_size(size - 1);

        debug!(
            "moved child {} from internal page {} to front of {}",
            pair.1,
            self.page_id(),
            recipient.page_id()
        );
    }

    /// Prepend a child borrowed from the left sibling.
    ///
    /// The old first child moves to slot 1 under the separator at
    /// `parent_index` in `parent`; `pair.1` becomes the new first child
    /// and `pair.0` the new parent separator.
    ///
    /// # Panics
    /// Panics if the page is full or `parent_index` is out of range.
    pub fn copy_first_from<R>(
        &mut self,
        pair: (K, PageId),
        parent_index: usize,
        parent: &mut InternalPage<R, K>,
    ) where
        R: DerefMut<Target = Page>,
    {
        let size = self.size();
        assert!(
            size < self.max_size(),
            "internal page {} is full",
            self.page_id()
        );

        parent.check_index(parent_index);
        debug_assert_eq!(parent.page_id(), self.parent_page_id());
        debug_assert_eq!(parent.value_at(parent_index), self.page_id());

        let separator = parent.read_key(parent_index);
        parent.write_key(parent_index, &pair.0);

        self.page.as_mut_slice().copy_within(
            Self::slot_offset(0)..Self::slot_offset(size),
            Self::slot_offset(1),
        );
        self.write_key(1, &separator);
        self.write_value(0, pair.1);
        self.set_size(size + 1);
    }

    #[inline]
    fn set_size(&mut self, size: usize) {
        write_u32(
            self.page.as_mut_slice(),
            BTreePageHeader::OFFSET_SIZE,
            size as u32,
        );
    }

    #[inline]
    fn write_key(&mut self, index: usize, key: &K) {
        let offset = Self::slot_offset(index);
        key.encode_to(&mut self.page.as_mut_slice()[offset..offset + K::ENCODED_SIZE]);
    }

    #[inline]
    fn write_value(&mut self, index: usize, value: PageId) {
        let offset = Self::slot_offset(index) + K::ENCODED_SIZE;
        value.write_to(&mut self.page.as_mut_slice()[offset..]);
    }
}

impl<P, K> fmt::Display for InternalPage<P, K>
where
    P: Deref<Target = Page>,
    K: IndexKey + fmt::Display,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render(false))
    }
}

impl<P, K> fmt::Debug for InternalPage<P, K>
where
    P: Deref<Target = Page>,
    K: IndexKey + fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InternalPage")
            .field("page_id", &self.page_id())
            .field("parent_page_id", &self.parent_page_id())
            .field("size", &self.size())
            .field("max_size", &self.max_size())
            .field("entries", &self.entries())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::btree::{GenericKey, NaturalComparator};

    type Key = GenericKey<8>;

    fn key(s: &str) -> Key {
        Key::from_bytes(s.as_bytes())
    }

    fn pid(n: u32) -> PageId {
        PageId::new(n)
    }

    /// Internal page over a scratch buffer: [P0, (K, P1), (M, P2)].
    fn routing_page(page: &mut Page) -> InternalPage<&mut Page, Key> {
        let mut node = InternalPage::init_with_max_size(page, pid(10), PageId::INVALID, 4);
        node.populate_new_root(pid(0), &key("K"), pid(1));
        node.insert_node_after(pid(1), &key("M"), pid(2));
        node
    }

    #[test]
    fn test_init() {
        let mut page = Page::new();
        let node = InternalPage::<_, u64>::init(&mut page, pid(3), pid(1));

        assert_eq!(node.size(), 1);
        assert_eq!(node.page_id(), pid(3));
        assert_eq!(node.parent_page_id(), pid(1));
        assert!(!node.is_root());
        assert_eq!(node.max_size(), InternalPage::<&mut Page, u64>::CAPACITY - 1);
        assert_eq!(page.page_type(), PageType::BTreeInternal);
    }

    #[test]
    fn test_capacity_reserves_overflow_slot() {
        // 8-byte key + 4-byte child
        assert_eq!(InternalPage::<&Page, u64>::SLOT_SIZE, 12);
        assert_eq!(InternalPage::<&Page, u64>::CAPACITY, (4096 - 29) / 12);
        assert_eq!(
            InternalPage::<&Page, u64>::DEFAULT_MAX_SIZE + 1,
            InternalPage::<&Page, u64>::CAPACITY
        );
    }

    #[test]
    #[should_panic(expected = "max_size")]
    fn test_init_rejects_max_size_without_overflow_slot() {
        let mut page = Page::new();
        let capacity = InternalPage::<&mut Page, u64>::CAPACITY;
        InternalPage::<_, u64>::init_with_max_size(&mut page, pid(0), PageId::INVALID, capacity);
    }

    #[test]
    fn test_from_page_checks_type() {
        let mut page = Page::new();
        let result = InternalPage::<_, u64>::from_page(&page);
        assert!(matches!(
            result,
            Err(Error::PageTypeMismatch {
                expected: PageType::BTreeInternal,
                found: PageType::Invalid,
                ..
            })
        ));

        InternalPage::<_, u64>::init(&mut page, pid(4), PageId::INVALID);
        let node = InternalPage::<_, u64>::from_page(&page).unwrap();
        assert_eq!(node.page_id(), pid(4));
        assert!(node.is_root());
    }

    #[test]
    fn test_from_page_rejects_bad_header() {
        let mut page = Page::new();
        InternalPage::<_, u64>::init_with_max_size(&mut page, pid(4), PageId::INVALID, 4);
        write_u32(page.as_mut_slice(), BTreePageHeader::OFFSET_SIZE, 9);

        let result = InternalPage::<_, u64>::from_page(&page);
        assert!(matches!(result, Err(Error::CorruptedPage { page_id: 4, .. })));
    }

    #[test]
    fn test_populate_new_root() {
        let mut page = Page::new();
        let mut node = InternalPage::init(&mut page, pid(9), PageId::INVALID);
        node.populate_new_root(pid(1), &42u64, pid(2));

        assert_eq!(node.size(), 2);
        assert_eq!(node.value_at(0), pid(1));
        assert_eq!(node.key_at(1), 42);
        assert_eq!(node.value_at(1), pid(2));
        assert_eq!(node.lookup(&41, &NaturalComparator), pid(1));
        assert_eq!(node.lookup(&42, &NaturalComparator), pid(2));
    }

    #[test]
    #[should_panic(expected = "not empty")]
    fn test_populate_new_root_twice() {
        let mut page = Page::new();
        let mut node = InternalPage::init(&mut page, pid(9), PageId::INVALID);
        node.populate_new_root(pid(1), &42u64, pid(2));
        node.populate_new_root(pid(1), &42u64, pid(2));
    }

    #[test]
    fn test_lookup_routes_by_separator() {
        let mut page = Page::new();
        let node = routing_page(&mut page);
        let cmp = NaturalComparator;

        assert_eq!(node.lookup(&key("A"), &cmp), pid(0));
        assert_eq!(node.lookup(&key("K"), &cmp), pid(1));
        assert_eq!(node.lookup(&key("L"), &cmp), pid(1));
        assert_eq!(node.lookup(&key("M"), &cmp), pid(2));
        assert_eq!(node.lookup(&key("Z"), &cmp), pid(2));
    }

    #[test]
    fn test_lookup_many_separators() {
        let mut page = Page::new();
        let mut node = InternalPage::init(&mut page, pid(0), PageId::INVALID);
        node.populate_new_root(pid(100), &10u64, pid(101));
        for i in 2..50u32 {
            node.insert_node_after(pid(100 + i - 1), &(u64::from(i) * 10), pid(100 + i));
        }
        let cmp = NaturalComparator;

        assert_eq!(node.lookup(&0, &cmp), pid(100));
        assert_eq!(node.lookup(&9, &cmp), pid(100));
        for i in 1..50u32 {
            let k = u64::from(i) * 10;
            assert_eq!(node.lookup(&k, &cmp), pid(100 + i));
            assert_eq!(node.lookup(&(k + 9), &cmp), pid(100 + i));
        }
        assert_eq!(node.lookup(&u64::MAX, &cmp), pid(149));
    }

    #[test]
    fn test_lookup_with_closure_comparator() {
        // Descending order: larger keys route left
        let mut page = Page::new();
        let mut node = InternalPage::init(&mut page, pid(0), PageId::INVALID);
        node.populate_new_root(pid(1), &50i64, pid(2));
        node.insert_node_after(pid(2), &20i64, pid(3));

        let desc = |a: &i64, b: &i64| b.cmp(a);
        assert_eq!(node.lookup(&60, &desc), pid(1));
        assert_eq!(node.lookup(&30, &desc), pid(2));
        assert_eq!(node.lookup(&20, &desc), pid(3));
        assert_eq!(node.lookup(&-5, &desc), pid(3));
    }

    #[test]
    fn test_insert_node_after_allows_one_overflow_slot() {
        let mut page = Page::new();
        let mut node = routing_page(&mut page);

        assert_eq!(node.insert_node_after(pid(2), &key("P"), pid(3)), 4);
        assert!(!node.is_overflowing());
        assert_eq!(node.insert_node_after(pid(0), &key("C"), pid(4)), 5);
        assert!(node.is_overflowing());

        let values: Vec<_> = node.entries().into_iter().map(|(_, v)| v).collect();
        assert_eq!(values, vec![pid(0), pid(4), pid(1), pid(2), pid(3)]);
        assert_eq!(node.to_string(), "C K M P");
    }

    #[test]
    #[should_panic(expected = "overflowing")]
    fn test_insert_into_overflowing_page() {
        let mut page = Page::new();
        let mut node = routing_page(&mut page);
        node.insert_node_after(pid(2), &key("P"), pid(3));
        node.insert_node_after(pid(3), &key("R"), pid(4));
        node.insert_node_after(pid(4), &key("T"), pid(5));
    }

    #[test]
    #[should_panic(expected = "not found")]
    fn test_insert_after_unknown_child() {
        let mut page = Page::new();
        let mut node = routing_page(&mut page);
        node.insert_node_after(pid(77), &key("P"), pid(3));
    }

    #[test]
    fn test_value_index() {
        let mut page = Page::new();
        let node = routing_page(&mut page);

        assert_eq!(node.value_index(pid(0)), 0);
        assert_eq!(node.value_index(pid(2)), 2);
        assert_eq!(node.value_index(pid(99)), node.size());
    }

    #[test]
    #[should_panic(expected = "out of range")]
    fn test_key_at_out_of_range() {
        let mut page = Page::new();
        let node = routing_page(&mut page);
        node.key_at(3);
    }

    #[test]
    fn test_set_key_at_overwrites_separator() {
        let mut page = Page::new();
        let mut node = routing_page(&mut page);

        node.set_key_at(2, &key("N"));
        assert_eq!(node.key_at(2), key("N"));
        assert_eq!(node.lookup(&key("M"), &NaturalComparator), pid(1));
        assert_eq!(node.lookup(&key("N"), &NaturalComparator), pid(2));
    }

    #[test]
    #[should_panic(expected = "out of range")]
    fn test_set_key_at_out_of_range() {
        let mut page = Page::new();
        let mut node = routing_page(&mut page);
        let size = node.size();
        node.set_key_at(size, &key("Z"));
    }

    #[test]
    fn test_remove_shifts_left() {
        let mut page = Page::new();
        let mut node = routing_page(&mut page);
        node.insert_node_after(pid(2), &key("P"), pid(3));

        node.remove(1);
        assert_eq!(node.size(), 3);
        assert_eq!(
            node.entries()[1..].to_vec(),
            vec![(key("M"), pid(2)), (key("P"), pid(3))]
        );

        node.remove(2);
        assert_eq!(node.size(), 2);
        assert_eq!(node.value_at(1), pid(2));
    }

    #[test]
    fn test_remove_and_return_only_child() {
        let mut page = Page::new();
        let mut node = InternalPage::init(&mut page, pid(9), PageId::INVALID);
        node.populate_new_root(pid(1), &42u64, pid(2));

        assert_eq!(node.remove_and_return_only_child(), pid(1));
        assert_eq!(node.size(), 1);
    }

    #[test]
    fn test_move_half_to() {
        let mut left_page = Page::new();
        let mut right_page = Page::new();
        let mut left = routing_page(&mut left_page);
        left.insert_node_after(pid(2), &key("P"), pid(3));
        left.insert_node_after(pid(3), &key("R"), pid(4));
        assert!(left.is_overflowing());

        let mut right = InternalPage::init_with_max_size(&mut right_page, pid(11), PageId::INVALID, 4);
        left.move_half_to(&mut right);

        assert_eq!(left.size(), 3);
        assert_eq!(right.size(), 2);
        assert_eq!(
            left.entries()[1..].to_vec(),
            vec![(key("K"), pid(1)), (key("M"), pid(2))]
        );
        // Slot 0 key of the new page is the separator pushed up
        assert_eq!(right.key_at(0), key("P"));
        assert_eq!(right.value_at(0), pid(3));
        assert_eq!(right.key_at(1), key("R"));
        assert_eq!(right.value_at(1), pid(4));
    }

    #[test]
    fn test_copy_all_from_appends() {
        let mut page = Page::new();
        let mut node = InternalPage::init_with_max_size(&mut page, pid(1), PageId::INVALID, 6);
        node.populate_new_root(pid(10), &5u64, pid(11));

        let mut slots = vec![0u8; 2 * InternalPage::<&Page, u64>::SLOT_SIZE];
        7u64.encode_to(&mut slots[0..8]);
        pid(12).write_to(&mut slots[8..12]);
        9u64.encode_to(&mut slots[12..20]);
        pid(13).write_to(&mut slots[20..24]);

        node.copy_all_from(&slots, 2);
        assert_eq!(node.size(), 4);
        assert_eq!(
            node.entries(),
            vec![(0, pid(10)), (5, pid(11)), (7, pid(12)), (9, pid(13))]
        );
    }

    /// Parent 20 = [P21, (100, P22)] over left 21 = [P0, (10, P1)] and
    /// right 22 = [P5, (110, P6), (120, P7)], all on scratch buffers.
    fn sibling_pages<'a>(
        parent_page: &'a mut Page,
        left_page: &'a mut Page,
        right_page: &'a mut Page,
    ) -> (
        InternalPage<&'a mut Page, u64>,
        InternalPage<&'a mut Page, u64>,
        InternalPage<&'a mut Page, u64>,
    ) {
        let mut parent = InternalPage::init_with_max_size(parent_page, pid(20), PageId::INVALID, 4);
        parent.populate_new_root(pid(21), &100u64, pid(22));
        let mut left = InternalPage::init_with_max_size(left_page, pid(21), pid(20), 4);
        left.populate_new_root(pid(0), &10u64, pid(1));
        let mut right = InternalPage::init_with_max_size(right_page, pid(22), pid(20), 4);
        right.populate_new_root(pid(5), &110u64, pid(6));
        right.insert_node_after(pid(6), &120u64, pid(7));
        (parent, left, right)
    }

    #[test]
    fn test_move_first_to_end_of_patches_parent_view() {
        let (mut p, mut l, mut r) = (Page::new(), Page::new(), Page::new());
        let (mut parent, mut left, mut right) = sibling_pages(&mut p, &mut l, &mut r);

        right.move_first_to_end_of(&mut left, &mut parent);

        assert_eq!(left.entries()[1..].to_vec(), vec![(10, pid(1)), (100, pid(5))]);
        assert_eq!(right.value_at(0), pid(6));
        assert_eq!(right.entries()[1..].to_vec(), vec![(120, pid(7))]);
        assert_eq!(parent.key_at(1), 110);
        assert_eq!(parent.lookup(&105, &NaturalComparator), pid(21));
        assert_eq!(parent.lookup(&110, &NaturalComparator), pid(22));
    }

    #[test]
    fn test_move_last_to_front_of_patches_parent_view() {
        let (mut p, mut l, mut r) = (Page::new(), Page::new(), Page::new());
        let (mut parent, mut left, mut right) = sibling_pages(&mut p, &mut l, &mut r);

        // Left needs a spare separator to lend
        left.insert_node_after(pid(1), &20u64, pid(2));
        left.move_last_to_front_of(&mut right, 1, &mut parent);

        assert_eq!(left.size(), 2);
        assert_eq!(right.value_at(0), pid(2));
        assert_eq!(
            right.entries()[1..].to_vec(),
            vec![(100, pid(5)), (110, pid(6)), (120, pid(7))]
        );
        assert_eq!(parent.key_at(1), 20);
    }

    #[test]
    fn test_move_all_to_removes_parent_entry() {
        let (mut p, mut l, mut r) = (Page::new(), Page::new(), Page::new());
        let (mut parent, mut left, mut right) = sibling_pages(&mut p, &mut l, &mut r);
        right.remove(2);

        left.insert_node_after(pid(1), &100u64, right.value_at(0));
        right.move_all_to(&mut left, 1, &mut parent);

        assert_eq!(right.size(), 1);
        assert_eq!(
            left.entries()[1..].to_vec(),
            vec![(10, pid(1)), (100, pid(5)), (110, pid(6))]
        );
        assert_eq!(parent.size(), 1);
        assert_eq!(parent.value_at(0), pid(21));
    }

    #[test]
    fn test_render() {
        let mut page = Page::new();
        let node = routing_page(&mut page);

        assert_eq!(node.render(false), "K M");
        assert_eq!(
            node.render(true),
            "[pageId: 10 parentId: INVALID]<3> (0) K(1) M(2)"
        );
        assert_eq!(format!("{}", node), "K M");
    }

    #[test]
    fn test_read_only_view_over_shared_page() {
        let mut page = Page::new();
        routing_page(&mut page);

        let view = InternalPage::<_, Key>::from_page(&page).unwrap();
        assert_eq!(view.size(), 3);
        assert_eq!(view.min_size(), 2);
        assert_eq!(view.lookup(&key("L"), &NaturalComparator), pid(1));
    }
}
