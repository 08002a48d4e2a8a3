//! Buffer Pool Manager - the page caching layer.
//!
//! The [`BufferPoolManager`] is the only way the index layer reaches page
//! memory. It provides:
//! - Fetch by page id, pinning the page for the lifetime of a guard
//! - Unpin with a dirty flag when the guard drops
//! - Dirty write-back on eviction and flush
//! - Page allocation and deallocation through the [`DiskManager`]

use std::collections::HashMap;

use log::{debug, trace, warn};
use parking_lot::Mutex;

use crate::buffer::replacer::LruReplacer;
use crate::buffer::{Frame, PageReadGuard, PageWriteGuard};
use crate::common::{Error, FrameId, PageId, Result};
use crate::storage::DiskManager;

/// Mapping and eviction state, always changed together.
struct PoolState {
    /// Resident pages.
    page_table: HashMap<PageId, FrameId>,
    /// Frames holding no page (LIFO).
    free_list: Vec<FrameId>,
    /// Unpinned resident frames in eviction order.
    replacer: LruReplacer,
}

/// Manages a fixed pool of frames caching disk pages.
///
/// # Architecture
/// ```text
/// ┌──────────────────────────────────────────────────────────┐
/// │                   BufferPoolManager                      │
/// │  ┌────────────────────────────┐  ┌────────────────────┐  │
/// │  │ state: Mutex<PoolState>    │  │ frames: Vec<Frame> │  │
/// │  │  page_table  PageId → Fid  │─▶│ [F0] [F1] [F2] ... │  │
/// │  │  free_list   Vec<FrameId>  │  └────────────────────┘  │
/// │  │  replacer    LruReplacer   │  ┌────────────────────┐  │
/// │  └────────────────────────────┘  │ disk: Mutex<DM>    │  │
/// │                                  └────────────────────┘  │
/// └──────────────────────────────────────────────────────────┘
/// ```
///
/// # Pin discipline
/// Pin counts only change while `state` is locked, so a frame can never be
/// chosen as a victim between being found in the page table and being
/// pinned. Page latches (the frame `RwLock`) are taken after `state` is
/// released; a caller blocked on a latch never blocks the pool.
///
/// A thread must not fetch a page it already holds a write guard for: the
/// second latch acquisition would wait on itself.
///
/// # Usage
/// ```ignore
/// let bpm = BufferPoolManager::new(10, DiskManager::create("test.db")?);
///
/// let mut guard = bpm.new_page()?;
/// guard.as_mut_slice()[0] = 0xAB;
/// drop(guard); // unpinned, dirty
///
/// let guard = bpm.fetch_page_read(PageId::new(0))?;
/// ```
pub struct BufferPoolManager {
    frames: Vec<Frame>,
    state: Mutex<PoolState>,
    disk_manager: Mutex<DiskManager>,
    pool_size: usize,
}

impl BufferPoolManager {
    /// Create a buffer pool with `pool_size` frames.
    ///
    /// # Panics
    /// Panics if `pool_size` is 0.
    pub fn new(pool_size: usize, disk_manager: DiskManager) -> Self {
        assert!(pool_size > 0, "pool_size must be > 0");

        let frames = (0..pool_size).map(|_| Frame::new()).collect();
        let free_list = (0..pool_size).rev().map(FrameId::new).collect();

        Self {
            frames,
            state: Mutex::new(PoolState {
                page_table: HashMap::new(),
                free_list,
                replacer: LruReplacer::new(),
            }),
            disk_manager: Mutex::new(disk_manager),
            pool_size,
        }
    }

    // ========================================================================
    // Fetch
    // ========================================================================

    /// Fetch a page for reading (shared latch).
    ///
    /// # Errors
    /// - `Error::PageNotFound` if the page doesn't exist on disk
    /// - `Error::NoFreeFrames` if all frames are pinned
    pub fn fetch_page_read(&self, page_id: PageId) -> Result<PageReadGuard<'_>> {
        let frame_id = self.pin_page(page_id)?;
        let lock = self.frames[frame_id.0].page();

        Ok(PageReadGuard::new(self, frame_id, page_id, lock))
    }

    /// Fetch a page for writing (exclusive latch).
    ///
    /// The page is marked dirty when the guard drops.
    ///
    /// # Errors
    /// - `Error::PageNotFound` if the page doesn't exist on disk
    /// - `Error::NoFreeFrames` if all frames are pinned
    pub fn fetch_page_write(&self, page_id: PageId) -> Result<PageWriteGuard<'_>> {
        let frame_id = self.pin_page(page_id)?;
        let lock = self.frames[frame_id.0].page_mut();

        Ok(PageWriteGuard::new(self, frame_id, page_id, lock))
    }

    // ========================================================================
    // Create and delete
    // ========================================================================

    /// Allocate a page on disk and return it zeroed, pinned and write-latched.
    ///
    /// # Errors
    /// - `Error::NoFreeFrames` if all frames are pinned
    /// - I/O errors from disk allocation
    pub fn new_page(&self) -> Result<PageWriteGuard<'_>> {
        let (frame_id, page_id) = {
            let mut state = self.state.lock();
            let frame_id = self.acquire_frame(&mut state)?;

            let page_id = match self.disk_manager.lock().allocate_page() {
                Ok(page_id) => page_id,
                Err(e) => {
                    state.free_list.push(frame_id);
                    return Err(e);
                }
            };

            let frame = &self.frames[frame_id.0];
            frame.page_mut().reset();
            frame.set_page_id(Some(page_id));
            frame.pin();
            state.page_table.insert(page_id, frame_id);

            (frame_id, page_id)
        };

        trace!("new {} in {}", page_id, frame_id);
        let lock = self.frames[frame_id.0].page_mut();
        Ok(PageWriteGuard::new(self, frame_id, page_id, lock))
    }

    /// Drop a page from the pool and deallocate it on disk for reuse.
    ///
    /// The page's bytes are discarded, dirty or not.
    ///
    /// # Errors
    /// - `Error::PagePinned` if someone still holds a guard on the page
    pub fn delete_page(&self, page_id: PageId) -> Result<()> {
        {
            let mut state = self.state.lock();

            if let Some(&frame_id) = state.page_table.get(&page_id) {
                let frame = &self.frames[frame_id.0];
                if frame.is_pinned() {
                    return Err(Error::PagePinned(page_id.0));
                }

                state.page_table.remove(&page_id);
                state.replacer.remove(frame_id);
                frame.set_page_id(None);
                frame.clear_dirty();
                state.free_list.push(frame_id);
            }
        }

        self.disk_manager.lock().deallocate_page(page_id)?;
        debug!("deleted {}", page_id);
        Ok(())
    }

    // ========================================================================
    // Flush
    // ========================================================================

    /// Write a resident page back to disk if it is dirty.
    ///
    /// Takes the page's shared latch; do not call while holding its write guard.
    pub fn flush_page(&self, page_id: PageId) -> Result<()> {
        let frame_id = match self.state.lock().page_table.get(&page_id) {
            Some(&fid) => fid,
            None => return Ok(()),
        };

        self.flush_frame(frame_id, page_id)
    }

    /// Write every dirty resident page back to disk.
    pub fn flush_all_pages(&self) -> Result<()> {
        let pages: Vec<(PageId, FrameId)> = self
            .state
            .lock()
            .page_table
            .iter()
            .map(|(&pid, &fid)| (pid, fid))
            .collect();

        for (page_id, frame_id) in pages {
            self.flush_frame(frame_id, page_id)?;
        }

        Ok(())
    }

    // ========================================================================
    // Introspection
    // ========================================================================

    /// Pin count of a resident page, or `None` if it is not in the pool.
    pub fn pin_count(&self, page_id: PageId) -> Option<u32> {
        let state = self.state.lock();
        state
            .page_table
            .get(&page_id)
            .map(|fid| self.frames[fid.0].pin_count())
    }

    pub fn pool_size(&self) -> usize {
        self.pool_size
    }

    pub fn free_frame_count(&self) -> usize {
        self.state.lock().free_list.len()
    }

    /// Number of pages resident in the pool.
    pub fn page_count(&self) -> usize {
        self.state.lock().page_table.len()
    }

    // ========================================================================
    // Internal
    // ========================================================================

    /// Unpin a frame. Called by the guards on drop.
    pub(crate) fn unpin_page_internal(&self, frame_id: FrameId, is_dirty: bool) {
        let mut state = self.state.lock();
        let frame = &self.frames[frame_id.0];

        if is_dirty {
            frame.mark_dirty();
        }

        if frame.unpin() == 0 {
            state.replacer.set_evictable(frame_id, true);
        }
    }

    /// Make `page_id` resident and pin it.
    fn pin_page(&self, page_id: PageId) -> Result<FrameId> {
        if !page_id.is_valid() {
            return Err(Error::InvalidPageId(page_id.0));
        }

        let mut state = self.state.lock();

        if let Some(&frame_id) = state.page_table.get(&page_id) {
            self.frames[frame_id.0].pin();
            state.replacer.set_evictable(frame_id, false);
            return Ok(frame_id);
        }

        let frame_id = self.acquire_frame(&mut state)?;
        let page = match self.disk_manager.lock().read_page(page_id) {
            Ok(page) => page,
            Err(e) => {
                state.free_list.push(frame_id);
                return Err(e);
            }
        };

        let frame = &self.frames[frame_id.0];
        frame.page_mut().copy_from(&page);
        frame.set_page_id(Some(page_id));
        frame.pin();
        state.page_table.insert(page_id, frame_id);

        trace!("loaded {} into {}", page_id, frame_id);
        Ok(frame_id)
    }

    /// Take a frame from the free list, or evict a victim.
    ///
    /// The returned frame is empty and not tracked by the replacer.
    fn acquire_frame(&self, state: &mut PoolState) -> Result<FrameId> {
        if let Some(frame_id) = state.free_list.pop() {
            return Ok(frame_id);
        }

        let frame_id = match state.replacer.evict() {
            Some(frame_id) => frame_id,
            None => {
                warn!("buffer pool exhausted: all {} frames pinned", self.pool_size);
                return Err(Error::NoFreeFrames);
            }
        };

        let frame = &self.frames[frame_id.0];
        if let Some(old_page_id) = frame.page_id() {
            if let Err(e) = self.flush_frame(frame_id, old_page_id) {
                // Keep the dirty page resident rather than lose it
                state.replacer.set_evictable(frame_id, true);
                return Err(e);
            }
            state.page_table.remove(&old_page_id);
            debug!("evicted {} from {}", old_page_id, frame_id);
        }

        frame.set_page_id(None);
        frame.clear_dirty();
        Ok(frame_id)
    }

    fn flush_frame(&self, frame_id: FrameId, page_id: PageId) -> Result<()> {
        let frame = &self.frames[frame_id.0];

        if frame.is_dirty() {
            let page = frame.page();
            self.disk_manager.lock().write_page(page_id, &page)?;
            drop(page);

            frame.clear_dirty();
            trace!("flushed {}", page_id);
        }

        Ok(())
    }
}
