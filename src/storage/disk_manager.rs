//! Disk Manager - page-granular file I/O.
//!
//! The [`DiskManager`] owns the database file: it reads and writes whole
//! pages, grows the file when a page is allocated, and recycles pages the
//! index layer has released.

use std::fs::{File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::Path;

use log::{debug, trace};

use crate::common::config::PAGE_SIZE;
use crate::common::{Error, PageId, Result};
use crate::storage::page::{Page, PageHeader, PageType};

/// Manages disk I/O for a single database file.
///
/// # File Layout
/// ```text
/// ┌─────────┬─────────┬─────────┬─────────┐
/// │ Page 0  │ Page 1  │  ...    │ Page N  │
/// └─────────┴─────────┴─────────┴─────────┘
/// Offset:  0      4096     ...    N×4096
/// ```
///
/// Deallocated pages are rewritten with a [`PageType::Free`] header and
/// handed out again by [`DiskManager::allocate_page`] before the file grows.
/// The free list is rebuilt from those headers when a file is opened.
///
/// # Checksums
/// `write_page` stamps a CRC32 into the header of every typed page;
/// `read_page` verifies it. Pages still tagged `Invalid` (never written by
/// the index layer) are not checked.
///
/// # Thread Safety
/// Single-threaded. The `BufferPoolManager` serializes access behind a mutex.
pub struct DiskManager {
    file: File,
    page_count: u32,
    free_pages: Vec<PageId>,
}

impl DiskManager {
    /// Create a new database file.
    ///
    /// # Errors
    /// Returns an error if the file already exists or cannot be created.
    pub fn create<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create_new(true)
            .open(path)?;

        Ok(Self {
            file,
            page_count: 0,
            free_pages: Vec::new(),
        })
    }

    /// Open an existing database file.
    ///
    /// # Errors
    /// Returns an error if the file doesn't exist or cannot be opened.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = OpenOptions::new().read(true).write(true).open(&path)?;
        let page_count = (file.metadata()?.len() / PAGE_SIZE as u64) as u32;

        let mut dm = Self {
            file,
            page_count,
            free_pages: Vec::new(),
        };
        dm.rebuild_free_list()?;
        Ok(dm)
    }

    /// Open an existing database file, or create if it doesn't exist.
    pub fn open_or_create<P: AsRef<Path>>(path: P) -> Result<Self> {
        if path.as_ref().exists() {
            Self::open(path)
        } else {
            Self::create(path)
        }
    }

    /// Read a page from disk.
    ///
    /// # Errors
    /// - `Error::PageNotFound` if the page was never allocated
    /// - `Error::ChecksumMismatch` if a typed page fails verification
    pub fn read_page(&mut self, page_id: PageId) -> Result<Page> {
        self.check_bounds(page_id)?;

        self.file.seek(SeekFrom::Start(Self::offset(page_id)))?;
        let mut page = Page::new();
        self.file.read_exact(page.as_mut_slice())?;

        if page.page_type().is_checksummed() && !page.verify_checksum() {
            return Err(Error::ChecksumMismatch(page_id.0));
        }

        trace!("read {}", page_id);
        Ok(page)
    }

    /// Write a page to disk and `fsync`.
    ///
    /// The caller's page is not modified; the checksum is stamped into the
    /// bytes that reach the file.
    ///
    /// # Errors
    /// Returns `Error::PageNotFound` if the page hasn't been allocated.
    pub fn write_page(&mut self, page_id: PageId, page: &Page) -> Result<()> {
        self.check_bounds(page_id)?;

        let mut out = Page::new();
        out.copy_from(page);
        if out.page_type().is_checksummed() {
            out.update_checksum();
        }

        self.file.seek(SeekFrom::Start(Self::offset(page_id)))?;
        self.file.write_all(out.as_slice())?;
        self.file.sync_all()?;

        trace!("wrote {}", page_id);
        Ok(())
    }

    /// Allocate a page, reusing a deallocated one when available.
    ///
    /// The returned page reads back as all zeros.
    pub fn allocate_page(&mut self) -> Result<PageId> {
        if let Some(page_id) = self.free_pages.pop() {
            self.file.seek(SeekFrom::Start(Self::offset(page_id)))?;
            self.file.write_all(&[0u8; PAGE_SIZE])?;
            self.file.sync_all()?;

            debug!("reusing deallocated {}", page_id);
            return Ok(page_id);
        }

        let page_id = PageId::new(self.page_count);
        self.file.seek(SeekFrom::Start(Self::offset(page_id)))?;
        self.file.write_all(&[0u8; PAGE_SIZE])?;
        self.file.sync_all()?;

        self.page_count += 1;
        Ok(page_id)
    }

    /// Release a page so a later `allocate_page` can hand it out again.
    ///
    /// Deallocating an already free page is a no-op.
    pub fn deallocate_page(&mut self, page_id: PageId) -> Result<()> {
        self.check_bounds(page_id)?;
        if self.free_pages.contains(&page_id) {
            return Ok(());
        }

        let mut tombstone = Page::new();
        tombstone.set_header(&PageHeader::new(PageType::Free));
        self.write_page(page_id, &tombstone)?;

        self.free_pages.push(page_id);
        debug!("deallocated {}", page_id);
        Ok(())
    }

    /// Number of pages in the file, free ones included.
    #[inline]
    pub fn page_count(&self) -> u32 {
        self.page_count
    }

    /// Number of deallocated pages waiting for reuse.
    #[inline]
    pub fn free_page_count(&self) -> usize {
        self.free_pages.len()
    }

    #[inline]
    pub fn file_size(&self) -> u64 {
        (self.page_count as u64) * (PAGE_SIZE as u64)
    }

    fn check_bounds(&self, page_id: PageId) -> Result<()> {
        if !page_id.is_valid() {
            return Err(Error::InvalidPageId(page_id.0));
        }
        if page_id.0 >= self.page_count {
            return Err(Error::PageNotFound(page_id.0));
        }
        Ok(())
    }

    fn rebuild_free_list(&mut self) -> Result<()> {
        let mut tag = [0u8; 1];
        for id in 0..self.page_count {
            let page_id = PageId::new(id);
            self.file.seek(SeekFrom::Start(
                Self::offset(page_id) + PageHeader::OFFSET_PAGE_TYPE as u64,
            ))?;
            self.file.read_exact(&mut tag)?;
            if PageType::from_u8(tag[0]) == PageType::Free {
                self.free_pages.push(page_id);
            }
        }
        Ok(())
    }

    #[inline]
    fn offset(page_id: PageId) -> u64 {
        (page_id.0 as u64) * (PAGE_SIZE as u64)
    }
}
