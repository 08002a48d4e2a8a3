//! Error types for pagetree.
//!
//! Only runtime-recoverable conditions live here. Broken preconditions on
//! page operations (slot index out of range, populating a non-empty root,
//! merging into a page that cannot hold the result) are programming errors
//! and panic instead.

use thiserror::Error;

use crate::storage::page::PageType;

/// Convenient Result type alias.
pub type Result<T> = std::result::Result<T, Error>;

/// All errors surfaced by the storage, buffer and index layers.
#[derive(Debug, Error)]
pub enum Error {
    /// I/O error from disk operations.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Requested page does not exist on disk.
    #[error("Page {0} not found")]
    PageNotFound(u32),

    /// Buffer pool has no free frames and cannot evict any pages.
    ///
    /// This happens when all frames are pinned.
    #[error("No free frames available in buffer pool")]
    NoFreeFrames,

    /// The provided page ID is invalid (e.g. the INVALID sentinel).
    #[error("Invalid page ID: {0}")]
    InvalidPageId(u32),

    /// Attempted to delete a page that is still pinned.
    #[error("Page {0} is still pinned")]
    PagePinned(u32),

    /// Stored CRC32 does not match the page contents read from disk.
    #[error("Checksum mismatch on page {0}")]
    ChecksumMismatch(u32),

    /// The buffer pool could not supply a page an index operation needed.
    ///
    /// Raised instead of [`Error::NoFreeFrames`] by the index fetch helpers
    /// and child traversal, naming the page that could not be brought in.
    #[error("Page {0} unavailable: every buffer frame is pinned")]
    PageUnavailable(u32),

    /// A page was opened as a different kind than its header records.
    #[error("Page {page_id} has type {found:?}, expected {expected:?}")]
    PageTypeMismatch {
        page_id: u32,
        expected: PageType,
        found: PageType,
    },

    /// A page header holds values that cannot describe a valid page.
    #[error("Page {page_id} is corrupted: {reason}")]
    CorruptedPage { page_id: u32, reason: String },
}

impl Error {
    /// Translate pool exhaustion into [`Error::PageUnavailable`] for `page_id`.
    ///
    /// Every other error passes through unchanged.
    pub fn unavailable(self, page_id: u32) -> Self {
        match self {
            Error::NoFreeFrames => Error::PageUnavailable(page_id),
            other => other,
        }
    }
}
