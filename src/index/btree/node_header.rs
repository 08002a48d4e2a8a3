//! B+tree node header.
//!
//! Follows the common [`PageHeader`] on every B+tree page:
//!
//! ```text
//! offset  size  field
//! ------  ----  --------------
//!     13     4  size
//!     17     4  max_size
//!     21     4  page_id
//!     25     4  parent_page_id
//! ```
//!
//! All integers are little-endian.

use crate::common::PageId;
use crate::storage::page::PageHeader;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BTreePageHeader {
    /// Occupied slots.
    pub size: u32,
    /// Slot count at which the node must split.
    pub max_size: u32,
    pub page_id: PageId,
    /// `PageId::INVALID` on the root.
    pub parent_page_id: PageId,
}

impl BTreePageHeader {
    /// Size of the node header in bytes.
    pub const SIZE: usize = 16;

    pub const OFFSET_SIZE: usize = PageHeader::SIZE;
    pub const OFFSET_MAX_SIZE: usize = PageHeader::SIZE + 4;
    pub const OFFSET_PAGE_ID: usize = PageHeader::SIZE + 8;
    pub const OFFSET_PARENT_PAGE_ID: usize = PageHeader::SIZE + 12;

    /// Read the node header from a full page image.
    pub fn from_bytes(page_data: &[u8]) -> Self {
        Self {
            size: read_u32(page_data, Self::OFFSET_SIZE),
            max_size: read_u32(page_data, Self::OFFSET_MAX_SIZE),
            page_id: PageId::read_from(&page_data[Self::OFFSET_PAGE_ID..]),
            parent_page_id: PageId::read_from(&page_data[Self::OFFSET_PARENT_PAGE_ID..]),
        }
    }

    /// Write the node header into a full page image.
    pub fn write_to(&self, page_data: &mut [u8]) {
        write_u32(page_data, Self::OFFSET_SIZE, self.size);
        write_u32(page_data, Self::OFFSET_MAX_SIZE, self.max_size);
        self.page_id
            .write_to(&mut page_data[Self::OFFSET_PAGE_ID..]);
        self.parent_page_id
            .write_to(&mut page_data[Self::OFFSET_PARENT_PAGE_ID..]);
    }
}

#[inline]
pub(crate) fn read_u32(data: &[u8], offset: usize) -> u32 {
    let mut buf = [0u8; 4];
    buf.copy_from_slice(&data[offset..offset + 4]);
    u32::from_le_bytes(buf)
}

#[inline]
pub(crate) fn write_u32(data: &mut [u8], offset: usize, value: u32) {
    data[offset..offset + 4].copy_from_slice(&value.to_le_bytes());
}
