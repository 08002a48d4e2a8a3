//! Page header and type definitions.
//!
//! Every page starts with a [`PageHeader`]: the [`PageType`] tag used for
//! checked downcasts, a CRC32 checksum, and an LSN slot.

/// Type of page stored on disk.
///
/// `#[repr(u8)]` keeps the tag one byte wide on disk.
#[repr(u8)]
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum PageType {
    /// Uninitialized or corrupted page.
    #[default]
    Invalid = 0,
    /// Untyped data page.
    Data = 1,
    /// B+tree internal (non-leaf) node.
    BTreeInternal = 2,
    /// B+tree leaf node.
    BTreeLeaf = 3,
    /// Deallocated page waiting for reuse.
    Free = 4,
}

impl PageType {
    /// Convert from u8, returning Invalid for unknown values.
    pub fn from_u8(value: u8) -> Self {
        match value {
            1 => PageType::Data,
            2 => PageType::BTreeInternal,
            3 => PageType::BTreeLeaf,
            4 => PageType::Free,
            _ => PageType::Invalid,
        }
    }

    /// Whether pages of this type carry a checksum worth verifying.
    pub fn is_checksummed(self) -> bool {
        !matches!(self, PageType::Invalid)
    }
}

/// Metadata stored at the beginning of every page.
///
/// # Layout (13 bytes)
/// ```text
/// Offset  Size  Field
/// ------  ----  -----
/// 0       1     page_type (PageType as u8)
/// 1       4     checksum (CRC32, little-endian)
/// 5       8     lsn (Log Sequence Number, little-endian)
/// ```
///
/// The checksum covers the whole page with the checksum field read as zero.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct PageHeader {
    pub page_type: PageType,
    pub checksum: u32,
    pub lsn: u64,
}

impl PageHeader {
    /// Size of the header in bytes.
    pub const SIZE: usize = 13;

    pub const OFFSET_PAGE_TYPE: usize = 0;
    pub const OFFSET_CHECKSUM: usize = 1;
    pub const OFFSET_LSN: usize = 5;

    /// Create a new header with the given page type.
    pub fn new(page_type: PageType) -> Self {
        Self {
            page_type,
            checksum: 0,
            lsn: 0,
        }
    }

    /// Read a header from the beginning of a byte slice.
    ///
    /// # Panics
    /// Panics if `data.len() < PageHeader::SIZE`.
    pub fn from_bytes(data: &[u8]) -> Self {
        assert!(data.len() >= Self::SIZE, "buffer too small for PageHeader");

        let mut checksum = [0u8; 4];
        checksum.copy_from_slice(&data[Self::OFFSET_CHECKSUM..Self::OFFSET_CHECKSUM + 4]);
        let mut lsn = [0u8; 8];
        lsn.copy_from_slice(&data[Self::OFFSET_LSN..Self::OFFSET_LSN + 8]);

        Self {
            page_type: PageType::from_u8(data[Self::OFFSET_PAGE_TYPE]),
            checksum: u32::from_le_bytes(checksum),
            lsn: u64::from_le_bytes(lsn),
        }
    }

    /// Write this header to the beginning of a byte slice.
    ///
    /// # Panics
    /// Panics if `data.len() < PageHeader::SIZE`.
    pub fn write_to(&self, data: &mut [u8]) {
        assert!(data.len() >= Self::SIZE, "buffer too small for PageHeader");

        data[Self::OFFSET_PAGE_TYPE] = self.page_type as u8;
        data[Self::OFFSET_CHECKSUM..Self::OFFSET_CHECKSUM + 4]
            .copy_from_slice(&self.checksum.to_le_bytes());
        data[Self::OFFSET_LSN..Self::OFFSET_LSN + 8].copy_from_slice(&self.lsn.to_le_bytes());
    }

    /// CRC32 of a full page, with the checksum field fed as zeros.
    pub fn compute_checksum(page_data: &[u8]) -> u32 {
        let mut hasher = crc32fast::Hasher::new();
        hasher.update(&page_data[..Self::OFFSET_CHECKSUM]);
        hasher.update(&[0u8; 4]);
        hasher.update(&page_data[Self::OFFSET_CHECKSUM + 4..]);
        hasher.finalize()
    }

    /// Check the stored checksum against the page contents.
    pub fn verify_checksum(&self, page_data: &[u8]) -> bool {
        self.checksum == Self::compute_checksum(page_data)
    }
}
