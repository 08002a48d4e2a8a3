//! Page identifier type.

use std::fmt;

/// Identifies a page on disk.
///
/// `u32` gives 4 billion pages (16TB with 4KB pages). Inside an internal
/// B+tree page a `PageId` is the child pointer half of every slot, stored
/// as 4 little-endian bytes.
///
/// # Example
/// ```
/// use pagetree::PageId;
///
/// let page_id = PageId::new(42);
/// assert!(page_id.is_valid());
/// assert_eq!(page_id.0, 42);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PageId(pub u32);

impl PageId {
    /// Invalid/sentinel page ID.
    ///
    /// The parent of a root page, or "no page".
    pub const INVALID: PageId = PageId(u32::MAX);

    /// Encoded width in bytes.
    pub const SIZE: usize = 4;

    /// Create a new PageId.
    #[inline]
    pub fn new(id: u32) -> Self {
        PageId(id)
    }

    /// Check if this page ID is valid (not the sentinel value).
    #[inline]
    pub fn is_valid(&self) -> bool {
        *self != Self::INVALID
    }

    /// Read a page ID from the first 4 bytes of `data`.
    #[inline]
    pub fn read_from(data: &[u8]) -> Self {
        PageId(u32::from_le_bytes([data[0], data[1], data[2], data[3]]))
    }

    /// Write this page ID into the first 4 bytes of `data`.
    #[inline]
    pub fn write_to(&self, data: &mut [u8]) {
        data[..Self::SIZE].copy_from_slice(&self.0.to_le_bytes());
    }
}

impl Default for PageId {
    fn default() -> Self {
        Self::INVALID
    }
}

impl fmt::Display for PageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if *self == Self::INVALID {
            write!(f, "Page(INVALID)")
        } else {
            write!(f, "Page({})", self.0)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_id_new() {
        let pid = PageId::new(42);
        assert_eq!(pid.0, 42);
        assert!(pid.is_valid());
    }

    #[test]
    fn test_page_id_invalid() {
        assert!(!PageId::INVALID.is_valid());
        assert_eq!(PageId::INVALID.0, u32::MAX);
        assert_eq!(PageId::default(), PageId::INVALID);
    }

    #[test]
    fn test_page_id_bytes() {
        let mut buf = [0u8; 6];
        PageId::new(0x0403_0201).write_to(&mut buf[1..]);
        assert_eq!(buf, [0, 1, 2, 3, 4, 0]);
        assert_eq!(PageId::read_from(&buf[1..]), PageId::new(0x0403_0201));
    }

    #[test]
    fn test_page_id_display() {
        assert_eq!(format!("{}", PageId::new(42)), "Page(42)");
        assert_eq!(format!("{}", PageId::INVALID), "Page(INVALID)");
    }
}
