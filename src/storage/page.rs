//! Page identifier, size constant, and owned page buffers.

/// 4KB page size. Every page in a heap file is exactly this long.
pub const PAGE_SIZE: usize = 4096;

/// An owned page image.
///
/// Boxed so that passing pages between the codec and the storage layer
/// moves a pointer instead of copying 4KB on the stack.
pub type PageBuf = Box<[u8; PAGE_SIZE]>;

/// Returns a zero-filled page image.
///
/// A zeroed page is a valid empty slotted page: `slot_count = 0` and
/// `free_space_offset = 0`.
pub fn empty_page() -> PageBuf {
    Box::new([0u8; PAGE_SIZE])
}

/// Identifier of a page within a heap file (its 0-based page number).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PageId(pub u64);

impl PageId {
    /// Creates a new PageId from a page number.
    pub const fn new(page_num: u64) -> Self {
        Self(page_num)
    }

    /// Returns the page number.
    pub const fn page_num(&self) -> u64 {
        self.0
    }

    /// Calculates the byte offset of this page in a heap file.
    pub const fn byte_offset(&self) -> u64 {
        self.0 * PAGE_SIZE as u64
    }
}

impl std::fmt::Display for PageId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_id_byte_offset() {
        assert_eq!(PageId::new(0).byte_offset(), 0);
        assert_eq!(PageId::new(1).byte_offset(), 4096);
        assert_eq!(PageId::new(100).byte_offset(), 409600);
    }

    #[test]
    fn test_page_id_ordering() {
        assert!(PageId::new(0) < PageId::new(1));
        assert!(PageId::new(1) < PageId::new(100));
        assert_eq!(PageId::new(42), PageId::new(42));
    }

    #[test]
    fn test_empty_page_is_zeroed() {
        let page = empty_page();
        assert_eq!(page.len(), PAGE_SIZE);
        assert!(page.iter().all(|&b| b == 0));
    }
}
