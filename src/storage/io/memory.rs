//! In-memory page storage implementation.

use parking_lot::Mutex;

use super::Storage;
use crate::storage::error::{StorageError, check_page_size};
use crate::storage::page::{PAGE_SIZE, PageBuf, PageId, empty_page};

/// In-memory page storage for testing and scratch heap files.
///
/// Stores pages in a Vec of boxed page images. PageIds are assigned
/// sequentially as Vec indices.
pub struct MemoryStorage {
    pages: Mutex<Vec<PageBuf>>,
}

impl Default for MemoryStorage {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStorage {
    /// Creates a new empty in-memory storage.
    pub fn new() -> Self {
        Self {
            pages: Mutex::new(Vec::new()),
        }
    }
}

impl Storage for MemoryStorage {
    fn read_page(&self, page_id: PageId, buf: &mut [u8]) -> Result<(), StorageError> {
        check_page_size(buf)?;

        let pages = self.pages.lock();
        let page = pages
            .get(page_id.page_num() as usize)
            .ok_or(StorageError::PageOutOfRange(page_id))?;

        buf.copy_from_slice(page.as_slice());
        Ok(())
    }

    fn write_page(&self, page_id: PageId, buf: &[u8]) -> Result<(), StorageError> {
        check_page_size(buf)?;

        let mut pages = self.pages.lock();
        let page = pages
            .get_mut(page_id.page_num() as usize)
            .ok_or(StorageError::PageOutOfRange(page_id))?;

        page.copy_from_slice(buf);
        Ok(())
    }

    fn append_page(&self, buf: &[u8]) -> Result<PageId, StorageError> {
        check_page_size(buf)?;

        let mut page = empty_page();
        page.copy_from_slice(&buf[..PAGE_SIZE]);

        let mut pages = self.pages.lock();
        let page_id = PageId::new(pages.len() as u64);
        pages.push(page);
        Ok(page_id)
    }

    fn page_count(&self) -> u64 {
        self.pages.lock().len() as u64
    }

    fn sync_all(&self) -> Result<(), StorageError> {
        // Nothing to flush
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::super::tests as generic;
    use super::*;

    // === Generic tests ===

    #[test]
    fn test_basic_operations() {
        generic::test_basic_operations(MemoryStorage::new());
    }

    #[test]
    fn test_page_size_validation() {
        generic::test_page_size_validation(MemoryStorage::new());
    }

    #[test]
    fn test_page_out_of_range() {
        generic::test_page_out_of_range(MemoryStorage::new());
    }

    // === MemoryStorage-specific tests ===

    #[test]
    fn test_rejected_append_leaves_store_unchanged() {
        let storage = MemoryStorage::new();
        let mut buf = [0u8; PAGE_SIZE];
        buf[0..4].copy_from_slice(&[1, 2, 3, 4]);
        let page_id = storage.append_page(&buf).unwrap();

        let result = storage.append_page(&[9u8; PAGE_SIZE + 1]);
        assert!(matches!(
            result,
            Err(StorageError::InvalidPageSize { actual, .. }) if actual == PAGE_SIZE + 1
        ));
        assert_eq!(storage.page_count(), 1);

        let mut read_buf = [0u8; PAGE_SIZE];
        storage.read_page(page_id, &mut read_buf).unwrap();
        assert_eq!(&read_buf[0..4], &[1, 2, 3, 4]);
        assert!(read_buf[4..].iter().all(|&b| b == 0));
    }

    #[test]
    fn test_shared_across_threads() {
        let storage = std::sync::Arc::new(MemoryStorage::new());
        for _ in 0..4 {
            storage.append_page(&[0u8; PAGE_SIZE]).unwrap();
        }

        let handles: Vec<_> = (0..4u8)
            .map(|i| {
                let storage = storage.clone();
                std::thread::spawn(move || {
                    storage
                        .write_page(PageId::new(i as u64), &[i; PAGE_SIZE])
                        .unwrap();
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        for i in 0..4u8 {
            generic::verify_filled(storage.as_ref(), PageId::new(i as u64), i);
        }
    }
}
