//! Record lookup and full-file scans.
//!
//! Records are addressed by [`RecordId`]. A full scan walks pages in
//! ascending page number and slots in ascending slot id, so its order is
//! `(page_id, slot_id)` lexicographic and the same on every pass.

use std::vec;

use super::error::HeapError;
use super::file::HeapFile;
use super::page::{HeapPage, RecordId, SlotId};
use crate::storage::{PAGE_SIZE, PageId, Storage};

/// Returns every record on a page in ascending slot order.
pub fn records_on_page(page: &[u8; PAGE_SIZE]) -> Result<Vec<Vec<u8>>, HeapError> {
    HeapPage::new(page)
        .records()
        .map(|record| record.map(|(_, data)| data.to_vec()))
        .collect()
}

impl<S: Storage> HeapFile<S> {
    /// Reads one record.
    ///
    /// # Errors
    ///
    /// Returns `HeapError::Storage(StorageError::PageOutOfRange)` for a
    /// missing page and `HeapError::SlotOutOfRange` for a missing slot.
    pub fn get_record(&self, page_id: PageId, slot_id: SlotId) -> Result<Vec<u8>, HeapError> {
        let page = self.read_page(page_id)?;
        let view = HeapPage::new(&page[..]);
        let data = view.read(slot_id)?;
        Ok(data.to_vec())
    }

    /// Returns a scanner over every record in the file.
    pub fn scan(&self) -> HeapScan<'_, S> {
        HeapScan::new(self)
    }

    /// Collects every record in the file in `(page_id, slot_id)` order.
    ///
    /// NOTE: This loads the entire file into memory. Prefer [`scan`](Self::scan)
    /// for large files.
    pub fn get_all_records(&self) -> Result<Vec<Vec<u8>>, HeapError> {
        self.scan()
            .map(|record| record.map(|(_, data)| data))
            .collect()
    }
}

/// Iterator over all records of a heap file.
///
/// Reads one page at a time and yields its records before moving on. The
/// page count is fixed when the scan starts; the shared borrow of the file
/// keeps it from growing underneath the scan. After an error the scan
/// yields `None`.
pub struct HeapScan<'a, S: Storage> {
    file: &'a HeapFile<S>,
    next_page: u64,
    page_count: u64,
    current: vec::IntoIter<(RecordId, Vec<u8>)>,
    failed: bool,
}

impl<'a, S: Storage> HeapScan<'a, S> {
    /// Creates a scanner starting at page 0.
    pub fn new(file: &'a HeapFile<S>) -> Self {
        Self {
            file,
            next_page: 0,
            page_count: file.page_count(),
            current: Vec::new().into_iter(),
            failed: false,
        }
    }

    /// Reads the next page and returns all records on it.
    ///
    /// Returns `Ok(None)` when every page has been read. Empty pages yield
    /// `Ok(Some(vec![]))`.
    pub fn next_page(&mut self) -> Result<Option<Vec<(RecordId, Vec<u8>)>>, HeapError> {
        if self.next_page >= self.page_count {
            return Ok(None);
        }

        let page_id = PageId::new(self.next_page);
        self.next_page += 1;

        let page = self.file.read_page(page_id)?;
        let records = HeapPage::new(&page[..])
            .records()
            .map(|record| {
                record.map(|(slot_id, data)| (RecordId::new(page_id, slot_id), data.to_vec()))
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Some(records))
    }
}

impl<S: Storage> Iterator for HeapScan<'_, S> {
    type Item = Result<(RecordId, Vec<u8>), HeapError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if self.failed {
                return None;
            }
            if let Some(record) = self.current.next() {
                return Some(Ok(record));
            }

            match self.next_page() {
                Ok(Some(records)) => self.current = records.into_iter(),
                Ok(None) => return None,
                Err(e) => {
                    self.failed = true;
                    return Some(Err(e));
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::heap::page::MAX_RECORD_SIZE;
    use crate::storage::{MemoryStorage, StorageError, empty_page};

    fn heap_with(records: &[&[u8]]) -> HeapFile<MemoryStorage> {
        let mut heap = HeapFile::new(MemoryStorage::new());
        for record in records {
            heap.insert_record(record).unwrap();
        }
        heap
    }

    #[test]
    fn test_get_record() {
        let heap = heap_with(&[b"HELLO", b"WORLD", b"HiGuys"]);

        assert_eq!(heap.get_record(PageId::new(0), 0).unwrap(), b"HELLO");
        assert_eq!(heap.get_record(PageId::new(0), 1).unwrap(), b"WORLD");
        assert_eq!(heap.get_record(PageId::new(0), 2).unwrap(), b"HiGuys");
    }

    #[test]
    fn test_get_record_errors() {
        let heap = heap_with(&[b"one"]);

        assert!(matches!(
            heap.get_record(PageId::new(0), 1),
            Err(HeapError::SlotOutOfRange {
                slot_id: 1,
                slot_count: 1
            })
        ));
        assert!(matches!(
            heap.get_record(PageId::new(3), 0),
            Err(HeapError::Storage(StorageError::PageOutOfRange(PageId(3))))
        ));
    }

    #[test]
    fn test_records_on_page() {
        let heap = heap_with(&[b"a", b"bb", b"ccc"]);
        let page = heap.read_page(PageId::new(0)).unwrap();

        let records = records_on_page(&page).unwrap();
        assert_eq!(records, vec![b"a".to_vec(), b"bb".to_vec(), b"ccc".to_vec()]);
        assert_eq!(records_on_page(&page).unwrap(), records);

        assert!(records_on_page(&empty_page()).unwrap().is_empty());
    }

    #[test]
    fn test_empty_file() {
        let heap = HeapFile::new(MemoryStorage::new());
        assert!(heap.get_all_records().unwrap().is_empty());
        assert_eq!(heap.scan().count(), 0);
    }

    #[test]
    fn test_scan_spans_pages_in_order() {
        let big = vec![b'x'; MAX_RECORD_SIZE - 100];
        let heap = heap_with(&[&big, b"p0s1", &big, b"p0s2"]);
        assert_eq!(heap.page_count(), 2);

        let ids: Vec<_> = heap.scan().map(|r| r.unwrap().0).collect();
        assert_eq!(
            ids,
            vec![
                RecordId::new(PageId::new(0), 0),
                RecordId::new(PageId::new(0), 1),
                RecordId::new(PageId::new(0), 2),
                RecordId::new(PageId::new(1), 0),
            ]
        );
        let mut sorted = ids.clone();
        sorted.sort();
        assert_eq!(ids, sorted);

        let all = heap.get_all_records().unwrap();
        assert_eq!(all, vec![big.clone(), b"p0s1".to_vec(), b"p0s2".to_vec(), big]);
    }

    #[test]
    fn test_scan_skips_empty_pages() {
        let mut heap = HeapFile::new(MemoryStorage::new());
        heap.append_page(&[0u8; PAGE_SIZE]).unwrap();
        heap.append_page(&[0u8; PAGE_SIZE]).unwrap();
        heap.insert_record(b"first").unwrap();

        let mut scan = heap.scan();
        assert_eq!(scan.next_page().unwrap().map(|r| r.len()), Some(1));
        assert_eq!(scan.next_page().unwrap().map(|r| r.len()), Some(0));
        assert!(scan.next_page().unwrap().is_none());

        assert_eq!(heap.get_all_records().unwrap(), vec![b"first".to_vec()]);
    }

    #[test]
    fn test_scan_stops_after_error() {
        let mut heap = HeapFile::new(MemoryStorage::new());
        heap.insert_record(b"ok").unwrap();

        // A second page whose only slot points past the end of the page
        let mut bad = empty_page();
        bad[4088..4096].copy_from_slice(&[0x0F, 0xF0, 0x01, 0x00, 0x00, 0x01, 0x00, 0x00]);
        heap.append_page(&bad[..]).unwrap();

        let mut scan = heap.scan();
        assert_eq!(scan.next().unwrap().unwrap().1, b"ok");
        assert!(matches!(
            scan.next(),
            Some(Err(HeapError::SlotCorrupted {
                slot_id: 0,
                offset: 4080,
                length: 256
            }))
        ));
        assert!(scan.next().is_none());
    }
}
