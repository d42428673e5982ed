//! Multi-page heap file.
//!
//! [`HeapFile`] places records into the first page with room for them, in
//! ascending page order, and appends a new page when every existing page is
//! full. It also guards the page store with checked page access.

use tracing::{debug, trace};

use super::error::HeapError;
use super::page::{HeapPage, MAX_RECORD_SIZE, PageInsert, RecordId};
use crate::storage::error::check_page_size;
use crate::storage::{PageBuf, PageId, Storage, StorageError, empty_page};

/// A heap file: an ordered sequence of slotted pages in a [`Storage`].
///
/// Page 0 is an ordinary data page; there is no file header. Inserting
/// takes `&mut self`, so only one writer can touch the file at a time. The
/// read/modify/write of a page during insertion is not otherwise atomic.
pub struct HeapFile<S: Storage> {
    storage: S,
}

impl<S: Storage> HeapFile<S> {
    /// Wraps a page store as a heap file.
    ///
    /// Any pages already in the store are treated as heap pages.
    pub fn new(storage: S) -> Self {
        Self { storage }
    }

    /// Returns the underlying page store.
    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Consumes the heap file and returns its page store.
    pub fn into_storage(self) -> S {
        self.storage
    }

    /// Returns the number of pages in the file.
    pub fn page_count(&self) -> u64 {
        self.storage.page_count()
    }

    fn check_page(&self, page_id: PageId) -> Result<(), StorageError> {
        if page_id.page_num() >= self.page_count() {
            return Err(StorageError::PageOutOfRange(page_id));
        }
        Ok(())
    }

    /// Reads a page.
    ///
    /// # Errors
    ///
    /// Returns `HeapError::Storage(StorageError::PageOutOfRange)` if the page
    /// does not exist.
    pub fn read_page(&self, page_id: PageId) -> Result<PageBuf, HeapError> {
        self.check_page(page_id)?;

        let mut page = empty_page();
        self.storage.read_page(page_id, &mut page[..])?;
        Ok(page)
    }

    /// Overwrites an existing page.
    ///
    /// # Errors
    ///
    /// Returns `HeapError::Storage(StorageError::InvalidPageSize)` if `data`
    /// is not exactly PAGE_SIZE bytes and
    /// `HeapError::Storage(StorageError::PageOutOfRange)` if the page does not
    /// exist. The file is unchanged on error.
    pub fn write_page(&mut self, page_id: PageId, data: &[u8]) -> Result<(), HeapError> {
        check_page_size(data)?;
        self.check_page(page_id)?;

        self.storage.write_page(page_id, data)?;
        Ok(())
    }

    /// Appends a page to the end of the file and returns its id.
    ///
    /// # Errors
    ///
    /// Returns `HeapError::Storage(StorageError::InvalidPageSize)` if `data`
    /// is not exactly PAGE_SIZE bytes. The file is unchanged on error.
    pub fn append_page(&mut self, data: &[u8]) -> Result<PageId, HeapError> {
        check_page_size(data)?;

        Ok(self.storage.append_page(data)?)
    }

    /// Inserts a record and returns where it was placed.
    ///
    /// Pages are tried from 0 upward and the record goes into the first one
    /// with room (first-fit). If none has room, a new page holding only this
    /// record is appended.
    ///
    /// # Errors
    ///
    /// Returns `HeapError::RecordTooLarge` if the record cannot fit even on
    /// an empty page. Nothing is read or written in that case.
    pub fn insert_record(&mut self, record: &[u8]) -> Result<RecordId, HeapError> {
        if record.len() > MAX_RECORD_SIZE {
            return Err(HeapError::RecordTooLarge {
                size: record.len(),
                max: MAX_RECORD_SIZE,
            });
        }

        for page_num in 0..self.page_count() {
            let page_id = PageId::new(page_num);
            let page = self.read_page(page_id)?;

            match HeapPage::new(&page[..]).with_record(record) {
                PageInsert::Inserted { page, slot_id } => {
                    self.write_page(page_id, &page[..])?;
                    debug!(page_id = page_num, slot_id, len = record.len(), "inserted record");
                    return Ok(RecordId::new(page_id, slot_id));
                }
                PageInsert::InsufficientSpace {
                    required,
                    available,
                } => {
                    trace!(page_id = page_num, required, available, "page full");
                }
            }
        }

        let empty = empty_page();
        match HeapPage::new(&empty[..]).with_record(record) {
            PageInsert::Inserted { page, slot_id } => {
                let page_id = self.append_page(&page[..])?;
                debug!(
                    page_id = page_id.page_num(),
                    slot_id,
                    len = record.len(),
                    "inserted record into new page"
                );
                Ok(RecordId::new(page_id, slot_id))
            }
            PageInsert::InsufficientSpace { .. } => Err(HeapError::RecordTooLarge {
                size: record.len(),
                max: MAX_RECORD_SIZE,
            }),
        }
    }

    /// Syncs the page store to disk.
    pub fn sync_all(&self) -> Result<(), HeapError> {
        Ok(self.storage.sync_all()?)
    }
}
