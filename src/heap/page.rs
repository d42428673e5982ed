//! Heap page implementation using slotted page structure.
//!
//! A heap page packs variable-length records into a fixed 4KB page.
//! The page layout consists of:
//!
//! ```text
//! +------------------+ offset 0
//! | Records          | (grow upward from the start)
//! +------------------+ free_space_offset
//! | Free Space       |
//! +------------------+
//! | Slot Directory   | (grows downward toward the records)
//! +------------------+ offset 4092
//! | Footer (4B)      | slot_count, free_space_offset
//! +------------------+ offset 4096
//! ```
//!
//! Slot `i` lives at `[4092 - 4(i+1), 4092 - 4i)`. All integers in the
//! footer and the directory are big-endian u16. A zero-filled page is a
//! valid empty page.

use std::fmt;
use std::ops::Range;

use bytes::{Buf, BufMut};

use super::error::HeapError;
use crate::storage::{PAGE_SIZE, PageBuf, PageId, empty_page};

/// Size of the page footer in bytes.
pub const FOOTER_SIZE: usize = 4;

/// Size of each slot entry in bytes.
pub const SLOT_SIZE: usize = 4;

/// Maximum record size that can fit in a single page.
///
/// This accounts for the footer and the record's own slot entry.
pub const MAX_RECORD_SIZE: usize = PAGE_SIZE - FOOTER_SIZE - SLOT_SIZE;

/// Slot identifier within a page.
pub type SlotId = u16;

/// A slot entry in the slot directory.
///
/// Layout (4 bytes, big-endian):
/// - `offset`: u16, start of the record from the start of the page
/// - `length`: u16, record length
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlotEntry {
    /// Offset to record data from start of page.
    pub offset: u16,
    /// Length of record in bytes.
    pub length: u16,
}

impl SlotEntry {
    /// Creates a slot entry for a record.
    pub const fn new(offset: u16, length: u16) -> Self {
        Self { offset, length }
    }

    /// Reads a slot entry from bytes.
    pub fn read_from(mut data: &[u8]) -> Self {
        let offset = data.get_u16();
        let length = data.get_u16();
        Self { offset, length }
    }

    /// Writes a slot entry to bytes.
    pub fn write_to(&self, mut data: &mut [u8]) {
        data.put_u16(self.offset);
        data.put_u16(self.length);
    }

    /// Byte range of the record this slot points to.
    pub fn range(&self) -> Range<usize> {
        let start = self.offset as usize;
        start..start + self.length as usize
    }
}

/// The 4-byte footer at the end of every page.
///
/// Layout (big-endian):
/// - `slot_count`: u16 at `[PAGE_SIZE-4, PAGE_SIZE-2)`
/// - `free_space_offset`: u16 at `[PAGE_SIZE-2, PAGE_SIZE)`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PageFooter {
    /// Number of entries in the slot directory.
    pub slot_count: u16,
    /// First byte after the last record payload.
    pub free_space_offset: u16,
}

impl PageFooter {
    /// Reads a footer from its 4 bytes.
    pub fn read_from(mut data: &[u8]) -> Self {
        let slot_count = data.get_u16();
        let free_space_offset = data.get_u16();
        Self {
            slot_count,
            free_space_offset,
        }
    }

    /// Writes the footer to its 4 bytes.
    pub fn write_to(&self, mut data: &mut [u8]) {
        data.put_u16(self.slot_count);
        data.put_u16(self.free_space_offset);
    }

    /// Bytes between the end of the records and the start of the slot
    /// directory.
    ///
    /// A footer whose fields overlap reports 0 rather than underflowing.
    pub fn free_space(&self) -> usize {
        let used = self.free_space_offset as usize
            + FOOTER_SIZE
            + self.slot_count as usize * SLOT_SIZE;
        PAGE_SIZE.saturating_sub(used)
    }
}

/// Global identifier for a record (page + slot).
///
/// Ordering is `(page_id, slot_id)` lexicographic, which is the order a
/// full-file scan yields records in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RecordId {
    /// Page containing the record.
    pub page_id: PageId,
    /// Slot within the page.
    pub slot_id: SlotId,
}

impl RecordId {
    /// Creates a new record identifier.
    pub fn new(page_id: PageId, slot_id: SlotId) -> Self {
        Self { page_id, slot_id }
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.page_id, self.slot_id)
    }
}

/// Outcome of trying to add a record to a page.
#[must_use]
#[derive(Debug)]
pub enum PageInsert {
    /// The record fit. `page` is the new page image; the source page is
    /// untouched.
    Inserted {
        /// Page image containing the new record.
        page: PageBuf,
        /// Slot the record was assigned.
        slot_id: SlotId,
    },
    /// The page cannot hold the record. Try another page.
    InsufficientSpace {
        /// Bytes needed for the record plus its slot.
        required: usize,
        /// Free bytes on the page.
        available: usize,
    },
}

/// Byte offset of slot `slot_id` in the directory, or `None` if the slot
/// would start before the beginning of the page.
fn slot_position(slot_id: SlotId) -> Option<usize> {
    (PAGE_SIZE - FOOTER_SIZE).checked_sub((slot_id as usize + 1) * SLOT_SIZE)
}

/// A heap page for storing variable-length records.
///
/// This struct reads the slotted layout out of a page buffer. It never
/// writes to the buffer it wraps: [`with_record`](Self::with_record) returns
/// a fresh page image instead.
///
/// The type parameter `T` allows this to wrap:
/// - `&[u8]` - borrowed view
/// - `Vec<u8>` - owned data
/// - Any type implementing `AsRef<[u8]>`
///
/// # Example
///
/// ```
/// use heapfile::heap::{HeapPage, PageInsert};
/// use heapfile::storage::empty_page;
///
/// let data = empty_page();
/// let page = HeapPage::new(&data[..]);
///
/// let PageInsert::Inserted { page: image, slot_id } = page.with_record(b"hello world") else {
///     panic!("an empty page has room");
/// };
/// let page = HeapPage::new(&image[..]);
/// assert_eq!(page.read(slot_id).unwrap(), b"hello world");
/// ```
pub struct HeapPage<T> {
    data: T,
}

impl<T: AsRef<[u8]>> HeapPage<T> {
    /// Creates a new HeapPage view over the given data.
    ///
    /// # Panics
    ///
    /// Panics if `data.as_ref().len() != PAGE_SIZE`.
    pub fn new(data: T) -> Self {
        assert_eq!(
            data.as_ref().len(),
            PAGE_SIZE,
            "HeapPage requires exactly {} bytes, got {}",
            PAGE_SIZE,
            data.as_ref().len()
        );
        Self { data }
    }

    /// Returns a reference to the underlying data.
    fn data(&self) -> &[u8] {
        self.data.as_ref()
    }

    /// Returns the page footer.
    pub fn footer(&self) -> PageFooter {
        PageFooter::read_from(&self.data()[PAGE_SIZE - FOOTER_SIZE..])
    }

    /// Returns the number of slots on this page.
    pub fn slot_count(&self) -> u16 {
        self.footer().slot_count
    }

    /// Returns the offset of the first free byte after the records.
    pub fn free_space_offset(&self) -> u16 {
        self.footer().free_space_offset
    }

    /// Returns the free space between the records and the slot directory.
    pub fn free_space(&self) -> usize {
        self.footer().free_space()
    }

    /// Returns the slot entry at the given index.
    ///
    /// # Errors
    ///
    /// Returns `HeapError::SlotOutOfRange` if `slot_id >= slot_count`.
    pub fn slot(&self, slot_id: SlotId) -> Result<SlotEntry, HeapError> {
        let slot_count = self.slot_count();
        if slot_id >= slot_count {
            return Err(HeapError::SlotOutOfRange {
                slot_id,
                slot_count,
            });
        }

        let offset = slot_position(slot_id).ok_or(HeapError::DirectoryCorrupted {
            slot_id,
            slot_count,
        })?;
        Ok(SlotEntry::read_from(&self.data()[offset..offset + SLOT_SIZE]))
    }

    /// Reads a record by slot ID.
    ///
    /// # Errors
    ///
    /// Returns `HeapError::SlotOutOfRange` if `slot_id >= slot_count`,
    /// `HeapError::SlotCorrupted` if the slot points past the end of the page,
    /// and `HeapError::DirectoryCorrupted` if the slot itself would sit
    /// outside the page.
    pub fn read(&self, slot_id: SlotId) -> Result<&[u8], HeapError> {
        let slot = self.slot(slot_id)?;
        let range = slot.range();
        if range.end > PAGE_SIZE {
            return Err(HeapError::SlotCorrupted {
                slot_id,
                offset: slot.offset,
                length: slot.length,
            });
        }
        Ok(&self.data()[range])
    }

    /// Returns an iterator over every record in ascending slot order.
    pub fn records(&self) -> impl Iterator<Item = Result<(SlotId, &[u8]), HeapError>> {
        (0..self.slot_count()).map(move |slot_id| self.read(slot_id).map(|data| (slot_id, data)))
    }

    /// Builds a copy of this page with `record` appended.
    ///
    /// The record is copied to `free_space_offset`, slot `slot_count` is
    /// written as `(free_space_offset, len)`, and the footer is advanced.
    /// Returns `PageInsert::InsufficientSpace` when `len + SLOT_SIZE`
    /// exceeds [`free_space`](Self::free_space); nothing is written in that
    /// case.
    pub fn with_record(&self, record: &[u8]) -> PageInsert {
        let footer = self.footer();
        let required = record.len() + SLOT_SIZE;
        let available = footer.free_space();
        if required > available {
            return PageInsert::InsufficientSpace {
                required,
                available,
            };
        }

        let mut page = empty_page();
        page.copy_from_slice(self.data());

        // Write record data
        let start = footer.free_space_offset as usize;
        let end = start + record.len();
        page[start..end].copy_from_slice(record);

        // The free-space check guarantees the new slot sits at or after `end`
        let slot_id = footer.slot_count;
        let slot_offset = PAGE_SIZE - FOOTER_SIZE - (slot_id as usize + 1) * SLOT_SIZE;
        SlotEntry::new(start as u16, record.len() as u16)
            .write_to(&mut page[slot_offset..slot_offset + SLOT_SIZE]);

        PageFooter {
            slot_count: slot_id + 1,
            free_space_offset: end as u16,
        }
        .write_to(&mut page[PAGE_SIZE - FOOTER_SIZE..]);

        PageInsert::Inserted { page, slot_id }
    }
}
