//! Error types for the heap module.

use std::fmt;

use super::page::SlotId;
use crate::storage::StorageError;

/// Errors from heap operations.
///
/// A page without room for a record is not an error; see
/// [`PageInsert::InsufficientSpace`](super::PageInsert::InsufficientSpace).
#[derive(Debug)]
pub enum HeapError {
    /// Slot id is not below the page's slot count.
    SlotOutOfRange {
        /// Requested slot.
        slot_id: SlotId,
        /// Number of slots on the page.
        slot_count: u16,
    },
    /// Slot directory entry points outside the page.
    SlotCorrupted {
        /// Slot whose entry is bad.
        slot_id: SlotId,
        /// Record offset stored in the entry.
        offset: u16,
        /// Record length stored in the entry.
        length: u16,
    },
    /// Footer claims more slots than the directory can hold.
    DirectoryCorrupted {
        /// Requested slot.
        slot_id: SlotId,
        /// Slot count read from the footer.
        slot_count: u16,
    },
    /// Record cannot fit even on an empty page.
    RecordTooLarge {
        /// Size of the rejected record.
        size: usize,
        /// Largest record a page can hold.
        max: usize,
    },
    /// Error from the page store.
    Storage(StorageError),
}

impl fmt::Display for HeapError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HeapError::SlotOutOfRange {
                slot_id,
                slot_count,
            } => {
                write!(
                    f,
                    "slot {} out of range: page has {} slots",
                    slot_id, slot_count
                )
            }
            HeapError::SlotCorrupted {
                slot_id,
                offset,
                length,
            } => {
                write!(
                    f,
                    "slot {} points outside the page: offset {}, length {}",
                    slot_id, offset, length
                )
            }
            HeapError::DirectoryCorrupted {
                slot_id,
                slot_count,
            } => {
                write!(
                    f,
                    "slot {} lies outside the page: footer claims {} slots",
                    slot_id, slot_count
                )
            }
            HeapError::RecordTooLarge { size, max } => {
                write!(
                    f,
                    "record too large: {} bytes, at most {} fit in a page",
                    size, max
                )
            }
            HeapError::Storage(err) => write!(f, "storage error: {}", err),
        }
    }
}

impl std::error::Error for HeapError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            HeapError::Storage(err) => Some(err),
            _ => None,
        }
    }
}

impl From<StorageError> for HeapError {
    fn from(err: StorageError) -> Self {
        HeapError::Storage(err)
    }
}
