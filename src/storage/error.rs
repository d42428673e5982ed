//! Storage layer errors.

use crate::storage::PageId;

/// Storage layer errors.
#[derive(Debug)]
pub enum StorageError {
    /// Requested page is not within `[0, page_count)`.
    PageOutOfRange(PageId),

    /// A page buffer passed to read, write, or append is not exactly
    /// PAGE_SIZE bytes.
    InvalidPageSize {
        /// Expected buffer size (PAGE_SIZE)
        expected: usize,
        /// Actual buffer size provided
        actual: usize,
    },

    /// I/O error from underlying file system.
    Io(std::io::Error),

    /// The backing file is not a valid heap file.
    ///
    /// Raised when the file length is not a multiple of PAGE_SIZE.
    Corrupted(String),
}

impl std::fmt::Display for StorageError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StorageError::PageOutOfRange(id) => write!(f, "page {} does not exist", id),
            StorageError::InvalidPageSize { expected, actual } => {
                write!(f, "invalid page size: expected {}, got {}", expected, actual)
            }
            StorageError::Io(e) => write!(f, "I/O error: {}", e),
            StorageError::Corrupted(msg) => write!(f, "data corruption: {}", msg),
        }
    }
}

impl std::error::Error for StorageError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            StorageError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for StorageError {
    fn from(e: std::io::Error) -> Self {
        StorageError::Io(e)
    }
}

/// Validates that `buf` is exactly one page long.
pub(crate) fn check_page_size(buf: &[u8]) -> Result<(), StorageError> {
    if buf.len() != crate::storage::PAGE_SIZE {
        return Err(StorageError::InvalidPageSize {
            expected: crate::storage::PAGE_SIZE,
            actual: buf.len(),
        });
    }
    Ok(())
}
