//! Page I/O backend implementations.
//!
//! This module provides the `Storage` trait for page-based I/O operations,
//! along with MemoryStorage and FileStorage implementations.

mod file;
mod memory;

pub use file::{FileStorage, StorageOptions};
pub use memory::MemoryStorage;

use super::page::PageId;
use crate::storage::error::StorageError;

/// Page I/O backend trait for page-based storage.
///
/// This trait defines the interface for reading, overwriting, and appending
/// 4KB pages using caller-owned buffers. Implementations include:
/// - `io::MemoryStorage`: In-memory storage
/// - `io::FileStorage`: Disk-backed storage in a single flat file
///
/// # Design Decisions
///
/// 1. **Synchronous**: Every call completes before it returns. The heap file
///    layer issues one operation at a time.
///
/// 2. **Caller-owned buffers**: Storage reads and writes raw bytes only. It
///    never interprets the slotted-page footer.
///
/// 3. **Checked preconditions**: A wrong-sized buffer or an out-of-range page
///    number is rejected before anything is touched. A failed call leaves
///    the store unchanged.
///
/// 4. **Append-only growth**: `append_page()` is the only way to add a page.
///    Pages are never removed.
///
/// # Thread Safety
///
/// Implementations are `Send + Sync` and serialize individual calls
/// internally. Nothing makes a read/modify/write sequence atomic; callers
/// that need that must serialize access themselves.
pub trait Storage: Send + Sync {
    /// Reads a page into caller-provided buffer.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::PageOutOfRange` if `page_id >= page_count()`.
    /// Returns `StorageError::InvalidPageSize` if `buf.len() != PAGE_SIZE`.
    fn read_page(&self, page_id: PageId, buf: &mut [u8]) -> Result<(), StorageError>;

    /// Overwrites an existing page in place.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::PageOutOfRange` if `page_id >= page_count()`.
    /// Returns `StorageError::InvalidPageSize` if `buf.len() != PAGE_SIZE`.
    fn write_page(&self, page_id: PageId, buf: &[u8]) -> Result<(), StorageError>;

    /// Appends a page holding `buf` and returns its PageId.
    ///
    /// The first append on an empty store returns `PageId(0)`; each later
    /// append returns the next page number.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::InvalidPageSize` if `buf.len() != PAGE_SIZE`.
    fn append_page(&self, buf: &[u8]) -> Result<PageId, StorageError>;

    /// Returns the number of pages currently stored.
    fn page_count(&self) -> u64;

    /// Syncs all pending writes to physical disk (fsync).
    ///
    /// For io::MemoryStorage, this is a no-op.
    fn sync_all(&self) -> Result<(), StorageError>;
}
