//! File-backed storage implementation.

use std::fs::{File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::Mutex;
use tracing::{debug, info};

use super::Storage;
use crate::storage::error::{StorageError, check_page_size};
use crate::storage::page::{PAGE_SIZE, PageId};

/// Options for opening a heap file.
///
/// # Example
///
/// ```no_run
/// use heapfile::storage::{FileStorage, StorageOptions};
///
/// let options = StorageOptions::new().create(true).sync_on_write(true);
/// let storage = FileStorage::open_with("heap.bin", &options).unwrap();
/// ```
#[derive(Debug, Clone)]
pub struct StorageOptions {
    /// Create the file if it doesn't exist.
    pub(crate) create: bool,
    /// Discard any existing pages.
    pub(crate) truncate: bool,
    /// Call `sync_data` after every write and append.
    pub(crate) sync_on_write: bool,
}

impl Default for StorageOptions {
    fn default() -> Self {
        Self::new()
    }
}

impl StorageOptions {
    /// Creates options that open an existing file, creating it if missing.
    #[must_use]
    pub fn new() -> Self {
        Self {
            create: true,
            truncate: false,
            sync_on_write: false,
        }
    }

    /// Sets whether a missing file is created.
    #[must_use]
    pub fn create(mut self, create: bool) -> Self {
        self.create = create;
        self
    }

    /// Sets whether an existing file is emptied on open.
    #[must_use]
    pub fn truncate(mut self, truncate: bool) -> Self {
        self.truncate = truncate;
        self
    }

    /// Sets whether every page write is followed by `sync_data`.
    #[must_use]
    pub fn sync_on_write(mut self, sync_on_write: bool) -> Self {
        self.sync_on_write = sync_on_write;
        self
    }
}

/// File-backed storage implementation.
///
/// Stores pages as contiguous 4KB blocks in a single file with no header.
///
/// # File Layout
///
/// ```text
/// +------------------+------------------+------------------+
/// | Page 0 (4KB)     | Page 1 (4KB)     | Page 2 (4KB)     | ...
/// +------------------+------------------+------------------+
/// ^ offset 0         ^ offset 4096      ^ offset 8192
/// ```
///
/// # Lifecycle
///
/// The file handle is opened once by [`open`](Self::open),
/// [`create`](Self::create), or [`open_with`](Self::open_with) and closed when
/// the storage is dropped.
///
/// # Durability
///
/// The `sync_all()` method calls `File::sync_all()` to ensure data reaches disk.
/// Without calling sync_all (or enabling `sync_on_write`), data may be lost on
/// crash.
pub struct FileStorage {
    /// Path to the heap file
    path: PathBuf,
    /// File handle; one seek+read/write pair runs under the lock
    file: Mutex<File>,
    /// Number of pages currently in the file
    page_count: AtomicU64,
    /// Whether writes are followed by `sync_data`
    sync_on_write: bool,
}

impl FileStorage {
    /// Opens or creates a heap file at the given path.
    ///
    /// If the file exists, its page count is calculated from file size.
    /// If the file doesn't exist, it is created empty.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Corrupted` if the file size is not a multiple
    /// of PAGE_SIZE.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StorageError> {
        Self::open_with(path, &StorageOptions::new())
    }

    /// Creates an empty heap file at the given path, discarding any existing
    /// contents.
    pub fn create(path: impl Into<PathBuf>) -> Result<Self, StorageError> {
        Self::open_with(path, &StorageOptions::new().truncate(true))
    }

    /// Opens a heap file with explicit options.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Io` if the file cannot be opened (including a
    /// missing file when `create` is off), and `StorageError::Corrupted` if
    /// its size is not a multiple of PAGE_SIZE.
    pub fn open_with(
        path: impl Into<PathBuf>,
        options: &StorageOptions,
    ) -> Result<Self, StorageError> {
        let path = path.into();

        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(options.create)
            .truncate(options.truncate)
            .open(&path)?;

        let file_size = file.metadata()?.len();

        // Validate file size is a multiple of PAGE_SIZE
        if file_size % PAGE_SIZE as u64 != 0 {
            return Err(StorageError::Corrupted(format!(
                "file size {} is not a multiple of page size {}",
                file_size, PAGE_SIZE
            )));
        }

        let page_count = file_size / PAGE_SIZE as u64;
        info!(path = %path.display(), page_count, "opened heap file");

        Ok(Self {
            path,
            file: Mutex::new(file),
            page_count: AtomicU64::new(page_count),
            sync_on_write: options.sync_on_write,
        })
    }

    /// Returns the path to the heap file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn check_range(&self, page_id: PageId) -> Result<(), StorageError> {
        if page_id.page_num() >= self.page_count.load(Ordering::Acquire) {
            return Err(StorageError::PageOutOfRange(page_id));
        }
        Ok(())
    }
}

impl Storage for FileStorage {
    fn read_page(&self, page_id: PageId, buf: &mut [u8]) -> Result<(), StorageError> {
        check_page_size(buf)?;
        self.check_range(page_id)?;

        let mut file = self.file.lock();
        file.seek(SeekFrom::Start(page_id.byte_offset()))?;
        file.read_exact(buf)?;

        Ok(())
    }

    fn write_page(&self, page_id: PageId, buf: &[u8]) -> Result<(), StorageError> {
        check_page_size(buf)?;
        self.check_range(page_id)?;

        let mut file = self.file.lock();
        file.seek(SeekFrom::Start(page_id.byte_offset()))?;
        file.write_all(buf)?;
        if self.sync_on_write {
            file.sync_data()?;
        }

        Ok(())
    }

    fn append_page(&self, buf: &[u8]) -> Result<PageId, StorageError> {
        check_page_size(buf)?;

        let mut file = self.file.lock();

        // The lock is held, so no other append can claim this page number
        let page_num = self.page_count.load(Ordering::Acquire);
        let page_id = PageId::new(page_num);

        file.seek(SeekFrom::Start(page_id.byte_offset()))?;
        file.write_all(buf)?;
        if self.sync_on_write {
            file.sync_data()?;
        }

        self.page_count.store(page_num + 1, Ordering::Release);
        debug!(page_id = page_num, "appended page");

        Ok(page_id)
    }

    fn page_count(&self) -> u64 {
        self.page_count.load(Ordering::Acquire)
    }

    fn sync_all(&self) -> Result<(), StorageError> {
        let file = self.file.lock();
        file.sync_all()?;
        Ok(())
    }
}
