//! Storage layer for page-based I/O.
//!
//! All persistent data is stored in 4KB pages. The storage layer moves whole
//! pages between memory and a backing medium and never interprets their
//! contents.
//!
//! # Architecture
//!
//! ```text
//! +-------------------+
//! | HeapFile          |  <- heap
//! +-------------------+
//!          |
//!          v
//! +-------------------+
//! | Storage Trait     |  <- io
//! +-------------------+
//!       /      \
//!      v        v
//! +--------------+ +-------------+
//! | MemoryStorage| | FileStorage |
//! +--------------+ +-------------+
//! ```

pub mod error;
pub mod io;
pub mod page;

pub use error::StorageError;
pub use io::{FileStorage, MemoryStorage, Storage, StorageOptions};
pub use page::{PAGE_SIZE, PageBuf, PageId, empty_page};
