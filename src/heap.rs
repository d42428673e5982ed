//! Heap file storage for variable-length records.
//!
//! A heap file is an unordered, append-friendly sequence of slotted pages.
//! Records are opaque byte strings addressed by [`RecordId`].
//!
//! - [`HeapPage`]: Page-level record storage using slotted page structure
//! - [`HeapFile`]: First-fit record placement across the pages of a file
//! - [`HeapScan`]: Record lookup and whole-file scans

mod error;
mod file;
mod page;
mod scan;

pub use error::HeapError;
pub use file::HeapFile;
pub use page::{
    FOOTER_SIZE, HeapPage, MAX_RECORD_SIZE, PageFooter, PageInsert, RecordId, SLOT_SIZE,
    SlotEntry, SlotId,
};
pub use scan::{HeapScan, records_on_page};
