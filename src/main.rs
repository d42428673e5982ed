//! Command-line harness for heap files.
//!
//! ```bash
//! heapfile --file heap.bin create
//! heapfile --file heap.bin insert HELLO WORLD HiGuys
//! heapfile --file heap.bin page 0
//! heapfile --file heap.bin get 0 1
//! heapfile --file heap.bin dump
//! ```

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use heapfile::heap::{HeapFile, HeapPage, records_on_page};
use heapfile::storage::{FileStorage, PageId, StorageOptions};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Inspect and append to a heap file of 4KB slotted pages
#[derive(Parser, Debug)]
#[command(name = "heapfile", version, about)]
struct Args {
    /// Heap file to operate on
    #[arg(short, long, env = "HEAPFILE_PATH", default_value = "heap_test.bin")]
    file: PathBuf,

    /// Sync every page write to disk
    #[arg(long)]
    sync: bool,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create an empty heap file, discarding any existing one
    Create,
    /// Insert each argument as a record
    Insert {
        #[arg(required = true)]
        records: Vec<String>,
    },
    /// Print one record
    Get { page: u64, slot: u16 },
    /// Print a page's footer and records
    Page { page: u64 },
    /// Print every record in the file
    Dump,
    /// Create the file, insert three records, and print them back
    Demo,
}

/// How a command opens the heap file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OpenMode {
    /// Empty the file, creating it if missing
    Fresh,
    /// Keep existing pages, creating the file if missing
    Append,
    /// The file must already exist
    Existing,
}

impl Command {
    fn open_mode(&self) -> OpenMode {
        match self {
            Command::Create | Command::Demo => OpenMode::Fresh,
            Command::Insert { .. } => OpenMode::Append,
            Command::Get { .. } | Command::Page { .. } | Command::Dump => OpenMode::Existing,
        }
    }
}

fn init_logging(verbose: bool) {
    let default = if verbose { "heapfile=debug" } else { "heapfile=warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .init();
}

fn open(args: &Args) -> Result<HeapFile<FileStorage>, Box<dyn std::error::Error>> {
    let mode = args.command.open_mode();
    let options = StorageOptions::new()
        .create(mode != OpenMode::Existing)
        .truncate(mode == OpenMode::Fresh)
        .sync_on_write(args.sync);
    Ok(HeapFile::new(FileStorage::open_with(&args.file, &options)?))
}

fn show(data: &[u8]) -> String {
    format!("b\"{}\" -> {}", data.escape_ascii(), String::from_utf8_lossy(data))
}

fn print_page(heap: &HeapFile<FileStorage>, page: u64) -> Result<(), Box<dyn std::error::Error>> {
    let data = heap.read_page(PageId::new(page))?;
    let footer = HeapPage::new(&data[..]).footer();

    println!("--- Page {} ---", page);
    println!("Free Space Offset: {}", footer.free_space_offset);
    println!("Slot Count: {}", footer.slot_count);
    println!("Free Space: {}", footer.free_space());
    for (slot, record) in records_on_page(&data)?.iter().enumerate() {
        println!("Record {}: {}", slot, show(record));
    }
    Ok(())
}

fn dump(heap: &HeapFile<FileStorage>) -> Result<(), Box<dyn std::error::Error>> {
    for (i, record) in heap.scan().enumerate() {
        let (rid, data) = record?;
        println!("File Record {} {}: {}", i, rid, show(&data));
    }
    Ok(())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    init_logging(args.verbose);

    match &args.command {
        Command::Create => {
            open(&args)?;
            println!("created empty heap file {}", args.file.display());
        }
        Command::Insert { records } => {
            let mut heap = open(&args)?;
            for record in records {
                let rid = heap.insert_record(record.as_bytes())?;
                println!("{} -> {}", record, rid);
            }
            heap.sync_all()?;
        }
        Command::Get { page, slot } => {
            let heap = open(&args)?;
            let record = heap.get_record(PageId::new(*page), *slot)?;
            println!("Record[{}] = {}", slot, show(&record));
        }
        Command::Page { page } => {
            let heap = open(&args)?;
            print_page(&heap, *page)?;
        }
        Command::Dump => {
            let heap = open(&args)?;
            dump(&heap)?;
        }
        Command::Demo => {
            let mut heap = open(&args)?;
            info!(path = %args.file.display(), "running demo");
            let records: [&[u8]; 3] = [b"HELLO", b"WORLD", b"HiGuys"];
            for record in records {
                heap.insert_record(record)?;
            }
            heap.sync_all()?;

            print_page(&heap, 0)?;
            let one = heap.get_record(PageId::new(0), 1)?;
            println!("--- Single Record Retrieval ---");
            println!("Record[1] = {}", show(&one));
            println!("--- All Records in File ---");
            dump(&heap)?;
        }
    }

    Ok(())
}
