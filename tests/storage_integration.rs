//! Integration tests for storage layer.

use std::sync::Arc;

use heapfile::storage::{
    FileStorage, MemoryStorage, PAGE_SIZE, PageId, Storage, StorageError, StorageOptions,
};
use tempfile::tempdir;

/// Generic test runner for any Storage implementation.
fn test_storage_basic_operations<S: Storage>(storage: S) {
    // Initially empty
    assert_eq!(storage.page_count(), 0);

    // Append pages with distinct contents
    let mut ids = Vec::new();
    for value in [10u8, 20, 30] {
        let mut buf = [0u8; PAGE_SIZE];
        buf[0] = value;
        ids.push(storage.append_page(&buf).unwrap());
    }

    assert_eq!(ids, vec![PageId::new(0), PageId::new(1), PageId::new(2)]);
    assert_eq!(storage.page_count(), 3);

    // Read back and verify
    let mut buf = [0u8; PAGE_SIZE];
    for (id, value) in ids.iter().zip([10u8, 20, 30]) {
        storage.read_page(*id, &mut buf).unwrap();
        assert_eq!(buf[0], value);
    }

    // Overwrite in place
    buf[0] = 99;
    storage.write_page(ids[1], &buf).unwrap();
    storage.read_page(ids[1], &mut buf).unwrap();
    assert_eq!(buf[0], 99);
    assert_eq!(storage.page_count(), 3);

    // sync_all should succeed
    storage.sync_all().unwrap();
}

#[test]
fn test_memory_storage_basic() {
    test_storage_basic_operations(MemoryStorage::new());
}

#[test]
fn test_file_storage_basic() {
    let dir = tempdir().unwrap();
    let storage = FileStorage::open(dir.path().join("heap.bin")).unwrap();
    test_storage_basic_operations(storage);
}

/// Writers on separate threads touching different pages.
#[test]
fn test_file_concurrent_access() {
    let dir = tempdir().unwrap();
    let storage = Arc::new(FileStorage::open(dir.path().join("heap.bin")).unwrap());

    for _ in 0..10 {
        storage.append_page(&[0u8; PAGE_SIZE]).unwrap();
    }

    let handles: Vec<_> = (0..10u64)
        .map(|i| {
            let storage = storage.clone();
            std::thread::spawn(move || {
                let mut buf = [0u8; PAGE_SIZE];
                buf[0] = i as u8;
                storage.write_page(PageId::new(i), &buf).unwrap();
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }

    storage.sync_all().unwrap();

    for i in 0..10 {
        let mut buf = [0u8; PAGE_SIZE];
        storage.read_page(PageId::new(i), &mut buf).unwrap();
        assert_eq!(buf[0], i as u8);
    }
}

/// Rejected writes leave the file exactly as it was.
#[test]
fn test_page_size_precondition_does_not_mutate() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("heap.bin");
    let storage = FileStorage::open(&path).unwrap();
    storage.append_page(&[1u8; PAGE_SIZE]).unwrap();

    for len in [0, 1, PAGE_SIZE - 1, PAGE_SIZE + 1, 2 * PAGE_SIZE] {
        let buf = vec![2u8; len];
        assert!(matches!(
            storage.append_page(&buf),
            Err(StorageError::InvalidPageSize { actual, .. }) if actual == len
        ));
        assert!(matches!(
            storage.write_page(PageId::new(0), &buf),
            Err(StorageError::InvalidPageSize { .. })
        ));
    }

    assert_eq!(storage.page_count(), 1);
    assert_eq!(std::fs::metadata(&path).unwrap().len(), PAGE_SIZE as u64);
    let mut buf = [0u8; PAGE_SIZE];
    storage.read_page(PageId::new(0), &mut buf).unwrap();
    assert!(buf.iter().all(|&b| b == 1));
}

/// Test persistence across multiple FileStorage instances.
#[test]
fn test_file_persistence_across_instances() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("heap.bin");

    // First instance: write data
    {
        let storage = FileStorage::open(&path).unwrap();
        for i in 0..5 {
            let mut buf = [0u8; PAGE_SIZE];
            buf[0] = (i * 10) as u8;
            storage.append_page(&buf).unwrap();
        }
        storage.sync_all().unwrap();
    }

    // Second instance: append more pages
    {
        let storage = FileStorage::open(&path).unwrap();
        assert_eq!(storage.page_count(), 5);

        for i in 5..10 {
            let mut buf = [0u8; PAGE_SIZE];
            buf[0] = (i * 10) as u8;
            let page_id = storage.append_page(&buf).unwrap();
            assert_eq!(page_id, PageId::new(i));
        }
        storage.sync_all().unwrap();
    }

    // Third instance: verify all
    {
        let options = StorageOptions::new().create(false);
        let storage = FileStorage::open_with(&path, &options).unwrap();
        assert_eq!(storage.page_count(), 10);

        for i in 0..10 {
            let mut buf = [0u8; PAGE_SIZE];
            storage.read_page(PageId::new(i), &mut buf).unwrap();
            assert_eq!(buf[0], (i * 10) as u8);
        }
    }
}

#[test]
fn test_misaligned_file_rejected() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("heap.bin");
    std::fs::write(&path, vec![0u8; PAGE_SIZE + 17]).unwrap();

    let result = FileStorage::open(&path);
    assert!(matches!(result, Err(StorageError::Corrupted(_))));

    // Truncating on open recovers an empty file
    let storage = FileStorage::create(&path).unwrap();
    assert_eq!(storage.page_count(), 0);
}
