//! File store - persist decoded uploads and fetch them back by id.
//!
//! Two backends:
//! - [`MemoryStore`] - process-local map, lost on restart
//! - [`FsStore`] - one JSON document per upload under a data directory
//!
//! A save either stores the whole row set or nothing; readers never see a
//! partially written file.

mod fs;

pub use fs::FsStore;

use std::collections::HashMap;
use std::sync::RwLock;

use crate::error::{StorageError, StorageResult};
use crate::models::{CsvFile, FileId, Row};

/// Persistence interface used by the upload and download paths.
///
/// Calls may block; async callers should run them on a blocking thread.
pub trait FileStore: Send + Sync {
    /// Persist `rows` under a newly generated identifier.
    fn save(&self, original_filename: &str, rows: Vec<Row>) -> StorageResult<FileId>;

    /// Fetch a stored file with all of its rows.
    fn find_by_id(&self, id: FileId) -> StorageResult<Option<CsvFile>>;

    /// Number of stored files.
    fn count(&self) -> StorageResult<usize>;
}

/// In-memory store.
#[derive(Default)]
pub struct MemoryStore {
    files: RwLock<HashMap<FileId, CsvFile>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl FileStore for MemoryStore {
    fn save(&self, original_filename: &str, rows: Vec<Row>) -> StorageResult<FileId> {
        let mut files = self.files.write().map_err(|_| StorageError::LockPoisoned)?;

        let mut id = FileId::generate();
        while files.contains_key(&id) {
            id = FileId::generate();
        }
        files.insert(id, CsvFile::new(id, original_filename, rows));
        Ok(id)
    }

    fn find_by_id(&self, id: FileId) -> StorageResult<Option<CsvFile>> {
        let files = self.files.read().map_err(|_| StorageError::LockPoisoned)?;
        Ok(files.get(&id).cloned())
    }

    fn count(&self) -> StorageResult<usize> {
        let files = self.files.read().map_err(|_| StorageError::LockPoisoned)?;
        Ok(files.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_save_then_find() {
        let store = MemoryStore::new();
        let id = store
            .save("codes.csv", vec![Row::new(1, "A1"), Row::new(2, "A2")])
            .unwrap();

        let file = store.find_by_id(id).unwrap().unwrap();
        assert_eq!(file.id, id);
        assert_eq!(file.original_filename, "codes.csv");
        assert_eq!(file.rows.len(), 2);
        assert_eq!(store.count().unwrap(), 1);
    }

    #[test]
    fn test_unknown_id() {
        let store = MemoryStore::new();
        assert!(store.find_by_id(FileId::generate()).unwrap().is_none());
    }

    #[test]
    fn test_each_save_gets_new_id() {
        let store = MemoryStore::new();
        let first = store.save("a.csv", vec![Row::new(1, "A")]).unwrap();
        let second = store.save("a.csv", vec![Row::new(1, "A")]).unwrap();
        assert_ne!(first, second);
        assert_eq!(store.count().unwrap(), 2);
    }

    #[test]
    fn test_concurrent_saves() {
        let store = Arc::new(MemoryStore::new());
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let store = store.clone();
                std::thread::spawn(move || {
                    store
                        .save(&format!("{i}.csv"), vec![Row::new(1, format!("C{i}"))])
                        .unwrap()
                })
            })
            .collect();

        for handle in handles {
            let id = handle.join().unwrap();
            assert_eq!(store.find_by_id(id).unwrap().unwrap().rows.len(), 1);
        }
        assert_eq!(store.count().unwrap(), 8);
    }
}
