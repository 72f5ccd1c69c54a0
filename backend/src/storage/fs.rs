//! Filesystem-backed store.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use super::FileStore;
use crate::error::StorageResult;
use crate::models::{CsvFile, FileId, Row};

/// Stores each upload as `<id>.json` under `root`.
///
/// Documents are written to a temporary file first and renamed into place.
pub struct FsStore {
    root: PathBuf,
}

impl FsStore {
    /// Open (and create if needed) a store rooted at `dir`.
    pub fn open(dir: impl AsRef<Path>) -> StorageResult<Self> {
        let root = PathBuf::from(dir.as_ref());
        fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn document_path(&self, id: FileId) -> PathBuf {
        self.root.join(format!("{}.json", id))
    }

    fn write_atomically(&self, id: FileId, content: &[u8]) -> io::Result<()> {
        let final_path = self.document_path(id);
        let tmp_path = self.root.join(format!(".{}.json.tmp", id));

        let mut file = fs::File::create(&tmp_path)?;
        file.write_all(content)?;
        file.sync_all()?;
        drop(file);

        fs::rename(&tmp_path, &final_path).inspect_err(|_| {
            let _ = fs::remove_file(&tmp_path);
        })
    }
}

impl FileStore for FsStore {
    fn save(&self, original_filename: &str, rows: Vec<Row>) -> StorageResult<FileId> {
        let mut id = FileId::generate();
        while self.document_path(id).exists() {
            id = FileId::generate();
        }

        let file = CsvFile::new(id, original_filename, rows);
        let content = serde_json::to_vec_pretty(&file)?;
        self.write_atomically(id, &content)?;

        tracing::debug!(%id, path = %self.document_path(id).display(), "stored csv file");
        Ok(id)
    }

    fn find_by_id(&self, id: FileId) -> StorageResult<Option<CsvFile>> {
        let content = match fs::read(self.document_path(id)) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        Ok(Some(serde_json::from_slice(&content)?))
    }

    fn count(&self) -> StorageResult<usize> {
        let mut count = 0;
        for entry in fs::read_dir(&self.root)? {
            let path = entry?.path();
            let is_document = path.extension().is_some_and(|e| e == "json")
                && path
                    .file_stem()
                    .and_then(|s| s.to_str())
                    .is_some_and(|s| s.parse::<FileId>().is_ok());
            if is_document {
                count += 1;
            }
        }
        Ok(count)
    }
}
