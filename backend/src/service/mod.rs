//! Upload and download orchestration.
//!
//! Upload: validate the part → decode → persist → receipt.
//! Download: fetch → order by row number → encode → bytes.
//!
//! Nothing is persisted unless the whole file decodes; every failure ends
//! the request.
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use codelist::{CsvService, MemoryStore, UploadedFile};
//!
//! let service = CsvService::new(Arc::new(MemoryStore::new()));
//! let receipt = service.upload(Some(UploadedFile::csv("codes.csv", bytes))).await?;
//! let download = service.download(&receipt.id.to_string()).await?;
//! ```

use serde::Serialize;
use std::sync::Arc;

use crate::api::logs::{log_error, log_info, log_success, log_warning};
use crate::codec;
use crate::error::{ServiceError, ServiceResult, StorageResult};
use crate::models::{CsvFile, CsvFormat, FileId, DOWNLOAD_MEDIA_TYPE, UPLOAD_MEDIA_TYPE};
use crate::storage::FileStore;

/// Status message of a successful upload.
pub const SUCCESS_MESSAGE: &str = "All records were processed successfully";

/// Used when the client sends no usable filename.
pub const DEFAULT_FILENAME: &str = "upload.csv";

/// The `file` part of an upload request.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub filename: Option<String>,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

impl UploadedFile {
    /// A `text/csv` upload.
    pub fn csv(filename: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            filename: Some(filename.into()),
            content_type: Some(UPLOAD_MEDIA_TYPE.to_string()),
            bytes: bytes.into(),
        }
    }
}

/// Result of a successful upload.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadReceipt {
    pub id: FileId,
    pub original_filename: String,
    pub processed_rows: usize,
}

/// A regenerated CSV ready to send.
#[derive(Debug, Clone)]
pub struct CsvDownload {
    pub filename: String,
    pub content_type: &'static str,
    pub bytes: Vec<u8>,
}

/// Glues the codec to a [`FileStore`].
#[derive(Clone)]
pub struct CsvService {
    store: Arc<dyn FileStore>,
    format: CsvFormat,
}

impl CsvService {
    pub fn new(store: Arc<dyn FileStore>) -> Self {
        Self::with_format(store, CsvFormat::default())
    }

    pub fn with_format(store: Arc<dyn FileStore>, format: CsvFormat) -> Self {
        Self { store, format }
    }

    pub fn store(&self) -> &Arc<dyn FileStore> {
        &self.store
    }

    /// Validate, decode and persist an uploaded CSV.
    pub async fn upload(&self, upload: Option<UploadedFile>) -> ServiceResult<UploadReceipt> {
        let upload = check_upload(upload).inspect_err(|e| log_warning(e.to_string()))?;
        let filename = sanitize_filename(upload.filename.as_deref());
        log_info(format!("📄 Upload {} ({} bytes)", filename, upload.bytes.len()));

        let text = String::from_utf8(upload.bytes).map_err(|_| {
            log_warning(format!("{filename} is not valid UTF-8"));
            ServiceError::InputRejected("file is not valid UTF-8 text".into())
        })?;

        let rows = codec::decode(&text, &self.format).inspect_err(|e| {
            log_warning(format!("{filename} rejected: {e}"));
        })?;
        let processed_rows = rows.len();
        log_success(format!("Decoded {processed_rows} rows"));

        let store = self.store.clone();
        let name = filename.clone();
        let id = blocking(move || store.save(&name, rows)).await?;
        log_success(format!("💾 Stored {filename} as {id}"));

        Ok(UploadReceipt {
            id,
            original_filename: filename,
            processed_rows,
        })
    }

    /// Rebuild the CSV of a stored file.
    pub async fn download(&self, id: &str) -> ServiceResult<CsvDownload> {
        let file = self.fetch(id).await?;
        let rows = file.rows_in_upload_order();
        log_info(format!("⬇️  Download {} ({} rows)", file.id, rows.len()));

        let bytes = codec::encode(&rows, &self.format).inspect_err(|e| {
            log_warning(format!("Encoding {} failed: {e}", file.id));
        })?;

        Ok(CsvDownload {
            filename: file.original_filename,
            content_type: DOWNLOAD_MEDIA_TYPE,
            bytes,
        })
    }

    /// A stored file with its rows in upload order.
    pub async fn describe(&self, id: &str) -> ServiceResult<CsvFile> {
        let mut file = self.fetch(id).await?;
        file.rows.sort_by_key(|row| row.row_number);
        Ok(file)
    }

    async fn fetch(&self, id: &str) -> ServiceResult<CsvFile> {
        let id: FileId = id
            .parse()
            .map_err(|_| ServiceError::InvalidId(id.to_string()))?;

        let store = self.store.clone();
        blocking(move || store.find_by_id(id))
            .await?
            .ok_or(ServiceError::NotFound(id))
    }
}

/// Reject missing, empty or non-CSV parts before any parsing.
fn check_upload(upload: Option<UploadedFile>) -> ServiceResult<UploadedFile> {
    let upload = upload.ok_or_else(|| ServiceError::InputRejected("no file provided".into()))?;

    if upload.bytes.is_empty() {
        return Err(ServiceError::InputRejected("file is empty".into()));
    }

    let is_csv = upload
        .content_type
        .as_deref()
        .is_some_and(|ct| ct.trim().eq_ignore_ascii_case(UPLOAD_MEDIA_TYPE));
    if !is_csv {
        return Err(ServiceError::InputRejected(format!(
            "wrong content type {}, expected {}",
            upload.content_type.as_deref().unwrap_or("none"),
            UPLOAD_MEDIA_TYPE
        )));
    }

    Ok(upload)
}

/// Last path segment, without control characters or double quotes.
fn sanitize_filename(name: Option<&str>) -> String {
    let base = name
        .unwrap_or_default()
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or_default();
    let cleaned: String = base
        .chars()
        .filter(|c| !c.is_control() && *c != '"')
        .collect();

    match cleaned.trim() {
        "" => DEFAULT_FILENAME.to_string(),
        name => name.to_string(),
    }
}

/// Run a store call on the blocking pool.
async fn blocking<T, F>(call: F) -> ServiceResult<T>
where
    F: FnOnce() -> StorageResult<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(call)
        .await
        .map_err(|e| ServiceError::Internal(format!("storage task failed: {e}")))?
        .map_err(|e| {
            log_error(format!("❌ {e}"));
            ServiceError::from(e)
        })
}
