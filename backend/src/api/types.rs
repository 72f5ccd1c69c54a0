//! REST API types.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::error::ServiceError;
use crate::models::{CsvFile, Row};
use crate::service::{UploadReceipt, SUCCESS_MESSAGE};

/// Response sent after a successful upload.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadResponse {
    /// Human-readable outcome
    pub status: String,

    /// Filename as sent by the client
    pub original_filename: String,

    /// Generated identifier, used as the download path segment
    pub filename: String,

    /// Number of data rows stored
    pub processed_rows: usize,
}

impl From<UploadReceipt> for UploadResponse {
    fn from(receipt: UploadReceipt) -> Self {
        UploadResponse {
            status: SUCCESS_MESSAGE.to_string(),
            original_filename: receipt.original_filename,
            filename: receipt.id.to_string(),
            processed_rows: receipt.processed_rows,
        }
    }
}

/// JSON view of a stored file.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileView {
    pub csv_id: String,
    pub original_filename: String,
    pub uploaded_at: DateTime<Utc>,
    pub csv_data: Vec<Row>,
}

impl From<CsvFile> for FileView {
    fn from(file: CsvFile) -> Self {
        FileView {
            csv_id: file.id.to_string(),
            original_filename: file.original_filename,
            uploaded_at: file.uploaded_at,
            csv_data: file.rows,
        }
    }
}

/// Create an error response body
pub fn error_response(error: &str) -> Value {
    json!({
        "status": "error",
        "error": error,
    })
}

impl ServiceError {
    /// HTTP status for this outcome.
    pub fn status_code(&self) -> StatusCode {
        match self {
            ServiceError::InputRejected(_) | ServiceError::InvalidId(_) => StatusCode::BAD_REQUEST,
            ServiceError::Decode(e) if e.is_conflict() => StatusCode::CONFLICT,
            ServiceError::Decode(_) => StatusCode::BAD_REQUEST,
            ServiceError::NotFound(_) => StatusCode::NOT_FOUND,
            // writer failures are reported as bad requests, like decode failures
            ServiceError::Encode(_) => StatusCode::BAD_REQUEST,
            ServiceError::Storage(_) | ServiceError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        }
        (status, Json(error_response(&self.to_string()))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{DecodeError, EncodeError, StorageError};
    use crate::models::FileId;

    #[test]
    fn test_upload_response_shape() {
        let id = FileId::generate();
        let response = UploadResponse::from(UploadReceipt {
            id,
            original_filename: "codes.csv".into(),
            processed_rows: 3,
        });
        let json = serde_json::to_value(&response).unwrap();

        assert_eq!(json["status"], "All records were processed successfully");
        assert_eq!(json["originalFilename"], "codes.csv");
        assert_eq!(json["filename"], id.to_string());
        assert_eq!(json["processedRows"], 3);
    }

    #[test]
    fn test_status_codes() {
        let cases = [
            (ServiceError::InputRejected("empty".into()), StatusCode::BAD_REQUEST),
            (ServiceError::InvalidId("x".into()), StatusCode::BAD_REQUEST),
            (
                ServiceError::Decode(DecodeError::DuplicateCode {
                    code: "A1".into(),
                    row: 4,
                    first_row: 2,
                }),
                StatusCode::CONFLICT,
            ),
            (ServiceError::Decode(DecodeError::EmptyInput), StatusCode::BAD_REQUEST),
            (ServiceError::NotFound(FileId::generate()), StatusCode::NOT_FOUND),
            (
                ServiceError::Encode(EncodeError::Io(std::io::Error::other("disk"))),
                StatusCode::BAD_REQUEST,
            ),
            (
                ServiceError::Storage(StorageError::LockPoisoned),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (err, status) in cases {
            assert_eq!(err.status_code(), status, "{err}");
        }
    }

    #[test]
    fn test_error_body() {
        let body = error_response("No file provided");
        assert_eq!(body["status"], "error");
        assert_eq!(body["error"], "No file provided");
    }
}
