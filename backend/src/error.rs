//! Error types for the code-list pipeline.
//!
//! - [`DecodeError`] - CSV text could not be turned into rows
//! - [`EncodeError`] - rows could not be written back as CSV
//! - [`StorageError`] - the file store failed
//! - [`ServiceError`] - top-level upload/download outcome errors
//!
//! Lower-level errors convert into [`ServiceError`] via `From`, so `?`
//! works across the decoder, encoder and store.

use thiserror::Error;

use crate::models::FileId;

// =============================================================================
// Decode Errors
// =============================================================================

/// Errors while decoding uploaded CSV text. Any of these discards the
/// whole upload.
#[derive(Debug, Error)]
pub enum DecodeError {
    /// Nothing to decode.
    #[error("CSV content is empty")]
    EmptyInput,

    /// An expected header is not present in the header row.
    #[error("Missing column '{column}' in header row")]
    MissingColumn { column: String },

    /// A data record has a blank `code`.
    #[error("Row {row}: code must not be blank")]
    BlankCode { row: usize },

    /// A `code` value appeared twice in the same file.
    #[error("Code {code} not unique for this CSV file (row {row}, first seen at row {first_row})")]
    DuplicateCode {
        code: String,
        row: usize,
        first_row: usize,
    },

    /// A data record ends before an expected column.
    #[error("Row {row}: no value for column '{column}'")]
    MissingField { row: usize, column: String },

    /// A date or integer cell could not be parsed.
    #[error("Row {row}, column '{column}' (value '{value}'): {message}")]
    MalformedField {
        row: usize,
        column: String,
        value: String,
        message: String,
    },

    /// The text is not well-formed CSV.
    #[error("Invalid CSV format: {0}")]
    Syntax(#[from] csv::Error),
}

impl DecodeError {
    /// Whether the error is a uniqueness conflict rather than bad input.
    pub fn is_conflict(&self) -> bool {
        matches!(self, DecodeError::DuplicateCode { .. })
    }
}

// =============================================================================
// Encode Errors
// =============================================================================

/// Errors while producing CSV bytes.
#[derive(Debug, Error)]
pub enum EncodeError {
    #[error("Fail to write CSV record: {0}")]
    Csv(#[from] csv::Error),

    #[error("Fail to flush CSV output: {0}")]
    Io(#[from] std::io::Error),
}

// =============================================================================
// Storage Errors
// =============================================================================

/// Errors from a [`crate::storage::FileStore`].
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Storage IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Storage JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A writer panicked while holding the store lock.
    #[error("Storage lock poisoned")]
    LockPoisoned,
}

// =============================================================================
// Service Errors (top-level)
// =============================================================================

/// Outcome errors of the upload and download operations.
///
/// The HTTP layer maps each variant to a status code.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// Missing, empty or wrongly typed upload. Nothing was parsed.
    #[error("Input rejected: {0}")]
    InputRejected(String),

    /// The identifier is not a UUID.
    #[error("Invalid file identifier: {0}")]
    InvalidId(String),

    #[error("{0}")]
    Decode(#[from] DecodeError),

    #[error("File not found: {0}")]
    NotFound(FileId),

    #[error("{0}")]
    Encode(#[from] EncodeError),

    #[error("{0}")]
    Storage(#[from] StorageError),

    #[error("Internal error: {0}")]
    Internal(String),
}

// =============================================================================
// Result Type Aliases
// =============================================================================

pub type DecodeResult<T> = Result<T, DecodeError>;

pub type EncodeResult<T> = Result<T, EncodeError>;

pub type StorageResult<T> = Result<T, StorageError>;

pub type ServiceResult<T> = Result<T, ServiceError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_conversion_chain() {
        let decode_err = DecodeError::EmptyInput;
        let service_err: ServiceError = decode_err.into();
        assert!(service_err.to_string().contains("empty"));

        let storage_err = StorageError::LockPoisoned;
        let service_err: ServiceError = storage_err.into();
        assert!(matches!(service_err, ServiceError::Storage(_)));
    }

    #[test]
    fn test_duplicate_code_format() {
        let err = DecodeError::DuplicateCode {
            code: "A1".into(),
            row: 4,
            first_row: 2,
        };
        assert!(err.is_conflict());
        let msg = err.to_string();
        assert!(msg.contains("A1"));
        assert!(msg.contains("row 4"));
    }

    #[test]
    fn test_malformed_field_format() {
        let err = DecodeError::MalformedField {
            row: 5,
            column: "fromDate".into(),
            value: "2019-01-01".into(),
            message: "expected dd-MM-yyyy".into(),
        };
        assert!(!err.is_conflict());
        let msg = err.to_string();
        assert!(msg.contains("Row 5"));
        assert!(msg.contains("column 'fromDate'"));
        assert!(msg.contains("value '2019-01-01'"));
    }
}
