//! # Codelist - code-list CSV upload and regeneration
//!
//! Codelist accepts code-list CSV uploads, validates them into typed rows,
//! stores them under a generated identifier and rebuilds a canonical CSV on
//! download.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │  CSV upload │────▶│   Decoder   │────▶│  FileStore  │
//! │ (multipart) │     │ (validated) │     │ (mem / fs)  │
//! └─────────────┘     └─────────────┘     └──────┬──────┘
//!                                                │
//! ┌─────────────┐     ┌─────────────┐            │
//! │ CSV download│◀────│   Encoder   │◀───────────┘
//! │ (canonical) │     │ (row order) │
//! └─────────────┘     └─────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use codelist::{decode, encode, CsvFormat};
//!
//! let format = CsvFormat::default();
//! let rows = decode(&std::fs::read_to_string("codes.csv")?, &format)?;
//! let canonical = encode(&rows, &format)?;
//! ```
//!
//! ## Modules
//!
//! - [`error`] - Error types per layer
//! - [`models`] - Row, stored file, identifier and wire format
//! - [`codec`] - CSV decoder and encoder
//! - [`storage`] - File store trait and backends
//! - [`service`] - Upload/download orchestration
//! - [`config`] - Environment configuration
//! - [`api`] - HTTP API server

// Core modules
pub mod error;
pub mod models;

// CSV
pub mod codec;

// Persistence
pub mod storage;

// Orchestration
pub mod service;

// Configuration
pub mod config;

// HTTP API
pub mod api;

// =============================================================================
// Re-exports - Error types
// =============================================================================

pub use error::{
    DecodeError, DecodeResult, EncodeError, EncodeResult, ServiceError, ServiceResult,
    StorageError, StorageResult,
};

// =============================================================================
// Re-exports - Models
// =============================================================================

pub use models::{
    Column, CsvFile, CsvFormat, FileId, Row, CANONICAL_HEADERS, DATE_FORMAT,
    DOWNLOAD_MEDIA_TYPE, UPLOAD_MEDIA_TYPE,
};

// =============================================================================
// Re-exports - Codec
// =============================================================================

pub use codec::{decode, encode};

// =============================================================================
// Re-exports - Storage
// =============================================================================

pub use storage::{FileStore, FsStore, MemoryStore};

// =============================================================================
// Re-exports - Service
// =============================================================================

pub use service::{CsvDownload, CsvService, UploadReceipt, UploadedFile, SUCCESS_MESSAGE};

// =============================================================================
// Re-exports - Config & API
// =============================================================================

pub use config::Config;

pub use api::types::{error_response, FileView, UploadResponse};

// Server
pub mod server {
    pub use crate::api::server::{create_router, start_server};
}
