//! HTTP API module.
//!
//! Transport around [`crate::service::CsvService`]: multipart upload,
//! CSV download, the JSON file view and the SSE log stream.

pub mod logs;
pub mod server;
pub mod types;


pub use server::{create_router, open_store, start_server};
pub use types::*;
