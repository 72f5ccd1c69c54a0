//! HTTP server for the code-list API.
//!
//! # API Endpoints
//!
//! | Method | Path                               | Description                     |
//! |--------|------------------------------------|---------------------------------|
//! | GET    | `/health`                          | Health check                    |
//! | POST   | `/api/v1/csv`                      | Upload a CSV (multipart `file`) |
//! | GET    | `/api/v1/csv/download/{filename}`  | Download a stored CSV           |
//! | GET    | `/api/v1/csv/{filename}`           | Stored file as JSON             |
//! | GET    | `/api/v1/logs`                     | SSE stream of pipeline logs     |

use axum::{
    extract::{DefaultBodyLimit, Multipart, Path, State},
    http::{header, HeaderValue, Method},
    response::{sse::Event, IntoResponse, Json, Response, Sse},
    routing::{get, post},
    Router,
};
use futures::stream::Stream;
use serde_json::{json, Value};
use std::{convert::Infallible, net::SocketAddr, sync::Arc, time::Duration};
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::StreamExt as _;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use super::logs::LOG_BROADCASTER;
use super::types::{FileView, UploadResponse};
use crate::config::Config;
use crate::error::ServiceError;
use crate::service::{CsvService, UploadedFile};
use crate::storage::{FileStore, FsStore, MemoryStore};

/// Build the router around a service.
pub fn create_router(service: CsvService, max_upload_bytes: usize) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT])
        .expose_headers([header::CONTENT_TYPE, header::CONTENT_DISPOSITION]);

    Router::new()
        .route("/", get(health))
        .route("/health", get(health))
        .route("/api/v1/csv", post(upload_csv))
        .route("/api/v1/csv/download/{filename}", get(download_csv))
        .route("/api/v1/csv/{filename}", get(describe_csv))
        .route("/api/v1/logs", get(sse_logs))
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(service)
}

/// Open the configured store.
pub fn open_store(config: &Config) -> Result<Arc<dyn FileStore>, Box<dyn std::error::Error>> {
    let store: Arc<dyn FileStore> = match &config.data_dir {
        Some(dir) => {
            tracing::info!(dir = %dir.display(), "using filesystem store");
            Arc::new(FsStore::open(dir)?)
        }
        None => {
            tracing::info!("using in-memory store");
            Arc::new(MemoryStore::new())
        }
    };
    Ok(store)
}

/// Start the HTTP server
pub async fn start_server(config: Config) -> Result<(), Box<dyn std::error::Error>> {
    let service = CsvService::new(open_store(&config)?);
    let app = create_router(service, config.max_upload_bytes);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("🚀 codelist server running on http://localhost:{}", config.port);
    tracing::info!("   POST /api/v1/csv                       - Upload CSV file");
    tracing::info!("   GET  /api/v1/csv/download/{{filename}}   - Download CSV file");
    tracing::info!("   GET  /api/v1/logs                      - SSE log stream");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Health check endpoint
async fn health(State(service): State<CsvService>) -> Json<Value> {
    let stored_files = service.store().count().ok();
    Json(json!({
        "status": "ok",
        "service": "codelist",
        "version": env!("CARGO_PKG_VERSION"),
        "storedFiles": stored_files,
    }))
}

/// SSE endpoint for real-time log streaming
async fn sse_logs() -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let rx = LOG_BROADCASTER.subscribe();

    let stream = BroadcastStream::new(rx).filter_map(|result| match result {
        Ok(entry) => {
            let json = serde_json::to_string(&entry).ok()?;
            Some(Ok(Event::default().data(json)))
        }
        Err(_) => None,
    });

    Sse::new(stream).keep_alive(
        axum::response::sse::KeepAlive::new()
            .interval(Duration::from_secs(15))
            .text("keep-alive"),
    )
}

/// Upload CSV endpoint
async fn upload_csv(
    State(service): State<CsvService>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, ServiceError> {
    let mut upload: Option<UploadedFile> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ServiceError::InputRejected(format!("multipart error: {e}")))?
    {
        if field.name() != Some("file") || upload.is_some() {
            continue;
        }

        let filename = field.file_name().map(str::to_string);
        let content_type = field.content_type().map(str::to_string);
        let bytes = field
            .bytes()
            .await
            .map_err(|e| ServiceError::InputRejected(format!("read error: {e}")))?;

        upload = Some(UploadedFile {
            filename,
            content_type,
            bytes: bytes.to_vec(),
        });
    }

    let receipt = service.upload(upload).await?;
    Ok(Json(UploadResponse::from(receipt)))
}

/// Download CSV endpoint
async fn download_csv(
    State(service): State<CsvService>,
    Path(filename): Path<String>,
) -> Result<Response, ServiceError> {
    let download = service.download(&filename).await?;

    let disposition = HeaderValue::from_bytes(format!("attachment; filename={}", download.filename).as_bytes())
        .map_err(|e| ServiceError::Internal(format!("invalid filename header: {e}")))?;

    Ok((
        [
            (header::CONTENT_TYPE, HeaderValue::from_static(download.content_type)),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        download.bytes,
    )
        .into_response())
}

/// Stored file as JSON
async fn describe_csv(
    State(service): State<CsvService>,
    Path(filename): Path<String>,
) -> Result<Json<FileView>, ServiceError> {
    let file = service.describe(&filename).await?;
    Ok(Json(FileView::from(file)))
}
