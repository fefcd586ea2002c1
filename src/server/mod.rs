//! Upload/download HTTP surface.
//!
//! `POST /upload` takes a .docx requirements document, extracts its text,
//! and persists it as the next workflow invocation's input. `GET /download`
//! streams the most recently produced archive. The server never blocks on a
//! checkpoint; workflow runs triggered from here use auto-approve.

use crate::error::WorkflowError;
use crate::models::ForgeConfig;
use crate::parser::extract_docx_text;
use crate::Result;
use axum::{
    extract::{DefaultBodyLimit, Multipart, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tower_http::cors::CorsLayer;

const DOCX_MIME: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document";
const DOWNLOAD_NAME: &str = "project.zip";
const MAX_UPLOAD_BYTES: usize = 32 * 1024 * 1024;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ForgeConfig>,
}

/// Build the router; extracted from `start_server` so tests can drive it
/// without a socket.
pub fn build_router(config: ForgeConfig) -> Router {
    let state = AppState {
        config: Arc::new(config),
    };

    Router::new()
        .route("/", get(root))
        .route("/health", get(health_check))
        .route("/upload", post(handle_upload))
        .route("/download", get(handle_download))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Start the upload/download server.
pub async fn start_server(config: ForgeConfig) -> Result<()> {
    let addr = SocketAddr::from(([127, 0, 0, 1], config.server.port));
    let app = build_router(config);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    println!("✓ Server listening on http://{}", addr);
    println!("  Upload:   POST http://{}/upload", addr);
    println!("  Download: GET  http://{}/download", addr);

    axum::serve(listener, app).await?;
    Ok(())
}

async fn root() -> &'static str {
    "codeforge is running"
}

async fn health_check() -> &'static str {
    "OK"
}

/// Accept a .docx upload, extract its text, persist it as the requirements
/// input. Unsupported media types are a client error and nothing is
/// persisted.
async fn handle_upload(State(state): State<AppState>, mut multipart: Multipart) -> Response {
    let field = match multipart.next_field().await {
        Ok(Some(field)) => field,
        Ok(None) => {
            return error_response(StatusCode::BAD_REQUEST, "no file field in upload");
        }
        Err(e) => {
            return error_response(StatusCode::BAD_REQUEST, format!("malformed upload: {}", e));
        }
    };

    let content_type = field.content_type().map(str::to_string).unwrap_or_default();
    if content_type != DOCX_MIME {
        return error_response(StatusCode::BAD_REQUEST, "Invalid file type");
    }

    let bytes = match field.bytes().await {
        Ok(bytes) => bytes,
        Err(e) => {
            return error_response(StatusCode::BAD_REQUEST, format!("unreadable upload: {}", e));
        }
    };

    let text = match extract_docx_text(&bytes) {
        Ok(text) => text,
        Err(WorkflowError::InvalidDocument { reason }) => {
            return error_response(StatusCode::BAD_REQUEST, reason);
        }
        Err(e) => {
            return error_response(StatusCode::INTERNAL_SERVER_ERROR, e.to_string());
        }
    };

    let requirements_path = &state.config.requirements_file;
    if let Some(parent) = requirements_path.parent() {
        if !parent.as_os_str().is_empty() {
            if let Err(e) = std::fs::create_dir_all(parent) {
                return error_response(StatusCode::INTERNAL_SERVER_ERROR, e.to_string());
            }
        }
    }
    if let Err(e) = std::fs::write(requirements_path, &text) {
        return error_response(StatusCode::INTERNAL_SERVER_ERROR, e.to_string());
    }

    Json(serde_json::json!({ "content": text })).into_response()
}

/// Stream back the most recently produced archive under a fixed filename.
async fn handle_download(State(state): State<AppState>) -> Response {
    let archive_path = archive_path_for(&state.config);

    let bytes = match tokio::fs::read(&archive_path).await {
        Ok(bytes) => bytes,
        Err(_) => {
            return error_response(StatusCode::NOT_FOUND, "archive not found");
        }
    };

    (
        [
            (header::CONTENT_TYPE, "application/zip".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", DOWNLOAD_NAME),
            ),
        ],
        bytes,
    )
        .into_response()
}

/// Sibling archive named from the artifact root.
fn archive_path_for(config: &ForgeConfig) -> PathBuf {
    let name = config
        .root_path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| "project".to_string());
    config
        .root_path
        .parent()
        .unwrap_or_else(|| std::path::Path::new("."))
        .join(format!("{}.zip", name))
}

fn error_response(status: StatusCode, message: impl Into<String>) -> Response {
    (
        status,
        Json(serde_json::json!({ "error": message.into() })),
    )
        .into_response()
}
