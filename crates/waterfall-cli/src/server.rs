//! HTTP service
//!
//! - `GET  /api/health_check`: liveness check
//! - `POST /api/upload`: multipart upload, field `file`
//! - `GET  /api/download/{filename}`: stored file as an attachment
//! - `POST /api/chart/{filename}?title=...`: render a stored CSV to `gantt.png`
//!
//! Failures come back as `{"status": "error", "message": ...}` with a
//! matching status code.

use std::sync::Arc;

use axum::extract::{Multipart, Path, Query, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use waterfall_core::RenderError;
use waterfall_parser::{load_tasks, ParseError};
use waterfall_render::{plot_gantt, PngRenderer};

use crate::config::ServiceConfig;
use crate::store::{FileStore, StoreError};

/// Name of the attachment returned by the chart endpoint
pub const CHART_FILENAME: &str = "gantt.png";

// ── State ────────────────────────────────────────────────────────────────

pub struct AppState {
    pub store: FileStore,
    pub config: ServiceConfig,
}

impl AppState {
    pub fn new(config: ServiceConfig) -> Result<Self, StoreError> {
        let store = FileStore::open(&config.storage_dir)?;
        Ok(Self { store, config })
    }
}

// ── Responses ────────────────────────────────────────────────────────────

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct StatusResponse {
    pub status: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,
}

impl StatusResponse {
    fn ok(message: impl Into<String>) -> Self {
        Self {
            status: "ok".into(),
            message: message.into(),
            filename: None,
        }
    }
}

/// Error surfaced to HTTP clients
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    fn unprocessable(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNPROCESSABLE_ENTITY, message)
    }

    fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            tracing::error!(status = %self.status, "{}", self.message);
        } else {
            tracing::warn!(status = %self.status, "{}", self.message);
        }
        let body = StatusResponse {
            status: "error".into(),
            message: self.message,
            filename: None,
        };
        (self.status, Json(body)).into_response()
    }
}

impl From<StoreError> for ApiError {
    fn from(e: StoreError) -> Self {
        let status = match e {
            StoreError::InvalidName(_) => StatusCode::BAD_REQUEST,
            StoreError::NotFound(_) => StatusCode::NOT_FOUND,
            StoreError::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        Self::new(status, e.to_string())
    }
}

impl From<ParseError> for ApiError {
    fn from(e: ParseError) -> Self {
        match e {
            ParseError::Io(_) => Self::internal(e.to_string()),
            ParseError::InvalidValue(_) | ParseError::Normalize(_) => {
                Self::unprocessable(e.to_string())
            }
        }
    }
}

impl From<RenderError> for ApiError {
    fn from(e: RenderError) -> Self {
        Self::internal(format!("Rendering failed: {e}"))
    }
}

// ── Core operations ──────────────────────────────────────────────────────

/// Render a stored CSV to PNG bytes.
///
/// A file that is not in the store counts as "no data", like an empty CSV.
pub fn render_chart(
    store: &FileStore,
    config: &ServiceConfig,
    filename: &str,
    title: &str,
) -> Result<Vec<u8>, ApiError> {
    let path = store.path_for(filename)?;
    let tasks = load_tasks(&path)?;
    let renderer = PngRenderer::new().dpi(config.dpi);
    plot_gantt(title, &tasks, &config.theme, &renderer)?
        .ok_or_else(|| ApiError::unprocessable(format!("no tasks to render in {filename}")))
}

fn attachment(filename: &str) -> String {
    format!("attachment; filename=\"{}\"", filename.replace('"', ""))
}

// ── Handlers ─────────────────────────────────────────────────────────────

async fn health_check() -> Json<StatusResponse> {
    Json(StatusResponse::ok("waterfall Gantt chart service is running"))
}

async fn upload(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<Json<StatusResponse>, ApiError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::bad_request(format!("invalid multipart body: {e}")))?
    {
        if field.name() != Some("file") {
            continue;
        }
        let name = field
            .file_name()
            .map(str::to_string)
            .ok_or_else(|| ApiError::bad_request("upload has no file name"))?;
        let bytes = field
            .bytes()
            .await
            .map_err(|e| ApiError::bad_request(format!("failed to read upload: {e}")))?;

        let stored = state.store.save(&name, &bytes)?;
        return Ok(Json(StatusResponse {
            status: "ok".into(),
            message: format!("stored {} bytes", bytes.len()),
            filename: Some(stored),
        }));
    }
    Err(ApiError::bad_request("multipart field `file` is missing"))
}

async fn download(
    State(state): State<Arc<AppState>>,
    Path(filename): Path<String>,
) -> Result<Response, ApiError> {
    let name = FileStore::sanitize(&filename)?;
    let bytes = state.store.read(&name)?;
    let headers = [
        (header::CONTENT_TYPE, "application/octet-stream".to_string()),
        (header::CONTENT_DISPOSITION, attachment(&name)),
    ];
    Ok((headers, bytes).into_response())
}

#[derive(Debug, Default, Deserialize)]
pub struct ChartParams {
    pub title: Option<String>,
}

async fn create_chart(
    State(state): State<Arc<AppState>>,
    Path(filename): Path<String>,
    Query(params): Query<ChartParams>,
) -> Result<Response, ApiError> {
    let title = params.title.unwrap_or_else(|| default_title(&filename));
    let worker_state = Arc::clone(&state);
    let png = tokio::task::spawn_blocking(move || {
        render_chart(&worker_state.store, &worker_state.config, &filename, &title)
    })
    .await
    .map_err(|e| ApiError::internal(format!("render task failed: {e}")))??;

    tracing::info!(bytes = png.len(), "rendered chart");
    let headers = [
        (header::CONTENT_TYPE, "image/png".to_string()),
        (header::CONTENT_DISPOSITION, attachment(CHART_FILENAME)),
    ];
    Ok((headers, png).into_response())
}

/// Chart title derived from an uploaded file name (`roadmap.csv` → `roadmap`)
pub fn default_title(filename: &str) -> String {
    let name = FileStore::sanitize(filename).unwrap_or_else(|_| filename.to_string());
    match name.rsplit_once('.') {
        Some((stem, _)) if !stem.is_empty() => stem.to_string(),
        _ => name,
    }
}

// ── Router ───────────────────────────────────────────────────────────────

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/health_check", get(health_check))
        .route("/api/upload", post(upload))
        .route("/api/download/{filename}", get(download))
        .route("/api/chart/{filename}", post(create_chart))
        .with_state(state)
}

/// Bind and serve until the process is stopped
pub async fn serve(config: ServiceConfig) -> anyhow::Result<()> {
    let addr = config.bind.clone();
    let state = Arc::new(AppState::new(config)?);
    tracing::info!(storage = %state.store.root().display(), "file store ready");

    let app = router(state);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("waterfall listening on {addr}");
    axum::serve(listener, app).await?;
    Ok(())
}
