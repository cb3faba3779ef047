//! HTTP service
//!
//! axum router exposing upload, history, rerun and delete over the
//! [`Analyzer`]. Analyses run on the blocking pool; handlers only parse
//! requests and map errors to status codes.

use axum::{
    Json, Router,
    extract::{DefaultBodyLimit, Multipart, Path, State, multipart::MultipartError},
    http::StatusCode,
    routing::{delete, get, post},
};
use hypotest_core::{AnalysisError, Analyzer, Dataset, DatasetError, parse_configuration};
use hypotest_report::{AnalysisResponse, ErrorResponse, HealthResponse};
use serde_json::{Value, json};
use std::net::SocketAddr;
use tracing::{debug, error, info, warn};

/// Room for multipart framing and the small text fields on top of the file
const MULTIPART_OVERHEAD: usize = 64 * 1024;

/// Ingestion limits enforced before a dataset reaches the analyzer
#[derive(Debug, Clone, Copy)]
pub struct UploadLimits {
    /// Largest accepted file, in bytes
    pub max_upload_bytes: usize,
    /// Largest accepted number of data rows
    pub max_rows: usize,
}

/// Shared handler state
#[derive(Debug, Clone)]
pub struct AppState {
    /// Orchestrator over the configured store
    pub analyzer: Analyzer,
    /// Upload limits
    pub limits: UploadLimits,
    /// Confidence level used when an upload omits `confidence_level`
    pub default_confidence_level: f64,
}

type ApiError = (StatusCode, Json<ErrorResponse>);
type ApiResult<T> = Result<Json<T>, ApiError>;

/// Build the service router
pub fn router(state: AppState) -> Router {
    let body_limit = state
        .limits
        .max_upload_bytes
        .saturating_add(MULTIPART_OVERHEAD);

    Router::new()
        .route("/", get(root_handler))
        .route("/health", get(health_handler))
        .route("/upload", post(upload_handler))
        .route("/history", get(history_handler))
        .route("/rerun/:id", post(rerun_handler))
        .route("/delete/:id", delete(delete_handler))
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(state)
}

/// Bind `addr` and serve until Ctrl-C
pub async fn serve(addr: SocketAddr, state: AppState) -> anyhow::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(addr = %listener.local_addr()?, "hypotest listening");

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("hypotest stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "failed to listen for shutdown signal");
    }
}

fn error_response(status: StatusCode, kind: &str, message: impl Into<String>) -> ApiError {
    (
        status,
        Json(ErrorResponse {
            error: message.into(),
            kind: kind.to_string(),
        }),
    )
}

fn status_for(e: &AnalysisError) -> StatusCode {
    match e {
        AnalysisError::MalformedDataset(DatasetError::TooManyRows { .. }) => {
            StatusCode::PAYLOAD_TOO_LARGE
        }
        AnalysisError::NotFound(_) => StatusCode::NOT_FOUND,
        AnalysisError::Storage(_) => StatusCode::SERVICE_UNAVAILABLE,
        AnalysisError::MalformedDataset(_)
        | AnalysisError::InvalidTestConfiguration(_)
        | AnalysisError::InvalidParameter(_) => StatusCode::BAD_REQUEST,
    }
}

fn analysis_error(e: AnalysisError) -> ApiError {
    let status = status_for(&e);
    if e.is_retryable() {
        error!(kind = e.kind(), error = %e, "request failed");
    } else {
        warn!(kind = e.kind(), status = status.as_u16(), error = %e, "request rejected");
    }
    error_response(status, e.kind(), e.to_string())
}

fn multipart_error(e: MultipartError) -> ApiError {
    let status = e.status();
    warn!(status = status.as_u16(), error = %e.body_text(), "unreadable upload");
    let kind = if status == StatusCode::PAYLOAD_TOO_LARGE {
        "payload_too_large"
    } else {
        "malformed_dataset"
    };
    error_response(status, kind, e.body_text())
}

/// Run `work` on the blocking pool
async fn blocking<T, F>(work: F) -> Result<T, ApiError>
where
    F: FnOnce() -> Result<T, AnalysisError> + Send + 'static,
    T: Send + 'static,
{
    match tokio::task::spawn_blocking(work).await {
        Ok(result) => result.map_err(analysis_error),
        Err(e) => {
            error!(error = %e, "analysis task panicked");
            Err(error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                "internal",
                "analysis task failed",
            ))
        }
    }
}

/// Path ids that are not numbers cannot name a stored analysis
fn parse_id(raw: &str) -> Result<u64, ApiError> {
    raw.parse().map_err(|_| {
        error_response(
            StatusCode::NOT_FOUND,
            "not_found",
            format!("analysis {raw} not found"),
        )
    })
}

async fn root_handler() -> Json<Value> {
    Json(json!({ "message": "Hypothesis Testing API" }))
}

async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::ok(env!("CARGO_PKG_VERSION")))
}

async fn upload_handler(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> ApiResult<AnalysisResponse> {
    let mut file = None;
    let mut test_type = None;
    let mut confidence_level = None;

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "file" => {
                let filename = field.file_name().unwrap_or("upload.csv").to_string();
                let bytes = field.bytes().await.map_err(multipart_error)?;
                file = Some((filename, bytes));
            }
            "test_type" => test_type = Some(field.text().await.map_err(multipart_error)?),
            "confidence_level" => {
                confidence_level = Some(field.text().await.map_err(multipart_error)?)
            }
            _ => debug!(field = %name, "ignoring unknown upload field"),
        }
    }

    let (filename, bytes) = file.ok_or_else(|| {
        error_response(
            StatusCode::BAD_REQUEST,
            "malformed_dataset",
            "missing multipart field 'file'",
        )
    })?;
    if bytes.len() > state.limits.max_upload_bytes {
        return Err(error_response(
            StatusCode::PAYLOAD_TOO_LARGE,
            "payload_too_large",
            format!(
                "upload of {} bytes exceeds the limit of {} bytes",
                bytes.len(),
                state.limits.max_upload_bytes
            ),
        ));
    }

    let test_type = test_type.ok_or_else(|| {
        error_response(
            StatusCode::BAD_REQUEST,
            "invalid_test_configuration",
            "missing multipart field 'test_type'",
        )
    })?;
    let confidence_level = match confidence_level {
        Some(text) => text.trim().parse::<f64>().map_err(|_| {
            error_response(
                StatusCode::BAD_REQUEST,
                "invalid_test_configuration",
                format!("confidence_level '{text}' is not a number"),
            )
        })?,
        None => state.default_confidence_level,
    };

    let analyzer = state.analyzer.clone();
    let max_rows = state.limits.max_rows;
    let record = blocking(move || {
        let configuration = parse_configuration(test_type.trim(), confidence_level)?;
        let dataset = Dataset::from_csv_reader(bytes.as_ref(), Some(max_rows))?;
        analyzer.run_analysis(&dataset, configuration, &filename)
    })
    .await?;

    Ok(Json(AnalysisResponse::from(&record)))
}

async fn history_handler(State(state): State<AppState>) -> ApiResult<Vec<AnalysisResponse>> {
    let history = state.analyzer.history().map_err(analysis_error)?;
    Ok(Json(history.iter().map(AnalysisResponse::from).collect()))
}

async fn rerun_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<AnalysisResponse> {
    let id = parse_id(&id)?;
    let analyzer = state.analyzer.clone();
    let record = blocking(move || analyzer.rerun(id)).await?;
    Ok(Json(AnalysisResponse::from(&record)))
}

async fn delete_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Value> {
    let id = parse_id(&id)?;
    let analyzer = state.analyzer.clone();
    blocking(move || analyzer.delete(id)).await?;
    Ok(Json(json!({ "detail": "Deleted" })))
}
