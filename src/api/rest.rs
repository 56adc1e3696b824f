//! Axum REST API handlers

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

use axum::{
    extract::{DefaultBodyLimit, Multipart, State},
    http::StatusCode,
    response::Json,
    routing::{get, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::error;

use crate::classes::TumorClass;
use crate::error::ClassifyError;
use crate::service::ScanService;

use super::dto::*;

/// Application state shared across handlers
pub struct AppState {
    pub service: Arc<ScanService>,
    pub start_time: Instant,
    pub total_classifications: AtomicU64,
}

/// Create the REST API router
pub fn create_rest_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/v1/classify", post(classify_handler))
        .route("/api/v1/classes", get(classes_handler))
        // System endpoints
        .route("/health", get(health_handler))
        .route("/api/v1/health", get(health_handler))
        .route("/metrics", get(metrics_handler))
        // Middleware
        .layer(DefaultBodyLimit::max(20 * 1024 * 1024)) // 20MB limit for uploads
        .layer(CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Map pipeline errors to an HTTP status and a stable error code
fn error_response(e: &ClassifyError) -> (StatusCode, Json<ErrorResponse>) {
    let (status, code) = match e {
        ClassifyError::UnsupportedImage { .. } => (StatusCode::BAD_REQUEST, "UNSUPPORTED_IMAGE"),
        ClassifyError::InvalidPrediction { .. } => {
            (StatusCode::UNPROCESSABLE_ENTITY, "INVALID_PREDICTION")
        }
        ClassifyError::ModelNotFound { .. } => (StatusCode::SERVICE_UNAVAILABLE, "MODEL_NOT_FOUND"),
        ClassifyError::ModelLoad { .. } => (StatusCode::SERVICE_UNAVAILABLE, "MODEL_LOAD_FAILED"),
        ClassifyError::ModelFetch { .. } => (StatusCode::SERVICE_UNAVAILABLE, "MODEL_FETCH_FAILED"),
        ClassifyError::Inference { .. } => (StatusCode::INTERNAL_SERVER_ERROR, "INFERENCE_FAILED"),
    };
    (status, Json(ErrorResponse::new(&e.to_string(), code)))
}

/// Classify an uploaded MRI image
async fn classify_handler(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<Json<ClassifyResponse>, (StatusCode, Json<ErrorResponse>)> {
    let mut image_data: Option<Vec<u8>> = None;

    while let Some(field) = multipart.next_field().await.map_err(|e| {
        (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse::new(&e.to_string(), "MULTIPART_ERROR")),
        )
    })? {
        let name = field.name().unwrap_or("").to_string();

        if name == "image" {
            image_data = Some(
                field
                    .bytes()
                    .await
                    .map_err(|e| {
                        (
                            StatusCode::BAD_REQUEST,
                            Json(ErrorResponse::new(&e.to_string(), "READ_ERROR")),
                        )
                    })?
                    .to_vec(),
            );
        }
    }

    let image_data = image_data.ok_or_else(|| {
        (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse::new("Missing image field", "MISSING_IMAGE")),
        )
    })?;

    let result = state.service.classify(&image_data).await.map_err(|e| {
        error!("Classification failed: {}", e);
        error_response(&e)
    })?;

    state.total_classifications.fetch_add(1, Ordering::Relaxed);

    Ok(Json(ClassifyResponse::from(result)))
}

/// Static per-class metadata for client rendering
async fn classes_handler() -> Json<ClassesResponse> {
    Json(ClassesResponse {
        classes: TumorClass::ALL.iter().map(|&c| ClassInfoDto::from(c)).collect(),
    })
}

/// Health check handler
async fn health_handler(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let health = state.service.health();
    Json(HealthResponse {
        healthy: health.healthy,
        version: health.version,
        model_loaded: health.model_loaded,
    })
}

/// Metrics handler
async fn metrics_handler(State(state): State<Arc<AppState>>) -> Json<MetricsResponse> {
    Json(MetricsResponse {
        uptime_seconds: state.start_time.elapsed().as_secs(),
        model_loaded: state.service.health().model_loaded,
        total_classifications: state.total_classifications.load(Ordering::Relaxed),
    })
}
