//! HTTP front-end over the analyzers.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use anyhow::Context;
use axum::body::Bytes;
use axum::extract::multipart::{MultipartError, MultipartRejection};
use axum::extract::{DefaultBodyLimit, Multipart, State};
use axum::http::{HeaderValue, Method, StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Serialize;
use thiserror::Error;
use tokio::task::JoinError;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{error, info};
use uuid::Uuid;

use crate::analyzer::Backend;
use crate::config::ServerConfig;
use crate::error::ClassifyError;
use crate::formatter::ClassificationResult;
use crate::helpers::timestamp;
use crate::mapping::Variant;
use crate::mock::MockAnalyzer;
use crate::response::{ClassifyResponse, MockTacoResponse, MockWasteNetResponse};
use crate::state::AppState;

const ALLOWED_ORIGINS: [&str; 2] = ["http://localhost:3000", "http://localhost:3001"];

/// Largest accepted request body. Uploads are full-size camera photos.
pub const MAX_UPLOAD_BYTES: usize = 32 * 1024 * 1024;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("No image provided")]
    MissingImage,

    #[error("failed to read upload: {0}")]
    Multipart(#[from] MultipartError),

    #[error(transparent)]
    Classify(#[from] ClassifyError),

    #[error("classification worker failed: {0}")]
    Worker(#[from] JoinError),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::MissingImage | ApiError::Multipart(_) => StatusCode::BAD_REQUEST,
            ApiError::Classify(ClassifyError::Decode(_)) => StatusCode::BAD_REQUEST,
            ApiError::Classify(_) | ApiError::Worker(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            self.status(),
            Json(ErrorResponse {
                error: self.to_string(),
            }),
        )
            .into_response()
    }
}

#[derive(Serialize)]
struct ModelsStatus {
    trashnet: Backend,
    taco: Backend,
    wastenet: Backend,
}

/// Health check response
#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    timestamp: String,
    model_loaded: bool,
    models: ModelsStatus,
}

fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(ALLOWED_ORIGINS.map(HeaderValue::from_static))
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
        .allow_credentials(true)
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/health", get(health_handler))
        .route("/api/classify", post(classify_handler))
        .route("/api/taco/classify", post(taco_classify_handler))
        .route("/api/wastenet/classify", post(wastenet_classify_handler))
        .route("/mock/taco", post(mock_taco_handler))
        .route("/mock/wastenet", post(mock_wastenet_handler))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .layer(cors_layer())
        .layer(TraceLayer::new_for_http())
        .with_state(Arc::new(state))
}

/// Run the HTTP server
pub async fn run_server(config: ServerConfig, state: AppState) -> anyhow::Result<()> {
    let app = router(state);

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    let local: SocketAddr = listener.local_addr()?;

    info!("Server listening on http://{}", local);
    info!("  GET  /api/health");
    info!("  POST /api/classify           (trashnet)");
    info!("  POST /api/taco/classify");
    info!("  POST /api/wastenet/classify");
    info!("  POST /mock/taco, /mock/wastenet");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shutdown complete");
    Ok(())
}

async fn health_handler(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        timestamp: timestamp(),
        model_loaded: true,
        models: ModelsStatus {
            trashnet: state.backend(Variant::TrashNet),
            taco: state.backend(Variant::Taco),
            wastenet: state.backend(Variant::WasteNet),
        },
    })
}

async fn classify_handler(
    State(state): State<Arc<AppState>>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<ClassifyResponse>, ApiError> {
    classify_upload(&state, Variant::TrashNet, multipart).await
}

async fn taco_classify_handler(
    State(state): State<Arc<AppState>>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<ClassifyResponse>, ApiError> {
    classify_upload(&state, Variant::Taco, multipart).await
}

async fn wastenet_classify_handler(
    State(state): State<Arc<AppState>>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<ClassifyResponse>, ApiError> {
    classify_upload(&state, Variant::WasteNet, multipart).await
}

async fn mock_taco_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<MockTacoResponse>, ApiError> {
    let result = generate_mock(&state.mock_taco, Variant::Taco)?;
    Ok(Json(result.into()))
}

async fn mock_wastenet_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<MockWasteNetResponse>, ApiError> {
    let result = generate_mock(&state.mock_wastenet, Variant::WasteNet)?;
    Ok(Json(result.into()))
}

fn generate_mock(
    analyzer: &MockAnalyzer,
    variant: Variant,
) -> Result<ClassificationResult, ApiError> {
    let result = analyzer.generate()?;
    info!(%variant, category = %result.category, confidence = result.confidence, "mock result");
    Ok(result)
}

async fn read_image(multipart: Result<Multipart, MultipartRejection>) -> Result<Bytes, ApiError> {
    let mut multipart = multipart.map_err(|_| ApiError::MissingImage)?;
    while let Some(field) = multipart.next_field().await? {
        if field.name() == Some("image") {
            return Ok(field.bytes().await?);
        }
    }
    Err(ApiError::MissingImage)
}

async fn classify_upload(
    state: &AppState,
    variant: Variant,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<ClassifyResponse>, ApiError> {
    let request_id = Uuid::new_v4();
    let bytes = read_image(multipart).await?;
    info!(%request_id, %variant, bytes = bytes.len(), "classifying upload");

    let start = Instant::now();
    let analyzer = state.analyzer(variant);
    let outcome = tokio::task::spawn_blocking(move || analyzer.analyze_bytes(&bytes))
        .await
        .map_err(ApiError::from)
        .and_then(|result| result.map_err(ApiError::from));
    let elapsed_ms = start.elapsed().as_secs_f64() * 1000.0;

    match outcome {
        Ok(result) => {
            info!(
                %request_id,
                %variant,
                category = %result.category,
                confidence = result.confidence,
                elapsed_ms,
                "classification completed"
            );
            Ok(Json(ClassifyResponse::for_variant(variant, result)))
        }
        Err(e) => {
            error!(%request_id, %variant, error = %e, elapsed_ms, "classification failed");
            Err(e)
        }
    }
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, starting graceful shutdown...");
        }
        _ = terminate => {
            info!("Received SIGTERM, starting graceful shutdown...");
        }
    }
}
