use std::sync::Arc;

use axum::{
    Router,
    extract::{DefaultBodyLimit, Multipart, State},
    http::StatusCode,
    response::Json,
    routing::{get, post},
};
use serde_json::{Value, json};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{error, info, warn};

use crate::config::ServiceConfig;
use crate::error::ClaimError;
use crate::inference::{InferenceClient, OpenRouterClient};
use crate::models::{
    AdjudicationVerdict, CategoryUploads, DocumentCategory, ExtractionResults, UploadedFile,
};
use crate::pipeline::{AdjudicationEngine, DocumentPipeline, PageExtractor, PdfRasterizer};

const MAX_UPLOAD_BYTES: usize = 25 * 1024 * 1024;

type ApiResult<T> = Result<Json<T>, ApiError>;
type ApiError = (StatusCode, Json<Value>);

fn bad_request_error(message: &str) -> ApiError {
    (StatusCode::BAD_REQUEST, Json(json!({ "error": message })))
}

fn internal_error(message: &str) -> ApiError {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({ "error": message })),
    )
}

#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<DocumentPipeline>,
    pub engine: Arc<AdjudicationEngine>,
}

pub fn create_app(config: &ServiceConfig) -> anyhow::Result<Router> {
    let client: Arc<dyn InferenceClient> = Arc::new(OpenRouterClient::new(
        config.api_key.clone(),
        config.request_timeout,
    )?);

    let extractor = PageExtractor::new(client.clone(), config.extraction_model.clone());
    let pipeline = DocumentPipeline::new(extractor, Arc::new(PdfRasterizer));
    let engine = AdjudicationEngine::new(client, config.adjudication_model.clone());

    Ok(build_router(AppState {
        pipeline: Arc::new(pipeline),
        engine: Arc::new(engine),
    }))
}

fn build_router(app_state: AppState) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/health", get(health_check))
        .route("/claims/extract", post(extract_documents))
        .route("/claims/adjudicate", post(adjudicate_claim))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(app_state)
}

async fn root() -> Json<Value> {
    Json(json!({
        "service": "Claim Adjudication Service",
        "version": "1.0.0",
        "description": "Two-stage medical claim processing: per-page field extraction followed by rule-guided adjudication",
        "endpoints": {
            "POST /claims/extract": "Extract structured fields from uploaded medical documents",
            "POST /claims/adjudicate": "Adjudicate a claim from previously extracted data",
            "GET /health": "Health check"
        }
    }))
}

async fn health_check() -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339()
    }))
}

/// Stage 1 endpoint: multipart uploads keyed by category field name.
/// Unsupported files are skipped inside the pipeline; the endpoint itself
/// only fails on an unreadable request body.
async fn extract_documents(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> ApiResult<ExtractionResults> {
    info!("received request for document extraction");

    let mut uploads = CategoryUploads::default();

    while let Some(field) = multipart.next_field().await.map_err(|e| {
        error!(error = %e, "failed to read multipart body");
        bad_request_error("Could not read uploaded files.")
    })? {
        let field_name = field.name().map(str::to_owned);
        let Some(category) = field_name
            .as_deref()
            .and_then(DocumentCategory::from_upload_field)
        else {
            warn!(
                field = field_name.as_deref().unwrap_or_default(),
                "ignoring unrecognized multipart field"
            );
            continue;
        };

        let filename = field.file_name().unwrap_or("upload").to_owned();
        let contents = field
            .bytes()
            .await
            .map_err(|e| {
                error!(filename = %filename, error = %e, "failed to read uploaded file");
                bad_request_error("Could not read uploaded files.")
            })?
            .to_vec();

        uploads.push(category, UploadedFile { filename, contents });
    }

    if uploads.is_empty() {
        warn!("extraction request carried no files for any category");
    }

    let results = state.pipeline.run(uploads).await;
    Ok(Json(results))
}

/// Stage 2 endpoint: takes the stage-1 results (or any mapping with the same
/// category keys) and returns the verdict.
async fn adjudicate_claim(
    State(state): State<AppState>,
    Json(results): Json<ExtractionResults>,
) -> ApiResult<AdjudicationVerdict> {
    info!("received request for claim adjudication");

    match state.engine.adjudicate(&results).await {
        Ok(verdict) => Ok(Json(verdict)),
        Err(error @ ClaimError::NoInputData) => Err(bad_request_error(&error.to_string())),
        Err(error) => {
            error!(error = %error, "claim adjudication failed");
            Err(internal_error(
                "An internal error occurred during claim adjudication.",
            ))
        }
    }
}
