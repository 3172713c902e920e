//! HTTP surface: the upload page and the two analysis endpoints.

use std::{io, sync::Arc, time::Instant};

use axum::{
    extract::{DefaultBodyLimit, Multipart, State},
    http::StatusCode,
    response::{Html, IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use rand::{rngs::StdRng, SeedableRng};
use serde::Serialize;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};

use crate::analyzer::ChatTransport;
use crate::config::Config;
use crate::encoder::ImageAsset;
use crate::error::{AnalysisOutcome, AnalyzerError, ErrorKind};
use crate::pipeline;
use crate::render::markdown_to_html;

pub const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

const INDEX_HTML: &str = include_str!("index.html");

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub transport: Arc<dyn ChatTransport>,
}

impl AppState {
    pub fn new(config: Config, transport: impl ChatTransport + 'static) -> Self {
        Self {
            config: Arc::new(config),
            transport: Arc::new(transport),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct AnalyzeResponse {
    pub result: String,
    pub model: String,
    pub processing_time_ms: u128,
}

#[derive(Debug, Serialize)]
pub struct DescribeResponse {
    pub result: String,
    /// `result` rendered for the page.
    pub html: String,
    /// True when `result` is fallback content rather than provider output.
    pub degraded: bool,
    pub model: String,
    pub processing_time_ms: u128,
}

/// JSON `{ "error": ... }` body with a status code.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    fn from_failure(kind: ErrorKind, message: String) -> Self {
        Self::new(status_for(kind), message)
    }
}

impl From<AnalyzerError> for ApiError {
    fn from(err: AnalyzerError) -> Self {
        Self::from_failure(err.kind(), err.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(serde_json::json!({ "error": self.message })),
        )
            .into_response()
    }
}

fn status_for(kind: ErrorKind) -> StatusCode {
    match kind {
        ErrorKind::InvalidInput | ErrorKind::IoFailure => StatusCode::BAD_REQUEST,
        ErrorKind::MissingCredential | ErrorKind::EmptyResult | ErrorKind::ProviderError => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/api/analyze", post(analyze_image))
        .route("/api/describe", post(describe_image))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}

async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

#[derive(Default)]
struct UploadForm {
    image: Option<ImageAsset>,
    prompt: Option<String>,
}

impl UploadForm {
    async fn read(mut multipart: Multipart) -> Result<Self, ApiError> {
        let mut form = Self::default();

        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| ApiError::new(e.status(), e.body_text()))?
        {
            let name = field.name().map(str::to_string);
            match name.as_deref() {
                Some("image") => {
                    let media_type = field.content_type().map(str::to_string);
                    let filename = field.file_name().map(str::to_string);
                    let data = field
                        .bytes()
                        .await
                        .map_err(|e| AnalyzerError::Io(io::Error::other(e.body_text())))?;
                    form.image = Some(ImageAsset::new(data.to_vec(), media_type.as_deref(), filename));
                }
                Some("prompt") => {
                    let text = field
                        .text()
                        .await
                        .map_err(|e| ApiError::bad_request(e.body_text()))?;
                    form.prompt = Some(text);
                }
                _ => {}
            }
        }

        Ok(form)
    }

    fn into_parts(self) -> Result<(ImageAsset, Option<String>), ApiError> {
        let image = self
            .image
            .ok_or_else(|| ApiError::bad_request("No image provided"))?;
        Ok((image, self.prompt))
    }
}

async fn analyze_image(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<AnalyzeResponse>, ApiError> {
    let start = Instant::now();
    let (asset, prompt) = UploadForm::read(multipart).await?.into_parts()?;

    info!(
        bytes = asset.bytes.len(),
        media_type = %asset.media_type,
        filename = asset.filename.as_deref().unwrap_or("-"),
        "received image for analysis"
    );

    let outcome =
        pipeline::run(state.transport.as_ref(), &asset, prompt.as_deref(), &state.config).await;

    match outcome {
        AnalysisOutcome::Success { markdown_text } => Ok(Json(AnalyzeResponse {
            result: markdown_text,
            model: state.config.model_name.clone(),
            processing_time_ms: start.elapsed().as_millis(),
        })),
        AnalysisOutcome::Failure { kind, message } => {
            warn!(?kind, %message, "analysis failed");
            Err(ApiError::from_failure(kind, message))
        }
    }
}

async fn describe_image(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<DescribeResponse>, ApiError> {
    let start = Instant::now();
    let (asset, prompt) = UploadForm::read(multipart).await?.into_parts()?;

    let mut rng = StdRng::from_entropy();
    let description = pipeline::describe(
        state.transport.as_ref(),
        &asset,
        prompt.as_deref(),
        &state.config,
        &mut rng,
    )
    .await;

    Ok(Json(DescribeResponse {
        html: markdown_to_html(&description.markdown),
        result: description.markdown,
        degraded: description.degraded,
        model: state.config.model_name.clone(),
        processing_time_ms: start.elapsed().as_millis(),
    }))
}
