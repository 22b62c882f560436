//! HTTP surface: the routes the browser front end talks to.
//!
//! | Route | Body | Reply |
//! |-------|------|-------|
//! | `POST /api/fetch-document` | `{documentUrl}` | `{content}` |
//! | `POST /api/summarize` | `{content}` | `{agendas}` |
//! | `POST /api/generate-slide` | `{title, summary}` | `{imageBase64}` |
//! | `POST /api/jobs` | `{documentUrl}` | SSE: `progress`… then `done` or `error` |
//! | `POST /api/export` | `{agendas}` | `application/pdf` attachment |
//! | `GET /api/health` | | `ok` |
//!
//! Failures are `{ "error": message }` with status 400 for invalid input and
//! 500 for everything else.

use crate::agenda::{AgendaItem, JobPhase};
use crate::config::AppConfig;
use crate::error::SlideDeckError;
use crate::orchestrator::Orchestrator;
use crate::pipeline::export::{export_pdf, DECK_FILE_NAME};
use crate::pipeline::fetch::ExportFetcher;
use crate::pipeline::slide::GeminiSlideRenderer;
use crate::pipeline::summarize::GeminiSummarizer;
use crate::pipeline::{AgendaSummarizer, DocumentSource, SlideRenderer};
use crate::progress::JobEvent;
use crate::stream::run_stream;
use axum::{
    extract::{rejection::JsonRejection, DefaultBodyLimit, State},
    http::{header, StatusCode},
    response::{
        sse::{Event, KeepAlive, Sse},
        IntoResponse, Response,
    },
    routing::{get, post},
    Json, Router,
};
use futures::StreamExt;
use serde::{Deserialize, Serialize};
use std::convert::Infallible;
use std::sync::Arc;
use tracing::{error, info};

/// Shared state behind every route.
#[derive(Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub source: Arc<dyn DocumentSource>,
    pub summarizer: Arc<dyn AgendaSummarizer>,
    pub renderer: Arc<dyn SlideRenderer>,
}

impl AppState {
    /// State wired to the real HTTP stages.
    pub fn from_config(config: AppConfig) -> Result<Self, SlideDeckError> {
        Ok(Self {
            source: Arc::new(ExportFetcher::new(&config)?),
            summarizer: Arc::new(GeminiSummarizer::new(&config)?),
            renderer: Arc::new(GeminiSlideRenderer::new(&config)?),
            config,
        })
    }

    fn orchestrator(&self) -> Orchestrator {
        Orchestrator::new(
            Arc::clone(&self.source),
            Arc::clone(&self.summarizer),
            Arc::clone(&self.renderer),
        )
    }
}

/// Error body returned by every route.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Route-level error: a pipeline error or a rejected request body.
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl From<SlideDeckError> for ApiError {
    fn from(e: SlideDeckError) -> Self {
        let status =
            StatusCode::from_u16(e.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        Self {
            status,
            message: e.to_string(),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(e: JsonRejection) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: e.body_text(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            error!("{}", self.message);
        }
        (
            self.status,
            Json(ErrorResponse {
                error: self.message,
            }),
        )
            .into_response()
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentRequest {
    #[serde(default)]
    pub document_url: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ContentBody {
    #[serde(default)]
    pub content: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AgendasBody {
    #[serde(default)]
    pub agendas: Vec<AgendaItem>,
}

#[derive(Debug, Deserialize)]
pub struct SlideRequest {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub summary: String,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SlideResponse {
    pub image_base64: String,
}

/// Request body cap for `/api/export`, which carries every slide inline.
pub const MAX_EXPORT_BODY: usize = 64 * 1024 * 1024;

/// Build the router for `state`.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/health", get(|| async { "ok" }))
        .route("/api/fetch-document", post(fetch_document_handler))
        .route("/api/summarize", post(summarize_handler))
        .route("/api/generate-slide", post(generate_slide_handler))
        .route("/api/jobs", post(jobs_handler))
        .route(
            "/api/export",
            post(export_handler).layer(DefaultBodyLimit::max(MAX_EXPORT_BODY)),
        )
        .with_state(state)
}

/// Bind `addr` and serve until the process is stopped.
pub async fn serve(addr: &str, state: AppState) -> std::io::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Listening on http://{}", listener.local_addr()?);
    axum::serve(listener, router(state)).await
}

async fn fetch_document_handler(
    State(state): State<AppState>,
    body: Result<Json<DocumentRequest>, JsonRejection>,
) -> Result<Json<ContentBody>, ApiError> {
    let Json(req) = body?;
    let content = state.source.fetch_text(&req.document_url).await?;
    Ok(Json(ContentBody { content }))
}

async fn summarize_handler(
    State(state): State<AppState>,
    body: Result<Json<ContentBody>, JsonRejection>,
) -> Result<Json<AgendasBody>, ApiError> {
    let Json(req) = body?;
    let agendas = state.summarizer.summarize(&req.content).await?;
    Ok(Json(AgendasBody { agendas }))
}

async fn generate_slide_handler(
    State(state): State<AppState>,
    body: Result<Json<SlideRequest>, JsonRejection>,
) -> Result<Json<SlideResponse>, ApiError> {
    let Json(req) = body?;
    let image_base64 = state.renderer.render(&req.title, &req.summary).await?;
    Ok(Json(SlideResponse { image_base64 }))
}

fn sse_event(ev: &JobEvent) -> Event {
    let name = if !ev.phase.is_terminal() {
        "progress"
    } else if ev.phase == JobPhase::Done {
        "done"
    } else {
        "error"
    };
    Event::default()
        .event(name)
        .json_data(ev)
        .unwrap_or_else(|e| Event::default().event("error").data(e.to_string()))
}

async fn jobs_handler(
    State(state): State<AppState>,
    body: Result<Json<DocumentRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(req) = body?;
    // Reject unusable URLs up front so the caller gets a 400, not an SSE error.
    crate::pipeline::fetch::extract_document_id(&req.document_url)?;

    let events = run_stream(state.orchestrator(), req.document_url)
        .map(|ev| Ok::<_, Infallible>(sse_event(&ev)));

    Ok((
        [("X-Accel-Buffering", "no"), ("Cache-Control", "no-cache")],
        Sse::new(events).keep_alive(KeepAlive::default()),
    ))
}

async fn export_handler(
    State(state): State<AppState>,
    body: Result<Json<AgendasBody>, JsonRejection>,
) -> Result<Response, ApiError> {
    let Json(req) = body?;
    let deck = export_pdf(&req.agendas, &state.config).await?;
    Ok((
        [
            (header::CONTENT_TYPE, "application/pdf".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{DECK_FILE_NAME}\""),
            ),
        ],
        deck.bytes,
    )
        .into_response())
}
