use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::{header, HeaderValue, StatusCode};
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use delver_core::RunStatusEvent;
use delver_pipeline::ResearchPipeline;
use serde::Deserialize;
use std::convert::Infallible;
use std::path::PathBuf;
use std::sync::Arc;
use tokio_stream::StreamExt;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::info;

/// Gateway settings.
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// Deployment environment reported by `/health`.
    pub environment: String,
    /// Directory served under `/static/exports`.
    pub export_root: PathBuf,
}

/// Shared application state.
///
/// The pipeline itself is stateless across runs; each request spawns an
/// isolated run, so nothing here is mutated concurrently.
pub struct AppState {
    /// The research pipeline serving `/research` requests.
    pub pipeline: Arc<ResearchPipeline>,
    environment: String,
}

/// Build the gateway router.
pub fn build(pipeline: Arc<ResearchPipeline>, config: GatewayConfig) -> Router {
    let state = Arc::new(AppState {
        pipeline,
        environment: config.environment,
    });

    Router::new()
        .route("/research", post(research_handler))
        .route("/health", get(health_handler))
        .nest_service("/static/exports", ServeDir::new(config.export_root))
        .fallback(not_found_handler)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[derive(Debug, Deserialize)]
struct ResearchRequest {
    #[serde(default)]
    query: Option<String>,
}

/// `POST /research` — validate, then stream one run as SSE frames.
async fn research_handler(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<ResearchRequest>, JsonRejection>,
) -> Response {
    let query = match payload {
        Ok(Json(ResearchRequest { query: Some(query) })) => query.trim().to_string(),
        // Unparseable body or a body without a query field.
        _ => return bad_request("No query provided"),
    };

    if query.is_empty() {
        return bad_request("Empty query provided");
    }

    info!(query = %query, "Research request accepted");

    let frames = state
        .pipeline
        .run(&query)
        .map(|event| Ok::<Event, Infallible>(Event::default().data(frame(&event))));

    let mut response = Sse::new(frames).keep_alive(KeepAlive::default()).into_response();
    let headers = response.headers_mut();
    headers.insert(header::CACHE_CONTROL, HeaderValue::from_static("no-cache"));
    // Tell buffering reverse proxies to pass chunks through untouched.
    headers.insert("X-Accel-Buffering", HeaderValue::from_static("no"));
    response
}

fn bad_request(message: &str) -> Response {
    (
        StatusCode::BAD_REQUEST,
        Json(serde_json::json!({"error": message})),
    )
        .into_response()
}

/// One SSE `data:` payload per status event.
fn frame(event: &RunStatusEvent) -> String {
    let value = match event {
        RunStatusEvent::Error { message } => serde_json::json!({"error": message}),
        RunStatusEvent::Complete => serde_json::json!({"complete": true}),
        other => serde_json::json!({"content": other.message()}),
    };
    value.to_string()
}

async fn health_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "healthy",
        "version": env!("CARGO_PKG_VERSION"),
        "environment": state.environment,
    }))
}

async fn not_found_handler() -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        Json(serde_json::json!({"error": "Not found"})),
    )
}
