use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::{Html, IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info, warn};

use crate::agents::ReactAgent;
use crate::config::AppConfig;
use crate::services::quote::{QuoteOutcome, QuoteService};
use crate::ui;

pub struct AppState {
    pub config: AppConfig,
    pub quotes: Arc<QuoteService>,
    pub chart_dir: PathBuf,
    /// `None` when no language model is configured
    pub agent: Option<Arc<ReactAgent>>,
}

pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/get_stock_price", get(get_stock_price))
        .route("/charts/{file}", get(serve_chart))
        .route("/health", get(health))
        .route("/chat", post(chat))
        .with_state(state)
}

pub async fn run_server(state: Arc<AppState>) -> std::io::Result<()> {
    let addr = state.config.bind_addr();
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("🌐 [API] Server listening on {}", addr);
    axum::serve(listener, app).await
}

#[derive(Deserialize)]
struct TickerParams {
    ticker: Option<String>,
}

fn error_response(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "error": message }))).into_response()
}

async fn get_stock_price(
    State(state): State<Arc<AppState>>,
    Query(params): Query<TickerParams>,
) -> Response {
    let raw = params.ticker.unwrap_or_default();
    let outcome = state.quotes.render_quote(&raw).await;

    match &outcome {
        QuoteOutcome::MissingTicker { message } => error_response(StatusCode::BAD_REQUEST, message),
        QuoteOutcome::NotFound { message } => error_response(StatusCode::NOT_FOUND, message),
        QuoteOutcome::Success { .. } | QuoteOutcome::Degraded { .. } => {
            let chart = outcome.chart();
            Json(json!({
                "message": outcome.message(),
                "image": chart.map(|c| c.path.to_string_lossy().into_owned()),
                "chart_url": chart.map(|c| format!("/charts/{}", c.file_name)),
            }))
            .into_response()
        }
    }
}

/// A chart file name must be a single plain path component.
fn is_plain_file_name(name: &str) -> bool {
    !name.is_empty()
        && !name.starts_with('.')
        && !name.contains(['/', '\\'])
        && !name.contains("..")
}

async fn serve_chart(State(state): State<Arc<AppState>>, Path(file): Path<String>) -> Response {
    if !is_plain_file_name(&file) {
        warn!("⚠️ [API] Rejected chart path: {:?}", file);
        return error_response(StatusCode::BAD_REQUEST, "Invalid chart name.");
    }

    match tokio::fs::read(state.chart_dir.join(&file)).await {
        Ok(bytes) => ([(header::CONTENT_TYPE, "image/png")], bytes).into_response(),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            error_response(StatusCode::NOT_FOUND, "Chart not found.")
        }
        Err(e) => {
            error!("❌ [API] Failed to read chart {}: {}", file, e);
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "Failed to read chart.")
        }
    }
}

async fn health() -> &'static str {
    "ok"
}

#[derive(Deserialize)]
struct ChatRequest {
    #[serde(default)]
    message: String,
}

async fn chat(State(state): State<Arc<AppState>>, Json(req): Json<ChatRequest>) -> Response {
    let Some(agent) = state.agent.as_ref() else {
        return error_response(
            StatusCode::SERVICE_UNAVAILABLE,
            "No language model is configured.",
        );
    };

    let message = req.message.trim();
    if message.is_empty() {
        return error_response(StatusCode::BAD_REQUEST, "Please provide a message.");
    }

    info!("💬 [API] Chat request: {}", message);
    match agent.run(message).await {
        Ok(reply) => Json(json!({ "reply": reply.answer, "steps": reply.steps })).into_response(),
        Err(e) => {
            error!("❌ [API] Agent failed: {}", e);
            error_response(StatusCode::BAD_GATEWAY, &e.to_string())
        }
    }
}

async fn index(State(state): State<Arc<AppState>>, Query(params): Query<TickerParams>) -> Html<String> {
    let pair = state.quotes.pair();
    match params.ticker {
        None => Html(ui::render_page(ui::DEFAULT_TICKER, pair, None)),
        Some(ticker) => {
            let outcome = state.quotes.render_quote(&ticker).await;
            Html(ui::render_page(&ticker, pair, Some(&outcome)))
        }
    }
}
