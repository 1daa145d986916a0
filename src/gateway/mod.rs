//! Axum-based HTTP gateway exposing the chat store and generative flows as a
//! JSON API, with body limits and request timeouts.

mod handlers;

use handlers::{
    handle_chat, handle_color_palettes, handle_create_chat, handle_design_suggestions,
    handle_health, handle_list_chats, handle_list_messages, handle_materials,
    handle_planning_ideas,
};

use crate::chat::ChatAction;
use crate::config::Config;
use crate::flows::FlowInvoker;
use crate::llm::{GeminiProvider, Provider};
use crate::store::{ChatStore, SqliteChatStore};
use anyhow::{Context, Result};
use axum::{
    Router,
    http::StatusCode,
    routing::{get, post},
};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::timeout::TimeoutLayer;

/// Maximum request body size (2MB) — image uploads arrive as base64 data URIs
pub const MAX_BODY_SIZE: usize = 2 * 1024 * 1024;
/// Request timeout (30s) — prevents slow-loris attacks
pub const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Shared state for all axum handlers
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn ChatStore>,
    pub flows: Arc<FlowInvoker>,
    pub action: Arc<ChatAction>,
    /// Transcript read cap applied when the request does not pass `limit`.
    pub history_limit: usize,
}

impl AppState {
    pub fn new(store: Arc<dyn ChatStore>, flows: Arc<FlowInvoker>, history_limit: usize) -> Self {
        let action = Arc::new(ChatAction::new(store.clone(), flows.clone()));
        Self {
            store,
            flows,
            action,
            history_limit,
        }
    }
}

/// Query params for GET /chats
#[derive(serde::Deserialize)]
pub struct ListChatsQuery {
    pub owner_id: String,
}

/// Query params for GET /chats/{id}/messages
#[derive(serde::Deserialize)]
pub struct ListMessagesQuery {
    pub limit: Option<usize>,
}

/// Request body for POST /chats
#[derive(serde::Deserialize)]
pub struct CreateChatBody {
    pub owner_id: String,
    #[serde(default)]
    pub seed_text: String,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handle_health))
        .route("/chat", post(handle_chat))
        .route("/materials", post(handle_materials))
        .route("/color-palettes", post(handle_color_palettes))
        .route("/design-suggestions", post(handle_design_suggestions))
        .route("/planning-ideas", post(handle_planning_ideas))
        .route("/chats", get(handle_list_chats))
        .route("/chats", post(handle_create_chat))
        .route("/chats/{id}/messages", get(handle_list_messages))
        .with_state(state)
        .layer(RequestBodyLimitLayer::new(MAX_BODY_SIZE))
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            Duration::from_secs(REQUEST_TIMEOUT_SECS),
        ))
}

/// Run the HTTP gateway.
pub async fn run_gateway(host: &str, port: u16, config: Config) -> Result<()> {
    let addr: SocketAddr = format!("{host}:{port}").parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;

    run_gateway_with_listener(host, listener, config).await
}

/// Run the HTTP gateway from a pre-bound listener.
pub async fn run_gateway_with_listener(
    host: &str,
    listener: tokio::net::TcpListener,
    config: Config,
) -> Result<()> {
    let actual_port = listener.local_addr()?.port();
    let display_addr = format!("{host}:{actual_port}");

    let state = build_state(&config).await?;

    println!("◆ Nexa gateway listening on {display_addr}");
    println!("  POST /chat              → one chat turn (persists both sides)");
    println!("  POST /materials         → material recommendations");
    println!("  POST /color-palettes    → color palette generation");
    println!("  POST /design-suggestions → image-based design suggestions");
    println!("  POST /planning-ideas    → elevation and planning ideas");
    println!("  GET  /chats?owner_id=   → chat list");
    println!("  GET  /chats/{{id}}/messages → transcript");
    println!("  POST /chats             → create chat");
    println!("  GET  /health            → liveness");
    println!("  Press Ctrl+C to stop\n");

    let app = router(state);
    axum::serve(listener, app).await?;

    Ok(())
}

async fn build_state(config: &Config) -> Result<AppState> {
    let options = SqliteConnectOptions::new()
        .filename(&config.database_path)
        .create_if_missing(true);
    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(options)
        .await
        .context("Failed to open chat database")?;
    let store: Arc<dyn ChatStore> = Arc::new(SqliteChatStore::new(pool).await?);

    let api_key = config.resolve_api_key();
    let provider: Arc<dyn Provider> = Arc::new(GeminiProvider::new(api_key.as_deref()));
    let flows = Arc::new(FlowInvoker::new(
        provider,
        config.default_model.clone(),
        config.default_temperature,
    ));

    Ok(AppState::new(store, flows, config.history_limit))
}
