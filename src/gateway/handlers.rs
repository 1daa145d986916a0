use crate::chat::ChatSendInput;
use crate::error::{NexaError, StoreError};
use crate::flows::{DesignQuery, MaterialQuery, PaletteRequest, PlanningRequest};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};

use super::{AppState, CreateChatBody, ListChatsQuery, ListMessagesQuery};

/// GET /health — always public (no secrets leaked)
pub(super) async fn handle_health(State(_state): State<AppState>) -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}

/// POST /chat — one chat turn.
///
/// Generation failures come back as 200 with an `error` body: the turn was
/// persisted (user message plus fallback reply), so from the client's point
/// of view the exchange happened.
pub(super) async fn handle_chat(
    State(state): State<AppState>,
    Json(input): Json<ChatSendInput>,
) -> impl IntoResponse {
    match state.action.send(&input).await {
        Ok(answer) => (StatusCode::OK, Json(serde_json::json!({ "answer": answer }))),
        Err(NexaError::Generation(e)) => (
            StatusCode::OK,
            Json(serde_json::json!({ "error": e.to_string() })),
        ),
        Err(e) => error_response(e),
    }
}

/// POST /materials
pub(super) async fn handle_materials(
    State(state): State<AppState>,
    Json(input): Json<MaterialQuery>,
) -> impl IntoResponse {
    match state.flows.recommend_materials(&input).await {
        Ok(output) => (StatusCode::OK, Json(serde_json::json!(output))),
        Err(e) => error_response(e),
    }
}

/// POST /color-palettes
pub(super) async fn handle_color_palettes(
    State(state): State<AppState>,
    Json(input): Json<PaletteRequest>,
) -> impl IntoResponse {
    match state.flows.generate_palette(&input).await {
        Ok(output) => (StatusCode::OK, Json(serde_json::json!(output))),
        Err(e) => error_response(e),
    }
}

/// POST /design-suggestions
pub(super) async fn handle_design_suggestions(
    State(state): State<AppState>,
    Json(input): Json<DesignQuery>,
) -> impl IntoResponse {
    match state.flows.design_suggestions(&input).await {
        Ok(output) => (StatusCode::OK, Json(serde_json::json!(output))),
        Err(e) => error_response(e),
    }
}

/// POST /planning-ideas
pub(super) async fn handle_planning_ideas(
    State(state): State<AppState>,
    Json(input): Json<PlanningRequest>,
) -> impl IntoResponse {
    match state.flows.planning_ideas(&input).await {
        Ok(output) => (StatusCode::OK, Json(serde_json::json!(output))),
        Err(e) => error_response(e),
    }
}

/// GET /chats?owner_id=...
pub(super) async fn handle_list_chats(
    State(state): State<AppState>,
    Query(query): Query<ListChatsQuery>,
) -> impl IntoResponse {
    match state.store.list_chats(&query.owner_id).await {
        Ok(chats) => (StatusCode::OK, Json(serde_json::json!({ "chats": chats }))),
        Err(e) => error_response(NexaError::Store(e)),
    }
}

/// GET /chats/{id}/messages
pub(super) async fn handle_list_messages(
    State(state): State<AppState>,
    Path(chat_id): Path<String>,
    Query(query): Query<ListMessagesQuery>,
) -> impl IntoResponse {
    let limit = query.limit.unwrap_or(state.history_limit);
    match state.store.list_messages(&chat_id, Some(limit)).await {
        Ok(messages) => (
            StatusCode::OK,
            Json(serde_json::json!({ "messages": messages })),
        ),
        Err(e) => error_response(NexaError::Store(e)),
    }
}

/// POST /chats
pub(super) async fn handle_create_chat(
    State(state): State<AppState>,
    Json(body): Json<CreateChatBody>,
) -> impl IntoResponse {
    if body.owner_id.trim().is_empty() {
        let err = serde_json::json!({ "error": "owner_id must not be empty" });
        return (StatusCode::BAD_REQUEST, Json(err));
    }
    match state.store.create_chat(&body.owner_id, &body.seed_text).await {
        Ok(chat) => (StatusCode::OK, Json(serde_json::json!(chat))),
        Err(e) => error_response(NexaError::Store(e)),
    }
}

fn error_response(err: NexaError) -> (StatusCode, Json<serde_json::Value>) {
    let status = match &err {
        NexaError::Validation(_) => StatusCode::BAD_REQUEST,
        NexaError::Store(StoreError::ChatNotFound(_)) => StatusCode::NOT_FOUND,
        NexaError::Store(StoreError::MissingChatId) => StatusCode::BAD_REQUEST,
        NexaError::Generation(_) => StatusCode::BAD_GATEWAY,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };
    if status.is_server_error() {
        tracing::error!(error = %err, "gateway request failed");
    }
    (status, Json(serde_json::json!({ "error": err.to_string() })))
}
