use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::Json;
use serde_json::{json, Value};

use super::{json_body, parse_id};
use crate::errors::AppError;
use crate::models::ChatMessage;
use crate::services::chat::{self, Suggestions};
use crate::state::AppState;

// POST /api/chat
pub async fn send_message(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Json<Value>, AppError> {
    let payload = json_body(payload)?;
    let reply = chat::relay(
        state.store.as_ref(),
        state.llm.as_ref(),
        payload.get("message").and_then(Value::as_str),
        payload.get("userId").and_then(Value::as_i64),
    )
    .await?;
    Ok(Json(json!({ "message": reply })))
}

// GET /api/chat/suggestions
pub async fn suggestions() -> Json<Suggestions> {
    Json(chat::suggestions())
}

// GET /api/users/:user_id/chat-history
pub async fn chat_history(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
) -> Result<Json<Vec<ChatMessage>>, AppError> {
    let user_id = parse_id(&user_id, "user")?;
    Ok(Json(chat::history(state.store.as_ref(), user_id)?))
}
