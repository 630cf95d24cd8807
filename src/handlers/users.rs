use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde_json::Value;

use super::{json_body, parse_id};
use crate::errors::AppError;
use crate::models::PublicUser;
use crate::services::accounts;
use crate::state::AppState;

// POST /api/users/register
pub async fn register(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<(StatusCode, Json<PublicUser>), AppError> {
    let payload = json_body(payload)?;
    let user = accounts::register(state.store.as_ref(), &payload)?;
    Ok((StatusCode::CREATED, Json(user)))
}

// GET /api/users/:user_id
pub async fn get_user(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
) -> Result<Json<PublicUser>, AppError> {
    let user_id = parse_id(&user_id, "user")?;
    Ok(Json(accounts::get_user(state.store.as_ref(), user_id)?))
}

// POST /api/login
pub async fn login(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Json<PublicUser>, AppError> {
    let payload = json_body(payload)?;
    let user = accounts::login(
        state.store.as_ref(),
        payload.get("username").and_then(Value::as_str),
        payload.get("password").and_then(Value::as_str),
    )?;
    Ok(Json(user))
}
