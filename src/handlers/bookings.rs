use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde_json::Value;

use super::{json_body, parse_id};
use crate::errors::AppError;
use crate::models::Booking;
use crate::services::bookings::{self, Quote};
use crate::state::AppState;

// POST /api/quotes
pub async fn quote(payload: Result<Json<Value>, JsonRejection>) -> Result<Json<Quote>, AppError> {
    let payload = json_body(payload)?;
    Ok(Json(bookings::quote(&payload)?))
}

// POST /api/bookings
pub async fn create_booking(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<(StatusCode, Json<Booking>), AppError> {
    let payload = json_body(payload)?;
    let booking = bookings::create_booking(state.store.as_ref(), &payload)?;
    Ok((StatusCode::CREATED, Json(booking)))
}

// GET /api/bookings/:id
pub async fn get_booking(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Booking>, AppError> {
    let id = parse_id(&id, "booking")?;
    Ok(Json(bookings::get_booking(state.store.as_ref(), id)?))
}

// GET /api/users/:user_id/bookings
pub async fn list_user_bookings(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
) -> Result<Json<Vec<Booking>>, AppError> {
    let user_id = parse_id(&user_id, "user")?;
    Ok(Json(bookings::list_user_bookings(
        state.store.as_ref(),
        user_id,
    )?))
}

// PATCH /api/bookings/:id/status
pub async fn update_booking_status(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Json<Booking>, AppError> {
    let id = parse_id(&id, "booking")?;
    let payload = json_body(payload)?;
    let booking = bookings::update_status(
        state.store.as_ref(),
        id,
        payload.get("status").and_then(Value::as_str),
    )?;
    Ok(Json(booking))
}
