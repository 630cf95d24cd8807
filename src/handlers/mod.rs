pub mod bookings;
pub mod chat;
pub mod destinations;
pub mod health;
pub mod users;

use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::routing::{get, patch, post};
use axum::{Json, Router};
use serde_json::Value;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::errors::AppError;
use crate::state::AppState;

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health::health))
        .route("/api/users/register", post(users::register))
        .route("/api/users/:user_id", get(users::get_user))
        .route("/api/login", post(users::login))
        .route("/api/destinations", get(destinations::list_destinations))
        .route(
            "/api/destinations/featured",
            get(destinations::featured_destinations),
        )
        .route("/api/destinations/:id", get(destinations::get_destination))
        .route("/api/quotes", post(bookings::quote))
        .route("/api/bookings", post(bookings::create_booking))
        .route("/api/bookings/:id", get(bookings::get_booking))
        .route(
            "/api/users/:user_id/bookings",
            get(bookings::list_user_bookings),
        )
        .route(
            "/api/bookings/:id/status",
            patch(bookings::update_booking_status),
        )
        .route("/api/chat", post(chat::send_message))
        .route("/api/chat/suggestions", get(chat::suggestions))
        .route("/api/users/:user_id/chat-history", get(chat::chat_history))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Unwraps a JSON body, reporting unreadable bodies in the usual error shape.
fn json_body(payload: Result<Json<Value>, JsonRejection>) -> Result<Value, AppError> {
    payload
        .map(|Json(value)| value)
        .map_err(|rejection| AppError::InvalidArgument(rejection.body_text()))
}

/// Path ids arrive as text so a malformed one maps to a 400 with a named field.
fn parse_id(raw: &str, what: &str) -> Result<i64, AppError> {
    raw.parse()
        .map_err(|_| AppError::InvalidArgument(format!("Invalid {what} ID")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_id() {
        assert_eq!(parse_id("42", "booking").unwrap(), 42);
        match parse_id("abc", "booking") {
            Err(AppError::InvalidArgument(msg)) => assert_eq!(msg, "Invalid booking ID"),
            other => panic!("unexpected: {other:?}"),
        }
    }
}
