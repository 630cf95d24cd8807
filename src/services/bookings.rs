use anyhow::Context;
use serde::Serialize;
use serde_json::Value;

use crate::db::Store;
use crate::errors::AppError;
use crate::models::{Booking, BookingStatus, NewBooking, ServiceType};
use crate::services::{pricing, schemas};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Quote {
    pub service_type: ServiceType,
    pub total_price: i64,
}

pub fn quote(payload: &Value) -> Result<Quote, AppError> {
    let details = schemas::parse_quote_request(payload)?;
    Ok(Quote {
        service_type: details.service_type(),
        total_price: pricing::estimate(&details),
    })
}

/// Validates the submission, prices it, and stores it as `pending`.
///
/// The stored price is always the server's own quote; a different submitted
/// `totalPrice` is logged and discarded.
pub fn create_booking(store: &dyn Store, payload: &Value) -> Result<Booking, AppError> {
    let request = schemas::parse_booking_request(payload)?;
    let service_type = request.details.service_type();
    let quoted = pricing::estimate(&request.details);

    if quoted != request.total_price {
        tracing::warn!(
            service_type = service_type.as_str(),
            submitted = request.total_price,
            quoted,
            "submitted price differs from quote"
        );
    }
    if let Some(status) = request.status.filter(|s| *s != BookingStatus::Pending) {
        tracing::debug!(submitted = status.as_str(), "ignoring submitted booking status");
    }

    let booking = store.create_booking(NewBooking {
        user_id: request.user_id,
        service_type,
        status: BookingStatus::Pending,
        details: request
            .details
            .to_value()
            .context("failed to serialize booking details")?,
        total_price: quoted,
    })?;

    tracing::info!(
        booking_id = booking.id,
        user_id = booking.user_id,
        service_type = service_type.as_str(),
        total_price = booking.total_price,
        "booking created"
    );
    Ok(booking)
}

pub fn get_booking(store: &dyn Store, id: i64) -> Result<Booking, AppError> {
    store
        .get_booking(id)?
        .ok_or_else(|| AppError::NotFound("Booking not found".to_string()))
}

pub fn list_user_bookings(store: &dyn Store, user_id: i64) -> Result<Vec<Booking>, AppError> {
    Ok(store.get_user_bookings(user_id)?)
}

/// Any status may move to any other, including itself.
pub fn update_status(
    store: &dyn Store,
    id: i64,
    status: Option<&str>,
) -> Result<Booking, AppError> {
    let status = status
        .and_then(BookingStatus::parse)
        .ok_or_else(|| AppError::InvalidArgument("Invalid status value".to_string()))?;

    let booking = store
        .update_booking_status(id, status)?
        .ok_or_else(|| AppError::NotFound("Booking not found".to_string()))?;

    tracing::info!(booking_id = id, status = status.as_str(), "booking status updated");
    Ok(booking)
}
