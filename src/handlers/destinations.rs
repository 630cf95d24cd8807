use std::sync::Arc;

use axum::extract::{Path, State};
use axum::Json;

use super::parse_id;
use crate::errors::AppError;
use crate::models::Destination;
use crate::state::AppState;

// GET /api/destinations
pub async fn list_destinations(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<Destination>>, AppError> {
    Ok(Json(state.store.get_all_destinations()?))
}

// GET /api/destinations/featured
pub async fn featured_destinations(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<Destination>>, AppError> {
    Ok(Json(state.store.get_featured_destinations()?))
}

// GET /api/destinations/:id
pub async fn get_destination(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Destination>, AppError> {
    let id = parse_id(&id, "destination")?;
    state
        .store
        .get_destination(id)?
        .map(Json)
        .ok_or_else(|| AppError::NotFound("Destination not found".to_string()))
}
