//! Seed handlers
//!
//! Reset the tables to the sample data set. Both run as plain GETs so they
//! can be triggered from a browser during development.

use axum::{extract::State, Json};

use super::AppState;
use crate::app::{LocationSeedRequest, RequestHandler, SeedResponse, UserSeedRequest};
use crate::domain::ports::{LocationsClient, RecordStore};
use crate::error::AppError;

/// GET /api/seed-db/locations
pub async fn seed_locations<S: RecordStore, L: LocationsClient>(
    State(state): State<AppState<S, L>>,
) -> Result<Json<SeedResponse>, AppError> {
    let cancel = state.request_token();
    let response = state.seed.handle(LocationSeedRequest, &cancel).await?;

    Ok(Json(response))
}

/// GET /api/seed-db/users
pub async fn seed_users<S: RecordStore, L: LocationsClient>(
    State(state): State<AppState<S, L>>,
) -> Result<Json<SeedResponse>, AppError> {
    let cancel = state.request_token();
    let response = state.seed.handle(UserSeedRequest, &cancel).await?;

    Ok(Json(response))
}
