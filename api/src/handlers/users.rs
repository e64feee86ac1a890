//! User handlers
//!
//! Read-only endpoints; the locations variant forwards the caller's bearer
//! credential to the Countries and Cities APIs.

use axum::{extract::State, response::Response};

use super::{list_response, AppState};
use crate::app::{RequestHandler, UserLocationQueryRequest, UserQueryRequest};
use crate::auth::BearerCredential;
use crate::domain::ports::{LocationsClient, RecordStore};
use crate::error::AppError;

/// GET /api/users
pub async fn list_users<S: RecordStore, L: LocationsClient>(
    State(state): State<AppState<S, L>>,
) -> Result<Response, AppError> {
    let cancel = state.request_token();
    let users = state
        .users
        .handle(UserQueryRequest, &cancel)
        .await?
        .materialize(&cancel)
        .await?;

    Ok(list_response(users))
}

/// GET /api/users/locations
pub async fn list_user_locations<S: RecordStore, L: LocationsClient>(
    State(state): State<AppState<S, L>>,
    BearerCredential(credential): BearerCredential,
) -> Result<Response, AppError> {
    let cancel = state.request_token();
    let users = state
        .users
        .handle(UserLocationQueryRequest { credential }, &cancel)
        .await?
        .materialize(&cancel)
        .await?;

    Ok(list_response(users))
}
