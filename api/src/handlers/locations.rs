//! Location join handlers
//!
//! Countries joined with their cities, filtered, ordered and paged. The
//! pre-paging row count travels in the `x-total-count` header.

use axum::{
    extract::{rejection::JsonRejection, State},
    response::Response,
    Json,
};

use super::{json_body, page_response, AppState};
use crate::app::{
    LocationInnerJoinRequest, LocationLeftJoinRequest, LocationQueryRequest, RequestHandler,
};
use crate::domain::ports::{LocationsClient, RecordStore};
use crate::error::AppError;

/// POST /api/locations/inner-join
///
/// Countries that have at least one city, one row per city.
pub async fn inner_join<S: RecordStore, L: LocationsClient>(
    State(state): State<AppState<S, L>>,
    body: Result<Json<LocationQueryRequest>, JsonRejection>,
) -> Result<Response, AppError> {
    let request = LocationInnerJoinRequest(json_body(body)?);
    let cancel = state.request_token();
    let page = state
        .locations
        .handle(request, &cancel)
        .await?
        .fetch_page(&cancel)
        .await?;

    Ok(page_response(page))
}

/// POST /api/locations/left-join
///
/// Every country; those without cities appear once with empty city fields.
pub async fn left_join<S: RecordStore, L: LocationsClient>(
    State(state): State<AppState<S, L>>,
    body: Result<Json<LocationQueryRequest>, JsonRejection>,
) -> Result<Response, AppError> {
    let request = LocationLeftJoinRequest(json_body(body)?);
    let cancel = state.request_token();
    let page = state
        .locations
        .handle(request, &cancel)
        .await?
        .fetch_page(&cancel)
        .await?;

    Ok(page_response(page))
}
