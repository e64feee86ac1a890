//! City handlers
//!
//! Endpoints for city queries and mutations.

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    response::Response,
    Json,
};

use super::{command_response, item_response, json_body, list_response, AppState};
use crate::app::{
    CityCreateRequest, CityDeleteRequest, CityQueryRequest, CityUpdateRequest, RequestHandler,
};
use crate::domain::ports::{LocationsClient, RecordStore};
use crate::error::AppError;

async fn query_cities<S: RecordStore, L: LocationsClient>(
    state: &AppState<S, L>,
    request: CityQueryRequest,
) -> Result<Response, AppError> {
    let cancel = state.request_token();
    let cities = state
        .cities
        .handle(request, &cancel)
        .await?
        .materialize(&cancel)
        .await?;

    Ok(list_response(cities))
}

/// GET /api/cities
pub async fn list_cities<S: RecordStore, L: LocationsClient>(
    State(state): State<AppState<S, L>>,
) -> Result<Response, AppError> {
    query_cities(&state, CityQueryRequest::default()).await
}

/// GET /api/cities/by-country/:country_id
pub async fn list_cities_by_country<S: RecordStore, L: LocationsClient>(
    State(state): State<AppState<S, L>>,
    Path(country_id): Path<i32>,
) -> Result<Response, AppError> {
    let request = CityQueryRequest {
        id: None,
        country_id: Some(country_id),
    };
    query_cities(&state, request).await
}

/// GET /api/cities/:id
pub async fn get_city<S: RecordStore, L: LocationsClient>(
    State(state): State<AppState<S, L>>,
    Path(id): Path<i32>,
) -> Result<Response, AppError> {
    let cancel = state.request_token();
    let request = CityQueryRequest {
        id: Some(id),
        country_id: None,
    };
    let city = state
        .cities
        .handle(request, &cancel)
        .await?
        .first(&cancel)
        .await?;

    Ok(item_response(city))
}

/// POST /api/cities
pub async fn create_city<S: RecordStore, L: LocationsClient>(
    State(state): State<AppState<S, L>>,
    body: Result<Json<CityCreateRequest>, JsonRejection>,
) -> Result<Response, AppError> {
    let request = json_body(body)?;
    let cancel = state.request_token();
    let response = state.cities.handle(request, &cancel).await?;

    Ok(command_response(response))
}

/// PUT /api/cities
pub async fn update_city<S: RecordStore, L: LocationsClient>(
    State(state): State<AppState<S, L>>,
    body: Result<Json<CityUpdateRequest>, JsonRejection>,
) -> Result<Response, AppError> {
    let request = json_body(body)?;
    let cancel = state.request_token();
    let response = state.cities.handle(request, &cancel).await?;

    Ok(command_response(response))
}

/// DELETE /api/cities/:id
pub async fn delete_city<S: RecordStore, L: LocationsClient>(
    State(state): State<AppState<S, L>>,
    Path(id): Path<i32>,
) -> Result<Response, AppError> {
    let cancel = state.request_token();
    let response = state
        .cities
        .handle(CityDeleteRequest { id }, &cancel)
        .await?;

    Ok(command_response(response))
}
