//! HTTP handlers
//!
//! Axum request handlers for the API endpoints. Handlers stay thin: build the
//! request, call the service with a per-request cancellation token, and map
//! the result onto a status code.

pub mod cities;
pub mod countries;
pub mod locations;
pub mod seed;
pub mod users;

use std::sync::Arc;

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use tokio_util::sync::CancellationToken;

use crate::app::{
    CityService, CommandResponse, CountryService, LocationService, SeedService, UserService,
};
use crate::config::Config;
use crate::domain::ports::{LocationsClient, RecordStore};
use crate::error::AppError;
use crate::query::Page;

/// Header carrying the pre-paging row count of a join query
pub const TOTAL_COUNT_HEADER: &str = "x-total-count";

/// Application state shared across all handlers
pub struct AppState<S: RecordStore, L: LocationsClient> {
    pub countries: Arc<CountryService<S>>,
    pub cities: Arc<CityService<S>>,
    pub locations: Arc<LocationService<S>>,
    pub users: Arc<UserService<S, L>>,
    pub seed: Arc<SeedService<S>>,
    /// Parent of every request's cancellation token
    pub shutdown: CancellationToken,
}

impl<S: RecordStore, L: LocationsClient> AppState<S, L> {
    pub fn new(store: S, locations: Arc<L>, config: &Config, shutdown: CancellationToken) -> Self {
        Self {
            countries: Arc::new(CountryService::new(store.clone())),
            cities: Arc::new(CityService::new(store.clone())),
            locations: Arc::new(LocationService::new(store.clone())),
            seed: Arc::new(SeedService::new(store.clone())),
            users: Arc::new(UserService::new(
                store,
                locations,
                config.countries_api_url.clone(),
                config.cities_api_url.clone(),
            )),
            shutdown,
        }
    }

    /// Token for one request; cancelled when the server shuts down
    pub fn request_token(&self) -> CancellationToken {
        self.shutdown.child_token()
    }
}

impl<S: RecordStore, L: LocationsClient> Clone for AppState<S, L> {
    fn clone(&self) -> Self {
        Self {
            countries: self.countries.clone(),
            cities: self.cities.clone(),
            locations: self.locations.clone(),
            users: self.users.clone(),
            seed: self.seed.clone(),
            shutdown: self.shutdown.clone(),
        }
    }
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// Build the API router over any store and Locations client
pub fn router<S: RecordStore, L: LocationsClient>(state: AppState<S, L>) -> Router {
    Router::new()
        .route("/health", get(health))
        // Countries
        .route(
            "/api/countries",
            get(countries::list_countries::<S, L>)
                .post(countries::create_country::<S, L>)
                .put(countries::update_country::<S, L>),
        )
        .route(
            "/api/countries/:id",
            get(countries::get_country::<S, L>).delete(countries::delete_country::<S, L>),
        )
        // Cities
        .route(
            "/api/cities",
            get(cities::list_cities::<S, L>)
                .post(cities::create_city::<S, L>)
                .put(cities::update_city::<S, L>),
        )
        .route(
            "/api/cities/:id",
            get(cities::get_city::<S, L>).delete(cities::delete_city::<S, L>),
        )
        .route(
            "/api/cities/by-country/:country_id",
            get(cities::list_cities_by_country::<S, L>),
        )
        // Locations
        .route(
            "/api/locations/inner-join",
            post(locations::inner_join::<S, L>),
        )
        .route(
            "/api/locations/left-join",
            post(locations::left_join::<S, L>),
        )
        // Users
        .route("/api/users", get(users::list_users::<S, L>))
        .route(
            "/api/users/locations",
            get(users::list_user_locations::<S, L>),
        )
        // Sample data
        .route("/api/seed-db/locations", get(seed::seed_locations::<S, L>))
        .route("/api/seed-db/users", get(seed::seed_users::<S, L>))
        .with_state(state)
}

/// 200 with the rows, or 204 when there are none
pub(crate) fn list_response<T: Serialize>(items: Vec<T>) -> Response {
    if items.is_empty() {
        StatusCode::NO_CONTENT.into_response()
    } else {
        Json(items).into_response()
    }
}

/// 200 with the row, or 204 when it does not exist
pub(crate) fn item_response<T: Serialize>(item: Option<T>) -> Response {
    match item {
        Some(item) => Json(item).into_response(),
        None => StatusCode::NO_CONTENT.into_response(),
    }
}

/// Like `list_response`, plus the total count header
pub(crate) fn page_response<T: Serialize>(page: Page<T>) -> Response {
    let total = [(TOTAL_COUNT_HEADER, page.total_count().to_string())];
    if page.is_empty() {
        (StatusCode::NO_CONTENT, total).into_response()
    } else {
        (total, Json(page.items)).into_response()
    }
}

/// 200 on success, 400 with the joined messages on a business error
pub(crate) fn command_response(response: CommandResponse) -> Response {
    let status = if response.is_successful() {
        StatusCode::OK
    } else {
        StatusCode::BAD_REQUEST
    };
    (status, Json(response)).into_response()
}

/// Unwrap a JSON body, turning malformed payloads into a 400
pub(crate) fn json_body<T>(body: Result<Json<T>, JsonRejection>) -> Result<T, AppError> {
    body.map(|Json(value)| value)
        .map_err(|rejection| AppError::BadRequest(rejection.body_text()))
}
