//! Country handlers
//!
//! Endpoints for country queries and mutations.

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    response::Response,
    Json,
};

use super::{command_response, item_response, json_body, list_response, AppState};
use crate::app::{
    CountryCreateRequest, CountryDeleteRequest, CountryQueryRequest, CountryUpdateRequest,
    RequestHandler,
};
use crate::domain::ports::{LocationsClient, RecordStore};
use crate::error::AppError;

/// GET /api/countries
///
/// Every country ordered by name, each with its cities.
pub async fn list_countries<S: RecordStore, L: LocationsClient>(
    State(state): State<AppState<S, L>>,
) -> Result<Response, AppError> {
    let cancel = state.request_token();
    let countries = state
        .countries
        .handle(CountryQueryRequest { id: None }, &cancel)
        .await?
        .materialize(&cancel)
        .await?;

    Ok(list_response(countries))
}

/// GET /api/countries/:id
pub async fn get_country<S: RecordStore, L: LocationsClient>(
    State(state): State<AppState<S, L>>,
    Path(id): Path<i32>,
) -> Result<Response, AppError> {
    let cancel = state.request_token();
    let country = state
        .countries
        .handle(CountryQueryRequest { id: Some(id) }, &cancel)
        .await?
        .first(&cancel)
        .await?;

    Ok(item_response(country))
}

/// POST /api/countries
pub async fn create_country<S: RecordStore, L: LocationsClient>(
    State(state): State<AppState<S, L>>,
    body: Result<Json<CountryCreateRequest>, JsonRejection>,
) -> Result<Response, AppError> {
    let request = json_body(body)?;
    let cancel = state.request_token();
    let response = state.countries.handle(request, &cancel).await?;

    Ok(command_response(response))
}

/// PUT /api/countries
pub async fn update_country<S: RecordStore, L: LocationsClient>(
    State(state): State<AppState<S, L>>,
    body: Result<Json<CountryUpdateRequest>, JsonRejection>,
) -> Result<Response, AppError> {
    let request = json_body(body)?;
    let cancel = state.request_token();
    let response = state.countries.handle(request, &cancel).await?;

    Ok(command_response(response))
}

/// DELETE /api/countries/:id
pub async fn delete_country<S: RecordStore, L: LocationsClient>(
    State(state): State<AppState<S, L>>,
    Path(id): Path<i32>,
) -> Result<Response, AppError> {
    let cancel = state.request_token();
    let response = state
        .countries
        .handle(CountryDeleteRequest { id }, &cancel)
        .await?;

    Ok(command_response(response))
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use serde_json::{json, Value};

    use crate::handlers::test_support::server;
    use crate::test_utils::{seeded_store, MemoryStore};

    #[tokio::test]
    async fn list_returns_countries_with_cities() {
        let server = server(seeded_store());

        let response = server.get("/api/countries").await;

        response.assert_status_ok();
        let body: Value = response.json();
        let names: Vec<&str> = body
            .as_array()
            .unwrap()
            .iter()
            .map(|c| c["countryName"].as_str().unwrap())
            .collect();
        assert_eq!(names, vec!["Germany", "Iceland", "Türkiye"]);
        assert_eq!(body[2]["cities"].as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn listing_decodes_as_enrichment_payload() {
        use crate::domain::ports::CountryRef;

        let server = server(seeded_store());

        let countries: Vec<CountryRef> = server.get("/api/countries").await.json();

        assert_eq!(
            countries[0],
            CountryRef {
                id: 2,
                country_name: Some("Germany".to_string()),
            }
        );
    }

    #[tokio::test]
    async fn empty_store_lists_no_content() {
        let server = server(MemoryStore::new());

        server
            .get("/api/countries")
            .await
            .assert_status(StatusCode::NO_CONTENT);
    }

    #[tokio::test]
    async fn unknown_id_is_no_content() {
        let server = server(seeded_store());

        server
            .get("/api/countries/99")
            .await
            .assert_status(StatusCode::NO_CONTENT);
    }

    #[tokio::test]
    async fn create_returns_new_id() {
        let server = server(seeded_store());

        let response = server
            .post("/api/countries")
            .json(&json!({ "name": "  France " }))
            .await;

        response.assert_status_ok();
        let body: Value = response.json();
        assert_eq!(body["isSuccessful"], true);
        assert_eq!(body["message"], "Country created successfully.");

        let id = body["id"].as_i64().unwrap();
        let fetched: Value = server.get(&format!("/api/countries/{id}")).await.json();
        assert_eq!(fetched["countryName"], "France");
    }

    #[tokio::test]
    async fn duplicate_name_is_bad_request() {
        let server = server(seeded_store());

        let response = server
            .post("/api/countries")
            .json(&json!({ "name": "germany" }))
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
        response.assert_json(&json!({
            "isSuccessful": false,
            "message": "Country with the same name exists!"
        }));
    }

    #[tokio::test]
    async fn blank_name_reports_validation_message() {
        let server = server(seeded_store());

        let response = server.post("/api/countries").json(&json!({ "name": "" })).await;

        response.assert_status(StatusCode::BAD_REQUEST);
        let body: Value = response.json();
        assert_eq!(body["message"], "The Name field is required.");
    }

    #[tokio::test]
    async fn malformed_body_is_bad_request() {
        let server = server(seeded_store());

        let response = server
            .put("/api/countries")
            .json(&json!({ "name": "France" }))
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn delete_with_cities_is_refused() {
        let server = server(seeded_store());

        let response = server.delete("/api/countries/1").await;

        response.assert_status(StatusCode::BAD_REQUEST);
        server.get("/api/countries/1").await.assert_status_ok();
    }

    #[tokio::test]
    async fn delete_country_without_cities() {
        let server = server(seeded_store());

        server.delete("/api/countries/3").await.assert_status_ok();
        server
            .get("/api/countries/3")
            .await
            .assert_status(StatusCode::NO_CONTENT);
    }
}
