//! Country service
//!
//! Queries countries together with their cities, and handles name-unique
//! create/update/delete. A country that still has cities cannot be deleted.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use super::city_service::{cities_by_name, CityQueryResponse};
use super::command::{name_taken, CommandResponse, RequestHandler, Validation};
use crate::domain::entities::{Country, COUNTRY_NAME_MAX_LEN};
use crate::domain::ports::{Lookup, RecordStore, Repository, TrackingMode};
use crate::error::AppError;
use crate::query::{Direction, Query};

pub const COUNTRY_HAS_CITIES: &str = "Country can't be deleted because it has relational cities!";

/// List countries ordered by name, optionally a single one
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CountryQueryRequest {
    #[serde(default)]
    pub id: Option<i32>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CountryQueryResponse {
    pub id: i32,
    pub guid: Uuid,
    pub country_name: String,
    /// Ordered by name
    pub cities: Vec<CityQueryResponse>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CountryCreateRequest {
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CountryUpdateRequest {
    pub id: i32,
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CountryDeleteRequest {
    pub id: i32,
}

fn validate_country_name(name: &str) -> Option<CommandResponse> {
    Validation::new()
        .required("Name", name)
        .max_length("Name", name, COUNTRY_NAME_MAX_LEN)
        .finish()
}

pub struct CountryService<S: RecordStore> {
    store: S,
}

impl<S: RecordStore> CountryService<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }
}

#[async_trait]
impl<S: RecordStore> RequestHandler<CountryQueryRequest> for CountryService<S> {
    type Output = Query<CountryQueryResponse>;

    async fn handle(
        &self,
        request: CountryQueryRequest,
        _cancel: &CancellationToken,
    ) -> Result<Self::Output, AppError> {
        let id = request.id;
        let countries = self
            .store
            .countries()
            .query(TrackingMode::NoTracking)
            .filter(move |country| id.map_or(true, |id| country.id == id))
            .order_by_key(|country| country.country_name.clone(), Direction::Ascending);

        Ok(countries.group_join(
            cities_by_name(&self.store.cities()),
            |country| country.id,
            |city| city.country_id,
            |country, cities| CountryQueryResponse {
                id: country.id,
                guid: country.guid,
                country_name: country.country_name.clone(),
                cities: cities.iter().map(|city| CityQueryResponse::from(*city)).collect(),
            },
        ))
    }
}

#[async_trait]
impl<S: RecordStore> RequestHandler<CountryCreateRequest> for CountryService<S> {
    type Output = CommandResponse;

    async fn handle(
        &self,
        request: CountryCreateRequest,
        cancel: &CancellationToken,
    ) -> Result<Self::Output, AppError> {
        if let Some(invalid) = validate_country_name(&request.name) {
            return Ok(invalid);
        }

        let countries = self.store.countries();
        if name_taken(&countries, &request.name, None, cancel).await? {
            return Ok(CommandResponse::name_exists::<Country>());
        }

        let country = countries.create(Country::new(request.name.trim())).await?;
        countries.persist(cancel).await?;

        tracing::info!(country_id = country.id, "Country created");
        Ok(CommandResponse::created::<Country>(country.id))
    }
}

#[async_trait]
impl<S: RecordStore> RequestHandler<CountryUpdateRequest> for CountryService<S> {
    type Output = CommandResponse;

    async fn handle(
        &self,
        request: CountryUpdateRequest,
        cancel: &CancellationToken,
    ) -> Result<Self::Output, AppError> {
        if let Some(invalid) = validate_country_name(&request.name) {
            return Ok(invalid);
        }

        let countries = self.store.countries();
        if name_taken(&countries, &request.name, Some(request.id), cancel).await? {
            return Ok(CommandResponse::name_exists::<Country>());
        }

        let Some(mut country) = countries
            .find(request.id, TrackingMode::Tracking, cancel)
            .await?
        else {
            return Ok(CommandResponse::not_found::<Country>());
        };

        country.country_name = request.name.trim().to_string();
        countries.update(country).await?;
        countries.persist(cancel).await?;

        tracing::info!(country_id = request.id, "Country updated");
        Ok(CommandResponse::updated::<Country>(request.id))
    }
}

#[async_trait]
impl<S: RecordStore> RequestHandler<CountryDeleteRequest> for CountryService<S> {
    type Output = CommandResponse;

    async fn handle(
        &self,
        request: CountryDeleteRequest,
        cancel: &CancellationToken,
    ) -> Result<Self::Output, AppError> {
        let countries = self.store.countries();
        let Some(country) = countries
            .find(request.id, TrackingMode::Tracking, cancel)
            .await?
        else {
            return Ok(CommandResponse::not_found::<Country>());
        };

        let cities = self
            .store
            .cities()
            .lookup(Lookup::Parent(request.id), TrackingMode::NoTracking, cancel)
            .await?;
        if !cities.is_empty() {
            return Ok(CommandResponse::error(COUNTRY_HAS_CITIES));
        }

        countries.delete(country).await?;
        countries.persist(cancel).await?;

        tracing::info!(country_id = request.id, "Country deleted");
        Ok(CommandResponse::deleted::<Country>(request.id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{seeded_store, test_country, MemoryStore};

    fn service(store: &MemoryStore) -> CountryService<MemoryStore> {
        CountryService::new(store.clone())
    }

    #[tokio::test]
    async fn query_groups_cities_by_country() {
        let store = seeded_store();
        let cancel = CancellationToken::new();

        let countries = service(&store)
            .handle(CountryQueryRequest::default(), &cancel)
            .await
            .unwrap()
            .materialize(&cancel)
            .await
            .unwrap();

        let summary: Vec<(String, Vec<String>)> = countries
            .into_iter()
            .map(|c| {
                let cities = c.cities.into_iter().map(|city| city.city_name).collect();
                (c.country_name, cities)
            })
            .collect();
        assert_eq!(
            summary,
            vec![
                ("Germany".to_string(), vec!["Berlin".to_string()]),
                ("Iceland".to_string(), vec![]),
                (
                    "Türkiye".to_string(),
                    vec!["Ankara".to_string(), "İzmir".to_string()]
                ),
            ]
        );
    }

    #[test]
    fn response_reads_back_as_country_ref() {
        use crate::domain::ports::CountryRef;

        let response = CountryQueryResponse {
            id: 1,
            guid: Uuid::nil(),
            country_name: "Türkiye".to_string(),
            cities: Vec::new(),
        };

        let json = serde_json::to_value(&response).unwrap();
        let country: CountryRef = serde_json::from_value(json).unwrap();

        assert_eq!(country.country_name.as_deref(), Some("Türkiye"));
    }

    #[tokio::test]
    async fn query_by_missing_id_is_empty() {
        let store = seeded_store();
        let cancel = CancellationToken::new();

        let query = service(&store)
            .handle(CountryQueryRequest { id: Some(99) }, &cancel)
            .await
            .unwrap();

        assert!(!query.any(&cancel).await.unwrap());
    }

    #[tokio::test]
    async fn create_assigns_identity() {
        let store = seeded_store();
        let cancel = CancellationToken::new();

        let response = service(&store)
            .handle(
                CountryCreateRequest {
                    name: " France ".to_string(),
                },
                &cancel,
            )
            .await
            .unwrap();

        assert_eq!(response, CommandResponse::success("Country created successfully.", 4));
        let created = store.countries.rows().pop().unwrap();
        assert_eq!(created.country_name, "France");
        assert!(!created.guid.is_nil());
    }

    #[tokio::test]
    async fn create_duplicate_adds_nothing() {
        let store = seeded_store();
        let cancel = CancellationToken::new();

        let response = service(&store)
            .handle(
                CountryCreateRequest {
                    name: "GERMANY ".to_string(),
                },
                &cancel,
            )
            .await
            .unwrap();

        assert_eq!(response, CommandResponse::error("Country with the same name exists!"));
        assert_eq!(store.countries.rows().len(), 3);
    }

    #[tokio::test]
    async fn create_rejects_overlong_name() {
        let store = seeded_store();
        let cancel = CancellationToken::new();

        let response = service(&store)
            .handle(
                CountryCreateRequest {
                    name: "x".repeat(COUNTRY_NAME_MAX_LEN + 1),
                },
                &cancel,
            )
            .await
            .unwrap();

        assert_eq!(
            response,
            CommandResponse::error(
                "The field Name must be a string with a maximum length of 125."
            )
        );
    }

    #[tokio::test]
    async fn update_conflicting_name_is_rejected() {
        let store = seeded_store();
        let cancel = CancellationToken::new();

        let response = service(&store)
            .handle(
                CountryUpdateRequest {
                    id: 3,
                    name: "germany".to_string(),
                },
                &cancel,
            )
            .await
            .unwrap();

        assert_eq!(response, CommandResponse::error("Country with the same name exists!"));
        assert_eq!(store.countries.rows()[2], test_country(3, "Iceland"));
    }

    #[tokio::test]
    async fn update_overwrites_name() {
        let store = seeded_store();
        let cancel = CancellationToken::new();

        let response = service(&store)
            .handle(
                CountryUpdateRequest {
                    id: 1,
                    name: "Turkey".to_string(),
                },
                &cancel,
            )
            .await
            .unwrap();

        assert_eq!(response, CommandResponse::success("Country updated successfully.", 1));
        assert_eq!(store.countries.rows()[0].country_name, "Turkey");
    }

    #[tokio::test]
    async fn delete_blocked_while_cities_exist() {
        let store = seeded_store();
        let cancel = CancellationToken::new();

        let response = service(&store)
            .handle(CountryDeleteRequest { id: 1 }, &cancel)
            .await
            .unwrap();

        assert_eq!(response, CommandResponse::error(COUNTRY_HAS_CITIES));
        assert_eq!(store.countries.rows().len(), 3);
    }

    #[tokio::test]
    async fn delete_country_without_cities() {
        let store = seeded_store();
        let cancel = CancellationToken::new();

        let response = service(&store)
            .handle(CountryDeleteRequest { id: 3 }, &cancel)
            .await
            .unwrap();

        assert_eq!(response, CommandResponse::success("Country deleted successfully.", 3));
        assert_eq!(store.countries.rows().len(), 2);
    }

    #[tokio::test]
    async fn delete_missing_country() {
        let store = seeded_store();
        let cancel = CancellationToken::new();

        let response = service(&store)
            .handle(CountryDeleteRequest { id: 42 }, &cancel)
            .await
            .unwrap();

        assert_eq!(response, CommandResponse::error("Country not found!"));
    }
}
