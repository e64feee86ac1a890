//! City service
//!
//! Queries and name-unique create/update/delete for cities.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use super::command::{name_taken, CommandResponse, RequestHandler, Validation};
use crate::domain::entities::{City, Country, CITY_NAME_MAX_LEN};
use crate::domain::ports::{RecordStore, Repository, TrackingMode};
use crate::error::AppError;
use crate::query::{Direction, Query};

/// List cities ordered by name, optionally narrowed to one id or country
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CityQueryRequest {
    #[serde(default)]
    pub id: Option<i32>,
    #[serde(default)]
    pub country_id: Option<i32>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CityQueryResponse {
    pub id: i32,
    pub guid: Uuid,
    pub city_name: String,
    pub country_id: i32,
}

impl From<&City> for CityQueryResponse {
    fn from(city: &City) -> Self {
        Self {
            id: city.id,
            guid: city.guid,
            city_name: city.city_name.clone(),
            country_id: city.country_id,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CityCreateRequest {
    #[serde(default)]
    pub name: String,
    pub country_id: i32,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CityUpdateRequest {
    pub id: i32,
    #[serde(default)]
    pub name: String,
    pub country_id: i32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CityDeleteRequest {
    pub id: i32,
}

pub(crate) fn validate_city_name(name: &str) -> Option<CommandResponse> {
    Validation::new()
        .required("Name", name)
        .max_length("Name", name, CITY_NAME_MAX_LEN)
        .finish()
}

/// Cities ordered by name
pub(crate) fn cities_by_name<R: Repository<City> + ?Sized>(cities: &R) -> Query<City> {
    cities
        .query(TrackingMode::NoTracking)
        .order_by_key(|city| city.city_name.clone(), Direction::Ascending)
}

pub struct CityService<S: RecordStore> {
    store: S,
}

impl<S: RecordStore> CityService<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    async fn country_exists(
        &self,
        country_id: i32,
        cancel: &CancellationToken,
    ) -> Result<bool, AppError> {
        Ok(self
            .store
            .countries()
            .find(country_id, TrackingMode::NoTracking, cancel)
            .await?
            .is_some())
    }
}

#[async_trait]
impl<S: RecordStore> RequestHandler<CityQueryRequest> for CityService<S> {
    type Output = Query<CityQueryResponse>;

    async fn handle(
        &self,
        request: CityQueryRequest,
        _cancel: &CancellationToken,
    ) -> Result<Self::Output, AppError> {
        let CityQueryRequest { id, country_id } = request;

        Ok(cities_by_name(&self.store.cities())
            .filter(move |city| id.map_or(true, |id| city.id == id))
            .filter(move |city| country_id.map_or(true, |country_id| city.country_id == country_id))
            .map(|city| CityQueryResponse::from(&city)))
    }
}

#[async_trait]
impl<S: RecordStore> RequestHandler<CityCreateRequest> for CityService<S> {
    type Output = CommandResponse;

    async fn handle(
        &self,
        request: CityCreateRequest,
        cancel: &CancellationToken,
    ) -> Result<Self::Output, AppError> {
        if let Some(invalid) = validate_city_name(&request.name) {
            return Ok(invalid);
        }

        let cities = self.store.cities();
        if name_taken(&cities, &request.name, None, cancel).await? {
            return Ok(CommandResponse::name_exists::<City>());
        }
        if !self.country_exists(request.country_id, cancel).await? {
            return Ok(CommandResponse::not_found::<Country>());
        }

        let city = cities
            .create(City::new(request.name.trim(), request.country_id))
            .await?;
        cities.persist(cancel).await?;

        tracing::info!(city_id = city.id, country_id = city.country_id, "City created");
        Ok(CommandResponse::created::<City>(city.id))
    }
}

#[async_trait]
impl<S: RecordStore> RequestHandler<CityUpdateRequest> for CityService<S> {
    type Output = CommandResponse;

    async fn handle(
        &self,
        request: CityUpdateRequest,
        cancel: &CancellationToken,
    ) -> Result<Self::Output, AppError> {
        if let Some(invalid) = validate_city_name(&request.name) {
            return Ok(invalid);
        }

        let cities = self.store.cities();
        if name_taken(&cities, &request.name, Some(request.id), cancel).await? {
            return Ok(CommandResponse::name_exists::<City>());
        }

        let Some(mut city) = cities
            .find(request.id, TrackingMode::Tracking, cancel)
            .await?
        else {
            return Ok(CommandResponse::not_found::<City>());
        };
        if !self.country_exists(request.country_id, cancel).await? {
            return Ok(CommandResponse::not_found::<Country>());
        }

        city.city_name = request.name.trim().to_string();
        city.country_id = request.country_id;
        cities.update(city).await?;
        cities.persist(cancel).await?;

        tracing::info!(city_id = request.id, "City updated");
        Ok(CommandResponse::updated::<City>(request.id))
    }
}

#[async_trait]
impl<S: RecordStore> RequestHandler<CityDeleteRequest> for CityService<S> {
    type Output = CommandResponse;

    async fn handle(
        &self,
        request: CityDeleteRequest,
        cancel: &CancellationToken,
    ) -> Result<Self::Output, AppError> {
        let cities = self.store.cities();
        let Some(city) = cities
            .find(request.id, TrackingMode::Tracking, cancel)
            .await?
        else {
            return Ok(CommandResponse::not_found::<City>());
        };

        cities.delete(city).await?;
        cities.persist(cancel).await?;

        tracing::info!(city_id = request.id, "City deleted");
        Ok(CommandResponse::deleted::<City>(request.id))
    }
}
