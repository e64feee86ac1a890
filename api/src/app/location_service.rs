//! Location service
//!
//! Country × city join queries with text filters, dynamic ordering and
//! paging. The inner join lists only countries that have cities; the left
//! join also lists countries without any city, once, with empty city fields.

use std::cmp::Ordering;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;

use super::command::RequestHandler;
use crate::domain::ports::{RecordStore, Repository, TrackingMode};
use crate::error::AppError;
use crate::query::{
    Direction, OrderRequest, OrderSpec, OrderableField, PageRequest, PageSpec, Query,
};

/// Filters, ordering and paging shared by both join queries
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LocationQueryRequest {
    pub country_name: Option<String>,
    pub city_name: Option<String>,
    pub page_number: i32,
    pub count_per_page: i32,
    pub order_entity_property_name: String,
    pub is_order_descending: bool,
}

impl Default for LocationQueryRequest {
    fn default() -> Self {
        Self {
            country_name: None,
            city_name: None,
            page_number: 1,
            count_per_page: 0,
            order_entity_property_name: "CountryName".to_string(),
            is_order_descending: false,
        }
    }
}

impl OrderRequest for LocationQueryRequest {
    fn order_spec(&self) -> OrderSpec {
        OrderSpec::new(
            self.order_entity_property_name.clone(),
            self.is_order_descending,
        )
    }
}

impl PageRequest for LocationQueryRequest {
    fn page_spec(&self) -> PageSpec {
        PageSpec::new(self.page_number, self.count_per_page)
    }
}

#[derive(Debug, Clone)]
pub struct LocationInnerJoinRequest(pub LocationQueryRequest);

#[derive(Debug, Clone)]
pub struct LocationLeftJoinRequest(pub LocationQueryRequest);

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationInnerJoinResponse {
    pub country_id: i32,
    pub country_name: String,
    pub city_id: i32,
    pub city_name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationLeftJoinResponse {
    pub country_id: i32,
    pub country_name: String,
    pub city_id: Option<i32>,
    pub city_name: Option<String>,
}

/// Orderable fields of both location responses
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocationOrderField {
    CountryName,
    CityName,
}

impl LocationOrderField {
    fn parse(name: &str) -> Option<Self> {
        match name {
            "CountryName" => Some(LocationOrderField::CountryName),
            "CityName" => Some(LocationOrderField::CityName),
            _ => None,
        }
    }
}

impl OrderableField<LocationInnerJoinResponse> for LocationOrderField {
    fn from_name(name: &str) -> Option<Self> {
        Self::parse(name)
    }

    fn compare(self, a: &LocationInnerJoinResponse, b: &LocationInnerJoinResponse) -> Ordering {
        match self {
            LocationOrderField::CountryName => a.country_name.cmp(&b.country_name),
            LocationOrderField::CityName => a.city_name.cmp(&b.city_name),
        }
    }
}

impl OrderableField<LocationLeftJoinResponse> for LocationOrderField {
    fn from_name(name: &str) -> Option<Self> {
        Self::parse(name)
    }

    // rows without a city sort first
    fn compare(self, a: &LocationLeftJoinResponse, b: &LocationLeftJoinResponse) -> Ordering {
        match self {
            LocationOrderField::CountryName => a.country_name.cmp(&b.country_name),
            LocationOrderField::CityName => a.city_name.cmp(&b.city_name),
        }
    }
}

pub struct LocationService<S: RecordStore> {
    store: S,
}

impl<S: RecordStore> LocationService<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }
}

#[async_trait]
impl<S: RecordStore> RequestHandler<LocationInnerJoinRequest> for LocationService<S> {
    type Output = Query<LocationInnerJoinResponse>;

    async fn handle(
        &self,
        request: LocationInnerJoinRequest,
        _cancel: &CancellationToken,
    ) -> Result<Self::Output, AppError> {
        let request = request.0;
        let countries = self.store.countries().query(TrackingMode::NoTracking);
        let cities = self.store.cities().query(TrackingMode::NoTracking);

        let query = countries
            .inner_join(
                cities,
                |country| country.id,
                |city| city.country_id,
                |country, city| LocationInnerJoinResponse {
                    country_id: country.id,
                    country_name: country.country_name.clone(),
                    city_id: city.id,
                    city_name: city.city_name.clone(),
                },
            )
            .order_by_key(|row| row.country_name.clone(), Direction::Ascending)
            .order_by_field::<LocationOrderField>(&request.order_spec())
            .filter_contains(request.country_name.as_deref(), |row| {
                row.country_name.as_str()
            })
            .filter_contains(request.city_name.as_deref(), |row| row.city_name.as_str())
            .page(&request.page_spec());

        tracing::debug!(paging = ?query.paging(), "Location inner join composed");
        Ok(query)
    }
}

#[async_trait]
impl<S: RecordStore> RequestHandler<LocationLeftJoinRequest> for LocationService<S> {
    type Output = Query<LocationLeftJoinResponse>;

    async fn handle(
        &self,
        request: LocationLeftJoinRequest,
        _cancel: &CancellationToken,
    ) -> Result<Self::Output, AppError> {
        let request = request.0;
        let countries = self.store.countries().query(TrackingMode::NoTracking);
        let cities = self.store.cities().query(TrackingMode::NoTracking);

        let query = countries
            .left_join(
                cities,
                |country| country.id,
                |city| city.country_id,
                |country, city| LocationLeftJoinResponse {
                    country_id: country.id,
                    country_name: country.country_name.clone(),
                    city_id: city.map(|city| city.id),
                    city_name: city.map(|city| city.city_name.clone()),
                },
            )
            .order_by_key(|row| row.country_name.clone(), Direction::Ascending)
            .order_by_field::<LocationOrderField>(&request.order_spec())
            .filter_contains(request.country_name.as_deref(), |row| {
                row.country_name.as_str()
            })
            .filter_contains_nullable(request.city_name.as_deref(), |row| {
                row.city_name.as_deref()
            })
            .page(&request.page_spec());

        tracing::debug!(paging = ?query.paging(), "Location left join composed");
        Ok(query)
    }
}
