//! User service
//!
//! Read-only user queries. The plain query adds display-formatted fields
//! along with the user's group and roles; the location query resolves
//! country and city names through the Locations API using the caller's
//! credential.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;
use serde::Serialize;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use super::command::RequestHandler;
use crate::domain::entities::{Gender, Role, User};
use crate::domain::ports::{LocationsClient, RecordStore, Repository, TrackingMode};
use crate::error::{AppError, DomainError, LocationsError};
use crate::query::{Direction, Query};

const DATE_FORMAT: &str = "%m/%d/%Y";

#[derive(Debug, Clone, Default)]
pub struct UserQueryRequest;

/// Users resolved against the Locations API
#[derive(Debug, Clone, Default)]
pub struct UserLocationQueryRequest {
    /// Inbound token with the scheme prefix stripped
    pub credential: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserQueryResponse {
    pub id: i32,
    pub guid: Uuid,
    pub user_name: String,
    pub first_name: String,
    pub last_name: String,
    pub gender: Gender,
    pub birth_date: Option<NaiveDate>,
    pub registration_date: NaiveDate,
    pub score: f64,
    pub is_active: bool,
    pub address: Option<String>,
    pub country_id: Option<i32>,
    pub city_id: Option<i32>,
    pub group_id: Option<i32>,
    pub role_ids: Vec<i32>,
    pub full_name: String,
    pub gender_f: String,
    pub birth_date_f: String,
    pub registration_date_f: String,
    pub score_f: String,
    pub is_active_f: String,
    /// Country id as text, `"0"` when unset; names come from `/users/locations`
    pub country: String,
    pub city: String,
    /// Group title
    pub group: Option<String>,
    /// Role names, in grant order
    pub roles: Vec<String>,
}

impl UserQueryResponse {
    pub fn new<'a>(
        user: User,
        group: Option<String>,
        roles: impl IntoIterator<Item = &'a Role>,
    ) -> Self {
        let (role_ids, roles): (Vec<i32>, Vec<String>) = roles
            .into_iter()
            .map(|role| (role.id, role.name.clone()))
            .unzip();

        Self {
            full_name: user.full_name(),
            gender_f: user.gender.to_string(),
            birth_date_f: user
                .birth_date
                .map(|date| date.format(DATE_FORMAT).to_string())
                .unwrap_or_default(),
            registration_date_f: user.registration_date.format(DATE_FORMAT).to_string(),
            score_f: format_score(user.score),
            is_active_f: if user.is_active { "Active" } else { "Not Active" }.to_string(),
            country: user.country_id.unwrap_or(0).to_string(),
            city: user.city_id.unwrap_or(0).to_string(),
            group,
            roles,
            role_ids,
            id: user.id,
            guid: user.guid,
            user_name: user.user_name,
            first_name: user.first_name,
            last_name: user.last_name,
            gender: user.gender,
            birth_date: user.birth_date,
            registration_date: user.registration_date,
            score: user.score,
            is_active: user.is_active,
            address: user.address,
            country_id: user.country_id,
            city_id: user.city_id,
            group_id: user.group_id,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserLocationQueryResponse {
    pub id: i32,
    pub guid: Uuid,
    pub user_name: String,
    pub full_name: String,
    pub address: Option<String>,
    pub country_id: Option<i32>,
    /// Empty when the id is missing or unknown to the Locations API
    pub country: String,
    pub city_id: Option<i32>,
    pub city: String,
}

/// One decimal place with thousands separators, e.g. `1,234.5`
///
/// Non-finite scores render as `NaN`, `inf` or `-inf`.
pub fn format_score(score: f64) -> String {
    if !score.is_finite() {
        return score.to_string();
    }

    let fixed = format!("{:.1}", score.abs());
    let (whole, fraction) = fixed.split_once('.').unwrap_or((fixed.as_str(), "0"));

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, digit) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }

    let sign = if score < 0.0 && fixed != "0.0" { "-" } else { "" };
    format!("{}{}.{}", sign, grouped, fraction)
}

pub struct UserService<S, L>
where
    S: RecordStore,
    L: LocationsClient,
{
    store: S,
    locations: Arc<L>,
    countries_api_url: Option<String>,
    cities_api_url: Option<String>,
}

impl<S, L> UserService<S, L>
where
    S: RecordStore,
    L: LocationsClient,
{
    pub fn new(
        store: S,
        locations: Arc<L>,
        countries_api_url: Option<String>,
        cities_api_url: Option<String>,
    ) -> Self {
        Self {
            store,
            locations,
            countries_api_url,
            cities_api_url,
        }
    }

    /// Users ordered active first, then by registration date and user name
    fn ordered_users(&self) -> Query<User> {
        self.store
            .users()
            .query(TrackingMode::NoTracking)
            .order_by_key(|user| user.is_active, Direction::Descending)
            .then_by_key(|user| user.registration_date, Direction::Ascending)
            .then_by_key(|user| user.user_name.clone(), Direction::Ascending)
    }

    /// Granted roles keyed by the user holding them
    fn granted_roles(&self) -> Query<(i32, Role)> {
        self.store.user_roles().query(TrackingMode::NoTracking).inner_join(
            self.store.roles().query(TrackingMode::NoTracking),
            |grant| grant.role_id,
            |role| role.id,
            |grant, role| (grant.user_id, role.clone()),
        )
    }
}

/// Await an outbound call unless the request is cancelled first
async fn race<T>(
    cancel: &CancellationToken,
    call: impl std::future::Future<Output = Result<T, LocationsError>>,
) -> Result<T, AppError> {
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(DomainError::Cancelled.into()),
        result = call => Ok(result?),
    }
}

#[async_trait]
impl<S, L> RequestHandler<UserQueryRequest> for UserService<S, L>
where
    S: RecordStore,
    L: LocationsClient,
{
    type Output = Query<UserQueryResponse>;

    async fn handle(
        &self,
        _request: UserQueryRequest,
        _cancel: &CancellationToken,
    ) -> Result<Self::Output, AppError> {
        let with_group = self.ordered_users().left_join(
            self.store.groups().query(TrackingMode::NoTracking),
            |user| user.group_id,
            |group| Some(group.id),
            |user, group| (user.clone(), group.map(|group| group.title.clone())),
        );

        Ok(with_group.group_join(
            self.granted_roles(),
            |row| row.0.id,
            |grant| grant.0,
            |(user, group), grants| {
                UserQueryResponse::new(user.clone(), group.clone(), grants.iter().map(|g| &g.1))
            },
        ))
    }
}

#[async_trait]
impl<S, L> RequestHandler<UserLocationQueryRequest> for UserService<S, L>
where
    S: RecordStore,
    L: LocationsClient,
{
    type Output = Query<UserLocationQueryResponse>;

    async fn handle(
        &self,
        request: UserLocationQueryRequest,
        cancel: &CancellationToken,
    ) -> Result<Self::Output, AppError> {
        let (Some(countries_url), Some(cities_url)) =
            (&self.countries_api_url, &self.cities_api_url)
        else {
            tracing::debug!("Locations API not configured, skipping user locations");
            return Ok(Query::from_records(Vec::new()));
        };
        let credential = request.credential.as_deref();

        let countries = race(cancel, self.locations.countries(countries_url, credential)).await?;
        let cities = race(cancel, self.locations.cities(cities_url, credential)).await?;
        tracing::debug!(
            countries = countries.len(),
            cities = cities.len(),
            "Fetched locations"
        );

        let country_names: HashMap<i32, String> = countries
            .into_iter()
            .map(|c| (c.id, c.country_name.unwrap_or_default()))
            .collect();
        let city_names: HashMap<i32, String> = cities
            .into_iter()
            .map(|c| (c.id, c.city_name.unwrap_or_default()))
            .collect();

        let lookup = |names: &HashMap<i32, String>, id: Option<i32>| {
            id.and_then(|id| names.get(&id).cloned()).unwrap_or_default()
        };

        Ok(self
            .store
            .users()
            .query(TrackingMode::NoTracking)
            .map(move |user| UserLocationQueryResponse {
                full_name: user.full_name(),
                country: lookup(&country_names, user.country_id),
                city: lookup(&city_names, user.city_id),
                id: user.id,
                guid: user.guid,
                user_name: user.user_name,
                address: user.address,
                country_id: user.country_id,
                city_id: user.city_id,
            }))
    }
}
