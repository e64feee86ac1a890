//! Countries/Cities API client implementation

use async_trait::async_trait;
use reqwest::{header::AUTHORIZATION, Client, RequestBuilder};
use serde::Deserialize;

use crate::domain::ports::{CityRef, CountryRef, LocationsClient};
use crate::error::LocationsError;

/// reqwest-backed `LocationsClient`
///
/// Both endpoints are plain `GET`s returning a JSON array. The caller's
/// credential, when present, is sent as the raw `Authorization` value.
#[derive(Clone, Default)]
pub struct HttpLocationsClient {
    http: Client,
}

impl HttpLocationsClient {
    pub fn new() -> Self {
        Self {
            http: Client::new(),
        }
    }

    fn get(&self, url: &str, credential: Option<&str>) -> RequestBuilder {
        let request = self.http.get(url);
        match credential {
            Some(token) => request.header(AUTHORIZATION, token),
            None => request,
        }
    }

    async fn fetch<T: for<'de> Deserialize<'de>>(
        &self,
        url: &str,
        credential: Option<&str>,
    ) -> Result<Vec<T>, LocationsError> {
        let response = self.get(url, credential).send().await?;
        let status = response.status();

        if status.is_success() {
            response
                .json()
                .await
                .map_err(|e| LocationsError::Deserialization(e.to_string()))
        } else {
            let message = response.text().await.unwrap_or_default();
            tracing::warn!(url, status = status.as_u16(), "Locations API request failed");
            Err(LocationsError::Api {
                status: status.as_u16(),
                message,
            })
        }
    }
}

#[async_trait]
impl LocationsClient for HttpLocationsClient {
    async fn countries(
        &self,
        url: &str,
        credential: Option<&str>,
    ) -> Result<Vec<CountryRef>, LocationsError> {
        self.fetch(url, credential).await
    }

    async fn cities(
        &self,
        url: &str,
        credential: Option<&str>,
    ) -> Result<Vec<CityRef>, LocationsError> {
        self.fetch(url, credential).await
    }
}
