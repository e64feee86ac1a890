//! Locations API port
//!
//! Countries and cities are owned by the Locations service. User queries
//! resolve their foreign ids through this port.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::LocationsError;

/// A country as listed by the countries endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CountryRef {
    pub id: i32,
    #[serde(default)]
    pub country_name: Option<String>,
}

/// A city as listed by the cities endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CityRef {
    pub id: i32,
    #[serde(default)]
    pub city_name: Option<String>,
}

/// Outbound client for the Countries and Cities APIs
///
/// `credential` is the caller's token with its scheme prefix already
/// stripped; implementations forward it as-is.
#[async_trait]
pub trait LocationsClient: Send + Sync + 'static {
    async fn countries(
        &self,
        url: &str,
        credential: Option<&str>,
    ) -> Result<Vec<CountryRef>, LocationsError>;

    async fn cities(
        &self,
        url: &str,
        credential: Option<&str>,
    ) -> Result<Vec<CityRef>, LocationsError>;
}
