use std::env;

#[derive(Clone)]
pub struct Config {
    pub database_url: String,
    /// Countries endpoint used to resolve user country names
    pub countries_api_url: Option<String>,
    /// Cities endpoint used to resolve user city names
    pub cities_api_url: Option<String>,
    pub port: u16,
}

impl Config {
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        Self {
            database_url: env::var("DATABASE_URL").expect("DATABASE_URL must be set"),
            countries_api_url: non_blank(env::var("COUNTRIES_API_URL").ok()),
            cities_api_url: non_blank(env::var("CITIES_API_URL").ok()),
            port: env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(8080),
        }
    }

    /// Check if user location enrichment is configured
    pub fn enrichment_enabled(&self) -> bool {
        self.countries_api_url.is_some() && self.cities_api_url.is_some()
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
