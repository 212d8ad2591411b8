use async_trait::async_trait;

use crate::error::ApiError;
use crate::models::weather::{LocationSearchResult, WeatherSnapshot};

pub mod codes;
pub mod openmeteo;

#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    #[error("Weather provider request failed: {0}")]
    Network(#[from] reqwest::Error),
    #[error("Weather provider returned status {status}: {body}")]
    Status { status: u16, body: String },
    #[error("Failed to parse weather provider response: {0}")]
    Parse(String),
    #[error("{0}")]
    MissingData(&'static str),
}

impl From<ProviderError> for ApiError {
    fn from(err: ProviderError) -> Self {
        ApiError::Upstream(err.to_string())
    }
}

/// Seam between the HTTP surface and the weather backend. Handlers only see
/// this trait; tests substitute their own implementation or point the real
/// one at a mock server.
#[async_trait]
pub trait WeatherProvider: Send + Sync {
    /// Current conditions plus the 15-minute series for the next hours.
    async fn current_weather(
        &self,
        latitude: f64,
        longitude: f64,
    ) -> Result<WeatherSnapshot, ProviderError>;

    /// Current conditions plus hourly and daily series for `days` days.
    async fn forecast(
        &self,
        latitude: f64,
        longitude: f64,
        days: u8,
    ) -> Result<WeatherSnapshot, ProviderError>;

    /// Geocoding search by free-text name.
    async fn search_locations(
        &self,
        query: &str,
    ) -> Result<Vec<LocationSearchResult>, ProviderError>;
}
