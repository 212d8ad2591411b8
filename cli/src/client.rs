//! Typed wrapper over the SkyCast HTTP API.
//!
//! Every server response is a `{success, message?, data?, errors?}` envelope;
//! `ApiClient` unwraps it and turns failures into readable errors.

use anyhow::{Result, anyhow};
use chrono::NaiveDateTime;
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::time::Duration;

pub const DEFAULT_API_URL: &str = "http://localhost:3000";

#[derive(Debug, Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
pub struct Envelope<T> {
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub data: Option<T>,
    #[serde(default)]
    pub errors: Option<Vec<String>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub email: String,
    pub username: String,
    pub favorite_locations: Vec<FavoriteLocation>,
    pub preferences: Preferences,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FavoriteLocation {
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Preferences {
    pub temperature_unit: String,
    pub theme: String,
    pub notifications: bool,
}

#[derive(Debug, Deserialize)]
pub struct AuthData {
    pub user: User,
    pub token: String,
}

#[derive(Debug, Deserialize)]
pub struct ProfileData {
    pub user: User,
}

#[derive(Debug, Deserialize)]
pub struct TokenData {
    pub token: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationsData {
    pub favorite_locations: Vec<FavoriteLocation>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeatherSnapshot {
    pub location: LocationInfo,
    pub current: CurrentConditions,
    pub temperature_unit: String,
    #[serde(default)]
    pub daily: Option<DailySeries>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationInfo {
    pub latitude: f64,
    pub longitude: f64,
    pub timezone: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrentConditions {
    pub temperature: f64,
    #[serde(default)]
    pub feels_like: Option<f64>,
    pub is_day: bool,
    pub rain: f64,
    pub wind_speed: f64,
    pub wind_direction: f64,
    pub humidity: f64,
    pub pressure: f64,
    pub visibility: f64,
    pub description: String,
    pub icon: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailySeries {
    pub time: Vec<NaiveDateTime>,
    pub sunrise: Vec<NaiveDateTime>,
    pub sunset: Vec<NaiveDateTime>,
    pub uv_index_max: Vec<f64>,
    pub temperature_max: Vec<f64>,
    pub temperature_min: Vec<f64>,
    pub precipitation_sum: Vec<f64>,
    pub conditions: Vec<Condition>,
}

#[derive(Debug, Deserialize)]
pub struct Condition {
    pub description: String,
    pub icon: String,
}

#[derive(Debug, Deserialize)]
pub struct LocationSearchResult {
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
    pub country: String,
    pub admin1: String,
}

pub struct ApiClient {
    http: Client,
    base_url: String,
    token: Option<String>,
}

impl ApiClient {
    pub fn new(base_url: String, token: Option<String>) -> Result<Self> {
        let http = Client::builder().timeout(Duration::from_secs(15)).build()?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            token,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/api{}", self.base_url, path)
    }

    fn authed(&self, builder: RequestBuilder) -> RequestBuilder {
        match &self.token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    async fn parse<T: DeserializeOwned>(res: reqwest::Response) -> Result<T> {
        let status = res.status();
        let body = res.text().await?;

        let envelope: Envelope<T> = serde_json::from_str(&body)
            .map_err(|_| anyhow!("Server returned invalid JSON ({status}): {body}"))?;

        if !envelope.success {
            let mut message = envelope
                .message
                .unwrap_or_else(|| format!("Request failed with status {status}"));
            if let Some(errors) = envelope.errors.filter(|e| !e.is_empty()) {
                message = format!("{message}\n  - {}", errors.join("\n  - "));
            }
            return Err(anyhow!(message));
        }

        envelope
            .data
            .ok_or_else(|| anyhow!("Response contained no data"))
    }

    /// Like [`parse`], for endpoints whose success payload carries no data.
    async fn expect_success(res: reqwest::Response) -> Result<()> {
        let status = res.status();
        let body = res.text().await?;

        let envelope: Envelope<serde_json::Value> = serde_json::from_str(&body)
            .map_err(|_| anyhow!("Server returned invalid JSON ({status}): {body}"))?;

        if !envelope.success {
            return Err(anyhow!(
                envelope
                    .message
                    .unwrap_or_else(|| format!("Request failed with status {status}"))
            ));
        }
        Ok(())
    }

    pub async fn register(&self, email: &str, username: &str, password: &str) -> Result<AuthData> {
        log::debug!("POST /api/auth/register");
        let res = self
            .http
            .post(self.url("/auth/register"))
            .json(&json!({"email": email, "username": username, "password": password}))
            .send()
            .await?;
        Self::parse(res).await
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<AuthData> {
        log::debug!("POST /api/auth/login");
        let res = self
            .http
            .post(self.url("/auth/login"))
            .json(&json!({"email": email, "password": password}))
            .send()
            .await?;
        Self::parse(res).await
    }

    pub async fn profile(&self) -> Result<ProfileData> {
        let res = self
            .authed(self.http.get(self.url("/auth/profile")))
            .send()
            .await?;
        Self::parse(res).await
    }

    pub async fn refresh(&self) -> Result<TokenData> {
        let res = self
            .authed(self.http.post(self.url("/auth/refresh")))
            .send()
            .await?;
        Self::parse(res).await
    }

    pub async fn update_locations(&self, locations: &[FavoriteLocation]) -> Result<LocationsData> {
        let res = self
            .authed(self.http.put(self.url("/user/locations")))
            .json(&json!({"locations": locations}))
            .send()
            .await?;
        Self::parse(res).await
    }

    pub async fn delete_account(&self) -> Result<()> {
        let res = self
            .authed(self.http.delete(self.url("/user/account")))
            .send()
            .await?;
        Self::expect_success(res).await
    }

    pub async fn current(&self, latitude: f64, longitude: f64) -> Result<WeatherSnapshot> {
        log::debug!("GET /api/weather/current {latitude},{longitude}");
        let res = self
            .authed(self.http.get(self.url("/weather/current")))
            .query(&[("latitude", latitude), ("longitude", longitude)])
            .send()
            .await?;
        Self::parse(res).await
    }

    pub async fn forecast(
        &self,
        latitude: f64,
        longitude: f64,
        days: Option<u8>,
    ) -> Result<WeatherSnapshot> {
        log::debug!("GET /api/weather/forecast {latitude},{longitude}");
        let mut query = vec![
            ("latitude", latitude.to_string()),
            ("longitude", longitude.to_string()),
        ];
        if let Some(days) = days {
            query.push(("days", days.to_string()));
        }
        let res = self
            .authed(self.http.get(self.url("/weather/forecast")))
            .query(&query)
            .send()
            .await?;
        Self::parse(res).await
    }

    pub async fn search(&self, query: &str) -> Result<Vec<LocationSearchResult>> {
        log::debug!("GET /api/weather/search q={query}");
        let res = self
            .http
            .get(self.url("/weather/search"))
            .query(&[("q", query)])
            .send()
            .await?;
        Self::parse(res).await
    }
}
