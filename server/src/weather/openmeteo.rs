//! Open-Meteo client and normalization layer.
//!
//! The provider speaks a columnar encoding: each granularity block carries a
//! shared `(time, time_end, interval)` triple plus one flat value array per
//! requested variable, all indexed by position on the same time axis.
//! Sunrise and sunset are 64-bit integer timestamps and must not go through
//! the floating-point decoding used for every other series.
//!
//! Everything below reconstitutes that encoding into the self-describing
//! series types in [`crate::models::weather`].

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDateTime};
use reqwest::Client;
use serde::Deserialize;

use crate::config::Config;
use crate::models::user::TemperatureUnit;
use crate::models::weather::{
    CurrentConditions, DailySeries, HourlySeries, LocationInfo, LocationSearchResult,
    Minutely15Series, WeatherSnapshot,
};
use crate::weather::{ProviderError, WeatherProvider, codes};

const REQUEST_TIMEOUT_SECS: u64 = 10;

const CURRENT_VARIABLES: &str = "temperature_2m,apparent_temperature,is_day,rain,weather_code,\
    wind_speed_10m,wind_direction_10m,relative_humidity_2m,surface_pressure,visibility,dew_point_2m";
const FORECAST_CURRENT_VARIABLES: &str = "temperature_2m,apparent_temperature,is_day,rain,\
    weather_code,wind_speed_10m,wind_direction_10m,relative_humidity_2m,surface_pressure";
const HOURLY_VARIABLES: &str = "temperature_2m,rain,relative_humidity_2m,surface_pressure,\
    wind_speed_10m,wind_direction_10m,weather_code";
const DAILY_VARIABLES: &str = "sunrise,sunset,uv_index_max,daylight_duration,sunshine_duration,\
    temperature_2m_max,temperature_2m_min,weather_code,precipitation_sum";
const MINUTELY_VARIABLES: &str = "rain,sunshine_duration,visibility,dew_point_2m,temperature_2m";

#[derive(Debug, Clone)]
pub struct OpenMeteo {
    http: Client,
    forecast_url: String,
    geocoding_url: String,
}

impl OpenMeteo {
    pub fn new(config: &Config) -> Result<Self, ProviderError> {
        let http = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;

        Ok(Self {
            http,
            forecast_url: config.forecast_url.clone(),
            geocoding_url: config.geocoding_url.clone(),
        })
    }

    async fn fetch_forecast(
        &self,
        query: &[(&str, String)],
    ) -> Result<ForecastResponse, ProviderError> {
        let res = self.http.get(&self.forecast_url).query(query).send().await?;

        let status = res.status();
        let body = res.text().await?;

        if !status.is_success() {
            return Err(ProviderError::Status {
                status: status.as_u16(),
                body: truncate_body(&body),
            });
        }

        serde_json::from_str(&body).map_err(|e| ProviderError::Parse(e.to_string()))
    }
}

#[async_trait]
impl WeatherProvider for OpenMeteo {
    async fn current_weather(
        &self,
        latitude: f64,
        longitude: f64,
    ) -> Result<WeatherSnapshot, ProviderError> {
        let query = [
            ("latitude", latitude.to_string()),
            ("longitude", longitude.to_string()),
            ("current", CURRENT_VARIABLES.to_string()),
            ("minutely_15", MINUTELY_VARIABLES.to_string()),
            ("timezone", "auto".to_string()),
        ];

        let response = self.fetch_forecast(&query).await?;
        let location = normalize_location(&response);

        let current_block = response
            .current
            .ok_or(ProviderError::MissingData("No current weather data"))?;
        let mut current = normalize_current(current_block);

        let minutely15 = response
            .minutely_15
            .map(|block| normalize_minutely(block, location.utc_offset_seconds));

        // The current block has no sunshine variable of its own; the first
        // 15-minute sample covers the present interval.
        if let Some(series) = &minutely15 {
            if let Some(&sunshine) = series.sunshine_duration.first() {
                current.sunshine_duration = sunshine;
            }
        }

        Ok(WeatherSnapshot {
            location,
            current,
            temperature_unit: TemperatureUnit::Celsius,
            hourly: None,
            daily: None,
            minutely15,
        })
    }

    async fn forecast(
        &self,
        latitude: f64,
        longitude: f64,
        days: u8,
    ) -> Result<WeatherSnapshot, ProviderError> {
        let query = [
            ("latitude", latitude.to_string()),
            ("longitude", longitude.to_string()),
            ("current", FORECAST_CURRENT_VARIABLES.to_string()),
            ("hourly", HOURLY_VARIABLES.to_string()),
            ("daily", DAILY_VARIABLES.to_string()),
            ("forecast_days", days.to_string()),
            ("timezone", "auto".to_string()),
        ];

        let response = self.fetch_forecast(&query).await?;
        let location = normalize_location(&response);
        let offset = location.utc_offset_seconds;

        let current_block = response
            .current
            .ok_or(ProviderError::MissingData("No current weather data"))?;
        let hourly_block = response
            .hourly
            .ok_or(ProviderError::MissingData("No hourly weather data"))?;
        let daily_block = response
            .daily
            .ok_or(ProviderError::MissingData("No daily weather data"))?;

        Ok(WeatherSnapshot {
            location,
            current: normalize_current(current_block),
            temperature_unit: TemperatureUnit::Celsius,
            hourly: Some(normalize_hourly(hourly_block, offset)),
            daily: Some(normalize_daily(daily_block, offset)),
            minutely15: None,
        })
    }

    async fn search_locations(
        &self,
        query: &str,
    ) -> Result<Vec<LocationSearchResult>, ProviderError> {
        let params = [
            ("name", query.to_string()),
            ("count", "10".to_string()),
            ("language", "en".to_string()),
            ("format", "json".to_string()),
        ];

        let res = self.http.get(&self.geocoding_url).query(&params).send().await?;

        let status = res.status();
        let body = res.text().await?;

        if !status.is_success() {
            return Err(ProviderError::Status {
                status: status.as_u16(),
                body: truncate_body(&body),
            });
        }

        let parsed: GeocodingResponse =
            serde_json::from_str(&body).map_err(|e| ProviderError::Parse(e.to_string()))?;

        // A query with no matches comes back without a results key at all;
        // that is an empty list, not an error.
        Ok(parsed
            .results
            .unwrap_or_default()
            .into_iter()
            .map(|result| LocationSearchResult {
                name: result.name,
                latitude: result.latitude,
                longitude: result.longitude,
                country: result.country.unwrap_or_default(),
                admin1: result.admin1.unwrap_or_default(),
                admin2: result.admin2.unwrap_or_default(),
            })
            .collect())
    }
}

// ---------------------------------------------------------------------------
// Wire format
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct ForecastResponse {
    latitude: f64,
    longitude: f64,
    #[serde(default)]
    elevation: f64,
    timezone: Option<String>,
    #[serde(default)]
    utc_offset_seconds: i64,
    current: Option<CurrentBlock>,
    hourly: Option<HourlyBlock>,
    daily: Option<DailyBlock>,
    minutely_15: Option<Minutely15Block>,
}

/// Variables missing from a response decode as zero, matching how absent
/// columns behave in the provider's columnar encoding.
#[derive(Debug, Deserialize)]
struct CurrentBlock {
    #[serde(default)]
    temperature_2m: f64,
    apparent_temperature: Option<f64>,
    #[serde(default)]
    is_day: f64,
    #[serde(default)]
    rain: f64,
    #[serde(default)]
    weather_code: f64,
    #[serde(default)]
    wind_speed_10m: f64,
    #[serde(default)]
    wind_direction_10m: f64,
    #[serde(default)]
    relative_humidity_2m: f64,
    #[serde(default)]
    surface_pressure: f64,
    visibility: Option<f64>,
    dew_point_2m: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct HourlyBlock {
    time: i64,
    time_end: i64,
    interval: i64,
    #[serde(default)]
    temperature_2m: Vec<f64>,
    #[serde(default)]
    rain: Vec<f64>,
    #[serde(default)]
    relative_humidity_2m: Vec<f64>,
    #[serde(default)]
    surface_pressure: Vec<f64>,
    #[serde(default)]
    wind_speed_10m: Vec<f64>,
    #[serde(default)]
    wind_direction_10m: Vec<f64>,
    #[serde(default)]
    weather_code: Vec<f64>,
}

#[derive(Debug, Deserialize)]
struct DailyBlock {
    time: i64,
    time_end: i64,
    interval: i64,
    /// Epoch seconds, 64-bit integers; distinct from the f64 series decoding.
    #[serde(default)]
    sunrise: Vec<i64>,
    #[serde(default)]
    sunset: Vec<i64>,
    #[serde(default)]
    uv_index_max: Vec<f64>,
    #[serde(default)]
    daylight_duration: Vec<f64>,
    #[serde(default)]
    sunshine_duration: Vec<f64>,
    #[serde(default)]
    temperature_2m_max: Vec<f64>,
    #[serde(default)]
    temperature_2m_min: Vec<f64>,
    #[serde(default)]
    weather_code: Vec<f64>,
    #[serde(default)]
    precipitation_sum: Vec<f64>,
}

#[derive(Debug, Deserialize)]
struct Minutely15Block {
    time: i64,
    time_end: i64,
    interval: i64,
    #[serde(default)]
    rain: Vec<f64>,
    #[serde(default)]
    sunshine_duration: Vec<f64>,
    #[serde(default)]
    visibility: Vec<f64>,
    #[serde(default)]
    dew_point_2m: Vec<f64>,
    #[serde(default)]
    temperature_2m: Vec<f64>,
}

#[derive(Debug, Deserialize)]
struct GeocodingResponse {
    results: Option<Vec<GeocodingResult>>,
}

#[derive(Debug, Deserialize)]
struct GeocodingResult {
    name: String,
    latitude: f64,
    longitude: f64,
    country: Option<String>,
    admin1: Option<String>,
    admin2: Option<String>,
}

// ---------------------------------------------------------------------------
// Normalization
// ---------------------------------------------------------------------------

/// Expand a `(start, end, step)` triple into discrete instants, each shifted
/// by the location's UTC offset so the result reads as local wall-clock time.
fn expand_time_axis(
    start: i64,
    end: i64,
    interval: i64,
    utc_offset_seconds: i64,
) -> Vec<NaiveDateTime> {
    if interval <= 0 || end <= start {
        return Vec::new();
    }
    (start..end)
        .step_by(interval as usize)
        .map(|t| local_instant(t, utc_offset_seconds))
        .collect()
}

fn local_instant(epoch_seconds: i64, utc_offset_seconds: i64) -> NaiveDateTime {
    DateTime::from_timestamp(epoch_seconds + utc_offset_seconds, 0)
        .unwrap_or(DateTime::UNIX_EPOCH)
        .naive_utc()
}

fn normalize_location(response: &ForecastResponse) -> LocationInfo {
    LocationInfo {
        latitude: response.latitude,
        longitude: response.longitude,
        elevation: response.elevation,
        timezone: response
            .timezone
            .clone()
            .unwrap_or_else(|| "UTC".to_string()),
        utc_offset_seconds: response.utc_offset_seconds,
    }
}

fn normalize_current(block: CurrentBlock) -> CurrentConditions {
    let weather_code = block.weather_code as u8;
    let condition = codes::describe(weather_code);

    CurrentConditions {
        temperature: block.temperature_2m.round(),
        feels_like: block.apparent_temperature,
        is_day: block.is_day == 1.0,
        rain: block.rain,
        weather_code,
        wind_speed: block.wind_speed_10m,
        wind_direction: block.wind_direction_10m,
        humidity: block.relative_humidity_2m,
        pressure: block.surface_pressure,
        // Meters on the wire, kilometers in the snapshot.
        visibility: block.visibility.unwrap_or(0.0) / 1000.0,
        dew_point: block.dew_point_2m.unwrap_or(0.0),
        sunshine_duration: 0.0,
        description: condition.description.to_string(),
        icon: condition.icon.to_string(),
    }
}

fn normalize_hourly(block: HourlyBlock, utc_offset_seconds: i64) -> HourlySeries {
    HourlySeries {
        time: expand_time_axis(block.time, block.time_end, block.interval, utc_offset_seconds),
        temperature: block.temperature_2m,
        rain: block.rain,
        humidity: block.relative_humidity_2m,
        pressure: block.surface_pressure,
        wind_speed: block.wind_speed_10m,
        wind_direction: block.wind_direction_10m,
        weather_code: block.weather_code.into_iter().map(|c| c as u8).collect(),
    }
}

fn normalize_daily(block: DailyBlock, utc_offset_seconds: i64) -> DailySeries {
    let weather_code: Vec<u8> = block.weather_code.into_iter().map(|c| c as u8).collect();
    let conditions = weather_code.iter().map(|&c| codes::describe(c)).collect();

    DailySeries {
        time: expand_time_axis(block.time, block.time_end, block.interval, utc_offset_seconds),
        sunrise: block
            .sunrise
            .into_iter()
            .map(|t| local_instant(t, utc_offset_seconds))
            .collect(),
        sunset: block
            .sunset
            .into_iter()
            .map(|t| local_instant(t, utc_offset_seconds))
            .collect(),
        uv_index_max: block.uv_index_max,
        daylight_duration: block.daylight_duration,
        sunshine_duration: block.sunshine_duration,
        temperature_max: block.temperature_2m_max,
        temperature_min: block.temperature_2m_min,
        weather_code,
        precipitation_sum: block.precipitation_sum,
        conditions,
    }
}

fn normalize_minutely(block: Minutely15Block, utc_offset_seconds: i64) -> Minutely15Series {
    Minutely15Series {
        time: expand_time_axis(block.time, block.time_end, block.interval, utc_offset_seconds),
        rain: block.rain,
        sunshine_duration: block.sunshine_duration,
        visibility: block.visibility,
        dew_point: block.dew_point_2m,
        temperature: block.temperature_2m,
    }
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    if body.len() <= MAX {
        body.to_string()
    } else {
        let truncated: String = body.chars().take(MAX).collect();
        format!("{truncated}…")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn time_axis_expansion_is_exclusive_of_end() {
        let axis = expand_time_axis(1_700_000_000, 1_700_003_600, 900, 0);
        assert_eq!(axis.len(), 4);
        assert_eq!(axis[0], local_instant(1_700_000_000, 0));
        assert_eq!(axis[3], local_instant(1_700_002_700, 0));
    }

    #[test]
    fn time_axis_applies_utc_offset() {
        // 19800s = UTC+05:30
        let axis = expand_time_axis(1_700_000_000, 1_700_003_600, 3600, 19_800);
        assert_eq!(axis.len(), 1);
        assert_eq!(axis[0], local_instant(1_700_000_000, 19_800));
        assert_eq!(
            axis[0] - local_instant(1_700_000_000, 0),
            chrono::Duration::seconds(19_800)
        );
    }

    #[test]
    fn degenerate_time_axis_is_empty() {
        assert!(expand_time_axis(10, 10, 900, 0).is_empty());
        assert!(expand_time_axis(10, 5, 900, 0).is_empty());
        assert!(expand_time_axis(0, 100, 0, 0).is_empty());
    }

    #[test]
    fn current_conditions_convert_visibility_and_round_temperature() {
        let block = CurrentBlock {
            temperature_2m: 27.6,
            apparent_temperature: Some(29.4),
            is_day: 1.0,
            rain: 0.0,
            weather_code: 0.0,
            wind_speed_10m: 6.3,
            wind_direction_10m: 180.0,
            relative_humidity_2m: 58.0,
            surface_pressure: 1009.2,
            visibility: Some(24_140.0),
            dew_point_2m: Some(18.4),
        };
        let current = normalize_current(block);
        assert_eq!(current.temperature, 28.0);
        assert_eq!(current.visibility, 24.14);
        assert!(current.is_day);
        assert_eq!(current.description, "Clear sky");
        assert_eq!(current.icon, "☀️");
    }

    #[test]
    fn unknown_weather_code_gets_sentinel_description() {
        let block = CurrentBlock {
            temperature_2m: 0.0,
            apparent_temperature: None,
            is_day: 0.0,
            rain: 0.0,
            weather_code: 12.0,
            wind_speed_10m: 0.0,
            wind_direction_10m: 0.0,
            relative_humidity_2m: 0.0,
            surface_pressure: 0.0,
            visibility: None,
            dew_point_2m: None,
        };
        let current = normalize_current(block);
        assert_eq!(current.description, "Unknown");
        assert_eq!(current.icon, "❓");
    }

    #[test]
    fn daily_series_decodes_sunrise_as_integer_timestamps() {
        let block = DailyBlock {
            time: 1_700_000_000,
            time_end: 1_700_172_800,
            interval: 86_400,
            sunrise: vec![1_700_020_000, 1_700_106_400],
            sunset: vec![1_700_060_000, 1_700_146_400],
            uv_index_max: vec![5.2, 4.8],
            daylight_duration: vec![39_000.0, 38_900.0],
            sunshine_duration: vec![30_000.0, 29_000.0],
            temperature_2m_max: vec![31.0, 30.2],
            temperature_2m_min: vec![19.4, 18.9],
            weather_code: vec![0.0, 61.0],
            precipitation_sum: vec![0.0, 2.5],
        };
        let daily = normalize_daily(block, 19_800);

        assert_eq!(daily.time.len(), 2);
        assert_eq!(daily.sunrise.len(), daily.time.len());
        assert_eq!(daily.sunrise[0], local_instant(1_700_020_000, 19_800));
        assert_eq!(daily.conditions.len(), 2);
        assert_eq!(daily.conditions[1].description, "Slight rain");
    }

    #[test]
    fn series_lengths_match_their_time_axis() {
        let block = HourlyBlock {
            time: 1_700_000_000,
            time_end: 1_700_010_800,
            interval: 3600,
            temperature_2m: vec![20.0, 21.0, 22.0],
            rain: vec![0.0, 0.0, 0.4],
            relative_humidity_2m: vec![60.0, 61.0, 63.0],
            surface_pressure: vec![1010.0, 1009.0, 1008.0],
            wind_speed_10m: vec![4.0, 5.0, 6.0],
            wind_direction_10m: vec![90.0, 95.0, 100.0],
            weather_code: vec![0.0, 1.0, 61.0],
        };
        let hourly = normalize_hourly(block, 0);

        assert_eq!(hourly.time.len(), 3);
        assert_eq!(hourly.temperature.len(), hourly.time.len());
        assert_eq!(hourly.rain.len(), hourly.time.len());
        assert_eq!(hourly.humidity.len(), hourly.time.len());
        assert_eq!(hourly.pressure.len(), hourly.time.len());
        assert_eq!(hourly.wind_speed.len(), hourly.time.len());
        assert_eq!(hourly.wind_direction.len(), hourly.time.len());
        assert_eq!(hourly.weather_code.len(), hourly.time.len());
    }

    #[test]
    fn forecast_response_parses_from_wire_json() {
        let body = r#"{
            "latitude": 18.52,
            "longitude": 73.85,
            "elevation": 560.0,
            "timezone": "Asia/Kolkata",
            "utc_offset_seconds": 19800,
            "current": {
                "time": 1700000000,
                "temperature_2m": 27.6,
                "is_day": 1,
                "rain": 0,
                "weather_code": 2,
                "wind_speed_10m": 6.3,
                "wind_direction_10m": 180,
                "relative_humidity_2m": 58,
                "surface_pressure": 1009.2
            },
            "minutely_15": {
                "time": 1700000000,
                "time_end": 1700001800,
                "interval": 900,
                "rain": [0.0, 0.1],
                "sunshine_duration": [900.0, 860.0],
                "visibility": [24140.0, 23000.0],
                "dew_point_2m": [18.4, 18.3],
                "temperature_2m": [27.6, 27.4]
            }
        }"#;

        let parsed: ForecastResponse = serde_json::from_str(body).expect("parses");
        assert_eq!(parsed.utc_offset_seconds, 19_800);
        let minutely = parsed.minutely_15.expect("minutely block");
        assert_eq!(minutely.interval, 900);
        assert_eq!(minutely.rain.len(), 2);
        let current = parsed.current.expect("current block");
        assert_eq!(current.weather_code, 2.0);
        assert_eq!(current.visibility, None);
    }

    #[test]
    fn missing_geocoding_results_is_an_empty_list() {
        let parsed: GeocodingResponse =
            serde_json::from_str(r#"{"generationtime_ms": 0.5}"#).expect("parses");
        assert!(parsed.results.is_none());
    }
}
