use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::models::user::TemperatureUnit;
use crate::weather::codes::Condition;

/// Normalized result of one provider call.
///
/// The provider's wire format is columnar: a shared time axis per granularity
/// plus flat value arrays per variable. This type is the self-describing
/// reconstruction of it, so consumers never index series by position.
/// Within each series, index `i` across every field describes the same
/// instant, and every field has the same length as `time`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WeatherSnapshot {
    pub location: LocationInfo,
    pub current: CurrentConditions,
    pub temperature_unit: TemperatureUnit,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hourly: Option<HourlySeries>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub daily: Option<DailySeries>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub minutely15: Option<Minutely15Series>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationInfo {
    pub latitude: f64,
    pub longitude: f64,
    pub elevation: f64,
    pub timezone: String,
    pub utc_offset_seconds: i64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrentConditions {
    /// Rounded to the nearest degree.
    pub temperature: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub feels_like: Option<f64>,
    pub is_day: bool,
    pub rain: f64,
    pub weather_code: u8,
    pub wind_speed: f64,
    pub wind_direction: f64,
    pub humidity: f64,
    pub pressure: f64,
    /// Kilometers (converted from the provider's meters).
    pub visibility: f64,
    pub dew_point: f64,
    pub sunshine_duration: f64,
    pub description: String,
    pub icon: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HourlySeries {
    pub time: Vec<NaiveDateTime>,
    pub temperature: Vec<f64>,
    pub rain: Vec<f64>,
    pub humidity: Vec<f64>,
    pub pressure: Vec<f64>,
    pub wind_speed: Vec<f64>,
    pub wind_direction: Vec<f64>,
    pub weather_code: Vec<u8>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DailySeries {
    pub time: Vec<NaiveDateTime>,
    pub sunrise: Vec<NaiveDateTime>,
    pub sunset: Vec<NaiveDateTime>,
    pub uv_index_max: Vec<f64>,
    pub daylight_duration: Vec<f64>,
    pub sunshine_duration: Vec<f64>,
    pub temperature_max: Vec<f64>,
    pub temperature_min: Vec<f64>,
    pub weather_code: Vec<u8>,
    pub precipitation_sum: Vec<f64>,
    /// Human-readable description/icon for each entry of `weather_code`.
    pub conditions: Vec<Condition>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Minutely15Series {
    pub time: Vec<NaiveDateTime>,
    pub rain: Vec<f64>,
    pub sunshine_duration: Vec<f64>,
    pub visibility: Vec<f64>,
    pub dew_point: Vec<f64>,
    pub temperature: Vec<f64>,
}

/// Ephemeral geocoding result. Missing country/admin fields come back as
/// empty strings rather than nulls.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocationSearchResult {
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
    pub country: String,
    pub admin1: String,
    pub admin2: String,
}

fn celsius_to_fahrenheit(celsius: f64) -> f64 {
    celsius * 9.0 / 5.0 + 32.0
}

impl WeatherSnapshot {
    /// Convert every temperature-typed field to the requested unit.
    /// Snapshots come out of the provider in celsius.
    pub fn with_unit(mut self, unit: TemperatureUnit) -> Self {
        if unit == self.temperature_unit {
            return self;
        }
        if unit == TemperatureUnit::Fahrenheit {
            self.current.temperature = celsius_to_fahrenheit(self.current.temperature).round();
            self.current.feels_like = self.current.feels_like.map(celsius_to_fahrenheit);
            self.current.dew_point = celsius_to_fahrenheit(self.current.dew_point);
            if let Some(hourly) = &mut self.hourly {
                for t in &mut hourly.temperature {
                    *t = celsius_to_fahrenheit(*t);
                }
            }
            if let Some(daily) = &mut self.daily {
                for t in &mut daily.temperature_max {
                    *t = celsius_to_fahrenheit(*t);
                }
                for t in &mut daily.temperature_min {
                    *t = celsius_to_fahrenheit(*t);
                }
            }
            if let Some(minutely) = &mut self.minutely15 {
                for t in &mut minutely.temperature {
                    *t = celsius_to_fahrenheit(*t);
                }
                for t in &mut minutely.dew_point {
                    *t = celsius_to_fahrenheit(*t);
                }
            }
            self.temperature_unit = TemperatureUnit::Fahrenheit;
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::weather::codes;

    fn sample_snapshot() -> WeatherSnapshot {
        WeatherSnapshot {
            location: LocationInfo {
                latitude: 18.52,
                longitude: 73.85,
                elevation: 560.0,
                timezone: "Asia/Kolkata".to_string(),
                utc_offset_seconds: 19800,
            },
            current: CurrentConditions {
                temperature: 20.0,
                feels_like: Some(22.0),
                is_day: true,
                rain: 0.0,
                weather_code: 0,
                wind_speed: 5.0,
                wind_direction: 180.0,
                humidity: 60.0,
                pressure: 1010.0,
                visibility: 24.14,
                dew_point: 10.0,
                sunshine_duration: 900.0,
                description: "Clear sky".to_string(),
                icon: "☀️".to_string(),
            },
            temperature_unit: TemperatureUnit::Celsius,
            hourly: Some(HourlySeries {
                time: Vec::new(),
                temperature: vec![0.0, 100.0],
                rain: Vec::new(),
                humidity: Vec::new(),
                pressure: Vec::new(),
                wind_speed: Vec::new(),
                wind_direction: Vec::new(),
                weather_code: Vec::new(),
            }),
            daily: None,
            minutely15: None,
        }
    }

    #[test]
    fn fahrenheit_conversion_covers_all_temperature_fields() {
        let converted = sample_snapshot().with_unit(TemperatureUnit::Fahrenheit);
        assert_eq!(converted.temperature_unit, TemperatureUnit::Fahrenheit);
        assert_eq!(converted.current.temperature, 68.0);
        assert_eq!(converted.current.feels_like, Some(71.6));
        assert_eq!(converted.current.dew_point, 50.0);
        let hourly = converted.hourly.expect("hourly kept");
        assert_eq!(hourly.temperature, vec![32.0, 212.0]);
    }

    #[test]
    fn converting_to_current_unit_is_a_no_op() {
        let snapshot = sample_snapshot().with_unit(TemperatureUnit::Celsius);
        assert_eq!(snapshot.current.temperature, 20.0);
    }

    #[test]
    fn snapshot_serializes_camel_case() {
        let mut snapshot = sample_snapshot();
        snapshot.daily = Some(DailySeries {
            time: Vec::new(),
            sunrise: Vec::new(),
            sunset: Vec::new(),
            uv_index_max: Vec::new(),
            daylight_duration: Vec::new(),
            sunshine_duration: Vec::new(),
            temperature_max: Vec::new(),
            temperature_min: Vec::new(),
            weather_code: vec![95],
            precipitation_sum: Vec::new(),
            conditions: vec![codes::describe(95)],
        });
        let value = serde_json::to_value(&snapshot).expect("serializes");
        assert_eq!(value["location"]["utcOffsetSeconds"], 19800);
        assert_eq!(value["current"]["weatherCode"], 0);
        assert_eq!(value["current"]["feelsLike"], 22.0);
        assert_eq!(value["temperatureUnit"], "celsius");
        assert_eq!(value["daily"]["conditions"][0]["description"], "Thunderstorm");
        assert!(value.get("minutely15").is_none());
    }
}
