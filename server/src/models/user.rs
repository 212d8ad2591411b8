use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use sqlx::types::Json;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TemperatureUnit {
    #[default]
    Celsius,
    Fahrenheit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Preferences {
    pub temperature_unit: TemperatureUnit,
    pub theme: Theme,
    pub notifications: bool,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            temperature_unit: TemperatureUnit::Celsius,
            theme: Theme::Light,
            notifications: true,
        }
    }
}

/// A saved place. Coordinates are kept alongside the name so weather lookups
/// never need a second geocoding round trip.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FavoriteLocation {
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
}

/// Internal user row, including the password hash.
///
/// Never serialized; API responses go through [`User`], which strips the hash.
#[derive(Debug, Clone, FromRow)]
pub struct UserRecord {
    pub id: String,
    pub email: String,
    pub username: String,
    pub password_hash: String,
    pub favorite_locations: Json<Vec<FavoriteLocation>>,
    pub preferences: Json<Preferences>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Public user representation for API responses.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub email: String,
    pub username: String,
    pub favorite_locations: Vec<FavoriteLocation>,
    pub preferences: Preferences,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<UserRecord> for User {
    fn from(record: UserRecord) -> Self {
        Self {
            id: record.id,
            email: record.email,
            username: record.username,
            favorite_locations: record.favorite_locations.0,
            preferences: record.preferences.0,
            created_at: record.created_at,
            updated_at: record.updated_at,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub username: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct UpdateProfileRequest {
    pub username: Option<String>,
    pub preferences: Option<PreferencesPatch>,
}

/// Partial preference update. Fields left out keep their stored values.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PreferencesPatch {
    pub temperature_unit: Option<TemperatureUnit>,
    pub theme: Option<Theme>,
    pub notifications: Option<bool>,
}

impl PreferencesPatch {
    pub fn apply(&self, preferences: &mut Preferences) {
        if let Some(unit) = self.temperature_unit {
            preferences.temperature_unit = unit;
        }
        if let Some(theme) = self.theme {
            preferences.theme = theme;
        }
        if let Some(notifications) = self.notifications {
            preferences.notifications = notifications;
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct UpdateLocationsRequest {
    pub locations: Vec<FavoriteLocation>,
}

/// JWT claims carried by a session token.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub email: String,
    pub iat: i64,
    pub exp: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_record() -> UserRecord {
        let now = Utc::now();
        UserRecord {
            id: "8f7e1c1e-0000-4000-8000-000000000000".to_string(),
            email: "a@b.com".to_string(),
            username: "abcuser".to_string(),
            password_hash: "$argon2id$v=19$m=19456,t=2,p=1$c2FsdA$hash".to_string(),
            favorite_locations: Json(vec![FavoriteLocation {
                name: "Pune".to_string(),
                latitude: 18.5196,
                longitude: 73.8554,
            }]),
            preferences: Json(Preferences::default()),
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn public_user_strips_password_hash() {
        let user = User::from(sample_record());
        let value = serde_json::to_value(&user).expect("serializes");
        let raw = value.to_string();
        assert!(!raw.contains("password"));
        assert!(!raw.contains("argon2"));
        assert_eq!(value["email"], "a@b.com");
        assert_eq!(value["favoriteLocations"][0]["name"], "Pune");
    }

    #[test]
    fn preference_patch_merges_field_by_field() {
        let mut prefs = Preferences::default();
        let patch = PreferencesPatch {
            temperature_unit: Some(TemperatureUnit::Fahrenheit),
            theme: None,
            notifications: None,
        };
        patch.apply(&mut prefs);
        assert_eq!(prefs.temperature_unit, TemperatureUnit::Fahrenheit);
        assert_eq!(prefs.theme, Theme::Light);
        assert!(prefs.notifications);
    }

    #[test]
    fn preferences_serialize_lowercase() {
        let value = serde_json::to_value(Preferences::default()).expect("serializes");
        assert_eq!(value["temperatureUnit"], "celsius");
        assert_eq!(value["theme"], "light");
        assert_eq!(value["notifications"], true);
    }
}
