use axum::{
    Json,
    extract::{Query, State},
    http::header,
    response::IntoResponse,
};
use serde_json::json;
use sqlx::types::Json as SqlJson;
use std::collections::HashMap;

use crate::error::ApiError;
use crate::middleware::auth::{AuthenticatedUser, OptionalUser};
use crate::models::user::Preferences;
use crate::models::weather::WeatherSnapshot;
use crate::state::AppState;

const DEFAULT_FORECAST_DAYS: u8 = 7;

fn parse_coordinates(params: &HashMap<String, String>) -> Result<(f64, f64), ApiError> {
    let latitude = params.get("latitude").and_then(|v| v.parse::<f64>().ok());
    let longitude = params.get("longitude").and_then(|v| v.parse::<f64>().ok());

    let (Some(latitude), Some(longitude)) = (latitude, longitude) else {
        return Err(ApiError::validation(
            "Valid latitude and longitude parameters are required",
        ));
    };

    // NaN from a literal "NaN" parameter fails both range checks.
    if !(-90.0..=90.0).contains(&latitude) || !(-180.0..=180.0).contains(&longitude) {
        return Err(ApiError::validation(
            "Invalid coordinates. Latitude must be between -90 and 90, longitude between -180 and 180",
        ));
    }

    Ok((latitude, longitude))
}

/// Re-shape the snapshot to the signed-in caller's preferred unit.
/// Anonymous requests keep the provider's celsius.
async fn personalize(
    state: &AppState,
    user: Option<AuthenticatedUser>,
    snapshot: WeatherSnapshot,
) -> Result<WeatherSnapshot, ApiError> {
    let Some(user) = user else {
        return Ok(snapshot);
    };

    let preferences: Option<SqlJson<Preferences>> =
        sqlx::query_scalar("SELECT preferences FROM users WHERE id = ?")
            .bind(&user.user_id)
            .fetch_optional(&state.db)
            .await?;

    match preferences {
        Some(preferences) => Ok(snapshot.with_unit(preferences.0.temperature_unit)),
        None => Ok(snapshot),
    }
}

pub async fn current_weather(
    State(state): State<AppState>,
    OptionalUser(user): OptionalUser,
    Query(params): Query<HashMap<String, String>>,
) -> Result<impl IntoResponse, ApiError> {
    let (latitude, longitude) = parse_coordinates(&params)?;

    let snapshot = state.weather.current_weather(latitude, longitude).await?;
    let snapshot = personalize(&state, user, snapshot).await?;

    // Live data; keep intermediaries from caching it.
    Ok((
        [(header::CACHE_CONTROL, "no-cache, no-store, must-revalidate")],
        Json(json!({
            "success": true,
            "data": snapshot
        })),
    ))
}

pub async fn weather_forecast(
    State(state): State<AppState>,
    OptionalUser(user): OptionalUser,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let (latitude, longitude) = parse_coordinates(&params)?;

    let days = match params.get("days") {
        Some(raw) => raw.parse::<u8>().ok().filter(|d| (1..=16).contains(d)),
        None => Some(DEFAULT_FORECAST_DAYS),
    };
    let Some(days) = days else {
        return Err(ApiError::validation(
            "Days parameter must be between 1 and 16",
        ));
    };

    let snapshot = state.weather.forecast(latitude, longitude, days).await?;
    let snapshot = personalize(&state, user, snapshot).await?;

    Ok(Json(json!({
        "success": true,
        "data": snapshot
    })))
}

pub async fn search_locations(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let query = params
        .get("q")
        .map(|q| q.trim())
        .filter(|q| !q.is_empty())
        .ok_or_else(|| ApiError::validation("Search query is required"))?;

    let results = state.weather.search_locations(query).await?;

    Ok(Json(json!({
        "success": true,
        "data": results
    })))
}
