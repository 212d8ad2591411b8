use axum::{Json, extract::State};
use chrono::Utc;
use serde_json::json;
use sqlx::types::Json as SqlJson;

use crate::error::ApiError;
use crate::middleware::auth::AuthenticatedUser;
use crate::models::user::{UpdateLocationsRequest, UpdateProfileRequest, User, UserRecord};
use crate::state::AppState;
use crate::utils::validation::{self, MAX_FAVORITE_LOCATIONS};

pub async fn update_profile(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Json(payload): Json<UpdateProfileRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let record: Option<UserRecord> = sqlx::query_as("SELECT * FROM users WHERE id = ?")
        .bind(&user.user_id)
        .fetch_optional(&state.db)
        .await?;

    let Some(mut record) = record else {
        return Err(ApiError::NotFound("User not found".to_string()));
    };

    if let Some(new_username) = payload.username {
        let errors = validation::validate_username(&new_username);
        if !errors.is_empty() {
            return Err(ApiError::validation_errors("Validation failed", errors));
        }

        let candidate = new_username.trim().to_lowercase();
        if candidate != record.username {
            let taken: Option<(String,)> =
                sqlx::query_as("SELECT id FROM users WHERE username = ? AND id != ?")
                    .bind(&candidate)
                    .bind(&record.id)
                    .fetch_optional(&state.db)
                    .await?;
            if taken.is_some() {
                return Err(ApiError::Conflict("Username already taken".to_string()));
            }
            record.username = candidate;
        }
    }

    // Preferences merge field by field onto what is stored; a partial patch
    // never resets the fields it leaves out.
    if let Some(patch) = payload.preferences {
        patch.apply(&mut record.preferences.0);
    }

    record.updated_at = Utc::now();

    sqlx::query("UPDATE users SET username = ?, preferences = ?, updated_at = ? WHERE id = ?")
        .bind(&record.username)
        .bind(&record.preferences)
        .bind(record.updated_at)
        .bind(&record.id)
        .execute(&state.db)
        .await?;

    Ok(Json(json!({
        "success": true,
        "message": "Profile updated successfully",
        "data": { "user": User::from(record) }
    })))
}

pub async fn update_locations(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Json(payload): Json<UpdateLocationsRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    if payload.locations.len() > MAX_FAVORITE_LOCATIONS {
        return Err(ApiError::validation(
            "Maximum 10 favorite locations allowed",
        ));
    }

    let errors = validation::validate_locations(&payload.locations);
    if !errors.is_empty() {
        return Err(ApiError::validation_errors("Validation failed", errors));
    }

    let locations = SqlJson(payload.locations);
    let result =
        sqlx::query("UPDATE users SET favorite_locations = ?, updated_at = ? WHERE id = ?")
            .bind(&locations)
            .bind(Utc::now())
            .bind(&user.user_id)
            .execute(&state.db)
            .await?;

    if result.rows_affected() == 0 {
        return Err(ApiError::NotFound("User not found".to_string()));
    }

    Ok(Json(json!({
        "success": true,
        "message": "Favorite locations updated successfully",
        "data": { "favoriteLocations": locations.0 }
    })))
}

pub async fn delete_account(
    State(state): State<AppState>,
    user: AuthenticatedUser,
) -> Result<Json<serde_json::Value>, ApiError> {
    // Hard delete, no tombstone. Outstanding tokens for this account die at
    // the middleware's existence check.
    let result = sqlx::query("DELETE FROM users WHERE id = ?")
        .bind(&user.user_id)
        .execute(&state.db)
        .await?;

    if result.rows_affected() == 0 {
        return Err(ApiError::NotFound("User not found".to_string()));
    }

    tracing::info!(user_id = %user.user_id, "Account deleted");

    Ok(Json(json!({
        "success": true,
        "message": "Account deleted successfully"
    })))
}
