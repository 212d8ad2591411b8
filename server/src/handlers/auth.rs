use axum::{Json, extract::State, http::StatusCode};
use chrono::Utc;
use serde_json::json;
use sqlx::types::Json as SqlJson;
use uuid::Uuid;

use crate::error::ApiError;
use crate::middleware::auth::AuthenticatedUser;
use crate::models::user::{
    FavoriteLocation, LoginRequest, Preferences, RegisterRequest, User, UserRecord,
};
use crate::state::AppState;
use crate::utils::auth::{self, AuthError};
use crate::utils::validation;

fn map_token_error(err: AuthError) -> ApiError {
    match err {
        AuthError::MissingSecret | AuthError::Signing(_) => {
            ApiError::Configuration("Token generation error".to_string())
        }
        AuthError::Invalid | AuthError::Expired => {
            ApiError::Unauthorized("Invalid token".to_string())
        }
    }
}

pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<serde_json::Value>), ApiError> {
    // 1. Field validation
    let errors =
        validation::validate_registration(&payload.email, &payload.username, &payload.password);
    if !errors.is_empty() {
        return Err(ApiError::validation_errors("Validation failed", errors));
    }

    let email = payload.email.trim().to_lowercase();
    let username = payload.username.trim().to_lowercase();

    // 2. Uniqueness check: one round trip that also reports which field
    // collided. Email wins when both do, so the message stays deterministic.
    let collision: Option<(bool, bool)> = sqlx::query_as(
        "SELECT email = ?1, username = ?2 FROM users \
         WHERE email = ?1 OR username = ?2 \
         ORDER BY email = ?1 DESC LIMIT 1",
    )
    .bind(&email)
    .bind(&username)
    .fetch_optional(&state.db)
    .await?;

    if let Some((email_taken, _)) = collision {
        let message = if email_taken {
            "Email already registered"
        } else {
            "Username already taken"
        };
        return Err(ApiError::Conflict(message.to_string()));
    }

    // 3. Hash the password and persist with default preferences
    let password_hash = auth::hash_password(&payload.password)
        .map_err(|e| ApiError::Internal(anyhow::anyhow!("Password hashing failed: {e}")))?;

    let now = Utc::now();
    let record = UserRecord {
        id: Uuid::new_v4().to_string(),
        email,
        username,
        password_hash,
        favorite_locations: SqlJson(Vec::<FavoriteLocation>::new()),
        preferences: SqlJson(Preferences::default()),
        created_at: now,
        updated_at: now,
    };

    sqlx::query(
        "INSERT INTO users (id, email, username, password_hash, favorite_locations, preferences, created_at, updated_at) \
         VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(&record.id)
    .bind(&record.email)
    .bind(&record.username)
    .bind(&record.password_hash)
    .bind(&record.favorite_locations)
    .bind(&record.preferences)
    .bind(record.created_at)
    .bind(record.updated_at)
    .execute(&state.db)
    .await?;

    // 4. Issue the session token
    let token = auth::issue_token(&state.config, &record.id, &record.email)
        .map_err(map_token_error)?;

    tracing::info!(user_id = %record.id, "New user registered");

    let user = User::from(record);
    Ok((
        StatusCode::CREATED,
        Json(json!({
            "success": true,
            "message": "User registered successfully",
            "data": { "user": user, "token": token }
        })),
    ))
}

pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let errors = validation::validate_login(&payload.email, &payload.password);
    if !errors.is_empty() {
        return Err(ApiError::validation_errors("Validation failed", errors));
    }

    let email = payload.email.trim().to_lowercase();

    let record: Option<UserRecord> = sqlx::query_as("SELECT * FROM users WHERE email = ?")
        .bind(&email)
        .fetch_optional(&state.db)
        .await?;

    // The same message covers an unknown email and a wrong password, so a
    // caller can't probe which addresses have accounts.
    let Some(record) = record else {
        return Err(ApiError::Unauthorized("Invalid email or password".to_string()));
    };

    match auth::verify_password(&payload.password, &record.password_hash) {
        Ok(true) => {}
        _ => {
            return Err(ApiError::Unauthorized("Invalid email or password".to_string()));
        }
    }

    let token = auth::issue_token(&state.config, &record.id, &record.email)
        .map_err(map_token_error)?;

    let user = User::from(record);
    Ok(Json(json!({
        "success": true,
        "message": "Login successful",
        "data": { "user": user, "token": token }
    })))
}

pub async fn get_profile(
    State(state): State<AppState>,
    user: AuthenticatedUser,
) -> Result<Json<serde_json::Value>, ApiError> {
    let record: Option<UserRecord> = sqlx::query_as("SELECT * FROM users WHERE id = ?")
        .bind(&user.user_id)
        .fetch_optional(&state.db)
        .await?;

    let Some(record) = record else {
        return Err(ApiError::NotFound("User not found".to_string()));
    };

    Ok(Json(json!({
        "success": true,
        "data": { "user": User::from(record) }
    })))
}

pub async fn refresh_token(
    State(state): State<AppState>,
    user: AuthenticatedUser,
) -> Result<Json<serde_json::Value>, ApiError> {
    let token = auth::issue_token(&state.config, &user.user_id, &user.email)
        .map_err(map_token_error)?;

    Ok(Json(json!({
        "success": true,
        "message": "Token refreshed successfully",
        "data": { "token": token }
    })))
}
