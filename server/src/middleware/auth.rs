use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use crate::error::ApiError;
use crate::state::AppState;
use crate::utils::auth::{self, AuthError};

/// An authenticated identity extracted from a bearer token.
///
/// Add `user: AuthenticatedUser` to a handler and the request is rejected
/// before the handler runs unless the whole chain holds: a bearer token is
/// present, it verifies, and the user it names still exists.
pub struct AuthenticatedUser {
    pub user_id: String,
    pub email: String,
}

fn bearer_token(parts: &Parts) -> Option<&str> {
    parts
        .headers
        .get("Authorization")?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
}

async fn authenticate(parts: &Parts, state: &AppState) -> Result<AuthenticatedUser, ApiError> {
    let token = bearer_token(parts)
        .ok_or_else(|| ApiError::Unauthorized("Access token missing".to_string()))?;

    let claims = auth::verify_token(&state.config, token).map_err(|e| match e {
        // Missing secret is a deployment problem, not the client's fault.
        AuthError::MissingSecret | AuthError::Signing(_) => {
            ApiError::Configuration("Authentication error".to_string())
        }
        AuthError::Invalid | AuthError::Expired => {
            ApiError::Unauthorized("Invalid token".to_string())
        }
    })?;

    // Tokens are self-contained, so a deleted account would otherwise keep
    // working until expiry. Check the row still exists.
    let exists: Option<(String,)> = sqlx::query_as("SELECT id FROM users WHERE id = ?")
        .bind(&claims.sub)
        .fetch_optional(&state.db)
        .await?;

    if exists.is_none() {
        return Err(ApiError::Unauthorized("User not found".to_string()));
    }

    Ok(AuthenticatedUser {
        user_id: claims.sub,
        email: claims.email,
    })
}

impl FromRequestParts<AppState> for AuthenticatedUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        authenticate(parts, state).await
    }
}

/// Permissive variant of [`AuthenticatedUser`] that never rejects.
///
/// Handlers branch on the inner `Option`; any failure along the chain just
/// means the request proceeds anonymously. Used on routes where a signed-in
/// caller gets personalization but everyone is welcome.
pub struct OptionalUser(pub Option<AuthenticatedUser>);

impl FromRequestParts<AppState> for OptionalUser {
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        Ok(OptionalUser(authenticate(parts, state).await.ok()))
    }
}
