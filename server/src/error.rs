use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use std::sync::OnceLock;

/// Whether 500 responses may include the underlying error message.
/// Set once from [`crate::config::Config`] at startup; defaults to off.
static EXPOSE_ERROR_DETAIL: OnceLock<bool> = OnceLock::new();

pub fn expose_error_detail(enabled: bool) {
    let _ = EXPOSE_ERROR_DETAIL.set(enabled);
}

fn detail_exposed() -> bool {
    *EXPOSE_ERROR_DETAIL.get().unwrap_or(&false)
}

/// Error taxonomy for the HTTP surface. Every handler returns
/// `Result<_, ApiError>` and the `IntoResponse` impl below is the single
/// place where errors become status codes and response envelopes.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{message}")]
    Validation { message: String, errors: Vec<String> },
    #[error("{0}")]
    Unauthorized(String),
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Conflict(String),
    /// Third-party provider failure; the provider-derived message is exposed.
    #[error("{0}")]
    Upstream(String),
    /// Server misconfiguration (e.g. missing signing secret).
    #[error("{0}")]
    Configuration(String),
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl ApiError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
            errors: Vec::new(),
        }
    }

    pub fn validation_errors(message: impl Into<String>, errors: Vec<String>) -> Self {
        Self::Validation {
            message: message.into(),
            errors,
        }
    }
}

impl From<sqlx::Error> for ApiError {
    fn from(err: sqlx::Error) -> Self {
        Self::Internal(err.into())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message, errors, detail) = match self {
            ApiError::Validation { message, errors } => {
                (StatusCode::BAD_REQUEST, message, errors, None)
            }
            ApiError::Unauthorized(message) => {
                (StatusCode::UNAUTHORIZED, message, Vec::new(), None)
            }
            ApiError::NotFound(message) => (StatusCode::NOT_FOUND, message, Vec::new(), None),
            ApiError::Conflict(message) => (StatusCode::CONFLICT, message, Vec::new(), None),
            ApiError::Upstream(message) => {
                tracing::error!("Upstream provider error: {}", message);
                (StatusCode::INTERNAL_SERVER_ERROR, message, Vec::new(), None)
            }
            ApiError::Configuration(message) => {
                tracing::error!("Configuration error: {}", message);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    message,
                    Vec::new(),
                    None,
                )
            }
            ApiError::Internal(err) => {
                tracing::error!("Unhandled error: {:#}", err);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                    Vec::new(),
                    detail_exposed().then(|| err.to_string()),
                )
            }
        };

        let mut body = json!({
            "success": false,
            "message": message,
        });
        if !errors.is_empty() {
            body["errors"] = json!(errors);
        }
        if let Some(detail) = detail {
            body["error"] = json!(detail);
        }

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_carries_errors_list() {
        let err = ApiError::validation_errors(
            "Validation failed",
            vec!["Valid email is required".to_string()],
        );
        match err {
            ApiError::Validation { message, errors } => {
                assert_eq!(message, "Validation failed");
                assert_eq!(errors.len(), 1);
            }
            _ => panic!("expected validation variant"),
        }
    }
}
