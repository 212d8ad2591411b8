use argon2::Argon2;
use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{
    Error as HashError, PasswordHash, PasswordHasher, PasswordVerifier, SaltString,
};
use chrono::Utc;
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode, errors::ErrorKind};

use crate::config::Config;
use crate::models::user::Claims;

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("JWT signing secret is not configured")]
    MissingSecret,
    #[error("Failed to sign token")]
    Signing(#[source] jsonwebtoken::errors::Error),
    #[error("Invalid token")]
    Invalid,
    #[error("Token has expired")]
    Expired,
}

/// Hash a password with argon2id and a fresh random salt.
/// The same plaintext produces a different hash on every call.
pub fn hash_password(plaintext: &str) -> Result<String, HashError> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default().hash_password(plaintext.as_bytes(), &salt)?;
    Ok(hash.to_string())
}

/// Check a password against a stored hash.
///
/// A wrong password is `Ok(false)`, not an error; only a malformed stored
/// hash produces `Err`.
pub fn verify_password(plaintext: &str, hash: &str) -> Result<bool, HashError> {
    let parsed = PasswordHash::new(hash)?;
    match Argon2::default().verify_password(plaintext.as_bytes(), &parsed) {
        Ok(()) => Ok(true),
        Err(HashError::Password) => Ok(false),
        Err(e) => Err(e),
    }
}

/// Issue a signed session token for a user.
pub fn issue_token(config: &Config, user_id: &str, email: &str) -> Result<String, AuthError> {
    let secret = config.jwt_secret.as_deref().ok_or(AuthError::MissingSecret)?;

    let now = Utc::now();
    let expires = now + chrono::Duration::days(config.token_ttl_days);
    let claims = Claims {
        sub: user_id.to_string(),
        email: email.to_string(),
        iat: now.timestamp(),
        exp: expires.timestamp(),
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_ref()),
    )
    .map_err(AuthError::Signing)
}

/// Verify a session token and return its claims.
///
/// Expiry is reported separately from every other failure so callers can
/// tell an expired session apart from a forged or mangled token.
pub fn verify_token(config: &Config, token: &str) -> Result<Claims, AuthError> {
    let secret = config.jwt_secret.as_deref().ok_or(AuthError::MissingSecret)?;

    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_ref()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|e| match e.kind() {
        ErrorKind::ExpiredSignature => AuthError::Expired,
        _ => AuthError::Invalid,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Environment;

    fn test_config(secret: Option<&str>) -> Config {
        Config {
            port: 0,
            database_url: "sqlite::memory:".to_string(),
            jwt_secret: secret.map(str::to_string),
            token_ttl_days: 7,
            allowed_origins: None,
            environment: Environment::Development,
            forecast_url: String::new(),
            geocoding_url: String::new(),
        }
    }

    #[test]
    fn hashing_is_randomized() {
        let a = hash_password("Abcd1234!").unwrap();
        let b = hash_password("Abcd1234!").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn verify_accepts_correct_and_rejects_wrong_password() {
        let hash = hash_password("Abcd1234!").unwrap();
        assert!(verify_password("Abcd1234!", &hash).unwrap());
        assert!(!verify_password("wrong-password", &hash).unwrap());
    }

    #[test]
    fn verify_errors_on_malformed_hash() {
        assert!(verify_password("Abcd1234!", "not-a-phc-string").is_err());
    }

    #[test]
    fn token_round_trip_preserves_identity() {
        let config = test_config(Some("test-secret"));
        let token = issue_token(&config, "user-1", "a@b.com").unwrap();
        let claims = verify_token(&config, &token).unwrap();
        assert_eq!(claims.sub, "user-1");
        assert_eq!(claims.email, "a@b.com");
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn missing_secret_is_a_configuration_error() {
        let config = test_config(None);
        assert!(matches!(
            issue_token(&config, "user-1", "a@b.com"),
            Err(AuthError::MissingSecret)
        ));
        assert!(matches!(
            verify_token(&config, "whatever"),
            Err(AuthError::MissingSecret)
        ));
    }

    #[test]
    fn expired_token_is_distinguishable_from_invalid() {
        let config = test_config(Some("test-secret"));

        // Sign a token whose expiry is well past the default validation leeway.
        let now = Utc::now().timestamp();
        let claims = Claims {
            sub: "user-1".to_string(),
            email: "a@b.com".to_string(),
            iat: now - 7200,
            exp: now - 3600,
        };
        let stale = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret("test-secret".as_ref()),
        )
        .unwrap();

        assert!(matches!(
            verify_token(&config, &stale),
            Err(AuthError::Expired)
        ));
        assert!(matches!(
            verify_token(&config, "garbage.token.here"),
            Err(AuthError::Invalid)
        ));
    }

    #[test]
    fn token_signed_with_other_secret_is_invalid() {
        let config = test_config(Some("test-secret"));
        let other = test_config(Some("other-secret"));
        let token = issue_token(&other, "user-1", "a@b.com").unwrap();
        assert!(matches!(
            verify_token(&config, &token),
            Err(AuthError::Invalid)
        ));
    }
}
