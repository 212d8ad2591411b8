use std::env;

/// Deployment flavor. Controls whether 500 responses carry error detail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Development,
    Production,
}

/// Process-wide configuration, read once at startup and injected into
/// [`crate::state::AppState`]. Nothing reads the environment after this.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub database_url: String,
    /// Signing secret for session tokens. Absence is not fatal at startup;
    /// the first token operation fails with a configuration error instead.
    pub jwt_secret: Option<String>,
    pub token_ttl_days: i64,
    /// CORS allow-list. `None` means any origin.
    pub allowed_origins: Option<Vec<String>>,
    pub environment: Environment,
    pub forecast_url: String,
    pub geocoding_url: String,
}

impl Config {
    pub fn from_env() -> Self {
        let port = env::var("PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(3000);

        let database_url =
            env::var("DATABASE_URL").unwrap_or_else(|_| "sqlite:skycast.db?mode=rwc".to_string());

        let jwt_secret = env::var("JWT_SECRET").ok().filter(|s| !s.is_empty());

        let token_ttl_days = env::var("TOKEN_TTL_DAYS")
            .ok()
            .and_then(|d| d.parse().ok())
            .unwrap_or(7);

        // Comma-separated origin list. Empty or unset falls back to allowing any
        // origin, which is what you want for local app development.
        let allowed_origins = env::var("ALLOWED_ORIGINS").ok().and_then(|raw| {
            let origins: Vec<String> = raw
                .split(',')
                .map(|o| o.trim().to_string())
                .filter(|o| !o.is_empty())
                .collect();
            if origins.is_empty() { None } else { Some(origins) }
        });

        let environment = match env::var("APP_ENV").as_deref() {
            Ok("production") => Environment::Production,
            _ => Environment::Development,
        };

        let forecast_url = env::var("FORECAST_API_URL")
            .unwrap_or_else(|_| "https://api.open-meteo.com/v1/forecast".to_string());
        let geocoding_url = env::var("GEOCODING_API_URL")
            .unwrap_or_else(|_| "https://geocoding-api.open-meteo.com/v1/search".to_string());

        Self {
            port,
            database_url,
            jwt_secret,
            token_ttl_days,
            allowed_origins,
            environment,
            forecast_url,
            geocoding_url,
        }
    }

    pub fn is_development(&self) -> bool {
        self.environment == Environment::Development
    }
}
