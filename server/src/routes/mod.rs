use crate::handlers::{
    auth::{get_profile, login, refresh_token, register},
    health::health_check,
    user::{delete_account, update_locations, update_profile},
    weather::{current_weather, search_locations, weather_forecast},
};
use crate::middleware::rate_limit;
use crate::state::AppState;
use axum::{
    Json, Router,
    handler::Handler,
    http::{HeaderValue, StatusCode, Uri},
    routing::{delete, get, post, put},
};
use serde_json::json;
use tower_governor::GovernorLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub fn create_routes(state: AppState) -> Router {
    let cors = cors_layer(&state.config.allowed_origins);

    // One config, one counter: every /api route layered with a clone of this
    // draws from the same per-address budget.
    let api_conf = rate_limit::create_api_config();

    let weather_routes = Router::new()
        .route("/current", get(current_weather))
        .route("/forecast", get(weather_forecast))
        .route("/search", get(search_locations))
        .layer(GovernorLayer::new(api_conf.clone()));

    let auth_routes = Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/profile", get(get_profile))
        .route("/refresh", post(refresh_token))
        .layer(GovernorLayer::new(api_conf.clone()));

    let user_routes = Router::new()
        .route("/profile", put(update_profile))
        .route("/locations", put(update_locations))
        .route("/account", delete(delete_account))
        .layer(GovernorLayer::new(api_conf.clone()));

    Router::new()
        .route("/health", get(health_check))
        .route(
            "/api",
            get(api_directory.layer(GovernorLayer::new(api_conf))),
        )
        .nest("/api/weather", weather_routes)
        .nest("/api/auth", auth_routes)
        .nest("/api/user", user_routes)
        .fallback(route_not_found)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

fn cors_layer(allowed_origins: &Option<Vec<String>>) -> CorsLayer {
    match allowed_origins {
        Some(origins) => {
            let parsed: Vec<HeaderValue> = origins
                .iter()
                .filter_map(|origin| origin.parse().ok())
                .collect();
            CorsLayer::new()
                .allow_origin(parsed)
                .allow_methods(Any)
                .allow_headers(Any)
        }
        None => CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any),
    }
}

async fn api_directory() -> Json<serde_json::Value> {
    Json(json!({
        "success": true,
        "message": "SkyCast API is running",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": {
            "currentWeather": "/api/weather/current?latitude=18.5196&longitude=73.8554",
            "weatherForecast": "/api/weather/forecast?latitude=18.5196&longitude=73.8554&days=7",
            "locationSearch": "/api/weather/search?q=Mumbai",
            "register": "POST /api/auth/register",
            "login": "POST /api/auth/login",
            "profile": "GET /api/auth/profile",
            "refreshToken": "POST /api/auth/refresh",
            "updateProfile": "PUT /api/user/profile",
            "updateLocations": "PUT /api/user/locations",
            "deleteAccount": "DELETE /api/user/account"
        }
    }))
}

async fn route_not_found(uri: Uri) -> (StatusCode, Json<serde_json::Value>) {
    (
        StatusCode::NOT_FOUND,
        Json(json!({
            "success": false,
            "message": format!("Route {} not found", uri.path())
        })),
    )
}
