use crate::state::AppState;
use axum::{Json, extract::State, http::StatusCode};
use serde::Serialize;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub uptime_seconds: u64,
    pub database: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub memory_rss_kb: Option<u64>,
}

/// Liveness endpoint for load balancers and monitoring.
///
/// Pings the database as part of the check; without it the API can only
/// serve weather passthrough, so "alive but disconnected" is worth surfacing.
pub async fn health_check(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let database = if sqlx::query("SELECT 1").execute(&state.db).await.is_ok() {
        "connected"
    } else {
        "disconnected"
    };

    let response = HealthResponse {
        status: "OK".to_string(),
        uptime_seconds: state.started_at.elapsed().as_secs(),
        database: database.to_string(),
        memory_rss_kb: memory_rss_kb(),
    };

    (StatusCode::OK, Json(response))
}

/// Resident set size in KiB. Assumes 4 KiB pages.
#[cfg(target_os = "linux")]
fn memory_rss_kb() -> Option<u64> {
    let statm = std::fs::read_to_string("/proc/self/statm").ok()?;
    let rss_pages: u64 = statm.split_whitespace().nth(1)?.parse().ok()?;
    Some(rss_pages * 4)
}

#[cfg(not(target_os = "linux"))]
fn memory_rss_kb() -> Option<u64> {
    None
}
