use crate::config::Config;
use crate::db::Db;
use crate::weather::WeatherProvider;
use std::sync::Arc;
use std::time::Instant;

#[derive(Clone)]
pub struct AppState {
    pub db: Db,
    pub weather: Arc<dyn WeatherProvider>,
    pub config: Arc<Config>,
    pub started_at: Instant,
}
