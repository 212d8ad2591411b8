use skycast_server::config::Config;
use skycast_server::state::AppState;
use skycast_server::weather::WeatherProvider;
use skycast_server::weather::openmeteo::OpenMeteo;
use skycast_server::{db, error, routes};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env first so everything below sees it. Missing file is fine.
    dotenvy::dotenv().ok();

    // Structured logs via tracing. Respects RUST_LOG, defaults to debug for
    // the server and tower_http so request flow is visible in development.
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "skycast_server=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting SkyCast API...");

    // All configuration is read once here and injected; nothing else touches
    // the environment at request time.
    let config = Arc::new(Config::from_env());
    error::expose_error_detail(config.is_development());
    if config.jwt_secret.is_none() {
        tracing::warn!("JWT_SECRET is not set; authenticated routes will fail until it is");
    }

    let db = db::connect(&config.database_url).await?;
    tracing::info!("Database ready");

    let weather: Arc<dyn WeatherProvider> = Arc::new(OpenMeteo::new(&config)?);

    let state = AppState {
        db,
        weather,
        config: config.clone(),
        started_at: Instant::now(),
    };
    let app = routes::create_routes(state);

    // 0.0.0.0 so the port is reachable from outside a container.
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("Listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
