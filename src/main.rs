use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod config;
mod forecast;
mod routes;

use config::Config;
use routes::{create_router, AppState};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load environment variables from .env file
    dotenv::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "sofia_weather_server=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // A missing WEATHER_APP_KEY stops startup here.
    let config = Config::from_env()?;
    let bind_addr = config.bind_addr.clone();

    let state = AppState::from_config(config)?;

    tracing::info!(
        "Caching forecasts for city {} at {} for {} minutes",
        state.config.default_city_id,
        state.forecast_cache.cache_path().display(),
        state.forecast_cache.expire_after().as_secs() / 60
    );

    let app = create_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    tracing::info!("Server starting on http://{}", bind_addr);

    axum::serve(listener, app).await?;

    Ok(())
}
