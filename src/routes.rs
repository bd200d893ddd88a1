use axum::{
    extract::State,
    http::header,
    response::{IntoResponse, Json, Response},
    routing::get,
    Router,
};
use serde::Serialize;
use serde_json::json;
use std::sync::Arc;
use tower_http::services::{ServeDir, ServeFile};

use crate::{
    config::Config,
    forecast::{
        cache::CacheState, reduce_daily, DailySummary, ForecastCache, ForecastResponse,
        OpenWeatherClient, WeatherError,
    },
};

// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub forecast_cache: Arc<ForecastCache>,
}

impl AppState {
    pub fn from_config(config: Config) -> Result<Self, WeatherError> {
        let client = OpenWeatherClient::from_config(&config)?;
        let forecast_cache = ForecastCache::new(
            client,
            config.cache_file_path.clone(),
            config.cache_expire_after(),
        );

        Ok(Self {
            config: Arc::new(config),
            forecast_cache: Arc::new(forecast_cache),
        })
    }
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: chrono::DateTime<chrono::Utc>,
    pub version: String,
    pub cache: String,
}

impl IntoResponse for WeatherError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        match self {
            // The remote payload goes back to the caller untouched.
            WeatherError::RemoteRejection { body, .. } => {
                let content_type = if serde_json::from_str::<serde_json::Value>(&body).is_ok() {
                    "application/json"
                } else {
                    "text/plain; charset=utf-8"
                };
                (status, [(header::CONTENT_TYPE, content_type)], body).into_response()
            }
            other => (status, Json(json!({ "error": other.to_string() }))).into_response(),
        }
    }
}

// Route handlers
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let cache = match state.forecast_cache.state().await {
        Ok(CacheState::Absent) => "absent",
        Ok(CacheState::Fresh(_)) => "fresh",
        Ok(CacheState::Stale(_)) => "stale",
        Err(e) => {
            tracing::warn!("Cache state unavailable: {}", e);
            "unavailable"
        }
    };

    Json(HealthResponse {
        status: "ok".to_string(),
        timestamp: chrono::Utc::now(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        cache: cache.to_string(),
    })
}

/// Daily min/max for the configured city. Any city id in the path is ignored.
pub async fn get_city(
    State(state): State<AppState>,
) -> Result<Json<ForecastResponse<DailySummary>>, WeatherError> {
    let forecast = load_forecast(&state).await?;
    let summarised = forecast.map_list(|list| reduce_daily(&list));

    tracing::debug!("Responding with {} daily summaries", summarised.list.len());
    Ok(Json(summarised))
}

/// Every forecast point for the configured city. Any city id in the path is
/// ignored.
pub async fn get_city_details(
    State(state): State<AppState>,
) -> Result<Json<ForecastResponse>, WeatherError> {
    let forecast = load_forecast(&state).await?;

    tracing::debug!("Responding with {} forecast points", forecast.list.len());
    Ok(Json(forecast))
}

async fn load_forecast(state: &AppState) -> Result<ForecastResponse, WeatherError> {
    state
        .forecast_cache
        .get(&state.config.default_city_id)
        .await
        .map_err(|e| {
            tracing::error!("Error from weather api: {}", e);
            e
        })
}

// Create the router
pub fn create_router(state: AppState) -> Router {
    let frontend_dir = state.config.frontend_dir.clone();

    Router::new()
        .route("/health", get(health))
        .route("/get-city", get(get_city))
        .route("/get-city/:city_id", get(get_city))
        .route("/get-city-details", get(get_city_details))
        .route("/get-city-details/:city_id", get(get_city_details))
        .nest_service("/file", ServeDir::new(&frontend_dir))
        .fallback_service(ServeFile::new(frontend_dir.join("index.html")))
        .with_state(state)
}
