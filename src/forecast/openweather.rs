use super::error::WeatherError;
use super::types::{embedded_status, ForecastResponse};
use crate::config::Config;
use reqwest::{Client, Url};
use serde_json::Value;

const USER_AGENT: &str = "SofiaWeather/0.1";

/// A successful fetch: the parsed forecast and the body text it came from.
#[derive(Debug, Clone)]
pub struct FetchedForecast {
    pub response: ForecastResponse,
    pub raw: String,
}

#[derive(Debug)]
pub struct OpenWeatherClient {
    client: Client,
    api_key: String,
    base_url: String,
    forecast_path: String,
    results_limit: u32,
}

impl OpenWeatherClient {
    pub fn new(
        api_key: impl Into<String>,
        base_url: impl Into<String>,
        forecast_path: impl Into<String>,
        results_limit: u32,
    ) -> Result<Self, WeatherError> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(WeatherError::InvalidArgument(
                "weather app key is missing".to_string(),
            ));
        }

        // No client timeout: a single attempt relies on transport defaults.
        let client = Client::builder().user_agent(USER_AGENT).build()?;

        Ok(Self {
            client,
            api_key,
            base_url: base_url.into(),
            forecast_path: forecast_path.into(),
            results_limit,
        })
    }

    pub fn from_config(config: &Config) -> Result<Self, WeatherError> {
        Self::new(
            config.weather_app_key.clone(),
            config.openweather_base_url.clone(),
            config.openweather_forecast_path.clone(),
            config.results_limit,
        )
    }

    /// `{base}{path}?id={city}&cnt={limit}&appid={key}`, with each value
    /// percent-encoded.
    pub fn forecast_url(&self, city_id: &str) -> Result<Url, WeatherError> {
        let limit = self.results_limit.to_string();

        Url::parse_with_params(
            &format!("{}{}", self.base_url, self.forecast_path),
            &[
                ("id", city_id),
                ("cnt", limit.as_str()),
                ("appid", self.api_key.as_str()),
            ],
        )
        .map_err(|e| WeatherError::InvalidArgument(format!("invalid forecast url: {}", e)))
    }

    /// Issues exactly one GET for the city's forecast.
    ///
    /// Success is decided by the `cod` field inside the body, not by the
    /// transport status.
    pub async fn fetch_forecast(&self, city_id: &str) -> Result<FetchedForecast, WeatherError> {
        let url = self.forecast_url(city_id)?;

        tracing::debug!(
            "Fetching forecast for city {} from {}{}",
            city_id,
            self.base_url,
            self.forecast_path
        );

        let response = self.client.get(url).send().await?;

        let transport_status = response.status();
        let raw = response.text().await?;

        let body: Value = match serde_json::from_str(&raw) {
            Ok(body) => body,
            Err(_) if !transport_status.is_success() => {
                tracing::warn!("OpenWeather returned HTTP {} with a non-JSON body", transport_status);
                return Err(WeatherError::RemoteRejection {
                    status: None,
                    body: raw,
                });
            }
            Err(e) => return Err(e.into()),
        };

        let status = body.get("cod").and_then(embedded_status);
        if status != Some(200) {
            tracing::warn!(
                "OpenWeather rejected forecast request for city {}: cod {:?}",
                city_id,
                status
            );
            return Err(WeatherError::RemoteRejection { status, body: raw });
        }

        let response: ForecastResponse = serde_json::from_value(body)?;
        Ok(FetchedForecast { response, raw })
    }
}
