use super::error::WeatherError;
use super::openweather::OpenWeatherClient;
use super::types::ForecastResponse;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, SystemTime};

/// Where the cache file stands relative to the freshness threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheState {
    Absent,
    Fresh(Duration),
    Stale(Duration),
}

/// Serves the last forecast from disk while it is fresh and refetches once it
/// goes stale. The file's modification time is the only freshness signal.
///
/// Requests are not coordinated: two callers that both see a stale file will
/// both fetch and both overwrite it.
pub struct ForecastCache {
    client: OpenWeatherClient,
    cache_path: PathBuf,
    expire_after: Duration,
    write_seq: AtomicU64,
}

impl ForecastCache {
    pub fn new(
        client: OpenWeatherClient,
        cache_path: impl Into<PathBuf>,
        expire_after: Duration,
    ) -> Self {
        Self {
            client,
            cache_path: cache_path.into(),
            expire_after,
            write_seq: AtomicU64::new(0),
        }
    }

    pub fn cache_path(&self) -> &Path {
        &self.cache_path
    }

    pub fn expire_after(&self) -> Duration {
        self.expire_after
    }

    pub async fn get(&self, city_id: &str) -> Result<ForecastResponse, WeatherError> {
        let city_id = validate_city_id(city_id)?;

        match self.state().await? {
            CacheState::Absent => {
                tracing::debug!("No cached forecast at {}", self.cache_path.display());
                self.fetch_and_persist(city_id).await
            }
            CacheState::Stale(age) => {
                tracing::debug!("Cached forecast is stale ({}s old)", age.as_secs());
                self.fetch_and_persist(city_id).await
            }
            CacheState::Fresh(age) => {
                tracing::debug!("Serving cached forecast ({}s old)", age.as_secs());
                self.read_cached().await
            }
        }
    }

    pub async fn state(&self) -> Result<CacheState, WeatherError> {
        let metadata = match tokio::fs::metadata(&self.cache_path).await {
            Ok(metadata) => metadata,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(CacheState::Absent),
            Err(e) => return Err(WeatherError::cache_io(&self.cache_path, e)),
        };

        let modified = metadata
            .modified()
            .map_err(|e| WeatherError::cache_io(&self.cache_path, e))?;
        let now = SystemTime::now();
        let age = cache_age(modified, now);

        if is_expired(modified, now, self.expire_after) {
            Ok(CacheState::Stale(age))
        } else {
            Ok(CacheState::Fresh(age))
        }
    }

    async fn fetch_and_persist(&self, city_id: &str) -> Result<ForecastResponse, WeatherError> {
        let fetched = self.client.fetch_forecast(city_id).await?;

        if let Err(e) = self.persist(&fetched.raw).await {
            tracing::error!("Failed to cache forecast: {}", e);
            return Err(e);
        }

        Ok(fetched.response)
    }

    async fn read_cached(&self) -> Result<ForecastResponse, WeatherError> {
        let content = tokio::fs::read_to_string(&self.cache_path)
            .await
            .map_err(|e| WeatherError::cache_io(&self.cache_path, e))?;

        Ok(serde_json::from_str(&content)?)
    }

    /// Writes `raw` to a sibling file and renames it into place, so the cache
    /// path only ever holds a complete response.
    async fn persist(&self, raw: &str) -> Result<(), WeatherError> {
        let temp_path = self.temp_path();

        tokio::fs::write(&temp_path, raw)
            .await
            .map_err(|e| WeatherError::cache_io(&temp_path, e))?;

        if let Err(e) = tokio::fs::rename(&temp_path, &self.cache_path).await {
            let _ = tokio::fs::remove_file(&temp_path).await;
            return Err(WeatherError::cache_io(&self.cache_path, e));
        }

        tracing::debug!(
            "Cached {} bytes at {}",
            raw.len(),
            self.cache_path.display()
        );
        Ok(())
    }

    fn temp_path(&self) -> PathBuf {
        let seq = self.write_seq.fetch_add(1, Ordering::Relaxed);
        let name = self
            .cache_path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "forecast".to_string());

        self.cache_path
            .with_file_name(format!(".{}.{}.{}.tmp", name, std::process::id(), seq))
    }
}

/// Age of a file modified at `modified`. A timestamp in the future counts as
/// brand new.
pub fn cache_age(modified: SystemTime, now: SystemTime) -> Duration {
    now.duration_since(modified).unwrap_or(Duration::ZERO)
}

pub fn is_expired(modified: SystemTime, now: SystemTime, threshold: Duration) -> bool {
    cache_age(modified, now) >= threshold
}

pub fn validate_city_id(city_id: &str) -> Result<&str, WeatherError> {
    let city_id = city_id.trim();
    if city_id.is_empty() {
        return Err(WeatherError::InvalidArgument("city id is missing".to_string()));
    }
    if !city_id.chars().all(|c| c.is_ascii_digit()) {
        return Err(WeatherError::InvalidArgument(format!(
            "city id must be numeric, got {:?}",
            city_id
        )));
    }
    Ok(city_id)
}
