use std::env;
use std::path::PathBuf;
use std::str::FromStr;

pub const CACHE_FILE_NAME: &str = "last-response.json";
pub const SOFIA_CITY_ID: &str = "727011";

#[derive(Clone, Debug)]
pub struct Config {
    pub weather_app_key: String,
    pub openweather_base_url: String,
    pub openweather_forecast_path: String,
    pub results_limit: u32,
    pub cache_file_path: PathBuf,
    pub cache_expire_minutes: u64,
    pub default_city_id: String,
    pub bind_addr: String,
    pub frontend_dir: PathBuf,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Builds the config from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let weather_app_key = lookup("WEATHER_APP_KEY")
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| anyhow::anyhow!("WEATHER_APP_KEY not set"))?;

        Ok(Config {
            weather_app_key,
            openweather_base_url: lookup("OPENWEATHER_BASE_URL")
                .unwrap_or_else(|| "http://api.openweathermap.org".to_string()),
            openweather_forecast_path: lookup("OPENWEATHER_FORECAST_PATH")
                .unwrap_or_else(|| "/data/2.5/forecast".to_string()),
            results_limit: parse_or(&lookup, "WEATHER_RESULTS_LIMIT", 40)?,
            cache_file_path: lookup("WEATHER_CACHE_FILE")
                .map(PathBuf::from)
                .unwrap_or_else(|| env::temp_dir().join(CACHE_FILE_NAME)),
            cache_expire_minutes: parse_or(&lookup, "WEATHER_CACHE_EXPIRE_MINUTES", 12)?,
            default_city_id: lookup("DEFAULT_CITY_ID")
                .unwrap_or_else(|| SOFIA_CITY_ID.to_string()),
            bind_addr: lookup("BIND_ADDR").unwrap_or_else(|| "0.0.0.0:8181".to_string()),
            frontend_dir: lookup("FRONTEND_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("./front-end")),
        })
    }

    pub fn cache_expire_after(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.cache_expire_minutes * 60)
    }
}

fn parse_or<F, T>(lookup: &F, name: &str, default: T) -> anyhow::Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(name) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|e| anyhow::anyhow!("{} is invalid: {}", name, e)),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name: &str| map.get(name).cloned()
    }

    #[test]
    fn test_missing_api_key_is_fatal() {
        let err = Config::from_lookup(lookup_from(&[])).unwrap_err();
        assert!(err.to_string().contains("WEATHER_APP_KEY"));

        let err = Config::from_lookup(lookup_from(&[("WEATHER_APP_KEY", "  ")])).unwrap_err();
        assert!(err.to_string().contains("WEATHER_APP_KEY"));
    }

    #[test]
    fn test_defaults() {
        let config = Config::from_lookup(lookup_from(&[("WEATHER_APP_KEY", "key123")])).unwrap();

        assert_eq!(config.weather_app_key, "key123");
        assert_eq!(config.openweather_base_url, "http://api.openweathermap.org");
        assert_eq!(config.openweather_forecast_path, "/data/2.5/forecast");
        assert_eq!(config.results_limit, 40);
        assert_eq!(config.cache_file_path, env::temp_dir().join("last-response.json"));
        assert_eq!(config.cache_expire_minutes, 12);
        assert_eq!(config.cache_expire_after().as_secs(), 720);
        assert_eq!(config.default_city_id, "727011");
        assert_eq!(config.bind_addr, "0.0.0.0:8181");
        assert_eq!(config.frontend_dir, PathBuf::from("./front-end"));
    }

    #[test]
    fn test_overrides() {
        let config = Config::from_lookup(lookup_from(&[
            ("WEATHER_APP_KEY", "key123"),
            ("WEATHER_RESULTS_LIMIT", "5"),
            ("WEATHER_CACHE_EXPIRE_MINUTES", " 30 "),
            ("WEATHER_CACHE_FILE", "/var/tmp/forecast.json"),
            ("DEFAULT_CITY_ID", "1851632"),
        ]))
        .unwrap();

        assert_eq!(config.results_limit, 5);
        assert_eq!(config.cache_expire_minutes, 30);
        assert_eq!(config.cache_file_path, PathBuf::from("/var/tmp/forecast.json"));
        assert_eq!(config.default_city_id, "1851632");
    }

    #[test]
    fn test_invalid_number_names_variable() {
        let err = Config::from_lookup(lookup_from(&[
            ("WEATHER_APP_KEY", "key123"),
            ("WEATHER_CACHE_EXPIRE_MINUTES", "twelve"),
        ]))
        .unwrap_err();

        assert!(err.to_string().contains("WEATHER_CACHE_EXPIRE_MINUTES"));
    }
}
