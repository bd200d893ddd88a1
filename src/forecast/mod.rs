pub mod cache;
pub mod daily;
pub mod error;
pub mod openweather;
pub mod types;

pub use cache::ForecastCache;
pub use daily::reduce_daily;
pub use error::WeatherError;
pub use openweather::OpenWeatherClient;
pub use types::{DailySummary, ForecastResponse};
