use axum::http::StatusCode;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum WeatherError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
    #[error("HTTP request failed: {0}")]
    NetworkFailure(#[from] reqwest::Error),
    /// The API answered but the embedded status was not 200. `body` is the
    /// payload exactly as received.
    #[error("API rejected the request (cod {status:?}): {body}")]
    RemoteRejection { status: Option<i64>, body: String },
    #[error("Cache file {} failed: {source}", .path.display())]
    CacheIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("JSON parsing failed: {0}")]
    JsonParsing(#[from] serde_json::Error),
}

impl WeatherError {
    pub(crate) fn cache_io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::CacheIo {
            path: path.into(),
            source,
        }
    }

    /// HTTP status used when the error reaches a client.
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidArgument(_) => StatusCode::BAD_REQUEST,
            Self::NetworkFailure(_) | Self::RemoteRejection { .. } => StatusCode::BAD_GATEWAY,
            Self::CacheIo { .. } | Self::JsonParsing(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages() {
        let err = WeatherError::InvalidArgument("city id is missing".into());
        assert_eq!(err.to_string(), "Invalid argument: city id is missing");

        let err = WeatherError::RemoteRejection {
            status: Some(401),
            body: r#"{"cod":401}"#.into(),
        };
        assert!(err.to_string().contains("401"));

        let err = WeatherError::cache_io(
            "/tmp/last-response.json",
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        );
        assert!(err.to_string().contains("/tmp/last-response.json"));
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(
            WeatherError::InvalidArgument("x".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            WeatherError::RemoteRejection { status: Some(401), body: String::new() }.status_code(),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            WeatherError::cache_io(
                "/tmp/last-response.json",
                std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
            )
            .status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );

        let parse_error = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        assert_eq!(
            WeatherError::from(parse_error).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[tokio::test]
    async fn test_network_failure_status_code() {
        let err = reqwest::Client::new()
            .get("http://127.0.0.1:1/")
            .send()
            .await
            .unwrap_err();

        assert_eq!(WeatherError::from(err).status_code(), StatusCode::BAD_GATEWAY);
    }
}
