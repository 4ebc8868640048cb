use crate::messaging::publisher::PublishError;
use thiserror::Error;

pub type Result<T, E = RelayError> = std::result::Result<T, E>;

#[derive(Error, Debug)]
pub enum RelayError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),

    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Google Cloud authentication error: {0}")]
    Auth(#[from] gcp_auth::Error),

    #[error("Pub/Sub rejected publish with status {status}: {body}")]
    PubSubStatus { status: u16, body: String },

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid input: {0}")]
    Input(String),

    #[error("Not connected to {0}")]
    Disconnected(String),

    #[error(transparent)]
    Publish(#[from] PublishError),
}

impl From<config::ConfigError> for RelayError {
    fn from(err: config::ConfigError) -> Self {
        RelayError::Config(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_creation() {
        let config_error = RelayError::Config("Invalid config".to_string());
        assert!(matches!(config_error, RelayError::Config(_)));

        let input_error = RelayError::Input("not json".to_string());
        assert!(matches!(input_error, RelayError::Input(_)));
    }

    #[test]
    fn test_error_display() {
        let error = RelayError::PubSubStatus {
            status: 403,
            body: "permission denied".to_string(),
        };
        let display = error.to_string();
        assert!(display.contains("403"));
        assert!(display.contains("permission denied"));
    }

    #[test]
    fn test_config_error_conversion() {
        let err: RelayError = config::ConfigError::Message("bad key".to_string()).into();
        assert!(matches!(err, RelayError::Config(msg) if msg.contains("bad key")));
    }
}
