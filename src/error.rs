//! Error types for the tokenwatch job

use thiserror::Error;

/// Result type alias for tokenwatch operations
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level error type for the application
#[derive(Debug, Error)]
#[allow(dead_code)]
pub enum Error {
    #[error(transparent)]
    Api(#[from] ApiError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Notify(#[from] NotifyError),

    #[error("Operation failed: {0}")]
    Other(String),
}

/// GitLab API errors
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Authentication rejected by GitLab. Check GITLAB_ADMIN_TOKEN.")]
    Unauthorized,

    #[error("HTTP {0} from GitLab")]
    Status(u16),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Invalid API response: {0}")]
    InvalidResponse(String),
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ApiError::Network("Request timed out".to_string())
        } else if err.is_connect() {
            ApiError::Network("Failed to connect to GitLab".to_string())
        } else {
            ApiError::Network(err.to_string())
        }
    }
}

/// Configuration-related errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("GITLAB_ADMIN_TOKEN is not set. An admin token is required to list tokens.")]
    MissingAdminToken,

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Notification delivery errors
#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("Chat webhook delivery failed: {0}")]
    Chat(String),

    #[error("Queue delivery failed: {0}")]
    Queue(String),
}

impl From<redis::RedisError> for NotifyError {
    fn from(err: redis::RedisError) -> Self {
        NotifyError::Queue(err.to_string())
    }
}
