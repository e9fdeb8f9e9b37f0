//! Error types for the shotlog CLI

use std::time::Duration;
use thiserror::Error;

/// Result type alias for shotlog operations
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level error type for the application
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Api(#[from] ApiError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Cache(#[from] CacheError),

    #[error(transparent)]
    Shot(#[from] ShotError),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Interactive prompt error: {0}")]
    Dialoguer(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl From<dialoguer::Error> for Error {
    fn from(err: dialoguer::Error) -> Self {
        Error::Dialoguer(err.to_string())
    }
}

impl Error {
    /// Collapse into an [`ApiError`] so the failure can be shared between
    /// callers awaiting the same network operation.
    pub fn into_api_error(self) -> ApiError {
        match self {
            Error::Api(err) => err,
            other => ApiError::InvalidResponse(other.to_string()),
        }
    }
}

/// Remote storage API errors.
///
/// `Clone` because one token refresh failure is handed to every coalesced waiter.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ApiError {
    #[error("Authentication failed. Run `shotlog auth set` to update your credentials.")]
    Unauthorized,

    #[error("Token refresh rejected: {0}")]
    AuthRejected(String),

    #[error("Access denied. You don't have permission to access this file.")]
    Forbidden,

    #[error("File not found: {0}")]
    NotFound(String),

    #[error("Rate limit exceeded. Retry after {0:?}")]
    RateLimit(Duration),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Page token expired or invalid")]
    PageTokenInvalid,

    #[error("Server error: {0}")]
    ServerError(String),

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
            ApiError::Network("Failed to connect to API".to_string())
        } else {
            ApiError::Network(err.to_string())
        }
    }
}

/// Configuration-related errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration file not found. Run `shotlog auth set` to create one.")]
    NotFound,

    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("Failed to save configuration: {0}")]
    SaveError(String),

    #[error("Credentials not configured. Run `shotlog auth set` to add them.")]
    MissingCredentials,
}

impl From<serde_yaml::Error> for ConfigError {
    fn from(err: serde_yaml::Error) -> Self {
        ConfigError::ParseError(err.to_string())
    }
}

/// Cache configuration errors. These indicate a programming mistake, not bad input.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CacheError {
    #[error("Unknown cache category: {0}")]
    UnknownCategory(String),
}

/// Shot listing and decoding errors
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ShotError {
    #[error("Malformed continuation token: {0}")]
    MalformedContinuation(String),

    #[error("Failed to decode shot {0}: {1}")]
    Decode(String, String),
}
