use thiserror::Error;

/// Errors that can occur while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration loading failed: {0}")]
    LoadError(#[from] config::ConfigError),

    #[error("Validation failed: {0}")]
    ValidationFailed(#[from] ValidationError),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Required configuration missing: {0}")]
    MissingRequired(&'static str),

    #[error("Invalid port number for {0}")]
    InvalidPort(&'static str),

    #[error("Pool min_connections exceeds max_connections")]
    InvalidPoolSize,

    #[error("Unknown PostgreSQL ssl_mode: {0}")]
    InvalidSslMode(String),

    #[error("Unknown log encoding: {0} (expected json or console)")]
    InvalidLogEncoding(String),
}
