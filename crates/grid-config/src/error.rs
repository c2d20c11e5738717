//! Configuration error types.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    /// A provider failed to merge or the merged values failed to deserialize.
    #[error("Configuration error: {0}")]
    Figment(#[from] Box<figment::Error>),

    /// A setting needed by the requested operation was left empty.
    #[error("'{section}' is not configured (set it in config.toml or GRIDLINE_{env})")]
    NotConfigured { section: String, env: String },

    /// A setting is present but outside its allowed range.
    #[error("Invalid configuration value for '{field}': {reason}")]
    InvalidValue { field: String, reason: String },

    /// A `.env` file exists but could not be read or parsed.
    #[error("Failed to load .env: {0}")]
    Dotenv(#[from] dotenvy::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(error: figment::Error) -> Self {
        Self::Figment(Box::new(error))
    }
}

impl ConfigError {
    pub(crate) fn invalid(field: &str, reason: impl Into<String>) -> Self {
        Self::InvalidValue {
            field: field.to_string(),
            reason: reason.into(),
        }
    }
}
