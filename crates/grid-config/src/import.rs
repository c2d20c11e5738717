//! Bulk import and insert batching settings.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Default rows per multi-row INSERT statement.
const fn default_chunk_rows() -> usize {
    500
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ImportConfig {
    /// Upper bound on rows per INSERT statement.
    ///
    /// All chunks of one commit or import still share a single transaction.
    #[serde(default = "default_chunk_rows")]
    pub chunk_rows: usize,
}

impl Default for ImportConfig {
    fn default() -> Self {
        Self {
            chunk_rows: default_chunk_rows(),
        }
    }
}

impl ImportConfig {
    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        if self.chunk_rows == 0 {
            return Err(ConfigError::invalid("import.chunk_rows", "must be at least 1"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_correct() {
        let config = ImportConfig::default();
        assert_eq!(config.chunk_rows, 500);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn zero_chunk_is_rejected() {
        let config = ImportConfig { chunk_rows: 0 };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidValue { .. })
        ));
    }
}
