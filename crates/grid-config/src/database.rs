//! Database file and connection settings.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Default busy timeout in milliseconds.
const fn default_busy_timeout_ms() -> u64 {
    5_000
}

/// Foreign keys are enforced unless explicitly disabled.
const fn default_foreign_keys() -> bool {
    true
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DatabaseConfig {
    /// Path to the `SQLite` database file (`:memory:` for a throwaway database).
    #[serde(default)]
    pub path: String,

    /// How long a statement waits on a locked database before failing, in milliseconds.
    #[serde(default = "default_busy_timeout_ms")]
    pub busy_timeout_ms: u64,

    /// Whether to run `PRAGMA foreign_keys = ON` on open.
    #[serde(default = "default_foreign_keys")]
    pub foreign_keys: bool,

    /// Optional `PRAGMA journal_mode` value (e.g. `wal`). Empty keeps the file's mode.
    #[serde(default)]
    pub journal_mode: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: String::new(),
            busy_timeout_ms: default_busy_timeout_ms(),
            foreign_keys: default_foreign_keys(),
            journal_mode: String::new(),
        }
    }
}

impl DatabaseConfig {
    /// Check if a database path has been set.
    pub fn is_configured(&self) -> bool {
        !self.path.is_empty()
    }

    /// The configured path, or an error naming the setting to fill in.
    pub fn require_path(&self) -> Result<&str, ConfigError> {
        if self.is_configured() {
            Ok(&self.path)
        } else {
            Err(ConfigError::NotConfigured {
                section: "database.path".into(),
                env: "DATABASE__PATH".into(),
            })
        }
    }

    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        const JOURNAL_MODES: [&str; 6] = ["delete", "truncate", "persist", "memory", "wal", "off"];
        if !self.journal_mode.is_empty()
            && !JOURNAL_MODES.contains(&self.journal_mode.to_ascii_lowercase().as_str())
        {
            return Err(ConfigError::invalid(
                "database.journal_mode",
                format!("'{}' is not a SQLite journal mode", self.journal_mode),
            ));
        }
        Ok(())
    }
}
