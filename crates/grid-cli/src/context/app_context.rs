use anyhow::Context;
use grid_config::GridConfig;
use grid_db::GridDb;

use crate::cli::GlobalFlags;

/// Shared application resources initialized once at startup.
pub struct AppContext {
    pub db: GridDb,
    pub config: GridConfig,
}

impl AppContext {
    /// Open the database named by `--database`, falling back to `database.path`.
    pub async fn init(config: GridConfig, flags: &GlobalFlags) -> anyhow::Result<Self> {
        let path = match flags.database.as_deref() {
            Some(path) => path.to_string(),
            None => config.database.require_path()?.to_string(),
        };

        let db = GridDb::open_with(&path, &config.database, &config.import)
            .await
            .with_context(|| format!("failed to open database at {path}"))?;
        tracing::debug!(%path, "database ready");

        Ok(Self { db, config })
    }

    /// Rows to display: `--limit`, else `general.default_limit`.
    pub fn display_limit(&self, flags: &GlobalFlags) -> usize {
        let limit = flags.limit.unwrap_or(self.config.general.default_limit);
        usize::try_from(limit).unwrap_or(usize::MAX)
    }
}
