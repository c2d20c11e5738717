use anyhow::Context;
use grid_config::GridConfig;

/// Load `.env` from the working directory, then the layered config.
pub fn load_config() -> anyhow::Result<GridConfig> {
    let config =
        GridConfig::load_with_dotenv().context("failed to load gridline configuration")?;
    crate::context::warn_unconfigured(&config);
    Ok(config)
}
