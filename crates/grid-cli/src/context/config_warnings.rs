use grid_config::GridConfig;

/// Emit warnings for likely mistyped env var keys that silently fell back to defaults.
pub fn warn_unconfigured(config: &GridConfig) {
    for warning in collect_unconfigured_warnings(config, std::env::vars()) {
        tracing::warn!("{warning}");
    }
}

fn collect_unconfigured_warnings<I>(config: &GridConfig, env: I) -> Vec<String>
where
    I: IntoIterator<Item = (String, String)>,
{
    let env_keys = env.into_iter().map(|(key, _)| key).collect::<Vec<_>>();

    let mut warnings = Vec::new();

    if !config.database.is_configured() && has_single_underscore(&env_keys, "GRIDLINE_DATABASE") {
        warnings.push(
            "Database path appears default while GRIDLINE_DATABASE_* env vars exist. Use double underscores (example: GRIDLINE_DATABASE__PATH)."
                .to_string(),
        );
    }

    if has_single_underscore(&env_keys, "GRIDLINE_IMPORT") {
        warnings.push(
            "GRIDLINE_IMPORT_* env vars are ignored. Use double underscores (example: GRIDLINE_IMPORT__CHUNK_ROWS)."
                .to_string(),
        );
    }

    warnings
}

/// `PREFIX_X` present but not `PREFIX__X`.
fn has_single_underscore(keys: &[String], prefix: &str) -> bool {
    keys.iter().any(|key| {
        key.strip_prefix(prefix)
            .is_some_and(|rest| rest.starts_with('_') && !rest.starts_with("__"))
    })
}

#[cfg(test)]
mod tests {
    use grid_config::{DatabaseConfig, GridConfig};

    use super::collect_unconfigured_warnings;

    #[test]
    fn warns_for_single_underscore_keys() {
        let config = GridConfig::default();
        let warnings = collect_unconfigured_warnings(
            &config,
            vec![
                ("GRIDLINE_DATABASE_PATH".to_string(), "app.db".to_string()),
                ("GRIDLINE_IMPORT_CHUNK_ROWS".to_string(), "50".to_string()),
            ],
        );

        assert_eq!(warnings.len(), 2);
        assert!(warnings[0].contains("GRIDLINE_DATABASE__PATH"));
    }

    #[test]
    fn does_not_warn_for_nested_keys_or_configured_database() {
        let config = GridConfig {
            database: DatabaseConfig {
                path: "app.db".to_string(),
                ..Default::default()
            },
            ..Default::default()
        };

        let warnings = collect_unconfigured_warnings(
            &config,
            vec![
                ("GRIDLINE_DATABASE_PATH".to_string(), "app.db".to_string()),
                ("GRIDLINE_IMPORT__CHUNK_ROWS".to_string(), "50".to_string()),
                ("GRIDLINE_LOG".to_string(), "debug".to_string()),
            ],
        );

        assert!(warnings.is_empty());
    }
}
