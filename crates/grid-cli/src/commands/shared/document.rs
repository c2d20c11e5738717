use std::path::Path;

use anyhow::Context;
use serde::de::DeserializeOwned;

/// Read a JSON document (edited view or import batch) from `path`.
pub fn read_json<T: DeserializeOwned>(path: &Path, what: &str) -> anyhow::Result<T> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {what} from {}", path.display()))?;
    serde_json::from_str(&text)
        .with_context(|| format!("{} is not a valid {what}", path.display()))
}

#[cfg(test)]
mod tests {
    use grid_core::{EditedView, ImportBatch, MergeMode};

    use super::read_json;

    #[test]
    fn reads_import_batch_with_default_mode() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("batch.json");
        std::fs::write(
            &path,
            r#"{"table": "items", "columns": ["name"], "rows": [["X"], [null]]}"#,
        )
        .unwrap();

        let batch: ImportBatch = read_json(&path, "import batch").unwrap();
        assert_eq!(batch.mode, MergeMode::Append);
        assert_eq!(batch.rows.len(), 2);
    }

    #[test]
    fn reports_path_on_bad_document() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("view.json");
        std::fs::write(&path, "{\"table\": 3}").unwrap();

        let err = read_json::<EditedView>(&path, "edited view").unwrap_err();
        assert!(format!("{err:#}").contains("is not a valid edited view"));
    }

    #[test]
    fn reports_missing_file() {
        let err = read_json::<EditedView>(std::path::Path::new("/nonexistent/view.json"), "edited view")
            .unwrap_err();
        assert!(err.to_string().contains("failed to read edited view"));
    }
}
