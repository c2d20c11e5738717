//! Import batches and merge planning.
//!
//! An [`ImportBatch`] is an externally sourced table (already parsed from a
//! spreadsheet or CSV) destined for an existing table. Planning checks the
//! batch against the target's declared columns and yields an insert-only
//! [`ChangeSet`]; whether existing rows are removed first is decided by the
//! [`MergeMode`] at commit time.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use crate::changeset::ChangeSet;
use crate::errors::CoreError;
use crate::row::Cells;
use crate::value::Value;

/// How an import batch is merged into its target table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum MergeMode {
    /// Add the batch rows; existing rows are untouched.
    #[default]
    Append,
    /// Remove every existing row, then add the batch rows, atomically.
    Replace,
}

impl MergeMode {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Append => "append",
            Self::Replace => "replace",
        }
    }
}

impl fmt::Display for MergeMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MergeMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "append" => Ok(Self::Append),
            "replace" => Ok(Self::Replace),
            other => Err(format!("unknown merge mode '{other}' (expected append or replace)")),
        }
    }
}

/// Externally sourced rows for one target table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ImportBatch {
    pub table: String,
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Value>>,
    #[serde(default)]
    pub mode: MergeMode,
}

impl ImportBatch {
    /// Check the batch against `target_columns` and turn it into inserts.
    ///
    /// Column names match ASCII case-insensitively, as `SQLite` does, and are
    /// rewritten to the target's spelling. `Replace` requires the exact column
    /// set; `Append` accepts a subset, leaving omitted columns to their default.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::SchemaMismatch` for duplicate or unknown batch
    /// columns, a missing column in `Replace` mode, or a row whose width
    /// differs from the batch's column count.
    pub fn plan(&self, target_columns: &[String]) -> Result<ChangeSet, CoreError> {
        let canonical = self.canonical_columns(target_columns)?;

        if self.mode == MergeMode::Replace && canonical.len() != target_columns.len() {
            let missing: Vec<&String> = target_columns
                .iter()
                .filter(|c| !canonical.contains(c))
                .collect();
            return Err(CoreError::schema(
                &self.table,
                format!("replace import is missing columns {missing:?}"),
            ));
        }

        let mut inserted = Vec::with_capacity(self.rows.len());
        for (position, values) in self.rows.iter().enumerate() {
            if values.len() != canonical.len() {
                return Err(CoreError::schema(
                    &self.table,
                    format!(
                        "import row {position} has {} values, expected {}",
                        values.len(),
                        canonical.len()
                    ),
                ));
            }
            let cells: Cells = canonical.iter().cloned().zip(values.iter().cloned()).collect();
            inserted.push(cells);
        }

        Ok(ChangeSet::inserts(inserted))
    }

    fn canonical_columns(&self, target_columns: &[String]) -> Result<Vec<String>, CoreError> {
        let mut seen = HashSet::with_capacity(self.columns.len());
        let mut canonical = Vec::with_capacity(self.columns.len());

        for column in &self.columns {
            if !seen.insert(column.to_ascii_lowercase()) {
                return Err(CoreError::schema(
                    &self.table,
                    format!("import column '{column}' appears more than once"),
                ));
            }
            let target = target_columns
                .iter()
                .find(|t| t.eq_ignore_ascii_case(column))
                .ok_or_else(|| {
                    CoreError::schema(
                        &self.table,
                        format!("import column '{column}' is not a column of the table"),
                    )
                })?;
            canonical.push(target.clone());
        }
        Ok(canonical)
    }
}
