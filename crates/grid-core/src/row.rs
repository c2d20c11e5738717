//! Rows and their stable identity.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::value::Value;

/// Editable cells of a row, keyed by column name.
pub type Cells = BTreeMap<String, Value>;

/// Store-assigned row identity (the `rowid` or the integer primary key aliasing it).
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, JsonSchema,
)]
#[serde(transparent)]
pub struct RowId(pub i64);

impl RowId {
    #[must_use]
    pub const fn get(self) -> i64 {
        self.0
    }
}

impl fmt::Display for RowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for RowId {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

/// One table row.
///
/// The identity lives outside `cells`, so editing cells can never rewrite it.
/// A row without an identity is a pending insertion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Row {
    #[serde(default, rename = "rowid", skip_serializing_if = "Option::is_none")]
    pub identity: Option<RowId>,
    pub cells: Cells,
}

impl Row {
    /// A persisted row with a known identity.
    #[must_use]
    pub const fn existing(identity: RowId, cells: Cells) -> Self {
        Self {
            identity: Some(identity),
            cells,
        }
    }

    /// A row that has not been written yet.
    #[must_use]
    pub const fn pending(cells: Cells) -> Self {
        Self {
            identity: None,
            cells,
        }
    }

    #[must_use]
    pub const fn is_pending(&self) -> bool {
        self.identity.is_none()
    }

    #[must_use]
    pub fn get(&self, column: &str) -> Option<&Value> {
        self.cells.get(column)
    }

    /// True when the cell keys are exactly `columns` (order-insensitive).
    #[must_use]
    pub fn has_columns(&self, columns: &[String]) -> bool {
        self.cells.len() == columns.len() && columns.iter().all(|c| self.cells.contains_key(c))
    }
}

/// Build [`Cells`] from `(column, value)` pairs.
pub fn cells<K, V, I>(pairs: I) -> Cells
where
    K: Into<String>,
    V: Into<Value>,
    I: IntoIterator<Item = (K, V)>,
{
    pairs
        .into_iter()
        .map(|(k, v)| (k.into(), v.into()))
        .collect()
}
