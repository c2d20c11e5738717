//! Table snapshots and the edited views derived from them.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::changeset::ChangeSet;
use crate::diff::diff;
use crate::errors::CoreError;
use crate::row::{Cells, Row, RowId};
use crate::value::Value;

/// Immutable point-in-time copy of a table, used as the diff baseline.
///
/// Every row carries an identity and exactly the snapshot's columns.
/// The identity column itself is never part of `columns`. Deserializing
/// checks the same invariants as [`TableSnapshot::new`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(try_from = "SnapshotDocument")]
pub struct TableSnapshot {
    table: String,
    identity_column: String,
    columns: Vec<String>,
    rows: Vec<Row>,
}

impl TableSnapshot {
    /// Capture a snapshot, checking the row invariants.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::SchemaMismatch` if a row lacks an identity or its
    /// cells differ from `columns`, and `CoreError::DuplicateIdentity` if an
    /// identity repeats.
    pub fn new(
        table: impl Into<String>,
        identity_column: impl Into<String>,
        columns: Vec<String>,
        rows: Vec<Row>,
    ) -> Result<Self, CoreError> {
        let table = table.into();
        let mut seen = HashSet::with_capacity(rows.len());
        for (position, row) in rows.iter().enumerate() {
            let Some(identity) = row.identity else {
                return Err(CoreError::schema(
                    &table,
                    format!("snapshot row {position} has no identity"),
                ));
            };
            if !seen.insert(identity) {
                return Err(CoreError::DuplicateIdentity { table, identity });
            }
            if !row.has_columns(&columns) {
                return Err(CoreError::schema(
                    &table,
                    format!("snapshot row {identity} does not match columns {columns:?}"),
                ));
            }
        }
        Ok(Self {
            table,
            identity_column: identity_column.into(),
            columns,
            rows,
        })
    }

    #[must_use]
    pub fn table(&self) -> &str {
        &self.table
    }

    #[must_use]
    pub fn identity_column(&self) -> &str {
        &self.identity_column
    }

    #[must_use]
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    #[must_use]
    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    #[must_use]
    pub fn row(&self, identity: RowId) -> Option<&Row> {
        self.rows.iter().find(|r| r.identity == Some(identity))
    }

    /// Start an editing session: a mutable working copy of this snapshot.
    #[must_use]
    pub fn edit(&self) -> EditedView {
        EditedView {
            table: self.table.clone(),
            columns: self.columns.clone(),
            rows: self.rows.clone(),
        }
    }
}

#[derive(Deserialize, JsonSchema)]
struct SnapshotDocument {
    table: String,
    identity_column: String,
    columns: Vec<String>,
    rows: Vec<Row>,
}

impl TryFrom<SnapshotDocument> for TableSnapshot {
    type Error = CoreError;

    fn try_from(doc: SnapshotDocument) -> Result<Self, Self::Error> {
        Self::new(doc.table, doc.identity_column, doc.columns, doc.rows)
    }
}

/// Mutable working copy presented to the user.
///
/// Rows may be changed in place, appended without an identity, or removed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct EditedView {
    pub table: String,
    pub columns: Vec<String>,
    pub rows: Vec<Row>,
}

impl EditedView {
    /// Set one cell of the row with `identity`. Returns `false` if no such row is live.
    pub fn set(&mut self, identity: RowId, column: &str, value: impl Into<Value>) -> bool {
        match self.rows.iter_mut().find(|r| r.identity == Some(identity)) {
            Some(row) => {
                row.cells.insert(column.to_string(), value.into());
                true
            }
            None => false,
        }
    }

    /// Append a pending row.
    pub fn push(&mut self, cells: Cells) {
        self.rows.push(Row::pending(cells));
    }

    /// Remove the row with `identity`. Returns `false` if it was not present.
    pub fn remove(&mut self, identity: RowId) -> bool {
        let before = self.rows.len();
        self.rows.retain(|r| r.identity != Some(identity));
        self.rows.len() != before
    }

    /// Identities still present in the view.
    pub fn live_identities(&self) -> impl Iterator<Item = RowId> + '_ {
        self.rows.iter().filter_map(|r| r.identity)
    }
}

/// A snapshot and the view being edited from it, kept together so the
/// changes can be computed against the rows as they were loaded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct EditSession {
    pub baseline: TableSnapshot,
    pub edited: EditedView,
}

impl EditSession {
    /// Begin editing `baseline` with an unchanged working copy.
    #[must_use]
    pub fn start(baseline: TableSnapshot) -> Self {
        let edited = baseline.edit();
        Self { baseline, edited }
    }

    /// The change set that turns the baseline into the edited view.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::SchemaMismatch` if the view was edited from a
    /// different table, and every error of [`diff`].
    pub fn changes(&self) -> Result<ChangeSet, CoreError> {
        if self.edited.table != self.baseline.table {
            return Err(CoreError::schema(
                &self.baseline.table,
                format!("edited view belongs to table '{}'", self.edited.table),
            ));
        }
        diff(&self.baseline, &self.edited)
    }
}
