//! Change sets and commit summaries.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashSet};
use std::fmt;

use crate::errors::CoreError;
use crate::row::{Cells, RowId};

/// Changed columns for one existing row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct RowUpdate {
    pub rowid: RowId,
    pub changes: Cells,
}

/// Operations needed to reconcile an edited view with its baseline.
///
/// Inserted rows have no identity. An identity appears at most once across
/// `updated` and `deleted`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ChangeSet {
    /// New rows in edit order.
    pub inserted: Vec<Cells>,
    /// Updated rows, ordered by identity.
    pub updated: Vec<RowUpdate>,
    pub deleted: BTreeSet<RowId>,
}

impl ChangeSet {
    /// A change set that only inserts.
    #[must_use]
    pub fn inserts(rows: Vec<Cells>) -> Self {
        Self {
            inserted: rows,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inserted.is_empty() && self.updated.is_empty() && self.deleted.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.inserted.len() + self.updated.len() + self.deleted.len()
    }

    /// Check that no identity is targeted twice.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::DuplicateIdentity` for the first identity found in
    /// two updates or in both `updated` and `deleted`.
    pub fn validate(&self, table: &str) -> Result<(), CoreError> {
        let mut seen = HashSet::with_capacity(self.updated.len());
        for update in &self.updated {
            if !seen.insert(update.rowid) || self.deleted.contains(&update.rowid) {
                return Err(CoreError::DuplicateIdentity {
                    table: table.to_string(),
                    identity: update.rowid,
                });
            }
        }
        Ok(())
    }
}

/// Row counts applied by a successful commit or import.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct CommitResult {
    pub inserted: u64,
    pub updated: u64,
    pub deleted: u64,
}

impl CommitResult {
    #[must_use]
    pub const fn total(&self) -> u64 {
        self.inserted + self.updated + self.deleted
    }
}

impl fmt::Display for CommitResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "added {}, updated {}, deleted {}",
            self.inserted, self.updated, self.deleted
        )
    }
}
