//! Errors raised before any database mutation is attempted.
//!
//! Storage-side failures (constraints, I/O, conflicts) are defined in
//! `grid-db`, which converts these into its own `DatabaseError`.

use thiserror::Error;

use crate::row::RowId;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CoreError {
    /// Row or batch shape disagrees with the table's declared columns.
    #[error("Schema mismatch on '{table}': {detail}")]
    SchemaMismatch { table: String, detail: String },

    /// The same identity appears twice in an edited view.
    #[error("Duplicate identity {identity} in edited view of '{table}'")]
    DuplicateIdentity { table: String, identity: RowId },

    /// An edited view carries an identity its baseline snapshot never had.
    #[error("Identity {identity} is not part of the snapshot of '{table}'")]
    UnknownIdentity { table: String, identity: RowId },
}

impl CoreError {
    pub(crate) fn schema(table: &str, detail: impl Into<String>) -> Self {
        Self::SchemaMismatch {
            table: table.to_string(),
            detail: detail.into(),
        }
    }
}
