//! Database error types for grid-db.
//!
//! Low-level libSQL failures are classified by `SQLite` primary result code
//! when converted, so `?` on any libSQL call already yields the right kind.

use grid_core::{CoreError, RowId};
use thiserror::Error;

// SQLite primary result codes (extended codes carry these in the low byte).
const SQLITE_ERROR: i32 = 1;
const SQLITE_BUSY: i32 = 5;
const SQLITE_LOCKED: i32 = 6;
const SQLITE_READONLY: i32 = 8;
const SQLITE_IOERR: i32 = 10;
const SQLITE_CORRUPT: i32 = 11;
const SQLITE_FULL: i32 = 13;
const SQLITE_CANTOPEN: i32 = 14;
const SQLITE_PROTOCOL: i32 = 15;
const SQLITE_CONSTRAINT: i32 = 19;
const SQLITE_MISMATCH: i32 = 20;
const SQLITE_NOTADB: i32 = 26;

/// Errors from database operations.
#[derive(Debug, Error)]
pub enum DatabaseError {
    /// The table has no stable per-row identity and cannot be edited.
    #[error("Table '{table}' cannot be edited: {reason}")]
    UnsupportedTableKind { table: String, reason: String },

    /// No table or view with this name exists.
    #[error("No such table: {0}")]
    TableNotFound(String),

    /// Edited or imported rows disagree with the table's declared columns.
    #[error("Schema mismatch on '{table}': {detail}")]
    SchemaMismatch { table: String, detail: String },

    /// The same identity appears twice in an edited view or change set.
    #[error("Duplicate identity {identity} in changes for '{table}'")]
    DuplicateIdentity { table: String, identity: RowId },

    /// An edited view carries an identity its baseline never had.
    #[error("Identity {identity} is not part of the snapshot of '{table}'")]
    UnknownIdentity { table: String, identity: RowId },

    /// The store rejected a statement (uniqueness, type, foreign key, check).
    #[error("Constraint violation during {operation}: {message}")]
    ConstraintViolation { operation: String, message: String },

    /// The targeted row vanished between snapshot and commit.
    #[error("Row {identity} of '{table}' no longer exists; reload the table and retry")]
    ConcurrentModification { table: String, identity: RowId },

    /// I/O-level failure: disk, lock, corruption, read-only file.
    #[error("Storage fault: {0}")]
    StorageFault(String),

    /// Malformed SQL or a reference to something that does not exist.
    #[error("SQL error: {0}")]
    SyntaxError(String),

    /// A query failed for a reason not covered above.
    #[error("Query failed: {0}")]
    Query(String),

    /// Expected a result row but none was returned.
    #[error("No result returned")]
    NoResult,

    /// Catch-all for unexpected errors.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl DatabaseError {
    /// Attach the statement being executed to a constraint violation.
    #[must_use]
    pub fn during(self, operation: impl Into<String>) -> Self {
        match self {
            Self::ConstraintViolation { message, .. } => Self::ConstraintViolation {
                operation: operation.into(),
                message,
            },
            other => other,
        }
    }

    /// Whether retrying after a delay may succeed.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::StorageFault(_))
    }

    /// Whether the caller should reload its snapshot before trying again.
    #[must_use]
    pub const fn needs_reload(&self) -> bool {
        matches!(
            self,
            Self::ConcurrentModification { .. } | Self::UnknownIdentity { .. }
        )
    }

    fn classify(code: i32, message: String) -> Self {
        match code & 0xff {
            SQLITE_CONSTRAINT | SQLITE_MISMATCH => Self::ConstraintViolation {
                operation: "statement".into(),
                message,
            },
            SQLITE_ERROR => Self::SyntaxError(message),
            SQLITE_BUSY | SQLITE_LOCKED | SQLITE_READONLY | SQLITE_IOERR | SQLITE_CORRUPT
            | SQLITE_FULL | SQLITE_CANTOPEN | SQLITE_PROTOCOL | SQLITE_NOTADB => {
                Self::StorageFault(message)
            }
            _ => Self::Query(message),
        }
    }

    /// Fallback for libSQL errors that carry no result code.
    fn classify_message(message: String) -> Self {
        let lower = message.to_ascii_lowercase();
        if lower.contains("constraint failed") || lower.contains("datatype mismatch") {
            Self::ConstraintViolation {
                operation: "statement".into(),
                message,
            }
        } else if lower.contains("syntax error")
            || lower.contains("no such table")
            || lower.contains("no such column")
        {
            Self::SyntaxError(message)
        } else if lower.contains("database is locked")
            || lower.contains("disk i/o error")
            || lower.contains("readonly database")
            || lower.contains("malformed")
        {
            Self::StorageFault(message)
        } else {
            Self::Query(message)
        }
    }
}

impl From<libsql::Error> for DatabaseError {
    fn from(error: libsql::Error) -> Self {
        match error {
            libsql::Error::SqliteFailure(code, message) => Self::classify(code, message),
            other => Self::classify_message(other.to_string()),
        }
    }
}

impl From<CoreError> for DatabaseError {
    fn from(error: CoreError) -> Self {
        match error {
            CoreError::SchemaMismatch { table, detail } => Self::SchemaMismatch { table, detail },
            CoreError::DuplicateIdentity { table, identity } => {
                Self::DuplicateIdentity { table, identity }
            }
            CoreError::UnknownIdentity { table, identity } => {
                Self::UnknownIdentity { table, identity }
            }
        }
    }
}
