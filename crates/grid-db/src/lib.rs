//! # grid-db
//!
//! libSQL-backed row synchronization for gridline.
//!
//! Reconciles freely edited table snapshots with the persisted table using
//! the row identity (`rowid` or the integer primary key aliasing it), merges
//! externally sourced batches under append or replace semantics, and passes
//! raw SQL through. Every mutation runs inside a single transaction.
//!
//! Uses the `libsql` crate (C `SQLite` fork) with local database files only.

pub mod commit;
pub mod error;
pub mod executor;
pub mod helpers;
pub mod identity;
pub mod import;
pub mod snapshot;

#[cfg(test)]
mod test_support;

use std::ops::Deref;

use grid_config::{DatabaseConfig, ImportConfig};
use libsql::{Builder, TransactionBehavior};
use tokio::sync::{Mutex, MutexGuard};

use error::DatabaseError;

/// Central database handle: the one open connection for a session.
///
/// All access is serialized through an async gate, so no two transactions
/// (or a read and a transaction) ever interleave on the handle.
pub struct GridDb {
    #[allow(dead_code)]
    db: libsql::Database,
    conn: libsql::Connection,
    gate: Mutex<()>,
    chunk_rows: usize,
}

impl GridDb {
    /// Open a database file with default settings.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the database cannot be opened or a pragma fails.
    pub async fn open_local(path: &str) -> Result<Self, DatabaseError> {
        Self::open_with(path, &DatabaseConfig::default(), &ImportConfig::default()).await
    }

    /// Open a database file, applying connection pragmas from `database`.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the database cannot be opened or a pragma fails.
    pub async fn open_with(
        path: &str,
        database: &DatabaseConfig,
        import: &ImportConfig,
    ) -> Result<Self, DatabaseError> {
        let db = Builder::new_local(path).build().await?;
        let conn = db.connect()?;

        let grid_db = Self {
            db,
            conn,
            gate: Mutex::new(()),
            chunk_rows: import.chunk_rows.max(1),
        };
        grid_db.apply_pragmas(database).await?;
        tracing::debug!(path, "opened database");
        Ok(grid_db)
    }

    /// Per-connection pragmas. Integer primary keys alias `rowid` by default,
    /// so nothing is needed for identity semantics beyond these.
    async fn apply_pragmas(&self, database: &DatabaseConfig) -> Result<(), DatabaseError> {
        let foreign_keys = if database.foreign_keys { "ON" } else { "OFF" };
        self.conn
            .execute(&format!("PRAGMA foreign_keys = {foreign_keys}"), ())
            .await?;

        self.pragma(&format!("busy_timeout = {}", database.busy_timeout_ms))
            .await?;

        let journal_mode = database.journal_mode.to_ascii_lowercase();
        if !journal_mode.is_empty() {
            if !journal_mode.chars().all(|c| c.is_ascii_alphabetic()) {
                return Err(DatabaseError::Query(format!(
                    "invalid journal mode '{}'",
                    database.journal_mode
                )));
            }
            self.pragma(&format!("journal_mode = {journal_mode}")).await?;
        }
        Ok(())
    }

    /// Run a pragma that reports its new value as a row.
    async fn pragma(&self, assignment: &str) -> Result<(), DatabaseError> {
        let mut rows = self.conn.query(&format!("PRAGMA {assignment}"), ()).await?;
        while rows.next().await?.is_some() {}
        Ok(())
    }

    /// Access the underlying libSQL connection for direct queries.
    ///
    /// Bypasses the gate; meant for tests and diagnostics.
    #[must_use]
    pub const fn conn(&self) -> &libsql::Connection {
        &self.conn
    }

    /// Rows per INSERT statement when inserting in bulk.
    #[must_use]
    pub const fn chunk_rows(&self) -> usize {
        self.chunk_rows
    }

    /// Acquire the gate for a read outside any transaction.
    pub(crate) async fn read(&self) -> ReadScope<'_> {
        ReadScope {
            conn: &self.conn,
            _gate: self.gate.lock().await,
        }
    }

    /// Start an immediate transaction, holding the gate until it settles.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::StorageFault` if the write lock cannot be taken.
    pub async fn begin(&self) -> Result<TxScope<'_>, DatabaseError> {
        let gate = self.gate.lock().await;
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)
            .await?;
        Ok(TxScope { tx, _gate: gate })
    }

    /// List user tables in name order.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the catalog query fails.
    pub async fn list_tables(&self) -> Result<Vec<String>, DatabaseError> {
        let scope = self.read().await;
        let mut rows = scope
            .query(
                "SELECT name FROM sqlite_master \
                 WHERE type = 'table' AND name NOT LIKE 'sqlite_%' \
                 ORDER BY name",
                (),
            )
            .await?;

        let mut tables = Vec::new();
        while let Some(row) = rows.next().await? {
            tables.push(row.get::<String>(0)?);
        }
        Ok(tables)
    }
}

/// Gate-holding view of the connection for reads.
pub(crate) struct ReadScope<'db> {
    conn: &'db libsql::Connection,
    _gate: MutexGuard<'db, ()>,
}

impl Deref for ReadScope<'_> {
    type Target = libsql::Connection;

    fn deref(&self) -> &libsql::Connection {
        self.conn
    }
}

/// An open transaction that owns the connection gate.
///
/// Finish it with [`TxScope::settle`]. Dropping it unsettled rolls back.
pub struct TxScope<'db> {
    tx: libsql::Transaction,
    _gate: MutexGuard<'db, ()>,
}

impl TxScope<'_> {
    /// Commit if `outcome` is `Ok`, roll back otherwise, and pass `outcome` through.
    ///
    /// # Errors
    ///
    /// Returns the original error on rollback, or the commit failure.
    pub async fn settle<T>(self, outcome: Result<T, DatabaseError>) -> Result<T, DatabaseError> {
        match outcome {
            Ok(value) => {
                self.tx.commit().await?;
                Ok(value)
            }
            Err(error) => {
                if let Err(rollback_error) = self.tx.rollback().await {
                    tracing::warn!(%error, %rollback_error, "rollback failed");
                }
                Err(error)
            }
        }
    }
}

impl Deref for TxScope<'_> {
    type Target = libsql::Connection;

    fn deref(&self) -> &libsql::Connection {
        &self.tx
    }
}
