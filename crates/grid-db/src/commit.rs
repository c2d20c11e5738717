//! Applying change sets atomically.
//!
//! Order inside the transaction is fixed: deletes, then updates, then inserts.

use std::collections::{BTreeSet, HashSet};

use grid_core::{Cells, ChangeSet, CommitResult, EditedView, RowId, TableSnapshot, diff};

use crate::GridDb;
use crate::error::DatabaseError;
use crate::helpers::{MAX_BIND_PARAMS, column_list, placeholder_tuple, quote_ident, to_sql_value};
use crate::identity::{self, IdentityKind, TableIdentity};

impl GridDb {
    /// Apply `changes` to the table described by `identity` in one transaction.
    ///
    /// # Errors
    ///
    /// Fails without any visible effect on `SchemaMismatch`, `DuplicateIdentity`,
    /// `ConcurrentModification` (a targeted row vanished), `ConstraintViolation`
    /// or `StorageFault`.
    pub async fn commit(
        &self,
        identity: &TableIdentity,
        changes: &ChangeSet,
    ) -> Result<CommitResult, DatabaseError> {
        let tx = self.begin().await?;
        let outcome = apply_change_set(&tx, identity, changes, self.chunk_rows()).await;
        let result = tx.settle(outcome).await?;
        tracing::info!(table = %identity.table, %result, "committed changes");
        Ok(result)
    }

    /// Diff `edited` against `original` and commit the result.
    ///
    /// The table's identity is re-resolved inside the transaction; a table whose
    /// columns changed since the snapshot was taken is rejected.
    ///
    /// # Errors
    ///
    /// Returns diff errors (`SchemaMismatch`, `DuplicateIdentity`,
    /// `UnknownIdentity`) and every error of [`GridDb::commit`].
    pub async fn sync(
        &self,
        original: &TableSnapshot,
        edited: &EditedView,
    ) -> Result<CommitResult, DatabaseError> {
        let changes = diff(original, edited)?;
        if changes.is_empty() {
            return Ok(CommitResult::default());
        }

        let tx = self.begin().await?;
        let outcome: Result<CommitResult, DatabaseError> = async {
            let identity = identity::resolve(&tx, original.table()).await?;
            if identity.column != original.identity_column() || identity.columns != original.columns()
            {
                return Err(DatabaseError::SchemaMismatch {
                    table: identity.table,
                    detail: "table definition changed since the snapshot was loaded".into(),
                });
            }
            apply_change_set(&tx, &identity, &changes, self.chunk_rows()).await
        }
        .await;
        let result = tx.settle(outcome).await?;
        tracing::info!(table = %original.table(), %result, "synchronized edits");
        Ok(result)
    }
}

/// Run every statement of `changes` on `conn`. The caller owns the transaction.
pub(crate) async fn apply_change_set(
    conn: &libsql::Connection,
    identity: &TableIdentity,
    changes: &ChangeSet,
    chunk_rows: usize,
) -> Result<CommitResult, DatabaseError> {
    changes.validate(&identity.table)?;
    check_columns(identity, changes)?;

    let mut result = CommitResult::default();
    ensure_present(conn, identity, &changes.deleted).await?;
    for rowid in &changes.deleted {
        delete_row(conn, identity, *rowid).await?;
        result.deleted += 1;
    }
    for update in &changes.updated {
        if update_row(conn, identity, update.rowid, &update.changes).await? {
            result.updated += 1;
        }
    }
    result.inserted = insert_rows(conn, identity, &changes.inserted, chunk_rows).await?;
    Ok(result)
}

fn check_columns(identity: &TableIdentity, changes: &ChangeSet) -> Result<(), DatabaseError> {
    let known: HashSet<&str> = identity.columns.iter().map(String::as_str).collect();
    let touched = changes
        .updated
        .iter()
        .flat_map(|u| u.changes.keys())
        .chain(changes.inserted.iter().flat_map(Cells::keys));

    for column in touched {
        if !known.contains(column.as_str()) {
            return Err(DatabaseError::SchemaMismatch {
                table: identity.table.clone(),
                detail: format!("'{column}' is not an editable column"),
            });
        }
    }
    Ok(())
}

/// Fail on the first deletion target that is already gone.
///
/// Checked up front so rows removed by an earlier delete's cascade or trigger
/// still count as deleted.
async fn ensure_present(
    conn: &libsql::Connection,
    identity: &TableIdentity,
    rowids: &BTreeSet<RowId>,
) -> Result<(), DatabaseError> {
    let targets: Vec<RowId> = rowids.iter().copied().collect();
    for chunk in targets.chunks(MAX_BIND_PARAMS) {
        let id_sql = identity.column_sql();
        let sql = format!(
            "SELECT {id_sql} FROM {} WHERE {id_sql} IN {}",
            identity.table_sql(),
            placeholder_tuple(1, chunk.len())
        );
        let params: Vec<libsql::Value> = chunk.iter().map(|id| id.get().into()).collect();
        let mut rows = conn.query(&sql, libsql::params_from_iter(params)).await?;

        let mut found = HashSet::with_capacity(chunk.len());
        while let Some(row) = rows.next().await? {
            found.insert(RowId(row.get::<i64>(0)?));
        }
        if let Some(missing) = chunk.iter().find(|id| !found.contains(*id)) {
            return Err(vanished(identity, *missing));
        }
    }
    Ok(())
}

async fn delete_row(
    conn: &libsql::Connection,
    identity: &TableIdentity,
    rowid: RowId,
) -> Result<(), DatabaseError> {
    let sql = format!(
        "DELETE FROM {} WHERE {} = ?1",
        identity.table_sql(),
        identity.column_sql()
    );
    let affected = conn
        .execute(&sql, [rowid.get()])
        .await
        .map_err(|e| DatabaseError::from(e).during(format!("delete of row {rowid}")))?;
    if affected == 0 {
        tracing::debug!(table = %identity.table, %rowid, "row already removed by cascade");
    }
    Ok(())
}

/// Returns `false` when there was nothing to change.
async fn update_row(
    conn: &libsql::Connection,
    identity: &TableIdentity,
    rowid: RowId,
    changes: &Cells,
) -> Result<bool, DatabaseError> {
    if changes.is_empty() {
        return Ok(false);
    }

    let mut sets = Vec::with_capacity(changes.len());
    let mut params: Vec<libsql::Value> = Vec::with_capacity(changes.len() + 1);
    let mut idx = 1usize;
    for (column, value) in changes {
        sets.push(format!("{} = ?{idx}", quote_ident(column)));
        params.push(to_sql_value(value));
        idx += 1;
    }
    params.push(rowid.get().into());

    let sql = format!(
        "UPDATE {} SET {} WHERE {} = ?{idx}",
        identity.table_sql(),
        sets.join(", "),
        identity.column_sql()
    );
    let affected = conn
        .execute(&sql, libsql::params_from_iter(params))
        .await
        .map_err(|e| DatabaseError::from(e).during(format!("update of row {rowid}")))?;
    if affected == 0 {
        return Err(vanished(identity, rowid));
    }
    Ok(true)
}

/// Insert rows in edit order, batching consecutive rows with the same columns.
async fn insert_rows(
    conn: &libsql::Connection,
    identity: &TableIdentity,
    rows: &[Cells],
    chunk_rows: usize,
) -> Result<u64, DatabaseError> {
    let mut inserted = 0;
    let mut start = 0;
    while start < rows.len() {
        let columns: Vec<&String> = rows[start].keys().collect();
        let run = rows[start..]
            .iter()
            .take_while(|r| r.keys().eq(columns.iter().copied()))
            .count();
        let group = &rows[start..start + run];

        let per_statement = rows_per_statement(identity, columns.len(), chunk_rows);
        for chunk in group.chunks(per_statement) {
            inserted += insert_chunk(conn, identity, &columns, chunk).await?;
        }
        start += run;
    }
    Ok(inserted)
}

fn rows_per_statement(identity: &TableIdentity, width: usize, chunk_rows: usize) -> usize {
    // Synthesized keys and DEFAULT VALUES both need one statement per row.
    if identity.kind == IdentityKind::WithoutRowidKey || width == 0 {
        return 1;
    }
    chunk_rows.min(MAX_BIND_PARAMS / width).max(1)
}

async fn insert_chunk(
    conn: &libsql::Connection,
    identity: &TableIdentity,
    columns: &[&String],
    chunk: &[Cells],
) -> Result<u64, DatabaseError> {
    let table = identity.table_sql();
    let mut params: Vec<libsql::Value> = Vec::with_capacity(chunk.len() * columns.len());

    let sql = if identity.kind == IdentityKind::WithoutRowidKey {
        let key = identity.column_sql();
        let next_key = format!("(SELECT COALESCE(MAX({key}), 0) + 1 FROM {table})");
        let mut targets = vec![key];
        targets.extend(columns.iter().map(|c| quote_ident(c)));
        let mut slots = vec![next_key];
        slots.extend((1..=columns.len()).map(|i| format!("?{i}")));
        format!(
            "INSERT INTO {table} ({}) VALUES ({})",
            targets.join(", "),
            slots.join(", ")
        )
    } else if columns.is_empty() {
        format!("INSERT INTO {table} DEFAULT VALUES")
    } else {
        let tuples: Vec<String> = (0..chunk.len())
            .map(|i| placeholder_tuple(i * columns.len() + 1, columns.len()))
            .collect();
        format!(
            "INSERT INTO {table} ({}) VALUES {}",
            column_list(columns),
            tuples.join(", ")
        )
    };

    for row in chunk {
        params.extend(row.values().map(to_sql_value));
    }

    conn.execute(&sql, libsql::params_from_iter(params))
        .await
        .map_err(|e| DatabaseError::from(e).during(format!("insert into {}", identity.table)))
}

fn vanished(identity: &TableIdentity, rowid: RowId) -> DatabaseError {
    tracing::warn!(table = %identity.table, %rowid, "row vanished before commit");
    DatabaseError::ConcurrentModification {
        table: identity.table.clone(),
        identity: rowid,
    }
}
