//! Loading immutable table snapshots.

use grid_core::{Cells, Row, RowId, TableSnapshot, Value};

use crate::GridDb;
use crate::error::DatabaseError;
use crate::helpers::{column_list, from_sql_value};
use crate::identity::{self, TableIdentity};

impl GridDb {
    /// Load every row of `table` as a diff baseline, ordered by identity.
    ///
    /// # Errors
    ///
    /// Returns the identity resolution errors of [`GridDb::resolve_identity`],
    /// or `DatabaseError::SchemaMismatch` if a stored identity is not an integer.
    pub async fn load_snapshot(&self, table: &str) -> Result<TableSnapshot, DatabaseError> {
        let scope = self.read().await;
        let identity = identity::resolve(&scope, table).await?;
        read_snapshot(&scope, &identity).await
    }
}

pub(crate) async fn read_snapshot(
    conn: &libsql::Connection,
    identity: &TableIdentity,
) -> Result<TableSnapshot, DatabaseError> {
    let id_sql = identity.column_sql();
    let select = if identity.columns.is_empty() {
        id_sql.clone()
    } else {
        format!("{id_sql}, {}", column_list(&identity.columns))
    };
    let sql = format!(
        "SELECT {select} FROM {} ORDER BY {id_sql}",
        identity.table_sql()
    );

    let mut rows = conn.query(&sql, ()).await?;
    let mut loaded = Vec::new();
    while let Some(row) = rows.next().await? {
        let rowid = match row.get_value(0)? {
            libsql::Value::Integer(id) => RowId(id),
            other => {
                return Err(DatabaseError::SchemaMismatch {
                    table: identity.table.clone(),
                    detail: format!("identity {} holds non-integer {other:?}", identity.column),
                });
            }
        };

        let mut cells = Cells::new();
        for (idx, column) in (1_i32..).zip(&identity.columns) {
            let value: Value = from_sql_value(row.get_value(idx)?);
            cells.insert(column.clone(), value);
        }
        loaded.push(Row::existing(rowid, cells));
    }

    tracing::debug!(table = %identity.table, rows = loaded.len(), "loaded snapshot");
    Ok(TableSnapshot::new(
        identity.table.clone(),
        identity.column.clone(),
        identity.columns.clone(),
        loaded,
    )?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::helpers::db_with;
    use pretty_assertions::assert_eq;

    #[tokio::test]
    async fn snapshot_of_integer_key_table() {
        let db = db_with(
            "CREATE TABLE people (id INTEGER PRIMARY KEY, name TEXT, age INTEGER);
             INSERT INTO people (id, name, age) VALUES (2, 'Bo', 40), (1, 'Ann', 30);",
        )
        .await;

        let snapshot = db.load_snapshot("people").await.unwrap();
        assert_eq!(snapshot.identity_column(), "id");
        assert_eq!(snapshot.columns(), ["name".to_string(), "age".to_string()]);

        let ids: Vec<RowId> = snapshot.rows().iter().filter_map(|r| r.identity).collect();
        assert_eq!(ids, vec![RowId(1), RowId(2)]);
        assert_eq!(
            snapshot.row(RowId(1)).unwrap().get("name"),
            Some(&Value::from("Ann"))
        );
    }

    #[tokio::test]
    async fn snapshot_keeps_storage_types() {
        let db = db_with(
            "CREATE TABLE mixed (a, b, c, d);
             INSERT INTO mixed VALUES (1, 2.5, 'x', x'00ff'), (NULL, NULL, NULL, NULL);",
        )
        .await;

        let snapshot = db.load_snapshot("mixed").await.unwrap();
        let first = &snapshot.rows()[0];
        assert_eq!(first.get("a"), Some(&Value::Integer(1)));
        assert_eq!(first.get("b"), Some(&Value::Real(2.5)));
        assert_eq!(first.get("c"), Some(&Value::from("x")));
        assert_eq!(first.get("d"), Some(&Value::Blob(vec![0x00, 0xff])));
        assert!(snapshot.rows()[1].cells.values().all(Value::is_null));
    }

    #[tokio::test]
    async fn snapshot_of_key_only_table() {
        let db = db_with(
            "CREATE TABLE seq (id INTEGER PRIMARY KEY);
             INSERT INTO seq DEFAULT VALUES; INSERT INTO seq DEFAULT VALUES;",
        )
        .await;

        let snapshot = db.load_snapshot("seq").await.unwrap();
        assert!(snapshot.columns().is_empty());
        assert_eq!(snapshot.len(), 2);
    }

    #[tokio::test]
    async fn empty_table_snapshot() {
        let db = db_with("CREATE TABLE t (v TEXT)").await;
        let snapshot = db.load_snapshot("t").await.unwrap();
        assert!(snapshot.is_empty());
        assert_eq!(snapshot.identity_column(), "rowid");
    }
}
