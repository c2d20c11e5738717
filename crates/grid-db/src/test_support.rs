//! Shared test utilities for grid-db unit tests.

#[cfg(test)]
pub(crate) mod helpers {
    use grid_core::{RowId, Value};

    use crate::GridDb;
    use crate::helpers::{from_sql_value, quote_ident};

    /// Fresh in-memory database with default settings.
    pub async fn test_db() -> GridDb {
        GridDb::open_local(":memory:").await.unwrap()
    }

    /// In-memory database with `ddl` already applied.
    pub async fn db_with(ddl: &str) -> GridDb {
        let db = test_db().await;
        db.conn().execute_batch(ddl).await.unwrap();
        db
    }

    pub async fn count_rows(db: &GridDb, table: &str) -> i64 {
        let sql = format!("SELECT COUNT(*) FROM {}", quote_ident(table));
        let mut rows = db.conn().query(&sql, ()).await.unwrap();
        let row = rows.next().await.unwrap().unwrap();
        row.get::<i64>(0).unwrap()
    }

    /// Read one cell by rowid-alias identity.
    pub async fn cell(db: &GridDb, table: &str, identity: RowId, column: &str) -> Value {
        let sql = format!(
            "SELECT {} FROM {} WHERE rowid = ?1",
            quote_ident(column),
            quote_ident(table)
        );
        let mut rows = db.conn().query(&sql, [identity.get()]).await.unwrap();
        let row = rows.next().await.unwrap().unwrap();
        from_sql_value(row.get_value(0).unwrap())
    }
}
