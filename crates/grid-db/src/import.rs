//! Merging externally sourced batches into a table.

use grid_core::{CommitResult, ImportBatch, MergeMode};

use crate::GridDb;
use crate::commit::apply_change_set;
use crate::error::DatabaseError;
use crate::identity;

impl GridDb {
    /// Merge `batch` into its target table under the batch's [`MergeMode`].
    ///
    /// `Replace` clears the table and inserts the batch in the same
    /// transaction, so a failed import leaves the original rows intact.
    ///
    /// # Errors
    ///
    /// Returns `TableNotFound`/`UnsupportedTableKind` for an unusable target,
    /// `SchemaMismatch` before any mutation when the batch shape is wrong, and
    /// `ConstraintViolation`/`StorageFault` (rolled back) from the writes.
    pub async fn merge_import(&self, batch: &ImportBatch) -> Result<CommitResult, DatabaseError> {
        let tx = self.begin().await?;
        let outcome: Result<CommitResult, DatabaseError> = async {
            let identity = identity::resolve(&tx, &batch.table).await?;
            let changes = batch.plan(&identity.columns)?;

            let mut cleared = 0;
            if batch.mode == MergeMode::Replace {
                cleared = tx
                    .execute(&format!("DELETE FROM {}", identity.table_sql()), ())
                    .await
                    .map_err(|e| DatabaseError::from(e).during(format!("clearing {}", identity.table)))?;
            }

            let mut result = apply_change_set(&tx, &identity, &changes, self.chunk_rows()).await?;
            result.deleted = cleared;
            Ok(result)
        }
        .await;

        let result = tx.settle(outcome).await?;
        tracing::info!(
            table = %batch.table,
            mode = %batch.mode,
            rows = batch.rows.len(),
            %result,
            "merged import"
        );
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::helpers::{count_rows, db_with};
    use grid_core::Value;
    use pretty_assertions::assert_eq;

    const ITEMS: &str = "CREATE TABLE items (name TEXT NOT NULL, qty INTEGER);
         INSERT INTO items VALUES ('A', 1), ('B', 2), ('C', 3);";

    fn batch(mode: MergeMode, rows: Vec<Vec<Value>>) -> ImportBatch {
        ImportBatch {
            table: "items".into(),
            columns: vec!["name".into(), "qty".into()],
            rows,
            mode,
        }
    }

    #[tokio::test]
    async fn append_keeps_existing_rows() {
        let db = db_with(ITEMS).await;
        let result = db
            .merge_import(&batch(
                MergeMode::Append,
                vec![vec![Value::from("X"), Value::Integer(9)]],
            ))
            .await
            .unwrap();

        assert_eq!(result.inserted, 1);
        assert_eq!(result.deleted, 0);
        assert_eq!(count_rows(&db, "items").await, 4);
    }

    #[tokio::test]
    async fn replace_swaps_contents() {
        let db = db_with(ITEMS).await;
        let result = db
            .merge_import(&batch(
                MergeMode::Replace,
                vec![
                    vec![Value::from("X"), Value::Integer(1)],
                    vec![Value::from("Y"), Value::Integer(2)],
                ],
            ))
            .await
            .unwrap();

        assert_eq!(
            result,
            CommitResult {
                inserted: 2,
                updated: 0,
                deleted: 3
            }
        );
        let snapshot = db.load_snapshot("items").await.unwrap();
        let names: Vec<&Value> = snapshot.rows().iter().filter_map(|r| r.get("name")).collect();
        assert_eq!(names, vec![&Value::from("X"), &Value::from("Y")]);
    }

    #[tokio::test]
    async fn failed_replace_keeps_original_rows() {
        let db = db_with(ITEMS).await;
        let err = db
            .merge_import(&batch(
                MergeMode::Replace,
                vec![
                    vec![Value::from("X"), Value::Integer(1)],
                    vec![Value::Null, Value::Integer(2)],
                ],
            ))
            .await
            .unwrap_err();

        assert!(matches!(err, DatabaseError::ConstraintViolation { .. }));
        assert_eq!(count_rows(&db, "items").await, 3);
    }

    #[tokio::test]
    async fn shape_mismatch_fails_before_mutation() {
        let db = db_with(ITEMS).await;
        let mut bad = batch(MergeMode::Replace, vec![vec![Value::from("X")]]);
        bad.columns = vec!["name".into()];

        let err = db.merge_import(&bad).await.unwrap_err();
        assert!(matches!(err, DatabaseError::SchemaMismatch { .. }));
        assert_eq!(count_rows(&db, "items").await, 3);
    }

    #[tokio::test]
    async fn append_subset_uses_column_default() {
        let db = db_with("CREATE TABLE items (name TEXT, qty INTEGER DEFAULT 7, note TEXT)").await;
        let mut partial = batch(MergeMode::Append, vec![vec![Value::from("X")]]);
        partial.columns = vec!["NAME".into()];

        db.merge_import(&partial).await.unwrap();
        let snapshot = db.load_snapshot("items").await.unwrap();
        let row = &snapshot.rows()[0];
        assert_eq!(row.get("name"), Some(&Value::from("X")));
        assert_eq!(row.get("qty"), Some(&Value::Integer(7)));
        assert_eq!(row.get("note"), Some(&Value::Null));
    }

    #[tokio::test]
    async fn missing_target_table() {
        let db = db_with(ITEMS).await;
        let mut stray = batch(MergeMode::Append, vec![]);
        stray.table = "nowhere".into();
        let err = db.merge_import(&stray).await.unwrap_err();
        assert!(matches!(err, DatabaseError::TableNotFound(_)));
    }
}
