//! Raw SQL pass-through.

use grid_core::Value;
use serde::Serialize;

use crate::GridDb;
use crate::error::DatabaseError;
use crate::helpers::row_values;

/// Result of one raw statement.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SqlOutcome {
    /// The statement produced a result set.
    Rows {
        columns: Vec<String>,
        rows: Vec<Vec<Value>>,
    },
    /// The statement changed data (or schema) and reported a row count.
    Affected { rows: u64 },
}

impl GridDb {
    /// Run a single SQL statement.
    ///
    /// Statements that return columns run as queries under auto-commit; all
    /// others run inside their own transaction.
    ///
    /// # Errors
    ///
    /// Returns `SyntaxError` for empty, malformed or multi-statement input,
    /// and `ConstraintViolation`/`StorageFault` from execution.
    pub async fn execute_sql(&self, sql: &str) -> Result<SqlOutcome, DatabaseError> {
        let (sql, rest) = split_first_statement(sql.trim());
        if only_trivia(sql) {
            return Err(DatabaseError::SyntaxError("empty statement".into()));
        }
        if !only_trivia(rest) {
            return Err(DatabaseError::SyntaxError(
                "multiple statements; run them one at a time".into(),
            ));
        }

        {
            let scope = self.read().await;
            let mut stmt = scope.prepare(sql).await?;
            if stmt.column_count() > 0 {
                let mut rows = stmt.query(()).await?;
                let width = rows.column_count();
                let columns = (0..width)
                    .map(|idx| rows.column_name(idx).unwrap_or_default().to_string())
                    .collect();

                let mut values = Vec::new();
                while let Some(row) = rows.next().await? {
                    values.push(row_values(&row, width)?);
                }
                tracing::debug!(rows = values.len(), "query returned rows");
                return Ok(SqlOutcome::Rows {
                    columns,
                    rows: values,
                });
            }
        }

        let tx = self.begin().await?;
        let outcome = tx
            .execute(sql, ())
            .await
            .map_err(|e| DatabaseError::from(e).during("sql statement"));
        let affected = tx.settle(outcome).await?;
        tracing::debug!(rows = affected, "statement applied");
        Ok(SqlOutcome::Affected { rows: affected })
    }
}

/// Split after the first top-level `;`.
///
/// Quotes, bracketed identifiers and comments are skipped. Inside
/// `CREATE TRIGGER` only a `;` directly after `END` closes the statement.
fn split_first_statement(sql: &str) -> (&str, &str) {
    let bytes = sql.as_bytes();
    let mut leading: Vec<String> = Vec::with_capacity(3);
    let mut after_end = false;
    let mut i = 0;

    while i < bytes.len() {
        match bytes[i] {
            quote @ (b'\'' | b'"' | b'`') => {
                i = skip_past(bytes, i + 1, quote);
                after_end = false;
            }
            b'[' => {
                i = skip_past(bytes, i + 1, b']');
                after_end = false;
            }
            b'-' if bytes.get(i + 1) == Some(&b'-') => {
                i = skip_past(bytes, i + 2, b'\n');
            }
            b'/' if bytes.get(i + 1) == Some(&b'*') => {
                i = sql[i + 2..].find("*/").map_or(bytes.len(), |at| i + 2 + at + 2);
            }
            b';' => {
                if after_end || !is_trigger(&leading) {
                    return sql.split_at(i + 1);
                }
                i += 1;
            }
            b if is_word_byte(b) => {
                let start = i;
                while i < bytes.len() && is_word_byte(bytes[i]) {
                    i += 1;
                }
                let word = &sql[start..i];
                after_end = word.eq_ignore_ascii_case("END");
                if leading.len() < 3 {
                    leading.push(word.to_ascii_uppercase());
                }
            }
            b if b.is_ascii_whitespace() => i += 1,
            _ => {
                after_end = false;
                i += 1;
            }
        }
    }
    (sql, "")
}

const fn is_word_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_' || b >= 0x80
}

/// Index just past the next `close` at or after `from`, or the end of input.
fn skip_past(bytes: &[u8], from: usize, close: u8) -> usize {
    bytes
        .get(from..)
        .and_then(|rest| rest.iter().position(|&b| b == close))
        .map_or(bytes.len(), |at| from + at + 1)
}

fn is_trigger(leading: &[String]) -> bool {
    match leading {
        [create, trigger, ..] if create == "CREATE" && trigger == "TRIGGER" => true,
        [create, temp, trigger] => {
            create == "CREATE" && (temp == "TEMP" || temp == "TEMPORARY") && trigger == "TRIGGER"
        }
        _ => false,
    }
}

/// Whitespace, stray semicolons and comments only.
fn only_trivia(mut sql: &str) -> bool {
    loop {
        sql = sql.trim_start_matches(|c: char| c.is_whitespace() || c == ';');
        if let Some(after) = sql.strip_prefix("--") {
            sql = after.split_once('\n').map_or("", |(_, rest)| rest);
        } else if let Some(after) = sql.strip_prefix("/*") {
            sql = after.split_once("*/").map_or("", |(_, rest)| rest);
        } else {
            return sql.is_empty();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::helpers::{count_rows, db_with, test_db};
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[rstest]
    #[case("SELECT 1", "SELECT 1", "")]
    #[case("SELECT 1; SELECT 2", "SELECT 1;", " SELECT 2")]
    #[case("SELECT 'a;b'; -- done", "SELECT 'a;b';", " -- done")]
    #[case("SELECT \"x;\" FROM [t;] /* ; */", "SELECT \"x;\" FROM [t;] /* ; */", "")]
    #[case(
        "CREATE TRIGGER tr AFTER INSERT ON t BEGIN DELETE FROM u; END; SELECT 1",
        "CREATE TRIGGER tr AFTER INSERT ON t BEGIN DELETE FROM u; END;",
        " SELECT 1"
    )]
    #[case(
        "create temp trigger tr after insert on t begin select 1; end",
        "create temp trigger tr after insert on t begin select 1; end",
        ""
    )]
    fn splits_after_first_statement(#[case] sql: &str, #[case] first: &str, #[case] rest: &str) {
        assert_eq!(split_first_statement(sql), (first, rest));
    }

    #[tokio::test]
    async fn multiple_statements_are_rejected_before_running() {
        let db = db_with("CREATE TABLE a (v INTEGER); CREATE TABLE b (v INTEGER);").await;

        let err = db
            .execute_sql("INSERT INTO a VALUES (1); INSERT INTO b VALUES (2)")
            .await
            .unwrap_err();
        assert!(matches!(err, DatabaseError::SyntaxError(_)), "{err:?}");
        assert_eq!(count_rows(&db, "a").await, 0);
        assert_eq!(count_rows(&db, "b").await, 0);

        let outcome = db.execute_sql("INSERT INTO a VALUES (1);; -- trailing note").await.unwrap();
        assert_eq!(outcome, SqlOutcome::Affected { rows: 1 });
    }

    #[tokio::test]
    async fn trigger_bodies_run_as_one_statement() {
        let db = db_with("CREATE TABLE t (v INTEGER); CREATE TABLE log (v INTEGER);").await;
        db.execute_sql(
            "CREATE TRIGGER t_log AFTER INSERT ON t BEGIN INSERT INTO log VALUES (new.v); END;",
        )
        .await
        .unwrap();

        db.execute_sql("INSERT INTO t VALUES (7)").await.unwrap();
        assert_eq!(count_rows(&db, "log").await, 1);
    }

    #[tokio::test]
    async fn select_returns_rows() {
        let db = db_with(
            "CREATE TABLE t (a INTEGER, b TEXT);
             INSERT INTO t VALUES (1, 'x'), (2, NULL);",
        )
        .await;

        let outcome = db.execute_sql("SELECT a, b AS bee FROM t ORDER BY a").await.unwrap();
        assert_eq!(
            outcome,
            SqlOutcome::Rows {
                columns: vec!["a".into(), "bee".into()],
                rows: vec![
                    vec![Value::Integer(1), Value::from("x")],
                    vec![Value::Integer(2), Value::Null],
                ],
            }
        );
    }

    #[tokio::test]
    async fn mutation_reports_affected_rows() {
        let db = db_with(
            "CREATE TABLE t (a INTEGER);
             INSERT INTO t VALUES (1), (2), (3);",
        )
        .await;

        let outcome = db.execute_sql("DELETE FROM t WHERE a > 1;").await.unwrap();
        assert_eq!(outcome, SqlOutcome::Affected { rows: 2 });
        assert_eq!(count_rows(&db, "t").await, 1);
    }

    #[tokio::test]
    async fn ddl_runs_in_a_transaction() {
        let db = test_db().await;
        let outcome = db.execute_sql("CREATE TABLE fresh (v TEXT)").await.unwrap();
        assert_eq!(outcome, SqlOutcome::Affected { rows: 0 });
        assert_eq!(db.list_tables().await.unwrap(), vec!["fresh".to_string()]);
    }

    #[tokio::test]
    async fn malformed_sql_is_a_syntax_error() {
        let db = test_db().await;
        for sql in ["SELEC 1", "SELECT * FROM missing", "   ", ";"] {
            let err = db.execute_sql(sql).await.unwrap_err();
            assert!(matches!(err, DatabaseError::SyntaxError(_)), "{sql}: {err:?}");
        }
    }

    #[tokio::test]
    async fn constraint_violation_is_rolled_back() {
        let db = db_with(
            "CREATE TABLE t (a INTEGER UNIQUE);
             INSERT INTO t VALUES (1), (2);",
        )
        .await;

        let err = db.execute_sql("UPDATE t SET a = 1").await.unwrap_err();
        assert!(matches!(err, DatabaseError::ConstraintViolation { .. }));

        let outcome = db.execute_sql("SELECT a FROM t ORDER BY a").await.unwrap();
        assert_eq!(
            outcome,
            SqlOutcome::Rows {
                columns: vec!["a".into()],
                rows: vec![vec![Value::Integer(1)], vec![Value::Integer(2)]],
            }
        );
    }
}
