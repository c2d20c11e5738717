//! Identity resolution: which column addresses a row stably across edits.

use serde::Serialize;
use std::fmt;

use crate::GridDb;
use crate::error::DatabaseError;
use crate::helpers::quote_ident;

/// Hidden rowid aliases, tried in order when no integer primary key exists.
const ROWID_ALIASES: [&str; 3] = ["rowid", "_rowid_", "oid"];

/// How a table's identity is provided by the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IdentityKind {
    /// Native rowid, read through one of its hidden aliases.
    Rowid,
    /// Declared `INTEGER PRIMARY KEY`, which aliases the rowid.
    IntegerPrimaryKey,
    /// Single `INTEGER` key of a `WITHOUT ROWID` table; new keys are
    /// synthesized as one past the current maximum.
    WithoutRowidKey,
}

impl IdentityKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Rowid => "rowid",
            Self::IntegerPrimaryKey => "integer_primary_key",
            Self::WithoutRowidKey => "without_rowid_key",
        }
    }
}

impl fmt::Display for IdentityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Resolved identity of a table plus its editable columns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableIdentity {
    /// Table name as spelled in the schema.
    pub table: String,
    /// Column holding the identity.
    pub column: String,
    pub kind: IdentityKind,
    /// Declared columns in table order, without the identity column.
    pub columns: Vec<String>,
}

impl TableIdentity {
    /// The identity column as it appears in SQL text.
    ///
    /// Hidden rowid aliases stay bare so they can never resolve to a string literal.
    #[must_use]
    pub fn column_sql(&self) -> String {
        match self.kind {
            IdentityKind::Rowid => self.column.clone(),
            IdentityKind::IntegerPrimaryKey | IdentityKind::WithoutRowidKey => {
                quote_ident(&self.column)
            }
        }
    }

    #[must_use]
    pub fn table_sql(&self) -> String {
        quote_ident(&self.table)
    }

    fn unsupported(&self, reason: impl Into<String>) -> DatabaseError {
        DatabaseError::UnsupportedTableKind {
            table: self.table.clone(),
            reason: reason.into(),
        }
    }
}

struct DeclaredColumn {
    name: String,
    decl_type: String,
    pk: i64,
}

impl GridDb {
    /// Resolve the identity column and editable columns of `table`.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::TableNotFound` if no such table exists and
    /// `DatabaseError::UnsupportedTableKind` for views and tables without a
    /// usable identity.
    pub async fn resolve_identity(&self, table: &str) -> Result<TableIdentity, DatabaseError> {
        let scope = self.read().await;
        resolve(&scope, table).await
    }
}

/// Resolve on an already-held connection (inside a transaction or read scope).
pub(crate) async fn resolve(
    conn: &libsql::Connection,
    table: &str,
) -> Result<TableIdentity, DatabaseError> {
    let mut rows = conn
        .query(
            "SELECT type, name, sql FROM sqlite_master \
             WHERE name = ?1 COLLATE NOCASE AND type IN ('table', 'view')",
            [table],
        )
        .await?;
    let row = rows
        .next()
        .await?
        .ok_or_else(|| DatabaseError::TableNotFound(table.to_string()))?;
    let kind: String = row.get(0)?;
    let name: String = row.get(1)?;
    let sql: Option<String> = row.get(2)?;

    if kind == "view" {
        return Err(DatabaseError::UnsupportedTableKind {
            table: name,
            reason: "views have no row identity".into(),
        });
    }

    let declared = declared_columns(conn, &name).await?;
    let without_rowid = sql.as_deref().is_some_and(is_without_rowid);

    let mut identity = TableIdentity {
        table: name,
        column: String::new(),
        kind: IdentityKind::Rowid,
        columns: Vec::with_capacity(declared.len()),
    };

    let key_columns: Vec<&DeclaredColumn> = declared.iter().filter(|c| c.pk > 0).collect();
    let mut integer_key = match key_columns.as_slice() {
        [only] if only.decl_type.eq_ignore_ascii_case("INTEGER") => Some(only.name.clone()),
        _ => None,
    };
    // `INTEGER PRIMARY KEY DESC` keeps a separate key index and does not alias the rowid.
    if integer_key.is_some() && !without_rowid && has_key_index(conn, &identity.table).await? {
        integer_key = None;
    }

    match (integer_key, without_rowid) {
        (Some(key), false) => {
            identity.column = key;
            identity.kind = IdentityKind::IntegerPrimaryKey;
        }
        (Some(key), true) => {
            identity.column = key;
            identity.kind = IdentityKind::WithoutRowidKey;
        }
        (None, true) => {
            return Err(identity.unsupported(
                "WITHOUT ROWID tables need a single INTEGER primary key",
            ));
        }
        (None, false) => {
            let alias = ROWID_ALIASES
                .iter()
                .find(|alias| !declared.iter().any(|c| c.name.eq_ignore_ascii_case(alias)))
                .ok_or_else(|| {
                    identity.unsupported("columns shadow every rowid alias (rowid, _rowid_, oid)")
                })?;
            identity.column = (*alias).to_string();
        }
    }

    identity.columns = declared
        .into_iter()
        .map(|c| c.name)
        .filter(|name| *name != identity.column)
        .collect();

    tracing::debug!(
        table = %identity.table,
        column = %identity.column,
        kind = %identity.kind,
        "resolved identity"
    );
    Ok(identity)
}

async fn declared_columns(
    conn: &libsql::Connection,
    table: &str,
) -> Result<Vec<DeclaredColumn>, DatabaseError> {
    let mut rows = conn
        .query(
            "SELECT name, type, pk FROM pragma_table_info(?1) ORDER BY cid",
            [table],
        )
        .await?;

    let mut columns = Vec::new();
    while let Some(row) = rows.next().await? {
        columns.push(DeclaredColumn {
            name: row.get(0)?,
            decl_type: row.get::<Option<String>>(1)?.unwrap_or_default(),
            pk: row.get(2)?,
        });
    }
    Ok(columns)
}

async fn has_key_index(conn: &libsql::Connection, table: &str) -> Result<bool, DatabaseError> {
    let mut rows = conn
        .query(
            "SELECT 1 FROM pragma_index_list(?1) WHERE origin = 'pk'",
            [table],
        )
        .await?;
    Ok(rows.next().await?.is_some())
}

/// Table options follow the closing parenthesis of the column list.
fn is_without_rowid(create_sql: &str) -> bool {
    let Some((_, options)) = create_sql.rsplit_once(')') else {
        return false;
    };
    let words: Vec<String> = options
        .split(|c: char| c.is_whitespace() || c == ',')
        .filter(|w| !w.is_empty())
        .map(str::to_ascii_uppercase)
        .collect();
    words.windows(2).any(|pair| pair[0] == "WITHOUT" && pair[1] == "ROWID")
}
