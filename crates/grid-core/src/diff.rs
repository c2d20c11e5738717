//! Snapshot differ.
//!
//! Compares a baseline [`TableSnapshot`] with the [`EditedView`] derived from it
//! and produces the [`ChangeSet`] that reconciles the two, keyed by identity:
//!
//! - rows without an identity become inserts, in view order
//! - rows whose cells differ from the baseline become updates carrying only
//!   the changed columns
//! - baseline identities missing from the view become deletes

use std::collections::{BTreeSet, HashMap, HashSet};

use crate::changeset::{ChangeSet, RowUpdate};
use crate::errors::CoreError;
use crate::row::{Cells, Row, RowId};
use crate::snapshot::{EditedView, TableSnapshot};

/// Diff an edited view against its baseline snapshot.
///
/// # Errors
///
/// - `CoreError::SchemaMismatch` if the view's columns, or any row's cells,
///   differ from the snapshot's declared columns.
/// - `CoreError::DuplicateIdentity` if an identity appears twice in the view.
/// - `CoreError::UnknownIdentity` if the view carries an identity the snapshot
///   never had.
pub fn diff(original: &TableSnapshot, edited: &EditedView) -> Result<ChangeSet, CoreError> {
    let table = original.table();
    let columns = original.columns();

    if !same_column_set(columns, &edited.columns) {
        return Err(CoreError::schema(
            table,
            format!(
                "edited columns {:?} do not match snapshot columns {columns:?}",
                edited.columns
            ),
        ));
    }

    let baseline: HashMap<RowId, &Row> = original
        .rows()
        .iter()
        .filter_map(|row| row.identity.map(|id| (id, row)))
        .collect();

    let mut live = HashSet::with_capacity(edited.rows.len());
    let mut change_set = ChangeSet::default();

    for (position, row) in edited.rows.iter().enumerate() {
        if !row.has_columns(columns) {
            let found: Vec<&String> = row.cells.keys().collect();
            return Err(CoreError::schema(
                table,
                format!("edited row {position} has columns {found:?}, expected {columns:?}"),
            ));
        }

        let Some(identity) = row.identity else {
            change_set.inserted.push(row.cells.clone());
            continue;
        };

        if !live.insert(identity) {
            return Err(CoreError::DuplicateIdentity {
                table: table.to_string(),
                identity,
            });
        }

        let before = baseline
            .get(&identity)
            .ok_or_else(|| CoreError::UnknownIdentity {
                table: table.to_string(),
                identity,
            })?;

        let changes = changed_cells(&before.cells, &row.cells);
        if !changes.is_empty() {
            change_set.updated.push(RowUpdate {
                rowid: identity,
                changes,
            });
        }
    }

    change_set.updated.sort_by_key(|u| u.rowid);
    change_set.deleted = baseline
        .keys()
        .filter(|id| !live.contains(*id))
        .copied()
        .collect::<BTreeSet<_>>();

    Ok(change_set)
}

fn same_column_set(a: &[String], b: &[String]) -> bool {
    let a: BTreeSet<&String> = a.iter().collect();
    let b: BTreeSet<&String> = b.iter().collect();
    a == b
}

/// Cells of `after` whose value differs from `before`.
fn changed_cells(before: &Cells, after: &Cells) -> Cells {
    after
        .iter()
        .filter(|(column, value)| before.get(column.as_str()) != Some(*value))
        .map(|(column, value)| (column.clone(), value.clone()))
        .collect()
}
