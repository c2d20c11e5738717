use grid_core::{Row, TableSnapshot};

/// Header and text cells for a snapshot, identity column first.
pub fn snapshot_grid(snapshot: &TableSnapshot, limit: usize) -> (Vec<String>, Vec<Vec<String>>) {
    let mut headers = Vec::with_capacity(snapshot.columns().len() + 1);
    headers.push(snapshot.identity_column().to_string());
    headers.extend(snapshot.columns().iter().cloned());

    let rows = snapshot
        .rows()
        .iter()
        .take(limit)
        .map(|row| row_cells(row, snapshot.columns()))
        .collect();
    (headers, rows)
}

fn row_cells(row: &Row, columns: &[String]) -> Vec<String> {
    let mut cells = Vec::with_capacity(columns.len() + 1);
    cells.push(row.identity.map_or_else(String::new, |id| id.to_string()));
    cells.extend(
        columns
            .iter()
            .map(|column| row.get(column).map_or_else(String::new, ToString::to_string)),
    );
    cells
}
