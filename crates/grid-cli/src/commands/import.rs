use grid_core::{ImportBatch, MergeMode};

use crate::cli::GlobalFlags;
use crate::cli::root_commands::ImportArgs;
use crate::commands::shared::document::read_json;
use crate::commands::shared::parse::parse_enum;
use crate::context::AppContext;
use crate::output::output;

/// Handle `gridline import`.
pub async fn handle(args: &ImportArgs, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    let mut batch: ImportBatch = read_json(&args.batch, "import batch")?;
    if let Some(mode) = &args.mode {
        batch.mode = parse_enum::<MergeMode>(mode, "mode")?;
    }
    if let Some(table) = &args.table {
        batch.table.clone_from(table);
    }

    let result = ctx.db.merge_import(&batch).await?;
    if !flags.quiet {
        eprintln!(
            "Imported {} rows into {} ({}): {result}",
            batch.rows.len(),
            batch.table,
            batch.mode
        );
    }
    output(&result, flags.format)
}
