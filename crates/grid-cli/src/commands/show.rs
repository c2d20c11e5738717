use grid_core::EditSession;

use crate::cli::root_commands::TableArgs;
use crate::cli::{GlobalFlags, OutputFormat};
use crate::commands::shared::grid::snapshot_grid;
use crate::context::AppContext;
use crate::output::{output, output_grid};

/// Handle `gridline show`.
///
/// JSON output is a complete edit session: the loaded rows as the baseline
/// plus an editable copy under `edited`, ready for `diff` or `save`. Only
/// table output honors the row limit.
pub async fn handle(args: &TableArgs, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    let snapshot = ctx.db.load_snapshot(&args.table).await?;

    if flags.format != OutputFormat::Table {
        return output(&EditSession::start(snapshot), flags.format);
    }

    let limit = ctx.display_limit(flags);
    let (headers, rows) = snapshot_grid(&snapshot, limit);
    output_grid(&headers, &rows);
    if snapshot.len() > limit && !flags.quiet {
        eprintln!("(showing {limit} of {} rows)", snapshot.len());
    }
    Ok(())
}
