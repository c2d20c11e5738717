use grid_db::executor::SqlOutcome;

use crate::cli::root_commands::SqlArgs;
use crate::cli::{GlobalFlags, OutputFormat};
use crate::context::AppContext;
use crate::output::{output, output_grid};

/// Handle `gridline sql`.
pub async fn handle(args: &SqlArgs, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    let outcome = ctx.db.execute_sql(&args.query).await?;

    match (&outcome, flags.format) {
        (SqlOutcome::Rows { columns, rows }, OutputFormat::Table) => {
            let limit = ctx.display_limit(flags);
            let cells = rows
                .iter()
                .take(limit)
                .map(|row| row.iter().map(ToString::to_string).collect())
                .collect::<Vec<Vec<String>>>();
            output_grid(columns, &cells);
            if rows.len() > limit && !flags.quiet {
                eprintln!("(showing {limit} of {} rows)", rows.len());
            }
            Ok(())
        }
        _ => output(&outcome, flags.format),
    }
}
