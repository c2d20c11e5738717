use crate::cli::GlobalFlags;
use crate::cli::root_commands::EditArgs;
use crate::commands::diff::load_session;
use crate::context::AppContext;
use crate::output::output;

/// Handle `gridline save`.
///
/// Changes are computed against the baseline captured by `show`, so rows
/// written by others since then are left alone.
pub async fn handle(args: &EditArgs, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    let session = load_session(args)?;
    let result = ctx.db.sync(&session.baseline, &session.edited).await?;
    if !flags.quiet {
        eprintln!("Saved {}: {result}", session.baseline.table());
    }
    output(&result, flags.format)
}
