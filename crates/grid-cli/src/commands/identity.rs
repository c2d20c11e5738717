use crate::cli::GlobalFlags;
use crate::cli::root_commands::TableArgs;
use crate::context::AppContext;
use crate::output::output;

/// Handle `gridline identity`.
pub async fn handle(args: &TableArgs, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    let identity = ctx.db.resolve_identity(&args.table).await?;
    output(&identity, flags.format)
}
