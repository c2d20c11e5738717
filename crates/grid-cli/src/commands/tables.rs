use crate::cli::GlobalFlags;
use crate::context::AppContext;
use crate::output::output;

/// Handle `gridline tables`.
pub async fn handle(ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    let tables = ctx.db.list_tables().await?;
    output(&tables, flags.format)
}
