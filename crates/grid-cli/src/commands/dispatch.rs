use crate::cli::GlobalFlags;
use crate::cli::root_commands::Commands;
use crate::commands;
use crate::context::AppContext;

/// Dispatch a parsed command to the corresponding handler module.
pub async fn dispatch(command: Commands, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    match command {
        Commands::Tables => commands::tables::handle(ctx, flags).await,
        Commands::Show(args) => commands::show::handle(&args, ctx, flags).await,
        Commands::Identity(args) => commands::identity::handle(&args, ctx, flags).await,
        Commands::Save(args) => commands::save::handle(&args, ctx, flags).await,
        Commands::Import(args) => commands::import::handle(&args, ctx, flags).await,
        Commands::Sql(args) => commands::sql::handle(&args, ctx, flags).await,
        Commands::Schema(_) | Commands::Diff(_) => {
            unreachable!("schema and diff are pre-dispatched in main")
        }
    }
}
