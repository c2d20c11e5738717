use anyhow::bail;
use grid_core::EditSession;

use crate::cli::GlobalFlags;
use crate::cli::root_commands::EditArgs;
use crate::commands::shared::document::read_json;
use crate::output::output;

/// Handle `gridline diff`. Needs no database: the session carries its baseline.
pub fn handle(args: &EditArgs, flags: &GlobalFlags) -> anyhow::Result<()> {
    let session = load_session(args)?;
    let changes = session.changes()?;
    output(&changes, flags.format)
}

/// The edit session written by `show`, checked against the named table.
pub fn load_session(args: &EditArgs) -> anyhow::Result<EditSession> {
    let session: EditSession = read_json(&args.session, "edit session")?;

    let table = session.baseline.table();
    if !table.eq_ignore_ascii_case(&args.table) {
        bail!(
            "{} holds an edit session of table '{table}', not '{}'",
            args.session.display(),
            args.table
        );
    }
    Ok(session)
}
