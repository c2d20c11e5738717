use clap::Parser;

pub mod global;
pub mod root_commands;

pub use global::{GlobalFlags, OutputFormat};
pub use root_commands::Commands;

/// Top-level CLI parser for the `gridline` binary.
#[derive(Debug, Parser)]
#[command(
    name = "gridline",
    version,
    about = "gridline - edit SQLite tables as grids and save only what changed"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Database file (overrides `database.path` from config)
    #[arg(short, long, global = true)]
    pub database: Option<String>,

    /// Output format: json, table, raw
    #[arg(short, long, global = true, default_value = "json")]
    pub format: OutputFormat,

    /// Max rows to display in table output
    #[arg(short, long, global = true)]
    pub limit: Option<u32>,

    /// Quiet mode (suppress non-essential output)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Verbose mode (debug logging)
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

impl Cli {
    /// Extract ergonomic global flags struct for command handlers.
    #[must_use]
    pub fn global_flags(&self) -> GlobalFlags {
        GlobalFlags {
            format: self.format,
            limit: self.limit,
            quiet: self.quiet,
            verbose: self.verbose,
            database: self.database.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use clap::{CommandFactory, Parser};
    use pretty_assertions::assert_eq;

    use super::root_commands::SchemaType;
    use super::{Cli, Commands, GlobalFlags, OutputFormat};

    #[test]
    fn clap_command_tree_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn global_flags_parse_before_subcommand() {
        let cli = Cli::try_parse_from([
            "gridline",
            "--format",
            "table",
            "--limit",
            "10",
            "--verbose",
            "tables",
        ])
        .expect("cli should parse");

        assert_eq!(cli.format, OutputFormat::Table);
        assert_eq!(cli.limit, Some(10));
        assert!(cli.verbose);
        assert!(matches!(cli.command, Commands::Tables));
    }

    #[test]
    fn global_flags_parse_after_subcommand() {
        let cli = Cli::try_parse_from(["gridline", "tables", "--format", "raw", "--quiet"])
            .expect("cli should parse");

        assert_eq!(cli.format, OutputFormat::Raw);
        assert!(cli.quiet);
    }

    #[test]
    fn output_format_rejects_invalid_value() {
        let parsed = Cli::try_parse_from(["gridline", "--format", "xml", "tables"]);
        assert!(parsed.is_err());
    }

    #[test]
    fn save_takes_table_and_file() {
        let cli = Cli::try_parse_from(["gridline", "-d", "app.db", "save", "people", "edits.json"])
            .expect("cli should parse");

        assert_eq!(cli.database.as_deref(), Some("app.db"));
        match cli.command {
            Commands::Save(args) => {
                assert_eq!(args.table, "people");
                assert_eq!(args.session, PathBuf::from("edits.json"));
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn import_overrides_are_optional() {
        let cli = Cli::try_parse_from(["gridline", "import", "batch.json"]).expect("cli should parse");
        match cli.command {
            Commands::Import(args) => {
                assert!(args.mode.is_none());
                assert!(args.table.is_none());
            }
            other => panic!("unexpected command {other:?}"),
        }

        let cli = Cli::try_parse_from([
            "gridline", "import", "batch.json", "--mode", "replace", "--table", "items",
        ])
        .expect("cli should parse");
        match cli.command {
            Commands::Import(args) => {
                assert_eq!(args.mode.as_deref(), Some("replace"));
                assert_eq!(args.table.as_deref(), Some("items"));
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn schema_type_is_validated() {
        let cli = Cli::try_parse_from(["gridline", "schema", "edited-view"]).expect("cli should parse");
        assert!(matches!(
            cli.command,
            Commands::Schema(ref args) if args.type_name == SchemaType::EditedView
        ));
        assert!(Cli::try_parse_from(["gridline", "schema", "task"]).is_err());
    }

    #[test]
    fn global_flags_extraction_copies_values() {
        let cli = Cli::try_parse_from(["gridline", "--database", "/tmp/demo.db", "tables"])
            .expect("cli should parse");
        let flags: GlobalFlags = cli.global_flags();
        assert_eq!(flags.database.as_deref(), Some("/tmp/demo.db"));
        assert_eq!(flags.format, OutputFormat::Json);
    }
}
