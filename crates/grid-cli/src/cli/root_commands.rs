use std::path::PathBuf;

use clap::{Args, Subcommand, ValueEnum};

/// Top-level command tree.
#[derive(Clone, Debug, Subcommand)]
pub enum Commands {
    /// List user tables.
    Tables,
    /// Print a table's rows with their identities.
    Show(TableArgs),
    /// Print the identity column and editable columns of a table.
    Identity(TableArgs),
    /// Print the change set of an edit session.
    Diff(EditArgs),
    /// Commit the changes of an edit session.
    Save(EditArgs),
    /// Merge an import batch into its table.
    Import(ImportArgs),
    /// Run one raw SQL statement.
    Sql(SqlArgs),
    /// Print the JSON Schema of a document type.
    Schema(SchemaArgs),
}

#[derive(Clone, Debug, Args)]
pub struct TableArgs {
    pub table: String,
}

#[derive(Clone, Debug, Args)]
pub struct EditArgs {
    pub table: String,

    /// Edit session as JSON, as written by `show` (see `gridline schema edit-session`)
    pub session: PathBuf,
}

#[derive(Clone, Debug, Args)]
pub struct ImportArgs {
    /// Import batch as JSON (see `gridline schema import-batch`)
    pub batch: PathBuf,

    /// Merge mode: append or replace (overrides the batch file)
    #[arg(long)]
    pub mode: Option<String>,

    /// Target table (overrides the batch file)
    #[arg(long)]
    pub table: Option<String>,
}

#[derive(Clone, Debug, Args)]
pub struct SqlArgs {
    /// A single statement; queries print rows, others print the affected count
    pub query: String,
}

#[derive(Clone, Debug, Args)]
pub struct SchemaArgs {
    #[arg(value_enum)]
    pub type_name: SchemaType,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
pub enum SchemaType {
    EditSession,
    EditedView,
    ImportBatch,
    ChangeSet,
    CommitResult,
}
