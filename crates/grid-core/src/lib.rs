//! # grid-core
//!
//! Row model, snapshot differ, and import planning for gridline.
//!
//! This crate holds everything that does not need a database handle:
//! - Typed scalar values and rows keyed by a store-assigned identity
//! - Immutable table snapshots and the freely edited views derived from them
//! - Change sets (insert/update/delete) and commit summaries
//! - The snapshot differ that turns an edited view into a change set
//! - Import batches and the schema check that plans them into a change set
//! - Core error types shared with `grid-db`

pub mod changeset;
pub mod diff;
pub mod errors;
pub mod import;
pub mod row;
pub mod snapshot;
pub mod value;

pub use changeset::{ChangeSet, CommitResult, RowUpdate};
pub use diff::diff;
pub use errors::CoreError;
pub use import::{ImportBatch, MergeMode};
pub use row::{Cells, Row, RowId, cells};
pub use snapshot::{EditSession, EditedView, TableSnapshot};
pub use value::Value;
