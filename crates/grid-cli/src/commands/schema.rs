use grid_core::{ChangeSet, CommitResult, EditSession, EditedView, ImportBatch};
use schemars::schema_for;

use crate::cli::GlobalFlags;
use crate::cli::root_commands::{SchemaArgs, SchemaType};
use crate::output::output;

/// Handle `gridline schema`.
pub fn handle(args: &SchemaArgs, flags: &GlobalFlags) -> anyhow::Result<()> {
    output(&schema_json(args.type_name)?, flags.format)
}

fn schema_json(type_name: SchemaType) -> anyhow::Result<serde_json::Value> {
    let schema = match type_name {
        SchemaType::EditSession => schema_for!(EditSession),
        SchemaType::EditedView => schema_for!(EditedView),
        SchemaType::ImportBatch => schema_for!(ImportBatch),
        SchemaType::ChangeSet => schema_for!(ChangeSet),
        SchemaType::CommitResult => schema_for!(CommitResult),
    };
    Ok(serde_json::to_value(schema)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_document_type_has_an_object_schema() {
        for type_name in [
            SchemaType::EditSession,
            SchemaType::EditedView,
            SchemaType::ImportBatch,
            SchemaType::ChangeSet,
            SchemaType::CommitResult,
        ] {
            let schema = schema_json(type_name).unwrap();
            assert_eq!(schema["type"], "object", "{type_name:?}");
        }
    }

    #[test]
    fn import_batch_schema_lists_mode_values() {
        let schema = schema_json(SchemaType::ImportBatch).unwrap();
        let text = schema.to_string();
        assert!(text.contains("append"));
        assert!(text.contains("replace"));
    }
}
