//! Serde roundtrip and JsonSchema validation for the JSON documents the CLI
//! reads and writes (edit sessions, edited views, import batches, change sets,
//! commit results).

use std::collections::BTreeSet;

use grid_core::{
    ChangeSet, CommitResult, EditSession, EditedView, ImportBatch, MergeMode, Row, RowId,
    RowUpdate, TableSnapshot, Value, cells,
};
use schemars::schema_for;

/// Validate a JSON value against a schemars-generated schema.
fn validate_against_schema(
    schema: &serde_json::Value,
    instance: &serde_json::Value,
) -> Vec<String> {
    let validator = jsonschema::validator_for(schema).expect("schema should be valid");
    validator
        .iter_errors(instance)
        .map(|e| format!("{e}"))
        .collect()
}

macro_rules! roundtrip_and_validate {
    ($name:ident, $ty:ty, $instance:expr) => {
        #[test]
        fn $name() {
            let val: $ty = $instance;

            let json_str = serde_json::to_string_pretty(&val).unwrap();
            let recovered: $ty = serde_json::from_str(&json_str).unwrap();
            assert_eq!(
                recovered,
                val,
                "serde roundtrip failed for {}",
                stringify!($ty)
            );

            let schema = serde_json::to_value(schema_for!($ty)).unwrap();
            let instance = serde_json::to_value(&val).unwrap();
            let errors = validate_against_schema(&schema, &instance);
            assert!(
                errors.is_empty(),
                "Schema validation failed for {}: {:?}",
                stringify!($ty),
                errors
            );
        }
    };
}

roundtrip_and_validate!(
    edited_view_roundtrip,
    EditedView,
    EditedView {
        table: "people".into(),
        columns: vec!["name".into(), "age".into(), "photo".into()],
        rows: vec![
            Row::existing(
                RowId(1),
                cells([
                    ("name", Value::from("Ann")),
                    ("age", Value::Integer(31)),
                    ("photo", Value::Null),
                ]),
            ),
            Row::pending(cells([
                ("name", Value::from("Cid")),
                ("age", Value::Real(22.5)),
                ("photo", Value::Blob(vec![0xff, 0x00])),
            ])),
        ],
    }
);

roundtrip_and_validate!(
    edit_session_roundtrip,
    EditSession,
    {
        let baseline = TableSnapshot::new(
            "people",
            "id",
            vec!["name".into(), "age".into()],
            vec![
                Row::existing(RowId(1), cells([("name", Value::from("Ann")), ("age", Value::Integer(30))])),
                Row::existing(RowId(2), cells([("name", Value::from("Bo")), ("age", Value::Null)])),
            ],
        )
        .unwrap();
        let mut session = EditSession::start(baseline);
        session.edited.set(RowId(1), "age", 31_i64);
        session.edited.remove(RowId(2));
        session
    }
);

roundtrip_and_validate!(
    import_batch_roundtrip,
    ImportBatch,
    ImportBatch {
        table: "items".into(),
        columns: vec!["name".into(), "qty".into()],
        rows: vec![
            vec![Value::from("X"), Value::Integer(1)],
            vec![Value::from("Y"), Value::Null],
        ],
        mode: MergeMode::Replace,
    }
);

roundtrip_and_validate!(
    change_set_roundtrip,
    ChangeSet,
    ChangeSet {
        inserted: vec![cells([("name", Value::from("Cid")), ("age", Value::Integer(22))])],
        updated: vec![RowUpdate {
            rowid: RowId(1),
            changes: cells([("age", 31_i64)]),
        }],
        deleted: BTreeSet::from([RowId(2)]),
    }
);

roundtrip_and_validate!(
    commit_result_roundtrip,
    CommitResult,
    CommitResult {
        inserted: 1,
        updated: 1,
        deleted: 1,
    }
);

#[test]
fn hand_written_edited_view_parses() {
    let json = r#"{
        "table": "people",
        "columns": ["name", "age"],
        "rows": [
            {"rowid": 1, "cells": {"name": "Ann", "age": 31}},
            {"cells": {"name": "Cid", "age": 22}}
        ]
    }"#;
    let view: EditedView = serde_json::from_str(json).unwrap();
    assert_eq!(view.rows.len(), 2);
    assert_eq!(view.rows[0].identity, Some(RowId(1)));
    assert!(view.rows[1].is_pending());
}
