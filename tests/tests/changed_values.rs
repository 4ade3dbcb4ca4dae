use pretty_assertions::assert_eq;
use serde_json::json;
use tally::{values, Change, Record, Value};
use tests::*;

#[test]
fn new_record_has_no_changes() {
    let schema = schema();
    let record = Record::new(&schema, MODEL).unwrap();

    assert!(record.changed_values().is_empty());
}

#[test]
fn every_field_kind_on_a_new_record() {
    let schema = schema();
    let mut record = Record::new(&schema, MODEL).unwrap();

    record.set("name", "foo").unwrap();
    record.set("target", target(&schema, 1)).unwrap();
    record.set("ref_target", target(&schema, 2)).unwrap();
    record
        .set("targets", vec![new_target(&schema, values! { "name" => "bar" })])
        .unwrap();

    let changes = record.changed_values();
    assert_eq!(
        changes.fields().collect::<Vec<_>>(),
        ["name", "target", "ref_target", "targets"]
    );
    assert_eq!(
        changes.to_json(),
        json!({
            "name": "foo",
            "target": 1,
            "ref_target": "test.modelview.changed_values.target,2",
            "targets": {
                "add": [
                    [0, { "name": "bar" }],
                ],
            },
        })
    );
}

#[test]
fn reference_encodes_model_and_id() {
    let schema = schema();
    let mut record = Record::new(&schema, MODEL).unwrap();
    record.set("ref_target", target(&schema, 2)).unwrap();

    let changes = record.changed_values();
    assert_eq!(
        changes.get("ref_target").and_then(Change::as_value),
        Some(&Value::from(format!("{TARGET},2")))
    );
}

#[test]
fn loaded_record_has_no_changes() {
    let schema = schema();
    let record = Record::from_values(
        &schema,
        MODEL,
        values! {
            "name" => "test",
            "target" => 1i64,
            "targets" => vec![
                values! { "id" => 1i64, "name" => "foo" },
                values! { "id" => 2i64 },
            ],
            "m2m_targets" => vec![5i64, 6, 7],
        },
    )
    .unwrap();

    assert!(record.changed_values().is_empty());
}

#[test]
fn one_to_many_update_and_remove_with_many_to_many() {
    let schema = schema();
    let mut record = Record::from_values(
        &schema,
        MODEL,
        values! {
            "name" => "test",
            "target" => 1i64,
            "targets" => vec![
                values! { "id" => 1i64, "name" => "foo" },
                values! { "id" => 2i64 },
            ],
            "m2m_targets" => vec![5i64, 6, 7],
        },
    )
    .unwrap();

    let mut first = record.sub_records("targets").unwrap()[0].clone();
    first.set("name", "bar").unwrap();
    record.set("targets", vec![first]).unwrap();
    record
        .set("m2m_targets", vec![target(&schema, 9), target(&schema, 10)])
        .unwrap();

    assert_eq!(
        record.changed_values().to_json(),
        json!({
            "targets": {
                "update": [{ "id": 1, "name": "bar" }],
                "remove": [2],
            },
            "m2m_targets": [9, 10],
        })
    );
}

#[test]
fn nested_change_survives_reassigning_same_collection() {
    let schema = schema();
    let mut record = Record::from_values(
        &schema,
        MODEL,
        values! { "targets" => vec![values! { "id" => 1i64, "name" => "foo" }] },
    )
    .unwrap();
    assert!(record.changed_values().is_empty());

    record.sub_records_mut("targets").unwrap()[0]
        .set("name", "bar")
        .unwrap();
    let targets = record.sub_records("targets").unwrap().to_vec();
    record.set("targets", targets).unwrap();

    assert_eq!(
        record.changed_values().to_json(),
        json!({
            "targets": {
                "update": [{ "id": 1, "name": "bar" }],
            },
        })
    );
}

#[test]
fn nested_change_without_reassignment() {
    let schema = schema();
    let mut record = Record::from_values(
        &schema,
        MODEL,
        values! { "targets" => vec![values! { "id" => 1i64, "name" => "foo" }] },
    )
    .unwrap();

    record.sub_records_mut("targets").unwrap()[0]
        .set("name", "bar")
        .unwrap();

    assert_eq!(
        record.changed_values().to_json(),
        json!({ "targets": { "update": [{ "id": 1, "name": "bar" }] } })
    );
}

#[test]
fn reassigning_equal_collection_reports_nothing() {
    let schema = schema();
    let original = values! {
        "targets" => vec![
            values! { "id" => 1i64, "name" => "foo" },
            values! { "id" => 2i64, "name" => "baz" },
        ],
    };
    let mut record = Record::from_values(&schema, MODEL, original).unwrap();

    let fresh = vec![
        new_target(&schema, values! { "id" => 1i64, "name" => "foo" }),
        new_target(&schema, values! { "id" => 2i64, "name" => "baz" }),
    ];
    record.set("targets", fresh).unwrap();

    assert!(record.changed_values().is_empty());
    assert!(!record.is_dirty());
}

#[test]
fn one_to_many_decomposition() {
    let schema = schema();
    let mut record = Record::from_values(
        &schema,
        MODEL,
        values! {
            "targets" => vec![
                values! { "id" => 1i64, "name" => "foo" },
                values! { "id" => 2i64, "name" => "baz" },
            ],
        },
    )
    .unwrap();

    let mut kept = new_target(&schema, values! { "id" => 1i64, "name" => "foo" });
    kept.set("name", "bar").unwrap();
    record.set("targets", vec![kept]).unwrap();

    assert_eq!(
        record.changed_values().to_json(),
        json!({ "targets": { "update": [{ "id": 1, "name": "bar" }], "remove": [2] } })
    );
}

#[test]
fn added_positions_are_current_indices() {
    let schema = schema();
    let mut record = Record::from_values(
        &schema,
        MODEL,
        values! { "targets" => vec![values! { "id" => 1i64, "name" => "foo" }] },
    )
    .unwrap();

    let existing = record.sub_records("targets").unwrap()[0].clone();
    record
        .set(
            "targets",
            vec![
                new_target(&schema, values! { "name" => "first" }),
                existing,
                new_target(&schema, values! { "name" => "last" }),
            ],
        )
        .unwrap();

    assert_eq!(
        record.changed_values().to_json(),
        json!({
            "targets": {
                "add": [
                    [0, { "name": "first" }],
                    [2, { "name": "last" }],
                ],
            },
        })
    );
}

#[test]
fn assigning_back_the_original_undoes_the_change() {
    let schema = schema();
    let mut record = Record::from_values(
        &schema,
        MODEL,
        values! { "name" => "test", "target" => 1i64 },
    )
    .unwrap();

    record.set("name", "other").unwrap();
    record.set("target", target(&schema, 3)).unwrap();
    assert_eq!(record.touched(), ["name", "target"]);

    record.set("name", "test").unwrap();
    record.set("target", 1i64).unwrap();
    assert!(record.changed_values().is_empty());
}

#[test]
fn assigning_a_field_missing_from_the_snapshot_is_a_change() {
    let schema = schema();
    let mut record = Record::new(&schema, MODEL).unwrap();

    record.set("name", Value::Null).unwrap();

    assert_eq!(record.changed_values().to_json(), json!({ "name": null }));
}

#[test]
fn only_touched_fields_appear() {
    let schema = schema();
    let mut record = Record::from_values(
        &schema,
        MODEL,
        values! {
            "name" => "test",
            "target" => 1i64,
            "m2m_targets" => vec![5i64],
        },
    )
    .unwrap();

    record.set("target", 2i64).unwrap();

    let changes = record.changed_values();
    assert_eq!(changes.fields().collect::<Vec<_>>(), ["target"]);
}

#[test]
fn many_to_many_reports_full_list() {
    let schema = schema();
    let mut record =
        Record::from_values(&schema, MODEL, values! { "m2m_targets" => vec![5i64, 6] }).unwrap();

    record
        .set("m2m_targets", vec![target(&schema, 5), target(&schema, 6), target(&schema, 7)])
        .unwrap();

    assert_eq!(
        record.changed_values().to_json(),
        json!({ "m2m_targets": [5, 6, 7] })
    );
}

#[test]
fn shape_mismatch_is_a_validation_error() {
    let schema = schema();
    let mut record = Record::new(&schema, MODEL).unwrap();

    let err = record
        .set("name", vec![new_target(&schema, values! {})])
        .unwrap_err();
    assert!(err.is_validation());

    let err = record.set("targets", "not a list").unwrap_err();
    assert!(err.is_validation());

    let err = record
        .set("m2m_targets", vec![new_target(&schema, values! {})])
        .unwrap_err();
    assert!(err.is_validation());

    assert!(record.changed_values().is_empty());
}
