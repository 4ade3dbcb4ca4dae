use pretty_assertions::assert_eq;
use serde_json::json;
use tally::{
    guard::ModelAccess, values, AccessGuard, AccessRegistry, Context, MemoryStore, Principal,
    Record, Value,
};
use tests::*;

#[test]
fn new_record_is_saved_with_sub_records() {
    let schema = schema();
    let mut store = MemoryStore::new(&schema);

    let mut record = Record::new(&schema, MODEL).unwrap();
    record.set("name", "foo").unwrap();
    record
        .set(
            "targets",
            vec![
                new_target(&schema, values! { "name" => "a" }),
                new_target(&schema, values! { "name" => "b" }),
            ],
        )
        .unwrap();

    let id = record.save(&mut store).unwrap();
    assert_eq!(record.id(), Some(id));
    assert!(!record.is_dirty());

    let loaded = Record::load(&store, &schema, MODEL, id).unwrap();
    assert_eq!(loaded.get("name").unwrap(), Value::from("foo"));

    let names = loaded
        .sub_records("targets")
        .unwrap()
        .iter()
        .map(|target| target.get("name").unwrap())
        .collect::<Vec<_>>();
    assert_eq!(names, [Value::from("a"), Value::from("b")]);

    for target in loaded.sub_records("targets").unwrap() {
        assert_eq!(target.get("parent").unwrap(), Value::Id(id));
    }
}

#[test]
fn changes_are_applied_and_record_reloads_clean() {
    let schema = schema();
    let mut store = MemoryStore::new(&schema);

    let mut record = Record::new(&schema, MODEL).unwrap();
    record.set("name", "foo").unwrap();
    record
        .set(
            "targets",
            vec![
                new_target(&schema, values! { "name" => "a" }),
                new_target(&schema, values! { "name" => "b" }),
            ],
        )
        .unwrap();
    let id = record.save(&mut store).unwrap();

    let mut first = record.sub_records("targets").unwrap()[0].clone();
    first.set("name", "changed").unwrap();
    record
        .set(
            "targets",
            vec![first, new_target(&schema, values! { "name" => "c" })],
        )
        .unwrap();
    record.set("name", "bar").unwrap();

    assert_eq!(
        record.changed_values().to_json(),
        json!({
            "targets": {
                "add": [[1, { "name": "c" }]],
                "update": [{ "id": 1, "name": "changed" }],
                "remove": [2],
            },
            "name": "bar",
        })
    );

    record.save(&mut store).unwrap();
    assert!(record.changed_values().is_empty());

    let loaded = Record::load(&store, &schema, MODEL, id).unwrap();
    assert_eq!(loaded.get("name").unwrap(), Value::from("bar"));
    let names = loaded
        .sub_records("targets")
        .unwrap()
        .iter()
        .map(|target| target.get("name").unwrap())
        .collect::<Vec<_>>();
    assert_eq!(names, [Value::from("changed"), Value::from("c")]);

    let target_model = schema.expect_model(TARGET).unwrap().id;
    assert!(store.row(target_model, tests::id(2)).is_none());
}

#[test]
fn relations_survive_a_round_trip() {
    let schema = schema();
    let mut store = MemoryStore::new(&schema);

    let mut targets = (0..3)
        .map(|_| Record::new(&schema, TARGET).unwrap())
        .collect::<Vec<_>>();
    for target in &mut targets {
        target.save(&mut store).unwrap();
    }

    let mut record = Record::new(&schema, MODEL).unwrap();
    record.set("target", &targets[0]).unwrap();
    record.set("ref_target", &targets[1]).unwrap();
    record
        .set("m2m_targets", vec![targets[1].clone(), targets[2].clone()])
        .unwrap();
    let id = record.save(&mut store).unwrap();

    let loaded = Record::load(&store, &schema, MODEL, id).unwrap();
    assert_eq!(loaded.get("target").unwrap(), Value::Id(id_of(&targets[0])));
    assert_eq!(
        loaded.get("ref_target").unwrap().to_json(),
        json!(format!("{TARGET},{}", id_of(&targets[1])))
    );
    assert_eq!(
        loaded.get("m2m_targets").unwrap(),
        Value::from(vec![id_of(&targets[1]), id_of(&targets[2])])
    );
    assert!(!loaded.is_dirty());
}

#[test]
fn stored_target_added_to_collection_is_linked_not_copied() {
    let schema = schema();
    let mut store = MemoryStore::new(&schema);

    let mut existing = Record::new(&schema, TARGET).unwrap();
    existing.set("name", "existing").unwrap();
    let existing_id = existing.save(&mut store).unwrap();

    let mut parent = Record::new(&schema, MODEL).unwrap();
    parent.set("name", "parent").unwrap();
    let parent_id = parent.save(&mut store).unwrap();

    let loaded = Record::load(&store, &schema, TARGET, existing_id).unwrap();
    parent.set("targets", vec![loaded]).unwrap();

    assert_eq!(
        parent.changed_values().to_json(),
        json!({
            "targets": {
                "add": [[0, { "id": 1, "name": "existing" }]],
            },
        })
    );

    parent.save(&mut store).unwrap();

    let target_model = schema.expect_model(TARGET).unwrap().id;
    assert_eq!(store.ids(target_model), [existing_id]);

    let sub_ids = parent
        .sub_records("targets")
        .unwrap()
        .iter()
        .map(Record::id)
        .collect::<Vec<_>>();
    assert_eq!(sub_ids, [Some(existing_id)]);

    let relinked = Record::load(&store, &schema, TARGET, existing_id).unwrap();
    assert_eq!(relinked.get("name").unwrap(), Value::from("existing"));
    assert_eq!(relinked.get("parent").unwrap(), Value::Id(parent_id));
}

#[test]
fn new_parent_links_stored_targets() {
    let schema = schema();
    let mut store = MemoryStore::new(&schema);

    let mut existing = Record::new(&schema, TARGET).unwrap();
    existing.set("name", "existing").unwrap();
    let existing_id = existing.save(&mut store).unwrap();

    let mut parent = Record::new(&schema, MODEL).unwrap();
    parent
        .set(
            "targets",
            vec![existing, new_target(&schema, values! { "name" => "fresh" })],
        )
        .unwrap();
    let parent_id = parent.save(&mut store).unwrap();

    let target_model = schema.expect_model(TARGET).unwrap().id;
    assert_eq!(store.ids(target_model).len(), 2);

    let loaded = Record::load(&store, &schema, MODEL, parent_id).unwrap();
    let sub_ids = loaded
        .sub_records("targets")
        .unwrap()
        .iter()
        .map(Record::id)
        .collect::<Vec<_>>();
    assert_eq!(sub_ids, [Some(existing_id), Some(tests::id(2))]);
}

#[test]
fn unchanged_record_is_not_written() {
    let schema = schema();
    let mut store = MemoryStore::new(&schema);

    let mut record = Record::new(&schema, MODEL).unwrap();
    record.set("name", "foo").unwrap();
    let id = record.save(&mut store).unwrap();

    record.set("name", "foo").unwrap();
    assert_eq!(record.save(&mut store).unwrap(), id);
    assert_eq!(store.ids(record.model().id), [id]);
}

#[test]
fn loading_a_missing_record_fails() {
    let schema = schema();
    let store = MemoryStore::new(&schema);

    let err = Record::load(&store, &schema, MODEL, tests::id(42)).unwrap_err();
    assert!(err.is_record_not_found());
}

#[test]
fn guarded_save_requires_write_access() {
    let schema = schema();
    let mut store = MemoryStore::new(&schema);
    let cx = Context::new(Principal::new("user"));
    let mut registry = AccessRegistry::new();
    registry.add_model_access(ModelAccess {
        model: MODEL.to_string(),
        group: None,
        perm_read: true,
        perm_write: false,
    });

    let mut record = Record::new(&schema, MODEL).unwrap();
    record.set("name", "foo").unwrap();

    let err = AccessGuard::new(&registry)
        .save(&cx, &mut record, &mut store)
        .unwrap_err();
    assert!(err.is_permission_denied());
    assert!(store.ids(record.model().id).is_empty());
    assert!(record.is_dirty());

    AccessGuard::new(&registry)
        .save(&Context::root(), &mut record, &mut store)
        .unwrap();
    assert_eq!(store.ids(record.model().id).len(), 1);
}

fn id_of(record: &Record) -> tally::Id {
    record.id().unwrap()
}
