//! Builds change-sets from records.
//!
//! Each field kind has one encoding:
//!
//! | kind         | encoded as                                    |
//! |--------------|-----------------------------------------------|
//! | scalar       | the value, verbatim                           |
//! | many-to-one  | the target identifier, or null                |
//! | reference    | the string `"<model>,<id>"`, or null          |
//! | many-to-many | the full list of target identifiers           |
//! | one-to-many  | `add` / `update` / `remove`, each only if non-empty |

use super::{CollectionTracker, FieldValue, Record};
use tally_core::stmt::{Change, ChangeSet, Value};

/// The change-set of `record`: one entry per touched field, in touched order.
pub(super) fn build(record: &Record) -> ChangeSet {
    let mut changes = ChangeSet::new();

    for name in &record.touched {
        let Some(value) = record.values.get(name) else {
            continue;
        };

        let change = match value {
            FieldValue::OneToMany(_) => {
                let diff = CollectionTracker::new(record.original.get(name), Some(value)).diff();

                if diff.is_empty() {
                    continue;
                }
                Change::OneToMany(diff)
            }
            value => Change::Value(encode(value)),
        };

        changes.insert(name.clone(), change);
    }

    changes
}

/// Every value `record` holds, for a record that is not in storage yet.
///
/// Sub-records of one-to-many fields are all reported as added; the field is
/// left out when it holds none.
pub(super) fn build_full(record: &Record) -> ChangeSet {
    let mut changes = ChangeSet::new();

    for (name, value) in &record.values {
        let change = match value {
            FieldValue::OneToMany(records) => {
                let diff = CollectionTracker::unsaved(records).diff();
                if diff.is_empty() {
                    continue;
                }
                Change::OneToMany(diff)
            }
            value => Change::Value(encode(value)),
        };

        changes.insert(name.clone(), change);
    }

    changes
}

fn encode(value: &FieldValue) -> Value {
    match value {
        FieldValue::Scalar(value) => value.clone(),
        FieldValue::ManyToOne(id) => (*id).into(),
        FieldValue::Reference(reference) => reference
            .as_ref()
            .map(|reference| Value::String(reference.to_string()))
            .unwrap_or_default(),
        FieldValue::ManyToMany(ids) => ids.clone().into(),
        FieldValue::OneToMany(_) => unreachable!("one-to-many fields encode as a diff"),
    }
}
