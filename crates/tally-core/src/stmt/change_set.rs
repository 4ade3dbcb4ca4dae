use super::{Id, Value};
use indexmap::IndexMap;
use serde::{Serialize, Serializer};
use serde_json::{json, Map, Value as Json};

/// The minimal diff between a record's current values and the values it was
/// loaded with.
///
/// Keys appear in the order the fields were first touched. Serializes to the
/// wire format consumed by a [`Store`](crate::Store).
#[derive(Debug, Default, Clone, PartialEq)]
pub struct ChangeSet {
    changes: IndexMap<String, Change>,
}

/// The contribution of one field to a [`ChangeSet`].
#[derive(Debug, Clone, PartialEq)]
pub enum Change {
    /// Scalar, many-to-one, reference and many-to-many fields: the encoded
    /// new value.
    Value(Value),

    /// One-to-many fields: nested records added, updated and removed.
    OneToMany(CollectionDiff),
}

/// Decomposition of a one-to-many field against the identifiers it was
/// loaded with.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct CollectionDiff {
    pub add: Vec<Added>,
    pub update: Vec<Updated>,
    pub remove: Vec<Id>,
}

/// A sub-record that was not in the collection when it was loaded.
#[derive(Debug, Clone, PartialEq)]
pub struct Added {
    /// Position of the sub-record in the current collection.
    pub index: usize,

    /// Set when the sub-record is already stored and is being linked in.
    pub id: Option<Id>,

    /// Every field value of the sub-record.
    pub values: ChangeSet,
}

/// A stored sub-record whose own fields changed.
#[derive(Debug, Clone, PartialEq)]
pub struct Updated {
    pub id: Id,
    pub changes: ChangeSet,
}

impl ChangeSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, field: impl Into<String>, change: Change) {
        self.changes.insert(field.into(), change);
    }

    pub fn get(&self, field: &str) -> Option<&Change> {
        self.changes.get(field)
    }

    pub fn len(&self) -> usize {
        self.changes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    pub fn fields(&self) -> impl Iterator<Item = &str> + '_ {
        self.changes.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Change)> + '_ {
        self.changes
            .iter()
            .map(|(field, change)| (field.as_str(), change))
    }

    pub fn to_json(&self) -> Json {
        Json::Object(self.json_map())
    }

    fn json_map(&self) -> Map<String, Json> {
        self.changes
            .iter()
            .map(|(field, change)| (field.clone(), change.to_json()))
            .collect()
    }
}

impl Change {
    pub fn as_value(&self) -> Option<&Value> {
        match self {
            Change::Value(value) => Some(value),
            Change::OneToMany(_) => None,
        }
    }

    pub fn as_one_to_many(&self) -> Option<&CollectionDiff> {
        match self {
            Change::OneToMany(diff) => Some(diff),
            Change::Value(_) => None,
        }
    }

    pub fn to_json(&self) -> Json {
        match self {
            Change::Value(value) => value.to_json(),
            Change::OneToMany(diff) => diff.to_json(),
        }
    }
}

impl CollectionDiff {
    /// True when nothing was added, updated or removed.
    pub fn is_empty(&self) -> bool {
        self.add.is_empty() && self.update.is_empty() && self.remove.is_empty()
    }

    /// Encodes the diff, leaving out each empty list.
    pub fn to_json(&self) -> Json {
        let mut out = Map::new();

        if !self.add.is_empty() {
            let add = self
                .add
                .iter()
                .map(|added| {
                    let mut values = Map::new();
                    if let Some(id) = added.id {
                        values.insert("id".to_string(), Json::from(id.to_u64()));
                    }
                    values.extend(added.values.json_map());
                    json!([added.index, values])
                })
                .collect();
            out.insert("add".to_string(), Json::Array(add));
        }

        if !self.update.is_empty() {
            let update = self
                .update
                .iter()
                .map(|updated| {
                    let mut entry = Map::new();
                    entry.insert("id".to_string(), Json::from(updated.id.to_u64()));
                    entry.extend(updated.changes.json_map());
                    Json::Object(entry)
                })
                .collect();
            out.insert("update".to_string(), Json::Array(update));
        }

        if !self.remove.is_empty() {
            let remove = self.remove.iter().map(|id| Json::from(id.to_u64())).collect();
            out.insert("remove".to_string(), Json::Array(remove));
        }

        Json::Object(out)
    }
}

impl From<Value> for Change {
    fn from(value: Value) -> Self {
        Change::Value(value)
    }
}

impl From<CollectionDiff> for Change {
    fn from(diff: CollectionDiff) -> Self {
        Change::OneToMany(diff)
    }
}

impl Serialize for ChangeSet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_json().serialize(serializer)
    }
}

impl Serialize for Change {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_json().serialize(serializer)
    }
}
