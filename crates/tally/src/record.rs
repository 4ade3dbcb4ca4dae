mod changes;

mod collection;
pub use collection::CollectionTracker;

mod field_value;
use field_value::FieldValue;

mod input;
pub use input::Input;

use indexmap::{IndexMap, IndexSet};
use std::{fmt, sync::Arc};
use tally_core::{
    schema::{Field, FieldKind, Model, ModelId, Schema},
    stmt::{ChangeSet, Id, Value, ValueMap},
    Error, Result, Store,
};
use tracing::{debug, trace};

/// An in-memory instance of a model that tracks its own modifications.
///
/// A record remembers the values it was constructed or loaded with. Every
/// assignment goes through [`Record::set`], which keeps the set of touched
/// fields current, so [`Record::changed_values`] can report the minimal diff
/// at any time.
#[derive(Clone)]
pub struct Record {
    schema: Arc<Schema>,

    model: ModelId,

    /// Persistent key; `None` until the record is saved
    id: Option<Id>,

    /// Current field values
    values: IndexMap<String, FieldValue>,

    /// Snapshot of the values the record was constructed with
    original: IndexMap<String, FieldValue>,

    /// Fields assigned since construction, in first-assignment order.
    ///
    /// Scalar-like fields are present only while they differ from the
    /// snapshot. Collection fields stay listed once assigned or borrowed
    /// mutably; whether they contribute is decided by their tracker.
    touched: IndexSet<String>,
}

impl Record {
    /// Creates an empty, unsaved record of the model named `model`.
    pub fn new(schema: &Arc<Schema>, model: &str) -> Result<Self> {
        let model = schema.expect_model(model)?.id;
        Ok(Self::empty(schema, model, None))
    }

    /// Creates a record standing for the stored record `id`, with no field
    /// values loaded.
    pub fn with_id(schema: &Arc<Schema>, model: &str, id: Id) -> Result<Self> {
        let model = schema.expect_model(model)?.id;
        Ok(Self::empty(schema, model, Some(id)))
    }

    /// Creates a record from initial values.
    ///
    /// This is the load path: the values become both the current values and
    /// the snapshot, so the new record has no changes. An `"id"` entry
    /// becomes the record's identifier. One-to-many entries may hold
    /// mappings, which are loaded as sub-records the same way.
    pub fn from_values(schema: &Arc<Schema>, model: &str, values: ValueMap) -> Result<Self> {
        let model = schema.expect_model(model)?.id;
        Self::from_values_in(schema, model, values)
    }

    /// Loads the stored record `id` of `model` from `store`.
    pub fn load<S: Store + ?Sized>(
        store: &S,
        schema: &Arc<Schema>,
        model: &str,
        id: Id,
    ) -> Result<Self> {
        let model = schema.expect_model(model)?.id;
        Self::load_in(store, schema, model, id)
    }

    pub(crate) fn empty(schema: &Arc<Schema>, model: ModelId, id: Option<Id>) -> Self {
        Self {
            schema: schema.clone(),
            model,
            id,
            values: IndexMap::new(),
            original: IndexMap::new(),
            touched: IndexSet::new(),
        }
    }

    pub(crate) fn from_values_in(
        schema: &Arc<Schema>,
        model: ModelId,
        values: ValueMap,
    ) -> Result<Self> {
        let mut record = Self::empty(schema, model, None);
        let model = schema.model(model);

        for (name, value) in values {
            if name == "id" {
                record.id = match value {
                    Value::Null => None,
                    Value::Id(id) => Some(id),
                    Value::I64(id) => Some(
                        Id::from_i64(id)
                            .map_err(|err| err.context(Error::validation_failed("bad `id`")))?,
                    ),
                    other => {
                        return Err(Error::validation_kind("id", "identifier", other.shape()))
                    }
                };
                continue;
            }

            let field = model.expect_field(&name)?;
            let value = FieldValue::from_input(schema, field, Input::Value(value))?;
            record.original.insert(name.clone(), value.clone());
            record.values.insert(name, value);
        }

        Ok(record)
    }

    pub(crate) fn load_in<S: Store + ?Sized>(
        store: &S,
        schema: &Arc<Schema>,
        model: ModelId,
        id: Id,
    ) -> Result<Self> {
        let mut values = store.load(model, id)?;
        values.insert("id", id);
        Self::from_values_in(schema, model, values)
    }

    pub fn id(&self) -> Option<Id> {
        self.id
    }

    pub fn model(&self) -> &Model {
        self.schema.model(self.model)
    }

    pub fn model_name(&self) -> &str {
        &self.model().name
    }

    pub fn schema(&self) -> &Arc<Schema> {
        &self.schema
    }

    /// Assigns `value` to `field`.
    ///
    /// The value is checked against the field kind and converted to its
    /// stored form. The field is marked touched, unless the new value equals
    /// the one it was constructed with, in which case it becomes clean again.
    pub fn set(&mut self, field: &str, value: impl Into<Input>) -> Result<()> {
        let field = self.schema.model(self.model).expect_field(field)?;
        let value = FieldValue::from_input(&self.schema, field, value.into())
            .map_err(|err| err.context(crate::err!("{}.set()", self.model_name())))?;

        let kind = field.kind();
        let name = field.name.clone();

        let clean = match kind {
            // Collections are judged by their tracker when the change-set is built.
            FieldKind::OneToMany => false,
            FieldKind::ManyToMany => {
                !CollectionTracker::new(self.original.get(&name), Some(&value)).is_changed()
            }
            _ => self
                .original
                .get(&name)
                .is_some_and(|original| original.same_as(&value)),
        };

        if clean {
            self.touched.shift_remove(&name);
        } else {
            self.touched.insert(name.clone());
        }

        trace!(model = %self.model_name(), field = %name, %kind, dirty = !clean, "field assigned");

        self.values.insert(name, value);
        Ok(())
    }

    /// Returns the encoded current value of `field`.
    ///
    /// Unset fields read as `Null`, or as an empty list for collections.
    /// One-to-many fields read as a list of each sub-record's full values,
    /// including its `"id"` when it has one.
    pub fn get(&self, field: &str) -> Result<Value> {
        let field = self.model().expect_field(field)?;

        Ok(match self.values.get(&field.name) {
            Some(value) => value.to_value(),
            None if field.is_collection() => Value::List(vec![]),
            None => Value::Null,
        })
    }

    /// The sub-records currently held by the one-to-many `field`.
    pub fn sub_records(&self, field: &str) -> Result<&[Record]> {
        let field = self.one_to_many_field(field)?;

        Ok(match self.values.get(&field.name) {
            Some(FieldValue::OneToMany(records)) => records.as_slice(),
            _ => &[],
        })
    }

    /// Mutable access to the sub-records of the one-to-many `field`.
    ///
    /// Sub-records are modified through their own [`Record::set`]. Borrowing
    /// them this way enrolls the field in the change-set, so nested
    /// modifications are reported without reassigning the collection.
    pub fn sub_records_mut(&mut self, field: &str) -> Result<&mut [Record]> {
        let name = self.one_to_many_field(field)?.name.clone();
        self.touched.insert(name.clone());

        let value = self
            .values
            .entry(name)
            .or_insert_with(|| FieldValue::OneToMany(vec![]));

        match value {
            FieldValue::OneToMany(records) => Ok(records.as_mut_slice()),
            _ => unreachable!("one-to-many field holds a non-collection value"),
        }
    }

    /// Classifies the collection `field` against the identifiers it was
    /// constructed with.
    pub fn collection(&self, field: &str) -> Result<CollectionTracker<'_>> {
        let field = self.model().expect_field(field)?;
        if !field.is_collection() {
            return Err(Error::validation_kind(
                &field.name,
                field.kind().as_str(),
                "collection",
            ));
        }

        Ok(CollectionTracker::new(
            self.original.get(&field.name),
            self.values.get(&field.name),
        ))
    }

    /// The minimal diff between the current values and the values the record
    /// was constructed with.
    pub fn changed_values(&self) -> ChangeSet {
        changes::build(self)
    }

    /// Every value the record holds, encoded as for a record that does not
    /// exist in storage yet.
    pub fn full_values(&self) -> ChangeSet {
        changes::build_full(self)
    }

    /// Names of the fields that currently contribute to the change-set, in
    /// first-assignment order.
    pub fn touched(&self) -> Vec<&str> {
        self.changed_values_candidates()
            .filter(|(_, field, value)| self.contributes(field, value))
            .map(|(name, _, _)| name)
            .collect()
    }

    /// True when the record has changes to report.
    pub fn is_dirty(&self) -> bool {
        self.changed_values_candidates()
            .any(|(_, field, value)| self.contributes(field, value))
    }

    /// Writes the record to `store` and reloads it, leaving it clean.
    ///
    /// A new record obtains an identifier from the store and is written with
    /// its full values. A stored record is written with its change-set, and
    /// not at all when that is empty.
    pub fn save<S: Store + ?Sized>(&mut self, store: &mut S) -> Result<Id> {
        let (id, changes) = match self.id {
            Some(id) => (id, self.changed_values()),
            None => (store.next_identifier(self.model), self.full_values()),
        };

        if self.id.is_none() || !changes.is_empty() {
            debug!(model = %self.model_name(), %id, fields = changes.len(), "saving record");
            store.save(self.model, id, &changes)?;
        }

        *self = Self::load_in(&*store, &self.schema, self.model, id)?;
        Ok(id)
    }

    /// Current values as plain data, as a store would return them.
    pub(crate) fn values_map(&self) -> ValueMap {
        self.values
            .iter()
            .map(|(name, value)| (name.clone(), value.to_value()))
            .collect()
    }

    fn one_to_many_field(&self, field: &str) -> Result<&Field> {
        let field = self.model().expect_field(field)?;
        match field.kind() {
            FieldKind::OneToMany => Ok(field),
            kind => Err(Error::validation_kind(&field.name, kind.as_str(), "sub-records")),
        }
    }

    /// Touched fields with their descriptors and current values.
    fn changed_values_candidates(&self) -> impl Iterator<Item = (&str, &Field, &FieldValue)> + '_ {
        let model = self.model();
        self.touched.iter().filter_map(move |name| {
            let field = model.field_by_name(name)?;
            let value = self.values.get(name)?;
            Some((name.as_str(), field, value))
        })
    }

    fn contributes(&self, field: &Field, value: &FieldValue) -> bool {
        match field.kind() {
            FieldKind::OneToMany => {
                CollectionTracker::new(self.original.get(&field.name), Some(value)).is_changed()
            }
            _ => true,
        }
    }
}

impl fmt::Debug for Record {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt.debug_struct("Record")
            .field("model", &self.model_name())
            .field("id", &self.id)
            .field("values", &self.values)
            .field("touched", &self.touched)
            .finish()
    }
}
