use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use tally_core::{
    driver::Store,
    schema::{FieldTy, ModelId, Schema},
    stmt::{Change, ChangeSet, CollectionDiff, Id, Value, ValueMap},
    Error, Result,
};
use tracing::trace;

/// A [`Store`] keeping rows in memory, one table per model.
///
/// One-to-many fields are not stored on the owning row. Each sub-record is a
/// row of the target model whose inverse field holds the owner's identifier;
/// loading the owner collects them in identifier order.
#[derive(Debug)]
pub struct MemoryStore {
    schema: Arc<Schema>,
    tables: HashMap<ModelId, BTreeMap<Id, ValueMap>>,
    sequences: HashMap<ModelId, u64>,
}

impl MemoryStore {
    pub fn new(schema: &Arc<Schema>) -> Self {
        Self {
            schema: schema.clone(),
            tables: HashMap::new(),
            sequences: HashMap::new(),
        }
    }

    /// The stored row, without one-to-many fields.
    pub fn row(&self, model: ModelId, id: Id) -> Option<&ValueMap> {
        self.tables.get(&model)?.get(&id)
    }

    /// Identifiers of every stored record of `model`, ascending.
    pub fn ids(&self, model: ModelId) -> Vec<Id> {
        self.tables
            .get(&model)
            .map(|table| table.keys().copied().collect())
            .unwrap_or_default()
    }

    /// Deletes a record and, recursively, the sub-records it owns.
    pub fn delete(&mut self, model: ModelId, id: Id) -> Result<()> {
        self.expect_row(model, id)?;
        self.delete_cascade(model, id);
        Ok(())
    }

    fn delete_cascade(&mut self, model: ModelId, id: Id) {
        let schema = self.schema.clone();

        if let Some(table) = self.tables.get_mut(&model) {
            table.remove(&id);
        }

        for field in &schema.model(model).fields {
            if let FieldTy::OneToMany(rel) = &field.ty {
                for child in self.children(rel.target, &schema.field(rel.inverse).name, id) {
                    self.delete_cascade(rel.target, child);
                }
            }
        }
    }

    /// Rows of `model` whose `inverse` field points at `owner`.
    fn children(&self, model: ModelId, inverse: &str, owner: Id) -> Vec<Id> {
        let Some(table) = self.tables.get(&model) else {
            return vec![];
        };

        table
            .iter()
            .filter(|(_, row)| row.get(inverse) == Some(&Value::Id(owner)))
            .map(|(id, _)| *id)
            .collect()
    }

    /// Checks `changes` against the schema and the stored rows. Runs before
    /// anything is written, so a rejected save leaves the store untouched.
    fn check(&self, model: ModelId, changes: &ChangeSet) -> Result<()> {
        let model_schema = self.schema.model(model);

        for (name, change) in changes.iter() {
            let field = model_schema.expect_field(name)?;

            match (change, &field.ty) {
                (Change::OneToMany(diff), FieldTy::OneToMany(rel)) => {
                    for added in &diff.add {
                        if let Some(id) = added.id {
                            self.expect_row(rel.target, id)?;
                        }
                        self.check(rel.target, &added.values)?;
                    }

                    for updated in &diff.update {
                        self.expect_row(rel.target, updated.id)?;
                        self.check(rel.target, &updated.changes)?;
                    }

                    for removed in &diff.remove {
                        self.expect_row(rel.target, *removed)?;
                    }
                }
                (Change::Value(value), FieldTy::OneToMany(_)) => {
                    return Err(Error::validation_kind(name, "one-to-many", value.shape()));
                }
                (Change::OneToMany(_), _) => {
                    return Err(Error::validation_kind(
                        name,
                        field.kind().as_str(),
                        "collection diff",
                    ));
                }
                (Change::Value(_), _) => {}
            }
        }

        Ok(())
    }

    /// Writes a change-set that already passed [`MemoryStore::check`].
    fn write(&mut self, model: ModelId, id: Id, changes: &ChangeSet) {
        let schema = self.schema.clone();
        let model_schema = schema.model(model);
        let mut collections = vec![];

        let row = self.tables.entry(model).or_default().entry(id).or_default();

        for (name, change) in changes.iter() {
            match change {
                Change::Value(value) => {
                    row.insert(name, value.clone());
                }
                Change::OneToMany(diff) => {
                    if let Some(FieldTy::OneToMany(rel)) =
                        model_schema.field_by_name(name).map(|field| &field.ty)
                    {
                        collections.push((rel.target, &schema.field(rel.inverse).name, diff));
                    }
                }
            }
        }

        trace!(model = %model_schema.name, %id, fields = changes.len(), "row written");

        for (target, inverse, diff) in collections {
            self.apply_collection(target, inverse, id, diff);
        }
    }

    /// Applies a one-to-many diff. Added sub-records that are already stored
    /// are re-linked to `owner` rather than copied.
    fn apply_collection(
        &mut self,
        target: ModelId,
        inverse: &str,
        owner: Id,
        diff: &CollectionDiff,
    ) {
        for added in &diff.add {
            let child = match added.id {
                Some(id) => id,
                None => self.next_identifier(target),
            };

            self.write(target, child, &added.values);
            self.tables
                .entry(target)
                .or_default()
                .entry(child)
                .or_default()
                .insert(inverse, owner);
        }

        for updated in &diff.update {
            self.write(target, updated.id, &updated.changes);
        }

        for removed in &diff.remove {
            self.delete_cascade(target, *removed);
        }
    }

    fn expect_row(&self, model: ModelId, id: Id) -> Result<()> {
        match self.row(model, id) {
            Some(_) => Ok(()),
            None => Err(self.not_found(model, id)),
        }
    }

    fn not_found(&self, model: ModelId, id: Id) -> Error {
        Error::record_not_found(format!(
            "model={} id={}",
            self.schema.model(model).name,
            id
        ))
    }
}

impl Store for MemoryStore {
    fn load(&self, model: ModelId, id: Id) -> Result<ValueMap> {
        let Some(row) = self.row(model, id) else {
            return Err(self.not_found(model, id));
        };

        let mut values = row.clone();

        for field in &self.schema.model(model).fields {
            if let FieldTy::OneToMany(rel) = &field.ty {
                let inverse = &self.schema.field(rel.inverse).name;
                let children = self
                    .children(rel.target, inverse, id)
                    .into_iter()
                    .map(|child| {
                        let mut child_values = self.load(rel.target, child)?;
                        child_values.insert("id", child);
                        Ok(Value::Map(child_values))
                    })
                    .collect::<Result<Vec<_>>>()?;
                values.insert(field.name.clone(), children);
            }
        }

        Ok(values)
    }

    fn save(&mut self, model: ModelId, id: Id, changes: &ChangeSet) -> Result<()> {
        self.check(model, changes)?;
        self.write(model, id, changes);
        Ok(())
    }

    fn next_identifier(&mut self, model: ModelId) -> Id {
        let next = self.sequences.entry(model).or_insert(0);
        *next += 1;
        Id::from_u64(*next)
    }
}
