//! The persistence seam.
//!
//! Tally computes change-sets; storing them is the job of a [`Store`]. A
//! store loads records as plain [`ValueMap`]s and applies the change-sets a
//! record produces.

use crate::schema::ModelId;
use crate::stmt::{ChangeSet, Id, ValueMap};
use crate::Result;

pub trait Store {
    /// Returns every field value of the record `id` of `model`.
    ///
    /// One-to-many fields are returned as lists of mappings, each carrying
    /// the sub-record's `"id"`. Fails with a record-not-found error when the
    /// record does not exist.
    fn load(&self, model: ModelId, id: Id) -> Result<ValueMap>;

    /// Applies `changes` to the record `id` of `model`, creating the record
    /// if it does not exist yet.
    fn save(&mut self, model: ModelId, id: Id, changes: &ChangeSet) -> Result<()>;

    /// Reserves a fresh identifier for a new record of `model`.
    fn next_identifier(&mut self, model: ModelId) -> Id;
}

impl<S: Store + ?Sized> Store for &mut S {
    fn load(&self, model: ModelId, id: Id) -> Result<ValueMap> {
        (**self).load(model, id)
    }

    fn save(&mut self, model: ModelId, id: Id, changes: &ChangeSet) -> Result<()> {
        (**self).save(model, id, changes)
    }

    fn next_identifier(&mut self, model: ModelId) -> Id {
        (**self).next_identifier(model)
    }
}
