use super::{FieldValue, Record};
use indexmap::IndexSet;
use tally_core::stmt::{Added, CollectionDiff, Id, Updated};

/// Classifies the current contents of a one-to-many or many-to-many field
/// against the identifiers the field held when the record was constructed.
///
/// - added: current entries with no identifier, or one not held originally
/// - removed: original identifiers no longer present
/// - updated (one-to-many only): originally held sub-records with touched
///   fields of their own
///
/// Sub-records count as updated only through their own touched fields, never
/// by comparing their values with the originals.
#[derive(Debug)]
pub struct CollectionTracker<'a> {
    original_ids: IndexSet<Id>,
    current: Current<'a>,
}

#[derive(Debug, Clone, Copy)]
enum Current<'a> {
    Records(&'a [Record]),
    Ids(&'a [Id]),
}

impl<'a> CollectionTracker<'a> {
    pub(crate) fn new(
        original: Option<&'a FieldValue>,
        current: Option<&'a FieldValue>,
    ) -> Self {
        let original_ids = match original {
            Some(FieldValue::OneToMany(records)) => {
                records.iter().filter_map(Record::id).collect()
            }
            Some(FieldValue::ManyToMany(ids)) => ids.iter().copied().collect(),
            _ => IndexSet::new(),
        };

        let current = match current {
            Some(FieldValue::OneToMany(records)) => Current::Records(records),
            Some(FieldValue::ManyToMany(ids)) => Current::Ids(ids),
            _ => Current::Ids(&[]),
        };

        Self {
            original_ids,
            current,
        }
    }

    /// A tracker for which nothing was held originally.
    pub(crate) fn unsaved(current: &'a [Record]) -> Self {
        Self {
            original_ids: IndexSet::new(),
            current: Current::Records(current),
        }
    }

    pub fn original_ids(&self) -> impl Iterator<Item = Id> + '_ {
        self.original_ids.iter().copied()
    }

    /// Identifiers of the current entries, skipping unsaved sub-records.
    pub fn current_ids(&self) -> Vec<Id> {
        match self.current {
            Current::Records(records) => records.iter().filter_map(Record::id).collect(),
            Current::Ids(ids) => ids.to_vec(),
        }
    }

    /// Added sub-records with their position in the current collection.
    ///
    /// Empty for many-to-many fields; see [`CollectionTracker::added_ids`].
    pub fn added(&self) -> Vec<(usize, &'a Record)> {
        let Current::Records(records) = self.current else {
            return vec![];
        };

        records
            .iter()
            .enumerate()
            .filter(|(_, record)| self.is_new(record.id()))
            .collect()
    }

    /// Identifiers present now but not originally.
    pub fn added_ids(&self) -> Vec<Id> {
        self.current_ids()
            .into_iter()
            .filter(|id| !self.original_ids.contains(id))
            .collect()
    }

    /// Originally held sub-records that have touched fields.
    pub fn updated(&self) -> Vec<&'a Record> {
        let Current::Records(records) = self.current else {
            return vec![];
        };

        records
            .iter()
            .filter(|record| !self.is_new(record.id()) && record.is_dirty())
            .collect()
    }

    /// Original identifiers no longer present, in original order.
    pub fn removed_ids(&self) -> Vec<Id> {
        let current = self.current_ids().into_iter().collect::<IndexSet<_>>();
        self.original_ids
            .iter()
            .filter(|id| !current.contains(*id))
            .copied()
            .collect()
    }

    /// True when anything was added, removed or (for one-to-many) updated.
    pub fn is_changed(&self) -> bool {
        match self.current {
            Current::Records(_) => {
                !self.added().is_empty()
                    || !self.removed_ids().is_empty()
                    || !self.updated().is_empty()
            }
            Current::Ids(_) => !self.added_ids().is_empty() || !self.removed_ids().is_empty(),
        }
    }

    /// The one-to-many decomposition: added sub-records with all their
    /// values, updated ones with only their changes, removed identifiers.
    pub fn diff(&self) -> CollectionDiff {
        CollectionDiff {
            add: self
                .added()
                .into_iter()
                .map(|(index, record)| Added {
                    index,
                    id: record.id(),
                    values: record.full_values(),
                })
                .collect(),
            update: self
                .updated()
                .into_iter()
                .filter_map(|record| {
                    Some(Updated {
                        id: record.id()?,
                        changes: record.changed_values(),
                    })
                })
                .collect(),
            remove: self.removed_ids(),
        }
    }

    fn is_new(&self, id: Option<Id>) -> bool {
        match id {
            Some(id) => !self.original_ids.contains(&id),
            None => true,
        }
    }
}
