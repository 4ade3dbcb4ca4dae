use super::{FieldId, ModelId};

/// Holds the identifier of one record of `target`.
#[derive(Debug, Clone)]
pub struct ManyToOne {
    pub target: ModelId,
}

/// Owns an ordered collection of `target` records linked back through the
/// `inverse` many-to-one field.
#[derive(Debug, Clone)]
pub struct OneToMany {
    pub target: ModelId,
    pub inverse: FieldId,
}

/// Holds an ordered list of identifiers of `target` records.
#[derive(Debug, Clone)]
pub struct ManyToMany {
    pub target: ModelId,
}

/// The models a polymorphic reference may point at. Empty accepts any model
/// in the schema.
#[derive(Debug, Clone, Default)]
pub struct ReferenceTargets {
    pub targets: Vec<ModelId>,
}

impl ReferenceTargets {
    pub fn accepts(&self, model: ModelId) -> bool {
        self.targets.is_empty() || self.targets.contains(&model)
    }
}
