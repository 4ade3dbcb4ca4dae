mod builder;
pub use builder::{Builder, ModelBuilder};

mod field;
pub use field::{Field, FieldId, FieldKind, FieldPrimitive, FieldTy};

mod model;
pub use model::{Model, ModelId};

mod relation;
pub use relation::{ManyToMany, ManyToOne, OneToMany, ReferenceTargets};

use crate::{Error, Result};
use indexmap::IndexMap;

/// The set of models records can be built from.
///
/// Immutable once built; records share it through an `Arc`.
#[derive(Debug, Default)]
pub struct Schema {
    models: Vec<Model>,

    /// Model name to identifier
    names: IndexMap<String, ModelId>,
}

impl Schema {
    pub fn builder() -> Builder {
        Builder::default()
    }

    pub fn models(&self) -> impl Iterator<Item = &Model> {
        self.models.iter()
    }

    /// Get a model by ID
    #[track_caller]
    pub fn model(&self, id: impl Into<ModelId>) -> &Model {
        self.models.get(id.into().0).expect("invalid model ID")
    }

    /// Get a field by ID
    #[track_caller]
    pub fn field(&self, id: FieldId) -> &Field {
        self.model(id.model).field(id)
    }

    pub fn model_by_name(&self, name: &str) -> Option<&Model> {
        self.names.get(name).map(|id| self.model(*id))
    }

    /// Like [`Schema::model_by_name`], but unknown names are an error.
    pub fn expect_model(&self, name: &str) -> Result<&Model> {
        self.model_by_name(name)
            .ok_or_else(|| Error::invalid_schema(format!("no model named `{name}`")))
    }
}
