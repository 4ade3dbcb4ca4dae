use super::{ManyToMany, ManyToOne, ModelId, OneToMany, ReferenceTargets};
use crate::stmt;
use std::fmt;

#[derive(Debug, Clone)]
pub struct Field {
    /// Uniquely identifies the field within the containing model.
    pub id: FieldId,

    /// The field name
    pub name: String,

    /// Scalar or relation, and how
    pub ty: FieldTy,
}

#[derive(Copy, Clone, PartialEq, Eq, Hash)]
pub struct FieldId {
    pub model: ModelId,
    pub index: usize,
}

#[derive(Debug, Clone)]
pub enum FieldTy {
    Primitive(FieldPrimitive),
    ManyToOne(ManyToOne),
    OneToMany(OneToMany),
    ManyToMany(ManyToMany),
    Reference(ReferenceTargets),
}

#[derive(Debug, Clone)]
pub struct FieldPrimitive {
    /// The field's primitive type
    pub ty: stmt::Type,
}

/// The closed set of value shapes a field can have.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum FieldKind {
    Scalar,
    ManyToOne,
    OneToMany,
    ManyToMany,
    Reference,
}

impl Field {
    /// Gets the id.
    pub fn id(&self) -> FieldId {
        self.id
    }

    /// Gets the name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Gets the type.
    pub fn ty(&self) -> &FieldTy {
        &self.ty
    }

    pub fn kind(&self) -> FieldKind {
        match &self.ty {
            FieldTy::Primitive(_) => FieldKind::Scalar,
            FieldTy::ManyToOne(_) => FieldKind::ManyToOne,
            FieldTy::OneToMany(_) => FieldKind::OneToMany,
            FieldTy::ManyToMany(_) => FieldKind::ManyToMany,
            FieldTy::Reference(_) => FieldKind::Reference,
        }
    }

    /// If the field relates to exactly one other model, return it.
    pub fn relation_target_id(&self) -> Option<ModelId> {
        match &self.ty {
            FieldTy::ManyToOne(rel) => Some(rel.target),
            FieldTy::OneToMany(rel) => Some(rel.target),
            FieldTy::ManyToMany(rel) => Some(rel.target),
            _ => None,
        }
    }

    pub fn is_collection(&self) -> bool {
        self.kind().is_collection()
    }
}

impl FieldKind {
    pub fn is_collection(self) -> bool {
        matches!(self, FieldKind::OneToMany | FieldKind::ManyToMany)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            FieldKind::Scalar => "scalar",
            FieldKind::ManyToOne => "many-to-one",
            FieldKind::OneToMany => "one-to-many",
            FieldKind::ManyToMany => "many-to-many",
            FieldKind::Reference => "reference",
        }
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Debug for FieldId {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(fmt, "FieldId({}/{})", self.model.0, self.index)
    }
}
