use super::{
    Field, FieldId, FieldPrimitive, FieldTy, ManyToMany, ManyToOne, Model, ModelId, OneToMany,
    ReferenceTargets, Schema,
};
use crate::{stmt, Error, Result};
use indexmap::IndexMap;

/// Collects model declarations and resolves them into a [`Schema`].
///
/// Relations name their target by model name; the names are resolved in
/// [`Builder::build`], so models may be declared in any order.
#[derive(Debug, Default)]
pub struct Builder {
    models: Vec<ModelBuilder>,
}

/// Field declarations for one model.
#[derive(Debug)]
pub struct ModelBuilder {
    name: String,
    fields: Vec<FieldDecl>,
}

#[derive(Debug)]
struct FieldDecl {
    name: String,
    ty: FieldDeclTy,
}

/// A field type whose relation targets are still names.
#[derive(Debug)]
enum FieldDeclTy {
    Primitive(stmt::Type),
    ManyToOne { target: String },
    OneToMany { target: String, inverse: String },
    ManyToMany { target: String },
    Reference { targets: Vec<String> },
}

/// Used to track state during the build process
struct BuildSchema<'a> {
    builder: &'a Builder,

    /// Maps model names to identifiers. Identifiers are reserved before the
    /// models themselves are built.
    model_lookup: IndexMap<String, ModelId>,
}

impl Builder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declares a model. `f` adds its fields.
    pub fn model(&mut self, name: &str, f: impl FnOnce(&mut ModelBuilder)) -> &mut Self {
        let mut model = ModelBuilder {
            name: name.to_string(),
            fields: vec![],
        };
        f(&mut model);
        self.models.push(model);
        self
    }

    pub fn build(&self) -> Result<Schema> {
        let mut build = BuildSchema {
            builder: self,
            model_lookup: IndexMap::new(),
        };

        for (index, model) in self.models.iter().enumerate() {
            if build
                .model_lookup
                .insert(model.name.clone(), ModelId(index))
                .is_some()
            {
                return Err(Error::invalid_schema(format!(
                    "model `{}` is declared more than once",
                    model.name
                )));
            }
        }

        let models = self
            .models
            .iter()
            .enumerate()
            .map(|(index, model)| build.build_model(ModelId(index), model))
            .collect::<Result<Vec<_>>>()?;

        let schema = Schema {
            models,
            names: build.model_lookup,
        };

        verify_inverses(&schema)?;

        Ok(schema)
    }
}

impl ModelBuilder {
    /// Declares a scalar field of primitive type `ty`.
    pub fn primitive(&mut self, name: &str, ty: stmt::Type) -> &mut Self {
        self.push(name, FieldDeclTy::Primitive(ty))
    }

    /// Declares a field holding the identifier of one `target` record.
    pub fn many_to_one(&mut self, name: &str, target: &str) -> &mut Self {
        self.push(
            name,
            FieldDeclTy::ManyToOne {
                target: target.to_string(),
            },
        )
    }

    /// Declares a collection of `target` records owned by this model.
    /// `inverse` is the many-to-one field on `target` pointing back here.
    pub fn one_to_many(&mut self, name: &str, target: &str, inverse: &str) -> &mut Self {
        self.push(
            name,
            FieldDeclTy::OneToMany {
                target: target.to_string(),
                inverse: inverse.to_string(),
            },
        )
    }

    /// Declares a list of `target` identifiers.
    pub fn many_to_many(&mut self, name: &str, target: &str) -> &mut Self {
        self.push(
            name,
            FieldDeclTy::ManyToMany {
                target: target.to_string(),
            },
        )
    }

    /// Declares a polymorphic reference. An empty `targets` accepts any model.
    pub fn reference(&mut self, name: &str, targets: &[&str]) -> &mut Self {
        self.push(
            name,
            FieldDeclTy::Reference {
                targets: targets.iter().map(|target| target.to_string()).collect(),
            },
        )
    }

    fn push(&mut self, name: &str, ty: FieldDeclTy) -> &mut Self {
        self.fields.push(FieldDecl {
            name: name.to_string(),
            ty,
        });
        self
    }
}

impl BuildSchema<'_> {
    fn build_model(&self, id: ModelId, decl: &ModelBuilder) -> Result<Model> {
        let mut fields: Vec<Field> = Vec::with_capacity(decl.fields.len());

        for (index, field) in decl.fields.iter().enumerate() {
            if field.name == "id" {
                return Err(Error::invalid_schema(format!(
                    "`{}.id` is reserved for the record identifier",
                    decl.name
                )));
            }

            if fields.iter().any(|existing| existing.name == field.name) {
                return Err(Error::invalid_schema(format!(
                    "field `{}.{}` is declared more than once",
                    decl.name, field.name
                )));
            }

            let ty = self
                .build_field_ty(&field.ty)
                .map_err(|err| err.context(crate::err!("field `{}.{}`", decl.name, field.name)))?;

            fields.push(Field {
                id: id.field(index),
                name: field.name.clone(),
                ty,
            });
        }

        Ok(Model {
            id,
            name: decl.name.clone(),
            fields,
        })
    }

    fn build_field_ty(&self, decl: &FieldDeclTy) -> Result<FieldTy> {
        Ok(match decl {
            FieldDeclTy::Primitive(ty) => FieldTy::Primitive(FieldPrimitive { ty: *ty }),
            FieldDeclTy::ManyToOne { target } => FieldTy::ManyToOne(ManyToOne {
                target: self.resolve(target)?,
            }),
            FieldDeclTy::OneToMany { target, inverse } => {
                let target = self.resolve(target)?;
                FieldTy::OneToMany(OneToMany {
                    target,
                    inverse: self.resolve_field(target, inverse)?,
                })
            }
            FieldDeclTy::ManyToMany { target } => FieldTy::ManyToMany(ManyToMany {
                target: self.resolve(target)?,
            }),
            FieldDeclTy::Reference { targets } => FieldTy::Reference(ReferenceTargets {
                targets: targets
                    .iter()
                    .map(|target| self.resolve(target))
                    .collect::<Result<_>>()?,
            }),
        })
    }

    fn resolve(&self, name: &str) -> Result<ModelId> {
        self.model_lookup
            .get(name)
            .copied()
            .ok_or_else(|| Error::invalid_schema(format!("relation target `{name}` is not a model")))
    }

    /// Resolve a field of another model by name. Only the declaration is
    /// needed; the field's type is checked once every model is built.
    fn resolve_field(&self, model: ModelId, name: &str) -> Result<FieldId> {
        let decl = &self.builder.models[model.0];

        decl.fields
            .iter()
            .position(|field| field.name == name)
            .map(|index| model.field(index))
            .ok_or_else(|| {
                Error::invalid_schema(format!(
                    "inverse field `{}.{name}` does not exist",
                    decl.name
                ))
            })
    }
}

/// Every one-to-many inverse must be a many-to-one pointing back at the
/// owning model.
fn verify_inverses(schema: &Schema) -> Result<()> {
    for model in schema.models() {
        for field in &model.fields {
            let FieldTy::OneToMany(rel) = &field.ty else {
                continue;
            };

            let inverse = schema.field(rel.inverse);
            match &inverse.ty {
                FieldTy::ManyToOne(back) if back.target == model.id => {}
                _ => {
                    return Err(Error::invalid_schema(format!(
                        "inverse of `{}.{}` must be a many-to-one to `{}`; `{}.{}` is not",
                        model.name,
                        field.name,
                        model.name,
                        schema.model(rel.target).name,
                        inverse.name,
                    )))
                }
            }
        }
    }

    Ok(())
}
