use super::{Input, Record};
use std::sync::Arc;
use tally_core::{
    schema::{Field, FieldTy, ModelId, ReferenceTargets, Schema},
    stmt::{Id, Reference, Value},
    Error, Result,
};

/// A field value in its stored form, one variant per field kind.
///
/// Many-to-one and reference fields hold identifiers only; the record they
/// point at is never owned. One-to-many fields own their sub-records.
#[derive(Debug, Clone)]
pub(crate) enum FieldValue {
    Scalar(Value),
    ManyToOne(Option<Id>),
    Reference(Option<Reference>),
    OneToMany(Vec<Record>),
    ManyToMany(Vec<Id>),
}

impl FieldValue {
    /// Checks `input` against the kind of `field` and converts it.
    pub(crate) fn from_input(schema: &Arc<Schema>, field: &Field, input: Input) -> Result<Self> {
        match &field.ty {
            FieldTy::Primitive(primitive) => match input {
                Input::Value(value) if value.is_a(&primitive.ty) => Ok(FieldValue::Scalar(value)),
                input => Err(Error::validation_kind(
                    &field.name,
                    field.kind().as_str(),
                    input.shape(),
                )),
            },
            FieldTy::ManyToOne(rel) => match input {
                Input::Value(Value::Null) => Ok(FieldValue::ManyToOne(None)),
                input => Ok(FieldValue::ManyToOne(Some(expect_target_id(
                    schema, field, rel.target, input,
                )?))),
            },
            FieldTy::Reference(targets) => match input {
                Input::Value(Value::Null) => Ok(FieldValue::Reference(None)),
                input => Ok(FieldValue::Reference(Some(expect_reference(
                    schema, field, targets, input,
                )?))),
            },
            FieldTy::OneToMany(rel) => {
                let records = expect_list(field, input)?
                    .into_iter()
                    .map(|item| expect_sub_record(schema, field, rel.target, item))
                    .collect::<Result<_>>()?;
                Ok(FieldValue::OneToMany(records))
            }
            FieldTy::ManyToMany(rel) => {
                let ids = expect_list(field, input)?
                    .into_iter()
                    .map(|item| expect_target_id(schema, field, rel.target, item))
                    .collect::<Result<_>>()?;
                Ok(FieldValue::ManyToMany(ids))
            }
        }
    }

    /// Structural equality, used to detect assignments that undo a change.
    ///
    /// Sub-records are never compared by value; one-to-many fields are judged
    /// by their collection tracker instead.
    pub(crate) fn same_as(&self, other: &FieldValue) -> bool {
        match (self, other) {
            (FieldValue::Scalar(a), FieldValue::Scalar(b)) => same_scalar(a, b),
            (FieldValue::ManyToOne(a), FieldValue::ManyToOne(b)) => a == b,
            (FieldValue::Reference(a), FieldValue::Reference(b)) => a == b,
            (FieldValue::ManyToMany(a), FieldValue::ManyToMany(b)) => a == b,
            _ => false,
        }
    }

    /// The value as [`Record::get`] reports it.
    pub(crate) fn to_value(&self) -> Value {
        match self {
            FieldValue::Scalar(value) => value.clone(),
            FieldValue::ManyToOne(id) => (*id).into(),
            FieldValue::Reference(reference) => reference.clone().into(),
            FieldValue::ManyToMany(ids) => ids.clone().into(),
            FieldValue::OneToMany(records) => Value::List(
                records
                    .iter()
                    .map(|record| {
                        let mut map = record.values_map();
                        if let Some(id) = record.id() {
                            map.insert("id", id);
                        }
                        Value::Map(map)
                    })
                    .collect(),
            ),
        }
    }
}

/// Floats compare by total order, so a `NaN` assigned back over a `NaN`
/// counts as unchanged.
fn same_scalar(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::F64(a), Value::F64(b)) => a.total_cmp(b).is_eq(),
        _ => a == b,
    }
}

fn expect_list(field: &Field, input: Input) -> Result<Vec<Input>> {
    match input {
        Input::List(items) => Ok(items),
        Input::Value(Value::List(items)) => Ok(items.into_iter().map(Input::Value).collect()),
        Input::Value(Value::Null) => Ok(vec![]),
        input => Err(Error::validation_kind(
            &field.name,
            field.kind().as_str(),
            input.shape(),
        )),
    }
}

/// Identifier of a saved record of `target`, given as a record, an `Id` or
/// a non-negative integer.
fn expect_target_id(
    schema: &Schema,
    field: &Field,
    target: ModelId,
    input: Input,
) -> Result<Id> {
    match input {
        Input::Value(Value::Id(id)) => Ok(id),
        Input::Value(Value::I64(id)) => Id::from_i64(id).map_err(|err| {
            err.context(Error::validation_kind(
                &field.name,
                field.kind().as_str(),
                "negative integer",
            ))
        }),
        Input::Record(record) => {
            if record.model != target {
                return Err(Error::wrong_model(
                    &field.name,
                    &schema.model(target).name,
                    record.model_name(),
                ));
            }
            record.id().ok_or_else(|| Error::unsaved_record(&field.name))
        }
        input => Err(Error::validation_kind(
            &field.name,
            field.kind().as_str(),
            input.shape(),
        )),
    }
}

fn expect_reference(
    schema: &Schema,
    field: &Field,
    targets: &ReferenceTargets,
    input: Input,
) -> Result<Reference> {
    let reference = match input {
        Input::Value(Value::Reference(reference)) => reference,
        Input::Value(Value::String(encoded)) => encoded.parse::<Reference>().map_err(|err| {
            err.context(Error::validation_kind(
                &field.name,
                field.kind().as_str(),
                "malformed string",
            ))
        })?,
        Input::Record(record) => {
            let id = record.id().ok_or_else(|| Error::unsaved_record(&field.name))?;
            Reference::new(record.model_name(), id)
        }
        input => {
            return Err(Error::validation_kind(
                &field.name,
                field.kind().as_str(),
                input.shape(),
            ))
        }
    };

    let accepted = schema
        .model_by_name(reference.model())
        .is_some_and(|model| targets.accepts(model.id));

    if !accepted {
        let expected = targets
            .targets
            .iter()
            .map(|target| schema.model(*target).name.as_str())
            .collect::<Vec<_>>();
        let expected = if expected.is_empty() {
            "any model".to_string()
        } else {
            expected.join("|")
        };
        return Err(Error::wrong_model(&field.name, expected, reference.model()));
    }

    Ok(reference)
}

/// A sub-record of `target`: a record, a mapping of its initial values, or
/// the identifier of a stored one.
fn expect_sub_record(
    schema: &Arc<Schema>,
    field: &Field,
    target: ModelId,
    input: Input,
) -> Result<Record> {
    match input {
        Input::Record(record) if record.model == target => Ok(record),
        Input::Record(record) => Err(Error::wrong_model(
            &field.name,
            &schema.model(target).name,
            record.model_name(),
        )),
        Input::Value(Value::Map(values)) => Record::from_values_in(schema, target, values),
        Input::Value(Value::Id(id)) => Ok(Record::empty(schema, target, Some(id))),
        Input::Value(Value::I64(id)) => Ok(Record::empty(schema, target, Some(Id::from_i64(id)?))),
        input => Err(Error::validation_kind(
            &field.name,
            field.kind().as_str(),
            input.shape(),
        )),
    }
}
