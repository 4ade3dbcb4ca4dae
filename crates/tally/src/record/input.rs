use super::Record;
use tally_core::stmt::{Id, Reference, Value, ValueMap};

/// A value offered to [`Record::set`].
///
/// Besides plain values, relation fields accept records: a many-to-one or
/// reference field takes a saved record, a one-to-many field takes a list of
/// records (saved or not).
#[derive(Debug, Clone)]
pub enum Input {
    Value(Value),
    Record(Record),
    List(Vec<Input>),
}

impl Input {
    /// A short name for the shape of the input, used in error messages.
    pub fn shape(&self) -> &'static str {
        match self {
            Input::Value(value) => value.shape(),
            Input::Record(_) => "record",
            Input::List(_) => "list",
        }
    }
}

macro_rules! impl_from_value {
    ( $($t:ty),+ $(,)? ) => {
        $(
            impl From<$t> for Input {
                fn from(src: $t) -> Input {
                    Input::Value(src.into())
                }
            }
        )+
    };
}

impl_from_value!(
    Value,
    bool,
    i64,
    i32,
    f64,
    &str,
    String,
    Id,
    Reference,
    ValueMap,
    Option<Id>,
    Option<Reference>,
    Vec<Value>,
    Vec<ValueMap>,
    Vec<Id>,
    Vec<i64>,
);

impl From<Record> for Input {
    fn from(src: Record) -> Input {
        Input::Record(src)
    }
}

impl From<&Record> for Input {
    fn from(src: &Record) -> Input {
        Input::Record(src.clone())
    }
}

impl From<Option<Record>> for Input {
    fn from(src: Option<Record>) -> Input {
        match src {
            Some(record) => Input::Record(record),
            None => Input::Value(Value::Null),
        }
    }
}

impl From<Vec<Record>> for Input {
    fn from(src: Vec<Record>) -> Input {
        Input::List(src.into_iter().map(Input::Record).collect())
    }
}

impl From<&[Record]> for Input {
    fn from(src: &[Record]) -> Input {
        Input::List(src.iter().cloned().map(Input::Record).collect())
    }
}

impl From<Vec<Input>> for Input {
    fn from(src: Vec<Input>) -> Input {
        Input::List(src)
    }
}
