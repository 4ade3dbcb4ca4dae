use super::Id;
use crate::{err, Result};
use std::fmt;
use std::str::FromStr;

/// A polymorphic pointer to a stored record: the target model's name plus
/// the record's identifier.
///
/// Encodes on the wire as `"<model>,<id>"`.
#[derive(Debug, Clone, Hash, Eq, PartialEq)]
pub struct Reference {
    model: String,
    id: Id,
}

impl Reference {
    pub fn new(model: impl Into<String>, id: Id) -> Self {
        Self {
            model: model.into(),
            id,
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn id(&self) -> Id {
        self.id
    }
}

impl FromStr for Reference {
    type Err = crate::Error;

    /// Parses the `"<model>,<id>"` encoding. Model names may not contain a
    /// comma; the identifier is everything after the last one.
    fn from_str(s: &str) -> Result<Self> {
        let Some((model, id)) = s.rsplit_once(',') else {
            return Err(err!("reference `{s}` is not of the form `<model>,<id>`"));
        };

        if model.is_empty() {
            return Err(err!("reference `{s}` has an empty model name"));
        }

        Ok(Self::new(model, id.parse::<Id>()?))
    }
}

impl fmt::Display for Reference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.model, self.id)
    }
}
