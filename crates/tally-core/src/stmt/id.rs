use crate::{err, Result};
use serde::{Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// The persistent key of a stored record.
#[derive(Copy, Clone, Hash, Eq, PartialEq, PartialOrd, Ord)]
pub struct Id(u64);

impl Id {
    pub const fn from_u64(id: u64) -> Self {
        Self(id)
    }

    pub const fn to_u64(self) -> u64 {
        self.0
    }

    /// Converts a raw integer, rejecting negative values.
    pub fn from_i64(id: i64) -> Result<Self> {
        u64::try_from(id)
            .map(Self)
            .map_err(|_| err!("identifier must not be negative; got {id}"))
    }
}

impl From<u64> for Id {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

impl FromStr for Id {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self> {
        Ok(Self(s.trim().parse::<u64>()?))
    }
}

impl Serialize for Id {
    fn serialize<S: Serializer>(&self, serializer: S) -> core::result::Result<S::Ok, S::Error> {
        serializer.serialize_u64(self.0)
    }
}

impl fmt::Display for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl fmt::Debug for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Id({})", self.0)
    }
}
