/// The type of a scalar field.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Type {
    /// Boolean value
    Bool,

    /// Signed 64-bit integer
    I64,

    /// 64-bit float
    F64,

    /// String type
    String,
}

impl Type {
    pub fn is_bool(&self) -> bool {
        matches!(self, Self::Bool)
    }

    pub fn is_i64(&self) -> bool {
        matches!(self, Self::I64)
    }

    pub fn is_f64(&self) -> bool {
        matches!(self, Self::F64)
    }

    pub fn is_string(&self) -> bool {
        matches!(self, Self::String)
    }
}
