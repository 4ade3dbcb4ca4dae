use super::Error;

/// Error when a value assigned to a record does not fit the field.
#[derive(Debug)]
pub(super) struct ValidationError {
    pub(super) kind: ValidationErrorKind,
}

#[derive(Debug)]
pub(super) enum ValidationErrorKind {
    /// The value's shape does not match the field kind
    Kind {
        field: Box<str>,
        expected: &'static str,
        actual: &'static str,
    },

    /// The model has no field with the given name
    UnknownField { model: Box<str>, field: Box<str> },

    /// A related record belongs to a model the field does not accept
    WrongModel {
        field: Box<str>,
        expected: Box<str>,
        actual: Box<str>,
    },

    /// A record without an identifier was used where one is required
    Unsaved { field: Box<str> },

    /// Anything else, with a message
    Other(Box<str>),
}

impl std::error::Error for ValidationError {}

impl core::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        use ValidationErrorKind::*;

        match &self.kind {
            Kind {
                field,
                expected,
                actual,
            } => write!(
                f,
                "invalid value for field `{field}`: {expected} field cannot hold {actual}"
            ),
            UnknownField { model, field } => {
                write!(f, "model `{model}` has no field `{field}`")
            }
            WrongModel {
                field,
                expected,
                actual,
            } => write!(
                f,
                "invalid value for field `{field}`: expected a record of `{expected}`, got `{actual}`"
            ),
            Unsaved { field } => write!(
                f,
                "invalid value for field `{field}`: record has no identifier yet"
            ),
            Other(message) => write!(f, "validation failed: {message}"),
        }
    }
}

impl Error {
    /// Creates a validation error for a value whose shape does not match the
    /// field kind.
    pub fn validation_kind(
        field: impl Into<String>,
        expected: &'static str,
        actual: &'static str,
    ) -> Error {
        Error::validation(ValidationErrorKind::Kind {
            field: field.into().into(),
            expected,
            actual,
        })
    }

    /// Creates a validation error for a field name the model does not declare.
    pub fn unknown_field(model: impl Into<String>, field: impl Into<String>) -> Error {
        Error::validation(ValidationErrorKind::UnknownField {
            model: model.into().into(),
            field: field.into().into(),
        })
    }

    /// Creates a validation error for a related record of the wrong model.
    pub fn wrong_model(
        field: impl Into<String>,
        expected: impl Into<String>,
        actual: impl Into<String>,
    ) -> Error {
        Error::validation(ValidationErrorKind::WrongModel {
            field: field.into().into(),
            expected: expected.into().into(),
            actual: actual.into().into(),
        })
    }

    /// Creates a validation error for an unsaved record used as a reference.
    pub fn unsaved_record(field: impl Into<String>) -> Error {
        Error::validation(ValidationErrorKind::Unsaved {
            field: field.into().into(),
        })
    }

    /// Creates a validation error with a free-form message.
    pub fn validation_failed(message: impl Into<String>) -> Error {
        Error::validation(ValidationErrorKind::Other(message.into().into()))
    }

    fn validation(kind: ValidationErrorKind) -> Error {
        Error::from(super::ErrorKind::Validation(ValidationError { kind }))
    }

    /// Returns `true` if this error is a validation error.
    pub fn is_validation(&self) -> bool {
        self.find_kind(|kind| matches!(kind, super::ErrorKind::Validation(_)))
    }
}
