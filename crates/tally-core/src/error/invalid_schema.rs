use super::Error;

/// Error when a schema definition is invalid.
///
/// This occurs when:
/// - Two models, or two fields of one model, share a name
/// - A relation names a target model that was never registered
/// - A one-to-many field's inverse is missing or points elsewhere
///
/// These errors are caught by `schema::Builder::build`.
#[derive(Debug)]
pub(super) struct InvalidSchema {
    message: Box<str>,
}

impl std::error::Error for InvalidSchema {}

impl core::fmt::Display for InvalidSchema {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(f, "invalid schema: {}", self.message)
    }
}

impl Error {
    /// Creates an invalid schema error.
    pub fn invalid_schema(message: impl Into<String>) -> Error {
        Error::from(super::ErrorKind::InvalidSchema(InvalidSchema {
            message: message.into().into(),
        }))
    }

    /// Returns `true` if this error is an invalid schema error.
    pub fn is_invalid_schema(&self) -> bool {
        self.find_kind(|kind| matches!(kind, super::ErrorKind::InvalidSchema(_)))
    }
}
