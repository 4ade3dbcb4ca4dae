use super::Error;
use crate::Permission;

/// Error raised by the access guard when an action is refused.
///
/// Carries enough information for a user-facing message: the model and,
/// when the refusal came from a button restriction, the button name.
#[derive(Debug)]
pub(super) enum PermissionDeniedError {
    Model {
        model: Box<str>,
        permission: Permission,
    },
    Button {
        model: Box<str>,
        button: Box<str>,
    },
}

impl std::error::Error for PermissionDeniedError {}

impl core::fmt::Display for PermissionDeniedError {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        match self {
            PermissionDeniedError::Model { model, permission } => write!(
                f,
                "permission denied: {permission} access to `{model}` is not allowed"
            ),
            PermissionDeniedError::Button { model, button } => write!(
                f,
                "permission denied: calling button `{button}` on `{model}` is not allowed"
            ),
        }
    }
}

impl Error {
    /// Creates a permission error for a model-level access check.
    pub fn model_permission_denied(model: impl Into<String>, permission: Permission) -> Error {
        Error::from(super::ErrorKind::PermissionDenied(
            PermissionDeniedError::Model {
                model: model.into().into(),
                permission,
            },
        ))
    }

    /// Creates a permission error for a group-restricted button.
    pub fn button_permission_denied(model: impl Into<String>, button: impl Into<String>) -> Error {
        Error::from(super::ErrorKind::PermissionDenied(
            PermissionDeniedError::Button {
                model: model.into().into(),
                button: button.into().into(),
            },
        ))
    }

    /// Returns `true` if this error is a permission error.
    pub fn is_permission_denied(&self) -> bool {
        self.find_kind(|kind| matches!(kind, super::ErrorKind::PermissionDenied(_)))
    }

    /// The model named by a permission error, if this is one.
    pub fn denied_model(&self) -> Option<&str> {
        self.chain().find_map(|err| match err.kind() {
            super::ErrorKind::PermissionDenied(PermissionDeniedError::Model { model, .. })
            | super::ErrorKind::PermissionDenied(PermissionDeniedError::Button { model, .. }) => {
                Some(&**model)
            }
            _ => None,
        })
    }

    /// The button named by a permission error, if the refusal came from a
    /// button restriction.
    pub fn denied_button(&self) -> Option<&str> {
        self.chain().find_map(|err| match err.kind() {
            super::ErrorKind::PermissionDenied(PermissionDeniedError::Button {
                button, ..
            }) => Some(&**button),
            _ => None,
        })
    }
}
