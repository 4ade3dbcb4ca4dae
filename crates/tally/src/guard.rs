//! Gates model actions ("buttons") by role-based access.

mod registry;
pub use registry::{AccessId, AccessRegistry, ModelAccess};

use crate::{Context, Record};
use std::collections::HashSet;
use tally_core::{stmt::Id, Error, GroupId, Permission, Principal, Result, Store};
use tracing::debug;

/// The access subsystem the guard consults.
///
/// Queried on every invocation; implementations must not assume answers
/// are cached.
pub trait AccessControl {
    /// Whether `principal` holds `permission` on the model named `model`.
    fn has_model_permission(&self, model: &str, principal: &Principal, permission: Permission)
        -> bool;

    /// Groups allowed to call `button` on `model`. Empty when unrestricted.
    fn button_groups(&self, model: &str, button: &str) -> HashSet<GroupId>;

    /// Groups `principal` belongs to.
    fn principal_groups(&self, principal: &Principal) -> HashSet<GroupId>;
}

/// Outcome of an access check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Allowed,
    Denied(Denial),
}

/// Why an invocation was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Denial {
    /// The principal cannot read the model
    ModelRead,

    /// The button is unrestricted and the principal cannot write the model
    ModelWrite,

    /// The button is restricted to groups the principal is not in
    Button,
}

/// Checks button invocations against an [`AccessControl`].
///
/// An invocation is allowed when access checks are off for the session.
/// Otherwise the principal needs read access to the model, and then either
/// membership in one of the button's groups (restricted buttons) or write
/// access to the model (unrestricted buttons).
#[derive(Debug)]
pub struct AccessGuard<'a, A: ?Sized> {
    access: &'a A,
}

impl<'a, A: AccessControl + ?Sized> AccessGuard<'a, A> {
    pub fn new(access: &'a A) -> Self {
        Self { access }
    }

    pub fn decide(&self, cx: &Context, model: &str, button: &str) -> Decision {
        if !cx.check_access() {
            return Decision::Allowed;
        }

        let principal = cx.principal();

        if !self
            .access
            .has_model_permission(model, principal, Permission::Read)
        {
            return Decision::Denied(Denial::ModelRead);
        }

        let button_groups = self.access.button_groups(model, button);
        if !button_groups.is_empty() {
            let groups = self.access.principal_groups(principal);
            return if groups.is_disjoint(&button_groups) {
                Decision::Denied(Denial::Button)
            } else {
                Decision::Allowed
            };
        }

        if self
            .access
            .has_model_permission(model, principal, Permission::Write)
        {
            Decision::Allowed
        } else {
            Decision::Denied(Denial::ModelWrite)
        }
    }

    /// Fails with a permission error unless `button` may be called on
    /// `model` in this session.
    pub fn check(&self, cx: &Context, model: &str, button: &str) -> Result<()> {
        let decision = self.decide(cx, model, button);
        debug!(model, button, principal = %cx.principal(), ?decision, "button access");

        match decision {
            Decision::Allowed => Ok(()),
            Decision::Denied(Denial::ModelRead) => {
                Err(Error::model_permission_denied(model, Permission::Read))
            }
            Decision::Denied(Denial::ModelWrite) => {
                Err(Error::model_permission_denied(model, Permission::Write))
            }
            Decision::Denied(Denial::Button) => Err(Error::button_permission_denied(model, button)),
        }
    }

    /// Checks access, then runs `action`.
    pub fn invoke<T>(
        &self,
        cx: &Context,
        model: &str,
        button: &str,
        action: impl FnOnce() -> Result<T>,
    ) -> Result<T> {
        self.check(cx, model, button)?;
        action()
    }

    /// Fails with a permission error unless the session holds `permission`
    /// on `model`.
    pub fn check_model(&self, cx: &Context, model: &str, permission: Permission) -> Result<()> {
        if !cx.check_access() {
            return Ok(());
        }

        let allowed = self
            .access
            .has_model_permission(model, cx.principal(), permission);
        debug!(model, %permission, principal = %cx.principal(), allowed, "model access");

        if allowed {
            Ok(())
        } else {
            Err(Error::model_permission_denied(model, permission))
        }
    }

    /// Saves `record` after checking write access to its model.
    pub fn save<S: Store + ?Sized>(
        &self,
        cx: &Context,
        record: &mut Record,
        store: &mut S,
    ) -> Result<Id> {
        self.check_model(cx, record.model_name(), Permission::Write)?;
        record.save(store)
    }
}
