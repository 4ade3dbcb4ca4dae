use tally_core::Principal;

/// The session an operation runs in: who is acting, and whether access
/// checks apply to them.
///
/// Passed explicitly to every guarded call; there is no ambient session.
#[derive(Debug, Clone)]
pub struct Context {
    principal: Principal,
    check_access: bool,
}

impl Context {
    /// A session acting as `principal`, with access checks enabled.
    pub fn new(principal: Principal) -> Self {
        Self {
            principal,
            check_access: true,
        }
    }

    /// The administrative session. Access checks are disabled.
    pub fn root() -> Self {
        Self {
            principal: Principal::new("root"),
            check_access: false,
        }
    }

    pub fn with_check_access(mut self, check_access: bool) -> Self {
        self.check_access = check_access;
        self
    }

    pub fn principal(&self) -> &Principal {
        &self.principal
    }

    pub fn check_access(&self) -> bool {
        self.check_access
    }
}
