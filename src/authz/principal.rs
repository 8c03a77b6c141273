use super::{Capability, Role};

/// Authenticated caller resolved from the bearer token.
///
/// The role is read from the `users` row on every request, so a deleted
/// account stops authenticating even while its token is still valid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Caller {
    pub user_id: i64,
    pub role: Role,
}

impl Caller {
    pub fn new(user_id: i64, role: Role) -> Self {
        Self { user_id, role }
    }

    pub fn can(&self, capability: Capability) -> bool {
        self.role.can(capability)
    }
}
