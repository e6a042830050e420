//! Per-request caller identity.

use uuid::Uuid;

use nightingale_entity::user::UserRole;

/// The authenticated caller, as established by the API layer.
///
/// Services trust this struct, not request payloads, for every
/// authorization decision.
#[derive(Debug, Clone, Copy)]
pub struct RequestContext {
    /// Caller's identity.
    pub user_id: Uuid,
    /// Caller's role.
    pub role: UserRole,
}

impl RequestContext {
    /// Create a new request context.
    pub fn new(user_id: Uuid, role: UserRole) -> Self {
        Self { user_id, role }
    }

    /// Whether the caller holds the admin role.
    pub fn is_admin(&self) -> bool {
        self.role == UserRole::Admin
    }
}
