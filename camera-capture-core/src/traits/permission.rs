use crate::models::state::Authorization;

/// Source of camera access authorization.
pub trait PermissionProvider: Send + Sync {
    fn check_authorization(&self) -> Authorization;
}
