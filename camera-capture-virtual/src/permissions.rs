//! Scripted camera authorization.

use std::sync::atomic::{AtomicUsize, Ordering};

use parking_lot::Mutex;

use camera_capture_core::models::state::Authorization;
use camera_capture_core::traits::permission::PermissionProvider;

pub struct VirtualPermission {
    status: Mutex<Authorization>,
    checks: AtomicUsize,
}

impl VirtualPermission {
    pub fn new(status: Authorization) -> Self {
        Self {
            status: Mutex::new(status),
            checks: AtomicUsize::new(0),
        }
    }

    pub fn authorized() -> Self {
        Self::new(Authorization::Authorized)
    }

    pub fn denied() -> Self {
        Self::new(Authorization::Denied)
    }

    /// Simulate the user changing the setting.
    pub fn set(&self, status: Authorization) {
        *self.status.lock() = status;
    }

    /// How many times authorization was checked.
    pub fn checks(&self) -> usize {
        self.checks.load(Ordering::SeqCst)
    }
}

impl PermissionProvider for VirtualPermission {
    fn check_authorization(&self) -> Authorization {
        self.checks.fetch_add(1, Ordering::SeqCst);
        *self.status.lock()
    }
}
