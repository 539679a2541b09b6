use crate::models::device::{CaptureDevice, DeviceId, FocusPoint};
use crate::models::error::CameraError;

/// Interface for enumerating and configuring platform capture devices.
///
/// Implemented by:
/// - `VirtualDeviceProvider` (camera-capture-virtual)
pub trait DeviceProvider: Send + Sync {
    /// All devices currently present. One call is one discovery pass.
    fn devices(&self) -> Vec<CaptureDevice>;

    /// Acquire exclusive configuration access to a device.
    ///
    /// Prefer `ConfigurationLock::acquire`, which releases on drop.
    fn lock_for_configuration(&self, device: &DeviceId) -> Result<(), CameraError>;

    /// Release access taken by `lock_for_configuration`.
    fn unlock_for_configuration(&self, device: &DeviceId);

    /// Move the focus point of interest. Requires the configuration lock.
    fn set_focus_point(&self, device: &DeviceId, point: FocusPoint) -> Result<(), CameraError>;
}
