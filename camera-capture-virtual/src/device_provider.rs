//! Virtual capture devices.
//!
//! Devices are fixed at construction. Configuration locks and focus points
//! are tracked in memory so callers can observe what a coordinator did.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use parking_lot::Mutex;

use camera_capture_core::models::device::{
    CameraPosition, CaptureDevice, DeviceId, FocusMode, FocusPoint, MediaRole,
};
use camera_capture_core::models::error::CameraError;
use camera_capture_core::models::preset::QualityPreset;
use camera_capture_core::traits::device_provider::DeviceProvider;

/// A camera with flash and every focus mode, supporting `presets`.
pub fn virtual_camera(id: &str, position: CameraPosition, presets: &[QualityPreset]) -> CaptureDevice {
    CaptureDevice {
        id: DeviceId::new(id),
        name: format!("Virtual {} camera", id),
        role: MediaRole::Video,
        position,
        has_flash: position == CameraPosition::Back,
        focus_modes: vec![FocusMode::Locked, FocusMode::AutoFocus, FocusMode::ContinuousAutoFocus],
        presets: presets.to_vec(),
    }
}

pub fn virtual_microphone(id: &str) -> CaptureDevice {
    CaptureDevice {
        id: DeviceId::new(id),
        name: format!("Virtual {} microphone", id),
        role: MediaRole::Audio,
        position: CameraPosition::Unspecified,
        has_flash: false,
        focus_modes: Vec::new(),
        presets: Vec::new(),
    }
}

/// In-memory `DeviceProvider`.
pub struct VirtualDeviceProvider {
    devices: Vec<CaptureDevice>,
    locked: Mutex<HashSet<DeviceId>>,
    refuse_locks: AtomicBool,
    lock_count: AtomicUsize,
    focus_points: Mutex<HashMap<DeviceId, FocusPoint>>,
    discovery_passes: AtomicUsize,
}

impl VirtualDeviceProvider {
    pub fn new(devices: Vec<CaptureDevice>) -> Self {
        Self {
            devices,
            locked: Mutex::new(HashSet::new()),
            refuse_locks: AtomicBool::new(false),
            lock_count: AtomicUsize::new(0),
            focus_points: Mutex::new(HashMap::new()),
            discovery_passes: AtomicUsize::new(0),
        }
    }

    /// Back and front camera plus a microphone, like a typical phone.
    pub fn phone() -> Self {
        use QualityPreset::{High, Low, Medium};
        Self::new(vec![
            virtual_camera("back", CameraPosition::Back, &[High, Medium, Low]),
            virtual_camera("front", CameraPosition::Front, &[Medium, Low]),
            virtual_microphone("builtin"),
        ])
    }

    /// A single back camera and a microphone.
    pub fn back_only() -> Self {
        use QualityPreset::{High, Low, Medium};
        Self::new(vec![
            virtual_camera("back", CameraPosition::Back, &[High, Medium, Low]),
            virtual_microphone("builtin"),
        ])
    }

    /// Make every lock attempt fail, as if another client held the device.
    pub fn refuse_locks(&self, refuse: bool) {
        self.refuse_locks.store(refuse, Ordering::SeqCst);
    }

    pub fn is_locked(&self, device: &DeviceId) -> bool {
        self.locked.lock().contains(device)
    }

    /// Number of successful lock acquisitions so far.
    pub fn lock_count(&self) -> usize {
        self.lock_count.load(Ordering::SeqCst)
    }

    pub fn focus_point(&self, device: &DeviceId) -> Option<FocusPoint> {
        self.focus_points.lock().get(device).copied()
    }

    pub fn discovery_passes(&self) -> usize {
        self.discovery_passes.load(Ordering::SeqCst)
    }
}

impl DeviceProvider for VirtualDeviceProvider {
    fn devices(&self) -> Vec<CaptureDevice> {
        self.discovery_passes.fetch_add(1, Ordering::SeqCst);
        self.devices.clone()
    }

    fn lock_for_configuration(&self, device: &DeviceId) -> Result<(), CameraError> {
        if self.refuse_locks.load(Ordering::SeqCst) {
            return Err(CameraError::ConfigurationFailed(format!("{} is in use", device)));
        }
        if !self.locked.lock().insert(device.clone()) {
            return Err(CameraError::ConfigurationFailed(format!("{} already locked", device)));
        }
        self.lock_count.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn unlock_for_configuration(&self, device: &DeviceId) {
        self.locked.lock().remove(device);
    }

    fn set_focus_point(&self, device: &DeviceId, point: FocusPoint) -> Result<(), CameraError> {
        if !self.is_locked(device) {
            return Err(CameraError::ConfigurationFailed(format!("{} is not locked", device)));
        }
        self.focus_points.lock().insert(device.clone(), point);
        Ok(())
    }
}
