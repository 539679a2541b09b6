use crate::models::device::{CameraPosition, CaptureDevice, DeviceInput, MediaRole};
use crate::traits::device_provider::DeviceProvider;

/// Devices found by one discovery pass, one per slot.
///
/// Absent slots are normal: a device may have no front camera, or no
/// camera at all.
#[derive(Debug, Clone, Default)]
pub struct DeviceCatalog {
    front_camera: Option<DeviceInput>,
    back_camera: Option<DeviceInput>,
    microphone: Option<DeviceInput>,
}

impl DeviceCatalog {
    /// Scan `provider` and classify its devices by role and position.
    ///
    /// The first device found for a slot wins; later duplicates are
    /// ignored. Cameras with an unspecified position fill no slot.
    pub fn discover(provider: &dyn DeviceProvider) -> Self {
        let mut catalog = Self::default();
        for device in provider.devices() {
            catalog.classify(device);
        }
        log::info!(
            "Device discovery: front={}, back={}, microphone={}",
            describe(&catalog.front_camera),
            describe(&catalog.back_camera),
            describe(&catalog.microphone),
        );
        catalog
    }

    fn classify(&mut self, device: CaptureDevice) {
        let slot = match (device.role, device.position) {
            (MediaRole::Video, CameraPosition::Front) => &mut self.front_camera,
            (MediaRole::Video, CameraPosition::Back) => &mut self.back_camera,
            (MediaRole::Audio, _) => &mut self.microphone,
            (MediaRole::Video, CameraPosition::Unspecified) => {
                log::debug!("Skipping camera {} with unspecified position", device.id);
                return;
            }
        };
        if let Some(existing) = slot {
            log::debug!("Ignoring duplicate device {} (slot held by {})", device.id, existing.id());
            return;
        }
        *slot = Some(DeviceInput::new(device));
    }

    pub fn front_camera(&self) -> Option<&DeviceInput> {
        self.front_camera.as_ref()
    }

    pub fn back_camera(&self) -> Option<&DeviceInput> {
        self.back_camera.as_ref()
    }

    pub fn microphone(&self) -> Option<&DeviceInput> {
        self.microphone.as_ref()
    }

    pub fn camera(&self, position: CameraPosition) -> Option<&DeviceInput> {
        match position {
            CameraPosition::Front => self.front_camera(),
            CameraPosition::Back => self.back_camera(),
            CameraPosition::Unspecified => None,
        }
    }

    /// The camera to start with: `preferred` if present, else the other one.
    pub fn default_camera(&self, preferred: CameraPosition) -> Option<&DeviceInput> {
        self.camera(preferred)
            .or_else(|| self.camera(preferred.opposite()))
    }

    /// The camera to switch to from `current`: front when `current` is the
    /// back camera, back otherwise.
    pub fn alternate_to(&self, current: &DeviceInput) -> Option<&DeviceInput> {
        if self.back_camera.as_ref() == Some(current) {
            self.front_camera()
        } else {
            self.back_camera()
        }
    }
}

fn describe(slot: &Option<DeviceInput>) -> String {
    slot.as_ref()
        .map(|input| input.device().name.clone())
        .unwrap_or_else(|| "none".into())
}
