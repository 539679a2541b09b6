//! Assembles a full set of virtual hardware.

use std::sync::Arc;

use camera_capture_core::models::device::CaptureDevice;
use camera_capture_core::models::preset::QualityPreset;
use camera_capture_core::models::state::Authorization;
use camera_capture_core::CaptureHardware;

use crate::device_provider::VirtualDeviceProvider;
use crate::movie_recorder::VirtualMovieRecorder;
use crate::permissions::VirtualPermission;
use crate::photo_output::{PhotoDelivery, VirtualPhotoOutput};
use crate::session::{SessionMonitor, VirtualSession};

/// Handles onto the virtual hardware after it has been given to a
/// coordinator.
#[derive(Clone)]
pub struct VirtualRig {
    pub devices: Arc<VirtualDeviceProvider>,
    pub session: SessionMonitor,
    pub photo_output: Arc<VirtualPhotoOutput>,
    pub movie_output: Arc<VirtualMovieRecorder>,
    pub permission: Arc<VirtualPermission>,
}

pub struct VirtualRigBuilder {
    devices: Option<Vec<CaptureDevice>>,
    session_presets: Vec<QualityPreset>,
    photo_delivery: PhotoDelivery,
    authorization: Authorization,
}

impl VirtualRig {
    pub fn builder() -> VirtualRigBuilder {
        VirtualRigBuilder {
            devices: None,
            session_presets: QualityPreset::PREFERRED.to_vec(),
            photo_delivery: PhotoDelivery::Immediate,
            authorization: Authorization::Authorized,
        }
    }

    /// Authorized phone with back and front cameras.
    pub fn phone() -> (Self, CaptureHardware) {
        Self::builder().build()
    }
}

impl VirtualRigBuilder {
    /// Replace the default phone devices.
    pub fn devices(mut self, devices: Vec<CaptureDevice>) -> Self {
        self.devices = Some(devices);
        self
    }

    /// Presets the session accepts.
    pub fn session_presets(mut self, presets: &[QualityPreset]) -> Self {
        self.session_presets = presets.to_vec();
        self
    }

    pub fn photo_delivery(mut self, delivery: PhotoDelivery) -> Self {
        self.photo_delivery = delivery;
        self
    }

    pub fn authorization(mut self, authorization: Authorization) -> Self {
        self.authorization = authorization;
        self
    }

    pub fn build(self) -> (VirtualRig, CaptureHardware) {
        let devices = Arc::new(match self.devices {
            Some(devices) => VirtualDeviceProvider::new(devices),
            None => VirtualDeviceProvider::phone(),
        });
        let session = VirtualSession::with_presets(&self.session_presets);
        let rig = VirtualRig {
            devices,
            session: session.monitor(),
            photo_output: Arc::new(VirtualPhotoOutput::new(self.photo_delivery)),
            movie_output: Arc::new(VirtualMovieRecorder::new()),
            permission: Arc::new(VirtualPermission::new(self.authorization)),
        };
        let hardware = CaptureHardware {
            devices: rig.devices.clone(),
            session: Box::new(session),
            photo_output: rig.photo_output.clone(),
            movie_output: rig.movie_output.clone(),
            permission: rig.permission.clone(),
        };
        (rig, hardware)
    }
}
