use std::fmt;

use serde::{Deserialize, Serialize};

use super::preset::QualityPreset;

/// Stable identifier of a capture device, as reported by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DeviceId(pub String);

impl DeviceId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }
}

impl fmt::Display for DeviceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Kind of media a device produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaRole {
    Video,
    Audio,
}

/// Physical placement of a device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CameraPosition {
    Front,
    Back,
    Unspecified,
}

impl CameraPosition {
    /// The camera slot on the other side of the device.
    pub fn opposite(self) -> Self {
        match self {
            Self::Front => Self::Back,
            Self::Back | Self::Unspecified => Self::Front,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FocusMode {
    Locked,
    AutoFocus,
    ContinuousAutoFocus,
}

/// Normalized point of interest, `(0, 0)` top-left to `(1, 1)` bottom-right.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FocusPoint {
    pub x: f64,
    pub y: f64,
}

impl FocusPoint {
    pub fn new(x: f64, y: f64) -> Self {
        Self {
            x: x.clamp(0.0, 1.0),
            y: y.clamp(0.0, 1.0),
        }
    }
}

/// A capture device as seen by one discovery pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaptureDevice {
    pub id: DeviceId,
    pub name: String,
    pub role: MediaRole,
    pub position: CameraPosition,
    pub has_flash: bool,
    pub focus_modes: Vec<FocusMode>,
    pub presets: Vec<QualityPreset>,
}

impl CaptureDevice {
    pub fn supports_preset(&self, preset: QualityPreset) -> bool {
        self.presets.contains(&preset)
    }

    pub fn supports_focus_mode(&self, mode: FocusMode) -> bool {
        self.focus_modes.contains(&mode)
    }

    pub fn is_camera(&self) -> bool {
        self.role == MediaRole::Video
    }
}

/// A device bound for use in a capture session.
///
/// Two inputs are equal when they wrap the same device.
#[derive(Debug, Clone)]
pub struct DeviceInput {
    device: CaptureDevice,
}

impl DeviceInput {
    pub fn new(device: CaptureDevice) -> Self {
        Self { device }
    }

    pub fn device(&self) -> &CaptureDevice {
        &self.device
    }

    pub fn id(&self) -> &DeviceId {
        &self.device.id
    }

    pub fn role(&self) -> MediaRole {
        self.device.role
    }

    pub fn position(&self) -> CameraPosition {
        self.device.position
    }
}

impl PartialEq for DeviceInput {
    fn eq(&self, other: &Self) -> bool {
        self.device.id == other.device.id
    }
}

impl Eq for DeviceInput {}

/// Outputs a session can carry. Each is attached at most once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CaptureOutput {
    Photo,
    Movie,
}
