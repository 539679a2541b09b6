use std::path::PathBuf;

use super::device::CameraPosition;
use super::settings::CaptureSettings;

/// Configuration owned by a `CaptureCoordinator`.
#[derive(Debug, Clone)]
pub struct CameraConfiguration {
    /// Directory where in-progress movie files are written.
    pub recording_directory: PathBuf,

    /// Camera selected when the session starts (default: back).
    pub default_position: CameraPosition,

    /// Photo settings in effect until changed through the coordinator.
    pub initial_settings: CaptureSettings,
}

impl CameraConfiguration {
    pub fn validate(&self) -> Result<(), String> {
        if self.recording_directory.as_os_str().is_empty() {
            return Err("recording directory must not be empty".into());
        }
        if self.default_position == CameraPosition::Unspecified {
            return Err("default camera position must be front or back".into());
        }
        Ok(())
    }
}

impl Default for CameraConfiguration {
    fn default() -> Self {
        Self {
            recording_directory: std::env::temp_dir(),
            default_position: CameraPosition::Back,
            initial_settings: CaptureSettings::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_valid() {
        assert!(CameraConfiguration::default().validate().is_ok());
    }

    #[test]
    fn unspecified_position_is_rejected() {
        let config = CameraConfiguration {
            default_position: CameraPosition::Unspecified,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
