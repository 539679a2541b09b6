use serde::{Deserialize, Serialize};

use super::device::CameraPosition;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlashMode {
    Off,
    On,
    Auto,
}

/// Encoded still-image container requested from the photo output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PhotoFormat {
    Jpeg,
    Heif,
}

impl PhotoFormat {
    pub fn file_extension(self) -> &'static str {
        match self {
            Self::Jpeg => "jpg",
            Self::Heif => "heic",
        }
    }
}

/// Orientation of the capture connection when the shutter is pressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CaptureOrientation {
    Portrait,
    PortraitUpsideDown,
    LandscapeLeft,
    LandscapeRight,
}

/// Orientation tag stored with a photo (EXIF semantics).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImageOrientation {
    Up,
    Down,
    Left,
    Right,
    UpMirrored,
    DownMirrored,
    LeftMirrored,
    RightMirrored,
}

impl ImageOrientation {
    /// Orientation correction applied to every finished photo.
    ///
    /// Sensor data is landscape-right native; front camera images are
    /// additionally mirrored.
    pub fn corrected(orientation: CaptureOrientation, position: CameraPosition) -> Self {
        let base = match orientation {
            CaptureOrientation::Portrait => Self::Right,
            CaptureOrientation::PortraitUpsideDown => Self::Left,
            CaptureOrientation::LandscapeRight => Self::Up,
            CaptureOrientation::LandscapeLeft => Self::Down,
        };
        if position == CameraPosition::Front {
            base.mirrored()
        } else {
            base
        }
    }

    fn mirrored(self) -> Self {
        match self {
            Self::Up => Self::UpMirrored,
            Self::Down => Self::DownMirrored,
            Self::Left => Self::LeftMirrored,
            Self::Right => Self::RightMirrored,
            Self::UpMirrored => Self::Up,
            Self::DownMirrored => Self::Down,
            Self::LeftMirrored => Self::Left,
            Self::RightMirrored => Self::Right,
        }
    }
}

/// Photo settings. Copied into every photo request so a request in flight
/// never sees later changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaptureSettings {
    pub flash_mode: FlashMode,
    pub stabilization: bool,
    pub format: PhotoFormat,
}

impl Default for CaptureSettings {
    fn default() -> Self {
        Self {
            flash_mode: FlashMode::Off,
            stabilization: false,
            format: PhotoFormat::Jpeg,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn back_camera_portrait_is_rotated_right() {
        assert_eq!(
            ImageOrientation::corrected(CaptureOrientation::Portrait, CameraPosition::Back),
            ImageOrientation::Right
        );
    }

    #[test]
    fn front_camera_is_mirrored() {
        assert_eq!(
            ImageOrientation::corrected(CaptureOrientation::LandscapeRight, CameraPosition::Front),
            ImageOrientation::UpMirrored
        );
    }
}
