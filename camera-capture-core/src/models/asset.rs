use std::fmt;
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::settings::{ImageOrientation, PhotoFormat};

/// Geographic position attached to a capture.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoLocation {
    pub latitude: f64,
    pub longitude: f64,
    pub altitude: Option<f64>,
}

impl GeoLocation {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
            altitude: None,
        }
    }
}

/// Opaque identifier of a durably stored asset.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AssetHandle(pub String);

impl fmt::Display for AssetHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Photo,
    Video,
}

/// Media handed to the persistence gateway. Opaque to the core.
#[derive(Debug, Clone, PartialEq)]
pub enum MediaPayload {
    Photo {
        data: Vec<u8>,
        format: PhotoFormat,
        orientation: ImageOrientation,
    },
    Video {
        path: PathBuf,
    },
}

impl MediaPayload {
    pub fn kind(&self) -> MediaKind {
        match self {
            Self::Photo { .. } => MediaKind::Photo,
            Self::Video { .. } => MediaKind::Video,
        }
    }
}

/// A capture that has been permanently stored.
///
/// Only a `PersistenceGateway` produces these.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CapturedAsset {
    pub handle: AssetHandle,
    pub kind: MediaKind,
    pub created_at: DateTime<Utc>,
    pub location: Option<GeoLocation>,
}
