use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::asset::{AssetHandle, CapturedAsset, GeoLocation, MediaKind};
use crate::models::error::CameraError;
use crate::models::settings::ImageOrientation;

/// Sidecar record stored next to every library file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssetRecord {
    pub handle: AssetHandle,
    pub kind: MediaKind,
    pub file_name: String,
    pub created_at: DateTime<Utc>,
    pub location: Option<GeoLocation>,
    pub orientation: Option<ImageOrientation>,
    pub checksum: String,
}

impl AssetRecord {
    pub fn to_asset(&self) -> CapturedAsset {
        CapturedAsset {
            handle: self.handle.clone(),
            kind: self.kind,
            created_at: self.created_at,
            location: self.location,
        }
    }
}

/// Sidecar path for a media file: `{stem}.metadata.json`.
pub fn metadata_path(media_path: &Path) -> PathBuf {
    media_path.with_extension("metadata.json")
}

/// Write `record` as a JSON sidecar next to `media_path`.
pub fn write_record(record: &AssetRecord, media_path: &Path) -> Result<(), CameraError> {
    let json = serde_json::to_string_pretty(record)
        .map_err(|e| CameraError::StorageError(format!("failed to serialize metadata: {}", e)))?;
    fs::write(metadata_path(media_path), json)
        .map_err(|e| CameraError::StorageError(format!("failed to write metadata: {}", e)))?;
    Ok(())
}

/// Read a JSON sidecar.
pub fn read_record(path: &Path) -> Result<AssetRecord, CameraError> {
    let json = fs::read_to_string(path)
        .map_err(|e| CameraError::StorageError(format!("failed to read metadata: {}", e)))?;
    serde_json::from_str(&json)
        .map_err(|e| CameraError::StorageError(format!("failed to parse metadata: {}", e)))
}
