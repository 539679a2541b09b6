use std::fs;
use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::models::asset::{AssetHandle, CapturedAsset, GeoLocation, MediaPayload};
use crate::models::error::CameraError;
use crate::storage::metadata::{self, AssetRecord};
use crate::traits::persistence::PersistenceGateway;

/// Directory-backed asset library.
///
/// ## Layout
///
/// ```text
/// <root>/
///   <uuid>.jpg             photo bytes as delivered by the photo output
///   <uuid>.mov             copy of the recorded movie
///   <uuid>.metadata.json   AssetRecord sidecar (kind, time, location, SHA-256)
/// ```
///
/// The asset handle is the UUID.
pub struct FileAssetLibrary {
    root: PathBuf,
}

impl FileAssetLibrary {
    /// Open (creating if needed) a library rooted at `root`.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self, CameraError> {
        let root = root.into();
        fs::create_dir_all(&root)
            .map_err(|e| CameraError::StorageError(format!("failed to create directory: {}", e)))?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Full sidecar record for `handle`.
    pub fn record(&self, handle: &AssetHandle) -> Result<AssetRecord, CameraError> {
        // Handles are UUIDs; anything else could escape the root.
        let id = Uuid::parse_str(&handle.0)
            .map_err(|_| CameraError::StorageError(format!("invalid asset handle: {}", handle)))?;
        metadata::read_record(&self.root.join(format!("{}.metadata.json", id)))
    }

    /// Path of the media file behind `handle`.
    pub fn media_path(&self, handle: &AssetHandle) -> Result<PathBuf, CameraError> {
        Ok(self.root.join(self.record(handle)?.file_name))
    }

    fn write_media(&self, id: Uuid, media: &MediaPayload) -> Result<PathBuf, CameraError> {
        match media {
            MediaPayload::Photo { data, format, .. } => {
                if data.is_empty() {
                    return Err(CameraError::EncodingFailed("empty photo data".into()));
                }
                let path = self.root.join(format!("{}.{}", id, format.file_extension()));
                fs::write(&path, data)
                    .map_err(|e| CameraError::StorageError(format!("write failed: {}", e)))?;
                Ok(path)
            }
            MediaPayload::Video { path: source } => {
                let ext = source.extension().and_then(|e| e.to_str()).unwrap_or("mov");
                let path = self.root.join(format!("{}.{}", id, ext));
                fs::copy(source, &path)
                    .map_err(|e| CameraError::StorageError(format!("failed to copy movie: {}", e)))?;
                Ok(path)
            }
        }
    }
}

impl PersistenceGateway for FileAssetLibrary {
    fn save(&self, media: &MediaPayload, location: Option<&GeoLocation>) -> Result<AssetHandle, CameraError> {
        let id = Uuid::new_v4();
        let media_path = self.write_media(id, media)?;
        let checksum = sha256_file(&media_path)?;

        let orientation = match media {
            MediaPayload::Photo { orientation, .. } => Some(*orientation),
            MediaPayload::Video { .. } => None,
        };
        let record = AssetRecord {
            handle: AssetHandle(id.to_string()),
            kind: media.kind(),
            file_name: media_path
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_default(),
            created_at: chrono::Utc::now(),
            location: location.copied(),
            orientation,
            checksum,
        };

        if let Err(e) = metadata::write_record(&record, &media_path) {
            fs::remove_file(&media_path).ok();
            return Err(e);
        }

        log::debug!("Stored {:?} asset {}", record.kind, record.handle);
        Ok(record.handle)
    }

    fn fetch(&self, handle: &AssetHandle) -> Option<CapturedAsset> {
        match self.record(handle) {
            Ok(record) => Some(record.to_asset()),
            Err(e) => {
                log::warn!("Failed to fetch asset {}: {}", handle, e);
                None
            }
        }
    }
}

/// Compute SHA-256 hex digest of a file.
fn sha256_file(path: &Path) -> Result<String, CameraError> {
    let data = fs::read(path)
        .map_err(|e| CameraError::StorageError(format!("failed to read file for checksum: {}", e)))?;
    let digest = Sha256::digest(&data);
    Ok(hex_encode(&digest))
}

fn hex_encode(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}
