use crate::models::asset::{AssetHandle, CapturedAsset, GeoLocation, MediaPayload};
use crate::models::error::CameraError;

/// Durable media storage.
///
/// Calls are blocking from the gateway's point of view; the core only makes
/// them from its persistence queue, never from the session queue.
pub trait PersistenceGateway: Send + Sync {
    /// Store `media` and return the handle of the created asset.
    fn save(&self, media: &MediaPayload, location: Option<&GeoLocation>)
        -> Result<AssetHandle, CameraError>;

    /// Materialize a stored asset.
    fn fetch(&self, handle: &AssetHandle) -> Option<CapturedAsset>;
}
