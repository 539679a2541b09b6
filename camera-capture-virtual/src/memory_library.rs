//! In-memory persistence gateway.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;

use chrono::Utc;
use parking_lot::Mutex;
use uuid::Uuid;

use camera_capture_core::models::asset::{AssetHandle, CapturedAsset, GeoLocation, MediaPayload};
use camera_capture_core::models::error::CameraError;
use camera_capture_core::traits::persistence::PersistenceGateway;

struct StoredAsset {
    asset: CapturedAsset,
    media: MediaPayload,
}

/// Keeps saved media in a map and records which thread each save ran on.
pub struct MemoryAssetLibrary {
    assets: Mutex<HashMap<AssetHandle, StoredAsset>>,
    order: Mutex<Vec<AssetHandle>>,
    save_threads: Mutex<Vec<Option<String>>>,
    fail_saves: AtomicBool,
    fail_fetches: AtomicBool,
}

impl MemoryAssetLibrary {
    pub fn new() -> Self {
        Self {
            assets: Mutex::new(HashMap::new()),
            order: Mutex::new(Vec::new()),
            save_threads: Mutex::new(Vec::new()),
            fail_saves: AtomicBool::new(false),
            fail_fetches: AtomicBool::new(false),
        }
    }

    /// Reject every save, as a full or revoked photo library would.
    pub fn fail_saves(&self, fail: bool) {
        self.fail_saves.store(fail, Ordering::SeqCst);
    }

    /// Accept saves but lose them on fetch.
    pub fn fail_fetches(&self, fail: bool) {
        self.fail_fetches.store(fail, Ordering::SeqCst);
    }

    /// Stored assets, oldest first.
    pub fn assets(&self) -> Vec<CapturedAsset> {
        let assets = self.assets.lock();
        self.order
            .lock()
            .iter()
            .filter_map(|handle| assets.get(handle).map(|stored| stored.asset.clone()))
            .collect()
    }

    pub fn media(&self, handle: &AssetHandle) -> Option<MediaPayload> {
        self.assets.lock().get(handle).map(|stored| stored.media.clone())
    }

    /// Names of the threads `save` was called on, one per attempt.
    pub fn save_threads(&self) -> Vec<Option<String>> {
        self.save_threads.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.assets.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for MemoryAssetLibrary {
    fn default() -> Self {
        Self::new()
    }
}

impl PersistenceGateway for MemoryAssetLibrary {
    fn save(
        &self,
        media: &MediaPayload,
        location: Option<&GeoLocation>,
    ) -> Result<AssetHandle, CameraError> {
        self.save_threads
            .lock()
            .push(thread::current().name().map(str::to_owned));

        if self.fail_saves.load(Ordering::SeqCst) {
            return Err(CameraError::StorageError("library rejected the asset".into()));
        }

        let handle = AssetHandle(Uuid::new_v4().to_string());
        let asset = CapturedAsset {
            handle: handle.clone(),
            kind: media.kind(),
            created_at: Utc::now(),
            location: location.copied(),
        };
        self.assets.lock().insert(
            handle.clone(),
            StoredAsset {
                asset,
                media: media.clone(),
            },
        );
        self.order.lock().push(handle.clone());
        Ok(handle)
    }

    fn fetch(&self, handle: &AssetHandle) -> Option<CapturedAsset> {
        if self.fail_fetches.load(Ordering::SeqCst) {
            return None;
        }
        self.assets.lock().get(handle).map(|stored| stored.asset.clone())
    }
}
