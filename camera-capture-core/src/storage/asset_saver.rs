use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use parking_lot::Mutex;

use crate::dispatch::notifier::Notifier;
use crate::dispatch::serial_queue::{panic_message, SerialQueue};
use crate::models::asset::{CapturedAsset, GeoLocation, MediaKind, MediaPayload};
use crate::models::capture::{CaptureCompleted, CaptureRequestId, CoordinatorDiagnostics};
use crate::models::error::CameraError;
use crate::traits::persistence::PersistenceGateway;

/// Moves finished captures into the persistence gateway.
///
/// Saves run one at a time on their own queue, so storage latency never
/// reaches the session queue. Every save ends in exactly one
/// `CaptureCompleted` on the observer context.
pub struct AssetSaver {
    queue: SerialQueue,
    gateway: Arc<dyn PersistenceGateway>,
    notifier: Arc<Notifier>,
    diagnostics: Arc<Mutex<CoordinatorDiagnostics>>,
}

impl AssetSaver {
    pub fn new(
        gateway: Arc<dyn PersistenceGateway>,
        notifier: Arc<Notifier>,
        diagnostics: Arc<Mutex<CoordinatorDiagnostics>>,
    ) -> Result<Self, CameraError> {
        Ok(Self {
            queue: SerialQueue::new("camera-persistence")?,
            gateway,
            notifier,
            diagnostics,
        })
    }

    /// Persist `media` for `request` and report the outcome.
    pub fn save(&self, request: CaptureRequestId, media: MediaPayload, location: Option<GeoLocation>) {
        let gateway = Arc::clone(&self.gateway);
        let notifier = Arc::clone(&self.notifier);
        let diagnostics = Arc::clone(&self.diagnostics);

        self.queue.dispatch(move || {
            let kind = media.kind();
            let stored = panic::catch_unwind(AssertUnwindSafe(|| {
                store(gateway.as_ref(), request, &media, location.as_ref())
            }));
            let asset = stored.unwrap_or_else(|payload| {
                log::error!(
                    "Persistence gateway panicked saving {:?} for {}: {}",
                    kind,
                    request,
                    panic_message(&*payload)
                );
                None
            });

            {
                let mut d = diagnostics.lock();
                if asset.is_some() {
                    d.captures_completed += 1;
                } else {
                    d.persistence_failures += 1;
                }
            }
            notifier.capture_completed(CaptureCompleted { request, kind, asset });
        });
    }

    /// Report a capture that produced nothing to save.
    pub fn report_failure(&self, request: CaptureRequestId, kind: MediaKind) {
        self.diagnostics.lock().capture_failures += 1;
        self.notifier.capture_completed(CaptureCompleted {
            request,
            kind,
            asset: None,
        });
    }

    /// Block until queued saves have finished.
    pub fn flush(&self) {
        self.queue.flush();
    }
}

/// Save then fetch back. `None` when either step fails.
fn store(
    gateway: &dyn PersistenceGateway,
    request: CaptureRequestId,
    media: &MediaPayload,
    location: Option<&GeoLocation>,
) -> Option<CapturedAsset> {
    match gateway.save(media, location) {
        Ok(handle) => {
            let asset = gateway.fetch(&handle);
            if asset.is_none() {
                log::warn!("Asset {} saved for {} but could not be fetched", handle, request);
            }
            asset
        }
        Err(e) => {
            log::error!("Failed to save {:?} for {}: {}", media.kind(), request, e);
            None
        }
    }
}
