use crate::models::capture::{CapturedPhoto, PhotoRequest};
use crate::models::error::CameraError;
use crate::models::settings::FlashMode;

/// Callback invoked once when a photo capture finishes.
///
/// May fire on any thread, including before `capture` returns.
pub type PhotoCompletion = Box<dyn FnOnce(Result<CapturedPhoto, CameraError>) + Send + 'static>;

/// Still-image output of a capture session.
pub trait PhotoOutput: Send + Sync {
    fn supported_flash_modes(&self) -> Vec<FlashMode>;

    /// Issue a capture. `completion` fires exactly once.
    fn capture(&self, request: PhotoRequest, completion: PhotoCompletion);
}
