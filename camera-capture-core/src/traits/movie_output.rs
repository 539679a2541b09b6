use std::path::{Path, PathBuf};

use crate::models::error::CameraError;

/// Fires once when the recorder has started, or failed to.
pub type RecordingStarted = Box<dyn FnOnce(Result<(), CameraError>) + Send + 'static>;

/// Fires once with the finished movie file, or the reason it was lost.
pub type RecordingFinished = Box<dyn FnOnce(Result<PathBuf, CameraError>) + Send + 'static>;

/// Movie-file output of a capture session.
pub trait MovieOutput: Send + Sync {
    /// Begin writing a movie to `destination`.
    ///
    /// If `on_started` receives `Ok`, `on_finished` fires exactly once later,
    /// whether the stop comes from `stop_recording` or from the device
    /// (maximum duration or file size reached). If start fails, `on_finished`
    /// is dropped without being called. `on_started` may fire on any thread,
    /// after this call has returned.
    fn start_recording(
        &self,
        destination: &Path,
        on_started: RecordingStarted,
        on_finished: RecordingFinished,
    );

    /// Finish the active recording.
    ///
    /// A stop that arrives before `on_started` has fired may be a no-op;
    /// callers that still want the recording stopped repeat the request once
    /// `on_started` reports `Ok`. Without an active recording this does
    /// nothing.
    fn stop_recording(&self);

    fn is_recording(&self) -> bool;
}
