use std::fmt;

use thiserror::Error;

/// Errors surfaced by the capture core.
///
/// None of these are fatal to the session. Commands return them so callers
/// can tell an ignored command apart from one that was dispatched; capture
/// and storage failures additionally reach the observer as a completion
/// without an asset.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CameraError {
    #[error("permission denied")]
    PermissionDenied,

    #[error("device not available")]
    DeviceNotAvailable,

    #[error("configuration failed: {0}")]
    ConfigurationFailed(String),

    #[error("capture failed: {0}")]
    CaptureFailed(String),

    #[error("encoding failed: {0}")]
    EncodingFailed(String),

    #[error("storage error: {0}")]
    StorageError(String),

    #[error("ignored: {0}")]
    Ignored(Ignored),

    #[error("unknown error: {0}")]
    Unknown(String),
}

impl CameraError {
    /// The reason a command was ignored, if it was.
    pub fn ignored(&self) -> Option<Ignored> {
        match self {
            Self::Ignored(reason) => Some(*reason),
            _ => None,
        }
    }
}

impl From<Ignored> for CameraError {
    fn from(reason: Ignored) -> Self {
        Self::Ignored(reason)
    }
}

/// A command that was not applied because a precondition did not hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Ignored {
    /// The session is not in the `Running` state.
    NotRunning,
    /// `setup` was already performed.
    AlreadySetUp,
    /// `setup` has not succeeded yet.
    NotSetUp,
    /// The session is already starting or running.
    AlreadyRunning,
    /// No camera input is attached to the session.
    NoActiveInput,
    /// The opposite camera does not exist on this device.
    NoAlternateCamera,
    /// No photo output is attached to the session.
    NoPhotoOutput,
    /// No movie output is attached to the session.
    NoMovieOutput,
    /// A recording session is already active.
    AlreadyRecording,
    /// No recording session is active.
    NotRecording,
    /// The photo output or the current device cannot use the flash mode.
    FlashModeUnsupported,
    /// The current device cannot lock its focus point.
    FocusUnsupported,
    /// The session was stopped before a deferred job ran.
    SessionStopped,
}

impl fmt::Display for Ignored {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let reason = match self {
            Self::NotRunning => "session is not running",
            Self::AlreadySetUp => "setup already performed",
            Self::NotSetUp => "setup has not completed",
            Self::AlreadyRunning => "session already running",
            Self::NoActiveInput => "no active camera input",
            Self::NoAlternateCamera => "no camera on the opposite side",
            Self::NoPhotoOutput => "no photo output attached",
            Self::NoMovieOutput => "no movie output attached",
            Self::AlreadyRecording => "a recording is already active",
            Self::NotRecording => "no recording is active",
            Self::FlashModeUnsupported => "flash mode not supported",
            Self::FocusUnsupported => "focus lock not supported",
            Self::SessionStopped => "session stopped",
        };
        f.write_str(reason)
    }
}
