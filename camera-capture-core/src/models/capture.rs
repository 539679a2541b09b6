use std::fmt;
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::asset::{CapturedAsset, GeoLocation, MediaKind};
use super::device::DeviceInput;
use super::preset::QualityPreset;
use super::settings::{CaptureOrientation, CaptureSettings};

/// Correlation token generated when a capture is requested.
///
/// Hardware callbacks are matched back to their request by this token, so
/// two captures in flight never share state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CaptureRequestId(Uuid);

impl CaptureRequestId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for CaptureRequestId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for CaptureRequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// What the photo output is asked to capture.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PhotoRequest {
    pub id: CaptureRequestId,
    pub settings: CaptureSettings,
    pub orientation: CaptureOrientation,
}

/// Encoded image data delivered by the photo output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapturedPhoto {
    pub data: Vec<u8>,
}

/// An active or finalizing movie recording.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordingSession {
    pub id: CaptureRequestId,
    pub destination: PathBuf,
    pub location: Option<GeoLocation>,
    pub started_at: DateTime<Utc>,
    /// Set once a stop was requested; the recorder has not reported yet.
    pub finalizing: bool,
}

/// Outcome of a photo or video capture, as delivered to the observer.
///
/// `asset` is `None` for every failure, optical or storage-side.
#[derive(Debug, Clone, PartialEq)]
pub struct CaptureCompleted {
    pub request: CaptureRequestId,
    pub kind: MediaKind,
    pub asset: Option<CapturedAsset>,
}

/// Snapshot of the running session handed to the observer on start.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionHandle {
    pub session_id: Uuid,
    pub preset: Option<QualityPreset>,
    pub input: Option<DeviceInput>,
}

/// Counters for debugging a coordinator.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CoordinatorDiagnostics {
    pub photos_requested: u64,
    pub recordings_started: u64,
    pub captures_completed: u64,
    pub capture_failures: u64,
    pub persistence_failures: u64,
    pub reconfigurations: u64,
    pub device_lock_failures: u64,
    pub ignored_commands: u64,
}
