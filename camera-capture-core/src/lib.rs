//! # camera-capture-core
//!
//! Platform-agnostic camera capture core.
//!
//! Owns a hardware capture session, negotiates its inputs and outputs,
//! mediates photo and video capture, and persists results through an
//! asynchronous storage gateway. Platform backends implement the hardware
//! traits and plug into the generic `CaptureCoordinator`.
//!
//! ## Architecture
//!
//! ```text
//! camera-capture-core (this crate)
//! ├── traits/       ← DeviceProvider, SessionBackend, PhotoOutput, MovieOutput,
//! │                   PermissionProvider, PersistenceGateway, CameraObserver
//! ├── models/       ← CameraError, SessionState, CaptureDevice, QualityPreset, etc.
//! ├── catalog/      ← DeviceCatalog (discovery and slot classification)
//! ├── session/      ← SessionStore, reconfiguration transactions, device lock
//! ├── dispatch/     ← SerialQueue, Notifier (observer context)
//! ├── storage/      ← AssetSaver, FileAssetLibrary, metadata sidecars
//! └── coordinator/  ← CaptureCoordinator (state machine)
//! ```
//!
//! ## Queues
//!
//! Each coordinator runs three serial queues: `camera-session` for every
//! hardware operation, `camera-persistence` for durable saves, and
//! `camera-observer` for all notifications.

pub mod catalog;
pub mod coordinator;
pub mod dispatch;
pub mod models;
pub mod session;
pub mod storage;
pub mod traits;

// Re-export key types at crate root for convenience.
pub use catalog::device_catalog::DeviceCatalog;
pub use coordinator::capture_coordinator::{CaptureCoordinator, CaptureHardware, SwitchResult};
pub use dispatch::serial_queue::SerialQueue;
pub use models::asset::{AssetHandle, CapturedAsset, GeoLocation, MediaKind, MediaPayload};
pub use models::capture::{
    CaptureCompleted, CaptureRequestId, CapturedPhoto, CoordinatorDiagnostics, PhotoRequest,
    RecordingSession, SessionHandle,
};
pub use models::config::CameraConfiguration;
pub use models::device::{
    CameraPosition, CaptureDevice, CaptureOutput, DeviceId, DeviceInput, FocusMode, FocusPoint,
    MediaRole,
};
pub use models::error::{CameraError, Ignored};
pub use models::preset::QualityPreset;
pub use models::settings::{
    CaptureOrientation, CaptureSettings, FlashMode, ImageOrientation, PhotoFormat,
};
pub use models::state::{Authorization, RecordingState, SessionState};
pub use session::store::{negotiate_preset, SessionStore, SessionTransaction};
pub use storage::file_library::FileAssetLibrary;
pub use traits::device_provider::DeviceProvider;
pub use traits::movie_output::{MovieOutput, RecordingFinished, RecordingStarted};
pub use traits::observer::{CameraEvent, CameraObserver, ChannelObserver};
pub use traits::permission::PermissionProvider;
pub use traits::persistence::PersistenceGateway;
pub use traits::photo_output::{PhotoCompletion, PhotoOutput};
pub use traits::session_backend::SessionBackend;
