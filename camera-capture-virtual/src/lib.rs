//! # camera-capture-virtual
//!
//! In-process camera backend for camera-capture-kit.
//!
//! Provides:
//! - `VirtualDeviceProvider`: fixed device list with configuration locks
//! - `VirtualSession`: session graph that applies configuration blocks atomically
//! - `VirtualPhotoOutput`: synthetic JPEG capture, immediate or held for manual release
//! - `VirtualMovieRecorder`: file-backed recorder with scripted failures
//! - `VirtualPermission`: scripted camera authorization
//! - `MemoryAssetLibrary`: persistence gateway kept in memory
//! - `VirtualRig`: all of the above wired into a `CaptureHardware`
//!
//! Every piece has inspection methods so callers can watch what a coordinator did to
//! the hardware and steer how the hardware answers.
//!
//! ## Usage
//! ```ignore
//! use camera_capture_core::{CaptureCoordinator, CameraConfiguration, ChannelObserver};
//! use camera_capture_virtual::{MemoryAssetLibrary, VirtualRig};
//!
//! let (rig, hardware) = VirtualRig::phone();
//! let (observer, events) = ChannelObserver::new();
//! let library = Arc::new(MemoryAssetLibrary::new());
//! let camera = CaptureCoordinator::new(hardware, library, observer, CameraConfiguration::default())?;
//! camera.setup()?;
//! ```

pub mod device_provider;
pub mod memory_library;
pub mod movie_recorder;
pub mod permissions;
pub mod photo_output;
pub mod rig;
pub mod session;

pub use device_provider::{virtual_camera, virtual_microphone, VirtualDeviceProvider};
pub use memory_library::MemoryAssetLibrary;
pub use movie_recorder::VirtualMovieRecorder;
pub use permissions::VirtualPermission;
pub use photo_output::{PhotoDelivery, VirtualPhotoOutput};
pub use rig::{VirtualRig, VirtualRigBuilder};
pub use session::{SessionMonitor, SessionSnapshot, VirtualSession};
