#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::mpsc::Receiver;
use std::sync::Arc;
use std::time::Duration;

use camera_capture_core::{
    CameraConfiguration, CameraEvent, CaptureCompleted, CaptureCoordinator, ChannelObserver,
    PersistenceGateway, SessionHandle,
};
use camera_capture_virtual::{MemoryAssetLibrary, VirtualRig, VirtualRigBuilder};

pub const TIMEOUT: Duration = Duration::from_secs(5);

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

pub struct Harness {
    pub camera: CaptureCoordinator,
    pub rig: VirtualRig,
    pub library: Arc<MemoryAssetLibrary>,
    pub events: Receiver<CameraEvent>,
    pub recordings: PathBuf,
}

impl Harness {
    pub fn new(name: &str, builder: VirtualRigBuilder) -> Self {
        let library = Arc::new(MemoryAssetLibrary::new());
        Self::with_gateway(name, builder, library.clone(), library)
    }

    pub fn with_gateway(
        name: &str,
        builder: VirtualRigBuilder,
        gateway: Arc<dyn PersistenceGateway>,
        library: Arc<MemoryAssetLibrary>,
    ) -> Self {
        init_logging();
        let recordings = std::env::temp_dir().join(format!(
            "camera_capture_{}_{}",
            name,
            std::process::id()
        ));
        std::fs::create_dir_all(&recordings).unwrap();

        let (rig, hardware) = builder.build();
        let (observer, events) = ChannelObserver::new();
        let config = CameraConfiguration {
            recording_directory: recordings.clone(),
            ..Default::default()
        };
        let camera = CaptureCoordinator::new(hardware, gateway, observer, config).unwrap();

        Self {
            camera,
            rig,
            library,
            events,
            recordings,
        }
    }

    /// Run setup and wait for the session to report it started.
    pub fn start(name: &str, builder: VirtualRigBuilder) -> (Self, SessionHandle) {
        let harness = Self::new(name, builder);
        harness.camera.setup().unwrap();
        let handle = harness.wait_started();
        (harness, handle)
    }

    pub fn next_event(&self) -> CameraEvent {
        self.events
            .recv_timeout(TIMEOUT)
            .expect("timed out waiting for an observer event")
    }

    pub fn wait_started(&self) -> SessionHandle {
        loop {
            if let CameraEvent::Started(handle) = self.next_event() {
                return handle;
            }
        }
    }

    pub fn wait_completed(&self) -> CaptureCompleted {
        loop {
            if let CameraEvent::CaptureCompleted(completed) = self.next_event() {
                return completed;
            }
        }
    }

    /// Flush every queue and return the events that were pending.
    pub fn drain(&self) -> Vec<CameraEvent> {
        self.camera.flush();
        self.events.try_iter().collect()
    }
}

impl Drop for Harness {
    fn drop(&mut self) {
        let _ = std::fs::remove_dir_all(&self.recordings);
    }
}
