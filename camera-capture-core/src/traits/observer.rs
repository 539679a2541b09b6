use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Arc;

use crate::models::capture::{CaptureCompleted, SessionHandle};
use crate::models::device::DeviceInput;

/// Listener for coordinator notifications.
///
/// All methods are called from the coordinator's observer queue, one at a
/// time, never from the session or persistence queues.
pub trait CameraObserver: Send + Sync {
    /// Camera access was denied or no camera exists.
    fn on_unavailable(&self);

    /// The hardware session is running.
    fn on_started(&self, session: &SessionHandle);

    /// A camera input became current.
    fn on_input_changed(&self, input: &DeviceInput);

    /// A photo or video capture finished, with or without an asset.
    fn on_capture_completed(&self, completed: &CaptureCompleted);
}

/// Observer notifications as values.
#[derive(Debug, Clone, PartialEq)]
pub enum CameraEvent {
    Unavailable,
    Started(SessionHandle),
    InputChanged(DeviceInput),
    CaptureCompleted(CaptureCompleted),
}

/// `CameraObserver` that forwards every notification into a channel.
pub struct ChannelObserver {
    sender: Sender<CameraEvent>,
}

impl ChannelObserver {
    pub fn new() -> (Arc<Self>, Receiver<CameraEvent>) {
        let (sender, receiver) = mpsc::channel();
        (Arc::new(Self { sender }), receiver)
    }

    fn send(&self, event: CameraEvent) {
        // The receiver going away only means nobody listens anymore.
        let _ = self.sender.send(event);
    }
}

impl CameraObserver for ChannelObserver {
    fn on_unavailable(&self) {
        self.send(CameraEvent::Unavailable);
    }

    fn on_started(&self, session: &SessionHandle) {
        self.send(CameraEvent::Started(session.clone()));
    }

    fn on_input_changed(&self, input: &DeviceInput) {
        self.send(CameraEvent::InputChanged(input.clone()));
    }

    fn on_capture_completed(&self, completed: &CaptureCompleted) {
        self.send(CameraEvent::CaptureCompleted(completed.clone()));
    }
}
