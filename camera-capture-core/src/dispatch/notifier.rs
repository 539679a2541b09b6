use std::sync::Arc;

use crate::dispatch::serial_queue::SerialQueue;
use crate::models::capture::{CaptureCompleted, SessionHandle};
use crate::models::device::DeviceInput;
use crate::models::error::CameraError;
use crate::traits::observer::CameraObserver;

/// The observer-facing execution context.
///
/// Every notification and command completion is delivered from one
/// dedicated queue, so the observer never runs concurrently with itself.
pub struct Notifier {
    queue: SerialQueue,
    observer: Arc<dyn CameraObserver>,
}

impl Notifier {
    pub fn new(observer: Arc<dyn CameraObserver>) -> Result<Self, CameraError> {
        Ok(Self {
            queue: SerialQueue::new("camera-observer")?,
            observer,
        })
    }

    pub fn unavailable(&self) {
        let observer = Arc::clone(&self.observer);
        self.queue.dispatch(move || observer.on_unavailable());
    }

    pub fn started(&self, session: SessionHandle) {
        let observer = Arc::clone(&self.observer);
        self.queue.dispatch(move || observer.on_started(&session));
    }

    pub fn input_changed(&self, input: DeviceInput) {
        let observer = Arc::clone(&self.observer);
        self.queue.dispatch(move || observer.on_input_changed(&input));
    }

    pub fn capture_completed(&self, completed: CaptureCompleted) {
        let observer = Arc::clone(&self.observer);
        self.queue.dispatch(move || observer.on_capture_completed(&completed));
    }

    /// Run a caller-supplied completion on the observer context.
    pub fn deliver<F>(&self, completion: F)
    where
        F: FnOnce() + Send + 'static,
    {
        self.queue.dispatch(completion);
    }

    /// Block until every pending notification has been delivered.
    pub fn flush(&self) {
        self.queue.flush();
    }
}
