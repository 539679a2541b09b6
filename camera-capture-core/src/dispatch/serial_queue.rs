use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::mpsc::{self, Sender};
use std::thread;

use parking_lot::Mutex;

use crate::models::error::CameraError;

type Job = Box<dyn FnOnce() + Send + 'static>;

/// A named worker thread that runs submitted jobs one at a time, in
/// submission order.
///
/// A job that panics is logged and skipped; the worker keeps serving the
/// jobs behind it.
///
/// Dropping the queue lets already-submitted jobs finish and joins the
/// worker. When the last handle is dropped from inside one of its own jobs
/// the worker is detached instead, and exits after its backlog.
pub struct SerialQueue {
    label: String,
    sender: Mutex<Option<Sender<Job>>>,
    handle: Option<thread::JoinHandle<()>>,
}

impl SerialQueue {
    pub fn new(label: &str) -> Result<Self, CameraError> {
        let (sender, receiver) = mpsc::channel::<Job>();

        let worker_label = label.to_string();
        let handle = thread::Builder::new()
            .name(label.to_string())
            .spawn(move || {
                while let Ok(job) = receiver.recv() {
                    if let Err(payload) = panic::catch_unwind(AssertUnwindSafe(job)) {
                        log::error!("{}: job panicked: {}", worker_label, panic_message(&*payload));
                    }
                }
            })
            .map_err(|e| CameraError::Unknown(format!("failed to spawn {} thread: {}", label, e)))?;

        Ok(Self {
            label: label.to_string(),
            sender: Mutex::new(Some(sender)),
            handle: Some(handle),
        })
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    /// Submit a job. Returns `false` if the queue is shutting down.
    pub fn dispatch<F>(&self, job: F) -> bool
    where
        F: FnOnce() + Send + 'static,
    {
        match self.sender.lock().as_ref() {
            Some(sender) => {
                let sent = sender.send(Box::new(job)).is_ok();
                if !sent {
                    log::error!("{}: job dropped, worker has exited", self.label);
                }
                sent
            }
            None => {
                log::warn!("{}: job dropped, queue is shut down", self.label);
                false
            }
        }
    }

    /// Block until every job submitted before this call has run.
    ///
    /// Returns immediately when called from the queue's own worker.
    pub fn flush(&self) {
        if self.is_current() {
            return;
        }
        let (done_tx, done_rx) = mpsc::sync_channel::<()>(1);
        if self.dispatch(move || {
            let _ = done_tx.send(());
        }) {
            let _ = done_rx.recv();
        }
    }

    /// Whether the calling thread is this queue's worker.
    pub fn is_current(&self) -> bool {
        self.handle
            .as_ref()
            .map(|h| h.thread().id() == thread::current().id())
            .unwrap_or(false)
    }
}

/// Best-effort text of a panic payload.
pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "non-string panic payload".into()
    }
}

impl Drop for SerialQueue {
    fn drop(&mut self) {
        self.sender.lock().take();
        if let Some(handle) = self.handle.take() {
            if handle.thread().id() == thread::current().id() {
                return;
            }
            let _ = handle.join();
        }
    }
}
