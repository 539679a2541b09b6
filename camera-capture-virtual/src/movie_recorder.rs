//! Virtual movie recorder.
//!
//! Starting a recording creates the destination file immediately; stopping
//! finishes it on a `virtual-recorder` thread. A recording can also end on
//! the recorder's own initiative through `finish_externally`. With
//! `hold_starts` the start is parked until `release_start`, the way a real
//! recorder reports that it is running some time after being asked.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::thread;

use parking_lot::Mutex;

use camera_capture_core::models::error::CameraError;
use camera_capture_core::traits::movie_output::{MovieOutput, RecordingFinished, RecordingStarted};

const MOVIE_HEADER: &[u8] = b"\x00\x00\x00\x14ftypqt  virtual-movie";

struct ActiveRecording {
    destination: PathBuf,
    on_finished: RecordingFinished,
}

struct PendingStart {
    destination: PathBuf,
    on_started: RecordingStarted,
    on_finished: RecordingFinished,
}

pub struct VirtualMovieRecorder {
    active: Mutex<Option<ActiveRecording>>,
    pending: Mutex<Option<PendingStart>>,
    hold_starts: AtomicBool,
    fail_next_start: Mutex<Option<CameraError>>,
    fail_next_finish: Mutex<Option<CameraError>>,
    started: AtomicUsize,
}

impl VirtualMovieRecorder {
    pub fn new() -> Self {
        Self {
            active: Mutex::new(None),
            pending: Mutex::new(None),
            hold_starts: AtomicBool::new(false),
            fail_next_start: Mutex::new(None),
            fail_next_finish: Mutex::new(None),
            started: AtomicUsize::new(0),
        }
    }

    /// Make the next `start_recording` report `error`.
    pub fn fail_next_start(&self, error: CameraError) {
        *self.fail_next_start.lock() = Some(error);
    }

    /// Make the next finished recording report `error` instead of a file.
    pub fn fail_next_finish(&self, error: CameraError) {
        *self.fail_next_finish.lock() = Some(error);
    }

    /// Park later starts until `release_start` is called.
    pub fn hold_starts(&self, hold: bool) {
        self.hold_starts.store(hold, Ordering::SeqCst);
    }

    /// Begin the parked recording and report it started, on the calling
    /// thread. Returns false when no start is parked.
    pub fn release_start(&self) -> bool {
        let Some(pending) = self.pending.lock().take() else {
            return false;
        };
        self.begin(&pending.destination, pending.on_started, pending.on_finished);
        true
    }

    pub fn has_pending_start(&self) -> bool {
        self.pending.lock().is_some()
    }

    /// Recordings successfully started so far.
    pub fn started_count(&self) -> usize {
        self.started.load(Ordering::SeqCst)
    }

    pub fn active_destination(&self) -> Option<PathBuf> {
        self.active.lock().as_ref().map(|a| a.destination.clone())
    }

    /// End the active recording without a stop request, as a recorder does
    /// when it reaches its duration or disk limit. Runs the finish callback
    /// on the calling thread. Returns false when nothing was recording.
    pub fn finish_externally(&self) -> bool {
        let Some(active) = self.active.lock().take() else {
            return false;
        };
        let outcome = self.finish_outcome(&active.destination);
        (active.on_finished)(outcome);
        true
    }

    fn begin(&self, destination: &Path, on_started: RecordingStarted, on_finished: RecordingFinished) {
        if let Err(e) = fs::write(destination, MOVIE_HEADER) {
            on_started(Err(CameraError::StorageError(format!(
                "cannot create {}: {}",
                destination.display(),
                e
            ))));
            return;
        }

        *self.active.lock() = Some(ActiveRecording {
            destination: destination.to_path_buf(),
            on_finished,
        });
        self.started.fetch_add(1, Ordering::SeqCst);
        log::debug!("Virtual recording to {}", destination.display());
        on_started(Ok(()));
    }

    fn finish_outcome(&self, destination: &Path) -> Result<PathBuf, CameraError> {
        match self.fail_next_finish.lock().take() {
            Some(error) => Err(error),
            None => Ok(destination.to_path_buf()),
        }
    }
}

impl Default for VirtualMovieRecorder {
    fn default() -> Self {
        Self::new()
    }
}

impl MovieOutput for VirtualMovieRecorder {
    fn start_recording(
        &self,
        destination: &Path,
        on_started: RecordingStarted,
        on_finished: RecordingFinished,
    ) {
        let scripted = self.fail_next_start.lock().take();
        if let Some(error) = scripted {
            on_started(Err(error));
            return;
        }
        if self.is_recording() || self.has_pending_start() {
            on_started(Err(CameraError::CaptureFailed("recorder is busy".into())));
            return;
        }
        if self.hold_starts.load(Ordering::SeqCst) {
            log::debug!("Holding start for {}", destination.display());
            *self.pending.lock() = Some(PendingStart {
                destination: destination.to_path_buf(),
                on_started,
                on_finished,
            });
            return;
        }
        self.begin(destination, on_started, on_finished);
    }

    fn stop_recording(&self) {
        let Some(active) = self.active.lock().take() else {
            log::debug!("stop_recording with nothing recording");
            return;
        };
        let outcome = self.finish_outcome(&active.destination);
        let spawned = thread::Builder::new()
            .name("virtual-recorder".into())
            .spawn(move || (active.on_finished)(outcome));
        if let Err(e) = spawned {
            log::error!("Failed to spawn recorder finish thread: {}", e);
        }
    }

    fn is_recording(&self) -> bool {
        self.active.lock().is_some()
    }
}
