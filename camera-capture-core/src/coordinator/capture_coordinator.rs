use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use parking_lot::Mutex;
use uuid::Uuid;

use crate::catalog::device_catalog::DeviceCatalog;
use crate::dispatch::notifier::Notifier;
use crate::dispatch::serial_queue::SerialQueue;
use crate::models::asset::{GeoLocation, MediaKind, MediaPayload};
use crate::models::capture::{
    CaptureRequestId, CapturedPhoto, CoordinatorDiagnostics, PhotoRequest, RecordingSession,
    SessionHandle,
};
use crate::models::config::CameraConfiguration;
use crate::models::device::{
    CameraPosition, CaptureDevice, CaptureOutput, DeviceId, DeviceInput, FocusMode, FocusPoint,
};
use crate::models::error::{CameraError, Ignored};
use crate::models::settings::{
    CaptureOrientation, CaptureSettings, FlashMode, ImageOrientation,
};
use crate::models::state::{Authorization, RecordingState, SessionState};
use crate::session::device_lock::ConfigurationLock;
use crate::session::store::SessionStore;
use crate::storage::asset_saver::AssetSaver;
use crate::traits::device_provider::DeviceProvider;
use crate::traits::movie_output::MovieOutput;
use crate::traits::observer::CameraObserver;
use crate::traits::permission::PermissionProvider;
use crate::traits::persistence::PersistenceGateway;
use crate::traits::photo_output::PhotoOutput;
use crate::traits::session_backend::SessionBackend;

/// Platform pieces a coordinator drives.
pub struct CaptureHardware {
    pub devices: Arc<dyn DeviceProvider>,
    pub session: Box<dyn SessionBackend>,
    pub photo_output: Arc<dyn PhotoOutput>,
    pub movie_output: Arc<dyn MovieOutput>,
    pub permission: Arc<dyn PermissionProvider>,
}

/// Completion for `switch_camera`: the new input, or why nothing changed.
pub type SwitchResult = Result<DeviceInput, CameraError>;

/// A photo request between `take_photo` and its hardware completion.
#[derive(Debug, Clone, Copy)]
struct PendingPhoto {
    location: Option<GeoLocation>,
    orientation: CaptureOrientation,
    position: CameraPosition,
}

struct Inner {
    config: CameraConfiguration,
    session_id: Uuid,

    devices: Arc<dyn DeviceProvider>,
    permission: Arc<dyn PermissionProvider>,
    photo_output: Arc<dyn PhotoOutput>,
    movie_output: Arc<dyn MovieOutput>,

    state: Mutex<SessionState>,
    store: Mutex<SessionStore>,
    catalog: Mutex<DeviceCatalog>,
    settings: Mutex<CaptureSettings>,

    // Keyed by request so concurrent captures never see each other's data
    pending_photos: Mutex<HashMap<CaptureRequestId, PendingPhoto>>,
    recording: Mutex<Option<RecordingSession>>,
    diagnostics: Arc<Mutex<CoordinatorDiagnostics>>,

    // Hardware work; never blocks on storage
    session_queue: SerialQueue,
    saver: AssetSaver,
    notifier: Arc<Notifier>,
}

/// Owns the capture session and drives its state machine.
///
/// ```text
/// [UI command] → session queue → [SessionStore / hardware]
///                                       ↓ callback
///                          persistence queue → [PersistenceGateway]
///                                       ↓
///                          observer queue → [CameraObserver]
/// ```
///
/// Commands check their preconditions immediately and return
/// `CameraError::Ignored` when they cannot apply; accepted commands run on
/// the session queue. Capture and storage failures are never returned from
/// a command: they reach the observer as a completion without an asset.
pub struct CaptureCoordinator {
    inner: Arc<Inner>,
}

impl CaptureCoordinator {
    pub fn new(
        hardware: CaptureHardware,
        gateway: Arc<dyn PersistenceGateway>,
        observer: Arc<dyn CameraObserver>,
        config: CameraConfiguration,
    ) -> Result<Self, CameraError> {
        config.validate().map_err(CameraError::ConfigurationFailed)?;

        let diagnostics = Arc::new(Mutex::new(CoordinatorDiagnostics::default()));
        let notifier = Arc::new(Notifier::new(observer)?);
        let saver = AssetSaver::new(gateway, Arc::clone(&notifier), Arc::clone(&diagnostics))?;

        let inner = Inner {
            settings: Mutex::new(config.initial_settings),
            config,
            session_id: Uuid::new_v4(),
            devices: hardware.devices,
            permission: hardware.permission,
            photo_output: hardware.photo_output,
            movie_output: hardware.movie_output,
            state: Mutex::new(SessionState::Uninitialized),
            store: Mutex::new(SessionStore::new(hardware.session)),
            catalog: Mutex::new(DeviceCatalog::default()),
            pending_photos: Mutex::new(HashMap::new()),
            recording: Mutex::new(None),
            diagnostics,
            session_queue: SerialQueue::new("camera-session")?,
            saver,
            notifier,
        };

        Ok(Self {
            inner: Arc::new(inner),
        })
    }

    pub fn state(&self) -> SessionState {
        *self.inner.state.lock()
    }

    pub fn recording_state(&self) -> RecordingState {
        if self.is_recording() {
            RecordingState::Recording
        } else {
            RecordingState::Idle
        }
    }

    pub fn is_recording(&self) -> bool {
        self.inner.recording.lock().is_some()
    }

    pub fn current_input(&self) -> Option<DeviceInput> {
        self.inner.store.lock().current_input().cloned()
    }

    pub fn settings(&self) -> CaptureSettings {
        *self.inner.settings.lock()
    }

    pub fn session_handle(&self) -> SessionHandle {
        self.inner.session_handle()
    }

    pub fn diagnostics(&self) -> CoordinatorDiagnostics {
        self.inner.diagnostics.lock().clone()
    }

    /// Check camera access and bring the session up.
    ///
    /// Transitions: uninitialized → starting → running. Without access the
    /// observer gets `on_unavailable` and the state stays uninitialized;
    /// calling `setup` again re-checks access.
    pub fn setup(&self) -> Result<(), CameraError> {
        if self.state() != SessionState::Uninitialized {
            return Err(self.inner.ignore(Ignored::AlreadySetUp));
        }

        // Called without the state lock; the provider may query the coordinator.
        let authorization = self.inner.permission.check_authorization();
        if authorization != Authorization::Authorized {
            log::warn!("Camera unavailable: authorization is {:?}", authorization);
            self.inner.notifier.unavailable();
            return Err(CameraError::PermissionDenied);
        }

        {
            let mut state = self.inner.state.lock();
            if *state != SessionState::Uninitialized {
                drop(state);
                return Err(self.inner.ignore(Ignored::AlreadySetUp));
            }
            *state = SessionState::Starting;
        }
        log::info!("Camera authorized, starting session {}", self.inner.session_id);

        let inner = Arc::clone(&self.inner);
        self.inner.session_queue.dispatch(move || inner.bring_up());
        Ok(())
    }

    /// Restart a stopped session. Transitions: stopped → starting → running.
    pub fn start_session(&self) -> Result<(), CameraError> {
        {
            let mut state = self.inner.state.lock();
            match *state {
                SessionState::Stopped => *state = SessionState::Starting,
                SessionState::Uninitialized => return Err(self.inner.ignore(Ignored::NotSetUp)),
                SessionState::Starting | SessionState::Running => {
                    return Err(self.inner.ignore(Ignored::AlreadyRunning))
                }
            }
        }

        let inner = Arc::clone(&self.inner);
        self.inner.session_queue.dispatch(move || inner.bring_up());
        Ok(())
    }

    /// Stop the session. Takes effect immediately: work already queued for
    /// the session becomes a no-op. Captures already handed to the hardware
    /// still complete and are reported.
    pub fn stop_session(&self) -> Result<(), CameraError> {
        {
            let mut state = self.inner.state.lock();
            match *state {
                SessionState::Starting | SessionState::Running => *state = SessionState::Stopped,
                SessionState::Uninitialized | SessionState::Stopped => {
                    return Err(self.inner.ignore(Ignored::NotRunning))
                }
            }
        }
        log::info!("Stopping session {}", self.inner.session_id);

        let inner = Arc::clone(&self.inner);
        self.inner.session_queue.dispatch(move || inner.shut_down());
        Ok(())
    }

    /// Swap the active camera for the one on the other side.
    ///
    /// `completion` always runs, on the observer context, with the new
    /// input or the reason nothing changed.
    pub fn switch_camera<F>(&self, completion: F)
    where
        F: FnOnce(SwitchResult) + Send + 'static,
    {
        if !self.state().is_running() {
            let err = self.inner.ignore(Ignored::NotRunning);
            self.inner.notifier.deliver(move || completion(Err(err)));
            return;
        }

        let inner = Arc::clone(&self.inner);
        self.inner.session_queue.dispatch(move || {
            let outcome = inner.switch_input();
            inner.notifier.deliver(move || completion(outcome));
        });
    }

    /// Capture a photo with the settings in effect when the session queue
    /// reaches the request.
    ///
    /// The returned id is carried by the matching `CaptureCompleted`.
    pub fn take_photo(
        &self,
        orientation: CaptureOrientation,
        location: Option<GeoLocation>,
    ) -> Result<CaptureRequestId, CameraError> {
        if !self.state().is_running() {
            return Err(self.inner.ignore(Ignored::NotRunning));
        }
        let (has_output, position) = {
            let store = self.inner.store.lock();
            (
                store.has_output(CaptureOutput::Photo),
                store.current_input().map(DeviceInput::position),
            )
        };
        if !has_output {
            return Err(self.inner.ignore(Ignored::NoPhotoOutput));
        }
        let Some(position) = position else {
            return Err(self.inner.ignore(Ignored::NoActiveInput));
        };

        let id = CaptureRequestId::new();
        self.inner.pending_photos.lock().insert(
            id,
            PendingPhoto {
                location,
                orientation,
                position,
            },
        );
        self.inner.diagnostics.lock().photos_requested += 1;
        log::debug!("Photo {} requested ({:?}, {:?})", id, orientation, position);

        let inner = Arc::clone(&self.inner);
        self.inner
            .session_queue
            .dispatch(move || Inner::issue_photo(inner, id));
        Ok(id)
    }

    /// Begin recording a movie.
    ///
    /// `start_completion` receives `true` once the recorder is running and
    /// `false` if the recording could not start, including when another
    /// recording is already active. The movie is persisted when the
    /// recording stops, whoever stops it.
    pub fn start_video_recording<F>(
        &self,
        location: Option<GeoLocation>,
        start_completion: F,
    ) -> Result<CaptureRequestId, CameraError>
    where
        F: FnOnce(bool) + Send + 'static,
    {
        if let Err(reason) = self.recording_precondition() {
            let err = self.inner.ignore(reason);
            self.inner.notifier.deliver(move || start_completion(false));
            return Err(err);
        }

        let id = {
            let mut recording = self.inner.recording.lock();
            if recording.is_some() {
                drop(recording);
                let err = self.inner.ignore(Ignored::AlreadyRecording);
                self.inner.notifier.deliver(move || start_completion(false));
                return Err(err);
            }

            let id = CaptureRequestId::new();
            let destination = self
                .inner
                .config
                .recording_directory
                .join(format!("capture_{}.mov", id));
            *recording = Some(RecordingSession {
                id,
                destination,
                location,
                started_at: chrono::Utc::now(),
                finalizing: false,
            });
            id
        };
        self.inner.diagnostics.lock().recordings_started += 1;
        log::info!("Recording {} requested", id);

        let inner = Arc::clone(&self.inner);
        self.inner
            .session_queue
            .dispatch(move || Inner::begin_recording(inner, id, Box::new(start_completion)));
        Ok(id)
    }

    /// Ask the recorder to finish the active recording.
    pub fn stop_video_recording(&self) -> Result<(), CameraError> {
        let accepted = {
            let mut recording = self.inner.recording.lock();
            match recording.as_mut() {
                Some(session) if !session.finalizing => {
                    session.finalizing = true;
                    true
                }
                _ => false,
            }
        };
        if !accepted {
            return Err(self.inner.ignore(Ignored::NotRecording));
        }

        let inner = Arc::clone(&self.inner);
        self.inner
            .session_queue
            .dispatch(move || inner.movie_output.stop_recording());
        Ok(())
    }

    /// Change the flash mode used by later photo requests.
    pub fn set_flash(&self, mode: FlashMode) -> Result<(), CameraError> {
        let device = self.configurable_device()?;
        let supported = self.inner.photo_output.supported_flash_modes().contains(&mode);
        if !supported || (mode != FlashMode::Off && !device.has_flash) {
            return Err(self.inner.ignore(Ignored::FlashModeUnsupported));
        }

        let inner = Arc::clone(&self.inner);
        self.inner.session_queue.dispatch(move || {
            inner.with_device_lock(&device.id, |_| {
                inner.settings.lock().flash_mode = mode;
                log::debug!("Flash mode set to {:?}", mode);
                Ok(())
            });
        });
        Ok(())
    }

    /// Lock focus on `point` of the current camera.
    pub fn focus(&self, point: FocusPoint) -> Result<(), CameraError> {
        let device = self.configurable_device()?;
        if !device.supports_focus_mode(FocusMode::Locked) {
            return Err(self.inner.ignore(Ignored::FocusUnsupported));
        }

        let inner = Arc::clone(&self.inner);
        self.inner.session_queue.dispatch(move || {
            inner.with_device_lock(&device.id, |lock| lock.set_focus_point(point));
        });
        Ok(())
    }

    /// Block until all queued session, persistence and observer work has run.
    ///
    /// Hardware callbacks still outstanding are not waited for.
    pub fn flush(&self) {
        self.inner.session_queue.flush();
        self.inner.saver.flush();
        self.inner.notifier.flush();
    }

    fn recording_precondition(&self) -> Result<(), Ignored> {
        if !self.state().is_running() {
            return Err(Ignored::NotRunning);
        }
        if !self.inner.store.lock().has_output(CaptureOutput::Movie) {
            return Err(Ignored::NoMovieOutput);
        }
        Ok(())
    }

    fn configurable_device(&self) -> Result<CaptureDevice, CameraError> {
        if !self.state().is_running() {
            return Err(self.inner.ignore(Ignored::NotRunning));
        }
        let device = self
            .inner
            .store
            .lock()
            .current_input()
            .map(|input| input.device().clone());
        device.ok_or_else(|| self.inner.ignore(Ignored::NoActiveInput))
    }
}

impl Drop for CaptureCoordinator {
    fn drop(&mut self) {
        let state = self.state();
        if matches!(state, SessionState::Starting | SessionState::Running) {
            let _ = self.stop_session();
            self.inner.session_queue.flush();
        }
    }
}

impl Inner {
    fn ignore(&self, reason: Ignored) -> CameraError {
        log::debug!("Command ignored: {}", reason);
        self.diagnostics.lock().ignored_commands += 1;
        CameraError::Ignored(reason)
    }

    fn session_handle(&self) -> SessionHandle {
        let store = self.store.lock();
        SessionHandle {
            session_id: self.session_id,
            preset: store.preset(),
            input: store.current_input().cloned(),
        }
    }

    fn is_running(&self) -> bool {
        self.state.lock().is_running()
    }

    // --- Session queue jobs ---

    /// Starting → running. Configures the graph on first start.
    fn bring_up(&self) {
        if *self.state.lock() != SessionState::Starting {
            log::debug!("Start abandoned, session is no longer starting");
            return;
        }

        let configured = self.store.lock().current_input().is_some();
        if !configured && !self.configure_session() {
            let mut state = self.state.lock();
            if *state == SessionState::Starting {
                *state = SessionState::Uninitialized;
            }
            drop(state);
            self.notifier.unavailable();
            return;
        }

        let started = self.store.lock().start_running();

        let mut state = self.state.lock();
        if *state != SessionState::Starting {
            // Stopped meanwhile; the queued shut_down stops the hardware.
            return;
        }
        match started {
            Ok(()) => {
                *state = SessionState::Running;
                drop(state);
                log::info!("Session {} running", self.session_id);
                self.notifier.started(self.session_handle());
            }
            Err(e) => {
                *state = SessionState::Stopped;
                drop(state);
                log::error!("Failed to start capture session: {}", e);
                self.notifier.unavailable();
            }
        }
    }

    /// Discover devices and attach the default camera and both outputs.
    fn configure_session(&self) -> bool {
        let catalog = DeviceCatalog::discover(self.devices.as_ref());
        let Some(input) = catalog.default_camera(self.config.default_position).cloned() else {
            log::warn!("No camera found");
            return false;
        };
        *self.catalog.lock() = catalog;

        let reconfigured = self.store.lock().reconfigure(|tx| {
            let added = tx.add_input(&input);
            tx.add_output(CaptureOutput::Photo);
            tx.add_output(CaptureOutput::Movie);
            added
        });
        self.diagnostics.lock().reconfigurations += 1;

        if let Some(changed) = reconfigured.input_changed {
            self.notifier.input_changed(changed);
        }
        if !reconfigured.value {
            log::error!("Session declined camera {}", input.id());
        }
        reconfigured.value
    }

    fn shut_down(&self) {
        self.store.lock().stop_running();

        let active_recording = self.recording.lock().as_mut().map(|session| {
            session.finalizing = true;
            session.id
        });
        if let Some(id) = active_recording {
            log::info!("Finishing recording {} for shutdown", id);
            self.movie_output.stop_recording();
        }
        log::info!("Session {} stopped", self.session_id);
    }

    fn switch_input(&self) -> SwitchResult {
        if !self.is_running() {
            return Err(self.ignore(Ignored::SessionStopped));
        }

        let mut store = self.store.lock();
        let Some(current) = store.current_input().cloned() else {
            return Err(self.ignore(Ignored::NoActiveInput));
        };
        let Some(next) = self.catalog.lock().alternate_to(&current).cloned() else {
            return Err(self.ignore(Ignored::NoAlternateCamera));
        };

        let reconfigured = store.reconfigure(|tx| {
            tx.remove_input(&current);
            if tx.add_input(&next) {
                return true;
            }
            // Keep the session on its previous camera.
            tx.add_input(&current);
            false
        });
        drop(store);
        self.diagnostics.lock().reconfigurations += 1;

        if let Some(changed) = reconfigured.input_changed {
            self.notifier.input_changed(changed);
        }
        if reconfigured.value {
            Ok(next)
        } else {
            Err(CameraError::ConfigurationFailed(format!(
                "session declined camera {}",
                next.id()
            )))
        }
    }

    fn issue_photo(inner: Arc<Inner>, id: CaptureRequestId) {
        if !inner.is_running() {
            log::debug!("Photo {} not issued, session stopped", id);
            if inner.pending_photos.lock().remove(&id).is_some() {
                inner.saver.report_failure(id, MediaKind::Photo);
            }
            return;
        }

        let Some(orientation) = inner.pending_photos.lock().get(&id).map(|p| p.orientation) else {
            return;
        };
        let request = PhotoRequest {
            id,
            settings: *inner.settings.lock(),
            orientation,
        };

        let photo_output = Arc::clone(&inner.photo_output);
        photo_output.capture(
            request,
            Box::new(move |result: Result<CapturedPhoto, CameraError>| {
                inner.photo_finished(request, result)
            }),
        );
    }

    fn begin_recording(inner: Arc<Inner>, id: CaptureRequestId, start_completion: Box<dyn FnOnce(bool) + Send>) {
        let destination = match inner.recording.lock().as_ref() {
            Some(session) if session.id == id => session.destination.clone(),
            _ => {
                inner.notifier.deliver(move || start_completion(false));
                return;
            }
        };
        if !inner.is_running() {
            log::debug!("Recording {} not started, session stopped", id);
            inner.clear_recording(id);
            inner.notifier.deliver(move || start_completion(false));
            return;
        }

        let on_started = {
            let inner = Arc::clone(&inner);
            Box::new(move |result: Result<(), CameraError>| {
                inner.recording_started(id, result, start_completion)
            })
        };
        let on_finished = {
            let inner = Arc::clone(&inner);
            Box::new(move |result: Result<PathBuf, CameraError>| {
                inner.recording_finished(id, result)
            })
        };
        inner
            .movie_output
            .start_recording(&destination, on_started, on_finished);
    }

    fn with_device_lock<F>(&self, device: &DeviceId, mutation: F)
    where
        F: FnOnce(&ConfigurationLock<'_>) -> Result<(), CameraError>,
    {
        if !self.is_running() {
            log::debug!("Configuration of {} skipped, session stopped", device);
            return;
        }
        if self.store.lock().current_input().map(DeviceInput::id) != Some(device) {
            log::debug!("Configuration of {} skipped, camera changed", device);
            return;
        }

        match ConfigurationLock::acquire(self.devices.as_ref(), device) {
            Ok(lock) => {
                if let Err(e) = mutation(&lock) {
                    log::warn!("Configuration of {} failed: {}", device, e);
                }
            }
            Err(e) => {
                log::debug!("Could not lock {} for configuration: {}", device, e);
                self.diagnostics.lock().device_lock_failures += 1;
            }
        }
    }

    // --- Hardware callbacks (any thread) ---

    fn photo_finished(&self, request: PhotoRequest, result: Result<CapturedPhoto, CameraError>) {
        let Some(pending) = self.pending_photos.lock().remove(&request.id) else {
            log::warn!("Completion for unknown photo request {}", request.id);
            return;
        };
        if self.state.lock().is_stopped() {
            log::debug!("Photo {} finished after session stop", request.id);
        }

        match result {
            Ok(photo) if !photo.data.is_empty() => {
                let media = MediaPayload::Photo {
                    data: photo.data,
                    format: request.settings.format,
                    orientation: ImageOrientation::corrected(pending.orientation, pending.position),
                };
                self.saver.save(request.id, media, pending.location);
            }
            Ok(_) => {
                log::error!("Photo {} delivered no image data", request.id);
                self.saver.report_failure(request.id, MediaKind::Photo);
            }
            Err(e) => {
                log::error!("Photo {} failed: {}", request.id, e);
                self.saver.report_failure(request.id, MediaKind::Photo);
            }
        }
    }

    fn recording_started(
        &self,
        id: CaptureRequestId,
        result: Result<(), CameraError>,
        start_completion: Box<dyn FnOnce(bool) + Send>,
    ) {
        let started = match result {
            Ok(()) => {
                log::info!("Recording {} started", id);
                let stop_requested = self
                    .recording
                    .lock()
                    .as_ref()
                    .is_some_and(|session| session.id == id && session.finalizing);
                if stop_requested {
                    // The earlier stop may have reached the recorder before it was running.
                    log::debug!("Recording {} was stopped while starting, stopping again", id);
                    let movie_output = Arc::clone(&self.movie_output);
                    self.session_queue.dispatch(move || movie_output.stop_recording());
                }
                true
            }
            Err(e) => {
                log::error!("Recording {} failed to start: {}", id, e);
                self.clear_recording(id);
                self.diagnostics.lock().capture_failures += 1;
                false
            }
        };
        self.notifier.deliver(move || start_completion(started));
    }

    fn recording_finished(&self, id: CaptureRequestId, result: Result<PathBuf, CameraError>) {
        let Some(session) = self.clear_recording(id) else {
            log::warn!("Finish for unknown recording {}", id);
            return;
        };
        if self.state.lock().is_stopped() {
            log::debug!("Recording {} finished after session stop", id);
        }

        match result {
            Ok(path) => {
                log::info!("Recording {} finished: {}", id, path.display());
                self.saver.save(id, MediaPayload::Video { path }, session.location);
            }
            Err(e) => {
                log::error!("Recording {} failed: {}", id, e);
                self.saver.report_failure(id, MediaKind::Video);
            }
        }
    }

    fn clear_recording(&self, id: CaptureRequestId) -> Option<RecordingSession> {
        let mut recording = self.recording.lock();
        if recording.as_ref().map(|session| session.id) == Some(id) {
            recording.take()
        } else {
            None
        }
    }
}
