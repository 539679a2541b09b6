//! Virtual capture session.
//!
//! Changes made between `begin_configuration` and the matching
//! `commit_configuration` are staged and become visible to a `SessionMonitor`
//! only at commit, the way a hardware session applies a configuration block
//! atomically. Every commit is appended to the monitor's history.

use std::collections::HashSet;
use std::sync::Arc;

use parking_lot::Mutex;

use camera_capture_core::models::device::{CaptureOutput, DeviceId, DeviceInput, MediaRole};
use camera_capture_core::models::error::CameraError;
use camera_capture_core::models::preset::QualityPreset;
use camera_capture_core::traits::session_backend::SessionBackend;

/// Observable session configuration.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionSnapshot {
    pub inputs: Vec<DeviceInput>,
    pub outputs: Vec<CaptureOutput>,
    pub preset: Option<QualityPreset>,
    pub running: bool,
}

impl SessionSnapshot {
    pub fn video_inputs(&self) -> Vec<&DeviceInput> {
        self.inputs.iter().filter(|i| i.role() == MediaRole::Video).collect()
    }

    pub fn has_input(&self, id: &DeviceId) -> bool {
        self.inputs.iter().any(|i| i.id() == id)
    }
}

struct SessionModel {
    committed: SessionSnapshot,
    staged: SessionSnapshot,
    depth: u32,
    history: Vec<SessionSnapshot>,
    settable_presets: HashSet<QualityPreset>,
    declined_inputs: HashSet<DeviceId>,
    fail_start: bool,
    start_count: usize,
}

impl SessionModel {
    fn working(&mut self) -> &mut SessionSnapshot {
        if self.depth > 0 {
            &mut self.staged
        } else {
            &mut self.committed
        }
    }

    fn view(&self) -> &SessionSnapshot {
        if self.depth > 0 {
            &self.staged
        } else {
            &self.committed
        }
    }
}

/// `SessionBackend` over an in-memory model.
pub struct VirtualSession {
    model: Arc<Mutex<SessionModel>>,
}

/// Read and steer a `VirtualSession` after it has been handed to a coordinator.
#[derive(Clone)]
pub struct SessionMonitor {
    model: Arc<Mutex<SessionModel>>,
}

impl VirtualSession {
    /// A session that accepts every preset.
    pub fn new() -> Self {
        Self::with_presets(&QualityPreset::PREFERRED)
    }

    pub fn with_presets(presets: &[QualityPreset]) -> Self {
        let model = SessionModel {
            committed: SessionSnapshot::default(),
            staged: SessionSnapshot::default(),
            depth: 0,
            history: Vec::new(),
            settable_presets: presets.iter().copied().collect(),
            declined_inputs: HashSet::new(),
            fail_start: false,
            start_count: 0,
        };
        Self {
            model: Arc::new(Mutex::new(model)),
        }
    }

    pub fn monitor(&self) -> SessionMonitor {
        SessionMonitor {
            model: Arc::clone(&self.model),
        }
    }
}

impl Default for VirtualSession {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionMonitor {
    /// The last committed configuration.
    pub fn snapshot(&self) -> SessionSnapshot {
        self.model.lock().committed.clone()
    }

    /// Every committed configuration, oldest first.
    pub fn history(&self) -> Vec<SessionSnapshot> {
        self.model.lock().history.clone()
    }

    pub fn is_configuring(&self) -> bool {
        self.model.lock().depth > 0
    }

    /// Refuse `can_add_input` for `device` from now on.
    pub fn decline_input(&self, device: DeviceId) {
        self.model.lock().declined_inputs.insert(device);
    }

    pub fn set_settable_presets(&self, presets: &[QualityPreset]) {
        self.model.lock().settable_presets = presets.iter().copied().collect();
    }

    /// Make the next `start_running` fail.
    pub fn fail_next_start(&self) {
        self.model.lock().fail_start = true;
    }

    /// Number of successful `start_running` calls.
    pub fn start_count(&self) -> usize {
        self.model.lock().start_count
    }
}

impl SessionBackend for VirtualSession {
    fn begin_configuration(&mut self) {
        let mut model = self.model.lock();
        if model.depth == 0 {
            model.staged = model.committed.clone();
        }
        model.depth += 1;
    }

    fn commit_configuration(&mut self) {
        let mut model = self.model.lock();
        let depth = model.depth;
        match depth {
            0 => log::warn!("commit_configuration without begin_configuration"),
            1 => {
                model.depth = 0;
                model.committed = model.staged.clone();
                let committed = model.committed.clone();
                model.history.push(committed);
                log::trace!("virtual session committed");
            }
            _ => model.depth -= 1,
        }
    }

    fn can_add_input(&self, input: &DeviceInput) -> bool {
        let model = self.model.lock();
        !model.declined_inputs.contains(input.id()) && !model.view().has_input(input.id())
    }

    fn add_input(&mut self, input: &DeviceInput) -> Result<(), CameraError> {
        let mut model = self.model.lock();
        if model.declined_inputs.contains(input.id()) {
            return Err(CameraError::ConfigurationFailed(format!(
                "session declined {}",
                input.id()
            )));
        }
        let working = model.working();
        if working.has_input(input.id()) {
            return Err(CameraError::ConfigurationFailed(format!(
                "{} already attached",
                input.id()
            )));
        }
        working.inputs.push(input.clone());
        Ok(())
    }

    fn remove_input(&mut self, input: &DeviceInput) {
        self.model.lock().working().inputs.retain(|i| i != input);
    }

    fn can_add_output(&self, output: CaptureOutput) -> bool {
        !self.model.lock().view().outputs.contains(&output)
    }

    fn add_output(&mut self, output: CaptureOutput) -> Result<(), CameraError> {
        let mut model = self.model.lock();
        let working = model.working();
        if working.outputs.contains(&output) {
            return Err(CameraError::ConfigurationFailed(format!(
                "{:?} output already attached",
                output
            )));
        }
        working.outputs.push(output);
        Ok(())
    }

    fn can_set_preset(&self, preset: QualityPreset) -> bool {
        self.model.lock().settable_presets.contains(&preset)
    }

    fn set_preset(&mut self, preset: QualityPreset) {
        self.model.lock().working().preset = Some(preset);
    }

    fn start_running(&mut self) -> Result<(), CameraError> {
        let mut model = self.model.lock();
        if std::mem::take(&mut model.fail_start) {
            return Err(CameraError::DeviceNotAvailable);
        }
        model.committed.running = true;
        model.staged.running = true;
        model.start_count += 1;
        Ok(())
    }

    fn stop_running(&mut self) {
        let mut model = self.model.lock();
        model.committed.running = false;
        model.staged.running = false;
    }

    fn is_running(&self) -> bool {
        self.model.lock().committed.running
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device_provider::virtual_camera;
    use camera_capture_core::models::device::CameraPosition;

    fn input(id: &str, position: CameraPosition) -> DeviceInput {
        DeviceInput::new(virtual_camera(id, position, &QualityPreset::PREFERRED))
    }

    #[test]
    fn staged_changes_apply_at_commit() {
        let mut session = VirtualSession::new();
        let monitor = session.monitor();

        session.begin_configuration();
        session.add_input(&input("back", CameraPosition::Back)).unwrap();
        session.set_preset(QualityPreset::High);
        assert!(monitor.snapshot().inputs.is_empty());
        assert!(monitor.is_configuring());

        session.commit_configuration();
        let snapshot = monitor.snapshot();
        assert_eq!(snapshot.inputs.len(), 1);
        assert_eq!(snapshot.preset, Some(QualityPreset::High));
        assert_eq!(monitor.history().len(), 1);
    }

    #[test]
    fn nested_blocks_commit_once() {
        let mut session = VirtualSession::new();
        let monitor = session.monitor();

        session.begin_configuration();
        session.begin_configuration();
        session.add_output(CaptureOutput::Photo).unwrap();
        session.commit_configuration();
        assert!(monitor.snapshot().outputs.is_empty());
        session.commit_configuration();

        assert_eq!(monitor.snapshot().outputs, vec![CaptureOutput::Photo]);
        assert_eq!(monitor.history().len(), 1);
    }

    #[test]
    fn swap_is_observed_atomically() {
        let mut session = VirtualSession::new();
        let monitor = session.monitor();
        let back = input("back", CameraPosition::Back);
        let front = input("front", CameraPosition::Front);

        session.add_input(&back).unwrap();
        session.begin_configuration();
        session.remove_input(&back);
        session.add_input(&front).unwrap();
        session.commit_configuration();

        let snapshot = monitor.snapshot();
        assert_eq!(snapshot.video_inputs(), vec![&front]);
    }

    #[test]
    fn declined_and_duplicate_inputs() {
        let mut session = VirtualSession::new();
        let monitor = session.monitor();
        let back = input("back", CameraPosition::Back);

        session.add_input(&back).unwrap();
        assert!(!session.can_add_input(&back));
        assert!(session.add_input(&back).is_err());

        let front = input("front", CameraPosition::Front);
        monitor.decline_input(front.id().clone());
        assert!(!session.can_add_input(&front));
    }

    #[test]
    fn preset_support_and_start_failure() {
        let mut session = VirtualSession::with_presets(&[QualityPreset::Low]);
        let monitor = session.monitor();
        assert!(!session.can_set_preset(QualityPreset::High));
        assert!(session.can_set_preset(QualityPreset::Low));

        monitor.fail_next_start();
        assert!(session.start_running().is_err());
        assert!(!session.is_running());

        session.start_running().unwrap();
        assert!(monitor.snapshot().running);
        assert_eq!(monitor.start_count(), 1);

        session.stop_running();
        assert!(!session.is_running());
    }
}
