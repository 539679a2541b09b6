use std::collections::HashSet;

use crate::models::device::{CaptureDevice, CaptureOutput, DeviceInput, MediaRole};
use crate::models::error::CameraError;
use crate::models::preset::QualityPreset;
use crate::traits::session_backend::SessionBackend;

/// Pick the best preset both the device supports and the session accepts.
///
/// Walks `QualityPreset::PREFERRED` in order and returns the first match,
/// so a device supporting only medium and low gets medium.
pub fn negotiate_preset(device: &CaptureDevice, backend: &dyn SessionBackend) -> Option<QualityPreset> {
    QualityPreset::PREFERRED
        .into_iter()
        .find(|&preset| device.supports_preset(preset) && backend.can_set_preset(preset))
}

/// Single source of truth for the session graph and its preset.
///
/// Inputs and outputs change only inside `reconfigure`, which brackets the
/// mutations with begin/commit on the backend.
pub struct SessionStore {
    backend: Box<dyn SessionBackend>,
    inputs: Vec<DeviceInput>,
    outputs: HashSet<CaptureOutput>,
    preset: Option<QualityPreset>,
}

/// What a reconfiguration block returned, plus the committed effect on the
/// current camera.
#[derive(Debug)]
pub struct Reconfigured<R> {
    pub value: R,
    /// The camera input that became current, if it differs from before.
    pub input_changed: Option<DeviceInput>,
}

impl SessionStore {
    pub fn new(backend: Box<dyn SessionBackend>) -> Self {
        Self {
            backend,
            inputs: Vec::new(),
            outputs: HashSet::new(),
            preset: None,
        }
    }

    /// The active camera input.
    pub fn current_input(&self) -> Option<&DeviceInput> {
        self.inputs.iter().find(|input| input.role() == MediaRole::Video)
    }

    pub fn inputs(&self) -> &[DeviceInput] {
        &self.inputs
    }

    pub fn has_output(&self, output: CaptureOutput) -> bool {
        self.outputs.contains(&output)
    }

    pub fn preset(&self) -> Option<QualityPreset> {
        self.preset
    }

    /// Apply `block` as one atomic change to the session.
    ///
    /// The backend sees `begin_configuration` before the block and
    /// `commit_configuration` after it, even if the block unwinds.
    pub fn reconfigure<R, F>(&mut self, block: F) -> Reconfigured<R>
    where
        F: FnOnce(&mut SessionTransaction<'_>) -> R,
    {
        let before = self.current_input().cloned();

        let value = {
            let mut transaction = SessionTransaction::begin(self);
            block(&mut transaction)
        };

        let after = self.current_input().cloned();
        let input_changed = match (&before, after) {
            (Some(old), Some(new)) if *old == new => None,
            (_, after) => after,
        };
        if let Some(ref input) = input_changed {
            log::info!("Session input is now {}", input.device().name);
        }

        Reconfigured { value, input_changed }
    }

    pub fn start_running(&mut self) -> Result<(), CameraError> {
        if self.backend.is_running() {
            return Ok(());
        }
        self.backend.start_running()
    }

    pub fn stop_running(&mut self) {
        if self.backend.is_running() {
            self.backend.stop_running();
        }
    }

    pub fn is_running(&self) -> bool {
        self.backend.is_running()
    }
}

/// Open begin/commit bracket over a `SessionStore`. Commits on drop.
pub struct SessionTransaction<'a> {
    store: &'a mut SessionStore,
}

impl<'a> SessionTransaction<'a> {
    fn begin(store: &'a mut SessionStore) -> Self {
        store.backend.begin_configuration();
        Self { store }
    }

    pub fn current_input(&self) -> Option<&DeviceInput> {
        self.store.current_input()
    }

    /// Negotiate a preset for `input` and try to add it.
    ///
    /// Returns `false` when the session declines the input, when a camera
    /// shares no preset with the session, or when another input of the same
    /// role is still attached. A decline is not an error; check
    /// the return value before relying on the input.
    pub fn add_input(&mut self, input: &DeviceInput) -> bool {
        if let Some(occupant) = self.store.inputs.iter().find(|i| i.role() == input.role()) {
            log::warn!(
                "Not adding {}: {:?} input {} is still attached",
                input.id(),
                input.role(),
                occupant.id()
            );
            return false;
        }

        if input.role() == MediaRole::Video {
            let Some(preset) = negotiate_preset(input.device(), self.store.backend.as_ref()) else {
                log::warn!("Not adding {}: no preset shared with the session", input.id());
                return false;
            };
            self.store.backend.set_preset(preset);
            self.store.preset = Some(preset);
        }

        if !self.store.backend.can_add_input(input) {
            log::warn!("Session declined input {}", input.id());
            return false;
        }
        match self.store.backend.add_input(input) {
            Ok(()) => {
                self.store.inputs.push(input.clone());
                true
            }
            Err(e) => {
                log::warn!("Failed to add input {}: {}", input.id(), e);
                false
            }
        }
    }

    pub fn remove_input(&mut self, input: &DeviceInput) {
        self.store.backend.remove_input(input);
        self.store.inputs.retain(|i| i != input);
    }

    /// Attach an output. Already-attached outputs are left as they are.
    pub fn add_output(&mut self, output: CaptureOutput) -> bool {
        if self.store.outputs.contains(&output) {
            return true;
        }
        if !self.store.backend.can_add_output(output) {
            log::warn!("Session declined {:?} output", output);
            return false;
        }
        match self.store.backend.add_output(output) {
            Ok(()) => {
                self.store.outputs.insert(output);
                true
            }
            Err(e) => {
                log::warn!("Failed to add {:?} output: {}", output, e);
                false
            }
        }
    }
}

impl Drop for SessionTransaction<'_> {
    fn drop(&mut self) {
        self.store.backend.commit_configuration();
    }
}
