use crate::models::device::{CaptureOutput, DeviceInput};
use crate::models::error::CameraError;
use crate::models::preset::QualityPreset;

/// The hardware capture session: the graph of inputs and outputs.
///
/// Every method is called from the coordinator's session queue only.
/// Mutations between `begin_configuration` and `commit_configuration` take
/// effect together.
pub trait SessionBackend: Send {
    fn begin_configuration(&mut self);

    fn commit_configuration(&mut self);

    /// Whether the session would accept `input` in its current shape.
    fn can_add_input(&self, input: &DeviceInput) -> bool;

    fn add_input(&mut self, input: &DeviceInput) -> Result<(), CameraError>;

    fn remove_input(&mut self, input: &DeviceInput);

    fn can_add_output(&self, output: CaptureOutput) -> bool;

    fn add_output(&mut self, output: CaptureOutput) -> Result<(), CameraError>;

    fn can_set_preset(&self, preset: QualityPreset) -> bool;

    fn set_preset(&mut self, preset: QualityPreset);

    fn start_running(&mut self) -> Result<(), CameraError>;

    fn stop_running(&mut self);

    fn is_running(&self) -> bool;
}
