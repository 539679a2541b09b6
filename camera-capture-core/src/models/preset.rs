use serde::{Deserialize, Serialize};

/// Capture quality tier negotiated between device and session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QualityPreset {
    High,
    Medium,
    Low,
}

impl QualityPreset {
    /// Presets in order of preference, best first.
    pub const PREFERRED: [QualityPreset; 3] = [Self::High, Self::Medium, Self::Low];
}
