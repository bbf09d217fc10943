use crate::config::{default_allow_microphone, default_bits_per_sample, default_slots};

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Recording slot configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordingConfig {
    /// Number of independent recording slots.
    #[serde(default = "default_slots")]
    pub slots: usize,

    /// Directory recorded clips are written to.
    pub output_dir: PathBuf,

    /// Whether microphone permission is granted when requested.
    #[serde(default = "default_allow_microphone")]
    pub allow_microphone: bool,

    /// WAV bit depth: 16 (integer) or 32 (float).
    #[serde(default = "default_bits_per_sample")]
    pub bits_per_sample: u16,
}
