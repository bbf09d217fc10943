use crate::config::default_recording_volume;

use serde::{Deserialize, Serialize};

/// Play-back settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaybackConfig {
    /// Volume for recorded clips, `0.0..=1.0`.
    #[serde(default = "default_recording_volume")]
    pub recording_volume: f32,
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            recording_volume: default_recording_volume(),
        }
    }
}
