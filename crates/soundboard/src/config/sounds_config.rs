use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Bundled sound effects, one button each, in order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SoundsConfig {
    /// Paths of the sound files.
    pub files: Vec<PathBuf>,
}
