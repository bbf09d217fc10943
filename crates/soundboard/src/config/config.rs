//! Configuration management for the soundboard.
//!
//! Handles loading and saving TOML configuration files with cross-platform
//! paths, validation after load, and atomic write operations.

use crate::{
    AppError, AppResult,
    config::{
        DEFAULT_ALLOW_MICROPHONE, DEFAULT_BITS_PER_SAMPLE, DEFAULT_SLOTS, DEFAULT_SOUND_COUNT,
        PlaybackConfig, RecordingConfig, SoundsConfig,
    },
};

use std::{fs, io::Write, panic::Location, path::Path};

use directories::ProjectDirs;
use error_location::ErrorLocation;
use serde::{Deserialize, Serialize};
use soundboard_core::{CpalBackendOptions, SoundSource, WavEncoding};
use tracing::{debug, info, instrument, warn};

/// Main configuration struct.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Bundled sound effects.
    pub sounds: SoundsConfig,
    /// Recording slot settings.
    pub recording: RecordingConfig,
    /// Play-back settings.
    #[serde(default)]
    pub playback: PlaybackConfig,
}

impl Config {
    /// Load configuration from disk, creating default if not found.
    #[track_caller]
    #[instrument]
    pub fn load() -> AppResult<Self> {
        let proj_dirs = Self::project_dirs()?;
        let config_dir = proj_dirs.config_dir();

        if !config_dir.exists() {
            fs::create_dir_all(config_dir)?;
            debug!(config_dir = ?config_dir, "Created config directory");
        }

        let defaults = Self::defaults(proj_dirs.data_dir(), proj_dirs.cache_dir());
        Self::load_or_create(&config_dir.join("config.toml"), defaults)
    }

    /// Load and validate the file at `path`, or write `defaults` there if
    /// it does not exist yet.
    #[track_caller]
    #[instrument(skip(defaults))]
    pub(crate) fn load_or_create(path: &Path, defaults: Config) -> AppResult<Self> {
        if !path.exists() {
            info!(config_path = ?path, "No config found, creating default");
            defaults.save_to(path)?;

            warn!(
                sounds_dir = ?defaults.sounds.files.first().and_then(|p| p.parent()),
                "Default config created. Place sound1.mp3..sound3.mp3 in the sounds directory."
            );

            return Ok(defaults);
        }

        let contents = fs::read_to_string(path).map_err(|e| AppError::ConfigError {
            reason: format!("Failed to read config: {}", e),
            location: ErrorLocation::from(Location::caller()),
        })?;

        let config: Config = toml::from_str(&contents).map_err(|e| AppError::ConfigError {
            reason: format!("Failed to parse config: {}", e),
            location: ErrorLocation::from(Location::caller()),
        })?;

        config.validate()?;

        info!(config_path = ?path, "Configuration loaded");

        Ok(config)
    }

    /// Check value ranges.
    ///
    /// Sound files are not checked for existence here; a missing file
    /// only disables its button.
    #[track_caller]
    pub fn validate(&self) -> AppResult<()> {
        let location = Location::caller();
        let fail = |reason: String| AppError::ConfigError {
            reason,
            location: ErrorLocation::from(location),
        };

        if self.recording.slots == 0 {
            return Err(fail("recording.slots must be at least 1".to_string()));
        }

        if self.sounds.files.is_empty() {
            return Err(fail("sounds.files must list at least one sound".to_string()));
        }

        let volume = self.playback.recording_volume;
        if !volume.is_finite() || !(0.0..=1.0).contains(&volume) {
            return Err(fail(format!(
                "playback.recording_volume must be within 0.0..=1.0, got {}",
                volume
            )));
        }

        if WavEncoding::from_bits(self.recording.bits_per_sample).is_none() {
            return Err(fail(format!(
                "recording.bits_per_sample must be 16 or 32, got {}",
                self.recording.bits_per_sample
            )));
        }

        Ok(())
    }

    /// Save configuration to `path` using atomic write pattern.
    ///
    /// Writes to a temporary file first, then renames to prevent corruption
    /// if the process crashes during the write.
    #[track_caller]
    #[instrument(skip(self))]
    pub fn save_to(&self, path: &Path) -> AppResult<()> {
        let contents = toml::to_string_pretty(self).map_err(|e| AppError::ConfigError {
            reason: format!("Failed to serialize config: {}", e),
            location: ErrorLocation::from(Location::caller()),
        })?;

        // Atomic write: write to temp file then rename
        let temp_path = path.with_extension("toml.tmp");

        let mut temp_file = fs::File::create(&temp_path).map_err(|e| AppError::ConfigError {
            reason: format!("Failed to create temp config file: {}", e),
            location: ErrorLocation::from(Location::caller()),
        })?;

        temp_file
            .write_all(contents.as_bytes())
            .map_err(|e| AppError::ConfigError {
                reason: format!("Failed to write temp config file: {}", e),
                location: ErrorLocation::from(Location::caller()),
            })?;

        temp_file.sync_all().map_err(|e| AppError::ConfigError {
            reason: format!("Failed to sync temp config file: {}", e),
            location: ErrorLocation::from(Location::caller()),
        })?;

        fs::rename(&temp_path, path).map_err(|e| AppError::ConfigError {
            reason: format!("Failed to rename temp config to final: {}", e),
            location: ErrorLocation::from(Location::caller()),
        })?;

        info!(config_path = ?path, "Configuration saved (atomic write)");

        Ok(())
    }

    /// Default configuration rooted at the given data and cache dirs.
    pub(crate) fn defaults(data_dir: &Path, cache_dir: &Path) -> Self {
        let sounds_dir = data_dir.join("sounds");

        Config {
            sounds: SoundsConfig {
                files: (1..=DEFAULT_SOUND_COUNT)
                    .map(|i| sounds_dir.join(format!("sound{}.mp3", i)))
                    .collect(),
            },
            recording: RecordingConfig {
                slots: DEFAULT_SLOTS,
                output_dir: cache_dir.join("recordings"),
                allow_microphone: DEFAULT_ALLOW_MICROPHONE,
                bits_per_sample: DEFAULT_BITS_PER_SAMPLE,
            },
            playback: PlaybackConfig::default(),
        }
    }

    /// Catalog sources in button order.
    pub fn sound_sources(&self) -> Vec<SoundSource> {
        self.sounds
            .files
            .iter()
            .cloned()
            .map(SoundSource::Asset)
            .collect()
    }

    /// Options for the cpal backend.
    #[track_caller]
    pub fn backend_options(&self) -> AppResult<CpalBackendOptions> {
        let encoding = WavEncoding::from_bits(self.recording.bits_per_sample).ok_or_else(|| {
            AppError::ConfigError {
                reason: format!(
                    "Unsupported bits_per_sample: {}",
                    self.recording.bits_per_sample
                ),
                location: ErrorLocation::from(Location::caller()),
            }
        })?;

        Ok(CpalBackendOptions {
            output_dir: self.recording.output_dir.clone(),
            allow_microphone: self.recording.allow_microphone,
            encoding,
        })
    }

    #[track_caller]
    fn project_dirs() -> AppResult<ProjectDirs> {
        ProjectDirs::from("com", "soundboard", "Soundboard").ok_or_else(|| AppError::ConfigError {
            reason: "Failed to get project directories".to_string(),
            location: ErrorLocation::from(Location::caller()),
        })
    }
}

