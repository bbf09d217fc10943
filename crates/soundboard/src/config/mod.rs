mod playback_config;
mod recording_config;
mod sounds_config;
#[allow(clippy::module_inception)]
mod config;

pub(crate) use {
    config::Config, playback_config::PlaybackConfig, recording_config::RecordingConfig,
    sounds_config::SoundsConfig,
};

pub(crate) const DEFAULT_SLOTS: usize = 3;
pub(crate) const DEFAULT_SOUND_COUNT: usize = 3;
pub(crate) const DEFAULT_ALLOW_MICROPHONE: bool = true;
pub(crate) const DEFAULT_BITS_PER_SAMPLE: u16 = 16;

pub(crate) fn default_slots() -> usize {
    DEFAULT_SLOTS
}

pub(crate) fn default_allow_microphone() -> bool {
    DEFAULT_ALLOW_MICROPHONE
}

pub(crate) fn default_bits_per_sample() -> u16 {
    DEFAULT_BITS_PER_SAMPLE
}

pub(crate) fn default_recording_volume() -> f32 {
    soundboard_core::MAX_VOLUME
}
