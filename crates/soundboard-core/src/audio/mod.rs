mod backend;
pub(crate) mod capture;
pub(crate) mod cpal_backend;
pub(crate) mod decoder;
pub(crate) mod output;
mod resampler;
pub(crate) mod writer;

pub(crate) use {
    capture::{AudioCapturer, CapturedAudio},
    decoder::PcmBuffer,
    output::AudioOutput,
    resampler::Resampler,
};

pub use {
    backend::{
        AudioBackend, PermissionStatus, RecordingHandle, RecordingLocation, SessionMode,
        SoundHandle, SoundSource,
    },
    cpal_backend::{CpalBackend, CpalBackendOptions, CpalRecording, CpalSound},
    writer::WavEncoding,
};
