mod capture;
mod cpal_backend;
mod decoder;
mod resampler;
