//! Error types for sonify
//!
//! Mapping and narration never fail: bad values fall back to defaults.
//! The errors here cover the audio substrate, input files and teardown.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SonifyError {
    /// No audio output is possible (no host device, or the stream could not be built).
    #[error("Audio output unavailable: {0}")]
    AudioUnavailable(String),

    /// The output stream failed after it was started.
    #[error("Audio stream error: {0}")]
    Stream(String),

    /// A sweep was stopped after it had already finished.
    #[error("Sweep already finalized")]
    SweepFinalized,

    /// Invalid configuration value.
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// Dataset could not be read or parsed.
    #[error("Invalid dataset: {0}")]
    Data(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, SonifyError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = SonifyError::AudioUnavailable("no output device".to_string());
        assert_eq!(err.to_string(), "Audio output unavailable: no output device");
        assert_eq!(SonifyError::SweepFinalized.to_string(), "Sweep already finalized");
    }
}
