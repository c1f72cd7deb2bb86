//! Crate-level error type

use thiserror::Error;

use crate::midi::MidiError;
use crate::pipeline::SynthError;
use crate::wav::WavError;

/// Result type for whole-pipeline operations
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Midi(#[from] MidiError),

    #[error(transparent)]
    Synth(#[from] SynthError),

    #[error(transparent)]
    Wav(#[from] WavError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
