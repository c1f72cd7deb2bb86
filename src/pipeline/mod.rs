//! Synthesis pipeline
//!
//! Turns a merged MIDI timeline into PCM samples:
//! - Timing: tick to sample conversion under the live tempo
//! - VoiceManager: polyphonic set of sounding notes
//! - Scheduler: walks the timeline and renders each interval

pub mod scheduler;
pub mod timing;
pub mod voicemgr;

use thiserror::Error;

pub use scheduler::{
    synthesize, SynthConfig, ToneSynthesizer, DEFAULT_MAX_SAMPLES, DEFAULT_SAMPLE_RATE,
};
pub use timing::TimingContext;
pub use voicemgr::{clip_to_i16, VoiceConfig, VoiceManager};

/// Errors raised while setting up or running a synthesizer
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SynthError {
    #[error("ticks per quarter note must be positive")]
    ZeroTicksPerQuarter,

    #[error("invalid sample rate: {0}")]
    InvalidSampleRate(u32),

    #[error("rendering would produce {samples} samples, limit is {limit}")]
    TooLong { samples: u64, limit: usize },
}
