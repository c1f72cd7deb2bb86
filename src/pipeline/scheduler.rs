//! Scheduler and synthesis orchestrator
//!
//! Walks the merged timeline in order. Before each event it renders the
//! samples that elapsed since the previous one from whatever notes are
//! sounding, then applies the event (note on/off or tempo change).

use std::num::NonZeroU16;

use log::{debug, warn};

use super::timing::TimingContext;
use super::voicemgr::{VoiceConfig, VoiceManager};
use super::SynthError;
use crate::midi::{Event, TimelineEvent};

/// Default output sample rate in Hz
pub const DEFAULT_SAMPLE_RATE: u32 = 44100;

/// Default cap on rendered samples (about 6.7 hours at 44.1 kHz)
pub const DEFAULT_MAX_SAMPLES: usize = 1 << 30;

/// Configuration for the synthesizer
#[derive(Debug, Clone)]
pub struct SynthConfig {
    /// Sample rate in Hz
    pub sample_rate: u32,
    /// Voice amplitude and envelope settings
    pub voice_config: VoiceConfig,
    /// Longest output accepted before rendering fails
    pub max_samples: usize,
}

impl Default for SynthConfig {
    fn default() -> Self {
        Self {
            sample_rate: DEFAULT_SAMPLE_RATE,
            voice_config: VoiceConfig::default(),
            max_samples: DEFAULT_MAX_SAMPLES,
        }
    }
}

/// Converts a note timeline into mono 16-bit PCM
pub struct ToneSynthesizer {
    voices: VoiceManager,
    timing: TimingContext,
    samples: Vec<i16>,
    max_samples: usize,
}

impl ToneSynthesizer {
    /// Create a synthesizer for a file with the given time division
    pub fn new(config: &SynthConfig, ticks_per_quarter: u16) -> Result<Self, SynthError> {
        let ticks_per_quarter =
            NonZeroU16::new(ticks_per_quarter).ok_or(SynthError::ZeroTicksPerQuarter)?;
        if config.sample_rate == 0 {
            return Err(SynthError::InvalidSampleRate(config.sample_rate));
        }

        Ok(Self {
            voices: VoiceManager::new(config.voice_config.clone(), config.sample_rate),
            timing: TimingContext::new(ticks_per_quarter, config.sample_rate),
            samples: Vec::new(),
            max_samples: config.max_samples,
        })
    }

    /// Render a whole timeline
    ///
    /// The output ends at the tick of the last event; notes still sounding
    /// there are cut.
    pub fn render(
        config: &SynthConfig,
        events: &[TimelineEvent],
        ticks_per_quarter: u16,
    ) -> Result<Vec<i16>, SynthError> {
        let mut synth = Self::new(config, ticks_per_quarter)?;
        for event in events {
            synth.handle(event)?;
        }
        debug!(
            "rendered {} events into {} samples",
            events.len(),
            synth.samples.len()
        );
        Ok(synth.finish())
    }

    /// Render up to the event's tick, then apply it
    ///
    /// Fails without allocating if the output would exceed the configured
    /// maximum length.
    pub fn handle(&mut self, timed: &TimelineEvent) -> Result<(), SynthError> {
        if timed.tick < self.timing.tick() {
            warn!(
                "event at tick {} precedes current tick {}",
                timed.tick,
                self.timing.tick()
            );
        }

        self.timing.advance_to(timed.tick);
        let position = self.timing.sample_position();
        let count = usize::try_from(position)
            .ok()
            .filter(|&end| end <= self.max_samples)
            .map(|end| end - self.samples.len())
            .ok_or(SynthError::TooLong {
                samples: position,
                limit: self.max_samples,
            })?;
        self.render_interval(count);

        match timed.event {
            Event::Tempo { micros_per_quarter } => {
                debug!(
                    "tempo {} -> {} us/quarter at tick {}",
                    self.timing.micros_per_quarter(),
                    micros_per_quarter,
                    timed.tick
                );
                self.timing.set_tempo(micros_per_quarter);
            }
            ref event => self.voices.handle_event(event),
        }
        Ok(())
    }

    fn render_interval(&mut self, count: usize) {
        if count == 0 {
            return;
        }
        let start = self.samples.len();
        self.samples.resize(start + count, 0);
        self.voices.process_frame(&mut self.samples[start..]);
    }

    /// Samples rendered so far
    pub fn samples(&self) -> &[i16] {
        &self.samples
    }

    pub fn timing(&self) -> &TimingContext {
        &self.timing
    }

    /// Number of notes currently sounding
    pub fn voice_count(&self) -> usize {
        self.voices.voice_count()
    }

    /// Hand over the finished buffer
    pub fn finish(self) -> Vec<i16> {
        self.samples
    }
}

/// Render a timeline with default voice settings at `sample_rate_hz`
pub fn synthesize(
    events: &[TimelineEvent],
    ticks_per_quarter: u16,
    sample_rate_hz: u32,
) -> Result<Vec<i16>, SynthError> {
    let config = SynthConfig {
        sample_rate: sample_rate_hz,
        ..Default::default()
    };
    ToneSynthesizer::render(&config, events, ticks_per_quarter)
}
