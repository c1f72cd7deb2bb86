//! Voice manager for polyphonic synthesis
//!
//! Holds one sine voice per sounding MIDI note. A note is in the set exactly
//! while it sounds; there is no fixed voice limit.

use std::collections::BTreeMap;

use log::trace;

use crate::generator::sine::note_frequency;
use crate::generator::{GeneratorState, SignalGenerator, SineVoice};
use crate::midi::Event;

/// Configuration for all voices (common settings)
#[derive(Debug, Clone)]
pub struct VoiceConfig {
    /// Amplitude of a velocity-127 note in PCM units
    pub peak_amplitude: f64,
    /// Per-sample amplitude factor
    pub decay_per_sample: f64,
}

impl Default for VoiceConfig {
    fn default() -> Self {
        Self {
            peak_amplitude: 16383.0,
            decay_per_sample: 0.9999,
        }
    }
}

impl VoiceConfig {
    /// Starting amplitude for a note velocity
    pub fn amplitude_for(&self, velocity: u8) -> f64 {
        self.peak_amplitude * f64::from(velocity.min(127)) / 127.0
    }
}

/// Manages the set of sounding notes
pub struct VoiceManager {
    config: VoiceConfig,
    active_voices: BTreeMap<u8, SineVoice>,
    sample_rate: u32,
    mix_buffer: Vec<i32>,
}

impl VoiceManager {
    pub fn new(config: VoiceConfig, sample_rate: u32) -> Self {
        Self {
            config,
            active_voices: BTreeMap::new(),
            sample_rate,
            mix_buffer: Vec::new(),
        }
    }

    /// Apply a note event; every other event kind is ignored
    pub fn handle_event(&mut self, event: &Event) {
        match *event {
            Event::NoteOn {
                note, velocity: 0, ..
            }
            | Event::NoteOff { note, .. } => self.note_off(note),
            Event::NoteOn { note, velocity, .. } => self.note_on(note, velocity),
            _ => {}
        }
    }

    /// Start a note, or re-strike it if it is already sounding
    ///
    /// A re-strike resets the amplitude but keeps the oscillator phase.
    pub fn note_on(&mut self, note: u8, velocity: u8) {
        let amplitude = self.config.amplitude_for(velocity);
        match self.active_voices.get_mut(&note) {
            Some(voice) => {
                trace!("re-strike note {} at velocity {}", note, velocity);
                voice.restrike(amplitude);
            }
            None => {
                trace!("note {} on at velocity {}", note, velocity);
                let voice = SineVoice::new(
                    note_frequency(note),
                    amplitude,
                    self.config.decay_per_sample,
                    self.sample_rate,
                );
                self.active_voices.insert(note, voice);
            }
        }
    }

    /// Stop a note; stopping a silent note does nothing
    pub fn note_off(&mut self, note: u8) {
        if self.active_voices.remove(&note).is_some() {
            trace!("note {} off", note);
        }
    }

    /// Render one frame of the mix into `buffer`
    ///
    /// Voices are summed in `i32` and saturated to the `i16` range. A voice
    /// that has decayed to silence stays sounding but only advances its phase.
    pub fn process_frame(&mut self, buffer: &mut [i16]) {
        if !self.has_active_voices() {
            buffer.fill(0);
            return;
        }

        self.mix_buffer.clear();
        self.mix_buffer.resize(buffer.len(), 0);

        for (&note, voice) in self.active_voices.iter_mut() {
            if voice.is_complete() {
                voice.skip(buffer.len());
            } else if voice.process(&mut self.mix_buffer) == GeneratorState::Complete {
                trace!("note {} decayed to silence", note);
            }
        }

        for (out, &sum) in buffer.iter_mut().zip(&self.mix_buffer) {
            *out = clip_to_i16(sum);
        }
    }

    /// Check if there are any active voices
    pub fn has_active_voices(&self) -> bool {
        !self.active_voices.is_empty()
    }

    /// Get the number of active voices
    pub fn voice_count(&self) -> usize {
        self.active_voices.len()
    }
}

/// Hard clip a mixed sample to the 16-bit range (saturating, never wrapping)
pub fn clip_to_i16(sample: i32) -> i16 {
    sample.clamp(i32::from(i16::MIN), i32::from(i16::MAX)) as i16
}
