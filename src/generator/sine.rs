use std::f64::consts::TAU;

use super::{GeneratorState, SignalGenerator};

/// Frequency of MIDI note 69 (A4)
pub const A4_FREQUENCY: f64 = 440.0;

/// Equal-tempered frequency of a MIDI note number
///
/// Formula: f = 440 * 2^((note - 69) / 12)
pub fn note_frequency(note: u8) -> f64 {
    A4_FREQUENCY * 2f64.powf((f64::from(note) - 69.0) / 12.0)
}

/// A decaying sine oscillator for one sounding note
///
/// The phase counter advances by one per rendered sample and is never reset
/// between frames, so a sustained note stays continuous across any number of
/// `process` calls. The amplitude is multiplied by `decay` after every sample.
#[derive(Debug, Clone)]
pub struct SineVoice {
    frequency: f64,
    sample_rate: f64,
    decay: f64,
    amplitude: f64,
    phase_index: u64,
}

impl SineVoice {
    /// Create a voice
    ///
    /// # Arguments
    /// * `frequency` - Oscillator frequency in Hz
    /// * `amplitude` - Starting peak value in PCM units
    /// * `decay` - Per-sample amplitude factor (e.g. 0.9999)
    /// * `sample_rate` - Sample rate in Hz
    ///
    /// # Example
    /// ```
    /// use midisine::generator::{SignalGenerator, SineVoice};
    ///
    /// let mut voice = SineVoice::new(440.0, 16383.0, 0.9999, 44100);
    /// let mut mix = vec![0i32; 64];
    /// voice.process(&mut mix);
    /// assert_eq!(mix[0], 0);
    /// ```
    pub fn new(frequency: f64, amplitude: f64, decay: f64, sample_rate: u32) -> Self {
        Self {
            frequency,
            sample_rate: f64::from(sample_rate),
            decay,
            amplitude,
            phase_index: 0,
        }
    }

    pub fn amplitude(&self) -> f64 {
        self.amplitude
    }

    /// Number of samples rendered since the voice started
    pub fn phase_index(&self) -> u64 {
        self.phase_index
    }

    /// Re-strike at a new amplitude without touching the phase
    pub fn restrike(&mut self, amplitude: f64) {
        self.amplitude = amplitude;
    }

    /// The contribution at the current phase, truncated toward zero
    fn current_sample(&self) -> i32 {
        let theta = TAU * self.frequency * self.phase_index as f64 / self.sample_rate;
        // Float to int casts saturate, and |amplitude| stays within i16
        i32::from((self.amplitude * theta.sin()) as i16)
    }
}

impl SignalGenerator for SineVoice {
    fn process(&mut self, buffer: &mut [i32]) -> GeneratorState {
        for sample in buffer.iter_mut() {
            *sample += self.current_sample();
            self.amplitude *= self.decay;
            self.phase_index += 1;
        }

        if self.is_complete() {
            GeneratorState::Complete
        } else {
            GeneratorState::Running
        }
    }

    /// Below one PCM step every truncated contribution is zero
    ///
    /// A growing amplitude (decay above 1) never completes.
    fn is_complete(&self) -> bool {
        self.amplitude.abs() < 1.0 && self.decay.abs() <= 1.0
    }

    fn skip(&mut self, count: usize) {
        self.amplitude *= self.decay.powi(count.min(i32::MAX as usize) as i32);
        self.phase_index += count as u64;
    }
}
