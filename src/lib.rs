//! MIDI file to WAV rendering with additive sine synthesis
//!
//! ```text
//! bytes -> midi::decode -> MidiFile::timeline -> ToneSynthesizer -> wav::write_pcm
//! ```
//!
//! Every stage is a pure function of its input; there is no global state.

pub mod error;
pub mod generator;
pub mod midi;
pub mod pipeline;
pub mod wav;

pub use error::{Error, Result};
pub use midi::{decode, Event, MidiError, MidiFile};
pub use pipeline::{synthesize, SynthConfig, ToneSynthesizer};
pub use wav::{write_pcm, PcmFormat};

/// Decode a MIDI file and render it to mono 16-bit samples
pub fn render_samples(bytes: &[u8], config: &SynthConfig) -> Result<Vec<i16>> {
    let file = midi::decode(bytes)?;
    let timeline = file.timeline();
    let samples = ToneSynthesizer::render(config, &timeline, file.ticks_per_quarter)?;
    Ok(samples)
}

/// Decode a MIDI file and render it to a complete WAV byte buffer
///
/// # Example
/// ```
/// use midisine::{render_wav, SynthConfig};
///
/// let midi = [
///     b'M', b'T', b'h', b'd', 0, 0, 0, 6, 0, 0, 0, 1, 0x01, 0xE0,
///     b'M', b'T', b'r', b'k', 0, 0, 0, 13,
///     0x00, 0x90, 69, 127,
///     0x83, 0x60, 0x80, 69, 0,
///     0x00, 0xFF, 0x2F, 0x00,
/// ];
/// let wav = render_wav(&midi, &SynthConfig::default()).unwrap();
/// // Header plus half a second of 16-bit mono at 44.1 kHz
/// assert_eq!(wav.len(), 44 + 22050 * 2);
/// ```
pub fn render_wav(bytes: &[u8], config: &SynthConfig) -> Result<Vec<u8>> {
    let samples = render_samples(bytes, config)?;
    let wav = wav::write_pcm(&samples, &PcmFormat::mono_16bit(config.sample_rate))?;
    Ok(wav)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::midi::testutil::{smf, TrackBuilder};
    use std::io::Cursor;

    #[test]
    fn test_render_single_note() {
        let bytes = smf(
            0,
            480,
            &[TrackBuilder::new()
                .note_on(0, 0, 69, 127)
                .note_off(480, 0, 69)
                .end(0)],
        );
        let samples = render_samples(&bytes, &SynthConfig::default()).unwrap();
        assert_eq!(samples.len(), 22050);
        assert_eq!(samples[0], 0);
        let peak = samples.iter().map(|s| s.unsigned_abs()).max().unwrap();
        assert!(peak > 16000 && peak <= 16383);
    }

    #[test]
    fn test_render_wav_round_trips_through_hound() {
        let conductor = TrackBuilder::new().tempo(0, 250_000).end(960);
        let melody = TrackBuilder::new()
            .note_on(0, 0, 60, 100)
            .note_off(480, 0, 60)
            .note_on(0, 0, 67, 80)
            .note_off(480, 0, 67)
            .end(0);
        let bass = TrackBuilder::new()
            .note_on(0, 1, 36, 90)
            .note_off(960, 1, 36)
            .end(0);
        let bytes = smf(1, 480, &[conductor, melody, bass]);

        let config = SynthConfig::default();
        let samples = render_samples(&bytes, &config).unwrap();
        // Two quarters at 240 BPM
        assert_eq!(samples.len(), 22050);

        let wav = render_wav(&bytes, &config).unwrap();
        let reader = hound::WavReader::new(Cursor::new(wav)).unwrap();
        assert_eq!(reader.spec().sample_rate, 44100);
        let decoded: Vec<i16> = reader.into_samples::<i16>().map(|s| s.unwrap()).collect();
        assert_eq!(decoded, samples);
    }

    #[test]
    fn test_decode_errors_propagate() {
        let err = render_wav(b"not a midi file", &SynthConfig::default()).unwrap_err();
        assert!(matches!(err, Error::Midi(MidiError::Format(_))));
    }

    #[test]
    fn test_huge_delta_fails_cleanly() {
        let bytes = smf(
            0,
            1,
            &[TrackBuilder::new()
                .tempo(0, 0xFF_FFFF)
                .note_on(0, 0, 60, 100)
                .note_off(0x0FFF_FFFF, 0, 60)
                .end(0)],
        );
        let err = render_wav(&bytes, &SynthConfig::default()).unwrap_err();
        assert!(matches!(
            err,
            Error::Synth(pipeline::SynthError::TooLong { .. })
        ));
    }

    #[test]
    fn test_rendering_is_deterministic() {
        let bytes = smf(
            0,
            96,
            &[TrackBuilder::new()
                .note_on(0, 0, 60, 100)
                .note_on(0, 0, 64, 100)
                .note_off(96, 0, 60)
                .note_off(48, 0, 64)
                .end(0)],
        );
        let config = SynthConfig::default();
        assert_eq!(
            render_wav(&bytes, &config).unwrap(),
            render_wav(&bytes, &config).unwrap()
        );
    }
}
