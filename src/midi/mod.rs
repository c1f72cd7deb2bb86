//! Standard MIDI file decoding
//!
//! Turns the bytes of a `.mid` file into per-track event lists and merges
//! them into one tick-ordered timeline for the synthesizer:
//! - `vlq`: variable-length quantities
//! - `parser`: header and track chunk decoding with running status
//! - `timeline`: multi-track merge

mod cursor;
pub mod parser;
pub mod timeline;
pub mod vlq;

#[cfg(test)]
pub(crate) mod testutil;

use thiserror::Error;

pub use parser::decode;
pub use timeline::TimelineEvent;

/// Default tempo when a file carries no set-tempo meta event (120 BPM)
pub const DEFAULT_MICROS_PER_QUARTER: u32 = 500_000;

/// Errors raised while decoding a MIDI file
///
/// Every error aborts the whole decode; there is no partial result.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MidiError {
    /// Bad chunk magic or structurally invalid data
    #[error("invalid MIDI data: {0}")]
    Format(String),

    /// Valid MIDI that this decoder does not handle (SMPTE timing, system
    /// common messages, unknown file format)
    #[error("unsupported MIDI feature: {0}")]
    Unsupported(String),

    /// A chunk or event claims more bytes than remain
    #[error("truncated input at offset {offset}: wanted {wanted} bytes, {remaining} remaining")]
    Truncated {
        offset: usize,
        wanted: usize,
        remaining: usize,
    },
}

/// SMF file format from the header chunk
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    /// Format 0: one multi-channel track
    SingleTrack,
    /// Format 1: simultaneous tracks, track 0 holds the tempo map
    Parallel,
    /// Format 2: independent single-track patterns
    Sequential,
}

impl Format {
    pub fn from_raw(raw: u16) -> Result<Self, MidiError> {
        match raw {
            0 => Ok(Format::SingleTrack),
            1 => Ok(Format::Parallel),
            2 => Ok(Format::Sequential),
            other => Err(MidiError::Unsupported(format!("file format {}", other))),
        }
    }
}

/// A decoded track event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    NoteOff { channel: u8, note: u8, velocity: u8 },
    NoteOn { channel: u8, note: u8, velocity: u8 },
    Aftertouch { channel: u8, note: u8, pressure: u8 },
    Controller { channel: u8, controller: u8, value: u8 },
    ProgramChange { channel: u8, program: u8 },
    ChannelPressure { channel: u8, pressure: u8 },
    /// 14-bit bend value, 0x2000 is centered
    PitchBend { channel: u8, value: u16 },
    /// Set-tempo meta event
    Tempo { micros_per_quarter: u32 },
    EndOfTrack,
    /// System-exclusive payload, skipped
    SystemExclusive { length: u32 },
    /// Any meta event other than tempo and end-of-track, skipped
    OtherMeta { kind: u8, length: u32 },
}

impl Event {
    /// True for note-off and for note-on with velocity 0
    pub fn is_note_off(&self) -> bool {
        matches!(
            self,
            Event::NoteOff { .. } | Event::NoteOn { velocity: 0, .. }
        )
    }

    /// Channel of a channel-voice message
    pub fn channel(&self) -> Option<u8> {
        match *self {
            Event::NoteOff { channel, .. }
            | Event::NoteOn { channel, .. }
            | Event::Aftertouch { channel, .. }
            | Event::Controller { channel, .. }
            | Event::ProgramChange { channel, .. }
            | Event::ChannelPressure { channel, .. }
            | Event::PitchBend { channel, .. } => Some(channel),
            _ => None,
        }
    }
}

/// An event with its delta-time in ticks since the previous event of the track
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimedEvent {
    pub delta: u32,
    pub event: Event,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Track {
    pub events: Vec<TimedEvent>,
}

impl Track {
    /// Iterate events with absolute tick positions
    pub fn absolute(&self) -> impl Iterator<Item = (u64, &Event)> + '_ {
        self.events.iter().scan(0u64, |tick, timed| {
            *tick += u64::from(timed.delta);
            Some((*tick, &timed.event))
        })
    }

    /// Tick position of the last event
    pub fn length_ticks(&self) -> u64 {
        self.events.iter().map(|e| u64::from(e.delta)).sum()
    }
}

/// A decoded MIDI file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MidiFile {
    pub format: Format,
    pub ticks_per_quarter: u16,
    pub tracks: Vec<Track>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_velocity_zero_is_note_off() {
        let on = Event::NoteOn {
            channel: 0,
            note: 60,
            velocity: 0,
        };
        assert!(on.is_note_off());

        let on = Event::NoteOn {
            channel: 0,
            note: 60,
            velocity: 1,
        };
        assert!(!on.is_note_off());
        assert!(Event::NoteOff {
            channel: 3,
            note: 60,
            velocity: 64
        }
        .is_note_off());
    }

    #[test]
    fn test_channel_only_for_channel_messages() {
        let bend = Event::PitchBend {
            channel: 9,
            value: 0x2000,
        };
        assert_eq!(bend.channel(), Some(9));
        assert_eq!(
            Event::Tempo {
                micros_per_quarter: 500_000
            }
            .channel(),
            None
        );
        assert_eq!(Event::SystemExclusive { length: 3 }.channel(), None);
    }

    #[test]
    fn test_format_from_raw() {
        assert_eq!(Format::from_raw(0).unwrap(), Format::SingleTrack);
        assert_eq!(Format::from_raw(1).unwrap(), Format::Parallel);
        assert_eq!(Format::from_raw(2).unwrap(), Format::Sequential);
        assert!(matches!(
            Format::from_raw(3),
            Err(MidiError::Unsupported(_))
        ));
    }

    #[test]
    fn test_absolute_ticks() {
        let track = Track {
            events: vec![
                TimedEvent {
                    delta: 10,
                    event: Event::EndOfTrack,
                },
                TimedEvent {
                    delta: 0,
                    event: Event::EndOfTrack,
                },
                TimedEvent {
                    delta: 5,
                    event: Event::EndOfTrack,
                },
            ],
        };
        let ticks: Vec<u64> = track.absolute().map(|(t, _)| t).collect();
        assert_eq!(ticks, vec![10, 10, 15]);
        assert_eq!(track.length_ticks(), 15);
    }

    #[test]
    fn test_error_display() {
        let err = MidiError::Truncated {
            offset: 22,
            wanted: 4,
            remaining: 1,
        };
        assert_eq!(
            err.to_string(),
            "truncated input at offset 22: wanted 4 bytes, 1 remaining"
        );
    }
}
