//! Standard MIDI file parser
//!
//! Layout:
//! ```text
//! "MThd" <len:u32be> <format:u16be> <ntracks:u16be> <division:u16be> [extra]
//! "MTrk" <len:u32be> (<delta:vlq> <event>)* ... repeated ntracks times
//! ```
//!
//! Events:
//! - Channel messages `0x80..=0xEF`, with running status
//! - Meta events `0xFF <kind> <len:vlq> <payload>`
//! - System-exclusive `0xF0|0xF7 <len:vlq> <payload>` (skipped)
//!
//! Meta and system-exclusive events both clear running status.

use log::{debug, trace, warn};

use super::cursor::Cursor;
use super::vlq::read_vlq;
use super::{Event, Format, MidiError, MidiFile, TimedEvent, Track};

const HEADER_MAGIC: &[u8; 4] = b"MThd";
const TRACK_MAGIC: &[u8; 4] = b"MTrk";
const HEADER_LEN: usize = 6;

const META_TEMPO: u8 = 0x51;
const META_END_OF_TRACK: u8 = 0x2F;

/// Decode a complete MIDI file held in memory
///
/// The header chunk is validated before any track is touched. Each track is
/// parsed strictly inside its declared chunk length; a malformed track fails
/// the whole file.
///
/// # Example
/// ```
/// use midisine::midi::{decode, Event, Format};
///
/// let bytes = [
///     b'M', b'T', b'h', b'd', 0, 0, 0, 6, 0, 0, 0, 1, 0x01, 0xE0,
///     b'M', b'T', b'r', b'k', 0, 0, 0, 4, 0x00, 0xFF, 0x2F, 0x00,
/// ];
/// let file = decode(&bytes).unwrap();
/// assert_eq!(file.format, Format::SingleTrack);
/// assert_eq!(file.ticks_per_quarter, 480);
/// assert_eq!(file.tracks[0].events[0].event, Event::EndOfTrack);
/// ```
pub fn decode(bytes: &[u8]) -> Result<MidiFile, MidiError> {
    let mut cursor = Cursor::new(bytes, 0);
    let (format, track_count, ticks_per_quarter) = read_header(&mut cursor)?;

    debug!(
        "MIDI header: format {:?}, {} tracks, {} ticks per quarter",
        format, track_count, ticks_per_quarter
    );

    if format == Format::SingleTrack && track_count != 1 {
        warn!("format 0 file declares {} tracks", track_count);
    }

    let mut tracks = Vec::with_capacity(usize::from(track_count));
    for index in 0..track_count {
        let (body, offset) = read_chunk(&mut cursor, TRACK_MAGIC)?;
        let track = parse_track(body, offset)?;
        debug!(
            "track {}: {} bytes, {} events, {} ticks",
            index,
            body.len(),
            track.events.len(),
            track.length_ticks()
        );
        tracks.push(track);
    }

    if !cursor.is_empty() {
        debug!("ignoring {} bytes after the last track", cursor.remaining());
    }

    Ok(MidiFile {
        format,
        ticks_per_quarter,
        tracks,
    })
}

/// Read a chunk header and borrow its body
///
/// Returns the body and its absolute offset in the file.
fn read_chunk<'a>(
    cursor: &mut Cursor<'a>,
    magic: &[u8; 4],
) -> Result<(&'a [u8], usize), MidiError> {
    let offset = cursor.position();
    let id = cursor.read_bytes(4)?;
    if id != magic {
        return Err(MidiError::Format(format!(
            "expected chunk {:?} at offset {}, found {:?}",
            String::from_utf8_lossy(magic),
            offset,
            String::from_utf8_lossy(id)
        )));
    }

    let len = cursor.read_u32_be()? as usize;
    let body_offset = cursor.position();
    let body = cursor.read_bytes(len)?;
    Ok((body, body_offset))
}

fn read_header(cursor: &mut Cursor<'_>) -> Result<(Format, u16, u16), MidiError> {
    let (body, offset) = read_chunk(cursor, HEADER_MAGIC)?;
    if body.len() < HEADER_LEN {
        return Err(MidiError::Format(format!(
            "header chunk is {} bytes, expected at least {}",
            body.len(),
            HEADER_LEN
        )));
    }

    let mut header = Cursor::new(body, offset);
    let format = Format::from_raw(header.read_u16_be()?)?;
    let track_count = header.read_u16_be()?;
    let division = header.read_u16_be()?;

    if division & 0x8000 != 0 {
        return Err(MidiError::Unsupported(format!(
            "SMPTE time division {:#06X}",
            division
        )));
    }
    if division == 0 {
        return Err(MidiError::Format("zero ticks per quarter note".to_string()));
    }

    if !header.is_empty() {
        debug!("skipping {} extra header bytes", header.remaining());
    }

    Ok((format, track_count, division))
}

/// Parse one track body up to and including its end-of-track event
fn parse_track(body: &[u8], offset: usize) -> Result<Track, MidiError> {
    let mut cursor = Cursor::new(body, offset);
    let mut running_status: Option<u8> = None;
    let mut events = Vec::new();

    loop {
        let delta = read_vlq(&mut cursor)?;
        let event = read_event(&mut cursor, &mut running_status)?;
        trace!("+{} {:?}", delta, event);
        events.push(TimedEvent { delta, event });

        if event == Event::EndOfTrack {
            break;
        }
    }

    if !cursor.is_empty() {
        debug!(
            "ignoring {} bytes after end of track at offset {}",
            cursor.remaining(),
            cursor.position()
        );
    }

    Ok(Track { events })
}

fn read_event(
    cursor: &mut Cursor<'_>,
    running_status: &mut Option<u8>,
) -> Result<Event, MidiError> {
    let offset = cursor.position();

    // A data byte in status position repeats the previous channel status
    let status = match cursor.peek_u8()? {
        byte if byte & 0x80 != 0 => {
            cursor.read_u8()?;
            byte
        }
        byte => running_status.ok_or_else(|| {
            MidiError::Format(format!(
                "data byte {:#04X} at offset {} with no running status",
                byte, offset
            ))
        })?,
    };

    match status {
        0xFF => {
            *running_status = None;
            read_meta(cursor)
        }
        0xF0 | 0xF7 => {
            *running_status = None;
            let length = read_vlq(cursor)?;
            cursor.skip(length as usize)?;
            trace!("skipped {} bytes of system-exclusive data", length);
            Ok(Event::SystemExclusive { length })
        }
        0xF1..=0xFE => Err(MidiError::Unsupported(format!(
            "system message {:#04X} at offset {}",
            status, offset
        ))),
        _ => {
            *running_status = Some(status);
            read_channel_message(cursor, status)
        }
    }
}

fn read_data_byte(cursor: &mut Cursor<'_>) -> Result<u8, MidiError> {
    let offset = cursor.position();
    let byte = cursor.read_u8()?;
    if byte & 0x80 != 0 {
        return Err(MidiError::Format(format!(
            "expected data byte at offset {}, found status {:#04X}",
            offset, byte
        )));
    }
    Ok(byte)
}

fn read_data_pair(cursor: &mut Cursor<'_>) -> Result<(u8, u8), MidiError> {
    Ok((read_data_byte(cursor)?, read_data_byte(cursor)?))
}

fn read_channel_message(cursor: &mut Cursor<'_>, status: u8) -> Result<Event, MidiError> {
    let channel = status & 0x0F;

    let event = match status & 0xF0 {
        0x80 => {
            let (note, velocity) = read_data_pair(cursor)?;
            Event::NoteOff {
                channel,
                note,
                velocity,
            }
        }
        0x90 => {
            let (note, velocity) = read_data_pair(cursor)?;
            Event::NoteOn {
                channel,
                note,
                velocity,
            }
        }
        0xA0 => {
            let (note, pressure) = read_data_pair(cursor)?;
            Event::Aftertouch {
                channel,
                note,
                pressure,
            }
        }
        0xB0 => {
            let (controller, value) = read_data_pair(cursor)?;
            Event::Controller {
                channel,
                controller,
                value,
            }
        }
        0xC0 => Event::ProgramChange {
            channel,
            program: read_data_byte(cursor)?,
        },
        0xD0 => Event::ChannelPressure {
            channel,
            pressure: read_data_byte(cursor)?,
        },
        // 0xE0, LSB first
        _ => {
            let (lsb, msb) = read_data_pair(cursor)?;
            Event::PitchBend {
                channel,
                value: (u16::from(msb) << 7) | u16::from(lsb),
            }
        }
    };

    Ok(event)
}

/// Read a meta event after its `0xFF` status byte
fn read_meta(cursor: &mut Cursor<'_>) -> Result<Event, MidiError> {
    let offset = cursor.position();
    let kind = cursor.read_u8()?;
    let length = read_vlq(cursor)?;
    let payload = cursor.read_bytes(length as usize)?;

    match kind {
        META_TEMPO => {
            if payload.len() < 3 {
                return Err(MidiError::Format(format!(
                    "set-tempo event at offset {} has {} bytes, expected 3",
                    offset, length
                )));
            }
            if payload.len() > 3 {
                warn!(
                    "set-tempo event at offset {} has {} trailing bytes",
                    offset,
                    payload.len() - 3
                );
            }
            let micros_per_quarter = Cursor::new(payload, offset).read_u24_be()?;
            Ok(Event::Tempo { micros_per_quarter })
        }
        META_END_OF_TRACK => Ok(Event::EndOfTrack),
        _ => Ok(Event::OtherMeta { kind, length }),
    }
}
