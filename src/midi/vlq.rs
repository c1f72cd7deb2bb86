//! Variable-length quantities
//!
//! MIDI packs delta-times and chunk-internal lengths as big-endian groups of
//! 7 bits. Every byte but the last has its high bit set. A quantity never
//! spans more than 4 bytes, so the largest value is `0x0FFF_FFFF`.

use super::cursor::Cursor;
use super::MidiError;

/// Largest value a 4-byte quantity can hold
pub const MAX_VLQ: u32 = 0x0FFF_FFFF;

const MAX_VLQ_BYTES: usize = 4;

/// Read one quantity from the cursor
///
/// Stops at the first byte whose high bit is clear. A fourth byte that
/// still carries the continuation bit is a format error.
pub(crate) fn read_vlq(cursor: &mut Cursor<'_>) -> Result<u32, MidiError> {
    let start = cursor.position();
    let mut value = 0u32;

    for _ in 0..MAX_VLQ_BYTES {
        let byte = cursor.read_u8()?;
        value = (value << 7) | u32::from(byte & 0x7F);
        if byte & 0x80 == 0 {
            return Ok(value);
        }
    }

    Err(MidiError::Format(format!(
        "variable-length quantity at offset {} exceeds {} bytes",
        start, MAX_VLQ_BYTES
    )))
}

/// Encode a value as a quantity
///
/// Values above [`MAX_VLQ`] are clamped to it.
pub fn encode_vlq(value: u32) -> Vec<u8> {
    let mut value = value.min(MAX_VLQ);
    let mut out = vec![(value & 0x7F) as u8];
    value >>= 7;

    while value > 0 {
        out.push(((value & 0x7F) as u8) | 0x80);
        value >>= 7;
    }

    out.reverse();
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn decode(bytes: &[u8]) -> Result<u32, MidiError> {
        let mut cursor = Cursor::new(bytes, 0);
        read_vlq(&mut cursor)
    }

    #[test]
    fn test_known_encodings() {
        // Values from the SMF 1.0 reference table
        let table: &[(u32, &[u8])] = &[
            (0x00, &[0x00]),
            (0x40, &[0x40]),
            (0x7F, &[0x7F]),
            (0x80, &[0x81, 0x00]),
            (0x2000, &[0xC0, 0x00]),
            (0x3FFF, &[0xFF, 0x7F]),
            (0x4000, &[0x81, 0x80, 0x00]),
            (0x10_0000, &[0xC0, 0x80, 0x00]),
            (0x1F_FFFF, &[0xFF, 0xFF, 0x7F]),
            (0x20_0000, &[0x81, 0x80, 0x80, 0x00]),
            (0x0800_0000, &[0xC0, 0x80, 0x80, 0x00]),
            (0x0FFF_FFFF, &[0xFF, 0xFF, 0xFF, 0x7F]),
        ];

        for &(value, bytes) in table {
            assert_eq!(encode_vlq(value), bytes.to_vec(), "encoding {:#x}", value);
            assert_eq!(decode(bytes).unwrap(), value, "decoding {:#x}", value);
        }
    }

    #[test]
    fn test_round_trip_across_widths() {
        let mut value = 1u32;
        while value <= MAX_VLQ {
            for v in [value - 1, value, value.saturating_add(1).min(MAX_VLQ)] {
                assert_eq!(decode(&encode_vlq(v)).unwrap(), v);
            }
            value <<= 1;
        }
    }

    #[test]
    fn test_stops_at_first_terminal_byte() {
        let bytes = [0x81, 0x00, 0x7F, 0x7F];
        let mut cursor = Cursor::new(&bytes, 0);
        assert_eq!(read_vlq(&mut cursor).unwrap(), 0x80);
        assert_eq!(cursor.position(), 2);
    }

    #[test]
    fn test_first_byte_is_not_double_counted() {
        // 0x83 0x60: (3 << 7) | 0x60 = 480
        assert_eq!(decode(&[0x83, 0x60]).unwrap(), 480);
    }

    #[test]
    fn test_five_byte_quantity_rejected() {
        let err = decode(&[0x81, 0x80, 0x80, 0x80, 0x00]).unwrap_err();
        assert!(matches!(err, MidiError::Format(_)));
    }

    #[test]
    fn test_truncated_quantity() {
        let err = decode(&[0x81, 0x80]).unwrap_err();
        assert!(matches!(err, MidiError::Truncated { .. }));
    }

    #[test]
    fn test_encode_clamps_oversized_values() {
        assert_eq!(encode_vlq(u32::MAX), vec![0xFF, 0xFF, 0xFF, 0x7F]);
    }
}
