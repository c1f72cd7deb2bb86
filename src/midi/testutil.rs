//! Helpers for assembling MIDI bytes in tests

use super::vlq::encode_vlq;

/// Builds raw track bodies event by event
#[derive(Debug, Default, Clone)]
pub struct TrackBuilder {
    body: Vec<u8>,
}

impl TrackBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a delta-time followed by raw event bytes
    pub fn raw(mut self, delta: u32, bytes: &[u8]) -> Self {
        self.body.extend(encode_vlq(delta));
        self.body.extend_from_slice(bytes);
        self
    }

    pub fn note_on(self, delta: u32, channel: u8, note: u8, velocity: u8) -> Self {
        self.raw(delta, &[0x90 | channel, note, velocity])
    }

    pub fn note_off(self, delta: u32, channel: u8, note: u8) -> Self {
        self.raw(delta, &[0x80 | channel, note, 0x40])
    }

    pub fn tempo(self, delta: u32, micros_per_quarter: u32) -> Self {
        let [_, a, b, c] = micros_per_quarter.to_be_bytes();
        self.raw(delta, &[0xFF, 0x51, 0x03, a, b, c])
    }

    pub fn end(self, delta: u32) -> Self {
        self.raw(delta, &[0xFF, 0x2F, 0x00])
    }

    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// Wrap the body in an `MTrk` chunk with its true length
    pub fn chunk(&self) -> Vec<u8> {
        chunk(b"MTrk", self.body.len() as u32, &self.body)
    }
}

pub fn chunk(id: &[u8; 4], declared_len: u32, body: &[u8]) -> Vec<u8> {
    let mut out = id.to_vec();
    out.extend_from_slice(&declared_len.to_be_bytes());
    out.extend_from_slice(body);
    out
}

pub fn header(format: u16, tracks: u16, division: u16) -> Vec<u8> {
    let mut body = Vec::new();
    body.extend_from_slice(&format.to_be_bytes());
    body.extend_from_slice(&tracks.to_be_bytes());
    body.extend_from_slice(&division.to_be_bytes());
    chunk(b"MThd", 6, &body)
}

/// A complete file from a header and already-built track chunks
pub fn smf(format: u16, division: u16, tracks: &[TrackBuilder]) -> Vec<u8> {
    let mut out = header(format, tracks.len() as u16, division);
    for track in tracks {
        out.extend(track.chunk());
    }
    out
}
