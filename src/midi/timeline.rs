//! Multi-track merge
//!
//! The synthesizer consumes a single timeline. Tracks are flattened to
//! absolute ticks and merged with a stable sort, so events on the same tick
//! keep track order first and file order second.

use log::debug;

use super::{Event, Format, MidiFile};

/// An event placed on the merged timeline
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimelineEvent {
    /// Absolute position in ticks
    pub tick: u64,
    /// Index of the source track
    pub track: usize,
    pub event: Event,
}

impl MidiFile {
    /// Merge all tracks into one tick-ordered event sequence
    ///
    /// In format 1 files track 0 is the conductor track: only its tempo and
    /// end-of-track events are kept. Every other track contributes all of its
    /// events.
    pub fn timeline(&self) -> Vec<TimelineEvent> {
        let mut merged: Vec<TimelineEvent> = self
            .tracks
            .iter()
            .enumerate()
            .flat_map(|(index, track)| {
                let conductor = self.format == Format::Parallel && index == 0;
                track
                    .absolute()
                    .filter(move |(_, event)| !conductor || is_conductor_event(event))
                    .map(move |(tick, event)| TimelineEvent {
                        tick,
                        track: index,
                        event: *event,
                    })
            })
            .collect();

        // Tracks were appended in order, so a stable sort on tick alone
        // breaks ties by track, then by position within the track
        merged.sort_by_key(|e| e.tick);

        debug!(
            "merged {} tracks into {} timeline events",
            self.tracks.len(),
            merged.len()
        );
        merged
    }

    /// Absolute tick of the last event on any track
    pub fn length_ticks(&self) -> u64 {
        self.tracks
            .iter()
            .map(|t| t.length_ticks())
            .max()
            .unwrap_or(0)
    }
}

fn is_conductor_event(event: &Event) -> bool {
    matches!(event, Event::Tempo { .. } | Event::EndOfTrack)
}
