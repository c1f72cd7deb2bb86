//! Tick to sample conversion
//!
//! Elapsed time is kept as an exact integer (`ticks * micros_per_quarter`
//! summed over tempo segments), and sample positions are derived from it with
//! a single truncating division. Per-interval sample counts are differences of
//! those positions, so truncation never accumulates drift.

use std::num::NonZeroU16;

use crate::midi::DEFAULT_MICROS_PER_QUARTER;

const MICROS_PER_SECOND: u128 = 1_000_000;

/// Running tempo state for one synthesis pass
#[derive(Debug, Clone)]
pub struct TimingContext {
    micros_per_quarter: u32,
    ticks_per_quarter: NonZeroU16,
    sample_rate: u32,
    /// Absolute tick of the last `advance_to`
    tick: u64,
    /// Elapsed time in units of microseconds / ticks_per_quarter
    elapsed: u128,
    /// Sample position corresponding to `elapsed`
    sample_position: u64,
}

impl TimingContext {
    pub fn new(ticks_per_quarter: NonZeroU16, sample_rate: u32) -> Self {
        Self {
            micros_per_quarter: DEFAULT_MICROS_PER_QUARTER,
            ticks_per_quarter,
            sample_rate,
            tick: 0,
            elapsed: 0,
            sample_position: 0,
        }
    }

    pub fn micros_per_quarter(&self) -> u32 {
        self.micros_per_quarter
    }

    /// Derived from the live tempo, so it follows every tempo change
    pub fn micros_per_tick(&self) -> f64 {
        f64::from(self.micros_per_quarter) / f64::from(self.ticks_per_quarter.get())
    }

    pub fn tick(&self) -> u64 {
        self.tick
    }

    /// Sample position reached so far
    pub fn sample_position(&self) -> u64 {
        self.sample_position
    }

    /// Apply a set-tempo event; only ticks after this point are affected
    pub fn set_tempo(&mut self, micros_per_quarter: u32) {
        self.micros_per_quarter = micros_per_quarter;
    }

    /// Advance to an absolute tick and return the samples that elapsed
    ///
    /// A tick behind the current position is treated as no time passing.
    /// Positions beyond `u64` saturate; callers bound the result before
    /// allocating anything.
    pub fn advance_to(&mut self, tick: u64) -> u64 {
        let delta = tick.saturating_sub(self.tick);
        self.tick = self.tick.max(tick);
        self.elapsed += u128::from(delta) * u128::from(self.micros_per_quarter);

        let denominator = u128::from(self.ticks_per_quarter.get()) * MICROS_PER_SECOND;
        let position = u64::try_from(self.elapsed * u128::from(self.sample_rate) / denominator)
            .unwrap_or(u64::MAX);
        let count = position - self.sample_position;
        self.sample_position = position;
        count
    }
}
