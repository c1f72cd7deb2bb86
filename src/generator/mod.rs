pub mod sine;

pub use sine::SineVoice;

/// Represents the current state of a signal generator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GeneratorState {
    /// Generator is still producing audible samples
    Running,
    /// Generator has decayed to silence and will only produce zeros
    Complete,
}

/// Core trait for all signal generators
///
/// Generators render integer PCM contributions into a shared mix buffer.
/// The buffer is wider than the output sample type so several generators can
/// be summed before clipping.
pub trait SignalGenerator {
    /// Add the next `buffer.len()` samples into `buffer`
    ///
    /// # Returns
    /// * `GeneratorState::Running` if the generator is still audible
    /// * `GeneratorState::Complete` if every further sample is zero
    fn process(&mut self, buffer: &mut [i32]) -> GeneratorState;

    /// Check if this generator has completed
    fn is_complete(&self) -> bool;

    /// Advance by `count` samples without producing output
    ///
    /// Only valid once complete, when every skipped sample would be zero.
    fn skip(&mut self, count: usize);
}
