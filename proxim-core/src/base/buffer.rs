//! Rollout buffer interfaces.
use anyhow::Result;

/// Interface for buffers that store experiences from environments.
pub trait ExperienceBufferBase {
    /// Items in the buffer.
    type Item;

    /// Pushes a transition into the buffer.
    fn push(&mut self, tr: Self::Item) -> Result<()>;

    /// The number of transitions currently in the buffer.
    fn len(&self) -> usize;
}

/// Interface for fixed-capacity on-policy buffers that yield one epoch of
/// transitions at a time.
///
/// Unlike a replay buffer, a rollout buffer is consumed whole: it is
/// filled with exactly `capacity` transitions, the open episode is closed
/// with [`finish_path`](Self::finish_path) whenever the environment
/// terminates or the rollout is cut off, and the entire epoch is then
/// taken out with [`take_epoch`](Self::take_epoch), which logically
/// empties the buffer.
pub trait RolloutBufferBase: ExperienceBufferBase {
    /// Configuration of the buffer.
    type Config: Clone;

    /// A full epoch of transitions, taken out of the buffer.
    type Epoch;

    /// Builds a rollout buffer from the given configuration.
    fn build(config: &Self::Config) -> Self;

    /// The number of transitions making up an epoch.
    fn capacity(&self) -> usize;

    /// Closes the episode that is currently open in the buffer.
    ///
    /// `last_value` bootstraps the tail of the episode: 0 when the episode
    /// ended on a terminal state, the current value estimate of the next
    /// observation when the episode was cut off.
    fn finish_path(&mut self, last_value: f32);

    /// Takes the collected epoch out of the buffer.
    ///
    /// Fails unless the buffer is full. Afterwards the buffer is logically
    /// empty and a fresh epoch can be collected.
    fn take_epoch(&mut self) -> Result<Self::Epoch>;
}
