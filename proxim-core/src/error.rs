//! Errors in the library.
use thiserror::Error;

/// Errors in the library.
#[derive(Error, Debug)]
pub enum ProximError {
    /// `push` was called on a rollout buffer that already holds a full epoch.
    #[error("Rollout buffer is full (capacity {capacity})")]
    BufferFull {
        /// Capacity of the buffer.
        capacity: usize,
    },

    /// The epoch was taken out of a rollout buffer before it was filled.
    #[error("Rollout buffer holds {len} of {capacity} transitions")]
    BufferNotFull {
        /// Number of transitions currently stored.
        len: usize,

        /// Capacity of the buffer.
        capacity: usize,
    },

    /// The action space of the environment cannot be handled by the agent.
    #[error("Unsupported action space: {0}")]
    UnsupportedActionSpace(String),

    /// A loss or advantage computation produced a non-finite value.
    #[error("Numeric instability in {0}")]
    NumericInstability(String),

    /// Record key error.
    #[error("Record key error: {0}")]
    RecordKeyError(String),

    /// Record value type error.
    #[error("Record value type error: {0}")]
    RecordValueTypeError(String),
}
