use super::Record;

/// Writes a record to an output destination.
pub trait Recorder {
    /// Writes a record at the given global step.
    ///
    /// The meaning of `step` is decided by the caller; the trainer uses the
    /// episode counter for episode records and the epoch counter for
    /// optimization records.
    fn write(&mut self, step: i64, record: Record);
}
