//! Types for recording training metrics.
//!
//! A [`Record`] is a string-keyed map of [`RecordValue`]s produced during
//! training and evaluation, e.g., cumulative rewards of episodes or losses
//! of optimization steps. [`Recorder`] is the interface of objects that
//! write records to some destination, like a tensorboard event file.
mod base;
mod buffered_recorder;
mod null_recorder;
mod recorder;

pub use base::{Record, RecordValue};
pub use buffered_recorder::BufferedRecorder;
pub use null_recorder::NullRecorder;
pub use recorder::Recorder;
