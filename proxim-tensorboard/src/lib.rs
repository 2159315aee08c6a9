//! Tensorboard backend for the record system.
use proxim_core::record::{Record, RecordValue, Recorder};
use std::path::Path;
use tensorboard_rs::summary_writer::SummaryWriter;

/// Writes records into a TFRecord event file.
pub struct TensorboardRecorder {
    writer: SummaryWriter,
    ignore_unsupported_value: bool,
}

impl TensorboardRecorder {
    /// Constructs a [`TensorboardRecorder`].
    ///
    /// The event file will be stored in `logdir`.
    pub fn new<P: AsRef<Path>>(logdir: P) -> Self {
        Self {
            writer: SummaryWriter::new(logdir),
            ignore_unsupported_value: true,
        }
    }

    /// Constructs a [`TensorboardRecorder`] that panics on record values
    /// it cannot represent.
    pub fn new_with_check_unsupported_value<P: AsRef<Path>>(logdir: P) -> Self {
        Self {
            writer: SummaryWriter::new(logdir),
            ignore_unsupported_value: false,
        }
    }
}

impl Recorder for TensorboardRecorder {
    /// Writes a given [`Record`] into a TFRecord at the given step.
    ///
    /// [`RecordValue::Scalar`] values are written as scalar summaries and
    /// [`RecordValue::Array2`] values as grayscale images; other variants
    /// are ignored.
    fn write(&mut self, step: i64, record: Record) {
        let step = step as usize;

        for (k, v) in record.iter() {
            match v {
                RecordValue::Scalar(v) => self.writer.add_scalar(k, *v, step),
                RecordValue::DateTime(_) => {} // discard value
                RecordValue::Array2(data, shape) => {
                    let shape = [3, shape[0], shape[1]];
                    let min = data.iter().fold(f32::MAX, |m, v| v.min(m));
                    let scale = data.iter().fold(-f32::MAX, |m, v| v.max(m)) - min;
                    let mut data = data
                        .iter()
                        .map(|&e| ((e - min) / scale * 255f32) as u8)
                        .collect::<Vec<_>>();
                    let data_ = data.clone();
                    data.extend(data_.iter());
                    data.extend(data_.iter());
                    self.writer.add_image(k, data.as_slice(), &shape, step)
                }
                _ => {
                    if !self.ignore_unsupported_value {
                        panic!("Unsupported value: {:?}", (k, v));
                    }
                }
            };
        }
    }
}
