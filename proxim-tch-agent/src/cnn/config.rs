use crate::util::OutDim;
use serde::{Deserialize, Serialize};

/// Configuration of [`Cnn`](super::Cnn).
#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
pub struct CnnConfig {
    pub(super) n_stack: i64,
    pub(super) out_dim: i64,
}

impl CnnConfig {
    /// Constructs the configuration.
    ///
    /// `n_stack` is the number of input channels, i.e., the number of
    /// stacked frames for frame-stacked image observations.
    pub fn new(n_stack: i64, out_dim: i64) -> Self {
        Self { n_stack, out_dim }
    }
}

impl OutDim for CnnConfig {
    fn get_out_dim(&self) -> i64 {
        self.out_dim
    }

    fn set_out_dim(&mut self, v: i64) {
        self.out_dim = v;
    }
}
