//! Action space descriptions.
use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind and shape of the action space of an environment.
///
/// Agents inspect this once, at model construction, to decide which
/// action-distribution family to build. Action spaces an agent cannot
/// handle are rejected there with
/// [`ProximError::UnsupportedActionSpace`](crate::error::ProximError).
#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
pub enum ActionSpace {
    /// Bounded continuous actions of the given dimensionality.
    Continuous {
        /// Dimensionality of the action vector.
        dim: i64,

        /// Lower bound, applied elementwise.
        low: f32,

        /// Upper bound, applied elementwise.
        high: f32,
    },

    /// Categorical actions with the given cardinality.
    Discrete {
        /// Number of actions.
        n: i64,
    },

    /// Several independent categorical action dimensions.
    MultiDiscrete {
        /// Cardinality of each dimension.
        nvec: Vec<i64>,
    },
}

impl fmt::Display for ActionSpace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Continuous { dim, low, high } => {
                write!(f, "Continuous(dim={}, low={}, high={})", dim, low, high)
            }
            Self::Discrete { n } => write!(f, "Discrete(n={})", n),
            Self::MultiDiscrete { nvec } => write!(f, "MultiDiscrete(nvec={:?})", nvec),
        }
    }
}
