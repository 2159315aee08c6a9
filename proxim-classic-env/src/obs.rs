//! Observations of the classic-control environments.
use ndarray::Array1;
use proxim_core::Obs;

/// Observation, a vector of `f32`.
#[derive(Clone, Debug)]
pub struct ClassicObs(pub Array1<f32>);

impl Obs for ClassicObs {
    fn len(&self) -> usize {
        1
    }
}

#[cfg(feature = "tch")]
mod conv {
    use super::ClassicObs;
    use proxim_tch_agent::TensorBatch;
    use tch::Tensor;

    impl From<ClassicObs> for Tensor {
        fn from(obs: ClassicObs) -> Tensor {
            Tensor::from_slice(&obs.0.to_vec()).unsqueeze(0)
        }
    }

    impl From<ClassicObs> for TensorBatch {
        fn from(obs: ClassicObs) -> TensorBatch {
            TensorBatch::from_tensor(obs.into())
        }
    }
}
