//! Actions of the classic-control environments.
use ndarray::Array1;
use proxim_core::Act;

/// A single discrete action, an index into the action set.
#[derive(Clone, Debug)]
pub struct DiscreteAct(pub i64);

impl Act for DiscreteAct {
    fn len(&self) -> usize {
        1
    }
}

/// A continuous action vector.
#[derive(Clone, Debug)]
pub struct ContinuousAct(pub Array1<f32>);

impl Act for ContinuousAct {
    fn len(&self) -> usize {
        1
    }
}

#[cfg(feature = "tch")]
mod conv {
    use super::{ContinuousAct, DiscreteAct};
    use ndarray::Array1;
    use proxim_tch_agent::TensorBatch;
    use tch::Tensor;

    impl From<DiscreteAct> for Tensor {
        fn from(act: DiscreteAct) -> Tensor {
            Tensor::from_slice(&[act.0])
        }
    }

    impl From<Tensor> for DiscreteAct {
        fn from(t: Tensor) -> Self {
            let ixs = Vec::<i64>::try_from(t.reshape(&[-1])).expect("action index tensor");
            Self(ixs[0])
        }
    }

    impl From<DiscreteAct> for TensorBatch {
        fn from(act: DiscreteAct) -> TensorBatch {
            TensorBatch::from_tensor(Tensor::from(act))
        }
    }

    impl From<ContinuousAct> for Tensor {
        fn from(act: ContinuousAct) -> Tensor {
            Tensor::from_slice(&act.0.to_vec()).unsqueeze(0)
        }
    }

    impl From<Tensor> for ContinuousAct {
        fn from(t: Tensor) -> Self {
            let v = Vec::<f32>::try_from(t.reshape(&[-1])).expect("action tensor");
            Self(Array1::from(v))
        }
    }

    impl From<ContinuousAct> for TensorBatch {
        fn from(act: ContinuousAct) -> TensorBatch {
            TensorBatch::from_tensor(Tensor::from(act))
        }
    }
}
