//! Action distributions.
//!
//! The distribution family is chosen once, at model construction, from the
//! declared action space of the environment; nothing downstream inspects
//! the action-space kind again.
mod categorical;
mod gaussian;

pub use categorical::CategoricalDist;
pub use gaussian::GaussianDist;
use anyhow::Result;
use proxim_core::{error::ProximError, ActionSpace};
use tch::{nn, Tensor};

/// A distribution over actions, parameterized by the raw output of the
/// policy network.
///
/// `x` is the network output for a batch of observations: the mean vector
/// for the Gaussian family, the logits for the categorical family.
pub enum ActionDist {
    /// Diagonal Gaussian over continuous action vectors.
    Gaussian(GaussianDist),

    /// Categorical over discrete action indices.
    Categorical(CategoricalDist),
}

impl ActionDist {
    /// Builds the distribution matching the given action space.
    ///
    /// The learned parameters of the distribution, if any, are created
    /// under `path` and are trained together with the policy network.
    pub fn build(action_space: &ActionSpace, path: &nn::Path) -> Result<Self> {
        match action_space {
            ActionSpace::Continuous { dim, .. } => Ok(Self::Gaussian(GaussianDist::new(path, *dim))),
            ActionSpace::Discrete { .. } => Ok(Self::Categorical(CategoricalDist::new())),
            space => Err(ProximError::UnsupportedActionSpace(format!("{}", space)).into()),
        }
    }

    /// The output width the policy network must have for the given action
    /// space.
    pub fn required_out_dim(action_space: &ActionSpace) -> Result<i64> {
        match action_space {
            ActionSpace::Continuous { dim, .. } => Ok(*dim),
            ActionSpace::Discrete { n } => Ok(*n),
            space => Err(ProximError::UnsupportedActionSpace(format!("{}", space)).into()),
        }
    }

    /// Samples actions and returns them with their log-probabilities.
    pub fn sample(&self, x: &Tensor) -> (Tensor, Tensor) {
        match self {
            Self::Gaussian(d) => d.sample(x),
            Self::Categorical(d) => d.sample(x),
        }
    }

    /// Log-probabilities of the given actions.
    pub fn log_prob(&self, x: &Tensor, act: &Tensor) -> Tensor {
        match self {
            Self::Gaussian(d) => d.log_prob(x, act),
            Self::Categorical(d) => d.log_prob(x, act),
        }
    }

    /// The mode of the distribution.
    pub fn mode(&self, x: &Tensor) -> Tensor {
        match self {
            Self::Gaussian(d) => d.mode(x),
            Self::Categorical(d) => d.mode(x),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tch::{nn, Device, Kind};

    #[test]
    fn gaussian_logp_with_zero_log_std_is_the_standard_normal_density() {
        let vs = nn::VarStore::new(Device::Cpu);
        let dist = GaussianDist::new(&vs.root(), 1);
        tch::no_grad(|| {
            let mut log_std = dist.log_std.shallow_clone();
            let _ = log_std.fill_(0.0);
        });

        let mean = Tensor::from_slice(&[0.3f32]).unsqueeze(0);
        let act = Tensor::from_slice(&[1.0f32]).unsqueeze(0);
        let logp = f64::from(&dist.log_prob(&mean, &act));

        let expected =
            -0.5 * (1.0f64 - 0.3).powi(2) - 0.5 * (2.0 * std::f64::consts::PI).ln();
        assert!((logp - expected).abs() < 1e-5, "{} != {}", logp, expected);
    }

    #[test]
    fn gaussian_log_std_starts_at_minus_half() {
        let vs = nn::VarStore::new(Device::Cpu);
        let dist = GaussianDist::new(&vs.root(), 3);
        let log_std: Vec<f32> = Vec::<f32>::try_from(&dist.log_std).unwrap();
        assert_eq!(log_std, vec![-0.5, -0.5, -0.5]);
    }

    #[test]
    fn gaussian_samples_have_the_action_shape() {
        let vs = nn::VarStore::new(Device::Cpu);
        let dist = GaussianDist::new(&vs.root(), 2);
        let mean = Tensor::zeros(&[5, 2], tch::kind::FLOAT_CPU);
        let (act, logp) = dist.sample(&mean);
        assert_eq!(act.size(), vec![5, 2]);
        assert_eq!(logp.size(), vec![5]);
    }

    #[test]
    fn categorical_logp_is_the_log_softmax_at_the_action() {
        let logits = [0.5f32, 1.5, -1.0];
        let x = Tensor::from_slice(&logits).unsqueeze(0);
        let dist = CategoricalDist::new();

        let log_z = logits.iter().map(|l| (*l as f64).exp()).sum::<f64>().ln();
        for a in 0..3i64 {
            let act = Tensor::from_slice(&[a]);
            let logp = f64::from(&dist.log_prob(&x, &act));
            let expected = logits[a as usize] as f64 - log_z;
            assert!((logp - expected).abs() < 1e-6, "{} != {}", logp, expected);
        }
    }

    #[test]
    fn categorical_sample_reports_its_own_logp() {
        let logits = [0.5f32, 1.5, -1.0];
        let x = Tensor::from_slice(&logits).unsqueeze(0);
        let dist = CategoricalDist::new();

        let (act, logp) = dist.sample(&x);
        let expected = f64::from(&dist.log_prob(&x, &act));
        assert!((f64::from(&logp) - expected).abs() < 1e-6);
    }

    #[test]
    fn categorical_mode_is_the_argmax() {
        let x = Tensor::from_slice(&[0.5f32, 1.5, -1.0]).unsqueeze(0);
        let dist = CategoricalDist::new();
        assert_eq!(i64::from(&dist.mode(&x)), 1);
    }

    #[test]
    fn multi_discrete_action_spaces_are_rejected() {
        let vs = nn::VarStore::new(Device::Cpu);
        let space = ActionSpace::MultiDiscrete { nvec: vec![2, 3] };
        let err = ActionDist::build(&space, &vs.root()).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ProximError>(),
            Some(ProximError::UnsupportedActionSpace(_))
        ));
    }

    #[test]
    fn log_probs_keep_the_float_kind() {
        let vs = nn::VarStore::new(Device::Cpu);
        let dist = GaussianDist::new(&vs.root(), 2);
        let mean = Tensor::zeros(&[3, 2], tch::kind::FLOAT_CPU);
        let act = Tensor::zeros(&[3, 2], tch::kind::FLOAT_CPU);
        assert_eq!(dist.log_prob(&mean, &act).kind(), Kind::Float);
    }
}
