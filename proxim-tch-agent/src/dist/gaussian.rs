use tch::{nn, nn::Init, Kind, Tensor};

// Guards the likelihood against a numerically collapsed standard deviation.
const EPS: f64 = 1e-8;

/// Diagonal Gaussian distribution over continuous action vectors.
///
/// The mean is the output of the policy network; the log standard
/// deviation is a learned per-dimension parameter, independent of the
/// observation, initialized to -0.5.
pub struct GaussianDist {
    pub(super) log_std: Tensor,
}

impl GaussianDist {
    /// Creates the distribution with its `log_std` parameter under `path`.
    pub fn new(path: &nn::Path, dim: i64) -> Self {
        let log_std = path.var("log_std", &[dim], Init::Const(-0.5));
        Self { log_std }
    }

    /// Samples `mean + noise * exp(log_std)` with standard normal noise,
    /// elementwise, and returns the actions with their log-probabilities.
    pub fn sample(&self, mean: &Tensor) -> (Tensor, Tensor) {
        let std = self.log_std.exp();
        let noise = Tensor::randn(mean.size().as_slice(), (Kind::Float, mean.device()));
        let act = mean + noise * std;
        let logp = self.log_prob(mean, &act);
        (act, logp)
    }

    /// Log-probability of `act`, summed over action dimensions.
    pub fn log_prob(&self, mean: &Tensor, act: &Tensor) -> Tensor {
        let std = self.log_std.exp() + EPS;
        let z = (act - mean) / std;
        let pre_sum: Tensor = z.pow_tensor_scalar(2) * (-0.5)
            - &self.log_std
            - 0.5 * (2.0 * std::f64::consts::PI).ln();
        pre_sum.sum_dim_intlist(Some([-1].as_slice()), false, Kind::Float)
    }

    /// The mode of the distribution, i.e., the mean.
    pub fn mode(&self, mean: &Tensor) -> Tensor {
        mean.shallow_clone()
    }
}
