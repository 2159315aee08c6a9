use tch::{Kind, Tensor};

/// Categorical distribution over discrete action indices.
///
/// Parameterized by the logits the policy network outputs; has no learned
/// state of its own.
pub struct CategoricalDist {}

#[allow(clippy::new_without_default)]
impl CategoricalDist {
    /// Creates the distribution.
    pub fn new() -> Self {
        Self {}
    }

    /// Draws action indices from `softmax(logits)` and returns them with
    /// their log-probabilities.
    pub fn sample(&self, logits: &Tensor) -> (Tensor, Tensor) {
        let act = logits.softmax(-1, Kind::Float).multinomial(1, true);
        let logp = logits
            .log_softmax(-1, Kind::Float)
            .gather(-1, &act, false)
            .squeeze_dim(-1);
        (act.squeeze_dim(-1), logp)
    }

    /// Log-probability of the action indices in `act`.
    pub fn log_prob(&self, logits: &Tensor, act: &Tensor) -> Tensor {
        let index = act.to_kind(Kind::Int64).unsqueeze(-1);
        logits
            .log_softmax(-1, Kind::Float)
            .gather(-1, &index, false)
            .squeeze_dim(-1)
    }

    /// The mode of the distribution, i.e., the argmax of the logits.
    pub fn mode(&self, logits: &Tensor) -> Tensor {
        logits.argmax(-1, false)
    }
}
