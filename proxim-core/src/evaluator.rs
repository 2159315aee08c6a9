//! Evaluate [`Policy`](crate::Policy).
use crate::{Env, Policy};
use anyhow::Result;
mod default_evaluator;
pub use default_evaluator::DefaultEvaluator;

/// Evaluates the current policy by running episodes outside of training.
///
/// Evaluation must not write into the rollout buffer and must not mutate
/// model parameters; it only observes.
pub trait Evaluator<E: Env, P: Policy<E>> {
    /// Runs evaluation episodes and returns the mean cumulative reward.
    ///
    /// The caller of this method needs to handle the internal state of
    /// `policy`, like training/evaluation mode.
    fn evaluate(&mut self, policy: &mut P) -> Result<f32>;
}
