//! Policy.
use super::Env;

/// A policy on an environment.
///
/// Policy is a mapping from an observation to an action.
/// The mapping can be either of deterministic or stochastic.
pub trait Policy<E: Env> {
    /// Sample an action given an observation.
    fn sample(&mut self, obs: &E::Obs) -> E::Act;
}

/// A stochastic policy that exposes the quantities an on-policy gradient
/// estimator needs at sampling time.
pub trait StochasticPolicy<E: Env>: Policy<E> {
    /// Samples an action and returns it together with the state-value
    /// estimate and the log-probability of the sampled action under the
    /// current policy.
    fn sample_with_stats(&mut self, obs: &E::Obs) -> (E::Act, f32, f32);

    /// State-value estimate for an observation.
    fn value(&mut self, obs: &E::Obs) -> f32;
}
