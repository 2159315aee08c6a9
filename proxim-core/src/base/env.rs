//! Environment.
use super::{Act, Info, Obs, Step};
use crate::{record::Record, ActionSpace};
use anyhow::Result;

/// Represents an environment, typically an MDP.
///
/// The environment is constructed outside of the training loop and handed
/// in as a collaborator; the core never wraps or preprocesses observations
/// itself. Preprocessing (normalization, frame stacking) belongs to the
/// environment implementation, which only has to keep the observation
/// shape consistent with what the agent's networks were configured for.
pub trait Env {
    /// Configuration of the environment.
    type Config: Clone;

    /// Observation of the environment.
    type Obs: Obs;

    /// Action of the environment.
    type Act: Act;

    /// Information in the [`Step`] object.
    type Info: Info;

    /// Builds an environment with a given random seed.
    fn build(config: &Self::Config, seed: i64) -> Result<Self>
    where
        Self: Sized;

    /// Performs an environment step.
    fn step(&mut self, act: &Self::Act) -> (Step<Self>, Record)
    where
        Self: Sized;

    /// Resets the environment and returns the initial observation.
    fn reset(&mut self) -> Result<Self::Obs>;

    /// Kind and shape of the action space.
    fn action_space(&self) -> ActionSpace;

    /// Shape of observations.
    fn observation_shape(&self) -> Vec<i64>;
}
