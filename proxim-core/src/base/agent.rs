//! Agent.
use super::{Env, Policy};
use crate::{record::Record, RolloutBufferBase};
use anyhow::Result;
use std::path::Path;

/// A trainable policy on an environment.
pub trait Agent<E: Env, R: RolloutBufferBase>: Policy<E> {
    /// Switches the policy to training mode.
    fn train(&mut self);

    /// Switches the policy to evaluation mode.
    fn eval(&mut self);

    /// Whether the policy is in training mode.
    fn is_train(&self) -> bool;

    /// Performs an optimization step over a collected epoch.
    ///
    /// `buffer` is the rollout buffer from which the epoch of transitions
    /// is taken. It must be full when this method is called.
    fn opt(&mut self, buffer: &mut R) -> Result<Record>;

    /// Save the parameters of the agent in the given directory.
    ///
    /// This method commonly creates a number of files consisting the agent
    /// in the directory, e.g., the policy and value networks.
    fn save_params(&self, path: &Path) -> Result<()>;

    /// Load the parameters of the agent from the given directory.
    fn load_params(&mut self, path: &Path) -> Result<()>;
}
