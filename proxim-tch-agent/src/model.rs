//! Interfaces of the neural network models owned by the agent.
use anyhow::Result;
use std::path::Path;
use tch::{nn, nn::VarStore};

/// Common interface of trainable models.
pub trait ModelBase {
    /// Performs a backward pass and a parameter update for the given loss.
    fn backward_step(&mut self, loss: &tch::Tensor);

    /// The variable store holding the parameters.
    fn var_store(&self) -> &nn::VarStore;

    /// Writes the parameters to a file.
    fn save<T: AsRef<Path>>(&self, path: T) -> Result<()>;

    /// Reads the parameters from a file.
    fn load<T: AsRef<Path>>(&mut self, path: T) -> Result<()>;
}

/// A network module constructed from a [`VarStore`] and a configuration.
///
/// Structs implementing this trait are injected into the policy and value
/// models as function approximators; the choice of architecture (dense,
/// convolutional) is made by the caller and is invisible to the rest of
/// the algorithm.
///
/// [`VarStore`]: https://docs.rs/tch/0.16.0/tch/nn/struct.VarStore.html
pub trait SubModel {
    /// Configuration of the module.
    type Config;

    /// Input of the module, typically a batch of observations.
    type Input;

    /// Output of the module, typically a batch of output vectors.
    type Output;

    /// Creates the module, registering its variables under `var_store`.
    fn build(var_store: &VarStore, config: Self::Config) -> Self;

    /// Applies the module to a batch of inputs.
    fn forward(&self, input: &Self::Input) -> Self::Output;
}
