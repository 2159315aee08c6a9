//! Policy model of the PPO agent.
use super::PolicyModelConfig;
use crate::{
    dist::ActionDist,
    model::{ModelBase, SubModel},
    opt::Optimizer,
    util::OutDim,
};
use anyhow::{ensure, Context, Result};
use log::info;
use proxim_core::ActionSpace;
use serde::{de::DeserializeOwned, Serialize};
use std::path::Path;
use tch::{nn, Device, Tensor};

/// The stochastic policy of the PPO agent.
///
/// Wraps an injected function approximator producing the raw distribution
/// parameters and the action distribution built once from the action
/// space. The distribution's learned parameters, if any, live in the same
/// [`VarStore`](nn::VarStore) as the network and are trained by the same
/// optimizer.
pub struct PolicyModel<P>
where
    P: SubModel<Output = Tensor>,
    P::Config: DeserializeOwned + Serialize + OutDim,
{
    var_store: nn::VarStore,
    out_dim: i64,
    pi: P,
    dist: ActionDist,
    opt: Optimizer,
}

impl<P> PolicyModel<P>
where
    P: SubModel<Output = Tensor>,
    P::Config: DeserializeOwned + Serialize + OutDim,
{
    /// Constructs [`PolicyModel`].
    pub fn build(
        config: PolicyModelConfig<P::Config>,
        action_space: &ActionSpace,
        device: Device,
    ) -> Result<Self> {
        let pi_config = config.pi_config.context("pi_config is not set.")?;
        let out_dim = pi_config.get_out_dim();
        ensure!(
            out_dim == ActionDist::required_out_dim(action_space)?,
            "Output width {} of the policy network does not match the action space {}",
            out_dim,
            action_space
        );

        let var_store = nn::VarStore::new(device);
        let pi = P::build(&var_store, pi_config);
        let dist = ActionDist::build(action_space, &var_store.root())?;
        let opt = config.opt_config.build(&var_store)?;

        Ok(Self {
            var_store,
            out_dim,
            pi,
            dist,
            opt,
        })
    }

    /// Outputs the raw distribution parameters for a batch of observations.
    pub fn forward(&self, x: &P::Input) -> Tensor {
        let out = self.pi.forward(x);
        debug_assert_eq!(*out.size().last().unwrap(), self.out_dim);
        out
    }

    /// Samples actions and returns them with their log-probabilities.
    pub fn sample(&self, x: &P::Input) -> (Tensor, Tensor) {
        self.dist.sample(&self.forward(x))
    }

    /// The mode of the action distribution.
    pub fn mode(&self, x: &P::Input) -> Tensor {
        self.dist.mode(&self.forward(x))
    }

    /// Log-probabilities of the given actions.
    pub fn logp(&self, x: &P::Input, act: &Tensor) -> Tensor {
        self.dist.log_prob(&self.forward(x), act)
    }
}

impl<P> ModelBase for PolicyModel<P>
where
    P: SubModel<Output = Tensor>,
    P::Config: DeserializeOwned + Serialize + OutDim,
{
    fn backward_step(&mut self, loss: &Tensor) {
        self.opt.backward_step(loss);
    }

    fn var_store(&self) -> &nn::VarStore {
        &self.var_store
    }

    fn save<T: AsRef<Path>>(&self, path: T) -> Result<()> {
        self.var_store.save(&path)?;
        info!("Saved the policy model in {:?}", path.as_ref());
        Ok(())
    }

    fn load<T: AsRef<Path>>(&mut self, path: T) -> Result<()> {
        self.var_store.load(&path)?;
        info!("Loaded the policy model from {:?}", path.as_ref());
        Ok(())
    }
}
