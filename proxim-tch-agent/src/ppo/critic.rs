//! Value model of the PPO agent.
use super::ValueModelConfig;
use crate::{
    model::{ModelBase, SubModel},
    opt::Optimizer,
};
use anyhow::{Context, Result};
use log::info;
use serde::{de::DeserializeOwned, Serialize};
use std::path::Path;
use tch::{nn, Device, Tensor};

/// The state-value function of the PPO agent.
///
/// Wraps an injected function approximator with an output width of one.
pub struct ValueModel<V>
where
    V: SubModel<Output = Tensor>,
    V::Config: DeserializeOwned + Serialize,
{
    var_store: nn::VarStore,
    vf: V,
    opt: Optimizer,
}

impl<V> ValueModel<V>
where
    V: SubModel<Output = Tensor>,
    V::Config: DeserializeOwned + Serialize,
{
    /// Constructs [`ValueModel`].
    pub fn build(config: ValueModelConfig<V::Config>, device: Device) -> Result<Self> {
        let vf_config = config.vf_config.context("vf_config is not set.")?;
        let var_store = nn::VarStore::new(device);
        let vf = V::build(&var_store, vf_config);
        let opt = config.opt_config.build(&var_store)?;

        Ok(Self {
            var_store,
            vf,
            opt,
        })
    }

    /// Value estimates for a batch of observations, one scalar per row.
    pub fn forward(&self, x: &V::Input) -> Tensor {
        self.vf.forward(x).squeeze_dim(-1)
    }
}

impl<V> ModelBase for ValueModel<V>
where
    V: SubModel<Output = Tensor>,
    V::Config: DeserializeOwned + Serialize,
{
    fn backward_step(&mut self, loss: &Tensor) {
        self.opt.backward_step(loss);
    }

    fn var_store(&self) -> &nn::VarStore {
        &self.var_store
    }

    fn save<T: AsRef<Path>>(&self, path: T) -> Result<()> {
        self.var_store.save(&path)?;
        info!("Saved the value model in {:?}", path.as_ref());
        Ok(())
    }

    fn load<T: AsRef<Path>>(&mut self, path: T) -> Result<()> {
        self.var_store.load(&path)?;
        info!("Loaded the value model from {:?}", path.as_ref());
        Ok(())
    }
}
