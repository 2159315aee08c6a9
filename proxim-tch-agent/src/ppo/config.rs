//! Configuration of PPO agents.
use crate::{model::SubModel, opt::OptimizerConfig, util::OutDim, Device};
use anyhow::Result;
use proxim_core::ActionSpace;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::{
    fmt::Debug,
    fs::File,
    io::{BufReader, Write},
    path::Path,
};
use tch::Tensor;

/// Configuration of [`PolicyModel`](super::PolicyModel).
#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
pub struct PolicyModelConfig<C> {
    /// Configuration of the policy network.
    pub pi_config: Option<C>,

    /// Configuration of the optimizer.
    pub opt_config: OptimizerConfig,
}

impl<C> Default for PolicyModelConfig<C> {
    fn default() -> Self {
        Self {
            pi_config: None,
            opt_config: OptimizerConfig::Adam { lr: 1e-4 },
        }
    }
}

impl<C> PolicyModelConfig<C> {
    /// Sets the configuration of the policy network.
    pub fn pi_config(mut self, v: C) -> Self {
        self.pi_config = Some(v);
        self
    }

    /// Sets the configuration of the optimizer.
    pub fn opt_config(mut self, v: OptimizerConfig) -> Self {
        self.opt_config = v;
        self
    }
}

/// Configuration of [`ValueModel`](super::ValueModel).
#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
pub struct ValueModelConfig<C> {
    /// Configuration of the value network.
    pub vf_config: Option<C>,

    /// Configuration of the optimizer.
    pub opt_config: OptimizerConfig,
}

impl<C> Default for ValueModelConfig<C> {
    fn default() -> Self {
        Self {
            vf_config: None,
            opt_config: OptimizerConfig::Adam { lr: 1e-4 },
        }
    }
}

impl<C> ValueModelConfig<C> {
    /// Sets the configuration of the value network.
    pub fn vf_config(mut self, v: C) -> Self {
        self.vf_config = Some(v);
        self
    }

    /// Sets the configuration of the optimizer.
    pub fn opt_config(mut self, v: OptimizerConfig) -> Self {
        self.opt_config = v;
        self
    }
}

/// Configuration of [`Ppo`](super::Ppo).
#[derive(Debug, Deserialize, Serialize, PartialEq)]
#[serde(bound = "P::Config: DeserializeOwned + Serialize, V::Config: DeserializeOwned + Serialize")]
pub struct PpoConfig<P, V>
where
    P: SubModel<Output = Tensor>,
    V: SubModel<Output = Tensor>,
    P::Config: DeserializeOwned + Serialize + OutDim + Debug + PartialEq + Clone,
    V::Config: DeserializeOwned + Serialize + Debug + PartialEq + Clone,
{
    /// Configuration of the policy model.
    pub pi_config: PolicyModelConfig<P::Config>,

    /// Configuration of the value model.
    pub vf_config: ValueModelConfig<V::Config>,

    /// Action space of the environment.
    pub action_space: Option<ActionSpace>,

    /// Clipping parameter of the surrogate objective.
    pub clip_ratio: f64,

    /// Maximum number of gradient steps on the policy per epoch.
    pub train_pi_iters: usize,

    /// Number of gradient steps on the value function per epoch.
    pub train_v_iters: usize,

    /// Target KL divergence of the policy update. The update loop stops
    /// once the approximate KL exceeds 1.5 times this value.
    pub target_kl: f64,

    /// Whether evaluation-mode action selection takes the mode of the
    /// distribution instead of sampling.
    pub deterministic_eval: bool,

    /// Random seed of tch.
    pub seed: Option<i64>,

    /// Device.
    pub device: Option<Device>,
}

impl<P, V> Clone for PpoConfig<P, V>
where
    P: SubModel<Output = Tensor>,
    V: SubModel<Output = Tensor>,
    P::Config: DeserializeOwned + Serialize + OutDim + Debug + PartialEq + Clone,
    V::Config: DeserializeOwned + Serialize + Debug + PartialEq + Clone,
{
    fn clone(&self) -> Self {
        Self {
            pi_config: self.pi_config.clone(),
            vf_config: self.vf_config.clone(),
            action_space: self.action_space.clone(),
            clip_ratio: self.clip_ratio,
            train_pi_iters: self.train_pi_iters,
            train_v_iters: self.train_v_iters,
            target_kl: self.target_kl,
            deterministic_eval: self.deterministic_eval,
            seed: self.seed,
            device: self.device,
        }
    }
}

impl<P, V> Default for PpoConfig<P, V>
where
    P: SubModel<Output = Tensor>,
    V: SubModel<Output = Tensor>,
    P::Config: DeserializeOwned + Serialize + OutDim + Debug + PartialEq + Clone,
    V::Config: DeserializeOwned + Serialize + Debug + PartialEq + Clone,
{
    fn default() -> Self {
        Self {
            pi_config: PolicyModelConfig::default(),
            vf_config: ValueModelConfig::default(),
            action_space: None,
            clip_ratio: 0.2,
            train_pi_iters: 80,
            train_v_iters: 80,
            target_kl: 0.01,
            deterministic_eval: false,
            seed: None,
            device: None,
        }
    }
}

impl<P, V> PpoConfig<P, V>
where
    P: SubModel<Output = Tensor>,
    V: SubModel<Output = Tensor>,
    P::Config: DeserializeOwned + Serialize + OutDim + Debug + PartialEq + Clone,
    V::Config: DeserializeOwned + Serialize + Debug + PartialEq + Clone,
{
    /// Sets the configuration of the policy model.
    pub fn pi_config(mut self, v: PolicyModelConfig<P::Config>) -> Self {
        self.pi_config = v;
        self
    }

    /// Sets the configuration of the value model.
    pub fn vf_config(mut self, v: ValueModelConfig<V::Config>) -> Self {
        self.vf_config = v;
        self
    }

    /// Sets the action space of the environment.
    pub fn action_space(mut self, v: ActionSpace) -> Self {
        self.action_space = Some(v);
        self
    }

    /// Sets the clipping parameter of the surrogate objective.
    pub fn clip_ratio(mut self, v: f64) -> Self {
        self.clip_ratio = v;
        self
    }

    /// Sets the maximum number of policy gradient steps per epoch.
    pub fn train_pi_iters(mut self, v: usize) -> Self {
        self.train_pi_iters = v;
        self
    }

    /// Sets the number of value gradient steps per epoch.
    pub fn train_v_iters(mut self, v: usize) -> Self {
        self.train_v_iters = v;
        self
    }

    /// Sets the target KL divergence.
    pub fn target_kl(mut self, v: f64) -> Self {
        self.target_kl = v;
        self
    }

    /// Sets whether evaluation-mode action selection takes the mode.
    pub fn deterministic_eval(mut self, v: bool) -> Self {
        self.deterministic_eval = v;
        self
    }

    /// Sets the random seed of tch.
    pub fn seed(mut self, v: i64) -> Self {
        self.seed = Some(v);
        self
    }

    /// Sets the device.
    pub fn device(mut self, v: Device) -> Self {
        self.device = Some(v);
        self
    }

    /// Constructs [`PpoConfig`] from a YAML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path)?;
        let rdr = BufReader::new(file);
        let b = serde_yaml::from_reader(rdr)?;
        Ok(b)
    }

    /// Saves [`PpoConfig`] to a YAML file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let mut file = File::create(path)?;
        file.write_all(serde_yaml::to_string(self)?.as_bytes())?;
        Ok(())
    }
}
