//! This module is used for tests.
//!
//! A deterministic line-world environment and a fixed-statistics agent,
//! small enough that the exact contents of rollouts and records can be
//! asserted on.
use crate::{
    record::Record, Act, ActionSpace, Agent, Env, EpochBatchBase, Info, Obs, Policy,
    RolloutBufferBase, Step, StochasticPolicy,
    rollout_buffer::BatchBase,
};
use anyhow::Result;
use std::path::Path;

#[derive(Clone, Debug)]
/// Dummy observation, the current step count of the episode.
pub struct DummyObs(pub f32);

impl Obs for DummyObs {
    fn len(&self) -> usize {
        1
    }
}

#[derive(Clone, Debug)]
/// Dummy action.
pub struct DummyAct(pub f32);

impl Act for DummyAct {
    fn len(&self) -> usize {
        1
    }
}

/// Dummy observation batch.
#[derive(Clone, Debug)]
pub struct DummyObsBatch(pub Vec<f32>);

impl BatchBase for DummyObsBatch {
    fn new(capacity: usize) -> Self {
        Self(vec![0.0; capacity])
    }

    fn push(&mut self, ix: usize, data: Self) {
        for (i, v) in data.0.iter().enumerate() {
            self.0[ix + i] = *v;
        }
    }

    fn sample(&self, ixs: &Vec<usize>) -> Self {
        Self(ixs.iter().map(|ix| self.0[*ix]).collect())
    }
}

impl From<DummyObs> for DummyObsBatch {
    fn from(obs: DummyObs) -> Self {
        Self(vec![obs.0])
    }
}

/// Dummy action batch.
#[derive(Clone, Debug)]
pub struct DummyActBatch(pub Vec<f32>);

impl BatchBase for DummyActBatch {
    fn new(capacity: usize) -> Self {
        Self(vec![0.0; capacity])
    }

    fn push(&mut self, ix: usize, data: Self) {
        for (i, v) in data.0.iter().enumerate() {
            self.0[ix + i] = *v;
        }
    }

    fn sample(&self, ixs: &Vec<usize>) -> Self {
        Self(ixs.iter().map(|ix| self.0[*ix]).collect())
    }
}

impl From<DummyAct> for DummyActBatch {
    fn from(act: DummyAct) -> Self {
        Self(vec![act.0])
    }
}

#[derive(Clone, Debug)]
/// Dummy info.
pub struct DummyInfo;

impl Info for DummyInfo {}

#[derive(Clone, Debug)]
/// Configuration of [`DummyEnv`].
pub struct DummyEnvConfig {
    /// The episode terminates after this many steps.
    pub episode_len: usize,
}

/// Dummy environment paying a reward of 1.0 per step and terminating
/// after a fixed number of steps.
pub struct DummyEnv {
    count: usize,
    episode_len: usize,
}

impl Env for DummyEnv {
    type Config = DummyEnvConfig;
    type Obs = DummyObs;
    type Act = DummyAct;
    type Info = DummyInfo;

    fn build(config: &Self::Config, _seed: i64) -> Result<Self> {
        Ok(Self {
            count: 0,
            episode_len: config.episode_len,
        })
    }

    fn step(&mut self, act: &Self::Act) -> (Step<Self>, Record) {
        self.count += 1;
        let is_terminated = (self.count == self.episode_len) as i8;
        let step = Step::new(
            DummyObs(self.count as f32),
            act.clone(),
            vec![1.0],
            vec![is_terminated],
            vec![0],
            DummyInfo,
        );
        (step, Record::empty())
    }

    fn reset(&mut self) -> Result<Self::Obs> {
        self.count = 0;
        Ok(DummyObs(0.0))
    }

    fn action_space(&self) -> ActionSpace {
        ActionSpace::Discrete { n: 2 }
    }

    fn observation_shape(&self) -> Vec<i64> {
        vec![1]
    }
}

#[derive(Clone, Debug)]
/// Configuration of [`DummyAgent`].
pub struct DummyAgentConfig {
    /// The state-value estimate the agent reports for every observation.
    pub value: f32,
}

/// Dummy agent reporting fixed statistics and counting optimization steps.
pub struct DummyAgent {
    value: f32,
    train: bool,

    /// The number of optimization steps performed.
    pub n_opts: usize,

    /// The sizes of the epochs taken out of the buffer.
    pub epoch_sizes: Vec<usize>,
}

impl DummyAgent {
    /// Constructs the agent.
    pub fn new(config: DummyAgentConfig) -> Self {
        Self {
            value: config.value,
            train: false,
            n_opts: 0,
            epoch_sizes: vec![],
        }
    }
}

impl Policy<DummyEnv> for DummyAgent {
    fn sample(&mut self, _obs: &DummyObs) -> DummyAct {
        DummyAct(0.0)
    }
}

impl StochasticPolicy<DummyEnv> for DummyAgent {
    fn sample_with_stats(&mut self, obs: &DummyObs) -> (DummyAct, f32, f32) {
        (self.sample(obs), self.value, -0.5)
    }

    fn value(&mut self, _obs: &DummyObs) -> f32 {
        self.value
    }
}

impl<R> Agent<DummyEnv, R> for DummyAgent
where
    R: RolloutBufferBase,
    R::Epoch: EpochBatchBase,
{
    fn train(&mut self) {
        self.train = true;
    }

    fn eval(&mut self) {
        self.train = false;
    }

    fn is_train(&self) -> bool {
        self.train
    }

    fn opt(&mut self, buffer: &mut R) -> Result<Record> {
        let epoch = buffer.take_epoch()?;
        self.n_opts += 1;
        self.epoch_sizes.push(epoch.len());
        Ok(Record::from_scalar("loss", 0.0))
    }

    fn save_params(&self, _path: &Path) -> Result<()> {
        Ok(())
    }

    fn load_params(&mut self, _path: &Path) -> Result<()> {
        Ok(())
    }
}
