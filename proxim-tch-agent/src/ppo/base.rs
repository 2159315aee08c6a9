//! PPO agent implemented with tch-rs.
use super::{PolicyModel, PpoConfig, ValueModel};
use crate::{
    model::{ModelBase, SubModel},
    util::OutDim,
};
use anyhow::{Context, Result};
use log::trace;
use proxim_core::{
    error::ProximError,
    record::{Record, RecordValue},
    Agent, Env, EpochBatchBase, Policy, RolloutBufferBase, StochasticPolicy,
};
use serde::{de::DeserializeOwned, Serialize};
use std::{fmt::Debug, fs, marker::PhantomData, path::Path};
use tch::{no_grad, Kind, Tensor};

/// Clipped surrogate policy loss and the approximate KL divergence
/// `mean(logp_old - logp)`.
fn pi_loss_and_kl(logp: &Tensor, logp_old: &Tensor, adv: &Tensor, clip_ratio: f64) -> (Tensor, f32) {
    let ratio = (logp - logp_old).exp();
    let clipped = ratio.clamp(1.0 - clip_ratio, 1.0 + clip_ratio) * adv;
    let loss = (ratio * adv).minimum(&clipped).mean(Kind::Float).neg();
    let kl = f32::from(&(logp_old - logp).mean(Kind::Float));
    (loss, kl)
}

/// PPO agent implemented with tch-rs.
///
/// The policy and the value function are independent models, each with an
/// injected function approximator and its own optimizer. One optimization
/// step consumes a full epoch from the rollout buffer and performs up to
/// `train_pi_iters` clipped-surrogate updates on the policy, stopped early
/// once the approximate KL divergence exceeds `1.5 * target_kl`, followed
/// by exactly `train_v_iters` mean-squared-error updates on the value
/// function.
pub struct Ppo<E, P, V, R>
where
    E: Env,
    P: SubModel<Input = Tensor, Output = Tensor>,
    V: SubModel<Input = Tensor, Output = Tensor>,
    R: RolloutBufferBase,
    E::Obs: Into<Tensor>,
    E::Act: Into<Tensor> + From<Tensor>,
    P::Config: DeserializeOwned + Serialize + OutDim + Debug + PartialEq + Clone,
    V::Config: DeserializeOwned + Serialize + Debug + PartialEq + Clone,
    R::Epoch: EpochBatchBase,
    <R::Epoch as EpochBatchBase>::ObsBatch: Into<Tensor>,
    <R::Epoch as EpochBatchBase>::ActBatch: Into<Tensor>,
{
    pub(super) pi: PolicyModel<P>,
    pub(super) vf: ValueModel<V>,
    pub(super) clip_ratio: f64,
    pub(super) train_pi_iters: usize,
    pub(super) train_v_iters: usize,
    pub(super) target_kl: f64,
    pub(super) deterministic_eval: bool,
    pub(super) train: bool,
    pub(super) n_opts: usize,
    pub(super) device: tch::Device,
    pub(super) phantom: PhantomData<(E, R)>,
}

impl<E, P, V, R> Ppo<E, P, V, R>
where
    E: Env,
    P: SubModel<Input = Tensor, Output = Tensor>,
    V: SubModel<Input = Tensor, Output = Tensor>,
    R: RolloutBufferBase,
    E::Obs: Into<Tensor>,
    E::Act: Into<Tensor> + From<Tensor>,
    P::Config: DeserializeOwned + Serialize + OutDim + Debug + PartialEq + Clone,
    V::Config: DeserializeOwned + Serialize + Debug + PartialEq + Clone,
    R::Epoch: EpochBatchBase,
    <R::Epoch as EpochBatchBase>::ObsBatch: Into<Tensor>,
    <R::Epoch as EpochBatchBase>::ActBatch: Into<Tensor>,
{
    /// Constructs the PPO agent.
    ///
    /// Fails if the action space is not supported by any of the action
    /// distributions, or if the model configurations are incomplete.
    pub fn build(config: PpoConfig<P, V>) -> Result<Self> {
        let device: tch::Device = config
            .device
            .context("No device is given for the PPO agent")?
            .into();
        let action_space = config.action_space.context("action_space is not set.")?;
        let pi = PolicyModel::build(config.pi_config, &action_space, device)?;
        let vf = ValueModel::build(config.vf_config, device)?;

        if let Some(seed) = config.seed {
            tch::manual_seed(seed);
        }

        Ok(Ppo {
            pi,
            vf,
            clip_ratio: config.clip_ratio,
            train_pi_iters: config.train_pi_iters,
            train_v_iters: config.train_v_iters,
            target_kl: config.target_kl,
            deterministic_eval: config.deterministic_eval,
            train: false,
            n_opts: 0,
            device,
            phantom: PhantomData,
        })
    }

    /// Policy phase of the update: up to `train_pi_iters` gradient steps,
    /// stopped early on a too large approximate KL divergence.
    fn update_pi(&mut self, obs: &Tensor, act: &Tensor, adv: &Tensor, logp_old: &Tensor)
        -> Result<(f32, f32, usize)> {
        let mut loss_pi_start = 0f32;
        let mut kl = 0f32;
        let mut stop_iter = self.train_pi_iters;

        for i in 0..self.train_pi_iters {
            let logp = self.pi.logp(obs, act);
            let (loss_pi, kl_i) = pi_loss_and_kl(&logp, logp_old, adv, self.clip_ratio);
            let loss = f32::from(&loss_pi);
            if !loss.is_finite() || !kl_i.is_finite() {
                return Err(ProximError::NumericInstability("policy loss".into()).into());
            }

            self.pi.backward_step(&loss_pi);
            if i == 0 {
                loss_pi_start = loss;
            }
            kl = kl_i;

            if kl_i as f64 > 1.5 * self.target_kl {
                trace!("Policy update stopped after {} iterations, kl = {}", i + 1, kl_i);
                stop_iter = i + 1;
                break;
            }
        }

        Ok((loss_pi_start, kl, stop_iter))
    }

    /// Value phase of the update: exactly `train_v_iters` gradient steps.
    fn update_vf(&mut self, obs: &Tensor, ret: &Tensor) -> Result<f32> {
        let mut loss_v_total = 0f32;

        for _ in 0..self.train_v_iters {
            let loss_v = self.vf.forward(obs).mse_loss(ret, tch::Reduction::Mean);
            let loss = f32::from(&loss_v);
            if !loss.is_finite() {
                return Err(ProximError::NumericInstability("value loss".into()).into());
            }
            self.vf.backward_step(&loss_v);
            loss_v_total += loss;
        }

        Ok(loss_v_total / self.train_v_iters as f32)
    }

    fn opt_(&mut self, buffer: &mut R) -> Result<Record> {
        let (obs, act, adv, ret, logp_old) = buffer.take_epoch()?.unpack();
        let obs: Tensor = obs.into().to(self.device);
        let act: Tensor = act.into().to(self.device);
        let adv = Tensor::from_slice(&adv).to(self.device);
        let ret = Tensor::from_slice(&ret).to(self.device);
        let logp_old = Tensor::from_slice(&logp_old).to(self.device);

        let (loss_pi, kl, stop_iter) = self.update_pi(&obs, &act, &adv, &logp_old)?;
        let loss_v = self.update_vf(&obs, &ret)?;
        self.n_opts += 1;

        Ok(Record::from_slice(&[
            ("n_opts", RecordValue::Scalar(self.n_opts as f32)),
            ("loss_pi", RecordValue::Scalar(loss_pi)),
            ("loss_v", RecordValue::Scalar(loss_v)),
            ("kl", RecordValue::Scalar(kl)),
            ("stop_iter", RecordValue::Scalar(stop_iter as f32)),
        ]))
    }
}

impl<E, P, V, R> Policy<E> for Ppo<E, P, V, R>
where
    E: Env,
    P: SubModel<Input = Tensor, Output = Tensor>,
    V: SubModel<Input = Tensor, Output = Tensor>,
    R: RolloutBufferBase,
    E::Obs: Into<Tensor>,
    E::Act: Into<Tensor> + From<Tensor>,
    P::Config: DeserializeOwned + Serialize + OutDim + Debug + PartialEq + Clone,
    V::Config: DeserializeOwned + Serialize + Debug + PartialEq + Clone,
    R::Epoch: EpochBatchBase,
    <R::Epoch as EpochBatchBase>::ObsBatch: Into<Tensor>,
    <R::Epoch as EpochBatchBase>::ActBatch: Into<Tensor>,
{
    fn sample(&mut self, obs: &E::Obs) -> E::Act {
        no_grad(|| {
            let obs = obs.clone().into().to(self.device);
            let act = if self.train || !self.deterministic_eval {
                self.pi.sample(&obs).0
            } else {
                self.pi.mode(&obs)
            };
            act.into()
        })
    }
}

impl<E, P, V, R> StochasticPolicy<E> for Ppo<E, P, V, R>
where
    E: Env,
    P: SubModel<Input = Tensor, Output = Tensor>,
    V: SubModel<Input = Tensor, Output = Tensor>,
    R: RolloutBufferBase,
    E::Obs: Into<Tensor>,
    E::Act: Into<Tensor> + From<Tensor>,
    P::Config: DeserializeOwned + Serialize + OutDim + Debug + PartialEq + Clone,
    V::Config: DeserializeOwned + Serialize + Debug + PartialEq + Clone,
    R::Epoch: EpochBatchBase,
    <R::Epoch as EpochBatchBase>::ObsBatch: Into<Tensor>,
    <R::Epoch as EpochBatchBase>::ActBatch: Into<Tensor>,
{
    fn sample_with_stats(&mut self, obs: &E::Obs) -> (E::Act, f32, f32) {
        no_grad(|| {
            let obs = obs.clone().into().to(self.device);
            let (act, logp) = self.pi.sample(&obs);
            let value = f32::from(&self.vf.forward(&obs));
            let logp = f32::from(&logp);
            (act.into(), value, logp)
        })
    }

    fn value(&mut self, obs: &E::Obs) -> f32 {
        no_grad(|| {
            let obs = obs.clone().into().to(self.device);
            f32::from(&self.vf.forward(&obs))
        })
    }
}

impl<E, P, V, R> Agent<E, R> for Ppo<E, P, V, R>
where
    E: Env,
    P: SubModel<Input = Tensor, Output = Tensor>,
    V: SubModel<Input = Tensor, Output = Tensor>,
    R: RolloutBufferBase,
    E::Obs: Into<Tensor>,
    E::Act: Into<Tensor> + From<Tensor>,
    P::Config: DeserializeOwned + Serialize + OutDim + Debug + PartialEq + Clone,
    V::Config: DeserializeOwned + Serialize + Debug + PartialEq + Clone,
    R::Epoch: EpochBatchBase,
    <R::Epoch as EpochBatchBase>::ObsBatch: Into<Tensor>,
    <R::Epoch as EpochBatchBase>::ActBatch: Into<Tensor>,
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
        self.opt_(buffer)
    }

    fn save_params(&self, path: &Path) -> Result<()> {
        fs::create_dir_all(path)?;
        self.pi.save(path.join("pi.pt.tch").as_path())?;
        self.vf.save(path.join("vf.pt.tch").as_path())?;
        Ok(())
    }

    fn load_params(&mut self, path: &Path) -> Result<()> {
        self.pi.load(path.join("pi.pt.tch").as_path())?;
        self.vf.load(path.join("vf.pt.tch").as_path())?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        mlp::{Mlp, MlpConfig},
        ppo::{PolicyModelConfig, ValueModelConfig},
        Activation, Device, TensorBatch,
    };
    use proxim_core::{
        rollout_buffer::{RolloutBuffer, RolloutBufferConfig, Transition},
        ActionSpace, ExperienceBufferBase,
    };
    use tempdir::TempDir;

    #[derive(Clone, Debug)]
    struct TestObs(Vec<f32>);

    impl proxim_core::Obs for TestObs {
        fn len(&self) -> usize {
            1
        }
    }

    impl From<TestObs> for Tensor {
        fn from(obs: TestObs) -> Tensor {
            Tensor::from_slice(&obs.0).unsqueeze(0)
        }
    }

    #[derive(Clone, Debug)]
    struct TestAct(Vec<f32>);

    impl proxim_core::Act for TestAct {
        fn len(&self) -> usize {
            1
        }
    }

    impl From<TestAct> for Tensor {
        fn from(act: TestAct) -> Tensor {
            Tensor::from_slice(&act.0).unsqueeze(0)
        }
    }

    impl From<Tensor> for TestAct {
        fn from(t: Tensor) -> Self {
            Self(Vec::<f32>::try_from(t.reshape(&[-1])).unwrap())
        }
    }

    struct TestEnv;

    impl Env for TestEnv {
        type Config = ();
        type Obs = TestObs;
        type Act = TestAct;
        type Info = ();

        fn build(_config: &Self::Config, _seed: i64) -> Result<Self> {
            Ok(Self)
        }

        fn step(&mut self, _act: &Self::Act) -> (proxim_core::Step<Self>, Record) {
            unimplemented!();
        }

        fn reset(&mut self) -> Result<Self::Obs> {
            unimplemented!();
        }

        fn action_space(&self) -> ActionSpace {
            ActionSpace::Continuous {
                dim: 1,
                low: -1.0,
                high: 1.0,
            }
        }

        fn observation_shape(&self) -> Vec<i64> {
            vec![3]
        }
    }

    type Buffer = RolloutBuffer<TensorBatch, TensorBatch>;
    type TestPpo = Ppo<TestEnv, Mlp, Mlp, Buffer>;

    fn build_agent(train_pi_iters: usize, target_kl: f64) -> Result<TestPpo> {
        let config = PpoConfig::<Mlp, Mlp>::default()
            .pi_config(
                PolicyModelConfig::default()
                    .pi_config(MlpConfig::new(3, vec![8], 1, Activation::Tanh)),
            )
            .vf_config(
                ValueModelConfig::default()
                    .vf_config(MlpConfig::new(3, vec![8], 1, Activation::Tanh)),
            )
            .action_space(ActionSpace::Continuous {
                dim: 1,
                low: -1.0,
                high: 1.0,
            })
            .train_pi_iters(train_pi_iters)
            .train_v_iters(3)
            .target_kl(target_kl)
            .seed(42)
            .device(Device::Cpu);
        Ppo::build(config)
    }

    fn filled_buffer(capacity: usize) -> Result<Buffer> {
        let mut buffer = Buffer::build(&RolloutBufferConfig::default().capacity(capacity));
        for i in 0..capacity {
            buffer.push(Transition {
                obs: TensorBatch::from_tensor(Tensor::from_slice(&[
                    i as f32,
                    0.5,
                    -0.5,
                ])
                .unsqueeze(0)),
                act: TensorBatch::from_tensor(Tensor::from_slice(&[0.1f32]).unsqueeze(0)),
                reward: 1.0,
                value: 0.5,
                logp: -0.5,
            })?;
        }
        buffer.finish_path(0.0);
        Ok(buffer)
    }

    #[test]
    fn positive_advantages_use_the_upper_clip_branch() {
        // ratio = 1 + clip_ratio + 0.1
        let clip_ratio = 0.2;
        let logp_old = Tensor::from_slice(&[0.0f32]);
        let logp = Tensor::from_slice(&[(1.3f32).ln()]);
        let adv = Tensor::from_slice(&[1.0f32]);

        let (loss, _) = pi_loss_and_kl(&logp, &logp_old, &adv, clip_ratio);
        assert!((f32::from(&loss) - (-1.2)).abs() < 1e-6);
    }

    #[test]
    fn negative_advantages_use_the_lower_clip_branch() {
        // ratio = 1 - clip_ratio - 0.1
        let clip_ratio = 0.2;
        let logp_old = Tensor::from_slice(&[0.0f32]);
        let logp = Tensor::from_slice(&[(0.7f32).ln()]);
        let adv = Tensor::from_slice(&[-1.0f32]);

        let (loss, _) = pi_loss_and_kl(&logp, &logp_old, &adv, clip_ratio);
        assert!((f32::from(&loss) - 0.8).abs() < 1e-6);
    }

    #[test]
    fn approx_kl_is_the_mean_logp_difference() {
        let logp_old = Tensor::from_slice(&[0.0f32, 0.2]);
        let logp = Tensor::from_slice(&[-0.1f32, 0.1]);
        let adv = Tensor::from_slice(&[1.0f32, 1.0]);

        let (_, kl) = pi_loss_and_kl(&logp, &logp_old, &adv, 0.2);
        assert!((kl - 0.1).abs() < 1e-6);
    }

    #[test]
    fn policy_updates_stop_early_on_a_large_kl() -> Result<()> {
        // 1.5 * target_kl is negative, so any finite KL triggers the stop
        // right after the first iteration.
        let mut agent = build_agent(5, -1.0)?;
        let mut buffer = filled_buffer(8)?;
        let record = agent.opt(&mut buffer)?;
        assert_eq!(record.get_scalar("stop_iter")?, 1.0);

        // The value phase is unaffected by the early stop.
        assert!(record.get_scalar("loss_v").is_ok());
        Ok(())
    }

    #[test]
    fn policy_updates_run_to_completion_under_the_kl_target() -> Result<()> {
        let mut agent = build_agent(5, 1e8)?;
        let mut buffer = filled_buffer(8)?;
        let record = agent.opt(&mut buffer)?;
        assert_eq!(record.get_scalar("stop_iter")?, 5.0);
        assert!(record.get_scalar("loss_v").is_ok());
        Ok(())
    }

    #[test]
    fn unsupported_action_spaces_fail_at_construction() {
        let config = PpoConfig::<Mlp, Mlp>::default()
            .pi_config(
                PolicyModelConfig::default()
                    .pi_config(MlpConfig::new(3, vec![8], 2, Activation::Tanh)),
            )
            .vf_config(
                ValueModelConfig::default()
                    .vf_config(MlpConfig::new(3, vec![8], 1, Activation::Tanh)),
            )
            .action_space(ActionSpace::MultiDiscrete { nvec: vec![2, 3] })
            .device(Device::Cpu);
        assert!(Ppo::<TestEnv, Mlp, Mlp, Buffer>::build(config).is_err());
    }

    #[test]
    fn save_and_load_round_trip() -> Result<()> {
        let agent = build_agent(5, 0.01)?;
        let dir = TempDir::new("ppo_params")?;
        agent.save_params(dir.path())?;

        let mut agent_ = build_agent(5, 0.01)?;
        agent_.load_params(dir.path())?;
        Ok(())
    }
}
