use anyhow::Result;
use clap::Parser;
use log::info;
use proxim_classic_env::{PendulumEnv, PendulumEnvConfig};
use proxim_core::{
    rollout_buffer::{
        RolloutBuffer, RolloutBufferConfig, SimpleStepProcessor, SimpleStepProcessorConfig,
    },
    ActionSpace, Agent as _, DefaultEvaluator, Env as _, Evaluator as _, Trainer, TrainerConfig,
};
use proxim_tch_agent::{
    mlp::{Mlp, MlpConfig},
    opt::OptimizerConfig,
    ppo::{PolicyModelConfig, Ppo, PpoConfig, ValueModelConfig},
    Activation, Device, TensorBatch,
};
use proxim_tensorboard::TensorboardRecorder;
use std::path::Path;

type Env = PendulumEnv;
type Buffer = RolloutBuffer<TensorBatch, TensorBatch>;
type StepProc = SimpleStepProcessor<Env, TensorBatch, TensorBatch>;
type Evaluator = DefaultEvaluator<Env>;
type Agent = Ppo<Env, Mlp, Mlp, Buffer>;

const DIM_OBS: i64 = 3;
const DIM_ACT: i64 = 1;
const MAX_TORQUE: f32 = 2.0;
const LR_PI: f64 = 1e-4;
const LR_VF: f64 = 1e-4;
const STEPS_PER_EPOCH: usize = 1000;
const EPOCHS: usize = 100;
const GAMMA: f32 = 0.99;
const LAM: f32 = 0.97;
const CLIP_RATIO: f64 = 0.2;
const TRAIN_PI_ITERS: usize = 80;
const TRAIN_V_ITERS: usize = 80;
const TARGET_KL: f64 = 0.01;
const MAX_EP_LEN: usize = 200;
const SAVE_INTERVAL: usize = 10;
const N_EPISODES_PER_EVAL: usize = 1;
const MODEL_DIR: &str = "./model/ppo_pendulum";

/// Train/eval a PPO agent in the pendulum environment
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// Train the PPO agent, not evaluate
    #[arg(short, long, default_value_t = false)]
    train: bool,

    /// Evaluate the PPO agent, not train
    #[arg(short, long, default_value_t = false)]
    eval: bool,
}

fn create_agent_config() -> PpoConfig<Mlp, Mlp> {
    let device = Device::from(tch::Device::cuda_if_available());
    let pi_config = PolicyModelConfig::default()
        .pi_config(MlpConfig::new(
            DIM_OBS,
            vec![100, 100, 100],
            DIM_ACT,
            Activation::Tanh,
        ))
        .opt_config(OptimizerConfig::Adam { lr: LR_PI });
    let vf_config = ValueModelConfig::default()
        .vf_config(MlpConfig::new(
            DIM_OBS,
            vec![100, 100, 100],
            1,
            Activation::Tanh,
        ))
        .opt_config(OptimizerConfig::Adam { lr: LR_VF });

    PpoConfig::default()
        .pi_config(pi_config)
        .vf_config(vf_config)
        .action_space(ActionSpace::Continuous {
            dim: DIM_ACT,
            low: -MAX_TORQUE,
            high: MAX_TORQUE,
        })
        .clip_ratio(CLIP_RATIO)
        .train_pi_iters(TRAIN_PI_ITERS)
        .train_v_iters(TRAIN_V_ITERS)
        .target_kl(TARGET_KL)
        .seed(42)
        .device(device)
}

fn train(epochs: usize, steps_per_epoch: usize, model_dir: &str) -> Result<()> {
    let env_config = PendulumEnvConfig::default();
    let trainer_config = TrainerConfig::default()
        .epochs(epochs)
        .max_ep_len(MAX_EP_LEN)
        .save_interval(SAVE_INTERVAL)
        .model_dir(model_dir);
    let buffer_config = RolloutBufferConfig::default()
        .capacity(steps_per_epoch)
        .gamma(GAMMA)
        .lam(LAM);

    let mut trainer: Trainer<Env, StepProc, Buffer> =
        Trainer::build(trainer_config, SimpleStepProcessorConfig {}, buffer_config);
    let env = Env::build(&env_config, 0)?;
    let mut agent = Agent::build(create_agent_config())?;
    let mut recorder = TensorboardRecorder::new(model_dir);
    let mut evaluator = Evaluator::new(&env_config, 1, N_EPISODES_PER_EVAL)?;

    trainer.train(env, &mut agent, &mut recorder, &mut evaluator)?;

    Ok(())
}

fn eval(model_dir: &str, render: bool) -> Result<()> {
    let env_config = PendulumEnvConfig::default().render(render);
    let mut agent = Agent::build(create_agent_config())?;
    agent.load_params(Path::new(model_dir).join("best").as_path())?;
    agent.eval();

    let reward = Evaluator::new(&env_config, 0, 5)?.evaluate(&mut agent)?;
    info!("Evaluation reward = {}", reward);

    Ok(())
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();

    if args.train {
        train(EPOCHS, STEPS_PER_EPOCH, MODEL_DIR)?;
    } else if args.eval {
        eval(MODEL_DIR, true)?;
    } else {
        train(EPOCHS, STEPS_PER_EPOCH, MODEL_DIR)?;
        eval(MODEL_DIR, true)?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempdir::TempDir;

    #[test]
    fn test_ppo_pendulum() -> Result<()> {
        let tmp_dir = TempDir::new("ppo_pendulum")?;
        let model_dir = match tmp_dir.as_ref().to_str() {
            Some(s) => s,
            None => panic!("Failed to get string of temporary directory"),
        };
        train(1, 200, model_dir)?;
        eval(model_dir, false)?;
        Ok(())
    }
}
