//! Train [`Agent`].
mod config;

use crate::{
    record::{Record, RecordValue::Scalar, Recorder},
    Agent, Env, Evaluator, ExperienceBufferBase, RolloutBufferBase, StepProcessor,
    StochasticPolicy,
};
use anyhow::Result;
pub use config::TrainerConfig;
use log::info;
use std::path::{Path, PathBuf};

#[cfg_attr(doc, aquamarine::aquamarine)]
/// Manages the training loop and related objects.
///
/// Each epoch consists of two phases. In the *rollout phase*, the agent
/// interacts with the environment for exactly one buffer's worth of steps;
/// every transition is pushed into the rollout buffer and every episode
/// that terminates, exceeds `max_ep_len`, or is cut off by the epoch
/// boundary is closed with a bootstrapped `finish_path`. In the *update
/// phase*, the agent takes the full epoch out of the buffer and performs
/// its optimization steps.
///
/// In [`Trainer::train()`], objects interact as shown below:
///
/// ```mermaid
/// graph LR
///     A[Agent]-->|Env::Act|B[Env]
///     B -->|Env::Obs|A
///     B -->|"Step&lt;E: Env&gt;"|C[StepProcessor]
///     C -->|Transition|D[RolloutBuffer]
///     D -->|EpochBatch|A
/// ```
///
/// Two kinds of records are written to the recorder: episode records
/// (cumulative training reward and the evaluator's reward, tagged by an
/// increasing episode counter) and epoch records (whatever the agent's
/// optimization step reports, tagged by the epoch counter).
pub struct Trainer<E, P, R>
where
    E: Env,
    P: StepProcessor<E>,
    R: RolloutBufferBase + ExperienceBufferBase<Item = P::Output>,
{
    /// Configuration of the transition producer.
    step_proc_config: P::Config,

    /// Configuration of the rollout buffer.
    buffer_config: R::Config,

    /// The number of epochs.
    epochs: usize,

    /// Maximum length of an episode in environment steps.
    max_ep_len: usize,

    /// Interval of saving the model in epochs.
    save_interval: usize,

    /// Where to save the trained model.
    model_dir: Option<String>,
}

impl<E, P, R> Trainer<E, P, R>
where
    E: Env,
    P: StepProcessor<E>,
    R: RolloutBufferBase + ExperienceBufferBase<Item = P::Output>,
{
    /// Constructs a trainer.
    pub fn build(
        config: TrainerConfig,
        step_proc_config: P::Config,
        buffer_config: R::Config,
    ) -> Self {
        Self {
            step_proc_config,
            buffer_config,
            epochs: config.epochs,
            max_ep_len: config.max_ep_len,
            save_interval: config.save_interval,
            model_dir: config.model_dir,
        }
    }

    fn save_model<A: Agent<E, R>>(agent: &A, model_dir: PathBuf) {
        match agent.save_params(&model_dir) {
            Ok(()) => info!("Saved the model in {:?}.", &model_dir),
            Err(_) => info!("Failed to save model in {:?}.", &model_dir),
        }
    }

    /// Train the agent on the given environment.
    ///
    /// The environment is constructed by the caller; the trainer only
    /// drives it. The loop has no terminal state other than completing
    /// `epochs` epochs; it is restarted only by rebuilding the trainer.
    pub fn train<A, D, S>(
        &mut self,
        mut env: E,
        agent: &mut A,
        recorder: &mut S,
        evaluator: &mut D,
    ) -> Result<()>
    where
        A: Agent<E, R> + StochasticPolicy<E>,
        D: Evaluator<E, A>,
        S: Recorder + ?Sized,
    {
        let mut step_proc = P::build(&self.step_proc_config);
        let mut buffer = R::build(&self.buffer_config);
        let steps_per_epoch = buffer.capacity();
        let mut episode: i64 = 0;
        let mut max_eval_reward = f32::MIN;
        agent.train();

        for epoch in 0..self.epochs {
            let mut prev_obs = env.reset()?;
            step_proc.reset(prev_obs.clone());
            let mut ep_ret = 0f32;
            let mut ep_len = 0usize;

            // Rollout phase
            for t in 0..steps_per_epoch {
                let (act, value, logp) = agent.sample_with_stats(&prev_obs);
                let (step, _) = env.step(&act);
                let reward = step.reward[0];
                let is_terminated = step.is_terminated[0] == 1;
                let is_truncated = step.is_truncated[0] == 1;
                let next_obs = step.obs.clone();
                buffer.push(step_proc.process(step, value, logp))?;
                ep_ret += reward;
                ep_len += 1;

                let truncated = is_truncated || ep_len == self.max_ep_len;
                let epoch_cut = t + 1 == steps_per_epoch;

                if is_terminated || truncated || epoch_cut {
                    // A cut-off episode is scored with the current value
                    // estimate of the next observation, not with zero.
                    let last_value = if is_terminated {
                        0.0
                    } else {
                        agent.value(&next_obs)
                    };
                    buffer.finish_path(last_value);

                    episode += 1;
                    let mut record = Record::from_scalar("episode_return", ep_ret);
                    record.insert("episode_len", Scalar(ep_len as f32));

                    agent.eval();
                    let eval_reward = evaluator.evaluate(agent)?;
                    agent.train();
                    record.insert("eval_return", Scalar(eval_reward));
                    recorder.write(episode, record);

                    if eval_reward > max_eval_reward {
                        max_eval_reward = eval_reward;
                        if let Some(model_dir) = &self.model_dir {
                            Self::save_model(agent, Path::new(model_dir).join("best"));
                        }
                    }

                    if !epoch_cut {
                        prev_obs = env.reset()?;
                        step_proc.reset(prev_obs.clone());
                    }
                    ep_ret = 0.0;
                    ep_len = 0;
                } else {
                    prev_obs = next_obs;
                }
            }

            // Update phase
            let record = agent.opt(&mut buffer)?;
            recorder.write((epoch + 1) as i64, record);
            info!("Epoch {} of {} done", epoch + 1, self.epochs);

            if self.save_interval > 0 && (epoch + 1) % self.save_interval == 0 {
                if let Some(model_dir) = &self.model_dir {
                    Self::save_model(agent, Path::new(model_dir).join(format!("{}", epoch + 1)));
                }
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        dummy::{
            DummyActBatch, DummyAgent, DummyAgentConfig, DummyEnv, DummyEnvConfig, DummyObsBatch,
        },
        record::BufferedRecorder,
        rollout_buffer::{
            RolloutBuffer, RolloutBufferConfig, SimpleStepProcessor, SimpleStepProcessorConfig,
        },
        DefaultEvaluator,
    };

    type StepProc = SimpleStepProcessor<DummyEnv, DummyObsBatch, DummyActBatch>;
    type Buffer = RolloutBuffer<DummyObsBatch, DummyActBatch>;

    fn build_trainer(epochs: usize, capacity: usize) -> Trainer<DummyEnv, StepProc, Buffer> {
        Trainer::build(
            TrainerConfig::default().epochs(epochs).max_ep_len(100),
            SimpleStepProcessorConfig {},
            RolloutBufferConfig::default().capacity(capacity),
        )
    }

    #[test]
    fn one_optimization_step_per_epoch_on_a_full_buffer() -> Result<()> {
        // Episodes terminate after 4 steps and epochs hold 6 transitions:
        // each epoch sees one full episode and one cut off at the epoch
        // boundary.
        let env_config = DummyEnvConfig { episode_len: 4 };
        let mut trainer = build_trainer(2, 6);
        let mut agent = DummyAgent::new(DummyAgentConfig { value: 0.5 });
        let mut recorder = BufferedRecorder::new();
        let mut evaluator = DefaultEvaluator::new(&env_config, 0, 1)?;

        let env = DummyEnv::build(&env_config, 0)?;
        trainer.train(env, &mut agent, &mut recorder, &mut evaluator)?;

        assert_eq!(agent.n_opts, 2);
        assert_eq!(agent.epoch_sizes, vec![6, 6]);
        Ok(())
    }

    #[test]
    fn episode_records_carry_returns_and_lengths() -> Result<()> {
        let env_config = DummyEnvConfig { episode_len: 4 };
        let mut trainer = build_trainer(1, 6);
        let mut agent = DummyAgent::new(DummyAgentConfig { value: 0.5 });
        let mut recorder = BufferedRecorder::new();
        let mut evaluator = DefaultEvaluator::new(&env_config, 0, 1)?;

        let env = DummyEnv::build(&env_config, 0)?;
        trainer.train(env, &mut agent, &mut recorder, &mut evaluator)?;

        // The dummy env pays 1.0 per step; the first episode runs its full
        // 4 steps, the second is cut off after the remaining 2.
        let returns: Vec<f32> = recorder
            .iter()
            .filter_map(|(_, r)| r.get_scalar("episode_return").ok())
            .collect();
        assert_eq!(returns, vec![4.0, 2.0]);

        let lens: Vec<f32> = recorder
            .iter()
            .filter_map(|(_, r)| r.get_scalar("episode_len").ok())
            .collect();
        assert_eq!(lens, vec![4.0, 2.0]);

        // Episode records are tagged by the episode counter, the epoch
        // record by the epoch counter.
        let steps: Vec<i64> = recorder.iter().map(|(step, _)| *step).collect();
        assert_eq!(steps, vec![1, 2, 1]);

        // Evaluation episodes run to natural termination.
        let eval: Vec<f32> = recorder
            .iter()
            .filter_map(|(_, r)| r.get_scalar("eval_return").ok())
            .collect();
        assert_eq!(eval, vec![4.0, 4.0]);
        Ok(())
    }
}
