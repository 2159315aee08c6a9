//! Step processor producing rollout transitions.
use super::{BatchBase, Transition};
use crate::{Env, Obs, Step, StepProcessor};
use std::{default::Default, marker::PhantomData};

/// Configuration of [`SimpleStepProcessor`].
#[derive(Clone, Debug)]
pub struct SimpleStepProcessorConfig {}

impl Default for SimpleStepProcessorConfig {
    fn default() -> Self {
        Self {}
    }
}

/// Converts an environment [`Step`] and the policy statistics reported at
/// sampling time into a [`Transition`].
///
/// The processor keeps the previous observation, i.e., the observation at
/// which the stored action was taken; the observation inside the [`Step`]
/// is the one *after* the step and becomes the previous observation of the
/// next call.
pub struct SimpleStepProcessor<E, O, A> {
    prev_obs: Option<O>,
    phantom: PhantomData<(E, A)>,
}

impl<E, O, A> StepProcessor<E> for SimpleStepProcessor<E, O, A>
where
    E: Env,
    O: BatchBase + From<E::Obs>,
    A: BatchBase + From<E::Act>,
{
    type Config = SimpleStepProcessorConfig;
    type Output = Transition<O, A>;

    fn build(_config: &Self::Config) -> Self {
        Self {
            prev_obs: None,
            phantom: PhantomData,
        }
    }

    fn reset(&mut self, init_obs: E::Obs) {
        self.prev_obs = Some(init_obs.into());
    }

    /// Processes a [`Step`] object.
    ///
    /// # Panics
    ///
    /// Panics if `reset()` has not been called before the first step of an
    /// episode.
    fn process(&mut self, step: Step<E>, value: f32, logp: f32) -> Self::Output {
        assert_eq!(step.obs.len(), 1);

        let next_obs = step.obs.into();
        let obs = self
            .prev_obs
            .replace(next_obs)
            .expect("prev_obs is not set. Forgot to call reset()?");

        Transition {
            obs,
            act: step.act.into(),
            reward: step.reward[0],
            value,
            logp,
        }
    }
}
