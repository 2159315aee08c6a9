//! Environment step.
use super::Env;

/// Extra information an environment attaches to its steps.
pub trait Info {}

impl Info for () {}

/// The result of one environment interaction: the action taken, the
/// observation after the step, the reward, and the end-of-episode flags.
pub struct Step<E: Env> {
    /// The action taken at this step.
    pub act: E::Act,

    /// Observation after the step.
    pub obs: E::Obs,

    /// Reward obtained by taking the action.
    pub reward: Vec<f32>,

    /// Whether the episode ended on a terminal state.
    pub is_terminated: Vec<i8>,

    /// Whether the episode was cut off before a terminal state.
    pub is_truncated: Vec<i8>,

    /// Extra information defined by the environment.
    pub info: E::Info,
}

impl<E: Env> Step<E> {
    /// Constructs a [`Step`] object.
    pub fn new(
        obs: E::Obs,
        act: E::Act,
        reward: Vec<f32>,
        is_terminated: Vec<i8>,
        is_truncated: Vec<i8>,
        info: E::Info,
    ) -> Self {
        Step {
            act,
            obs,
            reward,
            is_terminated,
            is_truncated,
            info,
        }
    }

    #[inline]
    /// Terminated or truncated.
    pub fn is_done(&self) -> bool {
        self.is_terminated[0] == 1 || self.is_truncated[0] == 1
    }
}

/// Processes a [`Step`] object into an item for a rollout buffer.
///
/// Implementations keep the observation at which the action was taken,
/// while the remaining fields of the produced item come from the given
/// [`Step`] and from the policy statistics reported at sampling time.
/// The type [`Self::Output`] should be the same as the item type of the
/// buffer the trainer pushes into.
///
/// [`Self::Output`]: StepProcessor::Output
pub trait StepProcessor<E: Env> {
    /// Configuration of the processor.
    type Config: Clone;

    /// The type of transitions the processor produces.
    type Output;

    /// Builds a processor.
    fn build(config: &Self::Config) -> Self;

    /// Resets the object with the observation of a freshly reset environment.
    fn reset(&mut self, init_obs: E::Obs);

    /// Processes a [`Step`] object together with the value estimate and the
    /// log-probability of the action, both computed when the action was
    /// sampled.
    fn process(&mut self, step: Step<E>, value: f32, logp: f32) -> Self::Output;
}
