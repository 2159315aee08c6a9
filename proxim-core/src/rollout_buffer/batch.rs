//! Batch types of the rollout buffer.
use crate::EpochBatchBase;

/// A trait defining basic batch operations.
///
/// Types implementing this trait manage fixed-capacity batches of
/// observations or actions, independently of their representation.
pub trait BatchBase {
    /// Creates a new batch with the given capacity.
    fn new(capacity: usize) -> Self;

    /// Adds data at the given index.
    fn push(&mut self, ix: usize, data: Self);

    /// Retrieves samples at the given indices.
    fn sample(&self, ixs: &Vec<usize>) -> Self;
}

/// A single environment step, as stored by the rollout buffer.
///
/// `obs` is the observation at which `act` was taken, `reward` is the
/// reward obtained by taking it, and `value` and `logp` are the
/// state-value estimate and the log-probability of `act`, both computed
/// by the policy when the action was sampled.
pub struct Transition<O, A>
where
    O: BatchBase,
    A: BatchBase,
{
    /// Observation.
    pub obs: O,

    /// Action.
    pub act: A,

    /// Reward.
    pub reward: f32,

    /// State-value estimate.
    pub value: f32,

    /// Log-probability of the action.
    pub logp: f32,
}

/// One full epoch of transitions with finalized advantages and returns.
///
/// The five parts are aligned by index. Advantages are normalized to zero
/// mean and unit standard deviation across the whole epoch.
pub struct EpochBatch<O, A>
where
    O: BatchBase,
    A: BatchBase,
{
    /// Observations.
    pub obs: O,

    /// Actions.
    pub act: A,

    /// Normalized advantages.
    pub adv: Vec<f32>,

    /// Discounted returns-to-go.
    pub ret: Vec<f32>,

    /// Log-probabilities of the actions under the policy that sampled them.
    pub logp: Vec<f32>,
}

impl<O, A> EpochBatchBase for EpochBatch<O, A>
where
    O: BatchBase,
    A: BatchBase,
{
    type ObsBatch = O;
    type ActBatch = A;

    fn unpack(
        self,
    ) -> (
        Self::ObsBatch,
        Self::ActBatch,
        Vec<f32>,
        Vec<f32>,
        Vec<f32>,
    ) {
        (self.obs, self.act, self.adv, self.ret, self.logp)
    }

    fn len(&self) -> usize {
        self.adv.len()
    }
}
