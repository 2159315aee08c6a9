//! Epoch batch.

/// Represents one epoch of transitions, unpacked for an optimization step.
pub trait EpochBatchBase {
    /// A set of observations in the batch.
    type ObsBatch;

    /// A set of actions in the batch.
    type ActBatch;

    /// Unpacks the data `(o_t, a_t, adv_t, ret_t, logp_t)`.
    ///
    /// The five parts are aligned by index.
    fn unpack(
        self,
    ) -> (
        Self::ObsBatch,
        Self::ActBatch,
        Vec<f32>,
        Vec<f32>,
        Vec<f32>,
    );

    /// Returns the number of transitions in the batch.
    fn len(&self) -> usize;
}
