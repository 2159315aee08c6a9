//! A generic implementation of an on-policy rollout buffer.
//!
//! [`RolloutBuffer`] stores one epoch of transitions in fixed-capacity
//! parallel arrays and computes per-episode discounted returns and GAE-λ
//! advantages. Observation and action storage is generic over
//! [`BatchBase`], so any backend can plug in its own batch type.
mod base;
mod batch;
mod config;
mod step_proc;

pub use base::RolloutBuffer;
pub use batch::{BatchBase, EpochBatch, Transition};
pub use config::RolloutBufferConfig;
pub use step_proc::{SimpleStepProcessor, SimpleStepProcessorConfig};
