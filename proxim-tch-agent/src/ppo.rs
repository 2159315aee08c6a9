//! PPO agent.
mod actor;
mod base;
mod config;
mod critic;

pub use actor::PolicyModel;
pub use base::Ppo;
pub use config::{PolicyModelConfig, PpoConfig, ValueModelConfig};
pub use critic::ValueModel;
