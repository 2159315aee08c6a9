//! Configuration of [`RolloutBuffer`](super::RolloutBuffer).
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::{
    fs::File,
    io::{BufReader, Write},
    path::Path,
};

/// Configuration of [`RolloutBuffer`](super::RolloutBuffer).
#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
pub struct RolloutBufferConfig {
    /// The number of transitions in an epoch.
    pub capacity: usize,

    /// Discount factor.
    pub gamma: f32,

    /// GAE-λ decay parameter.
    pub lam: f32,
}

impl Default for RolloutBufferConfig {
    fn default() -> Self {
        Self {
            capacity: 4000,
            gamma: 0.99,
            lam: 0.97,
        }
    }
}

impl RolloutBufferConfig {
    /// Sets the number of transitions in an epoch.
    pub fn capacity(mut self, v: usize) -> Self {
        self.capacity = v;
        self
    }

    /// Sets the discount factor.
    pub fn gamma(mut self, v: f32) -> Self {
        self.gamma = v;
        self
    }

    /// Sets the GAE-λ decay parameter.
    pub fn lam(mut self, v: f32) -> Self {
        self.lam = v;
        self
    }

    /// Constructs [`RolloutBufferConfig`] from a YAML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path)?;
        let rdr = BufReader::new(file);
        let b = serde_yaml::from_reader(rdr)?;
        Ok(b)
    }

    /// Saves [`RolloutBufferConfig`] to a YAML file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let mut file = File::create(path)?;
        file.write_all(serde_yaml::to_string(self)?.as_bytes())?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempdir::TempDir;

    #[test]
    fn test_serde_rollout_buffer_config() -> Result<()> {
        let config = RolloutBufferConfig::default()
            .capacity(1000)
            .gamma(0.9)
            .lam(0.95);

        let dir = TempDir::new("rollout_buffer_config")?;
        let path = dir.path().join("rollout_buffer_config.yaml");

        config.save(&path)?;
        let config_ = RolloutBufferConfig::load(&path)?;
        assert_eq!(config, config_);
        Ok(())
    }
}
