//! Configuration of [`PriorityReplayBuffer`](super::PriorityReplayBuffer).
use crate::error::ReplayError;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::{
    default::Default,
    fs::File,
    io::{BufReader, Write},
    path::Path,
};

/// How importance sampling weights are normalized.
#[derive(Debug, Deserialize, Serialize, PartialEq, Clone, Copy)]
pub enum WeightNormalizer {
    /// Divide by the largest weight in the sampled batch.
    ///
    /// The largest normalized weight in every batch is exactly `1.0`.
    Batch,

    /// Divide by the largest weight any stored transition could get, i.e. the weight
    /// of the transition with the smallest priority.
    All,
}

/// Configuration of [`PriorityReplayBuffer`](super::PriorityReplayBuffer).
///
/// # Examples
///
/// ```rust
/// use replay_core::replay_buffer::PriorityReplayBufferConfig;
///
/// let config = PriorityReplayBufferConfig::default()
///     .capacity(100_000)
///     .batch_size(64)
///     .alpha(0.6)
///     .beta(0.4);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
pub struct PriorityReplayBufferConfig {
    /// Maximum number of transitions. The oldest one is evicted on overflow.
    pub capacity: usize,

    /// Number of transitions in a batch.
    pub batch_size: usize,

    /// Added to every absolute TD error, keeping priorities strictly positive.
    pub epsilon: f32,

    /// Exponent of prioritization. `0` gives uniform sampling, `1` fully
    /// proportional sampling.
    pub alpha: f32,

    /// Initial exponent of importance sampling weights.
    pub beta: f32,

    /// Added to `beta` at every sampling, up to `1.0`.
    pub beta_increment: f32,

    /// Random seed for sampling.
    pub seed: u64,

    /// Normalization of importance sampling weights.
    pub normalize: WeightNormalizer,
}

impl Default for PriorityReplayBufferConfig {
    fn default() -> Self {
        Self {
            capacity: 10000,
            batch_size: 32,
            epsilon: 0.01,
            alpha: 0.6,
            beta: 0.4,
            beta_increment: 0.001,
            seed: 42,
            normalize: WeightNormalizer::Batch,
        }
    }
}

impl PriorityReplayBufferConfig {
    /// Sets the capacity of the replay buffer.
    pub fn capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    /// Sets the batch size.
    pub fn batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }

    /// Sets `epsilon`.
    pub fn epsilon(mut self, epsilon: f32) -> Self {
        self.epsilon = epsilon;
        self
    }

    /// Sets the prioritization exponent `alpha`.
    pub fn alpha(mut self, alpha: f32) -> Self {
        self.alpha = alpha;
        self
    }

    /// Sets the initial importance sampling exponent `beta`.
    pub fn beta(mut self, beta: f32) -> Self {
        self.beta = beta;
        self
    }

    /// Sets the increment of `beta` per sampling.
    pub fn beta_increment(mut self, beta_increment: f32) -> Self {
        self.beta_increment = beta_increment;
        self
    }

    /// Sets the random seed.
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Sets the normalization of importance sampling weights.
    pub fn normalize(mut self, normalize: WeightNormalizer) -> Self {
        self.normalize = normalize;
        self
    }

    /// Checks the ranges of the parameters.
    ///
    /// A `batch_size` larger than `capacity` is accepted; sampling then draws
    /// duplicates.
    pub fn validate(&self) -> Result<()> {
        let invalid = |msg: String| -> Result<()> { Err(ReplayError::InvalidConfig(msg).into()) };

        if self.capacity == 0 {
            return invalid("capacity must be positive".to_string());
        }
        if self.batch_size == 0 {
            return invalid("batch_size must be positive".to_string());
        }
        if !(self.epsilon.is_finite() && self.epsilon > 0.0) {
            return invalid(format!("epsilon must be positive, got {}", self.epsilon));
        }
        if !(self.alpha.is_finite() && self.alpha > 0.0) {
            return invalid(format!("alpha must be positive, got {}", self.alpha));
        }
        if !(0.0..=1.0).contains(&self.beta) {
            return invalid(format!("beta must be in [0, 1], got {}", self.beta));
        }
        if !(self.beta_increment.is_finite() && self.beta_increment >= 0.0) {
            return invalid(format!(
                "beta_increment must be non-negative, got {}",
                self.beta_increment
            ));
        }
        Ok(())
    }

    /// Loads the configuration from a YAML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path)?;
        let rdr = BufReader::new(file);
        let b = serde_yaml::from_reader(rdr)?;
        Ok(b)
    }

    /// Saves the configuration to a YAML file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let mut file = File::create(path)?;
        file.write_all(serde_yaml::to_string(&self)?.as_bytes())?;
        Ok(())
    }
}
