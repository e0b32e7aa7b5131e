//! Scheduling the exponent of importance weight for PER.
use serde::{Deserialize, Serialize};

/// Scheduler of the exponent of importance weight for PER.
///
/// $\beta$ grows by a fixed increment at every sampling and saturates at `beta_max`.
/// It never decreases.
#[derive(Deserialize, Serialize, Clone, Debug, PartialEq)]
pub struct IwScheduler {
    /// Current value of $\beta$.
    pub beta: f32,

    /// Increment of $\beta$ per sampling.
    pub beta_increment: f32,

    /// Upper bound of $\beta$.
    pub beta_max: f32,
}

impl IwScheduler {
    /// Creates a scheduler annealing `beta_0` toward `1.0`.
    pub fn new(beta_0: f32, beta_increment: f32) -> Self {
        Self {
            beta: beta_0,
            beta_increment,
            beta_max: 1.0,
        }
    }

    /// Gets the exponent of importance sampling weight.
    pub fn beta(&self) -> f32 {
        self.beta
    }

    /// Advances the schedule by one sampling and returns the new exponent.
    pub fn step(&mut self) -> f32 {
        self.beta = (self.beta + self.beta_increment).min(self.beta_max);
        self.beta
    }
}
