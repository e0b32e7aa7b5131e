//! Prioritized experience replay.
//!
//! # Key Components
//!
//! - [`PriorityReplayBuffer`]: a fixed-capacity buffer sampling transitions in
//!   proportion to their priority
//! - [`PriorityReplayBufferConfig`]: its configuration, loadable from YAML
//! - [`IwScheduler`]: annealing of the importance sampling exponent
//! - [`Transition`], [`GenericTransitionBatch`]: what goes in and what comes out
mod base;
mod batch;
mod config;
pub use base::{IwScheduler, PriorityReplayBuffer};
pub use batch::{GenericTransitionBatch, Transition};
pub use config::{PriorityReplayBufferConfig, WeightNormalizer};
