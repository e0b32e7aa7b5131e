#![warn(missing_docs)]
//! Prioritized experience replay backed by a sum tree.
//!
//! [`SumTree`] stores one priority per record and samples records in proportion to
//! it in O(log N). [`replay_buffer::PriorityReplayBuffer`] builds on it to keep
//! training transitions, draw stratified batches with importance sampling weights,
//! and update priorities from TD errors after a learning step.
pub mod error;
pub mod replay_buffer;

mod base;
pub use base::{ExperienceBufferBase, ReplayBufferBase, TransitionBatch};

mod sum_tree;
pub use sum_tree::SumTree;
