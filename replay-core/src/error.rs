//! Errors in the library.
use thiserror::Error;

/// Errors in the library.
#[derive(Error, Debug, PartialEq)]
pub enum ReplayError {
    /// A configuration value is out of its valid range.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Sampling was requested before any record was added.
    #[error("Sampling from an empty replay buffer")]
    EmptyBuffer,

    /// Leaf indices and TD errors given to a priority update differ in length.
    #[error("Length mismatch in priority update: {n_ixs} indices, {n_errs} errors")]
    LengthMismatch {
        /// Number of leaf indices.
        n_ixs: usize,

        /// Number of TD errors.
        n_errs: usize,
    },

    /// The index does not point to a populated leaf of the sum tree.
    #[error("Invalid leaf index: {0}")]
    InvalidLeafIndex(usize),
}
