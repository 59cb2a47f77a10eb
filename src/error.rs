//! Crate-wide error type.

use crate::model::SolverStatus;
use thiserror::Error as ThisError;

#[derive(Debug, ThisError)]
pub enum Error {
    /// The instance cannot be used: fewer than two nodes, or a distance that
    /// is not a finite non-negative number.
    #[error("malformed instance: {0}")]
    MalformedInstance(String),
    /// A sequence that should be a permutation of `0..n` is not one.
    #[error("invalid tour: {0}")]
    InvalidTour(String),
    /// Repair could not turn a child sequence into a permutation.
    #[error("repair failed: {0}")]
    RepairFailed(String),
    #[error("invalid config: {0}")]
    InvalidConfig(String),
    /// The exact solver ended without a usable integer solution.
    #[error("exact solver finished with status {status:?}")]
    Solver { status: SolverStatus },
    /// Roulette selection was asked for more distinct individuals than the
    /// pool holds.
    #[error("selection exhausted: requested {requested}, available {available}")]
    SelectionExhausted { requested: usize, available: usize },
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub fn malformed_instance(message: impl Into<String>) -> Self {
        Self::MalformedInstance(message.into())
    }

    pub fn invalid_tour(message: impl Into<String>) -> Self {
        Self::InvalidTour(message.into())
    }

    pub fn repair_failed(message: impl Into<String>) -> Self {
        Self::RepairFailed(message.into())
    }
}
