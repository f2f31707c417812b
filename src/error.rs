//! Error types for optbench-core

use thiserror::Error;

use crate::config::ConfigError;
use crate::traits::{FactoryError, MeasurementError, ProblemCapability};

/// Core error type
#[derive(Error, Debug)]
pub enum Error {
    /// The problem's capability has no matching acceptance on the algorithm.
    /// Fatal to the affected replicate only; it never runs.
    #[error(
        "algorithm `{algorithm}` does not accept problems of type `{problem}` \
         (capability `{capability}`)"
    )]
    Binding {
        /// Algorithm type name
        algorithm: String,
        /// Problem type name
        problem: String,
        /// The capability the problem declared
        capability: ProblemCapability,
    },

    /// Measurement suite failure; fatal to the whole batch
    #[error("measurement error: {0}")]
    Measurement(#[from] MeasurementError),

    /// A worker-pool task failed while running or while its result was
    /// being retrieved; fatal to the whole batch
    #[error("execution error: {0}")]
    Execution(String),

    /// A factory failed to produce an instance; fatal to initialisation
    #[error("factory error: {0}")]
    Factory(#[from] FactoryError),

    /// Configuration error
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// `execute` was called before `init`
    #[error("orchestrator has not been initialised")]
    NotInitialised,

    /// `init` was called more than once
    #[error("orchestrator is already initialised")]
    AlreadyInitialised,

    /// The worker pool has been shut down and accepts no further tasks
    #[error("worker pool is shut down")]
    PoolClosed,
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;
