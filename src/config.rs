//! Harness configuration types

use serde::{Deserialize, Serialize};

/// Harness configuration
///
/// Defines how a batch of replicates is run: how many independent trials
/// to construct and how many may run simultaneously.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HarnessConfig {
    /// Number of replicates (samples) to construct and run
    pub samples: usize,

    /// Maximum number of simultaneously running replicates; excess
    /// replicates queue until a worker is free
    pub pool_size: usize,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            samples: 1,
            pool_size: 1,
        }
    }
}

impl HarnessConfig {
    /// Create a new config with the given sample count
    pub fn new(samples: usize) -> Self {
        Self {
            samples,
            ..Default::default()
        }
    }

    /// Set the worker-pool size
    pub fn with_pool_size(mut self, pool_size: usize) -> Self {
        self.pool_size = pool_size;
        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.samples == 0 {
            return Err(ConfigError::InvalidSamples(
                "sample count must be at least 1".into(),
            ));
        }

        if self.pool_size == 0 {
            return Err(ConfigError::InvalidPoolSize(
                "pool size must be at least 1".into(),
            ));
        }

        Ok(())
    }
}

/// Configuration validation errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Invalid sample count
    #[error("invalid sample count: {0}")]
    InvalidSamples(String),

    /// Invalid worker-pool size
    #[error("invalid pool size: {0}")]
    InvalidPoolSize(String),

    /// A required builder field was not set
    #[error("missing required field: {0}")]
    Missing(&'static str),
}
