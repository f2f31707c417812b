//! Builder pattern for Orchestrator construction

use std::sync::Arc;

use crate::config::{ConfigError, HarnessConfig};
use crate::error::Result;
use crate::traits::{Algorithm, Factory, MeasurementSuite, Problem};

use super::executor::Orchestrator;

/// Builder for creating an Orchestrator with proper configuration
///
/// # Example
///
/// ```ignore
/// let orchestrator = OrchestratorBuilder::new()
///     .samples(30)
///     .pool_size(8)
///     .algorithm_factory(algorithms)
///     .problem_factory(problems)
///     .measurement_factory(measurements)
///     .build()?;
/// ```
pub struct OrchestratorBuilder {
    config: HarnessConfig,
    algorithms: Option<Arc<dyn Factory<dyn Algorithm>>>,
    problems: Option<Arc<dyn Factory<dyn Problem>>>,
    measurements: Option<Arc<dyn Factory<dyn MeasurementSuite>>>,
}

impl OrchestratorBuilder {
    /// Create a new builder with default configuration
    pub fn new() -> Self {
        Self {
            config: HarnessConfig::default(),
            algorithms: None,
            problems: None,
            measurements: None,
        }
    }

    /// Set the full harness configuration
    pub fn config(mut self, config: HarnessConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the number of replicates to run
    pub fn samples(mut self, samples: usize) -> Self {
        self.config.samples = samples;
        self
    }

    /// Set the worker-pool size
    pub fn pool_size(mut self, pool_size: usize) -> Self {
        self.config.pool_size = pool_size;
        self
    }

    /// Set the algorithm factory
    pub fn algorithm_factory(mut self, factory: Arc<dyn Factory<dyn Algorithm>>) -> Self {
        self.algorithms = Some(factory);
        self
    }

    /// Set the problem factory
    pub fn problem_factory(mut self, factory: Arc<dyn Factory<dyn Problem>>) -> Self {
        self.problems = Some(factory);
        self
    }

    /// Set the measurement-suite factory
    pub fn measurement_factory(mut self, factory: Arc<dyn Factory<dyn MeasurementSuite>>) -> Self {
        self.measurements = Some(factory);
        self
    }

    /// Build the orchestrator
    ///
    /// # Errors
    ///
    /// Returns an error if any factory is missing or if configuration
    /// validation fails.
    pub fn build(self) -> Result<Orchestrator> {
        let algorithms = self
            .algorithms
            .ok_or(ConfigError::Missing("algorithm_factory"))?;
        let problems = self.problems.ok_or(ConfigError::Missing("problem_factory"))?;
        let measurements = self
            .measurements
            .ok_or(ConfigError::Missing("measurement_factory"))?;

        self.config.validate()?;

        Ok(Orchestrator::new(
            self.config,
            algorithms,
            problems,
            measurements,
        ))
    }
}

impl Default for OrchestratorBuilder {
    fn default() -> Self {
        Self::new()
    }
}
