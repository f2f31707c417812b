//! Lifecycle event handling for a single replicate

use std::sync::Arc;

use crate::error::Result;
use crate::orchestrator::ProgressHub;
use crate::replicate::{ReplicateId, ReplicateStats};
use crate::traits::{Algorithm, LifecycleListener, MeasurementError, MeasurementSuite};

/// Forwards one replicate's lifecycle events to measurement sampling and
/// aggregate progress reporting
///
/// Owns the replicate's measurement suite for the duration of the run and
/// accumulates the trial's stats. Sampling happens on iteration multiples
/// of the suite's resolution and once more when the run finishes; every
/// sample is paired with a progress report to the shared registry.
pub struct TrialMonitor {
    id: ReplicateId,
    suite: Box<dyn MeasurementSuite>,
    progress: Arc<ProgressHub>,
    stats: ReplicateStats,
}

impl TrialMonitor {
    pub(crate) fn new(
        id: ReplicateId,
        suite: Box<dyn MeasurementSuite>,
        progress: Arc<ProgressHub>,
    ) -> Self {
        Self {
            id,
            suite,
            progress,
            stats: ReplicateStats::new(id),
        }
    }

    /// Record that the run was cut short by cooperative cancellation
    pub(crate) fn mark_terminated(&mut self) {
        self.stats.terminated = true;
    }

    /// Drop this replicate's entry from the aggregate denominator
    ///
    /// Used when the replicate failed to bind and will never report
    /// progress.
    pub(crate) fn exclude(&self) {
        self.progress.exclude(self.id);
    }

    /// Consume the monitor, yielding the trial's stats
    pub(crate) fn into_stats(self) -> ReplicateStats {
        self.stats
    }

    fn sample(&mut self, algorithm: &dyn Algorithm) {
        self.suite.measure(algorithm);
        self.stats.record_measurement();
        self.progress.update(self.id, algorithm.percentage_complete());
    }
}

impl LifecycleListener for TrialMonitor {
    fn on_started(&mut self, _algorithm: &dyn Algorithm) -> Result<()> {
        self.stats.start();
        if self.suite.resolution() == 0 {
            return Err(MeasurementError::InvalidResolution.into());
        }
        self.suite.initialise()?;
        Ok(())
    }

    fn on_iteration_completed(&mut self, algorithm: &dyn Algorithm) -> Result<()> {
        self.stats.record_iteration();
        if algorithm.iterations() % self.suite.resolution() == 0 {
            self.sample(algorithm);
        }
        Ok(())
    }

    fn on_finished(&mut self, algorithm: &dyn Algorithm) -> Result<()> {
        self.sample(algorithm);
        self.suite.close()?;
        self.stats.stop();
        Ok(())
    }
}
