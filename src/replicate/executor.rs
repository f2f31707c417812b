//! Replicate execution logic

use std::fmt;
use std::sync::Arc;

use crate::cancel::CancelFlag;
use crate::error::{Error, Result};
use crate::orchestrator::ProgressHub;
use crate::replicate::{ReplicateStats, TrialMonitor};
use crate::traits::{Algorithm, LifecycleListener, MeasurementSuite, Problem};

/// Identity of a single replicate within a batch
///
/// Assigned by the orchestrator in construction order (sample index
/// `0..N-1`); execution and completion order carry no relation to it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ReplicateId(pub usize);

impl fmt::Display for ReplicateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "replicate-{}", self.0)
    }
}

/// One independent trial: an algorithm, a problem, and a measurement suite,
/// run exactly once on a worker task
///
/// The replicate produces no externally visible return value beyond its
/// stats — results are side effects delivered through the measurement suite
/// and the shared progress registry.
pub struct Replicate {
    id: ReplicateId,
    algorithm: Box<dyn Algorithm>,
    problem: Option<Box<dyn Problem>>,
    monitor: TrialMonitor,
    cancel: CancelFlag,
}

impl Replicate {
    pub(crate) fn new(
        id: ReplicateId,
        algorithm: Box<dyn Algorithm>,
        problem: Box<dyn Problem>,
        suite: Box<dyn MeasurementSuite>,
        progress: Arc<ProgressHub>,
        cancel: CancelFlag,
    ) -> Self {
        Self {
            id,
            algorithm,
            problem: Some(problem),
            monitor: TrialMonitor::new(id, suite, progress),
            cancel,
        }
    }

    /// Replicate identity
    pub fn id(&self) -> ReplicateId {
        self.id
    }

    /// Run the trial to completion
    ///
    /// Binds the problem, then drives the algorithm, forwarding lifecycle
    /// events to the monitor. The cancellation flag is checked between
    /// iterations; a cancelled run still fires its *finished* event and
    /// resolves through normal completion reporting.
    pub async fn run(mut self) -> Result<ReplicateStats> {
        self.bind()?;

        let Replicate {
            id,
            mut algorithm,
            mut monitor,
            cancel,
            ..
        } = self;

        tracing::debug!(
            replicate_id = id.0,
            algorithm = algorithm.name(),
            "Replicate started"
        );

        algorithm.initialise();
        monitor.on_started(algorithm.as_ref())?;

        while !algorithm.is_complete() {
            if cancel.is_set() {
                tracing::debug!(replicate_id = id.0, "Replicate observed termination request");
                monitor.mark_terminated();
                break;
            }

            algorithm.step();
            monitor.on_iteration_completed(algorithm.as_ref())?;

            tokio::task::yield_now().await;
        }

        monitor.on_finished(algorithm.as_ref())?;

        let stats = monitor.into_stats();
        tracing::debug!(
            replicate_id = id.0,
            iterations = stats.iterations,
            measurements = stats.measurements,
            terminated = stats.terminated,
            "Replicate finished"
        );

        Ok(stats)
    }

    /// Bind the problem to the algorithm
    ///
    /// Typed capability match: the problem's declared capability must be a
    /// member of the algorithm's accepted set. On a mismatch the replicate
    /// never runs and its registry entry is excluded from the aggregate.
    fn bind(&mut self) -> Result<()> {
        let problem = match self.problem.take() {
            Some(problem) => problem,
            None => return Ok(()),
        };

        let capability = problem.capability();
        if !self
            .algorithm
            .accepted_capabilities()
            .contains(&capability)
        {
            self.monitor.exclude();
            return Err(Error::Binding {
                algorithm: self.algorithm.name().to_string(),
                problem: problem.name().to_string(),
                capability,
            });
        }

        self.algorithm.install_problem(problem);
        Ok(())
    }
}

impl fmt::Debug for Replicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Replicate")
            .field("id", &self.id)
            .field("algorithm", &self.algorithm.name())
            .field("bound", &self.problem.is_none())
            .finish()
    }
}
