//! Orchestrator execution logic

use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};

use tokio::sync::Semaphore;
use tokio::task::JoinSet;

use crate::cancel::CancelFlag;
use crate::config::HarnessConfig;
use crate::error::{Error, Result};
use crate::replicate::{Replicate, ReplicateId, ReplicateStats};
use crate::traits::{Algorithm, Factory, MeasurementSuite, Problem, ProgressListener};

use super::aggregator::ProgressHub;

/// Outcome of one replicate, retrieved in completion order
#[derive(Debug)]
pub enum ReplicateOutcome {
    /// The replicate ran through its *finished* event
    Completed(ReplicateStats),

    /// The replicate's problem could not be bound to its algorithm; it
    /// never ran and is excluded from the aggregate
    BindingFailed {
        /// Identity of the affected replicate
        id: ReplicateId,
        /// The binding error
        error: Error,
    },
}

/// Handle for requesting cooperative termination while `execute` is in
/// flight
///
/// Obtained from [`Orchestrator::termination_handle`] before `execute` is
/// awaited; cloneable and usable from any task or thread.
#[derive(Clone)]
pub struct TerminationHandle {
    flags: Arc<Mutex<Vec<CancelFlag>>>,
}

impl TerminationHandle {
    /// Request cooperative termination of all constructed replicates
    pub fn terminate(&self) {
        let flags = self.flags.lock().unwrap_or_else(PoisonError::into_inner);
        tracing::info!(samples = flags.len(), "Termination requested");
        for flag in flags.iter() {
            flag.set();
        }
    }
}

/// Orchestrator manages the batch lifecycle
///
/// Constructs replicates from the capability factories, submits them to a
/// bounded worker pool, retrieves their outcomes in completion order
/// (first finished, first retrieved), aggregates per-replicate progress,
/// and coordinates pool shutdown and cooperative termination.
pub struct Orchestrator {
    /// Harness configuration
    pub(crate) config: HarnessConfig,

    /// Produces a fresh algorithm per replicate
    pub(crate) algorithms: Arc<dyn Factory<dyn Algorithm>>,

    /// Produces a fresh problem per replicate
    pub(crate) problems: Arc<dyn Factory<dyn Problem>>,

    /// Produces a fresh measurement suite per replicate
    pub(crate) measurements: Arc<dyn Factory<dyn MeasurementSuite>>,

    /// Replicates constructed by `init`, drained by `execute`
    pub(crate) replicates: Vec<Replicate>,

    /// Cancellation flags for every constructed replicate
    pub(crate) cancel_flags: Arc<Mutex<Vec<CancelFlag>>>,

    /// Shared progress registry and observer set
    pub(crate) progress: Arc<ProgressHub>,

    /// Worker pool: permits bound the number of simultaneously running
    /// replicates; closing the semaphore shuts the pool down
    pub(crate) pool: Arc<Semaphore>,

    /// Whether `init` has populated the replicate sequence
    pub(crate) initialised: bool,
}

impl Orchestrator {
    /// Create a new orchestrator
    ///
    /// Use `OrchestratorBuilder` for a more ergonomic construction.
    pub fn new(
        config: HarnessConfig,
        algorithms: Arc<dyn Factory<dyn Algorithm>>,
        problems: Arc<dyn Factory<dyn Problem>>,
        measurements: Arc<dyn Factory<dyn MeasurementSuite>>,
    ) -> Self {
        let pool = Arc::new(Semaphore::new(config.pool_size));

        Self {
            config,
            algorithms,
            problems,
            measurements,
            replicates: Vec::new(),
            cancel_flags: Arc::new(Mutex::new(Vec::new())),
            progress: Arc::new(ProgressHub::new()),
            pool,
            initialised: false,
        }
    }

    /// Get the harness configuration
    pub fn config(&self) -> &HarnessConfig {
        &self.config
    }

    /// Construct all replicates and their zero-valued progress entries
    ///
    /// Replicates are constructed in deterministic order (sample index
    /// `0..N-1`); execution order is not. A factory failure is fatal and
    /// aborts initialisation.
    pub fn init(&mut self) -> Result<()> {
        if self.initialised {
            return Err(Error::AlreadyInitialised);
        }

        for index in 0..self.config.samples {
            let id = ReplicateId(index);
            let algorithm = self.algorithms.create()?;
            let problem = self.problems.create()?;
            let suite = self.measurements.create()?;
            let cancel = CancelFlag::new();

            self.progress.register(id);
            self.cancel_flags
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .push(cancel.clone());
            self.replicates.push(Replicate::new(
                id,
                algorithm,
                problem,
                suite,
                Arc::clone(&self.progress),
                cancel,
            ));
        }

        self.initialised = true;
        tracing::info!(
            samples = self.config.samples,
            pool_size = self.config.pool_size,
            "Harness initialised"
        );
        Ok(())
    }

    /// Run all replicates to completion and shut down the worker pool
    ///
    /// Submits every constructed replicate to the pool and retrieves
    /// outcomes in completion order. A binding failure is local to its
    /// replicate: it is recorded in the outcomes and its siblings keep
    /// running. Any other replicate failure, and any panicked task, is
    /// fatal: remaining replicates are asked to terminate cooperatively
    /// and the error is returned. The pool accepts no further submissions
    /// once this method returns.
    pub async fn execute(&mut self) -> Result<Vec<ReplicateOutcome>> {
        if !self.initialised {
            return Err(Error::NotInitialised);
        }
        if self.pool.is_closed() {
            return Err(Error::PoolClosed);
        }

        let start = Instant::now();
        let replicates = std::mem::take(&mut self.replicates);
        let total = replicates.len();

        tracing::info!(
            samples = total,
            pool_size = self.config.pool_size,
            "Starting batch"
        );

        let mut tasks = JoinSet::new();
        for replicate in replicates {
            let pool = Arc::clone(&self.pool);
            let id = replicate.id();
            tasks.spawn(async move {
                let _permit = match pool.acquire_owned().await {
                    Ok(permit) => permit,
                    Err(_) => return (id, Err(Error::PoolClosed)),
                };
                (id, replicate.run().await)
            });
        }

        let mut outcomes = Vec::with_capacity(total);
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((id, Ok(stats))) => {
                    tracing::debug!(
                        replicate_id = id.0,
                        iterations = stats.iterations,
                        terminated = stats.terminated,
                        "Replicate completed"
                    );
                    outcomes.push(ReplicateOutcome::Completed(stats));
                }
                Ok((id, Err(error @ Error::Binding { .. }))) => {
                    tracing::warn!(
                        replicate_id = id.0,
                        error = %error,
                        "Replicate failed to bind, continuing with siblings"
                    );
                    outcomes.push(ReplicateOutcome::BindingFailed { id, error });
                }
                Ok((id, Err(error))) => {
                    tracing::error!(
                        replicate_id = id.0,
                        error = %error,
                        "Replicate failed, terminating batch"
                    );
                    return Err(self.abort_batch(tasks, error));
                }
                Err(join_error) if join_error.is_cancelled() => {
                    // The batch stays incomplete; retrieval continues.
                    tracing::warn!(error = %join_error, "Replicate task cancelled mid-batch");
                }
                Err(join_error) => {
                    tracing::error!(error = %join_error, "Replicate task panicked, terminating batch");
                    return Err(self.abort_batch(tasks, Error::Execution(join_error.to_string())));
                }
            }
        }

        self.pool.close();

        let completed = outcomes
            .iter()
            .filter(|o| matches!(o, ReplicateOutcome::Completed(_)))
            .count();
        tracing::info!(
            elapsed_secs = start.elapsed().as_secs_f64(),
            completed,
            bind_failures = outcomes.len() - completed,
            aggregate = self.progress.aggregate(),
            "Batch completed"
        );

        Ok(outcomes)
    }

    /// Run the batch, requesting cooperative termination at the deadline
    ///
    /// The deadline does not preempt running iterations: replicates
    /// observe the request at their next iteration boundary and still
    /// resolve through their *finished* events.
    pub async fn execute_with_timeout(
        &mut self,
        timeout: Duration,
    ) -> Result<Vec<ReplicateOutcome>> {
        let handle = self.termination_handle();

        let timer = tokio::spawn(async move {
            tokio::time::sleep(timeout).await;
            tracing::info!("Batch deadline reached, requesting termination");
            handle.terminate();
        });

        let result = self.execute().await;

        timer.abort();

        result
    }

    /// Request cooperative termination of all constructed replicates
    ///
    /// Sets every replicate's cancellation flag; running replicates
    /// observe it at their next iteration boundary. Does not wait for
    /// replicates to stop and does not alter completion-ordered retrieval.
    pub fn terminate(&self) {
        self.termination_handle().terminate();
    }

    /// Get a handle for requesting termination while `execute` is in flight
    pub fn termination_handle(&self) -> TerminationHandle {
        TerminationHandle {
            flags: Arc::clone(&self.cancel_flags),
        }
    }

    /// Register a progress observer
    ///
    /// Safe to call while `execute` is in flight. Registration is not
    /// deduplicated: the same listener added twice is notified twice per
    /// update.
    pub fn add_progress_listener(&self, listener: Arc<dyn ProgressListener>) {
        self.progress.add_listener(listener);
    }

    /// Remove a previously registered progress observer
    ///
    /// Safe to call while `execute` is in flight.
    pub fn remove_progress_listener(&self, listener: &Arc<dyn ProgressListener>) {
        self.progress.remove_listener(listener);
    }

    /// Current aggregate completion percentage across the registry
    pub fn aggregate(&self) -> f64 {
        self.progress.aggregate()
    }

    /// Terminate siblings, release the remaining tasks, and close the pool
    fn abort_batch(
        &self,
        mut tasks: JoinSet<(ReplicateId, Result<ReplicateStats>)>,
        error: Error,
    ) -> Error {
        self.terminate();
        tasks.detach_all();
        self.pool.close();
        error
    }
}

impl fmt::Debug for Orchestrator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Orchestrator")
            .field("config", &self.config)
            .field("replicates", &self.replicates.len())
            .field("initialised", &self.initialised)
            .finish()
    }
}
