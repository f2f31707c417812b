//! Core capability traits for algorithms, problems, and measurement
//!
//! These traits are the narrow seams through which the harness consumes its
//! external collaborators. Implementations live outside this crate; the
//! test suite provides deterministic mocks.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::Result;

// ============================================================================
// Problem capability
// ============================================================================

/// Closed set of problem capabilities used for algorithm/problem binding
///
/// A problem declares exactly one capability; an algorithm declares the set
/// it accepts. Binding is a membership check over this enum, decided when
/// the implementations are written rather than by runtime type inspection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProblemCapability {
    /// Continuous-domain optimization problems
    Continuous,
    /// Discrete and combinatorial problems
    Discrete,
    /// Problems with multiple competing objectives
    MultiObjective,
}

impl fmt::Display for ProblemCapability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ProblemCapability::Continuous => "continuous",
            ProblemCapability::Discrete => "discrete",
            ProblemCapability::MultiObjective => "multi_objective",
        };
        f.write_str(name)
    }
}

/// A problem instance bound to an algorithm before execution
pub trait Problem: Send {
    /// Problem type name, used in diagnostics and binding errors
    fn name(&self) -> &str;

    /// The capability this problem declares
    fn capability(&self) -> ProblemCapability;
}

// ============================================================================
// Algorithm
// ============================================================================

/// An optimization algorithm driven one iteration at a time
///
/// The harness owns the drive loop: it installs the bound problem, calls
/// [`initialise`](Algorithm::initialise) once, then advances the algorithm
/// with [`step`](Algorithm::step) until [`is_complete`](Algorithm::is_complete)
/// reports that the termination criterion has been met or cooperative
/// cancellation is requested.
pub trait Algorithm: Send {
    /// Algorithm type name, used in diagnostics and binding errors
    fn name(&self) -> &str;

    /// The problem capabilities this algorithm can bind
    fn accepted_capabilities(&self) -> &[ProblemCapability];

    /// Install the bound problem
    ///
    /// Called at most once, after the harness has checked the problem's
    /// capability against
    /// [`accepted_capabilities`](Algorithm::accepted_capabilities).
    fn install_problem(&mut self, problem: Box<dyn Problem>);

    /// Prepare internal state before the first iteration
    fn initialise(&mut self);

    /// Advance the algorithm by exactly one iteration
    fn step(&mut self);

    /// Whether the algorithm's termination criterion has been met
    fn is_complete(&self) -> bool;

    /// Number of iterations completed so far
    fn iterations(&self) -> u64;

    /// Completion percentage in `[0, 100]`
    fn percentage_complete(&self) -> f64;
}

// ============================================================================
// Lifecycle listener
// ============================================================================

/// Receiver for a replicate's algorithm lifecycle events
///
/// For a single replicate the events are strictly ordered: `on_started`
/// once before the first iteration, `on_iteration_completed` once per
/// iteration, then `on_finished` exactly once — also when the run is cut
/// short by cooperative cancellation.
pub trait LifecycleListener {
    /// The algorithm is about to run its first iteration
    fn on_started(&mut self, algorithm: &dyn Algorithm) -> Result<()>;

    /// One iteration has completed
    fn on_iteration_completed(&mut self, algorithm: &dyn Algorithm) -> Result<()>;

    /// The run has ended, by natural completion or cancellation
    fn on_finished(&mut self, algorithm: &dyn Algorithm) -> Result<()>;
}

// ============================================================================
// Measurement suite
// ============================================================================

/// Periodic performance measurement attached to one replicate
///
/// Sampled against the running algorithm every
/// [`resolution`](MeasurementSuite::resolution) iterations, plus a final
/// sample when the run finishes.
pub trait MeasurementSuite: Send {
    /// Create any buffering or storage the suite needs
    fn initialise(&mut self) -> std::result::Result<(), MeasurementError>;

    /// Sampling period in iterations; must be positive
    fn resolution(&self) -> u64;

    /// Sample the algorithm's current state
    fn measure(&mut self, algorithm: &dyn Algorithm);

    /// Release any resources held by the suite
    fn close(&mut self) -> std::result::Result<(), MeasurementError>;
}

/// Measurement-suite errors
#[derive(Debug, thiserror::Error)]
pub enum MeasurementError {
    /// Storage or buffering could not be created
    #[error("failed to initialise measurement storage: {0}")]
    Init(String),

    /// The declared sampling resolution is not positive
    #[error("sampling resolution must be positive")]
    InvalidResolution,

    /// Resource release failed while closing the suite
    #[error("failed to close measurement suite: {source}")]
    Close {
        /// Underlying cause
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

// ============================================================================
// Factories
// ============================================================================

/// Produces a fresh, independent instance on every call
///
/// Replicates must not share mutable algorithm or problem state, so every
/// `create` call has to return a new instance. Any `Fn() -> Result<Box<T>,
/// FactoryError>` closure is a factory.
pub trait Factory<T: ?Sized>: Send + Sync {
    /// Create a new instance
    fn create(&self) -> std::result::Result<Box<T>, FactoryError>;
}

impl<T, F> Factory<T> for F
where
    T: ?Sized,
    F: Fn() -> std::result::Result<Box<T>, FactoryError> + Send + Sync,
{
    fn create(&self) -> std::result::Result<Box<T>, FactoryError> {
        self()
    }
}

/// Factory failure
///
/// Never silent: a factory failure is fatal to orchestrator initialisation.
#[derive(Debug, thiserror::Error)]
#[error("failed to create instance: {0}")]
pub struct FactoryError(pub String);

// ============================================================================
// Progress listener
// ============================================================================

/// Observer of aggregate completion progress
///
/// Notified synchronously from whichever worker task reported progress,
/// inside the registry's critical section; implementations should return
/// quickly.
pub trait ProgressListener: Send + Sync {
    /// Receive a new aggregate completion percentage in `[0, 100]`
    fn on_progress(&self, aggregate: f64);
}
