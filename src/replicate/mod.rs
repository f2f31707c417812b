//! Replicate: one independent trial of an algorithm against a problem
//!
//! A replicate owns exactly one Algorithm, one Problem, and one
//! MeasurementSuite, all supplied at construction. It binds the problem to
//! the algorithm by capability, drives the algorithm one iteration at a
//! time, and forwards lifecycle events to measurement sampling and
//! aggregate progress reporting. Replicates are construct-run-discard: each
//! is run exactly once on a worker task and never reused across trials.
//!
//! The event flow for one replicate:
//!
//! 1. *started* — the measurement suite is initialised
//! 2. *iteration-completed* — at every multiple of the suite's sampling
//!    resolution, the suite samples the algorithm and the replicate reports
//!    its completion percentage
//! 3. *finished* — final sample, final progress report, suite closed

mod executor;
mod monitor;
mod stats;

pub use executor::{Replicate, ReplicateId};
pub(crate) use monitor::TrialMonitor;
pub use stats::ReplicateStats;
