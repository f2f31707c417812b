//! Orchestrator for batch lifecycle management
//!
//! The Orchestrator coordinates a complete batch of replicates:
//! - Constructing replicates from the capability factories
//! - Submitting them to a bounded worker pool
//! - Retrieving outcomes in completion order
//! - Aggregating per-replicate progress and notifying observers
//! - Cooperative termination and worker-pool shutdown
//!
//! # Example
//!
//! ```ignore
//! use optbench_core::OrchestratorBuilder;
//!
//! let mut orchestrator = OrchestratorBuilder::new()
//!     .samples(30)
//!     .pool_size(8)
//!     .algorithm_factory(algorithms)
//!     .problem_factory(problems)
//!     .measurement_factory(measurements)
//!     .build()?;
//!
//! orchestrator.init()?;
//! orchestrator.add_progress_listener(listener);
//! let outcomes = orchestrator.execute().await?;
//! ```

mod aggregator;
mod builder;
mod executor;

pub(crate) use aggregator::ProgressHub;
pub use builder::OrchestratorBuilder;
pub use executor::{Orchestrator, ReplicateOutcome, TerminationHandle};
