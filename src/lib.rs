//! optbench-core: parallel execution harness for stochastic optimization trials
//!
//! This crate runs many independent trials ("replicates") of an optimization
//! algorithm against a problem instance in parallel, collects periodic
//! measurements from each, and reports aggregate completion progress to
//! registered observers. It provides:
//!
//! - Capability traits for algorithms, problems, measurement suites, and
//!   the factories that produce them
//! - Replicate lifecycle management (bind, drive, measure, finish)
//! - Orchestration over a bounded worker pool with completion-ordered
//!   result retrieval
//! - Cooperative cancellation and aggregate progress fan-out
//!
//! # Example
//!
//! ```ignore
//! use optbench_core::{Orchestrator, OrchestratorBuilder};
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
//! let outcomes = orchestrator.execute().await?;
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod cancel;
pub mod config;
pub mod error;
pub mod orchestrator;
pub mod replicate;
pub mod traits;

pub use cancel::CancelFlag;
pub use config::*;
pub use error::*;
pub use orchestrator::{Orchestrator, OrchestratorBuilder, ReplicateOutcome, TerminationHandle};
pub use replicate::{Replicate, ReplicateId, ReplicateStats};
pub use traits::*;
