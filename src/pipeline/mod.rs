//! Pipeline stages, construction and execution
//!
//! A pipeline is an ordered stage list that starts with exactly one source
//! stage. Construction validates the list and is the only place a
//! `PipelineError` is raised. Execution threads a document snapshot through
//! the stages and never fails: evaluation errors are absorbed per document
//! and counted in the `ExecutionResult`.
//!
//! ```ignore
//! use docpipe::expr::builder::*;
//! use docpipe::pipeline::{Pipeline, PipelineExecutor};
//!
//! let pipeline = Pipeline::collection("users")
//!     .where_(gt(field("score"), 80))
//!     .sort([field("score").descending()])
//!     .limit(10)
//!     .build()?;
//! let result = PipelineExecutor::new(&config).execute(&pipeline, documents);
//! ```

mod aggregate;
mod errors;
mod executor;
mod filters;
mod nearest;
#[allow(clippy::module_inception)]
mod pipeline;
mod projection;
mod result;
mod sorter;
mod stage;

pub use errors::{PipelineError, PipelineErrorCode, PipelineResult, Severity as PipelineSeverity};
pub use executor::PipelineExecutor;
pub use filters::SourceFilter;
pub use pipeline::{Pipeline, PipelineBuilder};
pub use result::{ExecutionResult, PipelineDocument};
pub use stage::{DistanceMeasure, FindNearestSpec, Stage};
