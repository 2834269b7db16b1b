//! docpipe - A deterministic local evaluator for document-database query pipelines
//!
//! Values, expressions and an in-memory pipeline executor. No storage,
//! network or index access: callers hand in a document snapshot and get the
//! surviving documents back in order.

pub mod config;
pub mod document;
pub mod evaluator;
pub mod expr;
pub mod observability;
pub mod pipeline;
pub mod value;

pub use config::{ConfigError, EngineConfig};
pub use document::{Document, DocumentKey, FieldPath};
pub use evaluator::{EvalError, EvalResult, Evaluator};
pub use pipeline::{ExecutionResult, Pipeline, PipelineError, PipelineExecutor};
pub use value::{Timestamp, Value};
