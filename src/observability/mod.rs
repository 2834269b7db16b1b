//! Observability for docpipe
//!
//! - Structured JSON logging gated by a severity threshold
//! - Typed events
//! - Relaxed atomic counters
//!
//! Observability is read-only: nothing here influences evaluation results,
//! and a failed log write is ignored.
//!
//! ```ignore
//! use docpipe::observability::{Event, Logger, ObservationScope, Severity};
//!
//! let logger = Logger::new(Severity::Info);
//! let scope = ObservationScope::new(&logger, Event::PipelineExecute);
//! // ... run stages ...
//! scope.complete_with_fields(&[("returned", "42")]);
//! ```

mod events;
mod logger;
mod metrics;
mod scope;

pub use events::Event;
pub use logger::{Logger, Severity};
pub use metrics::{MetricsRegistry, MetricsSnapshot};
pub use scope::{ObservationScope, Timer};

/// Logs `event` at its own severity.
pub fn log_event(logger: &Logger, event: Event, fields: &[(&str, &str)]) {
    logger.log(event.severity(), event.as_str(), fields);
}
