//! Observable events
//!
//! Every log line the engine writes names one of these events.

use std::fmt;

use super::logger::Severity;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    /// Engine configuration loaded from a file
    ConfigLoaded,
    /// Pipeline construction failed validation
    PipelineRejected,
    /// Scope name for one `execute` call (`_BEGIN` / `_COMPLETE`)
    PipelineExecute,
    /// One stage finished
    StageComplete,
    /// A stage absorbed an evaluation error
    EvaluationError,
    /// A regular expression failed to compile
    InvalidRegex,
}

impl Event {
    pub fn as_str(&self) -> &'static str {
        match self {
            Event::ConfigLoaded => "CONFIG_LOADED",
            Event::PipelineRejected => "PIPELINE_REJECTED",
            Event::PipelineExecute => "PIPELINE_EXECUTE",
            Event::StageComplete => "STAGE_COMPLETE",
            Event::EvaluationError => "EVALUATION_ERROR",
            Event::InvalidRegex => "INVALID_REGEX",
        }
    }

    /// Severity the event is logged at.
    pub fn severity(&self) -> Severity {
        match self {
            Event::ConfigLoaded | Event::PipelineExecute => Severity::Info,
            Event::PipelineRejected | Event::InvalidRegex => Severity::Warn,
            Event::StageComplete | Event::EvaluationError => Severity::Trace,
        }
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
