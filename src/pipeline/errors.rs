//! Pipeline construction errors
//!
//! Error codes:
//! - PIPE_DUPLICATE_DOCUMENT (REJECT)
//! - PIPE_EMPTY_DOCUMENTS (REJECT)
//! - PIPE_NON_BOOLEAN_PREDICATE (REJECT)
//! - PIPE_INVALID_STAGE_ORDER (REJECT)
//! - PIPE_INVALID_ARGUMENT (REJECT)
//!
//! Execution itself never fails; these are raised before any document is
//! evaluated.

use std::fmt;

/// Severity levels for pipeline errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Pipeline rejected, caller must fix the query
    Reject,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Reject => write!(f, "REJECT"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineErrorCode {
    /// `Documents` names the same document twice
    DuplicateDocument,
    /// `Documents` with no references
    EmptyDocuments,
    /// A value function where a predicate is required
    NonBooleanPredicate,
    /// Missing leading source stage, or a source after position 0
    InvalidStageOrder,
    /// Malformed stage argument
    InvalidArgument,
}

impl PipelineErrorCode {
    pub fn code(&self) -> &'static str {
        match self {
            PipelineErrorCode::DuplicateDocument => "PIPE_DUPLICATE_DOCUMENT",
            PipelineErrorCode::EmptyDocuments => "PIPE_EMPTY_DOCUMENTS",
            PipelineErrorCode::NonBooleanPredicate => "PIPE_NON_BOOLEAN_PREDICATE",
            PipelineErrorCode::InvalidStageOrder => "PIPE_INVALID_STAGE_ORDER",
            PipelineErrorCode::InvalidArgument => "PIPE_INVALID_ARGUMENT",
        }
    }

    pub fn severity(&self) -> Severity {
        Severity::Reject
    }
}

impl fmt::Display for PipelineErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Pipeline construction error with context
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineError {
    code: PipelineErrorCode,
    message: String,
    /// Offending stage position, when known
    stage_index: Option<usize>,
}

impl PipelineError {
    pub fn duplicate_document(path: impl Into<String>) -> Self {
        Self {
            code: PipelineErrorCode::DuplicateDocument,
            message: format!("Document '{}' is referenced more than once", path.into()),
            stage_index: None,
        }
    }

    pub fn empty_documents() -> Self {
        Self {
            code: PipelineErrorCode::EmptyDocuments,
            message: "Documents stage requires at least one reference".into(),
            stage_index: None,
        }
    }

    pub fn non_boolean_predicate(function: impl Into<String>) -> Self {
        Self {
            code: PipelineErrorCode::NonBooleanPredicate,
            message: format!("'{}' is not a boolean expression", function.into()),
            stage_index: None,
        }
    }

    pub fn invalid_stage_order(reason: impl Into<String>) -> Self {
        Self {
            code: PipelineErrorCode::InvalidStageOrder,
            message: reason.into(),
            stage_index: None,
        }
    }

    pub fn invalid_argument(reason: impl Into<String>) -> Self {
        Self {
            code: PipelineErrorCode::InvalidArgument,
            message: reason.into(),
            stage_index: None,
        }
    }

    /// Attaches the position of the offending stage.
    pub fn at_stage(mut self, index: usize) -> Self {
        self.stage_index = Some(index);
        self
    }

    pub fn code(&self) -> PipelineErrorCode {
        self.code
    }

    pub fn severity(&self) -> Severity {
        self.code.severity()
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn stage_index(&self) -> Option<usize> {
        self.stage_index
    }
}

impl fmt::Display for PipelineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {}: {}",
            self.code.severity(),
            self.code.code(),
            self.message
        )?;
        if let Some(index) = self.stage_index {
            write!(f, " [stage {}]", index)?;
        }
        Ok(())
    }
}

impl std::error::Error for PipelineError {}

pub type PipelineResult<T> = Result<T, PipelineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(
            PipelineErrorCode::DuplicateDocument.code(),
            "PIPE_DUPLICATE_DOCUMENT"
        );
        assert_eq!(PipelineErrorCode::EmptyDocuments.code(), "PIPE_EMPTY_DOCUMENTS");
        assert_eq!(
            PipelineErrorCode::NonBooleanPredicate.code(),
            "PIPE_NON_BOOLEAN_PREDICATE"
        );
        assert_eq!(
            PipelineErrorCode::InvalidStageOrder.code(),
            "PIPE_INVALID_STAGE_ORDER"
        );
        assert_eq!(PipelineErrorCode::InvalidArgument.code(), "PIPE_INVALID_ARGUMENT");
    }

    #[test]
    fn test_all_reject() {
        assert_eq!(PipelineError::empty_documents().severity(), Severity::Reject);
        assert_eq!(Severity::Reject.to_string(), "REJECT");
    }

    #[test]
    fn test_error_display() {
        let err = PipelineError::duplicate_document("ref/1").at_stage(0);
        let display = err.to_string();
        assert!(display.starts_with("[REJECT] PIPE_DUPLICATE_DOCUMENT"));
        assert!(display.contains("ref/1"));
        assert!(display.ends_with("[stage 0]"));
    }
}
