//! Evaluation errors
//!
//! These never escape the engine as `Err`. They travel inside
//! `EvalResult::Error` and are absorbed at stage boundaries.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EvalError {
    #[error("{function}: expected {expected}, got {actual}")]
    TypeMismatch {
        function: &'static str,
        expected: &'static str,
        actual: &'static str,
    },

    #[error("{function}: expected {expected} argument(s), got {actual}")]
    Arity {
        function: &'static str,
        expected: &'static str,
        actual: usize,
    },

    #[error("{0}: operand is absent")]
    AbsentOperand(&'static str),

    #[error("{0}: operand is not a boolean")]
    NotBoolean(&'static str),

    #[error("{0}: integer overflow")]
    Overflow(&'static str),

    #[error("{0}: division by zero")]
    DivisionByZero(&'static str),

    #[error("{0}: result out of range")]
    OutOfRange(&'static str),

    #[error("{function}: {reason}")]
    InvalidArgument {
        function: &'static str,
        reason: String,
    },

    #[error("invalid pattern '{pattern}': {reason}")]
    InvalidPattern { pattern: String, reason: String },
}

impl EvalError {
    pub fn type_mismatch(
        function: &'static str,
        expected: &'static str,
        actual: &'static str,
    ) -> Self {
        EvalError::TypeMismatch {
            function,
            expected,
            actual,
        }
    }

    pub fn arity(function: &'static str, expected: &'static str, actual: usize) -> Self {
        EvalError::Arity {
            function,
            expected,
            actual,
        }
    }

    pub fn invalid_argument(function: &'static str, reason: impl Into<String>) -> Self {
        EvalError::InvalidArgument {
            function,
            reason: reason.into(),
        }
    }
}
