//! Evaluation results

use crate::value::Value;

use super::errors::EvalError;

/// Outcome of evaluating an expression against one document.
///
/// `Absent` and `Error` are distinct from every value, including `Null`.
#[derive(Debug, Clone, PartialEq)]
pub enum EvalResult {
    Value(Value),
    Absent,
    Error(EvalError),
}

impl EvalResult {
    pub fn boolean(b: bool) -> Self {
        EvalResult::Value(Value::Boolean(b))
    }

    pub fn null() -> Self {
        EvalResult::Value(Value::Null)
    }

    /// True only for the boolean value `true`.
    pub fn is_true(&self) -> bool {
        matches!(self, EvalResult::Value(Value::Boolean(true)))
    }

    pub fn is_false(&self) -> bool {
        matches!(self, EvalResult::Value(Value::Boolean(false)))
    }

    pub fn is_absent(&self) -> bool {
        matches!(self, EvalResult::Absent)
    }

    pub fn is_error(&self) -> bool {
        matches!(self, EvalResult::Error(_))
    }

    pub fn value(&self) -> Option<&Value> {
        match self {
            EvalResult::Value(v) => Some(v),
            _ => None,
        }
    }

    pub fn into_value(self) -> Option<Value> {
        match self {
            EvalResult::Value(v) => Some(v),
            _ => None,
        }
    }

    /// Value of an operand that must be present.
    pub(crate) fn into_operand(self, function: &'static str) -> Result<Value, EvalError> {
        match self {
            EvalResult::Value(v) => Ok(v),
            EvalResult::Absent => Err(EvalError::AbsentOperand(function)),
            EvalResult::Error(e) => Err(e),
        }
    }

    /// Boolean of a logical operand. Absent and non-boolean values are errors.
    pub(crate) fn as_logical(&self, function: &'static str) -> Result<bool, EvalError> {
        match self {
            EvalResult::Value(Value::Boolean(b)) => Ok(*b),
            EvalResult::Error(e) => Err(e.clone()),
            _ => Err(EvalError::NotBoolean(function)),
        }
    }
}

impl From<Value> for EvalResult {
    fn from(value: Value) -> Self {
        EvalResult::Value(value)
    }
}

impl From<EvalError> for EvalResult {
    fn from(error: EvalError) -> Self {
        EvalResult::Error(error)
    }
}

impl From<Result<Value, EvalError>> for EvalResult {
    fn from(result: Result<Value, EvalError>) -> Self {
        match result {
            Ok(value) => EvalResult::Value(value),
            Err(error) => EvalResult::Error(error),
        }
    }
}
