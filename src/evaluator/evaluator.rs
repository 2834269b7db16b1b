//! Expression evaluator
//!
//! Evaluates an `Expr` against one document binding and yields an
//! `EvalResult`. Evaluation is pure: the only state is the compiled pattern
//! cache, which never changes results.

use std::rc::Rc;

use crate::config::EngineConfig;
use crate::document::{DocumentBinding, DocumentKey};
use crate::expr::{BooleanExpr, Expr, FunctionKind};
use crate::observability::{log_event, Event, Logger};
use crate::value::{MapValue, Timestamp, Value};

use super::errors::EvalError;
use super::pattern::{CompiledPattern, PatternCache, PatternKind};
use super::result::EvalResult;
use super::{arithmetic, collection, comparison, logical, string, timestamp, vector};

/// Evaluates expressions for one pipeline execution.
///
/// Not `Sync`: each execution builds its own evaluator.
#[derive(Debug)]
pub struct Evaluator {
    logger: Logger,
    patterns: PatternCache,
}

impl Evaluator {
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            logger: config.logger(),
            patterns: PatternCache::new(config.regex_size_limit),
        }
    }

    pub fn evaluate(&self, expr: &Expr, doc: &dyn DocumentBinding) -> EvalResult {
        match expr {
            Expr::Field(path) => doc
                .lookup(path)
                .map_or(EvalResult::Absent, EvalResult::Value),
            Expr::Constant(value) => EvalResult::Value(value.clone()),
            Expr::Function(f) => self.call(f.kind, &f.args, doc),
            Expr::Boolean(b) => self.call(b.kind(), b.args(), doc),
            Expr::List(items) => self.evaluate_list(items, doc),
        }
    }

    pub fn evaluate_predicate(&self, predicate: &BooleanExpr, doc: &dyn DocumentBinding) -> EvalResult {
        self.call(predicate.kind(), predicate.args(), doc)
    }

    fn call(&self, kind: FunctionKind, args: &[Expr], doc: &dyn DocumentBinding) -> EvalResult {
        use FunctionKind as F;

        match kind {
            F::Eq
            | F::Neq
            | F::Lt
            | F::Lte
            | F::Gt
            | F::Gte
            | F::EqAny
            | F::NotEqAny
            | F::Exists
            | F::IsAbsent
            | F::IsNull
            | F::IsNotNull
            | F::IsNan
            | F::IsNotNan
            | F::ArrayContains
            | F::ArrayContainsAll
            | F::ArrayContainsAny => comparison::evaluate(self, kind, args, doc),

            F::And
            | F::Or
            | F::Xor
            | F::Not
            | F::IsError
            | F::IfError
            | F::Cond
            | F::LogicalMaximum
            | F::LogicalMinimum => logical::evaluate(self, kind, args, doc),

            F::Add | F::Subtract | F::Multiply | F::Divide | F::Mod => {
                arithmetic::evaluate(self, kind, args, doc)
            }

            F::CharLength
            | F::ByteLength
            | F::ToLower
            | F::ToUpper
            | F::Trim
            | F::Reverse
            | F::StrConcat
            | F::Substr
            | F::ReplaceFirst
            | F::ReplaceAll
            | F::StrContains
            | F::StartsWith
            | F::EndsWith
            | F::Like
            | F::RegexContains
            | F::RegexMatch => string::evaluate(self, kind, args, doc),

            F::ArrayLength
            | F::ArrayReverse
            | F::ArrayConcat
            | F::ArrayGet
            | F::Map
            | F::MapGet
            | F::MapMerge
            | F::MapRemove => collection::evaluate(self, kind, args, doc),

            F::CosineDistance
            | F::DotProduct
            | F::EuclideanDistance
            | F::ManhattanDistance
            | F::VectorLength => vector::evaluate(self, kind, args, doc),

            F::UnixMicrosToTimestamp
            | F::UnixMillisToTimestamp
            | F::UnixSecondsToTimestamp
            | F::TimestampToUnixMicros
            | F::TimestampToUnixMillis
            | F::TimestampToUnixSeconds
            | F::TimestampAdd
            | F::TimestampSub => timestamp::evaluate(self, kind, args, doc),

            F::DocumentId => self.document_id(args, doc).into(),
        }
    }

    /// Every element must evaluate to a value.
    fn evaluate_list(&self, items: &[Expr], doc: &dyn DocumentBinding) -> EvalResult {
        let mut values = Vec::with_capacity(items.len());
        for item in items {
            match self.evaluate(item, doc) {
                EvalResult::Value(v) => values.push(v),
                EvalResult::Absent => return EvalError::AbsentOperand("list").into(),
                EvalResult::Error(e) => return e.into(),
            }
        }
        EvalResult::Value(Value::Array(values))
    }

    fn document_id(&self, args: &[Expr], doc: &dyn DocumentBinding) -> Result<Value, EvalError> {
        expect_arity(FunctionKind::DocumentId, args, 1)?;
        let key = self.reference_arg(FunctionKind::DocumentId, &args[0], doc)?;
        Ok(Value::String(key.document_id().to_string()))
    }

    /// Fetches a compiled pattern, logging a compile failure the first time
    /// it is seen.
    pub(super) fn pattern(
        &self,
        kind: PatternKind,
        pattern: &str,
    ) -> Result<Rc<CompiledPattern>, EvalError> {
        let (compiled, fresh) = self.patterns.get(kind, pattern);
        compiled.map_err(|reason| {
            if fresh {
                log_event(
                    &self.logger,
                    Event::InvalidRegex,
                    &[("pattern", pattern), ("reason", reason.as_str())],
                );
            }
            EvalError::InvalidPattern {
                pattern: pattern.to_string(),
                reason,
            }
        })
    }

    // ==================================================================
    // Argument helpers
    // ==================================================================

    /// Evaluates an operand that must be present.
    pub(super) fn operand(
        &self,
        kind: FunctionKind,
        expr: &Expr,
        doc: &dyn DocumentBinding,
    ) -> Result<Value, EvalError> {
        self.evaluate(expr, doc).into_operand(kind.name())
    }

    pub(super) fn string_arg(
        &self,
        kind: FunctionKind,
        expr: &Expr,
        doc: &dyn DocumentBinding,
    ) -> Result<String, EvalError> {
        match self.operand(kind, expr, doc)? {
            Value::String(s) => Ok(s),
            other => Err(mismatch(kind, "string", &other)),
        }
    }

    pub(super) fn integer_arg(
        &self,
        kind: FunctionKind,
        expr: &Expr,
        doc: &dyn DocumentBinding,
    ) -> Result<i64, EvalError> {
        match self.operand(kind, expr, doc)? {
            Value::Integer(i) => Ok(i),
            other => Err(mismatch(kind, "integer", &other)),
        }
    }

    pub(super) fn array_arg(
        &self,
        kind: FunctionKind,
        expr: &Expr,
        doc: &dyn DocumentBinding,
    ) -> Result<Vec<Value>, EvalError> {
        match self.operand(kind, expr, doc)? {
            Value::Array(values) => Ok(values),
            other => Err(mismatch(kind, "array", &other)),
        }
    }

    pub(super) fn map_arg(
        &self,
        kind: FunctionKind,
        expr: &Expr,
        doc: &dyn DocumentBinding,
    ) -> Result<MapValue, EvalError> {
        let value = self.operand(kind, expr, doc)?;
        match value.map_entries() {
            Some(map) => Ok(map.into_owned()),
            None => Err(mismatch(kind, "map", &value)),
        }
    }

    pub(super) fn vector_arg(
        &self,
        kind: FunctionKind,
        expr: &Expr,
        doc: &dyn DocumentBinding,
    ) -> Result<Vec<f64>, EvalError> {
        match self.operand(kind, expr, doc)? {
            Value::Vector(v) => Ok(v),
            other => Err(mismatch(kind, "vector", &other)),
        }
    }

    pub(super) fn timestamp_arg(
        &self,
        kind: FunctionKind,
        expr: &Expr,
        doc: &dyn DocumentBinding,
    ) -> Result<Timestamp, EvalError> {
        match self.operand(kind, expr, doc)? {
            Value::Timestamp(ts) => Ok(ts),
            other => Err(mismatch(kind, "timestamp", &other)),
        }
    }

    fn reference_arg(
        &self,
        kind: FunctionKind,
        expr: &Expr,
        doc: &dyn DocumentBinding,
    ) -> Result<DocumentKey, EvalError> {
        match self.operand(kind, expr, doc)? {
            Value::Reference(key) => Ok(key),
            other => Err(mismatch(kind, "reference", &other)),
        }
    }
}

pub(super) fn mismatch(kind: FunctionKind, expected: &'static str, actual: &Value) -> EvalError {
    EvalError::type_mismatch(kind.name(), expected, actual.type_name())
}

pub(super) fn expect_arity(kind: FunctionKind, args: &[Expr], n: usize) -> Result<(), EvalError> {
    if args.len() == n {
        return Ok(());
    }
    let expected = match n {
        0 => "0",
        1 => "1",
        2 => "2",
        3 => "3",
        _ => "a fixed number of",
    };
    Err(EvalError::arity(kind.name(), expected, args.len()))
}

pub(super) fn expect_min_arity(kind: FunctionKind, args: &[Expr], n: usize) -> Result<(), EvalError> {
    if args.len() >= n {
        return Ok(());
    }
    let expected = match n {
        1 => "at least 1",
        2 => "at least 2",
        _ => "more",
    };
    Err(EvalError::arity(kind.name(), expected, args.len()))
}

/// Error for a kind routed to a family that does not implement it.
pub(super) fn unsupported(kind: FunctionKind) -> EvalResult {
    EvalError::invalid_argument(kind.name(), "not supported by this function family").into()
}
