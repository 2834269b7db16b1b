//! Logical and conditional family
//!
//! `and`, `or`, `xor` and `not` work over {True, False, Error}. An absent or
//! non-boolean operand counts as Error. `and` is decided by any False and
//! `or` by any True, whatever the other operands produced.

use std::cmp::Ordering;

use crate::document::DocumentBinding;
use crate::expr::{Expr, FunctionKind};
use crate::value::Value;

use super::errors::EvalError;
use super::evaluator::{expect_arity, expect_min_arity, unsupported, Evaluator};
use super::result::EvalResult;

pub(super) fn evaluate(
    ev: &Evaluator,
    kind: FunctionKind,
    args: &[Expr],
    doc: &dyn DocumentBinding,
) -> EvalResult {
    use FunctionKind as F;

    match kind {
        F::And => dominated(ev, kind, args, doc, false),
        F::Or => dominated(ev, kind, args, doc, true),
        F::Xor => parity(ev, args, doc),
        F::Not => negate(ev, args, doc),
        F::IsError => observe_error(ev, args, doc),
        F::IfError => recover(ev, args, doc),
        F::Cond => conditional(ev, args, doc),
        F::LogicalMaximum => extreme(ev, kind, args, doc, Ordering::Greater),
        F::LogicalMinimum => extreme(ev, kind, args, doc, Ordering::Less),
        _ => unsupported(kind),
    }
}

/// `and` (dominant = false) and `or` (dominant = true).
fn dominated(
    ev: &Evaluator,
    kind: FunctionKind,
    args: &[Expr],
    doc: &dyn DocumentBinding,
    dominant: bool,
) -> EvalResult {
    if let Err(e) = expect_min_arity(kind, args, 1) {
        return e.into();
    }

    let mut first_error: Option<EvalError> = None;
    for arg in args {
        match ev.evaluate(arg, doc).as_logical(kind.name()) {
            Ok(b) if b == dominant => return EvalResult::boolean(dominant),
            Ok(_) => {}
            Err(e) => {
                first_error.get_or_insert(e);
            }
        }
    }

    match first_error {
        Some(e) => e.into(),
        None => EvalResult::boolean(!dominant),
    }
}

fn parity(ev: &Evaluator, args: &[Expr], doc: &dyn DocumentBinding) -> EvalResult {
    if let Err(e) = expect_min_arity(FunctionKind::Xor, args, 1) {
        return e.into();
    }

    let mut result = false;
    for arg in args {
        match ev.evaluate(arg, doc).as_logical("xor") {
            Ok(b) => result ^= b,
            Err(e) => return e.into(),
        }
    }
    EvalResult::boolean(result)
}

fn negate(ev: &Evaluator, args: &[Expr], doc: &dyn DocumentBinding) -> EvalResult {
    if let Err(e) = expect_arity(FunctionKind::Not, args, 1) {
        return e.into();
    }
    match ev.evaluate(&args[0], doc).as_logical("not") {
        Ok(b) => EvalResult::boolean(!b),
        Err(e) => e.into(),
    }
}

fn observe_error(ev: &Evaluator, args: &[Expr], doc: &dyn DocumentBinding) -> EvalResult {
    if let Err(e) = expect_arity(FunctionKind::IsError, args, 1) {
        return e.into();
    }
    EvalResult::boolean(ev.evaluate(&args[0], doc).is_error())
}

fn recover(ev: &Evaluator, args: &[Expr], doc: &dyn DocumentBinding) -> EvalResult {
    if let Err(e) = expect_arity(FunctionKind::IfError, args, 2) {
        return e.into();
    }
    match ev.evaluate(&args[0], doc) {
        EvalResult::Error(_) => ev.evaluate(&args[1], doc),
        other => other,
    }
}

/// `cond(condition, then, otherwise)`. An erroring condition propagates;
/// anything other than `true` selects `otherwise`.
fn conditional(ev: &Evaluator, args: &[Expr], doc: &dyn DocumentBinding) -> EvalResult {
    if let Err(e) = expect_arity(FunctionKind::Cond, args, 3) {
        return e.into();
    }
    match ev.evaluate(&args[0], doc) {
        EvalResult::Error(e) => e.into(),
        c if c.is_true() => ev.evaluate(&args[1], doc),
        _ => ev.evaluate(&args[2], doc),
    }
}

/// Largest or smallest operand under the total order. Absent, Error and
/// Null operands are skipped; with nothing left the result is Null.
fn extreme(
    ev: &Evaluator,
    kind: FunctionKind,
    args: &[Expr],
    doc: &dyn DocumentBinding,
    wanted: Ordering,
) -> EvalResult {
    if let Err(e) = expect_min_arity(kind, args, 1) {
        return e.into();
    }

    let mut best: Option<Value> = None;
    for arg in args {
        let EvalResult::Value(candidate) = ev.evaluate(arg, doc) else {
            continue;
        };
        if candidate.is_null() {
            continue;
        }
        let replace = match &best {
            None => true,
            Some(current) => candidate.total_cmp(current) == wanted,
        };
        if replace {
            best = Some(candidate);
        }
    }

    EvalResult::Value(best.unwrap_or(Value::Null))
}
