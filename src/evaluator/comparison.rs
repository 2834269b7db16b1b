//! Comparison family
//!
//! These functions never produce an error of their own. An Error operand is
//! propagated; an Absent operand makes the comparison false, except for
//! `neq`, `not_eq_any` and `is_absent`, which are true.

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
        F::Eq | F::Neq | F::Lt | F::Lte | F::Gt | F::Gte => binary(ev, kind, args, doc),
        F::Exists | F::IsAbsent | F::IsNull | F::IsNotNull | F::IsNan | F::IsNotNan => {
            unary(ev, kind, args, doc)
        }
        F::EqAny | F::NotEqAny => membership(ev, kind, args, doc),
        F::ArrayContains => contains_element(ev, args, doc),
        F::ArrayContainsAll | F::ArrayContainsAny => contains_values(ev, kind, args, doc),
        _ => unsupported(kind),
    }
}

fn binary(ev: &Evaluator, kind: FunctionKind, args: &[Expr], doc: &dyn DocumentBinding) -> EvalResult {
    if let Err(e) = expect_arity(kind, args, 2) {
        return e.into();
    }

    let (left, right) = match (ev.evaluate(&args[0], doc), ev.evaluate(&args[1], doc)) {
        (EvalResult::Error(e), _) | (_, EvalResult::Error(e)) => return EvalResult::Error(e),
        (EvalResult::Value(l), EvalResult::Value(r)) => (l, r),
        _ => return EvalResult::boolean(kind == FunctionKind::Neq),
    };

    let ordering = left.compare(&right);
    let result = match kind {
        FunctionKind::Eq => left.equals(&right),
        FunctionKind::Neq => !left.equals(&right),
        FunctionKind::Lt => ordering == Some(Ordering::Less),
        FunctionKind::Lte => matches!(ordering, Some(Ordering::Less | Ordering::Equal)),
        FunctionKind::Gt => ordering == Some(Ordering::Greater),
        FunctionKind::Gte => matches!(ordering, Some(Ordering::Greater | Ordering::Equal)),
        _ => return unsupported(kind),
    };
    EvalResult::boolean(result)
}

fn unary(ev: &Evaluator, kind: FunctionKind, args: &[Expr], doc: &dyn DocumentBinding) -> EvalResult {
    if let Err(e) = expect_arity(kind, args, 1) {
        return e.into();
    }

    let operand = match ev.evaluate(&args[0], doc) {
        EvalResult::Error(e) => return EvalResult::Error(e),
        EvalResult::Absent => return EvalResult::boolean(kind == FunctionKind::IsAbsent),
        EvalResult::Value(v) => v,
    };

    let result = match kind {
        FunctionKind::Exists => true,
        FunctionKind::IsAbsent => false,
        FunctionKind::IsNull => operand.is_null(),
        FunctionKind::IsNotNull => !operand.is_null(),
        FunctionKind::IsNan => operand.is_nan(),
        FunctionKind::IsNotNan => operand.is_number() && !operand.is_nan(),
        _ => return unsupported(kind),
    };
    EvalResult::boolean(result)
}

/// Candidate list of `eq_any` style functions.
///
/// With one candidate argument it must evaluate to an array. With several,
/// each argument is one candidate and absent candidates never match.
/// `Ok(None)` means there is nothing to match against.
fn candidates(
    ev: &Evaluator,
    args: &[Expr],
    doc: &dyn DocumentBinding,
) -> Result<Option<Vec<Value>>, EvalError> {
    if let [single] = args {
        return match ev.evaluate(single, doc) {
            EvalResult::Error(e) => Err(e),
            EvalResult::Value(Value::Array(values)) => Ok(Some(values)),
            _ => Ok(None),
        };
    }

    let mut values = Vec::with_capacity(args.len());
    for arg in args {
        match ev.evaluate(arg, doc) {
            EvalResult::Error(e) => return Err(e),
            EvalResult::Absent => {}
            EvalResult::Value(v) => values.push(v),
        }
    }
    Ok(Some(values))
}

fn membership(
    ev: &Evaluator,
    kind: FunctionKind,
    args: &[Expr],
    doc: &dyn DocumentBinding,
) -> EvalResult {
    if let Err(e) = expect_min_arity(kind, args, 2) {
        return e.into();
    }
    let negated = kind == FunctionKind::NotEqAny;

    let search = ev.evaluate(&args[0], doc);
    let candidates = match candidates(ev, &args[1..], doc) {
        Err(e) => return EvalResult::Error(e),
        Ok(c) => c,
    };

    let search = match search {
        EvalResult::Error(e) => return EvalResult::Error(e),
        EvalResult::Absent => return EvalResult::boolean(negated),
        EvalResult::Value(v) => v,
    };
    let Some(candidates) = candidates else {
        return EvalResult::boolean(negated);
    };

    let found = candidates.iter().any(|c| search.equals(c));
    EvalResult::boolean(found != negated)
}

fn contains_element(ev: &Evaluator, args: &[Expr], doc: &dyn DocumentBinding) -> EvalResult {
    if let Err(e) = expect_arity(FunctionKind::ArrayContains, args, 2) {
        return e.into();
    }

    match (ev.evaluate(&args[0], doc), ev.evaluate(&args[1], doc)) {
        (EvalResult::Error(e), _) | (_, EvalResult::Error(e)) => EvalResult::Error(e),
        (EvalResult::Value(Value::Array(values)), EvalResult::Value(element)) => {
            EvalResult::boolean(values.iter().any(|v| v.equals(&element)))
        }
        _ => EvalResult::boolean(false),
    }
}

fn contains_values(
    ev: &Evaluator,
    kind: FunctionKind,
    args: &[Expr],
    doc: &dyn DocumentBinding,
) -> EvalResult {
    if let Err(e) = expect_min_arity(kind, args, 2) {
        return e.into();
    }

    let array = ev.evaluate(&args[0], doc);
    let wanted = match candidates(ev, &args[1..], doc) {
        Err(e) => return EvalResult::Error(e),
        Ok(w) => w,
    };

    let values = match array {
        EvalResult::Error(e) => return EvalResult::Error(e),
        EvalResult::Value(Value::Array(values)) => values,
        _ => return EvalResult::boolean(false),
    };
    let Some(wanted) = wanted else {
        return EvalResult::boolean(false);
    };

    let contains = |w: &Value| values.iter().any(|v| v.equals(w));
    let result = if kind == FunctionKind::ArrayContainsAll {
        wanted.iter().all(contains)
    } else {
        wanted.iter().any(contains)
    };
    EvalResult::boolean(result)
}
