//! Arithmetic family
//!
//! Integer operands use checked i64 arithmetic. As soon as either side of an
//! operation is a Double the operation is carried out in IEEE doubles.

use crate::document::DocumentBinding;
use crate::expr::{Expr, FunctionKind};
use crate::value::Value;

use super::errors::EvalError;
use super::evaluator::{expect_arity, expect_min_arity, mismatch, unsupported, Evaluator};
use super::result::EvalResult;

#[derive(Debug, Clone, Copy, PartialEq)]
enum Number {
    Int(i64),
    Double(f64),
}

impl Number {
    fn from_value(kind: FunctionKind, value: &Value) -> Result<Self, EvalError> {
        match value {
            Value::Integer(i) => Ok(Number::Int(*i)),
            Value::Double(d) => Ok(Number::Double(*d)),
            other => Err(mismatch(kind, "number", other)),
        }
    }

    fn as_f64(self) -> f64 {
        match self {
            Number::Int(i) => i as f64,
            Number::Double(d) => d,
        }
    }

    fn into_value(self) -> Value {
        match self {
            Number::Int(i) => Value::Integer(i),
            Number::Double(d) => Value::Double(d),
        }
    }
}

pub(super) fn evaluate(
    ev: &Evaluator,
    kind: FunctionKind,
    args: &[Expr],
    doc: &dyn DocumentBinding,
) -> EvalResult {
    match kind {
        FunctionKind::Add | FunctionKind::Multiply => fold(ev, kind, args, doc).into(),
        FunctionKind::Subtract | FunctionKind::Divide | FunctionKind::Mod => {
            binary(ev, kind, args, doc).into()
        }
        _ => unsupported(kind),
    }
}

fn number_arg(
    ev: &Evaluator,
    kind: FunctionKind,
    expr: &Expr,
    doc: &dyn DocumentBinding,
) -> Result<Number, EvalError> {
    let value = ev.operand(kind, expr, doc)?;
    Number::from_value(kind, &value)
}

fn fold(
    ev: &Evaluator,
    kind: FunctionKind,
    args: &[Expr],
    doc: &dyn DocumentBinding,
) -> Result<Value, EvalError> {
    expect_min_arity(kind, args, 2)?;

    let mut acc = number_arg(ev, kind, &args[0], doc)?;
    for arg in &args[1..] {
        let next = number_arg(ev, kind, arg, doc)?;
        acc = apply(kind, acc, next)?;
    }
    Ok(acc.into_value())
}

fn binary(
    ev: &Evaluator,
    kind: FunctionKind,
    args: &[Expr],
    doc: &dyn DocumentBinding,
) -> Result<Value, EvalError> {
    expect_arity(kind, args, 2)?;
    let left = number_arg(ev, kind, &args[0], doc)?;
    let right = number_arg(ev, kind, &args[1], doc)?;
    apply(kind, left, right).map(Number::into_value)
}

fn apply(kind: FunctionKind, left: Number, right: Number) -> Result<Number, EvalError> {
    match (left, right) {
        (Number::Int(l), Number::Int(r)) => integer_op(kind, l, r).map(Number::Int),
        _ => double_op(kind, left.as_f64(), right.as_f64()).map(Number::Double),
    }
}

fn integer_op(kind: FunctionKind, l: i64, r: i64) -> Result<i64, EvalError> {
    let name = kind.name();
    let result = match kind {
        FunctionKind::Add => l.checked_add(r),
        FunctionKind::Subtract => l.checked_sub(r),
        FunctionKind::Multiply => l.checked_mul(r),
        FunctionKind::Divide => {
            if r == 0 {
                return Err(EvalError::DivisionByZero(name));
            }
            l.checked_div(r)
        }
        FunctionKind::Mod => {
            if r == 0 {
                return Err(EvalError::DivisionByZero(name));
            }
            // i64::MIN % -1 is mathematically 0
            Some(l.wrapping_rem(r))
        }
        _ => return Err(EvalError::invalid_argument(name, "not an arithmetic function")),
    };
    result.ok_or(EvalError::Overflow(name))
}

fn double_op(kind: FunctionKind, l: f64, r: f64) -> Result<f64, EvalError> {
    match kind {
        FunctionKind::Add => Ok(l + r),
        FunctionKind::Subtract => Ok(l - r),
        FunctionKind::Multiply => Ok(l * r),
        FunctionKind::Divide => Ok(l / r),
        FunctionKind::Mod if r == 0.0 => Err(EvalError::DivisionByZero(kind.name())),
        FunctionKind::Mod => Ok(l % r),
        _ => Err(EvalError::invalid_argument(kind.name(), "not an arithmetic function")),
    }
}
