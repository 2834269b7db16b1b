//! Vector distance functions
//!
//! The math helpers are shared with the FindNearest stage.

use crate::document::DocumentBinding;
use crate::expr::{Expr, FunctionKind};
use crate::value::Value;

use super::errors::EvalError;
use super::evaluator::{expect_arity, unsupported, Evaluator};
use super::result::EvalResult;

pub(super) fn evaluate(
    ev: &Evaluator,
    kind: FunctionKind,
    args: &[Expr],
    doc: &dyn DocumentBinding,
) -> EvalResult {
    match kind {
        FunctionKind::VectorLength => dimension(ev, args, doc).into(),
        FunctionKind::CosineDistance
        | FunctionKind::DotProduct
        | FunctionKind::EuclideanDistance
        | FunctionKind::ManhattanDistance => distance(ev, kind, args, doc).into(),
        _ => unsupported(kind),
    }
}

fn dimension(ev: &Evaluator, args: &[Expr], doc: &dyn DocumentBinding) -> Result<Value, EvalError> {
    let kind = FunctionKind::VectorLength;
    expect_arity(kind, args, 1)?;
    let v = ev.vector_arg(kind, &args[0], doc)?;
    i64::try_from(v.len())
        .map(Value::Integer)
        .map_err(|_| EvalError::OutOfRange(kind.name()))
}

fn distance(
    ev: &Evaluator,
    kind: FunctionKind,
    args: &[Expr],
    doc: &dyn DocumentBinding,
) -> Result<Value, EvalError> {
    expect_arity(kind, args, 2)?;
    let a = ev.vector_arg(kind, &args[0], doc)?;
    let b = ev.vector_arg(kind, &args[1], doc)?;

    if a.len() != b.len() {
        return Err(EvalError::invalid_argument(
            kind.name(),
            format!("dimension mismatch: {} vs {}", a.len(), b.len()),
        ));
    }

    let result = match kind {
        FunctionKind::CosineDistance => cosine_distance(&a, &b)
            .ok_or_else(|| EvalError::invalid_argument(kind.name(), "zero-magnitude vector"))?,
        FunctionKind::DotProduct => dot_product(&a, &b),
        FunctionKind::EuclideanDistance => euclidean_distance(&a, &b),
        _ => manhattan_distance(&a, &b),
    };

    if result.is_nan() {
        return Err(EvalError::invalid_argument(kind.name(), "result is NaN"));
    }
    Ok(Value::Double(result))
}

/// `1 - cos(a, b)`. `None` when either vector has zero magnitude.
pub(crate) fn cosine_distance(a: &[f64], b: &[f64]) -> Option<f64> {
    let norm_a = dot_product(a, a).sqrt();
    let norm_b = dot_product(b, b).sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return None;
    }
    Some(1.0 - dot_product(a, b) / (norm_a * norm_b))
}

pub(crate) fn dot_product(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

pub(crate) fn euclidean_distance(a: &[f64], b: &[f64]) -> f64 {
    a.iter()
        .zip(b)
        .map(|(x, y)| (x - y) * (x - y))
        .sum::<f64>()
        .sqrt()
}

pub(crate) fn manhattan_distance(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| (x - y).abs()).sum()
}
