//! String family
//!
//! Lengths, positions and reversal work on Unicode code points.

use crate::document::DocumentBinding;
use crate::expr::{Expr, FunctionKind};
use crate::value::Value;

use super::errors::EvalError;
use super::evaluator::{expect_arity, expect_min_arity, mismatch, unsupported, Evaluator};
use super::pattern::PatternKind;
use super::result::EvalResult;

pub(super) fn evaluate(
    ev: &Evaluator,
    kind: FunctionKind,
    args: &[Expr],
    doc: &dyn DocumentBinding,
) -> EvalResult {
    use FunctionKind as F;

    let result = match kind {
        F::CharLength | F::ByteLength => length(ev, kind, args, doc),
        F::ToLower | F::ToUpper | F::Trim | F::Reverse => transform(ev, kind, args, doc),
        F::StrConcat => concat(ev, args, doc),
        F::Substr => substr(ev, args, doc),
        F::ReplaceFirst | F::ReplaceAll => replace(ev, kind, args, doc),
        F::StrContains | F::StartsWith | F::EndsWith => search(ev, kind, args, doc),
        F::Like => matches_pattern(ev, kind, PatternKind::Like, args, doc),
        F::RegexContains => matches_pattern(ev, kind, PatternKind::Search, args, doc),
        F::RegexMatch => matches_pattern(ev, kind, PatternKind::FullMatch, args, doc),
        _ => return unsupported(kind),
    };
    result.into()
}

fn length(
    ev: &Evaluator,
    kind: FunctionKind,
    args: &[Expr],
    doc: &dyn DocumentBinding,
) -> Result<Value, EvalError> {
    expect_arity(kind, args, 1)?;

    let len = match (kind, ev.operand(kind, &args[0], doc)?) {
        (_, Value::Null) => return Ok(Value::Null),
        (FunctionKind::CharLength, Value::String(s)) => s.chars().count(),
        (FunctionKind::ByteLength, Value::String(s)) => s.len(),
        (FunctionKind::ByteLength, Value::Bytes(b)) => b.len(),
        (_, other) => return Err(mismatch(kind, "string", &other)),
    };
    i64::try_from(len)
        .map(Value::Integer)
        .map_err(|_| EvalError::OutOfRange(kind.name()))
}

fn transform(
    ev: &Evaluator,
    kind: FunctionKind,
    args: &[Expr],
    doc: &dyn DocumentBinding,
) -> Result<Value, EvalError> {
    expect_arity(kind, args, 1)?;
    let s = ev.string_arg(kind, &args[0], doc)?;

    let out = match kind {
        FunctionKind::ToLower => s.to_lowercase(),
        FunctionKind::ToUpper => s.to_uppercase(),
        FunctionKind::Trim => s.trim().to_string(),
        _ => s.chars().rev().collect(),
    };
    Ok(Value::String(out))
}

fn concat(ev: &Evaluator, args: &[Expr], doc: &dyn DocumentBinding) -> Result<Value, EvalError> {
    expect_min_arity(FunctionKind::StrConcat, args, 1)?;

    let mut out = String::new();
    for arg in args {
        out.push_str(&ev.string_arg(FunctionKind::StrConcat, arg, doc)?);
    }
    Ok(Value::String(out))
}

/// `substr(s, position[, length])`
fn substr(ev: &Evaluator, args: &[Expr], doc: &dyn DocumentBinding) -> Result<Value, EvalError> {
    let kind = FunctionKind::Substr;
    if args.len() != 2 && args.len() != 3 {
        return Err(EvalError::arity(kind.name(), "2 or 3", args.len()));
    }

    let s = ev.string_arg(kind, &args[0], doc)?;
    let position = ev.integer_arg(kind, &args[1], doc)?;
    let length = match args.get(2) {
        Some(arg) => Some(ev.integer_arg(kind, arg, doc)?),
        None => None,
    };

    let chars: Vec<char> = s.chars().collect();
    let total = chars.len() as i64;

    let start = if position < 0 {
        total.saturating_add(position).max(0)
    } else {
        position.min(total)
    };
    let end = match length {
        Some(n) if n < 0 => {
            return Err(EvalError::invalid_argument(kind.name(), "length must not be negative"));
        }
        Some(n) => start.saturating_add(n).min(total),
        None => total,
    };

    Ok(Value::String(chars[start as usize..end as usize].iter().collect()))
}

fn replace(
    ev: &Evaluator,
    kind: FunctionKind,
    args: &[Expr],
    doc: &dyn DocumentBinding,
) -> Result<Value, EvalError> {
    expect_arity(kind, args, 3)?;
    let s = ev.string_arg(kind, &args[0], doc)?;
    let find = ev.string_arg(kind, &args[1], doc)?;
    let replacement = ev.string_arg(kind, &args[2], doc)?;

    if find.is_empty() {
        return Ok(Value::String(s));
    }
    let out = if kind == FunctionKind::ReplaceFirst {
        s.replacen(&find, &replacement, 1)
    } else {
        s.replace(&find, &replacement)
    };
    Ok(Value::String(out))
}

fn search(
    ev: &Evaluator,
    kind: FunctionKind,
    args: &[Expr],
    doc: &dyn DocumentBinding,
) -> Result<Value, EvalError> {
    expect_arity(kind, args, 2)?;
    let s = ev.string_arg(kind, &args[0], doc)?;
    let needle = ev.string_arg(kind, &args[1], doc)?;

    let found = match kind {
        FunctionKind::StartsWith => s.starts_with(&needle),
        FunctionKind::EndsWith => s.ends_with(&needle),
        _ => s.contains(&needle),
    };
    Ok(Value::Boolean(found))
}

fn matches_pattern(
    ev: &Evaluator,
    kind: FunctionKind,
    pattern_kind: PatternKind,
    args: &[Expr],
    doc: &dyn DocumentBinding,
) -> Result<Value, EvalError> {
    expect_arity(kind, args, 2)?;
    let s = ev.string_arg(kind, &args[0], doc)?;
    let pattern = ev.string_arg(kind, &args[1], doc)?;

    let compiled = ev.pattern(pattern_kind, &pattern)?;
    Ok(Value::Boolean(compiled.matches(&s)))
}
