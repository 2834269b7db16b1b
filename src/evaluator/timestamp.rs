//! Timestamp conversions and arithmetic

use crate::document::DocumentBinding;
use crate::expr::{Expr, FunctionKind};
use crate::value::{Timestamp, Value};

use super::errors::EvalError;
use super::evaluator::{expect_arity, unsupported, Evaluator};
use super::result::EvalResult;

const MICROS_PER_MILLI: i128 = 1_000;
const MICROS_PER_SECOND: i128 = 1_000_000;
const MICROS_PER_MINUTE: i128 = 60 * MICROS_PER_SECOND;
const MICROS_PER_HOUR: i128 = 60 * MICROS_PER_MINUTE;
const MICROS_PER_DAY: i128 = 24 * MICROS_PER_HOUR;

pub(super) fn evaluate(
    ev: &Evaluator,
    kind: FunctionKind,
    args: &[Expr],
    doc: &dyn DocumentBinding,
) -> EvalResult {
    use FunctionKind as F;

    let result = match kind {
        F::UnixMicrosToTimestamp | F::UnixMillisToTimestamp | F::UnixSecondsToTimestamp => {
            from_unix(ev, kind, args, doc)
        }
        F::TimestampToUnixMicros | F::TimestampToUnixMillis | F::TimestampToUnixSeconds => {
            to_unix(ev, kind, args, doc)
        }
        F::TimestampAdd | F::TimestampSub => shift(ev, kind, args, doc),
        _ => return unsupported(kind),
    };
    result.into()
}

fn from_unix(
    ev: &Evaluator,
    kind: FunctionKind,
    args: &[Expr],
    doc: &dyn DocumentBinding,
) -> Result<Value, EvalError> {
    expect_arity(kind, args, 1)?;
    let n = ev.integer_arg(kind, &args[0], doc)?;

    let ts = match kind {
        FunctionKind::UnixMicrosToTimestamp => Timestamp::from_micros(n),
        FunctionKind::UnixMillisToTimestamp => Timestamp::from_millis(n),
        _ => Timestamp::from_seconds(n),
    };
    ts.map(Value::Timestamp)
        .ok_or(EvalError::OutOfRange(kind.name()))
}

fn to_unix(
    ev: &Evaluator,
    kind: FunctionKind,
    args: &[Expr],
    doc: &dyn DocumentBinding,
) -> Result<Value, EvalError> {
    expect_arity(kind, args, 1)?;
    let ts = ev.timestamp_arg(kind, &args[0], doc)?;

    let n = match kind {
        FunctionKind::TimestampToUnixMicros => ts.to_unix_micros(),
        FunctionKind::TimestampToUnixMillis => ts.to_unix_millis(),
        _ => ts.to_unix_seconds(),
    };
    Ok(Value::Integer(n))
}

/// `timestamp_add(ts, unit, amount)` and `timestamp_sub(ts, unit, amount)`
fn shift(
    ev: &Evaluator,
    kind: FunctionKind,
    args: &[Expr],
    doc: &dyn DocumentBinding,
) -> Result<Value, EvalError> {
    expect_arity(kind, args, 3)?;
    let ts = ev.timestamp_arg(kind, &args[0], doc)?;
    let unit = ev.string_arg(kind, &args[1], doc)?;
    let amount = ev.integer_arg(kind, &args[2], doc)?;

    let per_unit = unit_micros(&unit).ok_or_else(|| {
        EvalError::invalid_argument(kind.name(), format!("unknown time unit '{}'", unit))
    })?;

    // |i64| * micros-per-day stays well inside i128
    let mut delta = amount as i128 * per_unit;
    if kind == FunctionKind::TimestampSub {
        delta = -delta;
    }

    ts.checked_add_micros(delta)
        .map(Value::Timestamp)
        .ok_or(EvalError::OutOfRange(kind.name()))
}

fn unit_micros(unit: &str) -> Option<i128> {
    match unit {
        "microsecond" => Some(1),
        "millisecond" => Some(MICROS_PER_MILLI),
        "second" => Some(MICROS_PER_SECOND),
        "minute" => Some(MICROS_PER_MINUTE),
        "hour" => Some(MICROS_PER_HOUR),
        "day" => Some(MICROS_PER_DAY),
        _ => None,
    }
}
