//! Array and map functions

use crate::document::DocumentBinding;
use crate::expr::{Expr, FunctionKind};
use crate::value::{MapValue, Value};

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
        F::ArrayLength => length_of(ev, args, doc).into(),
        F::ArrayReverse => reversed(ev, args, doc).into(),
        F::ArrayConcat => concatenated(ev, args, doc).into(),
        F::ArrayGet => element_at(ev, args, doc).into(),
        F::Map => construct_map(ev, args, doc).into(),
        F::MapGet => lookup_key(ev, args, doc),
        F::MapMerge => merged(ev, args, doc).into(),
        F::MapRemove => without_key(ev, args, doc).into(),
        _ => unsupported(kind),
    }
}

// ======================================================================
// Arrays
// ======================================================================

fn length_of(ev: &Evaluator, args: &[Expr], doc: &dyn DocumentBinding) -> Result<Value, EvalError> {
    let kind = FunctionKind::ArrayLength;
    expect_arity(kind, args, 1)?;
    let values = ev.array_arg(kind, &args[0], doc)?;
    i64::try_from(values.len())
        .map(Value::Integer)
        .map_err(|_| EvalError::OutOfRange(kind.name()))
}

fn reversed(ev: &Evaluator, args: &[Expr], doc: &dyn DocumentBinding) -> Result<Value, EvalError> {
    let kind = FunctionKind::ArrayReverse;
    expect_arity(kind, args, 1)?;
    let mut values = ev.array_arg(kind, &args[0], doc)?;
    values.reverse();
    Ok(Value::Array(values))
}

fn concatenated(ev: &Evaluator, args: &[Expr], doc: &dyn DocumentBinding) -> Result<Value, EvalError> {
    let kind = FunctionKind::ArrayConcat;
    expect_min_arity(kind, args, 1)?;

    let mut out = Vec::new();
    for arg in args {
        out.extend(ev.array_arg(kind, arg, doc)?);
    }
    Ok(Value::Array(out))
}

/// `array_get(array, index)`. A negative index counts from the end.
fn element_at(ev: &Evaluator, args: &[Expr], doc: &dyn DocumentBinding) -> Result<Value, EvalError> {
    let kind = FunctionKind::ArrayGet;
    expect_arity(kind, args, 2)?;
    let mut values = ev.array_arg(kind, &args[0], doc)?;
    let index = ev.integer_arg(kind, &args[1], doc)?;

    let len = values.len() as i64;
    let position = if index < 0 { len + index } else { index };
    if !(0..len).contains(&position) {
        return Err(EvalError::OutOfRange(kind.name()));
    }
    Ok(values.swap_remove(position as usize))
}

// ======================================================================
// Maps
// ======================================================================

/// `map(k1, v1, k2, v2, ...)`. Absent values leave their key out.
fn construct_map(ev: &Evaluator, args: &[Expr], doc: &dyn DocumentBinding) -> Result<Value, EvalError> {
    let kind = FunctionKind::Map;
    if args.len() % 2 != 0 {
        return Err(EvalError::arity(kind.name(), "an even number of", args.len()));
    }

    let mut map = MapValue::with_capacity(args.len() / 2);
    for pair in args.chunks_exact(2) {
        let key = ev.string_arg(kind, &pair[0], doc)?;
        match ev.evaluate(&pair[1], doc) {
            EvalResult::Value(v) => {
                map.insert(key, v);
            }
            EvalResult::Absent => {}
            EvalResult::Error(e) => return Err(e),
        }
    }
    Ok(Value::Map(map))
}

/// Missing keys are Absent rather than an error.
fn lookup_key(ev: &Evaluator, args: &[Expr], doc: &dyn DocumentBinding) -> EvalResult {
    let kind = FunctionKind::MapGet;
    let lookup = || -> Result<Option<Value>, EvalError> {
        expect_arity(kind, args, 2)?;
        let mut map = ev.map_arg(kind, &args[0], doc)?;
        let key = ev.string_arg(kind, &args[1], doc)?;
        Ok(map.swap_remove(&key))
    };

    match lookup() {
        Ok(Some(v)) => EvalResult::Value(v),
        Ok(None) => EvalResult::Absent,
        Err(e) => EvalResult::Error(e),
    }
}

fn merged(ev: &Evaluator, args: &[Expr], doc: &dyn DocumentBinding) -> Result<Value, EvalError> {
    let kind = FunctionKind::MapMerge;
    expect_min_arity(kind, args, 1)?;

    let mut merged = MapValue::new();
    for arg in args {
        merged.extend(ev.map_arg(kind, arg, doc)?);
    }
    Ok(Value::Map(merged))
}

fn without_key(ev: &Evaluator, args: &[Expr], doc: &dyn DocumentBinding) -> Result<Value, EvalError> {
    let kind = FunctionKind::MapRemove;
    expect_arity(kind, args, 2)?;
    let mut map = ev.map_arg(kind, &args[0], doc)?;
    let key = ev.string_arg(kind, &args[1], doc)?;
    map.shift_remove(&key);
    Ok(Value::Map(map))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EngineConfig;
    use crate::document::Document;
    use crate::expr::builder::*;
    use crate::value::Timestamp;
    use serde_json::json;

    fn eval(expr: impl Into<Expr>) -> EvalResult {
        let mut d = Document::from_json(
            "docs/1",
            Timestamp::from_seconds(0).unwrap(),
            json!({
                "arr": [1, 2, 3],
                "m": {"a": 1, "b": {"c": true}},
                "s": "x",
            }),
        )
        .unwrap();
        d.fields.insert("v".into(), Value::Vector(vec![1.0, 2.0]));
        Evaluator::new(&EngineConfig::default()).evaluate(&expr.into(), &d)
    }

    fn value_of(expr: impl Into<Expr>) -> Value {
        eval(expr).into_value().unwrap()
    }

    // ==================================================================
    // Arrays
    // ==================================================================

    #[test]
    fn test_array_length_and_reverse() {
        assert_eq!(value_of(array_length(field("arr"))), Value::Integer(3));
        assert_eq!(
            value_of(call(FunctionKind::ArrayReverse, [field("arr")])),
            Value::from_json(json!([3, 2, 1]))
        );
        assert!(eval(array_length(field("s"))).is_error());
        assert!(eval(array_length(field("missing"))).is_error());
    }

    #[test]
    fn test_array_concat() {
        let concat = call(FunctionKind::ArrayConcat, [field("arr"), list(["x"])]);
        assert_eq!(value_of(concat), Value::from_json(json!([1, 2, 3, "x"])));
        assert!(eval(call(FunctionKind::ArrayConcat, [field("arr"), field("s")])).is_error());
    }

    #[test]
    fn test_array_get() {
        assert_eq!(value_of(array_get(field("arr"), 0)), Value::Integer(1));
        assert_eq!(value_of(array_get(field("arr"), -1)), Value::Integer(3));
        assert_eq!(
            eval(array_get(field("arr"), 3)),
            EvalResult::Error(EvalError::OutOfRange("array_get"))
        );
        assert!(eval(array_get(field("arr"), -4)).is_error());
        assert!(eval(array_get(field("arr"), 1.0)).is_error());
    }

    // ==================================================================
    // Maps
    // ==================================================================

    #[test]
    fn test_map_get() {
        assert_eq!(value_of(map_get(field("m"), "a")), Value::Integer(1));
        assert_eq!(
            value_of(map_get(map_get(field("m"), "b"), "c")),
            Value::Boolean(true)
        );
        assert!(eval(map_get(field("m"), "zzz")).is_absent());
        assert!(eval(map_get(field("s"), "a")).is_error());
        assert_eq!(value_of(map_get(field("v"), "__type__")), Value::from("__vector__"));
    }

    #[test]
    fn test_map_construction() {
        let built = call(
            FunctionKind::Map,
            [constant("x"), field("s"), constant("gone"), field("missing")],
        );
        assert_eq!(value_of(built), Value::from_json(json!({"x": "x"})));
        assert!(eval(call(FunctionKind::Map, ["x"])).is_error());
        assert!(eval(call(FunctionKind::Map, [constant(1), constant(2)])).is_error());
    }

    #[test]
    fn test_map_merge_and_remove() {
        let merged = call(
            FunctionKind::MapMerge,
            [field("m"), constant(Value::from_json(json!({"a": 9, "z": 0})))],
        );
        assert_eq!(
            value_of(merged),
            Value::from_json(json!({"a": 9, "b": {"c": true}, "z": 0}))
        );

        let removed = call(FunctionKind::MapRemove, [field("m"), constant("b")]);
        assert_eq!(value_of(removed), Value::from_json(json!({"a": 1})));
    }
}
