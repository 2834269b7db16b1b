//! Evaluation Property Tests
//!
//! Properties of the comparison operators and three-valued logic:
//! - Numeric equality is mathematical; NaN equals nothing
//! - Ordering operators never compare across domains
//! - `and` / `or` dominance holds regardless of errors elsewhere

use docpipe::config::EngineConfig;
use docpipe::document::Document;
use docpipe::evaluator::{EvalResult, Evaluator};
use docpipe::expr::builder::*;
use docpipe::expr::{BooleanExpr, Expr};
use docpipe::value::{GeoPoint, Timestamp, Value};
use pretty_assertions::assert_eq;
use serde_json::json;

// =============================================================================
// Helper Functions
// =============================================================================

fn empty_doc() -> Document {
    Document::from_json("t/doc", Timestamp::from_seconds(1).unwrap(), json!({})).unwrap()
}

fn check(predicate: BooleanExpr) -> EvalResult {
    Evaluator::new(&EngineConfig::default()).evaluate_predicate(&predicate, &empty_doc())
}

fn numbers() -> Vec<Value> {
    vec![
        Value::Integer(0),
        Value::Double(0.0),
        Value::Double(-0.0),
        Value::Integer(1),
        Value::Double(1.0),
        Value::Integer(-3),
        Value::Double(2.5),
        Value::Integer(i64::MAX),
        Value::Double(f64::INFINITY),
        Value::Double(f64::NEG_INFINITY),
    ]
}

/// One value per ordering domain.
fn one_per_domain() -> Vec<Value> {
    vec![
        Value::Boolean(true),
        Value::Integer(1),
        Value::Timestamp(Timestamp::from_seconds(1).unwrap()),
        Value::from("a"),
        Value::Bytes(vec![1]),
        Value::GeoPoint(GeoPoint::new(1.0, 2.0)),
        Value::Array(vec![Value::Integer(1)]),
        Value::Map(Default::default()),
    ]
}

fn same_number(a: &Value, b: &Value) -> bool {
    a.as_f64() == b.as_f64()
}

// =============================================================================
// Numeric Equality
// =============================================================================

/// eq(a, b) is true iff both denote the same number.
#[test]
fn test_numeric_equality_is_mathematical() {
    for a in numbers() {
        for b in numbers() {
            let expected = same_number(&a, &b);
            assert_eq!(
                check(eq(a.clone(), b.clone())).is_true(),
                expected,
                "eq({:?}, {:?})",
                a,
                b
            );
        }
    }
}

/// NaN is unequal to everything, itself included.
#[test]
fn test_nan_equals_nothing() {
    let nan = Value::Double(f64::NAN);
    for other in numbers().into_iter().chain([nan.clone()]) {
        assert!(check(eq(nan.clone(), other.clone())).is_false());
        assert!(check(eq(other, nan.clone())).is_false());
    }
    assert!(check(is_nan(nan)).is_true());
}

/// Integer and double compare without precision loss near i64::MAX.
#[test]
fn test_large_integer_vs_double() {
    assert!(check(lt(i64::MAX - 1, 9.223372036854775807e18)).is_true());
    assert!(check(eq(i64::MAX, 9.223372036854775807e18)).is_false());
}

// =============================================================================
// Cross-Domain Comparison
// =============================================================================

/// Ordering operators are false across domains.
#[test]
fn test_cross_domain_ordering_is_false() {
    let ops: [fn(Expr, Expr) -> BooleanExpr; 4] = [
        |a, b| lt(a, b),
        |a, b| lte(a, b),
        |a, b| gt(a, b),
        |a, b| gte(a, b),
    ];
    let values = one_per_domain();
    for (i, a) in values.iter().enumerate() {
        for (j, b) in values.iter().enumerate() {
            if i == j {
                continue;
            }
            for op in ops {
                assert!(
                    check(op(Expr::from(a.clone()), Expr::from(b.clone()))).is_false(),
                    "{:?} vs {:?}",
                    a,
                    b
                );
            }
            assert!(check(eq(a.clone(), b.clone())).is_false());
        }
    }
}

/// Null compares equal-ish only to Null.
#[test]
fn test_null_ordering() {
    let null = || constant(Value::Null);
    assert!(check(lte(null(), null())).is_true());
    assert!(check(gte(null(), null())).is_true());
    assert!(check(lt(null(), null())).is_false());
    assert!(check(gt(null(), null())).is_false());

    for other in one_per_domain() {
        assert!(check(lte(null(), other.clone())).is_false());
        assert!(check(gte(other, null())).is_false());
    }
}

// =============================================================================
// Three-Valued Logic
// =============================================================================

fn error_condition() -> BooleanExpr {
    // arithmetic on a string
    gt(add("text", 1), 0)
}

/// A false operand makes `and` false even beside an error.
#[test]
fn test_and_false_dominates_error() {
    assert!(check(and([error_condition(), eq(1, 2)])).is_false());
    assert!(check(and([eq(1, 2), error_condition()])).is_false());
    assert!(check(and([eq(1, 1), error_condition()])).is_error());
}

/// A true operand makes `or` true even beside an error.
#[test]
fn test_or_true_dominates_error() {
    assert!(check(or([error_condition(), eq(1, 1)])).is_true());
    assert!(check(or([eq(1, 1), error_condition()])).is_true());
    assert!(check(or([eq(1, 2), error_condition()])).is_error());
}

/// Error observers turn errors into values.
#[test]
fn test_error_observers() {
    assert!(check(is_error(add("text", 1))).is_true());
    assert!(check(is_error(add(1, 1))).is_false());

    let recovered = Evaluator::new(&EngineConfig::default())
        .evaluate(&if_error(add("text", 1), 0), &empty_doc());
    assert_eq!(recovered, EvalResult::Value(Value::Integer(0)));
}

/// Absent is neither Null nor an error.
#[test]
fn test_absent_is_distinct_from_null() {
    assert!(check(is_absent(field("missing"))).is_true());
    assert!(check(exists(field("missing"))).is_false());
    assert!(check(is_null(constant(Value::Null))).is_true());
    assert!(!check(is_null(field("missing"))).is_true());
}
