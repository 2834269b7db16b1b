//! Builder functions for expressions
//!
//! Plain Rust values passed as arguments become constants. Field references
//! are only created through [`field`].

use crate::document::FieldPath;
use crate::value::Value;

use super::ast::{AggregateFunction, BooleanExpr, Expr, FunctionExpr};
use super::function::{AggregateKind, FunctionKind};

pub fn field(path: impl Into<FieldPath>) -> Expr {
    Expr::field(path)
}

pub fn constant(value: impl Into<Value>) -> Expr {
    Expr::constant(value)
}

pub fn list<I, E>(items: I) -> Expr
where
    I: IntoIterator<Item = E>,
    E: Into<Expr>,
{
    Expr::List(items.into_iter().map(Into::into).collect())
}

/// Generic call for kinds without a dedicated builder.
pub fn call<I, E>(kind: FunctionKind, args: I) -> Expr
where
    I: IntoIterator<Item = E>,
    E: Into<Expr>,
{
    Expr::function(kind, args.into_iter().map(Into::into).collect())
}

fn predicate(kind: FunctionKind, args: Vec<Expr>) -> BooleanExpr {
    debug_assert!(kind.is_boolean(), "{} is not a boolean function", kind);
    BooleanExpr(FunctionExpr::new(kind, args))
}

fn value_fn(kind: FunctionKind, args: Vec<Expr>) -> Expr {
    Expr::function(kind, args)
}

fn collect<I, E>(items: I) -> Vec<Expr>
where
    I: IntoIterator<Item = E>,
    E: Into<Expr>,
{
    items.into_iter().map(Into::into).collect()
}

// ======================================================================
// Comparison
// ======================================================================

pub fn eq(left: impl Into<Expr>, right: impl Into<Expr>) -> BooleanExpr {
    predicate(FunctionKind::Eq, vec![left.into(), right.into()])
}

pub fn neq(left: impl Into<Expr>, right: impl Into<Expr>) -> BooleanExpr {
    predicate(FunctionKind::Neq, vec![left.into(), right.into()])
}

pub fn lt(left: impl Into<Expr>, right: impl Into<Expr>) -> BooleanExpr {
    predicate(FunctionKind::Lt, vec![left.into(), right.into()])
}

pub fn lte(left: impl Into<Expr>, right: impl Into<Expr>) -> BooleanExpr {
    predicate(FunctionKind::Lte, vec![left.into(), right.into()])
}

pub fn gt(left: impl Into<Expr>, right: impl Into<Expr>) -> BooleanExpr {
    predicate(FunctionKind::Gt, vec![left.into(), right.into()])
}

pub fn gte(left: impl Into<Expr>, right: impl Into<Expr>) -> BooleanExpr {
    predicate(FunctionKind::Gte, vec![left.into(), right.into()])
}

pub fn eq_any(search: impl Into<Expr>, candidates: impl Into<Expr>) -> BooleanExpr {
    predicate(FunctionKind::EqAny, vec![search.into(), candidates.into()])
}

pub fn not_eq_any(search: impl Into<Expr>, candidates: impl Into<Expr>) -> BooleanExpr {
    predicate(FunctionKind::NotEqAny, vec![search.into(), candidates.into()])
}

pub fn exists(expr: impl Into<Expr>) -> BooleanExpr {
    predicate(FunctionKind::Exists, vec![expr.into()])
}

pub fn is_absent(expr: impl Into<Expr>) -> BooleanExpr {
    predicate(FunctionKind::IsAbsent, vec![expr.into()])
}

pub fn is_null(expr: impl Into<Expr>) -> BooleanExpr {
    predicate(FunctionKind::IsNull, vec![expr.into()])
}

pub fn is_not_null(expr: impl Into<Expr>) -> BooleanExpr {
    predicate(FunctionKind::IsNotNull, vec![expr.into()])
}

pub fn is_nan(expr: impl Into<Expr>) -> BooleanExpr {
    predicate(FunctionKind::IsNan, vec![expr.into()])
}

pub fn is_not_nan(expr: impl Into<Expr>) -> BooleanExpr {
    predicate(FunctionKind::IsNotNan, vec![expr.into()])
}

pub fn array_contains(array: impl Into<Expr>, element: impl Into<Expr>) -> BooleanExpr {
    predicate(FunctionKind::ArrayContains, vec![array.into(), element.into()])
}

pub fn array_contains_all(array: impl Into<Expr>, values: impl Into<Expr>) -> BooleanExpr {
    predicate(FunctionKind::ArrayContainsAll, vec![array.into(), values.into()])
}

pub fn array_contains_any(array: impl Into<Expr>, values: impl Into<Expr>) -> BooleanExpr {
    predicate(FunctionKind::ArrayContainsAny, vec![array.into(), values.into()])
}

// ======================================================================
// Logical
// ======================================================================

pub fn and<I, E>(conditions: I) -> BooleanExpr
where
    I: IntoIterator<Item = E>,
    E: Into<Expr>,
{
    predicate(FunctionKind::And, collect(conditions))
}

pub fn or<I, E>(conditions: I) -> BooleanExpr
where
    I: IntoIterator<Item = E>,
    E: Into<Expr>,
{
    predicate(FunctionKind::Or, collect(conditions))
}

pub fn xor<I, E>(conditions: I) -> BooleanExpr
where
    I: IntoIterator<Item = E>,
    E: Into<Expr>,
{
    predicate(FunctionKind::Xor, collect(conditions))
}

pub fn not(condition: impl Into<Expr>) -> BooleanExpr {
    predicate(FunctionKind::Not, vec![condition.into()])
}

pub fn is_error(expr: impl Into<Expr>) -> BooleanExpr {
    predicate(FunctionKind::IsError, vec![expr.into()])
}

pub fn if_error(expr: impl Into<Expr>, fallback: impl Into<Expr>) -> Expr {
    value_fn(FunctionKind::IfError, vec![expr.into(), fallback.into()])
}

pub fn cond(
    condition: impl Into<Expr>,
    then: impl Into<Expr>,
    otherwise: impl Into<Expr>,
) -> Expr {
    value_fn(
        FunctionKind::Cond,
        vec![condition.into(), then.into(), otherwise.into()],
    )
}

pub fn logical_maximum<I, E>(exprs: I) -> Expr
where
    I: IntoIterator<Item = E>,
    E: Into<Expr>,
{
    value_fn(FunctionKind::LogicalMaximum, collect(exprs))
}

pub fn logical_minimum<I, E>(exprs: I) -> Expr
where
    I: IntoIterator<Item = E>,
    E: Into<Expr>,
{
    value_fn(FunctionKind::LogicalMinimum, collect(exprs))
}

// ======================================================================
// Arithmetic
// ======================================================================

pub fn add(left: impl Into<Expr>, right: impl Into<Expr>) -> Expr {
    value_fn(FunctionKind::Add, vec![left.into(), right.into()])
}

pub fn subtract(left: impl Into<Expr>, right: impl Into<Expr>) -> Expr {
    value_fn(FunctionKind::Subtract, vec![left.into(), right.into()])
}

pub fn multiply(left: impl Into<Expr>, right: impl Into<Expr>) -> Expr {
    value_fn(FunctionKind::Multiply, vec![left.into(), right.into()])
}

pub fn divide(left: impl Into<Expr>, right: impl Into<Expr>) -> Expr {
    value_fn(FunctionKind::Divide, vec![left.into(), right.into()])
}

pub fn modulo(left: impl Into<Expr>, right: impl Into<Expr>) -> Expr {
    value_fn(FunctionKind::Mod, vec![left.into(), right.into()])
}

// ======================================================================
// Strings
// ======================================================================

pub fn char_length(expr: impl Into<Expr>) -> Expr {
    value_fn(FunctionKind::CharLength, vec![expr.into()])
}

pub fn to_lower(expr: impl Into<Expr>) -> Expr {
    value_fn(FunctionKind::ToLower, vec![expr.into()])
}

pub fn to_upper(expr: impl Into<Expr>) -> Expr {
    value_fn(FunctionKind::ToUpper, vec![expr.into()])
}

pub fn str_concat<I, E>(parts: I) -> Expr
where
    I: IntoIterator<Item = E>,
    E: Into<Expr>,
{
    value_fn(FunctionKind::StrConcat, collect(parts))
}

pub fn starts_with(expr: impl Into<Expr>, prefix: impl Into<Expr>) -> BooleanExpr {
    predicate(FunctionKind::StartsWith, vec![expr.into(), prefix.into()])
}

pub fn ends_with(expr: impl Into<Expr>, suffix: impl Into<Expr>) -> BooleanExpr {
    predicate(FunctionKind::EndsWith, vec![expr.into(), suffix.into()])
}

pub fn str_contains(expr: impl Into<Expr>, needle: impl Into<Expr>) -> BooleanExpr {
    predicate(FunctionKind::StrContains, vec![expr.into(), needle.into()])
}

pub fn like(expr: impl Into<Expr>, pattern: impl Into<Expr>) -> BooleanExpr {
    predicate(FunctionKind::Like, vec![expr.into(), pattern.into()])
}

pub fn regex_contains(expr: impl Into<Expr>, pattern: impl Into<Expr>) -> BooleanExpr {
    predicate(FunctionKind::RegexContains, vec![expr.into(), pattern.into()])
}

pub fn regex_match(expr: impl Into<Expr>, pattern: impl Into<Expr>) -> BooleanExpr {
    predicate(FunctionKind::RegexMatch, vec![expr.into(), pattern.into()])
}

// ======================================================================
// Arrays, maps, documents
// ======================================================================

pub fn array_length(expr: impl Into<Expr>) -> Expr {
    value_fn(FunctionKind::ArrayLength, vec![expr.into()])
}

pub fn array_get(array: impl Into<Expr>, index: impl Into<Expr>) -> Expr {
    value_fn(FunctionKind::ArrayGet, vec![array.into(), index.into()])
}

pub fn map_get(map: impl Into<Expr>, key: impl Into<Expr>) -> Expr {
    value_fn(FunctionKind::MapGet, vec![map.into(), key.into()])
}

pub fn document_id(reference: impl Into<Expr>) -> Expr {
    value_fn(FunctionKind::DocumentId, vec![reference.into()])
}

// ======================================================================
// Accumulators
// ======================================================================

pub fn count_all() -> AggregateFunction {
    AggregateFunction::new(AggregateKind::Count, Vec::new())
}

pub fn count(expr: impl Into<Expr>) -> AggregateFunction {
    AggregateFunction::new(AggregateKind::Count, vec![expr.into()])
}

pub fn count_if(condition: impl Into<Expr>) -> AggregateFunction {
    AggregateFunction::new(AggregateKind::CountIf, vec![condition.into()])
}

pub fn count_distinct(expr: impl Into<Expr>) -> AggregateFunction {
    AggregateFunction::new(AggregateKind::CountDistinct, vec![expr.into()])
}

pub fn sum(expr: impl Into<Expr>) -> AggregateFunction {
    AggregateFunction::new(AggregateKind::Sum, vec![expr.into()])
}

pub fn average(expr: impl Into<Expr>) -> AggregateFunction {
    AggregateFunction::new(AggregateKind::Average, vec![expr.into()])
}

pub fn minimum(expr: impl Into<Expr>) -> AggregateFunction {
    AggregateFunction::new(AggregateKind::Minimum, vec![expr.into()])
}

pub fn maximum(expr: impl Into<Expr>) -> AggregateFunction {
    AggregateFunction::new(AggregateKind::Maximum, vec![expr.into()])
}
