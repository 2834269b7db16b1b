//! Expression AST for docpipe
//!
//! Expressions are field references, constants, function calls (boolean or
//! value-producing) and expression lists. Aggregate functions, sort specs and
//! aliased expressions are the stage-level wrappers around them.

mod ast;
pub mod builder;
mod function;

pub use ast::{
    AggregateFunction, AliasedAggregate, AliasedExpr, BooleanExpr, Expr, FunctionExpr,
    SortDirection, SortSpec,
};
pub use function::{AggregateKind, FunctionKind};
