//! Expression AST
//!
//! Expressions are immutable trees shared read-only by every evaluation.

use crate::document::FieldPath;
use crate::pipeline::PipelineError;
use crate::value::Value;

use super::function::{AggregateKind, FunctionKind};

/// An expression node
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// Reference to a (possibly nested or synthetic) field
    Field(FieldPath),
    /// Literal value
    Constant(Value),
    /// Function call producing any value
    Function(FunctionExpr),
    /// Function call producing a boolean
    Boolean(BooleanExpr),
    /// Expression list, evaluates to an array
    List(Vec<Expr>),
}

impl Expr {
    pub fn field(path: impl Into<FieldPath>) -> Self {
        Expr::Field(path.into())
    }

    pub fn constant(value: impl Into<Value>) -> Self {
        Expr::Constant(value.into())
    }

    /// Builds a function node, classifying boolean-valued kinds as
    /// `Expr::Boolean`.
    pub fn function(kind: FunctionKind, args: Vec<Expr>) -> Self {
        FunctionExpr::new(kind, args).into()
    }

    /// Converts into a boolean expression, if this is one.
    pub fn into_boolean(self) -> Option<BooleanExpr> {
        match self {
            Expr::Boolean(b) => Some(b),
            Expr::Function(f) => BooleanExpr::try_from(f).ok(),
            _ => None,
        }
    }

    pub fn alias(self, alias: impl Into<FieldPath>) -> AliasedExpr {
        AliasedExpr::new(alias, self)
    }

    pub fn ascending(self) -> SortSpec {
        SortSpec::asc(self)
    }

    pub fn descending(self) -> SortSpec {
        SortSpec::desc(self)
    }

    /// Short description for logs: field path, constant or function name.
    pub fn describe(&self) -> String {
        match self {
            Expr::Field(path) => path.to_string(),
            Expr::Constant(value) => value.to_string(),
            Expr::Function(f) => format!("{}(..)", f.kind),
            Expr::Boolean(b) => format!("{}(..)", b.kind()),
            Expr::List(items) => format!("list[{}]", items.len()),
        }
    }

    /// Identity string: equal trees share an id, and constants use
    /// `Value::canonical_id` so `1`, `1.0` and `-0.0`/`0` collapse.
    pub fn canonical_id(&self) -> String {
        match self {
            Expr::Field(path) => format!("fld({})", path),
            Expr::Constant(value) => format!("cst({})", value.canonical_id()),
            Expr::Function(f) => canonical_call(f.kind.name(), &f.args),
            Expr::Boolean(b) => b.canonical_id(),
            Expr::List(items) => format!("list([{}])", canonical_list(items)),
        }
    }
}

fn canonical_call(name: &str, args: &[Expr]) -> String {
    format!("fn({},[{}])", name, canonical_list(args))
}

fn canonical_list(items: &[Expr]) -> String {
    items
        .iter()
        .map(Expr::canonical_id)
        .collect::<Vec<_>>()
        .join(",")
}

impl From<FunctionExpr> for Expr {
    fn from(function: FunctionExpr) -> Self {
        if function.kind.is_boolean() {
            Expr::Boolean(BooleanExpr(function))
        } else {
            Expr::Function(function)
        }
    }
}

impl From<BooleanExpr> for Expr {
    fn from(expr: BooleanExpr) -> Self {
        Expr::Boolean(expr)
    }
}

impl From<Value> for Expr {
    fn from(value: Value) -> Self {
        Expr::Constant(value)
    }
}

impl From<i64> for Expr {
    fn from(i: i64) -> Self {
        Expr::Constant(Value::Integer(i))
    }
}

impl From<i32> for Expr {
    fn from(i: i32) -> Self {
        Expr::Constant(Value::Integer(i as i64))
    }
}

impl From<f64> for Expr {
    fn from(d: f64) -> Self {
        Expr::Constant(Value::Double(d))
    }
}

impl From<bool> for Expr {
    fn from(b: bool) -> Self {
        Expr::Constant(Value::Boolean(b))
    }
}

/// String literals are constants, never field references.
impl From<&str> for Expr {
    fn from(s: &str) -> Self {
        Expr::Constant(Value::from(s))
    }
}

impl From<String> for Expr {
    fn from(s: String) -> Self {
        Expr::Constant(Value::String(s))
    }
}

/// A function call: kind plus ordered arguments
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionExpr {
    pub kind: FunctionKind,
    pub args: Vec<Expr>,
}

impl FunctionExpr {
    pub fn new(kind: FunctionKind, args: Vec<Expr>) -> Self {
        Self { kind, args }
    }
}

/// A function call whose kind is boolean-valued.
///
/// Only `Where` requires this type; everywhere else it is an ordinary `Expr`.
#[derive(Debug, Clone, PartialEq)]
pub struct BooleanExpr(pub(super) FunctionExpr);

impl BooleanExpr {
    pub fn kind(&self) -> FunctionKind {
        self.0.kind
    }

    pub fn args(&self) -> &[Expr] {
        &self.0.args
    }

    pub fn canonical_id(&self) -> String {
        canonical_call(self.kind().name(), self.args())
    }

    pub fn function(&self) -> &FunctionExpr {
        &self.0
    }
}

impl TryFrom<FunctionExpr> for BooleanExpr {
    type Error = PipelineError;

    fn try_from(function: FunctionExpr) -> Result<Self, Self::Error> {
        if function.kind.is_boolean() {
            Ok(BooleanExpr(function))
        } else {
            Err(PipelineError::non_boolean_predicate(function.kind.name()))
        }
    }
}

/// An accumulator call
#[derive(Debug, Clone, PartialEq)]
pub struct AggregateFunction {
    pub kind: AggregateKind,
    pub args: Vec<Expr>,
}

impl AggregateFunction {
    pub fn new(kind: AggregateKind, args: Vec<Expr>) -> Self {
        Self { kind, args }
    }

    pub fn alias(self, alias: impl Into<FieldPath>) -> AliasedAggregate {
        AliasedAggregate {
            alias: alias.into(),
            function: self,
        }
    }

    pub fn canonical_id(&self) -> String {
        canonical_call(self.kind.name(), &self.args)
    }
}

/// Accumulator with its output field
#[derive(Debug, Clone, PartialEq)]
pub struct AliasedAggregate {
    pub alias: FieldPath,
    pub function: AggregateFunction,
}

/// Expression with its output field
#[derive(Debug, Clone, PartialEq)]
pub struct AliasedExpr {
    pub alias: FieldPath,
    pub expr: Expr,
}

impl AliasedExpr {
    pub fn new(alias: impl Into<FieldPath>, expr: impl Into<Expr>) -> Self {
        Self {
            alias: alias.into(),
            expr: expr.into(),
        }
    }
}

/// A field reference is its own alias.
impl From<FieldPath> for AliasedExpr {
    fn from(path: FieldPath) -> Self {
        Self {
            alias: path.clone(),
            expr: Expr::Field(path),
        }
    }
}

impl From<&str> for AliasedExpr {
    fn from(path: &str) -> Self {
        FieldPath::parse(path).into()
    }
}

/// Sort direction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortDirection::Asc => "asc",
            SortDirection::Desc => "desc",
        }
    }
}

/// One ordering of a Sort stage
#[derive(Debug, Clone, PartialEq)]
pub struct SortSpec {
    /// Sort key
    pub expr: Expr,
    /// Sort direction
    pub direction: SortDirection,
}

impl SortSpec {
    pub fn asc(expr: impl Into<Expr>) -> Self {
        Self {
            expr: expr.into(),
            direction: SortDirection::Asc,
        }
    }

    pub fn desc(expr: impl Into<Expr>) -> Self {
        Self {
            expr: expr.into(),
            direction: SortDirection::Desc,
        }
    }
}
