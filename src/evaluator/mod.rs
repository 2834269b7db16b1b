//! Expression evaluation for docpipe
//!
//! An expression evaluated against one document yields an `EvalResult`:
//! a value, `Absent` (a referenced field does not exist) or an `EvalError`.
//! Errors never escape as `Err`; stages absorb them.
//!
//! Functions are grouped in families, one module each:
//!
//! - `comparison`: equality, ordering, presence and membership predicates
//! - `logical`: three-valued `and`/`or`/`xor`/`not`, error observers, `cond`
//! - `arithmetic`, `string`, `collection`, `vector`, `timestamp`

mod arithmetic;
mod collection;
mod comparison;
mod errors;
#[allow(clippy::module_inception)]
mod evaluator;
mod logical;
mod pattern;
mod result;
mod string;
mod timestamp;
mod vector;

pub use errors::EvalError;
pub use evaluator::Evaluator;
pub use pattern::{CompiledPattern, PatternCache, PatternKind};
pub use result::EvalResult;

pub(crate) use vector::{cosine_distance, dot_product, euclidean_distance};
