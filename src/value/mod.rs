//! Value model for docpipe
//!
//! Values are grouped into ordering domains (see `TypeOrder`). Comparison
//! operators are only defined inside a domain; equality never crosses one.
//! Min/max folds use a separate total order that orders every pair.

mod compare;
mod timestamp;
#[allow(clippy::module_inception)]
mod value;

pub use compare::{partial_cmp_values, total_cmp_values, values_equal};
pub use timestamp::Timestamp;
pub use value::{
    vector_as_map, GeoPoint, MapValue, TypeOrder, Value, VECTOR_TYPE_KEY, VECTOR_TYPE_VALUE,
    VECTOR_VALUE_KEY,
};
