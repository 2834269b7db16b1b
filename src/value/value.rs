//! The typed value model
//!
//! Values are immutable once built. Semantic comparison lives in `compare`;
//! the `PartialEq` impl here is structural identity (same variant, same bits)
//! and exists for assertions and AST equality, not for query semantics.

use std::borrow::Cow;
use std::cmp::Ordering;
use std::fmt;

use base64::{engine::general_purpose::STANDARD, Engine as _};
use indexmap::IndexMap;

use super::compare;
use super::timestamp::Timestamp;
use crate::document::DocumentKey;

/// Field map of a document or of a map value. Keeps insertion order.
pub type MapValue = IndexMap<String, Value>;

/// Reserved key marking the map representation of a vector.
pub const VECTOR_TYPE_KEY: &str = "__type__";
pub const VECTOR_TYPE_VALUE: &str = "__vector__";
pub const VECTOR_VALUE_KEY: &str = "value";

#[derive(Debug, Clone, Copy)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

impl GeoPoint {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }
}

#[derive(Debug, Clone)]
pub enum Value {
    Null,
    Boolean(bool),
    Integer(i64),
    Double(f64),
    Timestamp(Timestamp),
    String(String),
    Bytes(Vec<u8>),
    Reference(DocumentKey),
    GeoPoint(GeoPoint),
    Array(Vec<Value>),
    Map(MapValue),
    Vector(Vec<f64>),
}

/// Ordering domains, listed in total-order position.
///
/// Values from different domains are never equal and have no domain ordering.
/// Integer and Double share `Number`; Map and Vector share `Map`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TypeOrder {
    Null,
    Boolean,
    Number,
    Timestamp,
    String,
    Bytes,
    Reference,
    GeoPoint,
    Array,
    Map,
}

impl Value {
    pub fn type_order(&self) -> TypeOrder {
        match self {
            Value::Null => TypeOrder::Null,
            Value::Boolean(_) => TypeOrder::Boolean,
            Value::Integer(_) | Value::Double(_) => TypeOrder::Number,
            Value::Timestamp(_) => TypeOrder::Timestamp,
            Value::String(_) => TypeOrder::String,
            Value::Bytes(_) => TypeOrder::Bytes,
            Value::Reference(_) => TypeOrder::Reference,
            Value::GeoPoint(_) => TypeOrder::GeoPoint,
            Value::Array(_) => TypeOrder::Array,
            Value::Map(_) | Value::Vector(_) => TypeOrder::Map,
        }
    }

    /// Short type name used in error messages and logs.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Boolean(_) => "boolean",
            Value::Integer(_) => "integer",
            Value::Double(_) => "double",
            Value::Timestamp(_) => "timestamp",
            Value::String(_) => "string",
            Value::Bytes(_) => "bytes",
            Value::Reference(_) => "reference",
            Value::GeoPoint(_) => "geo_point",
            Value::Array(_) => "array",
            Value::Map(_) => "map",
            Value::Vector(_) => "vector",
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn is_number(&self) -> bool {
        matches!(self, Value::Integer(_) | Value::Double(_))
    }

    pub fn is_nan(&self) -> bool {
        matches!(self, Value::Double(d) if d.is_nan())
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Integer(i) => Some(*i),
            _ => None,
        }
    }

    /// Numeric value widened to `f64`.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Integer(i) => Some(*i as f64),
            Value::Double(d) => Some(*d),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[Value]> {
        match self {
            Value::Array(values) => Some(values),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&MapValue> {
        match self {
            Value::Map(map) => Some(map),
            _ => None,
        }
    }

    pub fn as_vector(&self) -> Option<&[f64]> {
        match self {
            Value::Vector(v) => Some(v),
            _ => None,
        }
    }

    /// Map view of a Map or Vector value.
    pub(crate) fn map_entries(&self) -> Option<Cow<'_, MapValue>> {
        match self {
            Value::Map(map) => Some(Cow::Borrowed(map)),
            Value::Vector(v) => Some(Cow::Owned(vector_as_map(v))),
            _ => None,
        }
    }

    /// Semantic equality: numeric unification, NaN equals nothing,
    /// structural arrays and maps.
    pub fn equals(&self, other: &Value) -> bool {
        compare::values_equal(self, other)
    }

    /// Domain ordering. `None` when the values are in different domains or
    /// the comparison involves NaN.
    pub fn compare(&self, other: &Value) -> Option<Ordering> {
        compare::partial_cmp_values(self, other)
    }

    /// Total order across all values, used by min/max folds.
    pub fn total_cmp(&self, other: &Value) -> Ordering {
        compare::total_cmp_values(self, other)
    }

    /// Grouping identity: equal values share an id and all NaNs share one id.
    pub fn canonical_id(&self) -> String {
        let mut out = String::new();
        write_canonical(self, &mut out);
        out
    }

    /// Converts a JSON value. Integral numbers that fit in i64 become
    /// `Integer`, all other numbers become `Double`.
    pub fn from_json(json: serde_json::Value) -> Value {
        match json {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Boolean(b),
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(i) => Value::Integer(i),
                None => Value::Double(n.as_f64().unwrap_or(f64::NAN)),
            },
            serde_json::Value::String(s) => Value::String(s),
            serde_json::Value::Array(values) => {
                Value::Array(values.into_iter().map(Value::from_json).collect())
            }
            serde_json::Value::Object(object) => Value::Map(
                object
                    .into_iter()
                    .map(|(k, v)| (k, Value::from_json(v)))
                    .collect(),
            ),
        }
    }
}

/// Map representation of a vector: `{"__type__": "__vector__", "value": [...]}`.
pub fn vector_as_map(values: &[f64]) -> MapValue {
    let mut map = MapValue::with_capacity(2);
    map.insert(
        VECTOR_TYPE_KEY.to_string(),
        Value::String(VECTOR_TYPE_VALUE.to_string()),
    );
    map.insert(
        VECTOR_VALUE_KEY.to_string(),
        Value::Array(values.iter().map(|d| Value::Double(*d)).collect()),
    );
    map
}

fn write_canonical(value: &Value, out: &mut String) {
    match value {
        Value::Null => out.push_str("null"),
        Value::Boolean(b) => out.push_str(if *b { "true" } else { "false" }),
        Value::Integer(i) => out.push_str(&i.to_string()),
        Value::Double(d) => out.push_str(&canonical_double(*d)),
        Value::Timestamp(ts) => {
            out.push_str(&format!("time({},{})", ts.seconds(), ts.nanos()))
        }
        Value::String(s) => out.push_str(&format!("{:?}", s)),
        Value::Bytes(b) => out.push_str(&format!("bytes({})", STANDARD.encode(b))),
        Value::Reference(key) => out.push_str(&format!("ref({})", key)),
        Value::GeoPoint(g) => out.push_str(&format!(
            "geo({},{})",
            canonical_double(g.latitude),
            canonical_double(g.longitude)
        )),
        Value::Array(values) => {
            out.push('[');
            for (i, v) in values.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_canonical(v, out);
            }
            out.push(']');
        }
        Value::Map(map) => write_canonical_map(map, out),
        Value::Vector(v) => write_canonical_map(&vector_as_map(v), out),
    }
}

fn write_canonical_map(map: &MapValue, out: &mut String) {
    let mut keys: Vec<&String> = map.keys().collect();
    keys.sort();

    out.push('{');
    for (i, key) in keys.into_iter().enumerate() {
        if i > 0 {
            out.push(',');
        }
        out.push_str(&format!("{:?}:", key));
        write_canonical(&map[key.as_str()], out);
    }
    out.push('}');
}

/// Integral doubles share the id of the equal integer; -0.0 shares the id of 0.
fn canonical_double(d: f64) -> String {
    if d.is_nan() {
        return "NaN".to_string();
    }
    if d.fract() == 0.0 && d >= -9_223_372_036_854_775_808.0 && d < 9_223_372_036_854_775_808.0 {
        return (d as i64).to_string();
    }
    format!("{:?}", d)
}

/// Structural identity, not query equality. Doubles match by bit pattern
/// with all NaNs treated as identical.
impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        fn same_double(a: f64, b: f64) -> bool {
            a.to_bits() == b.to_bits() || (a.is_nan() && b.is_nan())
        }

        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Boolean(a), Value::Boolean(b)) => a == b,
            (Value::Integer(a), Value::Integer(b)) => a == b,
            (Value::Double(a), Value::Double(b)) => same_double(*a, *b),
            (Value::Timestamp(a), Value::Timestamp(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Bytes(a), Value::Bytes(b)) => a == b,
            (Value::Reference(a), Value::Reference(b)) => a == b,
            (Value::GeoPoint(a), Value::GeoPoint(b)) => {
                same_double(a.latitude, b.latitude) && same_double(a.longitude, b.longitude)
            }
            (Value::Array(a), Value::Array(b)) => a == b,
            (Value::Map(a), Value::Map(b)) => a == b,
            (Value::Vector(a), Value::Vector(b)) => {
                a.len() == b.len() && a.iter().zip(b).all(|(x, y)| same_double(*x, *y))
            }
            _ => false,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Boolean(b) => write!(f, "{}", b),
            Value::Integer(i) => write!(f, "{}", i),
            Value::Double(d) => write!(f, "{:?}", d),
            Value::Timestamp(ts) => write!(f, "{}", ts),
            Value::String(s) => write!(f, "{:?}", s),
            Value::Bytes(b) => write!(f, "b64:{}", STANDARD.encode(b)),
            Value::Reference(key) => write!(f, "/{}", key),
            Value::GeoPoint(g) => write!(f, "geo({:?}, {:?})", g.latitude, g.longitude),
            Value::Array(values) => {
                write!(f, "[")?;
                for (i, v) in values.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", v)?;
                }
                write!(f, "]")
            }
            Value::Map(map) => {
                write!(f, "{{")?;
                for (i, (k, v)) in map.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{:?}: {}", k, v)?;
                }
                write!(f, "}}")
            }
            Value::Vector(v) => write!(f, "vector{:?}", v),
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Boolean(b)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Integer(i)
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Value::Integer(i as i64)
    }
}

impl From<f64> for Value {
    fn from(d: f64) -> Self {
        Value::Double(d)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<Timestamp> for Value {
    fn from(ts: Timestamp) -> Self {
        Value::Timestamp(ts)
    }
}

impl From<DocumentKey> for Value {
    fn from(key: DocumentKey) -> Self {
        Value::Reference(key)
    }
}

impl From<Vec<Value>> for Value {
    fn from(values: Vec<Value>) -> Self {
        Value::Array(values)
    }
}

impl From<MapValue> for Value {
    fn from(map: MapValue) -> Self {
        Value::Map(map)
    }
}
