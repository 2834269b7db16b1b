//! Function and accumulator kinds
//!
//! Every kind carries the wire name used by the query protocol. Arity and
//! argument shape are checked at evaluation time, not here.

use std::fmt;

/// Scalar function kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FunctionKind {
    // Comparison
    Eq,
    Neq,
    Lt,
    Lte,
    Gt,
    Gte,
    EqAny,
    NotEqAny,
    Exists,
    IsAbsent,
    IsNull,
    IsNotNull,
    IsNan,
    IsNotNan,
    ArrayContains,
    ArrayContainsAll,
    ArrayContainsAny,

    // Logical
    And,
    Or,
    Xor,
    Not,

    // Error observers and selection
    IsError,
    IfError,
    Cond,
    LogicalMaximum,
    LogicalMinimum,

    // Arithmetic
    Add,
    Subtract,
    Multiply,
    Divide,
    Mod,

    // String
    CharLength,
    ByteLength,
    ToLower,
    ToUpper,
    Trim,
    Reverse,
    StrConcat,
    Substr,
    ReplaceFirst,
    ReplaceAll,
    StrContains,
    StartsWith,
    EndsWith,
    Like,
    RegexContains,
    RegexMatch,

    // Array
    ArrayLength,
    ArrayReverse,
    ArrayConcat,
    ArrayGet,

    // Map
    Map,
    MapGet,
    MapMerge,
    MapRemove,

    // Vector
    CosineDistance,
    DotProduct,
    EuclideanDistance,
    ManhattanDistance,
    VectorLength,

    // Timestamp
    UnixMicrosToTimestamp,
    UnixMillisToTimestamp,
    UnixSecondsToTimestamp,
    TimestampToUnixMicros,
    TimestampToUnixMillis,
    TimestampToUnixSeconds,
    TimestampAdd,
    TimestampSub,

    // Document
    DocumentId,
}

impl FunctionKind {
    pub const ALL: &'static [FunctionKind] = &[
        FunctionKind::Eq,
        FunctionKind::Neq,
        FunctionKind::Lt,
        FunctionKind::Lte,
        FunctionKind::Gt,
        FunctionKind::Gte,
        FunctionKind::EqAny,
        FunctionKind::NotEqAny,
        FunctionKind::Exists,
        FunctionKind::IsAbsent,
        FunctionKind::IsNull,
        FunctionKind::IsNotNull,
        FunctionKind::IsNan,
        FunctionKind::IsNotNan,
        FunctionKind::ArrayContains,
        FunctionKind::ArrayContainsAll,
        FunctionKind::ArrayContainsAny,
        FunctionKind::And,
        FunctionKind::Or,
        FunctionKind::Xor,
        FunctionKind::Not,
        FunctionKind::IsError,
        FunctionKind::IfError,
        FunctionKind::Cond,
        FunctionKind::LogicalMaximum,
        FunctionKind::LogicalMinimum,
        FunctionKind::Add,
        FunctionKind::Subtract,
        FunctionKind::Multiply,
        FunctionKind::Divide,
        FunctionKind::Mod,
        FunctionKind::CharLength,
        FunctionKind::ByteLength,
        FunctionKind::ToLower,
        FunctionKind::ToUpper,
        FunctionKind::Trim,
        FunctionKind::Reverse,
        FunctionKind::StrConcat,
        FunctionKind::Substr,
        FunctionKind::ReplaceFirst,
        FunctionKind::ReplaceAll,
        FunctionKind::StrContains,
        FunctionKind::StartsWith,
        FunctionKind::EndsWith,
        FunctionKind::Like,
        FunctionKind::RegexContains,
        FunctionKind::RegexMatch,
        FunctionKind::ArrayLength,
        FunctionKind::ArrayReverse,
        FunctionKind::ArrayConcat,
        FunctionKind::ArrayGet,
        FunctionKind::Map,
        FunctionKind::MapGet,
        FunctionKind::MapMerge,
        FunctionKind::MapRemove,
        FunctionKind::CosineDistance,
        FunctionKind::DotProduct,
        FunctionKind::EuclideanDistance,
        FunctionKind::ManhattanDistance,
        FunctionKind::VectorLength,
        FunctionKind::UnixMicrosToTimestamp,
        FunctionKind::UnixMillisToTimestamp,
        FunctionKind::UnixSecondsToTimestamp,
        FunctionKind::TimestampToUnixMicros,
        FunctionKind::TimestampToUnixMillis,
        FunctionKind::TimestampToUnixSeconds,
        FunctionKind::TimestampAdd,
        FunctionKind::TimestampSub,
        FunctionKind::DocumentId,
    ];

    /// Wire name
    pub fn name(&self) -> &'static str {
        match self {
            FunctionKind::Eq => "eq",
            FunctionKind::Neq => "neq",
            FunctionKind::Lt => "lt",
            FunctionKind::Lte => "lte",
            FunctionKind::Gt => "gt",
            FunctionKind::Gte => "gte",
            FunctionKind::EqAny => "eq_any",
            FunctionKind::NotEqAny => "not_eq_any",
            FunctionKind::Exists => "exists",
            FunctionKind::IsAbsent => "is_absent",
            FunctionKind::IsNull => "is_null",
            FunctionKind::IsNotNull => "is_not_null",
            FunctionKind::IsNan => "is_nan",
            FunctionKind::IsNotNan => "is_not_nan",
            FunctionKind::ArrayContains => "array_contains",
            FunctionKind::ArrayContainsAll => "array_contains_all",
            FunctionKind::ArrayContainsAny => "array_contains_any",
            FunctionKind::And => "and",
            FunctionKind::Or => "or",
            FunctionKind::Xor => "xor",
            FunctionKind::Not => "not",
            FunctionKind::IsError => "is_error",
            FunctionKind::IfError => "if_error",
            FunctionKind::Cond => "cond",
            FunctionKind::LogicalMaximum => "logical_maximum",
            FunctionKind::LogicalMinimum => "logical_minimum",
            FunctionKind::Add => "add",
            FunctionKind::Subtract => "subtract",
            FunctionKind::Multiply => "multiply",
            FunctionKind::Divide => "divide",
            FunctionKind::Mod => "mod",
            FunctionKind::CharLength => "char_length",
            FunctionKind::ByteLength => "byte_length",
            FunctionKind::ToLower => "to_lower",
            FunctionKind::ToUpper => "to_upper",
            FunctionKind::Trim => "trim",
            FunctionKind::Reverse => "reverse",
            FunctionKind::StrConcat => "str_concat",
            FunctionKind::Substr => "substr",
            FunctionKind::ReplaceFirst => "replace_first",
            FunctionKind::ReplaceAll => "replace_all",
            FunctionKind::StrContains => "str_contains",
            FunctionKind::StartsWith => "starts_with",
            FunctionKind::EndsWith => "ends_with",
            FunctionKind::Like => "like",
            FunctionKind::RegexContains => "regex_contains",
            FunctionKind::RegexMatch => "regex_match",
            FunctionKind::ArrayLength => "array_length",
            FunctionKind::ArrayReverse => "array_reverse",
            FunctionKind::ArrayConcat => "array_concat",
            FunctionKind::ArrayGet => "array_get",
            FunctionKind::Map => "map",
            FunctionKind::MapGet => "map_get",
            FunctionKind::MapMerge => "map_merge",
            FunctionKind::MapRemove => "map_remove",
            FunctionKind::CosineDistance => "cosine_distance",
            FunctionKind::DotProduct => "dot_product",
            FunctionKind::EuclideanDistance => "euclidean_distance",
            FunctionKind::ManhattanDistance => "manhattan_distance",
            FunctionKind::VectorLength => "vector_length",
            FunctionKind::UnixMicrosToTimestamp => "unix_micros_to_timestamp",
            FunctionKind::UnixMillisToTimestamp => "unix_millis_to_timestamp",
            FunctionKind::UnixSecondsToTimestamp => "unix_seconds_to_timestamp",
            FunctionKind::TimestampToUnixMicros => "timestamp_to_unix_micros",
            FunctionKind::TimestampToUnixMillis => "timestamp_to_unix_millis",
            FunctionKind::TimestampToUnixSeconds => "timestamp_to_unix_seconds",
            FunctionKind::TimestampAdd => "timestamp_add",
            FunctionKind::TimestampSub => "timestamp_sub",
            FunctionKind::DocumentId => "document_id",
        }
    }

    /// Looks up a kind by wire name. `array_offset` is accepted as an alias
    /// of `array_get`.
    pub fn from_name(name: &str) -> Option<Self> {
        if name == "array_offset" {
            return Some(FunctionKind::ArrayGet);
        }
        Self::ALL.iter().copied().find(|kind| kind.name() == name)
    }

    /// Whether the function always yields a boolean (or an error).
    pub fn is_boolean(&self) -> bool {
        matches!(
            self,
            FunctionKind::Eq
                | FunctionKind::Neq
                | FunctionKind::Lt
                | FunctionKind::Lte
                | FunctionKind::Gt
                | FunctionKind::Gte
                | FunctionKind::EqAny
                | FunctionKind::NotEqAny
                | FunctionKind::Exists
                | FunctionKind::IsAbsent
                | FunctionKind::IsNull
                | FunctionKind::IsNotNull
                | FunctionKind::IsNan
                | FunctionKind::IsNotNan
                | FunctionKind::ArrayContains
                | FunctionKind::ArrayContainsAll
                | FunctionKind::ArrayContainsAny
                | FunctionKind::And
                | FunctionKind::Or
                | FunctionKind::Xor
                | FunctionKind::Not
                | FunctionKind::IsError
                | FunctionKind::StrContains
                | FunctionKind::StartsWith
                | FunctionKind::EndsWith
                | FunctionKind::Like
                | FunctionKind::RegexContains
                | FunctionKind::RegexMatch
        )
    }
}

impl fmt::Display for FunctionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Accumulator kinds used by the Aggregate stage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AggregateKind {
    Count,
    CountIf,
    CountDistinct,
    Sum,
    Average,
    Minimum,
    Maximum,
}

impl AggregateKind {
    pub fn name(&self) -> &'static str {
        match self {
            AggregateKind::Count => "count",
            AggregateKind::CountIf => "count_if",
            AggregateKind::CountDistinct => "count_distinct",
            AggregateKind::Sum => "sum",
            AggregateKind::Average => "average",
            AggregateKind::Minimum => "minimum",
            AggregateKind::Maximum => "maximum",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "count" => Some(AggregateKind::Count),
            "count_if" => Some(AggregateKind::CountIf),
            "count_distinct" => Some(AggregateKind::CountDistinct),
            "sum" => Some(AggregateKind::Sum),
            "average" | "avg" => Some(AggregateKind::Average),
            "minimum" => Some(AggregateKind::Minimum),
            "maximum" => Some(AggregateKind::Maximum),
            _ => None,
        }
    }
}

impl fmt::Display for AggregateKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_names_round_trip() {
        for kind in FunctionKind::ALL {
            assert_eq!(FunctionKind::from_name(kind.name()), Some(*kind));
        }
    }

    #[test]
    fn test_aliases() {
        assert_eq!(FunctionKind::from_name("array_offset"), Some(FunctionKind::ArrayGet));
        assert_eq!(AggregateKind::from_name("avg"), Some(AggregateKind::Average));
        assert_eq!(FunctionKind::from_name("no_such_function"), None);
    }

    #[test]
    fn test_boolean_kinds() {
        assert!(FunctionKind::Eq.is_boolean());
        assert!(FunctionKind::RegexMatch.is_boolean());
        assert!(FunctionKind::IsError.is_boolean());
        assert!(!FunctionKind::Add.is_boolean());
        assert!(!FunctionKind::Cond.is_boolean());
        assert!(!FunctionKind::IfError.is_boolean());
    }
}
