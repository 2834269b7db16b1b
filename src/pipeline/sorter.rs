//! Result sorting for pipeline execution
//!
//! Ordering rules, per sort key:
//! - Concrete values compare within their ordering domain, direction applied
//! - Pairs with no defined order (different domains, NaN, Null against a
//!   non-Null) are undetermined and fall through to the next sort key
//! - Absent or Error keys sort after every concrete key in either direction
//! - Two missing keys tie and fall through to the next sort key
//!
//! Remaining ties break by document key ascending. Keyless documents come
//! after keyed ones and keep their input order (the sort is stable).

use std::cmp::Ordering;

use crate::document::DocumentKey;
use crate::evaluator::EvalResult;
use crate::expr::{SortDirection, SortSpec};
use crate::value::Value;

use super::executor::StageContext;
use super::result::PipelineDocument;

type Keyed = (Vec<Option<Value>>, PipelineDocument);

/// Sorts stage documents
pub struct ResultSorter;

impl ResultSorter {
    pub(super) fn sort(
        orderings: &[SortSpec],
        documents: Vec<PipelineDocument>,
        ctx: &mut StageContext<'_>,
    ) -> Vec<PipelineDocument> {
        // keys are evaluated once per document
        let keyed: Vec<Keyed> = documents
            .into_iter()
            .map(|doc| {
                let keys = orderings
                    .iter()
                    .map(|ordering| match ctx.evaluate(&ordering.expr, &doc) {
                        EvalResult::Value(v) => Some(v),
                        EvalResult::Absent | EvalResult::Error(_) => None,
                    })
                    .collect();
                (keys, doc)
            })
            .collect();

        let compare = |(a_keys, a_doc): &Keyed, (b_keys, b_doc): &Keyed| {
            for ((a, b), ordering) in a_keys.iter().zip(b_keys).zip(orderings) {
                match Self::compare_keys(a.as_ref(), b.as_ref(), ordering.direction) {
                    Some(Ordering::Equal) | None => continue,
                    Some(ord) => return ord,
                }
            }
            Self::compare_identity(a_doc.key.as_ref(), b_doc.key.as_ref())
        };

        merge_sort(keyed, &compare)
            .into_iter()
            .map(|(_, doc)| doc)
            .collect()
    }

    /// `None` when the pair has no defined order.
    fn compare_keys(
        a: Option<&Value>,
        b: Option<&Value>,
        direction: SortDirection,
    ) -> Option<Ordering> {
        match (a, b) {
            (None, None) => Some(Ordering::Equal),
            (None, Some(_)) => Some(Ordering::Greater),
            (Some(_), None) => Some(Ordering::Less),
            (Some(a), Some(b)) => match direction {
                SortDirection::Asc => a.compare(b),
                SortDirection::Desc => b.compare(a),
            },
        }
    }

    fn compare_identity(a: Option<&DocumentKey>, b: Option<&DocumentKey>) -> Ordering {
        match (a, b) {
            (Some(a), Some(b)) => a.cmp(b),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        }
    }
}

/// Stable top-down merge sort.
///
/// Undetermined pairs make the comparator non-transitive, which the slice
/// sorts may reject with a panic. Here an inconsistent comparator only
/// yields some permutation, deterministic for a fixed input order.
fn merge_sort<T>(mut items: Vec<T>, compare: &impl Fn(&T, &T) -> Ordering) -> Vec<T> {
    if items.len() <= 1 {
        return items;
    }
    let right = items.split_off(items.len() / 2);
    let left = merge_sort(items, compare);
    let right = merge_sort(right, compare);

    let mut merged = Vec::with_capacity(left.len() + right.len());
    let mut left = left.into_iter().peekable();
    let mut right = right.into_iter().peekable();
    loop {
        let take_right = match (left.peek(), right.peek()) {
            (Some(l), Some(r)) => compare(r, l) == Ordering::Less,
            (Some(_), None) => false,
            (None, Some(_)) => true,
            (None, None) => break,
        };
        let next = if take_right { right.next() } else { left.next() };
        merged.extend(next);
    }
    merged
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EngineConfig;
    use crate::document::Document;
    use crate::expr::builder::*;
    use crate::observability::Logger;
    use crate::value::{MapValue, Timestamp};
    use serde_json::json;

    fn doc(path: &str, body: serde_json::Value) -> PipelineDocument {
        Document::from_json(path, Timestamp::from_seconds(1).unwrap(), body)
            .unwrap()
            .into()
    }

    fn sorted(orderings: &[SortSpec], docs: Vec<PipelineDocument>) -> Vec<String> {
        let logger = Logger::default();
        let mut ctx = StageContext::new(&EngineConfig::default(), &logger);
        ResultSorter::sort(orderings, docs, &mut ctx)
            .iter()
            .map(|d| d.path().unwrap_or_else(|| "-".to_string()))
            .collect()
    }

    fn ages() -> Vec<PipelineDocument> {
        vec![
            doc("p/none", json!({})),
            doc("p/old", json!({"age": 75.5})),
            doc("p/young", json!({"age": 25})),
        ]
    }

    #[test]
    fn test_absent_sorts_last_ascending() {
        assert_eq!(
            sorted(&[SortSpec::asc(field("age"))], ages()),
            ["p/young", "p/old", "p/none"]
        );
    }

    #[test]
    fn test_absent_sorts_last_descending() {
        assert_eq!(
            sorted(&[SortSpec::desc(field("age"))], ages()),
            ["p/old", "p/young", "p/none"]
        );
    }

    #[test]
    fn test_error_keys_sort_with_absent() {
        let docs = vec![
            doc("p/c", json!({"age": "x"})),
            doc("p/b", json!({})),
            doc("p/a", json!({"age": 1})),
        ];
        assert_eq!(
            sorted(&[SortSpec::asc(add(field("age"), 1))], docs),
            ["p/a", "p/b", "p/c"]
        );
    }

    #[test]
    fn test_multi_key_and_key_tiebreak() {
        let docs = vec![
            doc("p/d", json!({"team": "red", "score": 1})),
            doc("p/c", json!({"team": "blue", "score": 5})),
            doc("p/b", json!({"team": "red", "score": 5})),
            doc("p/a", json!({"team": "red", "score": 5})),
        ];
        assert_eq!(
            sorted(
                &[SortSpec::asc(field("team")), SortSpec::desc(field("score"))],
                docs
            ),
            ["p/c", "p/a", "p/b", "p/d"]
        );
    }

    #[test]
    fn test_mixed_types_fall_back_to_key() {
        let docs = vec![
            doc("p/s", json!({"v": "a"})),
            doc("p/n", json!({"v": 1})),
            doc("p/z", json!({"v": null})),
            doc("p/b", json!({"v": true})),
        ];
        assert_eq!(
            sorted(&[SortSpec::asc(field("v"))], docs),
            ["p/b", "p/n", "p/s", "p/z"]
        );
    }

    // =========================================================================
    // Undetermined Keys
    // =========================================================================

    fn xy(path: &str, x: Value, y: i64) -> PipelineDocument {
        let mut fields = MapValue::new();
        fields.insert("x".into(), x);
        fields.insert("y".into(), Value::Integer(y));
        Document::new(
            DocumentKey::parse(path).unwrap(),
            Timestamp::from_seconds(1).unwrap(),
            fields,
        )
        .into()
    }

    fn by_x_then_y() -> [SortSpec; 2] {
        [SortSpec::asc(field("x")), SortSpec::asc(field("y"))]
    }

    #[test]
    fn test_cross_domain_key_defers_to_next_ordering() {
        let docs = vec![
            xy("p/a", Value::Integer(1), 2),
            xy("p/b", Value::from("s"), 1),
        ];
        assert_eq!(sorted(&by_x_then_y(), docs), ["p/b", "p/a"]);
    }

    #[test]
    fn test_nan_key_defers_to_next_ordering() {
        let docs = vec![
            xy("p/b", Value::Double(f64::NAN), 2),
            xy("p/a", Value::Integer(1), 1),
        ];
        assert_eq!(sorted(&by_x_then_y(), docs.clone()), ["p/a", "p/b"]);

        let reversed: Vec<_> = docs.into_iter().rev().collect();
        assert_eq!(sorted(&by_x_then_y(), reversed), ["p/a", "p/b"]);
    }

    #[test]
    fn test_null_against_value_defers_to_next_ordering() {
        let docs = vec![
            xy("p/a", Value::Null, 9),
            xy("p/b", Value::Integer(5), 3),
        ];
        assert_eq!(sorted(&by_x_then_y(), docs), ["p/b", "p/a"]);
    }

    #[test]
    fn test_inconsistent_keys_do_not_panic() {
        // 1 < 2 within numbers, but both are undetermined against strings
        let values = [
            Value::Integer(2),
            Value::from("m"),
            Value::Integer(1),
            Value::Double(f64::NAN),
            Value::from("a"),
            Value::Null,
            Value::Boolean(true),
        ];
        let docs: Vec<_> = (0..64)
            .map(|i| xy(&format!("p/{:02}", i), values[i % values.len()].clone(), (i % 5) as i64))
            .collect();

        let first = sorted(&by_x_then_y(), docs.clone());
        assert_eq!(first.len(), 64);
        assert_eq!(first, sorted(&by_x_then_y(), docs));
    }

    #[test]
    fn test_sort_is_idempotent() {
        let once = {
            let logger = Logger::default();
            let mut ctx = StageContext::new(&EngineConfig::default(), &logger);
            ResultSorter::sort(&[SortSpec::asc(field("age"))], ages(), &mut ctx)
        };
        let twice = sorted(&[SortSpec::asc(field("age"))], once.clone());
        let once: Vec<_> = once.iter().filter_map(PipelineDocument::path).collect();
        assert_eq!(once, twice);
    }

    #[test]
    fn test_keyless_documents_keep_input_order() {
        let mut first = MapValue::new();
        first.insert("n".into(), Value::Integer(1));
        let mut second = MapValue::new();
        second.insert("n".into(), Value::Integer(2));

        let logger = Logger::default();
        let mut ctx = StageContext::new(&EngineConfig::default(), &logger);
        let out = ResultSorter::sort(
            &[SortSpec::asc(field("missing"))],
            vec![
                PipelineDocument::keyless(second),
                doc("p/a", json!({})),
                PipelineDocument::keyless(first),
            ],
            &mut ctx,
        );

        assert_eq!(out[0].path().as_deref(), Some("p/a"));
        assert_eq!(out[1].get("n"), Some(Value::Integer(2)));
        assert_eq!(out[2].get("n"), Some(Value::Integer(1)));
    }
}
