//! `Distinct` and `Aggregate` stages
//!
//! Both stages group documents by the tuple of their evaluated group keys.
//! Groups are emitted in order of first appearance. A key that evaluates to
//! Absent groups as Null; a key that evaluates to Error drops the document.

use std::collections::HashSet;

use indexmap::IndexMap;

use crate::document::set_field;
use crate::evaluator::EvalResult;
use crate::expr::{AggregateKind, AliasedAggregate, AliasedExpr};
use crate::value::{MapValue, Value};

use super::executor::StageContext;
use super::result::PipelineDocument;

/// Evaluates group keys; `None` when any key is an Error.
fn group_keys(
    groups: &[AliasedExpr],
    doc: &PipelineDocument,
    ctx: &mut StageContext<'_>,
) -> Option<Vec<Value>> {
    groups
        .iter()
        .map(|group| match ctx.evaluate(&group.expr, doc) {
            EvalResult::Value(v) => Some(v),
            EvalResult::Absent => Some(Value::Null),
            EvalResult::Error(_) => None,
        })
        .collect()
}

fn key_fields(groups: &[AliasedExpr], keys: Vec<Value>) -> MapValue {
    let mut fields = MapValue::with_capacity(groups.len());
    for (group, key) in groups.iter().zip(keys) {
        set_field(&mut fields, &group.alias, key);
    }
    fields
}

/// One document per distinct key tuple.
///
/// The emitted document keeps the identity of the group's first document and
/// carries only the key fields.
pub struct DistinctFilter;

impl DistinctFilter {
    pub(super) fn apply(
        groups: &[AliasedExpr],
        documents: Vec<PipelineDocument>,
        ctx: &mut StageContext<'_>,
    ) -> Vec<PipelineDocument> {
        let mut seen: IndexMap<String, PipelineDocument> = IndexMap::new();

        for doc in documents {
            let Some(keys) = group_keys(groups, &doc, ctx) else {
                continue;
            };
            let id = Value::Array(keys.clone()).canonical_id();
            if !seen.contains_key(&id) {
                let representative = doc.with_fields(key_fields(groups, keys));
                seen.insert(id, representative);
            }
        }

        seen.into_values().collect()
    }
}

/// Running state of a single accumulator.
#[derive(Debug)]
enum Accumulator {
    Count(i64),
    CountDistinct(HashSet<String>),
    Sum(Sum),
    Average { total: f64, count: i64 },
    Extreme { best: Option<Value>, maximum: bool },
}

#[derive(Debug, Clone, Copy)]
enum Sum {
    Empty,
    Integer(i64),
    Double(f64),
}

impl Sum {
    fn add(self, value: &Value) -> Sum {
        match (self, value) {
            (Sum::Empty, Value::Integer(i)) => Sum::Integer(*i),
            (Sum::Empty, Value::Double(d)) => Sum::Double(*d),
            (Sum::Integer(acc), Value::Integer(i)) => match acc.checked_add(*i) {
                Some(total) => Sum::Integer(total),
                None => Sum::Double(acc as f64 + *i as f64),
            },
            (Sum::Integer(acc), Value::Double(d)) => Sum::Double(acc as f64 + d),
            (Sum::Double(acc), Value::Integer(i)) => Sum::Double(acc + *i as f64),
            (Sum::Double(acc), Value::Double(d)) => Sum::Double(acc + d),
            (sum, _) => sum,
        }
    }

    fn into_value(self) -> Value {
        match self {
            Sum::Empty => Value::Null,
            Sum::Integer(i) => Value::Integer(i),
            Sum::Double(d) => Value::Double(d),
        }
    }
}

impl Accumulator {
    fn new(kind: AggregateKind) -> Self {
        match kind {
            AggregateKind::Count | AggregateKind::CountIf => Accumulator::Count(0),
            AggregateKind::CountDistinct => Accumulator::CountDistinct(HashSet::new()),
            AggregateKind::Sum => Accumulator::Sum(Sum::Empty),
            AggregateKind::Average => Accumulator::Average {
                total: 0.0,
                count: 0,
            },
            AggregateKind::Minimum => Accumulator::Extreme {
                best: None,
                maximum: false,
            },
            AggregateKind::Maximum => Accumulator::Extreme {
                best: None,
                maximum: true,
            },
        }
    }

    fn accumulate(
        &mut self,
        spec: &AliasedAggregate,
        doc: &PipelineDocument,
        ctx: &mut StageContext<'_>,
    ) {
        let function = &spec.function;

        // count() with no argument counts every document in the group
        let Some(arg) = function.args.first() else {
            if let Accumulator::Count(n) = self {
                *n += 1;
            }
            return;
        };

        let value = match ctx.evaluate(arg, doc) {
            EvalResult::Value(v) => v,
            EvalResult::Absent | EvalResult::Error(_) => return,
        };

        match self {
            Accumulator::Count(n) => {
                let counted = match function.kind {
                    AggregateKind::CountIf => matches!(value, Value::Boolean(true)),
                    _ => !value.is_null(),
                };
                if counted {
                    *n += 1;
                }
            }
            Accumulator::CountDistinct(ids) => {
                if !value.is_null() {
                    ids.insert(value.canonical_id());
                }
            }
            Accumulator::Sum(sum) => *sum = sum.add(&value),
            Accumulator::Average { total, count } => {
                let d = match value {
                    Value::Integer(i) => i as f64,
                    Value::Double(d) => d,
                    _ => return,
                };
                *total += d;
                *count += 1;
            }
            Accumulator::Extreme { best, maximum } => {
                if value.is_null() {
                    return;
                }
                let replace = match best {
                    None => true,
                    Some(current) => {
                        let ord = value.total_cmp(current);
                        if *maximum {
                            ord.is_gt()
                        } else {
                            ord.is_lt()
                        }
                    }
                };
                if replace {
                    *best = Some(value);
                }
            }
        }
    }

    fn finish(self) -> Value {
        match self {
            Accumulator::Count(n) => Value::Integer(n),
            Accumulator::CountDistinct(ids) => Value::Integer(ids.len() as i64),
            Accumulator::Sum(sum) => sum.into_value(),
            Accumulator::Average { total, count } => {
                if count == 0 {
                    Value::Null
                } else {
                    Value::Double(total / count as f64)
                }
            }
            Accumulator::Extreme { best, .. } => best.unwrap_or(Value::Null),
        }
    }
}

/// Grouped accumulation. Output documents have no identity.
pub struct Aggregator;

impl Aggregator {
    pub(super) fn apply(
        groups: &[AliasedExpr],
        accumulators: &[AliasedAggregate],
        documents: Vec<PipelineDocument>,
        ctx: &mut StageContext<'_>,
    ) -> Vec<PipelineDocument> {
        let fresh = || -> Vec<Accumulator> {
            accumulators
                .iter()
                .map(|spec| Accumulator::new(spec.function.kind))
                .collect()
        };

        let mut buckets: IndexMap<String, (Vec<Value>, Vec<Accumulator>)> = IndexMap::new();

        // a global aggregate yields one row even over no input
        if groups.is_empty() {
            buckets.insert(Value::Array(Vec::new()).canonical_id(), (Vec::new(), fresh()));
        }

        for doc in &documents {
            let Some(keys) = group_keys(groups, doc, ctx) else {
                continue;
            };
            let id = Value::Array(keys.clone()).canonical_id();
            let (_, states) = buckets.entry(id).or_insert_with(|| (keys, fresh()));
            for (state, spec) in states.iter_mut().zip(accumulators) {
                state.accumulate(spec, doc, ctx);
            }
        }

        buckets
            .into_values()
            .map(|(keys, states)| {
                let mut fields = key_fields(groups, keys);
                for (state, spec) in states.into_iter().zip(accumulators) {
                    set_field(&mut fields, &spec.alias, state.finish());
                }
                PipelineDocument::keyless(fields)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EngineConfig;
    use crate::document::Document;
    use crate::expr::builder::*;
    use crate::observability::Logger;
    use crate::value::Timestamp;
    use serde_json::json;

    fn orders() -> Vec<PipelineDocument> {
        [
            ("orders/1", json!({"region": "eu", "amount": 10, "paid": true})),
            ("orders/2", json!({"region": "us", "amount": 2.5, "paid": false})),
            ("orders/3", json!({"region": "eu", "amount": 30, "paid": true})),
            ("orders/4", json!({"amount": 7, "paid": true})),
            ("orders/5", json!({"region": "eu", "amount": null})),
        ]
        .into_iter()
        .map(|(path, body)| {
            Document::from_json(path, Timestamp::from_seconds(1).unwrap(), body)
                .unwrap()
                .into()
        })
        .collect()
    }

    fn with_ctx<T>(f: impl FnOnce(&mut StageContext<'_>) -> T) -> T {
        let logger = Logger::default();
        let mut ctx = StageContext::new(&EngineConfig::default(), &logger);
        f(&mut ctx)
    }

    // =========================================================================
    // DISTINCT
    // =========================================================================

    #[test]
    fn test_distinct_first_appearance_order() {
        let out = with_ctx(|ctx| DistinctFilter::apply(&["region".into()], orders(), ctx));

        let regions: Vec<_> = out.iter().map(|d| d.get("region")).collect();
        assert_eq!(
            regions,
            [Some(Value::from("eu")), Some(Value::from("us")), Some(Value::Null)]
        );
        // representative identity is the first document of the group
        assert_eq!(out[0].path().as_deref(), Some("orders/1"));
        assert_eq!(out[2].path().as_deref(), Some("orders/4"));
        assert_eq!(out[0].get("amount"), None);
    }

    #[test]
    fn test_distinct_numeric_keys_unify() {
        let docs: Vec<PipelineDocument> = [json!({"n": 1}), json!({"n": 1.0}), json!({"n": 2})]
            .into_iter()
            .enumerate()
            .map(|(i, body)| {
                Document::from_json(&format!("n/{}", i), Timestamp::from_seconds(1).unwrap(), body)
                    .unwrap()
                    .into()
            })
            .collect();
        let out = with_ctx(|ctx| DistinctFilter::apply(&["n".into()], docs, ctx));
        assert_eq!(out.len(), 2);
    }

    #[test]
    fn test_distinct_skips_error_keys() {
        let out = with_ctx(|ctx| {
            let groups = [AliasedExpr::new("bucket", add(field("region"), 1))];
            let out = DistinctFilter::apply(&groups, orders(), ctx);
            assert_eq!(ctx.errors(), 5);
            out
        });
        assert!(out.is_empty());
    }

    // =========================================================================
    // AGGREGATE
    // =========================================================================

    #[test]
    fn test_global_aggregate() {
        let accumulators = [
            count_all().alias("rows"),
            count(field("amount")).alias("with_amount"),
            count_if(field("paid")).alias("paid"),
            sum(field("amount")).alias("total"),
            average(field("amount")).alias("mean"),
            minimum(field("amount")).alias("low"),
            maximum(field("amount")).alias("high"),
            count_distinct(field("region")).alias("regions"),
        ];
        let out = with_ctx(|ctx| Aggregator::apply(&[], &accumulators, orders(), ctx));

        assert_eq!(out.len(), 1);
        let row = &out[0];
        assert_eq!(row.key, None);
        assert_eq!(row.get("rows"), Some(Value::Integer(5)));
        assert_eq!(row.get("with_amount"), Some(Value::Integer(4)));
        assert_eq!(row.get("paid"), Some(Value::Integer(3)));
        assert_eq!(row.get("total"), Some(Value::Double(49.5)));
        assert_eq!(row.get("mean"), Some(Value::Double(49.5 / 4.0)));
        assert_eq!(row.get("low"), Some(Value::Double(2.5)));
        assert_eq!(row.get("high"), Some(Value::Integer(30)));
        assert_eq!(row.get("regions"), Some(Value::Integer(2)));
    }

    #[test]
    fn test_global_aggregate_over_nothing() {
        let accumulators = [
            count_all().alias("rows"),
            sum(field("amount")).alias("total"),
            average(field("amount")).alias("mean"),
            maximum(field("amount")).alias("high"),
        ];
        let out = with_ctx(|ctx| Aggregator::apply(&[], &accumulators, Vec::new(), ctx));

        assert_eq!(out.len(), 1);
        assert_eq!(out[0].get("rows"), Some(Value::Integer(0)));
        assert_eq!(out[0].get("total"), Some(Value::Null));
        assert_eq!(out[0].get("mean"), Some(Value::Null));
        assert_eq!(out[0].get("high"), Some(Value::Null));
    }

    #[test]
    fn test_grouped_aggregate() {
        let out = with_ctx(|ctx| {
            Aggregator::apply(
                &["region".into()],
                &[sum(field("amount")).alias("total"), count_all().alias("n")],
                orders(),
                ctx,
            )
        });

        assert_eq!(out.len(), 3);
        assert_eq!(out[0].get("region"), Some(Value::from("eu")));
        assert_eq!(out[0].get("total"), Some(Value::Integer(40)));
        assert_eq!(out[0].get("n"), Some(Value::Integer(3)));
        assert_eq!(out[1].get("total"), Some(Value::Double(2.5)));
        assert_eq!(out[2].get("region"), Some(Value::Null));
        assert_eq!(out[2].get("total"), Some(Value::Integer(7)));

        // grouped aggregates emit nothing over empty input
        let empty = with_ctx(|ctx| {
            Aggregator::apply(&["region".into()], &[count_all().alias("n")], Vec::new(), ctx)
        });
        assert!(empty.is_empty());
    }

    #[test]
    fn test_sum_promotes_on_overflow() {
        let sum = Sum::Empty
            .add(&Value::Integer(i64::MAX))
            .add(&Value::Integer(1));
        assert!(matches!(sum, Sum::Double(d) if d >= i64::MAX as f64));
        assert_eq!(
            Sum::Empty.add(&Value::Integer(2)).add(&Value::Integer(3)).into_value(),
            Value::Integer(5)
        );
    }
}
