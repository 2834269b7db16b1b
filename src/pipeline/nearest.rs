//! FindNearest stage

use std::cmp::Ordering;

use crate::document::set_field;
use crate::evaluator::{cosine_distance, dot_product, euclidean_distance, EvalResult};
use crate::value::Value;

use super::executor::StageContext;
use super::result::PipelineDocument;
use super::stage::{DistanceMeasure, FindNearestSpec};

/// Ranks documents by vector distance to a target.
///
/// A document survives only when its field is a `Vector` with the target's
/// dimension and the distance is a number. Cosine and euclidean rank
/// ascending, dot product descending. Equal distances keep document key
/// order.
pub struct NearestNeighbors;

impl NearestNeighbors {
    pub(super) fn apply(
        spec: &FindNearestSpec,
        documents: Vec<PipelineDocument>,
        ctx: &mut StageContext<'_>,
    ) -> Vec<PipelineDocument> {
        let mut ranked: Vec<(f64, PipelineDocument)> = documents
            .into_iter()
            .filter_map(|doc| {
                let distance = match ctx.evaluate(&spec.field, &doc) {
                    EvalResult::Value(Value::Vector(v)) if v.len() == spec.target.len() => {
                        Self::distance(spec.measure, &v, &spec.target)?
                    }
                    _ => return None,
                };
                Some((distance, doc))
            })
            .collect();

        ranked.sort_by(|(a, a_doc), (b, b_doc)| {
            let by_distance = if spec.measure.descending() {
                b.total_cmp(a)
            } else {
                a.total_cmp(b)
            };
            by_distance.then_with(|| match (&a_doc.key, &b_doc.key) {
                (Some(a), Some(b)) => a.cmp(b),
                (Some(_), None) => Ordering::Less,
                (None, Some(_)) => Ordering::Greater,
                (None, None) => Ordering::Equal,
            })
        });

        if let Some(limit) = spec.limit {
            ranked.truncate(limit);
        }

        ranked
            .into_iter()
            .map(|(distance, mut doc)| {
                if let Some(alias) = &spec.distance_field {
                    set_field(&mut doc.fields, alias, Value::Double(distance));
                }
                doc
            })
            .collect()
    }

    fn distance(measure: DistanceMeasure, v: &[f64], target: &[f64]) -> Option<f64> {
        let d = match measure {
            DistanceMeasure::Cosine => cosine_distance(v, target)?,
            DistanceMeasure::Euclidean => euclidean_distance(v, target),
            DistanceMeasure::DotProduct => dot_product(v, target),
        };
        (!d.is_nan()).then_some(d)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EngineConfig;
    use crate::document::{Document, DocumentKey};
    use crate::expr::builder::*;
    use crate::observability::Logger;
    use crate::value::{MapValue, Timestamp};

    fn doc(path: &str, embedding: Option<Value>) -> PipelineDocument {
        let mut fields = MapValue::new();
        if let Some(v) = embedding {
            fields.insert("embedding".into(), v);
        }
        Document::new(
            DocumentKey::parse(path).unwrap(),
            Timestamp::from_seconds(1).unwrap(),
            fields,
        )
        .into()
    }

    fn corpus() -> Vec<PipelineDocument> {
        vec![
            doc("v/far", Some(Value::Vector(vec![10.0, 0.0]))),
            doc("v/near", Some(Value::Vector(vec![1.0, 0.1]))),
            doc("v/wrong_dim", Some(Value::Vector(vec![1.0, 0.0, 0.0]))),
            doc("v/not_vector", Some(Value::Array(vec![Value::Double(1.0), Value::Double(0.0)]))),
            doc("v/missing", None),
            doc("v/mid", Some(Value::Vector(vec![3.0, 3.0]))),
        ]
    }

    fn run(spec: &FindNearestSpec) -> Vec<PipelineDocument> {
        let logger = Logger::default();
        let mut ctx = StageContext::new(&EngineConfig::default(), &logger);
        NearestNeighbors::apply(spec, corpus(), &mut ctx)
    }

    fn paths(docs: &[PipelineDocument]) -> Vec<String> {
        docs.iter().filter_map(PipelineDocument::path).collect()
    }

    #[test]
    fn test_euclidean_ascending_drops_non_vectors() {
        let spec = FindNearestSpec::new(field("embedding"), vec![1.0, 0.0], DistanceMeasure::Euclidean);
        assert_eq!(paths(&run(&spec)), ["v/near", "v/mid", "v/far"]);
    }

    #[test]
    fn test_dot_product_descending() {
        let spec = FindNearestSpec::new(field("embedding"), vec![1.0, 0.0], DistanceMeasure::DotProduct);
        assert_eq!(paths(&run(&spec)), ["v/far", "v/mid", "v/near"]);
    }

    #[test]
    fn test_cosine_with_limit_and_distance_field() {
        let spec = FindNearestSpec::new(field("embedding"), vec![1.0, 0.0], DistanceMeasure::Cosine)
            .with_limit(2)
            .with_distance_field("dist");
        let out = run(&spec);

        // "far" is collinear with the target
        assert_eq!(paths(&out), ["v/far", "v/near"]);
        assert_eq!(out[0].get("dist"), Some(Value::Double(0.0)));
        assert!(matches!(out[1].get("dist"), Some(Value::Double(d)) if d > 0.0));
    }

    #[test]
    fn test_zero_vector_dropped_for_cosine() {
        let logger = Logger::default();
        let mut ctx = StageContext::new(&EngineConfig::default(), &logger);
        let spec = FindNearestSpec::new(field("embedding"), vec![1.0, 0.0], DistanceMeasure::Cosine);
        let out = NearestNeighbors::apply(
            &spec,
            vec![
                doc("v/zero", Some(Value::Vector(vec![0.0, 0.0]))),
                doc("v/b", Some(Value::Vector(vec![2.0, 0.0]))),
                doc("v/a", Some(Value::Vector(vec![1.0, 0.0]))),
            ],
            &mut ctx,
        );
        // equal distances fall back to key order
        assert_eq!(paths(&out), ["v/a", "v/b"]);
    }
}
