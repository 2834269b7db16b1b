//! Pipeline Execution Tests
//!
//! End-to-end behavior of built pipelines over document snapshots:
//! - Filtering preserves input order and numeric equality semantics
//! - Sorting places absent keys last and is idempotent
//! - Construction errors surface before any evaluation
//! - Projection, grouping and nearest-neighbor stages

use docpipe::config::EngineConfig;
use docpipe::document::Document;
use docpipe::expr::builder::*;
use docpipe::expr::AliasedExpr;
use docpipe::pipeline::{
    DistanceMeasure, FindNearestSpec, Pipeline, PipelineErrorCode, PipelineExecutor,
};
use docpipe::value::{MapValue, Timestamp, Value};
use pretty_assertions::assert_eq;
use serde_json::json;

// =============================================================================
// Helper Functions
// =============================================================================

fn doc(path: &str, body: serde_json::Value) -> Document {
    Document::from_json(path, Timestamp::from_seconds(1_700_000_000).unwrap(), body).unwrap()
}

fn executor() -> PipelineExecutor {
    PipelineExecutor::new(&EngineConfig::default())
}

// =============================================================================
// Worked Examples
// =============================================================================

/// Where keeps matching documents in input order.
#[test]
fn test_score_filter_preserves_order() {
    let docs = vec![
        doc("scores/a", json!({"score": 90})),
        doc("scores/b", json!({"score": 50})),
        doc("scores/c", json!({"score": 97})),
    ];
    let pipeline = Pipeline::collection("scores")
        .where_(gt(field("score"), 80))
        .build()
        .unwrap();

    let result = executor().execute(&pipeline, docs);
    assert_eq!(result.paths(), ["scores/a", "scores/c"]);
}

/// Negative zero equals every other zero.
#[test]
fn test_negative_zero_equality() {
    let docs = vec![
        doc("z/1", json!({"score": 0})),
        doc("z/2", json!({"score": -0})),
        doc("z/3", json!({"score": 0.0})),
        doc("z/4", json!({"score": -0.0})),
        doc("z/5", json!({"score": 1})),
    ];
    let pipeline = Pipeline::collection("z")
        .where_(eq(field("score"), -0.0))
        .build()
        .unwrap();

    let result = executor().execute(&pipeline, docs);
    assert_eq!(result.paths(), ["z/1", "z/2", "z/3", "z/4"]);
}

/// Documents without the sort field sort last.
#[test]
fn test_missing_sort_field_sorts_last() {
    let docs = vec![
        doc("people/old", json!({"age": 75.5})),
        doc("people/young", json!({"age": 25})),
        doc("people/unknown", json!({"name": "?"})),
    ];

    for ordering in [field("age").ascending(), field("age").descending()] {
        let pipeline = Pipeline::collection("people").sort([ordering]).build().unwrap();
        let result = executor().execute(&pipeline, docs.clone());
        assert_eq!(result.paths().last().map(String::as_str), Some("people/unknown"));
    }
}

/// Only literal `true` satisfies an equality to `true`.
#[test]
fn test_and_of_three_booleans() {
    let docs = vec![
        doc("flags/all", json!({"a": true, "b": true, "c": true})),
        doc("flags/string", json!({"a": true, "b": "true", "c": true})),
        doc("flags/one_false", json!({"a": true, "b": true, "c": false})),
        doc("flags/missing", json!({"a": true, "b": true})),
        doc("flags/number", json!({"a": 1, "b": true, "c": true})),
    ];
    let pipeline = Pipeline::collection("flags")
        .where_(and([
            eq(field("a"), true),
            eq(field("b"), true),
            eq(field("c"), true),
        ]))
        .build()
        .unwrap();

    let result = executor().execute(&pipeline, docs);
    assert_eq!(result.paths(), ["flags/all"]);
}

/// Duplicate document references fail before execution.
#[test]
fn test_duplicate_documents_rejected() {
    let err = Pipeline::documents(&["ref/1", "ref/2", "ref/1"])
        .build()
        .unwrap_err();
    assert_eq!(err.code(), PipelineErrorCode::DuplicateDocument);
    assert!(err.to_string().contains("PIPE_DUPLICATE_DOCUMENT"));
}

// =============================================================================
// Sort Properties
// =============================================================================

/// Re-applying a sort does not change the order.
#[test]
fn test_sort_idempotent() {
    let docs: Vec<Document> = [json!(3), json!("x"), json!(null), json!(1.5), json!(true)]
        .into_iter()
        .enumerate()
        .map(|(i, v)| doc(&format!("items/{}", i), json!({ "v": v })))
        .chain([doc("items/none", json!({}))])
        .collect();

    let once = Pipeline::collection("items")
        .sort([field("v").descending()])
        .build()
        .unwrap();
    let twice = Pipeline::collection("items")
        .sort([field("v").descending()])
        .sort([field("v").descending()])
        .build()
        .unwrap();

    let first = executor().execute(&once, docs.clone());
    let second = executor().execute(&twice, docs);
    assert_eq!(first.paths(), second.paths());
    assert_eq!(first.paths().last().map(String::as_str), Some("items/none"));
}

/// Equal sort keys fall back to document key order.
#[test]
fn test_sort_ties_break_by_key() {
    let docs = vec![
        doc("t/c", json!({"rank": 1})),
        doc("t/a", json!({"rank": 1})),
        doc("t/b", json!({"rank": 0})),
    ];
    let pipeline = Pipeline::collection("t")
        .sort([field("rank").ascending()])
        .build()
        .unwrap();
    assert_eq!(executor().execute(&pipeline, docs).paths(), ["t/b", "t/a", "t/c"]);
}

/// A key pair from different domains leaves the decision to the next key.
#[test]
fn test_sort_cross_domain_falls_through() {
    let docs = vec![
        doc("p/a", json!({"x": 1, "y": 2})),
        doc("p/b", json!({"x": "s", "y": 1})),
    ];
    let pipeline = Pipeline::collection("p")
        .sort([field("x").ascending(), field("y").ascending()])
        .build()
        .unwrap();
    assert_eq!(executor().execute(&pipeline, docs).paths(), ["p/b", "p/a"]);
}

/// Limit before Sort returns some valid subset, sorted.
#[test]
fn test_limit_before_sort() {
    let docs: Vec<Document> = (0..5)
        .map(|i| doc(&format!("n/{}", i), json!({ "n": 4 - i })))
        .collect();
    let pipeline = Pipeline::collection("n")
        .limit(3)
        .sort([field("n").ascending()])
        .build()
        .unwrap();

    let result = executor().execute(&pipeline, docs);
    assert_eq!(result.len(), 3);
    let values: Vec<i64> = result
        .iter()
        .filter_map(|d| d.get("n")?.as_i64())
        .collect();
    assert_eq!(values.len(), 3);
    assert!(values.windows(2).all(|w| w[0] <= w[1]));
}

// =============================================================================
// Projection
// =============================================================================

/// Select of every field keeps the Where decision unchanged.
#[test]
fn test_select_round_trip_keeps_membership() {
    let docs = vec![
        doc("r/1", json!({"score": 90, "tags": ["a"]})),
        doc("r/2", json!({"score": 10, "tags": []})),
        doc("r/3", json!({"tags": ["b"]})),
    ];
    let predicate = || or([gt(field("score"), 50), array_contains(field("tags"), "b")]);

    let direct = Pipeline::collection("r").where_(predicate()).build().unwrap();
    let projected = Pipeline::collection("r")
        .select(["score", "tags"])
        .where_(predicate())
        .build()
        .unwrap();

    let direct = executor().execute(&direct, docs.clone());
    let projected = executor().execute(&projected, docs);
    assert_eq!(direct.paths(), ["r/1", "r/3"]);
    assert_eq!(direct, projected);
}

/// Synthetic fields stay addressable after Select.
#[test]
fn test_select_keeps_document_name() {
    let docs = vec![doc("users/alice", json!({"age": 30}))];
    let pipeline = Pipeline::collection("users")
        .select([AliasedExpr::new("id", document_id(field("__name__")))])
        .where_(eq(field("__name__"), Value::Reference(docs[0].key.clone())))
        .build()
        .unwrap();

    let result = executor().execute(&pipeline, docs);
    assert_eq!(result.paths(), ["users/alice"]);
    assert_eq!(result.documents[0].get("id"), Some(Value::from("alice")));
    assert_eq!(result.documents[0].get("age"), None);
}

// =============================================================================
// Grouping
// =============================================================================

fn sales() -> Vec<Document> {
    vec![
        doc("sales/1", json!({"shop": "north", "total": 5})),
        doc("sales/2", json!({"shop": "south", "total": 2})),
        doc("sales/3", json!({"shop": "north", "total": 1.5})),
        doc("sales/4", json!({"shop": "east"})),
    ]
}

/// Aggregate over groups, sorted by the group key.
#[test]
fn test_aggregate_by_shop() {
    let pipeline = Pipeline::collection("sales")
        .aggregate(
            ["shop"],
            [
                sum(field("total")).alias("revenue"),
                count_all().alias("orders"),
            ],
        )
        .sort([field("shop").ascending()])
        .build()
        .unwrap();

    let result = executor().execute(&pipeline, sales());
    assert!(result.paths().is_empty());

    let rows: Vec<_> = result
        .iter()
        .map(|d| (d.get("shop"), d.get("revenue"), d.get("orders")))
        .collect();
    assert_eq!(
        rows,
        [
            (Some(Value::from("east")), Some(Value::Null), Some(Value::Integer(1))),
            (Some(Value::from("north")), Some(Value::Double(6.5)), Some(Value::Integer(2))),
            (Some(Value::from("south")), Some(Value::Integer(2)), Some(Value::Integer(1))),
        ]
    );
}

/// A global aggregate over nothing still yields one row.
#[test]
fn test_global_aggregate_over_empty_input() {
    let pipeline = Pipeline::collection("sales")
        .where_(eq(field("shop"), "nowhere"))
        .aggregate(Vec::<&str>::new(), [count_all().alias("n"), sum(field("total")).alias("s")])
        .build()
        .unwrap();

    let result = executor().execute(&pipeline, sales());
    assert_eq!(result.len(), 1);

    let mut expected = MapValue::new();
    expected.insert("n".into(), Value::Integer(0));
    expected.insert("s".into(), Value::Null);
    assert_eq!(result.documents[0].fields, expected);
}

/// Distinct emits one document per key in first-appearance order.
#[test]
fn test_distinct_shops() {
    let pipeline = Pipeline::collection("sales").distinct(["shop"]).build().unwrap();
    let result = executor().execute(&pipeline, sales());
    assert_eq!(result.paths(), ["sales/1", "sales/2", "sales/4"]);
}

// =============================================================================
// Nearest Neighbors
// =============================================================================

/// FindNearest ranks, limits and annotates.
#[test]
fn test_find_nearest() {
    let mut docs = Vec::new();
    for (path, v) in [("emb/a", [0.0, 1.0]), ("emb/b", [1.0, 1.0]), ("emb/c", [5.0, 0.0])] {
        let mut fields = MapValue::new();
        fields.insert("embedding".into(), Value::Vector(v.to_vec()));
        docs.push(Document::new(
            docpipe::document::DocumentKey::parse(path).unwrap(),
            Timestamp::from_seconds(1).unwrap(),
            fields,
        ));
    }

    let pipeline = Pipeline::collection("emb")
        .find_nearest(
            FindNearestSpec::new(field("embedding"), vec![1.0, 0.0], DistanceMeasure::Euclidean)
                .with_limit(2)
                .with_distance_field("distance"),
        )
        .build()
        .unwrap();

    let result = executor().execute(&pipeline, docs);
    assert_eq!(result.paths(), ["emb/b", "emb/a"]);
    assert_eq!(result.documents[0].get("distance"), Some(Value::Double(1.0)));
    assert!(result.limit_applied);
}

/// FindNearest with a zero limit is a construction error.
#[test]
fn test_find_nearest_zero_limit_rejected() {
    let err = Pipeline::database()
        .find_nearest(
            FindNearestSpec::new(field("embedding"), vec![1.0], DistanceMeasure::Cosine).with_limit(0),
        )
        .build()
        .unwrap_err();
    assert_eq!(err.code(), PipelineErrorCode::InvalidArgument);
}
