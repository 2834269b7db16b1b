//! Configuration and Metrics Tests
//!
//! Tests for engine configuration flowing into execution:
//! - Config files load with defaults for missing keys
//! - The regex size limit bounds pattern compilation
//! - Metrics are recorded only when enabled

use std::io::Write;
use std::sync::Arc;

use docpipe::config::{ConfigError, EngineConfig};
use docpipe::document::Document;
use docpipe::expr::builder::*;
use docpipe::observability::{MetricsRegistry, Severity};
use docpipe::pipeline::{Pipeline, PipelineExecutor};
use docpipe::value::Timestamp;
use serde_json::json;
use tempfile::NamedTempFile;

// =============================================================================
// Helper Functions
// =============================================================================

fn config_file(content: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file
}

fn names() -> Vec<Document> {
    ["ada", "grace", "linus"]
        .iter()
        .map(|name| {
            Document::from_json(
                &format!("people/{}", name),
                Timestamp::from_seconds(1).unwrap(),
                json!({ "name": name }),
            )
            .unwrap()
        })
        .collect()
}

// =============================================================================
// Loading
// =============================================================================

/// Missing keys take their defaults.
#[test]
fn test_partial_config_file() {
    let file = config_file(r#"{"collect_metrics": true}"#);
    let config = EngineConfig::load(file.path()).unwrap();

    assert!(config.collect_metrics);
    assert_eq!(config.log_threshold, Severity::Warn);
    assert_eq!(config.regex_size_limit, 1 << 20);
}

/// Malformed JSON is a parse error.
#[test]
fn test_malformed_config_file() {
    let file = config_file("{ not json");
    let err = EngineConfig::load(file.path()).unwrap_err();
    assert!(matches!(err, ConfigError::Parse(_)));
}

// =============================================================================
// Execution
// =============================================================================

/// An oversized pattern is an evaluation error, not a failure.
#[test]
fn test_regex_size_limit_applies() {
    let file = config_file(r#"{"regex_size_limit": 64}"#);
    let config = EngineConfig::load(file.path()).unwrap();
    let executor = PipelineExecutor::new(&config);

    let pipeline = Pipeline::collection("people")
        .where_(regex_match(field("name"), r"\w{100}"))
        .build()
        .unwrap();
    let result = executor.execute(&pipeline, names());
    assert!(result.is_empty());
    assert_eq!(result.evaluation_errors, 3);

    // a small pattern still compiles under the default limit
    let pipeline = Pipeline::collection("people")
        .where_(regex_match(field("name"), "g.*e"))
        .build()
        .unwrap();
    let result = PipelineExecutor::new(&EngineConfig::default()).execute(&pipeline, names());
    assert_eq!(result.paths(), ["people/grace"]);
}

/// A shared registry accumulates across executors.
#[test]
fn test_shared_metrics_registry() {
    let metrics = Arc::new(MetricsRegistry::new());
    let pipeline = Pipeline::collection("people")
        .where_(starts_with(field("name"), "a"))
        .build()
        .unwrap();

    for _ in 0..2 {
        PipelineExecutor::new(&EngineConfig::default())
            .with_metrics(Arc::clone(&metrics))
            .execute(&pipeline, names());
    }

    let snapshot = metrics.snapshot();
    assert_eq!(snapshot.pipelines_executed, 2);
    assert_eq!(snapshot.documents_scanned, 6);
    assert_eq!(snapshot.documents_returned, 2);
    assert_eq!(snapshot.evaluation_errors, 0);
}
