//! Result types for pipeline execution

use crate::document::{Document, DocumentBinding, DocumentKey, FieldPath};
use crate::value::{MapValue, Timestamp, Value};

/// A document flowing between stages and returned to the caller.
///
/// Aggregate output has no identity, so the key and times are optional.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineDocument {
    pub key: Option<DocumentKey>,
    pub update_time: Option<Timestamp>,
    pub create_time: Option<Timestamp>,
    pub fields: MapValue,
}

impl PipelineDocument {
    /// A document without identity, as produced by `Aggregate`.
    pub fn keyless(fields: MapValue) -> Self {
        Self {
            key: None,
            update_time: None,
            create_time: None,
            fields,
        }
    }

    /// Same identity with a different field map.
    pub fn with_fields(&self, fields: MapValue) -> Self {
        Self {
            key: self.key.clone(),
            update_time: self.update_time,
            create_time: self.create_time,
            fields,
        }
    }

    /// Field lookup by dotted path, synthetic fields included.
    pub fn get(&self, path: &str) -> Option<Value> {
        self.lookup(&FieldPath::parse(path))
    }

    /// Document path, if the document has one.
    pub fn path(&self) -> Option<String> {
        self.key.as_ref().map(DocumentKey::to_string)
    }
}

impl From<Document> for PipelineDocument {
    fn from(doc: Document) -> Self {
        Self {
            key: Some(doc.key),
            update_time: Some(doc.version),
            create_time: doc.create_time,
            fields: doc.fields,
        }
    }
}

impl DocumentBinding for PipelineDocument {
    fn key(&self) -> Option<&DocumentKey> {
        self.key.as_ref()
    }

    fn update_time(&self) -> Option<Timestamp> {
        self.update_time
    }

    fn create_time(&self) -> Option<Timestamp> {
        self.create_time
    }

    fn fields(&self) -> &MapValue {
        &self.fields
    }
}

/// Result of pipeline execution
#[derive(Debug, Clone, PartialEq)]
pub struct ExecutionResult {
    /// Documents in result order
    pub documents: Vec<PipelineDocument>,
    /// Number of input documents offered to the source stage
    pub scanned_count: usize,
    /// Number of documents returned
    pub returned_count: usize,
    /// Whether a Limit or FindNearest limit dropped documents
    pub limit_applied: bool,
    /// Evaluation errors absorbed by stages
    pub evaluation_errors: usize,
}

impl ExecutionResult {
    pub fn empty() -> Self {
        Self {
            documents: Vec::new(),
            scanned_count: 0,
            returned_count: 0,
            limit_applied: false,
            evaluation_errors: 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &PipelineDocument> {
        self.documents.iter()
    }

    /// Document paths in result order; keyless documents are skipped.
    pub fn paths(&self) -> Vec<String> {
        self.documents.iter().filter_map(PipelineDocument::path).collect()
    }
}

impl IntoIterator for ExecutionResult {
    type Item = PipelineDocument;
    type IntoIter = std::vec::IntoIter<PipelineDocument>;

    fn into_iter(self) -> Self::IntoIter {
        self.documents.into_iter()
    }
}
