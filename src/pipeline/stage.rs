//! Pipeline stages
//!
//! A stage is plain data. Structural checks happen in the checked
//! constructors here and again in `Pipeline::new`, so a hand-built stage
//! list is held to the same rules as one from the builder.

use std::collections::HashSet;

use crate::document::{DocumentKey, FieldPath, ResourcePath};
use crate::expr::{AliasedAggregate, AliasedExpr, BooleanExpr, Expr, SortSpec};
use crate::value::Value;

use super::errors::{PipelineError, PipelineResult};

/// Distance used by `FindNearest`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DistanceMeasure {
    Cosine,
    Euclidean,
    DotProduct,
}

impl DistanceMeasure {
    pub fn name(&self) -> &'static str {
        match self {
            DistanceMeasure::Cosine => "cosine",
            DistanceMeasure::Euclidean => "euclidean",
            DistanceMeasure::DotProduct => "dot_product",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "cosine" => Some(DistanceMeasure::Cosine),
            "euclidean" => Some(DistanceMeasure::Euclidean),
            "dot_product" => Some(DistanceMeasure::DotProduct),
            _ => None,
        }
    }

    /// Whether larger distances rank first.
    pub fn descending(&self) -> bool {
        matches!(self, DistanceMeasure::DotProduct)
    }
}

/// Arguments of a `FindNearest` stage
#[derive(Debug, Clone, PartialEq)]
pub struct FindNearestSpec {
    /// Expression yielding each document's vector, usually a field
    pub field: Expr,
    pub target: Vec<f64>,
    pub measure: DistanceMeasure,
    /// Keep at most this many documents
    pub limit: Option<usize>,
    /// Field receiving the computed distance
    pub distance_field: Option<FieldPath>,
}

impl FindNearestSpec {
    pub fn new(field: impl Into<Expr>, target: Vec<f64>, measure: DistanceMeasure) -> Self {
        Self {
            field: field.into(),
            target,
            measure,
            limit: None,
            distance_field: None,
        }
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn with_distance_field(mut self, field: impl Into<FieldPath>) -> Self {
        self.distance_field = Some(field.into());
        self
    }

    fn validate(&self) -> PipelineResult<()> {
        if self.target.is_empty() {
            return Err(PipelineError::invalid_argument(
                "find_nearest target vector must not be empty",
            ));
        }
        if self.limit == Some(0) {
            return Err(PipelineError::invalid_argument(
                "find_nearest limit must be positive",
            ));
        }
        Ok(())
    }
}

/// One step of a pipeline
#[derive(Debug, Clone, PartialEq)]
pub enum Stage {
    /// Documents whose parent collection path equals the path
    Collection(ResourcePath),
    /// Documents whose immediate collection id matches, at any depth
    CollectionGroup(String),
    /// Every document
    Database,
    /// The named documents, when present
    Documents(Vec<DocumentKey>),

    Where(BooleanExpr),
    Sort(Vec<SortSpec>),
    Limit(usize),
    Offset(usize),
    AddFields(Vec<AliasedExpr>),
    Select(Vec<AliasedExpr>),
    Distinct(Vec<AliasedExpr>),
    Aggregate {
        groups: Vec<AliasedExpr>,
        accumulators: Vec<AliasedAggregate>,
    },
    FindNearest(FindNearestSpec),
}

impl Stage {
    /// Collection source; leading and trailing slashes are ignored.
    pub fn collection(path: &str) -> Self {
        Stage::Collection(ResourcePath::parse(path))
    }

    pub fn collection_group(collection_id: impl Into<String>) -> Self {
        Stage::CollectionGroup(collection_id.into())
    }

    /// Documents source from document paths.
    pub fn documents(paths: &[&str]) -> PipelineResult<Self> {
        let keys = paths
            .iter()
            .map(|path| {
                DocumentKey::parse(path).ok_or_else(|| {
                    PipelineError::invalid_argument(format!("'{}' is not a document path", path))
                })
            })
            .collect::<PipelineResult<Vec<_>>>()?;
        Self::documents_from_keys(keys)
    }

    pub fn documents_from_keys(keys: Vec<DocumentKey>) -> PipelineResult<Self> {
        check_document_keys(&keys)?;
        Ok(Stage::Documents(keys))
    }

    /// `Where` from an arbitrary expression, rejecting anything that is not
    /// a boolean function.
    pub fn filter(expr: impl Into<Expr>) -> PipelineResult<Self> {
        match expr.into() {
            Expr::Boolean(predicate) => Ok(Stage::Where(predicate)),
            Expr::Function(f) => Err(PipelineError::non_boolean_predicate(f.kind.name())),
            other => Err(PipelineError::non_boolean_predicate(other.describe())),
        }
    }

    pub fn find_nearest(spec: FindNearestSpec) -> PipelineResult<Self> {
        spec.validate()?;
        Ok(Stage::FindNearest(spec))
    }

    pub fn name(&self) -> &'static str {
        match self {
            Stage::Collection(_) => "collection",
            Stage::CollectionGroup(_) => "collection_group",
            Stage::Database => "database",
            Stage::Documents(_) => "documents",
            Stage::Where(_) => "where",
            Stage::Sort(_) => "sort",
            Stage::Limit(_) => "limit",
            Stage::Offset(_) => "offset",
            Stage::AddFields(_) => "add_fields",
            Stage::Select(_) => "select",
            Stage::Distinct(_) => "distinct",
            Stage::Aggregate { .. } => "aggregate",
            Stage::FindNearest(_) => "find_nearest",
        }
    }

    pub fn is_source(&self) -> bool {
        matches!(
            self,
            Stage::Collection(_) | Stage::CollectionGroup(_) | Stage::Database | Stage::Documents(_)
        )
    }

    /// Identity string of the stage: its name and canonical arguments.
    /// Projections and groups are keyed by alias, so their order is ignored,
    /// as is the order of `Documents` references.
    pub fn canonical_id(&self) -> String {
        let args = match self {
            Stage::Collection(path) => path.to_string(),
            Stage::CollectionGroup(id) => id.clone(),
            Stage::Database => String::new(),
            Stage::Documents(keys) => {
                let mut keys: Vec<String> = keys.iter().map(DocumentKey::to_string).collect();
                keys.sort();
                keys.join(",")
            }
            Stage::Where(predicate) => predicate.canonical_id(),
            Stage::Sort(orderings) => orderings
                .iter()
                .map(|o| format!("{} {}", o.expr.canonical_id(), o.direction.as_str()))
                .collect::<Vec<_>>()
                .join(","),
            Stage::Limit(n) | Stage::Offset(n) => n.to_string(),
            Stage::AddFields(fields) | Stage::Select(fields) | Stage::Distinct(fields) => {
                aliased_ids(fields.iter().map(|f| (&f.alias, f.expr.canonical_id())))
            }
            Stage::Aggregate {
                groups,
                accumulators,
            } => {
                let mut id = aliased_ids(
                    accumulators
                        .iter()
                        .map(|a| (&a.alias, a.function.canonical_id())),
                );
                if !groups.is_empty() {
                    id.push_str(&format!(
                        ")grouping({}",
                        aliased_ids(groups.iter().map(|g| (&g.alias, g.expr.canonical_id())))
                    ));
                }
                id
            }
            Stage::FindNearest(spec) => {
                let target: Vec<String> = spec
                    .target
                    .iter()
                    .map(|x| Value::Double(*x).canonical_id())
                    .collect();
                let mut id = format!(
                    "{},{},[{}]",
                    spec.field.canonical_id(),
                    spec.measure.name(),
                    target.join(",")
                );
                if let Some(limit) = spec.limit {
                    id.push_str(&format!(",limit={}", limit));
                }
                if let Some(field) = &spec.distance_field {
                    id.push_str(&format!(",distance={}", field));
                }
                id
            }
        };
        format!("{}({})", self.name(), args)
    }

    /// Checks the stage's own arguments.
    pub(super) fn validate(&self) -> PipelineResult<()> {
        match self {
            Stage::Documents(keys) => check_document_keys(keys),
            Stage::FindNearest(spec) => spec.validate(),
            _ => Ok(()),
        }
    }
}

fn aliased_ids<'a>(pairs: impl Iterator<Item = (&'a FieldPath, String)>) -> String {
    let mut entries: Vec<String> = pairs.map(|(alias, id)| format!("{}={}", alias, id)).collect();
    entries.sort();
    entries.join(",")
}

fn check_document_keys(keys: &[DocumentKey]) -> PipelineResult<()> {
    if keys.is_empty() {
        return Err(PipelineError::empty_documents());
    }
    let mut seen = HashSet::with_capacity(keys.len());
    for key in keys {
        if !seen.insert(key) {
            return Err(PipelineError::duplicate_document(key.to_string()));
        }
    }
    Ok(())
}
