//! Validated stage lists and the fluent builder

use crate::document::DocumentKey;
use crate::expr::{AliasedAggregate, AliasedExpr, BooleanExpr, Expr, SortSpec};

use super::errors::{PipelineError, PipelineResult};
use super::stage::{FindNearestSpec, Stage};

/// An ordered stage list that passed construction checks: exactly one
/// source, at position 0, and well-formed stage arguments.
///
/// Immutable once built; share it freely between executions.
#[derive(Debug, Clone, PartialEq)]
pub struct Pipeline {
    stages: Vec<Stage>,
}

impl Pipeline {
    pub fn new(stages: Vec<Stage>) -> PipelineResult<Self> {
        match stages.first() {
            None => {
                return Err(PipelineError::invalid_stage_order(
                    "pipeline must start with a source stage",
                ))
            }
            Some(first) if !first.is_source() => {
                return Err(PipelineError::invalid_stage_order(format!(
                    "pipeline must start with a source stage, found '{}'",
                    first.name()
                ))
                .at_stage(0))
            }
            Some(_) => {}
        }

        for (index, stage) in stages.iter().enumerate() {
            if index > 0 && stage.is_source() {
                return Err(PipelineError::invalid_stage_order(format!(
                    "source stage '{}' may only appear first",
                    stage.name()
                ))
                .at_stage(index));
            }
            stage.validate().map_err(|e| e.at_stage(index))?;
        }

        Ok(Self { stages })
    }

    pub fn collection(path: &str) -> PipelineBuilder {
        PipelineBuilder::from_source(Ok(Stage::collection(path)))
    }

    pub fn collection_group(collection_id: impl Into<String>) -> PipelineBuilder {
        PipelineBuilder::from_source(Ok(Stage::collection_group(collection_id)))
    }

    pub fn database() -> PipelineBuilder {
        PipelineBuilder::from_source(Ok(Stage::Database))
    }

    pub fn documents(paths: &[&str]) -> PipelineBuilder {
        PipelineBuilder::from_source(Stage::documents(paths))
    }

    pub fn documents_from_keys(keys: Vec<DocumentKey>) -> PipelineBuilder {
        PipelineBuilder::from_source(Stage::documents_from_keys(keys))
    }

    pub fn stages(&self) -> &[Stage] {
        &self.stages
    }

    pub fn source(&self) -> &Stage {
        // non-empty after `new`
        &self.stages[0]
    }

    pub fn len(&self) -> usize {
        self.stages.len()
    }

    /// Stage ids joined by `|`. Pipelines with the same id produce the same
    /// results, so the id can key caches of pipeline results.
    pub fn canonical_id(&self) -> String {
        self.stages
            .iter()
            .map(Stage::canonical_id)
            .collect::<Vec<_>>()
            .join("|")
    }

    /// Equality by canonical id. Unlike `==`, numerically equal constants
    /// and reordered projections compare equal.
    pub fn same_as(&self, other: &Pipeline) -> bool {
        self.canonical_id() == other.canonical_id()
    }

    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }
}

/// Fluent pipeline builder.
///
/// The first construction error is kept and returned by `build`; later
/// calls are ignored once an error is recorded.
#[derive(Debug, Clone)]
pub struct PipelineBuilder {
    stages: Vec<Stage>,
    error: Option<PipelineError>,
}

impl PipelineBuilder {
    fn from_source(source: PipelineResult<Stage>) -> Self {
        let mut builder = Self {
            stages: Vec::new(),
            error: None,
        };
        builder.push(source);
        builder
    }

    fn push(&mut self, stage: PipelineResult<Stage>) {
        if self.error.is_some() {
            return;
        }
        match stage {
            Ok(stage) => self.stages.push(stage),
            Err(e) => self.error = Some(e.at_stage(self.stages.len())),
        }
    }

    fn with(mut self, stage: PipelineResult<Stage>) -> Self {
        self.push(stage);
        self
    }

    pub fn where_(self, predicate: BooleanExpr) -> Self {
        self.with(Ok(Stage::Where(predicate)))
    }

    /// `Where` from any expression; non-boolean expressions fail `build`.
    pub fn filter(self, expr: impl Into<Expr>) -> Self {
        self.with(Stage::filter(expr))
    }

    pub fn sort<I>(self, orderings: I) -> Self
    where
        I: IntoIterator<Item = SortSpec>,
    {
        self.with(Ok(Stage::Sort(orderings.into_iter().collect())))
    }

    pub fn limit(self, limit: usize) -> Self {
        self.with(Ok(Stage::Limit(limit)))
    }

    pub fn offset(self, offset: usize) -> Self {
        self.with(Ok(Stage::Offset(offset)))
    }

    pub fn add_fields<I, A>(self, fields: I) -> Self
    where
        I: IntoIterator<Item = A>,
        A: Into<AliasedExpr>,
    {
        self.with(Ok(Stage::AddFields(aliased(fields))))
    }

    pub fn select<I, A>(self, fields: I) -> Self
    where
        I: IntoIterator<Item = A>,
        A: Into<AliasedExpr>,
    {
        self.with(Ok(Stage::Select(aliased(fields))))
    }

    pub fn distinct<I, A>(self, groups: I) -> Self
    where
        I: IntoIterator<Item = A>,
        A: Into<AliasedExpr>,
    {
        self.with(Ok(Stage::Distinct(aliased(groups))))
    }

    pub fn aggregate<G, A, C>(self, groups: G, accumulators: C) -> Self
    where
        G: IntoIterator<Item = A>,
        A: Into<AliasedExpr>,
        C: IntoIterator<Item = AliasedAggregate>,
    {
        self.with(Ok(Stage::Aggregate {
            groups: aliased(groups),
            accumulators: accumulators.into_iter().collect(),
        }))
    }

    pub fn find_nearest(self, spec: FindNearestSpec) -> Self {
        self.with(Stage::find_nearest(spec))
    }

    /// Appends an already-built stage.
    pub fn stage(self, stage: Stage) -> Self {
        self.with(Ok(stage))
    }

    pub fn build(self) -> PipelineResult<Pipeline> {
        match self.error {
            Some(e) => Err(e),
            None => Pipeline::new(self.stages),
        }
    }
}

fn aliased<I, A>(items: I) -> Vec<AliasedExpr>
where
    I: IntoIterator<Item = A>,
    A: Into<AliasedExpr>,
{
    items.into_iter().map(Into::into).collect()
}
