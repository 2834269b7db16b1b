//! Pipeline executor for docpipe
//!
//! Execution flow:
//! 1. Source stage selects input documents by key path
//! 2. Each following stage consumes the previous stage's output, in order
//! 3. Evaluation errors are absorbed per document and counted
//! 4. Return the surviving documents in their final order
//!
//! Execution is deterministic: the same pipeline over the same input
//! sequence returns the same documents in the same order. It never fails;
//! construction errors surface from `prepare` / `Pipeline::new`.

use std::sync::Arc;

use crate::config::EngineConfig;
use crate::document::{Document, DocumentBinding};
use crate::evaluator::{EvalError, EvalResult, Evaluator};
use crate::expr::{BooleanExpr, Expr};
use crate::observability::{
    log_event, Event, Logger, MetricsRegistry, ObservationScope, Severity, Timer,
};

use super::aggregate::{Aggregator, DistinctFilter};
use super::errors::PipelineResult;
use super::filters::{PredicateFilter, SourceFilter};
use super::nearest::NearestNeighbors;
use super::pipeline::{Pipeline, PipelineBuilder};
use super::projection::Projector;
use super::result::{ExecutionResult, PipelineDocument};
use super::sorter::ResultSorter;
use super::stage::Stage;

/// Runs pipelines. Cheap to clone; holds no per-execution state.
#[derive(Debug, Clone)]
pub struct PipelineExecutor {
    config: EngineConfig,
    logger: Logger,
    metrics: Option<Arc<MetricsRegistry>>,
}

impl PipelineExecutor {
    /// Creates an executor. A private metrics registry is attached when the
    /// config enables `collect_metrics`.
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            config: config.clone(),
            logger: config.logger(),
            metrics: config
                .collect_metrics
                .then(|| Arc::new(MetricsRegistry::new())),
        }
    }

    /// Records counters into a shared registry.
    pub fn with_metrics(mut self, metrics: Arc<MetricsRegistry>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    pub fn metrics(&self) -> Option<&MetricsRegistry> {
        self.metrics.as_deref()
    }

    /// Builds a pipeline, logging and counting a rejection.
    pub fn prepare(&self, builder: PipelineBuilder) -> PipelineResult<Pipeline> {
        builder.build().map_err(|e| {
            let code = e.code().code();
            let stage = e
                .stage_index()
                .map(|i| i.to_string())
                .unwrap_or_default();
            log_event(
                &self.logger,
                Event::PipelineRejected,
                &[("code", code), ("message", e.message()), ("stage", stage.as_str())],
            );
            if let Some(metrics) = &self.metrics {
                metrics.increment_pipelines_rejected();
            }
            e
        })
    }

    /// Executes a pipeline over a document snapshot.
    pub fn execute<I>(&self, pipeline: &Pipeline, documents: I) -> ExecutionResult
    where
        I: IntoIterator<Item = Document>,
    {
        let stage_count = pipeline.len().to_string();
        let scope = ObservationScope::with_fields(
            &self.logger,
            Event::PipelineExecute,
            &[("source", pipeline.source().name()), ("stages", stage_count.as_str())],
        );
        let timer = Timer::new();

        let mut ctx = StageContext::new(&self.config, &self.logger);

        let mut scanned_count = 0;
        let mut current: Vec<PipelineDocument> = documents
            .into_iter()
            .inspect(|_| scanned_count += 1)
            .filter(|doc| SourceFilter::matches(pipeline.source(), doc))
            .map(PipelineDocument::from)
            .collect();
        self.stage_complete(pipeline.source(), 0, current.len());

        let mut limit_applied = false;
        for (index, stage) in pipeline.stages().iter().enumerate().skip(1) {
            ctx.stage = stage.name();
            let before = current.len();
            current = self.apply(stage, current, &mut ctx);

            if matches!(stage, Stage::Limit(_) | Stage::FindNearest(_)) && current.len() < before {
                limit_applied = true;
            }
            self.stage_complete(stage, index, current.len());
        }

        let result = ExecutionResult {
            returned_count: current.len(),
            scanned_count,
            limit_applied,
            evaluation_errors: ctx.errors(),
            documents: current,
        };

        if let Some(metrics) = &self.metrics {
            metrics.increment_pipelines_executed();
            metrics.add_documents_scanned(result.scanned_count as u64);
            metrics.add_documents_returned(result.returned_count as u64);
            metrics.add_evaluation_errors(result.evaluation_errors as u64);
        }

        let returned = result.returned_count.to_string();
        let scanned = result.scanned_count.to_string();
        let errors = result.evaluation_errors.to_string();
        scope.complete_with_fields(&[
            ("returned", returned.as_str()),
            ("scanned", scanned.as_str()),
            ("evaluation_errors", errors.as_str()),
            ("elapsed_us", timer.elapsed_us().as_str()),
        ]);

        result
    }

    fn apply(
        &self,
        stage: &Stage,
        documents: Vec<PipelineDocument>,
        ctx: &mut StageContext<'_>,
    ) -> Vec<PipelineDocument> {
        match stage {
            // only valid at position 0
            Stage::Collection(_) | Stage::CollectionGroup(_) | Stage::Database | Stage::Documents(_) => {
                documents
            }
            Stage::Where(predicate) => PredicateFilter::apply(predicate, documents, ctx),
            Stage::Sort(orderings) => ResultSorter::sort(orderings, documents, ctx),
            Stage::Limit(n) => {
                let mut documents = documents;
                documents.truncate(*n);
                documents
            }
            Stage::Offset(n) => documents.into_iter().skip(*n).collect(),
            Stage::AddFields(fields) => Projector::add_fields(fields, documents, ctx),
            Stage::Select(fields) => Projector::select(fields, documents, ctx),
            Stage::Distinct(groups) => DistinctFilter::apply(groups, documents, ctx),
            Stage::Aggregate {
                groups,
                accumulators,
            } => Aggregator::apply(groups, accumulators, documents, ctx),
            Stage::FindNearest(spec) => NearestNeighbors::apply(spec, documents, ctx),
        }
    }

    fn stage_complete(&self, stage: &Stage, index: usize, output: usize) {
        if let Some(metrics) = &self.metrics {
            metrics.increment_stages_executed();
        }
        if !self.logger.enabled(Severity::Trace) {
            return;
        }
        let index = index.to_string();
        let output = output.to_string();
        log_event(
            &self.logger,
            Event::StageComplete,
            &[
                ("stage", stage.name()),
                ("index", index.as_str()),
                ("output", output.as_str()),
            ],
        );
    }
}

/// Per-execution evaluation state shared by the stage implementations.
pub(super) struct StageContext<'a> {
    evaluator: Evaluator,
    logger: &'a Logger,
    stage: &'static str,
    errors: usize,
}

impl<'a> StageContext<'a> {
    pub(super) fn new(config: &EngineConfig, logger: &'a Logger) -> Self {
        Self {
            evaluator: Evaluator::new(config),
            logger,
            stage: "",
            errors: 0,
        }
    }

    /// Evaluates an expression, counting an Error result.
    pub(super) fn evaluate(&mut self, expr: &Expr, doc: &dyn DocumentBinding) -> EvalResult {
        let result = self.evaluator.evaluate(expr, doc);
        if let EvalResult::Error(e) = &result {
            self.record(e);
        }
        result
    }

    pub(super) fn evaluate_predicate(
        &mut self,
        predicate: &BooleanExpr,
        doc: &dyn DocumentBinding,
    ) -> EvalResult {
        let result = self.evaluator.evaluate_predicate(predicate, doc);
        if let EvalResult::Error(e) = &result {
            self.record(e);
        }
        result
    }

    pub(super) fn errors(&self) -> usize {
        self.errors
    }

    fn record(&mut self, error: &EvalError) {
        self.errors += 1;
        if self.logger.enabled(Severity::Trace) {
            let message = error.to_string();
            log_event(
                self.logger,
                Event::EvaluationError,
                &[("stage", self.stage), ("error", message.as_str())],
            );
        }
    }
}
