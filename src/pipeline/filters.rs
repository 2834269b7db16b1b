//! Source selection and `Where` filtering

use crate::document::Document;
use crate::expr::BooleanExpr;

use super::executor::StageContext;
use super::result::PipelineDocument;
use super::stage::Stage;

/// Matches input documents against a source stage by key path.
pub struct SourceFilter;

impl SourceFilter {
    pub fn matches(source: &Stage, doc: &Document) -> bool {
        match source {
            Stage::Collection(path) => doc.key.collection_path() == *path,
            Stage::CollectionGroup(id) => doc.key.collection_id() == id.as_str(),
            Stage::Database => true,
            Stage::Documents(keys) => keys.contains(&doc.key),
            _ => false,
        }
    }
}

/// Keeps documents whose predicate is exactly `true`.
///
/// False, Error and any non-boolean result all exclude the document.
pub struct PredicateFilter;

impl PredicateFilter {
    pub(super) fn apply(
        predicate: &BooleanExpr,
        documents: Vec<PipelineDocument>,
        ctx: &mut StageContext<'_>,
    ) -> Vec<PipelineDocument> {
        documents
            .into_iter()
            .filter(|doc| ctx.evaluate_predicate(predicate, doc).is_true())
            .collect()
    }
}
