//! `Select` and `AddFields` projection
//!
//! Every alias is evaluated against the incoming document, never against
//! fields written earlier in the same stage. An Absent or Error result
//! leaves the alias unset.

use crate::document::{set_field, FieldPath};
use crate::evaluator::EvalResult;
use crate::expr::AliasedExpr;
use crate::value::{MapValue, Value};

use super::executor::StageContext;
use super::result::PipelineDocument;

pub struct Projector;

impl Projector {
    /// Replaces the field map with the projected aliases. Document identity
    /// is kept.
    pub(super) fn select(
        fields: &[AliasedExpr],
        documents: Vec<PipelineDocument>,
        ctx: &mut StageContext<'_>,
    ) -> Vec<PipelineDocument> {
        documents
            .into_iter()
            .map(|doc| {
                let mut projected = MapValue::with_capacity(fields.len());
                for (alias, value) in Self::evaluate_all(fields, &doc, ctx) {
                    set_field(&mut projected, alias, value);
                }
                doc.with_fields(projected)
            })
            .collect()
    }

    /// Writes the aliases over the existing fields.
    pub(super) fn add_fields(
        fields: &[AliasedExpr],
        documents: Vec<PipelineDocument>,
        ctx: &mut StageContext<'_>,
    ) -> Vec<PipelineDocument> {
        documents
            .into_iter()
            .map(|mut doc| {
                let computed = Self::evaluate_all(fields, &doc, ctx);
                for (alias, value) in computed {
                    set_field(&mut doc.fields, alias, value);
                }
                doc
            })
            .collect()
    }

    fn evaluate_all<'f>(
        fields: &'f [AliasedExpr],
        doc: &PipelineDocument,
        ctx: &mut StageContext<'_>,
    ) -> Vec<(&'f FieldPath, Value)> {
        fields
            .iter()
            .filter_map(|aliased| match ctx.evaluate(&aliased.expr, doc) {
                EvalResult::Value(value) => Some((&aliased.alias, value)),
                EvalResult::Absent | EvalResult::Error(_) => None,
            })
            .collect()
    }
}
