//! Breakends
//!
//! Both ends of a breakend pair are annotated as points (widened to their
//! confidence interval when imprecise) and the results are merged.

use super::context::{annotate_genes, TranscriptSolver, TranscriptState};
use super::region::solve_region_coding;
use super::walk::ExonWalk;
use super::{CalculatorContext, ConsequenceCalculator, RegulatoryOverlap};
use crate::error::FerroError;
use crate::model::{ConsequenceType, Gene, Variant};
use crate::so::Consequence;

/// Consequence types of breakends and their mates
#[derive(Debug, Clone, Copy, Default)]
pub struct BreakendCalculator;

/// Interval of one breakend position.
fn breakend_interval(
    ctx: &CalculatorContext<'_>,
    position: i64,
    ci_left: Option<i64>,
    ci_right: Option<i64>,
) -> (i64, i64) {
    if !ctx.options.imprecise {
        return (position, position);
    }
    let padding = ctx.options.sv_extra_padding;
    let start = ci_left.map_or(position, |left| left - padding);
    let end = ci_right.map_or(position, |right| right + padding);
    (start.max(1), end)
}

impl ConsequenceCalculator for BreakendCalculator {
    fn run(
        &self,
        ctx: &CalculatorContext<'_>,
        variant: &Variant,
        genes: &[&Gene],
        regulatory: RegulatoryOverlap,
    ) -> Result<Vec<ConsequenceType>, FerroError> {
        let sv = variant.sv.as_ref();
        let interval = breakend_interval(
            ctx,
            variant.start,
            sv.and_then(|sv| sv.ci_start_left),
            sv.and_then(|sv| sv.ci_start_right),
        );
        let mut records = annotate_genes(self, ctx, variant, &variant.chromosome, interval, genes, regulatory)?;

        if let Some(mate) = sv.and_then(|sv| sv.breakend.as_ref()) {
            let interval = breakend_interval(ctx, mate.position, mate.ci_position_left, mate.ci_position_right);
            let mate_records = annotate_genes(self, ctx, variant, &mate.chromosome, interval, genes, regulatory)?;
            for record in mate_records {
                if !records.contains(&record) {
                    records.push(record);
                }
            }
        }
        Ok(records)
    }
}

impl TranscriptSolver for BreakendCalculator {
    fn covering_terms(&self, _variant: &Variant) -> Vec<Consequence> {
        Vec::new()
    }

    fn solve_coding(
        &self,
        state: &mut TranscriptState<'_>,
        walk: &ExonWalk,
        cdna_coding_start: i64,
    ) -> Result<(), FerroError> {
        solve_region_coding(state, walk, cdna_coding_start)
    }
}
