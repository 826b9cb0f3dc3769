//! Deletions, including copy-number losses

use super::context::{annotate_genes, structural_interval, TranscriptSolver, TranscriptState};
use super::stitch::TranscriptSequence;
use super::walk::ExonWalk;
use super::{CalculatorContext, ConsequenceCalculator, RegulatoryOverlap};
use crate::error::FerroError;
use crate::model::{ConsequenceType, Gene, Variant};
use crate::so::rules::{classify_start_codon_change, decide_stop_codon_modification};
use crate::so::Consequence;

/// Consequence types of deletions
#[derive(Debug, Clone, Copy, Default)]
pub struct DeletionCalculator;

impl ConsequenceCalculator for DeletionCalculator {
    fn run(
        &self,
        ctx: &CalculatorContext<'_>,
        variant: &Variant,
        genes: &[&Gene],
        regulatory: RegulatoryOverlap,
    ) -> Result<Vec<ConsequenceType>, FerroError> {
        let interval = structural_interval(ctx, variant);
        annotate_genes(self, ctx, variant, &variant.chromosome, interval, genes, regulatory)
    }
}

impl TranscriptSolver for DeletionCalculator {
    fn covering_terms(&self, _variant: &Variant) -> Vec<Consequence> {
        vec![Consequence::TranscriptAblation]
    }

    fn overlap_terms(&self, state: &mut TranscriptState<'_>) {
        if state.end - state.start > state.ctx.options.big_variant_threshold {
            state.terms.add(Consequence::FeatureTruncation);
        }
    }

    fn cds_end_term(&self) -> Consequence {
        Consequence::StopLost
    }

    fn solve_coding(
        &self,
        state: &mut TranscriptState<'_>,
        walk: &ExonWalk,
        cdna_coding_start: i64,
    ) -> Result<(), FerroError> {
        let before = state.terms.as_slice().len();
        let (cdna_start, cdna_end) = (walk.cdna_start, walk.cdna_end);

        if cdna_start.is_some_and(|cs| cs < cdna_coding_start + 3)
            && state.start_confirmed(cdna_coding_start)
        {
            state.terms.add(Consequence::InitiatorCodonVariant);
        }
        if let Some(ce) = cdna_end {
            let mut stop_solved = false;
            if let (false, Some(cs)) = (walk.splicing, cdna_start) {
                if deleted_length(state) % 3 == 0 {
                    state.terms.add(Consequence::InframeDeletion);
                } else {
                    state.terms.add(Consequence::FrameshiftVariant);
                }
                stop_solved = solve_resynthesized_codon(state, cs, ce, cdna_coding_start)?;
            }
            let final_phase = state.final_phase(cdna_coding_start);
            if ce >= state.transcript.cdna_coding_end - final_phase {
                if final_phase != 2 {
                    state.terms.add(Consequence::IncompleteTerminalCodonVariant);
                } else if !stop_solved {
                    state.terms.add(Consequence::StopLost);
                }
            }
        }
        if state.terms.as_slice().len() == before {
            state.terms.add(Consequence::CodingSequenceVariant);
        }
        Ok(())
    }
}

/// Number of deleted bases; symbolic alleles use the effective interval.
fn deleted_length(state: &TranscriptState<'_>) -> i64 {
    let variant = state.variant;
    if variant.is_symbolic() || variant.reference.is_empty() {
        state.end - state.start + 1
    } else {
        variant.reference.len() as i64
    }
}

/// Classify the codon formed by joining the bases left of the deletion with
/// those right of it. Returns whether a stop-codon term was decided.
fn solve_resynthesized_codon(
    state: &mut TranscriptState<'_>,
    cdna_start: i64,
    cdna_end: i64,
    cdna_coding_start: i64,
) -> Result<bool, FerroError> {
    let sequence = TranscriptSequence::new(state);
    let phase_start = (cdna_start - cdna_coding_start).rem_euclid(3);
    let phase_end = (cdna_end - cdna_coding_start).rem_euclid(3);
    let first_codon = cdna_start - phase_start;
    let last_codon = cdna_end - phase_end;
    if !sequence.is_available() || first_codon < 1 || last_codon + 2 > sequence.len() {
        return Ok(false);
    }

    let (first, last) = match (sequence.codon(first_codon)?, sequence.codon(last_codon)?) {
        (Some(first), Some(last)) => (first, last),
        _ => return Ok(false),
    };
    let kept = &first[..phase_start as usize];
    let modified = match sequence.bases(cdna_end + 1, 3 - phase_start)? {
        Some(tail) => format!("{}{}", kept, tail),
        None => return Ok(false),
    };

    if first_codon == cdna_coding_start && state.start_confirmed(cdna_coding_start) {
        if let Some(term) = classify_start_codon_change(state.table, &first, &modified) {
            state.terms.add(term);
        }
    }
    let reference = if state.table.is_stop(&last) { &last } else { &first };
    match decide_stop_codon_modification(state.table, reference, &modified) {
        Some(term) => {
            state.terms.add(term);
            Ok(true)
        }
        None => Ok(false),
    }
}
