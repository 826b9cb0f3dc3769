//! Generic regions: inversions and copy-number variants of unknown copy number

use super::context::{annotate_genes, structural_interval, TranscriptSolver, TranscriptState};
use super::stitch::TranscriptSequence;
use super::walk::ExonWalk;
use super::{CalculatorContext, ConsequenceCalculator, RegulatoryOverlap};
use crate::error::FerroError;
use crate::model::{ConsequenceType, Gene, Variant};
use crate::so::Consequence;

/// Consequence types of structural variants without sequence-level detail
#[derive(Debug, Clone, Copy, Default)]
pub struct GenericRegionCalculator;

impl ConsequenceCalculator for GenericRegionCalculator {
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

impl TranscriptSolver for GenericRegionCalculator {
    fn covering_terms(&self, _variant: &Variant) -> Vec<Consequence> {
        vec![Consequence::StructuralVariant]
    }

    fn exon_percentage(&self) -> bool {
        true
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

/// Coding classification shared by region-like calculators.
///
/// Only start and stop codon involvement is reported; everything else is a
/// plain `coding_sequence_variant`.
pub(crate) fn solve_region_coding(
    state: &mut TranscriptState<'_>,
    walk: &ExonWalk,
    cdna_coding_start: i64,
) -> Result<(), FerroError> {
    let before = state.terms.as_slice().len();
    let (cdna_start, cdna_end) = (walk.cdna_start, walk.cdna_end);

    if cdna_start.is_some_and(|cs| cs < cdna_coding_start + 3) && state.start_confirmed(cdna_coding_start) {
        state.terms.add(Consequence::InitiatorCodonVariant);
    }
    if let Some(ce) = cdna_end {
        let mut stop_solved = false;
        if let (false, Some(cs)) = (walk.splicing, cdna_start) {
            stop_solved = true;
            let touches_stop = touches_stop_codon(state, cs, ce, cdna_coding_start)?;
            state.terms.add(if touches_stop {
                Consequence::TerminatorCodonVariant
            } else {
                Consequence::CodingSequenceVariant
            });
        }
        let final_phase = state.final_phase(cdna_coding_start);
        if ce >= state.transcript.cdna_coding_end - final_phase {
            if final_phase != 2 {
                state.terms.add(Consequence::IncompleteTerminalCodonVariant);
            } else if !stop_solved {
                state.terms.add(Consequence::TerminatorCodonVariant);
            }
        }
    }
    if state.terms.as_slice().len() == before {
        state.terms.add(Consequence::CodingSequenceVariant);
    }
    Ok(())
}

/// Whether the codon at either end of `[cdna_start, cdna_end]` is a stop.
fn touches_stop_codon(
    state: &TranscriptState<'_>,
    cdna_start: i64,
    cdna_end: i64,
    cdna_coding_start: i64,
) -> Result<bool, FerroError> {
    let sequence = TranscriptSequence::new(state);
    let first_codon = cdna_start - (cdna_start - cdna_coding_start).rem_euclid(3);
    let last_codon = cdna_end - (cdna_end - cdna_coding_start).rem_euclid(3);
    if !sequence.is_available() || first_codon < 1 || last_codon + 2 > sequence.len() {
        return Ok(false);
    }
    for codon_start in [first_codon, last_codon] {
        if let Some(codon) = sequence.codon(codon_start)? {
            if state.table.is_stop(&codon) {
                return Ok(true);
            }
        }
    }
    Ok(false)
}
