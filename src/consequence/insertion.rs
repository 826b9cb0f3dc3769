//! Insertions
//!
//! An insertion is located by its two flanking reference bases. In
//! transcript orientation `five` is the base before the inserted sequence
//! and `three` the base after it.

use super::context::{annotate_genes, TranscriptSolver, TranscriptState};
use super::junction::JunctionRules;
use super::stitch::TranscriptSequence;
use super::walk::ExonWalk;
use super::{CalculatorContext, ConsequenceCalculator, RegulatoryOverlap};
use crate::error::FerroError;
use crate::model::{ConsequenceType, Gene, Strand, Transcript, Variant};
use crate::so::rules::{classify_start_codon_change, decide_stop_codon_modification, format_codon_change};
use crate::so::Consequence;

/// Consequence types of insertions
#[derive(Debug, Clone, Copy, Default)]
pub struct InsertionCalculator;

impl ConsequenceCalculator for InsertionCalculator {
    fn run(
        &self,
        ctx: &CalculatorContext<'_>,
        variant: &Variant,
        genes: &[&Gene],
        regulatory: RegulatoryOverlap,
    ) -> Result<Vec<ConsequenceType>, FerroError> {
        let interval = (variant.start - 1, variant.start);
        annotate_genes(self, ctx, variant, &variant.chromosome, interval, genes, regulatory)
    }
}

impl TranscriptSolver for InsertionCalculator {
    fn covering_terms(&self, _variant: &Variant) -> Vec<Consequence> {
        Vec::new()
    }

    /// Insertions right before the first or after the last base are flanking.
    fn overlaps(&self, transcript: &Transcript, start: i64, end: i64) -> bool {
        end > transcript.start && start < transcript.end
    }

    fn junction_rules(&self, _ctx: &CalculatorContext<'_>) -> JunctionRules {
        JunctionRules::Insertion
    }

    fn solve_exon(&self, state: &mut TranscriptState<'_>, walk: &ExonWalk) -> Result<(), FerroError> {
        let (five, three) = (state.five_prime(), state.three_prime());
        if state.upstream_of_cds(five) {
            if state.has_five_prime_utr() {
                state.terms.add(Consequence::FivePrimeUtrVariant);
            }
        } else if !state.downstream_of_cds(five) {
            let cdna_coding_start = state.set_cds_and_protein_position(walk.cdna_start, walk.first_cds_phase);
            if !state.downstream_of_cds(three) {
                self.solve_coding(state, walk, cdna_coding_start)?;
            } else if state.has_three_prime_utr() {
                state.terms.add(Consequence::ThreePrimeUtrVariant);
            }
        } else if state.has_three_prime_utr() {
            state.terms.add(Consequence::ThreePrimeUtrVariant);
        }
        Ok(())
    }

    fn solve_coding(
        &self,
        state: &mut TranscriptState<'_>,
        walk: &ExonWalk,
        cdna_coding_start: i64,
    ) -> Result<(), FerroError> {
        let (cdna_start, cdna_end) = match (walk.cdna_start, walk.cdna_end) {
            (Some(start), Some(end)) => (start, end),
            _ => {
                state.terms.add(Consequence::CodingSequenceVariant);
                return Ok(());
            }
        };

        if cdna_start < cdna_coding_start + 2 && !state.transcript.unconfirmed_start() {
            solve_start_codon(state, cdna_end)?;
        }
        if state.in_incomplete_terminal_codon(cdna_start, cdna_coding_start) {
            state.terms.add(Consequence::IncompleteTerminalCodonVariant);
        }
        // symbolic insertions may carry a partial sequence only
        if state.variant.is_symbolic() {
            state.terms.add(Consequence::CodingSequenceVariant);
        } else if state.variant.alternate.len() % 3 == 0 {
            state.terms.add(Consequence::InframeInsertion);
        } else {
            state.terms.add(Consequence::FrameshiftVariant);
        }
        solve_stop_codon(state, cdna_start, cdna_coding_start)
    }
}

/// Inserted bases in transcript orientation.
///
/// Symbolic insertions use the sequence known at the transcript 5' side.
fn inserted_sense(state: &TranscriptState<'_>) -> Result<Vec<char>, FerroError> {
    let variant = state.variant;
    let inserted = if variant.is_symbolic() {
        let sv = variant.sv.as_ref();
        let known = match state.transcript.strand {
            Strand::Plus => sv.and_then(|sv| sv.left_sv_ins_seq.as_deref()),
            Strand::Minus => sv.and_then(|sv| sv.right_sv_ins_seq.as_deref()),
        };
        known.ok_or_else(|| FerroError::MalformedVariant {
            variant: variant.key(),
            msg: "symbolic insertion without inserted sequence".to_string(),
        })?
    } else {
        variant.alternate.as_str()
    };
    Ok(state.alternate_sense(inserted).chars().collect())
}

/// Start codon after pasting the insertion before `cdna_end`.
fn solve_start_codon(state: &mut TranscriptState<'_>, cdna_end: i64) -> Result<(), FerroError> {
    let codon_start = state.transcript.cdna_coding_start;
    let shift = cdna_end - codon_start;
    if !(0..3).contains(&shift) {
        return Ok(());
    }
    let sequence = TranscriptSequence::new(state);
    let reference = match sequence.codon(codon_start)? {
        Some(reference) => reference,
        None => return Ok(()),
    };
    let inserted = inserted_sense(state)?;
    let mut modified: Vec<char> = reference.chars().take(shift as usize).collect();
    modified.extend(inserted.iter().take(3 - shift as usize));
    let mut next = cdna_end;
    while modified.len() < 3 {
        match sequence.base(next)? {
            Some(nt) => modified.push(nt),
            None => return Ok(()),
        }
        next += 1;
    }
    let modified: String = modified.into_iter().collect();
    if let Some(term) = classify_start_codon_change(state.table, &reference, &modified) {
        state.terms.add(term);
    }
    Ok(())
}

/// Check every codon formed by the inserted bases for stop changes.
fn solve_stop_codon(
    state: &mut TranscriptState<'_>,
    cdna_start: i64,
    cdna_coding_start: i64,
) -> Result<(), FerroError> {
    let sequence = TranscriptSequence::new(state);
    let phase = (cdna_start + 1 - cdna_coding_start).rem_euclid(3) as usize;
    let codon_start = cdna_start + 1 - phase as i64;
    if codon_start < 1 || codon_start + 2 > sequence.len() {
        return Ok(());
    }
    let reference = match sequence.codon(codon_start)? {
        Some(reference) => reference,
        None => return Ok(()),
    };
    let inserted = inserted_sense(state)?;

    let mut modified: Vec<char> = reference.chars().collect();
    let mut position = phase;
    let mut next_reference = cdna_start + 1;
    let mut pasted = 0;
    let mut first = true;
    loop {
        let mut changed = [false; 3];
        while position < 3 && pasted < inserted.len() {
            modified[position] = inserted[pasted];
            changed[position] = true;
            pasted += 1;
            position += 1;
        }
        while position < 3 {
            match sequence.base(next_reference)? {
                Some(nt) => modified[position] = nt,
                None => return Ok(()),
            }
            next_reference += 1;
            position += 1;
        }
        let codon: String = modified.iter().collect();
        if first {
            state.record.codon = Some(format_codon_change(&reference, &codon, &changed));
            state.set_amino_acids(&reference, &codon);
            first = false;
        }
        if let Some(term) = decide_stop_codon_modification(state.table, &reference, &codon) {
            state.terms.add(term);
        }
        if pasted >= inserted.len() {
            return Ok(());
        }
        position = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consequence::context::fixtures::{minus_gene, plus_gene, spliced_gene};
    use crate::model::StructuralVariation;
    use crate::provider::MockProvider;
    use rstest::rstest;

    fn annotate(variant: &Variant, genes: &[Gene]) -> Result<Vec<ConsequenceType>, FerroError> {
        let provider = MockProvider::new();
        let ctx = CalculatorContext::new(&provider);
        InsertionCalculator.run(&ctx, variant, &genes.iter().collect::<Vec<_>>(), RegulatoryOverlap::default())
    }

    fn terms(variant: &Variant, genes: &[Gene]) -> Vec<String> {
        annotate(variant, genes).unwrap()[0]
            .term_names()
            .into_iter()
            .map(str::to_string)
            .collect()
    }

    // =========================================================================
    // Coding insertions
    // =========================================================================

    #[rstest]
    #[case("GCA", vec!["inframe_insertion"])]
    #[case("T", vec!["frameshift_variant"])]
    #[case("TAA", vec!["inframe_insertion", "stop_gained"])]
    #[case("GCATGA", vec!["inframe_insertion", "stop_gained"])]
    fn test_insertion_between_codons(#[case] inserted: &str, #[case] expected: Vec<&str>) {
        // between 1:105 and 1:106, i.e. after codon 2
        let variant = Variant::new("1", 106, "", inserted);
        assert_eq!(terms(&variant, &[plus_gene()]), expected);
    }

    #[test]
    fn test_codon_and_positions() {
        let variant = Variant::new("1", 106, "", "TAA");
        let records = annotate(&variant, &[plus_gene()]).unwrap();
        assert_eq!(records[0].cdna_position, Some(56));
        assert_eq!(records[0].codon.as_deref(), Some("GCA/TAA"));
        let protein = records[0].protein_variant_annotation.as_ref().unwrap();
        assert_eq!(protein.alternate.as_deref(), Some("Stop"));
    }

    #[test]
    fn test_insertion_inside_start_codon() {
        let variant = Variant::new("1", 101, "", "C");
        assert_eq!(
            terms(&variant, &[plus_gene()]),
            vec!["start_lost", "frameshift_variant"]
        );
    }

    #[test]
    fn test_minus_strand_stop_gained() {
        // sense TAA between cDNA 56 and 57 (2:1295 and 2:1294)
        let variant = Variant::new("2", 1295, "", "TTA");
        assert_eq!(
            terms(&variant, &[minus_gene()]),
            vec!["inframe_insertion", "stop_gained"]
        );
    }

    // =========================================================================
    // Boundaries
    // =========================================================================

    #[test]
    fn test_insertion_in_utr() {
        let variant = Variant::new("1", 70, "", "A");
        assert_eq!(terms(&variant, &[plus_gene()]), vec!["5_prime_UTR_variant"]);
        let variant = Variant::new("1", 100, "", "A");
        assert_eq!(terms(&variant, &[plus_gene()]), vec!["5_prime_UTR_variant"]);
    }

    #[test]
    fn test_insertion_before_transcript_start_is_flanking() {
        let variant = Variant::new("1", 50, "", "A");
        assert_eq!(terms(&variant, &[plus_gene()]), vec!["2KB_upstream_variant"]);
    }

    #[test]
    fn test_insertion_at_exon_end() {
        let variant = Variant::new("1", 1100, "", "T");
        assert_eq!(
            terms(&variant, &[spliced_gene()]),
            vec!["splice_region_variant", "frameshift_variant"]
        );
    }

    // =========================================================================
    // Symbolic insertions
    // =========================================================================

    #[test]
    fn test_symbolic_insertion_with_known_sequence() {
        let variant = Variant::new("1", 106, "", "<INS>").with_sv(StructuralVariation {
            left_sv_ins_seq: Some("TAA".to_string()),
            ..Default::default()
        });
        assert_eq!(
            terms(&variant, &[plus_gene()]),
            vec!["coding_sequence_variant", "stop_gained"]
        );
    }

    #[test]
    fn test_symbolic_insertion_without_sequence_is_malformed() {
        let variant = Variant::new("1", 106, "", "<INS>");
        let err = annotate(&variant, &[plus_gene()]).unwrap_err();
        assert!(matches!(err, FerroError::MalformedVariant { .. }));
        assert!(!err.is_batch_fatal());
    }
}
