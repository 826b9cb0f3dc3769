//! Multi-nucleotide substitutions

use super::context::{annotate_genes, TranscriptSolver, TranscriptState};
use super::stitch::TranscriptSequence;
use super::walk::ExonWalk;
use super::{CalculatorContext, ConsequenceCalculator, RegulatoryOverlap};
use crate::error::FerroError;
use crate::model::{ConsequenceType, Gene, Variant};
use crate::so::rules::format_codon_change;
use crate::so::Consequence;

/// Consequence types of equal-length substitutions of several bases
#[derive(Debug, Clone, Copy, Default)]
pub struct MnvCalculator;

impl ConsequenceCalculator for MnvCalculator {
    fn run(
        &self,
        ctx: &CalculatorContext<'_>,
        variant: &Variant,
        genes: &[&Gene],
        regulatory: RegulatoryOverlap,
    ) -> Result<Vec<ConsequenceType>, FerroError> {
        let interval = (variant.start, variant.end);
        annotate_genes(self, ctx, variant, &variant.chromosome, interval, genes, regulatory)
    }
}

/// Terms that only stand when no codon changes its amino acid.
fn is_silent(term: Consequence) -> bool {
    matches!(
        term,
        Consequence::SynonymousVariant
            | Consequence::StopRetainedVariant
            | Consequence::StartRetainedVariant
    )
}

fn is_altering(term: Consequence) -> bool {
    matches!(
        term,
        Consequence::MissenseVariant
            | Consequence::StopGained
            | Consequence::StopLost
            | Consequence::StartLost
    )
}

impl TranscriptSolver for MnvCalculator {
    fn covering_terms(&self, _variant: &Variant) -> Vec<Consequence> {
        Vec::new()
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
        let alternate: Vec<char> = state.alternate_sense(&state.variant.alternate).chars().collect();
        let (cdna_start, cdna_end) = match (walk.cdna_start, walk.cdna_end) {
            (Some(start), Some(end))
                if !walk.splicing
                    && state.variant.reference.len() == alternate.len()
                    && end - start + 1 == alternate.len() as i64 =>
            {
                (start, end)
            }
            _ => {
                state.terms.add(Consequence::CodingSequenceVariant);
                return Ok(());
            }
        };

        let sequence = TranscriptSequence::new(state);
        let first_codon = cdna_start - (cdna_start - cdna_coding_start).rem_euclid(3);
        let mut reference_codons = String::new();
        let mut alternate_codons = String::new();
        let mut changed = Vec::new();
        let mut codon_start = first_codon;
        while codon_start <= cdna_end {
            if state.in_incomplete_terminal_codon(codon_start, cdna_coding_start) {
                state.terms.add(Consequence::IncompleteTerminalCodonVariant);
                break;
            }
            let reference = match sequence.codon(codon_start)? {
                Some(reference) => reference,
                None => {
                    state.terms.add(Consequence::CodingSequenceVariant);
                    break;
                }
            };
            let mut modified: Vec<char> = reference.chars().collect();
            for (offset, nt) in modified.iter_mut().enumerate() {
                let cdna = codon_start + offset as i64;
                let hit = (cdna_start..=cdna_end).contains(&cdna);
                if hit {
                    *nt = alternate[(cdna - cdna_start) as usize];
                }
                changed.push(hit);
            }
            let modified: String = modified.into_iter().collect();
            match state.codon_term(codon_start, cdna_coding_start, &reference, &modified) {
                Some(term) => state.terms.add(term),
                None => state.terms.add(Consequence::CodingSequenceVariant),
            }
            reference_codons.push_str(&reference);
            alternate_codons.push_str(&modified);
            codon_start += 3;
        }

        if state.terms.as_slice().iter().any(|t| is_altering(*t)) {
            state.terms.retain(|t| !is_silent(t));
        }
        if !reference_codons.is_empty() {
            state.record.codon = Some(format_codon_change(&reference_codons, &alternate_codons, &changed));
            state.set_amino_acids(&reference_codons, &alternate_codons);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consequence::context::fixtures::{minus_gene, plus_gene, spliced_gene};
    use crate::provider::MockProvider;
    use rstest::rstest;

    fn annotate(variant: &Variant, genes: &[Gene]) -> Vec<ConsequenceType> {
        let provider = MockProvider::new();
        let ctx = CalculatorContext::new(&provider);
        MnvCalculator
            .run(&ctx, variant, &genes.iter().collect::<Vec<_>>(), RegulatoryOverlap::default())
            .unwrap()
    }

    // =========================================================================
    // Codon classification
    // =========================================================================

    #[rstest]
    #[case(104, "CA", "TG", vec!["missense_variant"], "gCA/gTG")]
    #[case(103, "GC", "TA", vec!["stop_gained"], "GCa/TAa")]
    #[case(105, "AG", "GT", vec!["missense_variant"], "gcAGca/gcGTca")]
    #[case(105, "AG", "GG", vec!["synonymous_variant"], "gcAGca/gcGGca")]
    fn test_plus_strand_mnv(
        #[case] start: i64,
        #[case] reference: &str,
        #[case] alternate: &str,
        #[case] expected: Vec<&str>,
        #[case] codon: &str,
    ) {
        let records = annotate(&Variant::new("1", start, reference, alternate), &[plus_gene()]);
        assert_eq!(records[0].term_names(), expected);
        assert_eq!(records[0].codon.as_deref(), Some(codon));
    }

    #[test]
    fn test_amino_acids_span_codons() {
        let records = annotate(&Variant::new("1", 105, "AG", "GT"), &[plus_gene()]);
        let protein = records[0].protein_variant_annotation.as_ref().unwrap();
        assert_eq!(protein.reference.as_deref(), Some("AlaAla"));
        assert_eq!(protein.alternate.as_deref(), Some("AlaSer"));
        assert_eq!(protein.position, 2);
    }

    #[test]
    fn test_minus_strand_start_codon() {
        // sense cDNA 51-52 "AT" sits on 2:1299-1300 as "AT"
        let records = annotate(&Variant::new("2", 1299, "AT", "CA"), &[minus_gene()]);
        assert_eq!(records[0].term_names(), vec!["start_lost"]);
        assert_eq!(records[0].codon.as_deref(), Some("ATg/TGg"));
    }

    #[test]
    fn test_mnv_across_splice_site() {
        let records = annotate(&Variant::new("1", 1099, "CG", "TT"), &[spliced_gene()]);
        assert_eq!(
            records[0].term_names(),
            vec!["splice_donor_variant", "coding_sequence_variant"]
        );
        assert!(records[0].codon.is_none());
    }
}
