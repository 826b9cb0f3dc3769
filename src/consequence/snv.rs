//! Single nucleotide variants

use super::context::{annotate_genes, TranscriptSolver, TranscriptState};
use super::stitch::TranscriptSequence;
use super::walk::ExonWalk;
use super::{CalculatorContext, ConsequenceCalculator, RegulatoryOverlap};
use crate::error::FerroError;
use crate::model::{ConsequenceType, Gene, Variant};
use crate::so::rules::format_codon_change;
use crate::so::Consequence;

/// Consequence types of single nucleotide variants
#[derive(Debug, Clone, Copy, Default)]
pub struct SnvCalculator;

impl ConsequenceCalculator for SnvCalculator {
    fn run(
        &self,
        ctx: &CalculatorContext<'_>,
        variant: &Variant,
        genes: &[&Gene],
        regulatory: RegulatoryOverlap,
    ) -> Result<Vec<ConsequenceType>, FerroError> {
        let interval = (variant.start, variant.start);
        annotate_genes(self, ctx, variant, &variant.chromosome, interval, genes, regulatory)
    }
}

impl TranscriptSolver for SnvCalculator {
    fn covering_terms(&self, _variant: &Variant) -> Vec<Consequence> {
        Vec::new()
    }

    fn solve_coding(
        &self,
        state: &mut TranscriptState<'_>,
        walk: &ExonWalk,
        cdna_coding_start: i64,
    ) -> Result<(), FerroError> {
        let cdna = match walk.cdna_start {
            Some(cdna) => cdna,
            None => {
                state.terms.add(Consequence::CodingSequenceVariant);
                return Ok(());
            }
        };
        if state.in_incomplete_terminal_codon(cdna, cdna_coding_start) {
            state.terms.add(Consequence::IncompleteTerminalCodonVariant);
            return Ok(());
        }

        let phase = (cdna - cdna_coding_start).rem_euclid(3);
        let codon_start = cdna - phase;
        let reference = TranscriptSequence::new(state).codon(codon_start)?;
        let alternate_base = state.alternate_sense(&state.variant.alternate);
        let (reference, alternate) = match (reference, alternate_base.chars().next()) {
            (Some(reference), Some(base)) => {
                let mut alternate: Vec<char> = reference.chars().collect();
                alternate[phase as usize] = base;
                (reference, alternate.into_iter().collect::<String>())
            }
            _ => {
                state.terms.add(Consequence::CodingSequenceVariant);
                return Ok(());
            }
        };

        let mut changed = [false; 3];
        changed[phase as usize] = true;
        state.record.codon = Some(format_codon_change(&reference, &alternate, &changed));
        state.set_amino_acids(&reference, &alternate);

        match state.codon_term(codon_start, cdna_coding_start, &reference, &alternate) {
            Some(term) => state.terms.add(term),
            None => state.terms.add(Consequence::CodingSequenceVariant),
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consequence::context::fixtures::{minus_gene, plus_gene, spliced_gene};
    use crate::model::gene::CDS_END_NF;
    use crate::provider::MockProvider;
    use rstest::rstest;

    fn annotate(variant: &Variant, genes: &[Gene]) -> Vec<ConsequenceType> {
        let provider = MockProvider::new();
        let ctx = CalculatorContext::new(&provider);
        SnvCalculator
            .run(&ctx, variant, &genes.iter().collect::<Vec<_>>(), RegulatoryOverlap::default())
            .unwrap()
    }

    // =========================================================================
    // Codon classification
    // =========================================================================

    #[rstest]
    #[case(100, "A", "T", "start_lost", "Atg/Ttg")]
    #[case(104, "C", "T", "missense_variant", "gCa/gTa")]
    #[case(105, "A", "G", "synonymous_variant", "gcA/gcG")]
    #[case(397, "T", "C", "stop_lost", "Taa/Caa")]
    #[case(399, "A", "G", "stop_retained_variant", "taA/taG")]
    fn test_plus_strand_codons(
        #[case] position: i64,
        #[case] reference: &str,
        #[case] alternate: &str,
        #[case] term: &str,
        #[case] codon: &str,
    ) {
        let records = annotate(&Variant::new("1", position, reference, alternate), &[plus_gene()]);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].term_names(), vec![term]);
        assert_eq!(records[0].codon.as_deref(), Some(codon));
    }

    #[test]
    fn test_protein_change_fields() {
        let records = annotate(&Variant::new("1", 104, "C", "T"), &[plus_gene()]);
        let record = &records[0];
        assert_eq!(record.cdna_position, Some(55));
        assert_eq!(record.cds_position, Some(5));
        let protein = record.protein_variant_annotation.as_ref().unwrap();
        assert_eq!(protein.position, 2);
        assert_eq!(protein.protein_id.as_deref(), Some("PX_PLUS"));
        assert_eq!(protein.reference.as_deref(), Some("Ala"));
        assert_eq!(protein.alternate.as_deref(), Some("Val"));
    }

    #[test]
    fn test_minus_strand_start_codon() {
        // sense ATG sits on 2:1298-1300 as CAT
        let records = annotate(&Variant::new("2", 1300, "T", "A"), &[minus_gene()]);
        assert_eq!(records[0].term_names(), vec!["start_lost"]);
        assert_eq!(records[0].codon.as_deref(), Some("Atg/Ttg"));
        assert_eq!(records[0].cds_position, Some(1));
    }

    #[test]
    fn test_codon_across_exon_junction() {
        let records = annotate(&Variant::new("1", 1200, "A", "C"), &[spliced_gene()]);
        assert_eq!(
            records[0].term_names(),
            vec!["splice_region_variant", "synonymous_variant"]
        );
        assert_eq!(records[0].codon.as_deref(), Some("gcA/gcC"));
    }

    // =========================================================================
    // Outside the CDS
    // =========================================================================

    #[test]
    fn test_utr_positions() {
        let records = annotate(&Variant::new("1", 60, "G", "T"), &[plus_gene()]);
        assert_eq!(records[0].term_names(), vec!["5_prime_UTR_variant"]);
        assert!(records[0].codon.is_none());

        let records = annotate(&Variant::new("1", 400, "C", "T"), &[plus_gene()]);
        assert_eq!(records[0].term_names(), vec!["3_prime_UTR_variant"]);
    }

    #[test]
    fn test_intronic_snv() {
        let records = annotate(&Variant::new("1", 1150, "A", "G"), &[spliced_gene()]);
        assert_eq!(records[0].term_names(), vec!["intron_variant"]);
        assert!(records[0].cds_position.is_none());
    }

    #[test]
    fn test_incomplete_terminal_codon() {
        let mut gene = plus_gene();
        let transcript = &mut gene.transcripts[0];
        transcript.cdna_coding_end = 349;
        transcript.genomic_coding_end = 398;
        transcript.flags.push(CDS_END_NF.to_string());
        let records = annotate(&Variant::new("1", 398, "A", "G"), &[gene]);
        assert_eq!(
            records[0].term_names(),
            vec!["incomplete_terminal_codon_variant"]
        );
    }
}
