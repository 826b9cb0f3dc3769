//! Copy-number gains and duplications

use super::context::{annotate_genes, structural_interval, TranscriptSolver, TranscriptState};
use super::region::solve_region_coding;
use super::walk::ExonWalk;
use super::{CalculatorContext, ConsequenceCalculator, RegulatoryOverlap};
use crate::error::FerroError;
use crate::model::{ConsequenceType, Gene, Variant, VariantType};
use crate::so::Consequence;

/// Consequence types of copy-number gains
#[derive(Debug, Clone, Copy, Default)]
pub struct CnvGainCalculator;

impl ConsequenceCalculator for CnvGainCalculator {
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

impl TranscriptSolver for CnvGainCalculator {
    fn covering_terms(&self, variant: &Variant) -> Vec<Consequence> {
        let mut terms = vec![Consequence::TranscriptAmplification];
        if variant.variant_type == VariantType::Cnv {
            terms.push(Consequence::CopyNumberGain);
        }
        terms
    }

    fn overlap_terms(&self, state: &mut TranscriptState<'_>) {
        state.terms.add(Consequence::FeatureElongation);
        if state.variant.variant_type == VariantType::Cnv {
            state.terms.add(Consequence::CopyNumberGain);
        }
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consequence::context::fixtures::{minus_gene, plus_gene};
    use crate::model::StructuralVariation;
    use crate::provider::MockProvider;

    fn annotate(variant: &Variant, genes: &[Gene]) -> Vec<ConsequenceType> {
        let provider = MockProvider::new();
        let ctx = CalculatorContext::new(&provider);
        CnvGainCalculator
            .run(&ctx, variant, &genes.iter().collect::<Vec<_>>(), RegulatoryOverlap::default())
            .unwrap()
    }

    fn gain(start: i64, end: i64) -> Variant {
        Variant::new("1", start, "N", "<CN4>")
            .with_end(end)
            .with_sv(StructuralVariation {
                copy_number: Some(4),
                ..Default::default()
            })
    }

    #[test]
    fn test_duplication_covering_transcript() {
        let variant = Variant::new("1", 10, "N", "<DUP>").with_end(500);
        let records = annotate(&variant, &[plus_gene()]);
        assert_eq!(records[0].term_names(), vec!["transcript_amplification"]);
    }

    #[test]
    fn test_copy_number_gain_covering_transcript() {
        let records = annotate(&gain(10, 500), &[plus_gene()]);
        assert_eq!(
            records[0].term_names(),
            vec!["transcript_amplification", "copy_number_gain"]
        );
    }

    #[test]
    fn test_partial_gain() {
        let variant = Variant::new("1", 150, "N", "<DUP>").with_end(160);
        let records = annotate(&variant, &[plus_gene()]);
        assert_eq!(
            records[0].term_names(),
            vec!["feature_elongation", "coding_sequence_variant"]
        );

        let records = annotate(&gain(150, 160), &[plus_gene()]);
        assert_eq!(
            records[0].term_names(),
            vec!["feature_elongation", "copy_number_gain", "coding_sequence_variant"]
        );
    }

    #[test]
    fn test_gain_over_minus_strand_start() {
        // 2:1290-1310 spans the sense 5' UTR and the first codons
        let variant = Variant::new("2", 1290, "N", "<DUP>").with_end(1310);
        let records = annotate(&variant, &[minus_gene()]);
        assert_eq!(
            records[0].term_names(),
            vec![
                "feature_elongation",
                "5_prime_UTR_variant",
                "coding_sequence_variant",
                "initiator_codon_variant"
            ]
        );
    }
}
