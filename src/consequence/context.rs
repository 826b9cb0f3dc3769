//! Shared calculator skeleton
//!
//! [`annotate_genes`] drives a [`TranscriptSolver`] over every transcript of
//! the candidate genes. The solver supplies the variant-shape specific
//! pieces (covering term, junction rules, coding classification); the
//! driver handles flanking windows, biotype dispatch, miRNA, intergenic and
//! regulatory records.

use crate::error::FerroError;
use crate::model::{
    ConsequenceType, Gene, ProteinVariantAnnotation, Strand, StructuralVariation, Transcript,
    Variant, VariantType,
};
use crate::so::rules::{classify_codon_change, classify_start_codon_change, reverse_complement};
use crate::so::{is_coding_biotype, CodonTable, Consequence, GeneticCode, MIRNA, NONSENSE_MEDIATED_DECAY};

use super::junction::JunctionRules;
use super::walk::{walk_exons, ExonWalk};
use super::{CalculatorContext, RegulatoryOverlap};

/// Width of the upstream/downstream window
pub(crate) const FLANK: i64 = 5000;
/// Width of the inner "2KB" window
pub(crate) const FLANK_2KB: i64 = 2000;

/// Whether `[start1, end1]` and `[start2, end2]` share a position.
pub(crate) fn regions_overlap(start1: i64, end1: i64, start2: i64, end2: i64) -> bool {
    start2 <= end1 && end2 >= start1
}

/// Effective interval of a structural variant.
///
/// Imprecise variants widen to the outer confidence bounds plus the
/// configured padding (CNV padding for copy-number variants).
pub(crate) fn structural_interval(ctx: &CalculatorContext<'_>, variant: &Variant) -> (i64, i64) {
    let options = &ctx.options;
    match (&variant.sv, options.imprecise) {
        (Some(sv), true) => {
            let padding = if variant.variant_type == VariantType::Cnv {
                options.cnv_extra_padding
            } else {
                options.sv_extra_padding
            };
            widen(sv, variant.start, variant.end, padding)
        }
        _ => (variant.start, variant.end),
    }
}

fn widen(sv: &StructuralVariation, start: i64, end: i64, padding: i64) -> (i64, i64) {
    let start = sv.ci_start_left.map_or(start, |left| left - padding);
    let end = sv.ci_end_right.map_or(end, |right| right + padding);
    (start.max(1), end)
}

/// Ordered, duplicate-free SO term list of one record
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct SoTerms(Vec<Consequence>);

impl SoTerms {
    pub fn add(&mut self, term: Consequence) {
        if !self.0.contains(&term) {
            self.0.push(term);
        }
    }

    pub fn contains(&self, term: Consequence) -> bool {
        self.0.contains(&term)
    }

    pub fn retain(&mut self, keep: impl Fn(Consequence) -> bool) {
        self.0.retain(|term| keep(*term));
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_slice(&self) -> &[Consequence] {
        &self.0
    }
}

/// Working state for one (variant, transcript) pair
pub(crate) struct TranscriptState<'a> {
    pub ctx: &'a CalculatorContext<'a>,
    pub variant: &'a Variant,
    pub gene: &'a Gene,
    pub transcript: &'a Transcript,
    pub chromosome: &'a str,
    /// Effective genomic interval (insertions: the two flanking bases)
    pub start: i64,
    pub end: i64,
    pub terms: SoTerms,
    pub record: ConsequenceType,
    pub table: &'static CodonTable,
}

impl<'a> TranscriptState<'a> {
    pub fn new(
        ctx: &'a CalculatorContext<'a>,
        variant: &'a Variant,
        gene: &'a Gene,
        transcript: &'a Transcript,
        chromosome: &'a str,
        (start, end): (i64, i64),
    ) -> Self {
        Self {
            ctx,
            variant,
            gene,
            transcript,
            chromosome,
            start,
            end,
            terms: SoTerms::default(),
            record: ConsequenceType::for_transcript(gene, transcript),
            table: GeneticCode::for_chromosome(chromosome).table(),
        }
    }

    pub fn is_plus(&self) -> bool {
        self.transcript.strand == Strand::Plus
    }

    /// Genomic position of the variant's 5' end in transcript orientation.
    pub fn five_prime(&self) -> i64 {
        if self.is_plus() {
            self.start
        } else {
            self.end
        }
    }

    /// Genomic position of the variant's 3' end in transcript orientation.
    pub fn three_prime(&self) -> i64 {
        if self.is_plus() {
            self.end
        } else {
            self.start
        }
    }

    /// Whether a genomic position lies 5' of the CDS.
    pub fn upstream_of_cds(&self, position: i64) -> bool {
        if self.is_plus() {
            position < self.transcript.genomic_coding_start
        } else {
            position > self.transcript.genomic_coding_end
        }
    }

    /// Whether a genomic position lies 3' of the CDS.
    pub fn downstream_of_cds(&self, position: i64) -> bool {
        if self.is_plus() {
            position > self.transcript.genomic_coding_end
        } else {
            position < self.transcript.genomic_coding_start
        }
    }

    /// Whether a genomic position reaches into the last three coding bases.
    pub fn reaches_last_codon(&self, position: i64) -> bool {
        if self.is_plus() {
            position > self.transcript.genomic_coding_end - 3
        } else {
            position < self.transcript.genomic_coding_start + 3
        }
    }

    pub fn has_five_prime_utr(&self) -> bool {
        let t = self.transcript;
        t.unconfirmed_start()
            || if self.is_plus() {
                t.start < t.genomic_coding_start
            } else {
                t.end > t.genomic_coding_end
            }
    }

    pub fn has_three_prime_utr(&self) -> bool {
        let t = self.transcript;
        t.unconfirmed_end()
            || if self.is_plus() {
                t.end > t.genomic_coding_end
            } else {
                t.start < t.genomic_coding_start
            }
    }

    /// Whether the first codon of the CDS is a real start codon.
    pub fn start_confirmed(&self, cdna_coding_start: i64) -> bool {
        cdna_coding_start > 0 || !self.transcript.unconfirmed_start()
    }

    /// Alternate allele in transcript orientation, upper case.
    pub fn alternate_sense(&self, alternate: &str) -> String {
        let alternate = alternate.to_ascii_uppercase();
        if self.is_plus() {
            alternate
        } else {
            reverse_complement(&alternate)
        }
    }

    /// Set CDS and protein position from a cDNA position.
    ///
    /// Returns the cDNA coding start, shifted back by the first coding
    /// exon's phase when the CDS start is not confirmed.
    pub fn set_cds_and_protein_position(&mut self, cdna: Option<i64>, first_cds_phase: i32) -> i64 {
        let mut cdna_coding_start = self.transcript.cdna_coding_start;
        if self.transcript.unconfirmed_start() {
            cdna_coding_start -= (3 - i64::from(first_cds_phase)).rem_euclid(3);
        }
        if let Some(cdna) = cdna {
            let cds = cdna - cdna_coding_start + 1;
            self.record.cds_position = Some(cds);
            self.record.protein_variant_annotation = Some(ProteinVariantAnnotation {
                protein_id: self.transcript.protein_id.clone(),
                position: (cds - 1).div_euclid(3) + 1,
                ..Default::default()
            });
        }
        cdna_coding_start
    }

    /// Phase of the last CDS base; `2` for a CDS of whole codons.
    pub fn final_phase(&self, cdna_coding_start: i64) -> i64 {
        (self.transcript.cdna_coding_end - cdna_coding_start).rem_euclid(3)
    }

    /// Whether a cDNA position falls in a trailing partial codon.
    pub fn in_incomplete_terminal_codon(&self, cdna: i64, cdna_coding_start: i64) -> bool {
        let final_phase = self.final_phase(cdna_coding_start);
        final_phase != 2 && cdna >= self.transcript.cdna_coding_end - final_phase
    }

    /// Codon-level term for a substituted codon starting at `codon_start`.
    ///
    /// The first codon of a confirmed CDS is classified as a start codon
    /// when the reference is one.
    pub fn codon_term(
        &self,
        codon_start: i64,
        cdna_coding_start: i64,
        reference: &str,
        alternate: &str,
    ) -> Option<Consequence> {
        if codon_start == cdna_coding_start && self.start_confirmed(cdna_coding_start) {
            if let Some(term) = classify_start_codon_change(self.table, reference, alternate) {
                return Some(term);
            }
        }
        classify_codon_change(self.table, reference, alternate)
    }

    /// Record reference and alternate amino acids for a codon change.
    pub fn set_amino_acids(&mut self, reference: &str, alternate: &str) {
        let translate = |codons: &str| -> Option<String> {
            let mut out = String::new();
            for codon in codons.as_bytes().chunks(3) {
                let codon = std::str::from_utf8(codon).ok()?;
                out.push_str(self.table.translate(codon)?.three_letter());
            }
            Some(out)
        };
        let (reference, alternate) = (translate(reference), translate(alternate));
        let annotation = self
            .record
            .protein_variant_annotation
            .get_or_insert_with(Default::default);
        annotation.reference = reference;
        annotation.alternate = alternate;
    }

    fn solve_flanking(&mut self) {
        let t = self.transcript;
        let (left, left_2kb, right, right_2kb) = if self.is_plus() {
            (
                Consequence::UpstreamGeneVariant,
                Consequence::TwoKbUpstreamVariant,
                Consequence::DownstreamGeneVariant,
                Consequence::TwoKbDownstreamVariant,
            )
        } else {
            (
                Consequence::DownstreamGeneVariant,
                Consequence::TwoKbDownstreamVariant,
                Consequence::UpstreamGeneVariant,
                Consequence::TwoKbUpstreamVariant,
            )
        };
        if regions_overlap(t.start - FLANK, t.start - 1, self.start, self.end) {
            if regions_overlap(t.start - FLANK_2KB, t.start - 1, self.start, self.end) {
                self.terms.add(left_2kb);
            } else {
                self.terms.add(left);
            }
        }
        if regions_overlap(t.end + 1, t.end + FLANK, self.start, self.end) {
            if regions_overlap(t.end + 1, t.end + FLANK_2KB, self.start, self.end) {
                self.terms.add(right_2kb);
            } else {
                self.terms.add(right);
            }
        }
    }

    /// Non-coding transcript terms, with miRNA mature products when known.
    pub fn solve_mirna(&mut self, walk: &ExonWalk) {
        let mirna = self
            .gene
            .mirna
            .as_ref()
            .filter(|_| self.transcript.biotype == MIRNA);
        if let Some(mirna) = mirna {
            let start = walk.cdna_start.unwrap_or(1);
            let end = walk.cdna_end.unwrap_or(mirna.sequence.len() as i64);
            if mirna
                .matures
                .iter()
                .any(|m| regions_overlap(m.cdna_start, m.cdna_end, start, end))
            {
                self.terms.add(Consequence::MatureMirnaVariant);
                return;
            }
        }
        if !walk.intronic {
            self.terms.add(Consequence::NonCodingTranscriptExonVariant);
        }
        self.terms.add(Consequence::NonCodingTranscriptVariant);
    }

    fn finish(mut self) -> Option<ConsequenceType> {
        if self.terms.is_empty() {
            return None;
        }
        self.record.set_terms(self.terms.as_slice().iter().copied());
        Some(self.record)
    }
}

/// Variant-shape specific steps of the shared skeleton.
pub(crate) trait TranscriptSolver: Sync {
    /// Terms for a variant spanning the whole transcript; empty to walk it instead.
    fn covering_terms(&self, variant: &Variant) -> Vec<Consequence>;

    /// Whether the effective interval overlaps the transcript.
    fn overlaps(&self, transcript: &Transcript, start: i64, end: i64) -> bool {
        regions_overlap(transcript.start, transcript.end, start, end)
    }

    /// Terms added to every partially overlapped transcript.
    fn overlap_terms(&self, _state: &mut TranscriptState<'_>) {}

    fn junction_rules(&self, ctx: &CalculatorContext<'_>) -> JunctionRules {
        JunctionRules::Regular {
            big_variant_threshold: ctx.options.big_variant_threshold,
        }
    }

    /// Whether exon overlap records carry the covered percentage.
    fn exon_percentage(&self) -> bool {
        false
    }

    /// Term for a variant running from inside the CDS past its end.
    fn cds_end_term(&self) -> Consequence {
        Consequence::TerminatorCodonVariant
    }

    /// Classify an exonic variant of a coding transcript.
    fn solve_exon(&self, state: &mut TranscriptState<'_>, walk: &ExonWalk) -> Result<(), FerroError> {
        classify_exon_variant(self, state, walk)
    }

    /// Classify a variant whose 5' and 3' ends both fall inside the CDS.
    fn solve_coding(
        &self,
        state: &mut TranscriptState<'_>,
        walk: &ExonWalk,
        cdna_coding_start: i64,
    ) -> Result<(), FerroError>;
}

/// Place an exonic variant relative to the UTRs and the CDS.
pub(crate) fn classify_exon_variant<S: TranscriptSolver + ?Sized>(
    solver: &S,
    state: &mut TranscriptState<'_>,
    walk: &ExonWalk,
) -> Result<(), FerroError> {
    let (five, three) = (state.five_prime(), state.three_prime());
    if state.upstream_of_cds(five) {
        if state.has_five_prime_utr() {
            state.terms.add(Consequence::FivePrimeUtrVariant);
        }
        if !state.upstream_of_cds(three) {
            state.terms.add(Consequence::CodingSequenceVariant);
            if state.start_confirmed(state.transcript.cdna_coding_start) {
                state.terms.add(Consequence::InitiatorCodonVariant);
            }
            if state.reaches_last_codon(three) {
                state.terms.add(solver.cds_end_term());
                if state.downstream_of_cds(three) && state.has_three_prime_utr() {
                    state.terms.add(Consequence::ThreePrimeUtrVariant);
                }
            }
        }
    } else if !state.downstream_of_cds(five) {
        let cdna_coding_start = state.set_cds_and_protein_position(walk.cdna_start, walk.first_cds_phase);
        if !state.downstream_of_cds(three) {
            solver.solve_coding(state, walk, cdna_coding_start)?;
        } else {
            if state.has_three_prime_utr() {
                state.terms.add(Consequence::ThreePrimeUtrVariant);
            }
            state.terms.add(Consequence::CodingSequenceVariant);
            state.terms.add(solver.cds_end_term());
        }
    } else if state.has_three_prime_utr() {
        state.terms.add(Consequence::ThreePrimeUtrVariant);
    }
    Ok(())
}

fn solve_overlapping<S: TranscriptSolver + ?Sized>(
    solver: &S,
    state: &mut TranscriptState<'_>,
) -> Result<(), FerroError> {
    solver.overlap_terms(state);
    let biotype = state.transcript.biotype.as_str();
    if biotype == NONSENSE_MEDIATED_DECAY {
        state.terms.add(Consequence::NmdTranscriptVariant);
    }
    let rules = solver.junction_rules(state.ctx);
    let walk = walk_exons(state, rules, solver.exon_percentage());
    state.record.cdna_position = walk.cdna_start;
    state.record.exon_overlap = walk.exon_overlap.clone();

    if is_coding_biotype(biotype) && state.transcript.is_coding() {
        if !walk.intronic {
            solver.solve_exon(state, &walk)?;
        }
    } else {
        state.solve_mirna(&walk);
    }
    Ok(())
}

/// Run a solver over all transcripts of `genes` on `chromosome`.
pub(crate) fn annotate_genes<S: TranscriptSolver + ?Sized>(
    solver: &S,
    ctx: &CalculatorContext<'_>,
    variant: &Variant,
    chromosome: &str,
    interval: (i64, i64),
    genes: &[&Gene],
    regulatory: RegulatoryOverlap,
) -> Result<Vec<ConsequenceType>, FerroError> {
    let (start, end) = interval;
    let mut records = Vec::new();
    let mut intergenic = true;
    let covering = solver.covering_terms(variant);

    for gene in genes.iter().copied().filter(|g| g.chromosome == chromosome) {
        for transcript in &gene.transcripts {
            intergenic &= end < transcript.start || start > transcript.end;
            let mut state = TranscriptState::new(ctx, variant, gene, transcript, chromosome, interval);
            if !covering.is_empty() && start <= transcript.start && end >= transcript.end {
                for term in &covering {
                    state.terms.add(*term);
                }
            } else if solver.overlaps(transcript, start, end) {
                solve_overlapping(solver, &mut state)?;
            } else {
                state.solve_flanking();
            }
            if let Some(record) = state.finish() {
                records.push(record);
            }
        }
    }

    if records.is_empty() && intergenic {
        records.push(ConsequenceType::from_terms(&[Consequence::IntergenicVariant]));
    }
    if regulatory.regulatory_region {
        records.push(ConsequenceType::from_terms(&[Consequence::RegulatoryRegionVariant]));
        if regulatory.tf_binding_site {
            records.push(ConsequenceType::from_terms(&[Consequence::TfBindingSiteVariant]));
        }
    }
    Ok(records)
}


#[cfg(test)]
mod tests {
    use super::fixtures::*;
    use super::*;
    use crate::provider::MockProvider;

    struct Plain;

    impl TranscriptSolver for Plain {
        fn covering_terms(&self, _variant: &Variant) -> Vec<Consequence> {
            vec![Consequence::StructuralVariant]
        }

        fn solve_coding(
            &self,
            state: &mut TranscriptState<'_>,
            _walk: &ExonWalk,
            _cdna_coding_start: i64,
        ) -> Result<(), FerroError> {
            state.terms.add(Consequence::CodingSequenceVariant);
            Ok(())
        }
    }

    fn run(variant: &Variant, interval: (i64, i64), genes: &[Gene], regulatory: RegulatoryOverlap) -> Vec<ConsequenceType> {
        let provider = MockProvider::new();
        let ctx = CalculatorContext::new(&provider);
        let genes: Vec<&Gene> = genes.iter().collect();
        annotate_genes(&Plain, &ctx, variant, &variant.chromosome, interval, &genes, regulatory).unwrap()
    }

    // =========================================================================
    // Skeleton
    // =========================================================================

    #[test]
    fn test_so_terms_deduplicate_in_order() {
        let mut terms = SoTerms::default();
        terms.add(Consequence::IntronVariant);
        terms.add(Consequence::SpliceRegionVariant);
        terms.add(Consequence::IntronVariant);
        assert_eq!(
            terms.as_slice(),
            &[Consequence::IntronVariant, Consequence::SpliceRegionVariant]
        );
    }

    #[test]
    fn test_flanking_windows_plus_strand() {
        let genes = vec![plus_gene()];
        let variant = Variant::new("1", 30, "A", "T");
        let records = run(&variant, (30, 30), &genes, RegulatoryOverlap::default());
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].term_names(), vec!["2KB_upstream_variant"]);

        let variant = Variant::new("1", 3000, "A", "T");
        let records = run(&variant, (3000, 3000), &genes, RegulatoryOverlap::default());
        assert_eq!(records[0].term_names(), vec!["downstream_gene_variant"]);
    }

    #[test]
    fn test_flanking_windows_minus_strand() {
        let genes = vec![minus_gene()];
        let variant = Variant::new("2", 990, "A", "T");
        let records = run(&variant, (990, 990), &genes, RegulatoryOverlap::default());
        assert_eq!(records[0].term_names(), vec!["2KB_downstream_variant"]);
        assert_eq!(records[0].transcript_id.as_deref(), Some("TX_MINUS"));
    }

    #[test]
    fn test_intergenic_only_without_records() {
        let genes = vec![plus_gene()];
        let variant = Variant::new("1", 100_000, "A", "T");
        let records = run(&variant, (100_000, 100_000), &genes, RegulatoryOverlap::default());
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].term_names(), vec!["intergenic_variant"]);
        assert!(records[0].transcript_id.is_none());
    }

    #[test]
    fn test_regulatory_records() {
        let variant = Variant::new("1", 100_000, "A", "T");
        let regulatory = RegulatoryOverlap {
            regulatory_region: true,
            tf_binding_site: true,
        };
        let records = run(&variant, (100_000, 100_000), &[], regulatory);
        let names: Vec<_> = records.iter().flat_map(|r| r.term_names()).collect();
        assert_eq!(
            names,
            vec!["intergenic_variant", "regulatory_region_variant", "TF_binding_site_variant"]
        );
    }

    #[test]
    fn test_covering_terms() {
        let genes = vec![plus_gene()];
        let variant = Variant::new("1", 10, "N", "<INV>").with_end(500);
        let records = run(&variant, (10, 500), &genes, RegulatoryOverlap::default());
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].term_names(), vec!["structural_variant"]);
    }

    #[test]
    fn test_utr_and_coding_dispatch() {
        let genes = vec![plus_gene()];
        let variant = Variant::new("1", 60, "A", "T");
        let records = run(&variant, (60, 60), &genes, RegulatoryOverlap::default());
        assert_eq!(records[0].term_names(), vec!["5_prime_UTR_variant"]);
        assert_eq!(records[0].cdna_position, Some(11));

        let variant = Variant::new("1", 150, "A", "T");
        let records = run(&variant, (150, 150), &genes, RegulatoryOverlap::default());
        assert_eq!(records[0].term_names(), vec!["coding_sequence_variant"]);
        assert_eq!(records[0].cds_position, Some(51));
        assert_eq!(
            records[0].protein_variant_annotation.as_ref().map(|p| p.position),
            Some(17)
        );
    }

    #[test]
    fn test_mature_mirna() {
        let genes = vec![mirna_gene()];
        let variant = Variant::new("3", 515, "A", "T");
        let records = run(&variant, (515, 515), &genes, RegulatoryOverlap::default());
        assert_eq!(records[0].term_names(), vec!["mature_miRNA_variant"]);

        let variant = Variant::new("3", 570, "A", "T");
        let records = run(&variant, (570, 570), &genes, RegulatoryOverlap::default());
        assert_eq!(
            records[0].term_names(),
            vec!["non_coding_transcript_exon_variant", "non_coding_transcript_variant"]
        );
    }

    #[test]
    fn test_structural_interval_padding() {
        let provider = MockProvider::new();
        let mut ctx = CalculatorContext::new(&provider);
        ctx.options.sv_extra_padding = 10;
        let variant = Variant::new("1", 1000, "N", "<INV>")
            .with_end(2000)
            .with_sv(StructuralVariation {
                ci_start_left: Some(990),
                ci_end_right: Some(2020),
                ..Default::default()
            });
        assert_eq!(structural_interval(&ctx, &variant), (980, 2030));
        ctx.options.imprecise = false;
        assert_eq!(structural_interval(&ctx, &variant), (1000, 2000));
    }
}
