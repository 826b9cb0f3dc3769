//! Sequence Ontology consequence terms and codon rules.
//!
//! This module holds the leaf utilities of the consequence engine:
//! the SO terms emitted by the calculators (with accession, impact and
//! severity rank), the standard and mitochondrial genetic codes, and
//! the rules that map a reference/alternate codon pair to a term.
//!
//! # Example
//!
//! ```
//! use ferro_annotate::so::{Consequence, Impact};
//!
//! let term = Consequence::MissenseVariant;
//! assert_eq!(term.so_term(), "missense_variant");
//! assert_eq!(term.so_id(), "SO:0001583");
//! assert_eq!(term.impact(), Impact::Moderate);
//! assert!(Consequence::StopGained.severity() > term.severity());
//! ```

pub mod codon;
pub mod rules;

pub use codon::{AminoAcid, Base, Codon, CodonTable, GeneticCode};

/// Sequence Ontology consequence term.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Consequence {
    /// Complete transcript deletion.
    TranscriptAblation,
    /// Within 2bp of splice acceptor site (AG).
    SpliceAcceptorVariant,
    /// Within 2bp of splice donor site (GT).
    SpliceDonorVariant,
    /// Introduces a premature stop codon.
    StopGained,
    /// Insertion/deletion causing frameshift.
    FrameshiftVariant,
    /// Stop codon changed to amino acid.
    StopLost,
    /// Start codon changed to other.
    StartLost,
    /// Whole transcript amplified.
    TranscriptAmplification,
    /// Feature extended by a copy-number gain.
    FeatureElongation,
    /// Feature partially removed by a large deletion.
    FeatureTruncation,
    /// In-frame insertion of amino acids.
    InframeInsertion,
    /// In-frame deletion of amino acids.
    InframeDeletion,
    /// Amino acid substitution.
    MissenseVariant,
    /// First codon touched by a structural variant.
    InitiatorCodonVariant,
    /// Terminator codon touched by a structural variant.
    TerminatorCodonVariant,
    /// Within 3-8bp of splice site.
    SpliceRegionVariant,
    /// Last codon of a transcript with incomplete CDS.
    IncompleteTerminalCodonVariant,
    /// Start codon unchanged.
    StartRetainedVariant,
    /// Stop codon unchanged.
    StopRetainedVariant,
    /// Silent change (codon change, same amino acid).
    SynonymousVariant,
    /// Coding sequence variant (general).
    CodingSequenceVariant,
    /// Variant in a mature miRNA.
    MatureMirnaVariant,
    /// Variant in 5' UTR.
    FivePrimeUtrVariant,
    /// Variant in 3' UTR.
    ThreePrimeUtrVariant,
    /// Variant in the exon of a non-coding transcript.
    NonCodingTranscriptExonVariant,
    /// Variant in intron.
    IntronVariant,
    /// Variant in a transcript subject to NMD.
    NmdTranscriptVariant,
    /// Variant in a non-coding transcript.
    NonCodingTranscriptVariant,
    /// Within 2kb upstream of a transcript.
    TwoKbUpstreamVariant,
    /// Within 5kb upstream of a transcript.
    UpstreamGeneVariant,
    /// Within 2kb downstream of a transcript.
    TwoKbDownstreamVariant,
    /// Within 5kb downstream of a transcript.
    DownstreamGeneVariant,
    /// Overlaps a transcription factor binding site.
    TfBindingSiteVariant,
    /// Overlaps a regulatory region.
    RegulatoryRegionVariant,
    /// Copy number gain.
    CopyNumberGain,
    /// Structural variant covering a whole transcript.
    StructuralVariant,
    /// No transcript nearby.
    IntergenicVariant,
}

impl Consequence {
    /// All terms, most severe first.
    pub const BY_SEVERITY: [Consequence; 37] = [
        Consequence::TranscriptAblation,
        Consequence::SpliceAcceptorVariant,
        Consequence::SpliceDonorVariant,
        Consequence::StopGained,
        Consequence::FrameshiftVariant,
        Consequence::StopLost,
        Consequence::StartLost,
        Consequence::TranscriptAmplification,
        Consequence::FeatureElongation,
        Consequence::FeatureTruncation,
        Consequence::InframeInsertion,
        Consequence::InframeDeletion,
        Consequence::MissenseVariant,
        Consequence::InitiatorCodonVariant,
        Consequence::TerminatorCodonVariant,
        Consequence::SpliceRegionVariant,
        Consequence::IncompleteTerminalCodonVariant,
        Consequence::StartRetainedVariant,
        Consequence::StopRetainedVariant,
        Consequence::SynonymousVariant,
        Consequence::CodingSequenceVariant,
        Consequence::MatureMirnaVariant,
        Consequence::FivePrimeUtrVariant,
        Consequence::ThreePrimeUtrVariant,
        Consequence::NonCodingTranscriptExonVariant,
        Consequence::IntronVariant,
        Consequence::NmdTranscriptVariant,
        Consequence::NonCodingTranscriptVariant,
        Consequence::TwoKbUpstreamVariant,
        Consequence::UpstreamGeneVariant,
        Consequence::TwoKbDownstreamVariant,
        Consequence::DownstreamGeneVariant,
        Consequence::TfBindingSiteVariant,
        Consequence::RegulatoryRegionVariant,
        Consequence::CopyNumberGain,
        Consequence::StructuralVariant,
        Consequence::IntergenicVariant,
    ];

    /// Get the Sequence Ontology term.
    pub fn so_term(&self) -> &'static str {
        match self {
            Consequence::TranscriptAblation => "transcript_ablation",
            Consequence::SpliceAcceptorVariant => "splice_acceptor_variant",
            Consequence::SpliceDonorVariant => "splice_donor_variant",
            Consequence::StopGained => "stop_gained",
            Consequence::FrameshiftVariant => "frameshift_variant",
            Consequence::StopLost => "stop_lost",
            Consequence::StartLost => "start_lost",
            Consequence::TranscriptAmplification => "transcript_amplification",
            Consequence::FeatureElongation => "feature_elongation",
            Consequence::FeatureTruncation => "feature_truncation",
            Consequence::InframeInsertion => "inframe_insertion",
            Consequence::InframeDeletion => "inframe_deletion",
            Consequence::MissenseVariant => "missense_variant",
            Consequence::InitiatorCodonVariant => "initiator_codon_variant",
            Consequence::TerminatorCodonVariant => "terminator_codon_variant",
            Consequence::SpliceRegionVariant => "splice_region_variant",
            Consequence::IncompleteTerminalCodonVariant => "incomplete_terminal_codon_variant",
            Consequence::StartRetainedVariant => "start_retained_variant",
            Consequence::StopRetainedVariant => "stop_retained_variant",
            Consequence::SynonymousVariant => "synonymous_variant",
            Consequence::CodingSequenceVariant => "coding_sequence_variant",
            Consequence::MatureMirnaVariant => "mature_miRNA_variant",
            Consequence::FivePrimeUtrVariant => "5_prime_UTR_variant",
            Consequence::ThreePrimeUtrVariant => "3_prime_UTR_variant",
            Consequence::NonCodingTranscriptExonVariant => "non_coding_transcript_exon_variant",
            Consequence::IntronVariant => "intron_variant",
            Consequence::NmdTranscriptVariant => "NMD_transcript_variant",
            Consequence::NonCodingTranscriptVariant => "non_coding_transcript_variant",
            Consequence::TwoKbUpstreamVariant => "2KB_upstream_variant",
            Consequence::UpstreamGeneVariant => "upstream_gene_variant",
            Consequence::TwoKbDownstreamVariant => "2KB_downstream_variant",
            Consequence::DownstreamGeneVariant => "downstream_gene_variant",
            Consequence::TfBindingSiteVariant => "TF_binding_site_variant",
            Consequence::RegulatoryRegionVariant => "regulatory_region_variant",
            Consequence::CopyNumberGain => "copy_number_gain",
            Consequence::StructuralVariant => "structural_variant",
            Consequence::IntergenicVariant => "intergenic_variant",
        }
    }

    /// Get the Sequence Ontology ID.
    pub fn so_id(&self) -> &'static str {
        match self {
            Consequence::TranscriptAblation => "SO:0001893",
            Consequence::SpliceAcceptorVariant => "SO:0001574",
            Consequence::SpliceDonorVariant => "SO:0001575",
            Consequence::StopGained => "SO:0001587",
            Consequence::FrameshiftVariant => "SO:0001589",
            Consequence::StopLost => "SO:0001578",
            Consequence::StartLost => "SO:0002012",
            Consequence::TranscriptAmplification => "SO:0001889",
            Consequence::FeatureElongation => "SO:0001907",
            Consequence::FeatureTruncation => "SO:0001906",
            Consequence::InframeInsertion => "SO:0001821",
            Consequence::InframeDeletion => "SO:0001822",
            Consequence::MissenseVariant => "SO:0001583",
            Consequence::InitiatorCodonVariant => "SO:0001582",
            Consequence::TerminatorCodonVariant => "SO:0001590",
            Consequence::SpliceRegionVariant => "SO:0001630",
            Consequence::IncompleteTerminalCodonVariant => "SO:0001626",
            Consequence::StartRetainedVariant => "SO:0002019",
            Consequence::StopRetainedVariant => "SO:0001567",
            Consequence::SynonymousVariant => "SO:0001819",
            Consequence::CodingSequenceVariant => "SO:0001580",
            Consequence::MatureMirnaVariant => "SO:0001620",
            Consequence::FivePrimeUtrVariant => "SO:0001623",
            Consequence::ThreePrimeUtrVariant => "SO:0001624",
            Consequence::NonCodingTranscriptExonVariant => "SO:0001792",
            Consequence::IntronVariant => "SO:0001627",
            Consequence::NmdTranscriptVariant => "SO:0001621",
            Consequence::NonCodingTranscriptVariant => "SO:0001619",
            Consequence::TwoKbUpstreamVariant => "SO:0001636",
            Consequence::UpstreamGeneVariant => "SO:0001631",
            Consequence::TwoKbDownstreamVariant => "SO:0002083",
            Consequence::DownstreamGeneVariant => "SO:0001632",
            Consequence::TfBindingSiteVariant => "SO:0001782",
            Consequence::RegulatoryRegionVariant => "SO:0001566",
            Consequence::CopyNumberGain => "SO:0001742",
            Consequence::StructuralVariant => "SO:0001537",
            Consequence::IntergenicVariant => "SO:0001628",
        }
    }

    /// Look up a term by its SO name.
    pub fn from_so_term(name: &str) -> Option<Self> {
        Self::BY_SEVERITY
            .iter()
            .copied()
            .find(|c| c.so_term() == name)
    }

    /// Severity rank; larger is more severe.
    pub fn severity(&self) -> usize {
        let position = Self::BY_SEVERITY
            .iter()
            .position(|c| c == self)
            .unwrap_or(Self::BY_SEVERITY.len());
        Self::BY_SEVERITY.len() - position
    }

    /// Get the impact level.
    pub fn impact(&self) -> Impact {
        match self {
            Consequence::TranscriptAblation
            | Consequence::SpliceAcceptorVariant
            | Consequence::SpliceDonorVariant
            | Consequence::StopGained
            | Consequence::FrameshiftVariant
            | Consequence::StopLost
            | Consequence::StartLost
            | Consequence::TranscriptAmplification => Impact::High,

            Consequence::FeatureElongation
            | Consequence::FeatureTruncation
            | Consequence::InframeInsertion
            | Consequence::InframeDeletion
            | Consequence::MissenseVariant => Impact::Moderate,

            Consequence::InitiatorCodonVariant
            | Consequence::TerminatorCodonVariant
            | Consequence::SpliceRegionVariant
            | Consequence::IncompleteTerminalCodonVariant
            | Consequence::StartRetainedVariant
            | Consequence::StopRetainedVariant
            | Consequence::SynonymousVariant => Impact::Low,

            Consequence::CodingSequenceVariant
            | Consequence::MatureMirnaVariant
            | Consequence::FivePrimeUtrVariant
            | Consequence::ThreePrimeUtrVariant
            | Consequence::NonCodingTranscriptExonVariant
            | Consequence::IntronVariant
            | Consequence::NmdTranscriptVariant
            | Consequence::NonCodingTranscriptVariant
            | Consequence::TwoKbUpstreamVariant
            | Consequence::UpstreamGeneVariant
            | Consequence::TwoKbDownstreamVariant
            | Consequence::DownstreamGeneVariant
            | Consequence::TfBindingSiteVariant
            | Consequence::RegulatoryRegionVariant
            | Consequence::CopyNumberGain
            | Consequence::StructuralVariant
            | Consequence::IntergenicVariant => Impact::Modifier,
        }
    }

    /// Whether the term describes a codon-level change that phasing may revise.
    pub fn is_codon_change(&self) -> bool {
        matches!(
            self,
            Consequence::SynonymousVariant
                | Consequence::MissenseVariant
                | Consequence::StopGained
                | Consequence::StopLost
                | Consequence::StopRetainedVariant
        )
    }
}

impl std::fmt::Display for Consequence {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.so_term())
    }
}

/// Variant impact level (VEP-style).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Impact {
    /// Modifier - minimal predicted impact.
    Modifier,
    /// Low impact.
    Low,
    /// Moderate impact.
    Moderate,
    /// High impact (likely deleterious).
    High,
}

impl Impact {
    /// Get the impact as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Impact::High => "HIGH",
            Impact::Moderate => "MODERATE",
            Impact::Low => "LOW",
            Impact::Modifier => "MODIFIER",
        }
    }
}

impl std::fmt::Display for Impact {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Transcript biotypes annotated with the coding-transcript rules.
pub const CODING_BIOTYPES: [&str; 15] = [
    "protein_coding",
    "IG_C_gene",
    "IG_D_gene",
    "IG_J_gene",
    "IG_V_gene",
    "TR_C_gene",
    "TR_D_gene",
    "TR_J_gene",
    "TR_V_gene",
    "polymorphic_pseudogene",
    "non_stop_decay",
    "translated_processed_pseudogene",
    "translated_unprocessed_pseudogene",
    "LRG_gene",
    "nonsense_mediated_decay",
];

/// Biotype whose transcripts also receive `NMD_transcript_variant`.
pub const NONSENSE_MEDIATED_DECAY: &str = "nonsense_mediated_decay";

/// Biotype checked for mature miRNA overlap.
pub const MIRNA: &str = "miRNA";

/// Whether a transcript biotype follows the coding-transcript rules.
pub fn is_coding_biotype(biotype: &str) -> bool {
    CODING_BIOTYPES.contains(&biotype)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_consequence_so_terms() {
        assert_eq!(Consequence::FivePrimeUtrVariant.so_term(), "5_prime_UTR_variant");
        assert_eq!(Consequence::TwoKbUpstreamVariant.so_term(), "2KB_upstream_variant");
        assert_eq!(Consequence::MatureMirnaVariant.so_term(), "mature_miRNA_variant");
        assert_eq!(Consequence::NmdTranscriptVariant.so_id(), "SO:0001621");
    }

    #[test]
    fn test_from_so_term_round_trips_every_term() {
        for term in Consequence::BY_SEVERITY {
            assert_eq!(Consequence::from_so_term(term.so_term()), Some(term));
        }
        assert_eq!(Consequence::from_so_term("not_a_term"), None);
        // no calculator emits the generic in-frame term
        assert_eq!(Consequence::from_so_term("inframe_variant"), None);
    }

    #[test]
    fn test_severity_ordering() {
        assert!(Consequence::TranscriptAblation.severity() > Consequence::StopGained.severity());
        assert!(Consequence::StopGained.severity() > Consequence::MissenseVariant.severity());
        assert!(Consequence::MissenseVariant.severity() > Consequence::SynonymousVariant.severity());
        assert!(
            Consequence::IntronVariant.severity() > Consequence::UpstreamGeneVariant.severity()
        );
        assert_eq!(Consequence::IntergenicVariant.severity(), 1);
    }

    #[test]
    fn test_consequence_impact() {
        assert_eq!(Consequence::StopGained.impact(), Impact::High);
        assert_eq!(Consequence::MissenseVariant.impact(), Impact::Moderate);
        assert_eq!(Consequence::SynonymousVariant.impact(), Impact::Low);
        assert_eq!(Consequence::IntronVariant.impact(), Impact::Modifier);
    }

    #[test]
    fn test_impact_ordering() {
        assert!(Impact::High > Impact::Moderate);
        assert!(Impact::Moderate > Impact::Low);
        assert!(Impact::Low > Impact::Modifier);
    }

    #[test]
    fn test_coding_biotypes() {
        assert!(is_coding_biotype("protein_coding"));
        assert!(is_coding_biotype("nonsense_mediated_decay"));
        assert!(is_coding_biotype("IG_V_gene"));
        assert!(!is_coding_biotype("lincRNA"));
        assert!(!is_coding_biotype(MIRNA));
    }
}
