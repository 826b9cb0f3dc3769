//! Gene, transcript and exon models
//!
//! # Coordinate System
//!
//! All coordinates in this module are **1-based inclusive**:
//!
//! | Field | Basis | Notes |
//! |-------|-------|-------|
//! | `Gene.start`, `Gene.end` | 1-based | Genomic coordinates |
//! | `Transcript.start`, `Transcript.end` | 1-based | Genomic coordinates |
//! | `Transcript.genomic_coding_start/end` | 1-based | Genomic CDS bounds, `0` when non-coding |
//! | `Transcript.cdna_coding_start/end` | 1-based | CDS bounds in spliced transcript space |
//! | `Exon.start`, `Exon.end` | 1-based | Genomic coordinates |
//! | `MiRnaMature.cdna_start/end` | 1-based | Mature product bounds in transcript space |
//!
//! Exons are stored in transcript order (5' to 3'), so on the minus strand
//! the first exon has the highest genomic coordinates. `Exon.sequence` is
//! the forward (plus) strand genomic sequence of the exon.

use serde::{Deserialize, Serialize};

use super::variant::Region;
use crate::so::rules::reverse_complement;

/// Transcript flag marking a CDS whose start is not confirmed.
pub const CDS_START_NF: &str = "cds_start_NF";
/// Transcript flag marking a CDS whose end is not confirmed.
pub const CDS_END_NF: &str = "cds_end_NF";
/// Transcript flag marking an mRNA whose start is not confirmed.
pub const MRNA_START_NF: &str = "mRNA_start_NF";
/// Transcript flag marking an mRNA whose end is not confirmed.
pub const MRNA_END_NF: &str = "mRNA_end_NF";

/// Strand orientation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Strand {
    #[serde(rename = "+")]
    #[default]
    Plus,
    #[serde(rename = "-")]
    Minus,
}

impl std::fmt::Display for Strand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Strand::Plus => write!(f, "+"),
            Strand::Minus => write!(f, "-"),
        }
    }
}

/// An exon of a transcript
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct Exon {
    /// Exon identifier
    #[serde(default)]
    pub id: String,
    /// Exon number (1-based, in transcript order)
    pub exon_number: u32,
    /// Genomic start (1-based, inclusive)
    pub start: i64,
    /// Genomic end (1-based, inclusive)
    pub end: i64,
    /// Reading-frame phase of the first coding base, `-1` when non-coding
    #[serde(default = "no_phase")]
    pub phase: i32,
    /// Plus-strand genomic sequence; may be empty when not loaded
    #[serde(default)]
    pub sequence: String,
    /// Genomic start of the coding part, `0` when non-coding
    #[serde(default)]
    pub genomic_coding_start: i64,
    /// Genomic end of the coding part, `0` when non-coding
    #[serde(default)]
    pub genomic_coding_end: i64,
    /// CDS start of the coding part, `0` when non-coding
    #[serde(default)]
    pub cds_start: i64,
    /// CDS end of the coding part, `0` when non-coding
    #[serde(default)]
    pub cds_end: i64,
}

fn no_phase() -> i32 {
    -1
}

impl Exon {
    /// Create an exon with genomic bounds and a sequence.
    pub fn new(exon_number: u32, start: i64, end: i64, sequence: impl Into<String>) -> Self {
        Self {
            id: String::new(),
            exon_number,
            start,
            end,
            phase: -1,
            sequence: sequence.into(),
            ..Default::default()
        }
    }

    /// Set the phase of the exon.
    pub fn with_phase(mut self, phase: i32) -> Self {
        self.phase = phase;
        self
    }

    /// Genomic length of the exon.
    pub fn len(&self) -> i64 {
        self.end - self.start + 1
    }

    /// Whether the exon has no bases.
    pub fn is_empty(&self) -> bool {
        self.len() <= 0
    }

    /// Whether a genomic position lies in the exon.
    pub fn contains(&self, position: i64) -> bool {
        position >= self.start && position <= self.end
    }
}

/// A mature product of a miRNA gene
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MiRnaMature {
    pub accession: String,
    pub id: String,
    #[serde(default)]
    pub sequence: String,
    pub cdna_start: i64,
    pub cdna_end: i64,
}

/// miRNA data attached to a gene
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct MiRnaGene {
    pub accession: String,
    pub id: String,
    /// Precursor sequence
    #[serde(default)]
    pub sequence: String,
    #[serde(default)]
    pub matures: Vec<MiRnaMature>,
}

/// A transcript of a gene
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct Transcript {
    /// Transcript accession (e.g. ENST00000357654)
    pub id: String,
    /// Transcript name
    #[serde(default)]
    pub name: String,
    /// Protein accession for coding transcripts
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub protein_id: Option<String>,
    pub chromosome: String,
    pub strand: Strand,
    pub biotype: String,
    pub start: i64,
    pub end: i64,
    #[serde(default)]
    pub genomic_coding_start: i64,
    #[serde(default)]
    pub genomic_coding_end: i64,
    #[serde(default)]
    pub cdna_coding_start: i64,
    #[serde(default)]
    pub cdna_coding_end: i64,
    /// Exons in transcript order (5' to 3')
    #[serde(default)]
    pub exons: Vec<Exon>,
    /// Annotation flags such as `cds_start_NF`
    #[serde(default)]
    pub flags: Vec<String>,
}

impl Transcript {
    /// Whether the CDS start is not confirmed in the reference annotation.
    pub fn unconfirmed_start(&self) -> bool {
        self.has_flag(CDS_START_NF) || self.has_flag(MRNA_START_NF)
    }

    /// Whether the CDS end is not confirmed in the reference annotation.
    pub fn unconfirmed_end(&self) -> bool {
        self.has_flag(CDS_END_NF) || self.has_flag(MRNA_END_NF)
    }

    pub fn has_flag(&self, flag: &str) -> bool {
        self.flags.iter().any(|f| f == flag)
    }

    /// Whether the transcript carries genomic CDS bounds.
    pub fn is_coding(&self) -> bool {
        self.genomic_coding_start > 0 && self.genomic_coding_end >= self.genomic_coding_start
    }

    /// Spliced transcript-sense sequence (exons in transcript order).
    ///
    /// Minus-strand exons are reverse complemented. Empty when no exon
    /// carries a sequence.
    pub fn spliced_sequence(&self) -> String {
        let mut spliced = String::with_capacity(
            self.exons.iter().map(|e| e.sequence.len()).sum::<usize>(),
        );
        for exon in &self.exons {
            match self.strand {
                Strand::Plus => spliced.push_str(&exon.sequence),
                Strand::Minus => spliced.push_str(&reverse_complement(&exon.sequence)),
            }
        }
        spliced
    }

    /// Total spliced length from exon coordinates.
    pub fn cdna_length(&self) -> i64 {
        self.exons.iter().map(Exon::len).sum()
    }

    /// Genomic region of the transcript.
    pub fn region(&self) -> Region {
        Region::new(&self.chromosome, self.start, self.end)
    }
}

/// A gene with its transcripts
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct Gene {
    /// Gene accession (e.g. ENSG00000012048)
    pub id: String,
    /// Gene symbol (e.g. BRCA1)
    pub name: String,
    pub chromosome: String,
    pub start: i64,
    pub end: i64,
    pub strand: Strand,
    #[serde(default)]
    pub biotype: String,
    #[serde(default)]
    pub transcripts: Vec<Transcript>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mirna: Option<MiRnaGene>,
}

impl Gene {
    /// Whether the gene span, padded by `flank` on both sides, overlaps a region.
    pub fn overlaps(&self, chromosome: &str, start: i64, end: i64, flank: i64) -> bool {
        self.chromosome == chromosome && start <= self.end + flank && end >= self.start - flank
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn minus_transcript() -> Transcript {
        Transcript {
            id: "ENST01".to_string(),
            chromosome: "1".to_string(),
            strand: Strand::Minus,
            biotype: "protein_coding".to_string(),
            start: 100,
            end: 120,
            exons: vec![
                Exon::new(1, 115, 120, "AACCGG"),
                Exon::new(2, 100, 104, "TTTCA"),
            ],
            ..Default::default()
        }
    }

    #[test]
    fn test_strand_serde() {
        assert_eq!(serde_json::to_string(&Strand::Minus).unwrap(), "\"-\"");
        let strand: Strand = serde_json::from_str("\"+\"").unwrap();
        assert_eq!(strand, Strand::Plus);
        assert_eq!(Strand::Minus.to_string(), "-");
    }

    #[test]
    fn test_spliced_sequence_minus_strand() {
        let tx = minus_transcript();
        assert_eq!(tx.spliced_sequence(), "CCGGTTTGAAA");
        assert_eq!(tx.cdna_length(), 11);
    }

    #[test]
    fn test_flags() {
        let mut tx = minus_transcript();
        assert!(!tx.unconfirmed_start());
        tx.flags.push(CDS_START_NF.to_string());
        assert!(tx.unconfirmed_start());
        assert!(!tx.unconfirmed_end());
    }

    #[test]
    fn test_exon_defaults_from_json() {
        let exon: Exon =
            serde_json::from_str(r#"{"exonNumber": 2, "start": 10, "end": 19}"#).unwrap();
        assert_eq!(exon.phase, -1);
        assert_eq!(exon.len(), 10);
        assert!(exon.sequence.is_empty());
    }

    #[test]
    fn test_gene_overlap_with_flank() {
        let gene = Gene {
            id: "G".to_string(),
            name: "G".to_string(),
            chromosome: "1".to_string(),
            start: 10_000,
            end: 20_000,
            ..Default::default()
        };
        assert!(gene.overlaps("1", 5_000, 5_000, 5_000));
        assert!(!gene.overlaps("1", 4_999, 4_999, 5_000));
        assert!(!gene.overlaps("2", 15_000, 15_000, 5_000));
    }
}
