//! Annotation records
//!
//! [`ConsequenceType`] is emitted per (variant, transcript) pair by the
//! consequence calculators. [`VariantAnnotation`] aggregates the
//! consequence types with the auxiliary payloads for one variant.

use serde::{Deserialize, Serialize};

use super::gene::{Gene, Strand, Transcript};
use super::variant::Variant;
use crate::so::Consequence;

/// A Sequence Ontology term as serialized on a consequence type
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SequenceOntologyTerm {
    pub accession: String,
    pub name: String,
}

impl From<Consequence> for SequenceOntologyTerm {
    fn from(term: Consequence) -> Self {
        Self {
            accession: term.so_id().to_string(),
            name: term.so_term().to_string(),
        }
    }
}

/// Exon touched by a variant, `"n/total"` with the percentage covered
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExonOverlap {
    pub number: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub percentage: Option<f32>,
}

/// Amino acid change on a coding consequence type
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ProteinVariantAnnotation {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub protein_id: Option<String>,
    pub position: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alternate: Option<String>,
}

/// Consequence of a variant on one transcript (or intergenic/regulatory)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ConsequenceType {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gene_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gene_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transcript_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub strand: Option<Strand>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub biotype: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub transcript_flags: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cdna_position: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cds_position: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub codon: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub protein_variant_annotation: Option<ProteinVariantAnnotation>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub exon_overlap: Vec<ExonOverlap>,
    pub sequence_ontology_terms: Vec<SequenceOntologyTerm>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub hgvs: Vec<String>,
}

impl ConsequenceType {
    /// A record for a transcript of a gene, without terms.
    pub fn for_transcript(gene: &Gene, transcript: &Transcript) -> Self {
        Self {
            gene_name: Some(gene.name.clone()),
            gene_id: Some(gene.id.clone()),
            transcript_id: Some(transcript.id.clone()),
            strand: Some(transcript.strand),
            biotype: Some(transcript.biotype.clone()),
            transcript_flags: transcript.flags.clone(),
            ..Default::default()
        }
    }

    /// A record carrying only SO terms (intergenic, regulatory).
    pub fn from_terms(terms: &[Consequence]) -> Self {
        Self {
            sequence_ontology_terms: terms.iter().copied().map(Into::into).collect(),
            ..Default::default()
        }
    }

    /// Typed view of the SO terms; unknown names are skipped.
    pub fn consequences(&self) -> Vec<Consequence> {
        self.sequence_ontology_terms
            .iter()
            .filter_map(|t| Consequence::from_so_term(&t.name))
            .collect()
    }

    pub fn has_term(&self, term: Consequence) -> bool {
        self.sequence_ontology_terms
            .iter()
            .any(|t| t.name == term.so_term())
    }

    /// Names of the SO terms in emission order.
    pub fn term_names(&self) -> Vec<&str> {
        self.sequence_ontology_terms
            .iter()
            .map(|t| t.name.as_str())
            .collect()
    }

    pub fn set_terms(&mut self, terms: impl IntoIterator<Item = Consequence>) {
        self.sequence_ontology_terms = terms.into_iter().map(Into::into).collect();
    }

    /// Most severe term of this record.
    pub fn most_severe(&self) -> Option<Consequence> {
        self.consequences().into_iter().max_by_key(Consequence::severity)
    }
}

/// Population allele frequency
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PopulationFrequency {
    pub study: String,
    pub population: String,
    pub ref_allele: String,
    pub alt_allele: String,
    pub ref_allele_freq: f32,
    pub alt_allele_freq: f32,
}

/// A known variant returned by the variation lookup
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct VariationRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub chromosome: String,
    pub start: i64,
    pub reference: String,
    pub alternate: String,
    #[serde(default)]
    pub population_frequencies: Vec<PopulationFrequency>,
}

/// A numeric score (conservation, functional)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Score {
    pub source: String,
    pub score: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Score {
    pub fn new(source: impl Into<String>, score: f64) -> Self {
        Self {
            source: source.into(),
            score,
            description: None,
        }
    }
}

/// Clinical trait association
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TraitAssociation {
    pub source: String,
    pub id: String,
    #[serde(default)]
    pub traits: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub clinical_significance: Option<String>,
}

/// Repeat element overlapping a variant
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Repeat {
    pub id: String,
    pub chromosome: String,
    pub start: i64,
    pub end: i64,
    pub source: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub period: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub copy_number: Option<f32>,
}

/// Cytogenetic band
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cytoband {
    pub chromosome: String,
    pub name: String,
    pub stain: String,
    pub start: i64,
    pub end: i64,
}

/// Annotation of one variant
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct VariantAnnotation {
    pub chromosome: String,
    pub start: i64,
    pub end: i64,
    pub reference: String,
    pub alternate: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default)]
    pub consequence_types: Vec<ConsequenceType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_consequence_type: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub hgvs: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub population_frequencies: Vec<PopulationFrequency>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub conservation: Vec<Score>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub functional_score: Vec<Score>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub trait_association: Vec<TraitAssociation>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub repeats: Vec<Repeat>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub cytoband: Vec<Cytoband>,
    /// Transcripts whose codon terms were recomputed jointly with phased neighbours
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub phased_transcripts: Vec<String>,
    /// Per-variant errors that prevented consequence computation
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<String>,
}

impl VariantAnnotation {
    /// An empty annotation echoing the variant coordinates.
    pub fn for_variant(variant: &Variant) -> Self {
        Self {
            chromosome: variant.chromosome.clone(),
            start: variant.start,
            end: variant.end,
            reference: variant.reference.clone(),
            alternate: variant.alternate.clone(),
            id: variant.id.clone(),
            ..Default::default()
        }
    }

    /// Most severe SO term across all consequence types.
    pub fn most_severe_consequence(&self) -> Option<Consequence> {
        self.consequence_types
            .iter()
            .filter_map(ConsequenceType::most_severe)
            .max_by_key(Consequence::severity)
    }

    /// Refresh `display_consequence_type` from the consequence types.
    pub fn update_display_consequence_type(&mut self) {
        self.display_consequence_type = self
            .most_severe_consequence()
            .map(|c| c.so_term().to_string());
    }

    /// Consequence type for a transcript, if any.
    pub fn consequence_for_transcript(&self, transcript_id: &str) -> Option<&ConsequenceType> {
        self.consequence_types
            .iter()
            .find(|ct| ct.transcript_id.as_deref() == Some(transcript_id))
    }
}
