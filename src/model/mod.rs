//! Data model: variants, reference genes and annotation records

pub mod annotation;
pub mod gene;
pub mod variant;

pub use annotation::{
    ConsequenceType, Cytoband, ExonOverlap, PopulationFrequency, ProteinVariantAnnotation, Repeat,
    Score, SequenceOntologyTerm, TraitAssociation, VariantAnnotation, VariationRecord,
};
pub use gene::{Exon, Gene, MiRnaGene, MiRnaMature, Strand, Transcript};
pub use variant::{BreakendMate, Region, StructuralVariation, Variant, VariantType};
