//! External collaborator interfaces
//!
//! The annotation engine reads reference data only through these traits.
//! Every provider is `Send + Sync` because auxiliary fetches run on the
//! worker pool while the calling thread computes consequence types.
//!
//! Auxiliary providers take the whole batch and return one result per
//! input, order-preserved; an empty inner `Vec` means "nothing found".

pub mod mock;

pub use mock::MockProvider;

use crate::annotator::options::AnnotationOptions;
use crate::error::FerroError;
use crate::model::{
    Cytoband, Gene, Region, Repeat, Score, TraitAssociation, Variant, VariationRecord,
};

/// Regulatory feature filter for overlap queries
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegulatoryFeature {
    /// Any regulatory feature
    Any,
    /// Transcription factor binding sites only
    TfBindingSite,
}

/// Batched gene lookup
pub trait GeneProvider: Send + Sync {
    /// Genes (with transcripts and exons) overlapping any of the regions.
    fn search(&self, regions: &[Region]) -> Result<Vec<Gene>, FerroError>;
}

/// Reference genome access
pub trait GenomeSequenceProvider: Send + Sync {
    /// Plus-strand sequence of a 1-based inclusive region.
    fn get_sequence(&self, region: &Region) -> Result<String, FerroError>;
}

/// Regulatory feature overlap
pub trait RegulatoryRegionProvider: Send + Sync {
    fn overlaps(&self, region: &Region, feature: RegulatoryFeature) -> Result<bool, FerroError>;
}

/// Known variants and their population frequencies
pub trait PopulationFrequencyProvider: Send + Sync {
    fn variation(
        &self,
        variants: &[Variant],
        options: &AnnotationOptions,
    ) -> Result<Vec<Vec<VariationRecord>>, FerroError>;
}

/// Conservation scores by region
pub trait ConservationProvider: Send + Sync {
    fn conservation(
        &self,
        regions: &[Region],
        options: &AnnotationOptions,
    ) -> Result<Vec<Vec<Score>>, FerroError>;
}

/// Functional (CADD-like) scores by variant
pub trait FunctionalScoreProvider: Send + Sync {
    fn functional_scores(
        &self,
        variants: &[Variant],
        options: &AnnotationOptions,
    ) -> Result<Vec<Vec<Score>>, FerroError>;
}

/// Clinical trait associations by variant
pub trait ClinicalProvider: Send + Sync {
    fn trait_associations(
        &self,
        variants: &[Variant],
        options: &AnnotationOptions,
    ) -> Result<Vec<Vec<TraitAssociation>>, FerroError>;
}

/// Repeat elements by region
pub trait RepeatProvider: Send + Sync {
    fn repeats(
        &self,
        regions: &[Region],
        options: &AnnotationOptions,
    ) -> Result<Vec<Vec<Repeat>>, FerroError>;
}

/// Cytogenetic bands by region
pub trait CytobandProvider: Send + Sync {
    fn cytobands(
        &self,
        regions: &[Region],
        options: &AnnotationOptions,
    ) -> Result<Vec<Vec<Cytoband>>, FerroError>;
}

/// Everything the annotator needs from its data layer.
///
/// Blanket-implemented for any type providing all collaborator traits.
pub trait AnnotationBackend:
    GeneProvider
    + GenomeSequenceProvider
    + RegulatoryRegionProvider
    + PopulationFrequencyProvider
    + ConservationProvider
    + FunctionalScoreProvider
    + ClinicalProvider
    + RepeatProvider
    + CytobandProvider
{
}

impl<T> AnnotationBackend for T where
    T: GeneProvider
        + GenomeSequenceProvider
        + RegulatoryRegionProvider
        + PopulationFrequencyProvider
        + ConservationProvider
        + FunctionalScoreProvider
        + ClinicalProvider
        + RepeatProvider
        + CytobandProvider
{
}
