//! In-memory provider for tests and benchmarks

use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};

use super::{
    ClinicalProvider, ConservationProvider, CytobandProvider, FunctionalScoreProvider,
    GeneProvider, GenomeSequenceProvider, PopulationFrequencyProvider, RegulatoryFeature,
    RegulatoryRegionProvider, RepeatProvider,
};
use crate::annotator::options::AnnotationOptions;
use crate::error::FerroError;
use crate::model::{
    Cytoband, Gene, Region, Repeat, Score, TraitAssociation, Variant, VariationRecord,
};

/// Feature type of TF binding site regulatory records.
const TF_BINDING_SITE: &str = "TF_binding_site";

/// Mock provider serving every collaborator trait from memory
#[derive(Default)]
pub struct MockProvider {
    genes: Vec<Gene>,
    /// Plus-strand sequence per chromosome, position 1 at index 0
    chromosomes: HashMap<String, String>,
    regulatory: Vec<(Region, String)>,
    variation: HashMap<String, Vec<VariationRecord>>,
    conservation: Vec<(Region, Score)>,
    functional: HashMap<String, Vec<Score>>,
    clinical: HashMap<String, Vec<TraitAssociation>>,
    repeats: Vec<Repeat>,
    cytobands: Vec<Cytoband>,
    failing: HashSet<String>,
    gene_queries: AtomicUsize,
}

impl MockProvider {
    /// Create an empty mock provider
    pub fn new() -> Self {
        Self::default()
    }

    /// Load genes from a JSON array file
    pub fn from_json(path: &Path) -> Result<Self, FerroError> {
        let content = std::fs::read_to_string(path)?;
        let genes: Vec<Gene> = serde_json::from_str(&content)?;
        Ok(Self {
            genes,
            ..Default::default()
        })
    }

    pub fn add_gene(&mut self, gene: Gene) {
        self.genes.push(gene);
    }

    /// Add the full plus-strand sequence of a chromosome
    pub fn add_chromosome(&mut self, name: impl Into<String>, sequence: impl Into<String>) {
        self.chromosomes.insert(name.into(), sequence.into());
    }

    /// Add a regulatory feature (`TF_binding_site`, `enhancer`, ...)
    pub fn add_regulatory_region(&mut self, region: Region, feature_type: impl Into<String>) {
        self.regulatory.push((region, feature_type.into()));
    }

    /// Add a known variant; it matches queries on chromosome, start and alleles
    pub fn add_variation(&mut self, record: VariationRecord) {
        let key = format!(
            "{}:{}:{}:{}",
            record.chromosome, record.start, record.reference, record.alternate
        );
        self.variation.entry(key).or_default().push(record);
    }

    pub fn add_conservation(&mut self, region: Region, score: Score) {
        self.conservation.push((region, score));
    }

    pub fn add_functional_score(&mut self, variant: &Variant, score: Score) {
        self.functional
            .entry(allele_key(variant))
            .or_default()
            .push(score);
    }

    pub fn add_trait_association(&mut self, variant: &Variant, association: TraitAssociation) {
        self.clinical
            .entry(allele_key(variant))
            .or_default()
            .push(association);
    }

    pub fn add_repeat(&mut self, repeat: Repeat) {
        self.repeats.push(repeat);
    }

    pub fn add_cytoband(&mut self, cytoband: Cytoband) {
        self.cytobands.push(cytoband);
    }

    /// Make every call to the named source fail (`variation`, `conservation`,
    /// `functionalScore`, `traitAssociation`, `repeats`, `cytoband`, `gene`,
    /// `genome`, `regulatory`).
    pub fn fail_source(&mut self, source: impl Into<String>) {
        self.failing.insert(source.into());
    }

    /// Number of gene searches served so far.
    pub fn gene_queries(&self) -> usize {
        self.gene_queries.load(Ordering::SeqCst)
    }

    fn check(&self, source: &str) -> Result<(), FerroError> {
        if self.failing.contains(source) {
            Err(FerroError::provider(source, "mock failure"))
        } else {
            Ok(())
        }
    }
}

fn allele_key(variant: &Variant) -> String {
    format!(
        "{}:{}:{}:{}",
        variant.chromosome, variant.start, variant.reference, variant.alternate
    )
}

fn overlaps(chromosome: &str, start: i64, end: i64, region: &Region) -> bool {
    chromosome == region.chromosome && start <= region.end && end >= region.start
}

impl GeneProvider for MockProvider {
    fn search(&self, regions: &[Region]) -> Result<Vec<Gene>, FerroError> {
        self.check("gene")?;
        self.gene_queries.fetch_add(1, Ordering::SeqCst);
        Ok(self
            .genes
            .iter()
            .filter(|g| {
                regions
                    .iter()
                    .any(|r| overlaps(&g.chromosome, g.start, g.end, r))
            })
            .cloned()
            .collect())
    }
}

impl GenomeSequenceProvider for MockProvider {
    fn get_sequence(&self, region: &Region) -> Result<String, FerroError> {
        self.check("genome")?;
        let not_available = || FerroError::GenomicReferenceNotAvailable {
            contig: region.chromosome.clone(),
            start: region.start,
            end: region.end,
        };
        let sequence = self
            .chromosomes
            .get(&region.chromosome)
            .ok_or_else(not_available)?;
        if region.start < 1 || region.end < region.start {
            return Err(not_available());
        }
        sequence
            .get((region.start - 1) as usize..region.end as usize)
            .map(str::to_string)
            .ok_or_else(not_available)
    }
}

impl RegulatoryRegionProvider for MockProvider {
    fn overlaps(&self, region: &Region, feature: RegulatoryFeature) -> Result<bool, FerroError> {
        self.check("regulatory")?;
        Ok(self.regulatory.iter().any(|(r, feature_type)| {
            r.overlaps(region)
                && match feature {
                    RegulatoryFeature::Any => true,
                    RegulatoryFeature::TfBindingSite => feature_type.starts_with(TF_BINDING_SITE),
                }
        }))
    }
}

impl PopulationFrequencyProvider for MockProvider {
    fn variation(
        &self,
        variants: &[Variant],
        _options: &AnnotationOptions,
    ) -> Result<Vec<Vec<VariationRecord>>, FerroError> {
        self.check("variation")?;
        Ok(variants
            .iter()
            .map(|v| self.variation.get(&allele_key(v)).cloned().unwrap_or_default())
            .collect())
    }
}

impl ConservationProvider for MockProvider {
    fn conservation(
        &self,
        regions: &[Region],
        _options: &AnnotationOptions,
    ) -> Result<Vec<Vec<Score>>, FerroError> {
        self.check("conservation")?;
        Ok(regions
            .iter()
            .map(|q| {
                self.conservation
                    .iter()
                    .filter(|(r, _)| r.overlaps(q))
                    .map(|(_, s)| s.clone())
                    .collect()
            })
            .collect())
    }
}

impl FunctionalScoreProvider for MockProvider {
    fn functional_scores(
        &self,
        variants: &[Variant],
        _options: &AnnotationOptions,
    ) -> Result<Vec<Vec<Score>>, FerroError> {
        self.check("functionalScore")?;
        Ok(variants
            .iter()
            .map(|v| self.functional.get(&allele_key(v)).cloned().unwrap_or_default())
            .collect())
    }
}

impl ClinicalProvider for MockProvider {
    fn trait_associations(
        &self,
        variants: &[Variant],
        _options: &AnnotationOptions,
    ) -> Result<Vec<Vec<TraitAssociation>>, FerroError> {
        self.check("traitAssociation")?;
        Ok(variants
            .iter()
            .map(|v| self.clinical.get(&allele_key(v)).cloned().unwrap_or_default())
            .collect())
    }
}

impl RepeatProvider for MockProvider {
    fn repeats(
        &self,
        regions: &[Region],
        _options: &AnnotationOptions,
    ) -> Result<Vec<Vec<Repeat>>, FerroError> {
        self.check("repeats")?;
        Ok(regions
            .iter()
            .map(|q| {
                self.repeats
                    .iter()
                    .filter(|r| overlaps(&r.chromosome, r.start, r.end, q))
                    .cloned()
                    .collect()
            })
            .collect())
    }
}

impl CytobandProvider for MockProvider {
    fn cytobands(
        &self,
        regions: &[Region],
        _options: &AnnotationOptions,
    ) -> Result<Vec<Vec<Cytoband>>, FerroError> {
        self.check("cytoband")?;
        Ok(regions
            .iter()
            .map(|q| {
                self.cytobands
                    .iter()
                    .filter(|c| overlaps(&c.chromosome, c.start, c.end, q))
                    .cloned()
                    .collect()
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_genome_sequence_is_one_based() {
        let mut provider = MockProvider::new();
        provider.add_chromosome("1", "ACGTACGT");
        let seq = provider.get_sequence(&Region::new("1", 2, 4)).unwrap();
        assert_eq!(seq, "CGT");
        assert!(provider.get_sequence(&Region::new("1", 8, 9)).is_err());
        assert!(provider.get_sequence(&Region::new("2", 1, 1)).is_err());
    }

    #[test]
    fn test_gene_search_counts_queries() {
        let mut provider = MockProvider::new();
        provider.add_gene(Gene {
            id: "G1".to_string(),
            name: "G1".to_string(),
            chromosome: "1".to_string(),
            start: 100,
            end: 200,
            ..Default::default()
        });
        let genes = provider
            .search(&[Region::new("1", 50, 99), Region::new("1", 150, 150)])
            .unwrap();
        assert_eq!(genes.len(), 1);
        assert_eq!(provider.gene_queries(), 1);
    }

    #[test]
    fn test_regulatory_filter() {
        let mut provider = MockProvider::new();
        provider.add_regulatory_region(Region::new("1", 10, 20), "TF_binding_site_motif");
        provider.add_regulatory_region(Region::new("1", 30, 40), "enhancer");
        let q = Region::new("1", 35, 35);
        assert!(provider.overlaps(&q, RegulatoryFeature::Any).unwrap());
        assert!(!provider.overlaps(&q, RegulatoryFeature::TfBindingSite).unwrap());
        let q = Region::new("1", 15, 15);
        assert!(provider.overlaps(&q, RegulatoryFeature::TfBindingSite).unwrap());
    }

    #[test]
    fn test_failing_source() {
        let mut provider = MockProvider::new();
        provider.fail_source("cytoband");
        let err = provider
            .cytobands(&[Region::new("1", 1, 1)], &AnnotationOptions::default())
            .unwrap_err();
        assert!(err.is_batch_fatal());
    }
}
