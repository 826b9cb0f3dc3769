//! Batch variant annotation
//!
//! [`VariantAnnotator::annotate`] drives one batch through:
//!
//! 1. optional normalization and MNV decomposition
//! 2. a single gene search over the padded span of the whole batch
//! 3. the auxiliary lookups, running on the worker pool
//! 4. consequence types, HGVS and the phasing correction on the calling
//!    thread, one variant at a time
//! 5. the join and merge of the auxiliary results
//! 6. regrouping of decomposed variants, one annotation per input
//!
//! # Example
//!
//! ```
//! use ferro_annotate::{AnnotationOptions, MockProvider, Variant, VariantAnnotator};
//!
//! let annotator = VariantAnnotator::new(MockProvider::new()).unwrap();
//! let variants = vec![Variant::new("1", 100, "A", "T")];
//! let annotations = annotator.annotate(&variants, &AnnotationOptions::default()).unwrap();
//! assert_eq!(annotations.len(), 1);
//! assert_eq!(annotations[0].display_consequence_type.as_deref(), Some("intergenic_variant"));
//! ```

pub mod merge;
pub mod options;
pub mod regions;
pub mod tasks;

pub use options::{AnnotationOptions, Annotator};

use std::collections::HashMap;

use log::{debug, warn};
use rayon::ThreadPool;

use crate::config::AnnotatorConfig;
use crate::consequence::{consequence_types, CalculatorContext, CalculatorOptions, RegulatoryOverlap};
use crate::error::FerroError;
use crate::hgvs::HgvsCalculator;
use crate::model::{Gene, Variant, VariantAnnotation};
use crate::normalize::{decompose, normalize_batch, Decomposed};
use crate::phasing::PhasingCorrector;
use crate::provider::{AnnotationBackend, RegulatoryFeature};

use regions::{affected_genes, batch_gene_regions, gene_regions, variant_region};
use tasks::{build_pool, TaskSlots};

/// Annotates batches of variants against an [`AnnotationBackend`].
pub struct VariantAnnotator<P> {
    provider: P,
    config: AnnotatorConfig,
    pool: ThreadPool,
}

impl<P: AnnotationBackend> VariantAnnotator<P> {
    /// An annotator with the default configuration.
    pub fn new(provider: P) -> Result<Self, FerroError> {
        Self::with_config(provider, AnnotatorConfig::default())
    }

    /// An annotator whose worker pool, flank and option defaults come from `config`.
    pub fn with_config(provider: P, config: AnnotatorConfig) -> Result<Self, FerroError> {
        let pool = build_pool(config.worker_threads)?;
        Ok(Self { provider, config, pool })
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    pub fn config(&self) -> &AnnotatorConfig {
        &self.config
    }

    /// Annotate a batch with options given as a string map.
    ///
    /// The map overrides the `[options]` table of the configuration.
    pub fn annotate_with_map(
        &self,
        variants: &[Variant],
        options: &HashMap<String, String>,
    ) -> Result<Vec<VariantAnnotation>, FerroError> {
        let options = self.config.resolve_options(options)?;
        self.annotate(variants, &options)
    }

    /// Annotate a batch.
    ///
    /// Returns one annotation per input variant, in input order. Variant
    /// shapes without a calculator get an empty consequence type list; a
    /// failed provider fails the whole batch.
    pub fn annotate(
        &self,
        variants: &[Variant],
        options: &AnnotationOptions,
    ) -> Result<Vec<VariantAnnotation>, FerroError> {
        if variants.is_empty() {
            return Ok(Vec::new());
        }

        let inputs = if options.normalize {
            normalize_batch(variants, &self.provider)?
        } else {
            variants.to_vec()
        };
        let decomposed = if options.decompose {
            decompose(&inputs)
        } else {
            Decomposed::identity(&inputs)
        };
        debug!(
            "Annotating {} variants ({} after decomposition)",
            variants.len(),
            decomposed.len()
        );

        let genes = self.fetch_genes(&decomposed.variants, options)?;
        let ctx = CalculatorContext::new(&self.provider).with_options(CalculatorOptions::from_annotation_options(
            options,
            self.config.big_variant_threshold,
        ));
        let hgvs = HgvsCalculator::new(&self.provider);
        let batch = &decomposed.variants;

        let mut slots = TaskSlots::default();
        let annotated = self.pool.in_place_scope(|scope| {
            slots.spawn(scope, &self.provider, batch, options);
            self.annotate_sequences(&ctx, &hgvs, batch, &genes, options)
        });
        let results = slots.join()?;
        let mut annotations = annotated?;
        merge::merge(&mut annotations, results, options);

        merge::regroup(&inputs, &decomposed, annotations, |input| {
            let mut annotation = self.annotate_one(&ctx, &hgvs, input, &genes, options)?;
            annotation.update_display_consequence_type();
            Ok(annotation)
        })
    }

    /// The single gene search of a batch; skipped when nothing reads genes.
    fn fetch_genes(&self, variants: &[Variant], options: &AnnotationOptions) -> Result<Vec<Gene>, FerroError> {
        if !options.runs(Annotator::ConsequenceType) && !options.runs(Annotator::Hgvs) {
            return Ok(Vec::new());
        }
        let regions = batch_gene_regions(variants, options, self.config.flank);
        let genes = self.provider.search(&regions)?;
        debug!("Fetched {} genes for {} query regions", genes.len(), regions.len());
        Ok(genes)
    }

    /// Calling-thread work: consequence types and HGVS per variant, then
    /// the phasing correction in batch order.
    fn annotate_sequences(
        &self,
        ctx: &CalculatorContext<'_>,
        hgvs: &HgvsCalculator<'_>,
        variants: &[Variant],
        genes: &[Gene],
        options: &AnnotationOptions,
    ) -> Result<Vec<VariantAnnotation>, FerroError> {
        let mut annotations = Vec::with_capacity(variants.len());
        let mut phasing = PhasingCorrector::new();
        for (index, variant) in variants.iter().enumerate() {
            annotations.push(self.annotate_one(ctx, hgvs, variant, genes, options)?);
            if options.phased {
                phasing.push(index, variants, &mut annotations);
            }
        }
        if options.phased {
            let adjusted = phasing.finish(variants, &mut annotations);
            if adjusted > 0 {
                debug!("Phasing adjusted {} transcript consequence types", adjusted);
            }
        }
        for annotation in &mut annotations {
            annotation.update_display_consequence_type();
        }
        Ok(annotations)
    }

    fn annotate_one(
        &self,
        ctx: &CalculatorContext<'_>,
        hgvs: &HgvsCalculator<'_>,
        variant: &Variant,
        genes: &[Gene],
        options: &AnnotationOptions,
    ) -> Result<VariantAnnotation, FerroError> {
        let mut annotation = VariantAnnotation::for_variant(variant);
        let genes = affected_genes(genes, &gene_regions(variant, options, self.config.flank));

        if options.runs(Annotator::ConsequenceType) {
            let regulatory = self.regulatory_overlap(variant)?;
            annotation.consequence_types = match consequence_types(ctx, variant, &genes, regulatory) {
                Ok(records) => records,
                Err(e) if e.is_batch_fatal() => return Err(e),
                Err(e) => {
                    warn!("No consequence types for {}: {}", variant, e);
                    if matches!(e, FerroError::MalformedVariant { .. }) {
                        annotation.errors.push(e.to_string());
                    }
                    Vec::new()
                }
            };
        }

        if options.runs(Annotator::Hgvs) {
            match hgvs.run(variant, &genes, &mut annotation.consequence_types) {
                Ok(names) => annotation.hgvs = names,
                Err(e) if e.is_batch_fatal() => return Err(e),
                Err(e) => warn!("No HGVS for {}: {}", variant, e),
            }
        }
        Ok(annotation)
    }

    fn regulatory_overlap(&self, variant: &Variant) -> Result<RegulatoryOverlap, FerroError> {
        let region = variant_region(variant);
        let regulatory_region = self.provider.overlaps(&region, RegulatoryFeature::Any)?;
        let tf_binding_site =
            regulatory_region && self.provider.overlaps(&region, RegulatoryFeature::TfBindingSite)?;
        Ok(RegulatoryOverlap {
            regulatory_region,
            tf_binding_site,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consequence::context::fixtures::{minus_gene, plus_gene};
    use crate::model::{Cytoband, Region, Score, VariationRecord};
    use crate::provider::MockProvider;

    fn provider() -> MockProvider {
        let mut provider = MockProvider::new();
        provider.add_gene(plus_gene());
        provider.add_gene(minus_gene());
        provider.add_cytoband(Cytoband {
            chromosome: "1".to_string(),
            name: "p36.33".to_string(),
            stain: "gneg".to_string(),
            start: 1,
            end: 2_300_000,
        });
        provider
    }

    fn annotator(provider: MockProvider) -> VariantAnnotator<MockProvider> {
        VariantAnnotator::new(provider).unwrap()
    }

    // =========================================================================
    // Batch shape
    // =========================================================================

    #[test]
    fn test_empty_batch() {
        let annotator = annotator(provider());
        let annotations = annotator.annotate(&[], &AnnotationOptions::default()).unwrap();
        assert!(annotations.is_empty());
        assert_eq!(annotator.provider().gene_queries(), 0);
    }

    #[test]
    fn test_one_gene_search_per_batch() {
        let annotator = annotator(provider());
        let variants = vec![
            Variant::new("1", 104, "C", "T"),
            Variant::new("2", 1100, "A", "G"),
            Variant::new("1", 200, "A", "T"),
        ];
        let annotations = annotator.annotate(&variants, &AnnotationOptions::default()).unwrap();
        assert_eq!(annotations.len(), 3);
        assert_eq!(annotator.provider().gene_queries(), 1);
        assert_eq!(annotations[1].chromosome, "2");
        assert!(annotations[1].consequence_for_transcript("TX_MINUS").is_some());
        assert!(annotations[1].consequence_for_transcript("TX_PLUS").is_none());
    }

    #[test]
    fn test_auxiliary_fields_are_merged() {
        let mut provider = provider();
        let variant = Variant::new("1", 104, "C", "T");
        provider.add_functional_score(&variant, Score::new("cadd_scaled", 23.1));
        provider.add_variation(VariationRecord {
            id: Some("rs123".to_string()),
            chromosome: "1".to_string(),
            start: 104,
            reference: "C".to_string(),
            alternate: "T".to_string(),
            population_frequencies: Vec::new(),
        });
        provider.add_conservation(Region::new("1", 104, 104), Score::new("gerp", 4.2));

        let annotations = annotator(provider)
            .annotate(&[variant], &AnnotationOptions::default())
            .unwrap();
        let annotation = &annotations[0];
        assert_eq!(annotation.id.as_deref(), Some("rs123"));
        assert_eq!(annotation.functional_score, vec![Score::new("cadd_scaled", 23.1)]);
        assert_eq!(annotation.conservation, vec![Score::new("gerp", 4.2)]);
        assert_eq!(annotation.cytoband.len(), 1);
        assert_eq!(annotation.display_consequence_type.as_deref(), Some("missense_variant"));
    }

    #[test]
    fn test_excluded_annotators_are_skipped() {
        let mut provider = provider();
        provider.fail_source("cytoband");
        provider.fail_source("repeats");
        let options = AnnotationOptions::from_map(&HashMap::from([(
            "exclude".to_string(),
            "cytoband,repeats,hgvs".to_string(),
        )]))
        .unwrap();
        let annotations = annotator(provider)
            .annotate(&[Variant::new("1", 104, "C", "T")], &options)
            .unwrap();
        assert!(annotations[0].cytoband.is_empty());
        assert!(annotations[0].hgvs.is_empty());
        assert!(!annotations[0].consequence_types.is_empty());
    }

    #[test]
    fn test_no_gene_search_without_consequence_types() {
        let annotator = annotator(provider());
        let options = AnnotationOptions::default().with_annotators(&[Annotator::Cytoband]);
        let annotations = annotator
            .annotate(&[Variant::new("1", 104, "C", "T")], &options)
            .unwrap();
        assert_eq!(annotator.provider().gene_queries(), 0);
        assert!(annotations[0].consequence_types.is_empty());
        assert_eq!(annotations[0].cytoband.len(), 1);
    }

    // =========================================================================
    // Failures
    // =========================================================================

    #[test]
    fn test_auxiliary_failure_aborts_batch() {
        let mut provider = provider();
        provider.fail_source("conservation");
        let err = annotator(provider)
            .annotate(&[Variant::new("1", 104, "C", "T")], &AnnotationOptions::default())
            .unwrap_err();
        assert_eq!(err, FerroError::provider("conservation", "mock failure"));
    }

    #[test]
    fn test_unsupported_variant_degrades_to_empty_list() {
        let annotator = annotator(provider());
        let variants = vec![
            Variant::new("1", 104, "CG", "TTA"),
            Variant::new("1", 110, "A", "T"),
        ];
        let annotations = annotator.annotate(&variants, &AnnotationOptions::default()).unwrap();
        assert!(annotations[0].consequence_types.is_empty());
        assert!(annotations[0].errors.is_empty());
        assert!(!annotations[1].consequence_types.is_empty());
    }

    #[test]
    fn test_malformed_variant_is_reported() {
        let annotator = annotator(provider());
        let variants = vec![Variant::new("1", 106, "", "<INS>")];
        let annotations = annotator.annotate(&variants, &AnnotationOptions::default()).unwrap();
        assert!(annotations[0].consequence_types.is_empty());
        assert_eq!(annotations[0].errors.len(), 1);
    }

    // =========================================================================
    // Decomposition
    // =========================================================================

    #[test]
    fn test_decomposed_mnv_is_regrouped() {
        let annotator = annotator(provider());
        // codon 2 GCA -> TCG
        let mnv = Variant::new("1", 103, "GCA", "TCG");
        let annotations = annotator.annotate(&[mnv.clone()], &AnnotationOptions::default()).unwrap();
        assert_eq!(annotations.len(), 1);
        assert_eq!(annotations[0].reference, "GCA");

        let provider = provider();
        let ctx = CalculatorContext::new(&provider);
        let direct = consequence_types(&ctx, &mnv, &[&plus_gene()], RegulatoryOverlap::default()).unwrap();
        let grouped = annotations[0].consequence_for_transcript("TX_PLUS").unwrap();
        let expected = direct
            .iter()
            .find(|ct| ct.transcript_id.as_deref() == Some("TX_PLUS"))
            .unwrap();
        assert_eq!(grouped.sequence_ontology_terms, expected.sequence_ontology_terms);
        assert_eq!(grouped.codon, expected.codon);
    }

    #[test]
    fn test_normalize_before_annotation() {
        let annotator = annotator(provider());
        let options = AnnotationOptions::default().with_normalize(true);
        // shared leading base is trimmed away
        let annotations = annotator
            .annotate(&[Variant::new("1", 103, "GC", "GT")], &options)
            .unwrap();
        assert_eq!(annotations[0].start, 104);
        assert_eq!(annotations[0].reference, "C");
        assert_eq!(annotations[0].display_consequence_type.as_deref(), Some("missense_variant"));
    }
}
