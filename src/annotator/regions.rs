//! Query regions derived from variants
//!
//! Positions are 1-based and inclusive. An insertion (`end == start - 1`)
//! is queried over the two bases around the insertion point.

use crate::annotator::options::AnnotationOptions;
use crate::model::{Gene, Region, Variant, VariantType};

/// Longest region sent to the conservation lookup
pub const CONSERVATION_MAX_LEN: i64 = 50;

/// Ordered `(start, end)` of the bases a variant touches.
pub fn span(variant: &Variant) -> (i64, i64) {
    (variant.start.min(variant.end), variant.start.max(variant.end))
}

/// The region of the variant itself.
pub fn variant_region(variant: &Variant) -> Region {
    let (start, end) = span(variant);
    Region::new(&variant.chromosome, start, end)
}

/// Outer bounds of a variant, widened to its confidence intervals and the
/// structural padding when imprecise.
fn outer_bounds(variant: &Variant, options: &AnnotationOptions) -> (i64, i64) {
    let (mut start, mut end) = span(variant);
    if let (Some(sv), true) = (&variant.sv, options.imprecise) {
        let padding = options.sv_extra_padding.max(options.cnv_extra_padding);
        let lefts = [sv.ci_start_left, sv.ci_end_left];
        let rights = [sv.ci_start_right, sv.ci_end_right];
        for left in lefts.into_iter().flatten() {
            start = start.min(left - padding);
        }
        for right in rights.into_iter().flatten() {
            end = end.max(right + padding);
        }
    }
    (start.max(1), end)
}

/// Regions whose genes may receive a consequence type from `variant`.
///
/// Breakends add a region around their mate, which may sit on another
/// chromosome.
pub fn gene_regions(variant: &Variant, options: &AnnotationOptions, flank: i64) -> Vec<Region> {
    let (start, end) = outer_bounds(variant, options);
    let mut regions = vec![Region::new(&variant.chromosome, (start - flank).max(1), end + flank)];

    if let Some(mate) = variant.sv.as_ref().and_then(|sv| sv.breakend.as_ref()) {
        let mut start = mate.position;
        let mut end = mate.position;
        if options.imprecise {
            if let Some(left) = mate.ci_position_left {
                start = start.min(left - options.sv_extra_padding);
            }
            if let Some(right) = mate.ci_position_right {
                end = end.max(right + options.sv_extra_padding);
            }
        }
        regions.push(Region::new(&mate.chromosome, (start - flank).max(1), end + flank));
    }
    regions
}

/// Gene query regions of a whole batch, for one batched search.
pub fn batch_gene_regions(variants: &[Variant], options: &AnnotationOptions, flank: i64) -> Vec<Region> {
    variants
        .iter()
        .flat_map(|variant| gene_regions(variant, options, flank))
        .collect()
}

/// Genes of the batch set overlapping any of `regions`.
pub fn affected_genes<'a>(genes: &'a [Gene], regions: &[Region]) -> Vec<&'a Gene> {
    genes
        .iter()
        .filter(|gene| {
            regions
                .iter()
                .any(|r| gene.overlaps(&r.chromosome, r.start, r.end, 0))
        })
        .collect()
}

/// Both breakpoints of a structural variant.
///
/// `None` for sequence-level variants and for structural variants whose
/// two ends coincide.
pub fn breakpoints(variant: &Variant) -> Option<(Region, Region)> {
    if !variant.is_structural() {
        return None;
    }
    let first = Region::new(&variant.chromosome, variant.start, variant.start);
    if variant.variant_type == VariantType::Breakend {
        let mate = variant.sv.as_ref()?.breakend.as_ref()?;
        return Some((first, Region::new(&mate.chromosome, mate.position, mate.position)));
    }
    (variant.end > variant.start).then(|| (first, Region::new(&variant.chromosome, variant.end, variant.end)))
}

/// Regions looked up for a variant by region-keyed annotators.
pub fn lookup_regions(variant: &Variant) -> Vec<Region> {
    match breakpoints(variant) {
        Some((first, second)) => vec![first, second],
        None => vec![variant_region(variant)],
    }
}

/// A region cut down to the conservation lookup limit.
pub fn truncate_for_conservation(region: Region) -> Region {
    let end = region.end.min(region.start + CONSERVATION_MAX_LEN - 1);
    Region { end, ..region }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{BreakendMate, StructuralVariation};

    fn gene(chromosome: &str, start: i64, end: i64) -> Gene {
        Gene {
            id: format!("G{}", start),
            name: format!("G{}", start),
            chromosome: chromosome.to_string(),
            start,
            end,
            ..Default::default()
        }
    }

    // =========================================================================
    // Gene regions
    // =========================================================================

    #[test]
    fn test_gene_region_is_flanked() {
        let regions = gene_regions(&Variant::new("1", 10_000, "A", "T"), &AnnotationOptions::default(), 5000);
        assert_eq!(regions, vec![Region::new("1", 5000, 15_000)]);
    }

    #[test]
    fn test_gene_region_is_clamped_at_chromosome_start() {
        let regions = gene_regions(&Variant::new("1", 100, "A", "T"), &AnnotationOptions::default(), 5000);
        assert_eq!(regions[0].start, 1);
    }

    #[test]
    fn test_insertion_span() {
        let insertion = Variant::new("1", 101, "", "AT");
        assert_eq!(span(&insertion), (100, 101));
        assert_eq!(variant_region(&insertion), Region::new("1", 100, 101));
    }

    #[test]
    fn test_imprecise_bounds_widen_gene_region() {
        let variant = Variant::new("1", 10_000, "N", "<DEL>")
            .with_end(20_000)
            .with_sv(StructuralVariation {
                ci_start_left: Some(9_000),
                ci_end_right: Some(21_000),
                ..Default::default()
            });
        let mut options = AnnotationOptions::default();
        options.sv_extra_padding = 100;
        let regions = gene_regions(&variant, &options, 0);
        assert_eq!(regions, vec![Region::new("1", 8_900, 21_100)]);

        options.imprecise = false;
        let regions = gene_regions(&variant, &options, 0);
        assert_eq!(regions, vec![Region::new("1", 10_000, 20_000)]);
    }

    #[test]
    fn test_breakend_mate_adds_region() {
        let variant = Variant::new("1", 500, "A", "A]3:9000]").with_sv(StructuralVariation {
            breakend: Some(BreakendMate {
                chromosome: "3".to_string(),
                position: 9000,
                ci_position_left: None,
                ci_position_right: None,
            }),
            ..Default::default()
        });
        let regions = gene_regions(&variant, &AnnotationOptions::default(), 10);
        assert_eq!(regions[1], Region::new("3", 8990, 9010));
    }

    #[test]
    fn test_affected_genes() {
        let genes = vec![gene("1", 100, 200), gene("1", 10_000, 11_000), gene("2", 100, 200)];
        let affected = affected_genes(&genes, &[Region::new("1", 50, 5_150)]);
        assert_eq!(affected.len(), 1);
        assert_eq!(affected[0].start, 100);
    }

    #[test]
    fn test_affected_genes_borrow_the_batch_set() {
        let genes = vec![gene("1", 100, 200), gene("2", 100, 200)];
        let affected = affected_genes(
            &genes,
            &[Region::new("1", 150, 150), Region::new("2", 150, 150)],
        );
        assert_eq!(affected.len(), 2);
        assert!(std::ptr::eq(affected[0], &genes[0]));
        assert!(std::ptr::eq(affected[1], &genes[1]));
    }

    // =========================================================================
    // Lookup regions
    // =========================================================================

    #[test]
    fn test_breakpoints_of_deletion() {
        let variant = Variant::new("1", 1000, "N", "<DEL>").with_end(5000);
        let (first, second) = breakpoints(&variant).unwrap();
        assert_eq!(first, Region::new("1", 1000, 1000));
        assert_eq!(second, Region::new("1", 5000, 5000));
        assert_eq!(lookup_regions(&variant).len(), 2);
    }

    #[test]
    fn test_no_breakpoints_for_small_variants() {
        let variant = Variant::new("1", 1000, "ACGT", "");
        assert!(breakpoints(&variant).is_none());
        assert_eq!(lookup_regions(&variant), vec![Region::new("1", 1000, 1003)]);
    }

    #[test]
    fn test_truncate_for_conservation() {
        assert_eq!(
            truncate_for_conservation(Region::new("1", 100, 1000)),
            Region::new("1", 100, 149)
        );
        assert_eq!(
            truncate_for_conservation(Region::new("1", 100, 110)),
            Region::new("1", 100, 110)
        );
    }
}
