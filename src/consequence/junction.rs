//! Splice junction rules
//!
//! An intron `[start, end]` has a splice site of two bases at each side.
//! Within the intron, the two bases next to each exon are donor/acceptor
//! sites, the next six are splice region; three exonic bases at each side
//! are splice region as well. Which side is donor and which acceptor
//! depends on the strand.
//!
//! Insertions are given as their two flanking bases and follow their own
//! variant of the rules: an insertion between the exon and the first
//! intronic base only touches the splice region.

use super::context::{regions_overlap, SoTerms};
use crate::so::Consequence;

/// Junction rule set
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum JunctionRules {
    /// Substitutions and deletions; variants longer than the threshold
    /// get no site-level terms.
    Regular { big_variant_threshold: i64 },
    /// Insertions, passed as their flanking bases `(start - 1, start)`.
    Insertion,
}

/// An intron with the site terms of its left and right (genomic) side
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Intron {
    pub start: i64,
    pub end: i64,
    pub left: Consequence,
    pub right: Consequence,
}

/// What a junction check found besides the terms it added
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub(crate) struct JunctionHit {
    /// The variant reaches a splice site from the exon side
    pub splicing: bool,
    /// Both ends of the variant fall within the intron
    pub intronic: bool,
}

/// Add junction terms for `[start, end]` against `intron`.
pub(crate) fn solve_junction(
    terms: &mut SoTerms,
    rules: JunctionRules,
    intron: &Intron,
    start: i64,
    end: i64,
) -> JunctionHit {
    match rules {
        JunctionRules::Regular {
            big_variant_threshold,
        } => solve_regular(terms, intron, start, end, end - start <= big_variant_threshold),
        JunctionRules::Insertion => solve_insertion(terms, intron, start, end),
    }
}

fn solve_regular(terms: &mut SoTerms, intron: &Intron, start: i64, end: i64, detailed: bool) -> JunctionHit {
    let (site1, site2) = (intron.start, intron.end);
    let overlaps = |s: i64, e: i64| regions_overlap(s, e, start, end);
    let mut hit = JunctionHit {
        splicing: false,
        intronic: start >= site1 && end <= site2,
    };

    if overlaps(site1 + 2, site2 - 2) {
        terms.add(Consequence::IntronVariant);
    }

    // Short introns: a site hit only counts as splicing when the variant
    // also reaches back into the intron.
    if overlaps(site1, site1 + 1) {
        if detailed {
            terms.add(intron.left);
        }
        hit.splicing |= start <= site2 || end <= site2;
    } else if overlaps(site1 + 2, site1 + 7) {
        if detailed {
            terms.add(Consequence::SpliceRegionVariant);
        }
        hit.splicing |= start <= site2 || end <= site2;
    } else if overlaps(site1 - 3, site1 - 1) && detailed {
        terms.add(Consequence::SpliceRegionVariant);
    }

    if overlaps(site2 - 1, site2) {
        if detailed {
            terms.add(intron.right);
        }
        hit.splicing |= site1 <= start || site1 <= end;
    } else if overlaps(site2 - 7, site2 - 2) {
        if detailed {
            terms.add(Consequence::SpliceRegionVariant);
        }
        hit.splicing |= site1 <= start || site1 <= end;
    } else if overlaps(site2 + 1, site2 + 3) && detailed {
        terms.add(Consequence::SpliceRegionVariant);
    }
    hit
}

fn solve_insertion(terms: &mut SoTerms, intron: &Intron, start: i64, end: i64) -> JunctionHit {
    let (site1, site2) = (intron.start, intron.end);
    let overlaps = |s: i64, e: i64| regions_overlap(s, e, start, end);
    let mut hit = JunctionHit {
        splicing: false,
        intronic: start >= site1 && end <= site2,
    };

    if overlaps(site1 + 2, site2 - 2) {
        terms.add(Consequence::IntronVariant);
    }

    if overlaps(site1, site1 + 1) {
        if end == site1 {
            // between the last exonic and the first intronic base
            terms.add(Consequence::SpliceRegionVariant);
        } else if end == site1 + 2 {
            terms.add(Consequence::SpliceRegionVariant);
            hit.splicing |= site2 > start;
        } else {
            terms.add(intron.left);
            hit.splicing |= site2 > start;
        }
    } else if overlaps(site1 + 2, site1 + 7) {
        if start != site1 + 7 {
            terms.add(Consequence::SpliceRegionVariant);
        }
        hit.splicing |= start <= site2 || end <= site2;
    } else if overlaps(site1 - 3, site1 - 1) && end != site1 - 3 {
        terms.add(Consequence::SpliceRegionVariant);
    }

    if overlaps(site2 - 1, site2) {
        if start == site2 {
            // between the last intronic and the first exonic base
            terms.add(Consequence::SpliceRegionVariant);
        } else if start == site2 - 2 {
            terms.add(Consequence::SpliceRegionVariant);
            hit.splicing |= site1 < end;
        } else {
            terms.add(intron.right);
            hit.splicing |= site1 < end;
        }
    } else if overlaps(site2 - 7, site2 - 2) {
        if end != site2 - 7 {
            terms.add(Consequence::SpliceRegionVariant);
        }
        hit.splicing |= site1 <= start || site1 <= end;
    } else if overlaps(site2 + 1, site2 + 3) && start != site2 + 3 {
        terms.add(Consequence::SpliceRegionVariant);
    }
    hit
}
