//! Variant normalization
//!
//! Two steps run before annotation:
//!
//! 1. Trimming of bases shared by both alleles (suffix first, then prefix)
//!    and left alignment of the resulting insertion or deletion against the
//!    reference genome.
//! 2. Decomposition of MNVs into SNVs (see [`decompose`]).
//!
//! # Coordinate System
//!
//! Positions are 1-based. An insertion keeps the convention of the model:
//! `start` is the base following the insertion point and `end == start - 1`.

pub mod decompose;

pub use decompose::{decompose, Decomposed};

use log::debug;

use crate::error::FerroError;
use crate::model::{Region, Variant, VariantType};
use crate::provider::GenomeSequenceProvider;

/// Bases fetched per reference request while shifting left
const SHIFT_WINDOW: i64 = 100;

/// Remove bases shared by both alleles.
///
/// The common suffix is removed first so that the remaining allele sits at
/// its leftmost representation, then the common prefix, moving `start`.
/// Symbolic and breakend alleles are returned unchanged.
pub fn trim(variant: &Variant) -> Variant {
    if variant.is_structural() || variant.reference.is_empty() || variant.alternate.is_empty() {
        return variant.clone();
    }
    let reference = variant.reference.as_bytes();
    let alternate = variant.alternate.as_bytes();

    let mut suffix = 0;
    while suffix < reference.len()
        && suffix < alternate.len()
        && reference[reference.len() - 1 - suffix] == alternate[alternate.len() - 1 - suffix]
    {
        suffix += 1;
    }
    let reference = &reference[..reference.len() - suffix];
    let alternate = &alternate[..alternate.len() - suffix];

    let mut prefix = 0;
    while prefix < reference.len() && prefix < alternate.len() && reference[prefix] == alternate[prefix] {
        prefix += 1;
    }
    if suffix == 0 && prefix == 0 {
        return variant.clone();
    }

    let reference = String::from_utf8_lossy(&reference[prefix..]).into_owned();
    let alternate = String::from_utf8_lossy(&alternate[prefix..]).into_owned();
    rebuild(variant, variant.start + prefix as i64, reference, alternate)
}

/// Bases of an insertion or deletion that may slide along the reference.
fn indel_allele(variant: &Variant) -> Option<Vec<u8>> {
    let allele = match variant.variant_type {
        VariantType::Deletion if !variant.is_symbolic() => &variant.reference,
        VariantType::Insertion if !variant.is_symbolic() => &variant.alternate,
        _ => return None,
    };
    (!allele.is_empty()).then(|| allele.to_ascii_uppercase().into_bytes())
}

fn shifted_indel(variant: &Variant, start: i64, allele: Vec<u8>) -> Variant {
    let allele = String::from_utf8_lossy(&allele).into_owned();
    match variant.variant_type {
        VariantType::Deletion => rebuild(variant, start, allele, String::new()),
        _ => rebuild(variant, start, String::new(), allele),
    }
}

/// Read a reference window, `None` when the reference is not available.
fn fetch_window(genome: &dyn GenomeSequenceProvider, region: &Region) -> Result<Option<Vec<u8>>, FerroError> {
    match genome.get_sequence(region) {
        Ok(sequence) if sequence.len() as i64 == region.len() => {
            Ok(Some(sequence.to_ascii_uppercase().into_bytes()))
        }
        Ok(_) => Ok(None),
        Err(FerroError::GenomicReferenceNotAvailable { .. }) => {
            debug!("No reference to shift along at {}", region);
            Ok(None)
        }
        Err(e) => Err(e),
    }
}

/// Shift an insertion or deletion to its leftmost equivalent position.
///
/// Bases are read from `genome`; when the reference is not available the
/// variant stays where it is.
pub fn left_align(variant: &Variant, genome: &dyn GenomeSequenceProvider) -> Result<Variant, FerroError> {
    let Some(mut allele) = indel_allele(variant) else {
        return Ok(variant.clone());
    };
    let mut start = variant.start;
    let mut window: Vec<u8> = Vec::new();
    let mut window_start = start;

    while start > 1 {
        if start - 1 < window_start {
            window_start = (start - SHIFT_WINDOW).max(1);
            let region = Region::new(&variant.chromosome, window_start, start - 1);
            match fetch_window(genome, &region)? {
                Some(bases) => window = bases,
                None => break,
            }
        }
        let previous = window[(start - 1 - window_start) as usize];
        if allele.last() != Some(&previous) {
            break;
        }
        allele.rotate_right(1);
        allele[0] = previous;
        start -= 1;
    }

    if start == variant.start {
        return Ok(variant.clone());
    }
    let shifted = shifted_indel(variant, start, allele);
    debug!("Left-aligned {} to {}", variant, shifted);
    Ok(shifted)
}

/// Shift an insertion or deletion to its rightmost equivalent position.
///
/// This is the 3' rule of HGVS on the plus strand. Stops where the
/// reference can no longer be read.
pub fn right_align(variant: &Variant, genome: &dyn GenomeSequenceProvider) -> Result<Variant, FerroError> {
    let Some(mut allele) = indel_allele(variant) else {
        return Ok(variant.clone());
    };
    let mut start = variant.start;
    // first reference base after the allele; for insertions that is `start`
    let mut next = variant.end + 1;
    let mut window: Vec<u8> = Vec::new();
    let mut window_start = next;

    loop {
        if next >= window_start + window.len() as i64 {
            window_start = next;
            let region = Region::new(&variant.chromosome, next, next + SHIFT_WINDOW - 1);
            // near the chromosome end only single bases may still be readable
            let bases = match fetch_window(genome, &region)? {
                Some(bases) => Some(bases),
                None => fetch_window(genome, &Region::new(&variant.chromosome, next, next))?,
            };
            match bases {
                Some(bases) => window = bases,
                None => break,
            }
        }
        let following = window[(next - window_start) as usize];
        if allele.first() != Some(&following) {
            break;
        }
        allele.rotate_left(1);
        if let Some(last) = allele.last_mut() {
            *last = following;
        }
        start += 1;
        next += 1;
    }

    if start == variant.start {
        return Ok(variant.clone());
    }
    Ok(shifted_indel(variant, start, allele))
}

/// Trim and left-align every variant of a batch.
///
/// A variant whose reference cannot be read keeps its trimmed form; any
/// other provider error aborts the batch.
pub fn normalize_batch(
    variants: &[Variant],
    genome: &dyn GenomeSequenceProvider,
) -> Result<Vec<Variant>, FerroError> {
    variants
        .iter()
        .map(|variant| left_align(&trim(variant), genome))
        .collect()
}

/// A copy of `variant` with new start and alleles, keeping sample fields.
fn rebuild(variant: &Variant, start: i64, reference: String, alternate: String) -> Variant {
    let mut rebuilt = Variant::new(variant.chromosome.clone(), start, reference, alternate);
    rebuilt.id = variant.id.clone();
    rebuilt.sv = variant.sv.clone();
    rebuilt.phase_set = variant.phase_set.clone();
    rebuilt.genotype = variant.genotype.clone();
    rebuilt.call_id = variant.call_id.clone();
    rebuilt
}
