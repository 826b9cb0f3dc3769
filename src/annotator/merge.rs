//! Merging auxiliary results and regrouping decomposed variants
//!
//! Every auxiliary task owns one set of annotation fields, so merging is a
//! plain per-index assignment run by the joining thread.

use super::options::{AnnotationOptions, Annotator};
use super::tasks::AuxiliaryResults;
use crate::error::FerroError;
use crate::model::{Variant, VariantAnnotation};
use crate::normalize::Decomposed;

/// Write the joined auxiliary results into the annotations they align with.
pub fn merge(annotations: &mut [VariantAnnotation], results: AuxiliaryResults, options: &AnnotationOptions) {
    if let Some(variation) = results.variation {
        for (annotation, records) in annotations.iter_mut().zip(variation) {
            if options.runs(Annotator::Variation) {
                if let Some(id) = records.iter().find_map(|r| r.id.clone()) {
                    annotation.id = Some(id);
                }
            }
            if options.runs(Annotator::PopulationFrequencies) {
                // first known variant that carries frequencies
                if let Some(record) = records.into_iter().find(|r| !r.population_frequencies.is_empty()) {
                    annotation.population_frequencies = record.population_frequencies;
                }
            }
        }
    }
    if let Some(conservation) = results.conservation {
        for (annotation, scores) in annotations.iter_mut().zip(conservation) {
            annotation.conservation = scores;
        }
    }
    if let Some(functional) = results.functional_score {
        for (annotation, scores) in annotations.iter_mut().zip(functional) {
            if !scores.is_empty() {
                annotation.functional_score = scores;
            }
        }
    }
    if let Some(traits) = results.trait_association {
        for (annotation, associations) in annotations.iter_mut().zip(traits) {
            annotation.trait_association = associations;
        }
    }
    if let Some(repeats) = results.repeats {
        for (annotation, found) in annotations.iter_mut().zip(repeats) {
            annotation.repeats = found;
        }
    }
    if let Some(cytoband) = results.cytoband {
        for (annotation, bands) in annotations.iter_mut().zip(cytoband) {
            annotation.cytoband = bands;
        }
    }
}

fn union<T: PartialEq + Clone>(into: &mut Vec<T>, from: &[T]) {
    for item in from {
        if !into.contains(item) {
            into.push(item.clone());
        }
    }
}

/// Fold the auxiliary fields of a decomposed member into its group.
fn absorb(group: &mut VariantAnnotation, member: &VariantAnnotation) {
    if group.id.is_none() {
        group.id = member.id.clone();
    }
    union(&mut group.population_frequencies, &member.population_frequencies);
    union(&mut group.conservation, &member.conservation);
    union(&mut group.functional_score, &member.functional_score);
    union(&mut group.trait_association, &member.trait_association);
    union(&mut group.repeats, &member.repeats);
    union(&mut group.cytoband, &member.cytoband);
    union(&mut group.phased_transcripts, &member.phased_transcripts);
    union(&mut group.errors, &member.errors);
}

/// Reduce the decomposed batch to one annotation per input variant, in
/// input order.
///
/// Variants that were not split keep their annotation. A split variant
/// gets a fresh annotation from `rebuild` (called with the input variant)
/// plus the union of the auxiliary fields of its members.
pub fn regroup<F>(
    inputs: &[Variant],
    decomposed: &Decomposed,
    annotations: Vec<VariantAnnotation>,
    mut rebuild: F,
) -> Result<Vec<VariantAnnotation>, FerroError>
where
    F: FnMut(&Variant) -> Result<VariantAnnotation, FerroError>,
{
    if !decomposed.is_split() && decomposed.variants.as_slice() == inputs {
        return Ok(annotations);
    }

    let mut annotations: Vec<Option<VariantAnnotation>> = annotations.into_iter().map(Some).collect();
    let mut grouped = Vec::with_capacity(inputs.len());

    for (origin, input) in inputs.iter().enumerate() {
        let members: Vec<usize> = decomposed.members(origin).collect();
        let unchanged = members.len() == 1 && decomposed.variants[members[0]] == *input;
        if unchanged {
            if let Some(annotation) = annotations[members[0]].take() {
                grouped.push(annotation);
                continue;
            }
        }

        let mut group = rebuild(input)?;
        for member in members {
            if let Some(annotation) = annotations[member].take() {
                absorb(&mut group, &annotation);
            }
        }
        grouped.push(group);
    }
    Ok(grouped)
}
