//! Joint codon correction for phased SNVs
//!
//! SNVs are annotated one at a time, so two or three SNVs sitting on the
//! same haplotype and hitting the same codon each see only their own
//! substitution. [`PhasingCorrector`] keeps a window of the last phased
//! SNVs (in coordinate order) and, when they share a codon on a transcript,
//! rewrites the codon, alternate amino acid and codon-level SO term of every
//! member from the joint substitution.

use log::debug;

use crate::model::{ConsequenceType, Variant, VariantAnnotation, VariantType};
use crate::so::rules::{classify_codon_change, format_codon_change};
use crate::so::{CodonTable, Consequence, GeneticCode};

/// Window contents, as indices into the batch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum PhaseBuffer {
    #[default]
    Empty,
    One(usize),
    Two(usize, usize),
}

/// Sliding-window phasing state threaded through the per-variant loop.
///
/// Variants must be pushed in batch order; indices refer to the slices
/// handed to [`PhasingCorrector::push`] and [`PhasingCorrector::finish`].
#[derive(Debug, Clone, Default)]
pub struct PhasingCorrector {
    buffer: PhaseBuffer,
    adjustments: usize,
}

impl PhasingCorrector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed the variant at `index`, whose consequence types are already set.
    ///
    /// Non-SNVs leave the window untouched.
    pub fn push(&mut self, index: usize, variants: &[Variant], annotations: &mut [VariantAnnotation]) {
        if variants[index].variant_type != VariantType::Snv {
            return;
        }
        self.buffer = match self.buffer {
            PhaseBuffer::Empty => PhaseBuffer::One(index),
            PhaseBuffer::One(head) => {
                if potential_coding_snv_overlap(&variants[head], &variants[index]) {
                    PhaseBuffer::Two(head, index)
                } else {
                    PhaseBuffer::One(index)
                }
            }
            PhaseBuffer::Two(head, second) => {
                if potential_coding_snv_overlap(&variants[head], &variants[index]) {
                    self.adjust(&[head, second, index], variants, annotations);
                    PhaseBuffer::Two(second, index)
                } else {
                    self.adjust(&[head, second], variants, annotations);
                    PhaseBuffer::One(index)
                }
            }
        };
    }

    /// Flush a pending pair at the end of the batch.
    ///
    /// Returns the number of transcript-level adjustments made over the
    /// whole batch.
    pub fn finish(mut self, variants: &[Variant], annotations: &mut [VariantAnnotation]) -> usize {
        if let PhaseBuffer::Two(head, second) = self.buffer {
            self.adjust(&[head, second], variants, annotations);
        }
        self.buffer = PhaseBuffer::Empty;
        self.adjustments
    }

    fn adjust(&mut self, window: &[usize], variants: &[Variant], annotations: &mut [VariantAnnotation]) {
        let table = GeneticCode::for_chromosome(&variants[window[0]].chromosome).table();
        let mut touched = vec![false; window.len()];

        for first in 0..annotations[window[0]].consequence_types.len() {
            let ct1 = &annotations[window[0]].consequence_types[first];
            let Some(transcript_id) = ct1.transcript_id.clone() else {
                continue;
            };
            if !is_coding(ct1) || annotations[window[0]].phased_transcripts.contains(&transcript_id) {
                continue;
            }
            let Some(second) = find_same_codon(ct1, &annotations[window[1]].consequence_types) else {
                continue;
            };
            let ct2 = &annotations[window[1]].consequence_types[second];
            let third = window
                .get(2)
                .and_then(|&index| find_same_codon(ct2, &annotations[index].consequence_types));

            let mut members = vec![(window[0], first), (window[1], second)];
            if let Some(third) = third {
                members.push((window[2], third));
            }
            let Some(joint) = joint_codon(&members, annotations, table) else {
                continue;
            };

            let anchor = annotations[window[0]].consequence_types[first].clone();
            for (slot, &(variant_index, ct_index)) in members.iter().enumerate() {
                let ct = &mut annotations[variant_index].consequence_types[ct_index];
                apply_joint(ct, &anchor, &joint);
                let phased = &mut annotations[variant_index].phased_transcripts;
                if !phased.contains(&transcript_id) {
                    phased.push(transcript_id.clone());
                }
                touched[slot] = true;
            }
            self.adjustments += 1;
            debug!(
                "Phased codon {} on {} across {} variants",
                joint.codon,
                transcript_id,
                members.len()
            );
        }

        for (slot, &index) in window.iter().enumerate() {
            if touched[slot] {
                annotations[index].update_display_consequence_type();
            }
        }
    }
}

/// Recomputed codon shared by the members of a phased window
struct JointCodon {
    codon: String,
    alternate_amino_acid: Option<String>,
    term: Consequence,
}

/// Substitute every member's changed base into the shared reference codon.
fn joint_codon(
    members: &[(usize, usize)],
    annotations: &[VariantAnnotation],
    table: &CodonTable,
) -> Option<JointCodon> {
    let (first_variant, first_ct) = members[0];
    let codon = annotations[first_variant].consequence_types[first_ct].codon.as_deref()?;
    let reference: Vec<char> = codon.split('/').next()?.to_ascii_uppercase().chars().collect();
    if reference.len() != 3 {
        return None;
    }
    let mut alternate = reference.clone();
    let mut changed = [false; 3];
    for &(variant_index, ct_index) in members {
        let codon = annotations[variant_index].consequence_types[ct_index].codon.as_deref()?;
        let (position, nt) = changed_base(codon)?;
        alternate[position] = nt;
        changed[position] = true;
    }
    let reference: String = reference.into_iter().collect();
    let alternate: String = alternate.into_iter().collect();
    let term = classify_codon_change(table, &reference, &alternate)?;
    Some(JointCodon {
        codon: format_codon_change(&reference, &alternate, &changed),
        alternate_amino_acid: table.translate(&alternate).map(|aa| aa.three_letter().to_string()),
        term,
    })
}

/// Position and alternate base of the upper-cased nucleotide in `ref/alt`.
fn changed_base(codon: &str) -> Option<(usize, char)> {
    let (reference, alternate) = codon.split_once('/')?;
    let position = reference.chars().position(|nt| nt.is_ascii_uppercase())?;
    let nt = alternate.chars().nth(position)?.to_ascii_uppercase();
    Some((position, nt))
}

fn apply_joint(ct: &mut ConsequenceType, anchor: &ConsequenceType, joint: &JointCodon) {
    ct.cdna_position = anchor.cdna_position;
    ct.cds_position = anchor.cds_position;
    ct.codon = Some(joint.codon.clone());
    let mut protein = anchor.protein_variant_annotation.clone().unwrap_or_default();
    protein.alternate = joint.alternate_amino_acid.clone();
    ct.protein_variant_annotation = Some(protein);

    let mut terms: Vec<_> = ct
        .consequences()
        .into_iter()
        .filter(|term| !term.is_codon_change())
        .collect();
    terms.push(joint.term);
    ct.set_terms(terms);
}

/// Whether a record carries a codon-level term and the codon it applies to.
fn is_coding(ct: &ConsequenceType) -> bool {
    ct.codon.is_some()
        && ct.protein_variant_annotation.is_some()
        && ct.consequences().iter().any(|term| term.is_codon_change())
}

/// Coding record of the same transcript and protein position.
fn find_same_codon(ct: &ConsequenceType, candidates: &[ConsequenceType]) -> Option<usize> {
    let position = ct.protein_variant_annotation.as_ref()?.position;
    candidates.iter().position(|other| {
        is_coding(other)
            && other.transcript_id == ct.transcript_id
            && other
                .protein_variant_annotation
                .as_ref()
                .is_some_and(|p| p.position == position)
    })
}

/// Whether two SNVs may hit the same codon of the same haplotype.
pub fn potential_coding_snv_overlap(first: &Variant, second: &Variant) -> bool {
    (first.start - second.start).abs() < 3
        && first.chromosome == second.chromosome
        && first.variant_type == VariantType::Snv
        && second.variant_type == VariantType::Snv
        && same_phase(first, second)
}

/// Whether two variants are known to sit on the same chromosome copy.
///
/// Both need the same phase set. Variants without genotypes (decomposed
/// MNVs) must come from the same call; otherwise both genotypes must be
/// phased, carry the alternate allele and agree allele by allele.
pub fn same_phase(first: &Variant, second: &Variant) -> bool {
    match (&first.phase_set, &second.phase_set) {
        (Some(a), Some(b)) if a == b => {}
        _ => return false,
    }
    match (first.genotype.as_deref(), second.genotype.as_deref()) {
        (None, None) => match (&first.call_id, &second.call_id) {
            (Some(a), Some(b)) => !a.trim().is_empty() && a == b,
            _ => false,
        },
        (Some(a), Some(b)) if alternate_present(a) && alternate_present(b) => {
            if a.contains('/') || b.contains('/') {
                return false;
            }
            let alleles_a: Vec<&str> = a.split('|').collect();
            let alleles_b: Vec<&str> = b.split('|').collect();
            match (alleles_a.len(), alleles_b.len()) {
                (1, n) => n == 1,
                (_, 1) => false,
                _ => alleles_a[0] == alleles_b[0] && alleles_a[1] == alleles_b[1],
            }
        }
        _ => false,
    }
}

fn alternate_present(genotype: &str) -> bool {
    genotype.contains('1')
}
