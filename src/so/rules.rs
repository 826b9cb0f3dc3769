//! Codon-pair rules mapping a reference/alternate codon to SO terms.

use super::codon::CodonTable;
use super::Consequence;

/// Complement a nucleotide, preserving case; unknown symbols pass through.
pub fn complement(nt: char) -> char {
    match nt {
        'A' => 'T',
        'T' => 'A',
        'G' => 'C',
        'C' => 'G',
        'a' => 't',
        't' => 'a',
        'g' => 'c',
        'c' => 'g',
        other => other,
    }
}

/// Reverse complement a sequence.
pub fn reverse_complement(sequence: &str) -> String {
    sequence.chars().rev().map(complement).collect()
}

/// Decide a stop-codon related term for a modified codon.
///
/// Returns `stop_retained_variant` for a synonymous change of a stop codon,
/// `stop_lost` for a non-synonymous change of a stop codon, `stop_gained`
/// when a sense codon becomes a stop, and `None` otherwise (including
/// codons that cannot be translated).
pub fn decide_stop_codon_modification(
    table: &CodonTable,
    reference: &str,
    modified: &str,
) -> Option<Consequence> {
    let synonymous = table.is_synonymous(reference, modified)?;
    let reference_is_stop = table.is_stop(reference);
    if synonymous {
        reference_is_stop.then_some(Consequence::StopRetainedVariant)
    } else if reference_is_stop {
        Some(Consequence::StopLost)
    } else if table.is_stop(modified) {
        Some(Consequence::StopGained)
    } else {
        None
    }
}

/// Classify a codon substitution into exactly one codon-level term.
///
/// `None` when either codon cannot be translated.
pub fn classify_codon_change(
    table: &CodonTable,
    reference: &str,
    alternate: &str,
) -> Option<Consequence> {
    let synonymous = table.is_synonymous(reference, alternate)?;
    let term = if synonymous {
        if table.is_stop(reference) {
            Consequence::StopRetainedVariant
        } else {
            Consequence::SynonymousVariant
        }
    } else if table.is_stop(reference) {
        Consequence::StopLost
    } else if table.is_stop(alternate) {
        Consequence::StopGained
    } else {
        Consequence::MissenseVariant
    };
    Some(term)
}

/// Classify a change of the first codon.
///
/// `None` when the reference codon is not a start codon.
pub fn classify_start_codon_change(
    table: &CodonTable,
    reference: &str,
    modified: &str,
) -> Option<Consequence> {
    if !table.is_start(reference) {
        return None;
    }
    match table.is_synonymous(reference, modified) {
        Some(true) => Some(Consequence::StartRetainedVariant),
        _ => Some(Consequence::StartLost),
    }
}

/// Render a codon change in the `aGt/aTt` style.
///
/// `changed` flags the positions affected by the variant; they are
/// upper-cased in both alleles and every other position is lower-cased.
/// Several codons may be passed at once with a matching mask.
pub fn format_codon_change(reference: &str, alternate: &str, changed: &[bool]) -> String {
    let mark = |codon: &str| -> String {
        codon
            .chars()
            .zip(changed.iter())
            .map(|(nt, &is_changed)| {
                if is_changed {
                    nt.to_ascii_uppercase()
                } else {
                    nt.to_ascii_lowercase()
                }
            })
            .collect()
    };
    format!("{}/{}", mark(reference), mark(alternate))
}
