//! Strand-aware exon walking
//!
//! Exons are visited in transcript order while accumulating the cDNA
//! offset. cDNA positions are reported for the variant's 5' and 3' ends in
//! transcript orientation, so on the minus strand the 5' end is the
//! highest genomic coordinate of the variant.

use super::context::{regions_overlap, TranscriptState};
use super::junction::{solve_junction, Intron, JunctionRules};
use crate::model::{Exon, ExonOverlap, Strand, Transcript};
use crate::so::Consequence;

/// Result of walking a transcript's exons
#[derive(Debug, Clone, PartialEq, Default)]
pub(crate) struct ExonWalk {
    /// cDNA position of the variant's 5' end, `None` when intronic
    pub cdna_start: Option<i64>,
    /// cDNA position of the variant's 3' end, `None` when intronic
    pub cdna_end: Option<i64>,
    /// Phase of the first coding exon, `-1` when unknown
    pub first_cds_phase: i32,
    /// Some junction was hit from the exon side
    pub splicing: bool,
    /// Both ends fall in the same intron
    pub intronic: bool,
    pub exon_overlap: Vec<ExonOverlap>,
}

/// Intron between two exons consecutive in transcript order.
fn intron_between(strand: Strand, previous: &Exon, next: &Exon) -> Intron {
    match strand {
        Strand::Plus => Intron {
            start: previous.end + 1,
            end: next.start - 1,
            left: Consequence::SpliceDonorVariant,
            right: Consequence::SpliceAcceptorVariant,
        },
        Strand::Minus => Intron {
            start: next.end + 1,
            end: previous.start - 1,
            left: Consequence::SpliceAcceptorVariant,
            right: Consequence::SpliceDonorVariant,
        },
    }
}

/// cDNA position of a genomic position inside `exon`.
fn cdna_of(strand: Strand, exon: &Exon, offset: i64, position: i64) -> i64 {
    match strand {
        Strand::Plus => offset + position - exon.start + 1,
        Strand::Minus => offset + exon.end - position + 1,
    }
}

/// Whether the CDS starts in or before `exon` (transcript order).
fn reaches_cds(transcript: &Transcript, exon: &Exon) -> bool {
    match transcript.strand {
        Strand::Plus => transcript.genomic_coding_start <= exon.end,
        Strand::Minus => transcript.genomic_coding_end >= exon.start,
    }
}

/// Walk all exons, adding junction terms to the state.
pub(crate) fn walk_exons(
    state: &mut TranscriptState<'_>,
    rules: JunctionRules,
    with_percentage: bool,
) -> ExonWalk {
    let transcript = state.transcript;
    let strand = transcript.strand;
    let (start, end) = (state.start, state.end);
    let (five, three) = (state.five_prime(), state.three_prime());
    let total = transcript.exons.len();

    let mut walk = ExonWalk {
        first_cds_phase: -1,
        ..Default::default()
    };
    let mut offset = 0;
    for (index, exon) in transcript.exons.iter().enumerate() {
        if walk.first_cds_phase == -1 && transcript.is_coding() && reaches_cds(transcript, exon) {
            walk.first_cds_phase = exon.phase;
        }
        if index > 0 {
            let intron = intron_between(strand, &transcript.exons[index - 1], exon);
            let hit = solve_junction(&mut state.terms, rules, &intron, start, end);
            walk.splicing |= hit.splicing;
            walk.intronic |= hit.intronic;
        }

        let touched = match rules {
            JunctionRules::Regular { .. } => {
                if exon.contains(five) {
                    walk.cdna_start = Some(cdna_of(strand, exon, offset, five));
                }
                if exon.contains(three) {
                    walk.cdna_end = Some(cdna_of(strand, exon, offset, three));
                }
                regions_overlap(exon.start, exon.end, start, end)
            }
            JunctionRules::Insertion => {
                // five/three are the bases either side of the inserted sequence
                if exon.contains(five) {
                    let cdna = cdna_of(strand, exon, offset, five);
                    walk.cdna_start = Some(cdna);
                    walk.cdna_end = Some(if exon.contains(three) {
                        cdna_of(strand, exon, offset, three)
                    } else {
                        cdna + 1
                    });
                    true
                } else if exon.contains(three) {
                    let cdna = cdna_of(strand, exon, offset, three);
                    walk.cdna_start = Some(cdna - 1);
                    walk.cdna_end = Some(cdna);
                    true
                } else {
                    false
                }
            }
        };

        if touched {
            let number = if exon.exon_number > 0 {
                exon.exon_number as usize
            } else {
                index + 1
            };
            let percentage = with_percentage.then(|| {
                let covered = end.min(exon.end) - start.max(exon.start) + 1;
                (covered as f32) * 100.0 / (exon.len() as f32)
            });
            walk.exon_overlap.push(ExonOverlap {
                number: format!("{}/{}", number, total),
                percentage,
            });
        }
        offset += exon.len();
    }
    walk
}
