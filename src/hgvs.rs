//! HGVS strings for annotated variants
//!
//! Three flavours are produced:
//!
//! | Level | Example |
//! |-------|---------|
//! | genomic | `1:g.100A>T` |
//! | transcript | `ENST01:c.100+5G>A`, `ENST02:n.12del` |
//! | protein | `ENSP01:p.Ala2Val`, `ENSP01:p.Ala2=` |
//!
//! Insertions and deletions are shifted 3' in the orientation of the
//! reference they are described on, which needs the genome sequence.
//! Structural variants get no HGVS strings.

use std::fmt;

use crate::error::FerroError;
use crate::model::{ConsequenceType, Gene, Region, Strand, Transcript, Variant, VariantType};
use crate::normalize::{left_align, right_align};
use crate::provider::GenomeSequenceProvider;
use crate::so::rules::reverse_complement;
use crate::so::Consequence;

/// Position on a transcript (c. or n. coordinates)
///
/// `base` is negative in the 5' UTR of a coding transcript. `utr3` marks
/// positions after the stop codon (`*12`). `offset` is the intronic
/// distance to the nearest exon boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TranscriptPos {
    pub base: i64,
    pub utr3: bool,
    pub offset: i64,
}

impl fmt::Display for TranscriptPos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.utr3 {
            write!(f, "*{}", self.base)?;
        } else {
            write!(f, "{}", self.base)?;
        }
        if self.offset > 0 {
            write!(f, "+{}", self.offset)?;
        } else if self.offset < 0 {
            write!(f, "{}", self.offset)?;
        }
        Ok(())
    }
}

/// cDNA position and intronic offset of a genomic position.
///
/// Intronic positions are anchored on the closest exon boundary, the
/// upstream exon winning ties. `None` outside the transcript.
pub fn cdna_position(transcript: &Transcript, position: i64) -> Option<(i64, i64)> {
    if position < transcript.start || position > transcript.end {
        return None;
    }
    let plus = transcript.strand == Strand::Plus;
    let mut offset = 0;
    let mut previous: Option<(i64, i64)> = None; // (genomic 3' end, cdna) of the last exon seen
    for exon in &transcript.exons {
        if exon.contains(position) {
            let within = if plus { position - exon.start } else { exon.end - position };
            return Some((offset + within + 1, 0));
        }
        let (exon_five, exon_three) = if plus { (exon.start, exon.end) } else { (exon.end, exon.start) };
        if let Some((last_three, last_cdna)) = previous {
            let in_intron = if plus {
                position > last_three && position < exon_five
            } else {
                position < last_three && position > exon_five
            };
            if in_intron {
                let after_donor = (position - last_three).abs();
                let before_acceptor = (exon_five - position).abs();
                return Some(if after_donor <= before_acceptor {
                    (last_cdna, after_donor)
                } else {
                    (offset + 1, -before_acceptor)
                });
            }
        }
        offset += exon.len();
        previous = Some((exon_three, offset));
    }
    None
}

/// Transcript coordinate of a genomic position.
pub fn transcript_position(transcript: &Transcript, position: i64) -> Option<TranscriptPos> {
    let (cdna, offset) = cdna_position(transcript, position)?;
    if !is_coding(transcript) {
        return Some(TranscriptPos { base: cdna, utr3: false, offset });
    }
    let pos = if cdna < transcript.cdna_coding_start {
        TranscriptPos { base: cdna - transcript.cdna_coding_start, utr3: false, offset }
    } else if cdna > transcript.cdna_coding_end {
        TranscriptPos { base: cdna - transcript.cdna_coding_end, utr3: true, offset }
    } else {
        TranscriptPos { base: cdna - transcript.cdna_coding_start + 1, utr3: false, offset }
    };
    Some(pos)
}

fn is_coding(transcript: &Transcript) -> bool {
    transcript.cdna_coding_start > 0 && transcript.cdna_coding_end != 0
}

fn range(first: impl fmt::Display, last: impl fmt::Display, same: bool) -> String {
    if same {
        first.to_string()
    } else {
        format!("{}_{}", first, last)
    }
}

/// HGVS string builder backed by a genome sequence provider
pub struct HgvsCalculator<'a> {
    genome: &'a dyn GenomeSequenceProvider,
}

impl<'a> HgvsCalculator<'a> {
    pub fn new(genome: &'a dyn GenomeSequenceProvider) -> Self {
        Self { genome }
    }

    /// All HGVS strings of a variant, genomic first.
    ///
    /// Transcript and protein strings are also attached to the matching
    /// consequence type.
    pub fn run(
        &self,
        variant: &Variant,
        genes: &[&Gene],
        consequence_types: &mut [ConsequenceType],
    ) -> Result<Vec<String>, FerroError> {
        let mut names = Vec::new();
        let Some(genomic) = self.genomic(variant)? else {
            return Ok(names);
        };
        names.push(genomic);

        for transcript in genes.iter().flat_map(|g| g.transcripts.iter()) {
            let Some(name) = self.transcript(variant, transcript)? else {
                continue;
            };
            let record = consequence_types
                .iter_mut()
                .find(|ct| ct.transcript_id.as_deref() == Some(transcript.id.as_str()));
            let protein = record.as_deref().and_then(|ct| protein(ct, transcript));
            if let Some(record) = record {
                record.hgvs.push(name.clone());
                if let Some(protein) = &protein {
                    record.hgvs.push(protein.clone());
                }
            }
            names.push(name);
            names.extend(protein);
        }
        Ok(names)
    }

    /// Genomic description (`chr:g.`).
    pub fn genomic(&self, variant: &Variant) -> Result<Option<String>, FerroError> {
        if variant.is_structural() {
            return Ok(None);
        }
        let prefix = format!("{}:g.", variant.chromosome);
        let description = match variant.variant_type {
            VariantType::Snv => format!("{}{}>{}", variant.start, variant.reference, variant.alternate),
            VariantType::Mnv | VariantType::Indel => format!(
                "{}delins{}",
                range(variant.start, variant.end, variant.start == variant.end),
                variant.alternate
            ),
            VariantType::Deletion => {
                let shifted = right_align(variant, self.genome)?;
                format!("{}del", range(shifted.start, shifted.end, shifted.start == shifted.end))
            }
            VariantType::Insertion => {
                let shifted = right_align(variant, self.genome)?;
                let length = shifted.alternate.len() as i64;
                let preceding = Region::new(&shifted.chromosome, shifted.start - length, shifted.start - 1);
                if self.reference_equals(&preceding, &shifted.alternate)? {
                    format!("{}dup", range(preceding.start, preceding.end, length == 1))
                } else {
                    format!("{}_{}ins{}", shifted.start - 1, shifted.start, shifted.alternate)
                }
            }
            _ => return Ok(None),
        };
        Ok(Some(prefix + &description))
    }

    /// Transcript description (`id:c.` or `id:n.`); `None` when the
    /// variant does not touch the transcript or has no HGVS form.
    pub fn transcript(&self, variant: &Variant, transcript: &Transcript) -> Result<Option<String>, FerroError> {
        let (low, high) = (variant.start.min(variant.end), variant.start.max(variant.end));
        if variant.is_structural() || high < transcript.start || low > transcript.end {
            return Ok(None);
        }
        let plus = transcript.strand == Strand::Plus;
        // 3' in transcript orientation
        let shifted = match variant.variant_type {
            VariantType::Insertion | VariantType::Deletion if plus => right_align(variant, self.genome)?,
            VariantType::Insertion | VariantType::Deletion => left_align(variant, self.genome)?,
            _ => variant.clone(),
        };
        let sense = |allele: &str| if plus { allele.to_string() } else { reverse_complement(allele) };
        let pos = |position: i64| transcript_position(transcript, position);
        // transcript-ordered bounds of a genomic interval
        let bounds = |start: i64, end: i64| -> Option<(TranscriptPos, TranscriptPos)> {
            if plus {
                Some((pos(start)?, pos(end)?))
            } else {
                Some((pos(end)?, pos(start)?))
            }
        };

        let description = match shifted.variant_type {
            VariantType::Snv => {
                let Some(p) = pos(shifted.start) else { return Ok(None) };
                format!("{}{}>{}", p, sense(&shifted.reference), sense(&shifted.alternate))
            }
            VariantType::Mnv | VariantType::Indel => {
                let Some((first, last)) = bounds(shifted.start, shifted.end) else { return Ok(None) };
                format!("{}delins{}", range(first, last, shifted.start == shifted.end), sense(&shifted.alternate))
            }
            VariantType::Deletion => {
                let Some((first, last)) = bounds(shifted.start, shifted.end) else { return Ok(None) };
                format!("{}del", range(first, last, shifted.start == shifted.end))
            }
            VariantType::Insertion => {
                let length = shifted.alternate.len() as i64;
                // bases preceding the insertion in transcript orientation
                let preceding = if plus {
                    Region::new(&shifted.chromosome, shifted.start - length, shifted.start - 1)
                } else {
                    Region::new(&shifted.chromosome, shifted.start, shifted.start + length - 1)
                };
                if self.reference_equals(&preceding, &shifted.alternate)? {
                    let Some((first, last)) = bounds(preceding.start, preceding.end) else { return Ok(None) };
                    format!("{}dup", range(first, last, length == 1))
                } else {
                    let Some((first, last)) = bounds(shifted.start - 1, shifted.start) else { return Ok(None) };
                    format!("{}_{}ins{}", first, last, sense(&shifted.alternate))
                }
            }
            _ => return Ok(None),
        };
        let kind = if is_coding(transcript) { "c." } else { "n." };
        Ok(Some(format!("{}:{}{}", transcript.id, kind, description)))
    }

    fn reference_equals(&self, region: &Region, allele: &str) -> Result<bool, FerroError> {
        if region.start < 1 {
            return Ok(false);
        }
        match self.genome.get_sequence(region) {
            Ok(sequence) => Ok(sequence.eq_ignore_ascii_case(allele)),
            Err(FerroError::GenomicReferenceNotAvailable { .. }) => Ok(false),
            Err(e) => Err(e),
        }
    }
}

/// Protein description (`protein_id:p.`) of a coding consequence type.
pub fn protein(ct: &ConsequenceType, transcript: &Transcript) -> Option<String> {
    let annotation = ct.protein_variant_annotation.as_ref()?;
    let protein_id = annotation.protein_id.as_ref().or(transcript.protein_id.as_ref())?;
    let position = annotation.position;
    let reference = annotation.reference.as_deref().map(hgvs_amino_acids);
    let alternate = annotation.alternate.as_deref().map(hgvs_amino_acids);
    let first = reference.as_deref().map(|r| r.get(..3).unwrap_or(r));

    let description = if ct.has_term(Consequence::StartLost) {
        format!("Met{}?", position)
    } else if ct.has_term(Consequence::FrameshiftVariant) {
        format!("{}{}fs", first?, position)
    } else if ct.has_term(Consequence::StopLost) {
        format!("Ter{}{}extTer?", position, alternate?.get(..3)?)
    } else if ct.has_term(Consequence::SynonymousVariant)
        || ct.has_term(Consequence::StopRetainedVariant)
        || ct.has_term(Consequence::StartRetainedVariant)
    {
        format!("{}{}=", first?, position)
    } else if ct.has_term(Consequence::MissenseVariant) || ct.has_term(Consequence::StopGained) {
        let (reference, alternate) = (reference?, alternate?);
        if reference.len() == 3 {
            format!("{}{}{}", reference, position, alternate)
        } else {
            let last_position = position + reference.len() as i64 / 3 - 1;
            format!(
                "{}{}_{}{}delins{}",
                &reference[..3],
                position,
                &reference[reference.len() - 3..],
                last_position,
                alternate
            )
        }
    } else {
        return None;
    };
    Some(format!("{}:p.{}", protein_id, description))
}

/// Three-letter amino acids with `Ter` for the stop.
fn hgvs_amino_acids(three_letter: &str) -> String {
    three_letter.replace("Stop", "Ter")
}
