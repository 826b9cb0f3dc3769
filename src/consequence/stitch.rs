//! Transcript-sense reference lookup by cDNA position
//!
//! Codons near the transcript ends may need bases outside the annotated
//! exons (a deletion running into the 3' flank, a start codon shifted by an
//! unconfirmed CDS start). Those bases are read from the genome, on the
//! transcript strand.

use log::debug;

use super::context::TranscriptState;
use crate::error::FerroError;
use crate::model::{Region, Strand, Transcript};
use crate::provider::GenomeSequenceProvider;
use crate::so::rules::complement;

/// Spliced transcript sequence with genomic fallback past its ends
pub(crate) struct TranscriptSequence<'a> {
    transcript: &'a Transcript,
    chromosome: &'a str,
    genome: &'a dyn GenomeSequenceProvider,
    spliced: Option<Vec<u8>>,
}

impl<'a> TranscriptSequence<'a> {
    pub fn new(state: &TranscriptState<'a>) -> Self {
        let transcript = state.transcript;
        let spliced = transcript.spliced_sequence().to_ascii_uppercase();
        // exon sequences that disagree with the exon coordinates cannot be indexed
        let spliced = (!spliced.is_empty() && spliced.len() as i64 == transcript.cdna_length())
            .then(|| spliced.into_bytes());
        Self {
            transcript,
            chromosome: state.chromosome,
            genome: state.ctx.genome,
            spliced,
        }
    }

    /// Length of the spliced sequence, `0` when unavailable.
    pub fn len(&self) -> i64 {
        self.spliced.as_ref().map_or(0, |s| s.len() as i64)
    }

    pub fn is_available(&self) -> bool {
        self.spliced.is_some()
    }

    /// Base at a cDNA position, reading the genome outside the transcript.
    pub fn base(&self, cdna: i64) -> Result<Option<char>, FerroError> {
        let spliced = match &self.spliced {
            Some(spliced) => spliced,
            None => return Ok(None),
        };
        let len = spliced.len() as i64;
        if (1..=len).contains(&cdna) {
            return Ok(Some(spliced[(cdna - 1) as usize] as char));
        }
        let t = self.transcript;
        let genomic = match (t.strand, cdna > len) {
            (Strand::Plus, true) => t.end + (cdna - len),
            (Strand::Minus, true) => t.start - (cdna - len),
            (Strand::Plus, false) => t.start - (1 - cdna),
            (Strand::Minus, false) => t.end + (1 - cdna),
        };
        if genomic < 1 {
            return Ok(None);
        }
        let region = Region::new(self.chromosome, genomic, genomic);
        match self.genome.get_sequence(&region) {
            Ok(sequence) => Ok(sequence.chars().next().map(|nt| {
                let nt = nt.to_ascii_uppercase();
                match t.strand {
                    Strand::Plus => nt,
                    Strand::Minus => complement(nt),
                }
            })),
            Err(FerroError::GenomicReferenceNotAvailable { .. }) => {
                debug!("No reference base at {} for transcript {}", region, t.id);
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    /// Three bases starting at a cDNA position.
    pub fn codon(&self, cdna: i64) -> Result<Option<String>, FerroError> {
        self.bases(cdna, 3)
    }

    /// `count` bases starting at a cDNA position, `None` if any is missing.
    pub fn bases(&self, cdna: i64, count: i64) -> Result<Option<String>, FerroError> {
        let mut out = String::with_capacity(count.max(0) as usize);
        for position in cdna..cdna + count {
            match self.base(position)? {
                Some(nt) => out.push(nt),
                None => return Ok(None),
            }
        }
        Ok(Some(out))
    }
}
