//! Genes and providers shared by the integration tests

#![allow(dead_code)]

use ferro_annotate::model::{Exon, Gene, Strand, Transcript};
use ferro_annotate::so::rules::reverse_complement;
use ferro_annotate::{MockProvider, Variant};

/// Stop-free filler sequence.
pub fn filler(len: usize) -> String {
    "GCA".chars().cycle().take(len).collect()
}

/// Plus-strand exon sequence of [`plus_gene`], position 50 at index 0.
pub fn plus_sequence() -> String {
    format!("{}ATG{}TAA{}", filler(50), "GCA".repeat(98), "C")
}

/// Single-exon coding gene on the plus strand.
///
/// Transcript 1:50-400, CDS 1:100-399 (ATG, 98 x GCA, TAA), so codon `n`
/// starts at `100 + 3 * (n - 1)`.
pub fn plus_gene() -> Gene {
    coding_gene(
        "TX_PLUS",
        "1",
        Strand::Plus,
        (50, 400),
        (100, 399),
        plus_sequence(),
    )
}

/// Single-exon coding gene on the minus strand.
///
/// Transcript 2:1000-1350, CDS 2:1001-1300; codon 1 is 2:1298-1300.
pub fn minus_gene() -> Gene {
    let sense = format!("{}ATG{}TAAC", filler(50), "GCA".repeat(98));
    coding_gene(
        "TX_MINUS",
        "2",
        Strand::Minus,
        (1000, 1350),
        (1001, 1300),
        reverse_complement(&sense),
    )
}

fn coding_gene(
    id: &str,
    chromosome: &str,
    strand: Strand,
    (start, end): (i64, i64),
    (coding_start, coding_end): (i64, i64),
    sequence: String,
) -> Gene {
    let utr5 = match strand {
        Strand::Plus => coding_start - start,
        Strand::Minus => end - coding_end,
    };
    let transcript = Transcript {
        id: id.to_string(),
        name: format!("{}-201", id),
        protein_id: Some(id.replace("TX", "PX")),
        chromosome: chromosome.to_string(),
        strand,
        biotype: "protein_coding".to_string(),
        start,
        end,
        genomic_coding_start: coding_start,
        genomic_coding_end: coding_end,
        cdna_coding_start: utr5 + 1,
        cdna_coding_end: utr5 + coding_end - coding_start + 1,
        exons: vec![Exon::new(1, start, end, sequence).with_phase(0)],
        flags: Vec::new(),
    };
    Gene {
        id: id.replace("TX", "G"),
        name: id.replace("TX_", ""),
        chromosome: chromosome.to_string(),
        start,
        end,
        strand,
        biotype: "protein_coding".to_string(),
        transcripts: vec![transcript],
        mirna: None,
    }
}

/// Reference bases of the plus gene at `start..start + len`.
pub fn plus_reference(start: i64, len: usize) -> String {
    let offset = (start - 50) as usize;
    plus_sequence()[offset..offset + len].to_string()
}

/// A provider holding both genes and the plus gene's chromosome sequence.
pub fn provider() -> MockProvider {
    let mut provider = MockProvider::new();
    provider.add_gene(plus_gene());
    provider.add_gene(minus_gene());
    provider.add_chromosome("1", format!("{}{}{}", filler(49), plus_sequence(), filler(600)));
    provider
}

/// SNV on haplotype 2 of phase set `PS1`.
pub fn phased(start: i64, reference: &str, alternate: &str) -> Variant {
    Variant::new("1", start, reference, alternate)
        .with_phase_set("PS1")
        .with_genotype("0|1")
}
