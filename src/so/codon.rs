//! Genetic codes and codon tables.
//!
//! Two codes are supported: the standard nuclear code and the vertebrate
//! mitochondrial code (NCBI table 2), selected by chromosome name.

use std::collections::HashMap;
use std::sync::OnceLock;

/// A single nucleotide base.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Base {
    A,
    T,
    G,
    C,
}

impl Base {
    /// Parse a base from a character.
    pub fn from_char(c: char) -> Option<Self> {
        match c.to_ascii_uppercase() {
            'A' => Some(Base::A),
            'T' | 'U' => Some(Base::T), // U is treated as T
            'G' => Some(Base::G),
            'C' => Some(Base::C),
            _ => None,
        }
    }

    /// Convert to character.
    pub fn to_char(self) -> char {
        match self {
            Base::A => 'A',
            Base::T => 'T',
            Base::G => 'G',
            Base::C => 'C',
        }
    }

    /// Watson-Crick complement.
    pub fn complement(self) -> Self {
        match self {
            Base::A => Base::T,
            Base::T => Base::A,
            Base::G => Base::C,
            Base::C => Base::G,
        }
    }
}

impl std::fmt::Display for Base {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_char())
    }
}

/// A codon (three nucleotides).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Codon([Base; 3]);

impl Codon {
    /// Create a new codon from three bases.
    pub fn new(b1: Base, b2: Base, b3: Base) -> Self {
        Self([b1, b2, b3])
    }

    /// Parse a codon from a string, case-insensitively.
    pub fn parse(s: &str) -> Option<Self> {
        let mut chars = s.chars();
        let b1 = Base::from_char(chars.next()?)?;
        let b2 = Base::from_char(chars.next()?)?;
        let b3 = Base::from_char(chars.next()?)?;
        if chars.next().is_some() {
            return None;
        }
        Some(Self([b1, b2, b3]))
    }

    /// Get the three bases.
    pub fn bases(&self) -> &[Base; 3] {
        &self.0
    }
}

impl std::fmt::Display for Codon {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}{}{}", self.0[0], self.0[1], self.0[2])
    }
}

/// Amino acid, including the terminator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AminoAcid {
    Ala,
    Arg,
    Asn,
    Asp,
    Cys,
    Gln,
    Glu,
    Gly,
    His,
    Ile,
    Leu,
    Lys,
    Met,
    Phe,
    Pro,
    Ser,
    Thr,
    Trp,
    Tyr,
    Val,
    /// Translation terminator.
    Stop,
}

impl AminoAcid {
    /// Three-letter code, `Stop` for the terminator.
    pub fn three_letter(&self) -> &'static str {
        match self {
            AminoAcid::Ala => "Ala",
            AminoAcid::Arg => "Arg",
            AminoAcid::Asn => "Asn",
            AminoAcid::Asp => "Asp",
            AminoAcid::Cys => "Cys",
            AminoAcid::Gln => "Gln",
            AminoAcid::Glu => "Glu",
            AminoAcid::Gly => "Gly",
            AminoAcid::His => "His",
            AminoAcid::Ile => "Ile",
            AminoAcid::Leu => "Leu",
            AminoAcid::Lys => "Lys",
            AminoAcid::Met => "Met",
            AminoAcid::Phe => "Phe",
            AminoAcid::Pro => "Pro",
            AminoAcid::Ser => "Ser",
            AminoAcid::Thr => "Thr",
            AminoAcid::Trp => "Trp",
            AminoAcid::Tyr => "Tyr",
            AminoAcid::Val => "Val",
            AminoAcid::Stop => "Stop",
        }
    }

    /// Code used in HGVS protein notation (`Ter` for the terminator).
    pub fn hgvs_code(&self) -> &'static str {
        match self {
            AminoAcid::Stop => "Ter",
            other => other.three_letter(),
        }
    }
}

impl std::fmt::Display for AminoAcid {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.three_letter())
    }
}

/// Genetic code in use for a chromosome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GeneticCode {
    /// Standard nuclear code (NCBI table 1).
    Standard,
    /// Vertebrate mitochondrial code (NCBI table 2).
    VertebrateMitochondrial,
}

impl GeneticCode {
    /// Select the code for a chromosome name.
    pub fn for_chromosome(chromosome: &str) -> Self {
        match chromosome {
            "MT" | "M" | "chrM" | "chrMT" => GeneticCode::VertebrateMitochondrial,
            _ => GeneticCode::Standard,
        }
    }

    /// The codon table implementing this code.
    pub fn table(self) -> &'static CodonTable {
        static STANDARD: OnceLock<CodonTable> = OnceLock::new();
        static MITOCHONDRIAL: OnceLock<CodonTable> = OnceLock::new();
        match self {
            GeneticCode::Standard => STANDARD.get_or_init(CodonTable::standard),
            GeneticCode::VertebrateMitochondrial => {
                MITOCHONDRIAL.get_or_init(CodonTable::mitochondrial)
            }
        }
    }
}

// Codons in TCAG order; each letter is the one-letter amino acid, '*' a stop.
const CODON_ORDER: &str = "TCAG";
const STANDARD_CODE: &str = "FFLLSSSSYY**CC*WLLLLPPPPHHQQRRRRIIIMTTTTNNKKSSRRVVVVAAAADDEEGGGG";
const MITOCHONDRIAL_CODE: &str = "FFLLSSSSYY**CCWWLLLLPPPPHHQQRRRRIIMMTTTTNNKKSS**VVVVAAAADDEEGGGG";

/// Genetic code table.
#[derive(Debug, Clone)]
pub struct CodonTable {
    code: GeneticCode,
    /// Codon to amino acid mapping (stops included as `AminoAcid::Stop`).
    codon_to_aa: HashMap<Codon, AminoAcid>,
    /// Start codon(s).
    start_codons: Vec<Codon>,
}

impl CodonTable {
    /// Create the standard genetic code.
    pub fn standard() -> Self {
        Self::build(GeneticCode::Standard, STANDARD_CODE, &["ATG"])
    }

    /// Create the vertebrate mitochondrial genetic code.
    pub fn mitochondrial() -> Self {
        Self::build(
            GeneticCode::VertebrateMitochondrial,
            MITOCHONDRIAL_CODE,
            &["ATT", "ATC", "ATA", "ATG", "GTG"],
        )
    }

    fn build(code: GeneticCode, letters: &str, starts: &[&str]) -> Self {
        let bases: Vec<char> = CODON_ORDER.chars().collect();
        let mut codon_to_aa = HashMap::with_capacity(64);
        let mut index = 0;
        let letters: Vec<char> = letters.chars().collect();
        for b1 in &bases {
            for b2 in &bases {
                for b3 in &bases {
                    let codon = [*b1, *b2, *b3].iter().collect::<String>();
                    if let (Some(codon), Some(aa)) = (
                        Codon::parse(&codon),
                        letters.get(index).and_then(|c| amino_acid_from_letter(*c)),
                    ) {
                        codon_to_aa.insert(codon, aa);
                    }
                    index += 1;
                }
            }
        }

        Self {
            code,
            codon_to_aa,
            start_codons: starts.iter().filter_map(|s| Codon::parse(s)).collect(),
        }
    }

    /// The genetic code of this table.
    pub fn code(&self) -> GeneticCode {
        self.code
    }

    /// Get the amino acid encoded by a codon.
    pub fn amino_acid_for(&self, codon: &Codon) -> Option<AminoAcid> {
        self.codon_to_aa.get(codon).copied()
    }

    /// Translate a three-letter codon string; `None` for ambiguous bases.
    pub fn translate(&self, codon: &str) -> Option<AminoAcid> {
        Codon::parse(codon).and_then(|c| self.amino_acid_for(&c))
    }

    /// Check if a codon string is a stop codon.
    pub fn is_stop(&self, codon: &str) -> bool {
        self.translate(codon) == Some(AminoAcid::Stop)
    }

    /// Check if a codon string is a start codon.
    pub fn is_start(&self, codon: &str) -> bool {
        Codon::parse(codon).is_some_and(|c| self.start_codons.contains(&c))
    }

    /// Whether two codons encode the same amino acid.
    ///
    /// `None` when either codon cannot be translated.
    pub fn is_synonymous(&self, reference: &str, alternate: &str) -> Option<bool> {
        Some(self.translate(reference)? == self.translate(alternate)?)
    }

    /// Get all start codons.
    pub fn start_codons(&self) -> &[Codon] {
        &self.start_codons
    }
}

fn amino_acid_from_letter(letter: char) -> Option<AminoAcid> {
    let aa = match letter {
        'A' => AminoAcid::Ala,
        'R' => AminoAcid::Arg,
        'N' => AminoAcid::Asn,
        'D' => AminoAcid::Asp,
        'C' => AminoAcid::Cys,
        'Q' => AminoAcid::Gln,
        'E' => AminoAcid::Glu,
        'G' => AminoAcid::Gly,
        'H' => AminoAcid::His,
        'I' => AminoAcid::Ile,
        'L' => AminoAcid::Leu,
        'K' => AminoAcid::Lys,
        'M' => AminoAcid::Met,
        'F' => AminoAcid::Phe,
        'P' => AminoAcid::Pro,
        'S' => AminoAcid::Ser,
        'T' => AminoAcid::Thr,
        'W' => AminoAcid::Trp,
        'Y' => AminoAcid::Tyr,
        'V' => AminoAcid::Val,
        '*' => AminoAcid::Stop,
        _ => return None,
    };
    Some(aa)
}
