//! Variant and region models
//!
//! Coordinates are 1-based inclusive. An insertion sits between `end` and
//! `start`, so `end == start - 1` and the inserted bases follow position
//! `start - 1` on the reference.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A genomic region (1-based, inclusive)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Region {
    pub chromosome: String,
    pub start: i64,
    pub end: i64,
}

impl Region {
    pub fn new(chromosome: impl Into<String>, start: i64, end: i64) -> Self {
        Self {
            chromosome: chromosome.into(),
            start,
            end,
        }
    }

    /// Number of bases in the region.
    pub fn len(&self) -> i64 {
        (self.end - self.start + 1).max(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn overlaps(&self, other: &Region) -> bool {
        self.chromosome == other.chromosome && other.start <= self.end && other.end >= self.start
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}-{}", self.chromosome, self.start, self.end)
    }
}

/// Variant shape
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VariantType {
    #[serde(rename = "SNV")]
    Snv,
    Insertion,
    Deletion,
    #[serde(rename = "MNV")]
    Mnv,
    #[serde(rename = "CNV")]
    Cnv,
    Duplication,
    Inversion,
    Breakend,
    /// Unequal-length substitution that was not reduced to an insertion or deletion
    Indel,
    /// Symbolic allele without a more specific type
    Symbolic,
    NoVariation,
}

impl fmt::Display for VariantType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            VariantType::Snv => "SNV",
            VariantType::Insertion => "INSERTION",
            VariantType::Deletion => "DELETION",
            VariantType::Mnv => "MNV",
            VariantType::Cnv => "CNV",
            VariantType::Duplication => "DUPLICATION",
            VariantType::Inversion => "INVERSION",
            VariantType::Breakend => "BREAKEND",
            VariantType::Indel => "INDEL",
            VariantType::Symbolic => "SYMBOLIC",
            VariantType::NoVariation => "NO_VARIATION",
        };
        write!(f, "{}", name)
    }
}

/// The mate of a breakend
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BreakendMate {
    pub chromosome: String,
    pub position: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ci_position_left: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ci_position_right: Option<i64>,
}

/// Structural variant detail
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct StructuralVariation {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ci_start_left: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ci_start_right: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ci_end_left: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ci_end_right: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub copy_number: Option<i32>,
    /// Inserted sequence known at the left side of a symbolic insertion
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub left_sv_ins_seq: Option<String>,
    /// Inserted sequence known at the right side of a symbolic insertion
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub right_sv_ins_seq: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub breakend: Option<BreakendMate>,
}

impl StructuralVariation {
    /// Confidence interval around the start, falling back to `start` itself.
    pub fn ci_start(&self, start: i64) -> (i64, i64) {
        (
            self.ci_start_left.unwrap_or(start),
            self.ci_start_right.unwrap_or(start),
        )
    }

    /// Confidence interval around the end, falling back to `end` itself.
    pub fn ci_end(&self, end: i64) -> (i64, i64) {
        (
            self.ci_end_left.unwrap_or(end),
            self.ci_end_right.unwrap_or(end),
        )
    }
}

/// A genomic variant
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Variant {
    pub chromosome: String,
    pub start: i64,
    pub end: i64,
    /// Reference allele, empty for insertions
    pub reference: String,
    /// Alternate allele, empty for deletions; may be symbolic (`<DEL>`)
    pub alternate: String,
    #[serde(rename = "type")]
    pub variant_type: VariantType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sv: Option<StructuralVariation>,
    /// Phase set identifier (VCF `PS`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phase_set: Option<String>,
    /// Raw genotype string (VCF `GT`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub genotype: Option<String>,
    /// Identity of the original call this variant was decomposed from
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub call_id: Option<String>,
}

impl Variant {
    /// Create a variant from alleles, inferring type and end.
    ///
    /// `-` is accepted as an empty allele. Symbolic alleles (`<DEL>`, `<DUP>`,
    /// `<INV>`, `<CNV>`, `<INS>`) and breakend notation map to their structural
    /// types with `end == start`; use [`Variant::with_end`] to set their span.
    pub fn new(
        chromosome: impl Into<String>,
        start: i64,
        reference: impl Into<String>,
        alternate: impl Into<String>,
    ) -> Self {
        let reference = empty_dash(reference.into());
        let alternate = empty_dash(alternate.into());
        let variant_type = infer_type(&reference, &alternate);
        let end = match variant_type {
            VariantType::Insertion => start - 1,
            VariantType::Deletion | VariantType::Mnv | VariantType::Indel => {
                start + reference.len() as i64 - 1
            }
            _ => start + (reference.len() as i64 - 1).max(0),
        };
        Self {
            chromosome: chromosome.into(),
            start,
            end,
            reference,
            alternate,
            variant_type,
            id: None,
            sv: None,
            phase_set: None,
            genotype: None,
            call_id: None,
        }
    }

    pub fn with_end(mut self, end: i64) -> Self {
        self.end = end;
        self
    }

    pub fn with_type(mut self, variant_type: VariantType) -> Self {
        self.variant_type = variant_type;
        self
    }

    pub fn with_sv(mut self, sv: StructuralVariation) -> Self {
        self.sv = Some(sv);
        self
    }

    pub fn with_phase_set(mut self, phase_set: impl Into<String>) -> Self {
        self.phase_set = Some(phase_set.into());
        self
    }

    pub fn with_genotype(mut self, genotype: impl Into<String>) -> Self {
        self.genotype = Some(genotype.into());
        self
    }

    pub fn with_call_id(mut self, call_id: impl Into<String>) -> Self {
        self.call_id = Some(call_id.into());
        self
    }

    /// Whether the alternate allele is symbolic.
    pub fn is_symbolic(&self) -> bool {
        self.alternate.starts_with('<') && self.alternate.ends_with('>')
    }

    /// Whether the variant is a structural variant (symbolic or SV-typed).
    pub fn is_structural(&self) -> bool {
        matches!(
            self.variant_type,
            VariantType::Cnv
                | VariantType::Duplication
                | VariantType::Inversion
                | VariantType::Breakend
                | VariantType::Symbolic
        ) || self.is_symbolic()
    }

    /// Whether the genotype carries at least one non-reference allele.
    ///
    /// Unknown genotypes count as non-reference.
    pub fn is_non_reference_genotype(&self) -> bool {
        match &self.genotype {
            None => true,
            Some(gt) => gt
                .split(['/', '|'])
                .any(|allele| allele != "0" && allele != "."),
        }
    }

    /// Whether the genotype is phased (`0|1`).
    pub fn is_phased_genotype(&self) -> bool {
        self.genotype.as_deref().is_some_and(|gt| gt.contains('|'))
    }

    /// The `chr:pos:ref:alt` key used in logs and call ids.
    pub fn key(&self) -> String {
        format!(
            "{}:{}:{}:{}",
            self.chromosome,
            self.start,
            dash_empty(&self.reference),
            dash_empty(&self.alternate)
        )
    }
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.key())
    }
}

fn empty_dash(allele: String) -> String {
    if allele == "-" {
        String::new()
    } else {
        allele
    }
}

fn dash_empty(allele: &str) -> &str {
    if allele.is_empty() {
        "-"
    } else {
        allele
    }
}

fn infer_type(reference: &str, alternate: &str) -> VariantType {
    if alternate.starts_with('<') && alternate.ends_with('>') {
        return match &alternate[1..alternate.len() - 1] {
            s if s.starts_with("DEL") => VariantType::Deletion,
            s if s.starts_with("DUP") => VariantType::Duplication,
            s if s.starts_with("INV") => VariantType::Inversion,
            s if s.starts_with("CN") => VariantType::Cnv,
            s if s.starts_with("INS") => VariantType::Insertion,
            _ => VariantType::Symbolic,
        };
    }
    if alternate.contains('[') || alternate.contains(']') {
        return VariantType::Breakend;
    }
    match (reference.len(), alternate.len()) {
        (0, 0) => VariantType::NoVariation,
        (1, 1) => VariantType::Snv,
        (0, _) => VariantType::Insertion,
        (_, 0) => VariantType::Deletion,
        (r, a) if r == a => VariantType::Mnv,
        _ => VariantType::Indel,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_infer_types() {
        assert_eq!(Variant::new("1", 10, "A", "T").variant_type, VariantType::Snv);
        assert_eq!(Variant::new("1", 10, "", "TT").variant_type, VariantType::Insertion);
        assert_eq!(Variant::new("1", 10, "-", "TT").variant_type, VariantType::Insertion);
        assert_eq!(Variant::new("1", 10, "AC", "").variant_type, VariantType::Deletion);
        assert_eq!(Variant::new("1", 10, "AC", "GT").variant_type, VariantType::Mnv);
        assert_eq!(Variant::new("1", 10, "AC", "G").variant_type, VariantType::Indel);
        assert_eq!(Variant::new("1", 10, "N", "<DUP>").variant_type, VariantType::Duplication);
        assert_eq!(Variant::new("1", 10, "N", "<CN3>").variant_type, VariantType::Cnv);
        assert_eq!(Variant::new("1", 10, "A", "A]2:300]").variant_type, VariantType::Breakend);
    }

    #[test]
    fn test_end_coordinates() {
        assert_eq!(Variant::new("1", 10, "A", "T").end, 10);
        assert_eq!(Variant::new("1", 10, "", "TT").end, 9);
        assert_eq!(Variant::new("1", 10, "ACG", "").end, 12);
        assert_eq!(Variant::new("1", 10, "AC", "GT").end, 11);
    }

    #[test]
    fn test_genotype_helpers() {
        let v = Variant::new("1", 10, "A", "T").with_genotype("0|1");
        assert!(v.is_phased_genotype());
        assert!(v.is_non_reference_genotype());
        let v = Variant::new("1", 10, "A", "T").with_genotype("0/0");
        assert!(!v.is_phased_genotype());
        assert!(!v.is_non_reference_genotype());
    }

    #[test]
    fn test_key_and_region() {
        let v = Variant::new("1", 10, "", "TT");
        assert_eq!(v.key(), "1:10:-:TT");
        let r = Region::new("1", 10, 19);
        assert_eq!(r.to_string(), "1:10-19");
        assert_eq!(r.len(), 10);
        assert!(r.overlaps(&Region::new("1", 19, 30)));
        assert!(!r.overlaps(&Region::new("2", 10, 19)));
    }

    #[test]
    fn test_variant_type_serde() {
        assert_eq!(serde_json::to_string(&VariantType::Snv).unwrap(), "\"SNV\"");
        assert_eq!(
            serde_json::to_string(&VariantType::NoVariation).unwrap(),
            "\"NO_VARIATION\""
        );
        let t: VariantType = serde_json::from_str("\"DUPLICATION\"").unwrap();
        assert_eq!(t, VariantType::Duplication);
    }
}
