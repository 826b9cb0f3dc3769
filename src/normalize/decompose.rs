//! MNV decomposition
//!
//! Each MNV is split into one SNV per differing base. The SNVs share a call
//! id (`chr:pos:ref:alt:0` unless the input already carries one) which the
//! annotator uses to regroup them, and which also stands as their phase set:
//! bases of one call are on the same chromosome copy by construction.

use crate::model::{Variant, VariantType};

/// A batch after decomposition
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Decomposed {
    pub variants: Vec<Variant>,
    /// Index of the input variant each decomposed variant comes from
    pub origins: Vec<usize>,
}

impl Decomposed {
    /// A batch passed through unchanged.
    pub fn identity(variants: &[Variant]) -> Self {
        Self {
            variants: variants.to_vec(),
            origins: (0..variants.len()).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.variants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.variants.is_empty()
    }

    /// Whether any input variant was split.
    pub fn is_split(&self) -> bool {
        self.origins.windows(2).any(|pair| pair[0] == pair[1])
    }

    /// Positions in the decomposed batch of the variants of input `origin`.
    pub fn members(&self, origin: usize) -> impl Iterator<Item = usize> + '_ {
        self.origins
            .iter()
            .enumerate()
            .filter(move |(_, o)| **o == origin)
            .map(|(index, _)| index)
    }
}

/// Call id of a variant split from `variant`.
pub fn call_id(variant: &Variant) -> String {
    variant
        .call_id
        .clone()
        .filter(|id| !id.trim().is_empty())
        .unwrap_or_else(|| format!("{}:0", variant.key()))
}

/// Split every MNV of the batch into SNVs, keeping input order.
pub fn decompose(variants: &[Variant]) -> Decomposed {
    let mut decomposed = Decomposed::default();
    for (origin, variant) in variants.iter().enumerate() {
        if variant.variant_type != VariantType::Mnv || variant.is_symbolic() {
            decomposed.variants.push(variant.clone());
            decomposed.origins.push(origin);
            continue;
        }
        let call = call_id(variant);
        let pairs = variant.reference.chars().zip(variant.alternate.chars());
        for (offset, (reference, alternate)) in pairs.enumerate() {
            if reference.eq_ignore_ascii_case(&alternate) {
                continue;
            }
            let mut snv = Variant::new(
                variant.chromosome.clone(),
                variant.start + offset as i64,
                reference.to_string(),
                alternate.to_string(),
            );
            snv.id = variant.id.clone();
            snv.phase_set = Some(call.clone());
            snv.call_id = Some(call.clone());
            decomposed.variants.push(snv);
            decomposed.origins.push(origin);
        }
    }
    decomposed
}
