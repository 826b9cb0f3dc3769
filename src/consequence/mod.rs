//! Consequence type calculation
//!
//! One calculator per variant shape. All of them share the same skeleton
//! (see `context`): per transcript, a variant either covers it, overlaps
//! it, or falls in its flanking window; overlapping variants are resolved
//! by walking the exons in transcript order and classifying the coding
//! region.
//!
//! # Example
//!
//! ```
//! use ferro_annotate::consequence::{VariantKind, consequence_types, CalculatorContext,
//!     RegulatoryOverlap};
//! use ferro_annotate::model::Variant;
//! use ferro_annotate::provider::MockProvider;
//!
//! let provider = MockProvider::new();
//! let ctx = CalculatorContext::new(&provider);
//! let variant = Variant::new("1", 100, "A", "T");
//! assert_eq!(VariantKind::of(&variant).unwrap(), VariantKind::Snv);
//!
//! let records = consequence_types(&ctx, &variant, &[], RegulatoryOverlap::default()).unwrap();
//! assert_eq!(records[0].term_names(), vec!["intergenic_variant"]);
//! ```

mod breakend;
mod cnv_gain;
pub(crate) mod context;
mod deletion;
mod insertion;
pub(crate) mod junction;
mod mnv;
mod region;
mod snv;
pub(crate) mod stitch;
pub(crate) mod walk;

pub use breakend::BreakendCalculator;
pub use cnv_gain::CnvGainCalculator;
pub use deletion::DeletionCalculator;
pub use insertion::InsertionCalculator;
pub use mnv::MnvCalculator;
pub use region::GenericRegionCalculator;
pub use snv::SnvCalculator;

use crate::annotator::options::AnnotationOptions;
use crate::error::FerroError;
use crate::model::{ConsequenceType, Gene, Variant, VariantType};
use crate::provider::GenomeSequenceProvider;

/// Regulatory overlap flags computed by the orchestrator for one variant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RegulatoryOverlap {
    pub regulatory_region: bool,
    pub tf_binding_site: bool,
}

/// Knobs read by the calculators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CalculatorOptions {
    /// Widen structural variants to their confidence intervals
    pub imprecise: bool,
    pub sv_extra_padding: i64,
    pub cnv_extra_padding: i64,
    /// Variants spanning more bases than this get no splice-site detail
    pub big_variant_threshold: i64,
}

impl Default for CalculatorOptions {
    fn default() -> Self {
        Self {
            imprecise: true,
            sv_extra_padding: 0,
            cnv_extra_padding: 0,
            big_variant_threshold: 50,
        }
    }
}

impl CalculatorOptions {
    pub fn from_annotation_options(options: &AnnotationOptions, big_variant_threshold: i64) -> Self {
        Self {
            imprecise: options.imprecise,
            sv_extra_padding: options.sv_extra_padding,
            cnv_extra_padding: options.cnv_extra_padding,
            big_variant_threshold,
        }
    }
}

/// Shared, read-only inputs of a calculator run
pub struct CalculatorContext<'a> {
    /// Used to stitch reference bases beyond the transcript ends
    pub genome: &'a dyn GenomeSequenceProvider,
    pub options: CalculatorOptions,
}

impl<'a> CalculatorContext<'a> {
    pub fn new(genome: &'a dyn GenomeSequenceProvider) -> Self {
        Self {
            genome,
            options: CalculatorOptions::default(),
        }
    }

    pub fn with_options(mut self, options: CalculatorOptions) -> Self {
        self.options = options;
        self
    }
}

/// A consequence type calculator for one variant shape.
pub trait ConsequenceCalculator: Send + Sync {
    /// Consequence types of `variant` on every transcript of `genes`, plus
    /// intergenic and regulatory records.
    ///
    /// Never returns a record with an empty SO term list.
    fn run(
        &self,
        ctx: &CalculatorContext<'_>,
        variant: &Variant,
        genes: &[&Gene],
        regulatory: RegulatoryOverlap,
    ) -> Result<Vec<ConsequenceType>, FerroError>;
}

/// Calculator selection by variant shape
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VariantKind {
    Snv,
    Insertion,
    Deletion,
    Mnv,
    CnvGain,
    GenericRegion,
    Breakend,
}

impl VariantKind {
    /// Select the calculator kind for a variant.
    ///
    /// Copy-number variants without a copy number are treated as generic
    /// regions, gains (copy number above 2) use the CNV-gain calculator and
    /// losses use the deletion calculator.
    pub fn of(variant: &Variant) -> Result<Self, FerroError> {
        let kind = match variant.variant_type {
            VariantType::Snv => VariantKind::Snv,
            VariantType::Insertion => VariantKind::Insertion,
            VariantType::Deletion => VariantKind::Deletion,
            VariantType::Mnv => VariantKind::Mnv,
            VariantType::Cnv => match variant.sv.as_ref().and_then(|sv| sv.copy_number) {
                None => VariantKind::GenericRegion,
                Some(copy_number) if copy_number > 2 => VariantKind::CnvGain,
                Some(_) => VariantKind::Deletion,
            },
            VariantType::Duplication => VariantKind::CnvGain,
            VariantType::Inversion => VariantKind::GenericRegion,
            VariantType::Breakend => VariantKind::Breakend,
            other => {
                return Err(FerroError::UnsupportedVariantFormat {
                    variant_type: other.to_string(),
                })
            }
        };
        Ok(kind)
    }

    /// The calculator implementing this kind.
    pub fn calculator(self) -> &'static dyn ConsequenceCalculator {
        match self {
            VariantKind::Snv => &SnvCalculator,
            VariantKind::Insertion => &InsertionCalculator,
            VariantKind::Deletion => &DeletionCalculator,
            VariantKind::Mnv => &MnvCalculator,
            VariantKind::CnvGain => &CnvGainCalculator,
            VariantKind::GenericRegion => &GenericRegionCalculator,
            VariantKind::Breakend => &BreakendCalculator,
        }
    }
}

/// Select the calculator for `variant` and run it.
pub fn consequence_types(
    ctx: &CalculatorContext<'_>,
    variant: &Variant,
    genes: &[&Gene],
    regulatory: RegulatoryOverlap,
) -> Result<Vec<ConsequenceType>, FerroError> {
    VariantKind::of(variant)?
        .calculator()
        .run(ctx, variant, genes, regulatory)
}
