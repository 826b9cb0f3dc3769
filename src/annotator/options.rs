//! Annotation options
//!
//! Options arrive as a string map (`normalize=true`, `exclude=repeats,cytoband`)
//! and are parsed once per `annotate` call into [`AnnotationOptions`].

use std::collections::{BTreeSet, HashMap};
use std::fmt;

use crate::error::FerroError;

/// An annotation source that can be switched on or off per call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Annotator {
    Variation,
    TraitAssociation,
    Conservation,
    FunctionalScore,
    ConsequenceType,
    PopulationFrequencies,
    Repeats,
    Cytoband,
    Hgvs,
}

impl Annotator {
    pub const ALL: [Annotator; 9] = [
        Annotator::Variation,
        Annotator::TraitAssociation,
        Annotator::Conservation,
        Annotator::FunctionalScore,
        Annotator::ConsequenceType,
        Annotator::PopulationFrequencies,
        Annotator::Repeats,
        Annotator::Cytoband,
        Annotator::Hgvs,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Annotator::Variation => "variation",
            Annotator::TraitAssociation => "traitAssociation",
            Annotator::Conservation => "conservation",
            Annotator::FunctionalScore => "functionalScore",
            Annotator::ConsequenceType => "consequenceType",
            Annotator::PopulationFrequencies => "populationFrequencies",
            Annotator::Repeats => "repeats",
            Annotator::Cytoband => "cytoband",
            Annotator::Hgvs => "hgvs",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|a| a.name() == name)
    }
}

impl fmt::Display for Annotator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Parsed per-call annotation options
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnnotationOptions {
    /// Trim and left-align alleles before annotating
    pub normalize: bool,
    /// Split MNVs into SNVs sharing a call id
    pub decompose: bool,
    /// Apply the phasing correction to SNVs
    pub phased: bool,
    /// Treat structural variant bounds as confidence intervals
    pub imprecise: bool,
    pub sv_extra_padding: i64,
    pub cnv_extra_padding: i64,
    pub check_amino_acid_change: bool,
    /// Annotators that run for this call
    pub annotators: BTreeSet<Annotator>,
}

impl Default for AnnotationOptions {
    fn default() -> Self {
        Self {
            normalize: false,
            decompose: true,
            phased: true,
            imprecise: true,
            sv_extra_padding: 0,
            cnv_extra_padding: 0,
            check_amino_acid_change: false,
            annotators: Annotator::ALL.iter().copied().collect(),
        }
    }
}

impl AnnotationOptions {
    /// Parse an option map; unknown keys are ignored.
    pub fn from_map(map: &HashMap<String, String>) -> Result<Self, FerroError> {
        let mut options = Self::default();
        for (key, value) in map {
            match key.as_str() {
                "normalize" => options.normalize = parse_bool(key, value)?,
                "skipDecompose" => options.decompose = !parse_bool(key, value)?,
                "phased" => options.phased = parse_bool(key, value)?,
                "imprecise" => options.imprecise = parse_bool(key, value)?,
                "svExtraPadding" => options.sv_extra_padding = parse_int(key, value)?,
                "cnvExtraPadding" => options.cnv_extra_padding = parse_int(key, value)?,
                "checkAminoAcidChange" => {
                    options.check_amino_acid_change = parse_bool(key, value)?
                }
                "ignorePhase" | "include" | "exclude" => {}
                other => log::debug!("Ignoring unrecognized annotation option '{}'", other),
            }
        }

        // ignorePhase, when given, decides phasing on its own
        if let Some(value) = map.get("ignorePhase") {
            options.phased = !parse_bool("ignorePhase", value)?;
        }

        if let Some(include) = map.get("include").filter(|v| !v.trim().is_empty()) {
            options.annotators = parse_annotators(include);
        } else if let Some(exclude) = map.get("exclude") {
            for annotator in parse_annotators(exclude) {
                options.annotators.remove(&annotator);
            }
        }
        Ok(options)
    }

    pub fn runs(&self, annotator: Annotator) -> bool {
        self.annotators.contains(&annotator)
    }

    /// Builder: replace the annotator set.
    pub fn with_annotators(mut self, annotators: &[Annotator]) -> Self {
        self.annotators = annotators.iter().copied().collect();
        self
    }

    pub fn with_phased(mut self, phased: bool) -> Self {
        self.phased = phased;
        self
    }

    pub fn with_decompose(mut self, decompose: bool) -> Self {
        self.decompose = decompose;
        self
    }

    pub fn with_normalize(mut self, normalize: bool) -> Self {
        self.normalize = normalize;
        self
    }
}

fn parse_bool(key: &str, value: &str) -> Result<bool, FerroError> {
    value
        .trim()
        .to_ascii_lowercase()
        .parse::<bool>()
        .map_err(|_| FerroError::InvalidOption {
            key: key.to_string(),
            msg: format!("expected true or false, got '{}'", value),
        })
}

fn parse_int(key: &str, value: &str) -> Result<i64, FerroError> {
    value
        .trim()
        .parse::<i64>()
        .map_err(|_| FerroError::InvalidOption {
            key: key.to_string(),
            msg: format!("expected an integer, got '{}'", value),
        })
}

fn parse_annotators(list: &str) -> BTreeSet<Annotator> {
    list.split(',')
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .filter_map(|name| {
            let annotator = Annotator::from_name(name);
            if annotator.is_none() {
                log::debug!("Ignoring unknown annotator '{}'", name);
            }
            annotator
        })
        .collect()
}
