// Copyright (c) 2024-2025 Fulcrum Genomics LLC
// SPDX-License-Identifier: MIT

//! ferro-annotate: variant consequence annotation
//!
//! Part of the ferro bioinformatics toolkit.
//!
//! Computes Sequence Ontology consequence types of genomic variants on the
//! transcripts they touch, corrects codon-level terms for phased SNVs that
//! share a codon, and gathers auxiliary annotation (population frequencies,
//! conservation, functional scores, clinical associations, repeats and
//! cytobands) from pluggable providers.
//!
//! # Example
//!
//! ```
//! use ferro_annotate::model::{Exon, Gene, Strand, Transcript};
//! use ferro_annotate::{AnnotationOptions, MockProvider, Variant, VariantAnnotator};
//!
//! // a single-exon gene whose coding sequence is ATG GCA TAA
//! let transcript = Transcript {
//!     id: "ENST01".to_string(),
//!     chromosome: "1".to_string(),
//!     strand: Strand::Plus,
//!     biotype: "protein_coding".to_string(),
//!     start: 1,
//!     end: 9,
//!     genomic_coding_start: 1,
//!     genomic_coding_end: 9,
//!     cdna_coding_start: 1,
//!     cdna_coding_end: 9,
//!     exons: vec![Exon::new(1, 1, 9, "ATGGCATAA").with_phase(0)],
//!     ..Default::default()
//! };
//! let mut provider = MockProvider::new();
//! provider.add_gene(Gene {
//!     id: "ENSG01".to_string(),
//!     name: "GENE1".to_string(),
//!     chromosome: "1".to_string(),
//!     start: 1,
//!     end: 9,
//!     strand: Strand::Plus,
//!     biotype: "protein_coding".to_string(),
//!     transcripts: vec![transcript],
//!     ..Default::default()
//! });
//!
//! let annotator = VariantAnnotator::new(provider).unwrap();
//! let annotations = annotator
//!     .annotate(&[Variant::new("1", 5, "C", "T")], &AnnotationOptions::default())
//!     .unwrap();
//! assert_eq!(annotations[0].display_consequence_type.as_deref(), Some("missense_variant"));
//! ```

pub mod annotator;
pub mod config;
pub mod consequence;
pub mod error;
pub mod hgvs;
pub mod model;
pub mod normalize;
pub mod phasing;
pub mod provider;
pub mod so;

// Re-export commonly used types
pub use annotator::{AnnotationOptions, Annotator, VariantAnnotator};
pub use config::AnnotatorConfig;
pub use consequence::{consequence_types, ConsequenceCalculator, VariantKind};
pub use error::{ErrorCode, FerroError};
pub use model::{ConsequenceType, Gene, Region, Transcript, Variant, VariantAnnotation, VariantType};
pub use phasing::PhasingCorrector;
pub use provider::{AnnotationBackend, MockProvider};
pub use so::Consequence;

/// Result type alias for ferro-annotate operations
pub type Result<T> = std::result::Result<T, FerroError>;
