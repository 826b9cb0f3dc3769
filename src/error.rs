//! Error types for ferro-annotate
//!
//! Errors fall into two groups:
//! - per-variant errors (unsupported variant shape, malformed structural
//!   payload, missing reference data) that the annotator isolates to the
//!   variant that raised them
//! - batch errors (provider failures, invalid options) that abort the
//!   whole `annotate` call

use std::fmt;
use thiserror::Error;

/// Error codes for categorizing errors
///
/// These codes can be used for programmatic error handling
/// and for documentation lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u16)]
pub enum ErrorCode {
    // Variant errors (E1xxx)
    /// Variant type has no consequence calculator
    UnsupportedVariantFormat = 1001,
    /// Structural variant payload is incomplete
    MalformedVariant = 1002,
    /// Invalid coordinate range
    InvalidRange = 1003,

    // Reference errors (E2xxx)
    /// Genomic sequence not available
    SequenceNotFound = 2001,

    // Provider errors (E3xxx)
    /// Auxiliary annotation provider failed
    ProviderFailure = 3001,

    // Option/config errors (E4xxx)
    /// Option value could not be parsed
    InvalidOption = 4001,
    /// Configuration file could not be parsed
    InvalidConfig = 4002,

    // IO errors (E9xxx)
    /// File IO error
    IoError = 9001,
    /// JSON parsing error
    JsonError = 9002,
}

impl ErrorCode {
    /// Get the error code as a string (e.g., "E1001")
    pub fn as_str(&self) -> String {
        format!("E{:04}", *self as u16)
    }

    /// Get a brief description of this error code
    pub fn description(&self) -> &'static str {
        match self {
            ErrorCode::UnsupportedVariantFormat => "unsupported variant format",
            ErrorCode::MalformedVariant => "malformed variant",
            ErrorCode::InvalidRange => "invalid coordinate range",
            ErrorCode::SequenceNotFound => "sequence not available",
            ErrorCode::ProviderFailure => "annotation provider failure",
            ErrorCode::InvalidOption => "invalid annotation option",
            ErrorCode::InvalidConfig => "invalid configuration file",
            ErrorCode::IoError => "file I/O error",
            ErrorCode::JsonError => "JSON parsing error",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Main error type for ferro-annotate operations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FerroError {
    /// No consequence calculator exists for this variant type
    #[error("Unsupported variant format: {variant_type}")]
    UnsupportedVariantFormat { variant_type: String },

    /// Structural variant payload lacks required data
    #[error("Malformed variant {variant}: {msg}")]
    MalformedVariant { variant: String, msg: String },

    /// Invalid coordinates provided
    #[error("Invalid coordinates: {msg}")]
    InvalidCoordinates { msg: String },

    /// Genomic reference data is not available
    #[error("Genomic reference not available for {contig}:{start}-{end}")]
    GenomicReferenceNotAvailable {
        contig: String,
        start: i64,
        end: i64,
    },

    /// An auxiliary annotation provider failed
    #[error("Provider '{source_name}' failed: {msg}")]
    Provider { source_name: String, msg: String },

    /// Annotation option could not be parsed
    #[error("Invalid value for option '{key}': {msg}")]
    InvalidOption { key: String, msg: String },

    /// Configuration could not be parsed
    #[error("Configuration error: {msg}")]
    Config { msg: String },

    /// IO error (for file operations)
    #[error("IO error: {msg}")]
    Io { msg: String },

    /// JSON parsing error
    #[error("JSON error: {msg}")]
    Json { msg: String },
}

impl FerroError {
    /// Create a provider error for the named annotation source
    pub fn provider(source_name: impl Into<String>, msg: impl Into<String>) -> Self {
        FerroError::Provider {
            source_name: source_name.into(),
            msg: msg.into(),
        }
    }

    /// Get the error code
    pub fn code(&self) -> ErrorCode {
        match self {
            FerroError::UnsupportedVariantFormat { .. } => ErrorCode::UnsupportedVariantFormat,
            FerroError::MalformedVariant { .. } => ErrorCode::MalformedVariant,
            FerroError::InvalidCoordinates { .. } => ErrorCode::InvalidRange,
            FerroError::GenomicReferenceNotAvailable { .. } => ErrorCode::SequenceNotFound,
            FerroError::Provider { .. } => ErrorCode::ProviderFailure,
            FerroError::InvalidOption { .. } => ErrorCode::InvalidOption,
            FerroError::Config { .. } => ErrorCode::InvalidConfig,
            FerroError::Io { .. } => ErrorCode::IoError,
            FerroError::Json { .. } => ErrorCode::JsonError,
        }
    }

    /// Whether this error aborts a whole annotation batch.
    ///
    /// Everything else is confined to the variant that produced it.
    pub fn is_batch_fatal(&self) -> bool {
        matches!(
            self,
            FerroError::Provider { .. }
                | FerroError::InvalidOption { .. }
                | FerroError::Config { .. }
                | FerroError::Io { .. }
                | FerroError::Json { .. }
        )
    }
}

impl From<std::io::Error> for FerroError {
    fn from(err: std::io::Error) -> Self {
        FerroError::Io {
            msg: err.to_string(),
        }
    }
}

impl From<serde_json::Error> for FerroError {
    fn from(err: serde_json::Error) -> Self {
        FerroError::Json {
            msg: err.to_string(),
        }
    }
}

impl From<toml::de::Error> for FerroError {
    fn from(err: toml::de::Error) -> Self {
        FerroError::Config {
            msg: err.to_string(),
        }
    }
}
