//! Configuration file support for ferro-annotate.
//!
//! # Example Configuration
//!
//! ```toml
//! worker_threads = 5
//! flank = 5000
//! big_variant_threshold = 50
//!
//! [options]
//! normalize = true
//! exclude = "repeats,cytoband"
//! svExtraPadding = 100
//! ```
//!
//! # Config File Locations
//!
//! Configuration is searched in this order (first found wins):
//! 1. `.ferro-annotate.toml` in current directory
//! 2. `~/.config/ferro/annotate.toml`
//!
//! Options passed to `annotate` take precedence over the `[options]` table.

use serde::Deserialize;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::annotator::options::AnnotationOptions;
use crate::error::FerroError;

/// Parsed configuration from a `.ferro-annotate.toml` file.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct AnnotatorConfig {
    /// Size of the auxiliary annotation worker pool.
    pub worker_threads: usize,
    /// Padding around each variant for the batched gene fetch.
    pub flank: i64,
    /// Variants longer than this get no splice-level detail.
    pub big_variant_threshold: i64,
    /// Default annotation options, keyed like the annotate option map.
    pub options: HashMap<String, toml::Value>,
}

impl Default for AnnotatorConfig {
    fn default() -> Self {
        Self {
            worker_threads: 5,
            flank: 5000,
            big_variant_threshold: 50,
            options: HashMap::new(),
        }
    }
}

impl AnnotatorConfig {
    /// Load configuration from the default locations; defaults when none exists.
    pub fn load() -> Result<Self, FerroError> {
        let cwd_config = PathBuf::from(".ferro-annotate.toml");
        if cwd_config.exists() {
            return Self::from_path(&cwd_config);
        }

        if let Some(home) = dirs_home() {
            let home_config = home.join(".config").join("ferro").join("annotate.toml");
            if home_config.exists() {
                return Self::from_path(&home_config);
            }
        }

        Ok(Self::default())
    }

    /// Load configuration from a specific path.
    pub fn from_path(path: &Path) -> Result<Self, FerroError> {
        let content = fs::read_to_string(path)?;
        Self::parse(&content)
    }

    /// Parse configuration from TOML content.
    pub fn parse(content: &str) -> Result<Self, FerroError> {
        let config: AnnotatorConfig = toml::from_str(content)?;
        if config.worker_threads == 0 {
            return Err(FerroError::Config {
                msg: "worker_threads must be at least 1".to_string(),
            });
        }
        Ok(config)
    }

    /// Default options as strings, the form `AnnotationOptions::from_map` reads.
    pub fn default_option_map(&self) -> HashMap<String, String> {
        self.options
            .iter()
            .map(|(key, value)| {
                let value = match value {
                    toml::Value::String(s) => s.clone(),
                    toml::Value::Array(items) => items
                        .iter()
                        .map(|item| match item {
                            toml::Value::String(s) => s.clone(),
                            other => other.to_string(),
                        })
                        .collect::<Vec<_>>()
                        .join(","),
                    other => other.to_string(),
                };
                (key.clone(), value)
            })
            .collect()
    }

    /// Resolve per-call options on top of the configured defaults.
    pub fn resolve_options(
        &self,
        overrides: &HashMap<String, String>,
    ) -> Result<AnnotationOptions, FerroError> {
        let mut merged = self.default_option_map();
        merged.extend(overrides.iter().map(|(k, v)| (k.clone(), v.clone())));
        AnnotationOptions::from_map(&merged)
    }
}

/// Get the user's home directory.
fn dirs_home() -> Option<PathBuf> {
    std::env::var("HOME").ok().map(PathBuf::from)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::annotator::options::Annotator;

    #[test]
    fn test_parse_empty_config() {
        let config = AnnotatorConfig::parse("").unwrap();
        assert_eq!(config, AnnotatorConfig::default());
        assert_eq!(config.worker_threads, 5);
    }

    #[test]
    fn test_parse_fields() {
        let content = r#"
worker_threads = 3
flank = 1000

[options]
normalize = true
svExtraPadding = 20
exclude = ["repeats", "cytoband"]
"#;
        let config = AnnotatorConfig::parse(content).unwrap();
        assert_eq!(config.worker_threads, 3);
        assert_eq!(config.flank, 1000);
        assert_eq!(config.big_variant_threshold, 50);

        let options = config.resolve_options(&HashMap::new()).unwrap();
        assert!(options.normalize);
        assert_eq!(options.sv_extra_padding, 20);
        assert!(!options.runs(Annotator::Repeats));
        assert!(!options.runs(Annotator::Cytoband));
    }

    #[test]
    fn test_call_options_override_defaults() {
        let config = AnnotatorConfig::parse("[options]\nnormalize = true\n").unwrap();
        let mut overrides = HashMap::new();
        overrides.insert("normalize".to_string(), "false".to_string());
        let options = config.resolve_options(&overrides).unwrap();
        assert!(!options.normalize);
    }

    #[test]
    fn test_invalid_config() {
        assert!(AnnotatorConfig::parse("worker_threads = \"many\"").is_err());
        let err = AnnotatorConfig::parse("worker_threads = 0").unwrap_err();
        assert!(matches!(err, FerroError::Config { .. }));
    }
}
