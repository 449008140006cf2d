//! YAML configuration for the quotefp pipeline.
//!
//! One file configures every stage (normalization, fingerprinting,
//! reconstruction and excerpts) and optionally names the subword mapping
//! table to load.
//!
//! ## Example YAML Configuration
//!
//! ```yaml
//! version: "1.0"
//! name: "shakespeare"
//! mappings: "mappings.cfg"
//!
//! canonical:
//!   version: 1
//!   fold_case: true
//!   markup: "br"
//!   max_rewrites: 64
//!
//! perceptual:
//!   version: 1
//!   ngram_size: 18
//!   window_size: 18
//!
//! matcher:
//!   max_separation: 100
//!   grow: true
//!   min_overlap_chars: 0
//!   max_hits: null
//!
//! excerpt:
//!   start_marker: "<mark>"
//!   end_marker: "</mark>"
//!   section_break: "----"
//! ```
//!
//! The excerpt `window_size` and `max_separation` are optional and default
//! to the perceptual window size and the matcher max separation.

use std::fs;
use std::path::{Path, PathBuf};

use canonical::CanonicalizeConfig;
use matcher::{ExcerptConfig, MatchConfig, Markers};
use perceptual::{MAX_NGRAM_SIZE, MAX_WINDOW_SIZE, PerceptualConfig};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur when loading YAML configuration files
#[derive(Debug, Error)]
pub enum ConfigLoadError {
    #[error("failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),

    #[error("failed to parse YAML: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    #[error("validation error: {0}")]
    Validation(String),

    #[error("unsupported config version: {0}")]
    UnsupportedVersion(String),
}

/// Top-level YAML configuration for the whole pipeline
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct QuotefpConfig {
    /// Configuration format version
    pub version: String,

    /// Optional configuration name/description
    #[serde(default)]
    pub name: Option<String>,

    /// Path of a `from=to` subword mapping file
    #[serde(default)]
    pub mappings: Option<PathBuf>,

    #[serde(default)]
    pub canonical: CanonicalYamlConfig,

    #[serde(default)]
    pub perceptual: PerceptualYamlConfig,

    #[serde(default)]
    pub matcher: MatchYamlConfig,

    #[serde(default)]
    pub excerpt: ExcerptYamlConfig,
}

impl QuotefpConfig {
    /// Load a YAML configuration file from the given path
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigLoadError> {
        let content = fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Parse YAML configuration from a string
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigLoadError> {
        let config: QuotefpConfig = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigLoadError> {
        match self.version.as_str() {
            "1.0" | "1" => Ok(()),
            v => Err(ConfigLoadError::UnsupportedVersion(v.to_string())),
        }?;

        self.canonical.validate()?;
        self.perceptual.validate()?;
        self.matcher.validate()?;
        self.excerpt.validate()?;
        Ok(())
    }

    pub fn canonical_config(&self) -> CanonicalizeConfig {
        CanonicalizeConfig {
            version: self.canonical.version,
            fold_case: self.canonical.fold_case,
            markup: self.canonical.markup.clone(),
            max_rewrites: self.canonical.max_rewrites,
        }
    }

    pub fn perceptual_config(&self) -> PerceptualConfig {
        PerceptualConfig {
            version: self.perceptual.version,
            ngram_size: self.perceptual.ngram_size,
            window_size: self.perceptual.window_size,
            include_normalized: false,
        }
    }

    pub fn match_config(&self) -> MatchConfig {
        MatchConfig::new()
            .with_max_separation(self.matcher.max_separation)
            .with_grow(self.matcher.grow)
    }

    /// Excerpt settings, filling unset sizes from the other stages.
    pub fn excerpt_config(&self) -> ExcerptConfig {
        let excerpt = &self.excerpt;
        ExcerptConfig::new()
            .with_window_size(excerpt.window_size.unwrap_or(self.perceptual.window_size))
            .with_max_separation(excerpt.max_separation.unwrap_or(self.matcher.max_separation))
            .with_markers(Markers::new(&excerpt.start_marker, &excerpt.end_marker))
            .with_markup(self.canonical.markup.as_deref())
            .with_section_break(excerpt.section_break.as_deref())
    }
}

impl Default for QuotefpConfig {
    fn default() -> Self {
        Self {
            version: "1.0".to_string(),
            name: None,
            mappings: None,
            canonical: CanonicalYamlConfig::default(),
            perceptual: PerceptualYamlConfig::default(),
            matcher: MatchYamlConfig::default(),
            excerpt: ExcerptYamlConfig::default(),
        }
    }
}

/// Normalization stage YAML configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CanonicalYamlConfig {
    #[serde(default = "default_version")]
    pub version: u32,

    #[serde(default = "true_value")]
    pub fold_case: bool,

    /// `null` disables markup recognition.
    #[serde(default = "default_markup")]
    pub markup: Option<String>,

    #[serde(default = "default_max_rewrites")]
    pub max_rewrites: usize,
}

impl CanonicalYamlConfig {
    fn validate(&self) -> Result<(), ConfigLoadError> {
        if self.version == 0 {
            return Err(ConfigLoadError::Validation(
                "canonical.version must be >= 1".to_string(),
            ));
        }
        if self.max_rewrites == 0 {
            return Err(ConfigLoadError::Validation(
                "canonical.max_rewrites must be >= 1".to_string(),
            ));
        }
        if self.markup.as_deref().is_some_and(str::is_empty) {
            return Err(ConfigLoadError::Validation(
                "canonical.markup must not be empty; use null to disable".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for CanonicalYamlConfig {
    fn default() -> Self {
        Self {
            version: 1,
            fold_case: true,
            markup: default_markup(),
            max_rewrites: canonical::DEFAULT_MAX_REWRITES,
        }
    }
}

/// Winnowing YAML configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PerceptualYamlConfig {
    #[serde(default = "default_version")]
    pub version: u32,

    #[serde(default = "default_ngram_size")]
    pub ngram_size: usize,

    #[serde(default = "default_window_size")]
    pub window_size: usize,
}

impl PerceptualYamlConfig {
    fn validate(&self) -> Result<(), ConfigLoadError> {
        if self.version == 0 {
            return Err(ConfigLoadError::Validation(
                "perceptual.version must be >= 1".to_string(),
            ));
        }
        if !(1..=MAX_NGRAM_SIZE).contains(&self.ngram_size) {
            return Err(ConfigLoadError::Validation(format!(
                "perceptual.ngram_size must be in 1..={MAX_NGRAM_SIZE} (got {})",
                self.ngram_size
            )));
        }
        if !(1..=MAX_WINDOW_SIZE).contains(&self.window_size) {
            return Err(ConfigLoadError::Validation(format!(
                "perceptual.window_size must be in 1..={MAX_WINDOW_SIZE} (got {})",
                self.window_size
            )));
        }
        Ok(())
    }
}

impl Default for PerceptualYamlConfig {
    fn default() -> Self {
        Self {
            version: 1,
            ngram_size: default_ngram_size(),
            window_size: default_window_size(),
        }
    }
}

/// Reconstruction YAML configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchYamlConfig {
    #[serde(default = "default_max_separation")]
    pub max_separation: usize,

    #[serde(default = "true_value")]
    pub grow: bool,

    /// Hits covering fewer hit characters than this are pruned.
    #[serde(default)]
    pub min_overlap_chars: usize,

    /// Keep at most this many hits per batch.
    #[serde(default)]
    pub max_hits: Option<usize>,
}

impl MatchYamlConfig {
    fn validate(&self) -> Result<(), ConfigLoadError> {
        if self.max_separation == 0 {
            return Err(ConfigLoadError::Validation(
                "matcher.max_separation must be >= 1".to_string(),
            ));
        }
        if self.max_hits == Some(0) {
            return Err(ConfigLoadError::Validation(
                "matcher.max_hits must be >= 1 when set".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for MatchYamlConfig {
    fn default() -> Self {
        Self {
            max_separation: default_max_separation(),
            grow: true,
            min_overlap_chars: 0,
            max_hits: None,
        }
    }
}

/// Excerpt rendering YAML configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExcerptYamlConfig {
    #[serde(default = "default_start_marker")]
    pub start_marker: String,

    #[serde(default = "default_end_marker")]
    pub end_marker: String,

    #[serde(default)]
    pub section_break: Option<String>,

    #[serde(default)]
    pub window_size: Option<usize>,

    #[serde(default)]
    pub max_separation: Option<usize>,
}

impl ExcerptYamlConfig {
    fn validate(&self) -> Result<(), ConfigLoadError> {
        if self.window_size == Some(0) {
            return Err(ConfigLoadError::Validation(
                "excerpt.window_size must be >= 1".to_string(),
            ));
        }
        if self.max_separation == Some(0) {
            return Err(ConfigLoadError::Validation(
                "excerpt.max_separation must be >= 1".to_string(),
            ));
        }
        if self.section_break.as_deref().is_some_and(str::is_empty) {
            return Err(ConfigLoadError::Validation(
                "excerpt.section_break must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for ExcerptYamlConfig {
    fn default() -> Self {
        Self {
            start_marker: default_start_marker(),
            end_marker: default_end_marker(),
            section_break: None,
            window_size: None,
            max_separation: None,
        }
    }
}

// Helper functions for serde defaults
fn default_version() -> u32 {
    1
}

fn true_value() -> bool {
    true
}

fn default_markup() -> Option<String> {
    Some(canonical::DEFAULT_MARKUP.to_string())
}

fn default_max_rewrites() -> usize {
    canonical::DEFAULT_MAX_REWRITES
}

fn default_ngram_size() -> usize {
    PerceptualConfig::default().ngram_size
}

fn default_window_size() -> usize {
    PerceptualConfig::default().window_size
}

fn default_max_separation() -> usize {
    MatchConfig::default().max_separation
}

fn default_start_marker() -> String {
    Markers::default().start
}

fn default_end_marker() -> String {
    Markers::default().end
}
