//! Configuration types for the normalization pipeline.
//!
//! This module defines [`CanonicalizeConfig`], which controls which stages of
//! the position-preserving pipeline run and how they behave.
//!
//! # Versioning
//!
//! The `version` field is critical for keeping fingerprints comparable. Any
//! change to normalization behavior (even bug fixes) must be accompanied by a
//! version bump, because fingerprints computed under different normalization
//! rules will silently stop matching each other.
//!
//! # Examples
//!
//! ## Default Configuration
//!
//! ```rust
//! use canonical::CanonicalizeConfig;
//!
//! let config = CanonicalizeConfig::default();
//! assert_eq!(config.version, 1);
//! assert!(config.fold_case);
//! assert_eq!(config.markup.as_deref(), Some("br"));
//! assert_eq!(config.max_rewrites, 64);
//! ```
//!
//! ## Plain Text Without Markup
//!
//! ```rust
//! use canonical::CanonicalizeConfig;
//!
//! let config = CanonicalizeConfig::new().with_markup(None);
//! assert!(config.validate().is_ok());
//! ```

use serde::{Deserialize, Serialize};

use crate::error::CanonicalError;

/// Default cap on non-shrinking subword rewrites at a single position.
pub const DEFAULT_MAX_REWRITES: usize = 64;

/// Default markup token recognized by the collapsing stage (`<br>`).
pub const DEFAULT_MARKUP: &str = "br";

/// Configuration for the normalization pipeline.
///
/// `CanonicalizeConfig` is cheap to clone and serializable so it can be
/// embedded in higher-level configuration files.
///
/// # Fields
///
/// - `version`: Semantic version for tracking behavior changes
/// - `fold_case`: Map ASCII `A-Z` to `a-z` before any other stage
/// - `markup`: Name of the line-break markup token consumed atomically
/// - `max_rewrites`: Bound on the subword rewrite fixed point
///
/// # Serialization
///
/// ```json
/// {
///   "version": 1,
///   "fold_case": true,
///   "markup": "br",
///   "max_rewrites": 64
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CanonicalizeConfig {
    /// Semantic version of the normalization configuration.
    ///
    /// Must be >= 1; version 0 is reserved and rejected.
    pub version: u32,

    /// If true, fold ASCII letters to lowercase.
    ///
    /// Hashing and matching are case-insensitive by construction only when
    /// this is enabled.
    ///
    /// # Default
    ///
    /// `true`
    pub fold_case: bool,

    /// Markup token name recognized while collapsing non-letter runs.
    ///
    /// With the default `"br"`, both `<br>` and its entity-escaped form
    /// `&lt;br&gt;` are consumed as one unit (ASCII case-insensitive) and
    /// become part of the surrounding whitespace run.
    ///
    /// ```text
    /// "end<br>Start" → "end start"
    /// "end&lt;BR&gt;start" → "end start"
    /// ```
    ///
    /// `None` disables markup recognition; the characters of a tag then
    /// simply collapse as punctuation (`"a<br>b"` → `"a br b"`).
    ///
    /// # Default
    ///
    /// `Some("br")`
    #[serde(default = "default_markup")]
    pub markup: Option<String>,

    /// Maximum number of non-shrinking subword rewrites applied at one
    /// position before the mapping table is declared cyclic.
    ///
    /// A table such as `a=b` / `b=a` never reaches a fixed point; exceeding
    /// this limit fails the document with
    /// [`CanonicalError::MappingCycle`](crate::CanonicalError::MappingCycle).
    ///
    /// # Default
    ///
    /// `64`
    #[serde(default = "default_max_rewrites")]
    pub max_rewrites: usize,
}

fn default_markup() -> Option<String> {
    Some(DEFAULT_MARKUP.to_string())
}

fn default_max_rewrites() -> usize {
    DEFAULT_MAX_REWRITES
}

impl CanonicalizeConfig {
    /// Create a new configuration with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable or disable ASCII case folding.
    pub fn with_fold_case(mut self, fold_case: bool) -> Self {
        self.fold_case = fold_case;
        self
    }

    /// Set (or clear) the markup token name.
    pub fn with_markup(mut self, markup: Option<&str>) -> Self {
        self.markup = markup.map(str::to_string);
        self
    }

    /// Set the subword rewrite cap.
    pub fn with_max_rewrites(mut self, max_rewrites: usize) -> Self {
        self.max_rewrites = max_rewrites;
        self
    }

    /// Validate configuration parameters.
    pub fn validate(&self) -> Result<(), CanonicalError> {
        if self.version == 0 {
            return Err(CanonicalError::InvalidConfig(
                "version must be >= 1".into(),
            ));
        }
        if self.max_rewrites == 0 {
            return Err(CanonicalError::InvalidConfig(
                "max_rewrites must be >= 1".into(),
            ));
        }
        if let Some(name) = &self.markup {
            if name.is_empty() || !name.chars().all(|c| c.is_ascii_alphanumeric()) {
                return Err(CanonicalError::InvalidConfig(format!(
                    "markup name must be non-empty ASCII alphanumeric (got {name:?})"
                )));
            }
        }
        Ok(())
    }
}

impl Default for CanonicalizeConfig {
    /// Creates the default `CanonicalizeConfig`.
    ///
    /// - `version`: 1
    /// - `fold_case`: true
    /// - `markup`: `Some("br")`
    /// - `max_rewrites`: 64
    fn default() -> Self {
        Self {
            version: 1,
            fold_case: true,
            markup: default_markup(),
            max_rewrites: DEFAULT_MAX_REWRITES,
        }
    }
}
