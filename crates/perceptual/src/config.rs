//! Configuration and error types for winnowing fingerprints.
//!
//! This module defines the public configuration surface for the
//! fingerprinting layer. It is free of any I/O or environment-dependent
//! behavior so that a fingerprint is a pure function of
//! `(normalized_stream, config)`.

use canonical::CanonicalError;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Largest accepted n-gram size (N).
pub const MAX_NGRAM_SIZE: usize = 4096;

/// Largest accepted winnowing window size (W).
pub const MAX_WINDOW_SIZE: usize = 4096;

/// Configuration for the winnowing fingerprinter.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PerceptualConfig {
    /// Configuration schema version.
    ///
    /// Any algorithmic change that can affect the fingerprint must bump this
    /// version, so that old fingerprints remain replayable and comparable.
    pub version: u32,
    /// Characters per n-gram (N).
    ///
    /// Shared substrings shorter than this can never produce a common
    /// fingerprint.
    pub ngram_size: usize,
    /// Winnowing window size (W), in n-grams.
    ///
    /// At least one n-gram is selected from every W consecutive n-grams, so
    /// any shared substring of `ngram_size + window_size - 1` normalized
    /// characters is guaranteed to share a fingerprint.
    pub window_size: usize,
    /// Keep the normalized text seen by the winnower in the output.
    ///
    /// Needed when building indexable documents; off by default to keep
    /// fingerprint sets small.
    #[serde(default)]
    pub include_normalized: bool,
}

impl PerceptualConfig {
    /// Create a new configuration with sensible defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the n-gram size (N). Typical values: 18-20.
    pub fn with_ngram_size(mut self, ngram_size: usize) -> Self {
        self.ngram_size = ngram_size;
        self
    }

    /// Set the winnowing window size (W). Typical values: 10-18.
    /// Larger W = fewer fingerprints, longer guaranteed-match threshold.
    pub fn with_window_size(mut self, window_size: usize) -> Self {
        self.window_size = window_size;
        self
    }

    /// Include or exclude the normalized text in the output.
    pub fn with_normalized(mut self, include_normalized: bool) -> Self {
        self.include_normalized = include_normalized;
        self
    }

    /// Normalized length above which two texts sharing a substring are
    /// guaranteed to share a fingerprint.
    pub fn guarantee_threshold(&self) -> usize {
        self.ngram_size + self.window_size - 1
    }

    /// Validate configuration parameters.
    pub fn validate(&self) -> Result<(), PerceptualError> {
        if !(1..=MAX_NGRAM_SIZE).contains(&self.ngram_size) {
            return Err(PerceptualError::InvalidConfigNgramSize {
                ngram_size: self.ngram_size,
            });
        }
        if !(1..=MAX_WINDOW_SIZE).contains(&self.window_size) {
            return Err(PerceptualError::InvalidConfigWindowSize {
                window_size: self.window_size,
            });
        }
        if self.version < 1 {
            return Err(PerceptualError::InvalidConfigVersion {
                version: self.version,
            });
        }
        Ok(())
    }
}

impl Default for PerceptualConfig {
    fn default() -> Self {
        Self {
            version: 1,
            ngram_size: 20,
            window_size: 10,
            include_normalized: false,
        }
    }
}

/// Errors returned by the fingerprinting layer.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PerceptualError {
    #[error("invalid config: ngram_size must be in 1..={MAX_NGRAM_SIZE} (got {ngram_size})")]
    InvalidConfigNgramSize { ngram_size: usize },

    #[error("invalid config: window_size must be in 1..={MAX_WINDOW_SIZE} (got {window_size})")]
    InvalidConfigWindowSize { window_size: usize },

    #[error("invalid config version {version}; expected >= 1")]
    InvalidConfigVersion { version: u32 },

    #[error("normalization failed: {0}")]
    Canonical(#[from] CanonicalError),
}
