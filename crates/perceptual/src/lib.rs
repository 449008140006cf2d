//! # Winnowing fingerprints
//!
//! This crate turns a normalized, position-tagged character stream into a
//! compact set of n-gram fingerprints. Any shared substring of two documents
//! that is long enough is guaranteed to produce at least one common
//! fingerprint, and each fingerprint remembers exactly where its n-gram sits
//! in the original text.
//!
//! ## Contract
//!
//! - The fingerprinter only consumes streams produced by the `canonical`
//!   crate (or any other [`canonical::PositionedRead`]).
//! - The output is a pure function of `(stream, config)`: no I/O, no clocks,
//!   no global state.
//!
//! ## Core pipeline
//!
//! 1.  **N-grams**: every run of `ngram_size` consecutive normalized
//!     characters is hashed with [`ngram_hash`], a folded base-31 polynomial
//!     that is stable across processes and builds.
//!
//! 2.  **Winnowing**: from every window of `window_size` consecutive n-gram
//!     hashes the rightmost minimum is selected; each selection is recorded
//!     once, in scan order, together with the n-gram text and its original
//!     start and end offsets.
//!
//! 3.  **Tokens**: each selected n-gram also gets a space-free token, the
//!     key an external index uses to find candidate documents.
//!
//! ## Example usage
//!
//! ```
//! use std::sync::Arc;
//! use canonical::{CanonicalizeConfig, MappingTable, Normalizer};
//! use perceptual::{PerceptualConfig, Winnower};
//!
//! let normalizer = Normalizer::new(CanonicalizeConfig::default(), Arc::new(MappingTable::new())).unwrap();
//! let cfg = PerceptualConfig::new().with_ngram_size(4).with_window_size(3);
//! let winnower = Winnower::new(normalizer, cfg).unwrap();
//!
//! let fingerprints = winnower.fingerprint("The quick brown fox").unwrap();
//!
//! assert!(!fingerprints.is_empty());
//! assert_eq!(fingerprints.meta.ngram_size, 4);
//! ```

pub mod config;
pub mod fingerprint;
mod hash;
mod query;
mod ring;
mod winnow;

use canonical::Normalizer;
use tracing::debug;

pub use crate::config::{MAX_NGRAM_SIZE, MAX_WINDOW_SIZE, PerceptualConfig, PerceptualError};
pub use crate::fingerprint::{FingerprintEntry, FingerprintMeta, FingerprintSet, TOKEN_SPACE_SENTINEL};
pub use crate::hash::{hash_str, ngram_hash};
pub use crate::query::{token_query, IndexableDocument, TokenQuery, CLAUSE_HEADROOM};
pub use crate::winnow::{winnow, winnow_stream};

/// Current fingerprint algorithm version for this crate.
pub const PERCEPTUAL_VERSION: u16 = 1;

/// Human-readable algorithm identifier.
pub const PERCEPTUAL_ALGORITHM: &str = "robust_winnowing_v1";

/// Normalizer and winnowing config bundled together.
///
/// Cheap to clone; the mapping table inside the normalizer is shared.
#[derive(Debug, Clone)]
pub struct Winnower {
    normalizer: Normalizer,
    cfg: PerceptualConfig,
}

impl Winnower {
    pub fn new(normalizer: Normalizer, cfg: PerceptualConfig) -> Result<Self, PerceptualError> {
        cfg.validate()?;
        Ok(Self { normalizer, cfg })
    }

    pub fn config(&self) -> &PerceptualConfig {
        &self.cfg
    }

    pub fn normalizer(&self) -> &Normalizer {
        &self.normalizer
    }

    /// Normalize and winnow `text` in one streaming pass.
    pub fn fingerprint(&self, text: &str) -> Result<FingerprintSet, PerceptualError> {
        self.fingerprint_with(text, &self.cfg)
    }

    fn fingerprint_with(
        &self,
        text: &str,
        cfg: &PerceptualConfig,
    ) -> Result<FingerprintSet, PerceptualError> {
        let mut reader = self.normalizer.reader(text);
        let set = winnow(&mut reader, cfg)?;
        debug!(
            chars = text.chars().count(),
            fingerprints = set.len(),
            ngram_size = cfg.ngram_size,
            window_size = cfg.window_size,
            "perceptual.fingerprint"
        );
        Ok(set)
    }

    /// Build what an external index stores for one document.
    ///
    /// `extra` is free-form metadata (titles, speakers) that should be
    /// keyword-searchable next to the text; it is case folded and mapped but
    /// not collapsed.
    pub fn indexable_contents(
        &self,
        text: &str,
        extra: Option<&str>,
    ) -> Result<IndexableDocument, PerceptualError> {
        let cfg = self.cfg.clone().with_normalized(true);
        let fingerprints = self.fingerprint_with(text, &cfg)?;

        let mut contents = fingerprints.normalized.clone().unwrap_or_default();
        contents.push('\n');
        if let Some(extra) = extra {
            contents.push_str(&self.normalizer.fold_and_map(extra)?);
            contents.push('\n');
        }
        for token in fingerprints.tokens() {
            contents.push(' ');
            contents.push_str(token);
        }

        Ok(IndexableDocument {
            contents,
            fingerprints,
        })
    }
}
