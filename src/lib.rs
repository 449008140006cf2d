//! Workspace umbrella crate for quotation fingerprinting.
//!
//! This crate stitches normalization, winnowing and overlap reconstruction
//! together behind [`QuoteFinder`], so callers can go from raw query and
//! candidate texts to marked excerpts with a single configured value.

pub mod config;

pub use canonical::{
    BooleanOp, CanonicalError, CanonicalizeConfig, MappingTable, MarkupToken, Normalizer,
    PositionedChar, PositionedStream, QueryPart, normalize, split_boolean,
};
pub use matcher::{
    Direction, ExcerptConfig, HitSection, MatchConfig, MatchError, Markers, Overlaps, Range,
    Reconstructor, cut_location, mark_all, mark_ranges, merge_ranges, segment,
};
pub use perceptual::{
    FingerprintEntry, FingerprintMeta, FingerprintSet, IndexableDocument, MAX_NGRAM_SIZE,
    MAX_WINDOW_SIZE, PERCEPTUAL_ALGORITHM, PERCEPTUAL_VERSION, PerceptualConfig, PerceptualError,
    TokenQuery, Winnower, hash_str, ngram_hash, token_query,
};

pub use crate::config::{ConfigLoadError, QuotefpConfig};

use std::error::Error;
use std::fmt;
use std::sync::Arc;
use std::time::Instant;

use rayon::prelude::*;
use serde::Serialize;
use tracing::{Level, debug};

/// Errors that can occur while fingerprinting or comparing texts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PipelineError {
    Config(String),
    Canonical(CanonicalError),
    Perceptual(PerceptualError),
    Match(MatchError),
}

impl fmt::Display for PipelineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PipelineError::Config(msg) => write!(f, "invalid configuration: {msg}"),
            PipelineError::Canonical(err) => write!(f, "normalization failure: {err}"),
            PipelineError::Perceptual(err) => write!(f, "fingerprinting failed: {err}"),
            PipelineError::Match(err) => write!(f, "overlap reconstruction failed: {err}"),
        }
    }
}

impl Error for PipelineError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            PipelineError::Canonical(err) => Some(err),
            PipelineError::Perceptual(err) => Some(err),
            PipelineError::Match(err) => Some(err),
            PipelineError::Config(_) => None,
        }
    }
}

impl From<ConfigLoadError> for PipelineError {
    fn from(value: ConfigLoadError) -> Self {
        PipelineError::Config(value.to_string())
    }
}

impl From<CanonicalError> for PipelineError {
    fn from(value: CanonicalError) -> Self {
        PipelineError::Canonical(value)
    }
}

impl From<PerceptualError> for PipelineError {
    fn from(value: PerceptualError) -> Self {
        PipelineError::Perceptual(value)
    }
}

impl From<MatchError> for PipelineError {
    fn from(value: MatchError) -> Self {
        PipelineError::Match(value)
    }
}

/// A candidate document returned by an external index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateHit {
    pub id: String,
    pub text: String,
}

impl CandidateHit {
    pub fn new(id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
        }
    }
}

/// Overlaps of one hit with the query, plus excerpts of the query text.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct HitOverlap {
    pub hit_id: String,
    pub overlaps: Overlaps,
    pub sections: Vec<HitSection>,
}

/// Result of comparing the query against one hit of a batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HitOutcome {
    pub hit_id: String,
    pub result: Result<HitOverlap, PipelineError>,
}

/// Per-hit outcomes of [`QuoteFinder::compare_many`], in input order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchOutcome {
    pub hits: Vec<HitOutcome>,
    /// Hits dropped for covering fewer than `min_overlap_chars`, counted
    /// over the whole batch even when `truncated` is set.
    pub pruned: usize,
    /// Set when `max_hits` cut the list short.
    pub truncated: bool,
}

impl BatchOutcome {
    pub fn successes(&self) -> impl Iterator<Item = &HitOverlap> {
        self.hits.iter().filter_map(|h| h.result.as_ref().ok())
    }

    pub fn failures(&self) -> impl Iterator<Item = (&str, &PipelineError)> {
        self.hits
            .iter()
            .filter_map(|h| h.result.as_ref().err().map(|e| (h.hit_id.as_str(), e)))
    }
}

/// Configured fingerprinting and comparison pipeline.
///
/// Immutable after construction and `Send + Sync`; the mapping table is
/// shared between clones.
#[derive(Debug, Clone)]
pub struct QuoteFinder {
    reconstructor: Reconstructor,
    excerpt: ExcerptConfig,
    min_overlap_chars: usize,
    max_hits: Option<usize>,
}

impl QuoteFinder {
    /// Build a pipeline, loading the mapping file named in `cfg`.
    ///
    /// A missing mapping file only logs a warning and leaves the mapping
    /// empty; an unreadable one is an error.
    pub fn new(cfg: QuotefpConfig) -> Result<Self, PipelineError> {
        let table = match &cfg.mappings {
            Some(path) => MappingTable::load(path)?,
            None => MappingTable::new(),
        };
        Self::with_mappings(cfg, table)
    }

    pub fn with_mappings(cfg: QuotefpConfig, table: MappingTable) -> Result<Self, PipelineError> {
        cfg.validate()?;
        let excerpt = cfg.excerpt_config();
        excerpt.validate()?;

        let normalizer = Normalizer::new(cfg.canonical_config(), Arc::new(table))?;
        let winnower = Winnower::new(normalizer, cfg.perceptual_config())?;
        let reconstructor = Reconstructor::new(winnower, cfg.match_config())?;

        debug!(
            mappings = reconstructor.winnower().normalizer().mappings().len(),
            ngram_size = reconstructor.winnower().config().ngram_size,
            window_size = reconstructor.winnower().config().window_size,
            "quote_finder_ready"
        );

        Ok(Self {
            reconstructor,
            excerpt,
            min_overlap_chars: cfg.matcher.min_overlap_chars,
            max_hits: cfg.matcher.max_hits,
        })
    }

    pub fn winnower(&self) -> &Winnower {
        self.reconstructor.winnower()
    }

    pub fn reconstructor(&self) -> &Reconstructor {
        &self.reconstructor
    }

    pub fn excerpt_config(&self) -> &ExcerptConfig {
        &self.excerpt
    }

    pub fn fingerprint(&self, text: &str) -> Result<FingerprintSet, PipelineError> {
        Ok(self.winnower().fingerprint(text)?)
    }

    /// Token query an external index can run to find candidate hits.
    pub fn token_query(&self, text: &str) -> Result<TokenQuery, PipelineError> {
        Ok(token_query(&self.fingerprint(text)?))
    }

    pub fn indexable_contents(
        &self,
        text: &str,
        extra: Option<&str>,
    ) -> Result<IndexableDocument, PipelineError> {
        Ok(self.winnower().indexable_contents(text, extra)?)
    }

    /// Reconstruct the overlaps of one hit and cut the query into excerpts.
    pub fn compare(
        &self,
        query_text: &str,
        query_fp: &FingerprintSet,
        hit_id: &str,
        hit_text: &str,
    ) -> Result<HitOverlap, PipelineError> {
        let overlaps = self.reconstructor.reconstruct(query_text, query_fp, hit_text)?;
        let sections = segment(query_text, &overlaps.query, &self.excerpt);
        Ok(HitOverlap {
            hit_id: hit_id.to_string(),
            overlaps,
            sections,
        })
    }

    /// Compare the query against every hit in parallel.
    ///
    /// The query is fingerprinted once; a failure there fails the batch.
    /// A failing hit only fails its own outcome.
    pub fn compare_many(
        &self,
        query_text: &str,
        hits: &[CandidateHit],
    ) -> Result<BatchOutcome, PipelineError> {
        let start = Instant::now();
        let span = tracing::span!(Level::INFO, "quotefp.compare_many", hits = hits.len());
        let _guard = span.enter();

        let query_fp = self.fingerprint(query_text)?;

        let results: Vec<HitOutcome> = hits
            .par_iter()
            .map(|hit| HitOutcome {
                hit_id: hit.id.clone(),
                result: self.compare(query_text, &query_fp, &hit.id, &hit.text),
            })
            .collect();

        let mut outcome = BatchOutcome::default();
        for hit in results {
            if let Ok(overlap) = &hit.result {
                if overlap.overlaps.covered_hit() < self.min_overlap_chars {
                    outcome.pruned += 1;
                    continue;
                }
            }
            if self.max_hits.is_some_and(|max| outcome.hits.len() >= max) {
                outcome.truncated = true;
                continue;
            }
            outcome.hits.push(hit);
        }

        debug!(
            query_fingerprints = query_fp.len(),
            kept = outcome.hits.len(),
            failed = outcome.failures().count(),
            pruned = outcome.pruned,
            truncated = outcome.truncated,
            elapsed_micros = start.elapsed().as_micros(),
            "compare_many_done"
        );
        Ok(outcome)
    }
}
