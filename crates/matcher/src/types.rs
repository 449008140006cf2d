use std::fmt;

use perceptual::PerceptualError;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Inclusive character range in one text.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Range {
    pub start: usize,
    pub end: usize,
}

impl Range {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// Number of characters covered.
    pub fn len(&self) -> usize {
        if self.start > self.end {
            0
        } else {
            self.end - self.start + 1
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn contains(&self, offset: usize) -> bool {
        self.start <= offset && offset <= self.end
    }
}

impl fmt::Display for Range {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}]", self.start, self.end)
    }
}

/// Merged overlap ranges of one query/hit comparison.
///
/// Both lists are sorted ascending and no two ranges of a list touch or
/// overlap. The lists are independent: entry `i` of `query` does not
/// necessarily correspond to entry `i` of `hit`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Overlaps {
    pub query: Vec<Range>,
    pub hit: Vec<Range>,
}

impl Overlaps {
    pub fn is_empty(&self) -> bool {
        self.query.is_empty() && self.hit.is_empty()
    }

    /// Characters of the query text covered by an overlap.
    pub fn covered_query(&self) -> usize {
        self.query.iter().map(Range::len).sum()
    }

    /// Characters of the hit text covered by an overlap.
    pub fn covered_hit(&self) -> usize {
        self.hit.iter().map(Range::len).sum()
    }

    /// `(covered_query, covered_hit)`.
    pub fn covered_len(&self) -> (usize, usize) {
        (self.covered_query(), self.covered_hit())
    }
}

/// Scan direction for sentence and cut-location searches.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Forward,
    Backward,
}

impl Direction {
    pub fn step(self) -> isize {
        match self {
            Direction::Forward => 1,
            Direction::Backward => -1,
        }
    }
}

/// Configuration for overlap reconstruction.
///
/// Cheap to clone and serde-friendly so it can be embedded in higher-level
/// configs.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MatchConfig {
    /// Largest gap, in characters, between two matches that is still filled
    /// with word-level matches. Farther pairs only get their neighborhoods
    /// (half this distance) probed.
    #[serde(default = "MatchConfig::default_max_separation")]
    pub max_separation: usize,
    /// Extend matches by literal comparison of the surrounding characters.
    #[serde(default = "MatchConfig::default_grow")]
    pub grow: bool,
}

impl MatchConfig {
    pub(crate) fn default_max_separation() -> usize {
        100
    }

    pub(crate) fn default_grow() -> bool {
        true
    }

    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_separation(mut self, max_separation: usize) -> Self {
        self.max_separation = max_separation;
        self
    }

    pub fn with_grow(mut self, grow: bool) -> Self {
        self.grow = grow;
        self
    }

    pub fn validate(&self) -> Result<(), MatchError> {
        if self.max_separation == 0 {
            return Err(MatchError::InvalidConfig(
                "max_separation must be greater than zero".into(),
            ));
        }
        if self.max_separation > isize::MAX as usize / 4 {
            return Err(MatchError::InvalidConfig(
                "max_separation is unreasonably large".into(),
            ));
        }
        Ok(())
    }
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            max_separation: Self::default_max_separation(),
            grow: Self::default_grow(),
        }
    }
}

/// Errors produced by the matching layer.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MatchError {
    /// Invalid configuration.
    #[error("invalid match config: {0}")]
    InvalidConfig(String),
    /// Ranges handed to merging or marking were not sorted ascending.
    #[error("ranges not sorted: {current} follows {previous}")]
    NotSorted { previous: Range, current: Range },
    /// Two fingerprints share a token but not their n-gram text.
    #[error("token collision between n-grams {query:?} and {hit:?}")]
    FingerprintMismatch { query: String, hit: String },
    /// Fingerprinting the hit text failed.
    #[error("perceptual error: {0}")]
    Perceptual(#[from] PerceptualError),
}
