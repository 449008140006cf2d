//! Fingerprint and metadata types.
//!
//! This module defines the fingerprint representation produced by the
//! winnower. The schema and metadata are part of the public contract: any
//! incompatible change must result in a new `perceptual_version`.

use serde::{Deserialize, Serialize};

/// Character that stands in for spaces inside a [`FingerprintEntry::token`].
pub const TOKEN_SPACE_SENTINEL: char = '0';

/// One selected n-gram with its position in the original text.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FingerprintEntry {
    /// The n-gram exactly as it appears in the normalized stream.
    pub ngram: String,
    /// `ngram` with spaces replaced by [`TOKEN_SPACE_SENTINEL`], suitable as
    /// a single search term.
    pub token: String,
    /// [`crate::ngram_hash`] of `ngram`.
    pub hash: u32,
    /// Original offset of the n-gram's first character (inclusive).
    pub start: usize,
    /// Original offset of the n-gram's last character (inclusive).
    pub end: usize,
    /// Index of the n-gram in the normalized stream: it covers normalized
    /// characters `ngram_index..ngram_index + ngram_size`.
    pub ngram_index: usize,
}

impl FingerprintEntry {
    pub(crate) fn new(ngram: String, hash: u32, start: usize, end: usize, ngram_index: usize) -> Self {
        let token = ngram.replace(' ', &TOKEN_SPACE_SENTINEL.to_string());
        Self {
            ngram,
            token,
            hash,
            start,
            end,
            ngram_index,
        }
    }

    /// Same n-gram text and hash.
    ///
    /// Tokens are only a lookup key; two entries with the same token are the
    /// same n-gram only if this holds.
    pub fn same_ngram(&self, other: &FingerprintEntry) -> bool {
        self.hash == other.hash && self.ngram == other.ngram
    }
}

/// Ordered fingerprints of one document, in selection order.
///
/// Immutable once produced and reusable across any number of comparisons.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FingerprintSet {
    pub entries: Vec<FingerprintEntry>,
    pub meta: FingerprintMeta,
    /// Normalized text seen by the winnower, when requested via
    /// `include_normalized`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub normalized: Option<String>,
}

impl FingerprintSet {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, FingerprintEntry> {
        self.entries.iter()
    }

    /// Tokens of every entry, in selection order.
    pub fn tokens(&self) -> impl Iterator<Item = &str> + '_ {
        self.entries.iter().map(|e| e.token.as_str())
    }
}

impl<'a> IntoIterator for &'a FingerprintSet {
    type Item = &'a FingerprintEntry;
    type IntoIter = std::slice::Iter<'a, FingerprintEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

/// Metadata for traceability and determinism.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FingerprintMeta {
    /// Fingerprint algorithm version, owned by this crate.
    pub perceptual_version: u16,
    /// Human-readable algorithm identifier.
    pub algorithm_name: String,
    /// N-gram size in characters.
    pub ngram_size: usize,
    /// Winnowing window size in n-grams.
    pub window_size: usize,
    /// Configuration schema version supplied when computing this set.
    pub config_version: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_replaces_spaces() {
        let e = FingerprintEntry::new("he qu".into(), 1, 1, 6, 1);
        assert_eq!(e.token, "he0qu");
        assert_eq!(e.ngram, "he qu");
    }

    #[test]
    fn same_ngram_compares_text_and_hash() {
        let a = FingerprintEntry::new("abcd".into(), 7, 0, 3, 0);
        let b = FingerprintEntry::new("abcd".into(), 7, 10, 13, 10);
        let c = FingerprintEntry::new("abce".into(), 7, 0, 3, 0);
        let d = FingerprintEntry::new("abcd".into(), 8, 0, 3, 0);
        assert!(a.same_ngram(&b));
        assert!(!a.same_ngram(&c));
        assert!(!a.same_ngram(&d));
    }

    #[test]
    fn set_serde_omits_missing_normalized() {
        let set = FingerprintSet {
            entries: vec![FingerprintEntry::new("ab c".into(), 3, 0, 3, 0)],
            meta: FingerprintMeta {
                perceptual_version: 1,
                algorithm_name: "x".into(),
                ngram_size: 4,
                window_size: 1,
                config_version: 1,
            },
            normalized: None,
        };
        let json = serde_json::to_string(&set).unwrap();
        assert!(!json.contains("normalized"));
        let back: FingerprintSet = serde_json::from_str(&json).unwrap();
        assert_eq!(back, set);
        assert_eq!(back.tokens().collect::<Vec<_>>(), vec!["ab0c"]);
    }
}
