//! Subword mapping tables.
//!
//! A mapping table rewrites spellings of the already folded and collapsed
//! stream before it is fingerprinted, e.g. `ye=the` or abbreviation
//! expansions. Tables are loaded from a plain text file with one `from=to`
//! rule per line:
//!
//! ```text
//! # comments start with '#'
//! ye=the
//! vv=w
//! quod=
//! ```
//!
//! Lines without `=` are ignored. The key is everything before the first
//! `=`; the value (possibly empty, which deletes the key) is the rest.

use std::collections::VecDeque;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use fxhash::FxHashMap;
use tracing::warn;

use crate::error::CanonicalError;
use crate::stream::PositionedChar;

/// Lookup table of `from → to` rewrites with longest-key-first matching.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MappingTable {
    map: FxHashMap<String, String>,
    max_key_len: usize,
}

impl MappingTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse `from=to` lines.
    pub fn parse(source: &str) -> Self {
        let mut table = Self::new();
        for (lineno, line) in source.lines().enumerate() {
            if line.starts_with('#') {
                continue;
            }
            let Some((from, to)) = line.split_once('=') else {
                continue;
            };
            if from.is_empty() {
                warn!(line = lineno + 1, "skipping subword mapping with empty key");
                continue;
            }
            table.insert(from, to);
        }
        table
    }

    /// Load a mapping file.
    ///
    /// A missing file is not an error: it logs a warning and yields an empty
    /// table, so normalization degrades to the identity mapping.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, CanonicalError> {
        let path = path.as_ref();
        match fs::read_to_string(path) {
            Ok(source) => Ok(Self::parse(&source)),
            Err(err) if err.kind() == ErrorKind::NotFound => {
                warn!(path = %path.display(), "subword mapping file does not exist; using empty mapping");
                Ok(Self::new())
            }
            Err(err) => Err(CanonicalError::Io(format!("{}: {err}", path.display()))),
        }
    }

    /// Add or replace a rule. Empty keys are ignored.
    pub fn insert(&mut self, from: &str, to: &str) {
        if from.is_empty() {
            return;
        }
        self.max_key_len = self.max_key_len.max(from.chars().count());
        self.map.insert(from.to_string(), to.to_string());
    }

    pub fn get(&self, from: &str) -> Option<&str> {
        self.map.get(from).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Length in characters of the longest key (0 for an empty table).
    pub fn max_key_len(&self) -> usize {
        self.max_key_len
    }

    /// Longest key that is a prefix of `buffer`, as `(key_len, replacement)`.
    pub(crate) fn longest_prefix(
        &self,
        buffer: &VecDeque<PositionedChar>,
    ) -> Option<(usize, &str)> {
        if self.map.is_empty() {
            return None;
        }
        let limit = buffer.len().min(self.max_key_len);
        let mut key = String::with_capacity(limit);
        let mut found = None;
        for (i, pc) in buffer.iter().take(limit).enumerate() {
            key.push(pc.ch);
            if let Some(to) = self.map.get(&key) {
                found = Some((i + 1, to.as_str()));
            }
        }
        found
    }
}

impl<'a> FromIterator<(&'a str, &'a str)> for MappingTable {
    fn from_iter<I: IntoIterator<Item = (&'a str, &'a str)>>(iter: I) -> Self {
        let mut table = Self::new();
        for (from, to) in iter {
            table.insert(from, to);
        }
        table
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn buffer(text: &str) -> VecDeque<PositionedChar> {
        text.chars()
            .enumerate()
            .map(|(i, c)| PositionedChar::new(c, i))
            .collect()
    }

    #[test]
    fn parse_skips_comments_and_malformed_lines() {
        let table = MappingTable::parse("# header\nye=the\nnot a rule\n=orphan\nquod=\n");
        assert_eq!(table.len(), 2);
        assert_eq!(table.get("ye"), Some("the"));
        assert_eq!(table.get("quod"), Some(""));
        assert_eq!(table.max_key_len(), 4);
    }

    #[test]
    fn parse_splits_on_first_equals() {
        let table = MappingTable::parse("a=b=c\r\n");
        assert_eq!(table.get("a"), Some("b=c"));
    }

    #[test]
    fn longest_prefix_prefers_longer_key() {
        let table: MappingTable = [("t", "T"), ("th", "TH"), ("the", "THE")]
            .into_iter()
            .collect();
        assert_eq!(table.longest_prefix(&buffer("thee")), Some((3, "THE")));
        assert_eq!(table.longest_prefix(&buffer("tha")), Some((2, "TH")));
        assert_eq!(table.longest_prefix(&buffer("xt")), None);
    }

    #[test]
    fn load_missing_file_is_empty_table() {
        let dir = tempfile::tempdir().unwrap();
        let table = MappingTable::load(dir.path().join("absent.cfg")).unwrap();
        assert!(table.is_empty());
    }

    #[test]
    fn load_reads_rules_from_disk() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "ye=the").unwrap();
        writeln!(file, "vv=w").unwrap();
        let table = MappingTable::load(file.path()).unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table.get("vv"), Some("w"));
    }

    #[test]
    fn load_directory_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            MappingTable::load(dir.path()),
            Err(CanonicalError::Io(_))
        ));
    }
}
