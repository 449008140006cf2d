//! Robust winnowing over a positioned character stream.
//!
//! N-grams are numbered by their position in the normalized stream. The
//! character and offset rings hold the last `N + W` characters, which is
//! enough to rebuild any n-gram still inside the current window; the hash
//! ring holds the hashes of the last `W` n-grams.
//!
//! Selection rules:
//! - in the first window the rightmost minimum is recorded;
//! - when the tracked minimum falls out of the window, the window is rescanned
//!   right to left and the rightmost minimum is recorded;
//! - otherwise a new hash that ties or beats the minimum becomes the minimum
//!   and is recorded.
//!
//! Every window of `W` consecutive n-grams therefore contains a recorded one.

use canonical::{PositionedRead, PositionedStream};

use crate::config::{PerceptualConfig, PerceptualError};
use crate::fingerprint::{FingerprintEntry, FingerprintMeta, FingerprintSet};
use crate::hash::ngram_hash;
use crate::ring::Ring;
use crate::{PERCEPTUAL_ALGORITHM, PERCEPTUAL_VERSION};

/// Winnow a positioned character stream into a [`FingerprintSet`].
///
/// Streams shorter than `ngram_size` yield an empty set. Errors from the
/// reader (for example a mapping cycle) abort the whole document.
pub fn winnow<R>(reader: &mut R, cfg: &PerceptualConfig) -> Result<FingerprintSet, PerceptualError>
where
    R: PositionedRead + ?Sized,
{
    cfg.validate()?;

    let mut state = WinnowState::new(reader, cfg);
    state.run()?;

    Ok(FingerprintSet {
        entries: state.entries,
        meta: FingerprintMeta {
            perceptual_version: PERCEPTUAL_VERSION,
            algorithm_name: PERCEPTUAL_ALGORITHM.to_string(),
            ngram_size: cfg.ngram_size,
            window_size: cfg.window_size,
            config_version: cfg.version,
        },
        normalized: state.normalized,
    })
}

/// Winnow an already materialized stream.
pub fn winnow_stream(
    stream: &PositionedStream,
    cfg: &PerceptualConfig,
) -> Result<FingerprintSet, PerceptualError> {
    winnow(&mut stream.reader(), cfg)
}

struct WinnowState<'r, R: ?Sized> {
    reader: &'r mut R,
    n: usize,
    w: usize,
    chars: Ring<char>,
    offsets: Ring<usize>,
    hashes: Ring<u32>,
    /// Number of characters read so far.
    consumed: usize,
    entries: Vec<FingerprintEntry>,
    normalized: Option<String>,
}

impl<'r, R: PositionedRead + ?Sized> WinnowState<'r, R> {
    fn new(reader: &'r mut R, cfg: &PerceptualConfig) -> Self {
        let n = cfg.ngram_size;
        let w = cfg.window_size;
        Self {
            reader,
            n,
            w,
            chars: Ring::new(n + w),
            offsets: Ring::new(n + w),
            hashes: Ring::new(w),
            consumed: 0,
            entries: Vec::new(),
            normalized: cfg.include_normalized.then(String::new),
        }
    }

    fn run(&mut self) -> Result<(), PerceptualError> {
        for _ in 1..self.n {
            if !self.read_char()? {
                return Ok(());
            }
        }

        let Some(first) = self.next_ngram()? else {
            return Ok(());
        };
        let mut right = first;
        let mut min = first;

        for _ in 1..self.w {
            match self.next_ngram()? {
                Some(idx) => {
                    right = idx;
                    if self.hash(right) <= self.hash(min) {
                        min = right;
                    }
                }
                None => {
                    self.record(min);
                    return Ok(());
                }
            }
        }
        self.record(min);

        while let Some(idx) = self.next_ngram()? {
            right = idx;
            if min + self.w == right {
                // The minimum just left the window.
                min = right;
                for i in (right + 1 - self.w..right).rev() {
                    if self.hash(i) < self.hash(min) {
                        min = i;
                    }
                }
                self.record(min);
            } else if self.hash(right) <= self.hash(min) {
                min = right;
                self.record(min);
            }
        }
        Ok(())
    }

    /// Read one character into the rings. Returns false at end of stream.
    fn read_char(&mut self) -> Result<bool, PerceptualError> {
        let Some(pc) = self.reader.read_positioned()? else {
            return Ok(false);
        };
        let pos = self.consumed as isize;
        self.chars.set(pos, pc.ch);
        self.offsets.set(pos, pc.offset);
        if let Some(normalized) = self.normalized.as_mut() {
            normalized.push(pc.ch);
        }
        self.consumed += 1;
        Ok(true)
    }

    /// Read the character completing the next n-gram and hash it.
    fn next_ngram(&mut self) -> Result<Option<usize>, PerceptualError> {
        if !self.read_char()? {
            return Ok(None);
        }
        let idx = self.consumed - self.n;
        let hash = ngram_hash(self.chars.run(idx as isize, self.n));
        self.hashes.set(idx as isize, hash);
        Ok(Some(idx))
    }

    fn hash(&self, idx: usize) -> u32 {
        self.hashes.get(idx as isize)
    }

    fn record(&mut self, idx: usize) {
        let pos = idx as isize;
        let ngram: String = self.chars.run(pos, self.n).collect();
        let start = self.offsets.get(pos);
        let end = self.offsets.get(pos + self.n as isize - 1);
        let hash = self.hash(idx);
        self.entries.push(FingerprintEntry::new(ngram, hash, start, end, idx));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hash::hash_str;
    use canonical::{normalize, MappingTable, TextSource};
    use proptest::prelude::*;

    fn cfg(n: usize, w: usize) -> PerceptualConfig {
        PerceptualConfig::new().with_ngram_size(n).with_window_size(w)
    }

    fn winnow_text(text: &str, n: usize, w: usize) -> FingerprintSet {
        let stream = normalize(text, &MappingTable::new()).unwrap();
        winnow_stream(&stream, &cfg(n, w)).unwrap()
    }

    /// Straightforward reference: rightmost minimum of every full window,
    /// deduplicated by position.
    fn reference_positions(hashes: &[u32], w: usize) -> Vec<usize> {
        if hashes.is_empty() {
            return Vec::new();
        }
        let mut out: Vec<usize> = Vec::new();
        let last_start = hashes.len().saturating_sub(w);
        for start in 0..=last_start {
            let end = (start + w).min(hashes.len());
            let mut min = start;
            for i in start..end {
                if hashes[i] <= hashes[min] {
                    min = i;
                }
            }
            if out.last() != Some(&min) {
                out.push(min);
            }
        }
        out
    }

    #[test]
    fn shorter_than_ngram_is_empty() {
        let set = winnow_text("abc", 5, 3);
        assert!(set.is_empty());
        assert_eq!(set.meta.ngram_size, 5);
    }

    #[test]
    fn exactly_one_ngram_is_recorded() {
        let mut src = TextSource::new("abcd");
        let set = winnow(&mut src, &cfg(4, 3)).unwrap();
        assert_eq!(set.len(), 1);
        let e = &set.entries[0];
        assert_eq!(e.ngram, "abcd");
        assert_eq!((e.start, e.end, e.ngram_index), (0, 3, 0));
        assert_eq!(e.hash, hash_str("abcd"));
    }

    #[test]
    fn window_of_one_records_every_ngram() {
        let mut src = TextSource::new("abcdefg");
        let set = winnow(&mut src, &cfg(3, 1)).unwrap();
        let grams: Vec<&str> = set.iter().map(|e| e.ngram.as_str()).collect();
        assert_eq!(grams, vec!["abc", "bcd", "cde", "def", "efg"]);
    }

    #[test]
    fn selection_matches_reference_windows() {
        let text = "the quick brown fox jumps over the lazy dog";
        let chars: Vec<char> = text.chars().collect();
        for (n, w) in [(4, 3), (3, 5), (5, 2), (2, 7)] {
            let hashes: Vec<u32> = chars.windows(n).map(|g| ngram_hash(g.iter().copied())).collect();
            let mut src = TextSource::new(text);
            let set = winnow(&mut src, &cfg(n, w)).unwrap();
            let got: Vec<usize> = set.iter().map(|e| e.ngram_index).collect();
            assert_eq!(got, reference_positions(&hashes, w), "n={n} w={w}");
        }
    }

    #[test]
    fn entries_point_back_into_original_text() {
        let text = "The  QUICK, brown\n\nfox jumps!";
        let original: Vec<char> = text.chars().collect();
        let set = winnow_text(text, 4, 3);
        assert!(!set.is_empty());
        for e in &set {
            assert_eq!(e.ngram.chars().count(), 4);
            assert_eq!(e.hash, hash_str(&e.ngram));
            assert!(e.start < e.end);
            let first = e.ngram.chars().next().unwrap();
            if first != ' ' {
                assert_eq!(original[e.start].to_ascii_lowercase(), first);
            }
        }
    }

    #[test]
    fn include_normalized_keeps_stream_text() {
        let stream = normalize("Hello, World", &MappingTable::new()).unwrap();
        let set = winnow_stream(&stream, &cfg(4, 2).with_normalized(true)).unwrap();
        assert_eq!(set.normalized.as_deref(), Some("hello world"));
    }

    #[test]
    fn invalid_config_is_rejected() {
        let mut src = TextSource::new("abcdef");
        let err = winnow(&mut src, &cfg(0, 3)).unwrap_err();
        assert!(matches!(err, PerceptualError::InvalidConfigNgramSize { .. }));
    }

    #[test]
    fn oversized_config_is_rejected_before_buffering() {
        let mut src = TextSource::new("short text");
        let err = winnow(&mut src, &cfg(usize::MAX, 10)).unwrap_err();
        assert!(matches!(err, PerceptualError::InvalidConfigNgramSize { .. }));

        let mut src = TextSource::new("short text");
        let err = winnow(&mut src, &cfg(20, usize::MAX)).unwrap_err();
        assert!(matches!(err, PerceptualError::InvalidConfigWindowSize { .. }));
    }

    #[test]
    fn shared_prefix_shares_tokens() {
        let q = winnow_text("the quick brown fox jumps", 4, 3);
        let h = winnow_text("the quick brown fox leaps", 4, 3);
        let hit_tokens: Vec<&str> = h.tokens().collect();
        let shared = q.iter().filter(|e| hit_tokens.contains(&e.token.as_str())).count();
        assert!(shared > 0);
        // N-grams 0..=16 are common to both texts; a selection whose every
        // window lies inside that run must be made in both.
        for e in q.iter().filter(|e| e.ngram_index + 2 <= 16) {
            assert!(hit_tokens.contains(&e.token.as_str()), "{}", e.ngram);
        }
    }

    proptest! {
        #[test]
        fn every_window_has_a_fingerprint(
            text in "[a-c ]{0,120}",
            n in 1usize..6,
            w in 1usize..8,
        ) {
            let mut src = TextSource::new(&text);
            let set = winnow(&mut src, &cfg(n, w)).unwrap();
            let len = text.chars().count();
            if len < n {
                prop_assert!(set.is_empty());
            } else {
                let count = len - n + 1;
                let picked: Vec<usize> = set.iter().map(|e| e.ngram_index).collect();
                prop_assert!(picked.windows(2).all(|p| p[0] < p[1]));
                if count >= w {
                    for start in 0..=count - w {
                        prop_assert!(picked.iter().any(|&i| i >= start && i < start + w));
                    }
                } else {
                    prop_assert_eq!(picked.len(), 1);
                }
            }
        }
    }
}
