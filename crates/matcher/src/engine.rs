use std::time::Instant;

use fxhash::{FxHashMap, FxHashSet};
use perceptual::{FingerprintEntry, FingerprintSet, Winnower};
use tracing::{debug, warn, Level};

use crate::merge::merge_ranges;
use crate::types::{Direction, MatchConfig, MatchError, Overlaps, Range};
use crate::words::{
    char_at, end_of_sentence, index_of_word_ignore_case, is_highlight_space, words_between,
};

#[cfg(test)]
mod tests;

/// One location where query and hit are judged to overlap.
///
/// Offsets are signed while matches are being estimated and grown: gap
/// probes and pull-apart adjustments can push them out of range, and such
/// candidates are dropped rather than wrapped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Candidate {
    pub(crate) query_start: isize,
    pub(crate) query_end: isize,
    pub(crate) hit_start: isize,
    pub(crate) hit_end: isize,
}

impl Candidate {
    pub(crate) fn new(query_start: isize, query_end: isize, hit_start: isize, hit_end: isize) -> Self {
        Self {
            query_start,
            query_end,
            hit_start,
            hit_end,
        }
    }

    /// Zero-width marker used to bound a gap.
    fn point(query: isize, hit: isize) -> Self {
        Self::new(query, query, hit, hit)
    }

    fn from_entries(query: &FingerprintEntry, hit: &FingerprintEntry) -> Self {
        Self::new(
            query.start as isize,
            query.end as isize,
            hit.start as isize,
            hit.end as isize,
        )
    }

    fn move_start(&mut self, amount: isize) {
        self.query_start += amount;
        self.hit_start += amount;
    }

    fn move_end(&mut self, amount: isize) {
        self.query_end += amount;
        self.hit_end += amount;
    }

    fn is_valid(&self) -> bool {
        self.query_start >= 0
            && self.query_end >= self.query_start
            && self.hit_start >= 0
            && self.hit_end >= self.hit_start
    }

    /// `self` ends inside `next` in the query while their hit ranges are
    /// disjoint: the two would cross.
    fn crosses(&self, next: &Candidate) -> bool {
        self.query_end >= next.query_start
            && !(self.hit_end > next.hit_start && self.hit_start < next.hit_end)
    }
}

/// Reconstructs where a query and a hit overlap, in both original texts.
///
/// Holds no mutable state; one instance can serve any number of threads.
#[derive(Debug, Clone)]
pub struct Reconstructor {
    winnower: Winnower,
    cfg: MatchConfig,
}

impl Reconstructor {
    pub fn new(winnower: Winnower, cfg: MatchConfig) -> Result<Self, MatchError> {
        cfg.validate()?;
        Ok(Self { winnower, cfg })
    }

    pub fn config(&self) -> &MatchConfig {
        &self.cfg
    }

    pub fn winnower(&self) -> &Winnower {
        &self.winnower
    }

    /// Re-winnow `hit_text` and reconstruct its overlaps with the query.
    ///
    /// `query_fp` must come from the same winnower configuration.
    pub fn reconstruct(
        &self,
        query_text: &str,
        query_fp: &FingerprintSet,
        hit_text: &str,
    ) -> Result<Overlaps, MatchError> {
        let hit_fp = self.winnower.fingerprint(hit_text)?;
        self.reconstruct_with(query_text, query_fp, hit_text, &hit_fp)
    }

    /// Same as [`Reconstructor::reconstruct`] with a precomputed hit
    /// fingerprint set.
    pub fn reconstruct_with(
        &self,
        query_text: &str,
        query_fp: &FingerprintSet,
        hit_text: &str,
        hit_fp: &FingerprintSet,
    ) -> Result<Overlaps, MatchError> {
        let start = Instant::now();
        let span = tracing::span!(
            Level::DEBUG,
            "matcher.reconstruct",
            query_fingerprints = query_fp.len(),
            hit_fingerprints = hit_fp.len()
        );
        let _guard = span.enter();

        let query: Vec<char> = query_text.chars().collect();
        let hit: Vec<char> = hit_text.chars().collect();

        let seeds = seed_matches(query_fp, hit_fp)?;
        let mut candidates = seeds.clone();
        candidates.extend(word_matches(&query, &hit, &seeds, self.cfg.max_separation as isize));
        candidates.sort_by_key(|c| c.query_start);

        let grown = grow_matches(candidates, &query, &hit, self.cfg.grow);
        let overlaps = collect_overlaps(&grown, query.len(), hit.len())?;

        debug!(
            seeds = seeds.len(),
            candidates = grown.len(),
            query_ranges = overlaps.query.len(),
            hit_ranges = overlaps.hit.len(),
            elapsed_micros = start.elapsed().as_micros(),
            "reconstruct_done"
        );
        Ok(overlaps)
    }
}

/// Pair every query fingerprint with the first hit fingerprint sharing its
/// token, in query scan order.
pub(crate) fn seed_matches(
    query_fp: &FingerprintSet,
    hit_fp: &FingerprintSet,
) -> Result<Vec<Candidate>, MatchError> {
    let mut by_token: FxHashMap<&str, &FingerprintEntry> = FxHashMap::default();
    for entry in hit_fp {
        by_token.entry(entry.token.as_str()).or_insert(entry);
    }

    let mut seeds = Vec::new();
    for query_entry in query_fp {
        let Some(hit_entry) = by_token.get(query_entry.token.as_str()) else {
            continue;
        };
        if !query_entry.same_ngram(hit_entry) {
            return Err(MatchError::FingerprintMismatch {
                query: query_entry.ngram.clone(),
                hit: hit_entry.ngram.clone(),
            });
        }
        seeds.push(Candidate::from_entries(query_entry, hit_entry));
    }
    Ok(seeds)
}

/// Word-level matches in the gaps around and between seed matches.
pub(crate) fn word_matches(
    query: &[char],
    hit: &[char],
    seeds: &[Candidate],
    max_sep: isize,
) -> Vec<Candidate> {
    let mut extra = Vec::new();
    let (Some(first), Some(last)) = (seeds.first(), seeds.last()) else {
        return extra;
    };

    let before = Candidate::point(
        (first.query_start - max_sep).max(end_of_sentence(query, first.query_start, Direction::Backward)),
        (first.hit_start - max_sep).max(end_of_sentence(hit, first.hit_start, Direction::Backward)),
    );
    add_words(query, hit, &before, first, &mut extra);

    for pair in seeds.windows(2) {
        let (curr, next) = (&pair[0], &pair[1]);
        if curr.hit_end >= next.hit_start || curr.query_end >= next.query_start {
            continue;
        }
        if curr.hit_end + max_sep >= next.hit_start && curr.query_end + max_sep >= next.query_start {
            add_words(query, hit, curr, next, &mut extra);
            continue;
        }

        let half = max_sep / 2;
        let after_curr = Candidate::point(
            (curr.query_end + half).min(end_of_sentence(query, curr.query_end, Direction::Forward)),
            (curr.hit_end + half).min(end_of_sentence(hit, curr.hit_end, Direction::Forward)),
        );
        add_words(query, hit, curr, &after_curr, &mut extra);

        let before_next = Candidate::point(
            (next.query_start - half).max(end_of_sentence(query, next.query_start, Direction::Backward)),
            (next.hit_start - half).max(end_of_sentence(hit, next.hit_start, Direction::Backward)),
        );
        add_words(query, hit, &before_next, next, &mut extra);
    }

    let after = Candidate::point(
        (last.query_start + max_sep).min(end_of_sentence(query, last.query_end, Direction::Forward)),
        (last.hit_start + max_sep).min(end_of_sentence(hit, last.hit_end, Direction::Forward)),
    );
    add_words(query, hit, last, &after, &mut extra);

    extra
}

/// Add a match for every word found in both the query gap and the hit gap
/// between `curr` and `next`.
fn add_words(query: &[char], hit: &[char], curr: &Candidate, next: &Candidate, out: &mut Vec<Candidate>) {
    let query_words: FxHashSet<String> = words_between(query, curr.query_end, next.query_start)
        .into_iter()
        .collect();
    if query_words.is_empty() {
        return;
    }

    let mut seen: FxHashSet<String> = FxHashSet::default();
    for word in words_between(hit, curr.hit_end, next.hit_start) {
        if !query_words.contains(&word) || !seen.insert(word.clone()) {
            continue;
        }
        let located = (
            index_of_word_ignore_case(query, &word, curr.query_end),
            index_of_word_ignore_case(hit, &word, curr.hit_end),
        );
        let (Some(query_at), Some(hit_at)) = located else {
            debug!(word = %word, "word match not located");
            continue;
        };
        let len = word.chars().count() as isize;
        let (q, h) = (query_at as isize, hit_at as isize);
        out.push(Candidate::new(q, q + len - 1, h, h + len - 1));
    }
}

/// Grow candidates by literal comparison and keep neighbors from crossing.
///
/// `candidates` must be sorted by query start. Malformed candidates are
/// dropped with a warning.
pub(crate) fn grow_matches(
    candidates: Vec<Candidate>,
    query: &[char],
    hit: &[char],
    grow: bool,
) -> Vec<Candidate> {
    let query_len = query.len() as isize;
    let mut kept: Vec<Candidate> = Vec::with_capacity(candidates.len());

    for mut m in candidates {
        if !m.is_valid() {
            warn!(
                query_start = m.query_start,
                query_end = m.query_end,
                hit_start = m.hit_start,
                hit_end = m.hit_end,
                "invalid_match_dropped"
            );
            continue;
        }

        if let Some(prev) = kept.last_mut() {
            if prev.crosses(&m) {
                prev.move_end(m.query_start - prev.query_end - 2);
            }
        }

        if grow {
            while m.query_start > 0 {
                let (Some(h), Some(q)) = (char_at(hit, m.hit_start - 1), char_at(query, m.query_start - 1))
                else {
                    break;
                };
                if !chars_align(q, h) {
                    break;
                }
                m.move_start(-1);
            }
        }
        while char_at(query, m.query_start).is_some_and(is_highlight_space) {
            m.move_start(1);
        }

        if grow {
            while m.query_end + 1 < query_len {
                let (Some(h), Some(q)) = (char_at(hit, m.hit_end + 1), char_at(query, m.query_end + 1))
                else {
                    break;
                };
                if !chars_align(q, h) {
                    break;
                }
                m.move_end(1);
            }
        }
        while char_at(query, m.query_end).is_some_and(is_highlight_space) {
            m.move_end(-1);
        }

        if let Some(prev) = kept.last() {
            if prev.crosses(&m) {
                m.move_start(prev.query_end - m.query_start + 2);
            }
        }
        kept.push(m);
    }
    kept
}

/// Literal equality ignoring case, or whitespace against whitespace.
fn chars_align(q: char, h: char) -> bool {
    (is_highlight_space(q) && is_highlight_space(h)) || q.to_lowercase().eq(h.to_lowercase())
}

/// Split grown candidates into per-text range lists, sort and merge them.
pub(crate) fn collect_overlaps(
    candidates: &[Candidate],
    query_len: usize,
    hit_len: usize,
) -> Result<Overlaps, MatchError> {
    let in_text = |start: isize, end: isize, len: usize| {
        (start >= 0 && start <= end && (end as usize) < len).then(|| Range::new(start as usize, end as usize))
    };

    let mut query: Vec<Range> = candidates
        .iter()
        .filter_map(|c| in_text(c.query_start, c.query_end, query_len))
        .collect();
    let mut hit: Vec<Range> = candidates
        .iter()
        .filter_map(|c| in_text(c.hit_start, c.hit_end, hit_len))
        .collect();

    query.sort_by_key(|r| r.start);
    hit.sort_by_key(|r| r.start);
    merge_ranges(&mut query)?;
    merge_ranges(&mut hit)?;

    Ok(Overlaps { query, hit })
}
