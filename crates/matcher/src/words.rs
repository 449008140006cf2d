//! Character-level helpers shared by reconstruction and excerpting.
//!
//! All positions are signed so that callers can step one past either end of
//! a text without wrapping; anything outside the text reads as `None`.

use crate::types::Direction;

const SENTENCE_TERMINATORS: [char; 7] = ['<', '>', '.', '!', '?', '\n', '\r'];

/// Whitespace for highlighting purposes: anything that is not an ASCII
/// letter, except the angle brackets of markup.
#[inline]
pub fn is_highlight_space(c: char) -> bool {
    !c.is_ascii_alphabetic() && c != '<' && c != '>'
}

#[inline]
pub(crate) fn char_at(text: &[char], pos: isize) -> Option<char> {
    usize::try_from(pos).ok().and_then(|p| text.get(p).copied())
}

/// Nearest sentence terminator (`< > . ! ? \n \r`) at or beyond `from`.
///
/// Returns `text.len()` when searching forward finds nothing and `-1` when
/// searching backward finds nothing.
pub fn end_of_sentence(text: &[char], from: isize, direction: Direction) -> isize {
    let len = text.len() as isize;
    let is_terminator = |c: &char| SENTENCE_TERMINATORS.contains(c);
    match direction {
        Direction::Forward => {
            let start = from.clamp(0, len) as usize;
            text[start..]
                .iter()
                .position(is_terminator)
                .map_or(len, |i| (start + i) as isize)
        }
        Direction::Backward => {
            if from < 0 || text.is_empty() {
                return -1;
            }
            let end = (from as usize).min(text.len() - 1);
            text[..=end]
                .iter()
                .rposition(is_terminator)
                .map_or(-1, |i| i as isize)
        }
    }
}

/// Lower-cased words strictly inside the gap `start..end`.
///
/// The partial words touching either end of the gap are skipped unless the
/// gap reaches the start or end of the text.
pub fn words_between(text: &[char], start: isize, end: isize) -> Vec<String> {
    let len = text.len() as isize;
    let mut end = end.min(len);
    let mut start = start;
    if start < 0 {
        start = 0;
    } else {
        while start < end && !char_at(text, start).is_some_and(is_highlight_space) {
            start += 1;
        }
    }
    if end < len {
        while start < end && !char_at(text, end).is_some_and(is_highlight_space) {
            end -= 1;
        }
    }
    if start >= end {
        return Vec::new();
    }

    let gap = &text[start as usize..end as usize];
    gap.split(|c| !c.is_ascii_alphabetic())
        .filter(|w| !w.is_empty())
        .map(|w| w.iter().map(|c| c.to_ascii_lowercase()).collect())
        .collect()
}

/// First whole-word, ASCII case-insensitive occurrence of `word` at or after
/// `from`.
///
/// A whole word is bounded on both sides by highlight whitespace or the ends
/// of the text.
pub fn index_of_word_ignore_case(text: &[char], word: &str, from: isize) -> Option<usize> {
    let needle: Vec<char> = word.chars().map(|c| c.to_ascii_lowercase()).collect();
    if needle.is_empty() || needle.len() > text.len() {
        return None;
    }
    let first = usize::try_from(from).unwrap_or(0);
    (first..=text.len() - needle.len()).find(|&offset| {
        let candidate = &text[offset..offset + needle.len()];
        if !candidate
            .iter()
            .zip(&needle)
            .all(|(c, n)| c.to_ascii_lowercase() == *n)
        {
            return false;
        }
        let after = offset + needle.len();
        let open = offset == 0 || is_highlight_space(text[offset - 1]);
        let close = after >= text.len() || is_highlight_space(text[after]);
        open && close
    })
}
