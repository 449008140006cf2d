//! Markup-aware whitespace collapsing.
//!
//! Fingerprints only care about letters. This stage lets ASCII letters
//! through untouched and turns every maximal run of anything else (spaces,
//! punctuation, digits, line-break markup) into a single `' '`.
//!
//! # Markup tokens
//!
//! A [`MarkupToken`] names a line-break tag such as `br`. Both its bracketed
//! form `<br>` and its entity-escaped form `&lt;br&gt;` are recognized, ASCII
//! case-insensitively, and consumed as one unit so that the tag name never
//! leaks into the normalized text as letters.
//!
//! # Offsets
//!
//! The emitted space carries the offset of the first character of the run it
//! stands for. A run at the very start or end of the text still yields one
//! space.
//!
//! ```rust
//! use canonical::{MarkupCollapse, MarkupToken, PositionedStream, TextSource};
//!
//! let mut stage = MarkupCollapse::new(
//!     Box::new(TextSource::new("to be,<br>or")),
//!     Some(MarkupToken::line_break()),
//! );
//! let out = PositionedStream::collect_from(&mut stage).unwrap();
//! assert_eq!(out.text(), "to be or");
//! assert_eq!(out.offsets(), vec![0, 1, 2, 3, 4, 5, 10, 11]);
//! ```

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::error::CanonicalError;
use crate::stream::{PositionedChar, PositionedRead};

/// Letters pass through collapsing; everything else is whitespace.
#[inline]
pub fn is_letter(c: char) -> bool {
    c.is_ascii_alphabetic()
}

/// A line-break markup token and the literal forms it appears in.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MarkupToken {
    name: String,
    forms: Vec<Vec<char>>,
}

impl MarkupToken {
    /// Build the token for tag `name` (without brackets).
    pub fn new(name: &str) -> Self {
        let forms = [format!("<{name}>"), format!("&lt;{name}&gt;")]
            .iter()
            .map(|f| f.chars().collect())
            .collect();
        Self {
            name: name.to_string(),
            forms,
        }
    }

    /// The `<br>` token.
    pub fn line_break() -> Self {
        Self::new(crate::config::DEFAULT_MARKUP)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Longest literal form, in characters.
    pub fn max_len(&self) -> usize {
        self.forms.iter().map(Vec::len).max().unwrap_or(0)
    }

    /// Length of the form starting at `pos` in `text`, if any.
    pub fn match_at(&self, text: &[char], pos: usize) -> Option<usize> {
        self.match_with(|i| text.get(pos + i).copied())
    }

    /// Length of the form whose last character sits at `pos`, if any.
    pub fn match_ending_at(&self, text: &[char], pos: usize) -> Option<usize> {
        self.forms
            .iter()
            .filter(|form| form.len() <= pos + 1)
            .find(|form| {
                let start = pos + 1 - form.len();
                Self::form_matches(form, |i| text.get(start + i).copied())
            })
            .map(Vec::len)
    }

    fn match_with<F>(&self, at: F) -> Option<usize>
    where
        F: Fn(usize) -> Option<char>,
    {
        self.forms
            .iter()
            .find(|form| Self::form_matches(form, &at))
            .map(Vec::len)
    }

    fn form_matches<F>(form: &[char], at: F) -> bool
    where
        F: Fn(usize) -> Option<char>,
    {
        form.iter()
            .enumerate()
            .all(|(i, f)| at(i).is_some_and(|c| c.eq_ignore_ascii_case(f)))
    }
}

/// Collapsing stage: letter runs pass through, everything else becomes one
/// space per run.
pub struct MarkupCollapse<'a> {
    inner: Box<dyn PositionedRead + 'a>,
    markup: Option<MarkupToken>,
    lookahead: VecDeque<PositionedChar>,
    exhausted: bool,
    last_was_space: bool,
}

impl<'a> MarkupCollapse<'a> {
    pub fn new(inner: Box<dyn PositionedRead + 'a>, markup: Option<MarkupToken>) -> Self {
        let capacity = markup.as_ref().map_or(1, MarkupToken::max_len);
        Self {
            inner,
            markup,
            lookahead: VecDeque::with_capacity(capacity),
            exhausted: false,
            last_was_space: false,
        }
    }

    fn fill(&mut self, want: usize) -> Result<(), CanonicalError> {
        while !self.exhausted && self.lookahead.len() < want {
            match self.inner.read_positioned()? {
                Some(pc) => self.lookahead.push_back(pc),
                None => self.exhausted = true,
            }
        }
        Ok(())
    }

    /// Number of lookahead characters forming a markup token at the front.
    fn markup_at_front(&self) -> Option<usize> {
        let markup = self.markup.as_ref()?;
        markup.match_with(|i| self.lookahead.get(i).map(|pc| pc.ch))
    }
}

impl PositionedRead for MarkupCollapse<'_> {
    fn read_positioned(&mut self) -> Result<Option<PositionedChar>, CanonicalError> {
        let window = self.markup.as_ref().map_or(1, MarkupToken::max_len).max(1);
        loop {
            self.fill(window)?;
            let Some(front) = self.lookahead.front().copied() else {
                return Ok(None);
            };
            if is_letter(front.ch) {
                self.lookahead.pop_front();
                self.last_was_space = false;
                return Ok(Some(front));
            }
            let consumed = self.markup_at_front().unwrap_or(1);
            self.lookahead.drain(..consumed);
            if !self.last_was_space {
                self.last_was_space = true;
                return Ok(Some(PositionedChar::new(' ', front.offset)));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stream::{PositionedStream, TextSource};

    fn collapse(text: &str, markup: Option<MarkupToken>) -> PositionedStream {
        let mut stage = MarkupCollapse::new(Box::new(TextSource::new(text)), markup);
        PositionedStream::collect_from(&mut stage).unwrap()
    }

    // ==================== Collapsing ====================

    #[test]
    fn collapses_runs_to_single_space() {
        let out = collapse("a  ,\n\tb", None);
        assert_eq!(out.text(), "a b");
        assert_eq!(out.offsets(), vec![0, 1, 6]);
    }

    #[test]
    fn digits_and_punctuation_are_whitespace() {
        let out = collapse("abc123def!", None);
        assert_eq!(out.text(), "abc def ");
    }

    #[test]
    fn leading_and_trailing_runs_yield_one_space() {
        let out = collapse("  hi  ", None);
        assert_eq!(out.text(), " hi ");
        assert_eq!(out.offsets(), vec![0, 2, 3, 4]);
    }

    #[test]
    fn letters_keep_their_case() {
        let out = collapse("Hello, World", None);
        assert_eq!(out.text(), "Hello World");
    }

    #[test]
    fn non_ascii_letters_collapse() {
        let out = collapse("café ok", None);
        assert_eq!(out.text(), "caf ok");
        assert_eq!(out.offsets(), vec![0, 1, 2, 3, 5, 6]);
    }

    // ==================== Markup ====================

    #[test]
    fn markup_is_consumed_atomically() {
        let out = collapse("one<br>two", Some(MarkupToken::line_break()));
        assert_eq!(out.text(), "one two");
        assert_eq!(out.offsets(), vec![0, 1, 2, 3, 7, 8, 9]);
    }

    #[test]
    fn entity_escaped_markup_is_consumed() {
        let out = collapse("one&lt;BR&gt;two", Some(MarkupToken::line_break()));
        assert_eq!(out.text(), "one two");
    }

    #[test]
    fn markup_joins_surrounding_whitespace() {
        let out = collapse("one. <BR> two", Some(MarkupToken::line_break()));
        assert_eq!(out.text(), "one two");
        assert_eq!(out.offsets()[3], 3);
    }

    #[test]
    fn markup_without_token_leaks_letters() {
        let out = collapse("one<br>two", None);
        assert_eq!(out.text(), "one br two");
    }

    #[test]
    fn truncated_markup_is_plain_punctuation() {
        let out = collapse("one<br", Some(MarkupToken::line_break()));
        assert_eq!(out.text(), "one br");
    }

    // ==================== MarkupToken ====================

    #[test]
    fn markup_token_matches_both_forms() {
        let token = MarkupToken::line_break();
        let text: Vec<char> = "x<Br>y&lt;br&gt;".chars().collect();
        assert_eq!(token.match_at(&text, 1), Some(4));
        assert_eq!(token.match_at(&text, 0), None);
        assert_eq!(token.match_at(&text, 6), Some(10));
        assert_eq!(token.match_ending_at(&text, 4), Some(4));
        assert_eq!(token.match_ending_at(&text, 15), Some(10));
        assert_eq!(token.match_ending_at(&text, 2), None);
        assert_eq!(token.max_len(), 10);
    }
}
