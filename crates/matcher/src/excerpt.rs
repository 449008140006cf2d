//! Human-readable excerpts around matched ranges.
//!
//! [`segment`] groups the matched ranges of one text into [`HitSection`]s:
//! ranges closer than `max_separation` share a section, and every section is
//! widened to a [`cut_location`] so it starts and ends at a sentence or line
//! boundary instead of mid-word or inside a markup token.
//!
//! [`mark_ranges`] and [`mark_all`] render the full text with every range
//! wrapped in [`Markers`].

use canonical::MarkupToken;
use serde::{Deserialize, Serialize};

use crate::types::{Direction, MatchError, Range};
use crate::words::is_highlight_space;

/// Delimiters inserted around each matched span.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Markers {
    pub start: String,
    pub end: String,
}

impl Markers {
    pub fn new(start: impl Into<String>, end: impl Into<String>) -> Self {
        Self {
            start: start.into(),
            end: end.into(),
        }
    }
}

impl Default for Markers {
    fn default() -> Self {
        Self::new("<mark>", "</mark>")
    }
}

/// Configuration for excerpt segmentation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ExcerptConfig {
    /// Minimum number of characters a cut location walks before looking for
    /// a sentence boundary.
    pub window_size: usize,
    /// Gap above which the next range starts a new section.
    pub max_separation: usize,
    #[serde(default)]
    pub markers: Markers,
    /// Markup token cut locations never split.
    #[serde(default = "ExcerptConfig::default_markup")]
    pub markup: Option<String>,
    /// Separator between concatenated source documents; sections never
    /// extend across it.
    #[serde(default)]
    pub section_break: Option<String>,
}

impl ExcerptConfig {
    fn default_markup() -> Option<String> {
        Some(canonical::DEFAULT_MARKUP.to_string())
    }

    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_window_size(mut self, window_size: usize) -> Self {
        self.window_size = window_size;
        self
    }

    pub fn with_max_separation(mut self, max_separation: usize) -> Self {
        self.max_separation = max_separation;
        self
    }

    pub fn with_markers(mut self, markers: Markers) -> Self {
        self.markers = markers;
        self
    }

    pub fn with_markup(mut self, markup: Option<&str>) -> Self {
        self.markup = markup.map(str::to_string);
        self
    }

    pub fn with_section_break(mut self, section_break: Option<&str>) -> Self {
        self.section_break = section_break.map(str::to_string);
        self
    }

    pub fn validate(&self) -> Result<(), MatchError> {
        if self.max_separation == 0 {
            return Err(MatchError::InvalidConfig(
                "excerpt max_separation must be greater than zero".into(),
            ));
        }
        if self.window_size > isize::MAX as usize / 4 || self.max_separation > isize::MAX as usize / 4 {
            return Err(MatchError::InvalidConfig(
                "excerpt window_size or max_separation is unreasonably large".into(),
            ));
        }
        if self.markup.as_deref().is_some_and(str::is_empty) {
            return Err(MatchError::InvalidConfig(
                "excerpt markup must not be empty".into(),
            ));
        }
        if self.section_break.as_deref().is_some_and(str::is_empty) {
            return Err(MatchError::InvalidConfig(
                "section_break must not be empty".into(),
            ));
        }
        Ok(())
    }
}

impl Default for ExcerptConfig {
    fn default() -> Self {
        Self {
            window_size: 10,
            max_separation: 100,
            markers: Markers::default(),
            markup: Self::default_markup(),
            section_break: None,
        }
    }
}

/// A contiguous excerpt of a text with matched spans marked.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct HitSection {
    /// Start offset of the first range in the section.
    pub anchor_offset: usize,
    pub rendered_text: String,
}

/// Group sorted, merged ranges of `text` into excerpt sections.
///
/// Ranges starting before the end of an already emitted range, or past the
/// end of the text, are skipped.
pub fn segment(text: &str, ranges: &[Range], cfg: &ExcerptConfig) -> Vec<HitSection> {
    let chars: Vec<char> = text.chars().collect();
    let len = chars.len();
    let markup = cfg.markup.as_deref().map(MarkupToken::new);
    let cut = |from: usize, direction: Direction| {
        cut_location(&chars, from as isize, direction, cfg.window_size, markup.as_ref())
    };
    let section_break = cfg.section_break.as_deref();

    let mut sections = Vec::new();
    let mut rendered = String::new();
    let mut anchor: Option<usize> = None;
    let mut last = 0usize;

    for range in ranges {
        if last > range.start || range.start >= len {
            continue;
        }
        let end = range.end.min(len - 1);

        if range.start - last > cfg.max_separation {
            if let Some(anchor_offset) = anchor.take() {
                let tail = slice(&chars, last, cut(last, Direction::Forward) + 1);
                rendered.push_str(truncate_at(&tail, section_break));
                rendered.push('\n');
                sections.push(HitSection {
                    anchor_offset,
                    rendered_text: std::mem::take(&mut rendered),
                });
            }
            last = cut(range.start, Direction::Backward).min(range.start);
        }

        let lead = slice(&chars, last, range.start);
        if anchor.is_none() {
            anchor = Some(range.start);
            rendered.push_str(trim_front(&lead, section_break));
        } else {
            rendered.push_str(&lead);
        }
        rendered.push_str(&cfg.markers.start);
        rendered.push_str(&slice(&chars, range.start, end + 1));
        rendered.push_str(&cfg.markers.end);
        last = end + 1;
    }

    if len > last + cfg.max_separation / 2 {
        let tail = slice(&chars, last, cut(last, Direction::Forward) + 1);
        rendered.push_str(truncate_at(&tail, section_break));
        rendered.push('\n');
    } else {
        rendered.push_str(&slice(&chars, last, len));
    }
    if let Some(anchor_offset) = anchor {
        sections.push(HitSection {
            anchor_offset,
            rendered_text: rendered,
        });
    }
    sections
}

/// Nearest safe place to cut `text` at least `min_size` steps from `from`.
///
/// Markup tokens are stepped over whole and count as their length. Past the
/// minimum, a forward walk stops on `.`, `!` or `?` (inclusive) or just
/// before a line break; a backward walk stops on any of those and then moves
/// forward over whitespace to the start of the next sentence. The result is
/// clamped to the text.
pub fn cut_location(
    text: &[char],
    from: isize,
    direction: Direction,
    min_size: usize,
    markup: Option<&MarkupToken>,
) -> usize {
    let len = text.len() as isize;
    let jump = direction.step();
    let mut loc = from;
    let mut remaining = min_size as isize - 1;

    loop {
        if loc < 0 {
            loc = 0;
            break;
        }
        if loc >= len {
            loc = (len - 1).max(0);
            break;
        }

        let at = loc as usize;
        let token_len = markup.and_then(|m| match direction {
            Direction::Forward => m.match_at(text, at),
            Direction::Backward => m.match_ending_at(text, at),
        });

        if let Some(token_len) = token_len {
            remaining -= token_len as isize - 1;
            if remaining < 0 {
                loc -= jump;
                break;
            }
            loc += token_len as isize * jump;
        } else {
            let c = text[at];
            if remaining < 0 {
                match direction {
                    Direction::Forward => {
                        if matches!(c, '.' | '!' | '?') {
                            break;
                        }
                        if matches!(c, '\n' | '\r') {
                            loc -= jump;
                            break;
                        }
                    }
                    Direction::Backward => {
                        if matches!(c, '.' | '!' | '?' | '\n' | '\r') {
                            while loc < len && is_highlight_space(text[loc as usize]) {
                                loc += 1;
                            }
                            break;
                        }
                    }
                }
            }
            loc += jump;
        }
        remaining -= 1;
    }

    loc.clamp(0, (len - 1).max(0)) as usize
}

/// Render `text` with every range wrapped in markers.
///
/// `ranges` must be sorted and merged, as returned by reconstruction.
/// Ranges reaching past the end of the text are skipped.
pub fn mark_ranges(text: &str, ranges: &[Range], markers: &Markers) -> Result<String, MatchError> {
    let chars: Vec<char> = text.chars().collect();
    let len = chars.len();
    let mut out = String::with_capacity(text.len() + ranges.len() * (markers.start.len() + markers.end.len()));
    let mut last = 0usize;
    let mut previous: Option<Range> = None;

    for &range in ranges {
        if range.start >= len || range.end >= len {
            continue;
        }
        if last > range.start {
            return Err(MatchError::NotSorted {
                previous: previous.unwrap_or(range),
                current: range,
            });
        }
        push_marked(&mut out, &chars, &mut last, range, markers);
        previous = Some(range);
    }
    out.push_str(&slice(&chars, last, len));
    Ok(out)
}

/// Render `text` with the union of several hits' ranges marked.
///
/// Ranges are sorted first; a range starting inside already marked text is
/// skipped instead of nested.
pub fn mark_all(text: &str, ranges: &[Range], markers: &Markers) -> String {
    let chars: Vec<char> = text.chars().collect();
    let len = chars.len();
    let mut sorted = ranges.to_vec();
    sorted.sort_by_key(|r| r.start);

    let mut out = String::with_capacity(text.len());
    let mut last = 0usize;
    for range in sorted {
        if last > range.start || range.start >= len {
            continue;
        }
        let range = Range::new(range.start, range.end.min(len - 1));
        push_marked(&mut out, &chars, &mut last, range, markers);
    }
    out.push_str(&slice(&chars, last, len));
    out
}

fn push_marked(out: &mut String, chars: &[char], last: &mut usize, range: Range, markers: &Markers) {
    out.push_str(&slice(chars, *last, range.start));
    out.push_str(&markers.start);
    out.push_str(&slice(chars, range.start, range.end + 1));
    out.push_str(&markers.end);
    *last = range.end + 1;
}

fn slice(chars: &[char], start: usize, end: usize) -> String {
    let start = start.min(chars.len());
    let end = end.clamp(start, chars.len());
    chars[start..end].iter().collect()
}

fn truncate_at<'a>(s: &'a str, section_break: Option<&str>) -> &'a str {
    match section_break.and_then(|b| s.find(b)) {
        Some(i) => &s[..i],
        None => s,
    }
}

fn trim_front<'a>(s: &'a str, section_break: Option<&str>) -> &'a str {
    match section_break.and_then(|b| s.rfind(b).map(|i| i + b.len())) {
        Some(i) => &s[i..],
        None => s,
    }
}
