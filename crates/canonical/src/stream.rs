//! Positioned character streams.
//!
//! Every stage of the pipeline speaks [`PositionedRead`]: it yields one
//! [`PositionedChar`] at a time, where `offset` is the index of the character
//! (not the byte) in the original, pre-normalization text. Offsets are
//! non-decreasing, except that characters synthesized by a stage repeat the
//! offset of the first source character they replace.

use serde::{Deserialize, Serialize};

use crate::error::CanonicalError;

/// A decoded character plus its offset in the original text.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct PositionedChar {
    pub ch: char,
    /// Character index into the original text.
    pub offset: usize,
}

impl PositionedChar {
    pub fn new(ch: char, offset: usize) -> Self {
        Self { ch, offset }
    }
}

/// A pull-based source of positioned characters.
///
/// `Ok(None)` marks the end of the stream; subsequent calls keep returning
/// `Ok(None)`.
pub trait PositionedRead {
    fn read_positioned(&mut self) -> Result<Option<PositionedChar>, CanonicalError>;
}

impl<R: PositionedRead + ?Sized> PositionedRead for Box<R> {
    fn read_positioned(&mut self) -> Result<Option<PositionedChar>, CanonicalError> {
        (**self).read_positioned()
    }
}

impl<R: PositionedRead + ?Sized> PositionedRead for &mut R {
    fn read_positioned(&mut self) -> Result<Option<PositionedChar>, CanonicalError> {
        (**self).read_positioned()
    }
}

/// Root stage: tags each character of a `&str` with its character index.
#[derive(Debug, Clone)]
pub struct TextSource<'a> {
    chars: std::iter::Enumerate<std::str::Chars<'a>>,
}

impl<'a> TextSource<'a> {
    pub fn new(text: &'a str) -> Self {
        Self {
            chars: text.chars().enumerate(),
        }
    }
}

impl PositionedRead for TextSource<'_> {
    fn read_positioned(&mut self) -> Result<Option<PositionedChar>, CanonicalError> {
        Ok(self
            .chars
            .next()
            .map(|(offset, ch)| PositionedChar { ch, offset }))
    }
}

/// A fully materialized normalized stream.
///
/// Produced by [`normalize`](crate::normalize) and friends. It can be read
/// again any number of times through [`PositionedStream::reader`].
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct PositionedStream {
    chars: Vec<PositionedChar>,
}

impl PositionedStream {
    /// Drain a reader to the end.
    pub fn collect_from<R: PositionedRead + ?Sized>(
        reader: &mut R,
    ) -> Result<Self, CanonicalError> {
        let mut chars = Vec::new();
        while let Some(pc) = reader.read_positioned()? {
            chars.push(pc);
        }
        Ok(Self { chars })
    }

    /// The normalized text.
    pub fn text(&self) -> String {
        self.chars.iter().map(|pc| pc.ch).collect()
    }

    /// Original offset of every normalized character, in stream order.
    pub fn offsets(&self) -> Vec<usize> {
        self.chars.iter().map(|pc| pc.offset).collect()
    }

    pub fn as_slice(&self) -> &[PositionedChar] {
        &self.chars
    }

    pub fn len(&self) -> usize {
        self.chars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chars.is_empty()
    }

    /// A fresh reader positioned at the start of the stream.
    pub fn reader(&self) -> StreamReader<'_> {
        StreamReader {
            chars: &self.chars,
            pos: 0,
        }
    }
}

impl From<Vec<PositionedChar>> for PositionedStream {
    fn from(chars: Vec<PositionedChar>) -> Self {
        Self { chars }
    }
}

/// Reader over a borrowed [`PositionedStream`].
#[derive(Debug, Clone)]
pub struct StreamReader<'a> {
    chars: &'a [PositionedChar],
    pos: usize,
}

impl PositionedRead for StreamReader<'_> {
    fn read_positioned(&mut self) -> Result<Option<PositionedChar>, CanonicalError> {
        let next = self.chars.get(self.pos).copied();
        if next.is_some() {
            self.pos += 1;
        }
        Ok(next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_source_uses_char_offsets() {
        let mut src = TextSource::new("añb");
        let got = PositionedStream::collect_from(&mut src).unwrap();
        assert_eq!(got.text(), "añb");
        assert_eq!(got.offsets(), vec![0, 1, 2]);
    }

    #[test]
    fn stream_reader_replays_from_start() {
        let stream = PositionedStream::from(vec![
            PositionedChar::new('x', 3),
            PositionedChar::new('y', 5),
        ]);
        for _ in 0..2 {
            let mut r = stream.reader();
            assert_eq!(r.read_positioned().unwrap(), Some(PositionedChar::new('x', 3)));
            assert_eq!(r.read_positioned().unwrap(), Some(PositionedChar::new('y', 5)));
            assert_eq!(r.read_positioned().unwrap(), None);
            assert_eq!(r.read_positioned().unwrap(), None);
        }
    }

    #[test]
    fn empty_text_is_empty_stream() {
        let stream = PositionedStream::collect_from(&mut TextSource::new("")).unwrap();
        assert!(stream.is_empty());
        assert_eq!(stream.text(), "");
    }
}
