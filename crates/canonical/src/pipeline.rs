use std::collections::VecDeque;
use std::sync::Arc;

use crate::config::{CanonicalizeConfig, DEFAULT_MAX_REWRITES};
use crate::error::CanonicalError;
use crate::mapping::MappingTable;
use crate::stream::{PositionedChar, PositionedRead, PositionedStream, TextSource};
use crate::token::{split_boolean, QueryPart};
use crate::whitespace::{MarkupCollapse, MarkupToken};

/// Main entry point. Folds case, collapses markup and whitespace, and applies
/// `mappings` with the default configuration.
pub fn normalize(
    raw_text: &str,
    mappings: &MappingTable,
) -> Result<PositionedStream, CanonicalError> {
    let mut reader = PipelineBuilder::new(raw_text)
        .fold_case()
        .collapse_markup(Some(MarkupToken::line_break()))
        .map_subwords(mappings, DEFAULT_MAX_REWRITES)
        .build();
    PositionedStream::collect_from(&mut reader)
}

/// ASCII case folding stage.
pub struct CaseFold<'a> {
    inner: Box<dyn PositionedRead + 'a>,
}

impl<'a> CaseFold<'a> {
    pub fn new(inner: Box<dyn PositionedRead + 'a>) -> Self {
        Self { inner }
    }
}

impl PositionedRead for CaseFold<'_> {
    fn read_positioned(&mut self) -> Result<Option<PositionedChar>, CanonicalError> {
        Ok(self.inner.read_positioned()?.map(|pc| PositionedChar {
            ch: pc.ch.to_ascii_lowercase(),
            offset: pc.offset,
        }))
    }
}

/// Subword remapping stage.
///
/// Keeps up to `max_key_len` upcoming characters buffered, replaces the
/// longest matching key at the front and searches the result again until no
/// key applies, then emits the first buffered character. Replacement
/// characters carry the offset of the first source character they replaced.
pub struct SubwordMap<'a> {
    inner: Box<dyn PositionedRead + 'a>,
    table: &'a MappingTable,
    buffer: VecDeque<PositionedChar>,
    more_input: bool,
    max_rewrites: usize,
}

impl<'a> SubwordMap<'a> {
    pub fn new(
        inner: Box<dyn PositionedRead + 'a>,
        table: &'a MappingTable,
        max_rewrites: usize,
    ) -> Self {
        Self {
            inner,
            table,
            buffer: VecDeque::with_capacity(table.max_key_len().max(1)),
            more_input: true,
            max_rewrites,
        }
    }

    fn fill(&mut self) -> Result<(), CanonicalError> {
        let want = self.table.max_key_len().max(1);
        while self.more_input && self.buffer.len() < want {
            match self.inner.read_positioned()? {
                Some(pc) => self.buffer.push_back(pc),
                None => self.more_input = false,
            }
        }
        Ok(())
    }
}

impl PositionedRead for SubwordMap<'_> {
    fn read_positioned(&mut self) -> Result<Option<PositionedChar>, CanonicalError> {
        // Shrinking rewrites always make progress; only the others can cycle.
        let table = self.table;
        let mut rewrites = 0usize;
        loop {
            self.fill()?;
            let Some(front) = self.buffer.front().copied() else {
                return Ok(None);
            };
            let Some((consumed, replacement)) = table.longest_prefix(&self.buffer) else {
                break;
            };
            let produced = replacement.chars().count();
            if produced >= consumed {
                rewrites += 1;
                if rewrites > self.max_rewrites {
                    let key = self.buffer.iter().take(consumed).map(|pc| pc.ch).collect();
                    return Err(CanonicalError::MappingCycle {
                        key,
                        limit: self.max_rewrites,
                    });
                }
            }
            self.buffer.drain(..consumed);
            for ch in replacement.chars().rev() {
                self.buffer.push_front(PositionedChar::new(ch, front.offset));
            }
        }
        Ok(self.buffer.pop_front())
    }
}

/// Composes pipeline stages over a text, each stage owning the previous one.
///
/// ```rust
/// use canonical::{MappingTable, MarkupToken, PipelineBuilder, PositionedStream};
///
/// let table = MappingTable::parse("ye=the");
/// let mut reader = PipelineBuilder::new("Ye Cat<br>")
///     .fold_case()
///     .collapse_markup(Some(MarkupToken::line_break()))
///     .map_subwords(&table, 64)
///     .build();
/// let out = PositionedStream::collect_from(&mut reader).unwrap();
/// assert_eq!(out.text(), "the cat ");
/// assert_eq!(out.offsets(), vec![0, 0, 0, 2, 3, 4, 5, 6]);
/// ```
pub struct PipelineBuilder<'a> {
    reader: Box<dyn PositionedRead + 'a>,
}

impl<'a> PipelineBuilder<'a> {
    pub fn new(text: &'a str) -> Self {
        Self::from_reader(TextSource::new(text))
    }

    pub fn from_reader<R: PositionedRead + 'a>(reader: R) -> Self {
        Self {
            reader: Box::new(reader),
        }
    }

    pub fn fold_case(self) -> Self {
        Self {
            reader: Box::new(CaseFold::new(self.reader)),
        }
    }

    pub fn collapse_markup(self, markup: Option<MarkupToken>) -> Self {
        Self {
            reader: Box::new(MarkupCollapse::new(self.reader, markup)),
        }
    }

    pub fn map_subwords(self, table: &'a MappingTable, max_rewrites: usize) -> Self {
        Self {
            reader: Box::new(SubwordMap::new(self.reader, table, max_rewrites)),
        }
    }

    pub fn build(self) -> Box<dyn PositionedRead + 'a> {
        self.reader
    }
}

/// Configured normalizer sharing one mapping table.
///
/// Cheap to clone and `Send + Sync`; one instance can serve any number of
/// threads.
#[derive(Debug, Clone)]
pub struct Normalizer {
    cfg: CanonicalizeConfig,
    markup: Option<MarkupToken>,
    mappings: Arc<MappingTable>,
}

impl Normalizer {
    pub fn new(
        cfg: CanonicalizeConfig,
        mappings: Arc<MappingTable>,
    ) -> Result<Self, CanonicalError> {
        cfg.validate()?;
        let markup = cfg.markup.as_deref().map(MarkupToken::new);
        Ok(Self {
            cfg,
            markup,
            mappings,
        })
    }

    /// Default configuration without any subword mappings.
    pub fn identity() -> Self {
        Self {
            markup: Some(MarkupToken::line_break()),
            cfg: CanonicalizeConfig::default(),
            mappings: Arc::new(MappingTable::new()),
        }
    }

    pub fn config(&self) -> &CanonicalizeConfig {
        &self.cfg
    }

    pub fn markup(&self) -> Option<&MarkupToken> {
        self.markup.as_ref()
    }

    pub fn mappings(&self) -> &MappingTable {
        &self.mappings
    }

    /// Streaming reader over the full pipeline.
    pub fn reader<'a>(&'a self, text: &'a str) -> Box<dyn PositionedRead + 'a> {
        let mut builder = PipelineBuilder::new(text);
        if self.cfg.fold_case {
            builder = builder.fold_case();
        }
        builder
            .collapse_markup(self.markup.clone())
            .map_subwords(&self.mappings, self.cfg.max_rewrites)
            .build()
    }

    pub fn normalize(&self, text: &str) -> Result<PositionedStream, CanonicalError> {
        PositionedStream::collect_from(&mut self.reader(text))
    }

    /// Case folding and subword mapping without collapsing.
    ///
    /// Used for keyword text and document metadata, where punctuation and
    /// layout must survive.
    pub fn fold_and_map(&self, text: &str) -> Result<String, CanonicalError> {
        let mut builder = PipelineBuilder::new(text);
        if self.cfg.fold_case {
            builder = builder.fold_case();
        }
        let mut reader = builder
            .map_subwords(&self.mappings, self.cfg.max_rewrites)
            .build();
        let mut out = String::with_capacity(text.len());
        while let Some(pc) = reader.read_positioned()? {
            out.push(pc.ch);
        }
        Ok(out)
    }

    /// Normalize a boolean keyword query, keeping upper-case `AND`, `OR` and
    /// `NOT` operators intact.
    ///
    /// ```rust
    /// use canonical::Normalizer;
    ///
    /// let n = Normalizer::identity();
    /// let q = n.normalize_keyword_query("Grace AND Nature").unwrap();
    /// assert_eq!(q, "grace AND nature");
    /// ```
    pub fn normalize_keyword_query(&self, query: &str) -> Result<String, CanonicalError> {
        let mut out = String::with_capacity(query.len());
        for part in split_boolean(query) {
            match part {
                QueryPart::Text(text) => out.push_str(&self.fold_and_map(&text)?),
                QueryPart::Operator(op) => out.push_str(op.as_str()),
            }
        }
        Ok(out)
    }
}
