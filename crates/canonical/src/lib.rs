//! Position-preserving text normalization.
//!
//! This crate turns raw document text into the normalized character stream
//! that winnowing fingerprints are computed over, while remembering for every
//! emitted character where it came from in the original text. Those offsets
//! are what later lets overlap reconstruction point at exact spans of the
//! original documents.
//!
//! ## What we do
//!
//! - ASCII case folding
//! - Markup-aware whitespace collapsing: every run of non-letters (including
//!   `<br>` style line-break tags) becomes a single space
//! - Longest-prefix subword remapping from a `from=to` table, applied to a
//!   fixed point with a bounded number of rewrites
//! - Keyword query normalization that keeps `AND` / `OR` / `NOT` operators
//!
//! ## Stages
//!
//! Each stage implements [`PositionedRead`] and owns the stage before it.
//! [`PipelineBuilder`] composes them; [`Normalizer`] wraps the usual
//! composition behind a validated [`CanonicalizeConfig`] and a shared
//! [`MappingTable`].
//!
//! ```rust
//! use canonical::{normalize, MappingTable};
//!
//! let table = MappingTable::parse("ye=the");
//! let out = normalize("Ye olde, CAT", &table).unwrap();
//! assert_eq!(out.text(), "the olde cat");
//! assert_eq!(out.offsets()[..4], [0, 0, 0, 2]);
//! ```
//!
//! ## Invariants worth knowing
//!
//! - Offsets are character indices, never byte indices
//! - Output depends only on text, config and mapping table
//! - No I/O except [`MappingTable::load`]; a missing mapping file degrades to
//!   the identity mapping with a warning

mod config;
mod error;
mod mapping;
mod pipeline;
mod stream;
mod token;
mod whitespace;

pub use crate::config::{CanonicalizeConfig, DEFAULT_MARKUP, DEFAULT_MAX_REWRITES};
pub use crate::error::CanonicalError;
pub use crate::mapping::MappingTable;
pub use crate::pipeline::{normalize, CaseFold, Normalizer, PipelineBuilder, SubwordMap};
pub use crate::stream::{PositionedChar, PositionedRead, PositionedStream, StreamReader, TextSource};
pub use crate::token::{split_boolean, BooleanOp, QueryPart};
pub use crate::whitespace::{is_letter, MarkupCollapse, MarkupToken};
