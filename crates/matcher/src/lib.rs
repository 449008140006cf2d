//! # Overlap reconstruction (`matcher`)
//!
//! ## Purpose
//!
//! `matcher` takes a query text with its fingerprints and a candidate hit
//! text (found by an external index through shared tokens) and works out
//! exactly which character ranges of the two texts overlap. It then turns
//! those ranges into excerpts fit for display.
//!
//! ## Reconstruction
//!
//! 1. The hit is re-winnowed and every query fingerprint whose token also
//!    occurs in the hit seeds a match. Two fingerprints sharing a token but
//!    not their n-gram text is a fatal [`MatchError::FingerprintMismatch`].
//! 2. Gaps around and between seeds are searched for words common to both
//!    texts, which become extra matches.
//! 3. Matches are sorted by query position and grown character by character
//!    while both texts agree, ignoring case and treating any whitespace run
//!    as equal to any other. Neighbors that would cross are pulled apart.
//! 4. Query and hit ranges are sorted and merged independently into
//!    [`Overlaps`].
//!
//! ## Core types
//!
//! - [`Reconstructor`]: winnower plus [`MatchConfig`]; stateless and `Sync`.
//! - [`Overlaps`]: merged [`Range`] lists for the query and the hit.
//! - [`HitSection`]: one rendered excerpt, built by [`segment`].
//!
//! ## Example usage
//!
//! ```
//! use canonical::Normalizer;
//! use matcher::{MatchConfig, Range, Reconstructor};
//! use perceptual::{PerceptualConfig, Winnower};
//!
//! let cfg = PerceptualConfig::new().with_ngram_size(4).with_window_size(3);
//! let winnower = Winnower::new(Normalizer::identity(), cfg).unwrap();
//! let reconstructor = Reconstructor::new(winnower, MatchConfig::default()).unwrap();
//!
//! let query = "the quick brown fox jumps";
//! let query_fp = reconstructor.winnower().fingerprint(query).unwrap();
//! let overlaps = reconstructor
//!     .reconstruct(query, &query_fp, "the quick brown fox leaps")
//!     .unwrap();
//!
//! assert_eq!(overlaps.query, vec![Range::new(0, 18)]);
//! ```

pub mod engine;
pub mod excerpt;
mod merge;
pub mod types;
mod words;

pub use crate::engine::Reconstructor;
pub use crate::excerpt::{cut_location, mark_all, mark_ranges, segment, ExcerptConfig, HitSection, Markers};
pub use crate::merge::merge_ranges;
pub use crate::types::{Direction, MatchConfig, MatchError, Overlaps, Range};
pub use crate::words::{end_of_sentence, index_of_word_ignore_case, is_highlight_space, words_between};
