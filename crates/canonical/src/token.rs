//! Boolean keyword query splitting.
//!
//! Keyword queries are normalized like document text, except that the
//! operators `AND`, `OR` and `NOT` must survive case folding. An operator is
//! only recognized in upper case and when delimited by non-letters on both
//! sides, so `ORANGE`, `and` and a trailing `OR` are plain text.

use serde::{Deserialize, Serialize};

/// Boolean operator understood by the keyword search collaborator.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum BooleanOp {
    And,
    Or,
    Not,
}

impl BooleanOp {
    const ALL: [BooleanOp; 3] = [BooleanOp::And, BooleanOp::Or, BooleanOp::Not];

    pub fn as_str(self) -> &'static str {
        match self {
            BooleanOp::And => "AND",
            BooleanOp::Or => "OR",
            BooleanOp::Not => "NOT",
        }
    }
}

/// One piece of a split keyword query.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum QueryPart {
    Text(String),
    Operator(BooleanOp),
}

/// Split `query` into alternating text parts and operators.
///
/// The result always starts and ends with a [`QueryPart::Text`] (possibly
/// empty), and text parts keep their surrounding delimiters.
///
/// ```rust
/// use canonical::{split_boolean, BooleanOp, QueryPart};
///
/// let parts = split_boolean("fox AND hound");
/// assert_eq!(
///     parts,
///     vec![
///         QueryPart::Text("fox ".into()),
///         QueryPart::Operator(BooleanOp::And),
///         QueryPart::Text(" hound".into()),
///     ]
/// );
/// ```
pub fn split_boolean(query: &str) -> Vec<QueryPart> {
    let chars: Vec<char> = query.chars().collect();
    let is_gap = |i: usize| chars.get(i).is_some_and(|c| !c.is_ascii_alphabetic());
    let slice = |from: usize, to: usize| chars[from..to].iter().collect::<String>();

    let mut parts = Vec::new();
    let mut last = 0usize;
    let mut i = 0usize;
    while i < chars.len() {
        if is_gap(i) {
            let found = BooleanOp::ALL.into_iter().find(|op| {
                let word: Vec<char> = op.as_str().chars().collect();
                let end = i + 1 + word.len();
                is_gap(end) && chars[i + 1..end] == word[..]
            });
            if let Some(op) = found {
                let len = op.as_str().len();
                parts.push(QueryPart::Text(slice(last, i + 1)));
                parts.push(QueryPart::Operator(op));
                last = i + 1 + len;
                i += len;
            }
        }
        i += 1;
    }
    parts.push(QueryPart::Text(slice(last, chars.len())));
    parts
}
