//! Retrieval-facing views of a fingerprint set.
//!
//! Candidate retrieval happens outside this crate, in an inverted index that
//! stores one [`IndexableDocument::contents`] per corpus document and is
//! searched with the OR of a query's tokens.

use serde::{Deserialize, Serialize};

use crate::fingerprint::FingerprintSet;

/// Headroom added to the clause hint on top of the token count.
pub const CLAUSE_HEADROOM: usize = 1000;

/// Tokens to OR together when searching for candidate hits.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TokenQuery {
    pub terms: Vec<String>,
    /// Upper bound on boolean clauses the search backend should allow for
    /// this query. Passed to the backend instead of raising a global limit.
    pub max_clause_hint: usize,
}

impl TokenQuery {
    /// Each term preceded by a space, the form the index expects.
    pub fn to_query_string(&self) -> String {
        let mut out = String::with_capacity(self.terms.iter().map(|t| t.len() + 1).sum());
        for term in &self.terms {
            out.push(' ');
            out.push_str(term);
        }
        out
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }
}

/// Build the token query for a fingerprint set.
pub fn token_query(set: &FingerprintSet) -> TokenQuery {
    let terms: Vec<String> = set.tokens().map(str::to_owned).collect();
    TokenQuery {
        max_clause_hint: terms.len() + CLAUSE_HEADROOM,
        terms,
    }
}

/// What an external index stores for one corpus document.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct IndexableDocument {
    /// Normalized text, a newline, the normalized extra data and a newline
    /// when present, then every token preceded by a space.
    pub contents: String,
    pub fingerprints: FingerprintSet,
}
