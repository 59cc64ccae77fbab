// Copyright (c) 2026 Unisearch Contributors. Licensed under the MIT license.
// See LICENSE file in the project root for full license text.

//! Relevance scoring.
//!
//! The score of a row is an additive occurrence count: for every
//! (searchable column, undecorated term) pair, how many times does the
//! case-folded term occur in the case-folded column value. Sources backed by
//! SQL compute the same number with character-length arithmetic
//! (`char_length(lower(col)) - char_length(replace(lower(col), term,
//! term[1..]))`, coalesced to zero); [`occurrences`] is the in-memory
//! equivalent.
//!
//! Scoring requires a single flat row, so a source whose searchable columns
//! traverse a relation cannot be scored.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{Result, SearchError};
use crate::source::SourceDescriptor;
use crate::term::TermSet;

/// One (column, term) scoring pair. The term is stored case-folded; columns
/// are folded at evaluation time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScorePair {
    pub column: String,
    pub term: String,
}

/// The additive relevance expression for one source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreExpr {
    pairs: Vec<ScorePair>,
}

impl ScoreExpr {
    /// Build the score expression for a source.
    ///
    /// Fails with [`SearchError::Relevance`] when any searchable column path
    /// traverses a relation; the caller must surface this before any storage
    /// round trip.
    pub fn build(source: &SourceDescriptor, terms: &TermSet) -> Result<ScoreExpr> {
        let paths = source.searchable_paths();

        if paths.iter().any(|path| path.contains('.')) {
            return Err(SearchError::Relevance);
        }

        let pairs = paths
            .iter()
            .flat_map(|column| {
                terms.terms().iter().map(move |term| ScorePair {
                    column: column.clone(),
                    term: term.text().to_lowercase(),
                })
            })
            .collect();

        Ok(ScoreExpr { pairs })
    }

    pub fn pairs(&self) -> &[ScorePair] {
        &self.pairs
    }

    /// Evaluate the expression against one JSON document.
    pub fn evaluate(&self, document: &Value) -> f64 {
        self.pairs
            .iter()
            .map(|pair| {
                document
                    .get(&pair.column)
                    .and_then(Value::as_str)
                    .map_or(0, |text| occurrences(text, &pair.term))
            })
            .sum::<usize>() as f64
    }
}

/// Count case-folded, non-overlapping occurrences of `term` in `text`.
pub fn occurrences(text: &str, term: &str) -> usize {
    if term.is_empty() {
        return 0;
    }
    text.to_lowercase().matches(&term.to_lowercase()).count()
}
