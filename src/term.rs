// Copyright (c) 2026 Unisearch Contributors. Licensed under the MIT license.
// See LICENSE file in the project root for full license text.

//! Term parsing.
//!
//! Raw user input is normalized into an ordered list of [`SearchTerm`]s
//! before any predicate is composed. Splitting is CSV-style: space-separated
//! tokens, with a double-quoted run kept verbatim as one term, so
//! `"bar bar" baz` yields the terms `bar bar` and `baz`. Blank tokens are
//! dropped.
//!
//! Each term carries two forms: the undecorated text (used for relevance
//! counting and phonetic comparison) and the wildcard-decorated pattern (used
//! by the pattern-match operator). Phonetic terms are never decorated.

use serde::{Deserialize, Serialize};

use crate::options::SearchOptions;

/// One normalized unit of search input (word or quoted phrase).
///
/// Immutable once created from a raw token plus an option set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchTerm {
    text: String,
    pattern: String,
    phonetic: bool,
}

impl SearchTerm {
    fn new(token: &str, options: &SearchOptions) -> Self {
        let text = if options.ignore_case {
            token.to_lowercase()
        } else {
            token.to_string()
        };

        let pattern = if options.sounds_like {
            text.clone()
        } else {
            format!(
                "{}{}{}",
                if options.begin_with_wildcard { "%" } else { "" },
                text,
                if options.ending_with_wildcard { "%" } else { "" },
            )
        };

        Self {
            text,
            pattern,
            phonetic: options.sounds_like,
        }
    }

    /// The undecorated term text (case-folded when the options say so).
    pub fn text(&self) -> &str {
        &self.text
    }

    /// The wildcard-decorated pattern. Equal to [`text`](Self::text) in
    /// phonetic mode.
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// Whether this term is compared with the sounds-like operator.
    pub fn is_phonetic(&self) -> bool {
        self.phonetic
    }
}

/// The normalized terms of one invocation, plus the raw input they came from.
///
/// The raw input survives because native full-text predicates match against
/// it directly rather than against the split terms.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TermSet {
    raw: String,
    terms: Vec<SearchTerm>,
}

impl TermSet {
    /// Parse raw input under the given options.
    pub fn parse(raw: &str, options: &SearchOptions) -> Self {
        let tokens = if options.parse_term {
            split_terms(raw)
        } else {
            vec![raw.to_string()]
        };

        let terms = tokens
            .iter()
            .filter(|t| !t.is_empty())
            .map(|t| SearchTerm::new(t, options))
            .collect();

        Self {
            raw: raw.to_string(),
            terms,
        }
    }

    pub fn raw(&self) -> &str {
        &self.raw
    }

    pub fn terms(&self) -> &[SearchTerm] {
        &self.terms
    }

    /// An empty term set disables term predicates entirely: the search
    /// matches everything while ordering and pagination stay active.
    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }
}

/// Split raw input into tokens, CSV-style.
///
/// Space is the separator and an unescaped double quote toggles phrase mode;
/// a quoted run is one token verbatim. Empty tokens (repeated separators,
/// leading/trailing blanks) are dropped.
pub fn split_terms(raw: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;

    for ch in raw.chars() {
        match ch {
            '"' => in_quotes = !in_quotes,
            c if c.is_whitespace() && !in_quotes => {
                if !current.is_empty() {
                    tokens.push(std::mem::take(&mut current));
                }
            }
            c => current.push(c),
        }
    }

    if !current.is_empty() {
        tokens.push(current);
    }

    tokens
}

/// Split raw input and feed every `(term, index)` pair to a visitor.
///
/// The visitor is purely for caller introspection; it cannot change the
/// output.
pub fn split_terms_with<F>(raw: &str, mut visitor: F) -> Vec<String>
where
    F: FnMut(&str, usize),
{
    let tokens = split_terms(raw);
    for (index, token) in tokens.iter().enumerate() {
        visitor(token, index);
    }
    tokens
}
