// Copyright (c) 2026 Unisearch Contributors. Licensed under the MIT license.
// See LICENSE file in the project root for full license text.

//! Search options.
//!
//! # Example
//!
//! ```
//! use unisearch::options::{OrderBy, SearchOptions};
//!
//! // Minimal options (uses defaults)
//! let options = SearchOptions::default();
//! assert_eq!(options.order, OrderBy::Ascending);
//! assert!(options.begin_with_wildcard && options.ending_with_wildcard);
//!
//! // Full options
//! let options = SearchOptions {
//!     order: OrderBy::Relevance,
//!     ignore_case: true,
//!     per_page: 25,
//!     ..Default::default()
//! };
//! ```

use serde::Deserialize;

/// Global ordering mode for the compiled result set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderBy {
    Ascending,
    Descending,
    /// Order by term-occurrence density, highest first.
    Relevance,
}

/// Options for one search invocation.
///
/// All fields have defaults matching the pattern-matching search mode:
/// ascending order by the coalesced order column, terms wrapped in wildcards
/// on both sides, whitespace splitting on, case-sensitive, non-phonetic.
#[derive(Debug, Clone, Deserialize)]
pub struct SearchOptions {
    /// Ordering mode (ascending/descending/relevance)
    #[serde(default = "default_order")]
    pub order: OrderBy,

    /// Type-precedence list: type names in priority order, used as the
    /// primary sort key. Types absent from the list sort last.
    #[serde(default)]
    pub type_order: Option<Vec<String>>,

    /// Prepend a wildcard to every term (default: true)
    #[serde(default = "default_true")]
    pub begin_with_wildcard: bool,

    /// Append a wildcard to every term (default: true)
    #[serde(default = "default_true")]
    pub ending_with_wildcard: bool,

    /// Match terms with a sounds-like comparison instead of a pattern.
    /// Phonetic terms are never wildcard-decorated.
    #[serde(default)]
    pub sounds_like: bool,

    /// Lowercase terms and columns before comparing
    #[serde(default)]
    pub ignore_case: bool,

    /// Split raw input on whitespace, honoring double-quoted phrases
    /// (default: true). When false the whole input is one term.
    #[serde(default = "default_true")]
    pub parse_term: bool,

    /// Page size for pagination (default: 15)
    #[serde(default = "default_per_page")]
    pub per_page: usize,

    /// Query-string variable holding the page. Empty means no pagination.
    #[serde(default)]
    pub page_name: String,

    /// Explicit page number; defaults to 1 when pagination is active
    #[serde(default)]
    pub page: Option<usize>,

    /// Use the simple pagination style (has-next only, no count query)
    #[serde(default)]
    pub simple_paginate: bool,
}

fn default_order() -> OrderBy {
    OrderBy::Ascending
}
fn default_true() -> bool {
    true
}
fn default_per_page() -> usize {
    15
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            order: default_order(),
            type_order: None,
            begin_with_wildcard: true,
            ending_with_wildcard: true,
            sounds_like: false,
            ignore_case: false,
            parse_term: true,
            per_page: default_per_page(),
            page_name: String::new(),
            page: None,
            simple_paginate: false,
        }
    }
}

impl SearchOptions {
    /// Whether this invocation paginates the compiled result set.
    pub fn paginates(&self) -> bool {
        !self.page_name.is_empty()
    }

    /// Resolved page number (1-based).
    pub fn current_page(&self) -> usize {
        self.page.unwrap_or(1).max(1)
    }
}
