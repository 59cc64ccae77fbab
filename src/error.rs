// Copyright (c) 2026 Unisearch Contributors. Licensed under the MIT license.
// See LICENSE file in the project root for full license text.

//! Error types for unisearch.
//!
//! Configuration problems are reported during compilation, before any storage
//! round trip. Backend errors are propagated unchanged: this crate performs
//! no retries and assumes the storage collaborator owns its own
//! transient-failure policy.

use thiserror::Error;

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, SearchError>;

#[derive(Error, Debug)]
pub enum SearchError {
    /// Relevance ordering was requested while a source searches through a
    /// nested relation column. Fix the configuration; retrying won't help.
    #[error("ordering by relevance through nested relations is not possible")]
    Relevance,

    /// Invalid search configuration (empty source list, unresolved order
    /// column, malformed relation path, ...).
    #[error("configuration error: {0}")]
    Config(String),

    /// Storage backend error, propagated unchanged from the queryable source.
    #[error("backend error: {0}")]
    Backend(String),
}

impl SearchError {
    pub fn config(msg: impl Into<String>) -> Self {
        SearchError::Config(msg.into())
    }

    pub fn backend(msg: impl Into<String>) -> Self {
        SearchError::Backend(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn relevance_message_is_stable() {
        // Callers match on this message in their own error reporting.
        assert_eq!(
            SearchError::Relevance.to_string(),
            "ordering by relevance through nested relations is not possible"
        );
    }

    #[test]
    fn config_wraps_message() {
        let err = SearchError::config("no sources registered");
        assert_eq!(err.to_string(), "configuration error: no sources registered");
    }
}
