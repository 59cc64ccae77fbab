// Copyright (c) 2026 Unisearch Contributors. Licensed under the MIT license.
// See LICENSE file in the project root for full license text.

//! In-memory queryable source.
//!
//! [`MemorySource`] stores JSON documents and evaluates the predicate AST
//! directly, mirroring the semantics a SQL source gets from the rendered
//! plan: `%` pattern matching, lowered comparison, soundex for the
//! sounds-like operator, whole-word matching for full-text groups.
//!
//! Related rows live embedded in the parent document as arrays, so an
//! existential relation check walks into `doc[relation]`:
//!
//! ```
//! use serde_json::json;
//! use unisearch::memory::MemorySource;
//!
//! let posts = MemorySource::new("post");
//! posts.push(json!({
//!     "id": 1,
//!     "title": "hello",
//!     "comments": [{"body": "interesting"}],
//! }));
//! assert_eq!(posts.len(), 1);
//! ```

use parking_lot::RwLock;
use serde_json::Value;

use crate::error::Result;
use crate::phonetic::sounds_like;
use crate::predicate::{MatchOperator, MatchPredicate, Predicate};
use crate::source::{CandidateRow, Entity, Key, OrderValue, QueryableSource, SourceQuery};

pub struct MemorySource {
    type_name: String,
    key_column: String,
    updated_at_column: Option<String>,
    documents: RwLock<Vec<Value>>,
}

impl MemorySource {
    #[must_use]
    pub fn new(type_name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            key_column: "id".to_string(),
            updated_at_column: None,
            documents: RwLock::new(Vec::new()),
        }
    }

    /// Use a different key column (default: `id`).
    #[must_use]
    pub fn with_key_column(mut self, column: impl Into<String>) -> Self {
        self.key_column = column.into();
        self
    }

    /// Declare the update-timestamp column this source tracks; it becomes
    /// the default order column at registration.
    #[must_use]
    pub fn with_updated_at_column(mut self, column: impl Into<String>) -> Self {
        self.updated_at_column = Some(column.into());
        self
    }

    /// Append one document.
    pub fn push(&self, document: Value) {
        self.documents.write().push(document);
    }

    /// Append many documents.
    pub fn extend(&self, documents: impl IntoIterator<Item = Value>) {
        self.documents.write().extend(documents);
    }

    /// Current document count
    #[must_use]
    pub fn len(&self) -> usize {
        self.documents.read().len()
    }

    /// Check if empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.documents.read().is_empty()
    }

    /// Clear all documents
    pub fn clear(&self) {
        self.documents.write().clear();
    }

    fn matches(&self, predicate: &Predicate, document: &Value) -> bool {
        match predicate {
            Predicate::All => true,
            Predicate::Match(m) => self.matches_field(m, document),
            Predicate::Exists { relation, inner } => related_rows(document, relation)
                .iter()
                .any(|row| self.matches(inner, row)),
            Predicate::FullText { columns, query, .. } => columns.iter().any(|column| {
                field_text(document, column)
                    .map(|text| full_text_match(&text, query))
                    .unwrap_or(false)
            }),
            Predicate::Or(branches) => branches.iter().any(|b| self.matches(b, document)),
            Predicate::And(branches) => branches.iter().all(|b| self.matches(b, document)),
        }
    }

    fn matches_field(&self, m: &MatchPredicate, document: &Value) -> bool {
        let Some(text) = field_text(document, &m.column) else {
            return false;
        };

        match m.operator {
            MatchOperator::Like => like(&m.term, &text),
            MatchOperator::LikeLower => like(&m.term, &text.to_lowercase()),
            MatchOperator::SoundsLike => sounds_like(&text, &m.term),
        }
    }
}

impl QueryableSource for MemorySource {
    fn type_name(&self) -> &str {
        &self.type_name
    }

    fn key_column(&self) -> &str {
        &self.key_column
    }

    fn updated_at_column(&self) -> Option<&str> {
        self.updated_at_column.as_deref()
    }

    fn execute(&self, query: &SourceQuery) -> Result<Vec<CandidateRow>> {
        let documents = self.documents.read();

        let rows = documents
            .iter()
            .filter(|doc| self.matches(&query.predicate, doc))
            .filter_map(|doc| {
                let Some(key) = doc.get(&query.key_column).and_then(Key::from_value) else {
                    tracing::warn!(
                        source = %self.type_name,
                        key_column = %query.key_column,
                        "document without a key column, skipping"
                    );
                    return None;
                };
                let order = doc
                    .get(&query.order_column)
                    .map_or(OrderValue::Null, OrderValue::from_value);
                let score = query.score.as_ref().map(|expr| expr.evaluate(doc));
                Some(CandidateRow { key, order, score })
            })
            .collect();

        Ok(rows)
    }

    fn fetch_by_keys(&self, keys: &[Key]) -> Result<Vec<Entity>> {
        let documents = self.documents.read();

        Ok(documents
            .iter()
            .filter_map(|doc| {
                let key = doc.get(&self.key_column).and_then(Key::from_value)?;
                keys.contains(&key)
                    .then(|| Entity::new(key, doc.clone()))
            })
            .collect())
    }
}

/// The rows reachable through a relation: an array of related documents, or
/// a single embedded document for to-one relations.
fn related_rows<'a>(document: &'a Value, relation: &str) -> Vec<&'a Value> {
    match document.get(relation) {
        Some(Value::Array(rows)) => rows.iter().collect(),
        Some(row @ Value::Object(_)) => vec![row],
        _ => Vec::new(),
    }
}

/// A field rendered as text. Numbers and booleans stringify the way SQL
/// coerces them in a LIKE comparison.
fn field_text(document: &Value, column: &str) -> Option<String> {
    match document.get(column)? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(if *b { "1".into() } else { "0".into() }),
        _ => None,
    }
}

/// SQL LIKE with `%` wildcards.
fn like(pattern: &str, text: &str) -> bool {
    let segments: Vec<&str> = pattern.split('%').collect();

    if segments.len() == 1 {
        return text == pattern;
    }

    let mut remaining = text;

    for (i, segment) in segments.iter().enumerate() {
        if segment.is_empty() {
            continue;
        }
        if i == 0 {
            match remaining.strip_prefix(segment) {
                Some(rest) => remaining = rest,
                None => return false,
            }
        } else if i == segments.len() - 1 {
            return remaining.ends_with(segment);
        } else {
            match remaining.find(segment) {
                Some(at) => remaining = &remaining[at + segment.len()..],
                None => return false,
            }
        }
    }

    true
}

/// Natural-language full-text match: any whole word of any query term
/// appears in the text, case-folded.
fn full_text_match(text: &str, query: &str) -> bool {
    let words: Vec<String> = text
        .to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .map(str::to_string)
        .collect();

    query
        .to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .any(|term| words.iter().any(|word| word == term))
}
