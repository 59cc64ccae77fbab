// Copyright (c) 2026 Unisearch Contributors. Licensed under the MIT license.
// See LICENSE file in the project root for full license text.

//! Queryable sources and their descriptors.
//!
//! A [`QueryableSource`] is the storage collaborator boundary: it applies a
//! composed predicate, projects candidate rows (key + order value + optional
//! score) and bulk-fetches entities by key. The crate ships
//! [`crate::memory::MemorySource`] for in-memory JSON documents; SQL-backed
//! callers can render the same plan with [`crate::sql`].
//!
//! A [`SourceDescriptor`] is one registered searchable surface: the handle,
//! its searchable column paths, key and order columns, and - for native
//! full-text sources - the column groups and engine options.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::Result;
use crate::predicate::{FullTextOptions, Predicate};
use crate::relevance::ScoreExpr;

/// An entity key. Sources key heterogeneously, so both integer and string
/// keys are supported; JSON scalars normalize via [`Key::from_value`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Key {
    Int(i64),
    Str(String),
}

impl Key {
    /// Normalize a JSON scalar into a key. Non-scalar values have no key
    /// representation.
    pub fn from_value(value: &Value) -> Option<Key> {
        match value {
            Value::Number(n) => n.as_i64().map(Key::Int),
            Value::String(s) => Some(Key::Str(s.clone())),
            _ => None,
        }
    }
}

impl From<i64> for Key {
    fn from(value: i64) -> Self {
        Key::Int(value)
    }
}

impl From<&str> for Key {
    fn from(value: &str) -> Self {
        Key::Str(value.to_string())
    }
}

impl From<String> for Key {
    fn from(value: String) -> Self {
        Key::Str(value)
    }
}

impl std::fmt::Display for Key {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Key::Int(n) => write!(f, "{n}"),
            Key::Str(s) => write!(f, "{s}"),
        }
    }
}

/// A projected order value, comparable across sources with different
/// schemas. Missing columns project as `Null`, which sorts first ascending.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OrderValue {
    Null,
    Int(i64),
    Float(f64),
    Str(String),
}

impl OrderValue {
    /// Normalize a JSON value into an order value.
    pub fn from_value(value: &Value) -> OrderValue {
        match value {
            Value::Number(n) => match n.as_i64() {
                Some(i) => OrderValue::Int(i),
                None => OrderValue::Float(n.as_f64().unwrap_or(0.0)),
            },
            Value::String(s) => OrderValue::Str(s.clone()),
            Value::Bool(b) => OrderValue::Int(i64::from(*b)),
            _ => OrderValue::Null,
        }
    }

    fn rank(&self) -> u8 {
        match self {
            OrderValue::Null => 0,
            OrderValue::Int(_) | OrderValue::Float(_) => 1,
            OrderValue::Str(_) => 2,
        }
    }
}

impl Eq for OrderValue {}

impl Ord for OrderValue {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        use OrderValue::*;
        match (self, other) {
            (Int(a), Int(b)) => a.cmp(b),
            (Float(a), Float(b)) => a.total_cmp(b),
            (Int(a), Float(b)) => (*a as f64).total_cmp(b),
            (Float(a), Int(b)) => a.total_cmp(&(*b as f64)),
            (Str(a), Str(b)) => a.cmp(b),
            _ => self.rank().cmp(&other.rank()),
        }
    }
}

impl PartialOrd for OrderValue {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

/// One hydrated entity: its key plus the JSON document the source returned.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    pub key: Key,
    pub document: Value,
}

impl Entity {
    pub fn new(key: impl Into<Key>, document: Value) -> Self {
        Self {
            key: key.into(),
            document,
        }
    }
}

/// The compiled sub-query one source executes: predicate as the filter,
/// key/order columns as the projection, optional relevance expression as an
/// extra projected column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceQuery {
    pub predicate: Predicate,
    pub key_column: String,
    pub order_column: String,
    pub score: Option<ScoreExpr>,
}

/// One projected candidate row from a source.
#[derive(Debug, Clone, PartialEq)]
pub struct CandidateRow {
    pub key: Key,
    pub order: OrderValue,
    pub score: Option<f64>,
}

/// The storage collaborator boundary.
///
/// Implementations own query execution and transient-failure policy; the
/// compiler calls `execute` exactly once per source per invocation and
/// `fetch_by_keys` at most once per source during hydration.
pub trait QueryableSource: Send + Sync {
    /// Stable type identifier, used to tag hydrated entities and to match
    /// against a type-precedence list.
    fn type_name(&self) -> &str;

    /// Name of the key column.
    fn key_column(&self) -> &str;

    /// Update-timestamp column, when the source tracks modification time.
    /// Used as the default order column.
    fn updated_at_column(&self) -> Option<&str> {
        None
    }

    /// Apply the predicate and project candidate rows.
    fn execute(&self, query: &SourceQuery) -> Result<Vec<CandidateRow>>;

    /// Bulk-fetch entities by key set.
    fn fetch_by_keys(&self, keys: &[Key]) -> Result<Vec<Entity>>;
}

/// A pre-filtered handle: the same capability surface, with a fixed
/// constraint AND-ed onto every executed predicate. The counterpart of
/// registering a pre-built partial query instead of a bare type.
pub struct FilteredSource<S> {
    inner: S,
    constraint: Predicate,
}

impl<S: QueryableSource> FilteredSource<S> {
    pub fn new(inner: S, constraint: Predicate) -> Self {
        Self { inner, constraint }
    }
}

impl<S: QueryableSource> QueryableSource for FilteredSource<S> {
    fn type_name(&self) -> &str {
        self.inner.type_name()
    }

    fn key_column(&self) -> &str {
        self.inner.key_column()
    }

    fn updated_at_column(&self) -> Option<&str> {
        self.inner.updated_at_column()
    }

    fn execute(&self, query: &SourceQuery) -> Result<Vec<CandidateRow>> {
        let constrained = SourceQuery {
            predicate: Predicate::And(vec![
                self.constraint.clone(),
                query.predicate.clone(),
            ]),
            ..query.clone()
        };
        self.inner.execute(&constrained)
    }

    fn fetch_by_keys(&self, keys: &[Key]) -> Result<Vec<Entity>> {
        self.inner.fetch_by_keys(keys)
    }
}

/// One full-text column group: the source's own columns, or a related
/// source's columns reached through `relation`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FullTextGroup {
    pub relation: Option<String>,
    pub columns: Vec<String>,
}

/// Column input for full-text registration: either the source's own columns
/// or a relation -> columns mapping.
#[derive(Debug, Clone, PartialEq)]
pub enum FullTextColumns {
    Own(Vec<String>),
    Relations(Vec<(String, Vec<String>)>),
}

impl FullTextColumns {
    fn into_groups(self) -> Vec<FullTextGroup> {
        match self {
            FullTextColumns::Own(columns) => vec![FullTextGroup {
                relation: None,
                columns,
            }],
            FullTextColumns::Relations(map) => map
                .into_iter()
                .map(|(relation, columns)| FullTextGroup {
                    relation: Some(relation),
                    columns,
                })
                .collect(),
        }
    }
}

/// One registered searchable source.
///
/// Created by the builder at registration time; immutable afterwards except
/// for the order column, which the builder may patch once for the most
/// recently registered source.
#[derive(Clone)]
pub struct SourceDescriptor {
    handle: Arc<dyn QueryableSource>,
    index: usize,
    columns: Vec<String>,
    order_column: String,
    full_text: bool,
    full_text_groups: Vec<FullTextGroup>,
    full_text_options: FullTextOptions,
}

impl SourceDescriptor {
    /// Register a pattern/phonetic-matching source. A missing order column
    /// defaults to the handle's update-timestamp column, else its key column.
    pub fn new(
        handle: Arc<dyn QueryableSource>,
        columns: Vec<String>,
        order_column: Option<String>,
        index: usize,
    ) -> Self {
        let order_column = order_column.unwrap_or_else(|| {
            handle
                .updated_at_column()
                .unwrap_or_else(|| handle.key_column())
                .to_string()
        });

        Self {
            handle,
            index,
            columns,
            order_column,
            full_text: false,
            full_text_groups: Vec::new(),
            full_text_options: FullTextOptions::default(),
        }
    }

    /// Register a native full-text source.
    pub fn full_text(
        handle: Arc<dyn QueryableSource>,
        columns: FullTextColumns,
        options: FullTextOptions,
        order_column: Option<String>,
        index: usize,
    ) -> Self {
        let mut source = Self::new(handle, Vec::new(), order_column, index);
        source.full_text = true;
        source.full_text_groups = columns.into_groups();
        source.full_text_options = options;
        source
    }

    pub fn handle(&self) -> &Arc<dyn QueryableSource> {
        &self.handle
    }

    /// Registration index; never reused, even for handles of the same type.
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn type_name(&self) -> &str {
        self.handle.type_name()
    }

    pub fn key_column(&self) -> &str {
        self.handle.key_column()
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Every searchable column path, including full-text group columns with
    /// their relation prefix. Relevance validation walks this set.
    pub fn searchable_paths(&self) -> Vec<String> {
        if !self.full_text {
            return self.columns.clone();
        }
        self.full_text_groups
            .iter()
            .flat_map(|group| {
                group.columns.iter().map(move |column| match &group.relation {
                    Some(relation) => format!("{relation}.{column}"),
                    None => column.clone(),
                })
            })
            .collect()
    }

    pub fn order_column(&self) -> &str {
        &self.order_column
    }

    /// Patch the order column after registration.
    pub fn set_order_column(&mut self, column: impl Into<String>) {
        self.order_column = column.into();
    }

    pub fn is_full_text(&self) -> bool {
        self.full_text
    }

    pub fn full_text_groups(&self) -> &[FullTextGroup] {
        &self.full_text_groups
    }

    pub fn full_text_options(&self) -> &FullTextOptions {
        &self.full_text_options
    }

    #[cfg(test)]
    pub(crate) fn for_tests(columns: &[&str], index: usize) -> Self {
        let handle = Arc::new(crate::memory::MemorySource::new("test"));
        Self::new(
            handle,
            columns.iter().map(|c| c.to_string()).collect(),
            None,
            index,
        )
    }

    #[cfg(test)]
    pub(crate) fn full_text_for_tests(groups: Vec<FullTextGroup>, index: usize) -> Self {
        let handle = Arc::new(crate::memory::MemorySource::new("test"));
        let mut source = Self::new(handle, Vec::new(), None, index);
        source.full_text = true;
        source.full_text_groups = groups;
        source
    }
}

impl std::fmt::Debug for SourceDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SourceDescriptor")
            .field("index", &self.index)
            .field("type_name", &self.type_name())
            .field("columns", &self.columns)
            .field("order_column", &self.order_column)
            .field("full_text", &self.full_text)
            .finish()
    }
}
