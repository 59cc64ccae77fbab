// Copyright (c) 2026 Unisearch Contributors. Licensed under the MIT license.
// See LICENSE file in the project root for full license text.

//! Result hydration.
//!
//! The compiled rows only carry keys; hydration resolves them to typed
//! entities with one bulk fetch per source, then reassembles the final list
//! in the order the compiler already decided. Hydration never changes row
//! count or order. A failed fetch aborts the whole search - no partial
//! result is returned.

use std::collections::HashMap;

use serde::Serialize;
use serde_json::Value;

use crate::compiler::CompiledRow;
use crate::error::{Result, SearchError};
use crate::source::{Key, SourceDescriptor};

/// One search hit: the entity document tagged with its source's type name.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Hit {
    /// Type identifier of the producing source
    pub type_name: String,
    pub key: Key,
    pub document: Value,
}

/// A counted page: total row count and page arithmetic included.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Page {
    pub hits: Vec<Hit>,
    pub total: usize,
    pub per_page: usize,
    pub current_page: usize,
    pub last_page: usize,
    pub page_name: String,
}

/// A simple page: only knows whether a next page exists, so no count query
/// is needed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimplePage {
    pub hits: Vec<Hit>,
    pub per_page: usize,
    pub current_page: usize,
    pub has_more: bool,
    pub page_name: String,
}

/// The outcome of a search: a plain ordered collection, or one of the two
/// pagination styles.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum SearchResult {
    Collection(Vec<Hit>),
    Page(Page),
    SimplePage(SimplePage),
}

impl SearchResult {
    pub fn hits(&self) -> &[Hit] {
        match self {
            SearchResult::Collection(hits) => hits,
            SearchResult::Page(page) => &page.hits,
            SearchResult::SimplePage(page) => &page.hits,
        }
    }

    pub fn into_hits(self) -> Vec<Hit> {
        match self {
            SearchResult::Collection(hits) => hits,
            SearchResult::Page(page) => page.hits,
            SearchResult::SimplePage(page) => page.hits,
        }
    }

    pub fn len(&self) -> usize {
        self.hits().len()
    }

    pub fn is_empty(&self) -> bool {
        self.hits().is_empty()
    }
}

/// Resolve compiled rows to typed entities, preserving their order.
///
/// Issues exactly one `fetch_by_keys` per source with at least one
/// surviving key. The fetches target disjoint key sets on independent
/// sources; they run sequentially here, and any failure aborts the search.
pub fn hydrate(rows: &[CompiledRow], sources: &[SourceDescriptor]) -> Result<Vec<Hit>> {
    let mut keys_per_source: HashMap<usize, Vec<Key>> = HashMap::new();
    for row in rows {
        keys_per_source
            .entry(row.source_index)
            .or_default()
            .push(row.key.clone());
    }

    let mut fetched: HashMap<usize, HashMap<Key, Value>> = HashMap::new();
    for (&source_index, keys) in &keys_per_source {
        let entities = sources[source_index].handle().fetch_by_keys(keys)?;
        fetched.insert(
            source_index,
            entities
                .into_iter()
                .map(|entity| (entity.key, entity.document))
                .collect(),
        );
    }

    rows.iter()
        .map(|row| {
            let document = fetched
                .get(&row.source_index)
                .and_then(|batch| batch.get(&row.key))
                .cloned()
                .ok_or_else(|| {
                    SearchError::backend(format!(
                        "entity {} of source '{}' disappeared during hydration",
                        row.key,
                        sources[row.source_index].type_name()
                    ))
                })?;

            Ok(Hit {
                type_name: sources[row.source_index].type_name().to_string(),
                key: row.key.clone(),
                document,
            })
        })
        .collect()
}
