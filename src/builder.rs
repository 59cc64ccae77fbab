// Copyright (c) 2026 Unisearch Contributors. Licensed under the MIT license.
// See LICENSE file in the project root for full license text.

//! The fluent search builder.
//!
//! [`Search::new`] returns a fresh builder per search session; callers hold
//! the value and thread it through registration and option calls. A builder
//! is stateless across separate `search`/`count` calls beyond its
//! registrations: every call recompiles and re-executes.
//!
//! ```
//! use std::sync::Arc;
//! use serde_json::json;
//! use unisearch::{MemorySource, Search};
//!
//! let posts = Arc::new(MemorySource::new("post"));
//! posts.push(json!({"id": 1, "title": "hello world"}));
//! let videos = Arc::new(MemorySource::new("video"));
//! videos.push(json!({"id": 1, "title": "hello tube", "subtitle": "world"}));
//!
//! let results = Search::new()
//!     .in_source(posts, ["title"])
//!     .in_source(videos, ["title", "subtitle"])
//!     .search("hello")
//!     .unwrap();
//!
//! assert_eq!(results.len(), 2);
//! ```

use std::sync::Arc;

use crate::compiler;
use crate::error::{Result, SearchError};
use crate::hydrate::{self, Page, SearchResult, SimplePage};
use crate::options::{OrderBy, SearchOptions};
use crate::predicate::FullTextOptions;
use crate::source::{FullTextColumns, QueryableSource, SourceDescriptor};
use crate::term::{self, TermSet};

/// Builder-style entry point for cross-source searches.
#[derive(Default)]
pub struct Search {
    sources: Vec<SourceDescriptor>,
    options: SearchOptions,
    // Configuration mistakes made on the fluent surface are deferred and
    // surfaced at compile time, before any storage round trip.
    deferred_error: Option<String>,
}

impl Search {
    /// A fresh builder: ascending order, both wildcards, term parsing on.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a source to search through. The order column defaults to
    /// the handle's update-timestamp column, else its key column.
    pub fn in_source<C, S>(self, handle: Arc<dyn QueryableSource>, columns: C) -> Self
    where
        C: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.in_source_ordered(handle, columns, None)
    }

    /// Register a source with an explicit order column.
    pub fn in_source_ordered<C, S>(
        mut self,
        handle: Arc<dyn QueryableSource>,
        columns: C,
        order_column: Option<&str>,
    ) -> Self
    where
        C: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let index = self.sources.len();
        self.sources.push(SourceDescriptor::new(
            handle,
            columns.into_iter().map(Into::into).collect(),
            order_column.map(str::to_string),
            index,
        ));
        self
    }

    /// Register many sources at once. Each entry may carry its own order
    /// column; `None` falls back to the per-source default.
    pub fn in_many<'a, I, C, S>(self, registrations: I) -> Self
    where
        I: IntoIterator<Item = (Arc<dyn QueryableSource>, C, Option<&'a str>)>,
        C: IntoIterator<Item = S>,
        S: Into<String>,
    {
        registrations
            .into_iter()
            .fold(self, |builder, (handle, columns, order_column)| {
                builder.in_source_ordered(handle, columns, order_column)
            })
    }

    /// Register a source searched with the engine's native full-text
    /// operator. `columns` is either the source's own column list or a
    /// relation -> columns mapping; multiple relation groups are OR-ed under
    /// one outer predicate.
    pub fn in_full_text_source(
        mut self,
        handle: Arc<dyn QueryableSource>,
        columns: FullTextColumns,
        options: FullTextOptions,
        order_column: Option<&str>,
    ) -> Self {
        let index = self.sources.len();
        self.sources.push(SourceDescriptor::full_text(
            handle,
            columns,
            options,
            order_column.map(str::to_string),
            index,
        ));
        self
    }

    /// Refine the order column of the most recently registered source.
    pub fn order_by_column(mut self, column: impl Into<String>) -> Self {
        match self.sources.last_mut() {
            Some(source) => source.set_order_column(column),
            None => {
                self.deferred_error =
                    Some("order_by_column called before any source was registered".to_string());
            }
        }
        self
    }

    /// Sort the results in ascending order (default).
    pub fn order_by_asc(mut self) -> Self {
        self.options.order = OrderBy::Ascending;
        self
    }

    /// Sort the results in descending order.
    pub fn order_by_desc(mut self) -> Self {
        self.options.order = OrderBy::Descending;
        self
    }

    /// Sort the results by term-occurrence density, highest first.
    pub fn order_by_relevance(mut self) -> Self {
        self.options.order = OrderBy::Relevance;
        self
    }

    /// Sort the results by type precedence: types earlier in the list come
    /// first, types absent from it come last.
    pub fn order_by_type<I, S>(mut self, types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.options.type_order = Some(types.into_iter().map(Into::into).collect());
        self
    }

    /// Begin every term with a wildcard.
    pub fn begin_with_wildcard(mut self, state: bool) -> Self {
        self.options.begin_with_wildcard = state;
        self
    }

    /// End every term with a wildcard.
    pub fn ending_with_wildcard(mut self, state: bool) -> Self {
        self.options.ending_with_wildcard = state;
        self
    }

    /// Lowercase terms and columns before comparing.
    pub fn ignore_case(mut self, state: bool) -> Self {
        self.options.ignore_case = state;
        self
    }

    /// Use the sounds-like operator instead of pattern matching.
    pub fn sounds_like(mut self, state: bool) -> Self {
        self.options.sounds_like = state;
        self
    }

    /// Keep the raw input as a single term instead of splitting it.
    pub fn dont_parse_term(mut self) -> Self {
        self.options.parse_term = false;
        self
    }

    /// Paginate with the counted style (total + pages).
    pub fn paginate(mut self, per_page: usize, page_name: &str, page: Option<usize>) -> Self {
        self.options.per_page = per_page;
        self.options.page_name = page_name.to_string();
        self.options.page = page;
        self.options.simple_paginate = false;
        self
    }

    /// Paginate with the simple style (has-next only, no count).
    pub fn simple_paginate(
        mut self,
        per_page: usize,
        page_name: &str,
        page: Option<usize>,
    ) -> Self {
        self = self.paginate(per_page, page_name, page);
        self.options.simple_paginate = true;
        self
    }

    /// Apply `then` when the condition holds. Ordinary branching on the
    /// fluent surface, nothing more.
    pub fn when(self, condition: bool, then: impl FnOnce(Self) -> Self) -> Self {
        if condition {
            then(self)
        } else {
            self
        }
    }

    /// Apply `then` when the condition holds, `otherwise` when it doesn't.
    pub fn when_or(
        self,
        condition: bool,
        then: impl FnOnce(Self) -> Self,
        otherwise: impl FnOnce(Self) -> Self,
    ) -> Self {
        if condition {
            then(self)
        } else {
            otherwise(self)
        }
    }

    /// Split raw input into terms, independent of any registered source.
    pub fn parse_terms(raw: &str) -> Vec<String> {
        term::split_terms(raw)
    }

    /// Split raw input and feed every `(term, index)` pair to a visitor.
    pub fn parse_terms_with<F>(raw: &str, visitor: F) -> Vec<String>
    where
        F: FnMut(&str, usize),
    {
        term::split_terms_with(raw, visitor)
    }

    /// Count matching rows across all sources without hydrating.
    pub fn count(&self, terms: &str) -> Result<usize> {
        Ok(self.compiled_rows(terms)?.len())
    }

    /// Execute the search: parse, compile, execute, paginate (when
    /// configured) and hydrate.
    pub fn search(&self, terms: &str) -> Result<SearchResult> {
        let rows = self.compiled_rows(terms)?;

        if !self.options.paginates() {
            return Ok(SearchResult::Collection(hydrate::hydrate(
                &rows,
                &self.sources,
            )?));
        }

        let per_page = self.options.per_page.max(1);
        let current_page = self.options.current_page();
        let offset = (current_page - 1) * per_page;

        if self.options.simple_paginate {
            // Probe one row past the page instead of counting.
            let window: Vec<_> = rows
                .iter()
                .skip(offset)
                .take(per_page + 1)
                .cloned()
                .collect();
            let has_more = window.len() > per_page;
            let window = &window[..window.len().min(per_page)];

            return Ok(SearchResult::SimplePage(SimplePage {
                hits: hydrate::hydrate(window, &self.sources)?,
                per_page,
                current_page,
                has_more,
                page_name: self.options.page_name.clone(),
            }));
        }

        let total = rows.len();
        let last_page = total.div_ceil(per_page).max(1);
        let window: Vec<_> = rows.iter().skip(offset).take(per_page).cloned().collect();

        Ok(SearchResult::Page(Page {
            hits: hydrate::hydrate(&window, &self.sources)?,
            total,
            per_page,
            current_page,
            last_page,
            page_name: self.options.page_name.clone(),
        }))
    }

    fn compiled_rows(&self, terms: &str) -> Result<Vec<compiler::CompiledRow>> {
        if let Some(message) = &self.deferred_error {
            return Err(SearchError::config(message.clone()));
        }

        let terms = TermSet::parse(terms, &self.options);
        let plan = compiler::compile(&self.sources, &terms, &self.options)?;
        compiler::execute(&plan, &self.sources, &self.options)
    }
}
