// Copyright (c) 2026 Unisearch Contributors. Licensed under the MIT license.
// See LICENSE file in the project root for full license text.

//! # Unisearch
//!
//! Cross-source search: one textual query searched across several
//! independently-shaped sources, merged into a single ranked, paginated,
//! typed result list.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                       Term Parser                           │
//! │  • CSV-style splitting, quoted phrases, blank-dropping      │
//! │  • Wildcard decoration / case folding / phonetic terms      │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │              Predicate Composer + Relevance Scorer          │
//! │  • Per-source predicate trees (pattern/phonetic/full-text)  │
//! │  • Nested relation paths as existential sub-predicates      │
//! │  • Occurrence-count score expression per flat source        │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      Query Compiler                         │
//! │  • One sub-query per source, validated up front             │
//! │  • Tagged-row union, global ordering, entity dedupe         │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │                     Result Hydrator                         │
//! │  • One bulk fetch per source, compiled order preserved      │
//! │  • Counted or simple pagination over the compiled rows      │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```
//! use std::sync::Arc;
//! use serde_json::json;
//! use unisearch::{MemorySource, Search};
//!
//! let posts = Arc::new(MemorySource::new("post"));
//! posts.push(json!({"id": 1, "title": "apple pie"}));
//! posts.push(json!({"id": 2, "title": "banana bread"}));
//!
//! let videos = Arc::new(MemorySource::new("video"));
//! videos.push(json!({"id": 1, "title": "apple tasting"}));
//!
//! let results = Search::new()
//!     .in_source(posts, ["title"])
//!     .in_source(videos, ["title"])
//!     .search("apple")
//!     .unwrap();
//!
//! assert_eq!(results.len(), 2);
//! assert_eq!(results.hits()[0].type_name, "post");
//! ```
//!
//! ## Modules
//!
//! - [`builder`]: the fluent [`Search`] entry point
//! - [`term`]: raw input -> normalized search terms
//! - [`predicate`]: per-source predicate trees
//! - [`relevance`]: occurrence-count scoring
//! - [`compiler`]: union compilation, ordering, dedupe
//! - [`hydrate`]: key -> entity resolution and pagination
//! - [`source`]: the [`QueryableSource`] boundary and descriptors
//! - [`memory`]: in-memory JSON source
//! - [`sql`]: parameterized SQL rendering of a compiled plan

pub mod builder;
pub mod compiler;
pub mod error;
pub mod hydrate;
pub mod memory;
pub mod options;
pub mod phonetic;
pub mod predicate;
pub mod relevance;
pub mod source;
pub mod sql;
pub mod term;

pub use builder::Search;
pub use error::{Result, SearchError};
pub use hydrate::{Hit, Page, SearchResult, SimplePage};
pub use memory::MemorySource;
pub use options::{OrderBy, SearchOptions};
pub use predicate::{FullTextOptions, Predicate};
pub use source::{
    CandidateRow, Entity, FilteredSource, FullTextColumns, Key, OrderValue, QueryableSource,
    SourceDescriptor, SourceQuery,
};
pub use term::{SearchTerm, TermSet};

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
