// Copyright (c) 2026 Unisearch Contributors. Licensed under the MIT license.
// See LICENSE file in the project root for full license text.

//! Query compilation.
//!
//! The compiler turns registered sources + options + parsed terms into a
//! [`CompiledPlan`] (one sub-query per source, fully validated before any
//! storage round trip), executes every sub-query exactly once through its
//! handle, and merges the candidate rows into one globally ordered,
//! deduplicated list of [`CompiledRow`]s.
//!
//! The unioned row is a tagged variant - every row knows which source
//! produced it and carries only that source's key, order value and score -
//! so no null-coalescing across positional aliases is needed in memory. The
//! SQL rendering in [`crate::sql`] reintroduces the positional aliases for
//! engines that want the whole union in one statement.
//!
//! # Ordering
//!
//! 1. Type-precedence position, ascending, when a precedence list is set
//!    (skipped when relevance ordering meets an empty term set);
//! 2. relevance score, descending, when relevance ordering is active and
//!    terms are non-empty;
//! 3. otherwise the projected order value in the requested direction.
//!
//! Ties keep the merge order (source registration order, then the source's
//! own row order): the sort is stable.

use std::cmp::Ordering;
use std::collections::HashSet;

use crate::error::{Result, SearchError};
use crate::options::{OrderBy, SearchOptions};
use crate::predicate;
use crate::relevance::ScoreExpr;
use crate::source::{Key, OrderValue, SourceDescriptor, SourceQuery};
use crate::term::TermSet;

/// One row of the merged result set, tagged with its producing source.
///
/// Maps to exactly one source and exactly one entity key within it.
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledRow {
    pub source_index: usize,
    pub key: Key,
    pub order: OrderValue,
    /// Position in the type-precedence list; `None` when no list is set
    pub type_position: Option<usize>,
    /// Relevance score; `None` unless relevance ordering is active with a
    /// non-empty term set
    pub score: Option<f64>,
}

/// One source's validated sub-query plus its merge metadata.
#[derive(Debug, Clone)]
pub struct PlannedSource {
    pub source_index: usize,
    pub type_position: Option<usize>,
    pub query: SourceQuery,
}

/// The whole validated plan: one sub-query per registered source.
#[derive(Debug, Clone)]
pub struct CompiledPlan {
    pub sources: Vec<PlannedSource>,
    /// Whether relevance ordering is effective (requested and terms present)
    pub scored: bool,
}

/// Validate the configuration and build the per-source sub-queries.
///
/// Every configuration error - empty source list, malformed relation paths,
/// relevance ordering over nested columns - surfaces here, before any
/// storage round trip.
pub fn compile(
    sources: &[SourceDescriptor],
    terms: &TermSet,
    options: &SearchOptions,
) -> Result<CompiledPlan> {
    if sources.is_empty() {
        return Err(SearchError::config("no sources registered"));
    }

    let scored = options.order == OrderBy::Relevance && !terms.is_empty();

    let planned = sources
        .iter()
        .map(|source| {
            let predicate = predicate::compose(source, terms, options)?;

            let score = if scored {
                Some(ScoreExpr::build(source, terms)?)
            } else {
                None
            };

            Ok(PlannedSource {
                source_index: source.index(),
                type_position: type_position(source, options),
                query: SourceQuery {
                    predicate,
                    key_column: source.key_column().to_string(),
                    order_column: source.order_column().to_string(),
                    score,
                },
            })
        })
        .collect::<Result<Vec<_>>>()?;

    tracing::debug!(
        sources = planned.len(),
        scored,
        terms = terms.terms().len(),
        "compiled search plan"
    );

    Ok(CompiledPlan {
        sources: planned,
        scored,
    })
}

/// Execute the plan: one round trip per source, then merge, dedupe and
/// order.
pub fn execute(
    plan: &CompiledPlan,
    sources: &[SourceDescriptor],
    options: &SearchOptions,
) -> Result<Vec<CompiledRow>> {
    let mut rows = Vec::new();

    for planned in &plan.sources {
        let source = &sources[planned.source_index];
        let candidates = source.handle().execute(&planned.query)?;

        rows.extend(candidates.into_iter().map(|candidate| CompiledRow {
            source_index: planned.source_index,
            key: candidate.key,
            order: candidate.order,
            type_position: planned.type_position,
            score: candidate.score,
        }));
    }

    sort_rows(&mut rows, plan, options);
    dedupe(&mut rows, sources);

    tracing::debug!(rows = rows.len(), "executed search plan");

    Ok(rows)
}

/// Position of a source's type in the precedence list; missing types sort
/// one past the end.
fn type_position(source: &SourceDescriptor, options: &SearchOptions) -> Option<usize> {
    options.type_order.as_ref().map(|order| {
        order
            .iter()
            .position(|name| name == source.type_name())
            .unwrap_or(order.len())
    })
}

/// Drop duplicate entities, keeping the best-ranked occurrence.
///
/// Two registrations of the same underlying type are independent sources,
/// but a key matched by both branches is still one entity, so the dedupe key
/// is (type name, key) rather than the registration index.
fn dedupe(rows: &mut Vec<CompiledRow>, sources: &[SourceDescriptor]) {
    let mut seen = HashSet::new();
    rows.retain(|row| {
        seen.insert((sources[row.source_index].type_name().to_string(), row.key.clone()))
    });
}

fn sort_rows(rows: &mut [CompiledRow], plan: &CompiledPlan, options: &SearchOptions) {
    let relevance = options.order == OrderBy::Relevance;
    // Relevance requested with nothing to score falls through to column
    // ordering, without the precedence key.
    let precedence = options.type_order.is_some() && !(relevance && !plan.scored);

    rows.sort_by(|a, b| {
        if precedence {
            let by_type = a.type_position.cmp(&b.type_position);
            if by_type != Ordering::Equal {
                return by_type;
            }
        }

        if plan.scored {
            let by_score = b
                .score
                .unwrap_or(0.0)
                .total_cmp(&a.score.unwrap_or(0.0));
            if by_score != Ordering::Equal {
                return by_score;
            }
            return Ordering::Equal;
        }

        let by_order = a.order.cmp(&b.order);
        match options.order {
            OrderBy::Descending => by_order.reverse(),
            _ => by_order,
        }
    });
}
