// Copyright (c) 2026 Unisearch Contributors. Licensed under the MIT license.
// See LICENSE file in the project root for full license text.

//! Predicate composition - AST for per-source match predicates.
//!
//! Provides a type-safe predicate tree that queryable sources evaluate (or
//! translate, see [`crate::sql`]) to decide which rows match the parsed
//! terms.
//!
//! # Composition rules
//!
//! ```text
//! plain column      -> OR-chain of pattern matches, one per term
//! dotted path a.b.c -> Exists(a, Exists(b, OR-chain on c))
//! phonetic mode     -> sounds-like comparison, terms undecorated
//! full-text source  -> OR over groups; relation groups wrapped in Exists
//! empty term set    -> All (no term filtering at all)
//! ```

use serde::{Deserialize, Serialize};

use crate::error::{Result, SearchError};
use crate::options::SearchOptions;
use crate::source::SourceDescriptor;
use crate::term::TermSet;

/// Predicate tree applied to one source's rows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Predicate {
    /// Matches every row. Produced when the term set is empty: the source
    /// yields unfiltered rows while ordering and pagination stay active.
    All,
    /// One column compared against one term.
    Match(MatchPredicate),
    /// Existential relation check: does a related row exist whose own rows
    /// satisfy the inner predicate.
    Exists {
        relation: String,
        inner: Box<Predicate>,
    },
    /// Native full-text match of the raw input against a column group.
    FullText {
        columns: Vec<String>,
        query: String,
        options: FullTextOptions,
    },
    /// Any branch matches.
    Or(Vec<Predicate>),
    /// Every branch matches. Never produced by composition; pre-filtered
    /// handles use it to AND their fixed constraint onto the search
    /// predicate.
    And(Vec<Predicate>),
}

impl Predicate {
    /// Collapse a list of branches into a single predicate.
    fn any(mut branches: Vec<Predicate>) -> Predicate {
        if branches.len() == 1 {
            branches.pop().unwrap()
        } else {
            Predicate::Or(branches)
        }
    }
}

/// One column/term comparison.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchPredicate {
    /// Column name on the source's own row
    pub column: String,
    /// Comparison operator
    pub operator: MatchOperator,
    /// The term: wildcard-decorated pattern for the pattern operators,
    /// undecorated text for the phonetic operator
    pub term: String,
}

/// Comparison operator for a [`MatchPredicate`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MatchOperator {
    /// Case-sensitive pattern match (`LIKE '%term%'`)
    Like,
    /// Case-insensitive pattern match: both column and term lowered
    LikeLower,
    /// Phonetic sounds-alike comparison
    SoundsLike,
}

/// Engine-specific options for native full-text matching, passed through to
/// the queryable source untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FullTextOptions {
    /// Search mode (e.g. "boolean" for MySQL boolean mode)
    #[serde(default)]
    pub mode: Option<String>,
    /// Query expansion
    #[serde(default)]
    pub expanded: bool,
}

/// Build the match predicate for one source.
///
/// Fails with a configuration error on malformed relation paths (empty
/// segments) before any storage round trip happens.
pub fn compose(
    source: &SourceDescriptor,
    terms: &TermSet,
    options: &SearchOptions,
) -> Result<Predicate> {
    if terms.is_empty() {
        return Ok(Predicate::All);
    }

    if source.is_full_text() {
        let branches = source
            .full_text_groups()
            .iter()
            .map(|group| {
                let full_text = Predicate::FullText {
                    columns: group.columns.clone(),
                    query: terms.raw().to_string(),
                    options: source.full_text_options().clone(),
                };
                match &group.relation {
                    Some(relation) => nest_exists(relation, full_text),
                    None => Ok(full_text),
                }
            })
            .collect::<Result<Vec<_>>>()?;

        return Ok(Predicate::any(branches));
    }

    let branches = source
        .columns()
        .iter()
        .map(|column| match column.rsplit_once('.') {
            Some((relation, target)) => {
                if target.is_empty() {
                    return Err(SearchError::config(format!(
                        "malformed relation path '{column}'"
                    )));
                }
                nest_exists(relation, term_chain(target, terms, options))
            }
            None => Ok(term_chain(column, terms, options)),
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(Predicate::any(branches))
}

/// OR-chain of one match per term against a single flat column.
fn term_chain(column: &str, terms: &TermSet, options: &SearchOptions) -> Predicate {
    let operator = if options.sounds_like {
        MatchOperator::SoundsLike
    } else if options.ignore_case {
        MatchOperator::LikeLower
    } else {
        MatchOperator::Like
    };

    let matches = terms
        .terms()
        .iter()
        .map(|term| {
            Predicate::Match(MatchPredicate {
                column: column.to_string(),
                operator,
                term: term.pattern().to_string(),
            })
        })
        .collect();

    Predicate::any(matches)
}

/// Wrap `inner` in existential relation checks, innermost relation first.
fn nest_exists(relation_path: &str, inner: Predicate) -> Result<Predicate> {
    let mut predicate = inner;

    for segment in relation_path.rsplit('.') {
        if segment.is_empty() {
            return Err(SearchError::config(format!(
                "malformed relation path '{relation_path}'"
            )));
        }
        predicate = Predicate::Exists {
            relation: segment.to_string(),
            inner: Box::new(predicate),
        };
    }

    Ok(predicate)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::FullTextGroup;

    fn descriptor(columns: &[&str]) -> SourceDescriptor {
        SourceDescriptor::for_tests(columns, 0)
    }

    fn parse(raw: &str, options: &SearchOptions) -> TermSet {
        TermSet::parse(raw, options)
    }

    #[test]
    fn empty_terms_compose_to_all() {
        let options = SearchOptions::default();
        let predicate = compose(&descriptor(&["title"]), &parse("", &options), &options).unwrap();
        assert_eq!(predicate, Predicate::All);
    }

    #[test]
    fn single_column_single_term() {
        let options = SearchOptions::default();
        let predicate = compose(&descriptor(&["title"]), &parse("foo", &options), &options).unwrap();
        assert_eq!(
            predicate,
            Predicate::Match(MatchPredicate {
                column: "title".into(),
                operator: MatchOperator::Like,
                term: "%foo%".into(),
            })
        );
    }

    #[test]
    fn columns_and_terms_cross_into_or_chains() {
        let options = SearchOptions::default();
        let predicate = compose(
            &descriptor(&["title", "subtitle"]),
            &parse("foo bar", &options),
            &options,
        )
        .unwrap();

        match predicate {
            Predicate::Or(columns) => {
                assert_eq!(columns.len(), 2);
                for column in columns {
                    match column {
                        Predicate::Or(terms) => assert_eq!(terms.len(), 2),
                        other => panic!("expected per-term Or, got {other:?}"),
                    }
                }
            }
            other => panic!("expected per-column Or, got {other:?}"),
        }
    }

    #[test]
    fn ignore_case_switches_operator() {
        let options = SearchOptions {
            ignore_case: true,
            ..Default::default()
        };
        let predicate = compose(&descriptor(&["title"]), &parse("FoO", &options), &options).unwrap();
        assert_eq!(
            predicate,
            Predicate::Match(MatchPredicate {
                column: "title".into(),
                operator: MatchOperator::LikeLower,
                term: "%foo%".into(),
            })
        );
    }

    #[test]
    fn phonetic_mode_uses_undecorated_terms() {
        let options = SearchOptions {
            sounds_like: true,
            ..Default::default()
        };
        let predicate = compose(&descriptor(&["title"]), &parse("larafel", &options), &options).unwrap();
        assert_eq!(
            predicate,
            Predicate::Match(MatchPredicate {
                column: "title".into(),
                operator: MatchOperator::SoundsLike,
                term: "larafel".into(),
            })
        );
    }

    #[test]
    fn dotted_path_becomes_exists() {
        let options = SearchOptions::default();
        let predicate = compose(
            &descriptor(&["comments.body"]),
            &parse("foo", &options),
            &options,
        )
        .unwrap();

        match predicate {
            Predicate::Exists { relation, inner } => {
                assert_eq!(relation, "comments");
                match *inner {
                    Predicate::Match(m) => assert_eq!(m.column, "body"),
                    other => panic!("expected Match, got {other:?}"),
                }
            }
            other => panic!("expected Exists, got {other:?}"),
        }
    }

    #[test]
    fn deep_path_nests_one_exists_per_segment() {
        let options = SearchOptions::default();
        let predicate = compose(
            &descriptor(&["posts.comments.body"]),
            &parse("foo", &options),
            &options,
        )
        .unwrap();

        match predicate {
            Predicate::Exists { relation, inner } => {
                assert_eq!(relation, "posts");
                match *inner {
                    Predicate::Exists { relation, .. } => assert_eq!(relation, "comments"),
                    other => panic!("expected nested Exists, got {other:?}"),
                }
            }
            other => panic!("expected Exists, got {other:?}"),
        }
    }

    #[test]
    fn malformed_path_is_a_config_error() {
        let options = SearchOptions::default();
        let err = compose(&descriptor(&["comments."]), &parse("foo", &options), &options)
            .unwrap_err();
        assert!(matches!(err, SearchError::Config(_)));

        let err = compose(&descriptor(&[".body"]), &parse("foo", &options), &options).unwrap_err();
        assert!(matches!(err, SearchError::Config(_)));
    }

    #[test]
    fn full_text_groups_union_under_one_or() {
        let options = SearchOptions::default();
        let source = SourceDescriptor::full_text_for_tests(
            vec![
                FullTextGroup {
                    relation: None,
                    columns: vec!["title".into(), "body".into()],
                },
                FullTextGroup {
                    relation: Some("comments".into()),
                    columns: vec!["body".into()],
                },
            ],
            0,
        );

        let predicate = compose(&source, &parse("foo bar", &options), &options).unwrap();

        match predicate {
            Predicate::Or(groups) => {
                assert_eq!(groups.len(), 2);
                match &groups[0] {
                    Predicate::FullText { columns, query, .. } => {
                        assert_eq!(columns, &["title".to_string(), "body".to_string()]);
                        // Full-text matches the raw input, not the split terms.
                        assert_eq!(query, "foo bar");
                    }
                    other => panic!("expected FullText, got {other:?}"),
                }
                match &groups[1] {
                    Predicate::Exists { relation, inner } => {
                        assert_eq!(relation, "comments");
                        assert!(matches!(**inner, Predicate::FullText { .. }));
                    }
                    other => panic!("expected Exists, got {other:?}"),
                }
            }
            other => panic!("expected Or over groups, got {other:?}"),
        }
    }
}
