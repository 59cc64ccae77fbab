//! Property-based tests (fuzzing) for the term parser and predicate
//! composer.
//!
//! Uses proptest to generate arbitrary raw input and option sets and verify
//! the pipeline never panics and upholds its parsing invariants.
//!
//! Run with: `cargo test --test proptest_fuzz`

use proptest::prelude::*;
use std::sync::Arc;

use unisearch::{MemorySource, Search, SearchOptions, TermSet};

// =============================================================================
// Strategies
// =============================================================================

/// Raw search input: words, quotes, stray whitespace, punctuation.
fn raw_input_strategy() -> impl Strategy<Value = String> {
    "[ a-zA-Z0-9\"'%_.-]{0,64}"
}

/// Any combination of the term-shaping options.
fn options_strategy() -> impl Strategy<Value = SearchOptions> {
    (
        any::<bool>(),
        any::<bool>(),
        any::<bool>(),
        any::<bool>(),
        any::<bool>(),
    )
        .prop_map(
            |(begin, end, sounds_like, ignore_case, parse_term)| SearchOptions {
                begin_with_wildcard: begin,
                ending_with_wildcard: end,
                sounds_like,
                ignore_case,
                parse_term,
                ..Default::default()
            },
        )
}

proptest! {
    // =========================================================================
    // Parser invariants
    // =========================================================================

    #[test]
    fn parser_never_yields_empty_terms(raw in raw_input_strategy(), options in options_strategy()) {
        let set = TermSet::parse(&raw, &options);
        prop_assert!(set.terms().iter().all(|t| !t.text().is_empty()));
    }

    #[test]
    fn parsed_terms_contain_no_unquoted_whitespace(raw in raw_input_strategy()) {
        let options = SearchOptions::default();
        let set = TermSet::parse(&raw, &options);
        if !raw.contains('"') {
            prop_assert!(set.terms().iter().all(|t| !t.text().contains(' ')));
        }
    }

    #[test]
    fn split_terms_strips_all_quotes(raw in raw_input_strategy()) {
        for token in Search::parse_terms(&raw) {
            prop_assert!(!token.contains('"'));
        }
    }

    #[test]
    fn decoration_matches_options(raw in "[a-z]{1,16}", options in options_strategy()) {
        let set = TermSet::parse(&raw, &options);
        for term in set.terms() {
            if options.sounds_like {
                prop_assert_eq!(term.pattern(), term.text());
            } else {
                prop_assert_eq!(
                    term.pattern().starts_with('%'),
                    options.begin_with_wildcard
                );
                prop_assert_eq!(term.pattern().ends_with('%'), options.ending_with_wildcard);
            }
        }
    }

    #[test]
    fn case_folding_is_idempotent(raw in raw_input_strategy()) {
        let options = SearchOptions {
            ignore_case: true,
            ..Default::default()
        };
        let set = TermSet::parse(&raw, &options);
        for term in set.terms() {
            let lowered = term.text().to_lowercase();
            prop_assert_eq!(term.text(), lowered.as_str());
        }
    }

    // =========================================================================
    // Pipeline never panics, only returns clean errors
    // =========================================================================

    #[test]
    fn search_never_panics_on_arbitrary_input(raw in raw_input_strategy(), options in options_strategy()) {
        let source = Arc::new(MemorySource::new("post"));
        source.push(serde_json::json!({"id": 1, "title": "foo bar baz"}));

        let mut builder = Search::new().in_source(source, ["title"]);
        if options.sounds_like {
            builder = builder.sounds_like(true);
        }
        if options.ignore_case {
            builder = builder.ignore_case(true);
        }
        if !options.parse_term {
            builder = builder.dont_parse_term();
        }
        builder = builder
            .begin_with_wildcard(options.begin_with_wildcard)
            .ending_with_wildcard(options.ending_with_wildcard);

        // Any outcome is fine as long as it is not a panic.
        let _ = builder.search(&raw);
    }

    #[test]
    fn relevance_search_orders_by_score(raw in "[a-z]{1,8}") {
        let source = Arc::new(MemorySource::new("post"));
        source.extend([
            serde_json::json!({"id": 1, "title": format!("{raw} {raw}")}),
            serde_json::json!({"id": 2, "title": raw.clone()}),
        ]);

        let results = Search::new()
            .in_source(source, ["title"])
            .order_by_relevance()
            .search(&raw)
            .unwrap();

        prop_assert_eq!(results.len(), 2);
        prop_assert_eq!(results.hits()[0].key.clone(), unisearch::Key::Int(1));
    }

    #[test]
    fn count_equals_search_length(raw in raw_input_strategy()) {
        let source = Arc::new(MemorySource::new("post"));
        source.extend([
            serde_json::json!({"id": 1, "title": "apple pie"}),
            serde_json::json!({"id": 2, "title": "banana bread"}),
        ]);

        let builder = Search::new().in_source(source, ["title"]);
        let count = builder.count(&raw).unwrap();
        let results = builder.search(&raw).unwrap();
        prop_assert_eq!(count, results.len());
    }
}
