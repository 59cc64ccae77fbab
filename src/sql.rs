// Copyright (c) 2026 Unisearch Contributors. Licensed under the MIT license.
// See LICENSE file in the project root for full license text.

//! SQL rendering.
//!
//! Translates a compiled plan to parameterized SQL so SQL-backed sources can
//! run the whole union in one round trip. In-memory execution never goes
//! through here; this is the boundary format for external engines.
//!
//! # Generated shape
//!
//! ```sql
//! SELECT posts.id AS m0_key, posts.updated_at AS m0_order,
//!        NULL AS m1_key, NULL AS m1_order
//! FROM posts
//! WHERE (posts.title LIKE ?)
//! UNION
//! SELECT NULL, NULL, videos.id, videos.updated_at
//! FROM videos
//! WHERE (videos.title LIKE ?)
//! ORDER BY COALESCE(m0_order, m1_order) ASC
//! ```
//!
//! Relation predicates render as EXISTS sub-selects, with the related table
//! named after the relation and a `{parent}_id` foreign-key column - the
//! conventional layout of the ORMs this crate fronts. Sources with another
//! layout evaluate the predicate tree themselves instead.

use crate::compiler::CompiledPlan;
use crate::options::{OrderBy, SearchOptions};
use crate::predicate::{FullTextOptions, MatchOperator, MatchPredicate, Predicate};
use crate::relevance::ScoreExpr;

/// SQL fragment with parameterized placeholders (`?`, in order).
#[derive(Debug, Clone, PartialEq)]
pub struct SqlQuery {
    pub statement: String,
    pub params: Vec<SqlParam>,
}

/// SQL parameter value
#[derive(Debug, Clone, PartialEq)]
pub enum SqlParam {
    Text(String),
    Numeric(f64),
}

/// Translator from the compiled plan to SQL text.
pub struct SqlTranslator;

impl SqlTranslator {
    /// Render one predicate tree as a WHERE clause body (without the
    /// `WHERE` keyword) against the given table.
    pub fn predicate(predicate: &Predicate, table: &str) -> SqlQuery {
        let mut params = Vec::new();
        let clause = Self::render_node(predicate, table, &mut params);
        SqlQuery {
            statement: clause,
            params,
        }
    }

    /// Render the whole plan as one UNION query with its ORDER BY (and
    /// LIMIT/OFFSET when pagination is requested). `tables` maps source
    /// index to physical table name.
    pub fn union(plan: &CompiledPlan, tables: &[&str], options: &SearchOptions) -> SqlQuery {
        let mut params = Vec::new();

        let branches: Vec<String> = plan
            .sources
            .iter()
            .map(|planned| {
                let index = planned.source_index;
                Self::render_branch(plan, index, tables[index], &mut params)
            })
            .collect();

        let mut statement = branches.join(" UNION ");
        statement.push_str(&Self::render_order_by(plan, options));

        if options.paginates() {
            let offset = (options.current_page() - 1) * options.per_page;
            // Simple pagination probes one row past the page to learn
            // whether a next page exists, without a count query.
            let limit = if options.simple_paginate {
                options.per_page + 1
            } else {
                options.per_page
            };
            statement.push_str(&format!(" LIMIT {limit} OFFSET {offset}"));
        }

        SqlQuery { statement, params }
    }

    /// Render one predicate tree with inline values.
    ///
    /// Warning: only use for debugging, not for actual queries (SQL
    /// injection risk)
    pub fn predicate_inline(predicate: &Predicate, table: &str) -> String {
        let rendered = Self::predicate(predicate, table);
        let mut result = rendered.statement;
        for param in rendered.params {
            let value = match param {
                SqlParam::Text(s) => format!("'{}'", s.replace('\'', "''")),
                SqlParam::Numeric(n) => n.to_string(),
            };
            result = result.replacen('?', &value, 1);
        }
        result
    }

    /// One branch of the union: every source's aliases are projected, the
    /// other sources' columns as NULL placeholders.
    fn render_branch(
        plan: &CompiledPlan,
        index: usize,
        table: &str,
        params: &mut Vec<SqlParam>,
    ) -> String {
        let current = &plan.sources[index];
        let mut selects = Vec::new();

        for planned in &plan.sources {
            let j = planned.source_index;
            if j == index {
                selects.push(format!(
                    "{table}.{} AS m{j}_key",
                    current.query.key_column
                ));
                selects.push(format!(
                    "{table}.{} AS m{j}_order",
                    current.query.order_column
                ));
            } else {
                selects.push(format!("NULL AS m{j}_key"));
                selects.push(format!("NULL AS m{j}_order"));
            }

            if planned.type_position.is_some() {
                let position = match current.type_position {
                    Some(p) if j == index => p.to_string(),
                    _ => "NULL".to_string(),
                };
                selects.push(format!("{position} AS m{j}_type"));
            }
        }

        if let Some(score) = &current.query.score {
            selects.push(Self::render_score(score, table, params));
        }

        let mut branch = format!("SELECT {} FROM {table}", selects.join(", "));

        let clause = Self::render_node(&current.query.predicate, table, params);
        if clause != "1=1" {
            branch.push_str(&format!(" WHERE ({clause})"));
        }

        branch
    }

    /// The relevance projection: character-length arithmetic counting term
    /// occurrences, one summand per (column, term) pair.
    fn render_score(score: &ScoreExpr, table: &str, params: &mut Vec<SqlParam>) -> String {
        let summands: Vec<String> = score
            .pairs()
            .iter()
            .map(|pair| {
                let column = format!("{table}.{}", pair.column);
                params.push(SqlParam::Text(pair.term.clone()));
                params.push(SqlParam::Text(pair.term.chars().skip(1).collect()));
                format!(
                    "COALESCE(CHAR_LENGTH(LOWER({column})) - CHAR_LENGTH(REPLACE(LOWER({column}), ?, ?)), 0)"
                )
            })
            .collect();

        format!("{} AS terms_count", summands.join(" + "))
    }

    fn render_order_by(plan: &CompiledPlan, options: &SearchOptions) -> String {
        let relevance = options.order == OrderBy::Relevance;
        let mut keys = Vec::new();

        if options.type_order.is_some() && !(relevance && !plan.scored) {
            keys.push(format!("{} ASC", Self::coalesce_alias(plan, "type")));
        }

        if plan.scored {
            keys.push("terms_count DESC".to_string());
        } else {
            let direction = match options.order {
                OrderBy::Descending => "DESC",
                _ => "ASC",
            };
            keys.push(format!("{} {direction}", Self::coalesce_alias(plan, "order")));
        }

        format!(" ORDER BY {}", keys.join(", "))
    }

    /// COALESCE over one alias family across all branches, first non-null
    /// wins.
    fn coalesce_alias(plan: &CompiledPlan, suffix: &str) -> String {
        let aliases: Vec<String> = plan
            .sources
            .iter()
            .map(|planned| format!("m{}_{suffix}", planned.source_index))
            .collect();
        format!("COALESCE({})", aliases.join(", "))
    }

    fn render_node(node: &Predicate, table: &str, params: &mut Vec<SqlParam>) -> String {
        match node {
            Predicate::All => "1=1".to_string(),
            Predicate::Match(m) => Self::render_match(m, table, params),
            Predicate::Exists { relation, inner } => {
                let inner_clause = Self::render_node(inner, relation, params);
                format!(
                    "EXISTS (SELECT 1 FROM {relation} WHERE {relation}.{table}_id = {table}.id AND ({inner_clause}))"
                )
            }
            Predicate::FullText {
                columns,
                query,
                options,
            } => {
                let qualified: Vec<String> =
                    columns.iter().map(|c| format!("{table}.{c}")).collect();
                params.push(SqlParam::Text(query.clone()));
                format!(
                    "MATCH ({}) AGAINST (?{})",
                    qualified.join(", "),
                    Self::full_text_modifier(options)
                )
            }
            Predicate::Or(branches) => Self::render_boolean(branches, " OR ", table, params),
            Predicate::And(branches) => Self::render_boolean(branches, " AND ", table, params),
        }
    }

    fn render_boolean(
        branches: &[Predicate],
        joiner: &str,
        table: &str,
        params: &mut Vec<SqlParam>,
    ) -> String {
        let parts: Vec<String> = branches
            .iter()
            .map(|b| Self::render_node(b, table, params))
            .collect();
        if parts.len() == 1 {
            parts[0].clone()
        } else {
            format!("({})", parts.join(joiner))
        }
    }

    fn render_match(m: &MatchPredicate, table: &str, params: &mut Vec<SqlParam>) -> String {
        let column = format!("{table}.{}", m.column);
        params.push(SqlParam::Text(m.term.clone()));

        match m.operator {
            MatchOperator::Like => format!("{column} LIKE ?"),
            MatchOperator::LikeLower => format!("LOWER({column}) LIKE ?"),
            MatchOperator::SoundsLike => format!("{column} SOUNDS LIKE ?"),
        }
    }

    fn full_text_modifier(options: &FullTextOptions) -> &'static str {
        match options.mode.as_deref() {
            Some("boolean") => " IN BOOLEAN MODE",
            _ if options.expanded => " WITH QUERY EXPANSION",
            _ => "",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compiler;
    use crate::options::SearchOptions;
    use crate::source::SourceDescriptor;
    use crate::term::TermSet;

    fn plan_for(
        columns: &[&str],
        raw: &str,
        options: &SearchOptions,
    ) -> (CompiledPlan, Vec<SourceDescriptor>) {
        let sources = vec![SourceDescriptor::for_tests(columns, 0)];
        let terms = TermSet::parse(raw, options);
        let plan = compiler::compile(&sources, &terms, options).unwrap();
        (plan, sources)
    }

    #[test]
    fn renders_like_predicate() {
        let options = SearchOptions::default();
        let (plan, _) = plan_for(&["title"], "foo", &options);
        let sql = SqlTranslator::predicate(&plan.sources[0].query.predicate, "posts");
        assert_eq!(sql.statement, "posts.title LIKE ?");
        assert_eq!(sql.params, vec![SqlParam::Text("%foo%".into())]);
    }

    #[test]
    fn renders_lowered_comparison_when_case_insensitive() {
        let options = SearchOptions {
            ignore_case: true,
            ..Default::default()
        };
        let (plan, _) = plan_for(&["title"], "FoO", &options);
        let sql = SqlTranslator::predicate(&plan.sources[0].query.predicate, "posts");
        assert_eq!(sql.statement, "LOWER(posts.title) LIKE ?");
        assert_eq!(sql.params, vec![SqlParam::Text("%foo%".into())]);
    }

    #[test]
    fn renders_exists_subselect_for_relation_path() {
        let options = SearchOptions::default();
        let (plan, _) = plan_for(&["comments.body"], "foo", &options);
        let sql = SqlTranslator::predicate(&plan.sources[0].query.predicate, "posts");
        assert_eq!(
            sql.statement,
            "EXISTS (SELECT 1 FROM comments WHERE comments.posts_id = posts.id AND (comments.body LIKE ?))"
        );
    }

    #[test]
    fn renders_or_chain_for_multiple_terms() {
        let options = SearchOptions::default();
        let (plan, _) = plan_for(&["title"], "foo bar", &options);
        let sql = SqlTranslator::predicate(&plan.sources[0].query.predicate, "posts");
        assert_eq!(
            sql.statement,
            "(posts.title LIKE ? OR posts.title LIKE ?)"
        );
    }

    #[test]
    fn union_projects_null_placeholders_for_other_sources() {
        let options = SearchOptions::default();
        let sources = vec![
            SourceDescriptor::for_tests(&["title"], 0),
            SourceDescriptor::for_tests(&["name"], 1),
        ];
        let terms = TermSet::parse("foo", &options);
        let plan = compiler::compile(&sources, &terms, &options).unwrap();
        let sql = SqlTranslator::union(&plan, &["posts", "videos"], &options);

        assert!(sql.statement.contains("posts.id AS m0_key"));
        assert!(sql.statement.contains("NULL AS m1_key"));
        assert!(sql.statement.contains(" UNION SELECT NULL AS m0_key"));
        assert!(sql
            .statement
            .ends_with("ORDER BY COALESCE(m0_order, m1_order) ASC"));
        assert_eq!(sql.params.len(), 2);
    }

    #[test]
    fn union_orders_by_relevance_when_scored() {
        let options = SearchOptions {
            order: crate::options::OrderBy::Relevance,
            ..Default::default()
        };
        let (plan, _) = plan_for(&["title"], "foo", &options);
        let sql = SqlTranslator::union(&plan, &["posts"], &options);

        assert!(sql.statement.contains("AS terms_count"));
        assert!(sql.statement.contains("CHAR_LENGTH(REPLACE(LOWER(posts.title), ?, ?))"));
        assert!(sql.statement.ends_with("ORDER BY terms_count DESC"));
        // Score bindings (term, term minus first char) precede the WHERE
        // param.
        assert_eq!(
            sql.params,
            vec![
                SqlParam::Text("foo".into()),
                SqlParam::Text("oo".into()),
                SqlParam::Text("%foo%".into()),
            ]
        );
    }

    #[test]
    fn union_paginates_with_limit_and_offset() {
        let options = SearchOptions {
            page_name: "page".into(),
            per_page: 2,
            page: Some(2),
            ..Default::default()
        };
        let (plan, _) = plan_for(&["title"], "foo", &options);
        let sql = SqlTranslator::union(&plan, &["posts"], &options);
        assert!(sql.statement.ends_with(" LIMIT 2 OFFSET 2"));
    }

    #[test]
    fn inline_rendering_substitutes_params() {
        let options = SearchOptions::default();
        let (plan, _) = plan_for(&["title"], "foo", &options);
        let inline = SqlTranslator::predicate_inline(&plan.sources[0].query.predicate, "posts");
        assert_eq!(inline, "posts.title LIKE '%foo%'");
    }
}
