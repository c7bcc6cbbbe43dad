//! # Query Modifiers
//!
//! Small, composable refinements applied to a [`SelectQuery`].
//!
//! ## Composition
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  conditions: [exclude_soft_deleted]                                     │
//! │  options:    [sorting(["name ASC"]), paging(2, 10)]                     │
//! │                                                                         │
//! │  SelectQuery::new("users")                                              │
//! │     │  fold, left to right                                              │
//! │     ├─► exclude_soft_deleted  → WHERE (is_deleted = ?)                  │
//! │     ├─► sorting               → ORDER BY name ASC                        │
//! │     └─► paging                → LIMIT 10 OFFSET 10                       │
//! │                                                                         │
//! │  Later modifiers win where they conflict (two pagings: last one).       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Modifiers are pure: each one maps a query to a new query and captures
//! only the values it was built with.

use std::fmt;
use std::sync::Arc;

use quill_core::validation::ListParams;

use super::query::{SelectQuery, SqlValue};

type ModifierFn = dyn Fn(SelectQuery) -> SelectQuery + Send + Sync;

/// A reusable transformation of a [`SelectQuery`].
#[derive(Clone)]
pub struct QueryModifier(Arc<ModifierFn>);

impl fmt::Debug for QueryModifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("QueryModifier(..)")
    }
}

impl QueryModifier {
    /// Wraps an arbitrary refinement, e.g. a join + select + filter combo.
    ///
    /// ```rust,ignore
    /// let by_author = QueryModifier::new(move |q| {
    ///     q.join("JOIN users ON users.id = posts.user_id")
    ///         .select(vec!["posts.*".into(), "users.name AS user_name".into()])
    ///         .filter("posts.user_id = ?", vec![user_id.into()])
    /// });
    /// ```
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(SelectQuery) -> SelectQuery + Send + Sync + 'static,
    {
        QueryModifier(Arc::new(f))
    }

    /// Applies this modifier.
    pub fn apply(&self, query: SelectQuery) -> SelectQuery {
        (self.0)(query)
    }

    /// Page window: skips `(page - 1) * page_size` rows, takes `page_size`.
    ///
    /// No bounds checking: `page < 1` yields a negative offset, which
    /// SQLite treats as zero. Validate with `ListParams` first. The offset
    /// saturates at the `i64` range, so a huge page is just past the end.
    pub fn paging(page: i64, page_size: i64) -> Self {
        let offset = page.saturating_sub(1).saturating_mul(page_size);
        QueryModifier::new(move |q| q.offset(offset).limit(page_size))
    }

    /// ORDER BY each term in list order; later terms break ties.
    pub fn sorting<I, S>(columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let columns: Vec<String> = columns.into_iter().map(Into::into).collect();
        QueryModifier::new(move |q| columns.iter().fold(q, |q, c| q.order_by(c.clone())))
    }

    /// Eagerly loads a relation declared by the entity, one JSON column per
    /// parent row.
    pub fn preload(relation: impl Into<String>) -> Self {
        let relation = relation.into();
        QueryModifier::new(move |q| q.preload(relation.clone()))
    }

    /// Adds a raw join clause.
    pub fn join(clause: impl Into<String>) -> Self {
        let clause = clause.into();
        QueryModifier::new(move |q| q.join(clause.clone()))
    }

    /// Restricts the projection.
    pub fn select<I, S>(columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let columns: Vec<String> = columns.into_iter().map(Into::into).collect();
        QueryModifier::new(move |q| q.select(columns.clone()))
    }

    /// Groups results by `column`.
    pub fn group_by(column: impl Into<String>) -> Self {
        let column = column.into();
        QueryModifier::new(move |q| q.group_by(column.clone()))
    }

    /// Deduplicates by `column`.
    pub fn distinct_by(column: impl Into<String>) -> Self {
        let column = column.into();
        QueryModifier::new(move |q| q.distinct(column.clone()))
    }

    /// WHERE fragment with `?` placeholders.
    pub fn filter<I>(clause: impl Into<String>, binds: I) -> Self
    where
        I: IntoIterator<Item = SqlValue>,
    {
        let clause = clause.into();
        let binds: Vec<SqlValue> = binds.into_iter().collect();
        QueryModifier::new(move |q| q.filter(clause.clone(), binds.clone()))
    }

    /// `column = value`.
    pub fn where_eq(column: impl Into<String>, value: impl Into<SqlValue>) -> Self {
        let clause = format!("{} = ?", column.into());
        QueryModifier::filter(clause, [value.into()])
    }

    /// Hides rows flagged `is_deleted`.
    pub fn exclude_soft_deleted() -> Self {
        QueryModifier::where_eq("is_deleted", false)
    }
}

/// Folds `modifiers` over `query`, left to right.
pub fn apply_all(query: SelectQuery, modifiers: &[QueryModifier]) -> SelectQuery {
    modifiers.iter().fold(query, |q, m| m.apply(q))
}

/// Sorting and paging modifiers for validated list parameters.
pub fn list_options(params: &ListParams) -> Vec<QueryModifier> {
    let mut options = Vec::with_capacity(2);
    if !params.sort.is_empty() {
        options.push(QueryModifier::sorting(params.sort.clone()));
    }
    options.push(QueryModifier::paging(params.page, params.page_size));
    options
}
