//! # Query Description
//!
//! `SelectQuery` is the in-flight description that query modifiers refine.
//! It is plain data: modifiers only rebuild it, and nothing touches the
//! database until the repository renders it into a `sqlx::QueryBuilder`.
//!
//! ## Rendering
//! ```text
//! SELECT [DISTINCT] <columns | table.*>
//!        [, (<preloaded relation as JSON>) AS <relation alias>]...
//! FROM <table>
//! [<join clause>]...
//! [WHERE (<filter>) AND (<filter>)...]      ← values bound, never inlined
//! [GROUP BY <column>, ...]
//! [ORDER BY <term>, ...]
//! [LIMIT <n>] [OFFSET <m>]
//! ```
//!
//! A count wraps the same text: `SELECT COUNT(*) FROM (<select>)`.
//!
//! ## Preloading
//! A preloaded relation is one correlated subquery per parent row, over
//! its own alias (`preload_<alias>`), so it never changes how many parent
//! rows come back and never clashes with a caller's join on the same
//! table:
//! ```text
//! has-many:   (SELECT json_group_array(json_object(…)) FROM posts AS preload_posts
//!              WHERE preload_posts.user_id = users.id) AS posts
//! belongs-to: (SELECT json_object(…) FROM users AS preload_user
//!              WHERE preload_user.id = posts.user_id) AS user
//! ```
//! Projections decode the column with `sqlx::types::Json`.

use chrono::{DateTime, Utc};
use sqlx::{QueryBuilder, Sqlite};
use uuid::Uuid;

use quill_core::validation::{is_column_name, is_sort_term};

use crate::error::{DbError, DbResult};

// =============================================================================
// Bound Values
// =============================================================================

/// A value bound to a `?` placeholder of a filter clause.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    Null,
    Bool(bool),
    Integer(i64),
    Real(f64),
    Text(String),
    Uuid(Uuid),
    Timestamp(DateTime<Utc>),
}

impl From<bool> for SqlValue {
    fn from(v: bool) -> Self {
        SqlValue::Bool(v)
    }
}

impl From<i64> for SqlValue {
    fn from(v: i64) -> Self {
        SqlValue::Integer(v)
    }
}

impl From<i32> for SqlValue {
    fn from(v: i32) -> Self {
        SqlValue::Integer(v.into())
    }
}

impl From<f64> for SqlValue {
    fn from(v: f64) -> Self {
        SqlValue::Real(v)
    }
}

impl From<String> for SqlValue {
    fn from(v: String) -> Self {
        SqlValue::Text(v)
    }
}

impl From<&str> for SqlValue {
    fn from(v: &str) -> Self {
        SqlValue::Text(v.to_string())
    }
}

impl From<Uuid> for SqlValue {
    fn from(v: Uuid) -> Self {
        SqlValue::Uuid(v)
    }
}

impl From<DateTime<Utc>> for SqlValue {
    fn from(v: DateTime<Utc>) -> Self {
        SqlValue::Timestamp(v)
    }
}

impl<T: Into<SqlValue>> From<Option<T>> for SqlValue {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(SqlValue::Null)
    }
}

fn push_value(qb: &mut QueryBuilder<'_, Sqlite>, value: SqlValue) {
    match value {
        SqlValue::Null => {
            qb.push("NULL");
        }
        SqlValue::Bool(v) => {
            qb.push_bind(v);
        }
        SqlValue::Integer(v) => {
            qb.push_bind(v);
        }
        SqlValue::Real(v) => {
            qb.push_bind(v);
        }
        SqlValue::Text(v) => {
            qb.push_bind(v);
        }
        SqlValue::Uuid(v) => {
            qb.push_bind(v);
        }
        SqlValue::Timestamp(v) => {
            qb.push_bind(v);
        }
    }
}

// =============================================================================
// Relations
// =============================================================================

/// How a relation's rows hang off the parent row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelationKind {
    /// Related rows carry the foreign key (users → posts). Loads a JSON array.
    HasMany,
    /// The parent row carries the foreign key (posts → user). Loads one JSON
    /// object, or NULL.
    BelongsTo,
}

/// How a column is rendered inside the JSON object of a preloaded row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JsonField {
    /// Stored as-is (text, numbers, timestamps, NULL).
    Plain,
    /// 16-byte UUID blob, rendered as 32 hex digits.
    Uuid,
    /// 0/1 integer, rendered as a JSON boolean.
    Bool,
}

/// An association an entity declares so it can be preloaded by name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Relation {
    /// Name used by `QueryModifier::preload`, e.g. `"User"`.
    pub name: &'static str,
    /// Result column the loaded JSON lands in, e.g. `"user"`.
    pub alias: &'static str,
    /// Related table.
    pub table: &'static str,
    pub kind: RelationKind,
    /// Foreign key column: on the related table for `HasMany`, on the
    /// parent table for `BelongsTo`. Both sides key on `id`.
    pub foreign_key: &'static str,
    /// Related columns copied into each JSON object.
    pub fields: &'static [(&'static str, JsonField)],
}

impl Relation {
    pub const fn has_many(
        name: &'static str,
        alias: &'static str,
        table: &'static str,
        foreign_key: &'static str,
        fields: &'static [(&'static str, JsonField)],
    ) -> Self {
        Relation {
            name,
            alias,
            table,
            kind: RelationKind::HasMany,
            foreign_key,
            fields,
        }
    }

    pub const fn belongs_to(
        name: &'static str,
        alias: &'static str,
        table: &'static str,
        foreign_key: &'static str,
        fields: &'static [(&'static str, JsonField)],
    ) -> Self {
        Relation {
            name,
            alias,
            table,
            kind: RelationKind::BelongsTo,
            foreign_key,
            fields,
        }
    }

    /// Renders the correlated subquery loading this relation for rows of
    /// `parent`.
    pub fn subquery(&self, parent: &str) -> String {
        let source = format!("preload_{}", self.alias);

        let object = self
            .fields
            .iter()
            .map(|(column, field)| {
                let value = match field {
                    JsonField::Plain => format!("{source}.{column}"),
                    JsonField::Uuid => format!("lower(hex({source}.{column}))"),
                    JsonField::Bool => {
                        format!("json(CASE WHEN {source}.{column} THEN 'true' ELSE 'false' END)")
                    }
                };
                format!("'{column}', {value}")
            })
            .collect::<Vec<_>>()
            .join(", ");

        match self.kind {
            RelationKind::HasMany => format!(
                "(SELECT json_group_array(json_object({object})) FROM {table} AS {source} \
                 WHERE {source}.{fk} = {parent}.id) AS {alias}",
                table = self.table,
                fk = self.foreign_key,
                alias = self.alias,
            ),
            RelationKind::BelongsTo => format!(
                "(SELECT json_object({object}) FROM {table} AS {source} \
                 WHERE {source}.id = {parent}.{fk}) AS {alias}",
                table = self.table,
                fk = self.foreign_key,
                alias = self.alias,
            ),
        }
    }
}

// =============================================================================
// Filter
// =============================================================================

/// A WHERE fragment with `?` placeholders and the values bound to them.
///
/// Placeholders are matched positionally; a literal `?` inside the clause
/// is not supported.
#[derive(Debug, Clone, PartialEq)]
pub struct Filter {
    pub clause: String,
    pub binds: Vec<SqlValue>,
}

impl Filter {
    fn push_into(&self, qb: &mut QueryBuilder<'_, Sqlite>) -> DbResult<()> {
        let placeholders = self.clause.matches('?').count();
        if placeholders != self.binds.len() {
            return Err(DbError::invalid_query(format!(
                "filter '{}' has {} placeholder(s) but {} value(s)",
                self.clause,
                placeholders,
                self.binds.len()
            )));
        }

        let mut values = self.binds.iter().cloned();
        for (i, part) in self.clause.split('?').enumerate() {
            if i > 0 {
                if let Some(value) = values.next() {
                    push_value(qb, value);
                }
            }
            qb.push(part);
        }

        Ok(())
    }
}

// =============================================================================
// Select Query
// =============================================================================

/// Description of a SELECT over one entity table.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectQuery {
    table: &'static str,
    columns: Vec<String>,
    distinct: bool,
    preloads: Vec<String>,
    joins: Vec<String>,
    filters: Vec<Filter>,
    group_by: Vec<String>,
    order_by: Vec<String>,
    limit: Option<i64>,
    offset: Option<i64>,
}

impl SelectQuery {
    /// Starts an unrestricted query over `table`.
    pub fn new(table: &'static str) -> Self {
        SelectQuery {
            table,
            columns: Vec::new(),
            distinct: false,
            preloads: Vec::new(),
            joins: Vec::new(),
            filters: Vec::new(),
            group_by: Vec::new(),
            order_by: Vec::new(),
            limit: None,
            offset: None,
        }
    }

    /// Adds a WHERE fragment. Multiple filters are AND-ed.
    pub fn filter(mut self, clause: impl Into<String>, binds: Vec<SqlValue>) -> Self {
        self.filters.push(Filter {
            clause: clause.into(),
            binds,
        });
        self
    }

    /// Adds a raw join clause, e.g. `"JOIN users ON users.id = posts.user_id"`.
    pub fn join(mut self, clause: impl Into<String>) -> Self {
        self.joins.push(clause.into());
        self
    }

    /// Loads a relation declared by the entity into an extra JSON column.
    /// Preloading the same relation twice loads it once.
    pub fn preload(mut self, relation: impl Into<String>) -> Self {
        self.preloads.push(relation.into());
        self
    }

    /// Replaces the projection.
    pub fn select(mut self, columns: Vec<String>) -> Self {
        self.columns = columns;
        self
    }

    /// Switches to SELECT DISTINCT and adds `column` to the projection.
    pub fn distinct(mut self, column: impl Into<String>) -> Self {
        self.distinct = true;
        self.columns.push(column.into());
        self
    }

    /// Adds a GROUP BY column.
    pub fn group_by(mut self, column: impl Into<String>) -> Self {
        self.group_by.push(column.into());
        self
    }

    /// Adds an ORDER BY term; earlier terms take precedence.
    pub fn order_by(mut self, term: impl Into<String>) -> Self {
        self.order_by.push(term.into());
        self
    }

    /// Sets the row limit, replacing any previous one.
    pub fn limit(mut self, limit: i64) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Sets the row offset, replacing any previous one.
    pub fn offset(mut self, offset: i64) -> Self {
        self.offset = Some(offset);
        self
    }

    pub fn table(&self) -> &'static str {
        self.table
    }

    /// Current (offset, limit) window.
    pub fn window(&self) -> (Option<i64>, Option<i64>) {
        (self.offset, self.limit)
    }

    pub fn order_terms(&self) -> &[String] {
        &self.order_by
    }

    /// Renders the SELECT statement as text, placeholders left as `?`.
    pub fn to_sql(&self, relations: &[Relation]) -> DbResult<String> {
        Ok(self.build(relations)?.sql().to_string())
    }

    /// Renders the SELECT statement with its values bound.
    pub(crate) fn build<'args>(&self, relations: &[Relation]) -> DbResult<QueryBuilder<'args, Sqlite>> {
        let mut qb = QueryBuilder::new("");
        self.push_select(&mut qb, relations)?;
        Ok(qb)
    }

    /// Renders `SELECT COUNT(*)` over the SELECT statement.
    pub(crate) fn build_count<'args>(
        &self,
        relations: &[Relation],
    ) -> DbResult<QueryBuilder<'args, Sqlite>> {
        let mut qb = QueryBuilder::new("SELECT COUNT(*) FROM (");
        self.push_select(&mut qb, relations)?;
        qb.push(")");
        Ok(qb)
    }

    fn push_select(&self, qb: &mut QueryBuilder<'_, Sqlite>, relations: &[Relation]) -> DbResult<()> {
        qb.push("SELECT ");
        if self.distinct {
            qb.push("DISTINCT ");
        }
        if self.columns.is_empty() {
            qb.push(format!("{}.*", self.table));
        } else {
            qb.push(self.columns.join(", "));
        }

        let mut loaded: Vec<&str> = Vec::with_capacity(self.preloads.len());
        for name in &self.preloads {
            if loaded.contains(&name.as_str()) {
                continue;
            }
            let relation = relations
                .iter()
                .find(|r| r.name == name.as_str())
                .ok_or_else(|| {
                    DbError::invalid_query(format!("{} has no relation '{}'", self.table, name))
                })?;
            qb.push(", ").push(relation.subquery(self.table));
            loaded.push(relation.name);
        }

        qb.push(" FROM ").push(self.table);

        for join in &self.joins {
            qb.push(" ").push(join);
        }

        for (i, filter) in self.filters.iter().enumerate() {
            qb.push(if i == 0 { " WHERE (" } else { " AND (" });
            filter.push_into(qb)?;
            qb.push(")");
        }

        if !self.group_by.is_empty() {
            if let Some(bad) = self.group_by.iter().find(|c| !is_column_name(c)) {
                return Err(DbError::invalid_query(format!("invalid group column '{}'", bad)));
            }
            qb.push(" GROUP BY ").push(self.group_by.join(", "));
        }

        if !self.order_by.is_empty() {
            if let Some(bad) = self.order_by.iter().find(|t| !is_sort_term(t)) {
                return Err(DbError::invalid_query(format!("invalid sort term '{}'", bad)));
            }
            qb.push(" ORDER BY ").push(self.order_by.join(", "));
        }

        // SQLite only accepts OFFSET after a LIMIT; -1 means "no limit".
        match (self.limit, self.offset) {
            (Some(limit), Some(offset)) => {
                qb.push(format!(" LIMIT {} OFFSET {}", limit, offset));
            }
            (Some(limit), None) => {
                qb.push(format!(" LIMIT {}", limit));
            }
            (None, Some(offset)) => {
                qb.push(format!(" LIMIT -1 OFFSET {}", offset));
            }
            (None, None) => {}
        }

        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
