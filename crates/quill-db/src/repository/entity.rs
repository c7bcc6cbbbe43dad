//! # Entity Mapping
//!
//! What the generic repository needs to know about a table-backed type.
//!
//! ```text
//! ┌────────────────────┬────────────────────────────────────────────────┐
//! │ TABLE / COLUMNS    │ table name, persisted columns in bind order    │
//! │ IMMUTABLE_COLUMNS  │ left untouched when an existing row is saved   │
//! │ RELATIONS          │ associations available to preload              │
//! │ *_JSON field lists │ every column, so preloads decode into entities │
//! │ bind_values        │ pushes one bind per COLUMNS entry              │
//! │ before_* hooks     │ pure adjustments right before writing          │
//! └────────────────────┴────────────────────────────────────────────────┘
//! ```

use chrono::Utc;
use serde::Serialize;
use sqlx::query_builder::Separated;
use sqlx::sqlite::SqliteRow;
use sqlx::{FromRow, Sqlite};

use quill_core::{Identifiable, Post, User};

use super::query::{JsonField, Relation};

/// A type stored in its own table and addressed by a UUID primary key.
pub trait Entity:
    for<'r> FromRow<'r, SqliteRow> + Identifiable + Serialize + Send + Sync + Unpin + 'static
{
    /// Human-readable name used in errors, e.g. `"User"`.
    const NAME: &'static str;

    const TABLE: &'static str;

    const PRIMARY_KEY: &'static str = "id";

    /// Persisted columns, in the order `bind_values` binds them.
    const COLUMNS: &'static [&'static str];

    /// Columns a save never overwrites on an existing row.
    const IMMUTABLE_COLUMNS: &'static [&'static str] = &["id", "created_at"];

    const RELATIONS: &'static [Relation] = &[];

    /// Binds one value per entry of `COLUMNS`, same order.
    fn bind_values<'args>(&self, row: &mut Separated<'_, 'args, Sqlite, &'static str>);

    /// Runs before an insert.
    fn before_create(&mut self) {}

    /// Runs before an insert or a save.
    fn before_save(&mut self) {}
}

const USER_JSON: &[(&str, JsonField)] = &[
    ("id", JsonField::Uuid),
    ("name", JsonField::Plain),
    ("email", JsonField::Plain),
    ("is_deleted", JsonField::Bool),
    ("created_at", JsonField::Plain),
    ("updated_at", JsonField::Plain),
];

const POST_JSON: &[(&str, JsonField)] = &[
    ("id", JsonField::Uuid),
    ("user_id", JsonField::Uuid),
    ("title", JsonField::Plain),
    ("content", JsonField::Plain),
    ("published", JsonField::Bool),
    ("publish_date", JsonField::Plain),
    ("created_at", JsonField::Plain),
    ("updated_at", JsonField::Plain),
];

impl Entity for User {
    const NAME: &'static str = "User";
    const TABLE: &'static str = "users";
    const COLUMNS: &'static [&'static str] =
        &["id", "name", "email", "is_deleted", "created_at", "updated_at"];
    const RELATIONS: &'static [Relation] =
        &[Relation::has_many("Posts", "posts", "posts", "user_id", POST_JSON)];

    fn bind_values<'args>(&self, row: &mut Separated<'_, 'args, Sqlite, &'static str>) {
        row.push_bind(self.id)
            .push_bind(self.name.clone())
            .push_bind(self.email.clone())
            .push_bind(self.is_deleted)
            .push_bind(self.created_at)
            .push_bind(self.updated_at);
    }

    fn before_save(&mut self) {
        self.touch(Utc::now());
    }
}

impl Entity for Post {
    const NAME: &'static str = "Post";
    const TABLE: &'static str = "posts";
    const COLUMNS: &'static [&'static str] = &[
        "id",
        "user_id",
        "title",
        "content",
        "published",
        "publish_date",
        "created_at",
        "updated_at",
    ];
    const RELATIONS: &'static [Relation] =
        &[Relation::belongs_to("User", "user", "users", "user_id", USER_JSON)];

    fn bind_values<'args>(&self, row: &mut Separated<'_, 'args, Sqlite, &'static str>) {
        row.push_bind(self.id)
            .push_bind(self.user_id)
            .push_bind(self.title.clone())
            .push_bind(self.content.clone())
            .push_bind(self.published)
            .push_bind(self.publish_date)
            .push_bind(self.created_at)
            .push_bind(self.updated_at);
    }

    fn before_create(&mut self) {
        self.stamp_publish_date(Utc::now());
    }

    fn before_save(&mut self) {
        self.touch(Utc::now());
    }
}
