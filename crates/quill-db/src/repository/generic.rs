//! # Generic Repository
//!
//! One CRUD surface for every [`Entity`].
//!
//! ## Operations
//! ```text
//! ┌───────────────────────┬──────────────────────────────┬──────────────┐
//! │ method                │ SQL                          │ publishes    │
//! ├───────────────────────┼──────────────────────────────┼──────────────┤
//! │ get_all               │ SELECT * FROM t              │ -            │
//! │ get_with_conditions   │ composed SELECT → Vec<R>     │ -            │
//! │ count_with_conditions │ COUNT(*) over composed SELECT│ -            │
//! │ find_by_id            │ SELECT … WHERE id = ?        │ -            │
//! │ create                │ INSERT … RETURNING *         │ "create"     │
//! │ update                │ INSERT … ON CONFLICT(id)     │ "update"     │
//! │                       │   DO UPDATE … RETURNING *    │              │
//! │ delete                │ DELETE … RETURNING *         │ "delete"     │
//! └───────────────────────┴──────────────────────────────┴──────────────┘
//! ```
//!
//! Notifications go out only after the store confirmed the statement, and
//! carry the row the store returned.

use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use serde_json::Value;
use sqlx::sqlite::SqliteRow;
use sqlx::{FromRow, QueryBuilder, Sqlite, SqlitePool};
use tracing::{debug, warn};
use uuid::Uuid;

use quill_core::extract_id;

use super::entity::Entity;
use super::modifier::{apply_all, QueryModifier};
use super::options::{OperationOption, OperationOptions};
use super::query::SelectQuery;
use crate::error::{DbError, DbResult};
use crate::publisher::{Action, Publisher};

/// Repository for any [`Entity`].
///
/// ## Usage
/// ```rust,ignore
/// let users = db.users();
///
/// let ada = users.create(User::new("Ada", "ada@example.com"), &[]).await?;
///
/// let page: Vec<User> = users
///     .get_with_conditions(
///         &[QueryModifier::exclude_soft_deleted()],
///         &[QueryModifier::sorting(["name"]), QueryModifier::paging(1, 10)],
///     )
///     .await?;
///
/// users.delete(ada.id, &[with_publishing(false)]).await?;
/// ```
pub struct GenericRepository<T: Entity> {
    pool: SqlitePool,
    publisher: Arc<dyn Publisher>,
    _entity: PhantomData<fn() -> T>,
}

impl<T: Entity> Clone for GenericRepository<T> {
    fn clone(&self) -> Self {
        GenericRepository {
            pool: self.pool.clone(),
            publisher: Arc::clone(&self.publisher),
            _entity: PhantomData,
        }
    }
}

impl<T: Entity> fmt::Debug for GenericRepository<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GenericRepository")
            .field("entity", &T::NAME)
            .field("table", &T::TABLE)
            .finish_non_exhaustive()
    }
}

impl<T: Entity> GenericRepository<T> {
    /// Creates a repository over `pool` announcing mutations to `publisher`.
    pub fn new(pool: SqlitePool, publisher: Arc<dyn Publisher>) -> Self {
        GenericRepository {
            pool,
            publisher,
            _entity: PhantomData,
        }
    }

    /// Starts a query description over this entity's table.
    pub fn query(&self) -> SelectQuery {
        SelectQuery::new(T::TABLE)
    }

    /// Fetches every row, unfiltered.
    pub async fn get_all(&self) -> DbResult<Vec<T>> {
        let sql = format!("SELECT * FROM {}", T::TABLE);
        let rows = sqlx::query_as::<_, T>(&sql).fetch_all(&self.pool).await?;

        debug!(table = T::TABLE, count = rows.len(), "Fetched all rows");
        Ok(rows)
    }

    /// Applies `conditions`, then `options`, to a fresh query over `T`'s
    /// table and decodes each row as `R`.
    ///
    /// `R` is usually `T`, but joins and projections can produce another
    /// shape (e.g. `PostWithUserName` over the post table).
    pub async fn get_with_conditions<R>(
        &self,
        conditions: &[QueryModifier],
        options: &[QueryModifier],
    ) -> DbResult<Vec<R>>
    where
        R: for<'r> FromRow<'r, SqliteRow> + Send + Unpin,
    {
        let query = self.compose(conditions, options);
        let mut qb = query.build(T::RELATIONS)?;

        debug!(table = T::TABLE, sql = %qb.sql(), "Querying with conditions");

        let rows = qb.build_query_as::<R>().fetch_all(&self.pool).await?;

        debug!(table = T::TABLE, count = rows.len(), "Query returned rows");
        Ok(rows)
    }

    /// Same composition as [`get_with_conditions`](Self::get_with_conditions),
    /// returning how many rows it yields.
    pub async fn count_with_conditions(
        &self,
        conditions: &[QueryModifier],
        options: &[QueryModifier],
    ) -> DbResult<i64> {
        let query = self.compose(conditions, options);
        let mut qb = query.build_count(T::RELATIONS)?;

        let count: i64 = qb.build_query_scalar().fetch_one(&self.pool).await?;

        debug!(table = T::TABLE, count, "Counted rows");
        Ok(count)
    }

    /// Fetches one row by primary key.
    ///
    /// ## Returns
    /// * `Ok(T)` - Row found
    /// * `Err(DbError::NotFound)` - No row has this id
    pub async fn find_by_id(&self, id: Uuid) -> DbResult<T> {
        let sql = format!("SELECT * FROM {} WHERE {} = ?", T::TABLE, T::PRIMARY_KEY);

        sqlx::query_as::<_, T>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| DbError::not_found(T::NAME, id.to_string()))
    }

    /// Inserts a new row and returns it as stored.
    ///
    /// Announces `"create"` unless `with_publishing(false)` is given.
    pub async fn create(&self, mut entity: T, options: &[OperationOption]) -> DbResult<T> {
        let options = OperationOptions::resolve(&self.pool, options);

        entity.before_create();
        entity.before_save();

        let mut qb = Self::insert_statement(&entity);
        qb.push(" RETURNING *");

        let created = qb.build_query_as::<T>().fetch_one(&options.pool).await?;

        debug!(table = T::TABLE, id = %extract_id(&created), "Created row");

        if options.publish {
            self.publish(Some(&created), Action::Create, extract_id(&created));
        }
        Ok(created)
    }

    /// Saves `entity`: inserts it when its id is new, otherwise overwrites
    /// every mutable column of the existing row.
    ///
    /// An entity with no mutable columns is left untouched when its row
    /// exists, and the call fails with `DbError::NotFound`.
    ///
    /// Announces `"update"` unless `with_publishing(false)` is given.
    pub async fn update(&self, mut entity: T, options: &[OperationOption]) -> DbResult<T> {
        let options = OperationOptions::resolve(&self.pool, options);

        entity.before_save();
        let id = extract_id(&entity);

        let mut qb = Self::insert_statement(&entity);

        let assignments: Vec<String> = T::COLUMNS
            .iter()
            .filter(|c| !T::IMMUTABLE_COLUMNS.contains(c))
            .map(|c| format!("{c} = excluded.{c}"))
            .collect();

        qb.push(format!(" ON CONFLICT({}) DO ", T::PRIMARY_KEY));
        if assignments.is_empty() {
            qb.push("NOTHING");
        } else {
            qb.push("UPDATE SET ").push(assignments.join(", "));
        }
        qb.push(" RETURNING *");

        let saved = qb
            .build_query_as::<T>()
            .fetch_optional(&options.pool)
            .await?
            .ok_or_else(|| DbError::not_found(T::NAME, id))?;

        debug!(table = T::TABLE, id = %extract_id(&saved), "Saved row");

        if options.publish {
            self.publish(Some(&saved), Action::Update, extract_id(&saved));
        }
        Ok(saved)
    }

    /// Deletes the row with `id`.
    ///
    /// Deleting an id that does not exist succeeds. The notification
    /// carries `id` itself and the removed row (JSON null if none).
    pub async fn delete(&self, id: Uuid, options: &[OperationOption]) -> DbResult<()> {
        let options = OperationOptions::resolve(&self.pool, options);

        let sql = format!(
            "DELETE FROM {} WHERE {} = ? RETURNING *",
            T::TABLE,
            T::PRIMARY_KEY
        );

        let removed = sqlx::query_as::<_, T>(&sql)
            .bind(id)
            .fetch_optional(&options.pool)
            .await?;

        debug!(table = T::TABLE, id = %id, removed = removed.is_some(), "Deleted row");

        if options.publish {
            self.publish(removed.as_ref(), Action::Delete, id.to_string());
        }
        Ok(())
    }

    fn compose(&self, conditions: &[QueryModifier], options: &[QueryModifier]) -> SelectQuery {
        apply_all(apply_all(self.query(), conditions), options)
    }

    fn insert_statement<'args>(entity: &T) -> QueryBuilder<'args, Sqlite> {
        let mut qb = QueryBuilder::new(format!(
            "INSERT INTO {} ({}) VALUES (",
            T::TABLE,
            T::COLUMNS.join(", ")
        ));
        {
            let mut values = qb.separated(", ");
            entity.bind_values(&mut values);
        }
        qb.push(")");
        qb
    }

    fn publish(&self, entity: Option<&T>, action: Action, id: String) {
        let payload = match entity {
            Some(entity) => serde_json::to_value(entity).unwrap_or_else(|e| {
                warn!(table = T::TABLE, error = %e, "Entity not serializable, publishing null");
                Value::Null
            }),
            None => Value::Null,
        };

        self.publisher.publish_message(&payload, action, &id);
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DbConfig;
    use crate::pool::Database;
    use crate::publisher::{ChangeEvent, ChannelPublisher};
    use crate::repository::projection::{PostWithAuthor, UserWithPosts};
    use crate::repository::options::{with_pool, with_publishing};
    use chrono::Utc;
    use quill_core::{Post, PostWithUserName, User};
    use tokio::sync::mpsc::UnboundedReceiver;

    async fn setup() -> (Database, UnboundedReceiver<ChangeEvent>) {
        let (publisher, rx) = ChannelPublisher::new();
        let db = Database::new(DbConfig::in_memory())
            .await
            .unwrap()
            .with_publisher(Arc::new(publisher));
        (db, rx)
    }

    fn drain(rx: &mut UnboundedReceiver<ChangeEvent>) -> Vec<ChangeEvent> {
        let mut events = Vec::new();
        while let Ok(event) = rx.try_recv() {
            events.push(event);
        }
        events
    }

    async fn seed_users(db: &Database, n: usize) -> Vec<User> {
        let mut users = Vec::with_capacity(n);
        for i in 0..n {
            let user = User::new(format!("user-{:02}", i), format!("user{}@example.com", i));
            users.push(
                db.users()
                    .create(user, &[with_publishing(false)])
                    .await
                    .unwrap(),
            );
        }
        users
    }

    #[tokio::test]
    async fn test_create_publishes_once() {
        let (db, mut rx) = setup().await;

        let user = db
            .users()
            .create(User::new("Ada", "ada@example.com"), &[])
            .await
            .unwrap();

        let events = drain(&mut rx);
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].action, Action::Create);
        assert_eq!(events[0].id, user.id.to_string());
        assert_eq!(events[0].entity["email"], "ada@example.com");
    }

    #[tokio::test]
    async fn test_publishing_can_be_disabled() {
        let (db, mut rx) = setup().await;
        let users = db.users();

        let mut user = users
            .create(User::new("Ada", "ada@example.com"), &[with_publishing(false)])
            .await
            .unwrap();
        user.name = "Ada L.".to_string();
        users.update(user.clone(), &[with_publishing(false)]).await.unwrap();
        users.delete(user.id, &[with_publishing(false)]).await.unwrap();

        assert!(drain(&mut rx).is_empty());
    }

    #[tokio::test]
    async fn test_failed_create_does_not_publish() {
        let (db, mut rx) = setup().await;
        let users = db.users();

        users
            .create(User::new("Ada", "ada@example.com"), &[])
            .await
            .unwrap();
        let err = users
            .create(User::new("Other Ada", "ada@example.com"), &[])
            .await
            .unwrap_err();

        assert!(matches!(err, DbError::UniqueViolation { .. }));
        assert_eq!(drain(&mut rx).len(), 1);
    }

    #[tokio::test]
    async fn test_update_overwrites_and_publishes() {
        let (db, mut rx) = setup().await;
        let users = db.users();

        let mut user = users
            .create(User::new("Ada", "ada@example.com"), &[with_publishing(false)])
            .await
            .unwrap();
        let created_at = user.created_at;

        user.name = "Ada Lovelace".to_string();
        user.created_at = Utc::now() + chrono::Duration::days(1);
        let saved = users.update(user.clone(), &[]).await.unwrap();

        assert_eq!(saved.name, "Ada Lovelace");
        assert_eq!(saved.created_at, created_at);

        let found = users.find_by_id(user.id).await.unwrap();
        assert_eq!(found.name, "Ada Lovelace");

        let events = drain(&mut rx);
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].action, Action::Update);
        assert_eq!(events[0].id, user.id.to_string());
    }

    #[tokio::test]
    async fn test_update_inserts_missing_row() {
        let (db, _rx) = setup().await;
        let users = db.users();

        let user = User::new("Grace", "grace@example.com");
        users.update(user.clone(), &[]).await.unwrap();

        assert_eq!(users.find_by_id(user.id).await.unwrap().email, "grace@example.com");
    }

    #[tokio::test]
    async fn test_delete_publishes_id_and_removed_row() {
        let (db, mut rx) = setup().await;
        let users = db.users();

        let user = users
            .create(User::new("Ada", "ada@example.com"), &[with_publishing(false)])
            .await
            .unwrap();
        users.delete(user.id, &[]).await.unwrap();

        assert!(users.find_by_id(user.id).await.unwrap_err().is_not_found());

        let events = drain(&mut rx);
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].action, Action::Delete);
        assert_eq!(events[0].id, user.id.to_string());
        assert_eq!(events[0].entity["name"], "Ada");
    }

    #[tokio::test]
    async fn test_delete_missing_row_succeeds_with_null_payload() {
        let (db, mut rx) = setup().await;
        let id = Uuid::new_v4();

        db.users().delete(id, &[]).await.unwrap();

        let events = drain(&mut rx);
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].id, id.to_string());
        assert_eq!(events[0].entity, Value::Null);
    }

    #[tokio::test]
    async fn test_find_by_id_not_found_does_not_publish() {
        let (db, mut rx) = setup().await;

        let err = db.users().find_by_id(Uuid::new_v4()).await.unwrap_err();

        assert!(matches!(err, DbError::NotFound { ref entity, .. } if entity == "User"));
        assert!(drain(&mut rx).is_empty());
    }

    #[tokio::test]
    async fn test_get_all_returns_every_row() {
        let (db, _rx) = setup().await;
        seed_users(&db, 3).await;

        assert_eq!(db.users().get_all().await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_paging_sizes() {
        let (db, _rx) = setup().await;
        seed_users(&db, 23).await;
        let users = db.users();

        for (page, expected) in [(1, 10), (2, 10), (3, 3), (4, 0)] {
            let rows: Vec<User> = users
                .get_with_conditions(
                    &[],
                    &[QueryModifier::sorting(["name"]), QueryModifier::paging(page, 10)],
                )
                .await
                .unwrap();
            assert_eq!(rows.len(), expected, "page {}", page);
        }

        let third: Vec<User> = users
            .get_with_conditions(
                &[],
                &[QueryModifier::sorting(["name"]), QueryModifier::paging(3, 10)],
            )
            .await
            .unwrap();
        assert_eq!(third[0].name, "user-20");
    }

    #[tokio::test]
    async fn test_last_paging_wins() {
        let (db, _rx) = setup().await;
        seed_users(&db, 10).await;

        let rows: Vec<User> = db
            .users()
            .get_with_conditions(
                &[],
                &[
                    QueryModifier::sorting(["name"]),
                    QueryModifier::paging(1, 5),
                    QueryModifier::paging(2, 3),
                ],
            )
            .await
            .unwrap();

        let names: Vec<&str> = rows.iter().map(|u| u.name.as_str()).collect();
        assert_eq!(names, vec!["user-03", "user-04", "user-05"]);
    }

    #[tokio::test]
    async fn test_multi_key_sort() {
        let (db, _rx) = setup().await;
        let users = db.users();
        for (name, email) in [("b", "b2@x.io"), ("a", "a1@x.io"), ("b", "b1@x.io")] {
            users.create(User::new(name, email), &[]).await.unwrap();
        }

        let rows: Vec<User> = users
            .get_with_conditions(&[], &[QueryModifier::sorting(["name ASC", "email DESC"])])
            .await
            .unwrap();

        let emails: Vec<&str> = rows.iter().map(|u| u.email.as_str()).collect();
        assert_eq!(emails, vec!["a1@x.io", "b2@x.io", "b1@x.io"]);
    }

    #[tokio::test]
    async fn test_count_matches_conditions() {
        let (db, _rx) = setup().await;
        let users = db.users();
        let seeded = seed_users(&db, 6).await;

        for mut user in seeded.into_iter().take(2) {
            user.is_deleted = true;
            users.update(user, &[]).await.unwrap();
        }

        let visible = users
            .count_with_conditions(&[QueryModifier::exclude_soft_deleted()], &[])
            .await
            .unwrap();
        assert_eq!(visible, 4);

        let paged = users
            .count_with_conditions(
                &[QueryModifier::exclude_soft_deleted()],
                &[QueryModifier::paging(2, 3)],
            )
            .await
            .unwrap();
        assert_eq!(paged, 1);
    }

    #[tokio::test]
    async fn test_published_post_gets_publish_date() {
        let (db, _rx) = setup().await;
        let author = seed_users(&db, 1).await.remove(0);

        let mut post = Post::new(author.id, "Hello", "world");
        post.published = true;
        let created = db.posts().create(post, &[]).await.unwrap();
        assert!(created.publish_date.is_some());

        let draft = db
            .posts()
            .create(Post::new(author.id, "Draft", "..."), &[])
            .await
            .unwrap();
        assert!(draft.publish_date.is_none());
    }

    #[tokio::test]
    async fn test_join_into_projection() {
        let (db, _rx) = setup().await;
        let author = db
            .users()
            .create(User::new("Ada", "ada@example.com"), &[])
            .await
            .unwrap();
        db.posts()
            .create(Post::new(author.id, "Notes", "on the engine"), &[])
            .await
            .unwrap();

        let author_id = author.id;
        let with_author = QueryModifier::new(move |q| {
            q.join("JOIN users ON users.id = posts.user_id")
                .select(vec!["posts.*".into(), "users.name AS user_name".into()])
                .filter("posts.user_id = ?", vec![author_id.into()])
        });

        let rows: Vec<PostWithUserName> = db
            .posts()
            .get_with_conditions(&[with_author], &[QueryModifier::sorting(["posts.created_at"])])
            .await
            .unwrap();

        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].user_name, "Ada");
        assert_eq!(rows[0].title, "Notes");
    }

    async fn seed_posts(db: &Database, author: &User, titles: &[&str]) {
        for title in titles {
            db.posts()
                .create(Post::new(author.id, *title, "..."), &[with_publishing(false)])
                .await
                .unwrap();
        }
    }

    #[tokio::test]
    async fn test_preload_keeps_parent_row_count() {
        let (db, _rx) = setup().await;
        let author = seed_users(&db, 1).await.remove(0);
        seed_posts(&db, &author, &["one", "two", "three"]).await;

        let rows: Vec<User> = db
            .users()
            .get_with_conditions(&[QueryModifier::preload("Posts")], &[QueryModifier::paging(1, 10)])
            .await
            .unwrap();
        assert_eq!(rows.len(), 1);

        let count = db
            .users()
            .count_with_conditions(&[QueryModifier::preload("Posts")], &[])
            .await
            .unwrap();
        assert_eq!(count, 1);
    }

    #[tokio::test]
    async fn test_preload_loads_related_rows() {
        let (db, _rx) = setup().await;
        let users = seed_users(&db, 2).await;
        seed_posts(&db, &users[0], &["one", "two"]).await;

        let rows: Vec<UserWithPosts> = db
            .users()
            .get_with_conditions(
                &[QueryModifier::preload("Posts")],
                &[QueryModifier::sorting(["name"])],
            )
            .await
            .unwrap();

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].user.id, users[0].id);
        let mut titles: Vec<&str> = rows[0].posts.0.iter().map(|p| p.title.as_str()).collect();
        titles.sort();
        assert_eq!(titles, vec!["one", "two"]);
        assert!(rows[0].posts.0.iter().all(|p| p.user_id == users[0].id && !p.published));
        assert!(rows[1].posts.0.is_empty());

        let posts: Vec<PostWithAuthor> = db
            .posts()
            .get_with_conditions(&[QueryModifier::preload("User")], &[])
            .await
            .unwrap();

        assert_eq!(posts.len(), 2);
        for post in &posts {
            let author = &post.user.as_ref().unwrap().0;
            assert_eq!(author.id, users[0].id);
            assert_eq!(author.email, users[0].email);
            assert!(!author.is_deleted);
        }
    }

    #[tokio::test]
    async fn test_preload_alongside_join_on_same_table() {
        let (db, _rx) = setup().await;
        let users = seed_users(&db, 2).await;
        seed_posts(&db, &users[0], &["one"]).await;
        seed_posts(&db, &users[1], &["two"]).await;

        let rows: Vec<PostWithAuthor> = db
            .posts()
            .get_with_conditions(
                &[
                    QueryModifier::preload("User"),
                    QueryModifier::join("JOIN users ON users.id = posts.user_id"),
                    QueryModifier::where_eq("users.name", users[1].name.as_str()),
                ],
                &[],
            )
            .await
            .unwrap();

        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].post.title, "two");
        assert_eq!(rows[0].user.as_ref().unwrap().0.id, users[1].id);
    }

    #[tokio::test]
    async fn test_distinct_by_counts_unique_values() {
        let (db, _rx) = setup().await;
        let author = seed_users(&db, 1).await.remove(0);
        seed_posts(&db, &author, &["one", "two"]).await;

        let authors = db
            .posts()
            .count_with_conditions(&[QueryModifier::distinct_by("user_id")], &[])
            .await
            .unwrap();
        assert_eq!(authors, 1);
    }

    #[tokio::test]
    async fn test_unknown_preload_is_invalid_query() {
        let (db, _rx) = setup().await;

        let err = db
            .posts()
            .get_with_conditions::<Post>(&[QueryModifier::preload("Comments")], &[])
            .await
            .unwrap_err();

        assert!(matches!(err, DbError::InvalidQuery(_)));
    }

    #[tokio::test]
    async fn test_pool_override_is_used() {
        let (db, _rx) = setup().await;
        let other = Database::new(DbConfig::in_memory()).await.unwrap();

        let user = db
            .users()
            .create(
                User::new("Ada", "ada@example.com"),
                &[with_pool(other.pool().clone())],
            )
            .await
            .unwrap();

        assert!(db.users().find_by_id(user.id).await.is_err());
        assert!(other.users().find_by_id(user.id).await.is_ok());
    }

    #[tokio::test]
    async fn test_failed_update_does_not_publish() {
        let (db, mut rx) = setup().await;
        let users = seed_users(&db, 2).await;

        for options in [vec![], vec![with_publishing(false)]] {
            let mut clash = users[1].clone();
            clash.email = users[0].email.clone();

            let err = db.users().update(clash, &options).await.unwrap_err();
            assert!(matches!(err, DbError::UniqueViolation { .. }));
        }

        assert!(drain(&mut rx).is_empty());
        assert_eq!(db.users().find_by_id(users[1].id).await.unwrap().email, users[1].email);
    }

    #[tokio::test]
    async fn test_failed_create_with_publishing_off_does_not_publish() {
        let (db, mut rx) = setup().await;
        let user = seed_users(&db, 1).await.remove(0);

        let err = db
            .users()
            .create(User::new("Copy", user.email.clone()), &[with_publishing(false)])
            .await
            .unwrap_err();

        assert!(matches!(err, DbError::UniqueViolation { .. }));
        assert!(drain(&mut rx).is_empty());
    }

    #[tokio::test]
    async fn test_failed_delete_does_not_publish() {
        let (db, mut rx) = setup().await;
        let user = seed_users(&db, 1).await.remove(0);
        let users = db.users();
        db.close().await;

        for options in [vec![], vec![with_publishing(false)]] {
            let err = users.delete(user.id, &options).await.unwrap_err();
            assert!(matches!(err, DbError::ConnectionFailed(_)));
        }

        assert!(drain(&mut rx).is_empty());
    }

    /// Entity whose columns are all immutable, so a save of an existing
    /// row changes nothing.
    #[derive(Debug, Clone, serde::Serialize, sqlx::FromRow)]
    struct Tag {
        id: Uuid,
        created_at: chrono::DateTime<Utc>,
    }

    impl quill_core::Identifiable for Tag {
        fn identifier(&self) -> Option<Uuid> {
            Some(self.id)
        }
    }

    impl Entity for Tag {
        const NAME: &'static str = "Tag";
        const TABLE: &'static str = "tags";
        const COLUMNS: &'static [&'static str] = &["id", "created_at"];

        fn bind_values<'args>(
            &self,
            row: &mut sqlx::query_builder::Separated<'_, 'args, Sqlite, &'static str>,
        ) {
            row.push_bind(self.id).push_bind(self.created_at);
        }
    }

    #[tokio::test]
    async fn test_update_without_mutable_columns_reports_entity_not_found() {
        let (db, mut rx) = setup().await;
        sqlx::query("CREATE TABLE tags (id BLOB PRIMARY KEY NOT NULL, created_at TEXT NOT NULL)")
            .execute(db.pool())
            .await
            .unwrap();
        let tags = db.repository::<Tag>();

        let tag = Tag {
            id: Uuid::new_v4(),
            created_at: Utc::now(),
        };
        tags.update(tag.clone(), &[with_publishing(false)]).await.unwrap();

        let err = tags.update(tag.clone(), &[]).await.unwrap_err();
        assert!(matches!(
            err,
            DbError::NotFound { ref entity, ref id } if entity == "Tag" && *id == tag.id.to_string()
        ));
        assert!(drain(&mut rx).is_empty());
    }
}
