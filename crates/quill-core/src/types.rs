//! # Domain Types
//!
//! Entities persisted through the generic repository.
//!
//! ## Type Overview
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐        ┌─────────────────┐                        │
//! │  │      User       │ 1    * │      Post       │                        │
//! │  │  ─────────────  │◄───────│  ─────────────  │                        │
//! │  │  id (UUID)      │        │  id (UUID)      │                        │
//! │  │  name           │        │  user_id (FK)   │                        │
//! │  │  email (unique) │        │  title, content │                        │
//! │  │  is_deleted     │        │  published      │                        │
//! │  └─────────────────┘        └─────────────────┘                        │
//! │                                                                         │
//! │  ┌──────────────────────────────────────┐                              │
//! │  │  PostWithUserName (read projection)  │  posts JOIN users            │
//! │  │  Post fields + user_name             │  never persisted             │
//! │  └──────────────────────────────────────┘                              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

use crate::identity::Identifiable;

// =============================================================================
// User
// =============================================================================

/// A registered author.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct User {
    /// Unique identifier (UUID v4).
    #[ts(as = "String")]
    pub id: Uuid,

    /// Display name.
    pub name: String,

    /// Email address, unique across users.
    pub email: String,

    /// Soft-delete marker. Listing endpoints filter these rows out.
    pub is_deleted: bool,

    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,

    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Creates a new user with a fresh id.
    pub fn new(name: impl Into<String>, email: impl Into<String>) -> Self {
        let now = Utc::now();
        User {
            id: Uuid::new_v4(),
            name: name.into(),
            email: email.into(),
            is_deleted: false,
            created_at: now,
            updated_at: now,
        }
    }

    /// Records a modification time.
    pub fn touch(&mut self, now: DateTime<Utc>) {
        self.updated_at = now;
    }
}

impl Identifiable for User {
    fn identifier(&self) -> Option<Uuid> {
        Some(self.id)
    }
}

// =============================================================================
// Post
// =============================================================================

/// A post written by a user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Post {
    #[ts(as = "String")]
    pub id: Uuid,

    /// Author (foreign key to users).
    #[ts(as = "String")]
    pub user_id: Uuid,

    pub title: String,

    pub content: String,

    pub published: bool,

    /// When the post went public. Filled on insert for published posts.
    #[ts(as = "Option<String>")]
    pub publish_date: Option<DateTime<Utc>>,

    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,

    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl Post {
    /// Creates an unpublished post for the given author.
    pub fn new(user_id: Uuid, title: impl Into<String>, content: impl Into<String>) -> Self {
        let now = Utc::now();
        Post {
            id: Uuid::new_v4(),
            user_id,
            title: title.into(),
            content: content.into(),
            published: false,
            publish_date: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Sets the publish date of a published post that has none yet.
    pub fn stamp_publish_date(&mut self, now: DateTime<Utc>) {
        if self.published && self.publish_date.is_none() {
            self.publish_date = Some(now);
        }
    }

    /// Records a modification time.
    pub fn touch(&mut self, now: DateTime<Utc>) {
        self.updated_at = now;
    }
}

impl Identifiable for Post {
    fn identifier(&self) -> Option<Uuid> {
        Some(self.id)
    }
}

// =============================================================================
// Post With User Name
// =============================================================================

/// A post joined with its author's name.
///
/// Produced by `SELECT posts.*, users.name AS user_name` over the post
/// table; it is a read shape only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct PostWithUserName {
    #[ts(as = "String")]
    pub id: Uuid,
    #[ts(as = "String")]
    pub user_id: Uuid,
    pub title: String,
    pub content: String,
    pub published: bool,
    #[ts(as = "Option<String>")]
    pub publish_date: Option<DateTime<Utc>>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
    pub user_name: String,
}

impl Identifiable for PostWithUserName {
    fn identifier(&self) -> Option<Uuid> {
        Some(self.id)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_new_user_defaults() {
        let user = User::new("Ada", "ada@example.com");
        assert!(!user.id.is_nil());
        assert!(!user.is_deleted);
        assert_eq!(user.created_at, user.updated_at);
    }

    #[test]
    fn test_publish_date_stamped_only_when_published() {
        let now = Utc::now();
        let mut draft = Post::new(Uuid::new_v4(), "Draft", "...");
        draft.stamp_publish_date(now);
        assert_eq!(draft.publish_date, None);

        let mut post = Post::new(Uuid::new_v4(), "Hello", "world");
        post.published = true;
        post.stamp_publish_date(now);
        assert_eq!(post.publish_date, Some(now));
    }

    #[test]
    fn test_existing_publish_date_is_kept() {
        let earlier = Utc::now() - Duration::days(3);
        let mut post = Post::new(Uuid::new_v4(), "Hello", "world");
        post.published = true;
        post.publish_date = Some(earlier);
        post.stamp_publish_date(Utc::now());
        assert_eq!(post.publish_date, Some(earlier));
    }

    #[test]
    fn test_user_serializes_with_snake_case_fields() {
        let user = User::new("Ada", "ada@example.com");
        let json = serde_json::to_value(&user).unwrap();
        assert_eq!(json["email"], "ada@example.com");
        assert_eq!(json["is_deleted"], false);
        assert_eq!(json["id"], user.id.to_string());
    }
}
