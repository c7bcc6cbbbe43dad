//! # Preload Projections
//!
//! Row shapes for `get_with_conditions::<R>` when a relation is preloaded.
//! The parent's columns are flattened in; the relation arrives as one JSON
//! column named after the relation's alias.
//!
//! ```rust,ignore
//! let users: Vec<UserWithPosts> = db
//!     .users()
//!     .get_with_conditions(&[QueryModifier::preload("Posts")], &[QueryModifier::paging(1, 10)])
//!     .await?;
//! ```

use serde::Serialize;
use sqlx::types::Json;
use uuid::Uuid;

use quill_core::{Identifiable, Post, User};

/// A user with every post it wrote (`preload("Posts")`).
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct UserWithPosts {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub user: User,

    /// Empty when the user has no posts.
    pub posts: Json<Vec<Post>>,
}

impl Identifiable for UserWithPosts {
    fn identifier(&self) -> Option<Uuid> {
        Some(self.user.id)
    }
}

/// A post with its author (`preload("User")`).
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct PostWithAuthor {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub post: Post,

    pub user: Option<Json<User>>,
}

impl Identifiable for PostWithAuthor {
    fn identifier(&self) -> Option<Uuid> {
        Some(self.post.id)
    }
}
