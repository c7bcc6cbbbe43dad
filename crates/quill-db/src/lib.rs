//! # quill-db: Generic Data-Access Layer
//!
//! One repository type for every entity, with composable query modifiers
//! and a change notification after each successful mutation.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                          Quill Data Flow                                │
//! │                                                                         │
//! │  Caller (handler, job, seed binary)                                    │
//! │       │  ListParams::parse(page, pageSize, sort)   (quill-core)        │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     quill-db (THIS CRATE)                       │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌────────────────────┐   ┌────────────┐ │   │
//! │  │   │   Database    │    │ GenericRepository  │   │ Publisher  │ │   │
//! │  │   │   (pool.rs)   │───►│   <User>, <Post>   │──►│ Noop       │ │   │
//! │  │   │  SqlitePool   │    │ + QueryModifier    │   │ Tracing    │ │   │
//! │  │   │  migrations   │    │ + OperationOption  │   │ Channel    │ │   │
//! │  │   └───────────────┘    └────────────────────┘   └────────────┘ │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite (WAL)                                                          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`config`] - Pool settings, `QUILL_*` environment variables
//! - [`pool`] - Connection pool and repository hand-out
//! - [`migrations`] - Embedded schema migrations
//! - [`repository`] - Generic repository, query modifiers, options
//! - [`publisher`] - Change notification contract and implementations
//! - [`logging`] - `tracing` subscriber setup
//! - [`error`] - Database error types
//!
//! ## Usage
//!
//! ```rust,ignore
//! use quill_db::{Database, DbConfig, QueryModifier, list_options};
//! use quill_core::{ListParams, User};
//!
//! let db = Database::new(DbConfig::from_env()?).await?;
//!
//! let params = ListParams::parse(Some("2"), Some("10"), None, "name ASC")?;
//! let users: Vec<User> = db
//!     .users()
//!     .get_with_conditions(&[QueryModifier::exclude_soft_deleted()], &list_options(&params))
//!     .await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod config;
pub mod error;
pub mod logging;
pub mod migrations;
pub mod pool;
pub mod publisher;
pub mod repository;

// =============================================================================
// Re-exports
// =============================================================================

pub use config::{ConfigError, DbConfig};
pub use error::{DbError, DbResult};
pub use pool::Database;
pub use publisher::{Action, ChangeEvent, ChannelPublisher, NoopPublisher, Publisher, TracingPublisher};

pub use repository::{
    apply_all, list_options, with_pool, with_publishing, Entity, GenericRepository,
    OperationOption, PostWithAuthor, QueryModifier, Relation, SelectQuery, SqlValue,
    UserWithPosts,
};
