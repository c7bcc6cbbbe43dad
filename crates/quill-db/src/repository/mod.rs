//! # Repository Module
//!
//! A single generic repository serving every entity table.
//!
//! ## Pieces
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  Entity (entity.rs)          what a table-backed type declares          │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  GenericRepository<T> (generic.rs)                                     │
//! │  ├── get_all / find_by_id                                              │
//! │  ├── get_with_conditions::<R>(conditions, options)                     │
//! │  ├── count_with_conditions(conditions, options)                        │
//! │  └── create / update / delete (…, &[OperationOption])                  │
//! │       │                 │                                               │
//! │       │                 └──► OperationOptions (options.rs)             │
//! │       ▼                                                                 │
//! │  QueryModifier (modifier.rs) ── folds over ──► SelectQuery (query.rs)  │
//! │  preloads decode into projection.rs shapes (UserWithPosts, …)          │
//! │                                                     │                   │
//! │                                                     ▼                   │
//! │                                          sqlx::QueryBuilder → SQLite    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

pub mod entity;
pub mod generic;
pub mod modifier;
pub mod options;
pub mod projection;
pub mod query;

pub use entity::Entity;
pub use generic::GenericRepository;
pub use modifier::{apply_all, list_options, QueryModifier};
pub use options::{with_pool, with_publishing, OperationOption, OperationOptions};
pub use projection::{PostWithAuthor, UserWithPosts};
pub use query::{Filter, JsonField, Relation, RelationKind, SelectQuery, SqlValue};
