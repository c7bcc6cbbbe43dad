//! # quill-core: Entities and Validation for Quill
//!
//! Pure domain types shared by the data-access layer and its callers.
//! Nothing in here touches a database, a socket or the file system.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Quill Architecture                              │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                HTTP routing (outside this workspace)            │   │
//! │  │    GET /users ──► ListParams::parse ──► users().get_with_...    │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ quill-core (THIS CRATE) ★                       │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌──────────────┐  ┌────────────────────────┐  │   │
//! │  │   │   types   │  │   identity   │  │      validation        │  │   │
//! │  │   │   User    │  │ Identifiable │  │ ListParams, validators │  │   │
//! │  │   │   Post    │  │  extract_id  │  │                        │  │   │
//! │  │   └───────────┘  └──────────────┘  └────────────────────────┘  │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                 quill-db (generic repository)                   │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Entities (User, Post) and the PostWithUserName projection
//! - [`identity`] - Identifier capability used by change notifications
//! - [`validation`] - Caller input validation (paging, sorting, fields)
//! - [`error`] - Domain error types
//!
//! ## Example Usage
//!
//! ```rust
//! use quill_core::identity::extract_id;
//! use quill_core::types::User;
//!
//! let user = User::new("Ada", "ada@example.com");
//! assert_eq!(extract_id(&user), user.id.to_string());
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod identity;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use error::{CoreError, ValidationError};
pub use identity::{extract_id, Identifiable};
pub use types::*;
pub use validation::ListParams;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Page used when the caller does not ask for one.
pub const DEFAULT_PAGE: i64 = 1;

/// Page size used when the caller does not ask for one.
pub const DEFAULT_PAGE_SIZE: i64 = 10;

/// Upper bound for a single page.
///
/// Keeps one request from pulling a whole table through the API.
pub const MAX_PAGE_SIZE: i64 = 500;
