//! # Entity Identity
//!
//! Best-effort identifier lookup used when a mutation is announced to a
//! publisher.
//!
//! An entity opts in by implementing [`Identifiable`]. Types that carry no
//! usable identifier implement it with the default body and are announced
//! with an empty id string instead of failing the mutation.

use uuid::Uuid;

use crate::error::{CoreError, CoreResult};

/// Capability of exposing a stable identifier.
pub trait Identifiable {
    /// Returns the entity's identifier, if it has one.
    fn identifier(&self) -> Option<Uuid> {
        None
    }
}

impl<T: Identifiable + ?Sized> Identifiable for &T {
    fn identifier(&self) -> Option<Uuid> {
        (**self).identifier()
    }
}

/// Extracts an entity's identifier as a string.
///
/// Never fails: an entity without an identifier yields `""`. Any UUID it
/// does expose is returned as is, the nil UUID included.
///
/// ## Example
/// ```rust
/// use quill_core::identity::{extract_id, Identifiable};
///
/// struct Tag;
/// impl Identifiable for Tag {}
///
/// assert_eq!(extract_id(&Tag), "");
/// ```
pub fn extract_id<T: Identifiable + ?Sized>(entity: &T) -> String {
    entity
        .identifier()
        .map(|id| id.to_string())
        .unwrap_or_default()
}

/// Parses an identifier received from a caller (e.g. a path parameter).
pub fn parse_id(value: &str) -> CoreResult<Uuid> {
    Uuid::parse_str(value.trim()).map_err(|e| CoreError::InvalidId {
        value: value.to_string(),
        reason: e.to_string(),
    })
}
