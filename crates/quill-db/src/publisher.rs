//! # Change Publishers
//!
//! The contract repositories use to announce successful mutations.
//!
//! ## Notification Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Publish-on-Mutation                                  │
//! │                                                                         │
//! │  repo.create(user, &[])                                                │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  INSERT … RETURNING *  ── error ──► returned, nothing published         │
//! │       │ ok                                                              │
//! │       ▼                                                                 │
//! │  publish enabled? ── no ──► done                                        │
//! │       │ yes                                                             │
//! │       ▼                                                                 │
//! │  publisher.publish_message(&json(row), Action::Create, &extract_id(row))│
//! │       │                                                                 │
//! │       ├──► NoopPublisher     (default)                                  │
//! │       ├──► TracingPublisher  (log line)                                 │
//! │       └──► ChannelPublisher  (tokio mpsc → consumer task)               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Publishing is fire-and-forget: the trait has no error channel, and a
//! publisher that cannot deliver must drop the event on its own.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::mpsc;
use tracing::{debug, info};

// =============================================================================
// Action
// =============================================================================

/// Kind of mutation being announced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    Create,
    Update,
    Delete,
}

impl Action {
    /// Wire tag: `"create"`, `"update"` or `"delete"`.
    pub fn as_str(&self) -> &'static str {
        match self {
            Action::Create => "create",
            Action::Update => "update",
            Action::Delete => "delete",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Publisher Contract
// =============================================================================

/// Receives one notification per successful, publishing-enabled mutation.
pub trait Publisher: Send + Sync {
    /// Announces a mutation.
    ///
    /// ## Arguments
    /// * `entity` - Post-operation entity as JSON (`null` for a delete that
    ///   removed nothing)
    /// * `action` - What happened
    /// * `id` - Entity identifier, possibly empty
    fn publish_message(&self, entity: &Value, action: Action, id: &str);
}

/// Publisher that does nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopPublisher;

impl Publisher for NoopPublisher {
    fn publish_message(&self, _entity: &Value, _action: Action, _id: &str) {}
}

/// Publisher that writes each notification to the log.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingPublisher;

impl Publisher for TracingPublisher {
    fn publish_message(&self, entity: &Value, action: Action, id: &str) {
        info!(%action, id = %id, entity = %entity, "Entity changed");
    }
}

// =============================================================================
// Channel Publisher
// =============================================================================

/// A notification as delivered by [`ChannelPublisher`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChangeEvent {
    pub action: Action,
    pub id: String,
    pub entity: Value,
}

/// Publisher that forwards notifications over a tokio channel.
///
/// ## Usage
/// ```rust,ignore
/// let (publisher, mut events) = ChannelPublisher::new();
/// let db = Database::new(config).await?.with_publisher(Arc::new(publisher));
///
/// tokio::spawn(async move {
///     while let Some(event) = events.recv().await {
///         forward_to_broker(event).await;
///     }
/// });
/// ```
#[derive(Debug, Clone)]
pub struct ChannelPublisher {
    tx: mpsc::UnboundedSender<ChangeEvent>,
}

impl ChannelPublisher {
    /// Creates a publisher and the receiving end of its channel.
    pub fn new() -> (Self, mpsc::UnboundedReceiver<ChangeEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (ChannelPublisher { tx }, rx)
    }
}

impl Publisher for ChannelPublisher {
    fn publish_message(&self, entity: &Value, action: Action, id: &str) {
        let event = ChangeEvent {
            action,
            id: id.to_string(),
            entity: entity.clone(),
        };

        if self.tx.send(event).is_err() {
            debug!(%action, id = %id, "Change event dropped, receiver closed");
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_action_tags() {
        assert_eq!(Action::Create.as_str(), "create");
        assert_eq!(Action::Update.to_string(), "update");
        assert_eq!(serde_json::to_value(Action::Delete).unwrap(), json!("delete"));
    }

    #[test]
    fn test_channel_publisher_delivers_in_order() {
        let (publisher, mut rx) = ChannelPublisher::new();

        publisher.publish_message(&json!({"id": "a"}), Action::Create, "a");
        publisher.publish_message(&Value::Null, Action::Delete, "a");

        let first = rx.try_recv().unwrap();
        assert_eq!(first.action, Action::Create);
        assert_eq!(first.entity["id"], "a");

        let second = rx.try_recv().unwrap();
        assert_eq!(second.action, Action::Delete);
        assert_eq!(second.entity, Value::Null);

        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_channel_publisher_survives_closed_receiver() {
        let (publisher, rx) = ChannelPublisher::new();
        drop(rx);

        publisher.publish_message(&Value::Null, Action::Update, "x");
    }

    #[test]
    fn test_noop_and_tracing_publishers_accept_anything() {
        NoopPublisher.publish_message(&json!({"k": 1}), Action::Create, "");
        TracingPublisher.publish_message(&json!({"k": 1}), Action::Create, "");
    }
}
