//! Realtime change feed.
//!
//! Every committed admin write publishes a [`Change`] onto a process-wide
//! broadcast channel. Clients subscribe per table over WebSocket; a
//! subscription lives exactly as long as the socket, so navigating away
//! cannot leak listeners.

use serde::Serialize;
use tokio::sync::broadcast;

/// Tables clients may subscribe to.
pub const TABLES: &[&str] = &[
    "events",
    "resources",
    "gallery",
    "media",
    "council",
    "quotes",
    "awareness",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeAction {
    Insert,
    Update,
    Delete,
}

/// One committed write, as delivered to subscribers.
#[derive(Debug, Clone, Serialize)]
pub struct Change {
    pub table: &'static str,
    pub action: ChangeAction,
    pub id: String,
}

/// Broadcast hub for change events. Cloning shares the underlying channel.
#[derive(Clone)]
pub struct ChangeFeed {
    tx: broadcast::Sender<Change>,
}

impl Default for ChangeFeed {
    fn default() -> Self {
        Self::new(64)
    }
}

impl ChangeFeed {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    /// Publish a change. Lossy by design: with no subscribers the event is
    /// dropped, and a slow subscriber may observe a lag error and skip ahead.
    pub fn publish(&self, table: &'static str, action: ChangeAction, id: &str) {
        let change = Change {
            table,
            action,
            id: id.to_string(),
        };
        tracing::trace!(table, ?action, id, "publishing change");
        let _ = self.tx.send(change);
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Change> {
        self.tx.subscribe()
    }
}
