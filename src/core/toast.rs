//! Self-expiring notices recorded on admin action outcomes.

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tokio::sync::Mutex;

pub const DEFAULT_NOTICE_TTL: Duration = Duration::from_secs(4);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ToastKind {
    Success,
    Error,
    Info,
}

#[derive(Debug, Clone, Serialize)]
pub struct Toast {
    pub id: String,
    pub kind: ToastKind,
    pub message: String,
}

/// Append-ordered list of toasts. Every toast self-dismisses after the
/// store's fixed TTL unless dismissed earlier by id. No queue limit.
#[derive(Clone)]
pub struct Notices {
    toasts: Arc<Mutex<Vec<Toast>>>,
    ttl: Duration,
}

impl Default for Notices {
    fn default() -> Self {
        Self::new(DEFAULT_NOTICE_TTL)
    }
}

impl Notices {
    pub fn new(ttl: Duration) -> Self {
        Self {
            toasts: Arc::new(Mutex::new(Vec::new())),
            ttl,
        }
    }

    /// Append a toast and schedule its expiry. Returns the generated id.
    pub async fn push(&self, message: impl Into<String>, kind: ToastKind) -> String {
        let id = uuid::Uuid::new_v4().to_string();
        {
            let mut toasts = self.toasts.lock().await;
            toasts.push(Toast {
                id: id.clone(),
                kind,
                message: message.into(),
            });
        }

        let toasts = Arc::clone(&self.toasts);
        let expired = id.clone();
        let ttl = self.ttl;
        tokio::spawn(async move {
            tokio::time::sleep(ttl).await;
            toasts.lock().await.retain(|t| t.id != expired);
        });

        id
    }

    /// Remove a toast early. No-op if it already expired.
    pub async fn dismiss(&self, id: &str) {
        self.toasts.lock().await.retain(|t| t.id != id);
    }

    /// The not-yet-expired toasts, in append order.
    pub async fn active(&self) -> Vec<Toast> {
        self.toasts.lock().await.clone()
    }
}
