//! club-cms - Content management service for the campus mental-health club website
//!
//! This crate provides the public content API and the admin dashboard backend:
//! - Club content (events, resources, gallery, council, quotes, awareness themes)
//!   stored in a redb embedded database (ACID, MVCC, crash-safe)
//! - Media uploads batched into swappable object storage (local filesystem, hosted bucket)
//! - Per-table realtime change feed over WebSocket
//! - REST API with multipart upload support

pub mod api;
pub mod config;
pub mod content;
pub mod core;
pub mod object_store;
pub mod realtime;
pub mod storage;
#[cfg(test)]
pub mod testutil;

use std::sync::Arc;

use config::Config;
use content::FallbackContent;
use core::toast::Notices;
use realtime::ChangeFeed;
use storage::Database;

/// Shared application state
pub struct AppState {
    pub config: Config,
    pub db: Database,
    pub object_store: Arc<dyn object_store::ObjectStore>,
    pub feed: ChangeFeed,
    pub notices: Notices,
    pub fallback: FallbackContent,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_router_builds_from_test_state() {
        let dir = tempfile::tempdir().unwrap();
        let state = testutil::test_state(&dir);
        assert!(state.config.test_mode);

        let _router = api::create_router(Arc::clone(&state));
    }
}
