//! Shared test helpers for club-cms integration tests.

use std::sync::Arc;

use crate::config::{Config, ServerConfig, StorageConfig};
use crate::content::FallbackContent;
use crate::core::toast::Notices;
use crate::object_store::LocalStore;
use crate::realtime::ChangeFeed;
use crate::storage::Database;
use crate::AppState;

/// Create a test AppState with a temporary database and local object store.
pub fn test_state(temp_dir: &tempfile::TempDir) -> Arc<AppState> {
    let data_dir = temp_dir.path().join("data");
    let media_dir = temp_dir.path().join("media");

    let config = Config {
        server: ServerConfig {
            bind_address: "127.0.0.1:0".to_string(),
            data_dir: data_dir.to_string_lossy().to_string(),
        },
        storage: StorageConfig {
            local_storage_path: media_dir.to_string_lossy().to_string(),
            ..StorageConfig::default()
        },
        test_mode: true,
        max_upload_size: 10 * 1024 * 1024, // 10MB for tests
    };

    let db = Database::open(&data_dir).expect("Failed to open test database");
    let object_store = LocalStore::new(&media_dir).expect("Failed to create test object store");

    Arc::new(AppState {
        config,
        db,
        object_store: Arc::new(object_store),
        feed: ChangeFeed::default(),
        notices: Notices::default(),
        fallback: FallbackContent::seeded(),
    })
}
