use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use bytes::Bytes;
use tokio_util::sync::CancellationToken;

use club_cms::core::upload::{
    self, BatchError, SelectedFile, UploadBatch, UploadError, IMAGE_BATCH_LIMIT,
};
use club_cms::object_store::{LocalStore, ObjectStore, ObjectStoreError};
use club_cms::storage::models::MediaKind;
use club_cms::storage::Database;

fn image(name: &str) -> SelectedFile {
    SelectedFile {
        file_name: format!("{name}.jpg"),
        content_type: "image/jpeg".to_string(),
        data: Bytes::from_static(b"jpeg-bytes"),
    }
}

fn video_of_size(bytes: usize) -> SelectedFile {
    SelectedFile {
        file_name: "clip.mp4".to_string(),
        content_type: "video/mp4".to_string(),
        data: Bytes::from(vec![0u8; bytes]),
    }
}

fn select(files: Vec<SelectedFile>) -> Result<UploadBatch, BatchError> {
    let mut batch = UploadBatch::new();
    batch.select(files)?;
    Ok(batch)
}

// ============================================================================
// Batch validation
// ============================================================================

#[test]
fn test_six_images_rejected_and_nothing_populated() {
    let files = (0..6).map(|i| image(&format!("img-{i}"))).collect();

    let mut batch = UploadBatch::new();
    let err = batch.select(files).unwrap_err();

    assert_eq!(err, BatchError::TooManyImages { count: 6 });
    assert!(batch.images().is_empty());
    assert!(batch.video().is_none());
    assert!(batch.previews().is_empty());
    assert!(batch.error().unwrap().contains("6"));
}

#[test]
fn test_five_images_and_small_video_accepted() {
    let mut files: Vec<SelectedFile> = (0..IMAGE_BATCH_LIMIT)
        .map(|i| image(&format!("img-{i}")))
        .collect();
    files.push(video_of_size(1024));

    let batch = select(files).unwrap();

    assert_eq!(batch.images().len(), IMAGE_BATCH_LIMIT);
    assert!(batch.video().is_some());
    assert!(batch.error().is_none());
}

#[test]
fn test_two_videos_rejected() {
    let files = vec![image("a"), video_of_size(100), video_of_size(100)];

    let err = select(files).unwrap_err();
    assert_eq!(err, BatchError::MultipleVideos);
}

#[test]
fn test_oversized_video_names_size_in_mb() {
    // 21.5 MB, just over the 20 MB cap
    let files = vec![video_of_size(22_544_384)];

    let err = select(files).unwrap_err();
    assert!(matches!(err, BatchError::VideoTooLarge { .. }));
    assert!(err.to_string().contains("21.5 MB"), "got: {err}");
}

#[test]
fn test_video_at_exact_cap_accepted() {
    let batch = select(vec![video_of_size(20 * 1024 * 1024)]).unwrap();
    assert!(batch.video().is_some());
}

#[test]
fn test_unsupported_type_rejects_whole_batch() {
    let pdf = SelectedFile {
        file_name: "agenda.pdf".to_string(),
        content_type: "application/pdf".to_string(),
        data: Bytes::from_static(b"%PDF"),
    };

    let err = select(vec![image("ok"), pdf]).unwrap_err();
    assert!(matches!(err, BatchError::UnsupportedType { .. }));
}

#[test]
fn test_empty_selection_rejected() {
    let err = select(Vec::new()).unwrap_err();
    assert_eq!(err, BatchError::NoFiles);
}

#[test]
fn test_previews_indexed_by_selection_position() {
    // Video in the middle of the selection: its preview stays in slot 1
    let files = vec![image("first"), video_of_size(64), image("last")];

    let batch = select(files).unwrap();

    let previews = batch.previews();
    assert_eq!(previews.len(), 3);
    assert!(previews[0].as_deref().unwrap().starts_with("data:image/jpeg;base64,"));
    assert!(previews[1].as_deref().unwrap().starts_with("data:video/mp4;base64,"));
    assert!(previews[2].as_deref().unwrap().starts_with("data:image/jpeg;base64,"));
}

#[test]
fn test_clear_resets_files_previews_and_error() {
    let mut batch = UploadBatch::new();
    batch
        .select((0..6).map(|i| image(&format!("img-{i}"))).collect())
        .unwrap_err();
    assert!(batch.error().is_some());

    batch.clear();

    assert!(batch.images().is_empty());
    assert!(batch.video().is_none());
    assert!(batch.previews().is_empty());
    assert!(batch.error().is_none());
}

#[test]
fn test_new_valid_selection_clears_previous_error() {
    let mut batch = UploadBatch::new();
    batch
        .select(vec![video_of_size(100), video_of_size(100)])
        .unwrap_err();
    assert!(batch.error().is_some());

    batch.select(vec![image("ok")]).unwrap();
    assert!(batch.error().is_none());
    assert_eq!(batch.images().len(), 1);
}

// ============================================================================
// Batch submission
// ============================================================================

fn test_db(dir: &tempfile::TempDir) -> Database {
    Database::open(dir.path().join("data")).unwrap()
}

#[tokio::test]
async fn test_sequential_upload_orders_images_before_video() {
    let dir = tempfile::tempdir().unwrap();
    let db = test_db(&dir);
    let store = LocalStore::new(dir.path().join("media")).unwrap();

    let batch = select(vec![image("a"), image("b"), video_of_size(256)]).unwrap();
    let cancel = CancellationToken::new();

    let inserted = upload::submit_batch(&db, &store, "gal-1", &batch, &cancel)
        .await
        .unwrap();

    assert_eq!(inserted.len(), 3);
    let orders: Vec<u32> = inserted.iter().map(|m| m.display_order).collect();
    assert_eq!(orders, vec![0, 1, 2]);
    assert_eq!(inserted[2].kind, MediaKind::Video);

    // Rows and blobs both exist
    let stored = db.media_for_gallery_event("gal-1").unwrap();
    assert_eq!(stored.len(), 3);
    for media in &stored {
        assert!(db.get_asset(&media.asset_id).unwrap().is_some());
        assert!(store.exists(&media.asset_id).await.unwrap());
        assert!(media.media_url.starts_with("/static/gallery/gal-1/"));
    }
}

#[tokio::test]
async fn test_display_order_continues_after_existing_media() {
    let dir = tempfile::tempdir().unwrap();
    let db = test_db(&dir);
    let store = LocalStore::new(dir.path().join("media")).unwrap();
    let cancel = CancellationToken::new();

    let first = select(vec![image("a"), image("b")]).unwrap();
    upload::submit_batch(&db, &store, "gal-2", &first, &cancel)
        .await
        .unwrap();

    let second = select(vec![image("c")]).unwrap();
    let inserted = upload::submit_batch(&db, &store, "gal-2", &second, &cancel)
        .await
        .unwrap();

    assert_eq!(inserted[0].display_order, 2);
}

/// Object store that fails on the nth put.
struct FlakyStore {
    fail_on_put: usize,
    puts: AtomicUsize,
    objects: Mutex<HashMap<String, Bytes>>,
}

impl FlakyStore {
    fn new(fail_on_put: usize) -> Self {
        Self {
            fail_on_put,
            puts: AtomicUsize::new(0),
            objects: Mutex::new(HashMap::new()),
        }
    }
}

#[async_trait]
impl ObjectStore for FlakyStore {
    async fn put(
        &self,
        key: &str,
        _content_type: &str,
        data: Bytes,
    ) -> Result<(), ObjectStoreError> {
        let n = self.puts.fetch_add(1, Ordering::SeqCst);
        if n == self.fail_on_put {
            return Err(ObjectStoreError::Backend("simulated outage".to_string()));
        }
        self.objects.lock().unwrap().insert(key.to_string(), data);
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Bytes, ObjectStoreError> {
        self.objects
            .lock()
            .unwrap()
            .get(key)
            .cloned()
            .ok_or_else(|| ObjectStoreError::NotFound(key.to_string()))
    }

    async fn delete(&self, key: &str) -> Result<(), ObjectStoreError> {
        self.objects.lock().unwrap().remove(key);
        Ok(())
    }

    async fn exists(&self, key: &str) -> Result<bool, ObjectStoreError> {
        Ok(self.objects.lock().unwrap().contains_key(key))
    }
}

#[tokio::test]
async fn test_failed_upload_aborts_remainder_and_names_index() {
    let dir = tempfile::tempdir().unwrap();
    let db = test_db(&dir);
    let store = FlakyStore::new(1);
    let cancel = CancellationToken::new();

    let batch = select(vec![image("a"), image("b"), image("c")]).unwrap();
    let err = upload::submit_batch(&db, &store, "gal-3", &batch, &cancel)
        .await
        .unwrap_err();

    match err {
        UploadError::Item { index, .. } => assert_eq!(index, 1),
        other => panic!("expected item failure, got {other:?}"),
    }
    assert!(err.to_string().contains("item 2"));

    // The item before the failure stays; nothing after it was attempted
    let stored = db.media_for_gallery_event("gal-3").unwrap();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].display_order, 0);
}

#[tokio::test]
async fn test_cancelled_token_stops_batch_before_upload() {
    let dir = tempfile::tempdir().unwrap();
    let db = test_db(&dir);
    let store = LocalStore::new(dir.path().join("media")).unwrap();

    let cancel = CancellationToken::new();
    cancel.cancel();

    let batch = select(vec![image("a")]).unwrap();
    let err = upload::submit_batch(&db, &store, "gal-4", &batch, &cancel)
        .await
        .unwrap_err();

    assert!(matches!(err, UploadError::Cancelled));
    assert!(db.media_for_gallery_event("gal-4").unwrap().is_empty());
}

#[tokio::test]
async fn test_empty_batch_rejected_on_submit() {
    let dir = tempfile::tempdir().unwrap();
    let db = test_db(&dir);
    let store = LocalStore::new(dir.path().join("media")).unwrap();
    let cancel = CancellationToken::new();

    let batch = UploadBatch::new();
    let err = upload::submit_batch(&db, &store, "gal-5", &batch, &cancel)
        .await
        .unwrap_err();

    assert!(matches!(err, UploadError::EmptyBatch));
}
