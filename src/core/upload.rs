//! Media upload batching for gallery collections.
//!
//! A raw multi-file selection is classified and validated as a whole before
//! anything is stored: up to [`IMAGE_BATCH_LIMIT`] images plus at most one
//! video of at most [`VIDEO_SIZE_LIMIT`] bytes. Accepted batches upload
//! sequentially (video last) with one metadata row per asset carrying a
//! strictly increasing display order.

use base64::Engine;
use bytes::Bytes;
use chrono::Utc;
use thiserror::Error;
use tokio_util::sync::CancellationToken;

use crate::object_store::ObjectStore;
use crate::storage::models::{Asset, GalleryMedia, MediaKind};
use crate::storage::{Database, DatabaseError};

/// Most images accepted in one selection.
pub const IMAGE_BATCH_LIMIT: usize = 5;

/// Largest accepted video, in bytes (20 MB).
pub const VIDEO_SIZE_LIMIT: u64 = 20 * 1024 * 1024;

/// One file out of a multi-file selection, classified by its declared
/// content type.
#[derive(Debug, Clone)]
pub struct SelectedFile {
    pub file_name: String,
    pub content_type: String,
    pub data: Bytes,
}

impl SelectedFile {
    fn size_mb(&self) -> f64 {
        self.data.len() as f64 / (1024.0 * 1024.0)
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum BatchError {
    #[error("No files selected")]
    NoFiles,
    #[error("Only one video can be uploaded per batch")]
    MultipleVideos,
    #[error("Video is too large ({size_mb:.1} MB); the limit is 20 MB")]
    VideoTooLarge { size_mb: f64 },
    #[error("Too many images selected ({count}); the limit is {}", IMAGE_BATCH_LIMIT)]
    TooManyImages { count: usize },
    #[error("Unsupported file type: {content_type}")]
    UnsupportedType { content_type: String },
}

/// A validated pending upload: accepted images, the optional video, and one
/// preview slot per original selection position.
#[derive(Debug, Default)]
pub struct UploadBatch {
    images: Vec<SelectedFile>,
    video: Option<SelectedFile>,
    previews: Vec<Option<String>>,
    error: Option<String>,
}

impl UploadBatch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the pending selection. The whole batch is accepted or
    /// rejected; on rejection nothing is populated and the error message is
    /// retained until the next selection or [`clear`](Self::clear).
    pub fn select(&mut self, files: Vec<SelectedFile>) -> Result<(), BatchError> {
        match classify(files) {
            Ok((images, video, previews)) => {
                self.images = images;
                self.video = video;
                self.previews = previews;
                self.error = None;
                Ok(())
            }
            Err(e) => {
                self.images = Vec::new();
                self.video = None;
                self.previews = Vec::new();
                self.error = Some(e.to_string());
                Err(e)
            }
        }
    }

    /// Reset images, video, previews and the error string together.
    pub fn clear(&mut self) {
        *self = UploadBatch::default();
    }

    pub fn images(&self) -> &[SelectedFile] {
        &self.images
    }

    pub fn video(&self) -> Option<&SelectedFile> {
        self.video.as_ref()
    }

    /// Preview data-URLs, indexed by original selection position so
    /// completion order can never reorder them.
    pub fn previews(&self) -> &[Option<String>] {
        &self.previews
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty() && self.video.is_none()
    }

    /// Accepted files in upload order: images first, then the video.
    fn files(&self) -> impl Iterator<Item = (&SelectedFile, MediaKind)> {
        self.images
            .iter()
            .map(|f| (f, MediaKind::Image))
            .chain(self.video.iter().map(|f| (f, MediaKind::Video)))
    }
}

fn classify(
    files: Vec<SelectedFile>,
) -> Result<(Vec<SelectedFile>, Option<SelectedFile>, Vec<Option<String>>), BatchError> {
    if files.is_empty() {
        return Err(BatchError::NoFiles);
    }

    let mut images = Vec::new();
    let mut videos = Vec::new();
    for (position, file) in files.iter().enumerate() {
        match MediaKind::from_mime(&file.content_type) {
            Some(MediaKind::Image) => images.push(position),
            Some(MediaKind::Video) => videos.push(position),
            None => {
                return Err(BatchError::UnsupportedType {
                    content_type: file.content_type.clone(),
                })
            }
        }
    }

    if videos.len() > 1 {
        return Err(BatchError::MultipleVideos);
    }
    if let Some(&position) = videos.first() {
        let size = files[position].data.len() as u64;
        if size > VIDEO_SIZE_LIMIT {
            return Err(BatchError::VideoTooLarge {
                size_mb: files[position].size_mb(),
            });
        }
    }
    if images.len() > IMAGE_BATCH_LIMIT {
        return Err(BatchError::TooManyImages {
            count: images.len(),
        });
    }

    // One preview slot per selection position; each preview lands in its own
    // slot regardless of production order.
    let mut previews = vec![None; files.len()];
    for (position, file) in files.iter().enumerate() {
        previews[position] = Some(data_url(file));
    }

    let video_position = videos.first().copied();
    let mut accepted_images = Vec::new();
    let mut video = None;
    for (position, file) in files.into_iter().enumerate() {
        if Some(position) == video_position {
            video = Some(file);
        } else {
            accepted_images.push(file);
        }
    }

    Ok((accepted_images, video, previews))
}

fn data_url(file: &SelectedFile) -> String {
    let encoded = base64::engine::general_purpose::STANDARD.encode(&file.data);
    format!("data:{};base64,{}", file.content_type, encoded)
}

#[derive(Debug, Error)]
pub enum UploadError {
    #[error("Nothing to upload")]
    EmptyBatch,
    #[error("Upload cancelled")]
    Cancelled,
    /// A single store-put or row-insert failed; the rest of the batch was
    /// not attempted. `index` is the zero-based position in upload order.
    #[error("Upload stopped at item {}: {message}", .index + 1)]
    Item { index: usize, message: String },
    #[error(transparent)]
    Database(#[from] DatabaseError),
}

/// Upload an accepted batch for one gallery event.
///
/// Files upload strictly in submission order (images, then the video), each
/// followed by its metadata row with the next display order after the
/// collection's current max. The first failure aborts the remainder; rows
/// already inserted stay. The cancellation token is checked before every
/// state change that follows an await.
pub async fn submit_batch(
    db: &Database,
    store: &dyn ObjectStore,
    gallery_event_id: &str,
    batch: &UploadBatch,
    cancel: &CancellationToken,
) -> Result<Vec<GalleryMedia>, UploadError> {
    if batch.is_empty() {
        return Err(UploadError::EmptyBatch);
    }

    let mut display_order = db.next_display_order(gallery_event_id)?;
    let mut inserted = Vec::new();

    for (index, (file, kind)) in batch.files().enumerate() {
        if cancel.is_cancelled() {
            return Err(UploadError::Cancelled);
        }

        let asset_id = uuid::Uuid::new_v4().to_string();
        let path = asset_path(gallery_event_id, &asset_id, file);

        store
            .put(&asset_id, &file.content_type, file.data.clone())
            .await
            .map_err(|e| UploadError::Item {
                index,
                message: e.to_string(),
            })?;

        if cancel.is_cancelled() {
            // Do not leave an orphaned blob behind the metadata rows.
            let _ = store.delete(&asset_id).await;
            return Err(UploadError::Cancelled);
        }

        let now = Utc::now();
        let asset = Asset {
            id: asset_id.clone(),
            path: path.clone(),
            mime_type: file.content_type.clone(),
            byte_size: file.data.len() as u64,
            created_at: now,
        };
        let media = GalleryMedia {
            id: uuid::Uuid::new_v4().to_string(),
            gallery_event_id: gallery_event_id.to_string(),
            asset_id: asset_id.clone(),
            media_url: format!("/static/{path}"),
            caption: None,
            display_order,
            kind,
            created_at: now,
        };

        let row_result = db
            .put_asset(&asset)
            .and_then(|_| db.put_gallery_media(&media));
        if let Err(e) = row_result {
            // Best-effort cleanup of the uploaded blob
            let _ = store.delete(&asset_id).await;
            return Err(UploadError::Item {
                index,
                message: e.to_string(),
            });
        }

        display_order += 1;
        inserted.push(media);
    }

    Ok(inserted)
}

fn asset_path(gallery_event_id: &str, asset_id: &str, file: &SelectedFile) -> String {
    match file_extension(file) {
        Some(ext) => format!("gallery/{gallery_event_id}/{asset_id}.{ext}"),
        None => format!("gallery/{gallery_event_id}/{asset_id}"),
    }
}

fn file_extension(file: &SelectedFile) -> Option<String> {
    let from_name = file
        .file_name
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .filter(|ext| !ext.is_empty() && ext.len() <= 5 && ext.chars().all(|c| c.is_ascii_alphanumeric()));

    from_name.or_else(|| {
        mime_guess::get_mime_extensions_str(&file.content_type)
            .and_then(|exts| exts.first())
            .map(|ext| ext.to_string())
    })
}
