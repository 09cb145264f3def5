use axum::extract::{Multipart, Path, State};
use axum::Json;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

use super::{db_error, nullable, submit_error};
use crate::api::response::{ApiError, AppJson, JSend};
use crate::core::form::{FieldErrors, Form};
use crate::core::toast::ToastKind;
use crate::core::upload::{self, SelectedFile, UploadBatch, UploadError};
use crate::realtime::ChangeAction;
use crate::storage::models::{GalleryEvent, GalleryMedia, MediaKind};
use crate::AppState;

// ============================================================================
// Types
// ============================================================================

#[derive(Debug, Serialize)]
pub struct GalleryEventResponse {
    pub id: String,
    pub title: String,
    pub slug: String,
    pub description: String,
    pub cover_url: Option<String>,
    pub media_count: usize,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Serialize)]
pub struct GalleryMediaResponse {
    pub id: String,
    pub gallery_event_id: String,
    pub media_url: String,
    pub caption: Option<String>,
    pub display_order: u32,
    pub kind: MediaKind,
    pub created_at: String,
}

/// Create payload; doubles as the validated form value record.
#[derive(Debug, Clone, Deserialize)]
pub struct GalleryEventForm {
    pub title: String,
    pub slug: String,
    pub description: String,
    #[serde(default)]
    pub cover_url: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateGalleryEventRequest {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub slug: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub cover_url: Option<Option<String>>,
}

impl UpdateGalleryEventRequest {
    fn is_noop(&self) -> bool {
        self.title.is_none()
            && self.slug.is_none()
            && self.description.is_none()
            && self.cover_url.is_none()
    }
}

pub fn validate_gallery_event(values: &GalleryEventForm) -> FieldErrors {
    let mut errors = FieldErrors::new();
    if values.title.trim().is_empty() {
        errors.insert("title".into(), "Title is required".into());
    }
    if values.slug.trim().is_empty() {
        errors.insert("slug".into(), "Slug is required".into());
    } else if values.slug.contains(char::is_whitespace) {
        errors.insert("slug".into(), "Slug must not contain whitespace".into());
    }
    if values.description.trim().is_empty() {
        errors.insert("description".into(), "Description is required".into());
    }
    errors
}

// ============================================================================
// Gallery event handlers
// ============================================================================

pub async fn create_gallery_event(
    State(state): State<Arc<AppState>>,
    AppJson(req): AppJson<GalleryEventForm>,
) -> Result<Json<JSend<GalleryEventResponse>>, ApiError> {
    if state.db.gallery_slug_exists(&req.slug).map_err(db_error)? {
        return Err(ApiError::conflict(format!(
            "slug '{}' is already in use",
            req.slug
        )));
    }

    let db = state.db.clone();
    let mut form = Form::with_validator(req, validate_gallery_event);
    let gallery = form
        .submit(|values| async move {
            let now = Utc::now();
            let gallery = GalleryEvent {
                id: uuid::Uuid::new_v4().to_string(),
                title: values.title,
                slug: values.slug,
                description: values.description,
                cover_url: values.cover_url,
                created_at: now,
                updated_at: now,
            };
            db.put_gallery_event(&gallery).map(|_| gallery)
        })
        .await
        .map_err(submit_error)?;

    state
        .feed
        .publish("gallery", ChangeAction::Insert, &gallery.id);
    state
        .notices
        .push(
            format!("Gallery '{}' created", gallery.title),
            ToastKind::Success,
        )
        .await;

    tracing::debug!(gallery_id = %gallery.id, slug = %gallery.slug, "Created gallery event");
    let response = gallery_to_response(&gallery, 0);
    Ok(JSend::success(response))
}

pub async fn get_gallery_event(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<JSend<GalleryEventResponse>>, ApiError> {
    let gallery = state
        .db
        .get_gallery_event(&id)
        .map_err(db_error)?
        .ok_or_else(|| ApiError::not_found("Gallery event not found"))?;
    let media_count = state
        .db
        .media_for_gallery_event(&id)
        .map_err(db_error)?
        .len();

    Ok(JSend::success(gallery_to_response(&gallery, media_count)))
}

pub async fn get_gallery_event_by_slug(
    State(state): State<Arc<AppState>>,
    Path(slug): Path<String>,
) -> Result<Json<JSend<GalleryEventResponse>>, ApiError> {
    let gallery = state
        .db
        .get_gallery_event_by_slug(&slug)
        .map_err(db_error)?
        .ok_or_else(|| ApiError::not_found("Gallery event not found"))?;
    let media_count = state
        .db
        .media_for_gallery_event(&gallery.id)
        .map_err(db_error)?
        .len();

    Ok(JSend::success(gallery_to_response(&gallery, media_count)))
}

pub async fn list_gallery_events(
    State(state): State<Arc<AppState>>,
) -> Result<Json<JSend<Vec<GalleryEventResponse>>>, ApiError> {
    let mut galleries = state.db.list_gallery_events().map_err(db_error)?;
    galleries.sort_by(|a, b| b.created_at.cmp(&a.created_at));

    let mut items = Vec::with_capacity(galleries.len());
    for gallery in &galleries {
        let media_count = state
            .db
            .media_for_gallery_event(&gallery.id)
            .map_err(db_error)?
            .len();
        items.push(gallery_to_response(gallery, media_count));
    }

    Ok(JSend::success(items))
}

pub async fn update_gallery_event(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    AppJson(req): AppJson<UpdateGalleryEventRequest>,
) -> Result<Json<JSend<GalleryEventResponse>>, ApiError> {
    if req.is_noop() {
        return Err(ApiError::bad_request("at least one field must be provided"));
    }

    let existing = state
        .db
        .get_gallery_event(&id)
        .map_err(db_error)?
        .ok_or_else(|| ApiError::not_found("Gallery event not found"))?;

    if let Some(ref new_slug) = req.slug {
        if *new_slug != existing.slug
            && state.db.gallery_slug_exists(new_slug).map_err(db_error)?
        {
            return Err(ApiError::conflict(format!(
                "slug '{new_slug}' is already in use"
            )));
        }
    }

    let merged = GalleryEventForm {
        title: req.title.clone().unwrap_or_else(|| existing.title.clone()),
        slug: req.slug.clone().unwrap_or_else(|| existing.slug.clone()),
        description: req
            .description
            .clone()
            .unwrap_or_else(|| existing.description.clone()),
        cover_url: match &req.cover_url {
            Some(patch) => patch.clone(),
            None => existing.cover_url.clone(),
        },
    };
    let mut form = Form::with_validator(merged, validate_gallery_event);
    if !form.validate() {
        return Err(ApiError::unprocessable(form.errors().clone()));
    }

    state
        .db
        .update_gallery_event(
            &id,
            req.title.as_deref(),
            req.slug.as_deref(),
            req.description.as_deref(),
            req.cover_url.as_ref().map(|p| p.as_deref()),
        )
        .map_err(db_error)?;

    let gallery = state
        .db
        .get_gallery_event(&id)
        .map_err(db_error)?
        .ok_or_else(|| ApiError::internal("Gallery event not found after update"))?;
    let media_count = state
        .db
        .media_for_gallery_event(&id)
        .map_err(db_error)?
        .len();

    state.feed.publish("gallery", ChangeAction::Update, &id);
    state
        .notices
        .push(
            format!("Gallery '{}' updated", gallery.title),
            ToastKind::Success,
        )
        .await;

    tracing::debug!(gallery_id = %id, "Updated gallery event");
    Ok(JSend::success(gallery_to_response(&gallery, media_count)))
}

pub async fn delete_gallery_event(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<JSend<()>>, ApiError> {
    let removed_media = state
        .db
        .delete_gallery_event(&id)
        .map_err(db_error)?
        .ok_or_else(|| ApiError::not_found("Gallery event not found"))?;

    // Blob and asset-row cleanup is best-effort: the gallery is already gone
    for media in &removed_media {
        if let Err(e) = state.db.delete_asset(&media.asset_id) {
            tracing::warn!(asset_id = %media.asset_id, error = %e, "Failed to delete asset row");
        }
        if let Err(e) = state.object_store.delete(&media.asset_id).await {
            tracing::warn!(asset_id = %media.asset_id, error = %e, "Failed to delete media blob");
        }
    }

    state.feed.publish("gallery", ChangeAction::Delete, &id);
    state
        .notices
        .push("Gallery deleted", ToastKind::Success)
        .await;

    tracing::debug!(gallery_id = %id, media = removed_media.len(), "Deleted gallery event");
    Ok(JSend::success(()))
}

// ============================================================================
// Media handlers
// ============================================================================

pub async fn list_gallery_media(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<JSend<Vec<GalleryMediaResponse>>>, ApiError> {
    state
        .db
        .get_gallery_event(&id)
        .map_err(db_error)?
        .ok_or_else(|| ApiError::not_found("Gallery event not found"))?;

    let media = state.db.media_for_gallery_event(&id).map_err(db_error)?;
    Ok(JSend::success(media.iter().map(media_to_response).collect()))
}

/// Batch upload into one gallery event: up to 5 images and at most one
/// video (20 MB cap), uploaded sequentially with the video last.
pub async fn upload_gallery_media(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    mut multipart: Multipart,
) -> Result<Json<JSend<Vec<GalleryMediaResponse>>>, ApiError> {
    state
        .db
        .get_gallery_event(&id)
        .map_err(db_error)?
        .ok_or_else(|| ApiError::not_found("Gallery event not found"))?;

    let mut files = Vec::new();
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::bad_request(format!("Invalid multipart data: {e}")))?
    {
        let Some(file_name) = field.file_name().map(|s| s.to_string()) else {
            // Ignore non-file fields
            continue;
        };
        let content_type = field
            .content_type()
            .unwrap_or("application/octet-stream")
            .to_string();
        let data = field
            .bytes()
            .await
            .map_err(|e| ApiError::bad_request(format!("Failed to read file: {e}")))?;

        files.push(SelectedFile {
            file_name,
            content_type,
            data,
        });
    }

    let mut batch = UploadBatch::new();
    batch
        .select(files)
        .map_err(|e| ApiError::bad_request(e.to_string()))?;

    let cancel = CancellationToken::new();
    let media = upload::submit_batch(
        &state.db,
        state.object_store.as_ref(),
        &id,
        &batch,
        &cancel,
    )
    .await
    .map_err(upload_error)?;

    for entry in &media {
        state.feed.publish("media", ChangeAction::Insert, &entry.id);
    }
    state
        .notices
        .push(
            format!("Added {} media item(s) to the gallery", media.len()),
            ToastKind::Success,
        )
        .await;

    tracing::debug!(gallery_id = %id, uploaded = media.len(), "Uploaded media batch");
    Ok(JSend::success(media.iter().map(media_to_response).collect()))
}

pub async fn delete_media(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<JSend<()>>, ApiError> {
    let media = state
        .db
        .delete_gallery_media(&id)
        .map_err(db_error)?
        .ok_or_else(|| ApiError::not_found("Media not found"))?;

    if let Err(e) = state.db.delete_asset(&media.asset_id) {
        tracing::warn!(asset_id = %media.asset_id, error = %e, "Failed to delete asset row");
    }
    if let Err(e) = state.object_store.delete(&media.asset_id).await {
        tracing::warn!(asset_id = %media.asset_id, error = %e, "Failed to delete media blob");
    }

    state.feed.publish("media", ChangeAction::Delete, &id);
    state
        .notices
        .push("Media removed", ToastKind::Success)
        .await;

    tracing::debug!(media_id = %id, "Deleted media");
    Ok(JSend::success(()))
}

// ============================================================================
// Helpers
// ============================================================================

fn upload_error(e: UploadError) -> ApiError {
    match e {
        UploadError::EmptyBatch => ApiError::bad_request(e.to_string()),
        UploadError::Item { .. } | UploadError::Cancelled | UploadError::Database(_) => {
            ApiError::internal(e.to_string())
        }
    }
}

fn gallery_to_response(gallery: &GalleryEvent, media_count: usize) -> GalleryEventResponse {
    GalleryEventResponse {
        id: gallery.id.clone(),
        title: gallery.title.clone(),
        slug: gallery.slug.clone(),
        description: gallery.description.clone(),
        cover_url: gallery.cover_url.clone(),
        media_count,
        created_at: gallery.created_at.to_rfc3339(),
        updated_at: gallery.updated_at.to_rfc3339(),
    }
}

fn media_to_response(media: &GalleryMedia) -> GalleryMediaResponse {
    GalleryMediaResponse {
        id: media.id.clone(),
        gallery_event_id: media.gallery_event_id.clone(),
        media_url: media.media_url.clone(),
        caption: media.caption.clone(),
        display_order: media.display_order,
        kind: media.kind,
        created_at: media.created_at.to_rfc3339(),
    }
}
