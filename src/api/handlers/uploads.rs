use axum::extract::{Multipart, State};
use axum::Json;
use chrono::Utc;
use serde::Serialize;
use std::sync::Arc;

use super::db_error;
use crate::api::response::{ApiError, JSend};
use crate::core::toast::ToastKind;
use crate::storage::models::{Asset, MediaKind};
use crate::AppState;

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub id: String,
    pub url: String,
    pub mime_type: String,
    pub byte_size: u64,
}

/// Single-image upload for event and resource cover images.
/// Fields: `file` (required), `folder` (optional path prefix, defaults to "covers").
pub async fn upload_image(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<Json<JSend<UploadResponse>>, ApiError> {
    let mut file_data = None;
    let mut file_name: Option<String> = None;
    let mut content_type: Option<String> = None;
    let mut folder: Option<String> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::bad_request(format!("Invalid multipart data: {e}")))?
    {
        let field_name = field.name().unwrap_or("").to_string();

        match field_name.as_str() {
            "file" => {
                file_name = field.file_name().map(|s| s.to_string());
                content_type = field.content_type().map(|s| s.to_string());

                let data = field
                    .bytes()
                    .await
                    .map_err(|e| ApiError::bad_request(format!("Failed to read file: {e}")))?;

                if data.len() as u64 > state.config.max_upload_size {
                    return Err(ApiError::payload_too_large(format!(
                        "File exceeds maximum upload size of {} bytes",
                        state.config.max_upload_size
                    )));
                }
                file_data = Some(data);
            }
            "folder" => {
                folder = Some(
                    field
                        .text()
                        .await
                        .map_err(|e| ApiError::bad_request(format!("Invalid folder: {e}")))?,
                );
            }
            _ => {
                // Ignore unknown fields
            }
        }
    }

    let file_data = file_data.ok_or_else(|| ApiError::bad_request("file field is required"))?;

    // MIME type: from multipart Content-Type, or guessed from the filename
    let mime_type = content_type
        .filter(|ct| ct != "application/octet-stream")
        .or_else(|| {
            file_name
                .as_deref()
                .and_then(|n| mime_guess::from_path(n).first())
                .map(|m| m.to_string())
        })
        .unwrap_or_else(|| "application/octet-stream".to_string());

    if MediaKind::from_mime(&mime_type) != Some(MediaKind::Image) {
        return Err(ApiError::bad_request(format!(
            "Only images are accepted here (got {mime_type})"
        )));
    }

    let folder = folder.unwrap_or_else(|| "covers".to_string());
    if folder.trim().is_empty() || folder.contains("..") {
        return Err(ApiError::bad_request("Invalid folder"));
    }

    let id = uuid::Uuid::new_v4().to_string();
    let path = format!("{}/{}", folder.trim_matches('/'), id);

    // Phase 1: upload the blob (keyed by UUID)
    state
        .object_store
        .put(&id, &mime_type, file_data.clone())
        .await
        .map_err(|e| ApiError::internal(format!("Failed to store file: {e}")))?;

    // Phase 2: record the asset metadata
    let asset = Asset {
        id: id.clone(),
        path: path.clone(),
        mime_type: mime_type.clone(),
        byte_size: file_data.len() as u64,
        created_at: Utc::now(),
    };
    if let Err(e) = state.db.put_asset(&asset) {
        // Best-effort cleanup of the uploaded blob
        let _ = state.object_store.delete(&id).await;
        return Err(db_error(e));
    }

    state
        .notices
        .push("Image uploaded", ToastKind::Success)
        .await;

    tracing::debug!(asset_id = %id, path = %path, "Uploaded image");
    Ok(JSend::success(UploadResponse {
        id,
        url: format!("/static/{path}"),
        mime_type,
        byte_size: asset.byte_size,
    }))
}
