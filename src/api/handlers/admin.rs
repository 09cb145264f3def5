use axum::extract::{Path, State};
use axum::Json;
use serde::Serialize;
use std::sync::Arc;

use crate::api::response::{ApiError, JSend};
use crate::core::toast::Toast;
use crate::AppState;

// ============================================================================
// Types
// ============================================================================

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

#[derive(Debug, Serialize)]
pub struct PurgeResponse {
    pub events_deleted: u64,
    pub resources_deleted: u64,
    pub gallery_events_deleted: u64,
    pub gallery_media_deleted: u64,
    pub assets_deleted: u64,
    pub council_leaders_deleted: u64,
    pub quotes_deleted: u64,
    pub awareness_months_deleted: u64,
}

// ============================================================================
// Handlers
// ============================================================================

pub async fn health() -> Json<JSend<HealthResponse>> {
    JSend::success(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Active (not yet expired) admin notices, in append order.
pub async fn list_notices(State(state): State<Arc<AppState>>) -> Json<JSend<Vec<Toast>>> {
    JSend::success(state.notices.active().await)
}

/// Dismiss a notice early.
pub async fn dismiss_notice(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Json<JSend<()>> {
    state.notices.dismiss(&id).await;
    JSend::success(())
}

pub async fn admin_purge(
    State(state): State<Arc<AppState>>,
) -> Result<Json<JSend<PurgeResponse>>, ApiError> {
    let stats = state
        .db
        .purge_all()
        .map_err(|e| ApiError::internal(e.to_string()))?;

    tracing::warn!(
        events = stats.events,
        resources = stats.resources,
        gallery_events = stats.gallery_events,
        gallery_media = stats.gallery_media,
        "Purged all data"
    );

    Ok(JSend::success(PurgeResponse {
        events_deleted: stats.events,
        resources_deleted: stats.resources,
        gallery_events_deleted: stats.gallery_events,
        gallery_media_deleted: stats.gallery_media,
        assets_deleted: stats.assets,
        council_leaders_deleted: stats.council_leaders,
        quotes_deleted: stats.quotes,
        awareness_months_deleted: stats.awareness_months,
    }))
}
