use axum::extract::{Path, State};
use axum::Json;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::{db_error, nullable, submit_error};
use crate::api::response::{ApiError, AppJson, AppQuery, JSend, Page, Pagination};
use crate::core::form::{FieldErrors, Form};
use crate::core::toast::ToastKind;
use crate::realtime::ChangeAction;
use crate::storage::models::Event;
use crate::AppState;

// ============================================================================
// Types
// ============================================================================

#[derive(Debug, Serialize)]
pub struct EventResponse {
    pub id: String,
    pub title: String,
    pub slug: String,
    pub description: String,
    pub starts_at: String,
    pub ends_at: String,
    pub location: String,
    pub link: Option<String>,
    pub image_url: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

/// Create payload; doubles as the validated form value record.
#[derive(Debug, Clone, Deserialize)]
pub struct EventForm {
    pub title: String,
    pub slug: String,
    pub description: String,
    pub starts_at: DateTime<Utc>,
    pub ends_at: DateTime<Utc>,
    pub location: String,
    #[serde(default)]
    pub link: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateEventRequest {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub slug: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub starts_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub ends_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub link: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable")]
    pub image_url: Option<Option<String>>,
}

impl UpdateEventRequest {
    fn is_noop(&self) -> bool {
        self.title.is_none()
            && self.slug.is_none()
            && self.description.is_none()
            && self.starts_at.is_none()
            && self.ends_at.is_none()
            && self.location.is_none()
            && self.link.is_none()
            && self.image_url.is_none()
    }
}

#[derive(Debug, Deserialize)]
pub struct ListEventsParams {
    #[serde(default = "default_limit")]
    pub limit: u32,
    #[serde(default)]
    pub offset: u32,
    /// Only events that have not ended yet
    #[serde(default)]
    pub upcoming: bool,
}

fn default_limit() -> u32 {
    20
}

pub fn validate_event(values: &EventForm) -> FieldErrors {
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
    if values.location.trim().is_empty() {
        errors.insert("location".into(), "Location is required".into());
    }
    if values.ends_at < values.starts_at {
        errors.insert(
            "ends_at".into(),
            "End time must not be before the start time".into(),
        );
    }
    errors
}

// ============================================================================
// Handlers
// ============================================================================

pub async fn create_event(
    State(state): State<Arc<AppState>>,
    AppJson(req): AppJson<EventForm>,
) -> Result<Json<JSend<EventResponse>>, ApiError> {
    if state.db.event_slug_exists(&req.slug).map_err(db_error)? {
        return Err(ApiError::conflict(format!(
            "slug '{}' is already in use",
            req.slug
        )));
    }

    let db = state.db.clone();
    let mut form = Form::with_validator(req, validate_event);
    let event = form
        .submit(|values| async move {
            let now = Utc::now();
            let event = Event {
                id: uuid::Uuid::new_v4().to_string(),
                title: values.title,
                slug: values.slug,
                description: values.description,
                starts_at: values.starts_at,
                ends_at: values.ends_at,
                location: values.location,
                link: values.link,
                image_url: values.image_url,
                created_at: now,
                updated_at: now,
            };
            db.put_event(&event).map(|_| event)
        })
        .await
        .map_err(submit_error)?;

    state.feed.publish("events", ChangeAction::Insert, &event.id);
    state
        .notices
        .push(format!("Event '{}' created", event.title), ToastKind::Success)
        .await;

    tracing::debug!(event_id = %event.id, slug = %event.slug, "Created event");
    Ok(JSend::success(event_to_response(&event)))
}

pub async fn get_event(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<JSend<EventResponse>>, ApiError> {
    let event = state
        .db
        .get_event(&id)
        .map_err(db_error)?
        .ok_or_else(|| ApiError::not_found("Event not found"))?;

    Ok(JSend::success(event_to_response(&event)))
}

pub async fn get_event_by_slug(
    State(state): State<Arc<AppState>>,
    Path(slug): Path<String>,
) -> Result<Json<JSend<EventResponse>>, ApiError> {
    let event = state
        .db
        .get_event_by_slug(&slug)
        .map_err(db_error)?
        .ok_or_else(|| ApiError::not_found("Event not found"))?;

    Ok(JSend::success(event_to_response(&event)))
}

pub async fn list_events(
    State(state): State<Arc<AppState>>,
    AppQuery(params): AppQuery<ListEventsParams>,
) -> Result<Json<JSend<Page<EventResponse>>>, ApiError> {
    if params.limit == 0 {
        return Err(ApiError::bad_request("limit must be greater than 0"));
    }

    let mut events = state.db.list_events().map_err(db_error)?;
    if events.is_empty() {
        // Degraded mode: nothing published yet, serve the defaults
        events = state.fallback.events().items().to_vec();
    }

    if params.upcoming {
        let now = Utc::now();
        events.retain(|e| e.ends_at >= now);
    }
    events.sort_by_key(|e| e.starts_at);

    let total = events.len() as u64;
    let items: Vec<EventResponse> = events
        .iter()
        .skip(params.offset as usize)
        .take(params.limit as usize)
        .map(event_to_response)
        .collect();

    Ok(JSend::page(
        items,
        Pagination {
            limit: params.limit,
            offset: params.offset,
            total,
        },
    ))
}

pub async fn update_event(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    AppJson(req): AppJson<UpdateEventRequest>,
) -> Result<Json<JSend<EventResponse>>, ApiError> {
    if req.is_noop() {
        return Err(ApiError::bad_request("at least one field must be provided"));
    }

    let existing = state
        .db
        .get_event(&id)
        .map_err(db_error)?
        .ok_or_else(|| ApiError::not_found("Event not found"))?;

    if let Some(ref new_slug) = req.slug {
        if *new_slug != existing.slug && state.db.event_slug_exists(new_slug).map_err(db_error)? {
            return Err(ApiError::conflict(format!(
                "slug '{new_slug}' is already in use"
            )));
        }
    }

    // Validate the record as it will look after the merge
    let merged = EventForm {
        title: req.title.clone().unwrap_or_else(|| existing.title.clone()),
        slug: req.slug.clone().unwrap_or_else(|| existing.slug.clone()),
        description: req
            .description
            .clone()
            .unwrap_or_else(|| existing.description.clone()),
        starts_at: req.starts_at.unwrap_or(existing.starts_at),
        ends_at: req.ends_at.unwrap_or(existing.ends_at),
        location: req
            .location
            .clone()
            .unwrap_or_else(|| existing.location.clone()),
        link: match &req.link {
            Some(patch) => patch.clone(),
            None => existing.link.clone(),
        },
        image_url: match &req.image_url {
            Some(patch) => patch.clone(),
            None => existing.image_url.clone(),
        },
    };
    let mut form = Form::with_validator(merged, validate_event);
    if !form.validate() {
        return Err(ApiError::unprocessable(form.errors().clone()));
    }

    state
        .db
        .update_event(
            &id,
            req.title.as_deref(),
            req.slug.as_deref(),
            req.description.as_deref(),
            req.starts_at,
            req.ends_at,
            req.location.as_deref(),
            req.link.as_ref().map(|p| p.as_deref()),
            req.image_url.as_ref().map(|p| p.as_deref()),
        )
        .map_err(db_error)?;

    let event = state
        .db
        .get_event(&id)
        .map_err(db_error)?
        .ok_or_else(|| ApiError::internal("Event not found after update"))?;

    state.feed.publish("events", ChangeAction::Update, &id);
    state
        .notices
        .push(format!("Event '{}' updated", event.title), ToastKind::Success)
        .await;

    tracing::debug!(event_id = %id, "Updated event");
    Ok(JSend::success(event_to_response(&event)))
}

pub async fn delete_event(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<JSend<()>>, ApiError> {
    let deleted = state.db.delete_event(&id).map_err(db_error)?;
    if !deleted {
        return Err(ApiError::not_found("Event not found"));
    }

    state.feed.publish("events", ChangeAction::Delete, &id);
    state
        .notices
        .push("Event deleted", ToastKind::Success)
        .await;

    tracing::debug!(event_id = %id, "Deleted event");
    Ok(JSend::success(()))
}

// ============================================================================
// Helpers
// ============================================================================

fn event_to_response(event: &Event) -> EventResponse {
    EventResponse {
        id: event.id.clone(),
        title: event.title.clone(),
        slug: event.slug.clone(),
        description: event.description.clone(),
        starts_at: event.starts_at.to_rfc3339(),
        ends_at: event.ends_at.to_rfc3339(),
        location: event.location.clone(),
        link: event.link.clone(),
        image_url: event.image_url.clone(),
        created_at: event.created_at.to_rfc3339(),
        updated_at: event.updated_at.to_rfc3339(),
    }
}
