use axum::extract::{Path, State};
use axum::Json;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::{db_error, nullable, submit_error};
use crate::api::response::{ApiError, AppJson, AppQuery, JSend, Page, Pagination};
use crate::core::form::{FieldErrors, Form};
use crate::core::toast::ToastKind;
use crate::realtime::ChangeAction;
use crate::storage::models::{Resource, ResourceCategory};
use crate::AppState;

// ============================================================================
// Types
// ============================================================================

#[derive(Debug, Serialize)]
pub struct ResourceResponse {
    pub id: String,
    pub title: String,
    pub category: ResourceCategory,
    pub description: String,
    pub url: Option<String>,
    pub tags: Vec<String>,
    pub image_url: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

/// Create payload; doubles as the validated form value record.
#[derive(Debug, Clone, Deserialize)]
pub struct ResourceForm {
    pub title: String,
    pub category: ResourceCategory,
    pub description: String,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub image_url: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateResourceRequest {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub category: Option<ResourceCategory>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub url: Option<Option<String>>,
    #[serde(default)]
    pub tags: Option<Vec<String>>,
    #[serde(default, deserialize_with = "nullable")]
    pub image_url: Option<Option<String>>,
}

impl UpdateResourceRequest {
    fn is_noop(&self) -> bool {
        self.title.is_none()
            && self.category.is_none()
            && self.description.is_none()
            && self.url.is_none()
            && self.tags.is_none()
            && self.image_url.is_none()
    }
}

#[derive(Debug, Deserialize)]
pub struct ListResourcesParams {
    #[serde(default = "default_limit")]
    pub limit: u32,
    #[serde(default)]
    pub offset: u32,
    #[serde(default)]
    pub category: Option<String>,
}

fn default_limit() -> u32 {
    20
}

pub fn validate_resource(values: &ResourceForm) -> FieldErrors {
    let mut errors = FieldErrors::new();
    if values.title.trim().is_empty() {
        errors.insert("title".into(), "Title is required".into());
    }
    if values.description.trim().is_empty() {
        errors.insert("description".into(), "Description is required".into());
    }
    if let Some(url) = &values.url {
        if !url.starts_with("http://") && !url.starts_with("https://") {
            errors.insert("url".into(), "URL must start with http:// or https://".into());
        }
    }
    errors
}

// ============================================================================
// Handlers
// ============================================================================

pub async fn create_resource(
    State(state): State<Arc<AppState>>,
    AppJson(req): AppJson<ResourceForm>,
) -> Result<Json<JSend<ResourceResponse>>, ApiError> {
    let db = state.db.clone();
    let mut form = Form::with_validator(req, validate_resource);
    let resource = form
        .submit(|values| async move {
            let now = Utc::now();
            let resource = Resource {
                id: uuid::Uuid::new_v4().to_string(),
                title: values.title,
                category: values.category,
                description: values.description,
                url: values.url,
                tags: values.tags,
                image_url: values.image_url,
                created_at: now,
                updated_at: now,
            };
            db.put_resource(&resource).map(|_| resource)
        })
        .await
        .map_err(submit_error)?;

    state
        .feed
        .publish("resources", ChangeAction::Insert, &resource.id);
    state
        .notices
        .push(
            format!("Resource '{}' created", resource.title),
            ToastKind::Success,
        )
        .await;

    tracing::debug!(resource_id = %resource.id, "Created resource");
    Ok(JSend::success(resource_to_response(&resource)))
}

pub async fn get_resource(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<JSend<ResourceResponse>>, ApiError> {
    let resource = state
        .db
        .get_resource(&id)
        .map_err(db_error)?
        .ok_or_else(|| ApiError::not_found("Resource not found"))?;

    Ok(JSend::success(resource_to_response(&resource)))
}

pub async fn list_resources(
    State(state): State<Arc<AppState>>,
    AppQuery(params): AppQuery<ListResourcesParams>,
) -> Result<Json<JSend<Page<ResourceResponse>>>, ApiError> {
    if params.limit == 0 {
        return Err(ApiError::bad_request("limit must be greater than 0"));
    }

    let category = match params.category.as_deref() {
        Some(raw) => Some(ResourceCategory::parse(raw).ok_or_else(|| {
            ApiError::bad_request(format!("unknown resource category '{raw}'"))
        })?),
        None => None,
    };

    let mut resources = state.db.list_resources(category).map_err(db_error)?;
    if resources.is_empty() && category.is_none() {
        // Degraded mode: nothing published yet, serve the defaults
        resources = state.fallback.resources().items().to_vec();
    }
    resources.sort_by(|a, b| b.created_at.cmp(&a.created_at));

    let total = resources.len() as u64;
    let items: Vec<ResourceResponse> = resources
        .iter()
        .skip(params.offset as usize)
        .take(params.limit as usize)
        .map(resource_to_response)
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

pub async fn update_resource(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    AppJson(req): AppJson<UpdateResourceRequest>,
) -> Result<Json<JSend<ResourceResponse>>, ApiError> {
    if req.is_noop() {
        return Err(ApiError::bad_request("at least one field must be provided"));
    }

    let existing = state
        .db
        .get_resource(&id)
        .map_err(db_error)?
        .ok_or_else(|| ApiError::not_found("Resource not found"))?;

    // Validate the record as it will look after the merge
    let merged = ResourceForm {
        title: req.title.clone().unwrap_or_else(|| existing.title.clone()),
        category: req.category.unwrap_or(existing.category),
        description: req
            .description
            .clone()
            .unwrap_or_else(|| existing.description.clone()),
        url: match &req.url {
            Some(patch) => patch.clone(),
            None => existing.url.clone(),
        },
        tags: req.tags.clone().unwrap_or_else(|| existing.tags.clone()),
        image_url: match &req.image_url {
            Some(patch) => patch.clone(),
            None => existing.image_url.clone(),
        },
    };
    let mut form = Form::with_validator(merged, validate_resource);
    if !form.validate() {
        return Err(ApiError::unprocessable(form.errors().clone()));
    }

    state
        .db
        .update_resource(
            &id,
            req.title.as_deref(),
            req.category,
            req.description.as_deref(),
            req.url.as_ref().map(|p| p.as_deref()),
            req.tags.as_deref(),
            req.image_url.as_ref().map(|p| p.as_deref()),
        )
        .map_err(db_error)?;

    let resource = state
        .db
        .get_resource(&id)
        .map_err(db_error)?
        .ok_or_else(|| ApiError::internal("Resource not found after update"))?;

    state.feed.publish("resources", ChangeAction::Update, &id);
    state
        .notices
        .push(
            format!("Resource '{}' updated", resource.title),
            ToastKind::Success,
        )
        .await;

    tracing::debug!(resource_id = %id, "Updated resource");
    Ok(JSend::success(resource_to_response(&resource)))
}

pub async fn delete_resource(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<JSend<()>>, ApiError> {
    let deleted = state.db.delete_resource(&id).map_err(db_error)?;
    if !deleted {
        return Err(ApiError::not_found("Resource not found"));
    }

    state.feed.publish("resources", ChangeAction::Delete, &id);
    state
        .notices
        .push("Resource deleted", ToastKind::Success)
        .await;

    tracing::debug!(resource_id = %id, "Deleted resource");
    Ok(JSend::success(()))
}

// ============================================================================
// Helpers
// ============================================================================

fn resource_to_response(resource: &Resource) -> ResourceResponse {
    ResourceResponse {
        id: resource.id.clone(),
        title: resource.title.clone(),
        category: resource.category,
        description: resource.description.clone(),
        url: resource.url.clone(),
        tags: resource.tags.clone(),
        image_url: resource.image_url.clone(),
        created_at: resource.created_at.to_rfc3339(),
        updated_at: resource.updated_at.to_rfc3339(),
    }
}
