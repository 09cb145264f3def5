use axum::extract::{Path, State};
use axum::Json;
use chrono::Utc;
use serde::Deserialize;
use std::sync::Arc;

use super::{db_error, nullable, submit_error};
use crate::api::response::{ApiError, AppJson, JSend};
use crate::core::form::{FieldErrors, Form};
use crate::core::toast::ToastKind;
use crate::realtime::ChangeAction;
use crate::storage::models::{CouncilLeader, MonthlyAwareness, Quote};
use crate::AppState;

// ============================================================================
// Council members
// ============================================================================

#[derive(Debug, Clone, Deserialize)]
pub struct CouncilForm {
    pub name: String,
    pub role: String,
    #[serde(default)]
    pub photo_url: Option<String>,
    /// Position on the about page; appended after the current members when omitted
    #[serde(default)]
    pub display_order: Option<u32>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateCouncilRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub photo_url: Option<Option<String>>,
    #[serde(default)]
    pub display_order: Option<u32>,
}

pub fn validate_council(values: &CouncilForm) -> FieldErrors {
    let mut errors = FieldErrors::new();
    if values.name.trim().is_empty() {
        errors.insert("name".into(), "Name is required".into());
    }
    if values.role.trim().is_empty() {
        errors.insert("role".into(), "Role is required".into());
    }
    errors
}

pub async fn create_council_leader(
    State(state): State<Arc<AppState>>,
    AppJson(req): AppJson<CouncilForm>,
) -> Result<Json<JSend<CouncilLeader>>, ApiError> {
    let next_order = state.db.list_council_leaders().map_err(db_error)?.len() as u32;

    let db = state.db.clone();
    let mut form = Form::with_validator(req, validate_council);
    let leader = form
        .submit(|values| async move {
            let leader = CouncilLeader {
                id: uuid::Uuid::new_v4().to_string(),
                name: values.name,
                role: values.role,
                photo_url: values.photo_url,
                display_order: values.display_order.unwrap_or(next_order),
            };
            db.put_council_leader(&leader).map(|_| leader)
        })
        .await
        .map_err(submit_error)?;

    state
        .feed
        .publish("council", ChangeAction::Insert, &leader.id);
    state
        .notices
        .push(
            format!("Council member '{}' added", leader.name),
            ToastKind::Success,
        )
        .await;

    tracing::debug!(leader_id = %leader.id, "Created council member");
    Ok(JSend::success(leader))
}

pub async fn list_council(
    State(state): State<Arc<AppState>>,
) -> Result<Json<JSend<Vec<CouncilLeader>>>, ApiError> {
    let mut leaders = state.db.list_council_leaders().map_err(db_error)?;
    if leaders.is_empty() {
        // Degraded mode: nothing published yet, serve the defaults
        leaders = state.fallback.council().items().to_vec();
    }
    Ok(JSend::success(leaders))
}

pub async fn update_council_leader(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    AppJson(req): AppJson<UpdateCouncilRequest>,
) -> Result<Json<JSend<CouncilLeader>>, ApiError> {
    let mut leader = state
        .db
        .get_council_leader(&id)
        .map_err(db_error)?
        .ok_or_else(|| ApiError::not_found("Council member not found"))?;

    if let Some(name) = req.name {
        leader.name = name;
    }
    if let Some(role) = req.role {
        leader.role = role;
    }
    if let Some(patch) = req.photo_url {
        leader.photo_url = patch;
    }
    if let Some(order) = req.display_order {
        leader.display_order = order;
    }

    let merged = CouncilForm {
        name: leader.name.clone(),
        role: leader.role.clone(),
        photo_url: leader.photo_url.clone(),
        display_order: Some(leader.display_order),
    };
    let mut form = Form::with_validator(merged, validate_council);
    if !form.validate() {
        return Err(ApiError::unprocessable(form.errors().clone()));
    }

    state.db.put_council_leader(&leader).map_err(db_error)?;
    state.feed.publish("council", ChangeAction::Update, &id);
    state
        .notices
        .push("Council member updated", ToastKind::Success)
        .await;

    tracing::debug!(leader_id = %id, "Updated council member");
    Ok(JSend::success(leader))
}

pub async fn delete_council_leader(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<JSend<()>>, ApiError> {
    let deleted = state.db.delete_council_leader(&id).map_err(db_error)?;
    if !deleted {
        return Err(ApiError::not_found("Council member not found"));
    }

    state.feed.publish("council", ChangeAction::Delete, &id);
    state
        .notices
        .push("Council member removed", ToastKind::Success)
        .await;

    tracing::debug!(leader_id = %id, "Deleted council member");
    Ok(JSend::success(()))
}

// ============================================================================
// Quotes
// ============================================================================

#[derive(Debug, Clone, Deserialize)]
pub struct QuoteForm {
    pub text: String,
    pub author: String,
}

#[derive(Debug, Deserialize)]
pub struct UpdateQuoteRequest {
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub author: Option<String>,
}

pub fn validate_quote(values: &QuoteForm) -> FieldErrors {
    let mut errors = FieldErrors::new();
    if values.text.trim().is_empty() {
        errors.insert("text".into(), "Text is required".into());
    }
    if values.author.trim().is_empty() {
        errors.insert("author".into(), "Author is required".into());
    }
    errors
}

pub async fn create_quote(
    State(state): State<Arc<AppState>>,
    AppJson(req): AppJson<QuoteForm>,
) -> Result<Json<JSend<Quote>>, ApiError> {
    let db = state.db.clone();
    let mut form = Form::with_validator(req, validate_quote);
    let quote = form
        .submit(|values| async move {
            let quote = Quote {
                id: uuid::Uuid::new_v4().to_string(),
                text: values.text,
                author: values.author,
                created_at: Utc::now(),
            };
            db.put_quote(&quote).map(|_| quote)
        })
        .await
        .map_err(submit_error)?;

    state.feed.publish("quotes", ChangeAction::Insert, &quote.id);
    state
        .notices
        .push("Quote added", ToastKind::Success)
        .await;

    tracing::debug!(quote_id = %quote.id, "Created quote");
    Ok(JSend::success(quote))
}

pub async fn list_quotes(
    State(state): State<Arc<AppState>>,
) -> Result<Json<JSend<Vec<Quote>>>, ApiError> {
    let mut quotes = state.db.list_quotes().map_err(db_error)?;
    if quotes.is_empty() {
        // Degraded mode: nothing published yet, serve the defaults
        quotes = state.fallback.quotes().items().to_vec();
    }
    quotes.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    Ok(JSend::success(quotes))
}

pub async fn update_quote(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    AppJson(req): AppJson<UpdateQuoteRequest>,
) -> Result<Json<JSend<Quote>>, ApiError> {
    let mut quote = state
        .db
        .get_quote(&id)
        .map_err(db_error)?
        .ok_or_else(|| ApiError::not_found("Quote not found"))?;

    if let Some(text) = req.text {
        quote.text = text;
    }
    if let Some(author) = req.author {
        quote.author = author;
    }

    let merged = QuoteForm {
        text: quote.text.clone(),
        author: quote.author.clone(),
    };
    let mut form = Form::with_validator(merged, validate_quote);
    if !form.validate() {
        return Err(ApiError::unprocessable(form.errors().clone()));
    }

    state.db.put_quote(&quote).map_err(db_error)?;
    state.feed.publish("quotes", ChangeAction::Update, &id);
    state
        .notices
        .push("Quote updated", ToastKind::Success)
        .await;

    tracing::debug!(quote_id = %id, "Updated quote");
    Ok(JSend::success(quote))
}

pub async fn delete_quote(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<JSend<()>>, ApiError> {
    let deleted = state.db.delete_quote(&id).map_err(db_error)?;
    if !deleted {
        return Err(ApiError::not_found("Quote not found"));
    }

    state.feed.publish("quotes", ChangeAction::Delete, &id);
    state
        .notices
        .push("Quote removed", ToastKind::Success)
        .await;

    tracing::debug!(quote_id = %id, "Deleted quote");
    Ok(JSend::success(()))
}

// ============================================================================
// Monthly awareness themes
// ============================================================================

#[derive(Debug, Clone, Deserialize)]
pub struct AwarenessForm {
    pub month: u8,
    pub year: i32,
    pub theme: String,
    pub description: String,
    #[serde(default)]
    pub link: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateAwarenessRequest {
    #[serde(default)]
    pub month: Option<u8>,
    #[serde(default)]
    pub year: Option<i32>,
    #[serde(default)]
    pub theme: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub link: Option<Option<String>>,
}

pub fn validate_awareness(values: &AwarenessForm) -> FieldErrors {
    let mut errors = FieldErrors::new();
    if !(1..=12).contains(&values.month) {
        errors.insert("month".into(), "Month must be between 1 and 12".into());
    }
    if values.theme.trim().is_empty() {
        errors.insert("theme".into(), "Theme is required".into());
    }
    if values.description.trim().is_empty() {
        errors.insert("description".into(), "Description is required".into());
    }
    errors
}

pub async fn create_awareness(
    State(state): State<Arc<AppState>>,
    AppJson(req): AppJson<AwarenessForm>,
) -> Result<Json<JSend<MonthlyAwareness>>, ApiError> {
    let db = state.db.clone();
    let mut form = Form::with_validator(req, validate_awareness);
    let awareness = form
        .submit(|values| async move {
            let awareness = MonthlyAwareness {
                id: uuid::Uuid::new_v4().to_string(),
                month: values.month,
                year: values.year,
                theme: values.theme,
                description: values.description,
                link: values.link,
            };
            db.put_awareness(&awareness).map(|_| awareness)
        })
        .await
        .map_err(submit_error)?;

    state
        .feed
        .publish("awareness", ChangeAction::Insert, &awareness.id);
    state
        .notices
        .push(
            format!("Awareness theme '{}' added", awareness.theme),
            ToastKind::Success,
        )
        .await;

    tracing::debug!(awareness_id = %awareness.id, "Created awareness theme");
    Ok(JSend::success(awareness))
}

pub async fn list_awareness(
    State(state): State<Arc<AppState>>,
) -> Result<Json<JSend<Vec<MonthlyAwareness>>>, ApiError> {
    let months = state.db.list_awareness().map_err(db_error)?;
    Ok(JSend::success(months))
}

pub async fn update_awareness(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    AppJson(req): AppJson<UpdateAwarenessRequest>,
) -> Result<Json<JSend<MonthlyAwareness>>, ApiError> {
    let mut awareness = state
        .db
        .get_awareness(&id)
        .map_err(db_error)?
        .ok_or_else(|| ApiError::not_found("Awareness theme not found"))?;

    if let Some(month) = req.month {
        awareness.month = month;
    }
    if let Some(year) = req.year {
        awareness.year = year;
    }
    if let Some(theme) = req.theme {
        awareness.theme = theme;
    }
    if let Some(description) = req.description {
        awareness.description = description;
    }
    if let Some(patch) = req.link {
        awareness.link = patch;
    }

    let merged = AwarenessForm {
        month: awareness.month,
        year: awareness.year,
        theme: awareness.theme.clone(),
        description: awareness.description.clone(),
        link: awareness.link.clone(),
    };
    let mut form = Form::with_validator(merged, validate_awareness);
    if !form.validate() {
        return Err(ApiError::unprocessable(form.errors().clone()));
    }

    state.db.put_awareness(&awareness).map_err(db_error)?;
    state.feed.publish("awareness", ChangeAction::Update, &id);
    state
        .notices
        .push("Awareness theme updated", ToastKind::Success)
        .await;

    tracing::debug!(awareness_id = %id, "Updated awareness theme");
    Ok(JSend::success(awareness))
}

pub async fn delete_awareness(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<JSend<()>>, ApiError> {
    let deleted = state.db.delete_awareness(&id).map_err(db_error)?;
    if !deleted {
        return Err(ApiError::not_found("Awareness theme not found"));
    }

    state.feed.publish("awareness", ChangeAction::Delete, &id);
    state
        .notices
        .push("Awareness theme removed", ToastKind::Success)
        .await;

    tracing::debug!(awareness_id = %id, "Deleted awareness theme");
    Ok(JSend::success(()))
}
