mod admin;
mod community;
mod events;
mod gallery;
mod resources;
mod static_files;
mod subscribe;
mod uploads;

use serde::de::{Deserialize, DeserializeOwned, Deserializer};

use crate::api::response::ApiError;
use crate::core::form::SubmitError;
use crate::storage::DatabaseError;

pub use admin::{admin_purge, dismiss_notice, health, list_notices};
pub use community::{
    create_awareness, create_council_leader, create_quote, delete_awareness,
    delete_council_leader, delete_quote, list_awareness, list_council, list_quotes,
    update_awareness, update_council_leader, update_quote,
};
pub use events::{
    create_event, delete_event, get_event, get_event_by_slug, list_events, update_event,
};
pub use gallery::{
    create_gallery_event, delete_gallery_event, delete_media, get_gallery_event,
    get_gallery_event_by_slug, list_gallery_events, list_gallery_media, update_gallery_event,
    upload_gallery_media,
};
pub use resources::{
    create_resource, delete_resource, get_resource, list_resources, update_resource,
};
pub use static_files::serve_static;
pub use subscribe::subscribe;
pub use uploads::upload_image;

/// Distinguishes between a missing field (`None`) and an explicit `null` (`Some(None)`).
fn nullable<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: DeserializeOwned,
    D: Deserializer<'de>,
{
    Ok(Some(Option::deserialize(deserializer)?))
}

/// Map a form submit failure to an ApiError: validation failures carry the
/// per-field messages, handler failures are storage errors.
fn submit_error(e: SubmitError<DatabaseError>) -> ApiError {
    match e {
        SubmitError::Invalid(fields) => ApiError::unprocessable(fields),
        SubmitError::Failed(e) => ApiError::internal(e.to_string()),
    }
}

/// Map a storage error to a 5xx ApiError.
fn db_error(e: DatabaseError) -> ApiError {
    ApiError::internal(e.to_string())
}
