use axum::{
    extract::DefaultBodyLimit,
    routing::{delete, get, post, put},
    Router,
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use super::handlers;
use crate::AppState;

pub fn create_router(state: Arc<AppState>) -> Router {
    let upload_limit = state.config.max_upload_size as usize;

    let mut router = Router::new()
        // Events
        .route("/events", get(handlers::list_events))
        .route("/events", post(handlers::create_event))
        .route("/events/:id", get(handlers::get_event))
        .route("/events/:id", put(handlers::update_event))
        .route("/events/:id", delete(handlers::delete_event))
        .route("/events/slug/*slug", get(handlers::get_event_by_slug))
        // Resources
        .route("/resources", get(handlers::list_resources))
        .route("/resources", post(handlers::create_resource))
        .route("/resources/:id", get(handlers::get_resource))
        .route("/resources/:id", put(handlers::update_resource))
        .route("/resources/:id", delete(handlers::delete_resource))
        // Gallery
        .route("/gallery", get(handlers::list_gallery_events))
        .route("/gallery", post(handlers::create_gallery_event))
        .route("/gallery/:id", get(handlers::get_gallery_event))
        .route("/gallery/:id", put(handlers::update_gallery_event))
        .route("/gallery/:id", delete(handlers::delete_gallery_event))
        .route(
            "/gallery/slug/*slug",
            get(handlers::get_gallery_event_by_slug),
        )
        .route("/gallery/:id/media", get(handlers::list_gallery_media))
        .route(
            "/gallery/:id/media",
            post(handlers::upload_gallery_media).layer(DefaultBodyLimit::max(upload_limit)),
        )
        .route("/media/:id", delete(handlers::delete_media))
        // Community content
        .route("/council", get(handlers::list_council))
        .route("/council", post(handlers::create_council_leader))
        .route("/council/:id", put(handlers::update_council_leader))
        .route("/council/:id", delete(handlers::delete_council_leader))
        .route("/quotes", get(handlers::list_quotes))
        .route("/quotes", post(handlers::create_quote))
        .route("/quotes/:id", put(handlers::update_quote))
        .route("/quotes/:id", delete(handlers::delete_quote))
        .route("/awareness", get(handlers::list_awareness))
        .route("/awareness", post(handlers::create_awareness))
        .route("/awareness/:id", put(handlers::update_awareness))
        .route("/awareness/:id", delete(handlers::delete_awareness))
        // Cover image upload
        .route(
            "/uploads",
            post(handlers::upload_image).layer(DefaultBodyLimit::max(upload_limit)),
        )
        // Static content (media download)
        .route("/static/*path", get(handlers::serve_static))
        // Realtime change feed
        .route("/subscribe/:table", get(handlers::subscribe))
        // Admin
        .route("/admin/notices", get(handlers::list_notices))
        .route("/admin/notices/:id", delete(handlers::dismiss_notice))
        // Internal
        .route("/_internal/health", get(handlers::health));

    // Test-only routes
    if state.config.test_mode {
        tracing::warn!("Test mode enabled — purge route is available.");
        router = router.route("/admin/purge", delete(handlers::admin_purge));
    }

    router.layer(TraceLayer::new_for_http()).with_state(state)
}
