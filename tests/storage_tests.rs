use chrono::{Duration, Utc};
use club_cms::storage::models::{
    Asset, CouncilLeader, Event, GalleryEvent, GalleryMedia, MediaKind, MonthlyAwareness, Quote,
    Resource, ResourceCategory,
};
use club_cms::storage::Database;

fn test_db() -> (tempfile::TempDir, Database) {
    let dir = tempfile::tempdir().unwrap();
    let db = Database::open(dir.path().join("data")).unwrap();
    (dir, db)
}

fn sample_event(id: &str, slug: &str) -> Event {
    let now = Utc::now();
    Event {
        id: id.to_string(),
        title: "Support Circle".to_string(),
        slug: slug.to_string(),
        description: "Weekly drop-in".to_string(),
        starts_at: now + Duration::days(3),
        ends_at: now + Duration::days(3) + Duration::hours(2),
        location: "Union 204".to_string(),
        link: None,
        image_url: None,
        created_at: now,
        updated_at: now,
    }
}

fn sample_resource(id: &str, category: ResourceCategory) -> Resource {
    let now = Utc::now();
    Resource {
        id: id.to_string(),
        title: "Crisis Line".to_string(),
        category,
        description: "Call or text 988".to_string(),
        url: Some("https://988lifeline.org".to_string()),
        tags: vec!["crisis".to_string()],
        image_url: None,
        created_at: now,
        updated_at: now,
    }
}

fn sample_gallery(id: &str, slug: &str) -> GalleryEvent {
    let now = Utc::now();
    GalleryEvent {
        id: id.to_string(),
        title: "Spring Fair".to_string(),
        slug: slug.to_string(),
        description: "Photos from the fair".to_string(),
        cover_url: None,
        created_at: now,
        updated_at: now,
    }
}

fn sample_media(id: &str, parent: &str, display_order: u32) -> GalleryMedia {
    GalleryMedia {
        id: id.to_string(),
        gallery_event_id: parent.to_string(),
        asset_id: format!("asset-{id}"),
        media_url: format!("/static/gallery/{parent}/{id}.jpg"),
        caption: None,
        display_order,
        kind: MediaKind::Image,
        created_at: Utc::now(),
    }
}

// ============================================================================
// Event tests
// ============================================================================

#[test]
fn test_put_and_get_event() {
    let (_dir, db) = test_db();
    db.put_event(&sample_event("ev-1", "support-circle")).unwrap();

    let event = db.get_event("ev-1").unwrap().expect("event should exist");
    assert_eq!(event.title, "Support Circle");
    assert_eq!(event.slug, "support-circle");
    assert_eq!(event.location, "Union 204");
}

#[test]
fn test_get_event_by_slug() {
    let (_dir, db) = test_db();
    db.put_event(&sample_event("ev-2", "fair-2026")).unwrap();

    let event = db
        .get_event_by_slug("fair-2026")
        .unwrap()
        .expect("event should resolve by slug");
    assert_eq!(event.id, "ev-2");

    assert!(db.get_event_by_slug("no-such-slug").unwrap().is_none());
}

#[test]
fn test_event_slug_exists() {
    let (_dir, db) = test_db();
    db.put_event(&sample_event("ev-3", "taken")).unwrap();

    assert!(db.event_slug_exists("taken").unwrap());
    assert!(!db.event_slug_exists("free").unwrap());
}

#[test]
fn test_update_event_fields() {
    let (_dir, db) = test_db();
    db.put_event(&sample_event("ev-4", "original")).unwrap();

    let updated = db
        .update_event(
            "ev-4",
            Some("Renamed"),
            None,
            None,
            None,
            None,
            Some("Library Lawn"),
            Some(Some("https://example.edu/rsvp")),
            None,
        )
        .unwrap();
    assert!(updated);

    let event = db.get_event("ev-4").unwrap().unwrap();
    assert_eq!(event.title, "Renamed");
    assert_eq!(event.location, "Library Lawn");
    assert_eq!(event.link, Some("https://example.edu/rsvp".to_string()));
    assert_eq!(event.slug, "original");
}

#[test]
fn test_update_event_clear_optional_field() {
    let (_dir, db) = test_db();
    let mut event = sample_event("ev-5", "with-link");
    event.link = Some("https://old.example".to_string());
    db.put_event(&event).unwrap();

    db.update_event("ev-5", None, None, None, None, None, None, Some(None), None)
        .unwrap();

    let event = db.get_event("ev-5").unwrap().unwrap();
    assert_eq!(event.link, None);
}

#[test]
fn test_update_event_slug_reindexes() {
    let (_dir, db) = test_db();
    db.put_event(&sample_event("ev-6", "old-slug")).unwrap();

    db.update_event(
        "ev-6",
        None,
        Some("new-slug"),
        None,
        None,
        None,
        None,
        None,
        None,
    )
    .unwrap();

    assert!(db.get_event_by_slug("old-slug").unwrap().is_none());
    let event = db.get_event_by_slug("new-slug").unwrap().unwrap();
    assert_eq!(event.id, "ev-6");
}

#[test]
fn test_update_event_not_found_is_noop() {
    let (_dir, db) = test_db();
    assert!(!db
        .update_event(
            "nonexistent",
            Some("Title"),
            None,
            None,
            None,
            None,
            None,
            None,
            None
        )
        .unwrap());
}

#[test]
fn test_delete_event_cleans_slug_index() {
    let (_dir, db) = test_db();
    db.put_event(&sample_event("ev-7", "to-delete")).unwrap();

    assert!(db.delete_event("ev-7").unwrap());
    assert!(db.get_event("ev-7").unwrap().is_none());
    assert!(db.get_event_by_slug("to-delete").unwrap().is_none());

    assert!(!db.delete_event("ev-7").unwrap());
}

#[test]
fn test_list_events() {
    let (_dir, db) = test_db();
    db.put_event(&sample_event("a", "a")).unwrap();
    db.put_event(&sample_event("b", "b")).unwrap();

    assert_eq!(db.list_events().unwrap().len(), 2);
}

// ============================================================================
// Resource tests
// ============================================================================

#[test]
fn test_list_resources_with_category_filter() {
    let (_dir, db) = test_db();
    db.put_resource(&sample_resource("r-1", ResourceCategory::Hotlines))
        .unwrap();
    db.put_resource(&sample_resource("r-2", ResourceCategory::Apps))
        .unwrap();
    db.put_resource(&sample_resource("r-3", ResourceCategory::Hotlines))
        .unwrap();

    let hotlines = db
        .list_resources(Some(ResourceCategory::Hotlines))
        .unwrap();
    assert_eq!(hotlines.len(), 2);

    let all = db.list_resources(None).unwrap();
    assert_eq!(all.len(), 3);
}

#[test]
fn test_update_resource_patches() {
    let (_dir, db) = test_db();
    db.put_resource(&sample_resource("r-4", ResourceCategory::Articles))
        .unwrap();

    let updated = db
        .update_resource(
            "r-4",
            Some("New Title"),
            Some(ResourceCategory::Books),
            None,
            Some(None), // clear url
            Some(&["reading".to_string()]),
            None,
        )
        .unwrap();
    assert!(updated);

    let resource = db.get_resource("r-4").unwrap().unwrap();
    assert_eq!(resource.title, "New Title");
    assert_eq!(resource.category, ResourceCategory::Books);
    assert_eq!(resource.url, None);
    assert_eq!(resource.tags, vec!["reading".to_string()]);
}

#[test]
fn test_delete_resource() {
    let (_dir, db) = test_db();
    db.put_resource(&sample_resource("r-5", ResourceCategory::Apps))
        .unwrap();

    assert!(db.delete_resource("r-5").unwrap());
    assert!(db.get_resource("r-5").unwrap().is_none());
    assert!(!db.delete_resource("r-5").unwrap());
}

// ============================================================================
// Gallery tests
// ============================================================================

#[test]
fn test_gallery_event_slug_roundtrip() {
    let (_dir, db) = test_db();
    db.put_gallery_event(&sample_gallery("g-1", "spring-fair"))
        .unwrap();

    let gallery = db
        .get_gallery_event_by_slug("spring-fair")
        .unwrap()
        .expect("gallery should resolve by slug");
    assert_eq!(gallery.id, "g-1");
    assert!(db.gallery_slug_exists("spring-fair").unwrap());
}

#[test]
fn test_update_gallery_event() {
    let (_dir, db) = test_db();
    db.put_gallery_event(&sample_gallery("g-2", "old")).unwrap();

    db.update_gallery_event(
        "g-2",
        Some("Renamed"),
        Some("new"),
        None,
        Some(Some("/static/covers/c1")),
    )
    .unwrap();

    let gallery = db.get_gallery_event_by_slug("new").unwrap().unwrap();
    assert_eq!(gallery.title, "Renamed");
    assert_eq!(gallery.cover_url, Some("/static/covers/c1".to_string()));
    assert!(db.get_gallery_event_by_slug("old").unwrap().is_none());
}

#[test]
fn test_media_ordering_by_display_order() {
    let (_dir, db) = test_db();
    db.put_gallery_event(&sample_gallery("g-3", "ordered"))
        .unwrap();
    // Insert out of order
    db.put_gallery_media(&sample_media("m-2", "g-3", 2)).unwrap();
    db.put_gallery_media(&sample_media("m-0", "g-3", 0)).unwrap();
    db.put_gallery_media(&sample_media("m-1", "g-3", 1)).unwrap();

    let media = db.media_for_gallery_event("g-3").unwrap();
    let ids: Vec<&str> = media.iter().map(|m| m.id.as_str()).collect();
    assert_eq!(ids, vec!["m-0", "m-1", "m-2"]);
}

#[test]
fn test_next_display_order() {
    let (_dir, db) = test_db();
    assert_eq!(db.next_display_order("empty").unwrap(), 0);

    db.put_gallery_media(&sample_media("m-a", "g-4", 0)).unwrap();
    db.put_gallery_media(&sample_media("m-b", "g-4", 5)).unwrap();

    // One past the current max, not the count
    assert_eq!(db.next_display_order("g-4").unwrap(), 6);
}

#[test]
fn test_delete_gallery_media_updates_parent_index() {
    let (_dir, db) = test_db();
    db.put_gallery_media(&sample_media("m-x", "g-5", 0)).unwrap();
    db.put_gallery_media(&sample_media("m-y", "g-5", 1)).unwrap();

    let removed = db
        .delete_gallery_media("m-x")
        .unwrap()
        .expect("media should exist");
    assert_eq!(removed.asset_id, "asset-m-x");

    let remaining = db.media_for_gallery_event("g-5").unwrap();
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].id, "m-y");

    assert!(db.delete_gallery_media("m-x").unwrap().is_none());
}

#[test]
fn test_delete_gallery_event_cascades_media() {
    let (_dir, db) = test_db();
    db.put_gallery_event(&sample_gallery("g-6", "cascade"))
        .unwrap();
    db.put_gallery_media(&sample_media("m-c1", "g-6", 0)).unwrap();
    db.put_gallery_media(&sample_media("m-c2", "g-6", 1)).unwrap();

    let removed = db
        .delete_gallery_event("g-6")
        .unwrap()
        .expect("gallery should exist");
    assert_eq!(removed.len(), 2);

    assert!(db.get_gallery_event("g-6").unwrap().is_none());
    assert!(!db.gallery_slug_exists("cascade").unwrap());
    assert!(db.media_for_gallery_event("g-6").unwrap().is_empty());
    assert!(db.get_gallery_media("m-c1").unwrap().is_none());

    assert!(db.delete_gallery_event("g-6").unwrap().is_none());
}

// ============================================================================
// Asset tests
// ============================================================================

#[test]
fn test_asset_path_roundtrip() {
    let (_dir, db) = test_db();
    let asset = Asset {
        id: "as-1".to_string(),
        path: "covers/as-1".to_string(),
        mime_type: "image/png".to_string(),
        byte_size: 1024,
        created_at: Utc::now(),
    };
    db.put_asset(&asset).unwrap();

    let by_path = db
        .get_asset_by_path("covers/as-1")
        .unwrap()
        .expect("asset should resolve by path");
    assert_eq!(by_path.id, "as-1");
    assert_eq!(by_path.mime_type, "image/png");
    assert!(db.asset_path_exists("covers/as-1").unwrap());
}

#[test]
fn test_delete_asset_cleans_path_index() {
    let (_dir, db) = test_db();
    let asset = Asset {
        id: "as-2".to_string(),
        path: "covers/as-2".to_string(),
        mime_type: "image/jpeg".to_string(),
        byte_size: 10,
        created_at: Utc::now(),
    };
    db.put_asset(&asset).unwrap();

    assert!(db.delete_asset("as-2").unwrap());
    assert!(db.get_asset("as-2").unwrap().is_none());
    assert!(!db.asset_path_exists("covers/as-2").unwrap());
    assert!(!db.delete_asset("as-2").unwrap());
}

// ============================================================================
// Council / quote / awareness tests
// ============================================================================

#[test]
fn test_council_leaders_ordered_for_display() {
    let (_dir, db) = test_db();
    for (id, order) in [("c-1", 2), ("c-2", 0), ("c-3", 1)] {
        db.put_council_leader(&CouncilLeader {
            id: id.to_string(),
            name: "Member".to_string(),
            role: "Officer".to_string(),
            photo_url: None,
            display_order: order,
        })
        .unwrap();
    }

    let leaders = db.list_council_leaders().unwrap();
    let orders: Vec<u32> = leaders.iter().map(|l| l.display_order).collect();
    assert_eq!(orders, vec![0, 1, 2]);
}

#[test]
fn test_quote_roundtrip_and_delete() {
    let (_dir, db) = test_db();
    let quote = Quote {
        id: "q-1".to_string(),
        text: "Small steps still move you forward.".to_string(),
        author: "Anonymous".to_string(),
        created_at: Utc::now(),
    };
    db.put_quote(&quote).unwrap();

    assert_eq!(db.get_quote("q-1").unwrap().unwrap().author, "Anonymous");
    assert!(db.delete_quote("q-1").unwrap());
    assert!(db.get_quote("q-1").unwrap().is_none());
}

#[test]
fn test_awareness_newest_first() {
    let (_dir, db) = test_db();
    for (id, month, year) in [("aw-1", 9, 2025), ("aw-2", 2, 2026), ("aw-3", 11, 2025)] {
        db.put_awareness(&MonthlyAwareness {
            id: id.to_string(),
            month,
            year,
            theme: "Theme".to_string(),
            description: "Description".to_string(),
            link: None,
        })
        .unwrap();
    }

    let months = db.list_awareness().unwrap();
    let keys: Vec<(i32, u8)> = months.iter().map(|m| (m.year, m.month)).collect();
    assert_eq!(keys, vec![(2026, 2), (2025, 11), (2025, 9)]);
}

// ============================================================================
// Purge
// ============================================================================

#[test]
fn test_purge_all() {
    let (_dir, db) = test_db();
    db.put_event(&sample_event("p-e", "p-e")).unwrap();
    db.put_resource(&sample_resource("p-r", ResourceCategory::Apps))
        .unwrap();
    db.put_gallery_event(&sample_gallery("p-g", "p-g")).unwrap();
    db.put_gallery_media(&sample_media("p-m", "p-g", 0)).unwrap();

    let stats = db.purge_all().unwrap();
    assert_eq!(stats.events, 1);
    assert_eq!(stats.resources, 1);
    assert_eq!(stats.gallery_events, 1);
    assert_eq!(stats.gallery_media, 1);

    assert!(db.list_events().unwrap().is_empty());
    assert!(db.list_resources(None).unwrap().is_empty());
    assert!(!db.event_slug_exists("p-e").unwrap());
    assert!(!db.gallery_slug_exists("p-g").unwrap());
    assert!(db.media_for_gallery_event("p-g").unwrap().is_empty());
}

// ============================================================================
// Model helpers
// ============================================================================

#[test]
fn test_media_kind_from_mime() {
    assert_eq!(MediaKind::from_mime("image/png"), Some(MediaKind::Image));
    assert_eq!(MediaKind::from_mime("image/jpeg"), Some(MediaKind::Image));
    assert_eq!(MediaKind::from_mime("video/mp4"), Some(MediaKind::Video));
    assert_eq!(MediaKind::from_mime("application/pdf"), None);
    assert_eq!(MediaKind::from_mime("audio/mpeg"), None);
    assert_eq!(MediaKind::from_mime("garbage"), None);
}

#[test]
fn test_resource_category_parse() {
    assert_eq!(
        ResourceCategory::parse("hotlines"),
        Some(ResourceCategory::Hotlines)
    );
    assert_eq!(ResourceCategory::parse("books"), Some(ResourceCategory::Books));
    assert_eq!(ResourceCategory::parse("unknown"), None);
}
