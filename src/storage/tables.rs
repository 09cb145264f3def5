use redb::TableDefinition;

/// Uploaded blobs: uuid -> Asset (msgpack)
pub const ASSETS: TableDefinition<&str, &[u8]> = TableDefinition::new("assets");

/// Serving-path index: path -> asset uuid (for /static/ route lookups)
pub const ASSET_PATHS: TableDefinition<&str, &str> = TableDefinition::new("asset_paths");

/// Club events: uuid -> Event (msgpack)
pub const EVENTS: TableDefinition<&str, &[u8]> = TableDefinition::new("events");

/// Event slug index: slug -> uuid
pub const EVENT_SLUGS: TableDefinition<&str, &str> = TableDefinition::new("event_slugs");

/// Resources: uuid -> Resource (msgpack)
pub const RESOURCES: TableDefinition<&str, &[u8]> = TableDefinition::new("resources");

/// Gallery collections: uuid -> GalleryEvent (msgpack)
pub const GALLERY_EVENTS: TableDefinition<&str, &[u8]> = TableDefinition::new("gallery_events");

/// Gallery slug index: slug -> uuid
pub const GALLERY_SLUGS: TableDefinition<&str, &str> = TableDefinition::new("gallery_slugs");

/// Gallery media entries: uuid -> GalleryMedia (msgpack)
pub const GALLERY_MEDIA: TableDefinition<&str, &[u8]> = TableDefinition::new("gallery_media");

/// Parent index: gallery event uuid -> msgpack Vec of media UUIDs
pub const GALLERY_EVENT_MEDIA: TableDefinition<&str, &[u8]> =
    TableDefinition::new("gallery_event_media");

/// Council members: uuid -> CouncilLeader (msgpack)
pub const COUNCIL_LEADERS: TableDefinition<&str, &[u8]> = TableDefinition::new("council_leaders");

/// Quotes: uuid -> Quote (msgpack)
pub const QUOTES: TableDefinition<&str, &[u8]> = TableDefinition::new("quotes");

/// Awareness themes: uuid -> MonthlyAwareness (msgpack)
pub const AWARENESS_MONTHS: TableDefinition<&str, &[u8]> =
    TableDefinition::new("awareness_months");
