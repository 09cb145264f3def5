use chrono::{DateTime, Utc};
use redb::ReadableTable;
use serde::de::DeserializeOwned;
use serde::Serialize;

use super::db::{Database, DatabaseError};
use super::models::{
    CouncilLeader, Event, GalleryEvent, GalleryMedia, MonthlyAwareness, Quote, Resource,
    ResourceCategory,
};
use super::tables::*;

type RecordTable = redb::TableDefinition<'static, &'static str, &'static [u8]>;

impl Database {
    // ========================================================================
    // Generic single-table record operations
    // ========================================================================

    fn put_record<T: Serialize>(
        &self,
        def: RecordTable,
        id: &str,
        record: &T,
    ) -> Result<(), DatabaseError> {
        debug_assert!(!id.is_empty(), "record id must not be empty");

        let write_txn = self.begin_write()?;
        {
            let mut table = write_txn.open_table(def)?;
            let data = rmp_serde::to_vec_named(record)?;
            table.insert(id, data.as_slice())?;
        }
        write_txn.commit()?;
        Ok(())
    }

    fn get_record<T: DeserializeOwned>(
        &self,
        def: RecordTable,
        id: &str,
    ) -> Result<Option<T>, DatabaseError> {
        let read_txn = self.begin_read()?;
        let table = read_txn.open_table(def)?;

        match table.get(id)? {
            Some(data) => Ok(Some(rmp_serde::from_slice(data.value())?)),
            None => Ok(None),
        }
    }

    fn list_records<T: DeserializeOwned>(&self, def: RecordTable) -> Result<Vec<T>, DatabaseError> {
        let read_txn = self.begin_read()?;
        let table = read_txn.open_table(def)?;

        let mut records = Vec::new();
        for result in table.iter()? {
            let (_, value) = result?;
            records.push(rmp_serde::from_slice(value.value())?);
        }
        Ok(records)
    }

    fn remove_record(&self, def: RecordTable, id: &str) -> Result<bool, DatabaseError> {
        let write_txn = self.begin_write()?;
        let removed = {
            let mut table = write_txn.open_table(def)?;
            let removed = table.remove(id)?.is_some();
            removed
        };
        write_txn.commit()?;
        Ok(removed)
    }

    // ========================================================================
    // Event operations
    // ========================================================================

    /// Store an event and its slug index entry
    pub fn put_event(&self, event: &Event) -> Result<(), DatabaseError> {
        debug_assert!(!event.slug.is_empty(), "event slug must not be empty");

        let write_txn = self.begin_write()?;
        {
            let mut table = write_txn.open_table(EVENTS)?;
            let data = rmp_serde::to_vec_named(event)?;
            table.insert(event.id.as_str(), data.as_slice())?;

            let mut slug_table = write_txn.open_table(EVENT_SLUGS)?;
            slug_table.insert(event.slug.as_str(), event.id.as_str())?;
        }
        write_txn.commit()?;
        Ok(())
    }

    pub fn get_event(&self, id: &str) -> Result<Option<Event>, DatabaseError> {
        self.get_record(EVENTS, id)
    }

    /// Get an event by its slug (resolves slug -> uuid -> event)
    pub fn get_event_by_slug(&self, slug: &str) -> Result<Option<Event>, DatabaseError> {
        let read_txn = self.begin_read()?;
        let slug_table = read_txn.open_table(EVENT_SLUGS)?;

        let id = match slug_table.get(slug)? {
            Some(data) => data.value().to_string(),
            None => return Ok(None),
        };

        let events_table = read_txn.open_table(EVENTS)?;
        match events_table.get(id.as_str())? {
            Some(data) => Ok(Some(rmp_serde::from_slice(data.value())?)),
            None => Ok(None),
        }
    }

    pub fn list_events(&self) -> Result<Vec<Event>, DatabaseError> {
        self.list_records(EVENTS)
    }

    /// Update an event's mutable fields. No-op returning `false` if the id is unknown.
    #[allow(clippy::too_many_arguments)]
    pub fn update_event(
        &self,
        id: &str,
        title: Option<&str>,
        slug: Option<&str>,
        description: Option<&str>,
        starts_at: Option<DateTime<Utc>>,
        ends_at: Option<DateTime<Utc>>,
        location: Option<&str>,
        link: Option<Option<&str>>,
        image_url: Option<Option<&str>>,
    ) -> Result<bool, DatabaseError> {
        let write_txn = self.begin_write()?;

        let existing: Option<Event> = {
            let table = write_txn.open_table(EVENTS)?;
            let record = match table.get(id)? {
                Some(data) => Some(rmp_serde::from_slice(data.value())?),
                None => None,
            };
            record
        };

        let updated = match existing {
            Some(mut event) => {
                if let Some(t) = title {
                    event.title = t.to_string();
                }
                if let Some(d) = description {
                    event.description = d.to_string();
                }
                if let Some(s) = starts_at {
                    event.starts_at = s;
                }
                if let Some(e) = ends_at {
                    event.ends_at = e;
                }
                if let Some(l) = location {
                    event.location = l.to_string();
                }
                if let Some(l) = link {
                    event.link = l.map(|s| s.to_string());
                }
                if let Some(u) = image_url {
                    event.image_url = u.map(|s| s.to_string());
                }
                if let Some(new_slug) = slug {
                    let mut slug_table = write_txn.open_table(EVENT_SLUGS)?;
                    slug_table.remove(event.slug.as_str())?;
                    event.slug = new_slug.to_string();
                    slug_table.insert(new_slug, id)?;
                }

                event.updated_at = chrono::Utc::now();

                let serialized = rmp_serde::to_vec_named(&event)?;
                let mut table = write_txn.open_table(EVENTS)?;
                table.insert(id, serialized.as_slice())?;
                true
            }
            None => false,
        };

        write_txn.commit()?;
        Ok(updated)
    }

    /// Delete an event and clean up the slug index. No-op returning `false` if absent.
    pub fn delete_event(&self, id: &str) -> Result<bool, DatabaseError> {
        let write_txn = self.begin_write()?;

        let slug: Option<String> = {
            let table = write_txn.open_table(EVENTS)?;
            let record = match table.get(id)? {
                Some(data) => {
                    let event: Event = rmp_serde::from_slice(data.value())?;
                    Some(event.slug)
                }
                None => None,
            };
            record
        };

        let deleted = match slug {
            Some(slug) => {
                {
                    let mut table = write_txn.open_table(EVENTS)?;
                    table.remove(id)?;
                }
                {
                    let mut slug_table = write_txn.open_table(EVENT_SLUGS)?;
                    slug_table.remove(slug.as_str())?;
                }
                true
            }
            None => false,
        };

        write_txn.commit()?;
        Ok(deleted)
    }

    pub fn event_slug_exists(&self, slug: &str) -> Result<bool, DatabaseError> {
        let read_txn = self.begin_read()?;
        let table = read_txn.open_table(EVENT_SLUGS)?;
        Ok(table.get(slug)?.is_some())
    }

    // ========================================================================
    // Resource operations
    // ========================================================================

    pub fn put_resource(&self, resource: &Resource) -> Result<(), DatabaseError> {
        self.put_record(RESOURCES, &resource.id, resource)
    }

    pub fn get_resource(&self, id: &str) -> Result<Option<Resource>, DatabaseError> {
        self.get_record(RESOURCES, id)
    }

    /// List resources with an optional category filter
    pub fn list_resources(
        &self,
        category: Option<ResourceCategory>,
    ) -> Result<Vec<Resource>, DatabaseError> {
        let all: Vec<Resource> = self.list_records(RESOURCES)?;
        match category {
            Some(c) => Ok(all.into_iter().filter(|r| r.category == c).collect()),
            None => Ok(all),
        }
    }

    /// Update a resource's mutable fields. No-op returning `false` if the id is unknown.
    #[allow(clippy::too_many_arguments)]
    pub fn update_resource(
        &self,
        id: &str,
        title: Option<&str>,
        category: Option<ResourceCategory>,
        description: Option<&str>,
        url: Option<Option<&str>>,
        tags: Option<&[String]>,
        image_url: Option<Option<&str>>,
    ) -> Result<bool, DatabaseError> {
        let existing = self.get_resource(id)?;
        match existing {
            Some(mut resource) => {
                if let Some(t) = title {
                    resource.title = t.to_string();
                }
                if let Some(c) = category {
                    resource.category = c;
                }
                if let Some(d) = description {
                    resource.description = d.to_string();
                }
                if let Some(u) = url {
                    resource.url = u.map(|s| s.to_string());
                }
                if let Some(t) = tags {
                    resource.tags = t.to_vec();
                }
                if let Some(u) = image_url {
                    resource.image_url = u.map(|s| s.to_string());
                }
                resource.updated_at = chrono::Utc::now();
                self.put_resource(&resource)?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    pub fn delete_resource(&self, id: &str) -> Result<bool, DatabaseError> {
        self.remove_record(RESOURCES, id)
    }

    // ========================================================================
    // Gallery event operations
    // ========================================================================

    /// Store a gallery event and its slug index entry
    pub fn put_gallery_event(&self, gallery: &GalleryEvent) -> Result<(), DatabaseError> {
        debug_assert!(!gallery.slug.is_empty(), "gallery slug must not be empty");

        let write_txn = self.begin_write()?;
        {
            let mut table = write_txn.open_table(GALLERY_EVENTS)?;
            let data = rmp_serde::to_vec_named(gallery)?;
            table.insert(gallery.id.as_str(), data.as_slice())?;

            let mut slug_table = write_txn.open_table(GALLERY_SLUGS)?;
            slug_table.insert(gallery.slug.as_str(), gallery.id.as_str())?;
        }
        write_txn.commit()?;
        Ok(())
    }

    pub fn get_gallery_event(&self, id: &str) -> Result<Option<GalleryEvent>, DatabaseError> {
        self.get_record(GALLERY_EVENTS, id)
    }

    pub fn get_gallery_event_by_slug(
        &self,
        slug: &str,
    ) -> Result<Option<GalleryEvent>, DatabaseError> {
        let read_txn = self.begin_read()?;
        let slug_table = read_txn.open_table(GALLERY_SLUGS)?;

        let id = match slug_table.get(slug)? {
            Some(data) => data.value().to_string(),
            None => return Ok(None),
        };

        let table = read_txn.open_table(GALLERY_EVENTS)?;
        match table.get(id.as_str())? {
            Some(data) => Ok(Some(rmp_serde::from_slice(data.value())?)),
            None => Ok(None),
        }
    }

    pub fn list_gallery_events(&self) -> Result<Vec<GalleryEvent>, DatabaseError> {
        self.list_records(GALLERY_EVENTS)
    }

    /// Update a gallery event's mutable fields. No-op returning `false` if the id is unknown.
    pub fn update_gallery_event(
        &self,
        id: &str,
        title: Option<&str>,
        slug: Option<&str>,
        description: Option<&str>,
        cover_url: Option<Option<&str>>,
    ) -> Result<bool, DatabaseError> {
        let write_txn = self.begin_write()?;

        let existing: Option<GalleryEvent> = {
            let table = write_txn.open_table(GALLERY_EVENTS)?;
            let record = match table.get(id)? {
                Some(data) => Some(rmp_serde::from_slice(data.value())?),
                None => None,
            };
            record
        };

        let updated = match existing {
            Some(mut gallery) => {
                if let Some(t) = title {
                    gallery.title = t.to_string();
                }
                if let Some(d) = description {
                    gallery.description = d.to_string();
                }
                if let Some(c) = cover_url {
                    gallery.cover_url = c.map(|s| s.to_string());
                }
                if let Some(new_slug) = slug {
                    let mut slug_table = write_txn.open_table(GALLERY_SLUGS)?;
                    slug_table.remove(gallery.slug.as_str())?;
                    gallery.slug = new_slug.to_string();
                    slug_table.insert(new_slug, id)?;
                }

                gallery.updated_at = chrono::Utc::now();

                let serialized = rmp_serde::to_vec_named(&gallery)?;
                let mut table = write_txn.open_table(GALLERY_EVENTS)?;
                table.insert(id, serialized.as_slice())?;
                true
            }
            None => false,
        };

        write_txn.commit()?;
        Ok(updated)
    }

    /// Delete a gallery event together with all of its media rows.
    /// Returns the removed media rows so the caller can clean up blobs,
    /// or `None` if the gallery event is absent.
    pub fn delete_gallery_event(
        &self,
        id: &str,
    ) -> Result<Option<Vec<GalleryMedia>>, DatabaseError> {
        let Some(gallery) = self.get_gallery_event(id)? else {
            return Ok(None);
        };
        let media = self.media_for_gallery_event(id)?;

        let write_txn = self.begin_write()?;
        {
            let mut table = write_txn.open_table(GALLERY_EVENTS)?;
            table.remove(id)?;

            let mut slug_table = write_txn.open_table(GALLERY_SLUGS)?;
            slug_table.remove(gallery.slug.as_str())?;

            let mut media_table = write_txn.open_table(GALLERY_MEDIA)?;
            for entry in &media {
                media_table.remove(entry.id.as_str())?;
            }

            let mut parent_table = write_txn.open_table(GALLERY_EVENT_MEDIA)?;
            parent_table.remove(id)?;
        }
        write_txn.commit()?;
        Ok(Some(media))
    }

    pub fn gallery_slug_exists(&self, slug: &str) -> Result<bool, DatabaseError> {
        let read_txn = self.begin_read()?;
        let table = read_txn.open_table(GALLERY_SLUGS)?;
        Ok(table.get(slug)?.is_some())
    }

    // ========================================================================
    // Gallery media operations
    // ========================================================================

    /// Store a media entry and add it to the parent gallery event's index
    pub fn put_gallery_media(&self, media: &GalleryMedia) -> Result<(), DatabaseError> {
        debug_assert!(
            !media.gallery_event_id.is_empty(),
            "media parent must not be empty"
        );

        let write_txn = self.begin_write()?;
        {
            let mut table = write_txn.open_table(GALLERY_MEDIA)?;
            let data = rmp_serde::to_vec_named(media)?;
            table.insert(media.id.as_str(), data.as_slice())?;

            let mut parent_table = write_txn.open_table(GALLERY_EVENT_MEDIA)?;
            let mut media_ids: Vec<String> = parent_table
                .get(media.gallery_event_id.as_str())?
                .map(|v| rmp_serde::from_slice(v.value()).unwrap_or_default())
                .unwrap_or_default();

            if !media_ids.contains(&media.id) {
                media_ids.push(media.id.clone());
                let index_data = rmp_serde::to_vec_named(&media_ids)?;
                parent_table.insert(media.gallery_event_id.as_str(), index_data.as_slice())?;
            }
        }
        write_txn.commit()?;
        Ok(())
    }

    pub fn get_gallery_media(&self, id: &str) -> Result<Option<GalleryMedia>, DatabaseError> {
        self.get_record(GALLERY_MEDIA, id)
    }

    /// All media for a gallery event, ordered by `display_order`
    pub fn media_for_gallery_event(
        &self,
        gallery_event_id: &str,
    ) -> Result<Vec<GalleryMedia>, DatabaseError> {
        let read_txn = self.begin_read()?;
        let parent_table = read_txn.open_table(GALLERY_EVENT_MEDIA)?;
        let media_table = read_txn.open_table(GALLERY_MEDIA)?;

        let media_ids: Vec<String> = match parent_table.get(gallery_event_id)? {
            Some(data) => rmp_serde::from_slice(data.value())?,
            None => return Ok(Vec::new()),
        };

        let mut media = Vec::new();
        for media_id in media_ids {
            if let Some(data) = media_table.get(media_id.as_str())? {
                let entry: GalleryMedia = rmp_serde::from_slice(data.value())?;
                media.push(entry);
            }
        }
        media.sort_by_key(|m| m.display_order);

        Ok(media)
    }

    /// The next free display_order for a gallery event: one past the current
    /// max, or 0 for an empty collection.
    pub fn next_display_order(&self, gallery_event_id: &str) -> Result<u32, DatabaseError> {
        let media = self.media_for_gallery_event(gallery_event_id)?;
        Ok(media
            .iter()
            .map(|m| m.display_order + 1)
            .max()
            .unwrap_or(0))
    }

    /// Delete a media entry and remove it from the parent index.
    /// Returns the removed row so the caller can clean up the blob,
    /// or `None` if absent.
    pub fn delete_gallery_media(&self, id: &str) -> Result<Option<GalleryMedia>, DatabaseError> {
        let write_txn = self.begin_write()?;

        let existing: Option<GalleryMedia> = {
            let table = write_txn.open_table(GALLERY_MEDIA)?;
            let record = match table.get(id)? {
                Some(data) => Some(rmp_serde::from_slice(data.value())?),
                None => None,
            };
            record
        };

        let removed = match existing {
            Some(media) => {
                {
                    let mut table = write_txn.open_table(GALLERY_MEDIA)?;
                    table.remove(id)?;
                }

                let media_ids: Option<Vec<String>> = {
                    let parent_table = write_txn.open_table(GALLERY_EVENT_MEDIA)?;
                    let record = match parent_table.get(media.gallery_event_id.as_str())? {
                        Some(data) => Some(rmp_serde::from_slice(data.value())?),
                        None => None,
                    };
                    record
                };

                if let Some(mut ids) = media_ids {
                    ids.retain(|mid| mid != id);
                    let mut parent_table = write_txn.open_table(GALLERY_EVENT_MEDIA)?;
                    if ids.is_empty() {
                        parent_table.remove(media.gallery_event_id.as_str())?;
                    } else {
                        let data = rmp_serde::to_vec_named(&ids)?;
                        parent_table.insert(media.gallery_event_id.as_str(), data.as_slice())?;
                    }
                }

                Some(media)
            }
            None => None,
        };

        write_txn.commit()?;
        Ok(removed)
    }

    // ========================================================================
    // Council / quote / awareness operations
    // ========================================================================

    pub fn put_council_leader(&self, leader: &CouncilLeader) -> Result<(), DatabaseError> {
        self.put_record(COUNCIL_LEADERS, &leader.id, leader)
    }

    pub fn get_council_leader(&self, id: &str) -> Result<Option<CouncilLeader>, DatabaseError> {
        self.get_record(COUNCIL_LEADERS, id)
    }

    /// All council members, ordered for display
    pub fn list_council_leaders(&self) -> Result<Vec<CouncilLeader>, DatabaseError> {
        let mut leaders: Vec<CouncilLeader> = self.list_records(COUNCIL_LEADERS)?;
        leaders.sort_by_key(|l| l.display_order);
        Ok(leaders)
    }

    pub fn delete_council_leader(&self, id: &str) -> Result<bool, DatabaseError> {
        self.remove_record(COUNCIL_LEADERS, id)
    }

    pub fn put_quote(&self, quote: &Quote) -> Result<(), DatabaseError> {
        self.put_record(QUOTES, &quote.id, quote)
    }

    pub fn get_quote(&self, id: &str) -> Result<Option<Quote>, DatabaseError> {
        self.get_record(QUOTES, id)
    }

    pub fn list_quotes(&self) -> Result<Vec<Quote>, DatabaseError> {
        self.list_records(QUOTES)
    }

    pub fn delete_quote(&self, id: &str) -> Result<bool, DatabaseError> {
        self.remove_record(QUOTES, id)
    }

    pub fn put_awareness(&self, awareness: &MonthlyAwareness) -> Result<(), DatabaseError> {
        self.put_record(AWARENESS_MONTHS, &awareness.id, awareness)
    }

    pub fn get_awareness(&self, id: &str) -> Result<Option<MonthlyAwareness>, DatabaseError> {
        self.get_record(AWARENESS_MONTHS, id)
    }

    /// Awareness themes, newest first (year desc, month desc)
    pub fn list_awareness(&self) -> Result<Vec<MonthlyAwareness>, DatabaseError> {
        let mut months: Vec<MonthlyAwareness> = self.list_records(AWARENESS_MONTHS)?;
        months.sort_by(|a, b| (b.year, b.month).cmp(&(a.year, a.month)));
        Ok(months)
    }

    pub fn delete_awareness(&self, id: &str) -> Result<bool, DatabaseError> {
        self.remove_record(AWARENESS_MONTHS, id)
    }
}
