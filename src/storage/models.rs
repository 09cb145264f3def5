use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::core::crud::Keyed;

/// Media classification derived from a MIME type prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Image,
    Video,
}

impl MediaKind {
    /// Classify a MIME type string, or `None` for anything that is not media.
    pub fn from_mime(mime_type: &str) -> Option<Self> {
        let primary = mime_type.split('/').next().unwrap_or("");
        match primary {
            "image" => Some(MediaKind::Image),
            "video" => Some(MediaKind::Video),
            _ => None,
        }
    }
}

/// A raw uploaded blob. The object store is keyed by `id`; `path` is the
/// public serving path under `/static/`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Asset {
    pub id: String,
    pub path: String,
    pub mime_type: String,
    pub byte_size: u64,
    pub created_at: DateTime<Utc>,
}

/// A club event (workshops, meetups, awareness drives).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    pub id: String,
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
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Category of a peer-support resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceCategory {
    Articles,
    Hotlines,
    Apps,
    Videos,
    Podcasts,
    Books,
}

impl ResourceCategory {
    /// Parse the lowercase wire name, e.g. from a query parameter.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "articles" => Some(ResourceCategory::Articles),
            "hotlines" => Some(ResourceCategory::Hotlines),
            "apps" => Some(ResourceCategory::Apps),
            "videos" => Some(ResourceCategory::Videos),
            "podcasts" => Some(ResourceCategory::Podcasts),
            "books" => Some(ResourceCategory::Books),
            _ => None,
        }
    }
}

/// A mental-health resource listed on the resources page.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Resource {
    pub id: String,
    pub title: String,
    pub category: ResourceCategory,
    pub description: String,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub image_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A photo-gallery collection, one per past event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GalleryEvent {
    pub id: String,
    pub title: String,
    pub slug: String,
    pub description: String,
    #[serde(default)]
    pub cover_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// One media entry inside a gallery collection. `display_order` is strictly
/// increasing within the parent gallery event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GalleryMedia {
    pub id: String,
    pub gallery_event_id: String,
    pub asset_id: String,
    pub media_url: String,
    #[serde(default)]
    pub caption: Option<String>,
    pub display_order: u32,
    pub kind: MediaKind,
    pub created_at: DateTime<Utc>,
}

/// A student council member shown on the about page.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CouncilLeader {
    pub id: String,
    pub name: String,
    pub role: String,
    #[serde(default)]
    pub photo_url: Option<String>,
    pub display_order: u32,
}

/// A rotating supportive quote for the landing page.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Quote {
    pub id: String,
    pub text: String,
    pub author: String,
    pub created_at: DateTime<Utc>,
}

/// Monthly awareness theme (e.g. "September - Suicide Prevention Month").
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonthlyAwareness {
    pub id: String,
    pub month: u8,
    pub year: i32,
    pub theme: String,
    pub description: String,
    #[serde(default)]
    pub link: Option<String>,
}

impl Keyed for Event {
    fn key(&self) -> &str {
        &self.id
    }
}

impl Keyed for Resource {
    fn key(&self) -> &str {
        &self.id
    }
}

impl Keyed for GalleryEvent {
    fn key(&self) -> &str {
        &self.id
    }
}

impl Keyed for GalleryMedia {
    fn key(&self) -> &str {
        &self.id
    }
}

impl Keyed for CouncilLeader {
    fn key(&self) -> &str {
        &self.id
    }
}

impl Keyed for Quote {
    fn key(&self) -> &str {
        &self.id
    }
}

impl Keyed for MonthlyAwareness {
    fn key(&self) -> &str {
        &self.id
    }
}
