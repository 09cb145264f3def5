//! Fallback content for degraded mode.
//!
//! When a content table is empty (fresh deployment, or the admin has not
//! published anything yet) the public pages serve these defaults instead of
//! an error. The sets live in [`ListStore`]s so the read path is the same
//! shape as a synced working set.

use chrono::{Duration, Utc};

use crate::core::crud::ListStore;
use crate::storage::models::{CouncilLeader, Event, Quote, Resource, ResourceCategory};

/// Hardcoded default content, seeded once at startup.
pub struct FallbackContent {
    events: ListStore<Event>,
    resources: ListStore<Resource>,
    quotes: ListStore<Quote>,
    council: ListStore<CouncilLeader>,
}

impl Default for FallbackContent {
    fn default() -> Self {
        Self::seeded()
    }
}

impl FallbackContent {
    pub fn seeded() -> Self {
        Self {
            events: ListStore::with_items(default_events()),
            resources: ListStore::with_items(default_resources()),
            quotes: ListStore::with_items(default_quotes()),
            council: ListStore::with_items(default_council()),
        }
    }

    pub fn events(&self) -> &ListStore<Event> {
        &self.events
    }

    pub fn resources(&self) -> &ListStore<Resource> {
        &self.resources
    }

    pub fn quotes(&self) -> &ListStore<Quote> {
        &self.quotes
    }

    pub fn council(&self) -> &ListStore<CouncilLeader> {
        &self.council
    }
}

fn default_events() -> Vec<Event> {
    let now = Utc::now();
    vec![
        Event {
            id: "default-event-circle".to_string(),
            title: "Weekly Support Circle".to_string(),
            slug: "weekly-support-circle".to_string(),
            description: "An open, confidential space to talk about how the semester is \
                          actually going. No sign-up needed; drop in any week."
                .to_string(),
            starts_at: now + Duration::days(7),
            ends_at: now + Duration::days(7) + Duration::hours(2),
            location: "Student Union, Room 204".to_string(),
            link: None,
            image_url: None,
            created_at: now,
            updated_at: now,
        },
        Event {
            id: "default-event-destress".to_string(),
            title: "Exam De-stress Night".to_string(),
            slug: "exam-destress-night".to_string(),
            description: "Board games, therapy dogs, and free snacks the week before finals."
                .to_string(),
            starts_at: now + Duration::days(21),
            ends_at: now + Duration::days(21) + Duration::hours(3),
            location: "Main Library Lawn".to_string(),
            link: None,
            image_url: None,
            created_at: now,
            updated_at: now,
        },
    ]
}

fn default_resources() -> Vec<Resource> {
    let now = Utc::now();
    vec![
        Resource {
            id: "default-resource-crisis".to_string(),
            title: "24/7 Crisis Line".to_string(),
            category: ResourceCategory::Hotlines,
            description: "Call or text 988 to reach the Suicide & Crisis Lifeline. Free, \
                          confidential, always open."
                .to_string(),
            url: Some("https://988lifeline.org".to_string()),
            tags: vec!["crisis".to_string(), "urgent".to_string()],
            image_url: None,
            created_at: now,
            updated_at: now,
        },
        Resource {
            id: "default-resource-counseling".to_string(),
            title: "Campus Counseling Services".to_string(),
            category: ResourceCategory::Articles,
            description: "How to book a free session with a campus counselor, what to expect, \
                          and what to bring to the first appointment."
                .to_string(),
            url: None,
            tags: vec!["counseling".to_string()],
            image_url: None,
            created_at: now,
            updated_at: now,
        },
    ]
}

fn default_quotes() -> Vec<Quote> {
    let now = Utc::now();
    vec![
        Quote {
            id: "default-quote-asking".to_string(),
            text: "Asking for help is not a sign of weakness; it is a sign of knowing \
                   yourself."
                .to_string(),
            author: "Club motto".to_string(),
            created_at: now,
        },
        Quote {
            id: "default-quote-small-steps".to_string(),
            text: "Small steps still move you forward.".to_string(),
            author: "Anonymous".to_string(),
            created_at: now,
        },
    ]
}

fn default_council() -> Vec<CouncilLeader> {
    vec![CouncilLeader {
        id: "default-council-chair".to_string(),
        name: "Your Name Here".to_string(),
        role: "Club Chair".to_string(),
        photo_url: None,
        display_order: 0,
    }]
}
