//! Tag metadata as returned by the registry management API

use chrono::{DateTime, Utc};
use serde::Deserialize;

/// One tag of a repository. Only the fields retention needs are decoded.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Tag {
    pub name: String,
    /// Missing or null timestamps sort as the oldest tags
    #[serde(default)]
    pub last_updated: Option<DateTime<Utc>>,
}

impl Tag {
    pub fn new(name: impl Into<String>, last_updated: Option<DateTime<Utc>>) -> Self {
        Self {
            name: name.into(),
            last_updated,
        }
    }
}

/// Opaque position of the next listing page (the registry's `next` URL)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageCursor(pub String);

/// One decoded page of a tag listing
#[derive(Debug, Clone, Default)]
pub struct TagPage {
    pub tags: Vec<Tag>,
    pub next: Option<PageCursor>,
}

/// Raw listing body: `{"count": .., "next": .., "results": [..]}`
#[derive(Debug, Deserialize)]
pub(crate) struct TagListResponse {
    #[serde(default)]
    pub results: Vec<Tag>,
    #[serde(default)]
    pub next: Option<String>,
}

impl From<TagListResponse> for TagPage {
    fn from(response: TagListResponse) -> Self {
        TagPage {
            tags: response.results,
            next: response
                .next
                .filter(|next| !next.is_empty())
                .map(PageCursor),
        }
    }
}

/// Sort newest first. Stable, so equal timestamps keep registry order.
pub fn sort_newest_first(tags: &mut [Tag]) {
    tags.sort_by(|a, b| b.last_updated.cmp(&a.last_updated));
}
