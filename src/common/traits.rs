//! Common traits and interfaces
//!
//! The cleanup pipeline only talks to the registry through [`TagRegistry`],
//! so it can run against the HTTP client or an in-memory fake.

use crate::config::RepositoryId;
use crate::error::Result;
use crate::registry::{PageCursor, TagPage};
use async_trait::async_trait;

/// Tag listing and deletion for one registry
#[async_trait]
pub trait TagRegistry: Send + Sync {
    /// Fetch one page of tag metadata. `None` requests the first page.
    async fn list_tags_page(
        &self,
        repository: &RepositoryId,
        cursor: Option<&PageCursor>,
    ) -> Result<TagPage>;

    /// Permanently delete one tag
    async fn delete_tag(&self, repository: &RepositoryId, tag: &str) -> Result<()>;
}
