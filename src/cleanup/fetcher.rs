//! Paginated tag retrieval

use crate::common::TagRegistry;
use crate::config::RepositoryId;
use crate::error::{CleanerError, Result};
use crate::logging::Logger;
use crate::registry::{PageCursor, Tag, sort_newest_first};
use std::collections::HashSet;

/// Follow the listing cursor until the last page and return every tag of
/// the repository sorted newest first.
///
/// The sort is applied regardless of how the registry ordered the pages.
pub async fn fetch_all_tags<R>(
    registry: &R,
    repository: &RepositoryId,
    output: &Logger,
) -> Result<Vec<Tag>>
where
    R: TagRegistry + ?Sized,
{
    let mut tags = Vec::new();
    let mut cursor: Option<PageCursor> = None;
    let mut seen = HashSet::new();
    let mut pages = 0usize;

    loop {
        let page = registry.list_tags_page(repository, cursor.as_ref()).await?;
        pages += 1;
        tags.extend(page.tags);

        match page.next {
            Some(next) => {
                if !seen.insert(next.0.clone()) {
                    return Err(CleanerError::Fetch {
                        repository: repository.to_string(),
                        message: format!("Registry returned the page cursor '{}' twice", next.0),
                    });
                }
                cursor = Some(next);
            }
            None => break,
        }
    }

    sort_newest_first(&mut tags);
    output.detail(&format!(
        "Fetched {} tags for {} in {} page(s)",
        tags.len(),
        repository,
        pages
    ));

    Ok(tags)
}
