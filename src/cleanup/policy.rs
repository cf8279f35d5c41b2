//! Retention policy evaluation
//!
//! A tag's fate depends only on its rank in the newest-first ordering of
//! its repository and on its name.

use crate::error::{CleanerError, Result};
use crate::registry::Tag;

/// Decide whether the tag at `rank` (0 = newest) may be deleted.
///
/// The `keep_count` newest tags are always retained. Past that, a tag is
/// eligible when no name filter is configured, or when its name contains at
/// least one non-empty filter entry. Empty entries never match.
pub fn is_eligible_for_deletion(
    rank: usize,
    keep_count: usize,
    tag_name: &str,
    substrings: Option<&[String]>,
) -> bool {
    if rank < keep_count {
        return false;
    }

    match substrings {
        None => true,
        Some(filters) => filters
            .iter()
            .any(|filter| !filter.is_empty() && tag_name.contains(filter.as_str())),
    }
}

/// Immutable retention configuration for one run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetentionPolicy {
    keep_count: usize,
    substrings: Option<Vec<String>>,
    force_full_cleanup: bool,
    ignored_empty_filters: usize,
}

impl RetentionPolicy {
    /// Build a policy, refusing `keep_count < 1` unless full cleanup is forced.
    ///
    /// Empty filter entries are dropped with one warning each. A filter list
    /// made only of empty entries still counts as configured and matches nothing.
    pub fn new(
        keep_count: usize,
        substrings: Option<Vec<String>>,
        force_full_cleanup: bool,
    ) -> Result<Self> {
        if keep_count < 1 && !force_full_cleanup {
            return Err(CleanerError::Config(
                "To delete all tags set \"force-full-cleanup\" to true".to_string(),
            ));
        }

        let mut ignored_empty_filters = 0;
        let substrings = substrings.map(|filters| {
            filters
                .into_iter()
                .filter(|filter| {
                    if filter.is_empty() {
                        ignored_empty_filters += 1;
                        tracing::warn!(
                            "🟡 Ignoring empty substring filter: it would match every tag. \
                             Omit the substrings option to delete all old tags"
                        );
                        false
                    } else {
                        true
                    }
                })
                .collect::<Vec<_>>()
        });

        Ok(Self {
            keep_count,
            substrings,
            force_full_cleanup,
            ignored_empty_filters,
        })
    }

    /// Build a policy from the textual `keep-last` input.
    /// Negative counts are treated as zero.
    pub fn from_inputs(
        keep_last: &str,
        substrings: Option<Vec<String>>,
        force_full_cleanup: bool,
    ) -> Result<Self> {
        let keep_count = keep_last.trim().parse::<i64>().map_err(|_| {
            CleanerError::Config(format!(
                "Please be sure to set input \"keep-last\" as a number (got '{}')",
                keep_last
            ))
        })?;
        let keep_count = usize::try_from(keep_count.max(0)).unwrap_or(usize::MAX);

        Self::new(keep_count, substrings, force_full_cleanup)
    }

    pub fn keep_count(&self) -> usize {
        self.keep_count
    }

    pub fn substrings(&self) -> Option<&[String]> {
        self.substrings.as_deref()
    }

    pub fn force_full_cleanup(&self) -> bool {
        self.force_full_cleanup
    }

    /// Number of empty filter entries dropped when the policy was built
    pub fn ignored_empty_filters(&self) -> usize {
        self.ignored_empty_filters
    }

    pub fn is_eligible(&self, rank: usize, tag_name: &str) -> bool {
        is_eligible_for_deletion(rank, self.keep_count, tag_name, self.substrings())
    }

    /// Names of deletable tags, given tags already sorted newest first
    pub fn select_for_deletion(&self, tags: &[Tag]) -> Vec<String> {
        tags.iter()
            .enumerate()
            .filter(|(rank, tag)| self.is_eligible(*rank, &tag.name))
            .map(|(_, tag)| tag.name.clone())
            .collect()
    }
}
