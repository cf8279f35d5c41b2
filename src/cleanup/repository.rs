//! Per-repository cleanup: fetch, select, delete

use crate::cleanup::fan_out;
use crate::cleanup::fetcher::fetch_all_tags;
use crate::cleanup::policy::RetentionPolicy;
use crate::common::{FormatUtils, TagRegistry};
use crate::config::RepositoryId;
use crate::error::{CleanerError, Result};
use crate::logging::Logger;
use std::num::NonZeroUsize;
use std::sync::Arc;

/// A tag whose deletion request failed
#[derive(Debug)]
pub struct DeleteFailure {
    pub tag: String,
    pub error: CleanerError,
}

/// Outcome of cleaning one repository
#[derive(Debug)]
pub struct CleanupReport {
    pub repository: RepositoryId,
    pub total_tags: usize,
    /// Tags selected by the retention policy, newest first
    pub eligible: Vec<String>,
    /// Tags actually removed; stays populated even when siblings failed
    pub deleted: Vec<String>,
    pub failures: Vec<DeleteFailure>,
    pub dry_run: bool,
}

impl CleanupReport {
    pub fn kept(&self) -> usize {
        self.total_tags - self.eligible.len()
    }

    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }

    /// Repository-level error describing the failed deletions, if any
    pub fn failure(&self) -> Option<CleanerError> {
        if self.is_success() {
            return None;
        }

        let details = self
            .failures
            .iter()
            .map(|f| f.error.to_string())
            .collect::<Vec<_>>()
            .join("; ");
        Some(CleanerError::RepositoryFailed {
            repository: self.repository.to_string(),
            attempted: self.eligible.len(),
            failed: self.failures.len(),
            details,
        })
    }

    /// Turn a report with failed deletions into a repository-level error
    pub fn into_result(self) -> Result<Self> {
        match self.failure() {
            Some(error) => Err(error),
            None => Ok(self),
        }
    }
}

/// Applies one retention policy to repositories of one registry
pub struct RepositoryCleaner<R: ?Sized> {
    registry: Arc<R>,
    policy: RetentionPolicy,
    max_concurrency: Option<NonZeroUsize>,
    dry_run: bool,
    output: Logger,
}

impl<R> RepositoryCleaner<R>
where
    R: TagRegistry + ?Sized,
{
    pub fn new(registry: Arc<R>, policy: RetentionPolicy, output: Logger) -> Self {
        Self {
            registry,
            policy,
            max_concurrency: None,
            dry_run: false,
            output,
        }
    }

    pub fn with_max_concurrency(mut self, max_concurrency: Option<NonZeroUsize>) -> Self {
        self.max_concurrency = max_concurrency;
        self
    }

    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub fn max_concurrency(&self) -> Option<NonZeroUsize> {
        self.max_concurrency
    }

    /// Clean one repository.
    ///
    /// A listing failure is returned as `Err` before anything is deleted.
    /// Deletion failures are collected in the report; use
    /// [`CleanupReport::into_result`] to treat them as a failure.
    pub async fn cleanup_repository(&self, repository: &RepositoryId) -> Result<CleanupReport> {
        let tags = fetch_all_tags(self.registry.as_ref(), repository, &self.output).await?;
        let eligible = self.policy.select_for_deletion(&tags);

        let mut report = CleanupReport {
            repository: repository.clone(),
            total_tags: tags.len(),
            eligible,
            deleted: Vec::new(),
            failures: Vec::new(),
            dry_run: self.dry_run,
        };

        if report.eligible.is_empty() {
            self.output.info(&format!(
                "{}: nothing to delete ({} tags, keeping {})",
                repository,
                report.total_tags,
                self.policy.keep_count()
            ));
            return Ok(report);
        }

        if self.dry_run {
            self.output.info(&format!(
                "{}: dry run, would delete {} of {} tags: {}",
                repository,
                report.eligible.len(),
                report.total_tags,
                FormatUtils::format_tag_list(&report.eligible)
            ));
            return Ok(report);
        }

        self.output.warning(&format!(
            "{}: about to delete {} tags: {}",
            repository,
            report.eligible.len(),
            FormatUtils::format_tag_list(&report.eligible)
        ));

        let deletions = report
            .eligible
            .iter()
            .map(|tag| self.delete_one(repository, tag))
            .collect::<Vec<_>>();
        let outcomes = fan_out(deletions, self.max_concurrency).await;

        for (tag, outcome) in report.eligible.iter().zip(outcomes) {
            match outcome {
                Ok(()) => report.deleted.push(tag.clone()),
                Err(error) => report.failures.push(DeleteFailure {
                    tag: tag.clone(),
                    error,
                }),
            }
        }

        if report.is_success() {
            self.output.success(&format!(
                "{}: deleted {} tags, kept {}",
                repository,
                report.deleted.len(),
                report.kept()
            ));
        } else {
            self.output.error(&format!(
                "{}: {} of {} deletions failed",
                repository,
                report.failures.len(),
                report.eligible.len()
            ));
        }

        Ok(report)
    }

    async fn delete_one(&self, repository: &RepositoryId, tag: &str) -> Result<()> {
        self.output
            .detail(&format!("🟡 deleting {} tag from {}", tag, repository));
        match self.registry.delete_tag(repository, tag).await {
            Ok(()) => {
                self.output
                    .success(&format!("successfully deleted {} from {}", tag, repository));
                Ok(())
            }
            Err(error) => {
                self.output.error(&error.to_string());
                Err(error)
            }
        }
    }
}
