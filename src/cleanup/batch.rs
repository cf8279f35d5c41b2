//! Batch runner: every configured repository, one overall outcome

use crate::cleanup::fan_out;
use crate::cleanup::repository::{CleanupReport, RepositoryCleaner};
use crate::common::TagRegistry;
use crate::config::RepositoryId;
use crate::error::{CleanerError, Result};
use crate::logging::Logger;

/// A repository whose cleanup failed, with the triggering error
#[derive(Debug)]
pub struct RepositoryFailure {
    pub repository: RepositoryId,
    pub error: CleanerError,
}

/// Aggregated outcome of a batch run
#[derive(Debug, Default)]
pub struct BatchSummary {
    pub total_repositories: usize,
    /// Reports of every repository whose tag list could be fetched
    pub reports: Vec<CleanupReport>,
    pub failures: Vec<RepositoryFailure>,
}

impl BatchSummary {
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }

    pub fn total_deleted(&self) -> usize {
        self.reports.iter().map(|r| r.deleted.len()).sum()
    }

    pub fn report_for(&self, repository: &RepositoryId) -> Option<&CleanupReport> {
        self.reports.iter().find(|r| &r.repository == repository)
    }

    /// Overall pass/fail, keeping every failure message
    pub fn into_result(self) -> Result<Self> {
        if self.is_success() {
            return Ok(self);
        }

        let details = self
            .failures
            .iter()
            .map(|f| f.error.to_string())
            .collect::<Vec<_>>()
            .join("; ");
        Err(CleanerError::BatchFailed {
            total: self.total_repositories,
            failed: self.failures.len(),
            details,
        })
    }
}

pub struct BatchRunner<R: ?Sized> {
    cleaner: RepositoryCleaner<R>,
    output: Logger,
}

impl<R> BatchRunner<R>
where
    R: TagRegistry + ?Sized,
{
    pub fn new(cleaner: RepositoryCleaner<R>, output: Logger) -> Self {
        Self { cleaner, output }
    }

    /// Clean all repositories concurrently. Repositories are independent:
    /// a failure in one neither stops nor undoes the others.
    pub async fn run(&self, repositories: &[RepositoryId]) -> BatchSummary {
        let runs = repositories
            .iter()
            .map(|repository| self.cleaner.cleanup_repository(repository))
            .collect::<Vec<_>>();
        let outcomes = fan_out(runs, self.cleaner.max_concurrency()).await;

        let mut summary = BatchSummary {
            total_repositories: repositories.len(),
            ..BatchSummary::default()
        };

        for (repository, outcome) in repositories.iter().zip(outcomes) {
            match outcome {
                Ok(report) => {
                    if let Some(error) = report.failure() {
                        summary.failures.push(RepositoryFailure {
                            repository: repository.clone(),
                            error,
                        });
                    }
                    summary.reports.push(report);
                }
                Err(error) => {
                    self.output
                        .error(&format!("{}: cleanup aborted: {}", repository, error));
                    summary.failures.push(RepositoryFailure {
                        repository: repository.clone(),
                        error,
                    });
                }
            }
        }

        summary
    }
}
