//! Top-level runner: configuration in, overall success or failure out

use crate::cleanup::{BatchRunner, BatchSummary, RepositoryCleaner};
use crate::common::Timer;
use crate::config::CleanerConfig;
use crate::error::Result;
use crate::logging::Logger;
use crate::registry::RegistryClient;
use std::sync::Arc;

pub struct Runner {
    config: CleanerConfig,
    output: Logger,
}

impl Runner {
    pub fn new(config: CleanerConfig, output: Logger) -> Self {
        Self { config, output }
    }

    pub async fn run(&self) -> Result<BatchSummary> {
        let timer = Timer::start("Registry cleanup");

        self.output.section("Hub Tag Cleaner");
        self.log_inputs();

        let client = self.create_registry_client().await?;

        let cleaner = RepositoryCleaner::new(
            Arc::new(client),
            self.config.policy.clone(),
            self.output.clone(),
        )
        .with_max_concurrency(self.config.options.max_concurrency)
        .with_dry_run(self.config.options.dry_run);

        self.output.section("Cleaning repositories");
        let summary = BatchRunner::new(cleaner, self.output.clone())
            .run(&self.config.repositories)
            .await;

        self.log_summary(&summary);
        timer.log_elapsed(&self.output);

        summary.into_result()
    }

    fn log_inputs(&self) {
        let policy = &self.config.policy;
        let repositories = self
            .config
            .repositories
            .iter()
            .map(|r| r.to_string())
            .collect::<Vec<_>>();

        self.output.summary("Repositories", &repositories);
        self.output.info(&format!("keep-last {}", policy.keep_count()));
        match policy.substrings() {
            Some(filters) => self.output.info(&format!("substrings {:?}", filters)),
            None => self.output.info("substrings (none, all old tags are eligible)"),
        }
        if policy.force_full_cleanup() {
            self.output.warning("force-full-cleanup is enabled");
        }
        if self.config.options.dry_run {
            self.output.info("Dry run mode - no tags will be deleted");
        }
        self.output
            .detail(&format!("Registry: {}", self.config.options.registry_url));
    }

    async fn create_registry_client(&self) -> Result<RegistryClient> {
        self.output.section("Setting up registry client");

        let options = &self.config.options;
        let client = RegistryClient::builder(options.registry_url.clone())
            .with_credentials(self.config.credentials.clone())
            .with_token_strategy(options.token_strategy)
            .with_timeout(options.request_timeout)
            .with_logger(self.output.clone())
            .build()?;

        client.authenticate().await?;
        Ok(client)
    }

    fn log_summary(&self, summary: &BatchSummary) {
        let mut lines = summary
            .reports
            .iter()
            .map(|report| {
                let verb = if report.dry_run { "would delete" } else { "deleted" };
                let count = if report.dry_run {
                    report.eligible.len()
                } else {
                    report.deleted.len()
                };
                format!(
                    "{}: {} tags, {} {}, kept {}, {} failed",
                    report.repository,
                    report.total_tags,
                    verb,
                    count,
                    report.kept(),
                    report.failures.len()
                )
            })
            .collect::<Vec<_>>();
        lines.extend(
            summary
                .failures
                .iter()
                .filter(|f| summary.report_for(&f.repository).is_none())
                .map(|f| format!("{}: aborted ({})", f.repository, f.error)),
        );

        self.output.summary("Cleanup summary", &lines);
    }
}
