//! Command-line argument parsing
//!
//! Every option can also be given through the `INPUT_*` environment
//! variables a CI action runner sets for its inputs.

use crate::cleanup::RetentionPolicy;
use crate::config::{
    CleanerConfig, Credentials, DEFAULT_REGISTRY_URL, RepositoryId, RunOptions,
    parse_registry_url, parse_string_list,
};
use crate::error::{CleanerError, Result};
use crate::registry::TokenStrategy;
use clap::builder::BoolishValueParser;
use clap::{ArgAction, Parser};
use std::num::NonZeroUsize;
use std::time::Duration;

#[derive(Parser, Debug, Clone)]
#[command(name = "hub-tag-cleaner")]
#[command(about = "Delete old image tags from Docker Hub repositories")]
#[command(version)]
pub struct Args {
    /// Registry account; also the namespace of bare repository names
    #[arg(long, short = 'u', env = "INPUT_USER")]
    pub user: Option<String>,

    /// Repositories to clean, as a JSON array (e.g. '["web", "other/api"]')
    #[arg(long, short = 'r', env = "INPUT_REPOS")]
    pub repos: String,

    /// Only delete old tags whose name contains one of these substrings (JSON array)
    #[arg(long, short = 's', env = "INPUT_SUBSTRINGS")]
    pub substrings: Option<String>,

    /// Number of newest tags to keep in every repository
    #[arg(long = "keep-last", short = 'k', env = "INPUT_KEEP-LAST")]
    pub keep_last: Option<String>,

    /// Allow keep-last below 1, deleting every matching tag
    #[arg(
        long = "force-full-cleanup",
        env = "INPUT_FORCE-FULL-CLEANUP",
        action = ArgAction::Set,
        num_args = 0..=1,
        default_value = "false",
        default_missing_value = "true",
        value_parser = BoolishValueParser::new()
    )]
    pub force_full_cleanup: bool,

    /// Account password or personal access token, exchanged for a session token
    #[arg(long, short = 'p', env = "INPUT_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,

    /// Personal access token. With --user it is the login secret when no
    /// password is given; without --user it is sent as a pre-issued bearer token
    #[arg(long, short = 't', env = "INPUT_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// Registry management API base URL
    #[arg(long = "registry-url", env = "INPUT_REGISTRY-URL", default_value = DEFAULT_REGISTRY_URL)]
    pub registry_url: String,

    /// Maximum number of requests in flight per fan-out (default: unbounded)
    #[arg(long = "max-concurrency", short = 'j', env = "INPUT_MAX-CONCURRENCY")]
    pub max_concurrency: Option<NonZeroUsize>,

    /// Log in again before every request instead of reusing one session token
    #[arg(long = "refresh-token-per-request")]
    pub refresh_token_per_request: bool,

    /// Report which tags would be deleted without deleting them
    #[arg(
        long = "dry-run",
        short = 'n',
        env = "INPUT_DRY-RUN",
        action = ArgAction::Set,
        num_args = 0..=1,
        default_value = "false",
        default_missing_value = "true",
        value_parser = BoolishValueParser::new()
    )]
    pub dry_run: bool,

    /// Timeout for each registry request in seconds
    #[arg(long = "timeout")]
    pub timeout: Option<u64>,

    /// Verbose output
    #[arg(long, short = 'v')]
    pub verbose: bool,
}

impl Args {
    pub fn try_parse_args() -> std::result::Result<Self, clap::Error> {
        Args::try_parse()
    }

    fn retention_policy(&self) -> Result<RetentionPolicy> {
        let keep_last = self.keep_last.as_deref().ok_or_else(|| {
            CleanerError::Config("Please be sure to set input \"keep-last\" as a number".to_string())
        })?;

        let substrings = match self.substrings.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(raw) => Some(parse_string_list("substrings", raw)?).filter(|s| !s.is_empty()),
        };

        RetentionPolicy::from_inputs(keep_last, substrings, self.force_full_cleanup)
    }

    fn repositories(&self) -> Result<Vec<RepositoryId>> {
        let namespace = self.user.as_deref().unwrap_or_default();
        parse_string_list("repos", &self.repos)?
            .iter()
            .map(|entry| RepositoryId::parse(entry, namespace))
            .collect()
    }

    fn run_options(&self) -> Result<RunOptions> {
        if self.timeout == Some(0) {
            return Err(CleanerError::Config(
                "Timeout must be greater than 0".to_string(),
            ));
        }

        let mut options = RunOptions::new(parse_registry_url(&self.registry_url)?);
        options.max_concurrency = self.max_concurrency;
        options.token_strategy = if self.refresh_token_per_request {
            TokenStrategy::PerRequest
        } else {
            TokenStrategy::Cached
        };
        options.request_timeout = self.timeout.map(Duration::from_secs);
        options.dry_run = self.dry_run;
        Ok(options)
    }

    /// Validate every input and freeze it into the run configuration.
    /// Nothing here touches the network.
    pub fn into_config(self) -> Result<CleanerConfig> {
        let policy = self.retention_policy()?;
        let repositories = self.repositories()?;
        let credentials = Credentials::from_inputs(
            self.user.as_deref(),
            self.password.as_deref(),
            self.token.as_deref(),
        )?;
        let options = self.run_options()?;

        CleanerConfig::new(credentials, repositories, policy, options)
    }
}
