//! Hub Tag Cleaner Library
//!
//! Deletes old image tags from Docker Hub repositories. Each configured
//! repository's tags are listed page by page, ranked newest first, filtered
//! through a [`RetentionPolicy`] and the eligible ones deleted concurrently.

pub mod cleanup;
pub mod cli;
pub mod common;
pub mod config;
pub mod error;
pub mod logging;
pub mod output;
pub mod registry;

pub use cleanup::{BatchRunner, BatchSummary, CleanupReport, RepositoryCleaner, RetentionPolicy};
pub use config::{CleanerConfig, Credentials, RepositoryId, RunOptions};
pub use error::{CleanerError, Result};
pub use logging::Logger;
pub use registry::{RegistryClient, TokenStrategy};
