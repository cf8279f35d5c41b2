//! Registry module for the registry management API
//!
//! This module provides login, bearer token management and the HTTP client
//! used to list and delete repository tags.

pub mod auth;
pub mod client;
pub mod tags;
pub mod token_manager;

pub use auth::Auth;
pub use client::{PAGE_SIZE, RegistryClient, RegistryClientBuilder};
pub use tags::{PageCursor, Tag, TagPage, sort_newest_first};
pub use token_manager::{TokenManager, TokenStrategy};

use crate::error::{CleanerError, Result};
use url::Url;

/// Append path segments to the registry base URL
pub(crate) fn endpoint(base: &Url, segments: &[&str]) -> Result<Url> {
    let mut url = base.clone();
    url.path_segments_mut()
        .map_err(|_| CleanerError::Config(format!("Registry URL '{}' cannot be a base", base)))?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}
