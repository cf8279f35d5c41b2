//! Configuration management module
//!
//! All run inputs are validated once and frozen into a [`CleanerConfig`]
//! that is passed explicitly into the runner and its components.

use crate::cleanup::RetentionPolicy;
use crate::common::ValidationUtils;
use crate::error::{CleanerError, Result};
use crate::registry::TokenStrategy;
use std::fmt;
use std::num::NonZeroUsize;
use std::time::Duration;
use url::Url;

pub const DEFAULT_REGISTRY_URL: &str = "https://hub.docker.com/v2";

/// Registry credentials, exactly one mode per run
#[derive(Clone)]
pub enum Credentials {
    /// Username plus password or personal access token, exchanged for a session token
    Login { username: String, password: String },
    /// Pre-issued bearer token, used as-is
    Bearer(String),
}

impl Credentials {
    /// Pick the authentication mode. With a username, the password (or the
    /// token when no password is given) is exchanged at login. Without a
    /// username the token is sent as a pre-issued bearer token.
    pub fn from_inputs(
        username: Option<&str>,
        password: Option<&str>,
        token: Option<&str>,
    ) -> Result<Self> {
        let non_empty = |v: Option<&str>| v.filter(|s| !s.is_empty()).map(str::to_string);

        match (non_empty(username), non_empty(password), non_empty(token)) {
            (Some(username), Some(password), _) | (Some(username), None, Some(password)) => {
                Ok(Credentials::Login { username, password })
            }
            (None, _, Some(token)) => Ok(Credentials::Bearer(token)),
            (None, Some(_), None) => Err(CleanerError::Config(
                "Username is required when password is provided".to_string(),
            )),
            _ => Err(CleanerError::Config(
                "No credentials provided: set user with a password or token, or a token alone".to_string(),
            )),
        }
    }

    pub fn mode(&self) -> &'static str {
        match self {
            Credentials::Login { .. } => "username/password",
            Credentials::Bearer(_) => "pre-issued token",
        }
    }
}

// Secrets must never reach the logs
impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Credentials::Login { username, .. } => f
                .debug_struct("Login")
                .field("username", username)
                .field("password", &"<redacted>")
                .finish(),
            Credentials::Bearer(_) => f.debug_tuple("Bearer").field(&"<redacted>").finish(),
        }
    }
}

/// A repository on the registry, addressed by namespace and name
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RepositoryId {
    pub namespace: String,
    pub name: String,
}

impl RepositoryId {
    pub fn new(namespace: impl Into<String>, name: impl Into<String>) -> Result<Self> {
        let namespace = namespace.into();
        let name = name.into();
        ValidationUtils::validate_name_segment("Namespace", &namespace)?;
        ValidationUtils::validate_name_segment("Repository", &name)?;
        Ok(Self { namespace, name })
    }

    /// Parse a configured repository entry. A bare name lives under the
    /// default namespace; `namespace/name` overrides it.
    pub fn parse(entry: &str, default_namespace: &str) -> Result<Self> {
        let entry = entry.trim();
        match entry.split_once('/') {
            Some((namespace, name)) => Self::new(namespace, name),
            None => Self::new(default_namespace, entry),
        }
    }
}

impl fmt::Display for RepositoryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.namespace, self.name)
    }
}

/// Execution knobs that do not change retention semantics
#[derive(Debug, Clone)]
pub struct RunOptions {
    pub registry_url: Url,
    /// Cap on in-flight requests per fan-out; `None` launches everything at once
    pub max_concurrency: Option<NonZeroUsize>,
    pub token_strategy: TokenStrategy,
    pub request_timeout: Option<Duration>,
    pub dry_run: bool,
}

impl RunOptions {
    pub fn new(registry_url: Url) -> Self {
        Self {
            registry_url,
            max_concurrency: None,
            token_strategy: TokenStrategy::default(),
            request_timeout: None,
            dry_run: false,
        }
    }
}

/// Immutable configuration for one cleanup run
#[derive(Debug, Clone)]
pub struct CleanerConfig {
    pub credentials: Credentials,
    pub repositories: Vec<RepositoryId>,
    pub policy: RetentionPolicy,
    pub options: RunOptions,
}

impl CleanerConfig {
    pub fn new(
        credentials: Credentials,
        repositories: Vec<RepositoryId>,
        policy: RetentionPolicy,
        options: RunOptions,
    ) -> Result<Self> {
        if repositories.is_empty() {
            return Err(CleanerError::Config(
                "At least one repository must be configured".to_string(),
            ));
        }

        Ok(Self {
            credentials,
            repositories,
            policy,
            options,
        })
    }
}

/// Parse a JSON array of strings, as used by the `repos` and `substrings` inputs
pub fn parse_string_list(input_name: &str, raw: &str) -> Result<Vec<String>> {
    serde_json::from_str::<Vec<String>>(raw).map_err(|e| {
        CleanerError::Config(format!(
            "Input \"{}\" must be a JSON array of strings: {}",
            input_name, e
        ))
    })
}

/// Parse a registry base URL
pub fn parse_registry_url(raw: &str) -> Result<Url> {
    let url = Url::parse(raw.trim_end_matches('/'))?;
    if url.cannot_be_a_base() {
        return Err(CleanerError::Config(format!(
            "Registry URL '{}' cannot be used as a base URL",
            raw
        )));
    }
    Ok(url)
}
