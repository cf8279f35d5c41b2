// This file contains the implementation of the RegistryClient struct,
// which handles authenticated communication with the registry management
// API: paginated tag listing and tag deletion.

use crate::common::TagRegistry;
use crate::config::{Credentials, RepositoryId};
use crate::error::handlers::{HttpErrorHandler, NetworkErrorHandler};
use crate::error::{CleanerError, Result};
use crate::logging::Logger;
use crate::registry::auth::Auth;
use crate::registry::tags::{PageCursor, TagListResponse, TagPage};
use crate::registry::token_manager::{TokenManager, TokenStrategy};
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use url::Url;

/// Tags requested per listing page
pub const PAGE_SIZE: usize = 100;

pub struct RegistryClientBuilder {
    registry_url: Url,
    credentials: Option<Credentials>,
    token_strategy: TokenStrategy,
    timeout: Option<Duration>,
    output: Logger,
}

impl RegistryClientBuilder {
    pub fn new(registry_url: Url) -> Self {
        Self {
            registry_url,
            credentials: None,
            token_strategy: TokenStrategy::default(),
            timeout: None,
            output: Logger::default(),
        }
    }

    pub fn with_credentials(mut self, credentials: Credentials) -> Self {
        self.credentials = Some(credentials);
        self
    }

    pub fn with_token_strategy(mut self, strategy: TokenStrategy) -> Self {
        self.token_strategy = strategy;
        self
    }

    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_logger(mut self, output: Logger) -> Self {
        self.output = output;
        self
    }

    pub fn build(self) -> Result<RegistryClient> {
        let credentials = self.credentials.ok_or_else(|| {
            CleanerError::Config("Registry client requires credentials".to_string())
        })?;

        let mut builder = Client::builder().user_agent(concat!(
            env!("CARGO_PKG_NAME"),
            "/",
            env!("CARGO_PKG_VERSION")
        ));
        if let Some(timeout) = self.timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| CleanerError::Network(format!("Failed to create HTTP client: {}", e)))?;

        let auth = Auth::new(client.clone(), &self.registry_url, self.output.clone())?;
        let tokens = TokenManager::new(auth, credentials, self.token_strategy, self.output.clone());

        Ok(RegistryClient {
            client,
            base_url: self.registry_url,
            tokens,
            output: self.output,
        })
    }
}

#[derive(Clone)]
pub struct RegistryClient {
    client: Client,
    base_url: Url,
    tokens: TokenManager,
    output: Logger,
}

impl RegistryClient {
    pub fn builder(registry_url: Url) -> RegistryClientBuilder {
        RegistryClientBuilder::new(registry_url)
    }

    /// Verify credentials before any repository work starts
    pub async fn authenticate(&self) -> Result<()> {
        self.tokens.authenticate().await
    }

    fn first_page_url(&self, repository: &RepositoryId) -> Result<Url> {
        let mut url = super::endpoint(
            &self.base_url,
            &["repositories", &repository.namespace, &repository.name, "tags"],
        )?;
        url.query_pairs_mut()
            .append_pair("page_size", &PAGE_SIZE.to_string());
        Ok(url)
    }

    fn tag_url(&self, repository: &RepositoryId, tag: &str) -> Result<Url> {
        super::endpoint(
            &self.base_url,
            &[
                "repositories",
                &repository.namespace,
                &repository.name,
                "tags",
                tag,
                "",
            ],
        )
    }

    /// Resolve a `next` cursor, absolute or relative to the base URL. Cursors
    /// pointing at another origin are refused so the token stays on the registry.
    fn next_page_url(&self, cursor: &PageCursor) -> std::result::Result<Url, String> {
        let mut base = self.base_url.clone();
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }

        let url = base
            .join(&cursor.0)
            .map_err(|e| format!("Invalid next page URL '{}': {}", cursor.0, e))?;
        if url.origin() != self.base_url.origin() {
            return Err(format!(
                "Refusing to follow next page URL on a different origin: {}",
                url
            ));
        }
        Ok(url)
    }

    async fn list_tags_page_internal(
        &self,
        repository: &RepositoryId,
        cursor: Option<&PageCursor>,
    ) -> std::result::Result<TagPage, String> {
        let url = match cursor {
            Some(cursor) => self.next_page_url(cursor)?,
            None => self.first_page_url(repository).map_err(|e| e.to_string())?,
        };
        let token = self.tokens.bearer().await.map_err(|e| e.to_string())?;

        self.output.detail(&format!("GET {}", url));
        let response = self
            .client
            .get(url)
            .bearer_auth(token)
            .send()
            .await
            .map_err(|e| NetworkErrorHandler::describe(&e, "tag listing"))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to read error response".to_string());
            return Err(HttpErrorHandler::describe_registry_error(
                status,
                &error_text,
                "tag listing",
            ));
        }

        let body: TagListResponse = response
            .json()
            .await
            .map_err(|e| format!("Failed to parse tags response: {}", e))?;

        Ok(body.into())
    }
}

#[async_trait]
impl TagRegistry for RegistryClient {
    async fn list_tags_page(
        &self,
        repository: &RepositoryId,
        cursor: Option<&PageCursor>,
    ) -> Result<TagPage> {
        self.list_tags_page_internal(repository, cursor)
            .await
            .map_err(|message| CleanerError::Fetch {
                repository: repository.to_string(),
                message,
            })
    }

    async fn delete_tag(&self, repository: &RepositoryId, tag: &str) -> Result<()> {
        let delete_error = |message: String| CleanerError::Delete {
            repository: repository.to_string(),
            tag: tag.to_string(),
            message,
        };

        let url = self
            .tag_url(repository, tag)
            .map_err(|e| delete_error(e.to_string()))?;
        let token = self
            .tokens
            .bearer()
            .await
            .map_err(|e| delete_error(e.to_string()))?;

        self.output.detail(&format!("DELETE {}", url));
        let response = self
            .client
            .delete(url)
            .bearer_auth(token)
            .send()
            .await
            .map_err(|e| delete_error(NetworkErrorHandler::describe(&e, "tag deletion")))?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }

        let error_text = response
            .text()
            .await
            .unwrap_or_else(|_| "Failed to read error response".to_string());
        Err(delete_error(HttpErrorHandler::describe_registry_error(
            status,
            &error_text,
            "tag deletion",
        )))
    }
}
