//! Login exchange against the registry management API

use crate::error::handlers::{HttpErrorHandler, NetworkErrorHandler};
use crate::error::{CleanerError, Result};
use crate::logging::Logger;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use url::Url;

#[derive(Debug, Serialize)]
struct LoginRequest<'a> {
    username: &'a str,
    password: &'a str,
}

#[derive(Debug, Deserialize)]
struct LoginResponse {
    token: Option<String>,
}

#[derive(Debug, Clone)]
pub struct Auth {
    client: Client,
    login_url: Url,
    output: Logger,
}

impl Auth {
    pub fn new(client: Client, registry_url: &Url, output: Logger) -> Result<Self> {
        let login_url = super::endpoint(registry_url, &["users", "login"])?;
        Ok(Self {
            client,
            login_url,
            output,
        })
    }

    /// Exchange username and password (or personal access token) for a session token
    pub async fn login(&self, username: &str, password: &str) -> Result<String> {
        self.output
            .detail(&format!("Requesting session token for user: {}", username));

        let response = self
            .client
            .post(self.login_url.clone())
            .json(&LoginRequest { username, password })
            .send()
            .await
            .map_err(|e| {
                CleanerError::Auth(NetworkErrorHandler::describe(&e, "login request"))
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to read error response".to_string());
            return Err(HttpErrorHandler::handle_auth_error(status, &error_text));
        }

        let body: LoginResponse = response
            .json()
            .await
            .map_err(|e| CleanerError::Auth(format!("Failed to parse login response: {}", e)))?;

        match body.token {
            Some(token) if !token.is_empty() => {
                self.output
                    .detail(&format!("Session token obtained ({} chars)", token.len()));
                Ok(token)
            }
            _ => Err(CleanerError::Auth(
                "Login response did not contain a token".to_string(),
            )),
        }
    }
}
