//! Bearer token provider for registry requests
//!
//! Every outgoing request asks the [`TokenManager`] for a bearer token.
//! With a pre-issued token the answer is constant. With username/password
//! the [`TokenStrategy`] decides whether the session token obtained at login
//! is reused for the rest of the run or fetched again for every request.

use crate::config::Credentials;
use crate::error::Result;
use crate::logging::Logger;
use crate::registry::auth::Auth;
use std::sync::Arc;
use tokio::sync::Mutex;

/// When a session token is (re)fetched in login mode
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TokenStrategy {
    /// Log in once and reuse the session token for the whole run
    #[default]
    Cached,
    /// Log in again before every request
    PerRequest,
}

/// Thread-safe token provider shared by all concurrent requests
#[derive(Clone)]
pub struct TokenManager {
    auth: Auth,
    credentials: Arc<Credentials>,
    strategy: TokenStrategy,
    session: Arc<Mutex<Option<String>>>,
    output: Logger,
}

impl TokenManager {
    pub fn new(auth: Auth, credentials: Credentials, strategy: TokenStrategy, output: Logger) -> Self {
        Self {
            auth,
            credentials: Arc::new(credentials),
            strategy,
            session: Arc::new(Mutex::new(None)),
            output,
        }
    }

    /// Token to attach to the next request
    pub async fn bearer(&self) -> Result<String> {
        let (username, password) = match self.credentials.as_ref() {
            Credentials::Bearer(token) => return Ok(token.clone()),
            Credentials::Login { username, password } => (username, password),
        };

        match self.strategy {
            TokenStrategy::PerRequest => self.auth.login(username, password).await,
            TokenStrategy::Cached => {
                // Held across the login so concurrent first requests share one exchange
                let mut session = self.session.lock().await;
                if let Some(token) = session.as_ref() {
                    return Ok(token.clone());
                }
                let token = self.auth.login(username, password).await?;
                self.output.debug("Session token cached for the rest of the run");
                *session = Some(token.clone());
                Ok(token)
            }
        }
    }

    /// Obtain a token up front so credential problems abort the run early
    pub async fn authenticate(&self) -> Result<()> {
        self.output.step(&format!(
            "Authenticating with {} credentials",
            self.credentials.mode()
        ));
        self.bearer().await?;
        self.output.success("Authentication successful");
        Ok(())
    }
}
