//! Client configuration and construction

use std::sync::Arc;
use std::time::Duration;

use profiles_core::{
    AuthSession, CredentialStore, MAX_REFRESH_ATTEMPTS, MemoryCredentialStore, Navigator,
    NoopNavigator,
};

use crate::auth::AuthState;
use crate::error::ClientError;
use crate::middleware::{BearerAuth, Pipeline, RefreshOnUnauthorized};
use crate::refresh::TokenRefresher;

/// Prominent Profiles API client
#[derive(Clone)]
pub struct ProfilesClient {
    http: reqwest::Client,
    base_url: String,
    pipeline: Arc<Pipeline>,
    auth: Arc<AuthState>,
    refresher: Arc<TokenRefresher>,
    store: Arc<dyn CredentialStore>,
    session: Arc<AuthSession>,
}

impl ProfilesClient {
    /// Create a new client with default configuration
    pub fn new(base_url: impl Into<String>) -> Result<Self, ClientError> {
        Self::builder().base_url(base_url).build()
    }

    /// Create a new client builder
    pub fn builder() -> ProfilesClientBuilder {
        ProfilesClientBuilder::default()
    }

    /// Get the base URL
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Shared credential store
    pub fn store(&self) -> &Arc<dyn CredentialStore> {
        &self.store
    }

    /// Shared session state
    pub fn session(&self) -> &Arc<AuthSession> {
        &self.session
    }

    /// Authentication helpers
    pub fn auth(&self) -> &AuthState {
        &self.auth
    }

    /// Force a credential exchange now
    ///
    /// The same primitive the response middleware uses; exposed for
    /// collaborators that want to renew ahead of a known-stale token.
    pub async fn refresh_token(&self) -> Result<String, ClientError> {
        Ok(self.refresher.refresh().await?)
    }

    /// Create a request builder for `path`
    ///
    /// Authorization is attached by the pipeline at send time, not here, so
    /// a replay always carries the freshest token.
    pub fn request(&self, method: reqwest::Method, path: &str) -> reqwest::RequestBuilder {
        let url = format!("{}{}", self.base_url, path);
        self.http.request(method, url)
    }

    /// Execute a request through the middleware pipeline and decode the body
    pub async fn execute<T: serde::de::DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<T, ClientError> {
        let response = self.send(request).await?;
        Ok(response.json().await?)
    }

    /// Execute a request through the pipeline, mapping error statuses
    pub async fn send(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<reqwest::Response, ClientError> {
        let request = request.build()?;
        let response = self.pipeline.execute(request).await?;
        let status = response.status();

        if status.is_success() {
            Ok(response)
        } else {
            let message = response.text().await.unwrap_or_else(|_| status.to_string());
            Err(ClientError::from_status(status, message))
        }
    }
}

/// Builder for [`ProfilesClient`]
pub struct ProfilesClientBuilder {
    base_url: Option<String>,
    timeout: Option<Duration>,
    user_agent: Option<String>,
    store: Option<Arc<dyn CredentialStore>>,
    navigator: Option<Arc<dyn Navigator>>,
    max_refresh_attempts: u32,
}

impl Default for ProfilesClientBuilder {
    fn default() -> Self {
        Self {
            base_url: None,
            timeout: None,
            user_agent: None,
            store: None,
            navigator: None,
            max_refresh_attempts: MAX_REFRESH_ATTEMPTS,
        }
    }
}

impl ProfilesClientBuilder {
    /// Set the base URL
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Set the request timeout
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Set the user agent
    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.user_agent = Some(agent.into());
        self
    }

    /// Use a custom credential store (defaults to an in-memory store)
    pub fn credential_store(mut self, store: Arc<dyn CredentialStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Attach the router collaborator (defaults to a no-op)
    pub fn navigator(mut self, navigator: Arc<dyn Navigator>) -> Self {
        self.navigator = Some(navigator);
        self
    }

    /// Override the consecutive refresh-failure budget
    pub fn max_refresh_attempts(mut self, attempts: u32) -> Self {
        self.max_refresh_attempts = attempts;
        self
    }

    /// Build the client
    pub fn build(self) -> Result<ProfilesClient, ClientError> {
        let base_url = self
            .base_url
            .ok_or_else(|| ClientError::Configuration("base_url is required".into()))?;

        // Ensure base_url ends without a trailing slash
        let base_url = base_url.trim_end_matches('/').to_string();

        let mut client_builder = reqwest::ClientBuilder::new();
        if let Some(timeout) = self.timeout {
            client_builder = client_builder.timeout(timeout);
        }
        client_builder = client_builder.user_agent(
            self.user_agent
                .unwrap_or_else(|| "profiles-client/0.1.0".to_string()),
        );
        let http = client_builder.build()?;

        let store = self
            .store
            .unwrap_or_else(|| Arc::new(MemoryCredentialStore::new()));
        let navigator = self.navigator.unwrap_or_else(|| Arc::new(NoopNavigator));
        let session = Arc::new(AuthSession::with_budget(self.max_refresh_attempts));

        let refresher = Arc::new(TokenRefresher::new(
            http.clone(),
            base_url.clone(),
            store.clone(),
            session.clone(),
        ));

        let mut pipeline = Pipeline::new(http.clone());
        pipeline.push_request_stage(BearerAuth::new(store.clone()));
        pipeline.push_response_stage(RefreshOnUnauthorized::new(
            refresher.clone(),
            store.clone(),
            session.clone(),
            navigator.clone(),
        ));

        let auth = Arc::new(AuthState::new(
            http.clone(),
            base_url.clone(),
            store.clone(),
            session.clone(),
            refresher.clone(),
            navigator,
        ));

        Ok(ProfilesClient {
            http,
            base_url,
            pipeline: Arc::new(pipeline),
            auth,
            refresher,
            store,
            session,
        })
    }
}
