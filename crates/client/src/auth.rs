//! Authentication state helpers
//!
//! The UI-facing surface of the auth flow: a one-shot authenticated check
//! feeding the observable flag, the login/dashboard redirect, logout and the
//! dashboard route guard. Owns no state of its own; the flag and failure
//! budget live in the shared [`AuthSession`], the credentials in the store.

use std::sync::Arc;

use profiles_core::{AuthSession, CredentialStore, Navigator, StoreError, Surface};
use tracing::{error, warn};

use crate::config::ApiRoutes;
use crate::error::ClientError;
use crate::refresh::TokenRefresher;

/// Header carrying the CSRF token on the logout notification
const CSRF_HEADER: &str = "X-CSRFToken";

/// UI-facing authentication helpers
pub struct AuthState {
    http: reqwest::Client,
    base_url: String,
    store: Arc<dyn CredentialStore>,
    session: Arc<AuthSession>,
    refresher: Arc<TokenRefresher>,
    navigator: Arc<dyn Navigator>,
}

impl AuthState {
    pub(crate) fn new(
        http: reqwest::Client,
        base_url: String,
        store: Arc<dyn CredentialStore>,
        session: Arc<AuthSession>,
        refresher: Arc<TokenRefresher>,
        navigator: Arc<dyn Navigator>,
    ) -> Self {
        Self {
            http,
            base_url,
            store,
            session,
            refresher,
            navigator,
        }
    }

    /// One-shot authentication check, updating the observable flag
    ///
    /// A present access token authenticates immediately with no network
    /// call; otherwise a single credential exchange decides. An unexpected
    /// store failure routes to the login surface and reports
    /// unauthenticated.
    pub async fn check_authentication(&self) -> bool {
        let authenticated = match self.probe().await {
            Ok(authenticated) => authenticated,
            Err(err) => {
                error!(%err, "error checking authentication");
                self.navigator.navigate(Surface::Login);
                false
            }
        };
        self.session.set_authenticated(authenticated);
        authenticated
    }

    async fn probe(&self) -> Result<bool, StoreError> {
        let access_token = self.store.access_token()?;
        if access_token.filter(|token| !token.is_empty()).is_some() {
            return Ok(true);
        }
        Ok(self.refresher.refresh().await.is_ok())
    }

    /// Route to the dashboard when authenticated, the login surface otherwise
    pub async fn logon_redirect(&self) {
        if self.check_authentication().await {
            self.navigator.navigate(Surface::Dashboard);
        } else {
            self.navigator.navigate(Surface::Login);
        }
    }

    /// End the session
    ///
    /// Both tokens are cleared unconditionally, the server is told
    /// best-effort (a failed notification is logged, never propagated), the
    /// flag drops to false and the redirect runs — with the tokens gone it
    /// lands on the login surface.
    pub async fn logout(&self) {
        if let Err(err) = self.store.clear_tokens() {
            warn!(%err, "failed to clear credentials during logout");
        }

        if let Err(err) = self.notify_logout().await {
            warn!(%err, "error during logout");
        }

        self.session.set_authenticated(false);
        self.logon_redirect().await;
    }

    async fn notify_logout(&self) -> Result<(), ClientError> {
        let url = format!("{}{}", self.base_url, ApiRoutes::LOGOUT);
        let mut request = self.http.post(&url);
        if let Ok(Some(csrf)) = self.store.csrf_token() {
            request = request.header(CSRF_HEADER, csrf);
        }

        let response = request
            .send()
            .await
            .map_err(|err| ClientError::LogoutNotification(err.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ClientError::LogoutNotification(format!("HTTP {status}")));
        }
        Ok(())
    }

    /// Route-guard hook: re-check authentication when entering the dashboard
    ///
    /// Other surfaces pass through without a check; this is a guard, not a
    /// poll.
    pub async fn on_route_enter(&self, surface: Surface) {
        if surface == Surface::Dashboard {
            self.check_authentication().await;
        }
    }
}
