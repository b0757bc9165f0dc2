//! Refresh-on-unauthorized response stage

use std::sync::Arc;

use async_trait::async_trait;
use profiles_core::{AuthSession, CredentialStore, Navigator, Surface};
use reqwest::StatusCode;
use tracing::{debug, warn};

use super::{AttemptContext, ResponseAction, ResponseStage};
use crate::error::ClientError;
use crate::refresh::{RefreshError, TokenRefresher};

/// Replays a request once after renewing an expired access token
///
/// A 401 on a not-yet-replayed call triggers one credential exchange; on
/// success the request is replayed with the renewed token and the caller
/// observes the replay's outcome. A failed exchange surfaces the original
/// 401. Once the session's failure budget is spent, or no refresh token is
/// left, the session is torn down and navigation is forced to the login
/// surface.
pub struct RefreshOnUnauthorized {
    refresher: Arc<TokenRefresher>,
    store: Arc<dyn CredentialStore>,
    session: Arc<AuthSession>,
    navigator: Arc<dyn Navigator>,
}

impl RefreshOnUnauthorized {
    pub fn new(
        refresher: Arc<TokenRefresher>,
        store: Arc<dyn CredentialStore>,
        session: Arc<AuthSession>,
        navigator: Arc<dyn Navigator>,
    ) -> Self {
        Self {
            refresher,
            store,
            session,
            navigator,
        }
    }

    /// Clear the session and send the user back to the login surface
    fn force_logout(&self) {
        if let Err(err) = self.store.clear_tokens() {
            warn!(%err, "failed to clear credentials during forced logout");
        }
        self.session.set_authenticated(false);
        self.navigator.navigate(Surface::Login);
    }
}

#[async_trait]
impl ResponseStage for RefreshOnUnauthorized {
    async fn handle(
        &self,
        response: reqwest::Response,
        attempt: &mut AttemptContext,
    ) -> Result<ResponseAction, ClientError> {
        if response.status() != StatusCode::UNAUTHORIZED || attempt.retried() {
            return Ok(ResponseAction::Deliver(response));
        }

        attempt.mark_retried();

        match self.refresher.refresh().await {
            Ok(_) => {
                debug!("replaying request with renewed access token");
                Ok(ResponseAction::Replay)
            }
            Err(RefreshError::MissingRefreshToken) => {
                warn!("no refresh token available, logging out");
                self.force_logout();
                Ok(ResponseAction::Deliver(response))
            }
            Err(err) => {
                if self.session.is_exhausted() {
                    warn!(
                        failures = self.session.failures(),
                        "refresh attempt budget exhausted, logging out"
                    );
                    self.force_logout();
                } else {
                    debug!(%err, "refresh failed, surfacing original authorization error");
                }
                Ok(ResponseAction::Deliver(response))
            }
        }
    }
}
