//! Credential exchange against the token refresh endpoint

use std::sync::Arc;

use profiles_core::{ACCESS_TOKEN_KEY, AuthSession, CredentialStore, StoreError};
use thiserror::Error;
use tracing::{debug, warn};

use crate::config::ApiRoutes;
use crate::types::{TokenRefreshRequest, TokenRefreshResponse};

/// Errors from the credential exchange
#[derive(Debug, Error)]
pub enum RefreshError {
    /// No refresh token in the store
    #[error("No refresh token stored")]
    MissingRefreshToken,

    /// The exchange endpoint declined the refresh token
    #[error("Refresh rejected: HTTP {status}: {message}")]
    Rejected { status: u16, message: String },

    /// The exchange endpoint could not be reached
    #[error("Refresh request failed: {0}")]
    Unreachable(#[from] reqwest::Error),

    /// The consecutive-failure budget is already spent
    #[error("Refresh attempt budget exhausted")]
    BudgetExhausted,

    /// The new access token could not be persisted
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Exchanges the stored refresh token for a new access token
///
/// The engine never loops; the response middleware owns the decision to call
/// it again, and the shared session tracks how many consecutive exchanges
/// have failed.
pub struct TokenRefresher {
    http: reqwest::Client,
    base_url: String,
    store: Arc<dyn CredentialStore>,
    session: Arc<AuthSession>,
}

impl TokenRefresher {
    pub(crate) fn new(
        http: reqwest::Client,
        base_url: String,
        store: Arc<dyn CredentialStore>,
        session: Arc<AuthSession>,
    ) -> Self {
        Self {
            http,
            base_url,
            store,
            session,
        }
    }

    /// Exchange the stored refresh token for a new access token
    ///
    /// On success the new token is written to the store and the failure
    /// counter resets to zero. Every failed exchange counts against the
    /// session budget. A missing refresh token short-circuits without
    /// touching the counter, and a spent budget fails before any request
    /// is sent.
    pub async fn refresh(&self) -> Result<String, RefreshError> {
        let refresh_token = self
            .store
            .refresh_token()
            .ok()
            .flatten()
            .filter(|token| !token.is_empty())
            .ok_or(RefreshError::MissingRefreshToken)?;

        if self.session.is_exhausted() {
            return Err(RefreshError::BudgetExhausted);
        }

        let result = match self.exchange(refresh_token).await {
            Ok(access) => self
                .store
                .set(ACCESS_TOKEN_KEY, &access)
                .map(|()| access)
                .map_err(RefreshError::from),
            Err(err) => Err(err),
        };

        match result {
            Ok(access) => {
                self.session.reset_failures();
                debug!("access token refreshed");
                Ok(access)
            }
            Err(err) => {
                let failures = self.session.record_failure();
                warn!(%err, failures, "token refresh failed");
                Err(err)
            }
        }
    }

    async fn exchange(&self, refresh_token: String) -> Result<String, RefreshError> {
        let url = format!("{}{}", self.base_url, ApiRoutes::TOKEN_REFRESH);
        let response = self
            .http
            .post(&url)
            .json(&TokenRefreshRequest {
                refresh: refresh_token,
            })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_else(|_| status.to_string());
            return Err(RefreshError::Rejected {
                status: status.as_u16(),
                message,
            });
        }

        let body: TokenRefreshResponse = response.json().await?;
        Ok(body.access)
    }
}
