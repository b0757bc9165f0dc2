//! Typed accounts API methods

use profiles_core::{ACCESS_TOKEN_KEY, REFRESH_TOKEN_KEY};
use reqwest::Method;

use crate::client::ProfilesClient;
use crate::config::ApiRoutes;
use crate::error::ClientError;
use crate::types::{
    SubscriptionList, SubscriptionStatus, SubscriptionToggle, TokenObtainRequest,
    TokenPairResponse, TokenVerifyRequest, UserData,
};

impl ProfilesClient {
    /// Obtain a token pair with email and password
    ///
    /// On success both tokens are stored, the failure budget resets and the
    /// authenticated flag goes up.
    pub async fn login(
        &self,
        email: impl Into<String>,
        password: impl Into<String>,
    ) -> Result<(), ClientError> {
        let request = self
            .request(Method::POST, ApiRoutes::TOKEN_OBTAIN)
            .json(&TokenObtainRequest {
                email: email.into(),
                password: password.into(),
            });
        let pair: TokenPairResponse = self.execute(request).await?;

        self.store().set(ACCESS_TOKEN_KEY, &pair.access)?;
        self.store().set(REFRESH_TOKEN_KEY, &pair.refresh)?;
        self.session().reset_failures();
        self.session().set_authenticated(true);
        Ok(())
    }

    /// Check the stored access token against the verification endpoint
    ///
    /// Returns false for a missing token without a network call, and for a
    /// token the server rejects.
    pub async fn verify_token(&self) -> Result<bool, ClientError> {
        let Some(token) = self.store().access_token()? else {
            return Ok(false);
        };

        let request = self
            .request(Method::POST, ApiRoutes::TOKEN_VERIFY)
            .json(&TokenVerifyRequest { token });
        match self.send(request).await {
            Ok(_) => Ok(true),
            Err(ClientError::AuthenticationFailed(_)) => Ok(false),
            Err(err) => Err(err),
        }
    }

    /// Dashboard welcome data for the authenticated user
    pub async fn user_data(&self) -> Result<UserData, ClientError> {
        let request = self.request(Method::GET, ApiRoutes::USER_DATA);
        self.execute(request).await
    }

    /// Toggle a subscription to an entity
    pub async fn toggle_subscription(
        &self,
        entity_id: u64,
    ) -> Result<SubscriptionToggle, ClientError> {
        let request = self.request(Method::POST, &ApiRoutes::toggle_subscription(entity_id));
        self.execute(request).await
    }

    /// Whether the user is subscribed to an entity
    pub async fn subscription_status(
        &self,
        entity_id: u64,
    ) -> Result<SubscriptionStatus, ClientError> {
        let request = self.request(Method::GET, &ApiRoutes::subscription_status(entity_id));
        self.execute(request).await
    }

    /// Every entity the user is subscribed to
    pub async fn subscriptions(&self) -> Result<SubscriptionList, ClientError> {
        let request = self.request(Method::GET, ApiRoutes::SUBSCRIPTION_LIST);
        self.execute(request).await
    }
}
