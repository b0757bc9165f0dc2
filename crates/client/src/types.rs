//! Wire types for the accounts API

use serde::{Deserialize, Serialize};

/// Request body for the credential exchange endpoint
#[derive(Debug, Serialize)]
pub struct TokenRefreshRequest {
    pub refresh: String,
}

/// Response from the credential exchange endpoint
#[derive(Debug, Deserialize)]
pub struct TokenRefreshResponse {
    /// New access token
    pub access: String,
}

/// Request body for the token obtain endpoint
#[derive(Debug, Serialize)]
pub struct TokenObtainRequest {
    pub email: String,
    pub password: String,
}

/// Token pair returned on login
#[derive(Debug, Deserialize)]
pub struct TokenPairResponse {
    pub access: String,
    pub refresh: String,
}

/// Request body for the token verification endpoint
#[derive(Debug, Serialize)]
pub struct TokenVerifyRequest {
    pub token: String,
}

/// Dashboard welcome data
#[derive(Debug, Clone, Deserialize)]
pub struct UserData {
    pub first_name: String,
}

/// Result of toggling a subscription
#[derive(Debug, Clone, Deserialize)]
pub struct SubscriptionToggle {
    /// `"added"` or `"removed"`
    pub status: String,
}

/// Whether the user is subscribed to an entity
#[derive(Debug, Clone, Deserialize)]
pub struct SubscriptionStatus {
    pub status: bool,
}

/// One entity from the subscription list
#[derive(Debug, Clone, Deserialize)]
pub struct SubscribedEntity {
    pub id: u64,
    pub name: String,
}

/// Subscription list for the dashboard
#[derive(Debug, Clone, Deserialize)]
pub struct SubscriptionList {
    pub subscribed_entities: Vec<SubscribedEntity>,
}
