//! Accounts API route table

/// Route paths under the API base URL
pub struct ApiRoutes;

impl ApiRoutes {
    /// Credential exchange endpoint
    pub const TOKEN_REFRESH: &'static str = "/accounts/api/token/refresh/";

    /// Token pair obtain endpoint
    pub const TOKEN_OBTAIN: &'static str = "/accounts/api/token/";

    /// Token verification endpoint
    pub const TOKEN_VERIFY: &'static str = "/accounts/api/token/verify/";

    /// Server-side session logout endpoint
    pub const LOGOUT: &'static str = "/accounts/logout/";

    /// Dashboard welcome data
    pub const USER_DATA: &'static str = "/accounts/api/get_user_data/";

    /// Subscription list for the dashboard
    pub const SUBSCRIPTION_LIST: &'static str = "/accounts/api/get_sub_list/";

    /// Subscription toggle for one entity
    pub fn toggle_subscription(entity_id: u64) -> String {
        format!("/accounts/api/toggle_sub/{entity_id}/")
    }

    /// Subscription status for one entity
    pub fn subscription_status(entity_id: u64) -> String {
        format!("/accounts/api/get_sub_status/{entity_id}/")
    }
}
