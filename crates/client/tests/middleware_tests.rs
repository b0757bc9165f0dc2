//! Integration tests for the token refresh middleware

use std::sync::{Arc, Mutex};

use profiles_client::{ClientError, ProfilesClient};
use profiles_core::{
    ACCESS_TOKEN_KEY, CSRF_TOKEN_KEY, CredentialStore, MemoryCredentialStore, Navigator,
    REFRESH_TOKEN_KEY, Surface,
};
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Navigator that records every redirect for assertions
#[derive(Default)]
struct RecordingNavigator {
    visits: Mutex<Vec<Surface>>,
}

impl RecordingNavigator {
    fn visits(&self) -> Vec<Surface> {
        self.visits.lock().unwrap().clone()
    }
}

impl Navigator for RecordingNavigator {
    fn navigate(&self, surface: Surface) {
        self.visits.lock().unwrap().push(surface);
    }
}

fn test_client(
    server: &MockServer,
) -> (
    ProfilesClient,
    Arc<MemoryCredentialStore>,
    Arc<RecordingNavigator>,
) {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("profiles_client=debug")
        .try_init();

    let store = Arc::new(MemoryCredentialStore::new());
    let navigator = Arc::new(RecordingNavigator::default());
    let client = ProfilesClient::builder()
        .base_url(server.uri())
        .credential_store(store.clone())
        .navigator(navigator.clone())
        .build()
        .unwrap();
    (client, store, navigator)
}

#[tokio::test]
async fn expired_token_is_refreshed_and_the_request_replayed_once() {
    let server = MockServer::start().await;
    let (client, store, navigator) = test_client(&server);

    store.set(ACCESS_TOKEN_KEY, "stale").unwrap();
    store.set(REFRESH_TOKEN_KEY, "R1").unwrap();

    Mock::given(method("GET"))
        .and(path("/accounts/api/get_user_data/"))
        .and(header("authorization", "Bearer stale"))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/accounts/api/token/refresh/"))
        .and(body_json(json!({ "refresh": "R1" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "access": "A2" })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/accounts/api/get_user_data/"))
        .and(header("authorization", "Bearer A2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "first_name": "Ada" })))
        .expect(1)
        .mount(&server)
        .await;

    let user = client.user_data().await.unwrap();

    assert_eq!(user.first_name, "Ada");
    assert_eq!(store.access_token().unwrap().as_deref(), Some("A2"));
    assert_eq!(client.session().failures(), 0);
    assert!(navigator.visits().is_empty());
}

#[tokio::test]
async fn a_replayed_request_is_never_retried_again() {
    let server = MockServer::start().await;
    let (client, store, _navigator) = test_client(&server);

    store.set(ACCESS_TOKEN_KEY, "stale").unwrap();
    store.set(REFRESH_TOKEN_KEY, "R1").unwrap();

    // The endpoint keeps rejecting even after a successful refresh; exactly
    // two attempts are allowed (the original and one replay).
    Mock::given(method("GET"))
        .and(path("/accounts/api/get_user_data/"))
        .respond_with(ResponseTemplate::new(401))
        .expect(2)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/accounts/api/token/refresh/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "access": "A2" })))
        .expect(1)
        .mount(&server)
        .await;

    let result = client.user_data().await;
    assert!(matches!(result, Err(ClientError::AuthenticationFailed(_))));
}

#[tokio::test]
async fn a_failed_refresh_surfaces_the_original_authorization_error() {
    let server = MockServer::start().await;
    let (client, store, navigator) = test_client(&server);

    store.set(ACCESS_TOKEN_KEY, "stale").unwrap();
    store.set(REFRESH_TOKEN_KEY, "R1").unwrap();

    Mock::given(method("GET"))
        .and(path("/accounts/api/get_user_data/"))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/accounts/api/token/refresh/"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&server)
        .await;

    let result = client.user_data().await;

    assert!(matches!(result, Err(ClientError::AuthenticationFailed(_))));
    assert_eq!(client.session().failures(), 1);
    // One failure inside the budget is not a teardown
    assert_eq!(store.refresh_token().unwrap().as_deref(), Some("R1"));
    assert!(navigator.visits().is_empty());
}

#[tokio::test]
async fn the_failure_counter_resets_to_zero_on_success() {
    let server = MockServer::start().await;
    let (client, store, _navigator) = test_client(&server);

    store.set(REFRESH_TOKEN_KEY, "R1").unwrap();

    Mock::given(method("POST"))
        .and(path("/accounts/api/token/refresh/"))
        .respond_with(ResponseTemplate::new(502))
        .up_to_n_times(2)
        .expect(2)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/accounts/api/token/refresh/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "access": "A2" })))
        .expect(1)
        .mount(&server)
        .await;

    assert!(client.refresh_token().await.is_err());
    assert_eq!(client.session().failures(), 1);

    assert!(client.refresh_token().await.is_err());
    assert_eq!(client.session().failures(), 2);

    let access = client.refresh_token().await.unwrap();
    assert_eq!(access, "A2");
    assert_eq!(client.session().failures(), 0);
    assert_eq!(store.access_token().unwrap().as_deref(), Some("A2"));
}

#[tokio::test]
async fn an_exhausted_budget_tears_the_session_down() {
    let server = MockServer::start().await;
    let (client, store, navigator) = test_client(&server);

    store.set(ACCESS_TOKEN_KEY, "stale").unwrap();
    store.set(REFRESH_TOKEN_KEY, "R1").unwrap();

    Mock::given(method("GET"))
        .and(path("/accounts/api/get_user_data/"))
        .respond_with(ResponseTemplate::new(401))
        .expect(4)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/accounts/api/token/refresh/"))
        .respond_with(ResponseTemplate::new(500))
        .expect(3)
        .mount(&server)
        .await;

    for _ in 0..3 {
        let result = client.user_data().await;
        assert!(matches!(result, Err(ClientError::AuthenticationFailed(_))));
    }

    // Third consecutive failure spends the budget: tokens gone, login forced
    assert_eq!(client.session().failures(), 3);
    assert_eq!(store.access_token().unwrap(), None);
    assert_eq!(store.refresh_token().unwrap(), None);
    assert!(!client.session().is_authenticated());
    assert_eq!(navigator.visits(), vec![Surface::Login]);

    // A fourth 401 short-circuits on the missing refresh token: no exchange
    // request is sent (the refresh mock stays at three calls)
    let result = client.user_data().await;
    assert!(matches!(result, Err(ClientError::AuthenticationFailed(_))));
    assert_eq!(navigator.visits(), vec![Surface::Login, Surface::Login]);
}

#[tokio::test]
async fn a_missing_refresh_token_logs_out_without_an_exchange_call() {
    let server = MockServer::start().await;
    let (client, store, navigator) = test_client(&server);

    store.set(ACCESS_TOKEN_KEY, "stale").unwrap();

    Mock::given(method("GET"))
        .and(path("/accounts/api/get_user_data/"))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/accounts/api/token/refresh/"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let result = client.user_data().await;

    assert!(matches!(result, Err(ClientError::AuthenticationFailed(_))));
    assert_eq!(store.access_token().unwrap(), None);
    assert_eq!(navigator.visits(), vec![Surface::Login]);
    assert_eq!(client.session().failures(), 0);
}

#[tokio::test]
async fn non_authorization_errors_pass_through_unchanged() {
    let server = MockServer::start().await;
    let (client, store, navigator) = test_client(&server);

    store.set(ACCESS_TOKEN_KEY, "A1").unwrap();
    store.set(REFRESH_TOKEN_KEY, "R1").unwrap();

    Mock::given(method("GET"))
        .and(path("/accounts/api/get_user_data/"))
        .respond_with(ResponseTemplate::new(503))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/accounts/api/token/refresh/"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let result = client.user_data().await;

    assert!(matches!(
        result,
        Err(ClientError::ServerError { status: 503, .. })
    ));
    assert_eq!(client.session().failures(), 0);
    assert!(navigator.visits().is_empty());
}

#[tokio::test]
async fn check_authentication_is_local_when_a_token_is_present() {
    let server = MockServer::start().await;
    let (client, store, _navigator) = test_client(&server);

    store.set(ACCESS_TOKEN_KEY, "A1").unwrap();

    Mock::given(method("POST"))
        .and(path("/accounts/api/token/refresh/"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    assert!(client.auth().check_authentication().await);
    assert!(client.session().is_authenticated());
}

#[tokio::test]
async fn check_authentication_refreshes_when_the_token_is_absent() {
    let server = MockServer::start().await;
    let (client, store, _navigator) = test_client(&server);

    store.set(REFRESH_TOKEN_KEY, "R1").unwrap();

    Mock::given(method("POST"))
        .and(path("/accounts/api/token/refresh/"))
        .and(body_json(json!({ "refresh": "R1" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "access": "A2" })))
        .expect(1)
        .mount(&server)
        .await;

    assert!(client.auth().check_authentication().await);
    assert_eq!(store.access_token().unwrap().as_deref(), Some("A2"));
    assert!(client.session().is_authenticated());
}

#[tokio::test]
async fn check_authentication_reports_false_when_the_refresh_fails() {
    let server = MockServer::start().await;
    let (client, store, navigator) = test_client(&server);

    store.set(REFRESH_TOKEN_KEY, "R1").unwrap();

    Mock::given(method("POST"))
        .and(path("/accounts/api/token/refresh/"))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&server)
        .await;

    assert!(!client.auth().check_authentication().await);
    assert!(!client.session().is_authenticated());
    // A declined refresh is an ordinary "not authenticated", not an error
    assert!(navigator.visits().is_empty());
}

#[tokio::test]
async fn check_authentication_is_false_with_no_credentials_at_all() {
    let server = MockServer::start().await;
    let (client, _store, _navigator) = test_client(&server);

    Mock::given(method("POST"))
        .and(path("/accounts/api/token/refresh/"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    assert!(!client.auth().check_authentication().await);
    assert!(!client.session().is_authenticated());
}

#[tokio::test]
async fn logon_redirect_routes_by_check_outcome() {
    let server = MockServer::start().await;
    let (client, store, navigator) = test_client(&server);

    store.set(ACCESS_TOKEN_KEY, "A1").unwrap();
    client.auth().logon_redirect().await;
    assert_eq!(navigator.visits(), vec![Surface::Dashboard]);

    store.clear_tokens().unwrap();
    client.auth().logon_redirect().await;
    assert_eq!(navigator.visits(), vec![Surface::Dashboard, Surface::Login]);
}

#[tokio::test]
async fn logout_clears_both_tokens_even_when_the_server_fails() {
    let server = MockServer::start().await;
    let (client, store, navigator) = test_client(&server);

    store.set(ACCESS_TOKEN_KEY, "A1").unwrap();
    store.set(REFRESH_TOKEN_KEY, "R1").unwrap();

    Mock::given(method("POST"))
        .and(path("/accounts/logout/"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&server)
        .await;

    client.auth().logout().await;

    assert_eq!(store.access_token().unwrap(), None);
    assert_eq!(store.refresh_token().unwrap(), None);
    assert!(!client.session().is_authenticated());
    assert_eq!(navigator.visits(), vec![Surface::Login]);
}

#[tokio::test]
async fn logout_notifies_the_server_with_the_csrf_token() {
    let server = MockServer::start().await;
    let (client, store, navigator) = test_client(&server);

    store.set(ACCESS_TOKEN_KEY, "A1").unwrap();
    store.set(REFRESH_TOKEN_KEY, "R1").unwrap();
    store.set(CSRF_TOKEN_KEY, "C1").unwrap();

    Mock::given(method("POST"))
        .and(path("/accounts/logout/"))
        .and(header("X-CSRFToken", "C1"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    client.auth().logout().await;

    assert_eq!(store.access_token().unwrap(), None);
    assert_eq!(store.refresh_token().unwrap(), None);
    assert_eq!(navigator.visits(), vec![Surface::Login]);
}

#[tokio::test]
async fn the_route_guard_only_rechecks_the_dashboard() {
    let server = MockServer::start().await;
    let (client, store, _navigator) = test_client(&server);

    store.set(ACCESS_TOKEN_KEY, "A1").unwrap();
    client.auth().on_route_enter(Surface::Dashboard).await;
    assert!(client.session().is_authenticated());

    // Leaving for another surface never re-runs the check
    store.clear_tokens().unwrap();
    client.auth().on_route_enter(Surface::Login).await;
    assert!(client.session().is_authenticated());

    client.auth().on_route_enter(Surface::Dashboard).await;
    assert!(!client.session().is_authenticated());
}
