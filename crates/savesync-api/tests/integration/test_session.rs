//! Session flow tests: login, registration fallback, logout

use wiremock::matchers::{body_string_contains, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use savesync_api::client::ApiClient;
use savesync_core::ports::catalog::CatalogError;

use crate::common::setup_authenticated;

#[tokio::test]
async fn login_stores_token() {
    let (_server, client) = setup_authenticated().await;
    assert_eq!(client.token(), Some("test-session-token"));
}

#[tokio::test]
async fn login_failure_maps_to_auth_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/login"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let mut client = ApiClient::new(server.uri(), 10).unwrap();
    let err = client.login("player@example.com", "wrong").await.unwrap_err();

    assert!(matches!(err, CatalogError::Auth(_)));
    assert!(client.token().is_none());
}

#[tokio::test]
async fn login_or_register_falls_back_to_registration() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/login"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/register"))
        .and(body_string_contains("password_confirmation"))
        .respond_with(
            ResponseTemplate::new(201).set_body_json(serde_json::json!({
                "token": "fresh-account-token"
            })),
        )
        .mount(&server)
        .await;

    let mut client = ApiClient::new(server.uri(), 10).unwrap();
    client
        .login_or_register("player", "player@example.com", "secret")
        .await
        .unwrap();

    assert_eq!(client.token(), Some("fresh-account-token"));
}

#[tokio::test]
async fn login_or_register_propagates_transport_failures() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/login"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let mut client = ApiClient::new(server.uri(), 10).unwrap();
    let err = client
        .login_or_register("player", "player@example.com", "secret")
        .await
        .unwrap_err();

    // A server fault must not trigger account registration.
    assert!(matches!(err, CatalogError::Transport(_)));
}

#[tokio::test]
async fn logout_sends_bearer_token() {
    let (server, client) = setup_authenticated().await;

    Mock::given(method("GET"))
        .and(path("/logout"))
        .and(header("authorization", "Bearer test-session-token"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    client.logout().await.unwrap();
}

#[tokio::test]
async fn logout_without_token_is_noop() {
    let server = MockServer::start().await;
    // No /logout mock mounted: a request would fail the test server-side.
    let client = ApiClient::new(server.uri(), 10).unwrap();
    client.logout().await.unwrap();
}
