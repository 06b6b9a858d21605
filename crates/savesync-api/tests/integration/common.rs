//! Shared test helpers for catalog API integration tests
//!
//! Provides wiremock-based mock server setup for the catalog endpoints.
//! Each helper mounts the necessary mock endpoints and returns a
//! configured client pointing at the mock server.

use wiremock::matchers::{body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use savesync_api::client::ApiClient;

/// Starts a mock catalog with a working `/login` endpoint and returns an
/// authenticated client pointing at it.
pub async fn setup_authenticated() -> (MockServer, ApiClient) {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/login"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "token": "test-session-token"
            })),
        )
        .mount(&server)
        .await;

    let mut client = ApiClient::new(server.uri(), 10).unwrap();
    client
        .login("player@example.com", "secret")
        .await
        .expect("mock login should succeed");

    (server, client)
}

/// Mounts a console listing with the given rows.
pub async fn mount_consoles(server: &MockServer, consoles: serde_json::Value) {
    Mock::given(method("GET"))
        .and(path("/console"))
        .respond_with(ResponseTemplate::new(200).set_body_json(consoles))
        .mount(server)
        .await;
}

/// Mounts a savefile listing for any console query.
pub async fn mount_savefiles(server: &MockServer, savefiles: serde_json::Value) {
    Mock::given(method("GET"))
        .and(path("/savefile"))
        .respond_with(ResponseTemplate::new(200).set_body_json(savefiles))
        .mount(server)
        .await;
}

/// Mounts a savefile download endpoint serving raw bytes.
pub async fn mount_download(server: &MockServer, record_id: i64, content: &[u8]) {
    Mock::given(method("GET"))
        .and(path(format!("/savefile/{record_id}")))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_bytes(content.to_vec())
                .insert_header("content-type", "application/octet-stream"),
        )
        .mount(server)
        .await;
}

/// Mounts a create endpoint answering 201 with the given record.
#[allow(dead_code)]
pub async fn mount_create(server: &MockServer, record: serde_json::Value) {
    Mock::given(method("POST"))
        .and(path("/savefile"))
        .respond_with(ResponseTemplate::new(201).set_body_json(record))
        .mount(server)
        .await;
}

/// Mounts an update endpoint (POST + `_method=PUT`) for a record.
#[allow(dead_code)]
pub async fn mount_update(server: &MockServer, record_id: i64, record: serde_json::Value) {
    Mock::given(method("POST"))
        .and(path(format!("/savefile/{record_id}")))
        .and(body_string_contains("_method"))
        .respond_with(ResponseTemplate::new(200).set_body_json(record))
        .mount(server)
        .await;
}

/// A catalog savefile row as JSON.
pub fn savefile_row(id: i64, file_path: &str, file_name: &str, updated_at: &str) -> serde_json::Value {
    serde_json::json!({
        "id": id,
        "file_name": file_name,
        "file_path": file_path,
        "size": 64,
        "updated_at": updated_at,
        "fk_id_console": 1,
        "version": 1
    })
}
