//! Catalog operation tests: listing, uploads, downloads, error mapping

use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use chrono::{TimeZone, Utc};
use savesync_api::catalog::HttpCatalogClient;
use savesync_core::domain::newtypes::{ConsoleId, RecordId, SavePath};
use savesync_core::ports::catalog::{CatalogClient, CatalogError, SavefilePayload};

use crate::common::{
    mount_consoles, mount_download, mount_savefiles, savefile_row, setup_authenticated,
};

async fn catalog() -> (MockServer, HttpCatalogClient) {
    let (server, client) = setup_authenticated().await;
    (server, HttpCatalogClient::new(client))
}

fn payload(path: &str) -> SavefilePayload {
    SavefilePayload {
        relative_path: SavePath::new(path).unwrap(),
        bytes: b"savefile-bytes".to_vec(),
        modified_at: Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap(),
        content_hash: None,
    }
}

#[tokio::test]
async fn list_consoles_maps_rows() {
    let (server, catalog) = catalog().await;
    mount_consoles(
        &server,
        serde_json::json!([
            {"id": 1, "name": "ps2"},
            {"id": 2, "name": "gamecube"}
        ]),
    )
    .await;

    let consoles = catalog.list_consoles().await.unwrap();
    assert_eq!(consoles.len(), 2);
    assert_eq!(consoles[0].id, ConsoleId::new(1));
    assert_eq!(consoles[1].name, "gamecube");
}

#[tokio::test]
async fn find_console_matches_by_name() {
    let (server, catalog) = catalog().await;
    mount_consoles(
        &server,
        serde_json::json!([{"id": 1, "name": "ps2"}, {"id": 2, "name": "n64"}]),
    )
    .await;

    let found = catalog.find_console("n64").await.unwrap();
    assert_eq!(found.unwrap().id, ConsoleId::new(2));

    let missing = catalog.find_console("dreamcast").await.unwrap();
    assert!(missing.is_none());
}

#[tokio::test]
async fn register_console_posts_name() {
    let (server, catalog) = catalog().await;
    Mock::given(method("POST"))
        .and(path("/console"))
        .respond_with(
            ResponseTemplate::new(201)
                .set_body_json(serde_json::json!({"id": 7, "name": "dreamcast"})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let console = catalog.register_console("dreamcast").await.unwrap();
    assert_eq!(console.id, ConsoleId::new(7));
    assert_eq!(console.name, "dreamcast");
}

#[tokio::test]
async fn list_savefiles_composes_paths() {
    let (server, catalog) = catalog().await;
    mount_savefiles(
        &server,
        serde_json::json!([
            savefile_row(10, "/", "slot1.bin", "2024-05-01T12:00:00Z"),
            savefile_row(11, "BASLUS-20312/", "slot2.bin", "2024-05-01T12:00:10Z"),
        ]),
    )
    .await;

    let records = catalog.list_savefiles(ConsoleId::new(1)).await.unwrap();
    assert_eq!(records.len(), 2);
    assert_eq!(records[0].relative_path.as_str(), "slot1.bin");
    assert_eq!(records[1].relative_path.as_str(), "BASLUS-20312/slot2.bin");
    assert_eq!(
        records[1].updated_at,
        Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 10).unwrap()
    );
}

#[tokio::test]
async fn list_savefiles_queries_console_id() {
    let (server, catalog) = catalog().await;
    Mock::given(method("GET"))
        .and(path("/savefile"))
        .and(query_param("console", "42"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([])))
        .expect(1)
        .mount(&server)
        .await;

    let records = catalog.list_savefiles(ConsoleId::new(42)).await.unwrap();
    assert!(records.is_empty());
}

#[tokio::test]
async fn download_returns_raw_bytes() {
    let (server, catalog) = catalog().await;
    mount_download(&server, 10, b"\x00\x01binary-save\xff").await;

    let bytes = catalog.download(RecordId::new(10)).await.unwrap();
    assert_eq!(bytes, b"\x00\x01binary-save\xff");
}

#[tokio::test]
async fn download_missing_record_maps_to_not_found() {
    let (server, catalog) = catalog().await;
    Mock::given(method("GET"))
        .and(path("/savefile/99"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let err = catalog.download(RecordId::new(99)).await.unwrap_err();
    assert!(matches!(err, CatalogError::NotFound(_)));
}

#[tokio::test]
async fn auth_failure_maps_to_auth_error() {
    let (server, catalog) = catalog().await;
    Mock::given(method("GET"))
        .and(path("/console"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let err = catalog.list_consoles().await.unwrap_err();
    assert!(matches!(err, CatalogError::Auth(_)));
}

#[tokio::test]
async fn upload_creates_record() {
    let (server, catalog) = catalog().await;
    Mock::given(method("POST"))
        .and(path("/savefile"))
        .and(header(
            "authorization",
            "Bearer test-session-token",
        ))
        .respond_with(ResponseTemplate::new(201).set_body_json(savefile_row(
            20,
            "/",
            "slot1.bin",
            "2024-05-01T12:00:00Z",
        )))
        .expect(1)
        .mount(&server)
        .await;

    let record = catalog
        .upload(ConsoleId::new(1), &payload("slot1.bin"))
        .await
        .unwrap();
    assert_eq!(record.id, RecordId::new(20));
    assert_eq!(record.relative_path.as_str(), "slot1.bin");
}

#[tokio::test]
async fn upload_conflict_falls_back_to_update() {
    let (server, catalog) = catalog().await;

    // Create collides with an existing record.
    Mock::given(method("POST"))
        .and(path("/savefile"))
        .respond_with(ResponseTemplate::new(409))
        .mount(&server)
        .await;

    // The existing record is found in the listing.
    mount_savefiles(
        &server,
        serde_json::json!([savefile_row(33, "/", "slot1.bin", "2024-04-01T00:00:00Z")]),
    )
    .await;

    // And updated in place through POST + _method=PUT.
    Mock::given(method("POST"))
        .and(path("/savefile/33"))
        .respond_with(ResponseTemplate::new(200).set_body_json(savefile_row(
            33,
            "/",
            "slot1.bin",
            "2024-05-01T12:00:00Z",
        )))
        .expect(1)
        .mount(&server)
        .await;

    let record = catalog
        .upload(ConsoleId::new(1), &payload("slot1.bin"))
        .await
        .unwrap();
    assert_eq!(record.id, RecordId::new(33));
}

#[tokio::test]
async fn delete_tolerates_no_content() {
    let (server, catalog) = catalog().await;
    Mock::given(method("DELETE"))
        .and(path("/savefile/10"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    catalog.delete(RecordId::new(10)).await.unwrap();
}

#[tokio::test]
async fn malformed_listing_maps_to_invalid_response() {
    let (server, catalog) = catalog().await;
    mount_savefiles(&server, serde_json::json!({"unexpected": "shape"})).await;

    let err = catalog.list_savefiles(ConsoleId::new(1)).await.unwrap_err();
    assert!(matches!(err, CatalogError::InvalidResponse(_)));
}
