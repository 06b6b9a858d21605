//! Catalog client adapter
//!
//! Implements the [`CatalogClient`] port over the catalog's HTTP API.
//! Maps wire DTOs (`file_name` + `file_path` split, RFC 3339 timestamps,
//! numeric foreign keys) onto domain records, wraps every call in the
//! transient-failure retry, and gives `upload` its create-or-update
//! semantics: a 409 on create falls back to locating the existing record
//! and updating it in place.
//!
//! ## Wire conventions
//!
//! The catalog stores a savefile's location as a directory field plus a
//! name field: `file_path` is `/` for files directly under the save root,
//! otherwise the directory with a trailing slash (`BASLUS-20312/`), and
//! `file_name` is the final component. [`compose_save_path`] and
//! [`split_save_path`] convert between that convention and [`SavePath`].
//! Updates go through `POST` with a `_method=PUT` field for multipart
//! compatibility with the PHP-side catalog.

use chrono::{DateTime, Utc};
use reqwest::multipart::{Form, Part};
use reqwest::Method;
use serde::Deserialize;
use tracing::{debug, info};

use savesync_core::domain::newtypes::{ConsoleId, RecordId, SavePath};
use savesync_core::domain::savefile::RemoteRecord;
use savesync_core::ports::catalog::{
    CatalogClient, CatalogError, RemoteConsole, SavefilePayload,
};

use crate::client::ApiClient;
use crate::retry::with_retry;

// ============================================================================
// Wire DTOs
// ============================================================================

/// A console row as the catalog returns it
#[derive(Debug, Deserialize)]
struct ConsoleDto {
    id: i64,
    name: String,
}

/// A savefile row as the catalog returns it
#[derive(Debug, Deserialize)]
struct SavefileDto {
    id: i64,
    file_name: String,
    file_path: String,
    #[serde(default)]
    size: u64,
    updated_at: String,
    fk_id_console: i64,
    #[serde(default = "default_version")]
    version: u32,
}

fn default_version() -> u32 {
    1
}

impl SavefileDto {
    fn into_record(self) -> Result<RemoteRecord, CatalogError> {
        let relative_path = compose_save_path(&self.file_path, &self.file_name)?;
        let updated_at = parse_timestamp(&self.updated_at)?;
        Ok(RemoteRecord {
            id: RecordId::new(self.id),
            console_id: ConsoleId::new(self.fk_id_console),
            relative_path,
            size_bytes: self.size,
            updated_at,
            version: self.version,
        })
    }
}

impl From<ConsoleDto> for RemoteConsole {
    fn from(dto: ConsoleDto) -> Self {
        Self {
            id: ConsoleId::new(dto.id),
            name: dto.name,
        }
    }
}

// ============================================================================
// Path and timestamp mapping
// ============================================================================

/// Joins the catalog's directory + name fields into a [`SavePath`].
fn compose_save_path(file_path: &str, file_name: &str) -> Result<SavePath, CatalogError> {
    let dir = file_path.trim_matches('/');
    let joined = if dir.is_empty() {
        file_name.to_string()
    } else {
        format!("{dir}/{file_name}")
    };
    SavePath::new(joined)
        .map_err(|e| CatalogError::InvalidResponse(format!("bad savefile path: {e}")))
}

/// Splits a [`SavePath`] into the catalog's `(file_path, file_name)` pair.
///
/// The directory part keeps a trailing slash; files directly under the
/// save root use `/`.
fn split_save_path(path: &SavePath) -> (String, String) {
    let name = path.file_name().to_string();
    let dir = match path.parent_dir() {
        Some(dir) => format!("{dir}/"),
        None => "/".to_string(),
    };
    (dir, name)
}

fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>, CatalogError> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| CatalogError::InvalidResponse(format!("bad timestamp '{raw}': {e}")))
}

// ============================================================================
// HttpCatalogClient
// ============================================================================

/// [`CatalogClient`] implementation over the catalog HTTP API
pub struct HttpCatalogClient {
    client: ApiClient,
}

impl HttpCatalogClient {
    /// Wraps an authenticated [`ApiClient`].
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    /// Returns the underlying API client.
    pub fn client(&self) -> &ApiClient {
        &self.client
    }

    /// Invalidates the session token server-side.
    pub async fn logout(&self) -> Result<(), CatalogError> {
        self.client.logout().await
    }

    /// Builds the multipart form for a savefile create or update.
    fn payload_form(console: Option<ConsoleId>, payload: &SavefilePayload) -> Form {
        let (file_path, file_name) = split_save_path(&payload.relative_path);

        let mut form = Form::new()
            .text("file_name", file_name.clone())
            .text("file_path", file_path)
            .text("updated_at", payload.modified_at.to_rfc3339());

        if let Some(console) = console {
            form = form.text("fk_id_console", console.value().to_string());
        }
        if let Some(hash) = &payload.content_hash {
            form = form.text("content_hash", hash.clone());
        }

        form.part(
            "savefile",
            Part::bytes(payload.bytes.clone()).file_name(file_name),
        )
    }

    /// One create attempt; 409 surfaces as [`CatalogError::Conflict`].
    async fn try_create(
        &self,
        console: ConsoleId,
        payload: &SavefilePayload,
    ) -> Result<RemoteRecord, CatalogError> {
        let response = self
            .client
            .request(Method::POST, "/savefile")
            .multipart(Self::payload_form(Some(console), payload))
            .send()
            .await
            .map_err(|e| ApiClient::transport_error("upload", e))?;

        let response = ApiClient::check_status("upload", response).await?;
        let dto: SavefileDto = response
            .json()
            .await
            .map_err(|e| CatalogError::InvalidResponse(format!("upload: {e}")))?;
        dto.into_record()
    }

    /// Finds the record a conflicting create collided with.
    async fn find_record(
        &self,
        console: ConsoleId,
        path: &SavePath,
    ) -> Result<Option<RemoteRecord>, CatalogError> {
        let records = self.list_savefiles(console).await?;
        Ok(records.into_iter().find(|r| &r.relative_path == path))
    }
}

#[async_trait::async_trait]
impl CatalogClient for HttpCatalogClient {
    async fn list_consoles(&self) -> Result<Vec<RemoteConsole>, CatalogError> {
        with_retry("list_consoles", || async {
            let response = self
                .client
                .request(Method::GET, "/console")
                .send()
                .await
                .map_err(|e| ApiClient::transport_error("list_consoles", e))?;

            let response = ApiClient::check_status("list_consoles", response).await?;
            let dtos: Vec<ConsoleDto> = response
                .json()
                .await
                .map_err(|e| CatalogError::InvalidResponse(format!("list_consoles: {e}")))?;

            Ok(dtos.into_iter().map(RemoteConsole::from).collect())
        })
        .await
    }

    async fn find_console(&self, name: &str) -> Result<Option<RemoteConsole>, CatalogError> {
        // The catalog has no name filter; fetch all and match client-side.
        let consoles = self.list_consoles().await?;
        Ok(consoles.into_iter().find(|c| c.name == name))
    }

    async fn register_console(&self, name: &str) -> Result<RemoteConsole, CatalogError> {
        with_retry("register_console", || async {
            let response = self
                .client
                .request(Method::POST, "/console")
                .json(&serde_json::json!({ "name": name }))
                .send()
                .await
                .map_err(|e| ApiClient::transport_error("register_console", e))?;

            let response = ApiClient::check_status("register_console", response).await?;
            let dto: ConsoleDto = response
                .json()
                .await
                .map_err(|e| CatalogError::InvalidResponse(format!("register_console: {e}")))?;

            info!(console = %dto.name, id = dto.id, "console registered");
            Ok(RemoteConsole::from(dto))
        })
        .await
    }

    async fn list_savefiles(&self, console: ConsoleId) -> Result<Vec<RemoteRecord>, CatalogError> {
        with_retry("list_savefiles", || async {
            let path = format!("/savefile?console={}", console.value());
            let response = self
                .client
                .request(Method::GET, &path)
                .send()
                .await
                .map_err(|e| ApiClient::transport_error("list_savefiles", e))?;

            let response = ApiClient::check_status("list_savefiles", response).await?;
            let dtos: Vec<SavefileDto> = response
                .json()
                .await
                .map_err(|e| CatalogError::InvalidResponse(format!("list_savefiles: {e}")))?;

            dtos.into_iter().map(SavefileDto::into_record).collect()
        })
        .await
    }

    async fn upload(
        &self,
        console: ConsoleId,
        payload: &SavefilePayload,
    ) -> Result<RemoteRecord, CatalogError> {
        let created = with_retry("upload", || self.try_create(console, payload)).await;

        match created {
            Err(CatalogError::Conflict(_)) => {
                // The catalog already has this path; update it in place.
                debug!(path = %payload.relative_path, "create conflicted, updating existing record");
                match self.find_record(console, &payload.relative_path).await? {
                    Some(existing) => self.update(existing.id, payload).await,
                    None => Err(CatalogError::InvalidResponse(format!(
                        "catalog reported a conflict for '{}' but no record was found",
                        payload.relative_path
                    ))),
                }
            }
            other => other,
        }
    }

    async fn update(
        &self,
        record: RecordId,
        payload: &SavefilePayload,
    ) -> Result<RemoteRecord, CatalogError> {
        with_retry("update", || async {
            let path = format!("/savefile/{record}");
            // POST with _method=PUT: multipart PUT compatibility with the
            // PHP-side catalog.
            let form = Self::payload_form(None, payload).text("_method", "PUT");

            let response = self
                .client
                .request(Method::POST, &path)
                .multipart(form)
                .send()
                .await
                .map_err(|e| ApiClient::transport_error("update", e))?;

            let response = ApiClient::check_status("update", response).await?;
            let dto: SavefileDto = response
                .json()
                .await
                .map_err(|e| CatalogError::InvalidResponse(format!("update: {e}")))?;
            dto.into_record()
        })
        .await
    }

    async fn download(&self, record: RecordId) -> Result<Vec<u8>, CatalogError> {
        with_retry("download", || async {
            let path = format!("/savefile/{record}");
            let response = self
                .client
                .request(Method::GET, &path)
                .header(reqwest::header::ACCEPT, "application/octet-stream")
                .send()
                .await
                .map_err(|e| ApiClient::transport_error("download", e))?;

            let response = ApiClient::check_status("download", response).await?;
            let bytes = response
                .bytes()
                .await
                .map_err(|e| ApiClient::transport_error("download", e))?;

            debug!(record = %record, bytes = bytes.len(), "savefile downloaded");
            Ok(bytes.to_vec())
        })
        .await
    }

    async fn delete(&self, record: RecordId) -> Result<(), CatalogError> {
        with_retry("delete", || async {
            let path = format!("/savefile/{record}");
            let response = self
                .client
                .request(Method::DELETE, &path)
                .send()
                .await
                .map_err(|e| ApiClient::transport_error("delete", e))?;

            ApiClient::check_status("delete", response).await?;
            Ok(())
        })
        .await
    }
}
