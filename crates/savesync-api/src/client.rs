//! Savefile catalog HTTP client
//!
//! Wraps `reqwest::Client` with the catalog's conventions: bearer-token
//! auth, JSON accept headers, a per-call timeout, and a single place where
//! HTTP status codes become [`CatalogError`] variants.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use savesync_api::client::ApiClient;
//!
//! # async fn example() -> Result<(), savesync_core::ports::catalog::CatalogError> {
//! let mut client = ApiClient::new("https://saves.example.com/api", 10)?;
//! client.login("player@example.com", "secret").await?;
//! # Ok(())
//! # }
//! ```

use std::time::Duration;

use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use tracing::debug;

use savesync_core::ports::catalog::CatalogError;

/// HTTP client for the savefile catalog API
///
/// Holds the session token once [`login`](ApiClient::login) has run; every
/// request issued through [`request`](ApiClient::request) carries it as a
/// bearer header.
pub struct ApiClient {
    /// The underlying HTTP client (owns the per-call timeout)
    http: Client,
    /// Base URL for API requests, without a trailing slash
    base_url: String,
    /// Session token from login; `None` until authenticated
    token: Option<String>,
}

impl ApiClient {
    /// Creates a client for the catalog at `base_url`.
    ///
    /// `timeout_secs` applies to every request; an elapsed timeout surfaces
    /// as [`CatalogError::Timeout`] for that call only.
    pub fn new(base_url: impl Into<String>, timeout_secs: u64) -> Result<Self, CatalogError> {
        let http = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| CatalogError::Transport(format!("failed to build HTTP client: {e}")))?;

        let mut base_url = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }

        Ok(Self {
            http,
            base_url,
            token: None,
        })
    }

    /// Returns the base URL this client talks to.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Returns the session token, if authenticated.
    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    /// Stores a session token for subsequent requests.
    pub fn set_token(&mut self, token: impl Into<String>) {
        self.token = Some(token.into());
        debug!("session token updated");
    }

    /// Creates a request builder for the given method and path.
    ///
    /// Prepends the base URL, sets the JSON accept header, and attaches
    /// the bearer token when one is present.
    pub fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = format!("{}{}", self.base_url, path);
        let mut builder = self
            .http
            .request(method, &url)
            .header(reqwest::header::ACCEPT, "application/json");
        if let Some(token) = &self.token {
            builder = builder.bearer_auth(token);
        }
        builder
    }

    /// Maps a reqwest transport error onto the catalog error taxonomy.
    pub(crate) fn transport_error(operation: &str, err: reqwest::Error) -> CatalogError {
        if err.is_timeout() {
            CatalogError::Timeout(operation.to_string())
        } else {
            CatalogError::Transport(format!("{operation}: {err}"))
        }
    }

    /// Checks a response status, consuming error responses into the
    /// catalog error taxonomy.
    ///
    /// 401/403 become `Auth`, 404 `NotFound`, 409 `Conflict`; everything
    /// else non-successful becomes `Transport` with the body attached.
    pub(crate) async fn check_status(
        operation: &str,
        response: Response,
    ) -> Result<Response, CatalogError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        debug!(operation, %status, body = %body, "catalog returned error status");

        Err(match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                CatalogError::Auth(format!("{operation}: {status}"))
            }
            StatusCode::NOT_FOUND => CatalogError::NotFound(operation.to_string()),
            StatusCode::CONFLICT => CatalogError::Conflict(operation.to_string()),
            _ => CatalogError::Transport(format!("{operation}: {status} - {body}")),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trailing_slash_trimmed() {
        let client = ApiClient::new("https://saves.example.com/api///", 10).unwrap();
        assert_eq!(client.base_url(), "https://saves.example.com/api");
    }

    #[test]
    fn test_token_starts_unset() {
        let client = ApiClient::new("https://saves.example.com/api", 10).unwrap();
        assert!(client.token().is_none());
    }

    #[test]
    fn test_set_token() {
        let mut client = ApiClient::new("https://saves.example.com/api", 10).unwrap();
        client.set_token("tok-123");
        assert_eq!(client.token(), Some("tok-123"));
    }
}
