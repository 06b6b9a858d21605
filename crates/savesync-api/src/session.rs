//! Session handling - login, registration, logout
//!
//! Token-based authentication against the catalog API:
//!
//! - `POST /login {email, password}` returns a bearer token on 200
//! - `POST /register {name, email, password, password_confirmation}`
//!   creates the account and returns a token on 201
//! - `GET /logout` invalidates the token server-side
//!
//! [`ApiClient::login_or_register`] mirrors the usual first-run flow:
//! try to log in, and fall back to registering the account when the
//! catalog rejects the credentials.

use reqwest::Method;
use serde::Deserialize;
use tracing::{info, warn};

use savesync_core::ports::catalog::CatalogError;

use crate::client::ApiClient;

/// Token envelope returned by the login and register endpoints
#[derive(Debug, Deserialize)]
struct TokenResponse {
    token: String,
}

impl ApiClient {
    /// Logs in and stores the session token on success.
    pub async fn login(&mut self, email: &str, password: &str) -> Result<(), CatalogError> {
        let response = self
            .request(Method::POST, "/login")
            .json(&serde_json::json!({
                "email": email,
                "password": password,
            }))
            .send()
            .await
            .map_err(|e| Self::transport_error("login", e))?;

        let response = Self::check_status("login", response).await?;
        let body: TokenResponse = response
            .json()
            .await
            .map_err(|e| CatalogError::InvalidResponse(format!("login: {e}")))?;

        self.set_token(body.token);
        info!("login successful");
        Ok(())
    }

    /// Registers a new account and stores the session token on success.
    pub async fn register_account(
        &mut self,
        name: &str,
        email: &str,
        password: &str,
    ) -> Result<(), CatalogError> {
        let response = self
            .request(Method::POST, "/register")
            .json(&serde_json::json!({
                "name": name,
                "email": email,
                "password": password,
                "password_confirmation": password,
            }))
            .send()
            .await
            .map_err(|e| Self::transport_error("register", e))?;

        let response = Self::check_status("register", response).await?;
        let body: TokenResponse = response
            .json()
            .await
            .map_err(|e| CatalogError::InvalidResponse(format!("register: {e}")))?;

        self.set_token(body.token);
        info!("registration successful");
        Ok(())
    }

    /// Logs in, registering the account first if the catalog rejects the
    /// credentials.
    pub async fn login_or_register(
        &mut self,
        name: &str,
        email: &str,
        password: &str,
    ) -> Result<(), CatalogError> {
        match self.login(email, password).await {
            Ok(()) => Ok(()),
            Err(CatalogError::Auth(_)) => {
                warn!("login rejected, attempting account registration");
                self.register_account(name, email, password).await
            }
            Err(err) => Err(err),
        }
    }

    /// Invalidates the session token server-side.
    ///
    /// Safe to call on an unauthenticated client; it is a no-op then.
    pub async fn logout(&self) -> Result<(), CatalogError> {
        if self.token().is_none() {
            warn!("logout requested without a session token");
            return Ok(());
        }

        let response = self
            .request(Method::GET, "/logout")
            .send()
            .await
            .map_err(|e| Self::transport_error("logout", e))?;

        Self::check_status("logout", response).await?;
        info!("logout successful");
        Ok(())
    }
}
