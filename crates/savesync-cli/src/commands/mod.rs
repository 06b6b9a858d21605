//! CLI command implementations

use std::path::PathBuf;

use anyhow::{Context, Result};
use tracing::info;

use savesync_api::catalog::HttpCatalogClient;
use savesync_api::client::ApiClient;
use savesync_core::config::Config;

pub mod config;
pub mod consoles;
pub mod sync;

/// Loads the configuration from the given path (or the default location)
/// and applies environment overrides.
pub fn load_config(config_path: Option<&str>) -> Config {
    let path = config_path
        .map(PathBuf::from)
        .unwrap_or_else(Config::default_path);
    let mut config = Config::load_or_default(&path);
    config.apply_env();
    info!(config_path = %path.display(), "loaded configuration");
    config
}

/// Builds an authenticated catalog client from the configuration.
///
/// Logs in with the configured credentials, registering the account on
/// first contact with the catalog.
pub async fn connect(config: &Config) -> Result<HttpCatalogClient> {
    let mut client = ApiClient::new(&config.api.base_url, config.api.timeout_secs)
        .context("Failed to build API client")?;

    let account_name = config
        .api
        .email
        .split('@')
        .next()
        .unwrap_or("savesync")
        .to_string();

    client
        .login_or_register(&account_name, &config.api.email, &config.api.password)
        .await
        .context("Failed to authenticate with the catalog")?;

    Ok(HttpCatalogClient::new(client))
}
